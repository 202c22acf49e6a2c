mod args;

use std::{
	fs,
	io,
	path::{Path, PathBuf},
};

use tracing::debug;
use tracing_subscriber::EnvFilter;

use jsfront::{
	fmt,
	pid::{self, Interner, SharedInterner},
	reloc,
	syntax::{
		config::{BackgroundMode, SourceKind},
		profile::ExecutionProfile,
		ParseTree,
	},
	term::color,
	Options,
	Source,
};

use args::{Args, Command};


fn main() -> ! {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();

	let command = match args::parse(std::env::args_os()) {
		Ok(command) => command,
		Err(error) => {
			eprint!("{}", error);
			std::process::exit(1)
		}
	};

	let result = match command {
		Command::Parse(args) => run(args),
		Command::Help(msg) | Command::Version(msg) => {
			println!("{}", msg);
			std::process::exit(0)
		},
	};

	let exit_code = match result {
		Ok(code) => code,
		Err(error) => {
			eprintln!("{}: {}", color::Fg(color::Red, "Error"), error);
			1
		}
	};

	std::process::exit(exit_code)
}


/// Failures that are not syntax errors in the sources.
#[derive(Debug)]
enum Failure {
	Io(PathBuf, io::Error),
	Json(PathBuf, serde_json::Error),
	Pattern(glob::PatternError),
	Reloc(PathBuf, reloc::Error),
}


impl std::fmt::Display for Failure {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Io(path, error) => write!(f, "{}: {}", path.display(), error),
			Self::Json(path, error) => write!(f, "{}: {}", path.display(), error),
			Self::Pattern(error) => write!(f, "invalid pattern: {}", error),
			Self::Reloc(path, error) => write!(f, "{}: encoding stubs: {}", path.display(), error),
		}
	}
}


impl std::error::Error for Failure {}


fn run(args: Args) -> Result<i32, Failure> {
	let options = options(&args)?;
	let interner = pid::shared(Interner::new());

	let mut exit_code = 0;

	for source in sources(&args.files)? {
		let tree = match jsfront::parse(&source, interner.clone(), options.clone()) {
			Ok(tree) => tree,
			Err(error) => {
				eprintln!(
					"{}: {}: {}",
					color::Fg(color::Red, "Error"),
					source.path.display(),
					fmt::Show(error, &*interner.lock())
				);
				exit_code = 2;
				continue;
			}
		};

		if args.check {
			continue;
		}

		report(&args, &source.path, &tree, &interner)?;
	}

	Ok(exit_code)
}


fn report(args: &Args, path: &Path, tree: &ParseTree, interner: &SharedInterner) -> Result<(), Failure> {
	if args.print_ast {
		println!("{}", color::Fg(color::Yellow, "--------------------------------------------------"));
		println!("{}", tree.dump());
		println!("{}", color::Fg(color::Yellow, "--------------------------------------------------"));
		println!("{}", tree.dump_scopes());
		println!("{}", color::Fg(color::Yellow, "--------------------------------------------------"));
	}

	if args.print_stubs {
		let image = tree
			.encode_stubs(reloc::Config::default())
			.map_err(|error| Failure::Reloc(path.into(), error))?;

		let json = serde_json::to_string_pretty(&image)
			.map_err(|error| Failure::Json(path.into(), error))?;

		println!("{}", json);
	}

	if !args.print_ast && !args.print_stubs {
		let functions = tree.ast.functions().count();
		let deferred = tree.ast.functions().filter(|function| function.is_deferred()).count();

		println!(
			"{}: {} functions, {} deferred, {} names",
			color::Fg(color::Green, path.display()),
			functions,
			deferred,
			interner.lock().len(),
		);
	}

	Ok(())
}


/// Parse options from the config file, overridden by the command line flags.
fn options(args: &Args) -> Result<Options, Failure> {
	let mut options = match &args.config {
		Some(path) => {
			let json = fs::read_to_string(path).map_err(|error| Failure::Io(path.clone(), error))?;
			Options::from_json(&json).map_err(|error| Failure::Json(path.clone(), error))?
		}
		None => Options::default(),
	};

	if args.module {
		options.kind = SourceKind::Module;
	}

	if args.strict {
		options.strict = true;
	}

	if let Some(threshold) = args.defer {
		options.defer.threshold = Some(threshold);
	}

	if let Some(workers) = args.background {
		options.background = BackgroundMode::Threads(workers);
	} else if args.inline_background {
		options.background = BackgroundMode::Inline;
	}

	if let Some(path) = &args.profile {
		let json = fs::read_to_string(path).map_err(|error| Failure::Io(path.clone(), error))?;
		let profile: ExecutionProfile = serde_json::from_str(&json)
			.map_err(|error| Failure::Json(path.clone(), error))?;

		debug!(path = %path.display(), executed = profile.len(), "loaded execution profile");
		options.profile = Some(profile);
	}

	debug!(?options, "parse options");

	Ok(options)
}


/// Expand the file patterns. Patterns matching nothing are taken as plain paths, so that
/// missing files are reported.
fn sources(patterns: &[String]) -> Result<Vec<Source>, Failure> {
	let mut sources = Vec::new();

	for pattern in patterns {
		if pattern == "-" {
			let path = Path::new("<stdin>");
			let source = Source::from_reader(path, io::stdin().lock())
				.map_err(|error| Failure::Io(path.into(), error))?;
			sources.push(source);
			continue;
		}

		let mut paths = Vec::new();
		for entry in glob::glob(pattern).map_err(Failure::Pattern)? {
			match entry {
				Ok(path) => paths.push(path),
				Err(error) => return Err(Failure::Io(error.path().into(), error.into_error())),
			}
		}

		if paths.is_empty() {
			paths.push(PathBuf::from(pattern));
		}

		for path in paths {
			let source = Source::from_path(path.as_path()).map_err(|error| Failure::Io(path.clone(), error))?;
			sources.push(source);
		}
	}

	Ok(sources)
}
