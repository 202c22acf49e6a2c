use std::{io, path::Path};

use crate::{
	fmt,
	pid::{self, Interner},
	tests,
};
use super::{
	config::{BackgroundMode, DeferPolicy, Options, SourceKind},
	Error,
	ParseTree,
	Source,
};


/// Modules are the files with the `.mjs` extension.
fn options_for(path: &Path) -> Options {
	let kind = match path.extension() {
		Some(extension) if extension == "mjs" => SourceKind::Module,
		_ => SourceKind::Script,
	};

	Options { kind, ..Options::default() }
}


fn test_dir<P, F>(path: P, mut check: F) -> io::Result<()>
where
	P: AsRef<Path>,
	F: FnMut(&Path, &Source) -> bool,
{
	tests::util::test_dir(
		path,
		move |path, file| {
			let source = Source::from_reader(path, file)?;

			if !check(path, &source) {
				panic!("unexpected outcome for {}", path.display());
			}

			Ok(())
		}
	)
}


fn parse(source: &Source, options: Options) -> Result<ParseTree, Error> {
	let interner = pid::shared(Interner::new());
	let result = super::parse(source, interner.clone(), options);

	if let Err(error) = &result {
		eprintln!("{}: {}", source.path.display(), fmt::Show(error, &*interner.lock()));
	}

	result
}


#[test]
fn test_positive() -> io::Result<()> {
	test_dir(
		"src/syntax/tests/data/positive",
		|path, source| parse(source, options_for(path)).is_ok(),
	)
}


#[test]
fn test_positive_deferred() -> io::Result<()> {
	test_dir(
		"src/syntax/tests/data/positive",
		|path, source| {
			let eager = match parse(source, options_for(path)) {
				Ok(tree) => tree,
				Err(_) => return false,
			};

			let options = Options {
				defer: DeferPolicy { threshold: Some(0) },
				..options_for(path)
			};

			let mut deferred = match parse(source, options) {
				Ok(tree) => tree,
				Err(_) => return false,
			};

			if deferred.undefer_all().is_err() {
				return false;
			}

			// Un-deferring everything yields the tree and scopes of an eager parse.
			assert_eq!(eager.dump(), deferred.dump(), "tree of {}", path.display());
			assert_eq!(eager.dump_scopes(), deferred.dump_scopes(), "scopes of {}", path.display());

			eager.ast.function_slots() == deferred.ast.function_slots()
		},
	)
}


#[test]
fn test_positive_background() -> io::Result<()> {
	test_dir(
		"src/syntax/tests/data/positive",
		|path, source| {
			let options = Options {
				background: BackgroundMode::Inline,
				background_min_len: 0,
				..options_for(path)
			};

			parse(source, options).is_ok()
		},
	)
}


#[test]
fn test_negative() -> io::Result<()> {
	test_dir(
		"src/syntax/tests/data/negative",
		|path, source| parse(source, options_for(path)).is_err(),
	)
}


#[test]
fn test_negative_deferred() -> io::Result<()> {
	// Errors in deferred bodies are still found by the syntax only pass.
	test_dir(
		"src/syntax/tests/data/negative",
		|path, source| {
			let options = Options {
				defer: DeferPolicy { threshold: Some(0) },
				..options_for(path)
			};

			parse(source, options).is_err()
		},
	)
}
