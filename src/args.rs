use std::{ffi::OsString, path::PathBuf};

use clap::{clap_app, crate_authors, crate_version, crate_description, value_t};


#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
	Help(Box<str>),
	Version(Box<str>),
	Parse(Args)
}


#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Args {
	/// Only report whether the sources parse.
	pub check: bool,
	/// Print the AST.
	pub print_ast: bool,
	/// Print the deferred stubs as a relocatable image.
	pub print_stubs: bool,
	pub module: bool,
	pub strict: bool,
	/// Defer function bodies in sources at least this long.
	pub defer: Option<usize>,
	/// Number of background parse threads.
	pub background: Option<usize>,
	pub inline_background: bool,
	pub profile: Option<PathBuf>,
	pub config: Option<PathBuf>,
	/// Glob patterns, or `-` for stdin.
	pub files: Vec<String>,
}


pub fn parse<A, T>(args: A) -> clap::Result<Command>
where
	A: IntoIterator<Item = T>,
	T: Into<OsString> + Clone
{
	let app = clap_app!(
		jsfront =>
			(version: crate_version!())
			(author: crate_authors!())
			(about: crate_description!())
			(@arg check: --check "Only check the syntax, printing errors")
			(@arg ast: --ast "Print the AST")
			(@arg stubs: --stubs "Print the stubs of deferred functions as a JSON image")
			(@arg module: --module "Parse the sources as modules")
			(@arg strict: --strict "Start in strict mode")
			(@arg defer: --defer +takes_value "Defer function bodies in sources at least this long")
			(@arg background: --background +takes_value conflicts_with[inline_background]
				"Parse top level functions with this many background threads")
			(@arg inline_background: --("inline-background")
				"Queue background items and parse them after the top level")
			(@arg profile: --profile +takes_value "Execution profile, as JSON")
			(@arg config: --config +takes_value "Parse options, as JSON")
			(@arg files: ... "Source files, as glob patterns. Use - for stdin")
	);

	match app.get_matches_from_safe(args) {
		Ok(matches) => {
			let defer = if matches.is_present("defer") {
				Some(value_t!(matches, "defer", usize)?)
			} else {
				None
			};

			let background = if matches.is_present("background") {
				Some(value_t!(matches, "background", usize)?)
			} else {
				None
			};

			let files = matches
				.values_of("files")
				.map(|files| files.map(String::from).collect())
				.unwrap_or_else(|| vec!["-".to_owned()]);

			Ok(
				Command::Parse(
					Args {
						check: matches.is_present("check"),
						print_ast: matches.is_present("ast"),
						print_stubs: matches.is_present("stubs"),
						module: matches.is_present("module"),
						strict: matches.is_present("strict"),
						defer,
						background,
						inline_background: matches.is_present("inline_background"),
						profile: matches.value_of("profile").map(PathBuf::from),
						config: matches.value_of("config").map(PathBuf::from),
						files,
					}
				)
			)
		}

		Err(error) => match error.kind {
			clap::ErrorKind::HelpDisplayed => Ok(
				Command::Help(error.message.into_boxed_str())
			),
			clap::ErrorKind::VersionDisplayed => Ok(
				Command::Version(error.message.into_boxed_str())
			),
			_ => Err(error)
		}
	}
}


#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;


	#[test]
	fn test_flags() {
		let command = parse(&["jsfront", "--module", "--defer", "0", "--background", "4", "a.js", "b/*.mjs"]);

		assert_matches!(
			command,
			Ok(Command::Parse(Args { module: true, defer: Some(0), background: Some(4), ref files, .. }))
				if files == &["a.js", "b/*.mjs"]
		);
	}


	#[test]
	fn test_stdin_by_default() {
		let command = parse(&["jsfront", "--check"]);

		assert_matches!(
			command,
			Ok(Command::Parse(Args { check: true, ref files, .. })) if files == &["-"]
		);
	}


	#[test]
	fn test_invalid_threshold() {
		assert!(parse(&["jsfront", "--defer", "soon"]).is_err());
	}


	#[test]
	fn test_background_modes_conflict() {
		assert!(parse(&["jsfront", "--background", "2", "--inline-background"]).is_err());
	}
}
