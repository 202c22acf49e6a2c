use serde::{Deserialize, Serialize};

use super::profile::ExecutionProfile;


/// The goal symbol of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub enum SourceKind {
	Script,
	/// Modules are strict, and may hold import and export declarations.
	Module,
}


impl Default for SourceKind {
	fn default() -> Self {
		Self::Script
	}
}


/// When to defer the parsing of function bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct DeferPolicy {
	/// Nested functions are deferred when the source is at least this long. None disables
	/// deferral.
	pub threshold: Option<usize>,
}


/// Whether nested functions are parsed by background items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub enum BackgroundMode {
	Disabled,
	/// Items are queued, and parsed by the main thread when the top level parse is done.
	Inline,
	/// Items are parsed by a pool with the given number of threads.
	Threads(usize),
}


impl Default for BackgroundMode {
	fn default() -> Self {
		Self::Disabled
	}
}


/// How literals followed by `=` become destructuring patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub enum DestructuringStrategy {
	/// Convert the literal nodes in place.
	Convert,
	/// Rewind to the literal and parse it again with the pattern grammar.
	Reparse,
}


impl Default for DestructuringStrategy {
	fn default() -> Self {
		Self::Convert
	}
}


/// Parse options.
#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
	pub kind: SourceKind,
	/// Start in strict mode.
	pub strict: bool,
	pub defer: DeferPolicy,
	pub background: BackgroundMode,
	/// Functions shorter than this are never parsed in the background.
	pub background_min_len: usize,
	pub destructuring: DestructuringStrategy,
	pub profile: Option<ExecutionProfile>,
}


impl Default for Options {
	fn default() -> Self {
		Self {
			kind: SourceKind::default(),
			strict: false,
			defer: DeferPolicy::default(),
			background: BackgroundMode::default(),
			background_min_len: 64,
			destructuring: DestructuringStrategy::default(),
			profile: None,
		}
	}
}


impl Options {
	pub fn from_json(json: &str) -> serde_json::Result<Self> {
		serde_json::from_str(json)
	}


	pub fn is_module(&self) -> bool {
		self.kind == SourceKind::Module
	}
}
