use std::{
	fmt::{self, Display},
	fs::File,
	path::Path,
};


/// JavaScript source text.
#[derive(Debug)]
pub struct Source {
	/// The origin path, may be something fictional like `<stdin>`.
	pub path: Box<Path>,
	/// The source code, as UTF-8 bytes. Character offsets are byte offsets into this.
	pub contents: Box<[u8]>,
}


impl Source {
	/// Load the source code from a file path.
	pub fn from_path<P>(path: P) -> std::io::Result<Self>
	where
		P: Into<Box<Path>>,
	{
		let path = path.into();
		let file = File::open(&path)?;
		Self::from_reader(path, file)
	}


	/// Load the source code from a std::io::Read.
	/// The path argument may be anything, including fictional paths like `<stdin>`.
	pub fn from_reader<P, R>(path: P, mut reader: R) -> std::io::Result<Self>
	where
		P: Into<Box<Path>>,
		R: std::io::Read,
	{
		let path = path.into();
		let mut contents = Vec::with_capacity(4096);
		reader.read_to_end(&mut contents)?;

		Ok(Self { path, contents: contents.into() })
	}


	/// Wrap in-memory text.
	pub fn from_text<P>(path: P, text: &str) -> Self
	where
		P: Into<Box<Path>>,
	{
		Self { path: path.into(), contents: text.as_bytes().into() }
	}


	/// The length of the source, in characters.
	pub fn len(&self) -> usize {
		self.contents.len()
	}


	/// Whether the source is empty.
	pub fn is_empty(&self) -> bool {
		self.contents.is_empty()
	}
}


/// A human readable position in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SourcePos {
	pub line: u32,
	pub column: u32,
}


impl SourcePos {
	/// Advance the position over a single byte.
	pub fn visit(&mut self, input: u8) {
		if input == b'\n' {
			self.line += 1;
			self.column = 0;
		} else {
			self.column += 1;
		}
	}
}


impl Default for SourcePos {
	fn default() -> Self {
		Self { line: 1, column: 0 }
	}
}


impl Display for SourcePos {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "line {}, column {}", self.line, self.column)
	}
}


/// A half-open character range `[ich_min, ich_lim)` in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Span {
	pub ich_min: u32,
	pub ich_lim: u32,
}


impl Span {
	pub fn new(ich_min: u32, ich_lim: u32) -> Self {
		debug_assert!(ich_min <= ich_lim, "inverted span {}..{}", ich_min, ich_lim);
		Self { ich_min, ich_lim }
	}


	/// A zero-width span, used by synthetic nodes.
	pub fn empty(at: u32) -> Self {
		Self { ich_min: at, ich_lim: at }
	}


	/// The smallest span covering both spans.
	pub fn to(self, other: Span) -> Self {
		Self {
			ich_min: self.ich_min.min(other.ich_min),
			ich_lim: self.ich_lim.max(other.ich_lim),
		}
	}


	pub fn len(self) -> u32 {
		self.ich_lim - self.ich_min
	}


	pub fn is_empty(self) -> bool {
		self.ich_min == self.ich_lim
	}


	/// Whether `other` is nested within this span.
	pub fn contains(self, other: Span) -> bool {
		self.ich_min <= other.ich_min && other.ich_lim <= self.ich_lim
	}
}


impl Display for Span {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "[{}, {})", self.ich_min, self.ich_lim)
	}
}
