mod automata;
mod cursor;
mod error;
#[cfg(test)]
mod tests;
mod token;

use super::{SourcePos, Span};
use crate::pid::SharedInterner;
pub use cursor::{Cursor, RestorePoint};
pub use error::{Error, ErrorKind};
pub use token::{Keyword, Punct, Token, TokenKind};


/// The lexical goal. A slash starts a regular expression only where an expression may
/// begin, which only the parser knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
	Div,
	RegExp,
}


impl Default for Goal {
	fn default() -> Self {
		Self::Div
	}
}


/// The scanner for JavaScript source code. Tokens are produced on demand, and the scanner
/// may be rewound to any restore point it produced.
#[derive(Debug)]
pub struct Scanner<'a> {
	cursor: Cursor<'a>,
	interner: SharedInterner,
}


impl<'a> Scanner<'a> {
	pub fn new(input: &'a [u8], interner: SharedInterner) -> Self {
		Self { cursor: Cursor::from(input), interner }
	}


	/// Scan the next token.
	pub fn scan(&mut self, goal: Goal) -> Result<Token, Error> {
		automata::run(&mut self.cursor, &self.interner, goal)
	}


	/// Scan the continuation of a template literal. The scanner must be positioned at the
	/// closing brace of a substitution.
	pub fn scan_template_continuation(&mut self) -> Result<Token, Error> {
		automata::run_template_continuation(&mut self.cursor, &self.interner)
	}


	/// Capture the current position, so that the scanner may be rewound to it later.
	pub fn capture(&self) -> RestorePoint {
		self.cursor.capture()
	}


	pub fn seek_to(&mut self, point: RestorePoint) {
		self.cursor.seek(point)
	}


	/// The current character offset.
	pub fn offset(&self) -> u32 {
		self.cursor.offset()
	}


	pub fn input(&self) -> &'a [u8] {
		self.cursor.input()
	}


	pub fn interner(&self) -> &SharedInterner {
		&self.interner
	}
}
