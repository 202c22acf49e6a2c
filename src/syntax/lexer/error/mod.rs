mod fmt;

use super::{SourcePos, Span};


/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
	/// Unexpected character.
	Unexpected(u8),
	/// End of file inside a string literal, or a newline without a line continuation.
	UnterminatedString,
	/// End of file inside a block comment.
	UnterminatedComment,
	/// End of file inside a template literal.
	UnterminatedTemplate,
	/// End of file or newline inside a regular expression literal.
	UnterminatedRegex,
	/// Invalid escape sequence in string literal or identifier.
	InvalidEscapeSequence(Box<[u8]>),
	/// Invalid number literal.
	InvalidNumber(Box<[u8]>),
}


/// A lexical error.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
	pub error: ErrorKind,
	pub span: Span,
	pub pos: SourcePos,
}


impl std::error::Error for Error {}


impl Error {
	pub fn unexpected(input: u8, offset: u32, pos: SourcePos) -> Self {
		Self {
			error: ErrorKind::Unexpected(input),
			span: Span::new(offset, offset + 1),
			pos,
		}
	}

	pub fn unterminated(error: ErrorKind, start: u32, end: u32, pos: SourcePos) -> Self {
		Self { error, span: Span::new(start, end), pos }
	}

	pub fn invalid_escape_sequence(sequence: &[u8], start: u32, pos: SourcePos) -> Self {
		Self {
			error: ErrorKind::InvalidEscapeSequence(sequence.into()),
			span: Span::new(start, start + sequence.len() as u32),
			pos,
		}
	}

	pub fn invalid_number(number: &[u8], start: u32, pos: SourcePos) -> Self {
		Self {
			error: ErrorKind::InvalidNumber(number.into()),
			span: Span::new(start, start + number.len() as u32),
			pos,
		}
	}
}
