use parking_lot::Mutex;

use super::{
	token,
	Cooked,
	Cursor,
	Error,
	ErrorKind,
	Escape,
	EscapeStep,
	Root,
	SourcePos,
	State,
	TokenKind,
	Transition,
};
use crate::pid::Interner;


/// The state for lexing string literals, either single or double quoted.
#[derive(Debug)]
pub(super) struct StringLiteral {
	quote: u8,
	start_offset: u32,
	pos: SourcePos,
	value: Cooked,
	escape: Option<Escape>,
	escape_offset: u32,
	octal_escape: bool,
}


impl StringLiteral {
	/// Start a string literal at the cursor, which must be at the opening quote.
	pub fn at(quote: u8, cursor: &Cursor) -> Self {
		Self {
			quote,
			start_offset: cursor.offset(),
			pos: cursor.pos(),
			value: Cooked::default(),
			escape: None,
			escape_offset: 0,
			octal_escape: false,
		}
	}


	pub fn visit(mut self, cursor: &Cursor, interner: &Mutex<Interner>) -> Transition {
		if let Some(escape) = self.escape.take() {
			return match escape.visit(cursor.peek(), cursor.peek_at(1)) {
				EscapeStep::More(escape) => {
					self.escape = Some(escape);
					Transition::step(self)
				}

				EscapeStep::Legacy(escape) => {
					self.octal_escape = true;
					self.escape = Some(escape);
					Transition::step(self)
				}

				EscapeStep::Char(code_point) => {
					self.value.push_code_point(code_point);
					Transition::step(self)
				}

				EscapeStep::LegacyChar(code_point) => {
					self.octal_escape = true;
					self.value.push_code_point(code_point);
					Transition::step(self)
				}

				EscapeStep::CharResume(code_point) => {
					self.value.push_code_point(code_point);
					Transition::resume(self)
				}

				EscapeStep::Byte(byte) => {
					self.value.push_byte(byte);
					Transition::step(self)
				}

				EscapeStep::Skip => Transition::step(self),

				EscapeStep::SkipResume => Transition::resume(self),

				EscapeStep::Invalid => {
					let end = (cursor.offset() + 1).min(cursor.input().len() as u32);
					let sequence = cursor.slice(self.escape_offset, end);
					Transition::error(
						Root::default(),
						Error::invalid_escape_sequence(sequence, self.escape_offset, self.pos)
					)
				}
			};
		}

		match cursor.peek() {
			// A raw line terminator ends the literal prematurely.
			None | Some(b'\n') | Some(b'\r') => Transition::resume_error(
				Root::default(),
				Error::unterminated(
					ErrorKind::UnterminatedString,
					self.start_offset,
					cursor.offset(),
					self.pos,
				)
			),

			Some(b'\\') => {
				self.escape = Some(Escape::Start);
				self.escape_offset = cursor.offset();
				Transition::step(self)
			}

			Some(c) if c == self.quote => {
				let value = interner.lock().get_or_intern(self.value.finish());
				let kind = TokenKind::String { value, octal_escape: self.octal_escape };

				Transition::produce(
					Root::default(),
					token(kind, self.start_offset, self.pos, cursor, 1)
				)
			}

			Some(c) => {
				self.value.push_byte(c);
				Transition::step(self)
			}
		}
	}
}


impl From<StringLiteral> for State {
	fn from(state: StringLiteral) -> State {
		State::StringLiteral(state)
	}
}
