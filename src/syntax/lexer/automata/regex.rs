use parking_lot::Mutex;

use super::{
	token,
	Cursor,
	Error,
	ErrorKind,
	IsWord,
	Root,
	SourcePos,
	State,
	TokenKind,
	Transition,
};
use crate::pid::Interner;


/// The state for lexing regular expression literals. The pattern is not validated here,
/// only delimited: the closing slash is the first one outside a class and not escaped.
#[derive(Debug)]
pub(super) struct RegexLiteral {
	start_offset: u32,
	pos: SourcePos,
	in_class: bool,
	escaped: bool,
	/// The offset of the first flag, once the closing slash is consumed.
	flags_offset: Option<u32>,
}


impl RegexLiteral {
	/// Start a regex literal at the cursor, which must be at the opening slash.
	pub fn at(cursor: &Cursor) -> Self {
		Self {
			start_offset: cursor.offset(),
			pos: cursor.pos(),
			in_class: false,
			escaped: false,
			flags_offset: None,
		}
	}


	pub fn visit(mut self, cursor: &Cursor, interner: &Mutex<Interner>) -> Transition {
		if let Some(flags_offset) = self.flags_offset {
			return match cursor.peek() {
				Some(c) if c.is_word() => Transition::step(self),

				_ => {
					let mut interner = interner.lock();
					let pattern = interner.get_or_intern(
						cursor.slice(self.start_offset + 1, flags_offset - 1)
					);
					let flags = interner.get_or_intern(cursor.slice(flags_offset, cursor.offset()));

					Transition::resume_produce(
						Root::default(),
						token(TokenKind::Regex { pattern, flags }, self.start_offset, self.pos, cursor, 0)
					)
				}
			};
		}

		match cursor.peek() {
			None | Some(b'\n') | Some(b'\r') => Transition::resume_error(
				Root::default(),
				Error::unterminated(
					ErrorKind::UnterminatedRegex,
					self.start_offset,
					cursor.offset(),
					self.pos,
				)
			),

			Some(_) if self.escaped => {
				self.escaped = false;
				Transition::step(self)
			}

			Some(b'\\') => {
				self.escaped = true;
				Transition::step(self)
			}

			Some(b'[') => {
				self.in_class = true;
				Transition::step(self)
			}

			Some(b']') => {
				self.in_class = false;
				Transition::step(self)
			}

			Some(b'/') if !self.in_class => {
				self.flags_offset = Some(cursor.offset() + 1);
				Transition::step(self)
			}

			Some(_) => Transition::step(self),
		}
	}
}


impl From<RegexLiteral> for State {
	fn from(state: RegexLiteral) -> State {
		State::RegexLiteral(state)
	}
}
