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


/// The state for lexing a template chunk: from the opening backtick or the closing brace
/// of a substitution, up to the next substitution or the closing backtick.
#[derive(Debug)]
pub(super) struct TemplateLiteral {
	start_offset: u32,
	pos: SourcePos,
	cooked: Cooked,
	/// Whether all escapes were valid. Invalid escapes are allowed in tagged templates,
	/// which then see an undefined cooked value.
	cooked_valid: bool,
	escape: Option<Escape>,
	/// Whether a `$` preceding a `{` was consumed.
	dollar: bool,
}


impl TemplateLiteral {
	/// Start a template chunk at the cursor, which must be at the opening delimiter.
	pub fn at(cursor: &Cursor) -> Self {
		Self {
			start_offset: cursor.offset(),
			pos: cursor.pos(),
			cooked: Cooked::default(),
			cooked_valid: true,
			escape: None,
			dollar: false,
		}
	}


	pub fn visit(mut self, cursor: &Cursor, interner: &Mutex<Interner>) -> Transition {
		if self.dollar {
			debug_assert_eq!(cursor.peek(), Some(b'{'));
			return self.produce(cursor, interner, false);
		}

		if let Some(escape) = self.escape.take() {
			return match escape.visit(cursor.peek(), cursor.peek_at(1)) {
				EscapeStep::More(escape) | EscapeStep::Legacy(escape) => {
					// Octal escapes are not allowed in templates, only `\0` is.
					if matches!(escape, Escape::Octal { .. }) {
						self.cooked_valid = false;
					}
					self.escape = Some(escape);
					Transition::step(self)
				}

				EscapeStep::Char(code_point) => {
					self.cooked.push_code_point(code_point);
					Transition::step(self)
				}

				EscapeStep::CharResume(code_point) => {
					self.cooked.push_code_point(code_point);
					Transition::resume(self)
				}

				EscapeStep::LegacyChar(_) => {
					self.cooked_valid = false;
					Transition::step(self)
				}

				EscapeStep::Byte(byte) => {
					self.cooked.push_byte(byte);
					Transition::step(self)
				}

				EscapeStep::Skip => Transition::step(self),

				EscapeStep::SkipResume => Transition::resume(self),

				EscapeStep::Invalid => {
					self.cooked_valid = false;
					Transition::resume(self)
				}
			};
		}

		match cursor.peek() {
			None => Transition::resume_error(
				Root::default(),
				Error::unterminated(
					ErrorKind::UnterminatedTemplate,
					self.start_offset,
					cursor.offset(),
					self.pos,
				)
			),

			Some(b'`') => self.produce(cursor, interner, true),

			Some(b'$') if cursor.peek_at(1) == Some(b'{') => {
				self.dollar = true;
				Transition::step(self)
			}

			Some(b'\\') => {
				self.escape = Some(Escape::Start);
				Transition::step(self)
			}

			Some(c) => {
				self.cooked.push_byte(c);
				Transition::step(self)
			}
		}
	}


	/// Produce the chunk, consuming the closing delimiter.
	fn produce(self, cursor: &Cursor, interner: &Mutex<Interner>, tail: bool) -> Transition {
		// The raw value excludes the delimiters: one character at the start, and either
		// the backtick or `${` at the end.
		let raw_end = if tail { cursor.offset() } else { cursor.offset() - 1 };
		let raw = cursor.slice(self.start_offset + 1, raw_end);

		let mut interner = interner.lock();
		let raw = interner.get_or_intern(raw);
		let cooked = if self.cooked_valid {
			Some(interner.get_or_intern(self.cooked.finish()))
		} else {
			None
		};

		Transition::produce(
			Root::default(),
			token(TokenKind::Template { cooked, raw, tail }, self.start_offset, self.pos, cursor, 1)
		)
	}
}


impl From<TemplateLiteral> for State {
	fn from(state: TemplateLiteral) -> State {
		State::TemplateLiteral(state)
	}
}
