use parking_lot::Mutex;

use super::{
	token,
	unicode_space,
	Cooked,
	Cursor,
	Error,
	Escape,
	EscapeStep,
	Keyword,
	Root,
	SourcePos,
	State,
	TokenKind,
	Transition,
};
use crate::pid::Interner;


/// The state for lexing identifiers and keywords.
#[derive(Debug)]
pub(super) struct Word {
	start_offset: u32,
	pos: SourcePos,
	value: Cooked,
	/// Whether the word contained unicode escapes.
	escaped: bool,
	/// A backslash was consumed, `u` must follow.
	backslash: bool,
	escape: Option<Escape>,
	escape_offset: u32,
}


impl Word {
	pub fn at(cursor: &Cursor) -> Self {
		Self {
			start_offset: cursor.offset(),
			pos: cursor.pos(),
			value: Cooked::default(),
			escaped: false,
			backslash: false,
			escape: None,
			escape_offset: 0,
		}
	}


	pub fn visit(mut self, cursor: &Cursor, interner: &Mutex<Interner>) -> Transition {
		if self.backslash {
			self.backslash = false;
			return match cursor.peek() {
				Some(b'u') => {
					self.escape = Some(Escape::UnicodeOpen);
					Transition::step(self)
				}
				_ => self.invalid_escape(cursor),
			};
		}

		if let Some(escape) = self.escape.take() {
			return match escape.visit(cursor.peek(), cursor.peek_at(1)) {
				EscapeStep::More(escape) => {
					self.escape = Some(escape);
					Transition::step(self)
				}

				EscapeStep::Char(code_point) => {
					self.value.push_code_point(code_point);
					Transition::step(self)
				}

				_ => self.invalid_escape(cursor),
			};
		}

		// We don't need to check if the first character is a number here, because the Root
		// state will only transition to this state if that is not the case.
		match cursor.peek() {
			Some(b'\\') => {
				self.escaped = true;
				self.backslash = true;
				self.escape_offset = cursor.offset();
				Transition::step(self)
			}

			Some(c) if c.is_word() && unicode_space(cursor).is_none() => {
				self.value.push_byte(c);
				Transition::step(self)
			}

			// If we visit EOF or a non-identifier character, we should just produce.
			_ => {
				let word = self.value.finish();

				let kind = match Keyword::from_bytes(&word) {
					Some(keyword) if !self.escaped => TokenKind::Keyword(keyword),
					_ => TokenKind::Identifier {
						pid: interner.lock().get_or_intern(word),
						escaped: self.escaped,
					},
				};

				Transition::resume_produce(
					Root::default(),
					token(kind, self.start_offset, self.pos, cursor, 0)
				)
			}
		}
	}


	fn invalid_escape(self, cursor: &Cursor) -> Transition {
		let end = (cursor.offset() + 1).min(cursor.input().len() as u32);
		Transition::error(
			Root::default(),
			Error::invalid_escape_sequence(
				cursor.slice(self.escape_offset, end),
				self.escape_offset,
				self.pos,
			)
		)
	}
}


impl From<Word> for State {
	fn from(state: Word) -> State {
		State::Word(state)
	}
}


/// Helper trait for checking if a character is a valid identifier constituent.
/// Non-ASCII characters are accepted as identifier characters.
pub trait IsWord {
	fn is_word_start(&self) -> bool;
	fn is_word(&self) -> bool;
}


impl IsWord for u8 {
	fn is_word_start(&self) -> bool {
		self.is_ascii_alphabetic() || matches!(*self, b'_' | b'$' | b'\\') || *self >= 0x80
	}

	fn is_word(&self) -> bool {
		self.is_ascii_alphanumeric() || matches!(*self, b'_' | b'$') || *self >= 0x80
	}
}
