use super::{
	unicode_space,
	Comment,
	Cursor,
	Error,
	Goal,
	IsWord,
	NumberLiteral,
	Punct,
	RegexLiteral,
	Span,
	State,
	StringLiteral,
	Symbol,
	TemplateLiteral,
	Token,
	TokenKind,
	Transition,
	Word,
};


/// The top level lexer state.
#[derive(Debug, Default)]
pub(super) struct Root {
	pub goal: Goal,
}


impl Root {
	pub fn visit(self, cursor: &Cursor) -> Transition {
		// Non-ASCII whitespace and line terminators.
		if let Some((len, newline)) = unicode_space(cursor) {
			return Transition::step(Skip { remaining: len - 1, newline, goal: self.goal });
		}

		match cursor.peek() {
			// Line terminators.
			Some(b'\n') => Transition::newline(self),

			// Whitespace.
			Some(b' ') | Some(b'\t') | Some(b'\r') | Some(0x0B) | Some(0x0C) => Transition::step(self),

			// Hashbang, only at the very beginning of the source.
			Some(b'#') if cursor.offset() == 0 && cursor.peek_at(1) == Some(b'!') => {
				Transition::step(Comment::line(cursor, self.goal))
			}

			// Comments, regular expressions and division.
			Some(b'/') => match cursor.peek_at(1) {
				Some(b'/') => Transition::step(Comment::line(cursor, self.goal)),
				Some(b'*') => Transition::step(Comment::block(cursor, self.goal)),
				_ if self.goal == Goal::RegExp => Transition::step(RegexLiteral::at(cursor)),
				_ => Transition::resume(Symbol::at(cursor)),
			},

			// String literals.
			Some(quote @ b'"') | Some(quote @ b'\'') => {
				Transition::step(StringLiteral::at(quote, cursor))
			}

			// Template literals.
			Some(b'`') => Transition::step(TemplateLiteral::at(cursor)),

			// Number literals, including ones with a leading dot.
			Some(c) if c.is_ascii_digit() => Transition::resume(NumberLiteral::at(cursor)),
			Some(b'.') if cursor.peek_at(1).map_or(false, |c| c.is_ascii_digit()) => {
				Transition::resume(NumberLiteral::at(cursor))
			}

			// Identifiers and keywords.
			Some(c) if c.is_word_start() => Transition::resume(Word::at(cursor)),

			// Punctuators.
			Some(c) if Punct::is_prefix(&[c]) => Transition::resume(Symbol::at(cursor)),

			Some(c) => Transition::error(
				self,
				Error::unexpected(c, cursor.offset(), cursor.pos())
			),

			// Eof. Don't consume, so that further scans keep producing eof.
			None => {
				let token = Token {
					kind: TokenKind::Eof,
					span: Span::empty(cursor.offset()),
					pos: cursor.pos(),
					newline_before: false,
				};

				Transition::resume_produce(self, token)
			}
		}
	}
}


impl From<Root> for State {
	fn from(state: Root) -> State {
		State::Root(state)
	}
}


/// Skip the remaining bytes of a multi-byte space.
#[derive(Debug)]
pub(super) struct Skip {
	pub remaining: u8,
	pub newline: bool,
	pub goal: Goal,
}


impl Skip {
	pub fn visit(self, _cursor: &Cursor) -> Transition {
		if self.remaining > 1 {
			Transition::step(Self { remaining: self.remaining - 1, ..self })
		} else {
			let root = Root { goal: self.goal };
			if self.newline {
				Transition::newline(root)
			} else {
				Transition::step(root)
			}
		}
	}
}


impl From<Skip> for State {
	fn from(state: Skip) -> State {
		State::Skip(state)
	}
}
