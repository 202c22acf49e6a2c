use super::{
	token,
	Cursor,
	Error,
	Punct,
	Root,
	SourcePos,
	State,
	TokenKind,
	Transition,
};


/// The longest punctuator has four characters (`>>>=`).
const MAX_LEN: usize = 4;


/// The state for lexing punctuators. Characters are accumulated while they form a prefix
/// of some punctuator, which yields the longest match.
#[derive(Debug)]
pub(super) struct Symbol {
	start_offset: u32,
	pos: SourcePos,
	buffer: [u8; MAX_LEN],
	len: usize,
}


impl Symbol {
	pub fn at(cursor: &Cursor) -> Self {
		Self {
			start_offset: cursor.offset(),
			pos: cursor.pos(),
			buffer: [0; MAX_LEN],
			len: 0,
		}
	}


	pub fn visit(mut self, cursor: &Cursor) -> Transition {
		if let Some(c) = cursor.peek() {
			if self.len < MAX_LEN {
				self.buffer[self.len] = c;
				if Punct::is_prefix(&self.buffer[.. self.len + 1]) {
					self.len += 1;
					return Transition::step(self);
				}
			}
		}

		match Punct::from_bytes(&self.buffer[.. self.len]) {
			Some(punct) => Transition::resume_produce(
				Root::default(),
				token(TokenKind::Punct(punct), self.start_offset, self.pos, cursor, 0)
			),

			// A prefix which is not a punctuator by itself, like `..`.
			None => Transition::resume_error(
				Root::default(),
				Error::unexpected(self.buffer[0], self.start_offset, self.pos)
			),
		}
	}
}


impl From<Symbol> for State {
	fn from(state: Symbol) -> State {
		State::Symbol(state)
	}
}
