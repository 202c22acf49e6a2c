use super::{Cursor, Error, ErrorKind, Goal, Root, SourcePos, State, Transition};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
	Line,
	Block {
		/// Whether the previous character was a star.
		star: bool,
	},
}


/// The state for lexing comments.
/// Once the comment is consumed, the lexer returns to the root state with the same goal.
#[derive(Debug)]
pub(super) struct Comment {
	kind: Kind,
	goal: Goal,
	/// Whether the second character of the opening delimiter was consumed.
	opened: bool,
	/// Whether a block comment spanned a line terminator.
	newline: bool,
	start_offset: u32,
	pos: SourcePos,
}


impl Comment {
	pub fn line(cursor: &Cursor, goal: Goal) -> Self {
		Self::new(Kind::Line, cursor, goal)
	}


	pub fn block(cursor: &Cursor, goal: Goal) -> Self {
		Self::new(Kind::Block { star: false }, cursor, goal)
	}


	fn new(kind: Kind, cursor: &Cursor, goal: Goal) -> Self {
		Self {
			kind,
			goal,
			opened: false,
			newline: false,
			start_offset: cursor.offset(),
			pos: cursor.pos(),
		}
	}


	pub fn visit(mut self, cursor: &Cursor) -> Transition {
		if !self.opened {
			self.opened = true;
			return Transition::step(self);
		}

		match (self.kind, cursor.peek()) {
			// Newline marks the end of a line comment. The root state handles the newline.
			(Kind::Line, Some(b'\n')) | (Kind::Line, None) => Transition::resume(Root { goal: self.goal }),

			(Kind::Line, _) => Transition::step(self),

			(Kind::Block { .. }, None) => Transition::resume_error(
				Root { goal: self.goal },
				Error::unterminated(
					ErrorKind::UnterminatedComment,
					self.start_offset,
					cursor.offset(),
					self.pos,
				)
			),

			(Kind::Block { star: true }, Some(b'/')) => {
				let root = Root { goal: self.goal };
				if self.newline {
					Transition::newline(root)
				} else {
					Transition::step(root)
				}
			}

			(Kind::Block { .. }, Some(c)) => {
				self.kind = Kind::Block { star: c == b'*' };
				self.newline |= c == b'\n';
				Transition::step(self)
			}
		}
	}
}


impl From<Comment> for State {
	fn from(state: Comment) -> State {
		State::Comment(state)
	}
}
