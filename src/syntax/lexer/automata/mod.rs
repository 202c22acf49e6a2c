mod comment;
mod escape;
mod number;
mod regex;
mod root;
mod string;
mod symbol;
mod template;
mod word;

use parking_lot::Mutex;

use self::{
	comment::Comment,
	escape::{Cooked, Escape, EscapeStep},
	number::NumberLiteral,
	regex::RegexLiteral,
	root::{Root, Skip},
	string::StringLiteral,
	symbol::Symbol,
	template::TemplateLiteral,
	word::{IsWord, Word},
};
use super::{
	Cursor,
	Error,
	ErrorKind,
	Goal,
	Keyword,
	Punct,
	SourcePos,
	Span,
	Token,
	TokenKind,
};
use crate::pid::Interner;


/// The automata may produce a token, or an error.
type Output = Result<Token, Error>;


/// The transition to be made after a character in the input has been visited.
#[derive(Debug)]
struct Transition {
	/// The next state.
	state: State,
	/// Whether to consume the visited input character.
	consume: bool,
	/// Whether the visited input was a line terminator, or a comment spanning one.
	newline: bool,
	/// The produced output, if any.
	output: Option<Output>,
}


impl Transition {
	/// Consume the character while updating the machine state, but not producing a token
	/// yet.
	pub fn step<S: Into<State>>(state: S) -> Self {
		Self { state: state.into(), consume: true, newline: false, output: None }
	}

	/// Consume a line terminator.
	pub fn newline<S: Into<State>>(state: S) -> Self {
		Self { state: state.into(), consume: true, newline: true, output: None }
	}

	/// Consume the input character and produce a token.
	pub fn produce<S: Into<State>>(state: S, token: Token) -> Self {
		Self {
			state: state.into(),
			consume: true,
			newline: false,
			output: Some(Ok(token)),
		}
	}

	/// Consume the input character and produce an error.
	pub fn error<S: Into<State>>(state: S, error: Error) -> Self {
		Self {
			state: state.into(),
			consume: true,
			newline: false,
			output: Some(Err(error)),
		}
	}

	/// Don't consume the input character, updating the machine state instead.
	pub fn resume<S: Into<State>>(state: S) -> Self {
		Self { state: state.into(), consume: false, newline: false, output: None }
	}

	/// Don't consume the input character, but produce a token.
	pub fn resume_produce<S: Into<State>>(state: S, output: Token) -> Self {
		Self {
			state: state.into(),
			consume: false,
			newline: false,
			output: Some(Ok(output)),
		}
	}

	/// Don't consume the input character and produce an error.
	pub fn resume_error<S: Into<State>>(state: S, error: Error) -> Self {
		Self {
			state: state.into(),
			consume: false,
			newline: false,
			output: Some(Err(error)),
		}
	}
}


/// All states in the automata.
#[derive(Debug)]
enum State {
	Root(Root),
	Skip(Skip),
	Comment(Comment),
	NumberLiteral(NumberLiteral),
	StringLiteral(StringLiteral),
	TemplateLiteral(TemplateLiteral),
	RegexLiteral(RegexLiteral),
	Word(Word),
	Symbol(Symbol),
}


impl Default for State {
	fn default() -> Self {
		Root::default().into()
	}
}


impl State {
	pub fn visit(self, cursor: &Cursor, interner: &Mutex<Interner>) -> Transition {
		match self {
			State::Root(state) => state.visit(cursor),
			State::Skip(state) => state.visit(cursor),
			State::Comment(state) => state.visit(cursor),
			State::NumberLiteral(state) => state.visit(cursor),
			State::StringLiteral(state) => state.visit(cursor, interner),
			State::TemplateLiteral(state) => state.visit(cursor, interner),
			State::RegexLiteral(state) => state.visit(cursor, interner),
			State::Word(state) => state.visit(cursor, interner),
			State::Symbol(state) => state.visit(cursor),
		}
	}
}


/// Run the automata from the given state until it produces a token or an error.
/// Unlike a token stream, the automata is restarted for every token, because the parser
/// selects the lexical goal per token and may rewind the cursor between tokens.
pub(super) fn run(cursor: &mut Cursor, interner: &Mutex<Interner>, goal: Goal) -> Output {
	drive(cursor, interner, Root { goal }.into())
}


/// Resume a template literal after the closing brace of a substitution. The cursor must
/// be positioned at the brace.
pub(super) fn run_template_continuation(cursor: &mut Cursor, interner: &Mutex<Interner>) -> Output {
	debug_assert_eq!(cursor.peek(), Some(b'}'));
	let state = TemplateLiteral::at(cursor);
	cursor.step();
	drive(cursor, interner, state.into())
}


fn drive(cursor: &mut Cursor, interner: &Mutex<Interner>, mut state: State) -> Output {
	let mut newline = false;

	loop {
		let transition = state.visit(cursor, interner);

		state = transition.state;
		newline |= transition.newline;

		if transition.consume {
			cursor.step();
		}

		if let Some(output) = transition.output {
			return output.map(
				|token| Token { newline_before: newline, ..token }
			);
		}
	}
}


/// Build a token spanning from `start` to the current cursor offset, plus `extra`
/// characters yet to be consumed.
fn token(kind: TokenKind, start: u32, pos: SourcePos, cursor: &Cursor, extra: u32) -> Token {
	Token {
		kind,
		span: Span::new(start, cursor.offset() + extra),
		pos,
		newline_before: false,
	}
}


/// Check whether the cursor is at a multi-byte space or line terminator. Returns the
/// number of bytes in the sequence, and whether it's a line terminator.
fn unicode_space(cursor: &Cursor) -> Option<(u8, bool)> {
	match (cursor.peek(), cursor.peek_at(1), cursor.peek_at(2)) {
		// U+00A0 no-break space.
		(Some(0xC2), Some(0xA0), _) => Some((2, false)),
		// U+FEFF byte order mark.
		(Some(0xEF), Some(0xBB), Some(0xBF)) => Some((3, false)),
		// U+2028 line separator, U+2029 paragraph separator.
		(Some(0xE2), Some(0x80), Some(0xA8)) | (Some(0xE2), Some(0x80), Some(0xA9)) => Some((3, true)),
		_ => None,
	}
}
