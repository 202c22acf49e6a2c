use std::fmt::Display as _;

use super::{Keyword, Punct, Token, TokenKind};
use crate::{
	fmt::Display,
	pid::{Interner, Pid},
	term::color,
};


impl std::fmt::Display for Keyword {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		color::Fg(color::Blue, self.as_str()).fmt(f)
	}
}


impl std::fmt::Display for Punct {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		color::Fg(color::Yellow, self.as_str()).fmt(f)
	}
}


fn quoted(pid: Pid, f: &mut std::fmt::Formatter, interner: &Interner) -> std::fmt::Result {
	write!(f, "\"{}\"", interner.spelling(pid).escape_debug())
}


impl<'a> Display<'a> for TokenKind {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::Identifier { pid, .. } => pid.fmt(f, context),
			Self::Keyword(keyword) => keyword.fmt(f),
			Self::Punct(punct) => punct.fmt(f),
			Self::Number { value, .. } => color::Fg(color::Cyan, value).fmt(f),
			Self::String { value, .. } => quoted(*value, f, context),

			Self::Template { raw, tail, .. } => {
				"`".fmt(f)?;
				interner_raw(*raw, f, context)?;
				if *tail { "`".fmt(f) } else { "${".fmt(f) }
			}

			Self::Regex { pattern, flags } => {
				write!(
					f,
					"/{}/{}",
					context.spelling(*pattern),
					context.spelling(*flags),
				)
			}

			Self::Eof => color::Fg(color::Red, "<eof>").fmt(f),
		}
	}
}


fn interner_raw(pid: Pid, f: &mut std::fmt::Formatter, interner: &Interner) -> std::fmt::Result {
	interner.spelling(pid).escape_debug().fmt(f)
}


impl<'a> Display<'a> for Token {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		write!(f, "{}:\t", self.pos)?;
		self.kind.fmt(f, context)
	}
}
