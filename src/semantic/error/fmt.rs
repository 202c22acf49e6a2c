use std::fmt::Display as _;

use super::{Error, ErrorKind};
use crate::{
	fmt::Display,
	pid::Interner,
};


impl<'a> Display<'a> for ErrorKind {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		match self {
			Self::Redeclaration { name, previous } => {
				"let/const redeclaration of '".fmt(f)?;
				name.fmt(f, context)?;
				write!(f, "', previously declared at {}", previous)
			}
		}
	}
}


impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Redeclaration { previous, .. } => {
				write!(f, "redeclaration, previously declared at {}", previous)
			}
		}
	}
}


impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}: {}", self.span, self.kind)
	}
}
