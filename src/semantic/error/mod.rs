mod fmt;

use crate::{pid::Pid, syntax::Span};


/// The kind of declaration error.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
	/// A name declared twice where redeclaration is forbidden.
	Redeclaration { name: Pid, previous: Span },
}


/// A declaration error, detected while adding a declaration to a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
	pub kind: ErrorKind,
	pub span: Span,
}


impl std::error::Error for Error {}


impl Error {
	pub fn redeclaration(name: Pid, previous: Span, span: Span) -> Self {
		Self { kind: ErrorKind::Redeclaration { name, previous }, span }
	}
}
