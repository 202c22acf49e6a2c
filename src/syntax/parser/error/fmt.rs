use std::fmt::Display as _;

use super::{Error, ErrorCode};
use crate::{
	fmt::Display,
	pid::Interner,
	term::color,
};


impl ErrorCode {
	fn message(&self) -> &'static str {
		match self {
			Self::OutOfMemory => "out of memory",
			Self::Syntax => "syntax error",
			Self::ExpectedColon => "expected ':'",
			Self::ExpectedSemicolon => "expected ';'",
			Self::ExpectedLParen => "expected '('",
			Self::ExpectedRParen => "expected ')'",
			Self::ExpectedRBrack => "expected ']'",
			Self::ExpectedLCurly => "expected '{'",
			Self::ExpectedRCurly => "expected '}'",
			Self::ExpectedIdentifier => "expected identifier",
			Self::ExpectedAssign => "expected '='",
			Self::ExpectedArrow => "expected '=>'",
			Self::ExpectedWhile => "expected 'while'",
			Self::ExpectedMemberName => "expected identifier, string or number",
			Self::ExpectedString => "expected string constant",
			Self::InvalidNumber => "invalid number",
			Self::InvalidCharacter => "invalid character",
			Self::InvalidEscape => "invalid escape sequence",
			Self::UnterminatedString => "unterminated string constant",
			Self::UnterminatedComment => "unterminated comment",
			Self::UnterminatedTemplate => "unterminated template literal",
			Self::UnterminatedRegex => "unterminated regular expression literal",
			Self::BadReturn => "'return' statement outside of function",
			Self::BadBreak => "can't have 'break' outside of loop",
			Self::BadContinue => "can't have 'continue' outside of loop",
			Self::LabelRedefined => "label redefined",
			Self::LabelNotFound => "label not found",
			Self::DuplicateDefault => "'default' can only appear once in a 'switch' statement",
			Self::ThrowNewline => "illegal line break after 'throw'",
			Self::KeywordAsIdentifier => "the use of a keyword for an identifier is invalid",
			Self::SetterArity => "setter functions must have one argument",
			Self::GetterArity => "getter functions must not have arguments",
			Self::InvalidRestElement => "the rest element must be the last element",
			Self::InvalidCoverInitializer => "invalid shorthand property initializer",
			Self::InvalidForInit => "for-in and for-of declarations may not have initializers",
			Self::AwaitOutsideAsync => "'await' expression is only valid in async functions",
			Self::YieldInParameter => "'yield' expression is not allowed in formal parameters",
			Self::WithStrict => "'with' statements are not allowed in strict mode",
			Self::DuplicateFormalStrict => "duplicate formal parameter names not allowed in strict mode",
			Self::OctalStrict => "octal numeric literals and escape characters not allowed in strict mode",
			Self::EvalStrict => "invalid usage of 'eval' in strict mode",
			Self::ArgumentsStrict => "invalid usage of 'arguments' in strict mode",
			Self::DeleteNameStrict => "calling delete on an identifier is not allowed in strict mode",
			Self::StrictReserved => "the use of a future reserved word for an identifier is invalid in strict mode",
			Self::BlockFunctionStrict => "function declarations can't be nested inside a statement in strict mode",
			Self::IllegalUseStrict => "'use strict' is not allowed in functions with non-simple parameters",
			Self::Redeclaration { .. } => "let/const redeclaration",
			Self::ConstWithoutInit => "const must be initialized",
			Self::LetAsLexicalName => "'let' is not allowed as a lexically bound name",
			Self::InvalidAssignmentTarget => "invalid left-hand side in assignment",
			Self::InvalidDestructuringTarget => "invalid destructuring assignment target",
			Self::BadSuper => "invalid use of the 'super' keyword",
			Self::BadNewTarget => "invalid use of 'new.target'",
			Self::DuplicateConstructor => "a class may only have one constructor",
			Self::DuplicateExport { .. } => "duplicate export",
			Self::ModuleItemOutsideModule => "import and export declarations are only valid at the top level of a module",
		}
	}
}


impl<'a> Display<'a> for Error {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		write!(f, "{} - ", self.span)?;
		color::Fg(color::Red, self.code.message()).fmt(f)?;

		match self.code {
			ErrorCode::Redeclaration { name, previous } => {
				" of '".fmt(f)?;
				name.fmt(f, context)?;
				write!(f, "', previously declared at {}", previous)?;
			}

			ErrorCode::DuplicateExport { name } => {
				" of '".fmt(f)?;
				name.fmt(f, context)?;
				"'".fmt(f)?;
			}

			_ => (),
		}

		write!(f, " (0x{:08X})", self.code.hresult())
	}
}


/// We need this in order to be able to implement std::error::Error.
impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{} - {} (0x{:08X})", self.span, self.code.message(), self.code.hresult())
	}
}
