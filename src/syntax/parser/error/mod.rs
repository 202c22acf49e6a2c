mod fmt;

use super::super::{lexer, Span};
use crate::{pid::Pid, semantic};


/// The closed set of compile errors. Each code maps to a stable number in the 1000 range,
/// which is what hosts display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorCode {
	OutOfMemory,

	// Syntax.
	Syntax,
	ExpectedColon,
	ExpectedSemicolon,
	ExpectedLParen,
	ExpectedRParen,
	ExpectedRBrack,
	ExpectedLCurly,
	ExpectedRCurly,
	ExpectedIdentifier,
	ExpectedAssign,
	ExpectedArrow,
	ExpectedWhile,
	ExpectedMemberName,
	ExpectedString,
	InvalidNumber,
	InvalidCharacter,
	InvalidEscape,
	UnterminatedString,
	UnterminatedComment,
	UnterminatedTemplate,
	UnterminatedRegex,
	BadReturn,
	BadBreak,
	BadContinue,
	LabelRedefined,
	LabelNotFound,
	DuplicateDefault,
	ThrowNewline,
	KeywordAsIdentifier,
	SetterArity,
	GetterArity,
	InvalidRestElement,
	InvalidCoverInitializer,
	InvalidForInit,
	AwaitOutsideAsync,
	YieldInParameter,

	// Strict mode.
	WithStrict,
	DuplicateFormalStrict,
	OctalStrict,
	EvalStrict,
	ArgumentsStrict,
	DeleteNameStrict,
	StrictReserved,
	BlockFunctionStrict,
	IllegalUseStrict,

	// Semantic errors detected while parsing.
	Redeclaration { name: Pid, previous: Span },
	ConstWithoutInit,
	LetAsLexicalName,
	InvalidAssignmentTarget,
	InvalidDestructuringTarget,
	BadSuper,
	BadNewTarget,
	DuplicateConstructor,
	DuplicateExport { name: Pid },
	ModuleItemOutsideModule,
}


impl ErrorCode {
	/// The numeric error code.
	pub fn number(&self) -> u32 {
		match self {
			Self::OutOfMemory => 7,

			Self::Syntax => 1002,
			Self::ExpectedColon => 1003,
			Self::ExpectedSemicolon => 1004,
			Self::ExpectedLParen => 1005,
			Self::ExpectedRParen => 1006,
			Self::ExpectedRBrack => 1007,
			Self::ExpectedLCurly => 1008,
			Self::ExpectedRCurly => 1009,
			Self::ExpectedIdentifier => 1010,
			Self::ExpectedAssign => 1011,
			Self::UnterminatedRegex => 1012,
			Self::InvalidNumber => 1013,
			Self::InvalidCharacter => 1014,
			Self::UnterminatedString => 1015,
			Self::UnterminatedComment => 1016,
			Self::BadReturn => 1018,
			Self::BadBreak => 1019,
			Self::BadContinue => 1020,
			Self::InvalidEscape => 1023,
			Self::ExpectedWhile => 1024,
			Self::LabelRedefined => 1025,
			Self::LabelNotFound => 1026,
			Self::DuplicateDefault => 1027,
			Self::ExpectedMemberName => 1028,
			Self::ExpectedString => 1029,
			Self::ThrowNewline => 1035,
			Self::WithStrict => 1037,
			Self::DuplicateFormalStrict => 1038,
			Self::OctalStrict => 1039,
			Self::EvalStrict => 1041,
			Self::ArgumentsStrict => 1042,
			Self::DeleteNameStrict => 1045,
			Self::BlockFunctionStrict => 1047,
			Self::KeywordAsIdentifier => 1048,
			Self::StrictReserved => 1050,
			Self::SetterArity => 1051,
			Self::Redeclaration { .. } => 1052,
			Self::ConstWithoutInit => 1053,
			Self::UnterminatedTemplate => 1055,
			Self::GetterArity => 1056,
			Self::ExpectedArrow => 1057,
			Self::InvalidAssignmentTarget => 1060,
			Self::InvalidDestructuringTarget => 1061,
			Self::BadSuper => 1062,
			Self::BadNewTarget => 1063,
			Self::DuplicateExport { .. } => 1064,
			Self::ModuleItemOutsideModule => 1065,
			Self::LetAsLexicalName => 1066,
			Self::IllegalUseStrict => 1067,
			Self::DuplicateConstructor => 1068,
			Self::InvalidRestElement => 1069,
			Self::InvalidCoverInitializer => 1070,
			Self::YieldInParameter => 1071,
			Self::AwaitOutsideAsync => 1072,
			Self::InvalidForInit => 1073,
		}
	}


	/// The HRESULT style value reported to hosts.
	pub fn hresult(&self) -> u32 {
		match self {
			Self::OutOfMemory => 0x8007_000E,
			code => 0x800A_0000 | code.number(),
		}
	}
}


/// A compile error: the first error found aborts the whole parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Error {
	pub code: ErrorCode,
	pub span: Span,
}


impl std::error::Error for Error {}


impl Error {
	pub fn new(code: ErrorCode, span: Span) -> Self {
		Self { code, span }
	}


	pub fn out_of_memory(at: u32) -> Self {
		Self::new(ErrorCode::OutOfMemory, Span::empty(at))
	}


	pub fn number(&self) -> u32 {
		self.code.number()
	}


	pub fn hresult(&self) -> u32 {
		self.code.hresult()
	}
}


impl From<lexer::Error> for Error {
	fn from(error: lexer::Error) -> Self {
		let code = match error.error {
			lexer::ErrorKind::Unexpected(_) => ErrorCode::InvalidCharacter,
			lexer::ErrorKind::UnterminatedString => ErrorCode::UnterminatedString,
			lexer::ErrorKind::UnterminatedComment => ErrorCode::UnterminatedComment,
			lexer::ErrorKind::UnterminatedTemplate => ErrorCode::UnterminatedTemplate,
			lexer::ErrorKind::UnterminatedRegex => ErrorCode::UnterminatedRegex,
			lexer::ErrorKind::InvalidEscapeSequence(_) => ErrorCode::InvalidEscape,
			lexer::ErrorKind::InvalidNumber(_) => ErrorCode::InvalidNumber,
		};

		Self::new(code, error.span)
	}
}


impl From<semantic::Error> for Error {
	fn from(error: semantic::Error) -> Self {
		let code = match error.kind {
			semantic::ErrorKind::Redeclaration { name, previous } => {
				ErrorCode::Redeclaration { name, previous }
			}
		};

		Self::new(code, error.span)
	}
}
