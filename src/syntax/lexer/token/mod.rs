mod fmt;

use super::{SourcePos, Span};
use crate::pid::Pid;


macro_rules! keywords {
	($($variant:ident => $spelling:literal,)*) => {
		/// All reserved words. Contextual keywords (let, yield, async, await, of, get, set,
		/// static) are scanned as identifiers and recognized by the parser.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum Keyword {
			$($variant,)*
		}


		impl Keyword {
			const TABLE: &'static [(&'static str, Keyword)] = &[
				$(($spelling, Self::$variant),)*
			];


			pub fn from_bytes(word: &[u8]) -> Option<Self> {
				Self::TABLE
					.iter()
					.find(|(spelling, _)| spelling.as_bytes() == word)
					.map(|&(_, keyword)| keyword)
			}


			pub fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $spelling,)*
				}
			}
		}
	};
}


keywords! {
	Break => "break",
	Case => "case",
	Catch => "catch",
	Class => "class",
	Const => "const",
	Continue => "continue",
	Debugger => "debugger",
	Default => "default",
	Delete => "delete",
	Do => "do",
	Else => "else",
	Enum => "enum",
	Export => "export",
	Extends => "extends",
	False => "false",
	Finally => "finally",
	For => "for",
	Function => "function",
	If => "if",
	Import => "import",
	In => "in",
	Instanceof => "instanceof",
	New => "new",
	Null => "null",
	Return => "return",
	Super => "super",
	Switch => "switch",
	This => "this",
	Throw => "throw",
	True => "true",
	Try => "try",
	Typeof => "typeof",
	Var => "var",
	Void => "void",
	While => "while",
	With => "with",
}


macro_rules! punctuators {
	($($variant:ident => $spelling:literal,)*) => {
		/// Punctuators and operators.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum Punct {
			$($variant,)*
		}


		impl Punct {
			const TABLE: &'static [(&'static str, Punct)] = &[
				$(($spelling, Self::$variant),)*
			];


			/// Find the punctuator with exactly the given spelling.
			pub fn from_bytes(symbol: &[u8]) -> Option<Self> {
				Self::TABLE
					.iter()
					.find(|(spelling, _)| spelling.as_bytes() == symbol)
					.map(|&(_, punct)| punct)
			}


			/// Whether some punctuator starts with the given characters.
			pub fn is_prefix(symbol: &[u8]) -> bool {
				Self::TABLE
					.iter()
					.any(|(spelling, _)| spelling.as_bytes().starts_with(symbol))
			}


			pub fn as_str(self) -> &'static str {
				match self {
					$(Self::$variant => $spelling,)*
				}
			}
		}
	};
}


punctuators! {
	LParen => "(",
	RParen => ")",
	LBrack => "[",
	RBrack => "]",
	LCurly => "{",
	RCurly => "}",
	Semicolon => ";",
	Comma => ",",
	Dot => ".",
	Ellipsis => "...",
	Question => "?",
	Colon => ":",
	Arrow => "=>",

	Assign => "=",
	PlusAssign => "+=",
	MinusAssign => "-=",
	StarAssign => "*=",
	SlashAssign => "/=",
	PercentAssign => "%=",
	StarStarAssign => "**=",
	ShlAssign => "<<=",
	SarAssign => ">>=",
	ShrAssign => ">>>=",
	AndAssign => "&=",
	OrAssign => "|=",
	XorAssign => "^=",

	Plus => "+",
	Minus => "-",
	Star => "*",
	Slash => "/",
	Percent => "%",
	StarStar => "**",
	PlusPlus => "++",
	MinusMinus => "--",
	Shl => "<<",
	Sar => ">>",
	Shr => ">>>",

	Lt => "<",
	Gt => ">",
	Le => "<=",
	Ge => ">=",
	Eq => "==",
	Ne => "!=",
	StrictEq => "===",
	StrictNe => "!==",

	BitAnd => "&",
	BitOr => "|",
	BitXor => "^",
	Not => "!",
	Tilde => "~",
	And => "&&",
	Or => "||",
	Coalesce => "??",
}


/// Token kinds. Identifiers, string contents and regex sources are interned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
	/// An identifier, possibly a contextual keyword. `escaped` is set when the spelling
	/// contained unicode escapes, which disqualifies it from being a keyword.
	Identifier { pid: Pid, escaped: bool },
	Keyword(Keyword),
	Punct(Punct),
	Number { value: f64, legacy_octal: bool },
	/// A string literal, holding the cooked value. `octal_escape` flags legacy octal
	/// escapes, which strict mode rejects.
	String { value: Pid, octal_escape: bool },
	/// A template chunk. `tail` is set when the chunk ends the template. `cooked` is None
	/// when the chunk contains an invalid escape.
	Template { cooked: Option<Pid>, raw: Pid, tail: bool },
	Regex { pattern: Pid, flags: Pid },
	Eof,
}


impl TokenKind {
	pub fn is_punct(&self, punct: Punct) -> bool {
		matches!(self, Self::Punct(p) if *p == punct)
	}


	pub fn is_keyword(&self, keyword: Keyword) -> bool {
		matches!(self, Self::Keyword(k) if *k == keyword)
	}


	/// The pid of an identifier token, escaped or not.
	pub fn identifier(&self) -> Option<Pid> {
		match self {
			Self::Identifier { pid, .. } => Some(*pid),
			_ => None,
		}
	}
}


/// A lexical token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	pub span: Span,
	pub pos: SourcePos,
	/// Whether a line terminator appeared between the previous token and this one.
	pub newline_before: bool,
}


impl Token {
	pub fn is_punct(&self, punct: Punct) -> bool {
		self.kind.is_punct(punct)
	}


	pub fn is_keyword(&self, keyword: Keyword) -> bool {
		self.kind.is_keyword(keyword)
	}


	pub fn is_eof(&self) -> bool {
		self.kind == TokenKind::Eof
	}
}
