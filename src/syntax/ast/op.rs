use crate::syntax::lexer::{Keyword, Punct, TokenKind};


/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
	Plus,
	Minus,
	Not,
	BitNot,
	Typeof,
	Void,
	Delete,
}


impl UnaryOp {
	pub fn from_token(token: &TokenKind) -> Option<Self> {
		match token {
			TokenKind::Punct(Punct::Plus) => Some(Self::Plus),
			TokenKind::Punct(Punct::Minus) => Some(Self::Minus),
			TokenKind::Punct(Punct::Not) => Some(Self::Not),
			TokenKind::Punct(Punct::Tilde) => Some(Self::BitNot),
			TokenKind::Keyword(Keyword::Typeof) => Some(Self::Typeof),
			TokenKind::Keyword(Keyword::Void) => Some(Self::Void),
			TokenKind::Keyword(Keyword::Delete) => Some(Self::Delete),
			_ => None,
		}
	}


	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plus => "+",
			Self::Minus => "-",
			Self::Not => "!",
			Self::BitNot => "~",
			Self::Typeof => "typeof",
			Self::Void => "void",
			Self::Delete => "delete",
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOp {
	Increment,
	Decrement,
}


impl UpdateOp {
	pub fn from_punct(punct: Punct) -> Option<Self> {
		match punct {
			Punct::PlusPlus => Some(Self::Increment),
			Punct::MinusMinus => Some(Self::Decrement),
			_ => None,
		}
	}


	pub fn as_str(self) -> &'static str {
		match self {
			Self::Increment => "++",
			Self::Decrement => "--",
		}
	}
}


/// Binary operators, including the comma and logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
	Comma,
	Or,
	And,
	Coalesce,
	BitOr,
	BitXor,
	BitAnd,
	Eq,
	Ne,
	StrictEq,
	StrictNe,
	Lt,
	Gt,
	Le,
	Ge,
	InstanceOf,
	In,
	Shl,
	Sar,
	Shr,
	Add,
	Sub,
	Mul,
	Div,
	Mod,
	Exp,
}


impl BinaryOp {
	/// The binary operator for a token. `in` is excluded where the grammar forbids it,
	/// in the head of a for statement.
	pub fn from_token(token: &TokenKind, allow_in: bool) -> Option<Self> {
		match token {
			TokenKind::Keyword(Keyword::In) if allow_in => Some(Self::In),
			TokenKind::Keyword(Keyword::Instanceof) => Some(Self::InstanceOf),
			TokenKind::Punct(punct) => Self::from_punct(*punct),
			_ => None,
		}
	}


	pub fn from_punct(punct: Punct) -> Option<Self> {
		let op = match punct {
			Punct::Or => Self::Or,
			Punct::And => Self::And,
			Punct::Coalesce => Self::Coalesce,
			Punct::BitOr => Self::BitOr,
			Punct::BitXor => Self::BitXor,
			Punct::BitAnd => Self::BitAnd,
			Punct::Eq => Self::Eq,
			Punct::Ne => Self::Ne,
			Punct::StrictEq => Self::StrictEq,
			Punct::StrictNe => Self::StrictNe,
			Punct::Lt => Self::Lt,
			Punct::Gt => Self::Gt,
			Punct::Le => Self::Le,
			Punct::Ge => Self::Ge,
			Punct::Shl => Self::Shl,
			Punct::Sar => Self::Sar,
			Punct::Shr => Self::Shr,
			Punct::Plus => Self::Add,
			Punct::Minus => Self::Sub,
			Punct::Star => Self::Mul,
			Punct::Slash => Self::Div,
			Punct::Percent => Self::Mod,
			Punct::StarStar => Self::Exp,
			_ => return None,
		};

		Some(op)
	}


	/// Operator precedence levels. Higher binds tighter. Levels below 5 belong to the
	/// comma, yield, assignment and conditional forms, which are parsed separately.
	pub fn precedence(self) -> u8 {
		match self {
			Self::Comma => 1,
			Self::Or => 5,
			Self::And => 6,
			Self::Coalesce => 7,
			Self::BitOr => 8,
			Self::BitXor => 9,
			Self::BitAnd => 10,
			Self::Eq | Self::Ne | Self::StrictEq | Self::StrictNe => 11,
			Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::InstanceOf | Self::In => 12,
			Self::Shl | Self::Sar | Self::Shr => 13,
			Self::Add | Self::Sub => 14,
			Self::Mul | Self::Div | Self::Mod => 15,
			Self::Exp => 16,
		}
	}


	pub fn is_right_associative(self) -> bool {
		self == Self::Exp
	}


	pub fn as_str(self) -> &'static str {
		match self {
			Self::Comma => ",",
			Self::Or => "||",
			Self::And => "&&",
			Self::Coalesce => "??",
			Self::BitOr => "|",
			Self::BitXor => "^",
			Self::BitAnd => "&",
			Self::Eq => "==",
			Self::Ne => "!=",
			Self::StrictEq => "===",
			Self::StrictNe => "!==",
			Self::Lt => "<",
			Self::Gt => ">",
			Self::Le => "<=",
			Self::Ge => ">=",
			Self::InstanceOf => "instanceof",
			Self::In => "in",
			Self::Shl => "<<",
			Self::Sar => ">>",
			Self::Shr => ">>>",
			Self::Add => "+",
			Self::Sub => "-",
			Self::Mul => "*",
			Self::Div => "/",
			Self::Mod => "%",
			Self::Exp => "**",
		}
	}
}


/// Assignment operators. Compound assignments carry the underlying binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
	Assign,
	Compound(BinaryOp),
}


impl AssignOp {
	pub fn from_punct(punct: Punct) -> Option<Self> {
		let op = match punct {
			Punct::Assign => return Some(Self::Assign),
			Punct::PlusAssign => BinaryOp::Add,
			Punct::MinusAssign => BinaryOp::Sub,
			Punct::StarAssign => BinaryOp::Mul,
			Punct::SlashAssign => BinaryOp::Div,
			Punct::PercentAssign => BinaryOp::Mod,
			Punct::StarStarAssign => BinaryOp::Exp,
			Punct::ShlAssign => BinaryOp::Shl,
			Punct::SarAssign => BinaryOp::Sar,
			Punct::ShrAssign => BinaryOp::Shr,
			Punct::AndAssign => BinaryOp::BitAnd,
			Punct::OrAssign => BinaryOp::BitOr,
			Punct::XorAssign => BinaryOp::BitXor,
			_ => return None,
		};

		Some(Self::Compound(op))
	}


	pub fn as_str(self) -> &'static str {
		match self {
			Self::Assign => "=",
			Self::Compound(BinaryOp::Add) => "+=",
			Self::Compound(BinaryOp::Sub) => "-=",
			Self::Compound(BinaryOp::Mul) => "*=",
			Self::Compound(BinaryOp::Div) => "/=",
			Self::Compound(BinaryOp::Mod) => "%=",
			Self::Compound(BinaryOp::Exp) => "**=",
			Self::Compound(BinaryOp::Shl) => "<<=",
			Self::Compound(BinaryOp::Sar) => ">>=",
			Self::Compound(BinaryOp::Shr) => ">>>=",
			Self::Compound(BinaryOp::BitAnd) => "&=",
			Self::Compound(BinaryOp::BitOr) => "|=",
			Self::Compound(BinaryOp::BitXor) => "^=",
			Self::Compound(_) => "?=",
		}
	}
}
