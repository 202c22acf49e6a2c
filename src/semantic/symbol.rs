use super::ScopeId;
use crate::{pid::Pid, syntax::Span};


/// The kind of declaration that introduced a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SymbolKind {
	Variable,
	Formal,
	Function,
	Let,
	Const,
	Class,
	/// A catch parameter. Patterns forbid `var` redeclarations in the catch body, simple
	/// parameters allow them.
	CatchParam { pattern: bool },
	/// The name of a function expression, visible only inside the function.
	FunctionName,
	Import,
}


impl SymbolKind {
	/// Block scoped declarations, which can't be redeclared.
	pub fn is_lexical(self) -> bool {
		matches!(self, Self::Let | Self::Const | Self::Class | Self::Import)
	}


	/// When var-like declarations of the same name meet, the one with the highest rank
	/// determines the symbol kind.
	pub fn rank(self) -> u8 {
		match self {
			Self::Formal => 3,
			Self::Function => 2,
			Self::Variable => 1,
			_ => 0,
		}
	}
}


/// How many times a symbol is assigned after its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum AssignmentState {
	NotAssigned,
	AssignedOnce,
	AssignedMultipleTimes,
}


impl AssignmentState {
	pub fn promote(self) -> Self {
		match self {
			Self::NotAssigned => Self::AssignedOnce,
			_ => Self::AssignedMultipleTimes,
		}
	}
}


/// A declared name. There is at most one symbol per name in a scope.
#[derive(Debug, Clone)]
pub struct Symbol {
	pub name: Pid,
	pub kind: SymbolKind,
	pub scope: ScopeId,
	/// The span of the declaring identifier.
	pub span: Span,
	pub assignment: AssignmentState,
	/// Referenced from a function other than the declaring one, so the symbol must
	/// outlive the declaring function's frame.
	pub has_non_local_reference: bool,
	/// Referenced through a dynamic binding (`with`, direct `eval`).
	pub needs_scope_object: bool,
	pub used_in_ld_elem: bool,
	pub has_func_assignment: bool,
	pub module_export: bool,
	/// A var created for a function declared in a block, in sloppy mode.
	pub function_shadow: bool,
}


impl Symbol {
	pub fn new(name: Pid, kind: SymbolKind, scope: ScopeId, span: Span) -> Self {
		Self {
			name,
			kind,
			scope,
			span,
			assignment: AssignmentState::NotAssigned,
			has_non_local_reference: false,
			needs_scope_object: false,
			used_in_ld_elem: false,
			has_func_assignment: false,
			module_export: false,
			function_shadow: false,
		}
	}
}
