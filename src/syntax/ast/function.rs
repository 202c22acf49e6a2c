use super::{NodeId, Remap};
use crate::{
	pid::Pid,
	semantic::{BlockId, FunctionId, ScopeId, SymbolId},
	syntax::{stub::DeferredStub, Span},
};


flags! {
	/// Properties of a function collected while parsing it.
	pub struct FncFlags: u32 {
		const NESTED = 1 << 0;
		const DECLARATION = 1 << 1;
		const CALLS_EVAL = 1 << 2;
		const CHILD_CALLS_EVAL = 1 << 3;
		const USES_ARGUMENTS = 1 << 4;
		const HAS_HEAP_ARGUMENTS = 1 << 5;
		const STRICT = 1 << 6;
		const LAMBDA = 1 << 7;
		const GENERATOR = 1 << 8;
		const ASYNC = 1 << 9;
		const METHOD = 1 << 10;
		const ACCESSOR = 1 << 11;
		const CLASS_CONSTRUCTOR = 1 << 12;
		const BASE_CLASS_CONSTRUCTOR = 1 << 13;
		const CLASS_MEMBER = 1 << 14;
		const STATIC_MEMBER = 1 << 15;
		const GENERATED_DEFAULT = 1 << 16;
		const HAS_DEFAULT_ARGUMENTS = 1 << 17;
		const HAS_DESTRUCTURED_PARAMS = 1 << 18;
		const NON_SIMPLE_PARAMS = 1 << 19;
		const HAS_SUPER_REFERENCE = 1 << 20;
		const HAS_DIRECT_SUPER = 1 << 21;
		const HAS_WITH = 1 << 22;
		const MODULE = 1 << 23;
		const HAS_ANY_WRITE_TO_FORMALS = 1 << 24;
		const DEFAULT_MODULE_EXPORT = 1 << 25;
	}
}


/// A function body which was only syntax checked. Parsing it later restarts the scanner
/// at the opening brace and reuses the recorded numbering, so the result is identical to
/// an eager parse.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredBody {
	pub stub: DeferredStub,
	/// The block id of the body scope.
	pub block_id: BlockId,
	/// The first function id of the nested functions.
	pub next_function_id: FunctionId,
}


#[derive(Debug, Clone, PartialEq)]
pub enum FncBody {
	Parsed(Box<[NodeId]>),
	Deferred(Box<DeferredBody>),
	/// Parsed by a background item, which will be grafted when it completes.
	Pending(usize),
}


/// A function, including the program itself.
#[derive(Debug, Clone, PartialEq)]
pub struct FncNode {
	pub id: FunctionId,
	pub parent: Option<FunctionId>,
	pub name: Option<Pid>,
	/// The symbol the name was declared as, for declarations and named expressions.
	pub name_symbol: Option<SymbolId>,
	pub flags: FncFlags,
	pub span: Span,
	/// Formal parameters: bindings, patterns, defaults and rest.
	pub params: Box<[NodeId]>,
	pub param_scope: ScopeId,
	pub body_scope: Option<ScopeId>,
	pub body: FncBody,
	/// Number of functions nested in this one, at any depth.
	pub nested_count: u32,
	/// The function node referring to this function. None for the program.
	pub node: NodeId,
}


impl FncNode {
	pub fn is_deferred(&self) -> bool {
		matches!(self.body, FncBody::Deferred(_))
	}


	pub fn statements(&self) -> &[NodeId] {
		match &self.body {
			FncBody::Parsed(statements) => statements,
			_ => &[],
		}
	}


	pub(super) fn remap(&mut self, remap: &Remap) {
		self.id = remap.function(self.id);
		self.parent = self.parent.map(|parent| remap.function(parent));
		self.name_symbol = self.name_symbol.map(|symbol| remap.symbol(symbol));

		for param in self.params.iter_mut() {
			*param = remap.node(*param);
		}

		self.param_scope = remap.scope(self.param_scope);
		self.body_scope = self.body_scope.map(|scope| remap.scope(scope));
		self.node = remap.node(self.node);

		match &mut self.body {
			FncBody::Parsed(statements) => {
				for statement in statements.iter_mut() {
					*statement = remap.node(*statement);
				}
			}

			FncBody::Deferred(deferred) => {
				deferred.next_function_id = remap.function(deferred.next_function_id);
				deferred.block_id = remap.block(deferred.block_id);
			}

			FncBody::Pending(_) => (),
		}
	}
}
