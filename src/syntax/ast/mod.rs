//! The parse tree. Nodes live in an arena and refer to each other by index, so that
//! speculative parses can be discarded by truncation and worker fragments can be grafted
//! by shifting indices.

pub mod fmt;
mod function;
mod module;
mod op;

use super::Span;
use crate::{
	pid::Pid,
	semantic::{BlockId, FunctionId, RefId, ScopeId, SymbolId},
};
pub use function::{DeferredBody, FncBody, FncFlags, FncNode};
pub use module::{ExportEntry, ImportEntry, ModuleRecord};
pub use op::{AssignOp, BinaryOp, UnaryOp, UpdateOp};


/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);


impl NodeId {
	/// The placeholder produced when no tree is being built.
	pub const NONE: NodeId = NodeId(u32::MAX);


	pub fn index(self) -> usize {
		self.0 as usize
	}


	pub fn is_none(self) -> bool {
		self == Self::NONE
	}
}


impl Default for NodeId {
	fn default() -> Self {
		Self::NONE
	}
}


flags! {
	pub struct NodeFlags: u16 {
		const PARENTHESIZED = 1 << 0;
		const EXPLICIT_SEMICOLON = 1 << 1;
		const AUTOMATIC_SEMICOLON = 1 << 2;
		/// Not present in the source, generated by the parser.
		const GENERATED = 1 << 3;
		/// A literal converted into a pattern after it was parsed.
		const CONVERTED = 1 << 4;
		/// A call to a function named `eval`.
		const DIRECT_EVAL = 1 << 5;
		const DECLARATION = 1 << 6;
	}
}


/// The kind of a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
	Var,
	Let,
	Const,
}


/// Keys of object literal properties, class members and object patterns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKey {
	Name(Pid),
	String(Pid),
	Number(f64),
	Computed(NodeId),
}


impl PropertyKey {
	/// The static name of the key, if it has one.
	pub fn name(&self) -> Option<Pid> {
		match self {
			Self::Name(pid) | Self::String(pid) => Some(*pid),
			_ => None,
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
	Init,
	/// `{ a }`, the value is a reference to `a`.
	Shorthand,
	Method,
	Get,
	Set,
}


/// All kinds of nodes. Expressions, patterns and statements share one sum type so that
/// literals may be converted into patterns in place.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
	// Primary expressions.
	Name { pid: Pid, reference: Option<RefId> },
	/// A declared name, in declarations, parameters and binding patterns.
	Binding { pid: Pid, symbol: SymbolId },
	Number(f64),
	String(Pid),
	Regex { pattern: Pid, flags: Pid },
	Template {
		tag: Option<NodeId>,
		/// Cooked chunks, None for chunks with invalid escapes.
		cooked: Box<[Option<Pid>]>,
		raw: Box<[Pid]>,
		substitutions: Box<[NodeId]>,
	},
	Null,
	True,
	False,
	This,
	Super,
	NewTarget,
	/// A hole in an array literal or pattern.
	Elision,

	// Operators.
	Unary { op: UnaryOp, operand: NodeId },
	Update { op: UpdateOp, prefix: bool, operand: NodeId },
	Binary { op: BinaryOp, left: NodeId, right: NodeId },
	Assign { op: AssignOp, target: NodeId, value: NodeId },
	Conditional { test: NodeId, consequent: NodeId, alternate: NodeId },
	Call { callee: NodeId, arguments: Box<[NodeId]> },
	New { callee: NodeId, arguments: Box<[NodeId]> },
	SuperCall { arguments: Box<[NodeId]> },
	ImportCall(NodeId),
	Member { object: NodeId, property: Pid },
	Index { object: NodeId, index: NodeId },
	Spread(NodeId),
	Yield { argument: Option<NodeId>, delegate: bool },
	Await(NodeId),

	// Literals.
	Array(Box<[NodeId]>),
	Object(Box<[NodeId]>),
	Property { key: PropertyKey, value: NodeId, kind: PropertyKind },
	Function(FunctionId),
	Class {
		name: Option<NodeId>,
		heritage: Option<NodeId>,
		scope: ScopeId,
		constructor: FunctionId,
		members: Box<[NodeId]>,
	},
	ClassMember { key: PropertyKey, value: NodeId, kind: PropertyKind, is_static: bool },

	// Patterns.
	ArrayPattern(Box<[NodeId]>),
	ObjectPattern(Box<[NodeId]>),
	PatternProperty { key: PropertyKey, target: NodeId, shorthand: bool },
	/// A pattern target with a default value.
	AssignPattern { target: NodeId, default: NodeId },
	Rest(NodeId),

	// Statements.
	VarDecl { kind: DeclKind, target: NodeId, init: Option<NodeId> },
	DeclList { kind: DeclKind, declarations: Box<[NodeId]> },
	Block { scope: ScopeId, statements: Box<[NodeId]> },
	Expr(NodeId),
	If { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
	For {
		scope: ScopeId,
		init: Option<NodeId>,
		test: Option<NodeId>,
		update: Option<NodeId>,
		body: NodeId,
	},
	ForIn { scope: ScopeId, of: bool, left: NodeId, right: NodeId, body: NodeId },
	While { test: NodeId, body: NodeId },
	DoWhile { body: NodeId, test: NodeId },
	Return(Option<NodeId>),
	Break(Option<Pid>),
	Continue(Option<Pid>),
	Throw(NodeId),
	Try { block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId> },
	Catch { scope: ScopeId, param: Option<NodeId>, body: NodeId },
	Switch { discriminant: NodeId, scope: ScopeId, cases: Box<[NodeId]> },
	Case { test: Option<NodeId>, body: Box<[NodeId]> },
	Labeled { label: Pid, body: NodeId },
	With { object: NodeId, scope: ScopeId, body: NodeId },
	Debugger,
	Empty,

	// Modules. The entries themselves are collected in the module record.
	ImportDecl { specifier: Pid },
	ExportDecl(NodeId),
	ExportDefault(NodeId),
	ExportNamed { from: Option<Pid> },
}


/// A node in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	pub kind: NodeKind,
	pub span: Span,
	pub flags: NodeFlags,
}


/// Offsets applied to the ids of a grafted fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Remap {
	pub nodes: u32,
	pub scopes: u32,
	pub symbols: u32,
	pub refs: u32,
	pub blocks: u32,
	/// Function ids are remapped through a table, since the root of the fragment takes the
	/// id reserved for it, while the nested ones are appended.
	pub function_base: u32,
	pub root_function: u32,
}


impl Remap {
	pub fn node(&self, id: NodeId) -> NodeId {
		if id.is_none() { id } else { NodeId(id.0 + self.nodes) }
	}


	pub fn scope(&self, id: ScopeId) -> ScopeId {
		ScopeId(id.0 + self.scopes)
	}


	pub fn symbol(&self, id: SymbolId) -> SymbolId {
		SymbolId(id.0 + self.symbols)
	}


	pub fn reference(&self, id: RefId) -> RefId {
		RefId(id.0 + self.refs)
	}


	pub fn block(&self, id: BlockId) -> BlockId {
		BlockId(id.0 + self.blocks)
	}


	/// Fragments number their functions from one, the fragment root being one. The program
	/// keeps its id.
	pub fn function(&self, id: FunctionId) -> FunctionId {
		match id.0 {
			0 => id,
			1 => FunctionId(self.root_function),
			n => FunctionId(n - 2 + self.function_base),
		}
	}
}


fn remap_list(list: &mut [NodeId], remap: &Remap) {
	for id in list.iter_mut() {
		*id = remap.node(*id);
	}
}


fn remap_option(id: &mut Option<NodeId>, remap: &Remap) {
	if let Some(id) = id {
		*id = remap.node(*id);
	}
}


fn remap_key(key: &mut PropertyKey, remap: &Remap) {
	if let PropertyKey::Computed(id) = key {
		*id = remap.node(*id);
	}
}


impl NodeKind {
	/// Shift every id contained in the node.
	pub fn remap(&mut self, remap: &Remap) {
		let node = |id: &mut NodeId| *id = remap.node(*id);

		match self {
			Self::Name { reference, .. } => {
				*reference = reference.map(|id| remap.reference(id));
			}
			Self::Binding { symbol, .. } => *symbol = remap.symbol(*symbol),
			Self::Template { tag, substitutions, .. } => {
				remap_option(tag, remap);
				remap_list(substitutions, remap);
			}

			Self::Unary { operand, .. } | Self::Update { operand, .. } => node(operand),
			Self::Binary { left: first, right: second, .. }
			| Self::Assign { target: first, value: second, .. }
			| Self::Index { object: first, index: second }
			| Self::While { test: first, body: second }
			| Self::DoWhile { body: first, test: second }
			| Self::AssignPattern { target: first, default: second } => {
				node(first);
				node(second);
			}
			Self::Conditional { test, consequent, alternate } => {
				node(test);
				node(consequent);
				node(alternate);
			}
			Self::Call { callee, arguments } | Self::New { callee, arguments } => {
				node(callee);
				remap_list(arguments, remap);
			}
			Self::SuperCall { arguments } => remap_list(arguments, remap),
			Self::Member { object: id, .. }
			| Self::ImportCall(id)
			| Self::Spread(id)
			| Self::Await(id)
			| Self::Rest(id)
			| Self::Expr(id)
			| Self::Throw(id)
			| Self::Labeled { body: id, .. }
			| Self::ExportDecl(id)
			| Self::ExportDefault(id) => node(id),
			Self::Yield { argument, .. } | Self::Return(argument) => remap_option(argument, remap),

			Self::Array(items)
			| Self::Object(items)
			| Self::ArrayPattern(items)
			| Self::ObjectPattern(items) => remap_list(items, remap),
			Self::Property { key, value, .. } | Self::ClassMember { key, value, .. } => {
				remap_key(key, remap);
				node(value);
			}
			Self::PatternProperty { key, target, .. } => {
				remap_key(key, remap);
				node(target);
			}
			Self::Function(id) => *id = remap.function(*id),
			Self::Class { name, heritage, scope, constructor, members } => {
				remap_option(name, remap);
				remap_option(heritage, remap);
				*scope = remap.scope(*scope);
				*constructor = remap.function(*constructor);
				remap_list(members, remap);
			}

			Self::VarDecl { target, init, .. } => {
				node(target);
				remap_option(init, remap);
			}
			Self::DeclList { declarations, .. } => remap_list(declarations, remap),
			Self::Block { scope, statements } => {
				*scope = remap.scope(*scope);
				remap_list(statements, remap);
			}
			Self::If { test, consequent, alternate } => {
				node(test);
				node(consequent);
				remap_option(alternate, remap);
			}
			Self::For { scope, init, test, update, body } => {
				*scope = remap.scope(*scope);
				remap_option(init, remap);
				remap_option(test, remap);
				remap_option(update, remap);
				node(body);
			}
			Self::ForIn { scope, left, right, body, .. } => {
				*scope = remap.scope(*scope);
				node(left);
				node(right);
				node(body);
			}
			Self::Try { block, handler, finalizer } => {
				node(block);
				remap_option(handler, remap);
				remap_option(finalizer, remap);
			}
			Self::Catch { scope, param, body } => {
				*scope = remap.scope(*scope);
				remap_option(param, remap);
				node(body);
			}
			Self::Switch { discriminant, scope, cases } => {
				node(discriminant);
				*scope = remap.scope(*scope);
				remap_list(cases, remap);
			}
			Self::Case { test, body } => {
				remap_option(test, remap);
				remap_list(body, remap);
			}
			Self::With { object, scope, body } => {
				node(object);
				*scope = remap.scope(*scope);
				node(body);
			}

			Self::Number(_)
			| Self::String(_)
			| Self::Regex { .. }
			| Self::Null
			| Self::True
			| Self::False
			| Self::This
			| Self::Super
			| Self::NewTarget
			| Self::Elision
			| Self::Break(_)
			| Self::Continue(_)
			| Self::Debugger
			| Self::Empty
			| Self::ImportDecl { .. }
			| Self::ExportNamed { .. } => (),
		}
	}
}


/// The node and function arenas of a parse.
#[derive(Debug, Default)]
pub struct Ast {
	nodes: Vec<Node>,
	/// Indexed by function id. Functions whose body was only syntax checked leave holes for
	/// their nested functions, filled when the body is un-deferred.
	functions: Vec<Option<FncNode>>,
}


impl Ast {
	pub fn push(&mut self, kind: NodeKind, span: Span, flags: NodeFlags) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(Node { kind, span, flags });
		id
	}


	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.index()]
	}


	pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id.index()]
	}


	pub fn kind(&self, id: NodeId) -> &NodeKind {
		&self.node(id).kind
	}


	pub fn len(&self) -> usize {
		self.nodes.len()
	}


	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}


	pub fn function(&self, id: FunctionId) -> Option<&FncNode> {
		self.functions
			.get(id.index())
			.and_then(Option::as_ref)
	}


	pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut FncNode> {
		self.functions
			.get_mut(id.index())
			.and_then(Option::as_mut)
	}


	/// Store a function node in its slot.
	pub fn set_function(&mut self, function: FncNode) {
		let index = function.id.index();
		if self.functions.len() <= index {
			self.functions.resize_with(index + 1, || None);
		}
		self.functions[index] = Some(function);
	}


	/// The number of function slots, including holes.
	pub fn function_slots(&self) -> usize {
		self.functions.len()
	}


	pub fn functions(&self) -> impl Iterator<Item = &FncNode> {
		self.functions.iter().flatten()
	}


	/// Discard the nodes and functions created after a checkpoint.
	pub fn truncate(&mut self, nodes: usize, functions: usize) {
		self.nodes.truncate(nodes);
		self.functions.truncate(functions);
	}


	/// Append the nodes and functions of a fragment parsed elsewhere.
	pub fn graft(&mut self, fragment: Ast, remap: &Remap) {
		for mut node in fragment.nodes {
			node.kind.remap(remap);
			self.nodes.push(node);
		}

		for mut function in fragment.functions.into_iter().flatten() {
			function.remap(remap);
			self.set_function(function);
		}
	}
}

