use std::collections::HashMap;

use super::{BlockId, FunctionId, PidRef, RefId, ScopeId, Symbol, SymbolId};
use crate::pid::Pid;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum ScopeKind {
	Global,
	Module,
	FunctionBody,
	Parameter,
	Block,
	Catch,
	With,
	Class,
}


impl ScopeKind {
	/// Scopes that receive `var` declarations.
	pub fn is_var_scope(self) -> bool {
		matches!(self, Self::Global | Self::Module | Self::FunctionBody)
	}
}


/// The binding lifecycle of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeState {
	Unopened,
	/// The construct is being parsed, declarations and references accumulate.
	Open,
	/// The terminator was scanned, references are being bound.
	Closing,
	/// References were bound and the scope was popped.
	Closed,
}


/// A lexical scope: an ordered collection of symbols.
#[derive(Debug, Clone)]
pub struct Scope {
	pub kind: ScopeKind,
	pub block_id: BlockId,
	/// The function the scope belongs to.
	pub function: FunctionId,
	/// The enclosing scope. Scopes don't own their enclosing scope, they only refer to it.
	pub parent: Option<ScopeId>,
	pub state: ScopeState,
	/// Declared symbols, in declaration order.
	pub symbols: Vec<SymbolId>,
	names: HashMap<Pid, SymbolId>,
	/// A direct eval call appears in this scope.
	pub calls_eval: bool,
	/// Some formal declared here is assigned to.
	pub writes_to_formals: bool,
}


impl Scope {
	pub fn new(kind: ScopeKind, function: FunctionId, parent: Option<ScopeId>) -> Self {
		Self {
			kind,
			block_id: BlockId::default(),
			function,
			parent,
			state: ScopeState::Unopened,
			symbols: Vec::new(),
			names: HashMap::new(),
			calls_eval: false,
			writes_to_formals: false,
		}
	}


	/// Find a symbol declared in this scope.
	pub fn get(&self, name: Pid) -> Option<SymbolId> {
		self.names.get(&name).copied()
	}


	pub(super) fn insert(&mut self, name: Pid, symbol: SymbolId) {
		self.symbols.push(symbol);
		self.names.insert(name, symbol);
	}


	/// Forget symbols starting at the given id.
	pub(super) fn forget_from(&mut self, first: SymbolId) {
		self.symbols.retain(|&symbol| symbol < first);
		self.names.retain(|_, symbol| *symbol < first);
	}


	/// Shift all contained ids, used when grafting tables.
	pub(super) fn shift(&mut self, scopes: u32, symbols: u32) {
		self.parent = self.parent.map(|parent| ScopeId(parent.0 + scopes));
		for symbol in self.symbols.iter_mut() {
			symbol.0 += symbols;
		}
		for symbol in self.names.values_mut() {
			symbol.0 += symbols;
		}
	}
}


/// The arena of scopes, symbols and reference records produced by a parse.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
	pub(super) scopes: Vec<Scope>,
	pub(super) symbols: Vec<Symbol>,
	pub(super) refs: Vec<PidRef>,
}


impl ScopeTable {
	pub fn scope(&self, id: ScopeId) -> &Scope {
		&self.scopes[id.index()]
	}


	pub fn symbol(&self, id: SymbolId) -> &Symbol {
		&self.symbols[id.index()]
	}


	pub fn reference(&self, id: RefId) -> &PidRef {
		&self.refs[id.index()]
	}


	pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
		self.scopes
			.iter()
			.enumerate()
			.map(|(index, scope)| (ScopeId::from_index(index), scope))
	}


	pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
		self.symbols
			.iter()
			.enumerate()
			.map(|(index, symbol)| (SymbolId::from_index(index), symbol))
	}


	pub fn refs(&self) -> impl Iterator<Item = (RefId, &PidRef)> {
		self.refs
			.iter()
			.enumerate()
			.map(|(index, reference)| (RefId::from_index(index), reference))
	}


	pub fn scope_count(&self) -> usize {
		self.scopes.len()
	}


	pub fn symbol_count(&self) -> usize {
		self.symbols.len()
	}


	pub fn ref_count(&self) -> usize {
		self.refs.len()
	}


	/// The symbol a reference was bound to, if any. Unbound references are global
	/// property lookups.
	pub fn resolved(&self, id: RefId) -> Option<SymbolId> {
		self.refs[id.index()].symbol
	}


	/// Resolve a name, also reporting whether a `with` scope was crossed on the way.
	pub fn lookup_with(&self, from: ScopeId, name: Pid) -> Option<(SymbolId, bool)> {
		let mut dynamic = false;
		let mut current = Some(from);

		while let Some(id) = current {
			let scope = self.scope(id);
			if let Some(symbol) = scope.get(name) {
				return Some((symbol, dynamic));
			}
			dynamic |= scope.kind == ScopeKind::With || scope.calls_eval;
			current = scope.parent;
		}

		None
	}


	/// The nearest enclosing scope of the given kind, including the scope itself.
	pub fn enclosing(&self, from: ScopeId, kind: ScopeKind) -> Option<ScopeId> {
		let mut current = Some(from);

		while let Some(id) = current {
			if self.scope(id).kind == kind {
				return Some(id);
			}
			current = self.scope(id).parent;
		}

		None
	}
}
