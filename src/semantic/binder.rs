use std::ops::Range;

use tracing::trace;

use super::{
	BlockId,
	Error,
	FunctionId,
	PidRef,
	PidRefStacks,
	RefFlags,
	RefId,
	Scope,
	ScopeId,
	ScopeKind,
	ScopeState,
	ScopeTable,
	Symbol,
	SymbolId,
	SymbolKind,
};
use crate::{pid::Pid, syntax::Span};


/// Undo records for speculative parses. Only mutations of state that existed before the
/// speculation started need to be recorded, everything created afterwards is truncated.
#[derive(Debug)]
enum Undo {
	/// A record was pushed on the stack of the given identifier.
	Pushed(Pid, RefId),
	Flags(RefId, RefFlags),
	CallsEval(ScopeId, bool),
	Kind(SymbolId, SymbolKind, bool),
	/// A record was marked discarded, and taken off its stack if the flag is set.
	Superseded(Pid, RefId, bool),
}


/// A snapshot of the binder, for rewinding speculative parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderMark {
	scopes: usize,
	symbols: usize,
	refs: usize,
	active: usize,
	next_block_id: u32,
	journal: usize,
	/// The speculation depth before the mark.
	depth: u32,
}


/// The scope stack and the per-identifier reference stacks, driven by the parser.
#[derive(Debug)]
pub struct Binder {
	table: ScopeTable,
	/// The open scopes, innermost last.
	active: Vec<ScopeId>,
	stacks: PidRefStacks,
	next_block_id: u32,
	journal: Vec<Undo>,
	/// Nesting depth of speculative parses. The journal is recorded only while positive.
	speculation: u32,
}


impl Default for Binder {
	fn default() -> Self {
		Self::new()
	}
}


impl Binder {
	pub fn new() -> Self {
		Self::resume(ScopeTable::default(), BlockId(0))
	}


	/// Resume binding on a finished table, for un-deferring functions.
	pub fn resume(table: ScopeTable, next_block_id: BlockId) -> Self {
		Self {
			table,
			active: Vec::new(),
			stacks: PidRefStacks::default(),
			next_block_id: next_block_id.0,
			journal: Vec::new(),
			speculation: 0,
		}
	}


	pub fn table(&self) -> &ScopeTable {
		&self.table
	}


	/// Finish binding. All scopes must have been closed.
	pub fn into_table(self) -> ScopeTable {
		debug_assert!(self.active.is_empty(), "binder dropped with open scopes");
		self.table
	}


	pub fn stacks(&self) -> &PidRefStacks {
		&self.stacks
	}


	pub fn next_block_id(&self) -> BlockId {
		BlockId(self.next_block_id)
	}


	pub fn set_next_block_id(&mut self, id: BlockId) {
		self.next_block_id = id.0;
	}


	/// The innermost open scope.
	pub fn current(&self) -> ScopeId {
		*self.active.last().expect("no open scope")
	}


	pub fn scope(&self, id: ScopeId) -> &Scope {
		self.table.scope(id)
	}


	pub fn symbol(&self, id: SymbolId) -> &Symbol {
		self.table.symbol(id)
	}


	pub fn reference(&self, id: RefId) -> &PidRef {
		self.table.reference(id)
	}


	/// The open scopes, outermost first.
	pub fn active(&self) -> &[ScopeId] {
		&self.active
	}


	// Scope stack:

	/// Open a new scope nested in the current one.
	pub fn start_parse_block(&mut self, kind: ScopeKind, function: FunctionId) -> ScopeId {
		let id = ScopeId::from_index(self.table.scopes.len());
		let mut scope = Scope::new(kind, function, self.active.last().copied());

		debug_assert_eq!(scope.state, ScopeState::Unopened);
		scope.block_id = BlockId(self.next_block_id);
		scope.state = ScopeState::Open;
		self.next_block_id += 1;

		trace!(scope = id.0, block = scope.block_id.0, ?kind, "open scope");

		self.table.scopes.push(scope);
		self.active.push(id);

		id
	}


	/// Open a `with` scope. When it finishes, every reference still unresolved inside it
	/// is marked as a dynamic binding.
	pub fn push_dynamic_block(&mut self, function: FunctionId) -> ScopeId {
		self.start_parse_block(ScopeKind::With, function)
	}


	/// Bind the references of the innermost scope and pop it. Finishing a scope twice is a
	/// programming error.
	pub fn finish_parse_block(&mut self, id: ScopeId) {
		let state = self.table.scope(id).state;
		assert_eq!(state, ScopeState::Open, "scope {} finished while {:?}", id, state);
		assert_eq!(self.active.last(), Some(&id), "scope {} is not the innermost", id);

		self.table.scopes[id.index()].state = ScopeState::Closing;

		self.bind_pid_refs(id, BlockId::MAX);

		let scope = self.table.scope(id);
		if scope.kind == ScopeKind::With {
			self.mark_dynamic(scope.block_id);
		}

		self.table.scopes[id.index()].state = ScopeState::Closed;
		self.active.pop();

		trace!(scope = id.0, "close scope");
	}


	/// Make a closed scope the innermost one again, without reopening it. Used to parse
	/// the body of a deferred function within its parameter scope.
	pub fn reenter(&mut self, id: ScopeId) {
		debug_assert_eq!(self.table.scope(id).state, ScopeState::Closed);
		self.active.push(id);
	}


	/// Undo `reenter`.
	pub fn leave(&mut self, id: ScopeId) {
		let popped = self.active.pop();
		debug_assert_eq!(popped, Some(id));
	}


	fn mark_dynamic(&mut self, block_id: BlockId) {
		let live: Vec<RefId> = self.stacks
			.live()
			.map(|(_, reference)| reference)
			.filter(|reference| self.table.refs[reference.index()].block_id >= block_id)
			.collect();

		for reference in live {
			self.flag_ref(reference, RefFlags::DYNAMIC);
		}
	}


	/// Record that the current scope contains a direct eval call.
	pub fn set_calls_eval(&mut self) {
		let current = self.current();
		let scope = &mut self.table.scopes[current.index()];
		if self.speculation > 0 {
			self.journal.push(Undo::CallsEval(current, scope.calls_eval));
		}
		scope.calls_eval = true;
	}


	// References:

	/// Record a reference to an identifier in the current block.
	pub fn push_pid_ref(&mut self, pid: Pid, function: FunctionId, flags: RefFlags) -> RefId {
		let block_id = self.table.scope(self.current()).block_id;
		let new = RefId::from_index(self.table.refs.len());

		let (reference, inserted) = self.stacks.find_or_add(pid, block_id, &self.table.refs, new);

		if inserted {
			self.table.refs.push(
				PidRef { pid, block_id, function, flags, symbol: None, discarded: false }
			);
			if self.speculation > 0 {
				self.journal.push(Undo::Pushed(pid, reference));
			}
		} else {
			self.flag_ref(reference, flags);
		}

		reference
	}


	/// Add flags to a reference record.
	pub fn flag_ref(&mut self, reference: RefId, flags: RefFlags) {
		let record = &mut self.table.refs[reference.index()];

		if record.flags.contains(flags) {
			return;
		}

		if self.speculation > 0 {
			self.journal.push(Undo::Flags(reference, record.flags));
		}

		record.flags.insert(flags);
	}


	/// Bind the references to all symbols declared in a scope, skipping records of blocks
	/// after `max_block_id`.
	pub fn bind_pid_refs(&mut self, id: ScopeId, max_block_id: BlockId) {
		let scope = self.table.scope(id);
		let block_id = scope.block_id;
		let calls_eval = scope.calls_eval;
		let symbols = scope.symbols.clone();

		for symbol in symbols {
			let name = self.table.symbol(symbol).name;
			self.bind_pid_refs_in_scope(name, symbol, block_id, max_block_id);

			if calls_eval {
				self.table.symbols[symbol.index()].needs_scope_object = true;
			}
		}
	}


	/// Bind the records of an identifier, from the top of its stack down to the record of
	/// the given block, to a symbol. Records of blocks after `max_block_id` are skipped.
	/// Bound records are removed from the stack.
	pub fn bind_pid_refs_in_scope(
		&mut self,
		pid: Pid,
		symbol: SymbolId,
		block_id: BlockId,
		max_block_id: BlockId,
	) {
		let declaring_scope = self.table.symbol(symbol).scope;
		let function = self.table.scope(declaring_scope).function;
		let global = self.table.scope(declaring_scope).kind == ScopeKind::Global;

		let stack = match self.stacks.stack_mut(pid) {
			Some(stack) => stack,
			None => return,
		};

		let mut writes_to_formals = false;
		let mut position = stack.len();

		while position > 0 {
			let reference = stack[position - 1];
			let record = &mut self.table.refs[reference.index()];

			if record.block_id < block_id {
				break;
			}

			position -= 1;

			if record.block_id > max_block_id {
				continue;
			}

			debug_assert!(record.symbol.is_none() || record.symbol == Some(symbol));
			record.symbol = Some(symbol);
			stack.remove(position);

			let flags = record.flags;
			let record_function = record.function;
			let record_block = record.block_id;
			let target = &mut self.table.symbols[symbol.index()];

			if flags.contains(RefFlags::USED_IN_LD_ELEM) {
				target.used_in_ld_elem = true;
			}

			if flags.contains(RefFlags::ASSIGNMENT) {
				target.assignment = target.assignment.promote();
				writes_to_formals |= target.kind == SymbolKind::Formal;
			}

			if flags.contains(RefFlags::REASSIGNMENT) {
				target.assignment = target.assignment.promote();
			}

			if record_function != function && !global && !target.module_export {
				target.has_non_local_reference = true;
			}

			if flags.contains(RefFlags::DYNAMIC) {
				target.needs_scope_object = true;
			}

			if flags.contains(RefFlags::FUNC_ASSIGNMENT) {
				target.has_func_assignment = true;
			}

			if flags.contains(RefFlags::MODULE_EXPORT) {
				target.module_export = true;
			}

			if record_block == block_id {
				break;
			}
		}

		if stack.is_empty() {
			self.stacks.remove(pid, RefId(u32::MAX));
		}

		if writes_to_formals {
			self.table.scopes[declaring_scope.index()].writes_to_formals = true;
		}
	}


	/// Resolve every record created from `first` onwards which is still unbound by looking
	/// the name up from the given scope. Used when a function body is parsed again after
	/// its enclosing scopes were closed. The syntax check of the body already applied the
	/// effects of these references to the symbols found, so only the records change.
	pub fn resolve_free_refs(&mut self, first: RefId, from: ScopeId) {
		let free: Vec<(Pid, RefId)> = self.stacks
			.live()
			.filter(|&(_, reference)| reference >= first)
			.collect();

		for (pid, reference) in free {
			self.stacks.remove(pid, reference);
			self.resolve_ref(reference, from, false);
		}
	}


	/// Resolve records that are not on any stack, such as the free references of a grafted
	/// fragment.
	pub fn bind_free_refs(&mut self, refs: &[RefId], from: ScopeId) {
		for &reference in refs {
			self.resolve_ref(reference, from, true);
		}
	}


	fn resolve_ref(&mut self, reference: RefId, from: ScopeId, effects: bool) {
		let pid = self.table.refs[reference.index()].pid;

		if let Some((symbol, dynamic)) = self.table.lookup_with(from, pid) {
			let function = self.table.scope(self.table.symbol(symbol).scope).function;
			let global = self.table.scope(self.table.symbol(symbol).scope).kind == ScopeKind::Global;
			let record = &mut self.table.refs[reference.index()];
			record.symbol = Some(symbol);
			if dynamic {
				record.flags.insert(RefFlags::DYNAMIC);
			}
			let (flags, record_function) = (record.flags, record.function);

			if !effects {
				return;
			}

			let target = &mut self.table.symbols[symbol.index()];
			if record_function != function && !global {
				target.has_non_local_reference = true;
			}
			if dynamic {
				target.needs_scope_object = true;
			}
			if flags.contains(RefFlags::ASSIGNMENT) {
				target.assignment = target.assignment.promote();
			}
			if flags.contains(RefFlags::REASSIGNMENT) {
				target.assignment = target.assignment.promote();
			}
		}
	}


	// Declarations:

	/// Declare a name in the appropriate scope, applying the redeclaration policy:
	/// - lexical declarations can't redeclare anything in the same scope, except for the
	///   var shadow of a block function;
	/// - var declarations can't cross a lexical declaration of the same name on the way
	///   to their function scope;
	/// - var-like declarations merge, the symbol kind is decided by rank.
	pub fn add_decl_for_pid(
		&mut self,
		pid: Pid,
		kind: SymbolKind,
		span: Span,
		strict: bool,
	) -> Result<SymbolId, Error> {
		let current = self.current();
		let current_kind = self.table.scope(current).kind;

		match kind {
			SymbolKind::Variable => self.declare_var(pid, kind, span, false),

			SymbolKind::Function if current_kind.is_var_scope() => {
				self.declare_var(pid, kind, span, false)
			}

			SymbolKind::Function => {
				let symbol = self.declare_lexical(pid, kind, span, strict)?;
				if !strict {
					// The block function is also visible as a var in the function scope, as
					// long as no lexical declaration gets in the way.
					let _ = self.declare_var(pid, SymbolKind::Variable, span, true);
				}
				Ok(symbol)
			}

			// Duplicate formals share a symbol, the parser decides whether they are allowed.
			SymbolKind::Formal | SymbolKind::FunctionName => match self.table.scope(current).get(pid) {
				Some(existing) => {
					// Parameters shadow the name of a function expression.
					if kind == SymbolKind::Formal
						&& self.table.symbol(existing).kind == SymbolKind::FunctionName
					{
						self.set_kind(existing, kind, false);
						self.table.symbols[existing.index()].span = span;
					}
					Ok(existing)
				}
				None => Ok(self.new_symbol(current, pid, kind, span)),
			},

			_ => self.declare_lexical(pid, kind, span, strict),
		}
	}


	fn declare_lexical(
		&mut self,
		pid: Pid,
		kind: SymbolKind,
		span: Span,
		strict: bool,
	) -> Result<SymbolId, Error> {
		let current = self.current();
		let scope = self.table.scope(current);

		if let Some(existing) = scope.get(pid) {
			let previous = self.table.symbol(existing);

			if previous.function_shadow {
				self.set_kind(existing, kind, false);
				self.table.symbols[existing.index()].span = span;
				return Ok(existing);
			}

			let sloppy_block_functions = !strict
				&& scope.kind == ScopeKind::Block
				&& kind == SymbolKind::Function
				&& previous.kind == SymbolKind::Function;

			if sloppy_block_functions {
				return Ok(existing);
			}

			return Err(Error::redeclaration(pid, previous.span, span));
		}

		// Lexical declarations in a function body can't shadow formals, and the ones in a
		// catch block can't shadow the catch parameter.
		if let Some(parent) = scope.parent {
			let parent_scope = self.table.scope(parent);
			let shadowing = match (scope.kind, parent_scope.kind) {
				(ScopeKind::FunctionBody, ScopeKind::Parameter) => parent_scope
					.get(pid)
					.filter(|&symbol| self.table.symbol(symbol).kind == SymbolKind::Formal),
				(ScopeKind::Block, ScopeKind::Catch) => parent_scope.get(pid),
				_ => None,
			};

			if let Some(previous) = shadowing {
				return Err(Error::redeclaration(pid, self.table.symbol(previous).span, span));
			}
		}

		Ok(self.new_symbol(current, pid, kind, span))
	}


	fn declare_var(
		&mut self,
		pid: Pid,
		kind: SymbolKind,
		span: Span,
		shadow: bool,
	) -> Result<SymbolId, Error> {
		let mut target = None;

		// The var shadow of a block function starts above the block declaring it.
		let skip = if shadow { 1 } else { 0 };

		for &id in self.active.iter().rev().skip(skip) {
			let scope = self.table.scope(id);

			if let Some(existing) = scope.get(pid) {
				let previous = self.table.symbol(existing);
				let allowed = match previous.kind {
					SymbolKind::CatchParam { pattern } => !pattern,
					other => !other.is_lexical() && !(other == SymbolKind::Function && !scope.kind.is_var_scope()),
				};

				if scope.kind.is_var_scope() {
					if previous.kind.is_lexical() {
						return Err(Error::redeclaration(pid, previous.span, span));
					}
				} else if !allowed {
					return Err(Error::redeclaration(pid, previous.span, span));
				}
			}

			if scope.kind.is_var_scope() {
				target = Some(id);
				break;
			}
		}

		let target = target.expect("no var scope open");
		let scope = self.table.scope(target);

		// Formals win over var declarations in the body.
		if scope.kind == ScopeKind::FunctionBody {
			let formal = scope.parent
				.map(|parent| self.table.scope(parent))
				.filter(|parent| parent.kind == ScopeKind::Parameter)
				.and_then(|parent| parent.get(pid))
				.filter(|&symbol| self.table.symbol(symbol).kind == SymbolKind::Formal);

			if let Some(formal) = formal {
				return Ok(formal);
			}
		}

		match scope.get(pid) {
			Some(existing) => {
				let previous = self.table.symbol(existing);
				if shadow {
					return Ok(existing);
				}

				if kind.rank() > previous.kind.rank() || previous.function_shadow {
					let kind = if kind.rank() >= previous.kind.rank() { kind } else { previous.kind };
					self.set_kind(existing, kind, false);
				}

				Ok(existing)
			}

			None => {
				let symbol = self.new_symbol(target, pid, kind, span);
				self.table.symbols[symbol.index()].function_shadow = shadow;
				Ok(symbol)
			}
		}
	}


	fn set_kind(&mut self, symbol: SymbolId, kind: SymbolKind, shadow: bool) {
		let target = &mut self.table.symbols[symbol.index()];
		if self.speculation > 0 {
			self.journal.push(Undo::Kind(symbol, target.kind, target.function_shadow));
		}
		target.kind = kind;
		target.function_shadow = shadow;
	}


	fn new_symbol(&mut self, scope: ScopeId, pid: Pid, kind: SymbolKind, span: Span) -> SymbolId {
		let id = SymbolId::from_index(self.table.symbols.len());
		self.table.symbols.push(Symbol::new(pid, kind, scope, span));
		self.table.scopes[scope.index()].insert(pid, id);

		trace!(symbol = id.0, scope = scope.0, ?kind, "declare");

		id
	}


	// Speculation:

	/// Whether a speculative region is active.
	pub fn is_speculating(&self) -> bool {
		self.speculation > 0
	}


	/// Start a speculative region. Everything done until the matching `rollback` or
	/// `commit` can be undone.
	pub fn mark(&mut self) -> BinderMark {
		let depth = self.speculation;
		self.speculation += 1;

		BinderMark {
			scopes: self.table.scopes.len(),
			symbols: self.table.symbols.len(),
			refs: self.table.refs.len(),
			active: self.active.len(),
			next_block_id: self.next_block_id,
			journal: self.journal.len(),
			depth,
		}
	}


	/// Undo everything since the mark.
	pub fn rollback(&mut self, mark: BinderMark) {
		debug_assert!(self.speculation > 0);

		while self.journal.len() > mark.journal {
			match self.journal.pop() {
				Some(Undo::Pushed(pid, reference)) => self.stacks.remove(pid, reference),

				Some(Undo::Flags(reference, flags)) => {
					if let Some(record) = self.table.refs.get_mut(reference.index()) {
						record.flags = flags;
					}
				}

				Some(Undo::CallsEval(scope, calls_eval)) => {
					if let Some(scope) = self.table.scopes.get_mut(scope.index()) {
						scope.calls_eval = calls_eval;
					}
				}

				Some(Undo::Kind(symbol, kind, shadow)) => {
					if let Some(symbol) = self.table.symbols.get_mut(symbol.index()) {
						symbol.kind = kind;
						symbol.function_shadow = shadow;
					}
				}

				Some(Undo::Superseded(pid, reference, live)) => {
					if let Some(record) = self.table.refs.get_mut(reference.index()) {
						record.discarded = false;
					}
					if live {
						self.stacks.restore(pid, reference, &self.table.refs);
					}
				}

				None => break,
			}
		}

		self.stacks.forget_from(RefId::from_index(mark.refs));
		self.table.refs.truncate(mark.refs);

		let first_symbol = SymbolId::from_index(mark.symbols);
		self.table.symbols.truncate(mark.symbols);
		self.table.scopes.truncate(mark.scopes);
		self.active.truncate(mark.active);
		for &scope in self.active.iter() {
			self.table.scopes[scope.index()].forget_from(first_symbol);
		}

		self.next_block_id = mark.next_block_id;
		// Marks taken after this one may have been abandoned by a failed parse.
		self.speculation = mark.depth;

		trace!(refs = mark.refs, scopes = mark.scopes, "binder rollback");
	}


	/// Keep everything since the mark.
	pub fn commit(&mut self, mark: BinderMark) {
		debug_assert!(self.speculation > mark.depth);
		self.speculation = mark.depth;
		if self.speculation == 0 {
			self.journal.clear();
		}
	}


	// Deferral:

	/// Discard the scopes and symbols of a function body which was only syntax checked.
	/// Records created from `first_ref` onwards that were bound to discarded symbols are
	/// unbound and marked discarded, records still on the stacks are kept for the
	/// enclosing scopes.
	pub fn discard_body(&mut self, scopes: usize, symbols: usize, first_ref: RefId) {
		debug_assert!(
			self.active
				.iter()
				.all(|scope| scope.index() < scopes),
			"discarding an open scope"
		);

		let first_symbol = SymbolId::from_index(symbols);
		for record in self.table.refs[first_ref.index() ..].iter_mut() {
			if record.symbol.map_or(false, |symbol| symbol >= first_symbol) {
				record.symbol = None;
				record.discarded = true;
			}
		}

		self.table.scopes.truncate(scopes);
		self.table.symbols.truncate(symbols);
		for scope in self.table.scopes.iter_mut() {
			if scope.symbols.last().map_or(false, |&symbol| symbol >= first_symbol) {
				scope.forget_from(first_symbol);
			}
		}
	}


	/// Mark discarded the records of the given blocks, which a body being parsed again
	/// is about to replace. The body reuses the block ids of its syntax check, so records
	/// of the check left on the stacks are taken off first.
	pub fn supersede(&mut self, blocks: Range<u32>) {
		let mut count = 0;

		for index in 0 .. self.table.refs.len() {
			let record = &mut self.table.refs[index];
			if record.discarded || !blocks.contains(&record.block_id.0) {
				continue;
			}

			record.discarded = true;
			count += 1;

			let pid = record.pid;
			let reference = RefId::from_index(index);
			let live = self.stacks.stack(pid).contains(&reference);
			if live {
				self.stacks.remove(pid, reference);
			}

			if self.speculation > 0 {
				self.journal.push(Undo::Superseded(pid, reference, live));
			}
		}

		trace!(count, "superseded reference records");
	}


	// Grafting:

	/// Append the scopes, symbols and records of another table, shifting their ids. Root
	/// scopes of the other table are nested in `parent`, block ids are shifted by `blocks`
	/// and function ids are mapped through `function`. Returns the offsets applied to
	/// scope, symbol and record ids.
	pub fn graft<F>(
		&mut self,
		mut other: ScopeTable,
		parent: ScopeId,
		blocks: u32,
		function: F,
	) -> (u32, u32, u32)
	where
		F: Fn(FunctionId) -> FunctionId,
	{
		let scopes = self.table.scopes.len() as u32;
		let symbols = self.table.symbols.len() as u32;
		let refs = self.table.refs.len() as u32;

		for scope in other.scopes.iter_mut() {
			let root = scope.parent.is_none();
			scope.shift(scopes, symbols);
			if root {
				scope.parent = Some(parent);
			}
			scope.block_id = BlockId(scope.block_id.0 + blocks);
			scope.function = function(scope.function);
		}

		for symbol in other.symbols.iter_mut() {
			symbol.scope = ScopeId(symbol.scope.0 + scopes);
		}

		for record in other.refs.iter_mut() {
			record.symbol = record.symbol.map(|symbol| SymbolId(symbol.0 + symbols));
			record.block_id = BlockId(record.block_id.0 + blocks);
			record.function = function(record.function);
		}

		self.table.scopes.append(&mut other.scopes);
		self.table.symbols.append(&mut other.symbols);
		self.table.refs.append(&mut other.refs);

		(scopes, symbols, refs)
	}
}
