//! The recursive descent parser.
//!
//! Expressions are parsed by precedence climbing and statements by a dispatch on the
//! first token. Every grammar function is generic over a `BuildMode`, so that the exact
//! same traversal either builds the tree or only checks the syntax. Ambiguous constructs
//! (arrow functions, destructuring assignments) are parsed speculatively and rewound to a
//! checkpoint when the guess turns out wrong.

mod checkpoint;
mod class;
mod defer;
mod error;
mod expr;
mod fast_scan;
mod function;
mod mode;
mod module;
mod pattern;
mod stmt;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::debug;

use super::{
	ast::{Ast, FncBody, FncFlags, FncNode, ModuleRecord, NodeFlags, NodeId, NodeKind},
	background::{Coordinator, Fragment, Item},
	config::{BackgroundMode, Options},
	lexer::{Goal, Keyword, Punct, RestorePoint, Scanner, Token, TokenKind},
	stub::DeferredStub,
	Span,
};
use crate::{
	pid::{Names, Pid, SharedInterner},
	semantic::{Binder, BlockId, FunctionId, RefFlags, RefId, ScopeId, ScopeKind, ScopeTable, SymbolId, SymbolKind},
};
use checkpoint::Checkpoint;
use defer::Replay;
pub use error::{Error, ErrorCode};
pub use fast_scan::fast_scan_formals_and_body;
pub use mode::{AstMode, BuildMode, SyntaxMode};


/// The state of the function being parsed. It is saved when entering a nested function
/// and restored when leaving it.
#[derive(Debug, Clone, Copy)]
pub(super) struct Context {
	pub function: FunctionId,
	pub flags: FncFlags,
	pub strict: bool,
	/// `return` is allowed.
	pub in_function: bool,
	/// `yield` is a keyword.
	pub generator: bool,
	/// `await` is a keyword.
	pub is_async: bool,
	/// Parsing formal parameters, where yield and await expressions are forbidden.
	pub in_params: bool,
	pub super_property: bool,
	pub super_call: bool,
	pub new_target: bool,
	/// The first label of the function in the label stack.
	pub labels: usize,
	/// Enclosing statements `break` may target.
	pub breakable: u32,
	/// Enclosing loops.
	pub iteration: u32,
}


impl Context {
	fn program(strict: bool, module: bool) -> Self {
		let mut flags = FncFlags::empty();
		flags.set(FncFlags::STRICT, strict);
		flags.set(FncFlags::MODULE, module);

		Self {
			function: FunctionId::PROGRAM,
			flags,
			strict,
			in_function: false,
			generator: false,
			is_async: false,
			in_params: false,
			super_property: false,
			super_call: false,
			new_target: false,
			labels: 0,
			breakable: 0,
			iteration: 0,
		}
	}
}


#[derive(Debug, Clone, Copy)]
struct Label {
	name: Pid,
	is_loop: bool,
	/// The statement the label applies to wasn't parsed yet.
	pending: bool,
}


/// The outcome of parsing a whole program.
#[derive(Debug)]
pub struct Output {
	pub ast: Ast,
	pub scopes: ScopeTable,
	pub module: Option<ModuleRecord>,
	pub next_block_id: BlockId,
}


/// A recursive descent parser over one source text.
pub struct Parser<'a> {
	scanner: Scanner<'a>,
	/// The current token, scanned with the division goal.
	token: Token,
	/// The end offset of the previous token.
	prev_end: u32,
	names: Names,
	options: &'a Options,
	ast: Ast,
	binder: Binder,
	module: Option<ModuleRecord>,
	context: Context,
	labels: Vec<Label>,
	next_function_id: u32,
	/// Stubs of the functions parsed in syntax only mode, one frame per syntax only body.
	stubs: Vec<Vec<DeferredStub>>,
	/// Stubs reused while un-deferring a function.
	replay: Vec<Replay>,
	/// Names bound by the declaration being exported.
	bound_names: Option<Vec<(Pid, SymbolId, Span)>>,
	background: Option<Coordinator>,
}


impl<'a> std::fmt::Debug for Parser<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("Parser")
			.field("token", &self.token)
			.field("function", &self.context.function)
			.finish()
	}
}


impl<'a> Parser<'a> {
	/// Create a parser for the given text. No token is scanned yet.
	pub fn new(input: &'a [u8], interner: SharedInterner, options: &'a Options) -> Self {
		let names = Names::new(&mut interner.lock());
		let strict = options.strict || options.is_module();

		Self {
			scanner: Scanner::new(input, interner),
			token: Token {
				kind: TokenKind::Eof,
				span: Span::empty(0),
				pos: Default::default(),
				newline_before: false,
			},
			prev_end: 0,
			names,
			options,
			ast: Ast::default(),
			binder: Binder::new(),
			module: None,
			context: Context::program(strict, options.is_module()),
			labels: Vec::new(),
			next_function_id: 1,
			stubs: Vec::new(),
			replay: Vec::new(),
			bound_names: None,
			background: None,
		}
	}


	/// Parse a whole program or module. Background items are drained and merged before
	/// returning, even when the main parse fails.
	pub fn parse_program(mut self, text: Arc<[u8]>) -> Result<Output, Error> {
		let module = self.options.is_module();

		self.background = match self.options.background {
			BackgroundMode::Disabled => None,
			mode => Some(
				Coordinator::new(mode, text, self.scanner.interner().clone(), self.options.clone())
			),
		};

		let result = self.parse_program_body(module);

		let mut background = match self.background.take() {
			Some(background) => background,
			None => return result.map(|()| self.into_output()),
		};

		background.run_pending_inline();
		let fragments = background.wait_all();

		// Main thread errors come first in source order.
		result?;

		let fragments = fragments?;
		for (item, fragment) in fragments {
			self.merge(&item, fragment);
		}

		let nested_count = self.next_function_id - 1;
		if let Some(program) = self.ast.function_mut(FunctionId::PROGRAM) {
			program.nested_count = nested_count;
		}

		Ok(self.into_output())
	}


	fn parse_program_body(&mut self, module: bool) -> Result<(), Error> {
		if module {
			self.module = Some(ModuleRecord::default());
		}

		let kind = if module { ScopeKind::Module } else { ScopeKind::Global };
		let scope = self.binder.start_parse_block(kind, FunctionId::PROGRAM);

		self.step()?;
		let statements = self.parse_statement_list::<AstMode>(true, None)?;
		if !self.token.is_eof() {
			return Err(self.unexpected());
		}

		self.binder.finish_parse_block(scope);

		let program = FncNode {
			id: FunctionId::PROGRAM,
			parent: None,
			name: None,
			name_symbol: None,
			flags: self.context.flags,
			span: Span::new(0, self.scanner.input().len() as u32),
			params: Box::default(),
			param_scope: scope,
			body_scope: None,
			body: FncBody::Parsed(statements.into_boxed_slice()),
			nested_count: self.next_function_id - 1,
			node: NodeId::NONE,
		};
		self.ast.set_function(program);

		debug!(
			nodes = self.ast.len(),
			functions = self.next_function_id,
			scopes = self.binder.table().scope_count(),
			"parsed program"
		);

		Ok(())
	}


	/// Finish parsing, releasing the tree and the scopes.
	pub fn into_output(self) -> Output {
		let next_block_id = self.binder.next_block_id();

		Output {
			ast: self.ast,
			scopes: self.binder.into_table(),
			module: self.module,
			next_block_id,
		}
	}


	// Tokens:

	/// Scan the next token.
	fn step(&mut self) -> Result<(), Error> {
		self.prev_end = self.token.span.ich_lim;
		self.token = self.scanner.scan(Goal::Div)?;
		Ok(())
	}


	/// Scan the token following the current one, without consuming anything.
	fn peek(&mut self) -> Result<Token, Error> {
		let point = self.scanner.capture();
		let token = self.scanner.scan(Goal::Div);
		self.scanner.seek_to(point);
		Ok(token?)
	}


	/// Rescan the current `/` or `/=` token as a regular expression literal.
	fn rescan_regex(&mut self) -> Result<(), Error> {
		let newline_before = self.token.newline_before;
		self.scanner.seek_to(self.token_start());
		self.token = self.scanner.scan(Goal::RegExp)?;
		self.token.newline_before = newline_before;
		Ok(())
	}


	/// Rescan the current `}` token as the continuation of a template literal.
	fn rescan_template(&mut self) -> Result<(), Error> {
		self.scanner.seek_to(self.token_start());
		self.token = self.scanner.scan_template_continuation()?;
		Ok(())
	}


	/// A restore point at the start of the current token.
	fn token_start(&self) -> RestorePoint {
		RestorePoint { offset: self.token.span.ich_min, pos: self.token.pos }
	}


	/// Consume the given punctuator, if present.
	fn eat(&mut self, punct: Punct) -> Result<bool, Error> {
		if self.token.is_punct(punct) {
			self.step()?;
			Ok(true)
		} else {
			Ok(false)
		}
	}


	/// Consume the given punctuator, or fail with the given code.
	fn expect(&mut self, punct: Punct, code: ErrorCode) -> Result<Span, Error> {
		if self.token.is_punct(punct) {
			let span = self.token.span;
			self.step()?;
			Ok(span)
		} else {
			Err(self.error(code))
		}
	}


	fn expect_keyword(&mut self, keyword: Keyword, code: ErrorCode) -> Result<Span, Error> {
		if self.token.is_keyword(keyword) {
			let span = self.token.span;
			self.step()?;
			Ok(span)
		} else {
			Err(self.error(code))
		}
	}


	/// Whether the current token is the given contextual keyword, spelled without escapes.
	fn at_contextual(&self, pid: Pid) -> bool {
		matches!(self.token.kind, TokenKind::Identifier { pid: p, escaped: false } if p == pid)
	}


	/// Consume a statement terminator, inserting one where the rules allow it.
	fn consume_semicolon<M: BuildMode>(&mut self, node: NodeId) -> Result<(), Error> {
		let flag = if self.token.is_punct(Punct::Semicolon) {
			self.step()?;
			NodeFlags::EXPLICIT_SEMICOLON
		} else if self.token.is_punct(Punct::RCurly)
			|| self.token.is_eof()
			|| self.token.newline_before
		{
			NodeFlags::AUTOMATIC_SEMICOLON
		} else {
			return Err(self.error(ErrorCode::ExpectedSemicolon));
		};

		if M::BUILD_AST && !node.is_none() {
			self.ast.node_mut(node).flags.insert(flag);
		}

		Ok(())
	}


	// Errors:

	fn error(&self, code: ErrorCode) -> Error {
		Error::new(code, self.token.span)
	}


	/// The error for an unexpected token.
	fn unexpected(&self) -> Error {
		self.error(ErrorCode::Syntax)
	}


	// Nodes:

	/// Allocate a node when building the tree.
	fn make<M: BuildMode>(&mut self, kind: NodeKind, span: Span) -> Result<NodeId, Error> {
		self.make_flagged::<M>(kind, span, NodeFlags::empty())
	}


	fn make_flagged<M: BuildMode>(
		&mut self,
		kind: NodeKind,
		span: Span,
		flags: NodeFlags,
	) -> Result<NodeId, Error> {
		if !M::BUILD_AST {
			return Ok(NodeId::NONE);
		}

		if self.ast.len() >= NodeId::NONE.index() {
			return Err(Error::out_of_memory(span.ich_min));
		}

		Ok(self.ast.push(kind, span, flags))
	}


	/// The span from the given offset to the end of the previous token.
	fn span_from(&self, start: u32) -> Span {
		Span::new(start, self.prev_end.max(start))
	}


	// Functions and bindings:

	fn next_function(&mut self) -> FunctionId {
		let id = FunctionId(self.next_function_id);
		self.next_function_id += 1;
		id
	}


	/// Record a reference to a name in the current block.
	fn reference(&mut self, pid: Pid, flags: RefFlags) -> RefId {
		if pid == self.names.arguments {
			self.context.flags.insert(FncFlags::USES_ARGUMENTS);
		}

		self.binder.push_pid_ref(pid, self.context.function, flags)
	}


	/// Declare a name in the current scope.
	fn declare(&mut self, pid: Pid, kind: SymbolKind, span: Span) -> Result<SymbolId, Error> {
		let symbol = self.binder.add_decl_for_pid(pid, kind, span, self.context.strict)?;

		if let Some(names) = self.bound_names.as_mut() {
			names.push((pid, symbol, span));
		}

		Ok(symbol)
	}


	/// Validate a name about to be bound.
	fn check_binding_name(&self, pid: Pid, span: Span, escaped: bool) -> Result<(), Error> {
		if escaped {
			let reserved = self.scanner
				.interner()
				.lock()
				.resolve(pid)
				.and_then(Keyword::from_bytes)
				.is_some();

			if reserved {
				return Err(Error::new(ErrorCode::KeywordAsIdentifier, span));
			}
		}

		self.check_strict_name(pid, span, self.context.strict)?;

		if self.context.generator && pid == self.names.yield_ {
			return Err(Error::new(ErrorCode::KeywordAsIdentifier, span));
		}

		if (self.context.is_async || self.options.is_module()) && pid == self.names.await_ {
			return Err(Error::new(ErrorCode::KeywordAsIdentifier, span));
		}

		Ok(())
	}


	/// Names strict mode code can't bind.
	fn check_strict_name(&self, pid: Pid, span: Span, strict: bool) -> Result<(), Error> {
		if !strict {
			return Ok(());
		}

		if pid == self.names.eval {
			return Err(Error::new(ErrorCode::EvalStrict, span));
		}

		if pid == self.names.arguments {
			return Err(Error::new(ErrorCode::ArgumentsStrict, span));
		}

		if self.names.is_strict_reserved(pid) {
			return Err(Error::new(ErrorCode::StrictReserved, span));
		}

		Ok(())
	}


	fn current_scope(&self) -> ScopeId {
		self.binder.current()
	}


	// Background:

	/// Graft a fragment parsed by a background item into the main tree.
	fn merge(&mut self, item: &Item, fragment: Fragment) {
		Coordinator::merge(
			&mut self.ast,
			&mut self.binder,
			&mut self.next_function_id,
			item,
			fragment,
		);
	}
}
