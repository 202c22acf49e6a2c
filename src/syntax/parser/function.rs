use tracing::debug;

use super::{
	defer::Replay,
	expr::{Expr, Shape},
	fast_scan_formals_and_body,
	pattern::Binding,
	BuildMode,
	Context,
	Error,
	ErrorCode,
	Parser,
	SyntaxMode,
};
use crate::{
	pid::Pid,
	semantic::{BlockId, FunctionId, RefFlags, RefId, ScopeId, ScopeKind, SymbolId, SymbolKind},
	syntax::{
		ast::{DeferredBody, FncBody, FncFlags, FncNode, NodeFlags, NodeId, NodeKind},
		background::Item,
		lexer::{Goal, Keyword, Punct, RestorePoint, TokenKind},
		stub::DeferredStub,
		Span,
	},
};


/// The syntactic form of a function, which decides its flags and what its body may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionKind {
	Declaration,
	Expression,
	Method,
	Getter,
	Setter,
	ClassConstructor { derived: bool },
	Arrow,
}


impl FunctionKind {
	fn flags(self) -> FncFlags {
		match self {
			Self::Declaration => FncFlags::DECLARATION,
			Self::Expression => FncFlags::empty(),
			Self::Method => FncFlags::METHOD,
			Self::Getter | Self::Setter => FncFlags::METHOD | FncFlags::ACCESSOR,
			Self::ClassConstructor { derived: true } => FncFlags::CLASS_CONSTRUCTOR,
			Self::ClassConstructor { derived: false } => {
				FncFlags::CLASS_CONSTRUCTOR | FncFlags::BASE_CLASS_CONSTRUCTOR
			}
			Self::Arrow => FncFlags::LAMBDA,
		}
	}


	fn has_home_object(self) -> bool {
		matches!(
			self,
			Self::Method | Self::Getter | Self::Setter | Self::ClassConstructor { .. }
		)
	}


	/// Duplicate parameters are an error even in sloppy mode.
	fn unique_params(self) -> bool {
		!matches!(self, Self::Declaration | Self::Expression)
	}
}


/// Everything parsed before the formal parameters.
#[derive(Debug, Clone, Copy)]
pub(super) struct FunctionHeader {
	pub kind: FunctionKind,
	/// Generator, async and class member flags.
	pub flags: FncFlags,
	pub name: Option<Pid>,
	pub name_span: Span,
	/// The symbol the name of a declaration was bound to.
	pub name_symbol: Option<SymbolId>,
	pub start: u32,
	/// The first token of the function.
	pub point: RestorePoint,
}


/// The formal parameters of a function, kept to validate them again if the body turns
/// out to be strict.
#[derive(Debug, Clone)]
pub(super) struct ParamInfo {
	pub names: Vec<(Pid, Span)>,
	pub simple: bool,
	pub unique: bool,
	/// The name of the function, which strict mode also restricts.
	pub name: Option<(Pid, Span)>,
}


/// The result of parsing a braced function body.
#[derive(Debug)]
pub(super) struct Body {
	pub statements: Vec<NodeId>,
	pub scope: ScopeId,
	/// The opening brace.
	pub point: RestorePoint,
	pub block_id: BlockId,
	pub block_count: u32,
	pub first_ref: RefId,
	pub first_nested: FunctionId,
	/// Scope and symbol counts before the body.
	pub scopes: usize,
	pub symbols: usize,
	pub captured: Vec<(Pid, RefFlags)>,
}


impl<'a> Parser<'a> {
	// Entry points:

	/// `function name(...) {...}` in statement position.
	pub(super) fn parse_function_declaration<M: BuildMode>(&mut self, name_required: bool) -> Result<NodeId, Error> {
		let header = self.parse_function_header(FunctionKind::Declaration, name_required, true)?;
		let (node, _) = self.parse_function::<M>(header)?;
		Ok(node)
	}


	pub(super) fn parse_function_expression<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		let header = self.parse_function_header(FunctionKind::Expression, false, false)?;
		let (node, _) = self.parse_function::<M>(header)?;

		Ok(Expr { node, span: self.span_from(start), shape: Shape::Other })
	}


	/// An arrow function. The current token is `async`, the opening parenthesis of the
	/// parameters or the single parameter name.
	pub(super) fn parse_arrow_function<M: BuildMode>(&mut self, is_async: bool, start: u32) -> Result<Expr, Error> {
		let point = self.token_start();

		let mut flags = FncFlags::empty();
		if is_async {
			self.step()?;
			flags.insert(FncFlags::ASYNC);
		}

		let header = FunctionHeader {
			kind: FunctionKind::Arrow,
			flags,
			name: None,
			name_span: Span::empty(start),
			name_symbol: None,
			start,
			point,
		};
		let (node, _) = self.parse_function::<M>(header)?;

		Ok(Expr { node, span: self.span_from(start), shape: Shape::Other })
	}


	/// A method of an object literal or class. The current token is the opening
	/// parenthesis of the parameters.
	pub(super) fn parse_method<M: BuildMode>(
		&mut self,
		kind: FunctionKind,
		flags: FncFlags,
		name: Option<Pid>,
		start: u32,
	) -> Result<(NodeId, FunctionId), Error> {
		let header = FunctionHeader {
			kind,
			flags,
			name,
			name_span: Span::empty(start),
			name_symbol: None,
			start,
			point: self.token_start(),
		};

		self.parse_function::<M>(header)
	}


	/// `async`, `function`, `*` and the name. The name of a declaration is bound in the
	/// enclosing scope when `declare` is set.
	pub(super) fn parse_function_header(
		&mut self,
		kind: FunctionKind,
		name_required: bool,
		declare: bool,
	) -> Result<FunctionHeader, Error> {
		let point = self.token_start();
		let start = self.token.span.ich_min;

		let mut flags = FncFlags::empty();
		if self.at_contextual(self.names.async_) {
			self.step()?;
			flags.insert(FncFlags::ASYNC);
		}

		self.expect_keyword(Keyword::Function, ErrorCode::Syntax)?;

		if self.eat(Punct::Star)? {
			flags.insert(FncFlags::GENERATOR);
		}

		let (name, name_span) = match self.token.kind {
			TokenKind::Identifier { pid, escaped } => {
				let span = self.token.span;
				if kind == FunctionKind::Declaration {
					self.check_binding_name(pid, span, escaped)?;
				} else {
					self.check_function_expression_name(pid, span, escaped, flags)?;
				}
				self.step()?;
				(Some(pid), span)
			}

			_ if name_required => return Err(self.error(ErrorCode::ExpectedIdentifier)),

			_ => (None, Span::empty(self.token.span.ich_min)),
		};

		let name_symbol = match name {
			Some(pid) if declare => Some(self.declare(pid, SymbolKind::Function, name_span)?),
			_ => None,
		};

		Ok(FunctionHeader { kind, flags, name, name_span, name_symbol, start, point })
	}


	/// The name of a function expression is bound inside the function, so its own
	/// generator and async flags apply.
	fn check_function_expression_name(
		&self,
		pid: Pid,
		span: Span,
		escaped: bool,
		flags: FncFlags,
	) -> Result<(), Error> {
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

		if flags.contains(FncFlags::GENERATOR) && pid == self.names.yield_ {
			return Err(Error::new(ErrorCode::KeywordAsIdentifier, span));
		}

		if (flags.contains(FncFlags::ASYNC) || self.options.is_module()) && pid == self.names.await_ {
			return Err(Error::new(ErrorCode::KeywordAsIdentifier, span));
		}

		Ok(())
	}


	// Functions:

	/// Parse the parameters and body of a function whose header was parsed. Depending on
	/// the parser state the body is built, only syntax checked and deferred, skipped with
	/// a stub recorded by an earlier syntax check, or handed to a background item.
	pub(super) fn parse_function<M: BuildMode>(&mut self, header: FunctionHeader) -> Result<(NodeId, FunctionId), Error> {
		let id = self.next_function();

		if let Some(node) = self.try_background::<M>(&header, id)? {
			return Ok((node, id));
		}

		// Exported declarations collect their names, but not the names of nested bindings.
		let bound_names = self.bound_names.take();
		let result = self.parse_function_parts::<M>(header, id);
		self.bound_names = bound_names;

		let node = result?;
		Ok((node, id))
	}


	fn parse_function_parts<M: BuildMode>(&mut self, header: FunctionHeader, id: FunctionId) -> Result<NodeId, Error> {
		let replay_stub = if M::BUILD_AST { self.take_replay_stub() } else { None };
		let recording = !M::BUILD_AST && !self.stubs.is_empty();
		if recording {
			self.stubs.push(Vec::new());
		}

		let outer = self.context;
		self.context = self.function_context(&header, id);

		let param_scope = self.binder.start_parse_block(ScopeKind::Parameter, id);

		let mut name_symbol = header.name_symbol;
		if header.kind == FunctionKind::Expression {
			if let Some(name) = header.name {
				name_symbol = Some(self.declare(name, SymbolKind::FunctionName, header.name_span)?);
			}
		}

		let (params, info) = self.parse_formals::<M>(&header)?;

		if header.kind == FunctionKind::Arrow {
			if self.token.newline_before || !self.token.is_punct(Punct::Arrow) {
				return Err(self.error(ErrorCode::ExpectedArrow));
			}
			self.step()?;
		}

		let body_start = self.token_start();
		let first_block = self.binder.next_block_id();

		let (mut body, body_scope, captured) = if header.kind == FunctionKind::Arrow && !self.token.is_punct(Punct::LCurly) {
			let first_ref = RefId::from_index(self.binder.table().ref_count());

			let replay = M::BUILD_AST && !self.replay.is_empty();
			if replay {
				self.replay.push(Replay::new(replay_stub.map(|stub| stub.children)));
			}

			let expr = self.parse_assignment::<M>(true)?;

			if replay {
				self.replay.pop();
			}

			let statement = self.make_flagged::<M>(
				NodeKind::Return(Some(expr.node)),
				expr.span,
				NodeFlags::GENERATED,
			)?;

			let captured = if recording { self.captured_names(first_ref) } else { Vec::new() };
			(FncBody::Parsed(vec![statement].into_boxed_slice()), None, captured)
		} else if let Some(stub) = replay_stub {
			self.skip_deferred_body(id, stub)?
		} else if M::BUILD_AST && self.token.is_punct(Punct::LCurly) && self.will_defer_parse(id) {
			self.stubs.push(Vec::new());
			let body = self.parse_function_body::<SyntaxMode>(id, &info)?;
			let children = self.stubs.pop().unwrap_or_default();

			self.binder.discard_body(body.scopes, body.symbols, body.first_ref);

			let stub = DeferredStub {
				span: self.span_from(header.start),
				body: body.point,
				body_end: self.prev_end,
				flags: self.context.flags,
				nested_count: self.next_function_id - body.first_nested.0,
				block_count: body.block_count,
				children: children.into_boxed_slice(),
				captured: body.captured.into_boxed_slice(),
			};

			let deferred = DeferredBody {
				stub,
				block_id: body.block_id,
				next_function_id: body.first_nested,
			};

			(FncBody::Deferred(Box::new(deferred)), None, Vec::new())
		} else {
			let replay = M::BUILD_AST && !self.replay.is_empty();
			if replay {
				self.replay.push(Replay::new(None));
			}

			let body = self.parse_function_body::<M>(id, &info)?;

			if replay {
				self.replay.pop();
			}

			let statements = body.statements.into_boxed_slice();
			(FncBody::Parsed(statements), Some(body.scope), body.captured)
		};

		self.binder.finish_parse_block(param_scope);

		let nested_count = self.next_function_id - id.0 - 1;

		let mut flags = self.context.flags;
		if self.binder.scope(param_scope).writes_to_formals {
			flags.insert(FncFlags::HAS_ANY_WRITE_TO_FORMALS);
		}
		if heap_arguments(flags, nested_count, !info.names.is_empty()) {
			flags.insert(FncFlags::HAS_HEAP_ARGUMENTS);
		}
		if let FncBody::Deferred(deferred) = &mut body {
			deferred.stub.flags = flags;
		}

		self.context = outer;
		self.propagate_flags(header.kind, flags);

		let span = self.span_from(header.start);

		if recording {
			let children = self.stubs.pop().unwrap_or_default();
			let stub = DeferredStub {
				span,
				body: body_start,
				body_end: self.prev_end,
				flags,
				nested_count,
				block_count: self.binder.next_block_id().0 - first_block.0,
				children: children.into_boxed_slice(),
				captured: captured.into_boxed_slice(),
			};

			if let Some(frame) = self.stubs.last_mut() {
				frame.push(stub);
			}
		}

		let node = self.make::<M>(NodeKind::Function(id), span)?;

		if M::BUILD_AST {
			self.ast.set_function(FncNode {
				id,
				parent: Some(outer.function),
				name: header.name,
				name_symbol,
				flags,
				span,
				params: params.into_boxed_slice(),
				param_scope,
				body_scope,
				body,
				nested_count,
				node,
			});
		}

		Ok(node)
	}


	/// The context of a function about to be parsed.
	fn function_context(&self, header: &FunctionHeader, id: FunctionId) -> Context {
		let outer = &self.context;

		let mut flags = header.flags | header.kind.flags();
		if outer.strict {
			flags.insert(FncFlags::STRICT);
		}
		if outer.function != FunctionId::PROGRAM {
			flags.insert(FncFlags::NESTED);
		}

		let arrow = header.kind == FunctionKind::Arrow;

		Context {
			function: id,
			flags,
			strict: outer.strict,
			in_function: true,
			generator: flags.contains(FncFlags::GENERATOR),
			is_async: flags.contains(FncFlags::ASYNC),
			in_params: false,
			super_property: if arrow { outer.super_property } else { header.kind.has_home_object() },
			super_call: if arrow {
				outer.super_call
			} else {
				header.kind == FunctionKind::ClassConstructor { derived: true }
			},
			new_target: if arrow { outer.new_target } else { true },
			labels: self.labels.len(),
			breakable: 0,
			iteration: 0,
		}
	}


	/// Report what a nested function found to the enclosing one.
	fn propagate_flags(&mut self, kind: FunctionKind, flags: FncFlags) {
		if flags.intersects(FncFlags::CALLS_EVAL | FncFlags::CHILD_CALLS_EVAL) {
			self.context.flags.insert(FncFlags::CHILD_CALLS_EVAL);
		}

		if flags.contains(FncFlags::HAS_WITH) {
			self.context.flags.insert(FncFlags::HAS_WITH);
		}

		// Arrows share `arguments` and `super` with their enclosing function.
		if kind == FunctionKind::Arrow {
			let shared = FncFlags::USES_ARGUMENTS | FncFlags::HAS_SUPER_REFERENCE | FncFlags::HAS_DIRECT_SUPER;
			self.context.flags.insert(flags & shared);
		}
	}


	// Parameters:

	fn parse_formals<M: BuildMode>(&mut self, header: &FunctionHeader) -> Result<(Vec<NodeId>, ParamInfo), Error> {
		self.bound_names = Some(Vec::new());
		self.context.in_params = true;

		let mut params = Vec::new();
		let mut simple = true;
		let mut count = 0;
		let mut has_rest = false;

		if header.kind == FunctionKind::Arrow && !self.token.is_punct(Punct::LParen) {
			let param = self.parse_binding_name::<M>(Binding::Formal, false)?;
			count += 1;
			if M::BUILD_AST {
				params.push(param);
			}
		} else {
			self.expect(Punct::LParen, ErrorCode::ExpectedLParen)?;

			while !self.token.is_punct(Punct::RParen) {
				let start = self.token.span.ich_min;

				count += 1;

				let param = if self.eat(Punct::Ellipsis)? {
					simple = false;
					has_rest = true;
					let target = self.parse_destructured_binding::<M>(Binding::Formal)?;
					if !self.token.is_punct(Punct::RParen) {
						return Err(self.error(ErrorCode::InvalidRestElement));
					}
					self.make::<M>(NodeKind::Rest(target), self.span_from(start))?
				} else {
					if self.at_pattern() {
						simple = false;
						self.context.flags.insert(FncFlags::HAS_DESTRUCTURED_PARAMS);
					}

					let target = self.parse_destructured_binding::<M>(Binding::Formal)?;

					let param = if self.eat(Punct::Assign)? {
						simple = false;
						self.context.flags.insert(FncFlags::HAS_DEFAULT_ARGUMENTS);
						let default = self.parse_assignment::<M>(true)?;
						self.make::<M>(
							NodeKind::AssignPattern { target, default: default.node },
							self.span_from(start),
						)?
					} else {
						target
					};

					if !self.token.is_punct(Punct::RParen) {
						self.expect(Punct::Comma, ErrorCode::ExpectedRParen)?;
					}

					param
				};

				if M::BUILD_AST {
					params.push(param);
				}
			}

			self.step()?;
		}

		self.context.in_params = false;

		let names = self.bound_names
			.take()
			.unwrap_or_default()
			.into_iter()
			.map(|(pid, _, span)| (pid, span))
			.collect::<Vec<_>>();

		if !simple {
			self.context.flags.insert(FncFlags::NON_SIMPLE_PARAMS);
		}

		match header.kind {
			FunctionKind::Getter if count != 0 => {
				return Err(Error::new(ErrorCode::GetterArity, self.span_from(header.start)));
			}

			FunctionKind::Setter if count != 1 || has_rest => {
				return Err(Error::new(ErrorCode::SetterArity, self.span_from(header.start)));
			}

			_ => (),
		}

		let info = ParamInfo {
			names,
			simple,
			unique: header.kind.unique_params(),
			name: header.name.map(|name| (name, header.name_span)),
		};

		self.validate_params(&info, self.context.strict)?;

		Ok((params, info))
	}


	/// Check the formal parameters and the function name against the rules of the given
	/// strictness.
	pub(super) fn validate_params(&self, info: &ParamInfo, strict: bool) -> Result<(), Error> {
		for (index, &(pid, span)) in info.names.iter().enumerate() {
			self.check_strict_name(pid, span, strict)?;

			let check_duplicates = strict || info.unique || !info.simple;
			if check_duplicates && info.names[.. index].iter().any(|&(other, _)| other == pid) {
				return Err(Error::new(ErrorCode::DuplicateFormalStrict, span));
			}
		}

		if let Some((pid, span)) = info.name {
			self.check_strict_name(pid, span, strict)?;
		}

		Ok(())
	}


	// Bodies:

	/// `{ statements }`, in its own function body scope.
	pub(super) fn parse_function_body<B: BuildMode>(
		&mut self,
		function: FunctionId,
		params: &ParamInfo,
	) -> Result<Body, Error> {
		let point = self.token_start();
		self.expect(Punct::LCurly, ErrorCode::ExpectedLCurly)?;

		let table = self.binder.table();
		let scopes = table.scope_count();
		let symbols = table.symbol_count();
		let first_ref = RefId::from_index(table.ref_count());
		let first_nested = FunctionId(self.next_function_id);

		let scope = self.binder.start_parse_block(ScopeKind::FunctionBody, function);
		let block_id = self.binder.scope(scope).block_id;

		let statements = self.parse_statement_list::<B>(true, Some(params))?;

		if !self.token.is_punct(Punct::RCurly) {
			return Err(self.error(ErrorCode::ExpectedRCurly));
		}

		self.binder.finish_parse_block(scope);
		let captured = self.captured_names(first_ref);
		let block_count = self.binder.next_block_id().0 - block_id.0;

		self.step()?;

		Ok(Body {
			statements,
			scope,
			point,
			block_id,
			block_count,
			first_ref,
			first_nested,
			scopes,
			symbols,
			captured,
		})
	}


	/// The names referred to since `first_ref` that no closed scope declares, with the
	/// flags of all their records.
	fn captured_names(&self, first_ref: RefId) -> Vec<(Pid, RefFlags)> {
		let mut records = self.binder
			.stacks()
			.live()
			.filter(|&(_, reference)| reference >= first_ref)
			.map(|(pid, reference)| (pid, self.binder.reference(reference).flags))
			.collect::<Vec<_>>();

		records.sort_unstable_by_key(|&(pid, _)| pid);

		let mut captured: Vec<(Pid, RefFlags)> = Vec::with_capacity(records.len());
		for (pid, flags) in records {
			match captured.last_mut() {
				Some((last, merged)) if *last == pid => {
					if merged.contains(RefFlags::ASSIGNMENT) && flags.contains(RefFlags::ASSIGNMENT) {
						merged.insert(RefFlags::REASSIGNMENT);
					}
					merged.insert(flags);
				}
				_ => captured.push((pid, flags)),
			}
		}

		captured
	}


	/// Skip a body that a previous syntax check summarized, keeping it deferred. The
	/// numbering advances past everything the body contains, and its free names are
	/// referred to from the parameter scope.
	fn skip_deferred_body(
		&mut self,
		function: FunctionId,
		stub: DeferredStub,
	) -> Result<(FncBody, Option<ScopeId>, Vec<(Pid, RefFlags)>), Error> {
		if self.token.span.ich_min != stub.body.offset {
			return Err(self.unexpected());
		}

		let end = self.point_at(stub.body, stub.body_end);
		self.skip_to(end)?;

		for &(pid, flags) in stub.captured.iter() {
			self.binder.push_pid_ref(pid, function, flags);
		}

		let block_id = self.binder.next_block_id();
		self.binder.set_next_block_id(BlockId(block_id.0 + stub.block_count));

		let next_function_id = FunctionId(self.next_function_id);
		self.next_function_id += stub.nested_count;

		self.context.flags.insert(stub.flags);

		let deferred = DeferredBody { stub, block_id, next_function_id };
		Ok((FncBody::Deferred(Box::new(deferred)), None, Vec::new()))
	}


	/// A restore point at the given offset, which must follow `from`.
	pub(super) fn point_at(&self, from: RestorePoint, offset: u32) -> RestorePoint {
		let mut pos = from.pos;
		for &byte in &self.scanner.input()[from.offset as usize .. offset as usize] {
			pos.visit(byte);
		}

		RestorePoint { offset, pos }
	}


	/// Continue scanning at the given point, as if everything before it was consumed.
	pub(super) fn skip_to(&mut self, point: RestorePoint) -> Result<(), Error> {
		self.scanner.seek_to(point);
		self.prev_end = point.offset;
		self.token = self.scanner.scan(Goal::Div)?;
		Ok(())
	}


	// Deferral:

	/// Whether the body of the given function is only syntax checked for now.
	pub(super) fn will_defer_parse(&self, function: FunctionId) -> bool {
		let threshold = match self.options.defer.threshold {
			Some(threshold) => threshold,
			None => return false,
		};

		let len = self.scanner.input().len();
		if len < threshold {
			return false;
		}

		if let Some(profile) = &self.options.profile {
			if profile.was_executed(function) {
				debug!(function = function.0, "parsing executed function eagerly");
				return false;
			}
		}

		debug!(function = function.0, len, threshold, "deferring function body");

		true
	}


	// Background:

	/// Hand a top level function to a background item, leaving a placeholder in the tree.
	fn try_background<M: BuildMode>(&mut self, header: &FunctionHeader, id: FunctionId) -> Result<Option<NodeId>, Error> {
		let eligible = M::BUILD_AST
			&& self.background.is_some()
			&& self.context.function == FunctionId::PROGRAM
			&& matches!(header.kind, FunctionKind::Declaration | FunctionKind::Expression)
			&& !self.binder.is_speculating()
			&& self.replay.is_empty()
			&& self.stubs.is_empty()
			&& !self.in_with();

		if !eligible {
			return Ok(None);
		}

		let end = match fast_scan_formals_and_body(
			self.scanner.input(),
			self.token_start(),
			self.scanner.interner().clone(),
			self.options,
			self.context.strict,
			header.flags,
		) {
			Ok(end) => end,
			// The main parse reports the error.
			Err(_) => return Ok(None),
		};

		if ((end.offset - header.start) as usize) < self.options.background_min_len {
			return Ok(None);
		}

		let item = Item {
			index: 0,
			start: header.point,
			declaration: header.kind == FunctionKind::Declaration,
			flags: header.flags,
			strict: self.context.strict,
			function: id,
			scope: self.current_scope(),
		};

		let index = match self.background.as_mut() {
			Some(background) => background.submit(item),
			None => return Ok(None),
		};

		self.skip_to(end)?;

		let span = self.span_from(header.start);
		let node = self.make::<M>(NodeKind::Function(id), span)?;

		let mut flags = header.flags | header.kind.flags();
		flags.set(FncFlags::STRICT, self.context.strict);

		self.ast.set_function(FncNode {
			id,
			parent: Some(FunctionId::PROGRAM),
			name: header.name,
			name_symbol: header.name_symbol,
			flags,
			span,
			params: Box::default(),
			param_scope: self.current_scope(),
			body_scope: None,
			body: FncBody::Pending(index),
			nested_count: 0,
			node,
		});

		debug!(function = id.0, index, extent = span.len(), "queued background item");

		Ok(Some(node))
	}


	fn in_with(&self) -> bool {
		self.binder
			.active()
			.iter()
			.any(|&scope| self.binder.scope(scope).kind == ScopeKind::With)
	}
}


/// Whether the `arguments` object must outlive the frame, or alias formals which may be
/// changed through it.
fn heap_arguments(flags: FncFlags, nested_count: u32, has_formals: bool) -> bool {
	if !flags.contains(FncFlags::USES_ARGUMENTS) || flags.contains(FncFlags::LAMBDA) {
		return false;
	}

	flags.intersects(FncFlags::CALLS_EVAL | FncFlags::CHILD_CALLS_EVAL)
		|| nested_count > 0
		|| (has_formals && !flags.contains(FncFlags::STRICT))
}
