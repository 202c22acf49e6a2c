use tracing::debug;

use super::{
	function::{FunctionKind, ParamInfo},
	AstMode,
	Context,
	Error,
	Parser,
};
use crate::{
	pid::SharedInterner,
	semantic::{Binder, BlockId, FunctionId, ScopeTable},
	syntax::{
		ast::{Ast, FncBody, FncFlags, FncNode, ModuleRecord},
		background::{Fragment, Item},
		config::Options,
		stub::DeferredStub,
	},
};


/// The stubs of the functions directly nested in a body being parsed again, consumed in
/// source order.
#[derive(Debug, Clone)]
pub(super) struct Replay {
	stubs: Box<[DeferredStub]>,
	pub next: usize,
}


impl Replay {
	/// A frame for a function without recorded children. It still shadows the frame of
	/// the enclosing function, so that its nested functions don't consume foreign stubs.
	pub fn new(stubs: Option<Box<[DeferredStub]>>) -> Self {
		Self {
			stubs: stubs.unwrap_or_default(),
			next: 0,
		}
	}
}


impl<'a> Parser<'a> {
	/// Resume parsing over a finished tree, to un-defer its functions.
	pub fn resume(
		input: &'a [u8],
		interner: SharedInterner,
		options: &'a Options,
		ast: Ast,
		scopes: ScopeTable,
		next_block_id: BlockId,
		module: Option<ModuleRecord>,
	) -> Self {
		let mut parser = Self::new(input, interner, options);

		parser.next_function_id = ast.function_slots() as u32;
		parser.ast = ast;
		parser.binder = Binder::resume(scopes, next_block_id);
		parser.module = module;

		parser
	}


	/// The stub of the next nested function, if a body is being parsed again.
	pub(super) fn take_replay_stub(&mut self) -> Option<DeferredStub> {
		let replay = self.replay.last_mut()?;
		let stub = replay.stubs.get(replay.next)?.clone();
		replay.next += 1;
		Some(stub)
	}


	/// Fully parse the body of a deferred function. Numbering restarts where the syntax
	/// check left it, so the result is identical to an eager parse. Functions directly
	/// nested in the body stay deferred. Functions which are not deferred are left alone.
	pub fn finish_function(&mut self, id: FunctionId) -> Result<(), Error> {
		let function = match self.ast.function(id) {
			Some(function) => function.clone(),
			None => return Ok(()),
		};

		let deferred = match &function.body {
			FncBody::Deferred(deferred) => deferred.as_ref().clone(),
			_ => return Ok(()),
		};

		debug!(
			function = id.0,
			offset = deferred.stub.body.offset,
			nested = deferred.stub.nested_count,
			"un-deferring function"
		);

		let outer = self.context;
		let next_block_id = self.binder.next_block_id();
		let next_function_id = self.next_function_id;

		let checkpoint = self.checkpoint();

		self.context = self.deferred_context(&function);
		self.binder.reenter(function.param_scope);
		self.binder.set_next_block_id(deferred.block_id);
		self.next_function_id = deferred.next_function_id.0;
		self.replay.push(Replay::new(Some(deferred.stub.children.clone())));

		let blocks = deferred.block_id.0 .. deferred.block_id.0 + deferred.stub.block_count;
		self.binder.supersede(blocks);

		// Parameters were validated by the syntax check, only their simplicity matters for
		// a strict directive.
		let params = ParamInfo {
			names: Vec::new(),
			simple: !function.flags.contains(FncFlags::NON_SIMPLE_PARAMS),
			unique: false,
			name: None,
		};

		let result = self
			.skip_to(deferred.stub.body)
			.and_then(|()| self.parse_function_body::<AstMode>(id, &params));

		let body = match result {
			Ok(body) => body,
			Err(error) => {
				self.restore(checkpoint, "un-deferral failed");
				self.context = outer;
				return Err(error);
			}
		};

		self.commit(checkpoint);
		self.replay.pop();

		self.binder.resolve_free_refs(body.first_ref, function.param_scope);
		self.binder.leave(function.param_scope);
		self.binder.set_next_block_id(next_block_id);
		self.next_function_id = next_function_id;

		let flags = self.context.flags;
		self.context = outer;

		if let Some(function) = self.ast.function_mut(id) {
			function.flags = flags;
			function.body_scope = Some(body.scope);
			function.body = FncBody::Parsed(body.statements.into_boxed_slice());
		}

		Ok(())
	}


	/// The context a deferred function was parsed in. Arrows see the `super` and
	/// `new.target` of the closest enclosing function which is not an arrow.
	fn deferred_context(&self, function: &FncNode) -> Context {
		let flags = function.flags;

		let mut home = Some(function);
		while let Some(candidate) = home {
			if !candidate.flags.contains(FncFlags::LAMBDA) {
				break;
			}
			home = candidate.parent.and_then(|parent| self.ast.function(parent));
		}

		let (super_property, super_call, new_target) = match home {
			Some(home) if home.id != FunctionId::PROGRAM => {
				let constructor = home.flags.contains(FncFlags::CLASS_CONSTRUCTOR);
				(
					home.flags.contains(FncFlags::METHOD) || constructor,
					constructor && !home.flags.contains(FncFlags::BASE_CLASS_CONSTRUCTOR),
					true,
				)
			}
			_ => (false, false, false),
		};

		Context {
			function: function.id,
			flags,
			strict: flags.contains(FncFlags::STRICT),
			in_function: true,
			generator: flags.contains(FncFlags::GENERATOR),
			is_async: flags.contains(FncFlags::ASYNC),
			in_params: false,
			super_property,
			super_call,
			new_target,
			labels: self.labels.len(),
			breakable: 0,
			iteration: 0,
		}
	}


	/// Parse the function of a background item into a separate fragment. The fragment
	/// numbers its functions from one and its blocks from zero, and keeps the references it
	/// could not bind.
	pub(in crate::syntax) fn parse_fragment(
		input: &'a [u8],
		interner: SharedInterner,
		options: &'a Options,
		item: &Item,
	) -> Result<Fragment, Error> {
		let mut parser = Self::new(input, interner, options);
		parser.context = Context::program(item.strict, options.is_module());

		parser.skip_to(item.start)?;

		let kind = if item.declaration { FunctionKind::Declaration } else { FunctionKind::Expression };
		// The main parser bound the name of a declaration, and already checked it is
		// present unless the function is a default export.
		let mut header = parser.parse_function_header(kind, false, false)?;
		header.flags.insert(item.flags);
		let (_, id) = parser.parse_function::<AstMode>(header)?;
		debug_assert_eq!(id, FunctionId(1));

		let free_refs = parser.binder
			.stacks()
			.live()
			.map(|(_, reference)| reference)
			.collect();

		let block_count = parser.binder.next_block_id().0;

		Ok(Fragment {
			ast: parser.ast,
			scopes: parser.binder.into_table(),
			block_count,
			function_count: parser.next_function_id - 1,
			free_refs,
			flags: parser.context.flags,
		})
	}
}
