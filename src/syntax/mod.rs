pub mod ast;
pub mod background;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod profile;
mod source;
pub mod stub;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::debug;

use crate::{
	fmt::{self, Display},
	pid::{Interner, SharedInterner},
	reloc::{self, Allocator, Image},
	semantic::{self, BlockId, FunctionId, ScopeTable},
};
pub use ast::{Ast, FncBody, ModuleRecord};
pub use config::Options;
pub use parser::{Error, ErrorCode};
use parser::Parser;
pub use source::{Source, SourcePos, Span};
use stub::DeferredStub;


/// Parse a script or module.
pub fn parse(source: &Source, interner: SharedInterner, options: Options) -> Result<ParseTree, Error> {
	let text: Arc<[u8]> = Arc::from(&*source.contents);

	debug!(
		path = %source.path.display(),
		len = text.len(),
		module = options.is_module(),
		"parsing source"
	);

	let output = Parser::new(&text, interner.clone(), &options).parse_program(text.clone())?;

	Ok(ParseTree {
		text,
		interner,
		options,
		ast: output.ast,
		scopes: output.scopes,
		module: output.module,
		next_block_id: output.next_block_id,
	})
}


/// A parsed program. Deferred functions keep the text and the options they were checked
/// with, so that they may be fully parsed later.
#[derive(Debug)]
pub struct ParseTree {
	text: Arc<[u8]>,
	interner: SharedInterner,
	options: Options,
	pub ast: Ast,
	pub scopes: ScopeTable,
	pub module: Option<ModuleRecord>,
	next_block_id: BlockId,
}


impl ParseTree {
	/// The id of the global function.
	pub fn root(&self) -> FunctionId {
		FunctionId::PROGRAM
	}


	pub fn options(&self) -> &Options {
		&self.options
	}


	pub fn interner(&self) -> &SharedInterner {
		&self.interner
	}


	/// Whether the given function's body is still deferred.
	pub fn is_deferred(&self, function: FunctionId) -> bool {
		self.ast
			.function(function)
			.map_or(false, |function| function.is_deferred())
	}


	/// Fully parse the body of a deferred function. Functions nested in it stay deferred.
	/// On failure the tree is left as it was.
	pub fn undefer(&mut self, function: FunctionId) -> Result<(), Error> {
		if !self.is_deferred(function) {
			return Ok(());
		}

		let ast = std::mem::take(&mut self.ast);
		let scopes = std::mem::take(&mut self.scopes);

		let mut parser = Parser::resume(
			&self.text,
			self.interner.clone(),
			&self.options,
			ast,
			scopes,
			self.next_block_id,
			self.module.take(),
		);

		let result = parser.finish_function(function);

		let output = parser.into_output();
		self.ast = output.ast;
		self.scopes = output.scopes;
		self.module = output.module;
		self.next_block_id = output.next_block_id;

		result
	}


	/// Un-defer functions until none is left, outermost first.
	pub fn undefer_all(&mut self) -> Result<(), Error> {
		loop {
			let deferred: Vec<FunctionId> = self.ast
				.functions()
				.filter(|function| function.is_deferred())
				.map(|function| function.id)
				.collect();

			if deferred.is_empty() {
				return Ok(());
			}

			for function in deferred {
				self.undefer(function)?;
			}
		}
	}


	/// The stubs of the functions which are still deferred, in function id order.
	pub fn stubs(&self) -> Vec<DeferredStub> {
		self.ast
			.functions()
			.filter_map(|function| match &function.body {
				FncBody::Deferred(deferred) => Some(deferred.stub.clone()),
				_ => None,
			})
			.collect()
	}


	/// Encode the stubs of the deferred functions into a flattened relocatable image.
	pub fn encode_stubs(&self, config: reloc::Config) -> Result<Image, reloc::Error> {
		let stubs = self.stubs();

		let mut allocator = Allocator::with_config(config);
		stub::encode(&stubs, &self.interner.lock(), &mut allocator)?;

		let data = allocator.finalize()?;
		Ok(data.image())
	}


	/// Render the tree, with nested functions inline.
	pub fn dump(&self) -> String {
		let interner = self.interner.lock();
		fmt::to_string(self, &*interner)
	}


	/// Render the scopes with their symbols.
	pub fn dump_scopes(&self) -> String {
		let interner = self.interner.lock();
		semantic::fmt::dump(&self.scopes, &interner)
	}
}


impl<'a> Display<'a> for ParseTree {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		self.ast.fmt(f, ast::fmt::Context::new(context, &self.ast, &self.scopes))
	}
}
