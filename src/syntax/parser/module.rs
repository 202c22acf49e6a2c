use super::{
	expr::{Expr, Shape},
	function::FunctionKind,
	class::ClassForm,
	BuildMode,
	Error,
	ErrorCode,
	Parser,
};
use crate::{
	pid::Pid,
	semantic::{FunctionId, RefFlags, ScopeKind, SymbolKind},
	syntax::{
		ast::{ExportEntry, FncFlags, ImportEntry, NodeFlags, NodeId, NodeKind},
		lexer::{Keyword, Punct, TokenKind},
		Span,
	},
};


/// A name in an import or export clause: `name` or `name as alias`.
#[derive(Debug, Clone, Copy)]
struct Specifier {
	name: Pid,
	alias: Pid,
	/// Whether `name` is a keyword, which is fine only when it refers to another module.
	keyword: bool,
	span: Span,
}


impl<'a> Parser<'a> {
	// Imports:

	/// `import` declarations, at the top level of modules.
	pub(super) fn parse_import<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		self.check_module_item()?;

		let start = self.token.span.ich_min;
		self.step()?;

		// `import "module";`
		if let TokenKind::String { value, .. } = self.token.kind {
			self.step()?;
			if let Some(module) = self.module.as_mut() {
				module.request(value);
			}

			let node = self.make::<M>(NodeKind::ImportDecl { specifier: value }, self.span_from(start))?;
			self.consume_semicolon::<M>(node)?;
			return Ok(node);
		}

		// Import name, local name and span of each binding.
		let mut bindings: Vec<(Option<Pid>, Pid, Span)> = Vec::new();

		if let TokenKind::Identifier { pid, escaped } = self.token.kind {
			let span = self.token.span;
			self.check_binding_name(pid, span, escaped)?;
			self.step()?;
			bindings.push((Some(self.names.default), pid, span));

			if !self.eat(Punct::Comma)? {
				return self.finish_import::<M>(start, bindings);
			}
		}

		if self.eat(Punct::Star)? {
			if !self.at_contextual(self.names.as_) {
				return Err(self.unexpected());
			}
			self.step()?;

			let (local, span) = self.parse_import_binding_name()?;
			bindings.push((None, local, span));
		} else if self.token.is_punct(Punct::LCurly) {
			for specifier in self.parse_specifiers()? {
				if specifier.keyword && specifier.name == specifier.alias {
					return Err(Error::new(ErrorCode::KeywordAsIdentifier, specifier.span));
				}
				self.check_binding_name(specifier.alias, specifier.span, false)?;
				bindings.push((Some(specifier.name), specifier.alias, specifier.span));
			}
		} else {
			return Err(self.unexpected());
		}

		self.finish_import::<M>(start, bindings)
	}


	/// `from "module";`, then the bindings are declared.
	fn finish_import<M: BuildMode>(
		&mut self,
		start: u32,
		bindings: Vec<(Option<Pid>, Pid, Span)>,
	) -> Result<NodeId, Error> {
		let module = self.parse_from_clause()?;

		for (import_name, local_name, span) in bindings {
			self.declare(local_name, SymbolKind::Import, span)?;

			if let Some(record) = self.module.as_mut() {
				record.add_import(ImportEntry { module, import_name, local_name, span });
			}
		}

		let node = self.make::<M>(NodeKind::ImportDecl { specifier: module }, self.span_from(start))?;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	fn parse_import_binding_name(&mut self) -> Result<(Pid, Span), Error> {
		match self.token.kind {
			TokenKind::Identifier { pid, escaped } => {
				let span = self.token.span;
				self.check_binding_name(pid, span, escaped)?;
				self.step()?;
				Ok((pid, span))
			}

			_ => Err(self.error(ErrorCode::ExpectedIdentifier)),
		}
	}


	/// `import(specifier)`.
	pub(super) fn parse_import_call<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		self.expect(Punct::LParen, ErrorCode::ExpectedLParen)?;
		let specifier = self.parse_assignment::<M>(true)?;
		self.expect(Punct::RParen, ErrorCode::ExpectedRParen)?;

		let span = self.span_from(start);
		let node = self.make::<M>(NodeKind::ImportCall(specifier.node), span)?;

		Ok(Expr { node, span, shape: Shape::Call })
	}


	// Exports:

	/// `export` declarations, at the top level of modules.
	pub(super) fn parse_export<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		self.check_module_item()?;

		let start = self.token.span.ich_min;
		self.step()?;

		match self.token.kind {
			TokenKind::Punct(Punct::Star) => {
				self.step()?;

				let alias = if self.at_contextual(self.names.as_) {
					self.step()?;
					let span = self.token.span;
					Some((self.parse_identifier_name()?, span))
				} else {
					None
				};

				let module = self.parse_from_clause()?;
				let span = self.span_from(start);

				match alias {
					Some((name, name_span)) => self.add_export(ExportEntry {
						export_name: Some(name),
						module: Some(module),
						import_name: None,
						local_name: None,
						span: name_span,
					})?,

					None => self.add_export(ExportEntry {
						export_name: None,
						module: Some(module),
						import_name: None,
						local_name: None,
						span,
					})?,
				}

				let node = self.make::<M>(NodeKind::ExportNamed { from: Some(module) }, span)?;
				self.consume_semicolon::<M>(node)?;
				Ok(node)
			}

			TokenKind::Punct(Punct::LCurly) => {
				let specifiers = self.parse_specifiers()?;

				let from = if self.at_contextual(self.names.from) {
					Some(self.parse_from_clause()?)
				} else {
					None
				};

				for specifier in specifiers {
					let entry = match from {
						Some(module) => ExportEntry {
							export_name: Some(specifier.alias),
							module: Some(module),
							import_name: Some(specifier.name),
							local_name: None,
							span: specifier.span,
						},

						None => {
							if specifier.keyword {
								return Err(Error::new(ErrorCode::KeywordAsIdentifier, specifier.span));
							}
							self.reference(specifier.name, RefFlags::empty());

							ExportEntry {
								export_name: Some(specifier.alias),
								module: None,
								import_name: None,
								local_name: Some(specifier.name),
								span: specifier.span,
							}
						}
					};

					self.add_export(entry)?;
				}

				let node = self.make::<M>(NodeKind::ExportNamed { from }, self.span_from(start))?;
				self.consume_semicolon::<M>(node)?;
				Ok(node)
			}

			TokenKind::Keyword(Keyword::Default) => self.parse_export_default::<M>(start),

			TokenKind::Keyword(Keyword::Var)
			| TokenKind::Keyword(Keyword::Const)
			| TokenKind::Keyword(Keyword::Function)
			| TokenKind::Keyword(Keyword::Class) => self.parse_export_declaration::<M>(start),

			TokenKind::Identifier { pid, escaped: false } if pid == self.names.let_ || pid == self.names.async_ => {
				self.parse_export_declaration::<M>(start)
			}

			_ => Err(self.unexpected()),
		}
	}


	/// `export var`, `let`, `const`, `function` or `class`. Every name the declaration
	/// binds is exported under its own name.
	fn parse_export_declaration<M: BuildMode>(&mut self, start: u32) -> Result<NodeId, Error> {
		self.bound_names = Some(Vec::new());
		let declaration = if self.token.is_keyword(Keyword::Var) {
			self.parse_statement::<M>()
		} else {
			self.parse_statement_item::<M>()
		};
		let names = self.bound_names.take().unwrap_or_default();

		let declaration = declaration?;
		if M::BUILD_AST && matches!(self.ast.kind(declaration), NodeKind::Expr(_)) {
			// `let` or `async` turned out to be an expression.
			return Err(Error::new(ErrorCode::Syntax, self.ast.node(declaration).span));
		}

		for (pid, _, span) in names {
			self.add_export(ExportEntry {
				export_name: Some(pid),
				module: None,
				import_name: None,
				local_name: Some(pid),
				span,
			})?;
		}

		self.make::<M>(NodeKind::ExportDecl(declaration), self.span_from(start))
	}


	/// `export default` followed by a function, a class or an expression. Anonymous
	/// exports are bound to `*default*`.
	fn parse_export_default<M: BuildMode>(&mut self, start: u32) -> Result<NodeId, Error> {
		let default_span = self.token.span;
		self.step()?;

		let is_function = match self.token.kind {
			TokenKind::Keyword(Keyword::Function) => true,
			TokenKind::Identifier { pid, escaped: false } if pid == self.names.async_ => {
				let next = self.peek()?;
				next.is_keyword(Keyword::Function) && !next.newline_before
			}
			_ => false,
		};

		self.bound_names = Some(Vec::new());

		let value = if is_function {
			self.parse_default_function::<M>()
		} else if self.token.is_keyword(Keyword::Class) {
			self.parse_class_form::<M>(ClassForm::DefaultExport)
		} else {
			self.parse_default_expression::<M>()
		};

		let names = self.bound_names.take().unwrap_or_default();
		let value = value?;

		let local_name = match names.first() {
			Some(&(pid, _, _)) => pid,
			None => {
				self.declare(self.names.star_default, SymbolKind::Let, default_span)?;
				self.names.star_default
			}
		};

		self.add_export(ExportEntry {
			export_name: Some(self.names.default),
			module: None,
			import_name: None,
			local_name: Some(local_name),
			span: default_span,
		})?;

		self.make::<M>(NodeKind::ExportDefault(value), self.span_from(start))
	}


	fn parse_default_function<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let mut header = self.parse_function_header(FunctionKind::Declaration, false, true)?;
		header.flags.insert(FncFlags::DEFAULT_MODULE_EXPORT);

		let (node, _) = self.parse_function::<M>(header)?;
		if M::BUILD_AST {
			self.ast.node_mut(node).flags.insert(NodeFlags::DECLARATION);
		}

		Ok(node)
	}


	fn parse_default_expression<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		// Names bound by nested functions are not the exported name.
		let bound_names = self.bound_names.take();
		let value = self.parse_assignment::<M>(true);
		self.bound_names = bound_names;

		let value = value?;
		self.consume_semicolon::<M>(NodeId::NONE)?;

		Ok(value.node)
	}


	// Clauses:

	/// `{ name, name as alias, ... }`.
	fn parse_specifiers(&mut self) -> Result<Vec<Specifier>, Error> {
		self.expect(Punct::LCurly, ErrorCode::ExpectedLCurly)?;

		let mut specifiers = Vec::new();
		while !self.token.is_punct(Punct::RCurly) {
			let span = self.token.span;
			let keyword = matches!(self.token.kind, TokenKind::Keyword(_));
			let name = self.parse_identifier_name()?;

			let alias = if self.at_contextual(self.names.as_) {
				self.step()?;
				self.parse_identifier_name()?
			} else {
				name
			};

			specifiers.push(Specifier { name, alias, keyword, span: self.span_from(span.ich_min) });

			if !self.token.is_punct(Punct::RCurly) {
				self.expect(Punct::Comma, ErrorCode::ExpectedRCurly)?;
			}
		}

		self.step()?;

		Ok(specifiers)
	}


	/// `from "module"`, returning the module specifier.
	fn parse_from_clause(&mut self) -> Result<Pid, Error> {
		if !self.at_contextual(self.names.from) {
			return Err(self.unexpected());
		}
		self.step()?;

		match self.token.kind {
			TokenKind::String { value, .. } => {
				self.step()?;
				Ok(value)
			}

			_ => Err(self.error(ErrorCode::ExpectedString)),
		}
	}


	fn add_export(&mut self, entry: ExportEntry) -> Result<(), Error> {
		let name = entry.export_name;
		let span = entry.span;

		if let Some(record) = self.module.as_mut() {
			if record.add_export(entry).is_err() {
				if let Some(name) = name {
					return Err(Error::new(ErrorCode::DuplicateExport { name }, span));
				}
			}
		}

		Ok(())
	}


	/// Module items only appear at the top level of modules.
	fn check_module_item(&self) -> Result<(), Error> {
		let top_level = self.module.is_some()
			&& self.context.function == FunctionId::PROGRAM
			&& self.binder.scope(self.current_scope()).kind == ScopeKind::Module;

		if top_level {
			Ok(())
		} else {
			Err(self.error(ErrorCode::ModuleItemOutsideModule))
		}
	}
}
