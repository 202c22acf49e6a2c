use super::{
	expr::{Expr, Shape},
	function::ParamInfo,
	pattern::Binding,
	BuildMode,
	Error,
	ErrorCode,
	Label,
	Parser,
};
use crate::{
	pid::Pid,
	semantic::ScopeKind,
	syntax::{
		ast::{DeclKind, FncFlags, NodeFlags, NodeId, NodeKind},
		lexer::{Keyword, Punct, TokenKind},
		Span,
	},
};


/// The first clause of a `for` statement.
#[derive(Debug)]
enum ForInit {
	None,
	Declarations { list: DeclList },
	Expr(Expr),
	/// A literal head already turned into a pattern.
	Pattern(NodeId),
}


/// A parsed declaration list.
#[derive(Debug)]
struct DeclList {
	node: NodeId,
	count: usize,
	initialized: bool,
	/// The first declaration lacking a required initializer. Only reported by a `for` head
	/// once it is known not to be a `for-in` or `for-of`.
	missing_init: Option<Error>,
}


impl<'a> Parser<'a> {
	// Statement lists:

	/// Statements up to a closing brace or the end of the input. When `directives` is
	/// set, the list starts with a directive prologue.
	pub(super) fn parse_statement_list<M: BuildMode>(
		&mut self,
		directives: bool,
		params: Option<&ParamInfo>,
	) -> Result<Vec<NodeId>, Error> {
		let mut statements = Vec::new();
		let mut prologue = directives;
		// The first string with an octal escape in the prologue.
		let mut octal: Option<Span> = None;

		while !self.token.is_punct(Punct::RCurly) && !self.token.is_eof() {
			let statement = match self.token.kind {
				TokenKind::String { value, octal_escape } if prologue => {
					let span = self.token.span;
					let expr = self.parse_expr::<M>(true)?;

					if expr.span == span {
						if octal_escape && octal.is_none() {
							octal = Some(span);
						}

						// The directive must be spelled without escapes.
						if value == self.names.use_strict && span.len() == 12 {
							self.enter_strict(params, span)?;
							if let Some(octal) = octal {
								return Err(Error::new(ErrorCode::OctalStrict, octal));
							}
						}
					} else {
						prologue = false;
					}

					let node = self.make::<M>(NodeKind::Expr(expr.node), self.span_from(span.ich_min))?;
					self.consume_semicolon::<M>(node)?;
					node
				}

				_ => {
					prologue = false;
					self.parse_statement_item::<M>()?
				}
			};

			if M::BUILD_AST {
				statements.push(statement);
			}
		}

		Ok(statements)
	}


	/// A `"use strict"` directive: the rest of the function is strict, and what was
	/// already parsed must satisfy the strict rules too.
	fn enter_strict(&mut self, params: Option<&ParamInfo>, directive: Span) -> Result<(), Error> {
		if let Some(params) = params {
			if !params.simple {
				return Err(Error::new(ErrorCode::IllegalUseStrict, directive));
			}

			self.validate_params(params, true)?;
		}

		self.context.strict = true;
		self.context.flags.insert(FncFlags::STRICT);

		Ok(())
	}


	/// A statement or a declaration.
	pub(super) fn parse_statement_item<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		match { self.token.kind } {
			TokenKind::Keyword(Keyword::Function) => self.parse_function_statement::<M>(),

			TokenKind::Identifier { pid, escaped: false } if pid == self.names.async_ => {
				let next = self.peek()?;
				if next.is_keyword(Keyword::Function) && !next.newline_before {
					self.parse_function_statement::<M>()
				} else {
					self.parse_statement::<M>()
				}
			}

			TokenKind::Keyword(Keyword::Class) => self.parse_class::<M>(true),

			TokenKind::Keyword(Keyword::Const) => self.parse_lexical_declaration::<M>(DeclKind::Const),

			TokenKind::Identifier { pid, escaped: false } if pid == self.names.let_ && self.let_is_declaration()? => {
				self.parse_lexical_declaration::<M>(DeclKind::Let)
			}

			TokenKind::Keyword(Keyword::Import) => {
				let next = self.peek()?;
				if next.is_punct(Punct::LParen) || next.is_punct(Punct::Dot) {
					self.parse_statement::<M>()
				} else {
					self.parse_import::<M>()
				}
			}

			TokenKind::Keyword(Keyword::Export) => self.parse_export::<M>(),

			_ => self.parse_statement::<M>(),
		}
	}


	/// `let` starts a declaration when a binding follows it.
	fn let_is_declaration(&mut self) -> Result<bool, Error> {
		let next = self.peek()?;
		Ok(matches!(
			next.kind,
			TokenKind::Identifier { .. }
				| TokenKind::Punct(Punct::LBrack)
				| TokenKind::Punct(Punct::LCurly)
		))
	}


	fn parse_function_statement<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		self.settle_labels(false);

		let node = self.parse_function_declaration::<M>(true)?;
		if M::BUILD_AST {
			self.ast.node_mut(node).flags.insert(NodeFlags::DECLARATION);
		}

		Ok(node)
	}


	/// A statement, where declarations are not allowed.
	pub(super) fn parse_statement<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;

		if let TokenKind::Identifier { pid, .. } = self.token.kind {
			if self.peek()?.is_punct(Punct::Colon) {
				return self.parse_labeled::<M>(pid);
			}
		}

		let is_loop = matches!(
			self.token.kind,
			TokenKind::Keyword(Keyword::For)
				| TokenKind::Keyword(Keyword::While)
				| TokenKind::Keyword(Keyword::Do)
		);
		self.settle_labels(is_loop);

		match self.token.kind {
			TokenKind::Punct(Punct::LCurly) => self.parse_block::<M>(),

			TokenKind::Punct(Punct::Semicolon) => {
				let span = self.token.span;
				self.step()?;
				self.make_flagged::<M>(NodeKind::Empty, span, NodeFlags::EXPLICIT_SEMICOLON)
			}

			TokenKind::Keyword(Keyword::Var) => {
				self.step()?;
				let list = self.parse_declarations::<M>(DeclKind::Var, start, true, false)?;
				let node = list.node;
				self.consume_semicolon::<M>(node)?;
				Ok(node)
			}

			TokenKind::Keyword(Keyword::If) => self.parse_if::<M>(),
			TokenKind::Keyword(Keyword::For) => self.parse_for::<M>(),
			TokenKind::Keyword(Keyword::While) => self.parse_while::<M>(),
			TokenKind::Keyword(Keyword::Do) => self.parse_do_while::<M>(),
			TokenKind::Keyword(Keyword::Continue) => self.parse_continue::<M>(),
			TokenKind::Keyword(Keyword::Break) => self.parse_break::<M>(),
			TokenKind::Keyword(Keyword::Return) => self.parse_return::<M>(),
			TokenKind::Keyword(Keyword::With) => self.parse_with::<M>(),
			TokenKind::Keyword(Keyword::Switch) => self.parse_switch::<M>(),
			TokenKind::Keyword(Keyword::Throw) => self.parse_throw::<M>(),
			TokenKind::Keyword(Keyword::Try) => self.parse_try::<M>(),

			TokenKind::Keyword(Keyword::Debugger) => {
				self.step()?;
				let node = self.make::<M>(NodeKind::Debugger, self.span_from(start))?;
				self.consume_semicolon::<M>(node)?;
				Ok(node)
			}

			TokenKind::Keyword(Keyword::Function) => {
				if self.context.strict {
					return Err(self.error(ErrorCode::BlockFunctionStrict));
				}
				self.parse_function_statement::<M>()
			}

			TokenKind::Keyword(Keyword::Class) | TokenKind::Keyword(Keyword::Const) => Err(self.unexpected()),

			TokenKind::Identifier { pid, escaped: false } if pid == self.names.let_ => {
				if self.peek()?.is_punct(Punct::LBrack) {
					return Err(self.unexpected());
				}
				self.parse_expression_statement::<M>()
			}

			_ => self.parse_expression_statement::<M>(),
		}
	}


	fn parse_expression_statement<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;

		let expr = self.parse_expr::<M>(true)?;
		let node = self.make::<M>(NodeKind::Expr(expr.node), self.span_from(start))?;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	/// `{ statements }` in a block scope.
	pub(super) fn parse_block<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.expect(Punct::LCurly, ErrorCode::ExpectedLCurly)?;

		let scope = self.binder.start_parse_block(ScopeKind::Block, self.context.function);
		let statements = self.parse_statement_list::<M>(false, None)?;
		self.expect(Punct::RCurly, ErrorCode::ExpectedRCurly)?;
		self.binder.finish_parse_block(scope);

		self.make::<M>(
			NodeKind::Block { scope, statements: statements.into_boxed_slice() },
			self.span_from(start),
		)
	}


	// Declarations:

	fn parse_lexical_declaration<M: BuildMode>(&mut self, kind: DeclKind) -> Result<NodeId, Error> {
		self.settle_labels(false);

		let start = self.token.span.ich_min;
		self.step()?;

		let node = self.parse_declarations::<M>(kind, start, true, false)?.node;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	/// A comma separated list of declarations, after the `var`, `let` or `const` keyword.
	/// In the head of a `for` statement, missing initializers are left for the caller.
	fn parse_declarations<M: BuildMode>(
		&mut self,
		kind: DeclKind,
		start: u32,
		allow_in: bool,
		for_head: bool,
	) -> Result<DeclList, Error> {
		let mut declarations = Vec::new();
		let mut count = 0;
		let mut initialized = false;
		let mut missing_init = None;

		loop {
			let declaration_start = self.token.span.ich_min;
			let pattern = self.at_pattern();
			let target = self.parse_destructured_binding::<M>(Binding::from_decl(kind))?;

			let init = if self.eat(Punct::Assign)? {
				initialized = true;
				Some(self.parse_assignment::<M>(allow_in)?.node)
			} else {
				let missing = if kind == DeclKind::Const {
					Some(Error::new(ErrorCode::ConstWithoutInit, self.span_from(declaration_start)))
				} else if pattern {
					Some(self.error(ErrorCode::ExpectedAssign))
				} else {
					None
				};

				if let Some(error) = missing {
					if !for_head {
						return Err(error);
					}
					missing_init = missing_init.or(Some(error));
				}

				None
			};

			let declaration = self.make::<M>(
				NodeKind::VarDecl { kind, target, init },
				self.span_from(declaration_start),
			)?;

			count += 1;
			if M::BUILD_AST {
				declarations.push(declaration);
			}

			if !self.eat(Punct::Comma)? {
				break;
			}
		}

		let node = self.make::<M>(
			NodeKind::DeclList { kind, declarations: declarations.into_boxed_slice() },
			self.span_from(start),
		)?;

		Ok(DeclList { node, count, initialized, missing_init })
	}


	// Control flow:

	fn parse_if<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let test = self.parse_condition::<M>()?;
		let consequent = self.parse_statement::<M>()?;

		let alternate = if self.token.is_keyword(Keyword::Else) {
			self.step()?;
			Some(self.parse_statement::<M>()?)
		} else {
			None
		};

		self.make::<M>(NodeKind::If { test, consequent, alternate }, self.span_from(start))
	}


	/// `( expression )`.
	fn parse_condition<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		self.expect(Punct::LParen, ErrorCode::ExpectedLParen)?;
		let test = self.parse_expr::<M>(true)?;
		self.expect(Punct::RParen, ErrorCode::ExpectedRParen)?;
		Ok(test.node)
	}


	/// The body of a loop, where unlabeled `break` and `continue` are allowed.
	fn parse_loop_body<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		self.context.breakable += 1;
		self.context.iteration += 1;

		let body = self.parse_statement::<M>();

		self.context.breakable -= 1;
		self.context.iteration -= 1;

		body
	}


	fn parse_while<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let test = self.parse_condition::<M>()?;
		let body = self.parse_loop_body::<M>()?;

		self.make::<M>(NodeKind::While { test, body }, self.span_from(start))
	}


	fn parse_do_while<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let body = self.parse_loop_body::<M>()?;
		self.expect_keyword(Keyword::While, ErrorCode::ExpectedWhile)?;
		let test = self.parse_condition::<M>()?;

		// The semicolon after `do ... while (test)` is always optional.
		let flags = if self.eat(Punct::Semicolon)? {
			NodeFlags::EXPLICIT_SEMICOLON
		} else {
			NodeFlags::AUTOMATIC_SEMICOLON
		};

		self.make_flagged::<M>(NodeKind::DoWhile { body, test }, self.span_from(start), flags)
	}


	fn parse_for<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;
		self.expect(Punct::LParen, ErrorCode::ExpectedLParen)?;

		let scope = self.binder.start_parse_block(ScopeKind::Block, self.context.function);

		let init_start = self.token.span.ich_min;
		let init = match { self.token.kind } {
			TokenKind::Punct(Punct::Semicolon) => ForInit::None,

			TokenKind::Keyword(Keyword::Var) => {
				self.step()?;
				self.parse_for_declarations::<M>(DeclKind::Var, init_start)?
			}

			TokenKind::Keyword(Keyword::Const) => {
				self.step()?;
				self.parse_for_declarations::<M>(DeclKind::Const, init_start)?
			}

			TokenKind::Identifier { pid, escaped: false } if pid == self.names.let_ && self.let_is_declaration()? => {
				self.step()?;
				self.parse_for_declarations::<M>(DeclKind::Let, init_start)?
			}

			TokenKind::Punct(Punct::LBrack) | TokenKind::Punct(Punct::LCurly) => self.parse_for_literal_head::<M>()?,

			_ => ForInit::Expr(self.parse_expr::<M>(false)?),
		};

		let of = self.at_contextual(self.names.of);
		let node = if self.token.is_keyword(Keyword::In) || of {
			let left = match init {
				ForInit::Declarations { list: DeclList { node, count: 1, initialized: false, .. } } => node,
				ForInit::Declarations { .. } => {
					return Err(Error::new(ErrorCode::InvalidForInit, self.span_from(init_start)));
				}
				ForInit::Expr(expr) => {
					self.check_simple_target(&expr)?;
					expr.node
				}
				ForInit::Pattern(node) => node,
				ForInit::None => return Err(self.unexpected()),
			};

			self.step()?;
			let right = if of {
				self.parse_assignment::<M>(true)?.node
			} else {
				self.parse_expr::<M>(true)?.node
			};
			self.expect(Punct::RParen, ErrorCode::ExpectedRParen)?;

			let body = self.parse_loop_body::<M>()?;

			NodeKind::ForIn { scope, of, left, right, body }
		} else {
			let init = match init {
				ForInit::None => None,
				ForInit::Declarations { list } => {
					if let Some(error) = list.missing_init {
						return Err(error);
					}
					Some(list.node)
				}
				ForInit::Expr(expr) => Some(expr.node),
				ForInit::Pattern(_) => return Err(self.unexpected()),
			};

			self.expect(Punct::Semicolon, ErrorCode::ExpectedSemicolon)?;
			let test = if self.token.is_punct(Punct::Semicolon) {
				None
			} else {
				Some(self.parse_expr::<M>(true)?.node)
			};

			self.expect(Punct::Semicolon, ErrorCode::ExpectedSemicolon)?;
			let update = if self.token.is_punct(Punct::RParen) {
				None
			} else {
				Some(self.parse_expr::<M>(true)?.node)
			};
			self.expect(Punct::RParen, ErrorCode::ExpectedRParen)?;

			let body = self.parse_loop_body::<M>()?;

			NodeKind::For { scope, init, test, update, body }
		};

		self.binder.finish_parse_block(scope);

		self.make::<M>(node, self.span_from(start))
	}


	fn parse_for_declarations<M: BuildMode>(&mut self, kind: DeclKind, start: u32) -> Result<ForInit, Error> {
		let list = self.parse_declarations::<M>(kind, start, false, true)?;
		Ok(ForInit::Declarations { list })
	}


	/// A `for` head starting with an array or object literal, which is a pattern when
	/// `in` or `of` follows.
	fn parse_for_literal_head<M: BuildMode>(&mut self) -> Result<ForInit, Error> {
		let checkpoint = self.checkpoint();
		let lhs = self.parse_lhs::<M>()?;

		let iterates = self.token.is_keyword(Keyword::In) || self.at_contextual(self.names.of);

		if !iterates {
			self.restore(checkpoint, "for head expression");
			return Ok(ForInit::Expr(self.parse_expr::<M>(false)?));
		}

		match lhs.shape {
			Shape::Literal { pattern, .. } => {
				if !pattern {
					self.commit(checkpoint);
					return Err(Error::new(ErrorCode::InvalidDestructuringTarget, lhs.span));
				}

				if self.reparse_patterns::<M>() {
					self.restore(checkpoint, "for head pattern");
					let pattern = self.parse_destructured_assignment::<M>()?;
					Ok(ForInit::Pattern(pattern))
				} else {
					self.commit(checkpoint);
					self.convert_to_pattern(lhs.node)?;
					Ok(ForInit::Pattern(lhs.node))
				}
			}

			_ => {
				self.commit(checkpoint);
				Ok(ForInit::Expr(lhs))
			}
		}
	}


	// Jumps:

	fn parse_continue<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let label = self.parse_jump_label()?;

		match label {
			Some((name, span)) => match self.find_label(name) {
				Some(label) if label.is_loop => (),
				Some(_) => return Err(Error::new(ErrorCode::BadContinue, span)),
				None => return Err(Error::new(ErrorCode::LabelNotFound, span)),
			},

			None if self.context.iteration == 0 => {
				return Err(Error::new(ErrorCode::BadContinue, self.span_from(start)));
			}

			None => (),
		}

		let node = self.make::<M>(NodeKind::Continue(label.map(|(name, _)| name)), self.span_from(start))?;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	fn parse_break<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let label = self.parse_jump_label()?;

		match label {
			Some((name, span)) => {
				if self.find_label(name).is_none() {
					return Err(Error::new(ErrorCode::LabelNotFound, span));
				}
			}

			None if self.context.breakable == 0 => {
				return Err(Error::new(ErrorCode::BadBreak, self.span_from(start)));
			}

			None => (),
		}

		let node = self.make::<M>(NodeKind::Break(label.map(|(name, _)| name)), self.span_from(start))?;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	/// The label of a `break` or `continue`, which must be on the same line.
	fn parse_jump_label(&mut self) -> Result<Option<(Pid, Span)>, Error> {
		match self.token.kind {
			TokenKind::Identifier { pid, .. } if !self.token.newline_before => {
				let span = self.token.span;
				self.step()?;
				Ok(Some((pid, span)))
			}

			_ => Ok(None),
		}
	}


	fn parse_return<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;

		if !self.context.in_function {
			return Err(self.error(ErrorCode::BadReturn));
		}

		self.step()?;

		let ends = self.token.is_punct(Punct::Semicolon)
			|| self.token.is_punct(Punct::RCurly)
			|| self.token.is_eof()
			|| self.token.newline_before;

		let argument = if ends {
			None
		} else {
			Some(self.parse_expr::<M>(true)?.node)
		};

		let node = self.make::<M>(NodeKind::Return(argument), self.span_from(start))?;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	fn parse_throw<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		if self.token.newline_before {
			return Err(self.error(ErrorCode::ThrowNewline));
		}

		let argument = self.parse_expr::<M>(true)?;
		let node = self.make::<M>(NodeKind::Throw(argument.node), self.span_from(start))?;
		self.consume_semicolon::<M>(node)?;

		Ok(node)
	}


	// Labels:

	fn parse_labeled<M: BuildMode>(&mut self, name: Pid) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		let span = self.token.span;

		if self.find_label(name).is_some() {
			return Err(Error::new(ErrorCode::LabelRedefined, span));
		}

		self.step()?;
		self.expect(Punct::Colon, ErrorCode::ExpectedColon)?;

		self.labels.push(Label { name, is_loop: false, pending: true });
		let body = self.parse_statement::<M>();
		self.labels.pop();

		let body = body?;
		self.make::<M>(NodeKind::Labeled { label: name, body }, self.span_from(start))
	}


	/// The labels of the current function that apply to the statement about to be parsed
	/// now know whether it is a loop.
	fn settle_labels(&mut self, is_loop: bool) {
		let first = self.context.labels;
		for label in self.labels[first ..].iter_mut().rev() {
			if !label.pending {
				break;
			}
			label.pending = false;
			label.is_loop = is_loop;
		}
	}


	fn find_label(&self, name: Pid) -> Option<Label> {
		self.labels[self.context.labels ..]
			.iter()
			.rev()
			.find(|label| label.name == name)
			.copied()
	}


	// Other statements:

	fn parse_with<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;

		if self.context.strict {
			return Err(self.error(ErrorCode::WithStrict));
		}

		self.step()?;
		let object = self.parse_condition::<M>()?;

		let scope = self.binder.push_dynamic_block(self.context.function);
		let body = self.parse_statement::<M>()?;
		self.binder.finish_parse_block(scope);

		self.context.flags.insert(FncFlags::HAS_WITH);

		self.make::<M>(NodeKind::With { object, scope, body }, self.span_from(start))
	}


	fn parse_switch<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let discriminant = self.parse_condition::<M>()?;
		self.expect(Punct::LCurly, ErrorCode::ExpectedLCurly)?;

		let scope = self.binder.start_parse_block(ScopeKind::Block, self.context.function);
		self.context.breakable += 1;

		let cases = self.parse_cases::<M>();

		self.context.breakable -= 1;
		let cases = cases?;

		self.expect(Punct::RCurly, ErrorCode::ExpectedRCurly)?;
		self.binder.finish_parse_block(scope);

		self.make::<M>(
			NodeKind::Switch { discriminant, scope, cases: cases.into_boxed_slice() },
			self.span_from(start),
		)
	}


	fn parse_cases<M: BuildMode>(&mut self) -> Result<Vec<NodeId>, Error> {
		let mut cases = Vec::new();
		let mut has_default = false;

		while !self.token.is_punct(Punct::RCurly) {
			let start = self.token.span.ich_min;

			let test = match self.token.kind {
				TokenKind::Keyword(Keyword::Case) => {
					self.step()?;
					Some(self.parse_expr::<M>(true)?.node)
				}

				TokenKind::Keyword(Keyword::Default) => {
					if has_default {
						return Err(self.error(ErrorCode::DuplicateDefault));
					}
					has_default = true;
					self.step()?;
					None
				}

				_ => return Err(self.unexpected()),
			};

			self.expect(Punct::Colon, ErrorCode::ExpectedColon)?;

			let mut body = Vec::new();
			while !matches!(
				self.token.kind,
				TokenKind::Keyword(Keyword::Case)
					| TokenKind::Keyword(Keyword::Default)
					| TokenKind::Punct(Punct::RCurly)
			) {
				if self.token.is_eof() {
					return Err(self.error(ErrorCode::ExpectedRCurly));
				}

				let statement = self.parse_statement_item::<M>()?;
				if M::BUILD_AST {
					body.push(statement);
				}
			}

			let case = self.make::<M>(
				NodeKind::Case { test, body: body.into_boxed_slice() },
				self.span_from(start),
			)?;
			if M::BUILD_AST {
				cases.push(case);
			}
		}

		Ok(cases)
	}


	fn parse_try<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let block = self.parse_block::<M>()?;

		let handler = if self.token.is_keyword(Keyword::Catch) {
			Some(self.parse_catch::<M>()?)
		} else {
			None
		};

		let finalizer = if self.token.is_keyword(Keyword::Finally) {
			self.step()?;
			Some(self.parse_block::<M>()?)
		} else {
			None
		};

		if handler.is_none() && finalizer.is_none() {
			return Err(self.unexpected());
		}

		self.make::<M>(NodeKind::Try { block, handler, finalizer }, self.span_from(start))
	}


	/// `catch (param) { ... }`. The parameter lives in its own scope around the block.
	fn parse_catch<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let scope = self.binder.start_parse_block(ScopeKind::Catch, self.context.function);

		let param = if self.eat(Punct::LParen)? {
			let param = self.parse_destructured_binding::<M>(Binding::Catch)?;
			self.expect(Punct::RParen, ErrorCode::ExpectedRParen)?;
			Some(param)
		} else {
			None
		};

		let body = self.parse_block::<M>()?;
		self.binder.finish_parse_block(scope);

		self.make::<M>(NodeKind::Catch { scope, param, body }, self.span_from(start))
	}
}
