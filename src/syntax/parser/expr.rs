use super::{function::FunctionKind, BuildMode, Error, ErrorCode, Parser};
use crate::{
	pid::Pid,
	semantic::{RefFlags, RefId},
	syntax::{
		ast::{AssignOp, BinaryOp, FncFlags, NodeFlags, NodeId, NodeKind, PropertyKey, PropertyKind, UnaryOp, UpdateOp},
		config::DestructuringStrategy,
		lexer::{Keyword, Punct, TokenKind},
		Span,
	},
};


/// What is known about a parsed expression, which decides whether it may be assigned to
/// or reinterpreted as a destructuring pattern. This is threaded through the whole
/// expression grammar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Shape {
	Name { pid: Pid, reference: RefId },
	/// A property access.
	Member,
	Call,
	/// An array or object literal. `pattern` is set when every element is a valid pattern
	/// element. `cover` is set when a shorthand property has an initializer, `{ a = 1 }`,
	/// which is only valid if the literal becomes a pattern.
	Literal { pattern: bool, cover: bool },
	/// A plain assignment. Valid as a pattern element with a default when the target is.
	Assignment { pattern: bool },
	Unary,
	Other,
}


impl Shape {
	pub fn is_simple_target(self) -> bool {
		matches!(self, Self::Name { .. } | Self::Member)
	}


	pub fn is_pattern_element(self) -> bool {
		match self {
			Self::Name { .. } | Self::Member => true,
			Self::Literal { pattern, .. } | Self::Assignment { pattern } => pattern,
			_ => false,
		}
	}


	fn has_cover(self) -> bool {
		matches!(self, Self::Literal { cover: true, .. })
	}
}


/// A parsed expression. The node is `NodeId::NONE` in syntax only mode.
#[derive(Debug, Clone, Copy)]
pub(super) struct Expr {
	pub node: NodeId,
	pub span: Span,
	pub shape: Shape,
}


impl<'a> Parser<'a> {
	/// Expression: a comma separated sequence of assignment expressions.
	pub(super) fn parse_expr<M: BuildMode>(&mut self, allow_in: bool) -> Result<Expr, Error> {
		let first = self.parse_assignment::<M>(allow_in)?;
		if !self.token.is_punct(Punct::Comma) {
			return Ok(first);
		}

		let start = first.span.ich_min;
		let mut left = first.node;

		while self.eat(Punct::Comma)? {
			let right = self.parse_assignment::<M>(allow_in)?;
			left = self.make::<M>(
				NodeKind::Binary { op: BinaryOp::Comma, left, right: right.node },
				self.span_from(start),
			)?;
		}

		Ok(Expr { node: left, span: self.span_from(start), shape: Shape::Other })
	}


	/// Assignment expression, rejecting shorthand initializers that didn't become part of
	/// a pattern.
	pub(super) fn parse_assignment<M: BuildMode>(&mut self, allow_in: bool) -> Result<Expr, Error> {
		let expr = self.parse_assignment_cover::<M>(allow_in)?;

		if expr.shape.has_cover() {
			return Err(Error::new(ErrorCode::InvalidCoverInitializer, expr.span));
		}

		Ok(expr)
	}


	/// Assignment expression, which may still be a cover grammar for a pattern.
	fn parse_assignment_cover<M: BuildMode>(&mut self, allow_in: bool) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;

		if self.context.generator && self.at_contextual(self.names.yield_) {
			return self.parse_yield::<M>(allow_in);
		}

		let lhs = match self.token.kind {
			TokenKind::Identifier { pid, escaped: false } if pid == self.names.async_ => {
				let next = self.peek()?;
				if next.newline_before {
					self.parse_conditional::<M>(allow_in)?
				} else if next.kind.identifier().is_some() {
					return self.parse_arrow_function::<M>(true, start);
				} else if next.is_punct(Punct::LParen) {
					match self.parse_parenthesized_or_arrow::<M>(allow_in, true)? {
						(arrow, true) => return Ok(arrow),
						(expr, false) => expr,
					}
				} else if next.is_punct(Punct::Arrow) {
					return self.parse_arrow_function::<M>(false, start);
				} else {
					self.parse_conditional::<M>(allow_in)?
				}
			}

			TokenKind::Identifier { .. } => {
				let next = self.peek()?;
				if next.is_punct(Punct::Arrow) && !next.newline_before {
					return self.parse_arrow_function::<M>(false, start);
				}
				self.parse_conditional::<M>(allow_in)?
			}

			TokenKind::Punct(Punct::LParen) => {
				match self.parse_parenthesized_or_arrow::<M>(allow_in, false)? {
					(arrow, true) => return Ok(arrow),
					(expr, false) => expr,
				}
			}

			TokenKind::Punct(Punct::LBrack) | TokenKind::Punct(Punct::LCurly) if self.reparse_patterns::<M>() => {
				let checkpoint = self.checkpoint();
				let lhs = self.parse_conditional::<M>(allow_in)?;

				let destructuring = matches!(lhs.shape, Shape::Literal { .. })
					&& self.token.is_punct(Punct::Assign);

				if !destructuring {
					self.commit(checkpoint);
					return self.parse_assignment_rest::<M>(lhs, allow_in);
				}

				if !lhs.shape.is_pattern_element() {
					return Err(Error::new(ErrorCode::InvalidDestructuringTarget, lhs.span));
				}

				self.restore(checkpoint, "destructuring assignment");
				let target = self.parse_destructured_assignment::<M>()?;
				return self.parse_pattern_assignment::<M>(target, start, allow_in);
			}

			_ => self.parse_conditional::<M>(allow_in)?,
		};

		self.parse_assignment_rest::<M>(lhs, allow_in)
	}


	/// Whether destructuring assignments are parsed again with the pattern grammar, rather
	/// than converted in place. Without a tree there is nothing to convert.
	pub(super) fn reparse_patterns<M: BuildMode>(&self) -> bool {
		!M::BUILD_AST || self.options.destructuring == DestructuringStrategy::Reparse
	}


	/// The operator and right hand side of an assignment, if any.
	fn parse_assignment_rest<M: BuildMode>(&mut self, lhs: Expr, allow_in: bool) -> Result<Expr, Error> {
		let op = match self.token.kind {
			TokenKind::Punct(punct) => AssignOp::from_punct(punct),
			_ => None,
		};

		let op = match op {
			Some(op) => op,
			None => return Ok(lhs),
		};

		if op == AssignOp::Assign && matches!(lhs.shape, Shape::Literal { .. }) {
			if !lhs.shape.is_pattern_element() {
				return Err(Error::new(ErrorCode::InvalidDestructuringTarget, lhs.span));
			}

			self.convert_to_pattern(lhs.node)?;
			return self.parse_pattern_assignment::<M>(lhs.node, lhs.span.ich_min, allow_in);
		}

		self.check_simple_target(&lhs)?;
		self.step()?;

		let value = self.parse_assignment::<M>(allow_in)?;
		let span = self.span_from(lhs.span.ich_min);
		let node = self.make::<M>(NodeKind::Assign { op, target: lhs.node, value: value.node }, span)?;

		let pattern = op == AssignOp::Assign && lhs.shape.is_simple_target();

		Ok(Expr { node, span, shape: Shape::Assignment { pattern } })
	}


	/// `= value` after a destructuring pattern.
	fn parse_pattern_assignment<M: BuildMode>(
		&mut self,
		target: NodeId,
		start: u32,
		allow_in: bool,
	) -> Result<Expr, Error> {
		self.expect(Punct::Assign, ErrorCode::ExpectedAssign)?;

		let value = self.parse_assignment::<M>(allow_in)?;
		let span = self.span_from(start);
		let node = self.make::<M>(
			NodeKind::Assign { op: AssignOp::Assign, target, value: value.node },
			span,
		)?;

		Ok(Expr { node, span, shape: Shape::Assignment { pattern: true } })
	}


	/// Validate a simple assignment target, marking assigned names.
	pub(super) fn check_simple_target(&mut self, expr: &Expr) -> Result<(), Error> {
		match expr.shape {
			Shape::Name { pid, reference } => {
				if self.context.strict && self.names.is_eval_or_arguments(pid) {
					let code = if pid == self.names.eval {
						ErrorCode::EvalStrict
					} else {
						ErrorCode::ArgumentsStrict
					};
					return Err(Error::new(code, expr.span));
				}

				self.binder.flag_ref(reference, RefFlags::ASSIGNMENT);
				Ok(())
			}

			Shape::Member => Ok(()),

			_ => Err(Error::new(ErrorCode::InvalidAssignmentTarget, expr.span)),
		}
	}


	/// Try a parenthesized expression first. When it is followed by an arrow, or fails to
	/// parse, rewind and parse the same span as arrow parameters. Returns whether the
	/// result is an arrow function.
	fn parse_parenthesized_or_arrow<M: BuildMode>(
		&mut self,
		allow_in: bool,
		is_async: bool,
	) -> Result<(Expr, bool), Error> {
		let start = self.token.span.ich_min;
		let checkpoint = self.checkpoint();

		match self.parse_conditional::<M>(allow_in) {
			Ok(_) if self.token.is_punct(Punct::Arrow) => {
				self.restore(checkpoint, "arrow parameters");
				let arrow = self.parse_arrow_function::<M>(is_async, start)?;
				Ok((arrow, true))
			}

			Ok(expr) => {
				self.commit(checkpoint);
				Ok((expr, false))
			}

			Err(error) => {
				self.restore(checkpoint, "arrow parameters after error");
				// Input that is neither an expression nor an arrow function reports the
				// expression error.
				match self.parse_arrow_function::<M>(is_async, start) {
					Ok(arrow) => Ok((arrow, true)),
					Err(_) => Err(error),
				}
			}
		}
	}


	fn parse_yield<M: BuildMode>(&mut self, allow_in: bool) -> Result<Expr, Error> {
		if self.context.in_params {
			return Err(self.error(ErrorCode::YieldInParameter));
		}

		let start = self.token.span.ich_min;
		self.step()?;

		let mut delegate = false;
		let argument = if !self.token.newline_before && self.eat(Punct::Star)? {
			delegate = true;
			Some(self.parse_assignment::<M>(allow_in)?.node)
		} else if self.at_expression_end() {
			None
		} else {
			Some(self.parse_assignment::<M>(allow_in)?.node)
		};

		let span = self.span_from(start);
		let node = self.make::<M>(NodeKind::Yield { argument, delegate }, span)?;

		Ok(Expr { node, span, shape: Shape::Other })
	}


	/// Whether the current token can't start an operand on the same line.
	pub(super) fn at_expression_end(&self) -> bool {
		self.token.newline_before
			|| self.token.is_eof()
			|| matches!(
				self.token.kind,
				TokenKind::Punct(Punct::RParen)
					| TokenKind::Punct(Punct::RBrack)
					| TokenKind::Punct(Punct::RCurly)
					| TokenKind::Punct(Punct::Comma)
					| TokenKind::Punct(Punct::Semicolon)
					| TokenKind::Punct(Punct::Colon)
					| TokenKind::Keyword(Keyword::In)
			)
	}


	/// Conditional expression, `test ? consequent : alternate`.
	pub(super) fn parse_conditional<M: BuildMode>(&mut self, allow_in: bool) -> Result<Expr, Error> {
		let test = self.parse_binary::<M>(4, allow_in)?;
		self.parse_conditional_rest::<M>(test, allow_in)
	}


	fn parse_conditional_rest<M: BuildMode>(&mut self, test: Expr, allow_in: bool) -> Result<Expr, Error> {
		if !self.eat(Punct::Question)? {
			return Ok(test);
		}

		let consequent = self.parse_assignment::<M>(true)?;
		self.expect(Punct::Colon, ErrorCode::ExpectedColon)?;
		let alternate = self.parse_assignment::<M>(allow_in)?;

		let span = self.span_from(test.span.ich_min);
		let node = self.make::<M>(
			NodeKind::Conditional {
				test: test.node,
				consequent: consequent.node,
				alternate: alternate.node,
			},
			span,
		)?;

		Ok(Expr { node, span, shape: Shape::Other })
	}


	/// Binary operators with a precedence above `floor`, by precedence climbing.
	fn parse_binary<M: BuildMode>(&mut self, floor: u8, allow_in: bool) -> Result<Expr, Error> {
		let left = self.parse_unary::<M>()?;
		self.parse_binary_rest::<M>(left, floor, allow_in)
	}


	fn parse_binary_rest<M: BuildMode>(&mut self, mut left: Expr, floor: u8, allow_in: bool) -> Result<Expr, Error> {
		loop {
			let op = match BinaryOp::from_token(&self.token.kind, allow_in) {
				Some(op) if op.precedence() > floor => op,
				_ => break,
			};

			// `-a ** b` is ambiguous, the operand must be parenthesized.
			if op == BinaryOp::Exp && left.shape == Shape::Unary {
				return Err(Error::new(ErrorCode::Syntax, left.span));
			}

			self.step()?;

			let next_floor = if op.is_right_associative() {
				op.precedence() - 1
			} else {
				op.precedence()
			};
			let right = self.parse_binary::<M>(next_floor, allow_in)?;

			let span = left.span.to(right.span);
			let node = self.make::<M>(NodeKind::Binary { op, left: left.node, right: right.node }, span)?;
			left = Expr { node, span, shape: Shape::Other };
		}

		Ok(left)
	}


	/// Prefix operators.
	fn parse_unary<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;

		if let Some(op) = UnaryOp::from_token(&self.token.kind) {
			self.step()?;
			let operand = self.parse_unary::<M>()?;

			if op == UnaryOp::Delete && self.context.strict && matches!(operand.shape, Shape::Name { .. }) {
				return Err(Error::new(ErrorCode::DeleteNameStrict, operand.span));
			}

			let span = self.span_from(start);
			let node = self.make::<M>(NodeKind::Unary { op, operand: operand.node }, span)?;
			return Ok(Expr { node, span, shape: Shape::Unary });
		}

		if let TokenKind::Punct(punct) = self.token.kind {
			if let Some(op) = UpdateOp::from_punct(punct) {
				self.step()?;
				let operand = self.parse_unary::<M>()?;
				self.check_simple_target(&operand)?;

				let span = self.span_from(start);
				let node = self.make::<M>(
					NodeKind::Update { op, prefix: true, operand: operand.node },
					span,
				)?;
				return Ok(Expr { node, span, shape: Shape::Other });
			}
		}

		if self.context.is_async && self.at_contextual(self.names.await_) {
			if self.context.in_params {
				return Err(self.error(ErrorCode::AwaitOutsideAsync));
			}

			self.step()?;
			let operand = self.parse_unary::<M>()?;

			let span = self.span_from(start);
			let node = self.make::<M>(NodeKind::Await(operand.node), span)?;
			return Ok(Expr { node, span, shape: Shape::Unary });
		}

		let operand = self.parse_lhs::<M>()?;
		self.parse_postfix_rest::<M>(operand)
	}


	/// Postfix increment and decrement, which can't follow a line break.
	fn parse_postfix_rest<M: BuildMode>(&mut self, operand: Expr) -> Result<Expr, Error> {
		let op = match self.token.kind {
			TokenKind::Punct(punct) if !self.token.newline_before => UpdateOp::from_punct(punct),
			_ => None,
		};

		let op = match op {
			Some(op) => op,
			None => return Ok(operand),
		};

		self.check_simple_target(&operand)?;
		self.step()?;

		let span = self.span_from(operand.span.ich_min);
		let node = self.make::<M>(NodeKind::Update { op, prefix: false, operand: operand.node }, span)?;

		Ok(Expr { node, span, shape: Shape::Other })
	}


	/// Left hand side expression: member accesses, calls and `new`.
	pub(super) fn parse_lhs<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let expr = match self.token.kind {
			TokenKind::Keyword(Keyword::New) => self.parse_new::<M>()?,
			TokenKind::Keyword(Keyword::Super) => self.parse_super::<M>()?,
			_ => self.parse_primary::<M>()?,
		};

		self.parse_member_tail::<M>(expr, true)
	}


	/// Property accesses, tagged templates and, if allowed, calls.
	fn parse_member_tail<M: BuildMode>(&mut self, mut expr: Expr, allow_call: bool) -> Result<Expr, Error> {
		let start = expr.span.ich_min;

		loop {
			match self.token.kind {
				TokenKind::Punct(Punct::Dot) => {
					self.step()?;
					let property = self.parse_identifier_name()?;

					let span = self.span_from(start);
					let node = self.make::<M>(NodeKind::Member { object: expr.node, property }, span)?;
					expr = Expr { node, span, shape: Shape::Member };
				}

				TokenKind::Punct(Punct::LBrack) => {
					self.step()?;
					let index = self.parse_expr::<M>(true)?;
					self.expect(Punct::RBrack, ErrorCode::ExpectedRBrack)?;

					if let Shape::Name { reference, .. } = expr.shape {
						self.binder.flag_ref(reference, RefFlags::USED_IN_LD_ELEM);
					}

					let span = self.span_from(start);
					let node = self.make::<M>(
						NodeKind::Index { object: expr.node, index: index.node },
						span,
					)?;
					expr = Expr { node, span, shape: Shape::Member };
				}

				TokenKind::Punct(Punct::LParen) if allow_call => {
					let arguments = self.parse_arguments::<M>()?;

					let mut flags = NodeFlags::empty();
					if matches!(expr.shape, Shape::Name { pid, .. } if pid == self.names.eval) {
						flags.insert(NodeFlags::DIRECT_EVAL);
						self.binder.set_calls_eval();
						self.context.flags.insert(FncFlags::CALLS_EVAL);
					}

					let span = self.span_from(start);
					let node = self.make_flagged::<M>(
						NodeKind::Call { callee: expr.node, arguments: arguments.into_boxed_slice() },
						span,
						flags,
					)?;
					expr = Expr { node, span, shape: Shape::Call };
				}

				TokenKind::Template { .. } => {
					expr = self.parse_template::<M>(Some(expr))?;
				}

				_ => return Ok(expr),
			}
		}
	}


	/// An identifier name after a dot, where reserved words are allowed.
	pub(super) fn parse_identifier_name(&mut self) -> Result<Pid, Error> {
		let pid = match self.token.kind {
			TokenKind::Identifier { pid, .. } => pid,
			TokenKind::Keyword(keyword) => self.scanner
				.interner()
				.lock()
				.get_or_intern(keyword.as_str()),
			_ => return Err(self.error(ErrorCode::ExpectedIdentifier)),
		};

		self.step()?;
		Ok(pid)
	}


	/// Call arguments, including the parentheses.
	pub(super) fn parse_arguments<M: BuildMode>(&mut self) -> Result<Vec<NodeId>, Error> {
		self.expect(Punct::LParen, ErrorCode::ExpectedLParen)?;

		let mut arguments = Vec::new();

		while !self.token.is_punct(Punct::RParen) {
			let start = self.token.span.ich_min;

			let argument = if self.eat(Punct::Ellipsis)? {
				let operand = self.parse_assignment::<M>(true)?;
				self.make::<M>(NodeKind::Spread(operand.node), self.span_from(start))?
			} else {
				self.parse_assignment::<M>(true)?.node
			};

			if M::BUILD_AST {
				arguments.push(argument);
			}

			if !self.token.is_punct(Punct::RParen) {
				self.expect(Punct::Comma, ErrorCode::ExpectedRParen)?;
			}
		}

		self.step()?;

		Ok(arguments)
	}


	fn parse_new<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		if self.eat(Punct::Dot)? {
			if !self.at_contextual(self.names.target) {
				return Err(self.error(ErrorCode::ExpectedIdentifier));
			}
			if !self.context.new_target {
				return Err(Error::new(ErrorCode::BadNewTarget, self.span_from(start)));
			}
			self.step()?;

			let span = self.span_from(start);
			let node = self.make::<M>(NodeKind::NewTarget, span)?;
			return Ok(Expr { node, span, shape: Shape::Other });
		}

		let callee = match self.token.kind {
			TokenKind::Keyword(Keyword::New) => self.parse_new::<M>()?,
			TokenKind::Keyword(Keyword::Super) => self.parse_super::<M>()?,
			_ => self.parse_primary::<M>()?,
		};
		let callee = self.parse_member_tail::<M>(callee, false)?;

		let arguments = if self.token.is_punct(Punct::LParen) {
			self.parse_arguments::<M>()?
		} else {
			Vec::new()
		};

		let span = self.span_from(start);
		let node = self.make::<M>(
			NodeKind::New { callee: callee.node, arguments: arguments.into_boxed_slice() },
			span,
		)?;

		Ok(Expr { node, span, shape: Shape::Other })
	}


	/// `super(...)`, `super.name` or `super[index]`.
	fn parse_super<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		match self.token.kind {
			TokenKind::Punct(Punct::LParen) => {
				if !self.context.super_call {
					return Err(Error::new(ErrorCode::BadSuper, self.span_from(start)));
				}

				let arguments = self.parse_arguments::<M>()?;
				self.context.flags.insert(FncFlags::HAS_DIRECT_SUPER);

				let span = self.span_from(start);
				let node = self.make::<M>(
					NodeKind::SuperCall { arguments: arguments.into_boxed_slice() },
					span,
				)?;
				Ok(Expr { node, span, shape: Shape::Call })
			}

			TokenKind::Punct(Punct::Dot) | TokenKind::Punct(Punct::LBrack) => {
				if !self.context.super_property {
					return Err(Error::new(ErrorCode::BadSuper, self.span_from(start)));
				}

				self.context.flags.insert(FncFlags::HAS_SUPER_REFERENCE);

				let span = self.span_from(start);
				let node = self.make::<M>(NodeKind::Super, span)?;
				Ok(Expr { node, span, shape: Shape::Other })
			}

			_ => Err(Error::new(ErrorCode::BadSuper, self.span_from(start))),
		}
	}


	fn parse_primary<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;

		let kind = match self.token.kind {
			TokenKind::Identifier { pid, escaped } => {
				if pid == self.names.async_ && !escaped {
					let next = self.peek()?;
					if next.is_keyword(Keyword::Function) && !next.newline_before {
						return self.parse_function_expression::<M>();
					}
				}

				return self.parse_identifier_reference::<M>(pid, escaped);
			}

			TokenKind::Keyword(Keyword::Function) => return self.parse_function_expression::<M>(),

			TokenKind::Keyword(Keyword::Class) => return self.parse_class_expression::<M>(),

			TokenKind::Keyword(Keyword::Import) => return self.parse_import_call::<M>(),

			TokenKind::Keyword(Keyword::This) => NodeKind::This,
			TokenKind::Keyword(Keyword::Null) => NodeKind::Null,
			TokenKind::Keyword(Keyword::True) => NodeKind::True,
			TokenKind::Keyword(Keyword::False) => NodeKind::False,

			TokenKind::Number { value, legacy_octal } => {
				if legacy_octal && self.context.strict {
					return Err(self.error(ErrorCode::OctalStrict));
				}
				NodeKind::Number(value)
			}

			TokenKind::String { value, octal_escape } => {
				if octal_escape && self.context.strict {
					return Err(self.error(ErrorCode::OctalStrict));
				}
				NodeKind::String(value)
			}

			TokenKind::Template { .. } => return self.parse_template::<M>(None),

			TokenKind::Punct(Punct::Slash) | TokenKind::Punct(Punct::SlashAssign) => {
				self.rescan_regex()?;
				match self.token.kind {
					TokenKind::Regex { pattern, flags } => NodeKind::Regex { pattern, flags },
					_ => return Err(self.unexpected()),
				}
			}

			TokenKind::Punct(Punct::LBrack) => return self.parse_array_literal::<M>(),

			TokenKind::Punct(Punct::LCurly) => return self.parse_object_literal::<M>(),

			TokenKind::Punct(Punct::LParen) => return self.parse_parenthesized::<M>(),

			_ => return Err(self.unexpected()),
		};

		self.step()?;

		let span = self.span_from(start);
		let node = self.make::<M>(kind, span)?;

		Ok(Expr { node, span, shape: Shape::Other })
	}


	/// A reference to a name.
	fn parse_identifier_reference<M: BuildMode>(&mut self, pid: Pid, escaped: bool) -> Result<Expr, Error> {
		let span = self.token.span;
		self.check_reference_name(pid, span, escaped)?;
		self.step()?;

		let reference = self.reference(pid, RefFlags::empty());
		let node = self.make::<M>(NodeKind::Name { pid, reference: Some(reference) }, span)?;

		Ok(Expr { node, span, shape: Shape::Name { pid, reference } })
	}


	/// Validate a name used as an identifier reference.
	fn check_reference_name(&self, pid: Pid, span: Span, escaped: bool) -> Result<(), Error> {
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

		if self.context.generator && pid == self.names.yield_ {
			return Err(Error::new(ErrorCode::KeywordAsIdentifier, span));
		}

		if self.context.strict && self.names.is_strict_reserved(pid) {
			return Err(Error::new(ErrorCode::StrictReserved, span));
		}

		if (self.context.is_async || self.options.is_module()) && pid == self.names.await_ {
			return Err(Error::new(ErrorCode::AwaitOutsideAsync, span));
		}

		Ok(())
	}


	/// `( expression )`. Arrow parameters are handled by the caller.
	fn parse_parenthesized<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let inner = self.parse_expr::<M>(true)?;
		self.expect(Punct::RParen, ErrorCode::ExpectedRParen)?;

		if M::BUILD_AST {
			self.ast.node_mut(inner.node).flags.insert(NodeFlags::PARENTHESIZED);
		}

		// `(a) = 1` is fine, `([a]) = 1` is not.
		let shape = if inner.shape.is_simple_target() { inner.shape } else { Shape::Other };

		Ok(Expr { node: inner.node, span: self.span_from(start), shape })
	}


	fn parse_array_literal<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let mut items = Vec::new();
		let mut pattern = true;
		let mut cover = false;

		while !self.token.is_punct(Punct::RBrack) {
			let item_start = self.token.span.ich_min;

			if self.token.is_punct(Punct::Comma) {
				let hole = self.make::<M>(NodeKind::Elision, self.token.span)?;
				if M::BUILD_AST {
					items.push(hole);
				}
				self.step()?;
				continue;
			}

			let item = if self.eat(Punct::Ellipsis)? {
				let operand = self.parse_assignment_cover::<M>(true)?;

				// A rest element must be last, without a trailing comma, and has no default.
				pattern &= !self.token.is_punct(Punct::Comma)
					&& !matches!(operand.shape, Shape::Assignment { .. })
					&& operand.shape.is_pattern_element();
				cover |= operand.shape.has_cover();

				self.make::<M>(NodeKind::Spread(operand.node), self.span_from(item_start))?
			} else {
				let operand = self.parse_assignment_cover::<M>(true)?;
				pattern &= operand.shape.is_pattern_element();
				cover |= operand.shape.has_cover();
				operand.node
			};

			if M::BUILD_AST {
				items.push(item);
			}

			if !self.token.is_punct(Punct::RBrack) {
				self.expect(Punct::Comma, ErrorCode::ExpectedRBrack)?;
			}
		}

		self.step()?;

		let span = self.span_from(start);
		let node = self.make::<M>(NodeKind::Array(items.into_boxed_slice()), span)?;

		Ok(Expr { node, span, shape: Shape::Literal { pattern, cover } })
	}


	fn parse_object_literal<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let mut properties = Vec::new();
		let mut pattern = true;
		let mut cover = false;

		while !self.token.is_punct(Punct::RCurly) {
			let property_start = self.token.span.ich_min;

			let property = if self.eat(Punct::Ellipsis)? {
				let operand = self.parse_assignment::<M>(true)?;
				pattern &= operand.shape.is_simple_target() && !self.token.is_punct(Punct::Comma);
				self.make::<M>(NodeKind::Spread(operand.node), self.span_from(property_start))?
			} else {
				let (property, property_pattern, property_cover) = self.parse_property::<M>()?;
				pattern &= property_pattern;
				cover |= property_cover;
				property
			};

			if M::BUILD_AST {
				properties.push(property);
			}

			if !self.token.is_punct(Punct::RCurly) {
				self.expect(Punct::Comma, ErrorCode::ExpectedRCurly)?;
			}
		}

		self.step()?;

		let span = self.span_from(start);
		let node = self.make::<M>(NodeKind::Object(properties.into_boxed_slice()), span)?;

		Ok(Expr { node, span, shape: Shape::Literal { pattern, cover } })
	}


	/// A property of an object literal. Returns the node, whether it is a valid pattern
	/// property and whether it has a shorthand initializer.
	fn parse_property<M: BuildMode>(&mut self) -> Result<(NodeId, bool, bool), Error> {
		let start = self.token.span.ich_min;

		let mut method = FncFlags::empty();
		let mut kind = PropertyKind::Init;

		// `get`, `set` and `async` are modifiers only when a property key follows.
		if let TokenKind::Identifier { pid, escaped: false } = self.token.kind {
			let modifier = pid == self.names.get || pid == self.names.set || pid == self.names.async_;
			if modifier {
				let next = self.peek()?;
				let is_key = !matches!(
					next.kind,
					TokenKind::Punct(Punct::Comma)
						| TokenKind::Punct(Punct::Colon)
						| TokenKind::Punct(Punct::LParen)
						| TokenKind::Punct(Punct::RCurly)
						| TokenKind::Punct(Punct::Assign)
				);

				if is_key && !(pid == self.names.async_ && next.newline_before) {
					self.step()?;
					if pid == self.names.get {
						kind = PropertyKind::Get;
					} else if pid == self.names.set {
						kind = PropertyKind::Set;
					} else {
						method.insert(FncFlags::ASYNC);
						kind = PropertyKind::Method;
					}
				}
			}
		}

		if kind != PropertyKind::Get && kind != PropertyKind::Set && self.eat(Punct::Star)? {
			method.insert(FncFlags::GENERATOR);
			kind = PropertyKind::Method;
		}

		let (key, shorthand) = self.parse_property_key::<M>()?;

		if kind != PropertyKind::Init || self.token.is_punct(Punct::LParen) {
			let kind = if kind == PropertyKind::Init { PropertyKind::Method } else { kind };
			let function_kind = match kind {
				PropertyKind::Get => FunctionKind::Getter,
				PropertyKind::Set => FunctionKind::Setter,
				_ => FunctionKind::Method,
			};
			let (value, _) = self.parse_method::<M>(function_kind, method, key.name(), start)?;
			let node = self.make::<M>(
				NodeKind::Property { key, value, kind },
				self.span_from(start),
			)?;
			return Ok((node, false, false));
		}

		if self.eat(Punct::Colon)? {
			let value = self.parse_assignment_cover::<M>(true)?;
			let node = self.make::<M>(
				NodeKind::Property { key, value: value.node, kind: PropertyKind::Init },
				self.span_from(start),
			)?;
			return Ok((node, value.shape.is_pattern_element(), value.shape.has_cover()));
		}

		let (pid, escaped) = match shorthand {
			Some(shorthand) => shorthand,
			None => return Err(self.error(ErrorCode::ExpectedColon)),
		};

		let span = self.span_from(start);
		self.check_reference_name(pid, span, escaped)?;

		let reference = self.reference(pid, RefFlags::empty());
		let name = self.make::<M>(NodeKind::Name { pid, reference: Some(reference) }, span)?;

		// `{ a = 1 }` is only valid as a pattern.
		let (value, cover) = if self.eat(Punct::Assign)? {
			self.binder.flag_ref(reference, RefFlags::ASSIGNMENT);
			let default = self.parse_assignment::<M>(true)?;
			let value = self.make::<M>(
				NodeKind::Assign { op: AssignOp::Assign, target: name, value: default.node },
				self.span_from(start),
			)?;
			(value, true)
		} else {
			(name, false)
		};

		let node = self.make::<M>(
			NodeKind::Property { key, value, kind: PropertyKind::Shorthand },
			self.span_from(start),
		)?;

		Ok((node, true, cover))
	}


	/// A property key. Identifiers are also returned apart, with their escaped flag, as
	/// they may be shorthand properties.
	pub(super) fn parse_property_key<M: BuildMode>(&mut self) -> Result<(PropertyKey, Option<(Pid, bool)>), Error> {
		let key = match self.token.kind {
			TokenKind::Identifier { pid, escaped } => {
				self.step()?;
				return Ok((PropertyKey::Name(pid), Some((pid, escaped))));
			}

			TokenKind::Keyword(_) => {
				let pid = self.parse_identifier_name()?;
				return Ok((PropertyKey::Name(pid), None));
			}

			TokenKind::String { value, octal_escape } => {
				if octal_escape && self.context.strict {
					return Err(self.error(ErrorCode::OctalStrict));
				}
				PropertyKey::String(value)
			}

			TokenKind::Number { value, legacy_octal } => {
				if legacy_octal && self.context.strict {
					return Err(self.error(ErrorCode::OctalStrict));
				}
				PropertyKey::Number(value)
			}

			TokenKind::Punct(Punct::LBrack) => {
				self.step()?;
				let key = self.parse_assignment::<M>(true)?;
				self.expect(Punct::RBrack, ErrorCode::ExpectedRBrack)?;
				return Ok((PropertyKey::Computed(key.node), None));
			}

			_ => return Err(self.error(ErrorCode::ExpectedMemberName)),
		};

		self.step()?;
		Ok((key, None))
	}


	/// A template literal, tagged if `tag` is given. The current token is its first chunk.
	fn parse_template<M: BuildMode>(&mut self, tag: Option<Expr>) -> Result<Expr, Error> {
		let start = tag.map_or(self.token.span.ich_min, |tag| tag.span.ich_min);

		let mut cooked = Vec::new();
		let mut raw = Vec::new();
		let mut substitutions = Vec::new();

		loop {
			let (chunk_cooked, chunk_raw, tail) = match self.token.kind {
				TokenKind::Template { cooked, raw, tail } => (cooked, raw, tail),
				_ => return Err(self.error(ErrorCode::UnterminatedTemplate)),
			};

			// Invalid escapes are only allowed in tagged templates.
			if chunk_cooked.is_none() && tag.is_none() {
				return Err(self.error(ErrorCode::InvalidEscape));
			}

			if M::BUILD_AST {
				cooked.push(chunk_cooked);
				raw.push(chunk_raw);
			}

			self.step()?;
			if tail {
				break;
			}

			let substitution = self.parse_expr::<M>(true)?;
			if M::BUILD_AST {
				substitutions.push(substitution.node);
			}

			if !self.token.is_punct(Punct::RCurly) {
				return Err(self.error(ErrorCode::ExpectedRCurly));
			}
			self.rescan_template()?;
		}

		let span = self.span_from(start);
		let node = self.make::<M>(
			NodeKind::Template {
				tag: tag.map(|tag| tag.node),
				cooked: cooked.into_boxed_slice(),
				raw: raw.into_boxed_slice(),
				substitutions: substitutions.into_boxed_slice(),
			},
			span,
		)?;

		Ok(Expr { node, span, shape: Shape::Other })
	}
}
