use super::{expr::{Expr, Shape}, BuildMode, Error, ErrorCode, Parser};
use crate::{
	semantic::{RefFlags, SymbolKind},
	syntax::{
		ast::{AssignOp, DeclKind, NodeFlags, NodeId, NodeKind, PropertyKind},
		lexer::{Punct, TokenKind},
	},
};


/// How the names of a binding pattern are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Binding {
	Var,
	Let,
	Const,
	Formal,
	/// A catch parameter, which may be a pattern itself.
	Catch,
}


impl Binding {
	pub fn from_decl(kind: DeclKind) -> Self {
		match kind {
			DeclKind::Var => Self::Var,
			DeclKind::Let => Self::Let,
			DeclKind::Const => Self::Const,
		}
	}


	fn symbol_kind(self, pattern: bool) -> SymbolKind {
		match self {
			Self::Var => SymbolKind::Variable,
			Self::Let => SymbolKind::Let,
			Self::Const => SymbolKind::Const,
			Self::Formal => SymbolKind::Formal,
			Self::Catch => SymbolKind::CatchParam { pattern },
		}
	}


	fn is_lexical(self) -> bool {
		matches!(self, Self::Let | Self::Const)
	}
}


impl<'a> Parser<'a> {
	// Binding patterns:

	/// A binding identifier or a destructuring binding pattern.
	pub(super) fn parse_destructured_binding<M: BuildMode>(&mut self, binding: Binding) -> Result<NodeId, Error> {
		match self.token.kind {
			TokenKind::Punct(Punct::LBrack) => self.parse_array_binding::<M>(binding),
			TokenKind::Punct(Punct::LCurly) => self.parse_object_binding::<M>(binding),
			_ => self.parse_binding_name::<M>(binding, false),
		}
	}


	/// Whether the current token starts a destructuring pattern.
	pub(super) fn at_pattern(&self) -> bool {
		self.token.is_punct(Punct::LBrack) || self.token.is_punct(Punct::LCurly)
	}


	pub(super) fn parse_binding_name<M: BuildMode>(&mut self, binding: Binding, in_pattern: bool) -> Result<NodeId, Error> {
		let (pid, escaped) = match self.token.kind {
			TokenKind::Identifier { pid, escaped } => (pid, escaped),
			_ => return Err(self.error(ErrorCode::ExpectedIdentifier)),
		};
		let span = self.token.span;

		self.check_binding_name(pid, span, escaped)?;
		if binding.is_lexical() && pid == self.names.let_ {
			return Err(Error::new(ErrorCode::LetAsLexicalName, span));
		}

		self.step()?;

		let symbol = self.declare(pid, binding.symbol_kind(in_pattern), span)?;
		self.make::<M>(NodeKind::Binding { pid, symbol }, span)
	}


	/// A binding element with an optional default value.
	fn parse_binding_element<M: BuildMode>(&mut self, binding: Binding) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;

		let target = match self.token.kind {
			TokenKind::Punct(Punct::LBrack) => self.parse_array_binding::<M>(binding)?,
			TokenKind::Punct(Punct::LCurly) => self.parse_object_binding::<M>(binding)?,
			_ => self.parse_binding_name::<M>(binding, true)?,
		};

		self.parse_pattern_default::<M>(target, start)
	}


	/// `= default` after a pattern target, if present.
	fn parse_pattern_default<M: BuildMode>(&mut self, target: NodeId, start: u32) -> Result<NodeId, Error> {
		if !self.eat(Punct::Assign)? {
			return Ok(target);
		}

		let default = self.parse_assignment::<M>(true)?;
		self.make::<M>(
			NodeKind::AssignPattern { target, default: default.node },
			self.span_from(start),
		)
	}


	fn parse_array_binding<M: BuildMode>(&mut self, binding: Binding) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let mut elements = Vec::new();

		while !self.token.is_punct(Punct::RBrack) {
			let element_start = self.token.span.ich_min;

			let element = if self.token.is_punct(Punct::Comma) {
				let span = self.token.span;
				self.step()?;
				self.make::<M>(NodeKind::Elision, span)?
			} else if self.eat(Punct::Ellipsis)? {
				let target = self.parse_destructured_binding_in_pattern::<M>(binding)?;
				if !self.token.is_punct(Punct::RBrack) {
					return Err(self.error(ErrorCode::InvalidRestElement));
				}
				self.make::<M>(NodeKind::Rest(target), self.span_from(element_start))?
			} else {
				let element = self.parse_binding_element::<M>(binding)?;
				if !self.token.is_punct(Punct::RBrack) {
					self.expect(Punct::Comma, ErrorCode::ExpectedRBrack)?;
				}
				element
			};

			if M::BUILD_AST {
				elements.push(element);
			}
		}

		self.step()?;

		self.make::<M>(NodeKind::ArrayPattern(elements.into_boxed_slice()), self.span_from(start))
	}


	fn parse_destructured_binding_in_pattern<M: BuildMode>(&mut self, binding: Binding) -> Result<NodeId, Error> {
		match self.token.kind {
			TokenKind::Punct(Punct::LBrack) => self.parse_array_binding::<M>(binding),
			TokenKind::Punct(Punct::LCurly) => self.parse_object_binding::<M>(binding),
			_ => self.parse_binding_name::<M>(binding, true),
		}
	}


	fn parse_object_binding<M: BuildMode>(&mut self, binding: Binding) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let mut properties = Vec::new();

		while !self.token.is_punct(Punct::RCurly) {
			let property_start = self.token.span.ich_min;

			let property = if self.eat(Punct::Ellipsis)? {
				let target = self.parse_binding_name::<M>(binding, true)?;
				if !self.token.is_punct(Punct::RCurly) {
					return Err(self.error(ErrorCode::InvalidRestElement));
				}
				self.make::<M>(NodeKind::Rest(target), self.span_from(property_start))?
			} else {
				let key_span = self.token.span;
				let (key, shorthand) = self.parse_property_key::<M>()?;

				if self.eat(Punct::Colon)? {
					let target = self.parse_binding_element::<M>(binding)?;
					self.make::<M>(
						NodeKind::PatternProperty { key, target, shorthand: false },
						self.span_from(property_start),
					)?
				} else {
					let (pid, escaped) = shorthand.ok_or_else(|| self.error(ErrorCode::ExpectedColon))?;

					self.check_binding_name(pid, key_span, escaped)?;
					if binding.is_lexical() && pid == self.names.let_ {
						return Err(Error::new(ErrorCode::LetAsLexicalName, key_span));
					}

					let symbol = self.declare(pid, binding.symbol_kind(true), key_span)?;
					let name = self.make::<M>(NodeKind::Binding { pid, symbol }, key_span)?;
					let target = self.parse_pattern_default::<M>(name, property_start)?;

					self.make::<M>(
						NodeKind::PatternProperty { key, target, shorthand: true },
						self.span_from(property_start),
					)?
				}
			};

			if M::BUILD_AST {
				properties.push(property);
			}

			if !self.token.is_punct(Punct::RCurly) {
				self.expect(Punct::Comma, ErrorCode::ExpectedRCurly)?;
			}
		}

		self.step()?;

		self.make::<M>(NodeKind::ObjectPattern(properties.into_boxed_slice()), self.span_from(start))
	}


	// Assignment patterns:

	/// Parse an array or object literal again, this time as an assignment pattern. Only
	/// called on spans that already parsed as a literal whose every element is a valid
	/// pattern element.
	pub(super) fn parse_destructured_assignment<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		if self.token.is_punct(Punct::LBrack) {
			self.parse_array_assignment_pattern::<M>()
		} else {
			self.parse_object_assignment_pattern::<M>()
		}
	}


	fn parse_array_assignment_pattern<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let mut elements = Vec::new();

		while !self.token.is_punct(Punct::RBrack) {
			let element_start = self.token.span.ich_min;

			let element = if self.token.is_punct(Punct::Comma) {
				let span = self.token.span;
				self.step()?;
				self.make::<M>(NodeKind::Elision, span)?
			} else if self.eat(Punct::Ellipsis)? {
				let target = self.parse_assignment_target::<M>()?;
				if !self.token.is_punct(Punct::RBrack) {
					return Err(self.error(ErrorCode::InvalidRestElement));
				}
				self.make::<M>(NodeKind::Rest(target), self.span_from(element_start))?
			} else {
				let target = self.parse_assignment_target::<M>()?;
				let element = self.parse_pattern_default::<M>(target, element_start)?;
				if !self.token.is_punct(Punct::RBrack) {
					self.expect(Punct::Comma, ErrorCode::ExpectedRBrack)?;
				}
				element
			};

			if M::BUILD_AST {
				elements.push(element);
			}
		}

		self.step()?;

		self.make::<M>(NodeKind::ArrayPattern(elements.into_boxed_slice()), self.span_from(start))
	}


	fn parse_object_assignment_pattern<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.step()?;

		let mut properties = Vec::new();

		while !self.token.is_punct(Punct::RCurly) {
			let property_start = self.token.span.ich_min;

			let property = if self.eat(Punct::Ellipsis)? {
				let target = self.parse_assignment_target::<M>()?;
				if !self.token.is_punct(Punct::RCurly) {
					return Err(self.error(ErrorCode::InvalidRestElement));
				}
				self.make::<M>(NodeKind::Rest(target), self.span_from(property_start))?
			} else {
				let key_span = self.token.span;
				let (key, shorthand) = self.parse_property_key::<M>()?;

				if self.eat(Punct::Colon)? {
					let element_start = self.token.span.ich_min;
					let target = self.parse_assignment_target::<M>()?;
					let target = self.parse_pattern_default::<M>(target, element_start)?;
					self.make::<M>(
						NodeKind::PatternProperty { key, target, shorthand: false },
						self.span_from(property_start),
					)?
				} else {
					let (pid, _) = shorthand.ok_or_else(|| self.error(ErrorCode::ExpectedColon))?;

					let reference = self.reference(pid, RefFlags::empty());
					let name = self.make::<M>(NodeKind::Name { pid, reference: Some(reference) }, key_span)?;
					self.check_simple_target(&Expr {
						node: name,
						span: key_span,
						shape: Shape::Name { pid, reference },
					})?;

					let target = self.parse_pattern_default::<M>(name, property_start)?;
					self.make::<M>(
						NodeKind::PatternProperty { key, target, shorthand: true },
						self.span_from(property_start),
					)?
				}
			};

			if M::BUILD_AST {
				properties.push(property);
			}

			if !self.token.is_punct(Punct::RCurly) {
				self.expect(Punct::Comma, ErrorCode::ExpectedRCurly)?;
			}
		}

		self.step()?;

		self.make::<M>(NodeKind::ObjectPattern(properties.into_boxed_slice()), self.span_from(start))
	}


	/// An element of an assignment pattern: a nested pattern or a simple target.
	fn parse_assignment_target<M: BuildMode>(&mut self) -> Result<NodeId, Error> {
		if !self.at_pattern() {
			let target = self.parse_lhs::<M>()?;
			self.check_simple_target(&target)?;
			return Ok(target.node);
		}

		// `[a].b` is a property access, not a nested pattern.
		let checkpoint = self.checkpoint();
		let target = self.parse_lhs::<M>()?;

		if let Shape::Literal { .. } = target.shape {
			self.restore(checkpoint, "nested destructuring assignment");
			return self.parse_destructured_assignment::<M>();
		}

		self.commit(checkpoint);
		self.check_simple_target(&target)?;

		Ok(target.node)
	}


	// Conversion:

	/// Turn an array or object literal that was already built into an assignment pattern,
	/// in place.
	pub(super) fn convert_to_pattern(&mut self, node: NodeId) -> Result<(), Error> {
		if node.is_none() {
			return Ok(());
		}

		let literal = self.ast.node(node);
		if literal.flags.contains(NodeFlags::PARENTHESIZED) {
			return Err(Error::new(ErrorCode::InvalidDestructuringTarget, literal.span));
		}

		let kind = match literal.kind.clone() {
			NodeKind::Array(elements) => {
				let last = elements.len().checked_sub(1);
				for (index, &element) in elements.iter().enumerate() {
					if let NodeKind::Spread(_) = self.ast.kind(element) {
						if Some(index) != last {
							return Err(Error::new(ErrorCode::InvalidRestElement, self.ast.node(element).span));
						}
					}
					self.convert_element(element)?;
				}
				NodeKind::ArrayPattern(elements)
			}

			NodeKind::Object(properties) => {
				for &property in properties.iter() {
					self.convert_property(property)?;
				}
				NodeKind::ObjectPattern(properties)
			}

			_ => return Err(Error::new(ErrorCode::InvalidDestructuringTarget, literal.span)),
		};

		self.rewrite(node, kind);

		Ok(())
	}


	fn rewrite(&mut self, node: NodeId, kind: NodeKind) {
		let node = self.ast.node_mut(node);
		node.kind = kind;
		node.flags.insert(NodeFlags::CONVERTED);
	}


	fn convert_element(&mut self, element: NodeId) -> Result<(), Error> {
		let node = self.ast.node(element);
		let span = node.span;
		let parenthesized = node.flags.contains(NodeFlags::PARENTHESIZED);

		match node.kind.clone() {
			NodeKind::Elision | NodeKind::Member { .. } | NodeKind::Index { .. } => Ok(()),

			NodeKind::Name { pid, reference } => {
				if self.context.strict && self.names.is_eval_or_arguments(pid) {
					let code = if pid == self.names.eval {
						ErrorCode::EvalStrict
					} else {
						ErrorCode::ArgumentsStrict
					};
					return Err(Error::new(code, span));
				}

				if let Some(reference) = reference {
					self.binder.flag_ref(reference, RefFlags::ASSIGNMENT);
				}
				Ok(())
			}

			NodeKind::Array(_) | NodeKind::Object(_) if !parenthesized => self.convert_to_pattern(element),

			// Nested assignments were already validated when their `=` was parsed.
			NodeKind::Assign { op: AssignOp::Assign, target, value } if !parenthesized => {
				self.rewrite(element, NodeKind::AssignPattern { target, default: value });
				Ok(())
			}

			NodeKind::Spread(target) => {
				if let NodeKind::Assign { .. } = self.ast.kind(target) {
					return Err(Error::new(ErrorCode::InvalidRestElement, span));
				}
				self.convert_element(target)?;
				self.rewrite(element, NodeKind::Rest(target));
				Ok(())
			}

			_ => Err(Error::new(ErrorCode::InvalidDestructuringTarget, span)),
		}
	}


	fn convert_property(&mut self, property: NodeId) -> Result<(), Error> {
		let span = self.ast.node(property).span;

		match self.ast.kind(property).clone() {
			NodeKind::Property { key, value, kind: PropertyKind::Init } => {
				self.convert_element(value)?;
				self.rewrite(property, NodeKind::PatternProperty { key, target: value, shorthand: false });
				Ok(())
			}

			// The name of a shorthand was flagged when its initializer was parsed.
			NodeKind::Property { key, value, kind: PropertyKind::Shorthand } => {
				self.convert_element(value)?;
				self.rewrite(property, NodeKind::PatternProperty { key, target: value, shorthand: true });
				Ok(())
			}

			NodeKind::Spread(target) => {
				self.convert_element(target)?;
				self.rewrite(property, NodeKind::Rest(target));
				Ok(())
			}

			_ => Err(Error::new(ErrorCode::InvalidDestructuringTarget, span)),
		}
	}
}
