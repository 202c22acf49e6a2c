use super::{
	expr::{Expr, Shape},
	function::FunctionKind,
	BuildMode,
	Error,
	ErrorCode,
	Parser,
};
use crate::{
	pid::Pid,
	semantic::{FunctionId, RefFlags, ScopeKind, SymbolKind},
	syntax::{
		ast::{FncBody, FncFlags, FncNode, NodeFlags, NodeId, NodeKind, PropertyKey, PropertyKind},
		lexer::{Keyword, Punct, TokenKind},
		Span,
	},
};


/// Where a class appears, which decides how its name is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ClassForm {
	/// A statement. The name is required and bound in the enclosing scope.
	Declaration,
	/// `export default class`, where the name is optional.
	DefaultExport,
	/// An expression. The name, if any, is only visible inside the class.
	Expression,
}


impl<'a> Parser<'a> {
	/// A class declaration or expression, depending on `declaration`.
	pub(super) fn parse_class<M: BuildMode>(&mut self, declaration: bool) -> Result<NodeId, Error> {
		let form = if declaration { ClassForm::Declaration } else { ClassForm::Expression };
		self.parse_class_form::<M>(form)
	}


	pub(super) fn parse_class_expression<M: BuildMode>(&mut self) -> Result<Expr, Error> {
		let start = self.token.span.ich_min;
		let node = self.parse_class_form::<M>(ClassForm::Expression)?;
		Ok(Expr { node, span: self.span_from(start), shape: Shape::Other })
	}


	pub(super) fn parse_class_form<M: BuildMode>(&mut self, form: ClassForm) -> Result<NodeId, Error> {
		let start = self.token.span.ich_min;
		self.expect_keyword(Keyword::Class, ErrorCode::Syntax)?;

		let name = match self.token.kind {
			TokenKind::Identifier { pid, escaped } => {
				let span = self.token.span;
				self.check_binding_name(pid, span, escaped)?;
				// Class code is strict, its name included.
				self.check_strict_name(pid, span, true)?;
				if pid == self.names.let_ {
					return Err(Error::new(ErrorCode::LetAsLexicalName, span));
				}
				self.step()?;
				Some((pid, span))
			}

			_ if form == ClassForm::Declaration => return Err(self.error(ErrorCode::ExpectedIdentifier)),

			_ => None,
		};

		let mut name_node = None;
		if form != ClassForm::Expression {
			if let Some((pid, span)) = name {
				let symbol = self.declare(pid, SymbolKind::Class, span)?;
				name_node = Some(self.make::<M>(NodeKind::Binding { pid, symbol }, span)?);
			}
		}

		// Names bound inside the class are not exported with it.
		let bound_names = self.bound_names.take();
		let strict = self.context.strict;
		self.context.strict = true;

		let result = self.parse_class_tail::<M>(form, name, name_node, start);

		self.context.strict = strict;
		self.bound_names = bound_names;

		let node = result?;
		if M::BUILD_AST && form != ClassForm::Expression {
			self.ast.node_mut(node).flags.insert(NodeFlags::DECLARATION);
		}

		Ok(node)
	}


	/// Everything after the class name, in the class scope.
	fn parse_class_tail<M: BuildMode>(
		&mut self,
		form: ClassForm,
		name: Option<(Pid, Span)>,
		mut name_node: Option<NodeId>,
		start: u32,
	) -> Result<NodeId, Error> {
		let scope = self.binder.start_parse_block(ScopeKind::Class, self.context.function);

		if form == ClassForm::Expression {
			if let Some((pid, span)) = name {
				let symbol = self.declare(pid, SymbolKind::Class, span)?;
				name_node = Some(self.make::<M>(NodeKind::Binding { pid, symbol }, span)?);
			}
		}

		let heritage = if self.token.is_keyword(Keyword::Extends) {
			self.step()?;
			Some(self.parse_lhs::<M>()?.node)
		} else {
			None
		};
		let derived = heritage.is_some();

		self.expect(Punct::LCurly, ErrorCode::ExpectedLCurly)?;

		let class_name = name.map(|(pid, _)| pid);
		let mut constructor = None;
		let mut members = Vec::new();

		while !self.token.is_punct(Punct::RCurly) {
			if self.eat(Punct::Semicolon)? {
				continue;
			}

			if let Some(member) = self.parse_class_member::<M>(derived, class_name, &mut constructor)? {
				if M::BUILD_AST {
					members.push(member);
				}
			}
		}

		self.step()?;

		let span = self.span_from(start);
		let constructor = match constructor {
			Some(constructor) => constructor,
			None => self.generate_empty_constructor::<M>(derived, class_name, span)?,
		};

		self.binder.finish_parse_block(scope);

		self.make::<M>(
			NodeKind::Class {
				name: name_node,
				heritage,
				scope,
				constructor,
				members: members.into_boxed_slice(),
			},
			span,
		)
	}


	/// A method, accessor or the constructor. Returns None for the constructor, which is
	/// recorded apart.
	fn parse_class_member<M: BuildMode>(
		&mut self,
		derived: bool,
		class_name: Option<Pid>,
		constructor: &mut Option<FunctionId>,
	) -> Result<Option<NodeId>, Error> {
		let start = self.token.span.ich_min;

		let is_static = self.at_contextual(self.names.static_) && !self.peek()?.is_punct(Punct::LParen);
		if is_static {
			self.step()?;
		}

		let mut flags = FncFlags::CLASS_MEMBER;
		if is_static {
			flags.insert(FncFlags::STATIC_MEMBER);
		}

		let mut kind = PropertyKind::Method;
		if let TokenKind::Identifier { pid, escaped: false } = self.token.kind {
			let modifier = pid == self.names.get || pid == self.names.set || pid == self.names.async_;
			if modifier {
				let next = self.peek()?;
				if !next.is_punct(Punct::LParen) && !(pid == self.names.async_ && next.newline_before) {
					self.step()?;
					if pid == self.names.get {
						kind = PropertyKind::Get;
					} else if pid == self.names.set {
						kind = PropertyKind::Set;
					} else {
						flags.insert(FncFlags::ASYNC);
					}
				}
			}
		}

		if kind == PropertyKind::Method && self.eat(Punct::Star)? {
			flags.insert(FncFlags::GENERATOR);
		}

		let key_span = self.token.span;
		let (key, _) = self.parse_property_key::<M>()?;
		let static_name = match key {
			PropertyKey::Name(pid) | PropertyKey::String(pid) => Some(pid),
			_ => None,
		};

		if !is_static && static_name == Some(self.names.constructor) {
			let special = kind != PropertyKind::Method
				|| flags.intersects(FncFlags::GENERATOR | FncFlags::ASYNC);
			if special {
				return Err(Error::new(ErrorCode::Syntax, key_span));
			}

			if constructor.is_some() {
				return Err(Error::new(ErrorCode::DuplicateConstructor, key_span));
			}

			let (_, id) = self.parse_method::<M>(
				FunctionKind::ClassConstructor { derived },
				FncFlags::empty(),
				class_name,
				start,
			)?;
			*constructor = Some(id);

			return Ok(None);
		}

		if is_static && static_name == Some(self.names.prototype) {
			return Err(Error::new(ErrorCode::Syntax, key_span));
		}

		let function_kind = match kind {
			PropertyKind::Get => FunctionKind::Getter,
			PropertyKind::Set => FunctionKind::Setter,
			_ => FunctionKind::Method,
		};

		let (value, _) = self.parse_method::<M>(function_kind, flags, key.name(), start)?;

		let member = self.make::<M>(
			NodeKind::ClassMember { key, value, kind, is_static },
			self.span_from(start),
		)?;

		Ok(Some(member))
	}


	/// The constructor of a class without one. A derived class forwards its arguments:
	/// `constructor(...args) { super(...args); }`.
	pub(super) fn generate_empty_constructor<M: BuildMode>(
		&mut self,
		derived: bool,
		name: Option<Pid>,
		span: Span,
	) -> Result<FunctionId, Error> {
		let id = self.next_function();

		let mut flags = FncFlags::GENERATED_DEFAULT | FncFlags::CLASS_CONSTRUCTOR | FncFlags::STRICT;
		if derived {
			flags.insert(FncFlags::HAS_DIRECT_SUPER | FncFlags::NON_SIMPLE_PARAMS);
		} else {
			flags.insert(FncFlags::BASE_CLASS_CONSTRUCTOR);
		}
		if self.context.function != FunctionId::PROGRAM {
			flags.insert(FncFlags::NESTED);
		}

		let param_scope = self.binder.start_parse_block(ScopeKind::Parameter, id);

		let mut params = Vec::new();
		let mut statements = Vec::new();

		if derived {
			let args = self.names.args;
			let symbol = self.binder.add_decl_for_pid(args, SymbolKind::Formal, span, true)?;
			let reference = self.binder.push_pid_ref(args, id, RefFlags::empty());

			let generated = NodeFlags::GENERATED;
			let binding = self.make_flagged::<M>(NodeKind::Binding { pid: args, symbol }, span, generated)?;
			let rest = self.make_flagged::<M>(NodeKind::Rest(binding), span, generated)?;

			let name = self.make_flagged::<M>(NodeKind::Name { pid: args, reference: Some(reference) }, span, generated)?;
			let spread = self.make_flagged::<M>(NodeKind::Spread(name), span, generated)?;
			let call = self.make_flagged::<M>(
				NodeKind::SuperCall { arguments: vec![spread].into_boxed_slice() },
				span,
				generated,
			)?;
			let statement = self.make_flagged::<M>(NodeKind::Expr(call), span, generated)?;

			params.push(rest);
			statements.push(statement);
		}

		self.binder.finish_parse_block(param_scope);

		let node = self.make_flagged::<M>(NodeKind::Function(id), span, NodeFlags::GENERATED)?;

		if M::BUILD_AST {
			self.ast.set_function(FncNode {
				id,
				parent: Some(self.context.function),
				name,
				name_symbol: None,
				flags,
				span,
				params: params.into_boxed_slice(),
				param_scope,
				body_scope: None,
				body: FncBody::Parsed(statements.into_boxed_slice()),
				nested_count: 0,
				node,
			});
		}

		Ok(id)
	}
}
