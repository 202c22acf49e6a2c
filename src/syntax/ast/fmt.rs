use std::fmt::Display as _;

use super::{
	Ast,
	DeclKind,
	FncBody,
	FncNode,
	NodeFlags,
	NodeId,
	NodeKind,
	PropertyKey,
	PropertyKind,
};
use crate::{
	fmt::{sep_by, Display, Indentation},
	pid::{Interner, Pid},
	semantic::{FunctionId, ScopeId, ScopeTable, SymbolId},
	term::color,
};


pub const ILL_FORMED: color::Fg<color::Red, &'static str> = color::Fg(color::Red, "***ill-formed***");


/// The context for displaying parse trees. Bindings are printed with the block id of the
/// scope they resolve to, which makes dumps of equivalent trees compare equal regardless of
/// the order nodes were allocated in.
#[derive(Debug, Copy, Clone)]
pub struct Context<'a> {
	pub interner: &'a Interner,
	pub ast: &'a Ast,
	pub scopes: &'a ScopeTable,
	indentation: Indentation,
}


impl<'a> Context<'a> {
	pub fn new(interner: &'a Interner, ast: &'a Ast, scopes: &'a ScopeTable) -> Self {
		Self { interner, ast, scopes, indentation: Indentation::default() }
	}


	fn indent(mut self) -> Self {
		self.indentation = self.indentation.increase();
		self
	}
}


fn name(f: &mut std::fmt::Formatter, pid: Pid, context: Context) -> std::fmt::Result {
	pid.fmt(f, context.interner)
}


fn symbol(f: &mut std::fmt::Formatter, symbol: SymbolId, context: Context) -> std::fmt::Result {
	if symbol.index() >= context.scopes.symbol_count() {
		return ILL_FORMED.fmt(f);
	}

	let scope = context.scopes.scope(context.scopes.symbol(symbol).scope);
	write!(f, "@{}", scope.block_id)
}


fn scope(f: &mut std::fmt::Formatter, scope: ScopeId, context: Context) -> std::fmt::Result {
	if scope.index() >= context.scopes.scope_count() {
		return ILL_FORMED.fmt(f);
	}

	let block = format!("block {}", context.scopes.scope(scope).block_id);
	write!(f, " {}", color::Fg(color::Cyan, block))
}


fn key(f: &mut std::fmt::Formatter, key: &PropertyKey, context: Context) -> std::fmt::Result {
	match key {
		PropertyKey::Name(pid) => name(f, *pid, context),
		PropertyKey::String(pid) => {
			"\"".fmt(f)?;
			name(f, *pid, context)?;
			"\"".fmt(f)
		}
		PropertyKey::Number(number) => number.fmt(f),
		PropertyKey::Computed(_) => "[computed]".fmt(f),
	}
}


fn header(f: &mut std::fmt::Formatter, text: &str, context: Context) -> std::fmt::Result {
	write!(f, "{}{}", context.indentation, color::Fg(color::Yellow, text))
}


/// Print children, each on their own line.
fn children(f: &mut std::fmt::Formatter, ids: &[NodeId], context: Context) -> std::fmt::Result {
	for id in ids {
		writeln!(f)?;
		id.fmt(f, context)?;
	}
	Ok(())
}


fn child(f: &mut std::fmt::Formatter, id: Option<NodeId>, context: Context) -> std::fmt::Result {
	match id {
		Some(id) => children(f, &[id], context),
		None => Ok(()),
	}
}


fn computed(f: &mut std::fmt::Formatter, key: &PropertyKey, context: Context) -> std::fmt::Result {
	match key {
		PropertyKey::Computed(id) => children(f, &[*id], context),
		_ => Ok(()),
	}
}


fn decl_kind(kind: DeclKind) -> &'static str {
	match kind {
		DeclKind::Var => "var",
		DeclKind::Let => "let",
		DeclKind::Const => "const",
	}
}


fn property_kind(kind: PropertyKind) -> &'static str {
	match kind {
		PropertyKind::Init => "property",
		PropertyKind::Shorthand => "shorthand",
		PropertyKind::Method => "method",
		PropertyKind::Get => "get",
		PropertyKind::Set => "set",
	}
}


impl<'a> Display<'a> for NodeId {
	type Context = Context<'a>;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		if self.is_none() || self.index() >= context.ast.len() {
			return write!(f, "{}{}", context.indentation, ILL_FORMED);
		}

		let node = context.ast.node(*self);
		let nested = context.indent();

		match &node.kind {
			NodeKind::Name { pid, reference } => {
				header(f, "name ", context)?;
				name(f, *pid, context)?;
				let resolved = reference.and_then(|reference| context.scopes.resolved(reference));
				match resolved {
					Some(target) => symbol(f, target, context)?,
					None => " global".fmt(f)?,
				}
			}

			NodeKind::Binding { pid, symbol: target } => {
				header(f, "binding ", context)?;
				name(f, *pid, context)?;
				symbol(f, *target, context)?;
			}

			NodeKind::Number(number) => {
				header(f, "number ", context)?;
				number.fmt(f)?;
			}

			NodeKind::String(pid) => {
				header(f, "string \"", context)?;
				name(f, *pid, context)?;
				"\"".fmt(f)?;
			}

			NodeKind::Regex { pattern, flags } => {
				header(f, "regex /", context)?;
				name(f, *pattern, context)?;
				"/".fmt(f)?;
				name(f, *flags, context)?;
			}

			NodeKind::Template { tag, cooked, substitutions, .. } => {
				header(f, if tag.is_some() { "tagged-template" } else { "template" }, context)?;
				write!(f, " ({} chunks)", cooked.len())?;
				child(f, *tag, nested)?;
				children(f, substitutions, nested)?;
			}

			NodeKind::Null => header(f, "null", context)?,
			NodeKind::True => header(f, "true", context)?,
			NodeKind::False => header(f, "false", context)?,
			NodeKind::This => header(f, "this", context)?,
			NodeKind::Super => header(f, "super", context)?,
			NodeKind::NewTarget => header(f, "new.target", context)?,
			NodeKind::Elision => header(f, "elision", context)?,

			NodeKind::Unary { op, operand } => {
				header(f, "unary ", context)?;
				op.as_str().fmt(f)?;
				children(f, &[*operand], nested)?;
			}

			NodeKind::Update { op, prefix, operand } => {
				header(f, if *prefix { "prefix " } else { "postfix " }, context)?;
				op.as_str().fmt(f)?;
				children(f, &[*operand], nested)?;
			}

			NodeKind::Binary { op, left, right } => {
				header(f, "binary ", context)?;
				op.as_str().fmt(f)?;
				children(f, &[*left, *right], nested)?;
			}

			NodeKind::Assign { op, target, value } => {
				header(f, "assign ", context)?;
				op.as_str().fmt(f)?;
				children(f, &[*target, *value], nested)?;
			}

			NodeKind::Conditional { test, consequent, alternate } => {
				header(f, "conditional", context)?;
				children(f, &[*test, *consequent, *alternate], nested)?;
			}

			NodeKind::Call { callee, arguments } => {
				header(f, "call", context)?;
				if node.flags.contains(NodeFlags::DIRECT_EVAL) {
					" eval".fmt(f)?;
				}
				children(f, &[*callee], nested)?;
				children(f, arguments, nested)?;
			}

			NodeKind::New { callee, arguments } => {
				header(f, "new", context)?;
				children(f, &[*callee], nested)?;
				children(f, arguments, nested)?;
			}

			NodeKind::SuperCall { arguments } => {
				header(f, "super-call", context)?;
				children(f, arguments, nested)?;
			}

			NodeKind::ImportCall(argument) => {
				header(f, "import-call", context)?;
				children(f, &[*argument], nested)?;
			}

			NodeKind::Member { object, property } => {
				header(f, "member .", context)?;
				name(f, *property, context)?;
				children(f, &[*object], nested)?;
			}

			NodeKind::Index { object, index } => {
				header(f, "index", context)?;
				children(f, &[*object, *index], nested)?;
			}

			NodeKind::Spread(argument) => {
				header(f, "spread", context)?;
				children(f, &[*argument], nested)?;
			}

			NodeKind::Yield { argument, delegate } => {
				header(f, if *delegate { "yield*" } else { "yield" }, context)?;
				child(f, *argument, nested)?;
			}

			NodeKind::Await(argument) => {
				header(f, "await", context)?;
				children(f, &[*argument], nested)?;
			}

			NodeKind::Array(items) => {
				header(f, "array", context)?;
				children(f, items, nested)?;
			}

			NodeKind::Object(items) => {
				header(f, "object", context)?;
				children(f, items, nested)?;
			}

			NodeKind::Property { key: property, value, kind } => {
				header(f, property_kind(*kind), context)?;
				" ".fmt(f)?;
				key(f, property, context)?;
				computed(f, property, nested)?;
				children(f, &[*value], nested)?;
			}

			NodeKind::Function(id) => function(f, *id, context)?,

			NodeKind::Class { name: class_name, heritage, scope: class_scope, constructor, members } => {
				header(f, "class", context)?;
				scope(f, *class_scope, context)?;
				child(f, *class_name, nested)?;
				if let Some(heritage) = heritage {
					writeln!(f)?;
					header(f, "extends", nested)?;
					children(f, &[*heritage], nested.indent())?;
				}
				writeln!(f)?;
				function(f, *constructor, nested)?;
				children(f, members, nested)?;
			}

			NodeKind::ClassMember { key: member, value, kind, is_static } => {
				header(f, if *is_static { "static " } else { "member " }, context)?;
				property_kind(*kind).fmt(f)?;
				" ".fmt(f)?;
				key(f, member, context)?;
				computed(f, member, nested)?;
				children(f, &[*value], nested)?;
			}

			NodeKind::ArrayPattern(items) => {
				header(f, "array-pattern", context)?;
				children(f, items, nested)?;
			}

			NodeKind::ObjectPattern(items) => {
				header(f, "object-pattern", context)?;
				children(f, items, nested)?;
			}

			NodeKind::PatternProperty { key: property, target, shorthand } => {
				header(f, if *shorthand { "shorthand-target " } else { "target " }, context)?;
				key(f, property, context)?;
				computed(f, property, nested)?;
				children(f, &[*target], nested)?;
			}

			NodeKind::AssignPattern { target, default } => {
				header(f, "default", context)?;
				children(f, &[*target, *default], nested)?;
			}

			NodeKind::Rest(target) => {
				header(f, "rest", context)?;
				children(f, &[*target], nested)?;
			}

			NodeKind::VarDecl { kind, target, init } => {
				header(f, decl_kind(*kind), context)?;
				children(f, &[*target], nested)?;
				child(f, *init, nested)?;
			}

			NodeKind::DeclList { kind, declarations } => {
				header(f, decl_kind(*kind), context)?;
				" list".fmt(f)?;
				children(f, declarations, nested)?;
			}

			NodeKind::Block { scope: block_scope, statements } => {
				header(f, "block", context)?;
				scope(f, *block_scope, context)?;
				children(f, statements, nested)?;
			}

			NodeKind::Expr(expr) => {
				header(f, "expr", context)?;
				children(f, &[*expr], nested)?;
			}

			NodeKind::If { test, consequent, alternate } => {
				header(f, "if", context)?;
				children(f, &[*test, *consequent], nested)?;
				child(f, *alternate, nested)?;
			}

			NodeKind::For { scope: for_scope, init, test, update, body } => {
				header(f, "for", context)?;
				scope(f, *for_scope, context)?;
				for part in [init, test, update].iter() {
					match part {
						Some(part) => children(f, &[*part], nested)?,
						None => {
							writeln!(f)?;
							header(f, "none", nested)?;
						}
					}
				}
				children(f, &[*body], nested)?;
			}

			NodeKind::ForIn { scope: for_scope, of, left, right, body } => {
				header(f, if *of { "for-of" } else { "for-in" }, context)?;
				scope(f, *for_scope, context)?;
				children(f, &[*left, *right, *body], nested)?;
			}

			NodeKind::While { test, body } => {
				header(f, "while", context)?;
				children(f, &[*test, *body], nested)?;
			}

			NodeKind::DoWhile { body, test } => {
				header(f, "do-while", context)?;
				children(f, &[*body, *test], nested)?;
			}

			NodeKind::Return(argument) => {
				header(f, "return", context)?;
				child(f, *argument, nested)?;
			}

			NodeKind::Break(label) | NodeKind::Continue(label) => {
				let keyword = if matches!(node.kind, NodeKind::Break(_)) { "break" } else { "continue" };
				header(f, keyword, context)?;
				if let Some(label) = label {
					" ".fmt(f)?;
					name(f, *label, context)?;
				}
			}

			NodeKind::Throw(argument) => {
				header(f, "throw", context)?;
				children(f, &[*argument], nested)?;
			}

			NodeKind::Try { block, handler, finalizer } => {
				header(f, "try", context)?;
				children(f, &[*block], nested)?;
				child(f, *handler, nested)?;
				child(f, *finalizer, nested)?;
			}

			NodeKind::Catch { scope: catch_scope, param, body } => {
				header(f, "catch", context)?;
				scope(f, *catch_scope, context)?;
				child(f, *param, nested)?;
				children(f, &[*body], nested)?;
			}

			NodeKind::Switch { discriminant, scope: switch_scope, cases } => {
				header(f, "switch", context)?;
				scope(f, *switch_scope, context)?;
				children(f, &[*discriminant], nested)?;
				children(f, cases, nested)?;
			}

			NodeKind::Case { test, body } => {
				header(f, if test.is_some() { "case" } else { "default" }, context)?;
				child(f, *test, nested)?;
				children(f, body, nested)?;
			}

			NodeKind::Labeled { label, body } => {
				header(f, "label ", context)?;
				name(f, *label, context)?;
				children(f, &[*body], nested)?;
			}

			NodeKind::With { object, scope: with_scope, body } => {
				header(f, "with", context)?;
				scope(f, *with_scope, context)?;
				children(f, &[*object, *body], nested)?;
			}

			NodeKind::Debugger => header(f, "debugger", context)?,
			NodeKind::Empty => header(f, "empty", context)?,

			NodeKind::ImportDecl { specifier } => {
				header(f, "import from ", context)?;
				name(f, *specifier, context)?;
			}

			NodeKind::ExportDecl(declaration) => {
				header(f, "export", context)?;
				children(f, &[*declaration], nested)?;
			}

			NodeKind::ExportDefault(value) => {
				header(f, "export default", context)?;
				children(f, &[*value], nested)?;
			}

			NodeKind::ExportNamed { from } => {
				header(f, "export names", context)?;
				if let Some(from) = from {
					" from ".fmt(f)?;
					name(f, *from, context)?;
				}
			}
		}

		if node.flags.contains(NodeFlags::AUTOMATIC_SEMICOLON) {
			write!(f, " {}", color::Fg(color::Magenta, "(asi)"))?;
		}

		Ok(())
	}
}


fn function(f: &mut std::fmt::Formatter, id: FunctionId, context: Context) -> std::fmt::Result {
	header(f, "function ", context)?;
	id.fmt(f)?;

	let function = match context.ast.function(id) {
		Some(function) => function,
		None => return " <unparsed>".fmt(f),
	};

	function.fmt(f, context)
}


impl<'a> Display<'a> for FncNode {
	type Context = Context<'a>;

	/// Print the function details after its header.
	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		let nested = context.indent();

		if let Some(pid) = self.name {
			" ".fmt(f)?;
			name(f, pid, context)?;
		}

		if !self.flags.is_empty() {
			" [".fmt(f)?;
			sep_by(self.flags.names(), f, |flag, f| flag.to_lowercase().fmt(f), ", ")?;
			"]".fmt(f)?;
		}

		if !self.params.is_empty() {
			writeln!(f)?;
			header(f, "params", nested)?;
			scope(f, self.param_scope, context)?;
			children(f, &self.params, nested.indent())?;
		}

		match &self.body {
			FncBody::Parsed(statements) => {
				writeln!(f)?;
				header(f, "body", nested)?;
				if let Some(body_scope) = self.body_scope {
					scope(f, body_scope, context)?;
				}
				children(f, statements, nested.indent())
			}

			FncBody::Deferred(_) => {
				writeln!(f)?;
				header(f, "body <deferred>", nested)
			}

			FncBody::Pending(item) => {
				writeln!(f)?;
				header(f, "body <pending>", nested)?;
				write!(f, " {}", item)
			}
		}
	}
}


impl<'a> Display<'a> for Ast {
	type Context = Context<'a>;

	/// Print the program, with nested functions inline.
	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		function(f, FunctionId::PROGRAM, context)?;
		writeln!(f)
	}
}
