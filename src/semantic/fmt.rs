use std::fmt::Display as _;

use super::{AssignmentState, Scope, ScopeId, ScopeTable, Symbol, SymbolKind};
use crate::{
	fmt::{self, Display, Indentation},
	pid::Interner,
	term::color,
};


/// Formatting context for scope tables.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
	pub interner: &'a Interner,
	indentation: Indentation,
}


impl<'a> From<&'a Interner> for Context<'a> {
	fn from(interner: &'a Interner) -> Self {
		Self { interner, indentation: Indentation::default() }
	}
}


impl<'a> Context<'a> {
	fn indent(self) -> Self {
		Self { indentation: self.indentation.increase(), ..self }
	}
}


impl std::fmt::Display for SymbolKind {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::Variable => "var",
			Self::Formal => "formal",
			Self::Function => "function",
			Self::Let => "let",
			Self::Const => "const",
			Self::Class => "class",
			Self::CatchParam { pattern: false } => "catch",
			Self::CatchParam { pattern: true } => "catch pattern",
			Self::FunctionName => "function name",
			Self::Import => "import",
		}
		.fmt(f)
	}
}


impl<'a> Display<'a> for Symbol {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		write!(f, "{} ", color::Fg(color::Blue, self.kind))?;
		self.name.fmt(f, context)?;

		match self.assignment {
			AssignmentState::NotAssigned => (),
			AssignmentState::AssignedOnce => " assigned".fmt(f)?,
			AssignmentState::AssignedMultipleTimes => " reassigned".fmt(f)?,
		}

		let attributes = [
			(self.has_non_local_reference, "non-local"),
			(self.needs_scope_object, "scope-object"),
			(self.used_in_ld_elem, "ld-elem"),
			(self.has_func_assignment, "func-assignment"),
			(self.module_export, "export"),
			(self.function_shadow, "shadow"),
		];

		for (_, name) in attributes.iter().filter(|(set, _)| *set) {
			write!(f, " {}", color::Fg(color::Magenta, name))?;
		}

		Ok(())
	}
}


fn scope(
	table: &ScopeTable,
	id: ScopeId,
	children: &[Vec<ScopeId>],
	f: &mut std::fmt::Formatter,
	context: Context,
) -> std::fmt::Result {
	let Scope { kind, block_id, function, .. } = table.scope(id);

	writeln!(
		f,
		"{}{} {:?} (block {}, function {}){}",
		context.indentation,
		color::Fg(color::Yellow, "scope"),
		kind,
		block_id,
		function,
		if table.scope(id).calls_eval { " eval" } else { "" },
	)?;

	for &symbol in table.scope(id).symbols.iter() {
		write!(f, "{}", context.indent().indentation)?;
		table.symbol(symbol).fmt(f, context.interner)?;
		writeln!(f)?;
	}

	for &child in children[id.index()].iter() {
		scope(table, child, children, f, context.indent())?;
	}

	Ok(())
}


impl<'a> Display<'a> for ScopeTable {
	type Context = Context<'a>;

	/// Print the scope tree, with each scope followed by its symbols.
	fn fmt(&self, f: &mut std::fmt::Formatter, context: Self::Context) -> std::fmt::Result {
		let mut children = vec![Vec::new(); self.scope_count()];
		let mut roots = Vec::new();

		for (id, scope) in self.scopes() {
			match scope.parent {
				Some(parent) => children[parent.index()].push(id),
				None => roots.push(id),
			}
		}

		// Bodies parsed late are appended to the table, block ids keep the source order.
		for siblings in children.iter_mut() {
			siblings.sort_by_key(|&child| self.scope(child).block_id);
		}

		for root in roots {
			scope(self, root, &children, f, context)?;
		}

		// Each free name once, in the order names were first seen.
		let mut unresolved: Vec<_> = self
			.refs()
			.filter(|(_, reference)| reference.symbol.is_none() && !reference.discarded)
			.map(|(_, reference)| reference.pid)
			.collect();
		unresolved.sort_unstable();
		unresolved.dedup();

		for pid in unresolved {
			write!(f, "{}{} ", context.indentation, color::Fg(color::Red, "global"))?;
			pid.fmt(f, context.interner)?;
			writeln!(f)?;
		}

		Ok(())
	}
}


/// Print a scope table into a string, for diagnostics.
pub fn dump(table: &ScopeTable, interner: &Interner) -> String {
	fmt::to_string(table, Context::from(interner))
}
