use super::{Interner, Pid};


macro_rules! names {
	($($field:ident => $spelling:literal),* $(,)?) => {
		/// PIDs the parser compares against. They are interned once per interner, so every
		/// parser sharing an interner sees the same values.
		#[derive(Debug, Clone, Copy)]
		pub struct Names {
			$(pub $field: Pid,)*
		}


		impl Names {
			/// Intern all well-known names.
			pub fn new(interner: &mut Interner) -> Self {
				Self {
					$($field: interner.get_or_intern($spelling),)*
				}
			}
		}
	};
}


names! {
	eval => "eval",
	arguments => "arguments",
	let_ => "let",
	yield_ => "yield",
	await_ => "await",
	async_ => "async",
	of => "of",
	get => "get",
	set => "set",
	static_ => "static",
	as_ => "as",
	from => "from",
	target => "target",
	meta => "meta",
	constructor => "constructor",
	prototype => "prototype",
	use_strict => "use strict",
	default => "default",
	star_default => "*default*",
	star => "*",
	args => "args",
	implements => "implements",
	interface => "interface",
	package => "package",
	private => "private",
	protected => "protected",
	public => "public",
	empty => "",
}


impl Names {
	/// Words reserved only in strict mode code.
	pub fn is_strict_reserved(&self, pid: Pid) -> bool {
		pid == self.implements
			|| pid == self.interface
			|| pid == self.package
			|| pid == self.private
			|| pid == self.protected
			|| pid == self.public
			|| pid == self.static_
			|| pid == self.let_
			|| pid == self.yield_
	}


	/// Names that may not be bound in strict mode code.
	pub fn is_eval_or_arguments(&self, pid: Pid) -> bool {
		pid == self.eval || pid == self.arguments
	}
}
