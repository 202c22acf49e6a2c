//! Lexical scopes, symbols and deferred identifier binding.
//!
//! References to identifiers are recorded on per-identifier stacks while parsing, tagged
//! with the block and function they appear in. When a block finishes, the references
//! whose block lies within it are bound to the symbols the block declares. This allows
//! forward references to hoisted and block scoped declarations without a second tree walk.

mod binder;
mod error;
pub mod fmt;
mod pidref;
mod scope;
mod symbol;
#[cfg(test)]
mod tests;

pub use binder::{Binder, BinderMark};
pub use error::{Error, ErrorKind};
pub use pidref::{PidRef, PidRefStacks, RefFlags};
pub use scope::{Scope, ScopeKind, ScopeState, ScopeTable};
pub use symbol::{AssignmentState, Symbol, SymbolKind};


macro_rules! id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
		#[derive(serde::Serialize, serde::Deserialize)]
		pub struct $name(pub u32);


		impl $name {
			pub fn index(self) -> usize {
				self.0 as usize
			}


			pub(crate) fn from_index(index: usize) -> Self {
				Self(std::convert::TryFrom::try_from(index).expect("id overflow"))
			}
		}


		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}


id!(
	/// Index of a scope in the scope table.
	ScopeId
);
id!(
	/// Index of a symbol in the scope table.
	SymbolId
);
id!(
	/// Index of a reference record in the scope table.
	RefId
);
id!(
	/// Monotonically assigned block number. Nested blocks have greater ids than their
	/// enclosing blocks, which is what reference resolution compares.
	BlockId
);
id!(
	/// Monotonically assigned function number. The program itself is function zero.
	FunctionId
);


impl BlockId {
	pub const MAX: BlockId = BlockId(u32::MAX);
}


impl FunctionId {
	pub const PROGRAM: FunctionId = FunctionId(0);
}
