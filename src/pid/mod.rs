mod fmt;
mod names;

use std::sync::Arc;

use intaglio::{Symbol as SymbolInner, bytes::SymbolTable};
use parking_lot::Mutex;

pub use names::Names;


/// A PID ("pooled identifier") is a reference to an identifier or string stored in the
/// interner. Two PIDs are equal if and only if their spellings are equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Pid(SymbolInner);


impl Pid {
	/// The numeric id of the PID, stable for the lifetime of the interner.
	pub fn id(self) -> u32 {
		self.0.id()
	}
}


/// The default PID is a dummy, which will yield "<invalid pid>" when resolved.
impl Default for Pid {
	fn default() -> Self {
		Self(SymbolInner::new(0))
	}
}


impl PartialOrd for Pid {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}


impl Ord for Pid {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.id().cmp(&other.id())
	}
}


impl From<Pid> for usize {
	fn from(pid: Pid) -> usize {
		pid.id() as usize
	}
}


/// The identifier hash table. Identifiers, string literals and regex sources are all
/// interned here.
#[derive(Debug)]
pub struct Interner(SymbolTable);


impl Interner {
	/// Create a new interner. Please note that this allocates memory even if no PIDs are
	/// inserted.
	pub fn new() -> Self {
		let mut interner = SymbolTable::new();
		interner
			.intern(b"<invalid pid>".as_ref())
			.expect("failed to intern pid");
		Self(interner)
	}


	/// Get the PID for a value, if it has been interned.
	pub fn get<T>(&self, value: T) -> Option<Pid>
	where
		T: AsRef<[u8]>,
	{
		self.0
			.check_interned(value.as_ref())
			.map(Pid)
	}


	/// Get the PID for a value. The value is interned if needed.
	pub fn get_or_intern<T>(&mut self, value: T) -> Pid
	where
		T: AsRef<[u8]>,
	{
		if let Some(pid) = self.get(value.as_ref()) {
			return pid;
		}

		let value = value.as_ref().to_owned();

		Pid(
			self.0
				.intern(value)
				.expect("failed to intern pid")
		)
	}


	/// Resolve the spelling of a PID.
	pub fn resolve(&self, pid: Pid) -> Option<&[u8]> {
		self.0.get(pid.0)
	}


	/// Resolve the spelling of a PID as an owned, lossily decoded string.
	pub fn spelling(&self, pid: Pid) -> String {
		self.resolve(pid)
			.map(|bytes| String::from_utf8_lossy(bytes).into_owned())
			.unwrap_or_default()
	}


	/// Get the number of interned strings.
	/// This does not include the dummy PID.
	pub fn len(&self) -> usize {
		self.0.len() - 1
	}


	/// Whether no strings besides the dummy PID were interned.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}


impl Default for Interner {
	fn default() -> Self {
		Self::new()
	}
}


/// The interner shared between the main parser and background workers. Every access
/// goes through the lock, which is the critical section serializing PID creation.
pub type SharedInterner = Arc<Mutex<Interner>>;


/// Wrap an interner so that it may be shared between parser threads.
pub fn shared(interner: Interner) -> SharedInterner {
	Arc::new(Mutex::new(interner))
}
