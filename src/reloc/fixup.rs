use std::{collections::HashSet, marker::PhantomData};

use serde::{Deserialize, Serialize};

use super::{read_u64, write_u32, write_u64, Error, NULL};


/// A pointer into relocatable data, as an offset in the flattened image.
pub struct DataPtr<T> {
	addr: u64,
	marker: PhantomData<fn() -> T>,
}


impl<T> DataPtr<T> {
	/// A pointer to the given image offset.
	pub fn new(addr: u64) -> Self {
		Self { addr, marker: PhantomData }
	}


	pub fn addr(self) -> u64 {
		self.addr
	}


	/// Reinterpret the pointer, for pointers to the first element of an array.
	pub fn cast<U>(self) -> DataPtr<U> {
		DataPtr::new(self.addr)
	}
}


impl<T> Clone for DataPtr<T> {
	fn clone(&self) -> Self {
		*self
	}
}


impl<T> Copy for DataPtr<T> {}


impl<T> PartialEq for DataPtr<T> {
	fn eq(&self, other: &Self) -> bool {
		self.addr == other.addr
	}
}


impl<T> Eq for DataPtr<T> {}


impl<T> std::fmt::Debug for DataPtr<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "DataPtr(0x{})", hex::encode(self.addr.to_be_bytes()))
	}
}


/// Sequential writer for the fixed layout of a relocatable type.
#[derive(Debug)]
pub struct Writer<'a> {
	bytes: &'a mut [u8],
	at: usize,
}


impl<'a> Writer<'a> {
	pub(super) fn new(bytes: &'a mut [u8]) -> Self {
		Self { bytes, at: 0 }
	}


	pub fn u32(&mut self, value: u32) -> &mut Self {
		write_u32(self.bytes, self.at, value);
		self.at += 4;
		self
	}


	pub fn u64(&mut self, value: u64) -> &mut Self {
		write_u64(self.bytes, self.at, value);
		self.at += 8;
		self
	}


	pub fn ptr<T>(&mut self, value: Option<DataPtr<T>>) -> &mut Self {
		self.u64(value.map_or(NULL, DataPtr::addr))
	}
}


/// Types with a fixed byte layout that may be stored in relocatable data. Types holding
/// pointers must register them in `fixup`, dispatched per allocation when the data is
/// finalized.
pub trait Relocatable {
	const SIZE: usize;

	fn write(&self, writer: &mut Writer);

	/// Register the pointer fields of the value at `at` in the data of a chunk starting at
	/// image offset `start`.
	fn fixup(_context: &mut FixupContext, _data: &[u8], _start: u64, _at: usize) -> Result<(), Error> {
		Ok(())
	}
}


impl Relocatable for u32 {
	const SIZE: usize = 4;

	fn write(&self, writer: &mut Writer) {
		writer.u32(*self);
	}
}


impl Relocatable for u64 {
	const SIZE: usize = 8;

	fn write(&self, writer: &mut Writer) {
		writer.u64(*self);
	}
}


/// Arrays of relocatable values.
#[derive(Debug)]
pub struct Array<T>(PhantomData<T>);


impl<T: Relocatable> Array<T> {
	/// Fix up every element. Elements are visited in reverse order, each once.
	pub fn fixup(context: &mut FixupContext, data: &[u8], start: u64) -> Result<(), Error> {
		if T::SIZE == 0 {
			return Ok(());
		}

		let count = data.len() / T::SIZE;
		for index in (0 .. count).rev() {
			T::fixup(context, data, start, index * T::SIZE)?;
		}

		Ok(())
	}
}


/// A pointer field registered for relocation. All values are image offsets: the field to
/// patch, the address it holds, and the start of the allocation holding that address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub struct FixupEntry {
	pub patch: u64,
	pub target: u64,
	pub target_start: u64,
}


/// The fixup registry of a data block under construction.
#[derive(Debug)]
pub struct FixupContext {
	/// Allocation extents, sorted by offset.
	extents: Vec<(u64, u64)>,
	entries: Vec<FixupEntry>,
	registered: HashSet<u64>,
}


impl FixupContext {
	pub(super) fn new(extents: Vec<(u64, u64)>) -> Self {
		Self { extents, entries: Vec::new(), registered: HashSet::new() }
	}


	/// The start of the allocation containing an address.
	fn owner(&self, addr: u64) -> Option<u64> {
		let index = match self.extents.binary_search_by_key(&addr, |&(start, _)| start) {
			Ok(index) => index,
			Err(0) => return None,
			Err(index) => index - 1,
		};

		let (start, len) = self.extents[index];
		if addr < start + len || (len == 0 && addr == start) {
			Some(start)
		} else {
			None
		}
	}


	/// Register that the pointer field at `patch`, in the allocation starting at `start`,
	/// holds `target`.
	pub fn add_fixup_entry(&mut self, target: u64, patch: u64, start: u64) -> Result<(), Error> {
		debug_assert_eq!(self.owner(patch), Some(start), "patch outside its allocation");

		let target_start = self
			.owner(target)
			.ok_or(Error::DanglingPointer { patch, target })?;

		if !self.registered.insert(patch) {
			return Err(Error::DuplicateFixup { patch });
		}

		self.entries.push(FixupEntry { patch, target, target_start });

		Ok(())
	}


	/// Register the pointer field at `at`, unless it is null.
	pub fn fixup_field(&mut self, data: &[u8], start: u64, at: usize) -> Result<(), Error> {
		let target = read_u64(data, at).ok_or(Error::DanglingPointer { patch: start + at as u64, target: NULL })?;

		if target == NULL {
			Ok(())
		} else {
			self.add_fixup_entry(target, start + at as u64, start)
		}
	}


	/// Register every element of an allocation made only of pointers.
	pub fn add_fixup_entry_for_pointer_array(&mut self, start: u64, data: &[u8]) -> Result<(), Error> {
		for at in (0 .. data.len() / 8).map(|index| index * 8) {
			self.fixup_field(data, start, at)?;
		}

		Ok(())
	}


	pub(super) fn into_entries(mut self) -> Vec<FixupEntry> {
		self.entries.sort_unstable();
		self.entries
	}
}
