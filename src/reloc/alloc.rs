use tracing::trace;

use super::{
	chunk::FixupFn,
	fixup::{FixupContext, Writer},
	Array,
	ChunkId,
	Config,
	DataChunk,
	DataPtr,
	Error,
	NativeCodeData,
	NativeCodeDataNoFixup,
	Relocatable,
	Target,
};


fn fixup_one<T: Relocatable>(context: &mut FixupContext, data: &[u8], start: u64) -> Result<(), Error> {
	T::fixup(context, data, start, 0)
}


fn fixup_array<T: Relocatable>(context: &mut FixupContext, data: &[u8], start: u64) -> Result<(), Error> {
	Array::<T>::fixup(context, data, start)
}


fn fixup_pointers(context: &mut FixupContext, data: &[u8], start: u64) -> Result<(), Error> {
	context.add_fixup_entry_for_pointer_array(start, data)
}


/// The chunk list shared by both allocator families.
#[derive(Debug, Default)]
struct Chunks {
	chunks: Vec<DataChunk>,
	config: Config,
	/// Bytes accounted against the budget, headers included.
	used: u64,
	freed: u64,
}


impl Chunks {
	fn with_config(config: Config) -> Self {
		debug_assert!(config.align.is_power_of_two(), "alignment must be a power of two");
		Self { config, ..Self::default() }
	}


	fn round(&self, size: usize) -> u64 {
		let align = self.config.align.max(1) as u64;
		(size as u64 + align - 1) & !(align - 1)
	}


	fn next_offset(&self) -> u64 {
		self.chunks
			.last()
			.map_or(0, |chunk| chunk.offset + chunk.len as u64)
	}


	fn push(
		&mut self,
		size: usize,
		fixup: Option<FixupFn>,
		type_name: &'static str,
	) -> Result<ChunkId, Error> {
		let len = self.round(size);
		let requested = len + DataChunk::HEADER_SIZE;

		let exhausted = self.config.limit.map_or(false, |limit| self.used + requested > limit);
		if exhausted || len > u32::MAX as u64 {
			return Err(Error::OutOfMemory { requested: size as u64 });
		}

		let id = ChunkId(self.chunks.len() as u32);
		let offset = self.next_offset();

		trace!(chunk = id.0, offset, len, type_name, "alloc");

		self.chunks.push(DataChunk {
			len: len as u32,
			alloc_index: id.0,
			offset,
			fixup,
			type_name,
			bytes: vec![0; len as usize],
		});
		self.used += requested;

		Ok(id)
	}


	fn typed<T: Relocatable>(&mut self, value: &T, fixup: Option<FixupFn>) -> Result<DataPtr<T>, Error> {
		let id = self.push(T::SIZE, fixup, std::any::type_name::<T>())?;
		let chunk = &mut self.chunks[id.0 as usize];
		value.write(&mut Writer::new(&mut chunk.bytes[.. T::SIZE]));
		Ok(DataPtr::new(chunk.offset))
	}


	fn array<T: Relocatable>(&mut self, values: &[T], fixup: Option<FixupFn>) -> Result<DataPtr<Array<T>>, Error> {
		let id = self.push(T::SIZE * values.len(), fixup, std::any::type_name::<Array<T>>())?;
		let chunk = &mut self.chunks[id.0 as usize];

		for (index, value) in values.iter().enumerate() {
			let at = index * T::SIZE;
			value.write(&mut Writer::new(&mut chunk.bytes[at .. at + T::SIZE]));
		}

		Ok(DataPtr::new(chunk.offset))
	}


	/// Overwrite a typed allocation, for values whose pointers are known only later.
	fn rewrite<T: Relocatable>(&mut self, pointer: DataPtr<T>, value: &T) -> Result<(), Error> {
		let unknown = Error::UnknownAllocation { addr: pointer.addr() };

		let index = self.chunks
			.binary_search_by_key(&pointer.addr(), |chunk| chunk.offset)
			.map_err(|_| unknown.clone())?;

		let chunk = &mut self.chunks[index];
		if (chunk.len as usize) < T::SIZE {
			return Err(unknown);
		}

		value.write(&mut Writer::new(&mut chunk.bytes[.. T::SIZE]));
		Ok(())
	}


	fn leaf(&mut self, bytes: &[u8]) -> Result<ChunkId, Error> {
		let id = self.push(bytes.len(), None, "leaf")?;
		self.chunks[id.0 as usize].bytes[.. bytes.len()].copy_from_slice(bytes);
		Ok(id)
	}


	fn chunk(&self, id: ChunkId) -> &DataChunk {
		&self.chunks[id.0 as usize]
	}


	fn free(&mut self, id: ChunkId) {
		// Chunks are released together with the whole list.
		self.freed += self.chunk(id).len as u64;
	}
}


/// Allocator for data that may cross a process boundary. Each allocation records how to
/// find the pointers it holds.
#[derive(Debug, Default)]
pub struct Allocator {
	chunks: Chunks,
}


impl Allocator {
	pub fn new() -> Self {
		Self::default()
	}


	pub fn with_config(config: Config) -> Self {
		Self { chunks: Chunks::with_config(config) }
	}


	/// Allocate raw bytes, which must not hold pointers.
	pub fn alloc(&mut self, size: usize) -> Result<ChunkId, Error> {
		self.chunks.push(size, None, "raw")
	}


	pub fn alloc_zero(&mut self, size: usize) -> Result<ChunkId, Error> {
		// Chunks are always zero initialized.
		self.alloc(size)
	}


	/// Allocate a copy of pointer-free bytes.
	pub fn alloc_leaf(&mut self, bytes: &[u8]) -> Result<ChunkId, Error> {
		self.chunks.leaf(bytes)
	}


	pub fn alloc_typed<T: Relocatable>(&mut self, value: &T) -> Result<DataPtr<T>, Error> {
		self.chunks.typed(value, Some(fixup_one::<T> as FixupFn))
	}


	pub fn alloc_array<T: Relocatable>(&mut self, values: &[T]) -> Result<DataPtr<Array<T>>, Error> {
		self.chunks.array(values, Some(fixup_array::<T> as FixupFn))
	}


	/// Allocate an array whose every element is a pointer.
	pub fn alloc_pointer_array<T>(&mut self, pointers: &[Option<DataPtr<T>>]) -> Result<DataPtr<Array<u64>>, Error> {
		let addrs: Vec<u64> = pointers
			.iter()
			.map(|pointer| pointer.map_or(super::NULL, DataPtr::addr))
			.collect();

		self.chunks.array(&addrs, Some(fixup_pointers as FixupFn))
	}


	/// Overwrite a value allocated with `alloc_typed`.
	pub fn rewrite<T: Relocatable>(&mut self, pointer: DataPtr<T>, value: &T) -> Result<(), Error> {
		self.chunks.rewrite(pointer, value)
	}


	/// The image offset of a chunk.
	pub fn addr(&self, id: ChunkId) -> u64 {
		self.chunks.chunk(id).offset
	}


	pub fn free(&mut self, id: ChunkId) {
		self.chunks.free(id)
	}


	/// Bytes returned through `free`. Freed chunks stay in the image.
	pub fn freed(&self) -> u64 {
		self.chunks.freed
	}


	/// Complete the data block and build its fixup table.
	pub fn finalize(self) -> Result<NativeCodeData, Error> {
		NativeCodeData::finalize(self.chunks.chunks)
	}
}


/// Allocator for data consumed in the same process, which never needs relocation.
#[derive(Debug, Default)]
pub struct NoFixupAllocator {
	chunks: Chunks,
}


impl NoFixupAllocator {
	pub fn new() -> Self {
		Self::default()
	}


	pub fn with_config(config: Config) -> Self {
		Self { chunks: Chunks::with_config(config) }
	}


	pub fn alloc(&mut self, size: usize) -> Result<ChunkId, Error> {
		self.chunks.push(size, None, "raw")
	}


	pub fn alloc_zero(&mut self, size: usize) -> Result<ChunkId, Error> {
		self.alloc(size)
	}


	pub fn alloc_leaf(&mut self, bytes: &[u8]) -> Result<ChunkId, Error> {
		self.chunks.leaf(bytes)
	}


	pub fn alloc_typed<T: Relocatable>(&mut self, value: &T) -> Result<DataPtr<T>, Error> {
		self.chunks.typed(value, None)
	}


	pub fn alloc_array<T: Relocatable>(&mut self, values: &[T]) -> Result<DataPtr<Array<T>>, Error> {
		self.chunks.array(values, None)
	}


	pub fn alloc_pointer_array<T>(&mut self, pointers: &[Option<DataPtr<T>>]) -> Result<DataPtr<Array<u64>>, Error> {
		let addrs: Vec<u64> = pointers
			.iter()
			.map(|pointer| pointer.map_or(super::NULL, DataPtr::addr))
			.collect();

		self.chunks.array(&addrs, None)
	}


	pub fn addr(&self, id: ChunkId) -> u64 {
		self.chunks.chunk(id).offset
	}


	pub fn free(&mut self, id: ChunkId) {
		self.chunks.free(id)
	}


	pub fn finalize(self) -> NativeCodeDataNoFixup {
		NativeCodeDataNoFixup::new(self.chunks.chunks)
	}
}


/// The allocator family selected by where the data is consumed.
#[derive(Debug)]
pub enum CodeDataAllocator {
	Fixup(Allocator),
	NoFixup(NoFixupAllocator),
}


/// Finalized data of either family.
#[derive(Debug)]
pub enum CodeData {
	Fixup(NativeCodeData),
	NoFixup(NativeCodeDataNoFixup),
}


macro_rules! dispatch {
	($self:ident, $allocator:ident => $body:expr) => {
		match $self {
			Self::Fixup($allocator) => $body,
			Self::NoFixup($allocator) => $body,
		}
	};
}


impl CodeDataAllocator {
	pub fn for_target(target: Target, config: Config) -> Self {
		match target {
			Target::InProcess => Self::NoFixup(NoFixupAllocator::with_config(config)),
			Target::OutOfProcess => Self::Fixup(Allocator::with_config(config)),
		}
	}


	pub fn alloc(&mut self, size: usize) -> Result<ChunkId, Error> {
		dispatch!(self, allocator => allocator.alloc(size))
	}


	pub fn alloc_zero(&mut self, size: usize) -> Result<ChunkId, Error> {
		dispatch!(self, allocator => allocator.alloc_zero(size))
	}


	pub fn alloc_leaf(&mut self, bytes: &[u8]) -> Result<ChunkId, Error> {
		dispatch!(self, allocator => allocator.alloc_leaf(bytes))
	}


	pub fn alloc_typed<T: Relocatable>(&mut self, value: &T) -> Result<DataPtr<T>, Error> {
		dispatch!(self, allocator => allocator.alloc_typed(value))
	}


	pub fn alloc_array<T: Relocatable>(&mut self, values: &[T]) -> Result<DataPtr<Array<T>>, Error> {
		dispatch!(self, allocator => allocator.alloc_array(values))
	}


	pub fn alloc_pointer_array<T>(&mut self, pointers: &[Option<DataPtr<T>>]) -> Result<DataPtr<Array<u64>>, Error> {
		dispatch!(self, allocator => allocator.alloc_pointer_array(pointers))
	}


	pub fn addr(&self, id: ChunkId) -> u64 {
		dispatch!(self, allocator => allocator.addr(id))
	}


	pub fn free(&mut self, id: ChunkId) {
		dispatch!(self, allocator => allocator.free(id))
	}


	pub fn finalize(self) -> Result<CodeData, Error> {
		match self {
			Self::Fixup(allocator) => allocator.finalize().map(CodeData::Fixup),
			Self::NoFixup(allocator) => Ok(CodeData::NoFixup(allocator.finalize())),
		}
	}
}


impl CodeData {
	pub fn image(&self) -> super::Image {
		match self {
			Self::Fixup(data) => data.image(),
			Self::NoFixup(data) => data.image(),
		}
	}


	pub fn total_size(&self) -> u64 {
		match self {
			Self::Fixup(data) => data.total_size(),
			Self::NoFixup(data) => data.total_size(),
		}
	}
}
