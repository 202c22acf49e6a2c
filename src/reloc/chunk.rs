use tracing::debug;

use super::{fixup::FixupContext, read_u64, Error, FixupEntry, Image, Role, NULL};


/// Dispatches the fixups of one allocation, instantiated per allocated type.
pub(super) type FixupFn = fn(&mut FixupContext, &[u8], u64) -> Result<(), Error>;


/// Index of a chunk in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(pub u32);


/// One allocation. Chunks are laid out back to back in allocation order, so the offset of
/// a chunk is the sum of the sizes of the previous ones.
#[derive(Clone)]
pub struct DataChunk {
	pub(super) len: u32,
	pub(super) alloc_index: u32,
	pub(super) offset: u64,
	pub(super) fixup: Option<FixupFn>,
	pub(super) type_name: &'static str,
	pub(super) bytes: Vec<u8>,
}


impl DataChunk {
	/// Bookkeeping overhead of each chunk, accounted against the allocator budget.
	pub const HEADER_SIZE: u64 = 32;


	pub fn len(&self) -> u32 {
		self.len
	}


	pub fn is_empty(&self) -> bool {
		self.len == 0
	}


	pub fn alloc_index(&self) -> u32 {
		self.alloc_index
	}


	pub fn offset(&self) -> u64 {
		self.offset
	}


	pub fn type_name(&self) -> &'static str {
		self.type_name
	}


	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}


	pub fn has_fixup(&self) -> bool {
		self.fixup.is_some()
	}
}


impl std::fmt::Debug for DataChunk {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("DataChunk")
			.field("len", &self.len)
			.field("alloc_index", &self.alloc_index)
			.field("offset", &self.offset)
			.field("type_name", &self.type_name)
			.field("has_fixup", &self.fixup.is_some())
			.finish()
	}
}


fn total_size(chunks: &[DataChunk]) -> u64 {
	chunks
		.last()
		.map_or(0, |chunk| chunk.offset + chunk.len as u64)
}


fn flatten(chunks: &[DataChunk]) -> Vec<u8> {
	let mut buffer = Vec::with_capacity(total_size(chunks) as usize);
	for chunk in chunks {
		debug_assert_eq!(buffer.len() as u64, chunk.offset);
		buffer.extend_from_slice(&chunk.bytes);
	}
	buffer
}


/// Finalized data with its fixup table.
#[derive(Debug)]
pub struct NativeCodeData {
	chunks: Box<[DataChunk]>,
	fixups: Box<[FixupEntry]>,
}


impl NativeCodeData {
	/// Run the fixup dispatch of every chunk.
	pub(super) fn finalize(chunks: Vec<DataChunk>) -> Result<Self, Error> {
		let extents = chunks
			.iter()
			.map(|chunk| (chunk.offset, chunk.len as u64))
			.collect();

		let mut context = FixupContext::new(extents);

		for chunk in chunks.iter() {
			if let Some(fixup) = chunk.fixup {
				fixup(&mut context, &chunk.bytes, chunk.offset)?;
			}
		}

		let fixups = context.into_entries().into_boxed_slice();

		debug!(
			chunks = chunks.len(),
			total_size = total_size(&chunks),
			fixups = fixups.len(),
			"finalized code data"
		);

		Ok(Self { chunks: chunks.into_boxed_slice(), fixups })
	}


	pub fn chunks(&self) -> &[DataChunk] {
		&self.chunks
	}


	pub fn fixups(&self) -> &[FixupEntry] {
		&self.fixups
	}


	/// The size of the flattened image.
	pub fn total_size(&self) -> u64 {
		total_size(&self.chunks)
	}


	/// Check that the pointer field at `patch` was registered exactly once.
	pub fn verify_exist_fixup_entry(&self, patch: u64) -> Result<(), Error> {
		let registered = self.fixups
			.iter()
			.filter(|entry| entry.patch == patch)
			.count();

		match registered {
			1 => Ok(()),
			0 => {
				let target = self.read_u64(patch).unwrap_or(NULL);
				Err(Error::DanglingPointer { patch, target })
			}
			_ => Err(Error::DuplicateFixup { patch }),
		}
	}


	/// The chunk whose data starts at the given address. Only the compilation server
	/// inspects chunk headers.
	pub fn data_chunk(&self, addr: u64, role: Role) -> Result<&DataChunk, Error> {
		if role != Role::JitServer {
			return Err(Error::WrongRole);
		}

		self.chunks
			.binary_search_by_key(&addr, |chunk| chunk.offset)
			.map(|index| &self.chunks[index])
			.map_err(|_| Error::DanglingPointer { patch: NULL, target: addr })
	}


	fn read_u64(&self, addr: u64) -> Option<u64> {
		let chunk = self.chunks
			.iter()
			.find(|chunk| chunk.offset <= addr && addr < chunk.offset + chunk.len as u64)?;

		read_u64(&chunk.bytes, (addr - chunk.offset) as usize)
	}


	/// Flatten into a transportable image.
	pub fn image(&self) -> Image {
		Image::new(flatten(&self.chunks), self.fixups.to_vec())
	}
}


/// Finalized data which holds no pointers.
#[derive(Debug)]
pub struct NativeCodeDataNoFixup {
	chunks: Box<[DataChunk]>,
}


impl NativeCodeDataNoFixup {
	pub(super) fn new(chunks: Vec<DataChunk>) -> Self {
		debug!(chunks = chunks.len(), total_size = total_size(&chunks), "finalized code data");
		Self { chunks: chunks.into_boxed_slice() }
	}


	pub fn chunks(&self) -> &[DataChunk] {
		&self.chunks
	}


	pub fn total_size(&self) -> u64 {
		total_size(&self.chunks)
	}


	pub fn image(&self) -> Image {
		Image::new(flatten(&self.chunks), Vec::new())
	}
}
