//! Relocatable code data.
//!
//! Data produced by a compilation worker may be consumed in another address space. Every
//! allocation is a chunk with a fixed offset in the flattened image, and every pointer
//! field is recorded in a fixup table so that the receiving side can rebase it. Pointers
//! are stored as image offsets while building, the null pointer being `u64::MAX`.

mod alloc;
mod chunk;
mod error;
mod fixup;
mod image;
#[cfg(test)]
mod tests;

pub use alloc::{Allocator, CodeData, CodeDataAllocator, NoFixupAllocator};
pub use chunk::{ChunkId, DataChunk, NativeCodeData, NativeCodeDataNoFixup};
pub use error::Error;
pub use fixup::{Array, DataPtr, FixupContext, FixupEntry, Relocatable, Writer};
pub use image::{Image, ImageView};


/// The null pointer in relocatable data.
pub const NULL: u64 = u64::MAX;


/// Where the data will be consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Target {
	/// Same address space, no relocation is ever needed.
	InProcess,
	/// Transported to another process, pointers must be fixed up.
	OutOfProcess,
}


/// The role of the running process in out-of-process compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
	Host,
	JitServer,
}


/// Allocator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// Allocation sizes are rounded up to this alignment.
	pub align: u32,
	/// Byte budget, including chunk headers. Exceeding it is an out of memory condition.
	pub limit: Option<u64>,
}


impl Default for Config {
	fn default() -> Self {
		Self { align: 1, limit: None }
	}
}


/// Read a little endian u64 at the given offset.
pub(crate) fn read_u64(bytes: &[u8], at: usize) -> Option<u64> {
	let mut word = [0; 8];
	word.copy_from_slice(bytes.get(at .. at + 8)?);
	Some(u64::from_le_bytes(word))
}


pub(crate) fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
	let mut word = [0; 4];
	word.copy_from_slice(bytes.get(at .. at + 4)?);
	Some(u32::from_le_bytes(word))
}


pub(crate) fn write_u64(bytes: &mut [u8], at: usize, value: u64) {
	bytes[at .. at + 8].copy_from_slice(&value.to_le_bytes());
}


pub(crate) fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
	bytes[at .. at + 4].copy_from_slice(&value.to_le_bytes());
}
