use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::{read_u32, read_u64, write_u64, Error, FixupEntry, NULL};


mod base64_buffer {
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(buffer: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&base64::encode(buffer))
	}


	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		base64::decode(&encoded).map_err(serde::de::Error::custom)
	}
}


/// Flattened relocatable data: the concatenation of all chunks in allocation order, and
/// the pointer fields to patch once the buffer is placed at its final address.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Image {
	#[serde(with = "base64_buffer")]
	pub buffer: Vec<u8>,
	pub fixups: Vec<FixupEntry>,
	pub total_size: u64,
}


impl Image {
	pub(super) fn new(buffer: Vec<u8>, fixups: Vec<FixupEntry>) -> Self {
		let total_size = buffer.len() as u64;
		Self { buffer, fixups, total_size }
	}


	/// Copy the buffer for placement at `base`, patching every pointer field. Images may
	/// come from another process, so every patch is checked against the buffer.
	pub fn rehydrate(&self, base: u64) -> Result<Vec<u8>, Error> {
		let mut buffer = self.buffer.clone();

		for fixup in self.fixups.iter() {
			let in_range = fixup.patch
				.checked_add(8)
				.map_or(false, |end| end <= buffer.len() as u64);
			if !in_range {
				return Err(Error::PatchOutOfRange { patch: fixup.patch });
			}

			write_u64(&mut buffer, fixup.patch as usize, base.wrapping_add(fixup.target));
		}

		Ok(buffer)
	}


	/// View the image as built, before relocation.
	pub fn view(&self) -> ImageView {
		ImageView::new(&self.buffer, 0)
	}


	/// A human readable listing of the fixup table.
	pub fn listing(&self) -> String {
		let mut listing = String::new();

		for fixup in self.fixups.iter() {
			let _ = writeln!(
				listing,
				"{} -> {} (allocation {})",
				hex::encode(fixup.patch.to_be_bytes()),
				hex::encode(fixup.target.to_be_bytes()),
				hex::encode(fixup.target_start.to_be_bytes()),
			);
		}

		listing
	}
}


/// Reads relocatable data placed at some base address.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
	bytes: &'a [u8],
	base: u64,
}


impl<'a> ImageView<'a> {
	pub fn new(bytes: &'a [u8], base: u64) -> Self {
		Self { bytes, base }
	}


	pub fn read_u32(&self, at: u64) -> Option<u32> {
		read_u32(self.bytes, at as usize)
	}


	pub fn read_u64(&self, at: u64) -> Option<u64> {
		read_u64(self.bytes, at as usize)
	}


	/// Read a pointer field, yielding the offset it points to. Null pointers are None.
	pub fn read_ptr(&self, at: u64) -> Option<u64> {
		match self.read_u64(at)? {
			NULL => None,
			addr => addr.checked_sub(self.base),
		}
	}


	pub fn slice(&self, at: u64, len: usize) -> Option<&'a [u8]> {
		self.bytes.get(at as usize .. at as usize + len)
	}
}
