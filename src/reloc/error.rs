/// Errors of relocatable data allocation and fixup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// The configured budget is exhausted.
	OutOfMemory { requested: u64 },
	/// A pointer field refers to no allocation of the same data block.
	DanglingPointer { patch: u64, target: u64 },
	/// A pointer field was registered twice, or was never registered.
	DuplicateFixup { patch: u64 },
	/// No typed allocation of a sufficient size starts at the address.
	UnknownAllocation { addr: u64 },
	/// A fixup patches a pointer field outside the buffer.
	PatchOutOfRange { patch: u64 },
	/// The operation is only valid in the out-of-process compilation server.
	WrongRole,
}


impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::OutOfMemory { requested } => {
				write!(f, "out of memory allocating {} bytes", requested)
			}
			Self::DanglingPointer { patch, target } => write!(
				f,
				"dangling pointer at 0x{} to 0x{}",
				hex::encode(patch.to_be_bytes()),
				hex::encode(target.to_be_bytes()),
			),
			Self::DuplicateFixup { patch } => {
				write!(f, "duplicate fixup at 0x{}", hex::encode(patch.to_be_bytes()))
			}
			Self::UnknownAllocation { addr } => {
				write!(f, "no allocation at 0x{}", hex::encode(addr.to_be_bytes()))
			}
			Self::PatchOutOfRange { patch } => {
				write!(f, "fixup at 0x{} is out of range", hex::encode(patch.to_be_bytes()))
			}
			Self::WrongRole => write!(f, "operation requires the jit server role"),
		}
	}
}


impl std::error::Error for Error {}
