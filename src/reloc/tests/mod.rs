use assert_matches::assert_matches;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;


/// A list node: a value and a pointer to the next node.
struct Node {
	value: u32,
	next: Option<DataPtr<Node>>,
}


impl Relocatable for Node {
	const SIZE: usize = 12;

	fn write(&self, writer: &mut Writer) {
		writer
			.u32(self.value)
			.ptr(self.next);
	}

	fn fixup(context: &mut FixupContext, data: &[u8], start: u64, at: usize) -> Result<(), Error> {
		context.fixup_field(data, start, at + 4)
	}
}


/// Three pointers per value.
struct Triple([Option<DataPtr<u32>>; 3]);


impl Relocatable for Triple {
	const SIZE: usize = 24;

	fn write(&self, writer: &mut Writer) {
		for pointer in self.0.iter() {
			writer.ptr(*pointer);
		}
	}

	fn fixup(context: &mut FixupContext, data: &[u8], start: u64, at: usize) -> Result<(), Error> {
		for field in 0 .. 3 {
			context.fixup_field(data, start, at + field * 8)?;
		}
		Ok(())
	}
}


#[test]
fn test_chunk_offsets() {
	let mut allocator = Allocator::new();

	let chunks = [40, 17, 64]
		.iter()
		.map(|&size| allocator.alloc(size))
		.collect::<Result<Vec<_>, _>>()
		.expect("allocation failed");

	let data = allocator.finalize().expect("finalize failed");

	let offsets: Vec<u64> = data.chunks().iter().map(DataChunk::offset).collect();
	assert_eq!(offsets, [0, 40, 57]);
	assert_eq!(data.total_size(), 121);
	assert_eq!(chunks.len(), 3);
	assert!(data.fixups().is_empty());
}


#[test]
fn test_aligned_offsets() {
	let mut allocator = Allocator::with_config(Config { align: 8, limit: None });

	allocator.alloc(40).expect("allocation failed");
	allocator.alloc(17).expect("allocation failed");
	allocator.alloc(64).expect("allocation failed");

	let data = allocator.finalize().expect("finalize failed");
	let offsets: Vec<u64> = data.chunks().iter().map(DataChunk::offset).collect();

	assert_eq!(offsets, [0, 40, 64]);
	assert_eq!(data.total_size(), 128);
}


#[test]
fn test_random_offsets_are_prefix_sums() {
	let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

	for _ in 0 .. 32 {
		let align = 1 << rng.gen_range(0 ..= 4);
		let mut allocator = Allocator::with_config(Config { align, limit: None });
		let sizes: Vec<usize> = (0 .. rng.gen_range(1 .. 64))
			.map(|_| rng.gen_range(0 .. 256))
			.collect();

		for &size in sizes.iter() {
			if rng.gen() {
				allocator.alloc(size).expect("allocation failed");
			} else {
				allocator.alloc_zero(size).expect("allocation failed");
			}
		}

		let data = allocator.finalize().expect("finalize failed");
		let round = |size: usize| (size as u64 + align as u64 - 1) / align as u64 * align as u64;

		let mut expected = 0;
		for (chunk, &size) in data.chunks().iter().zip(sizes.iter()) {
			assert_eq!(chunk.offset(), expected);
			assert_eq!(chunk.len() as u64, round(size));
			expected += round(size);
		}

		assert_eq!(data.total_size(), sizes.iter().map(|&size| round(size)).sum::<u64>());
		assert_eq!(data.image().buffer.len() as u64, data.total_size());
	}
}


#[test]
fn test_fixup_completeness() {
	let mut rng = ChaCha8Rng::seed_from_u64(42);
	let mut allocator = Allocator::new();

	// Build a list with some null links, counting the pointer fields.
	let mut nodes: Vec<DataPtr<Node>> = Vec::new();
	let mut pointers = 0;

	for value in 0 .. 100 {
		let next = if nodes.is_empty() || rng.gen_bool(0.2) {
			None
		} else {
			pointers += 1;
			Some(nodes[rng.gen_range(0 .. nodes.len())])
		};

		let node = allocator.alloc_typed(&Node { value, next }).expect("allocation failed");
		nodes.push(node);
	}

	let data = allocator.finalize().expect("finalize failed");
	assert_eq!(data.fixups().len(), pointers);

	for fixup in data.fixups() {
		assert_eq!(data.verify_exist_fixup_entry(fixup.patch), Ok(()));
		assert!(nodes.iter().any(|node| node.addr() == fixup.target));
		assert_eq!(fixup.target, fixup.target_start);
	}
}


#[test]
fn test_array_fixups() {
	let mut allocator = Allocator::new();

	let a = allocator.alloc_typed(&7u32).expect("allocation failed");
	let b = allocator.alloc_typed(&9u32).expect("allocation failed");

	let triples = [
		Triple([Some(a), None, Some(b)]),
		Triple([None, None, None]),
		Triple([Some(b), Some(b), Some(a)]),
	];
	let array = allocator.alloc_array(&triples).expect("allocation failed");
	let pointers = allocator.alloc_pointer_array(&[Some(a), None, Some(b)]).expect("allocation failed");

	let data = allocator.finalize().expect("finalize failed");

	// Five fields in the triples, two in the pointer array.
	assert_eq!(data.fixups().len(), 7);

	let start = array.addr();
	assert_eq!(data.verify_exist_fixup_entry(start), Ok(()));
	assert_missing(&data, start + 8);
	assert_eq!(data.verify_exist_fixup_entry(start + 48 + 16), Ok(()));
	assert_eq!(data.verify_exist_fixup_entry(pointers.addr() + 16), Ok(()));
	assert_missing(&data, pointers.addr() + 8);
}


fn assert_missing(data: &NativeCodeData, patch: u64) {
	assert_matches!(
		data.verify_exist_fixup_entry(patch),
		Err(Error::DanglingPointer { patch: missing, target: NULL }) if missing == patch
	);
}


#[test]
fn test_dangling_pointer() {
	let mut allocator = Allocator::new();
	allocator.alloc_typed(&Node { value: 1, next: Some(DataPtr::new(4096)) }).expect("allocation failed");

	assert_matches!(
		allocator.finalize(),
		Err(Error::DanglingPointer { patch: 4, target: 4096 })
	);
}


#[test]
fn test_interior_pointer() {
	let mut allocator = Allocator::new();

	let array = allocator.alloc_array(&[1u32, 2, 3]).expect("allocation failed");
	let second = DataPtr::<Node>::new(array.addr() + 4);
	allocator.alloc_typed(&Node { value: 0, next: Some(second) }).expect("allocation failed");

	let data = allocator.finalize().expect("finalize failed");
	assert_eq!(
		data.fixups(),
		[FixupEntry { patch: 16, target: 4, target_start: 0 }]
	);
}


#[test]
fn test_out_of_memory() {
	let config = Config { align: 1, limit: Some(2 * DataChunk::HEADER_SIZE + 100) };
	let mut allocator = Allocator::with_config(config);

	allocator.alloc(60).expect("allocation failed");
	allocator.alloc(40).expect("allocation failed");
	assert_matches!(allocator.alloc(1), Err(Error::OutOfMemory { requested: 1 }));
}


#[test]
fn test_free_is_accounting_only() {
	let mut allocator = Allocator::new();

	let first = allocator.alloc(10).expect("allocation failed");
	allocator.alloc(20).expect("allocation failed");
	allocator.free(first);

	assert_eq!(allocator.freed(), 10);

	let data = allocator.finalize().expect("finalize failed");
	assert_eq!(data.total_size(), 30);
}


#[test]
fn test_data_chunk_role() {
	let mut allocator = Allocator::new();
	allocator.alloc(8).expect("allocation failed");
	let node = allocator.alloc_typed(&Node { value: 3, next: None }).expect("allocation failed");
	let data = allocator.finalize().expect("finalize failed");

	assert_matches!(data.data_chunk(node.addr(), Role::Host), Err(Error::WrongRole));

	let chunk = data.data_chunk(node.addr(), Role::JitServer).expect("chunk not found");
	assert_eq!(chunk.alloc_index(), 1);
	assert_eq!(chunk.offset(), 8);
	assert!(chunk.has_fixup());
	assert!(chunk.type_name().ends_with("Node"));

	assert_matches!(data.data_chunk(9, Role::JitServer), Err(Error::DanglingPointer { .. }));
}


#[test]
fn test_rehydrate() {
	let mut allocator = Allocator::new();

	let tail = allocator.alloc_typed(&Node { value: 2, next: None }).expect("allocation failed");
	let head = allocator.alloc_typed(&Node { value: 1, next: Some(tail) }).expect("allocation failed");

	let image = allocator.finalize().expect("finalize failed").image();
	let json = serde_json::to_string(&image).expect("serialization failed");
	let image: Image = serde_json::from_str(&json).expect("deserialization failed");

	let base = 0x7fff_0000_0000;
	let buffer = image.rehydrate(base).expect("rehydration failed");
	let view = ImageView::new(&buffer, base);

	assert_eq!(view.read_u32(head.addr()), Some(1));
	assert_eq!(view.read_ptr(head.addr() + 4), Some(tail.addr()));
	assert_eq!(view.read_u64(head.addr() + 4), Some(base + tail.addr()));
	assert_eq!(view.read_ptr(tail.addr() + 4), None);
}


#[test]
fn test_rehydrate_rejects_foreign_patches() {
	let mut allocator = Allocator::new();

	let tail = allocator.alloc_typed(&Node { value: 2, next: None }).expect("allocation failed");
	allocator.alloc_typed(&Node { value: 1, next: Some(tail) }).expect("allocation failed");

	let mut image = allocator.finalize().expect("finalize failed").image();
	let end = image.buffer.len() as u64;

	for &patch in [end - 4, end, u64::MAX - 2].iter() {
		image.fixups[0].patch = patch;
		assert_matches!(image.rehydrate(0x1000), Err(Error::PatchOutOfRange { patch: at }) if at == patch);
	}
}


#[test]
fn test_rewrite() {
	let mut allocator = Allocator::new();

	let value = allocator.alloc_typed(&5u32).expect("allocation failed");
	let node = allocator.alloc_typed(&Node { value: 1, next: None }).expect("allocation failed");

	allocator.rewrite(node, &Node { value: 7, next: Some(value.cast()) }).expect("rewrite failed");
	assert_matches!(
		allocator.rewrite(DataPtr::<Node>::new(node.addr() + 4), &Node { value: 0, next: None }),
		Err(Error::UnknownAllocation { .. })
	);
	// Too small for a node.
	assert_matches!(
		allocator.rewrite(value.cast::<Node>(), &Node { value: 0, next: None }),
		Err(Error::UnknownAllocation { .. })
	);

	let image = allocator.finalize().expect("finalize failed").image();
	let view = image.view();
	assert_eq!(view.read_u32(node.addr()), Some(7));
	assert_eq!(view.read_ptr(node.addr() + 4), Some(value.addr()));
}


#[test]
fn test_in_process_family() {
	let mut allocator = CodeDataAllocator::for_target(Target::InProcess, Config::default());
	assert_matches!(allocator, CodeDataAllocator::NoFixup(_));

	let value = allocator.alloc_typed(&5u32).expect("allocation failed");
	allocator.alloc_typed(&Node { value: 1, next: Some(value.cast()) }).expect("allocation failed");

	let data = allocator.finalize().expect("finalize failed");
	assert_eq!(data.total_size(), 16);
	assert!(data.image().fixups.is_empty());

	let mut allocator = CodeDataAllocator::for_target(Target::OutOfProcess, Config::default());
	let value = allocator.alloc_typed(&5u32).expect("allocation failed");
	allocator.alloc_typed(&Node { value: 1, next: Some(value.cast()) }).expect("allocation failed");

	let data = allocator.finalize().expect("finalize failed");
	assert_eq!(data.image().fixups.len(), 1);
}
