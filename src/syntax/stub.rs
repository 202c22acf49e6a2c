//! Deferred function stubs.
//!
//! When the body of a deferred function is syntax checked, a stub is recorded for every
//! function nested in it. Un-deferring the function later reuses the stubs to skip the
//! bodies of nested functions that stay deferred. Stubs are plain data, and may be
//! transported through relocatable code data.

use std::collections::HashMap;

use tracing::debug;

use super::{ast::FncFlags, lexer::RestorePoint, SourcePos, Span};
use crate::{
	pid::{Interner, Pid},
	reloc::{self, Allocator, Array, DataPtr, FixupContext, ImageView, Relocatable, Writer},
	semantic::RefFlags,
};


/// The summary of a syntax checked function.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredStub {
	/// The whole function, from its first token to the closing brace.
	pub span: Span,
	/// The opening brace of the body.
	pub body: RestorePoint,
	/// The offset past the closing brace of the body.
	pub body_end: u32,
	pub flags: FncFlags,
	/// Functions nested in the body, at any depth.
	pub nested_count: u32,
	/// Blocks opened by the body, including the body itself.
	pub block_count: u32,
	/// Stubs of the functions directly nested in the body, in source order.
	pub children: Box<[DeferredStub]>,
	/// Names the body refers to without declaring them, with the flags of their
	/// references.
	pub captured: Box<[(Pid, RefFlags)]>,
}


/// The relocatable layout of a stub.
struct StubRecord {
	span: Span,
	body: RestorePoint,
	body_end: u32,
	flags: u32,
	nested_count: u32,
	block_count: u32,
	child_count: u32,
	captured_count: u32,
	children: Option<DataPtr<Array<StubRecord>>>,
	/// Pairs of name index and reference flags.
	captured: Option<DataPtr<Array<u32>>>,
}


impl StubRecord {
	const CHILDREN: usize = 48;
	const CAPTURED: usize = 56;
}


impl Relocatable for StubRecord {
	const SIZE: usize = 64;

	fn write(&self, writer: &mut Writer) {
		writer
			.u32(self.span.ich_min)
			.u32(self.span.ich_lim)
			.u32(self.body.offset)
			.u32(self.body.pos.line)
			.u32(self.body.pos.column)
			.u32(self.body_end)
			.u32(self.flags)
			.u32(self.nested_count)
			.u32(self.block_count)
			.u32(self.child_count)
			.u32(self.captured_count)
			.u32(0)
			.ptr(self.children)
			.ptr(self.captured);
	}

	fn fixup(context: &mut FixupContext, data: &[u8], start: u64, at: usize) -> Result<(), reloc::Error> {
		context.fixup_field(data, start, at + Self::CHILDREN)?;
		context.fixup_field(data, start, at + Self::CAPTURED)
	}
}


/// A name table entry: a slice of the text chunk.
struct NameEntry {
	offset: u32,
	len: u32,
}


impl Relocatable for NameEntry {
	const SIZE: usize = 8;

	fn write(&self, writer: &mut Writer) {
		writer.u32(self.offset).u32(self.len);
	}
}


/// The root of an encoded stub list, always the first allocation.
struct StubHeader {
	stub_count: u32,
	name_count: u32,
	stubs: Option<DataPtr<Array<StubRecord>>>,
	names: Option<DataPtr<Array<NameEntry>>>,
	text: Option<DataPtr<u8>>,
}


impl Relocatable for StubHeader {
	const SIZE: usize = 32;

	fn write(&self, writer: &mut Writer) {
		writer
			.u32(self.stub_count)
			.u32(self.name_count)
			.ptr(self.stubs)
			.ptr(self.names)
			.ptr(self.text);
	}

	fn fixup(context: &mut FixupContext, data: &[u8], start: u64, at: usize) -> Result<(), reloc::Error> {
		for field in [8, 16, 24].iter() {
			context.fixup_field(data, start, at + field)?;
		}
		Ok(())
	}
}


/// Interns names into the table of an encoding.
struct Names<'a> {
	interner: &'a Interner,
	indices: HashMap<Pid, u32>,
	text: Vec<u8>,
	entries: Vec<NameEntry>,
}


impl<'a> Names<'a> {
	fn index(&mut self, pid: Pid) -> u32 {
		if let Some(&index) = self.indices.get(&pid) {
			return index;
		}

		let spelling = self.interner.resolve(pid).unwrap_or_default();
		let index = self.entries.len() as u32;

		self.entries.push(NameEntry { offset: self.text.len() as u32, len: spelling.len() as u32 });
		self.text.extend_from_slice(spelling);
		self.indices.insert(pid, index);

		index
	}
}


fn encode_children(
	stubs: &[DeferredStub],
	names: &mut Names,
	allocator: &mut Allocator,
) -> Result<Option<DataPtr<Array<StubRecord>>>, reloc::Error> {
	if stubs.is_empty() {
		return Ok(None);
	}

	let mut records = Vec::with_capacity(stubs.len());

	for stub in stubs {
		// Children are allocated before their parents, so that every pointer refers to an
		// existing allocation.
		let children = encode_children(&stub.children, names, allocator)?;

		let captured = if stub.captured.is_empty() {
			None
		} else {
			let pairs: Vec<u32> = stub.captured
				.iter()
				.flat_map(|&(pid, flags)| [names.index(pid), flags.bits() as u32])
				.collect();
			Some(allocator.alloc_array(&pairs)?)
		};

		records.push(StubRecord {
			span: stub.span,
			body: stub.body,
			body_end: stub.body_end,
			flags: stub.flags.bits(),
			nested_count: stub.nested_count,
			block_count: stub.block_count,
			child_count: stub.children.len() as u32,
			captured_count: stub.captured.len() as u32,
			children,
			captured,
		});
	}

	Ok(Some(allocator.alloc_array(&records)?))
}


/// Encode stubs into relocatable data. The header is the first allocation of the
/// allocator, which must be empty.
pub fn encode(
	stubs: &[DeferredStub],
	interner: &Interner,
	allocator: &mut Allocator,
) -> Result<(), reloc::Error> {
	let placeholder = StubHeader { stub_count: 0, name_count: 0, stubs: None, names: None, text: None };
	let header = allocator.alloc_typed(&placeholder)?;
	debug_assert_eq!(header.addr(), 0, "stubs must be encoded into an empty allocator");

	let mut names = Names { interner, indices: HashMap::new(), text: Vec::new(), entries: Vec::new() };
	let records = encode_children(stubs, &mut names, allocator)?;

	let text = allocator.alloc_leaf(&names.text)?;
	let table = allocator.alloc_array(&names.entries)?;

	allocator.rewrite(
		header,
		&StubHeader {
			stub_count: stubs.len() as u32,
			name_count: names.entries.len() as u32,
			stubs: records,
			names: Some(table),
			text: Some(DataPtr::new(allocator.addr(text))),
		},
	)?;

	debug!(stubs = stubs.len(), names = names.entries.len(), "encoded deferred stubs");

	Ok(())
}


fn malformed(at: u64) -> reloc::Error {
	reloc::Error::DanglingPointer { patch: at, target: reloc::NULL }
}


struct Decoder<'a> {
	view: ImageView<'a>,
	names: Vec<Pid>,
}


impl<'a> Decoder<'a> {
	fn u32(&self, at: u64) -> Result<u32, reloc::Error> {
		self.view.read_u32(at).ok_or_else(|| malformed(at))
	}


	fn stubs(&self, array: Option<u64>, count: u32) -> Result<Box<[DeferredStub]>, reloc::Error> {
		let array = match array {
			Some(array) => array,
			None => return Ok(Box::default()),
		};

		(0 .. count as u64)
			.map(|index| self.stub(array + index * StubRecord::SIZE as u64))
			.collect()
	}


	fn stub(&self, at: u64) -> Result<DeferredStub, reloc::Error> {
		let field = |index: u64| self.u32(at + index * 4);

		let span = Span::new(field(0)?, field(1)?);
		let body = RestorePoint {
			offset: field(2)?,
			pos: SourcePos { line: field(3)?, column: field(4)? },
		};

		let child_count = field(9)?;
		let captured_count = field(10)?;

		let children = self.stubs(self.view.read_ptr(at + StubRecord::CHILDREN as u64), child_count)?;

		let captured = match self.view.read_ptr(at + StubRecord::CAPTURED as u64) {
			None => Box::default(),
			Some(array) => (0 .. captured_count as u64)
				.map(|index| {
					let name = self.u32(array + index * 8)?;
					let flags = self.u32(array + index * 8 + 4)?;
					let pid = self.names.get(name as usize).copied().ok_or_else(|| malformed(array))?;
					Ok((pid, RefFlags::from_bits(flags as u8)))
				})
				.collect::<Result<_, _>>()?,
		};

		Ok(DeferredStub {
			span,
			body,
			body_end: field(5)?,
			flags: FncFlags::from_bits(field(6)?),
			nested_count: field(7)?,
			block_count: field(8)?,
			children,
			captured,
		})
	}
}


/// Decode stubs from a flattened image, as produced by `encode`. Names are interned into
/// the given interner.
pub fn decode(view: ImageView, interner: &mut Interner) -> Result<Vec<DeferredStub>, reloc::Error> {
	let stub_count = view.read_u32(0).ok_or_else(|| malformed(0))?;
	let name_count = view.read_u32(4).ok_or_else(|| malformed(4))?;

	let text = view.read_ptr(24).ok_or_else(|| malformed(24))?;
	let table = view.read_ptr(16).ok_or_else(|| malformed(16))?;

	let names = (0 .. name_count as u64)
		.map(|index| {
			let entry = table + index * NameEntry::SIZE as u64;
			let offset = view.read_u32(entry).ok_or_else(|| malformed(entry))?;
			let len = view.read_u32(entry + 4).ok_or_else(|| malformed(entry))?;
			let spelling = view
				.slice(text + offset as u64, len as usize)
				.ok_or_else(|| malformed(entry))?;
			Ok(interner.get_or_intern(spelling))
		})
		.collect::<Result<Vec<_>, reloc::Error>>()?;

	let decoder = Decoder { view, names };
	let stubs = decoder.stubs(view.read_ptr(8), stub_count)?;

	Ok(stubs.into_vec())
}
