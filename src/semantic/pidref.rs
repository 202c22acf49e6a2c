use std::collections::HashMap;

use super::{BlockId, FunctionId, RefId, SymbolId};
use crate::pid::Pid;


flags! {
	/// Properties of the references recorded in a reference record.
	pub struct RefFlags: u8 {
		const ASSIGNMENT = 1 << 0;
		const USED_IN_LD_ELEM = 1 << 1;
		/// Resolved through `with` or direct `eval`, so no static slot may be assumed.
		const DYNAMIC = 1 << 2;
		const FUNC_ASSIGNMENT = 1 << 3;
		const MODULE_EXPORT = 1 << 4;
		/// Stands for assignments from more than one block, when the records of a skipped
		/// function body are summarized into one.
		const REASSIGNMENT = 1 << 5;
	}
}


/// A reference record: all the references to one identifier within one block. Records
/// are created optimistically while parsing and resolved exactly once, when a block
/// declaring the identifier finishes.
#[derive(Debug, Clone)]
pub struct PidRef {
	pub pid: Pid,
	pub block_id: BlockId,
	pub function: FunctionId,
	pub flags: RefFlags,
	pub symbol: Option<SymbolId>,
	/// Created by a syntax check whose scopes were discarded or parsed again. Such records
	/// refer to nothing, and their effects were already accounted for.
	pub discarded: bool,
}


/// The reference stacks of all identifiers. Each stack is ordered by increasing block id
/// from bottom to top, and holds at most one record per block. Bound records are removed.
#[derive(Debug, Default)]
pub struct PidRefStacks(HashMap<Pid, Vec<RefId>>);


impl PidRefStacks {
	/// The stack of an identifier, bottom first.
	pub fn stack(&self, pid: Pid) -> &[RefId] {
		self.0
			.get(&pid)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}


	/// The record on top of the stack, ignoring records of blocks after `max_block_id`.
	pub fn top(&self, pid: Pid, max_block_id: BlockId, refs: &[PidRef]) -> Option<RefId> {
		self.stack(pid)
			.iter()
			.rev()
			.copied()
			.find(|reference| refs[reference.index()].block_id <= max_block_id)
	}


	/// Find the record for the given block, or insert a new one keeping the stack order.
	/// Returns the record and whether it was inserted.
	pub fn find_or_add(
		&mut self,
		pid: Pid,
		block_id: BlockId,
		refs: &[PidRef],
		new: RefId,
	) -> (RefId, bool) {
		let stack = self.0.entry(pid).or_default();

		let mut position = stack.len();
		while position > 0 {
			let reference = stack[position - 1];
			let id = refs[reference.index()].block_id;

			if id == block_id {
				return (reference, false);
			}

			if id < block_id {
				break;
			}

			position -= 1;
		}

		stack.insert(position, new);
		(new, true)
	}


	pub(super) fn stack_mut(&mut self, pid: Pid) -> Option<&mut Vec<RefId>> {
		self.0.get_mut(&pid)
	}


	/// Put back a record taken off its stack, keeping the block order.
	pub(super) fn restore(&mut self, pid: Pid, reference: RefId, refs: &[PidRef]) {
		let block_id = refs[reference.index()].block_id;
		let stack = self.0.entry(pid).or_default();

		let position = stack
			.iter()
			.position(|other| refs[other.index()].block_id > block_id)
			.unwrap_or(stack.len());

		stack.insert(position, reference);
	}


	/// Remove a record from its stack.
	pub fn remove(&mut self, pid: Pid, reference: RefId) {
		if let Some(stack) = self.0.get_mut(&pid) {
			stack.retain(|&r| r != reference);
			if stack.is_empty() {
				self.0.remove(&pid);
			}
		}
	}


	/// Remove all records created from the given id onwards.
	pub fn forget_from(&mut self, first: RefId) {
		for stack in self.0.values_mut() {
			stack.retain(|&reference| reference < first);
		}
		self.0.retain(|_, stack| !stack.is_empty());
	}


	/// All live records, in no particular order.
	pub fn live(&self) -> impl Iterator<Item = (Pid, RefId)> + '_ {
		self.0
			.iter()
			.flat_map(|(&pid, stack)| stack.iter().map(move |&reference| (pid, reference)))
	}


	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}


	pub fn clear(&mut self) {
		self.0.clear();
	}
}
