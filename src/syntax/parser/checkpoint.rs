use tracing::trace;

use super::{Context, Parser};
use crate::{
	semantic::BinderMark,
	syntax::lexer::{RestorePoint, Token},
};


/// Everything a speculative parse may change. Restoring a checkpoint rewinds the scanner
/// and truncates every arena back to the captured state, so the span can be parsed again
/// under different grammar assumptions.
#[derive(Debug)]
pub(super) struct Checkpoint {
	point: RestorePoint,
	token: Token,
	prev_end: u32,
	nodes: usize,
	functions: usize,
	next_function_id: u32,
	binder: BinderMark,
	context: Context,
	labels: usize,
	/// Depth of the stub frame stack, and length of its top frame.
	stubs: (usize, usize),
	/// Depth of the replay stack, and position of its top cursor.
	replay: (usize, usize),
	bound_names: Option<usize>,
}


impl<'a> Parser<'a> {
	/// Capture the parser state. Every checkpoint must be either restored or committed.
	pub(super) fn checkpoint(&mut self) -> Checkpoint {
		Checkpoint {
			point: self.scanner.capture(),
			token: self.token,
			prev_end: self.prev_end,
			nodes: self.ast.len(),
			functions: self.ast.function_slots(),
			next_function_id: self.next_function_id,
			binder: self.binder.mark(),
			context: self.context,
			labels: self.labels.len(),
			stubs: (
				self.stubs.len(),
				self.stubs.last().map_or(0, Vec::len),
			),
			replay: (
				self.replay.len(),
				self.replay.last().map_or(0, |replay| replay.next),
			),
			bound_names: self.bound_names.as_ref().map(Vec::len),
		}
	}


	/// Rewind to a checkpoint, discarding everything parsed since.
	pub(super) fn restore(&mut self, checkpoint: Checkpoint, reason: &'static str) {
		trace!(
			reason,
			from = self.token.span.ich_min,
			to = checkpoint.token.span.ich_min,
			"speculative rewind"
		);

		self.scanner.seek_to(checkpoint.point);
		self.token = checkpoint.token;
		self.prev_end = checkpoint.prev_end;
		self.ast.truncate(checkpoint.nodes, checkpoint.functions);
		self.next_function_id = checkpoint.next_function_id;
		self.binder.rollback(checkpoint.binder);
		self.context = checkpoint.context;
		self.labels.truncate(checkpoint.labels);

		let (depth, len) = checkpoint.stubs;
		self.stubs.truncate(depth);
		if let Some(frame) = self.stubs.last_mut() {
			frame.truncate(len);
		}

		let (depth, next) = checkpoint.replay;
		self.replay.truncate(depth);
		if let Some(replay) = self.replay.last_mut() {
			replay.next = next;
		}

		if let (Some(names), Some(len)) = (self.bound_names.as_mut(), checkpoint.bound_names) {
			names.truncate(len);
		}
	}


	/// Keep everything parsed since the checkpoint.
	pub(super) fn commit(&mut self, checkpoint: Checkpoint) {
		self.binder.commit(checkpoint.binder);
	}
}
