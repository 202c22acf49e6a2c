//! Parsing top level functions in the background.
//!
//! The main parser hands eligible functions to the coordinator as items, skipping their
//! text after a fast scan. Each item is parsed into a separate fragment, either by a pool
//! of worker threads or by the main thread once the top level is done. Fragments are
//! grafted into the main tree in submission order, and the references they could not bind
//! are resolved from the scope the function appeared in, which by then holds every
//! declaration of the program.

use std::{
	sync::{mpsc, Arc},
	thread,
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{
	ast::{Ast, FncFlags, Remap},
	config::{BackgroundMode, Options},
	lexer::RestorePoint,
	parser::{Error, Parser},
};
use crate::{
	pid::SharedInterner,
	semantic::{Binder, BlockId, FunctionId, RefId, ScopeId, ScopeTable},
};


/// A function handed to the background.
#[derive(Debug, Clone)]
pub struct Item {
	/// Submission order.
	pub index: usize,
	/// The first token of the function.
	pub start: RestorePoint,
	pub declaration: bool,
	/// Flags the main parser put on the header, such as a default export.
	pub flags: FncFlags,
	pub strict: bool,
	/// The id reserved for the function by the main parser.
	pub function: FunctionId,
	/// The scope the function appeared in.
	pub scope: ScopeId,
}


/// The result of parsing an item.
#[derive(Debug)]
pub struct Fragment {
	pub ast: Ast,
	pub scopes: ScopeTable,
	pub block_count: u32,
	/// Functions of the fragment, its root included.
	pub function_count: u32,
	/// References left unbound in the fragment.
	pub free_refs: Vec<RefId>,
	/// Flags the fragment propagated to the program.
	pub flags: FncFlags,
}


type Outcome = (Item, Result<Fragment, Error>);


struct Pool {
	sender: Option<mpsc::Sender<Item>>,
	results: mpsc::Receiver<Outcome>,
	workers: Vec<thread::JoinHandle<()>>,
}


impl Pool {
	fn new(threads: usize, text: Arc<[u8]>, interner: SharedInterner, options: Arc<Options>) -> Self {
		let (sender, items) = mpsc::channel::<Item>();
		let (done, results) = mpsc::channel::<Outcome>();
		let items = Arc::new(Mutex::new(items));

		let workers = (0 .. threads.max(1))
			.map(|worker| {
				let items = items.clone();
				let done = done.clone();
				let text = text.clone();
				let interner = interner.clone();
				let options = options.clone();

				thread::spawn(move || loop {
					// The lock is released before parsing.
					let item = items.lock().recv();
					let item = match item {
						Ok(item) => item,
						Err(_) => break,
					};

					debug!(worker, index = item.index, "parsing background item");
					let result = Parser::parse_fragment(&text, interner.clone(), &options, &item);

					if done.send((item, result)).is_err() {
						break;
					}
				})
			})
			.collect();

		Self { sender: Some(sender), results, workers }
	}
}


/// Queues background items and collects their fragments.
pub struct Coordinator {
	text: Arc<[u8]>,
	interner: SharedInterner,
	options: Arc<Options>,
	/// Every submitted item, in submission order.
	submitted: Vec<Item>,
	/// Items waiting for the main thread.
	pending: Vec<Item>,
	completed: Vec<Outcome>,
	pool: Option<Pool>,
}


impl std::fmt::Debug for Coordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.debug_struct("Coordinator")
			.field("submitted", &self.submitted.len())
			.field("pending", &self.pending.len())
			.field("threads", &self.pool.as_ref().map(|pool| pool.workers.len()))
			.finish()
	}
}


impl Coordinator {
	pub fn new(mode: BackgroundMode, text: Arc<[u8]>, interner: SharedInterner, options: Options) -> Self {
		let options = Arc::new(options);

		let pool = match mode {
			BackgroundMode::Threads(threads) => {
				Some(Pool::new(threads, text.clone(), interner.clone(), options.clone()))
			}
			_ => None,
		};

		Self {
			text,
			interner,
			options,
			submitted: Vec::new(),
			pending: Vec::new(),
			completed: Vec::new(),
			pool,
		}
	}


	/// Queue an item, returning its index.
	pub fn submit(&mut self, mut item: Item) -> usize {
		let index = self.submitted.len();
		item.index = index;
		self.submitted.push(item.clone());

		debug!(index, function = item.function.0, offset = item.start.offset, "submitted background item");

		let sender = self.pool
			.as_ref()
			.and_then(|pool| pool.sender.as_ref());

		match sender {
			Some(sender) => {
				// A dead pool leaves the item to the main thread.
				if let Err(mpsc::SendError(item)) = sender.send(item) {
					self.pending.push(item);
				}
			}

			None => self.pending.push(item),
		}

		index
	}


	/// Parse the items no worker will take on the calling thread.
	pub fn run_pending_inline(&mut self) {
		for item in std::mem::take(&mut self.pending) {
			debug!(index = item.index, "parsing background item inline");
			let result = Parser::parse_fragment(&self.text, self.interner.clone(), &self.options, &item);
			self.completed.push((item, result));
		}
	}


	/// Wait for every item to complete. Returns the fragments in submission order, or the
	/// error of the first failed item. Items lost to a failed worker are parsed again on
	/// the calling thread.
	pub fn wait_all(mut self) -> Result<Vec<(Item, Fragment)>, Error> {
		if let Some(mut pool) = self.pool.take() {
			// Closing the channel stops the workers once the queue is drained.
			pool.sender = None;

			for worker in pool.workers.drain(..) {
				if worker.join().is_err() {
					warn!("background worker panicked");
				}
			}

			self.completed.extend(pool.results.try_iter());
		}

		// Items that reached neither a worker nor the inline queue.
		self.run_pending_inline();

		let mut done = vec![false; self.submitted.len()];
		for (item, _) in self.completed.iter() {
			done[item.index] = true;
		}

		for item in self.submitted.iter().filter(|item| !done[item.index]) {
			warn!(index = item.index, function = item.function.0, "background item lost, parsing inline");
			self.pending.push(item.clone());
		}
		self.run_pending_inline();

		let mut completed = self.completed;
		completed.sort_by_key(|(item, _)| item.index);

		debug!(items = completed.len(), "background items complete");

		completed
			.into_iter()
			.map(|(item, result)| result.map(|fragment| (item, fragment)))
			.collect()
	}


	/// Graft a fragment into the main tree in place of the placeholder of its function,
	/// and bind its free references from the scope the function appeared in.
	pub fn merge(
		ast: &mut Ast,
		binder: &mut Binder,
		next_function_id: &mut u32,
		item: &Item,
		fragment: Fragment,
	) {
		let placeholder = ast
			.function(item.function)
			.map(|function| (function.node, function.name_symbol));

		let table = binder.table();
		let remap = Remap {
			nodes: ast.len() as u32,
			scopes: table.scope_count() as u32,
			symbols: table.symbol_count() as u32,
			refs: table.ref_count() as u32,
			blocks: binder.next_block_id().0,
			function_base: *next_function_id,
			root_function: item.function.0,
		};

		let offsets = binder.graft(fragment.scopes, item.scope, remap.blocks, |id| remap.function(id));
		debug_assert_eq!(offsets, (remap.scopes, remap.symbols, remap.refs));

		ast.graft(fragment.ast, &remap);

		if let (Some(function), Some((node, name_symbol))) = (ast.function_mut(item.function), placeholder) {
			function.node = node;
			function.parent = Some(FunctionId::PROGRAM);
			if function.name_symbol.is_none() {
				function.name_symbol = name_symbol;
			}
		}

		binder.set_next_block_id(BlockId(remap.blocks + fragment.block_count));
		*next_function_id += fragment.function_count.saturating_sub(1);

		let free: Vec<RefId> = fragment.free_refs
			.iter()
			.map(|&reference| remap.reference(reference))
			.collect();
		binder.bind_free_refs(&free, item.scope);

		let propagated = fragment.flags & (FncFlags::CHILD_CALLS_EVAL | FncFlags::HAS_WITH);
		if let Some(program) = ast.function_mut(FunctionId::PROGRAM) {
			program.flags.insert(propagated);
		}

		debug!(
			index = item.index,
			function = item.function.0,
			free = free.len(),
			nodes = ast.len(),
			"merged background item"
		);
	}
}


#[cfg(test)]
mod tests;
