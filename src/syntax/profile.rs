use serde::{Deserialize, Serialize};

use crate::semantic::FunctionId;


/// A persisted bitmap of the functions that executed in a previous run. Functions that
/// executed are parsed eagerly, since they will likely be needed again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct ExecutionProfile {
	words: Vec<u64>,
}


impl ExecutionProfile {
	pub fn new() -> Self {
		Self::default()
	}


	pub fn mark_executed(&mut self, function: FunctionId) {
		let (word, bit) = (function.index() / 64, function.index() % 64);
		if self.words.len() <= word {
			self.words.resize(word + 1, 0);
		}
		self.words[word] |= 1 << bit;
	}


	pub fn was_executed(&self, function: FunctionId) -> bool {
		let (word, bit) = (function.index() / 64, function.index() % 64);
		self.words
			.get(word)
			.map_or(false, |word| word & (1 << bit) != 0)
	}


	/// The number of functions marked as executed.
	pub fn len(&self) -> usize {
		self.words
			.iter()
			.map(|word| word.count_ones() as usize)
			.sum()
	}


	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}


impl std::iter::FromIterator<FunctionId> for ExecutionProfile {
	fn from_iter<I: IntoIterator<Item = FunctionId>>(iter: I) -> Self {
		let mut profile = Self::new();
		for function in iter {
			profile.mark_executed(function);
		}
		profile
	}
}
