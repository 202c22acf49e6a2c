use std::convert::TryFrom;

use super::SourcePos;


/// A scanner checkpoint. Seeking to a restore point rewinds the scanner so the parser can
/// re-scan a span under different grammar assumptions. The scanner keeps no state between
/// tokens besides its position, so the offset and the human readable position suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RestorePoint {
	pub offset: u32,
	pub pos: SourcePos,
}


/// A cursor for the source code.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
	input: &'a [u8],
	offset: usize,
	pos: SourcePos,
}


impl<'a> Cursor<'a> {
	pub fn pos(&self) -> SourcePos {
		self.pos
	}


	/// The current character offset.
	pub fn offset(&self) -> u32 {
		u32::try_from(self.offset).expect("source exceeds u32 offsets")
	}


	pub fn is_eof(&self) -> bool {
		self.offset >= self.input.len()
	}


	pub fn peek(&self) -> Option<u8> {
		self.input.get(self.offset).copied()
	}


	/// Peek `n` characters past the current one.
	pub fn peek_at(&self, n: usize) -> Option<u8> {
		self.input.get(self.offset + n).copied()
	}


	/// The input between two offsets.
	pub fn slice(&self, from: u32, to: u32) -> &'a [u8] {
		&self.input[from as usize .. to as usize]
	}


	pub fn input(&self) -> &'a [u8] {
		self.input
	}


	pub fn step(&mut self) {
		if self.is_eof() {
			return;
		}

		self.pos.visit(self.input[self.offset]);
		self.offset += 1;
	}


	pub fn capture(&self) -> RestorePoint {
		RestorePoint { offset: self.offset(), pos: self.pos }
	}


	pub fn seek(&mut self, point: RestorePoint) {
		debug_assert!(point.offset as usize <= self.input.len());
		self.offset = point.offset as usize;
		self.pos = point.pos;
	}
}


impl<'a> From<&'a [u8]> for Cursor<'a> {
	fn from(input: &'a [u8]) -> Self {
		Self {
			input,
			offset: 0,
			pos: SourcePos::default()
		}
	}
}
