/// Escape sequences shared by string literals, template literals and identifiers.
/// The state is entered after the backslash was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Escape {
	Start,
	/// `\xHH`
	Hex { digits: u8, value: u32 },
	/// After `\u`, before deciding between the braced and the four digit forms.
	UnicodeOpen,
	/// `\uHHHH`
	Unicode { digits: u8, value: u32 },
	/// `\u{H...}`
	UnicodeBrace { digits: u8, value: u32 },
	/// Legacy octal escapes, `\0` to `\377`.
	Octal { digits: u8, value: u32 },
	/// A line continuation with a carriage return, which may be followed by a line feed.
	Cr,
}


/// The outcome of visiting a character inside an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EscapeStep {
	/// Consume the character, and continue in the given state.
	More(Escape),
	/// Like `More`, but the sequence is a legacy octal escape.
	Legacy(Escape),
	/// Consume the character, producing a code point.
	Char(u32),
	/// Consume the character, producing a code point from a legacy escape (`\8`, `\9`).
	LegacyChar(u32),
	/// Don't consume the character, producing a code point.
	CharResume(u32),
	/// Consume the character, producing it verbatim.
	Byte(u8),
	/// Consume the character, producing nothing (line continuations).
	Skip,
	/// Don't consume the character, producing nothing.
	SkipResume,
	/// Invalid escape sequence.
	Invalid,
}


fn hex(c: Option<u8>) -> Option<u32> {
	c.and_then(|c| (c as char).to_digit(16))
}


impl Escape {
	pub fn visit(self, c: Option<u8>, next: Option<u8>) -> EscapeStep {
		match self {
			Self::Start => match c {
				None => EscapeStep::Invalid,
				Some(b'n') => EscapeStep::Char(0x0A),
				Some(b't') => EscapeStep::Char(0x09),
				Some(b'r') => EscapeStep::Char(0x0D),
				Some(b'b') => EscapeStep::Char(0x08),
				Some(b'f') => EscapeStep::Char(0x0C),
				Some(b'v') => EscapeStep::Char(0x0B),
				Some(b'0') if !next.map_or(false, |c| c.is_ascii_digit()) => EscapeStep::Char(0),
				Some(d @ b'0' ..= b'7') => {
					EscapeStep::Legacy(Self::Octal { digits: 1, value: (d - b'0') as u32 })
				}
				Some(d @ b'8') | Some(d @ b'9') => EscapeStep::LegacyChar(d as u32),
				Some(b'x') => EscapeStep::More(Self::Hex { digits: 0, value: 0 }),
				Some(b'u') => EscapeStep::More(Self::UnicodeOpen),
				Some(b'\r') => EscapeStep::More(Self::Cr),
				Some(b'\n') => EscapeStep::Skip,
				Some(other) => EscapeStep::Byte(other),
			},

			Self::Hex { digits, value } => match hex(c) {
				Some(d) if digits == 1 => EscapeStep::Char(value * 16 + d),
				Some(d) => EscapeStep::More(Self::Hex { digits: 1, value: d }),
				None => EscapeStep::Invalid,
			},

			Self::UnicodeOpen => match c {
				Some(b'{') => EscapeStep::More(Self::UnicodeBrace { digits: 0, value: 0 }),
				c => match hex(c) {
					Some(d) => EscapeStep::More(Self::Unicode { digits: 1, value: d }),
					None => EscapeStep::Invalid,
				},
			},

			Self::Unicode { digits, value } => match hex(c) {
				Some(d) if digits == 3 => EscapeStep::Char(value * 16 + d),
				Some(d) => EscapeStep::More(Self::Unicode { digits: digits + 1, value: value * 16 + d }),
				None => EscapeStep::Invalid,
			},

			Self::UnicodeBrace { digits, value } => match c {
				Some(b'}') if digits > 0 => EscapeStep::Char(value),
				c => match hex(c) {
					Some(d) if value * 16 + d <= 0x10FFFF => EscapeStep::More(
						Self::UnicodeBrace { digits: digits.saturating_add(1), value: value * 16 + d }
					),
					_ => EscapeStep::Invalid,
				},
			},

			Self::Octal { digits, value } => match c {
				// Up to three digits, as long as the value fits in a byte.
				Some(d @ b'0' ..= b'7') if digits < 3 && value * 8 + ((d - b'0') as u32) <= 0xFF => {
					let value = value * 8 + (d - b'0') as u32;
					if digits == 2 {
						EscapeStep::Char(value)
					} else {
						EscapeStep::Legacy(Self::Octal { digits: digits + 1, value })
					}
				}
				_ => EscapeStep::CharResume(value),
			},

			Self::Cr => match c {
				Some(b'\n') => EscapeStep::Skip,
				_ => EscapeStep::SkipResume,
			},
		}
	}
}


/// The cooked value of a literal being accumulated. Escaped surrogate pairs are
/// combined, lone surrogates are replaced by U+FFFD so that the value is valid UTF-8.
#[derive(Debug, Default)]
pub(super) struct Cooked {
	bytes: Vec<u8>,
	high_surrogate: bool,
	pending: u32,
}


impl Cooked {
	pub fn push_byte(&mut self, byte: u8) {
		self.flush();
		self.bytes.push(byte);
	}


	pub fn push_code_point(&mut self, code_point: u32) {
		match code_point {
			0xD800 ..= 0xDBFF => {
				self.flush();
				self.high_surrogate = true;
				self.pending = code_point;
			}

			0xDC00 ..= 0xDFFF if self.high_surrogate => {
				self.high_surrogate = false;
				let combined = 0x10000 + ((self.pending - 0xD800) << 10) + (code_point - 0xDC00);
				self.push_char(combined);
			}

			_ => {
				self.flush();
				self.push_char(code_point);
			}
		}
	}


	pub fn finish(mut self) -> Vec<u8> {
		self.flush();
		self.bytes
	}


	fn flush(&mut self) {
		if self.high_surrogate {
			self.high_surrogate = false;
			self.push_char(0xFFFD);
		}
	}


	fn push_char(&mut self, code_point: u32) {
		let c = std::char::from_u32(code_point).unwrap_or(std::char::REPLACEMENT_CHARACTER);
		let mut buffer = [0; 4];
		self.bytes.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
	}
}
