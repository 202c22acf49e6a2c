use super::{
	token,
	Cursor,
	Error,
	IsWord,
	Root,
	SourcePos,
	State,
	TokenKind,
	Transition,
};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Start,
	/// A leading zero.
	Zero,
	Integer,
	Fraction,
	/// After the exponent marker, where a sign may appear.
	ExponentSign,
	Exponent { digits: bool },
	Radix { radix: u32, digits: bool },
	/// Legacy octal literals, like `017`.
	LegacyOctal,
}


/// The state for lexing numeric literals.
#[derive(Debug)]
pub(super) struct NumberLiteral {
	start_offset: u32,
	phase: Phase,
	/// Whether the literal had a leading zero followed by digits, as in `017` or `09`.
	legacy: bool,
	pos: SourcePos,
}


impl NumberLiteral {
	pub fn at(cursor: &Cursor) -> Self {
		Self {
			start_offset: cursor.offset(),
			phase: Phase::Start,
			legacy: false,
			pos: cursor.pos(),
		}
	}


	pub fn visit(mut self, cursor: &Cursor) -> Transition {
		let c = cursor.peek();
		let digit = c.map_or(false, |c| c.is_ascii_digit());
		let exponent = c == Some(b'e') || c == Some(b'E');

		let next = match (self.phase, c) {
			(Phase::Start, Some(b'0')) => Some(Phase::Zero),
			(Phase::Start, Some(b'.')) => Some(Phase::Fraction),
			(Phase::Start, _) if digit => Some(Phase::Integer),

			(Phase::Zero, Some(b'x')) | (Phase::Zero, Some(b'X')) => Some(Phase::Radix { radix: 16, digits: false }),
			(Phase::Zero, Some(b'o')) | (Phase::Zero, Some(b'O')) => Some(Phase::Radix { radix: 8, digits: false }),
			(Phase::Zero, Some(b'b')) | (Phase::Zero, Some(b'B')) => Some(Phase::Radix { radix: 2, digits: false }),
			(Phase::Zero, Some(b'0' ..= b'7')) => {
				self.legacy = true;
				Some(Phase::LegacyOctal)
			}
			(Phase::LegacyOctal, Some(b'0' ..= b'7')) => Some(Phase::LegacyOctal),
			(Phase::Zero, _) | (Phase::LegacyOctal, _) if digit => {
				// Legacy decimal literals, like `09`.
				self.legacy = true;
				Some(Phase::Integer)
			}

			(Phase::Zero, Some(b'.')) | (Phase::Integer, Some(b'.')) => Some(Phase::Fraction),
			(Phase::Zero, _) | (Phase::Integer, _) | (Phase::Fraction, _) if exponent => Some(Phase::ExponentSign),
			(Phase::Integer, _) | (Phase::Fraction, _) if digit => Some(self.phase),

			(Phase::ExponentSign, Some(b'+')) | (Phase::ExponentSign, Some(b'-')) => {
				Some(Phase::Exponent { digits: false })
			}
			(Phase::ExponentSign, _) | (Phase::Exponent { .. }, _) if digit => {
				Some(Phase::Exponent { digits: true })
			}

			(Phase::Radix { radix, .. }, Some(c)) if (c as char).is_digit(radix) => {
				Some(Phase::Radix { radix, digits: true })
			}

			_ => None,
		};

		match next {
			Some(phase) => {
				self.phase = phase;
				Transition::step(self)
			}

			None => {
				let incomplete = matches!(
					self.phase,
					Phase::ExponentSign
						| Phase::Exponent { digits: false }
						| Phase::Radix { digits: false, .. }
				);

				// A literal must not be immediately followed by an identifier or a digit.
				let glued = c.map_or(false, |c| c.is_word());

				if incomplete || glued {
					let number = cursor.slice(self.start_offset, cursor.offset());
					Transition::resume_error(
						Root::default(),
						Error::invalid_number(number, self.start_offset, self.pos)
					)
				} else {
					let value = self.value(cursor.slice(self.start_offset, cursor.offset()));
					let kind = TokenKind::Number { value, legacy_octal: self.legacy };

					Transition::resume_produce(
						Root::default(),
						token(kind, self.start_offset, self.pos, cursor, 0)
					)
				}
			}
		}
	}


	/// Compute the value of the consumed characters.
	fn value(&self, number: &[u8]) -> f64 {
		let radix = |radix: u32, digits: &[u8]| {
			digits
				.iter()
				.filter_map(|&c| (c as char).to_digit(radix))
				.fold(0.0, |acc, digit| acc * radix as f64 + digit as f64)
		};

		match self.phase {
			Phase::Radix { radix: r, .. } => radix(r, &number[2 ..]),
			Phase::LegacyOctal => radix(8, &number[1 ..]),
			_ => {
				// The std float parser is stricter than the JavaScript grammar about dots.
				let mut text = String::from_utf8_lossy(number).into_owned();
				if text.starts_with('.') {
					text.insert(0, '0');
				}
				text = text.replace(".e", ".0e").replace(".E", ".0E");
				if text.ends_with('.') {
					text.push('0');
				}

				text.parse().unwrap_or(f64::NAN)
			}
		}
	}
}


impl From<NumberLiteral> for State {
	fn from(state: NumberLiteral) -> State {
		State::NumberLiteral(state)
	}
}
