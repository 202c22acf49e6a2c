/// Declare a bit set type with named flags. The generated type prints the names of the
/// flags it contains.
macro_rules! flags {
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident: $repr:ty {
			$(
				$(#[$fmeta:meta])*
				const $flag:ident = $value:expr;
			)*
		}
	) => {
		$(#[$meta])*
		#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
		#[derive(serde::Serialize, serde::Deserialize)]
		$vis struct $name($repr);


		#[allow(dead_code)]
		impl $name {
			$(
				$(#[$fmeta])*
				pub const $flag: Self = Self($value);
			)*

			const NAMES: &'static [(&'static str, $name)] = &[
				$((stringify!($flag), Self($value)),)*
			];


			pub const fn empty() -> Self {
				Self(0)
			}


			pub const fn bits(self) -> $repr {
				self.0
			}


			pub const fn from_bits(bits: $repr) -> Self {
				Self(bits)
			}


			pub fn is_empty(self) -> bool {
				self.0 == 0
			}


			pub fn contains(self, other: Self) -> bool {
				self.0 & other.0 == other.0
			}


			pub fn intersects(self, other: Self) -> bool {
				self.0 & other.0 != 0
			}


			pub fn insert(&mut self, other: Self) {
				self.0 |= other.0;
			}


			pub fn remove(&mut self, other: Self) {
				self.0 &= !other.0;
			}


			pub fn set(&mut self, other: Self, value: bool) {
				if value {
					self.insert(other);
				} else {
					self.remove(other);
				}
			}


			/// The names of the contained flags.
			pub fn names(self) -> impl Iterator<Item = &'static str> {
				Self::NAMES
					.iter()
					.filter(move |(_, flag)| self.contains(*flag))
					.map(|(name, _)| *name)
			}
		}


		impl std::ops::BitOr for $name {
			type Output = Self;

			fn bitor(self, other: Self) -> Self {
				Self(self.0 | other.0)
			}
		}


		impl std::ops::BitOrAssign for $name {
			fn bitor_assign(&mut self, other: Self) {
				self.0 |= other.0;
			}
		}


		impl std::ops::BitAnd for $name {
			type Output = Self;

			fn bitand(self, other: Self) -> Self {
				Self(self.0 & other.0)
			}
		}


		impl std::fmt::Debug for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				write!(f, "{}(", stringify!($name))?;
				crate::fmt::sep_by(self.names(), f, |name, f| f.write_str(name), " | ")?;
				write!(f, ")")
			}
		}
	};
}


#[cfg(test)]
mod tests {
	flags! {
		/// Flags for testing.
		struct Sample: u8 {
			/// Documented flag.
			const A = 1 << 0;
			const B = 1 << 1;
			const C = 1 << 2;
		}
	}


	#[test]
	fn test_operators() {
		let both = Sample::A | Sample::B;

		assert_eq!(both & Sample::B, Sample::B);
		assert!((both & Sample::C).is_empty());
		assert_eq!(format!("{:?}", both), "Sample(A | B)");
	}
}
