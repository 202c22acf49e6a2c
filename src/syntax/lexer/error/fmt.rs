use std::fmt::{self, Display};

use super::{Error, ErrorKind};


impl Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Unexpected(value) => write!(f, "invalid character '{}'", value.escape_ascii())?,

			Self::UnterminatedString => "unterminated string constant".fmt(f)?,

			Self::UnterminatedComment => "unterminated comment".fmt(f)?,

			Self::UnterminatedTemplate => "unterminated template literal".fmt(f)?,

			Self::UnterminatedRegex => "unterminated regular expression literal".fmt(f)?,

			Self::InvalidEscapeSequence(sequence) => {
				write!(
					f,
					"invalid escape sequence: {}",
					String::from_utf8_lossy(sequence)
				)?;
			}

			Self::InvalidNumber(number) => {
				write!(f, "invalid number: {}", String::from_utf8_lossy(number))?;
			}
		};

		Ok(())
	}
}


impl Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{} - {}.", self.pos, self.error)
	}
}
