use std::fmt::{self, Debug, Display};

use termion::color as term;
pub use termion::color::{Blue, Cyan, Green, Magenta, Red, Yellow};


/// Paint the foreground with a given color when formatting the value.
/// Colors are suppressed when `NO_COLOR` is set, so dumps stay diffable.
pub struct Fg<C, T>(pub C, pub T);


fn enabled() -> bool {
	std::env::var_os("NO_COLOR").is_none()
}


impl<C, T> Debug for Fg<C, T>
where
	C: term::Color + Copy,
	T: Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if enabled() {
			write!(f, "{}{:?}{}", term::Fg(self.0), self.1, term::Fg(term::Reset))
		} else {
			self.1.fmt(f)
		}
	}
}


impl<C, T> Display for Fg<C, T>
where
	C: term::Color + Copy,
	T: Display,
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if enabled() {
			write!(f, "{}{}{}", term::Fg(self.0), self.1, term::Fg(term::Reset))
		} else {
			self.1.fmt(f)
		}
	}
}
