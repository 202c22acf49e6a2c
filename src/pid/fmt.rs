use std::fmt::Display as _;

use bstr::ByteSlice;

use super::{Interner, Pid};
use crate::{
	fmt::Display,
	term::color,
};


impl<'a> Display<'a> for Pid {
	type Context = &'a Interner;

	fn fmt(&self, f: &mut std::fmt::Formatter<'_>, context: Self::Context) -> std::fmt::Result {
		if *self == Self::default() {
			color::Fg(color::Red, "<invalid pid>").fmt(f)
		} else {
			let spelling = context.resolve(*self).unwrap_or_default();

			color::Fg(color::Green, spelling.as_bstr()).fmt(f)
		}
	}
}
