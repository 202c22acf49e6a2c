//! A JavaScript front end: a recursive descent parser that defers and parallelizes the
//! parsing of function bodies, and a relocatable allocator for the data it hands off.

#[macro_use]
mod flags;

pub mod fmt;
pub mod pid;
pub mod reloc;
pub mod semantic;
pub mod syntax;
pub mod term;
#[cfg(test)]
mod tests;

pub use syntax::{parse, Error, Options, ParseTree, Source};
