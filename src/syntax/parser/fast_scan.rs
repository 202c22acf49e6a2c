//! Locating the end of a function without parsing it.
//!
//! Brackets are counted token by token. The only context the scanner needs is whether a
//! `/` starts a regular expression, which the previous token decides, except after `)`
//! and `}`. There the statements from the last statement boundary at the current depth
//! are parsed again in syntax only mode, up to and past the ambiguous slash, and counting
//! resumes after them.

use tracing::trace;

use super::{Context, Error, ErrorCode, Parser, SyntaxMode};
use crate::{
	pid::SharedInterner,
	semantic::{FunctionId, ScopeKind},
	syntax::{
		ast::FncFlags,
		config::Options,
		lexer::{Goal, Keyword, Punct, RestorePoint, Scanner, Token, TokenKind},
	},
};


/// What the previous token says about a following slash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slash {
	Regex,
	Divide,
	/// After `)` or `}`.
	Ambiguous,
}


impl Slash {
	fn after(token: &Token) -> Self {
		match token.kind {
			TokenKind::Punct(Punct::RParen) | TokenKind::Punct(Punct::RCurly) => Self::Ambiguous,
			TokenKind::Punct(Punct::RBrack) => Self::Divide,
			TokenKind::Punct(_) => Self::Regex,

			TokenKind::Keyword(Keyword::This)
			| TokenKind::Keyword(Keyword::Super)
			| TokenKind::Keyword(Keyword::Null)
			| TokenKind::Keyword(Keyword::True)
			| TokenKind::Keyword(Keyword::False) => Self::Divide,
			TokenKind::Keyword(_) => Self::Regex,

			TokenKind::Template { tail: false, .. } => Self::Regex,

			_ => Self::Divide,
		}
	}
}


/// An open bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
	Paren,
	Brack,
	/// A brace, with the point past the last statement boundary inside it.
	Curly(RestorePoint),
	/// A template substitution.
	Template,
}


struct FastScan<'a> {
	scanner: Scanner<'a>,
	interner: SharedInterner,
	options: &'a Options,
	strict: bool,
	flags: FncFlags,
	stack: Vec<Open>,
	slash: Slash,
}


/// Find the end of the formal parameters and body of a function, starting at the opening
/// parenthesis of the parameters. Returns the point past the closing brace.
pub fn fast_scan_formals_and_body(
	input: &[u8],
	start: RestorePoint,
	interner: SharedInterner,
	options: &Options,
	strict: bool,
	flags: FncFlags,
) -> Result<RestorePoint, Error> {
	let mut scanner = Scanner::new(input, interner.clone());
	scanner.seek_to(start);

	let mut scan = FastScan {
		scanner,
		interner,
		options,
		strict,
		flags,
		stack: Vec::new(),
		slash: Slash::Regex,
	};

	let end = scan.run()?;
	trace!(start = start.offset, end = end.offset, "fast scanned function");

	Ok(end)
}


impl<'a> FastScan<'a> {
	fn run(&mut self) -> Result<RestorePoint, Error> {
		let first = self.next()?;
		if !first.is_punct(Punct::LParen) {
			return Err(Error::new(ErrorCode::ExpectedLParen, first.span));
		}
		self.stack.push(Open::Paren);

		// Formals.
		while !self.stack.is_empty() {
			self.step()?;
		}

		let brace = self.next()?;
		if !brace.is_punct(Punct::LCurly) {
			return Err(Error::new(ErrorCode::ExpectedLCurly, brace.span));
		}
		self.stack.push(Open::Curly(self.scanner.capture()));
		self.slash = Slash::Regex;

		// Body.
		while !self.stack.is_empty() {
			self.step()?;
		}

		Ok(self.scanner.capture())
	}


	/// Scan a token with the goal the previous token implies.
	fn next(&mut self) -> Result<Token, Error> {
		let goal = match self.slash {
			Slash::Regex => Goal::RegExp,
			_ => Goal::Div,
		};

		let token = self.scanner.scan(goal)?;
		self.slash = Slash::after(&token);

		Ok(token)
	}


	fn step(&mut self) -> Result<(), Error> {
		let ambiguous = self.slash == Slash::Ambiguous;
		let token = self.next()?;

		let slash = token.is_punct(Punct::Slash) || token.is_punct(Punct::SlashAssign);
		if ambiguous && slash {
			return self.resolve_slash(token.span.ich_min);
		}

		match token.kind {
			TokenKind::Eof => return Err(Error::new(ErrorCode::ExpectedRCurly, token.span)),

			TokenKind::Punct(Punct::LParen) => self.stack.push(Open::Paren),
			TokenKind::Punct(Punct::LBrack) => self.stack.push(Open::Brack),
			TokenKind::Punct(Punct::LCurly) => self.stack.push(Open::Curly(self.scanner.capture())),

			TokenKind::Punct(Punct::RParen) => self.close(Open::Paren, &token)?,
			TokenKind::Punct(Punct::RBrack) => self.close(Open::Brack, &token)?,

			TokenKind::Punct(Punct::RCurly) => match self.stack.last() {
				Some(Open::Template) => {
					// The template resumes at the brace itself, past any whitespace.
					self.scanner.seek_to(RestorePoint { offset: token.span.ich_min, pos: token.pos });
					let chunk = self.scanner.scan_template_continuation()?;
					self.slash = Slash::after(&chunk);
					if let TokenKind::Template { tail: true, .. } = chunk.kind {
						self.stack.pop();
					}
				}

				// Whether the braces were a block or a literal is unknown, so the boundary
				// stays before them.
				Some(Open::Curly(_)) => {
					self.stack.pop();
				}

				_ => return Err(Error::new(ErrorCode::Syntax, token.span)),
			},

			TokenKind::Punct(Punct::Semicolon) => self.mark_boundary(),

			TokenKind::Template { tail: false, .. } => self.stack.push(Open::Template),

			_ => (),
		}

		Ok(())
	}


	fn close(&mut self, open: Open, token: &Token) -> Result<(), Error> {
		if self.stack.last() == Some(&open) {
			self.stack.pop();
			Ok(())
		} else {
			Err(Error::new(ErrorCode::Syntax, token.span))
		}
	}


	/// Record a statement boundary after a semicolon, if the scanner is directly inside
	/// braces.
	fn mark_boundary(&mut self) {
		let point = self.scanner.capture();
		if let Some(Open::Curly(boundary)) = self.stack.last_mut() {
			*boundary = point;
		}
	}


	/// Parse the statements from the last boundary up to and past the slash at `offset`,
	/// then continue counting after them.
	fn resolve_slash(&mut self, offset: u32) -> Result<(), Error> {
		let boundary = match self.stack.last() {
			Some(Open::Curly(boundary)) => *boundary,
			// Inside parentheses or brackets the previous token closed a nested group, so
			// the slash already scanned is a division.
			_ => return Ok(()),
		};

		trace!(boundary = boundary.offset, slash = offset, "reparsing statements at ambiguous slash");

		let input = self.scanner.input();
		let mut parser = Parser::new(input, self.interner.clone(), self.options);
		parser.context = self.context();
		let scope = parser.binder.start_parse_block(ScopeKind::FunctionBody, FunctionId(1));

		parser.skip_to(boundary)?;
		while parser.token.span.ich_min <= offset {
			if parser.token.is_punct(Punct::RCurly) || parser.token.is_eof() {
				return Err(parser.unexpected());
			}
			parser.parse_statement_item::<SyntaxMode>()?;
		}

		parser.binder.finish_parse_block(scope);

		// The parser stopped at the first token of the next statement.
		let resume = parser.token_start();
		self.scanner.seek_to(resume);
		self.slash = Slash::Regex;
		if let Some(Open::Curly(point)) = self.stack.last_mut() {
			*point = resume;
		}

		Ok(())
	}


	/// The context statements of the scanned function are parsed in. Unlabeled jumps are
	/// allowed, as their targets may lie before the boundary.
	fn context(&self) -> Context {
		let mut flags = self.flags;
		flags.set(FncFlags::STRICT, self.strict);

		Context {
			function: FunctionId(1),
			flags,
			strict: self.strict,
			in_function: true,
			generator: self.flags.contains(FncFlags::GENERATOR),
			is_async: self.flags.contains(FncFlags::ASYNC),
			in_params: false,
			super_property: false,
			super_call: false,
			new_target: true,
			labels: 0,
			breakable: 1,
			iteration: 1,
		}
	}
}
