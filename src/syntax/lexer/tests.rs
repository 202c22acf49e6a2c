use super::*;
use crate::pid::{self, Interner, Pid};

use assert_matches::assert_matches;


macro_rules! token {
	($kind:pat) => {
		Ok(Token { kind: $kind, .. })
	};
}

macro_rules! error {
	($error:pat) => {
		Err(Error { error: $error, .. })
	};
}

macro_rules! assert_pid {
	($interner:ident, $pid:ident, $expected:literal) => {
		assert_eq!($interner.lock().resolve(*$pid), Some($expected.as_bytes()))
	};
}


/// Scan the whole input with a fixed goal, stopping at eof or at the first error.
fn scan_all(input: &str, goal: Goal) -> (Vec<Result<Token, Error>>, SharedInterner) {
	let interner = pid::shared(Interner::new());
	let mut scanner = Scanner::new(input.as_bytes(), interner.clone());

	let mut tokens = Vec::new();
	loop {
		let token = scanner.scan(goal);
		let stop = matches!(token, Ok(Token { kind: TokenKind::Eof, .. }) | Err(_));
		tokens.push(token);
		if stop {
			break;
		}
	}

	(tokens, interner)
}


/// Check that TokenKind is not too big, because it gets moved around a lot.
#[test]
fn test_token_kind_size() {
	assert!(std::mem::size_of::<TokenKind>() <= 24);
}


#[test]
fn test_simple_function() {
	let input = r#"
		function foo(bar, baz) {
			// here's a comment
			if (bar >>>= baz === null) return `x${bar}y`;
		}
	"#;

	let (tokens, interner) = scan_all(input, Goal::Div);

	assert_matches!(
		&tokens[..],
		[
			token!(TokenKind::Keyword(Keyword::Function)),
			token!(TokenKind::Identifier { pid: foo, escaped: false }),
			token!(TokenKind::Punct(Punct::LParen)),
			token!(TokenKind::Identifier { pid: bar1, .. }),
			token!(TokenKind::Punct(Punct::Comma)),
			token!(TokenKind::Identifier { pid: baz1, .. }),
			token!(TokenKind::Punct(Punct::RParen)),
			token!(TokenKind::Punct(Punct::LCurly)),
			token!(TokenKind::Keyword(Keyword::If)),
			token!(TokenKind::Punct(Punct::LParen)),
			token!(TokenKind::Identifier { pid: bar2, .. }),
			token!(TokenKind::Punct(Punct::ShrAssign)),
			token!(TokenKind::Identifier { pid: baz2, .. }),
			token!(TokenKind::Punct(Punct::StrictEq)),
			token!(TokenKind::Keyword(Keyword::Null)),
			token!(TokenKind::Punct(Punct::RParen)),
			token!(TokenKind::Keyword(Keyword::Return)),
			token!(TokenKind::Template { tail: false, cooked: Some(x), .. }),
			..
		]
			=> {
				assert_pid!(interner, foo, "foo");
				assert_pid!(interner, bar1, "bar");
				assert_pid!(interner, bar2, "bar");
				assert_pid!(interner, baz1, "baz");
				assert_pid!(interner, baz2, "baz");
				assert_pid!(interner, x, "x");
				assert_eq!(bar1, bar2);
			}
	);
}


#[test]
fn test_newline_tracking() {
	let (tokens, _) = scan_all("a\nb /* \n */ c /* */ d", Goal::Div);

	let newlines: Vec<bool> = tokens
		.iter()
		.filter_map(|token| token.as_ref().ok())
		.map(|token| token.newline_before)
		.collect();

	assert_eq!(newlines, [false, true, true, false, false]);
}


#[test]
fn test_spans_are_byte_offsets() {
	let (tokens, _) = scan_all("  foo += 'é'", Goal::Div);

	let spans: Vec<Span> = tokens
		.iter()
		.filter_map(|token| token.as_ref().ok())
		.map(|token| token.span)
		.collect();

	assert_eq!(
		spans,
		[Span::new(2, 5), Span::new(6, 8), Span::new(9, 13), Span::new(13, 13)]
	);
}


#[test]
fn test_goal_selects_regex_or_division() {
	let (tokens, interner) = scan_all("/ab+[/]c/gi", Goal::RegExp);
	assert_matches!(
		&tokens[..],
		[token!(TokenKind::Regex { pattern, flags }), token!(TokenKind::Eof)] => {
			assert_pid!(interner, pattern, "ab+[/]c");
			assert_pid!(interner, flags, "gi");
		}
	);

	let (tokens, _) = scan_all("/ 2", Goal::Div);
	assert_matches!(
		&tokens[..],
		[
			token!(TokenKind::Punct(Punct::Slash)),
			token!(TokenKind::Number { .. }),
			token!(TokenKind::Eof),
		]
	);
}


#[test]
fn test_numbers() {
	let (tokens, _) = scan_all("0 1.5 .25 1e3 2.e1 0x1F 0o17 0b101 017 09 1..toString", Goal::Div);

	let values: Vec<(f64, bool)> = tokens
		.iter()
		.filter_map(
			|token| match token {
				Ok(Token { kind: TokenKind::Number { value, legacy_octal }, .. }) => {
					Some((*value, *legacy_octal))
				}
				_ => None,
			}
		)
		.collect();

	assert_eq!(
		values,
		[
			(0.0, false),
			(1.5, false),
			(0.25, false),
			(1000.0, false),
			(20.0, false),
			(31.0, false),
			(15.0, false),
			(5.0, false),
			(15.0, true),
			(9.0, true),
			(1.0, false),
		]
	);

	let (tokens, _) = scan_all("3in", Goal::Div);
	assert_matches!(&tokens[..], [error!(ErrorKind::InvalidNumber(_))]);

	let (tokens, _) = scan_all("0x", Goal::Div);
	assert_matches!(&tokens[..], [error!(ErrorKind::InvalidNumber(_))]);
}


#[test]
fn test_string_escapes() {
	let (tokens, interner) = scan_all(
		r#" "a\n\x41B\u{43}😀\
b" '\101' "#,
		Goal::Div
	);

	assert_matches!(
		&tokens[..],
		[
			token!(TokenKind::String { value: first, octal_escape: false }),
			token!(TokenKind::String { value: second, octal_escape: true }),
			token!(TokenKind::Eof),
		]
			=> {
				assert_pid!(interner, first, "a\nABC\u{1F600}b");
				assert_pid!(interner, second, "A");
			}
	);
}


#[test]
fn test_unterminated_literals() {
	let (tokens, _) = scan_all("'abc\n'", Goal::Div);
	assert_matches!(&tokens[..], [error!(ErrorKind::UnterminatedString)]);

	let (tokens, _) = scan_all("a /* b", Goal::Div);
	assert_matches!(&tokens[..], [token!(TokenKind::Identifier { .. }), error!(ErrorKind::UnterminatedComment)]);

	let (tokens, _) = scan_all("`abc", Goal::Div);
	assert_matches!(&tokens[..], [error!(ErrorKind::UnterminatedTemplate)]);

	let (tokens, _) = scan_all("/abc\n/", Goal::RegExp);
	assert_matches!(&tokens[..], [error!(ErrorKind::UnterminatedRegex)]);
}


#[test]
fn test_escaped_keyword_is_identifier() {
	let (tokens, interner) = scan_all(r"\u0069f if", Goal::Div);

	assert_matches!(
		&tokens[..],
		[
			token!(TokenKind::Identifier { pid, escaped: true }),
			token!(TokenKind::Keyword(Keyword::If)),
			token!(TokenKind::Eof),
		]
			=> assert_pid!(interner, pid, "if")
	);
}


#[test]
fn test_template_continuation() {
	let interner = pid::shared(Interner::new());
	let input = "`a${b}c${d}e`";
	let mut scanner = Scanner::new(input.as_bytes(), interner.clone());

	assert_matches!(scanner.scan(Goal::RegExp), token!(TokenKind::Template { tail: false, .. }));
	assert_matches!(scanner.scan(Goal::RegExp), token!(TokenKind::Identifier { .. }));
	assert_matches!(
		scanner.scan_template_continuation(),
		token!(TokenKind::Template { tail: false, raw, .. }) => {
			assert_eq!(interner.lock().resolve(raw), Some(b"c".as_ref()));
		}
	);
	assert_matches!(scanner.scan(Goal::RegExp), token!(TokenKind::Identifier { .. }));
	assert_matches!(scanner.scan_template_continuation(), token!(TokenKind::Template { tail: true, .. }));
	assert_matches!(scanner.scan(Goal::Div), token!(TokenKind::Eof));
}


#[test]
fn test_restore_point_rescans() {
	let interner = pid::shared(Interner::new());
	let mut scanner = Scanner::new(b"a / b / c", interner);

	scanner.scan(Goal::Div).expect("identifier");
	let point = scanner.capture();

	assert_matches!(scanner.scan(Goal::Div), token!(TokenKind::Punct(Punct::Slash)));

	scanner.seek_to(point);
	assert_matches!(scanner.scan(Goal::RegExp), token!(TokenKind::Regex { .. }));
	assert_matches!(scanner.scan(Goal::Div), token!(TokenKind::Identifier { .. }));
	assert_matches!(scanner.scan(Goal::Div), token!(TokenKind::Eof));
	assert_matches!(scanner.scan(Goal::Div), token!(TokenKind::Eof));
}


#[test]
fn test_unicode_whitespace() {
	let (tokens, _) = scan_all("a\u{00A0}b\u{2028}c", Goal::Div);

	assert_matches!(
		&tokens[..],
		[
			token!(TokenKind::Identifier { .. }),
			Ok(Token { kind: TokenKind::Identifier { .. }, newline_before: false, .. }),
			Ok(Token { kind: TokenKind::Identifier { .. }, newline_before: true, .. }),
			token!(TokenKind::Eof),
		]
	);
}


#[test]
fn test_default_pid_is_invalid() {
	let interner = Interner::new();
	assert_eq!(interner.resolve(Pid::default()), Some(b"<invalid pid>".as_ref()));
}
