use std::{path::Path, sync::Arc};

use serial_test::serial;

use super::{Coordinator, Item};
use crate::{
	pid::{self, Interner, Pid},
	semantic::{FunctionId, ScopeId, ScopeKind, SymbolId},
	syntax::{
		self,
		ast::{FncBody, FncFlags, NodeId, NodeKind},
		config::{BackgroundMode, Options, SourceKind},
		lexer::RestorePoint,
		ParseTree,
		Source,
		SourcePos,
	},
};


fn parse_as(text: &str, kind: SourceKind, background: BackgroundMode) -> Result<ParseTree, syntax::Error> {
	let source = Source::from_text(Path::new("<test>"), text);
	let options = Options {
		kind,
		background,
		background_min_len: 0,
		..Options::default()
	};

	syntax::parse(&source, pid::shared(Interner::new()), options)
}


fn parse(text: &str, background: BackgroundMode) -> Result<ParseTree, syntax::Error> {
	parse_as(text, SourceKind::Script, background)
}


fn pid(tree: &ParseTree, name: &str) -> Pid {
	tree.interner()
		.lock()
		.get(name)
		.expect("name was not interned")
}


/// What identifies a function regardless of the order ids were handed out in.
fn shapes(tree: &ParseTree) -> Vec<(Option<String>, u32, u32, usize, usize)> {
	let interner = tree.interner().lock();

	let mut shapes: Vec<_> = tree.ast
		.functions()
		.map(|function| {
			assert!(!matches!(function.body, FncBody::Pending(_)), "function {} was not merged", function.id);

			(
				function.name.map(|name| interner.spelling(name)),
				function.flags.bits(),
				function.nested_count,
				function.params.len(),
				function.statements().len(),
			)
		})
		.collect();

	shapes.sort();
	shapes
}


/// The symbol the reference of every `Name` node with the given spelling resolves to.
fn resolutions(tree: &ParseTree, name: &str) -> Vec<Option<SymbolId>> {
	let name = pid(tree, name);

	(0 .. tree.ast.len())
		.filter_map(|index| match tree.ast.kind(NodeId(index as u32)) {
			NodeKind::Name { pid, reference } if *pid == name => {
				Some(reference.and_then(|reference| tree.scopes.resolved(reference)))
			}
			_ => None,
		})
		.collect()
}


fn declaration(tree: &ParseTree, name: &str) -> SymbolId {
	let name = pid(tree, name);

	(0 .. tree.ast.len())
		.find_map(|index| match tree.ast.kind(NodeId(index as u32)) {
			NodeKind::Binding { pid, symbol } if *pid == name => Some(*symbol),
			_ => None,
		})
		.expect("missing declaration")
}


const PROGRAM: &str = "
function first(a) {
	return second(a) + later;
}

var f = function (b) {
	var inner = function () { return b; };
	return inner();
};

function second(c) {
	if (c > 1) { let d = c / 2; return d; }
	return c * 2;
}

var later = first(1);
";


#[test]
#[serial]
fn test_threads_match_eager() {
	let eager = parse(PROGRAM, BackgroundMode::Disabled).expect("eager parse failed");
	let threaded = parse(PROGRAM, BackgroundMode::Threads(2)).expect("threaded parse failed");

	assert_eq!(eager.ast.function_slots(), threaded.ast.function_slots());
	assert_eq!(shapes(&eager), shapes(&threaded));
}


#[test]
fn test_inline_matches_eager() {
	let eager = parse(PROGRAM, BackgroundMode::Disabled).expect("eager parse failed");
	let inline = parse(PROGRAM, BackgroundMode::Inline).expect("inline parse failed");

	assert_eq!(shapes(&eager), shapes(&inline));
}


#[test]
#[serial]
fn test_later_declaration_resolves_after_merge() {
	let tree = parse(PROGRAM, BackgroundMode::Threads(2)).expect("threaded parse failed");

	let later = declaration(&tree, "later");
	let global = tree.scopes.symbol(later).scope;
	assert_eq!(tree.scopes.scope(global).kind, ScopeKind::Global);

	assert_eq!(resolutions(&tree, "later"), vec![Some(later)]);

	let second = pid(&tree, "second");
	let second = tree.ast
		.functions()
		.find(|function| function.name == Some(second))
		.and_then(|function| function.name_symbol)
		.expect("missing function declaration");
	assert_eq!(resolutions(&tree, "second"), vec![Some(second)]);

	// Parameters stay bound within the fragment.
	let b = declaration(&tree, "b");
	assert_eq!(resolutions(&tree, "b"), vec![Some(b)]);
}


#[test]
#[serial]
fn test_background_error_fails_parse() {
	let error = parse("function a() { return 1; }\nfunction b() { var; }\n", BackgroundMode::Threads(2))
		.expect_err("parse succeeded");

	assert_eq!(error.code, syntax::ErrorCode::ExpectedIdentifier);
}


#[test]
#[serial]
fn test_main_error_comes_first() {
	let text = "function a() { var; }\n)";
	let error = parse(text, BackgroundMode::Threads(2)).expect_err("parse succeeded");

	assert_eq!(error.span.ich_min as usize, text.len() - 1);
}


#[test]
fn test_anonymous_default_export() {
	let text = "export default function () { return 1; }";

	let eager = parse_as(text, SourceKind::Module, BackgroundMode::Disabled).expect("eager parse failed");
	let inline = parse_as(text, SourceKind::Module, BackgroundMode::Inline).expect("inline parse failed");

	assert_eq!(shapes(&eager), shapes(&inline));
	assert!(
		inline.ast
			.functions()
			.any(|function| function.flags.contains(FncFlags::DEFAULT_MODULE_EXPORT))
	);
}


#[test]
fn test_templates_in_background_functions() {
	let texts = [
		"function f(x) { return `${ x }`; }",
		"function g() { return `${ {a:1}.a }`; }",
		"function h(x) { return `a${ x }b${ `c${ x }` }d`; }",
	];

	for text in texts.iter() {
		let eager = parse(text, BackgroundMode::Disabled).expect("eager parse failed");
		let inline = parse(text, BackgroundMode::Inline).expect("inline parse failed");

		assert_eq!(shapes(&eager), shapes(&inline), "{}", text);
	}
}


#[test]
fn test_lost_item_parsed_inline() {
	let text: Arc<[u8]> = Arc::from(&b"function f(a) { return a; }"[..]);
	let mut coordinator = Coordinator::new(
		BackgroundMode::Inline,
		text,
		pid::shared(Interner::new()),
		Options::default(),
	);

	coordinator.submit(Item {
		index: 0,
		start: RestorePoint { offset: 0, pos: SourcePos::default() },
		declaration: true,
		flags: FncFlags::empty(),
		strict: false,
		function: FunctionId(1),
		scope: ScopeId(0),
	});

	// No outcome is ever reported for the item, as after a worker panic.
	coordinator.pending.clear();

	let fragments = coordinator.wait_all().expect("background parse failed");
	assert_eq!(fragments.len(), 1);
	assert_eq!(fragments[0].0.function, FunctionId(1));
	assert_eq!(fragments[0].1.function_count, 1);
}
