use std::path::Path;

use assert_matches::assert_matches;

use super::ErrorCode;
use crate::{
	pid::{self, Interner, Pid},
	semantic::FunctionId,
	syntax::{
		self,
		ast::{FncFlags, NodeFlags, NodeId, NodeKind},
		config::{DeferPolicy, DestructuringStrategy, Options, SourceKind},
		ParseTree,
		Source,
	},
};


fn parse_with(text: &str, options: Options) -> Result<ParseTree, super::Error> {
	let source = Source::from_text(Path::new("<test>"), text);
	syntax::parse(&source, pid::shared(Interner::new()), options)
}


fn parse(text: &str) -> ParseTree {
	parse_with(text, Options::default()).expect("parse failed")
}


fn module(text: &str) -> ParseTree {
	let options = Options { kind: SourceKind::Module, ..Options::default() };
	parse_with(text, options).expect("parse failed")
}


fn error(text: &str) -> ErrorCode {
	parse_with(text, Options::default())
		.expect_err("parse succeeded")
		.code
}


fn module_error(text: &str) -> ErrorCode {
	let options = Options { kind: SourceKind::Module, ..Options::default() };
	parse_with(text, options)
		.expect_err("parse succeeded")
		.code
}


fn pid(tree: &ParseTree, name: &str) -> Pid {
	tree.interner()
		.lock()
		.get(name)
		.expect("name was not interned")
}


fn program(tree: &ParseTree) -> &[NodeId] {
	tree.ast
		.function(FunctionId::PROGRAM)
		.expect("missing program")
		.statements()
}


fn find<F>(tree: &ParseTree, predicate: F) -> Option<NodeId>
where
	F: Fn(&NodeKind) -> bool,
{
	(0 .. tree.ast.len())
		.map(|index| NodeId(index as u32))
		.find(|&id| predicate(tree.ast.kind(id)))
}


fn flags(tree: &ParseTree, function: u32) -> FncFlags {
	tree.ast
		.function(FunctionId(function))
		.expect("missing function")
		.flags
}


// Automatic semicolon insertion:

#[test]
fn test_arrow_formals() {
	let tree = parse("(a) => a + 1;");

	let arrow = tree.ast
		.functions()
		.find(|function| function.flags.contains(FncFlags::LAMBDA))
		.expect("missing arrow");

	assert_eq!(arrow.params.len(), 1);
	assert_matches!(
		tree.ast.kind(arrow.params[0]),
		NodeKind::Binding { pid: name, .. } if *name == pid(&tree, "a")
	);
}


#[test]
fn test_asi_flags() {
	let tree = parse("a = 1\nb = 2;");
	let statements = program(&tree);

	assert_eq!(statements.len(), 2);
	assert!(tree.ast.node(statements[0]).flags.contains(NodeFlags::AUTOMATIC_SEMICOLON));
	assert!(tree.ast.node(statements[1]).flags.contains(NodeFlags::EXPLICIT_SEMICOLON));
}


#[test]
fn test_asi_before_closing_brace() {
	let tree = parse("function f() { return 1 }");
	let body = tree.ast.function(FunctionId(1)).expect("missing function").statements();

	assert_eq!(body.len(), 1);
	assert_matches!(tree.ast.kind(body[0]), NodeKind::Return(Some(_)));
	assert!(tree.ast.node(body[0]).flags.contains(NodeFlags::AUTOMATIC_SEMICOLON));
}


#[test]
fn test_restricted_return() {
	let tree = parse("function f() { return\n1 }");
	let body = tree.ast.function(FunctionId(1)).expect("missing function").statements();

	assert_eq!(body.len(), 2);
	assert_matches!(tree.ast.kind(body[0]), NodeKind::Return(None));
	assert_matches!(tree.ast.kind(body[1]), NodeKind::Expr(_));
}


#[test]
fn test_restricted_postfix() {
	let tree = parse("a\n++b");
	let statements = program(&tree);

	assert_eq!(statements.len(), 2);
	let update = match tree.ast.kind(statements[1]) {
		NodeKind::Expr(update) => *update,
		kind => panic!("expected an expression statement, found {:?}", kind),
	};
	assert_matches!(tree.ast.kind(update), NodeKind::Update { prefix: true, .. });
}


#[test]
fn test_missing_semicolon() {
	assert_eq!(error("a b"), ErrorCode::ExpectedSemicolon);
	assert_eq!(error("throw\nerror;"), ErrorCode::ThrowNewline);
}


#[test]
fn test_arrow_after_newline() {
	assert!(parse_with("(a)\n=> a", Options::default()).is_err());
}


// Jumps and labels:

#[test]
fn test_labels() {
	parse("outer: for (;;) { inner: while (1) { continue outer; break inner; } }");
	parse("block: { break block; }");

	assert_eq!(error("a: a: ;"), ErrorCode::LabelRedefined);
	assert_eq!(error("while (1) break missing;"), ErrorCode::LabelNotFound);
}


#[test]
fn test_jumps_outside_targets() {
	assert_eq!(error("break;"), ErrorCode::BadBreak);
	assert_eq!(error("continue;"), ErrorCode::BadContinue);
	assert_eq!(error("return;"), ErrorCode::BadReturn);
	assert_eq!(error("function f() { while (1) {} continue; }"), ErrorCode::BadContinue);
}


#[test]
fn test_duplicate_default() {
	assert_eq!(error("switch (a) { default: break; default: }"), ErrorCode::DuplicateDefault);
}


// Strict mode:

#[test]
fn test_use_strict_marks_function() {
	let tree = parse("function f() { 'use strict'; return 1; }\nfunction g() {}");

	assert!(flags(&tree, 1).contains(FncFlags::STRICT));
	assert!(!flags(&tree, 2).contains(FncFlags::STRICT));
	assert!(!flags(&tree, 0).contains(FncFlags::STRICT));
}


#[test]
fn test_use_strict_revalidates_formals() {
	parse("function f(a, a) {}");

	assert_eq!(error("function f(a, a) { 'use strict'; }"), ErrorCode::DuplicateFormalStrict);
	assert_eq!(error("function f(eval) { 'use strict'; }"), ErrorCode::EvalStrict);
	assert_eq!(error("function arguments() { 'use strict'; }"), ErrorCode::ArgumentsStrict);
	assert_eq!(error("function f(a = 1) { 'use strict'; }"), ErrorCode::IllegalUseStrict);
}


#[test]
fn test_octal_before_use_strict() {
	parse("function f() { '\\101'; }");

	assert_eq!(error("function f() { '\\101'; 'use strict'; }"), ErrorCode::OctalStrict);
	assert_eq!(error("'use strict'; var a = 01;"), ErrorCode::OctalStrict);
}


#[test]
fn test_strict_statements() {
	assert_eq!(error("'use strict'; with (a) {}"), ErrorCode::WithStrict);
	assert_eq!(error("'use strict'; if (a) function f() {}"), ErrorCode::BlockFunctionStrict);
	assert_eq!(error("'use strict'; var interface;"), ErrorCode::StrictReserved);
}


// Dynamic scopes:

#[test]
fn test_with_and_eval_propagate() {
	let tree = parse("function f() { eval('x'); }\nfunction g() { with (o) {} }");

	assert!(flags(&tree, 1).contains(FncFlags::CALLS_EVAL));
	assert!(flags(&tree, 2).contains(FncFlags::HAS_WITH));

	let program = flags(&tree, 0);
	assert!(program.contains(FncFlags::CHILD_CALLS_EVAL));
	assert!(program.contains(FncFlags::HAS_WITH));
	assert!(!program.contains(FncFlags::CALLS_EVAL));

	let call = find(&tree, |kind| matches!(kind, NodeKind::Call { .. })).expect("missing call");
	assert!(tree.ast.node(call).flags.contains(NodeFlags::DIRECT_EVAL));
}


#[test]
fn test_arguments_and_formal_writes() {
	let tree = parse(
		"function f(a) { a = 1; return arguments; }\n\
		 function g() { 'use strict'; return arguments; }\n\
		 function h() { return () => arguments; }"
	);

	let f = flags(&tree, 1);
	assert!(f.contains(FncFlags::HAS_ANY_WRITE_TO_FORMALS));
	assert!(f.contains(FncFlags::HAS_HEAP_ARGUMENTS));

	let g = flags(&tree, 2);
	assert!(g.contains(FncFlags::USES_ARGUMENTS));
	assert!(!g.contains(FncFlags::HAS_HEAP_ARGUMENTS));
	assert!(!g.contains(FncFlags::HAS_ANY_WRITE_TO_FORMALS));

	// The arrow shares the arguments of `h`, which escape with it.
	assert!(flags(&tree, 3).contains(FncFlags::HAS_HEAP_ARGUMENTS));
	assert!(!flags(&tree, 4).contains(FncFlags::HAS_HEAP_ARGUMENTS));
}


// Declarations:

#[test]
fn test_redeclaration() {
	parse("var a; var a;");

	assert_matches!(error("let a; let a;"), ErrorCode::Redeclaration { .. });
	assert_matches!(error("let a; var a;"), ErrorCode::Redeclaration { .. });
	assert_eq!(error("const a;"), ErrorCode::ConstWithoutInit);
	assert_eq!(error("let let = 1;"), ErrorCode::LetAsLexicalName);
}


#[test]
fn test_for_heads() {
	parse("for (var i = 0; i < 10; i++) {}");
	parse("for (let [a, b] of pairs) {}");
	parse("for ({ a, b } of pairs) {}");
	parse("for (const key in object) {}");

	assert_eq!(error("for (let a = 1 of b) {}"), ErrorCode::InvalidForInit);
	assert_eq!(error("for (let a, b of c) {}"), ErrorCode::InvalidForInit);
}


#[test]
fn test_assignment_targets() {
	parse("[a, { b, c: [d = 1] }, ...e] = f;");
	parse("({ a = 1, b: { c } } = d);");

	assert_eq!(error("1 = a;"), ErrorCode::InvalidAssignmentTarget);
	assert_eq!(error("({ a = 1 });"), ErrorCode::InvalidCoverInitializer);
}


// Classes:

#[test]
fn test_generated_constructor() {
	let tree = parse("class A {}\nclass B extends A {}");

	let constructors: Vec<FunctionId> = (0 .. tree.ast.len())
		.filter_map(|index| match tree.ast.kind(NodeId(index as u32)) {
			NodeKind::Class { constructor, .. } => Some(*constructor),
			_ => None,
		})
		.collect();
	assert_eq!(constructors.len(), 2);

	let base = tree.ast.function(constructors[0]).expect("missing constructor").flags;
	assert!(base.contains(FncFlags::GENERATED_DEFAULT | FncFlags::CLASS_CONSTRUCTOR));
	assert!(base.contains(FncFlags::BASE_CLASS_CONSTRUCTOR));

	let derived = tree.ast.function(constructors[1]).expect("missing constructor").flags;
	assert!(derived.contains(FncFlags::GENERATED_DEFAULT | FncFlags::HAS_DIRECT_SUPER));
	assert!(!derived.contains(FncFlags::BASE_CLASS_CONSTRUCTOR));
}


#[test]
fn test_class_errors() {
	parse("class A extends B { constructor() { super(); } static m() { return super.m(); } }");

	assert_eq!(error("class A { constructor() {} constructor() {} }"), ErrorCode::DuplicateConstructor);
	assert_eq!(error("class A { constructor() { super(); } }"), ErrorCode::BadSuper);
	assert_eq!(error("function f() { super.x; }"), ErrorCode::BadSuper);
	assert_eq!(error("new.target;"), ErrorCode::BadNewTarget);
}


// Modules:

#[test]
fn test_module_record() {
	let tree = module(
		"import x, { y as z } from 'm';\n\
		 export { z as w };\n\
		 export * from 'n';\n\
		 export default function () {}\n"
	);

	let record = tree.module.as_ref().expect("missing module record");

	assert_eq!(record.imports.len(), 2);
	assert_eq!(record.imports[0].local_name, pid(&tree, "x"));
	assert_eq!(record.imports[0].import_name, Some(pid(&tree, "default")));
	assert_eq!(record.imports[1].import_name, Some(pid(&tree, "y")));
	assert_eq!(record.imports[1].local_name, pid(&tree, "z"));

	assert!(record.exports(pid(&tree, "w")));
	assert!(record.exports(pid(&tree, "default")));
	assert_eq!(record.star_exports.len(), 1);
	assert_eq!(record.requested_modules, vec![pid(&tree, "m"), pid(&tree, "n")]);

	assert!(flags(&tree, 0).contains(FncFlags::MODULE | FncFlags::STRICT));
}


#[test]
fn test_module_errors() {
	assert_matches!(module_error("export var a; export { a };"), ErrorCode::DuplicateExport { .. });
	assert_eq!(module_error("export { missing } from;"), ErrorCode::ExpectedString);
	assert_eq!(module_error("with (a) {}"), ErrorCode::WithStrict);

	assert_eq!(error("import x from 'm';"), ErrorCode::ModuleItemOutsideModule);
	assert_eq!(error("export var a;"), ErrorCode::ModuleItemOutsideModule);
}


// Equivalences:

const DESTRUCTURING: &str = "
	var a, b, c, d, e;
	[a, { b, c: [d = 1] }, ...e] = [1, { b: 2, c: [] }, 3];
	({ a, b: { c = 4 } } = { b: {} });
	for ([a, b] of [[1, 2]]) {}
";


#[test]
fn test_destructuring_strategies_agree() {
	let convert = parse_with(
		DESTRUCTURING,
		Options { destructuring: DestructuringStrategy::Convert, ..Options::default() },
	)
	.expect("convert failed");

	let reparse = parse_with(
		DESTRUCTURING,
		Options { destructuring: DestructuringStrategy::Reparse, ..Options::default() },
	)
	.expect("reparse failed");

	assert_eq!(convert.dump(), reparse.dump());
}


const NESTED: &str = "
	var x = 1;
	function outer(a, b) {
		var y = a + x;
		function inner(c) {
			let z = c * y;
			return function () { return z + later; };
		}
		if (b) { let shadow = inner; return shadow(1); }
		return inner;
	}
	var later = outer(1, 2);
";


#[test]
fn test_deferred_parse_matches_eager() {
	let eager = parse(NESTED);

	let options = Options {
		defer: DeferPolicy { threshold: Some(0) },
		..Options::default()
	};
	let mut deferred = parse_with(NESTED, options).expect("deferred parse failed");

	assert!(deferred.is_deferred(FunctionId(1)));
	assert!(!deferred.stubs().is_empty());

	deferred.undefer(FunctionId(1)).expect("undefer failed");
	assert!(!deferred.is_deferred(FunctionId(1)));
	assert!(deferred.is_deferred(FunctionId(2)));

	deferred.undefer_all().expect("undefer failed");
	assert!(deferred.stubs().is_empty());

	assert_eq!(eager.dump(), deferred.dump());
	assert_eq!(eager.dump_scopes(), deferred.dump_scopes());
	assert_eq!(eager.ast.function_slots(), deferred.ast.function_slots());

	for function in eager.ast.functions() {
		let other = deferred.ast.function(function.id).expect("missing function");
		assert_eq!(function.flags, other.flags, "flags of function {}", function.id);
		assert_eq!(function.nested_count, other.nested_count, "nested count of function {}", function.id);
	}
}


fn undeferred(text: &str) -> ParseTree {
	let options = Options {
		defer: DeferPolicy { threshold: Some(0) },
		..Options::default()
	};
	let mut tree = parse_with(text, options).expect("deferred parse failed");
	tree.undefer_all().expect("undefer failed");
	tree
}


#[test]
fn test_deferred_scopes_match_eager() {
	let closure = "function outer(a) { var v = a; function inner() { return v + a; } return inner; }";
	let scopes = undeferred(closure).dump_scopes();
	assert_eq!(parse(closure).dump_scopes(), scopes);
	assert!(!scopes.contains("global"), "stale records in:\n{}", scopes);

	// The innermost function stays deferred while `outer` is parsed again, its
	// assignments must still reach `count`.
	let assigned = "
		function outer() {
			var count;
			function inner() {
				return function () { if (ok) { count = 1; } else { count = 2; } };
			}
			return inner;
		}
	";
	let scopes = undeferred(assigned).dump_scopes();
	assert_eq!(parse(assigned).dump_scopes(), scopes);
	assert!(scopes.contains("count reassigned"), "{}", scopes);
}


#[test]
fn test_deferred_errors_surface() {
	let options = Options {
		defer: DeferPolicy { threshold: Some(0) },
		..Options::default()
	};

	let error = parse_with("function f() { var; }", options).expect_err("parse succeeded");
	assert_eq!(error.code, ErrorCode::ExpectedIdentifier);
}


#[test]
fn test_profile_parses_executed_eagerly() {
	let options = Options {
		defer: DeferPolicy { threshold: Some(0) },
		profile: Some(vec![FunctionId(2)].into_iter().collect()),
		..Options::default()
	};

	let tree = parse_with("function f() {}\nfunction g() {}", options).expect("parse failed");

	assert!(tree.is_deferred(FunctionId(1)));
	assert!(!tree.is_deferred(FunctionId(2)));
}


#[test]
fn test_scope_dump_lists_declarations() {
	let scopes = parse(NESTED).dump_scopes();

	for name in &["outer", "inner", "shadow", "later", "z"] {
		assert!(scopes.contains(name), "{} missing from:\n{}", name, scopes);
	}
}
