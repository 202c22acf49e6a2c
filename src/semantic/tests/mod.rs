use assert_matches::assert_matches;

use super::*;
use crate::{
	pid::{Interner, Pid},
	syntax::Span,
};


fn span(start: u32) -> Span {
	Span::new(start, start + 1)
}


struct Fixture {
	interner: Interner,
	binder: Binder,
}


impl Fixture {
	fn new() -> Self {
		let mut binder = Binder::new();
		binder.start_parse_block(ScopeKind::Global, FunctionId::PROGRAM);
		Self { interner: Interner::new(), binder }
	}


	fn pid(&mut self, name: &str) -> Pid {
		self.interner.get_or_intern(name)
	}


	fn declare(&mut self, name: &str, kind: SymbolKind, at: u32) -> Result<SymbolId, Error> {
		let pid = self.pid(name);
		self.binder.add_decl_for_pid(pid, kind, span(at), false)
	}


	fn reference(&mut self, name: &str, function: FunctionId, flags: RefFlags) -> RefId {
		let pid = self.pid(name);
		self.binder.push_pid_ref(pid, function, flags)
	}


	fn finish(mut self) -> ScopeTable {
		let global = self.binder.active()[0];
		self.binder.finish_parse_block(global);
		self.binder.into_table()
	}
}


#[test]
fn test_shadowing_let_in_block() {
	// var x = 1; { let x = 2; }
	let mut fixture = Fixture::new();

	let outer = fixture.declare("x", SymbolKind::Variable, 4).expect("var declaration");
	let outer_ref = fixture.reference("x", FunctionId::PROGRAM, RefFlags::ASSIGNMENT);

	let block = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	let inner = fixture.declare("x", SymbolKind::Let, 17).expect("let declaration");
	let inner_ref = fixture.reference("x", FunctionId::PROGRAM, RefFlags::ASSIGNMENT);
	fixture.binder.finish_parse_block(block);

	let table = fixture.finish();

	assert_ne!(outer, inner);
	assert_ne!(table.symbol(outer).scope, table.symbol(inner).scope);
	assert_eq!(table.resolved(outer_ref), Some(outer));
	assert_eq!(table.resolved(inner_ref), Some(inner));
	assert_eq!(table.symbol(inner).assignment, AssignmentState::AssignedOnce);
}


#[test]
fn test_let_redeclaration() {
	// let x; let x;
	let mut fixture = Fixture::new();

	fixture.declare("x", SymbolKind::Let, 4).expect("first declaration");
	let error = fixture.declare("x", SymbolKind::Let, 11);

	assert_matches!(
		error,
		Err(Error { kind: ErrorKind::Redeclaration { previous, .. }, span })
			if previous == Span::new(4, 5) && span == Span::new(11, 12)
	);
}


#[test]
fn test_var_let_conflicts() {
	let mut fixture = Fixture::new();
	fixture.declare("a", SymbolKind::Let, 0).expect("let");
	assert_matches!(fixture.declare("a", SymbolKind::Variable, 1), Err(_));

	fixture.declare("b", SymbolKind::Variable, 2).expect("var");
	assert_matches!(fixture.declare("b", SymbolKind::Const, 3), Err(_));

	// { let c; { var c; } }
	let block = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	fixture.declare("c", SymbolKind::Let, 4).expect("let");
	let nested = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	assert_matches!(fixture.declare("c", SymbolKind::Variable, 5), Err(_));
	fixture.binder.finish_parse_block(nested);
	fixture.binder.finish_parse_block(block);
}


#[test]
fn test_var_redeclaration_merges() {
	let mut fixture = Fixture::new();

	let first = fixture.declare("x", SymbolKind::Variable, 0).expect("var");
	let second = fixture.declare("x", SymbolKind::Variable, 1).expect("var");
	assert_eq!(first, second);

	let function = fixture.declare("x", SymbolKind::Function, 2).expect("function");
	assert_eq!(first, function);

	let third = fixture.declare("x", SymbolKind::Variable, 3).expect("var");
	assert_eq!(first, third);

	let table = fixture.finish();
	assert_eq!(table.symbol(first).kind, SymbolKind::Function);
}


#[test]
fn test_formal_wins_over_var() {
	// function f(a) { var a; }
	let mut fixture = Fixture::new();
	let function = FunctionId(1);

	let params = fixture.binder.start_parse_block(ScopeKind::Parameter, function);
	let formal = fixture.declare("a", SymbolKind::Formal, 11).expect("formal");
	let body = fixture.binder.start_parse_block(ScopeKind::FunctionBody, function);
	let var = fixture.declare("a", SymbolKind::Variable, 20).expect("var");
	fixture.reference("a", function, RefFlags::ASSIGNMENT);
	fixture.binder.finish_parse_block(body);
	fixture.binder.finish_parse_block(params);

	assert_eq!(formal, var);
	assert_eq!(fixture.binder.symbol(formal).kind, SymbolKind::Formal);
	assert!(fixture.binder.scope(params).writes_to_formals);
}


#[test]
fn test_lexical_conflicts_with_formal() {
	// function f(a) { let a; }
	let mut fixture = Fixture::new();
	let function = FunctionId(1);

	fixture.binder.start_parse_block(ScopeKind::Parameter, function);
	fixture.declare("a", SymbolKind::Formal, 11).expect("formal");
	fixture.binder.start_parse_block(ScopeKind::FunctionBody, function);
	assert_matches!(fixture.declare("a", SymbolKind::Let, 20), Err(_));
}


#[test]
fn test_catch_parameter_redeclaration() {
	// try {} catch (e) { var e; let f; }
	let mut fixture = Fixture::new();

	let catch = fixture.binder.start_parse_block(ScopeKind::Catch, FunctionId::PROGRAM);
	fixture.declare("e", SymbolKind::CatchParam { pattern: false }, 14).expect("param");
	let block = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	fixture.declare("e", SymbolKind::Variable, 23).expect("var over simple catch param");
	assert_matches!(fixture.declare("e", SymbolKind::Let, 30), Err(_));
	fixture.binder.finish_parse_block(block);
	fixture.binder.finish_parse_block(catch);

	// try {} catch ([e]) { var e; }
	let catch = fixture.binder.start_parse_block(ScopeKind::Catch, FunctionId::PROGRAM);
	fixture.declare("e", SymbolKind::CatchParam { pattern: true }, 40).expect("param");
	let block = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	assert_matches!(fixture.declare("e", SymbolKind::Variable, 50), Err(_));
	fixture.binder.finish_parse_block(block);
	fixture.binder.finish_parse_block(catch);
}


#[test]
fn test_sloppy_block_function() {
	// { function f() {} } f();
	let mut fixture = Fixture::new();

	let block = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	let lexical = fixture.declare("f", SymbolKind::Function, 11).expect("block function");
	fixture.binder.finish_parse_block(block);
	let call = fixture.reference("f", FunctionId::PROGRAM, RefFlags::empty());

	let table = fixture.finish();
	let shadow = table.resolved(call).expect("annex b var");

	assert_ne!(shadow, lexical);
	assert!(table.symbol(shadow).function_shadow);
	assert_eq!(table.scope(table.symbol(shadow).scope).kind, ScopeKind::Global);
}


#[test]
fn test_forward_reference() {
	// f(); function f() {}
	let mut fixture = Fixture::new();

	let call = fixture.reference("f", FunctionId::PROGRAM, RefFlags::empty());
	let function = fixture.declare("f", SymbolKind::Function, 14).expect("function");

	let table = fixture.finish();
	assert_eq!(table.resolved(call), Some(function));
}


#[test]
fn test_every_reference_bound() {
	// var a; { a; { a; b; } } function g() { a; }
	let mut fixture = Fixture::new();
	let a = fixture.declare("a", SymbolKind::Variable, 4).expect("var");

	let outer = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	let first = fixture.reference("a", FunctionId::PROGRAM, RefFlags::empty());
	let inner = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	let second = fixture.reference("a", FunctionId::PROGRAM, RefFlags::empty());
	let global = fixture.reference("b", FunctionId::PROGRAM, RefFlags::empty());
	fixture.binder.finish_parse_block(inner);
	fixture.binder.finish_parse_block(outer);

	let function = FunctionId(1);
	let params = fixture.binder.start_parse_block(ScopeKind::Parameter, function);
	let body = fixture.binder.start_parse_block(ScopeKind::FunctionBody, function);
	let third = fixture.reference("a", function, RefFlags::empty());
	fixture.binder.finish_parse_block(body);
	fixture.binder.finish_parse_block(params);

	let table = fixture.finish();

	for reference in [first, second, third].iter() {
		assert_eq!(table.resolved(*reference), Some(a));
	}
	assert_eq!(table.resolved(global), None);

	// Global symbols are never frame allocated.
	assert!(!table.symbol(a).has_non_local_reference);
}


#[test]
fn test_non_local_reference() {
	// function f() { var x; function g() { x = 1; } }
	let mut fixture = Fixture::new();
	let f = FunctionId(1);
	let g = FunctionId(2);

	let f_params = fixture.binder.start_parse_block(ScopeKind::Parameter, f);
	let f_body = fixture.binder.start_parse_block(ScopeKind::FunctionBody, f);
	let x = fixture.declare("x", SymbolKind::Variable, 19).expect("var");

	let g_params = fixture.binder.start_parse_block(ScopeKind::Parameter, g);
	let g_body = fixture.binder.start_parse_block(ScopeKind::FunctionBody, g);
	fixture.reference("x", g, RefFlags::ASSIGNMENT);
	fixture.binder.finish_parse_block(g_body);
	fixture.binder.finish_parse_block(g_params);

	fixture.binder.finish_parse_block(f_body);
	fixture.binder.finish_parse_block(f_params);

	let symbol = fixture.binder.symbol(x);
	assert!(symbol.has_non_local_reference);
	assert_eq!(symbol.assignment, AssignmentState::AssignedOnce);
}


#[test]
fn test_with_marks_dynamic() {
	// var x; with (o) { x; }
	let mut fixture = Fixture::new();
	let x = fixture.declare("x", SymbolKind::Variable, 4).expect("var");
	let outside = fixture.reference("x", FunctionId::PROGRAM, RefFlags::empty());

	let with = fixture.binder.push_dynamic_block(FunctionId::PROGRAM);
	let inside = fixture.reference("x", FunctionId::PROGRAM, RefFlags::empty());
	fixture.binder.finish_parse_block(with);

	assert!(fixture.binder.reference(inside).flags.contains(RefFlags::DYNAMIC));
	assert!(!fixture.binder.reference(outside).flags.contains(RefFlags::DYNAMIC));

	let table = fixture.finish();
	assert_eq!(table.resolved(inside), Some(x));
	assert!(table.symbol(x).needs_scope_object);
}


#[test]
fn test_eval_needs_scope_object() {
	let mut fixture = Fixture::new();
	let function = FunctionId(1);

	let params = fixture.binder.start_parse_block(ScopeKind::Parameter, function);
	let body = fixture.binder.start_parse_block(ScopeKind::FunctionBody, function);
	let y = fixture.declare("y", SymbolKind::Let, 10).expect("let");
	fixture.binder.set_calls_eval();
	fixture.binder.finish_parse_block(body);
	fixture.binder.finish_parse_block(params);

	assert!(fixture.binder.symbol(y).needs_scope_object);
}


#[test]
#[should_panic]
fn test_finish_twice() {
	let mut fixture = Fixture::new();
	let block = fixture.binder.start_parse_block(ScopeKind::Block, FunctionId::PROGRAM);
	fixture.binder.finish_parse_block(block);
	fixture.binder.finish_parse_block(block);
}


#[test]
fn test_rollback() {
	let mut fixture = Fixture::new();
	let x = fixture.declare("x", SymbolKind::Variable, 0).expect("var");
	let before = fixture.reference("x", FunctionId::PROGRAM, RefFlags::empty());
	let next_block_id = fixture.binder.next_block_id();
	let scopes = fixture.binder.table().scope_count();

	let mark = fixture.binder.mark();
	fixture.reference("x", FunctionId::PROGRAM, RefFlags::ASSIGNMENT);
	fixture.reference("y", FunctionId::PROGRAM, RefFlags::empty());
	let params = fixture.binder.start_parse_block(ScopeKind::Parameter, FunctionId(1));
	fixture.declare("x", SymbolKind::Formal, 1).expect("formal");
	fixture.reference("x", FunctionId(1), RefFlags::empty());
	fixture.binder.finish_parse_block(params);
	fixture.binder.rollback(mark);

	assert_eq!(fixture.binder.next_block_id(), next_block_id);
	assert_eq!(fixture.binder.table().scope_count(), scopes);
	assert_eq!(fixture.binder.table().ref_count(), 1);
	assert!(fixture.binder.reference(before).flags.is_empty());

	let table = fixture.finish();
	assert_eq!(table.resolved(before), Some(x));
	assert_eq!(table.symbol(x).assignment, AssignmentState::NotAssigned);
}


#[test]
fn test_commit_keeps_changes() {
	let mut fixture = Fixture::new();

	let mark = fixture.binder.mark();
	let reference = fixture.reference("z", FunctionId::PROGRAM, RefFlags::ASSIGNMENT);
	fixture.binder.commit(mark);

	let z = fixture.declare("z", SymbolKind::Let, 10).expect("let");

	let table = fixture.finish();
	assert_eq!(table.resolved(reference), Some(z));
	assert_eq!(table.symbol(z).assignment, AssignmentState::AssignedOnce);
}
