/// Whether a grammar walk builds the tree. The same generic grammar functions run in both
/// modes: syntax only mode validates the input and maintains the binding state (scopes,
/// reference stacks, block and function numbering), but allocates no nodes.
pub trait BuildMode {
	const BUILD_AST: bool;
}


/// Build the tree.
#[derive(Debug)]
pub enum AstMode {}


impl BuildMode for AstMode {
	const BUILD_AST: bool = true;
}


/// Only check the syntax, used for deferred function bodies and fast scan reparses.
#[derive(Debug)]
pub enum SyntaxMode {}


impl BuildMode for SyntaxMode {
	const BUILD_AST: bool = false;
}
