/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the expression tree and its types
///
/// Submodules:
/// - ast: The expression sum type and its accessors
/// - expressions: Node structures for each expression kind
/// - types: The structural type model with assignability and merge
/// - visitor: Single-pass traversal shared by all checkers
pub mod ast;
pub mod expressions;
pub mod types;
pub mod visitor;
