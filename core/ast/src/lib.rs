//! AST node types and tree-traversal abstraction for the dbasic compiler.
//!
//! This crate owns the data model shared by every later stage: the lexer hands
//! tokens to the parser, the parser builds the tree defined here, and the
//! resolver/type-checker/codegen stages read and annotate it in place. See
//! [`nodes`] for the tagged-sum node types and [`visit`] for the shared
//! traversal traits.

pub mod nodes;
pub mod visit;

pub use nodes::*;
