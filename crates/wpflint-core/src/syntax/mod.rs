//! C# syntax model and its construction from the tree-sitter grammar.

pub mod ast;
pub(crate) mod lower;

pub use ast::*;
