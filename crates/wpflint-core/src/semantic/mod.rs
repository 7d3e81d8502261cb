//! Semantic analysis module
//!
//! Builds a [`Compilation`] (symbols for every source and reference declaration, bound
//! types, import scopes) and answers per-file queries through [`SemanticModel`].

mod binder;
mod compilation;
mod model;
mod reference;
pub mod scope;
pub mod symbols;

pub use binder::{BindContext, Binder};
pub use compilation::{Compilation, CompilationBuilder, Declaration};
pub use model::{body_expressions, ConstantValue, Lookup, SemanticModel};
pub use scope::{ImportScope, NamespaceOrType, ScopeId, ScopeTree};
pub use symbols::{
    Accessibility, FileId, Symbol, SymbolFlags, SymbolId, SymbolKind, SymbolTable, TypeRef,
};
