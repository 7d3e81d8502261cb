//! Static analysis of WPF dependency property declarations in C# sources.

pub mod analysis;
pub mod cancellation;
pub mod catalog;
pub mod config;
pub mod dependency_property;
pub mod diagnostic;
pub mod disable_comments;
pub mod parser;
pub mod rules;
pub mod semantic;
pub mod syntax;
pub mod visitor;

pub use analysis::AnalysisEngine;
pub use cancellation::CancellationToken;
pub use diagnostic::{Diagnostic, Fix, TextEdit};
pub use parser::ParsedFile;
