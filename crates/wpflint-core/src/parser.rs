//! Parser module for C# source code
//!
//! Integrates with tree-sitter for parsing source files and lowers the concrete tree into
//! the typed syntax model in [`crate::syntax`].

use std::ops::Range;
use std::sync::OnceLock;

use crate::disable_comments::DisableDirectives;
use crate::syntax::lower::{Lowerer, collect_errors};
use crate::syntax::{CompilationUnit, Span};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub span_lo: u32,
    pub span_hi: u32,
    pub message: String,
}

#[derive(Debug)]
pub struct ParseResult {
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Parser {
    inner: tree_sitter::Parser,
    grammar_error: Option<String>,
}

impl Parser {
    pub fn new() -> Self {
        let mut inner = tree_sitter::Parser::new();
        let grammar_error = inner
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .err()
            .map(|e| format!("Failed to load C# grammar: {e}"));
        Self {
            inner,
            grammar_error,
        }
    }

    pub fn parse(&mut self, code: &str) -> ParseResult {
        if let Some(message) = &self.grammar_error {
            return ParseResult {
                unit: CompilationUnit::default(),
                errors: vec![ParseError {
                    line: 1,
                    column: 1,
                    span_lo: 0,
                    span_hi: 0,
                    message: message.clone(),
                }],
            };
        }

        let Some(tree) = self.inner.parse(code, None) else {
            return ParseResult {
                unit: CompilationUnit::default(),
                errors: vec![ParseError {
                    line: 1,
                    column: 1,
                    span_lo: 0,
                    span_hi: 0,
                    message: "Parser produced no syntax tree".to_string(),
                }],
            };
        };

        let root = tree.root_node();
        let unit = Lowerer::new(code).lower_unit(root);
        let errors = collect_errors(root, code)
            .into_iter()
            .map(|(span, message)| {
                let (line, column) = location_in(code, span.lo as usize);
                ParseError {
                    line,
                    column,
                    span_lo: span.lo,
                    span_hi: span.hi,
                    message,
                }
            })
            .collect();

        ParseResult { unit, errors }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn location_in(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let prefix = &source.as_bytes()[..offset];
    let line = prefix.iter().filter(|b| **b == b'\n').count() + 1;
    let last_newline = prefix
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    (line, offset - last_newline + 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub filename: String,
    pub line_count: usize,
    pub has_errors: bool,
}

pub struct ParsedFile {
    source: String,
    metadata: FileMetadata,
    unit: CompilationUnit,
    errors: Vec<ParseError>,
    line_ranges: OnceLock<Vec<Range<usize>>>,
    disable_directives: DisableDirectives,
}

impl std::fmt::Debug for ParsedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedFile")
            .field("metadata", &self.metadata)
            .field("type_count", &self.unit.types.len())
            .field("error_count", &self.errors.len())
            .finish()
    }
}

impl ParsedFile {
    pub fn from_source(filename: &str, source: &str) -> Self {
        let parse_result = Parser::new().parse(source);
        let disable_directives = DisableDirectives::from_source(source);

        let line_count = if source.is_empty() {
            0
        } else {
            source.lines().count()
        };

        let metadata = FileMetadata {
            filename: filename.to_string(),
            line_count,
            has_errors: parse_result.has_errors(),
        };

        Self {
            source: source.to_string(),
            metadata,
            unit: parse_result.unit,
            errors: parse_result.errors,
            line_ranges: OnceLock::new(),
            disable_directives,
        }
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn unit(&self) -> &CompilationUnit {
        &self.unit
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn disable_directives(&self) -> &DisableDirectives {
        &self.disable_directives
    }

    /// Source text covered by `span`, if it lies inside the file.
    pub fn text(&self, span: Span) -> Option<&str> {
        self.source.get(span.lo as usize..span.hi as usize)
    }

    /// 1-based line and byte column of a byte offset.
    pub fn location(&self, offset: u32) -> (usize, usize) {
        let offset = (offset as usize).min(self.source.len());
        let ranges = self.line_ranges.get_or_init(|| self.build_line_ranges());
        let index = ranges
            .partition_point(|range| range.start <= offset)
            .saturating_sub(1);
        match ranges.get(index) {
            Some(range) => (index + 1, offset - range.start + 1),
            None => (1, offset + 1),
        }
    }

    /// Start and end location of a span as `(line, column, end_line, end_column)`.
    pub fn range(&self, span: Span) -> (usize, usize, usize, usize) {
        let (line, column) = self.location(span.lo);
        let (end_line, end_column) = self.location(span.hi);
        (line, column, end_line, end_column)
    }

    pub fn get_line(&self, line_number: usize) -> Option<&str> {
        if line_number == 0 {
            return None;
        }

        let ranges = self.line_ranges.get_or_init(|| self.build_line_ranges());
        let index = line_number - 1;

        ranges.get(index).map(|range| &self.source[range.clone()])
    }

    fn build_line_ranges(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for (i, c) in self.source.char_indices() {
            if c == '\n' {
                ranges.push(start..i);
                start = i + 1;
            }
        }

        if start < self.source.len() || (start == 0 && !self.source.is_empty()) {
            ranges.push(start..self.source.len());
        }

        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Expr, Member, Stmt, TypeKind, TypeSyntax};

    #[test]
    fn parse_simple_class_has_no_errors() {
        let parsed = ParsedFile::from_source("Foo.cs", "public class Foo { }");

        assert!(!parsed.metadata().has_errors);
        assert_eq!(parsed.unit().types.len(), 1);
        assert_eq!(parsed.unit().types[0].name.text, "Foo");
        assert_eq!(parsed.unit().types[0].kind, TypeKind::Class);
    }

    #[test]
    fn grammar_loads_into_the_parser() {
        let mut parser = Parser::new();

        let result = parser.parse("class Foo { }");

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(result.unit.types.len(), 1);
    }

    #[test]
    fn parse_invalid_syntax_returns_error() {
        let parsed = ParsedFile::from_source("Foo.cs", "public class Foo { int = ; }");

        assert!(parsed.metadata().has_errors);
        let error = &parsed.errors()[0];
        assert_eq!(error.line, 1);
        assert!(error.column > 0);
        assert!(error.span_hi >= error.span_lo);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn parse_namespaces_and_usings() {
        let code = r#"
using System;
using Dp = System.Windows.DependencyProperty;
using static System.Math;

namespace Demo.Controls
{
    public class Foo { }
}
"#;
        let parsed = ParsedFile::from_source("Foo.cs", code);
        let unit = parsed.unit();

        assert_eq!(unit.usings.len(), 3);
        assert!(unit.usings[0].alias.is_none());
        assert_eq!(
            unit.usings[1].alias.as_ref().map(|a| a.text.as_str()),
            Some("Dp")
        );
        assert!(unit.usings[2].is_static);
        assert_eq!(unit.namespaces[0].dotted_name(), "Demo.Controls");
        assert_eq!(unit.namespaces[0].types[0].name.text, "Foo");
    }

    #[test]
    fn parse_file_scoped_namespace() {
        let code = "namespace Demo;\n\npublic class Foo { }\npublic class Bar { }\n";
        let parsed = ParsedFile::from_source("Foo.cs", code);
        let unit = parsed.unit();

        assert_eq!(unit.namespaces.len(), 1);
        assert!(unit.namespaces[0].file_scoped);
        assert_eq!(unit.namespaces[0].types.len(), 2);
    }

    #[test]
    fn parse_dependency_property_field_initializer() {
        let code = r#"
public class Foo
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(default(int)));
}
"#;
        let parsed = ParsedFile::from_source("Foo.cs", code);
        let Member::Field(field) = &parsed.unit().types[0].members[0] else {
            panic!("expected field");
        };

        assert!(field.modifiers.is_static());
        assert!(field.modifiers.has("readonly"));
        assert_eq!(field.ty.simple_name(), Some("DependencyProperty"));
        assert_eq!(field.declarators[0].name.text, "BarProperty");
        let Some(Expr::Invocation(invocation)) = &field.declarators[0].initializer else {
            panic!("expected invocation initializer");
        };
        assert_eq!(invocation.method_name(), Some("Register"));
        assert_eq!(invocation.arguments.len(), 4);
        assert!(matches!(&invocation.arguments[0].expr, Expr::Invocation(n) if n.is_nameof()));
        assert!(matches!(&invocation.arguments[1].expr, Expr::TypeOf(_)));
        assert!(matches!(
            &invocation.arguments[3].expr,
            Expr::ObjectCreation(_)
        ));
    }

    #[test]
    fn parse_property_accessors() {
        let code = r#"
public class Foo
{
    public int Bar
    {
        get { return (int)this.GetValue(BarProperty); }
        set => this.SetValue(BarProperty, value);
    }
}
"#;
        let parsed = ParsedFile::from_source("Foo.cs", code);
        let Member::Property(property) = &parsed.unit().types[0].members[0] else {
            panic!("expected property");
        };

        assert_eq!(property.name.text, "Bar");
        assert!(matches!(property.ty, TypeSyntax::Predefined { ref keyword, .. } if keyword == "int"));
        let getter = property.getter().expect("getter");
        let Some(crate::syntax::Body::Block(block)) = &getter.body else {
            panic!("expected block body");
        };
        assert!(matches!(
            &block.statements[0],
            Stmt::Return {
                expr: Some(Expr::Cast(_)),
                ..
            }
        ));
        assert!(matches!(
            property.setter().and_then(|s| s.body.as_ref()),
            Some(crate::syntax::Body::Expression(Expr::Invocation(_)))
        ));
    }

    #[test]
    fn location_reports_line_and_column() {
        let parsed = ParsedFile::from_source("Foo.cs", "class A { }\nclass B { }");

        assert_eq!(parsed.location(0), (1, 1));
        assert_eq!(parsed.location(6), (1, 7));
        assert_eq!(parsed.location(12), (2, 1));
        assert_eq!(parsed.location(18), (2, 7));
    }

    #[test]
    fn parsed_file_metadata_returns_line_count() {
        let parsed = ParsedFile::from_source("Foo.cs", "class A { }\nclass B { }\n");

        assert_eq!(parsed.metadata().filename, "Foo.cs");
        assert_eq!(parsed.metadata().line_count, 2);
    }

    #[test]
    fn get_line_returns_line_content() {
        let parsed = ParsedFile::from_source("Foo.cs", "class A { }\nclass B { }");

        assert_eq!(parsed.get_line(1), Some("class A { }"));
        assert_eq!(parsed.get_line(2), Some("class B { }"));
        assert_eq!(parsed.get_line(0), None);
        assert_eq!(parsed.get_line(3), None);
    }

    #[test]
    fn text_returns_span_content() {
        let parsed = ParsedFile::from_source("Foo.cs", "class Foo { }");

        assert_eq!(parsed.text(Span::new(6, 9)), Some("Foo"));
        assert_eq!(parsed.text(Span::new(6, 99)), None);
    }

    #[test]
    fn empty_source_parses() {
        let parsed = ParsedFile::from_source("Empty.cs", "");

        assert!(!parsed.metadata().has_errors);
        assert_eq!(parsed.metadata().line_count, 0);
        assert!(parsed.unit().types.is_empty());
    }
}
