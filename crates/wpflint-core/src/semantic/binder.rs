//! Type name binding.
//!
//! Resolves `TypeSyntax` to a [`TypeRef`] the way C# looks up namespace-or-type names:
//! type parameters first, then nested types of the enclosing types and their bases, then
//! for each import scope from the innermost outwards the members of its namespaces, its
//! using aliases and the types of its using namespaces.

use std::collections::HashMap;

use super::scope::{NamespaceOrType, ScopeId, ScopeTree};
use super::symbols::{SymbolId, SymbolKind, SymbolTable, TypeRef};
use crate::syntax::{TypeKind, TypeSegment, TypeSyntax};

/// Where a name is being bound.
#[derive(Debug, Clone)]
pub struct BindContext {
    pub scope: ScopeId,
    pub enclosing_type: Option<SymbolId>,
    /// Method type parameters in scope.
    pub type_parameters: Vec<String>,
}

impl BindContext {
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            enclosing_type: None,
            type_parameters: Vec::new(),
        }
    }

    pub fn in_type(mut self, ty: Option<SymbolId>) -> Self {
        self.enclosing_type = ty;
        self
    }

    pub fn with_type_parameters(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.type_parameters.extend(names);
        self
    }
}

pub struct Binder<'c> {
    symbols: &'c SymbolTable,
    scopes: &'c ScopeTree,
    known: &'c HashMap<String, SymbolId>,
}

impl<'c> Binder<'c> {
    pub(crate) fn new(
        symbols: &'c SymbolTable,
        scopes: &'c ScopeTree,
        known: &'c HashMap<String, SymbolId>,
    ) -> Self {
        Self {
            symbols,
            scopes,
            known,
        }
    }

    /// Reference type by metadata name, e.g. `System.Windows.DependencyProperty`.
    pub fn known_type(&self, metadata_name: &str) -> Option<SymbolId> {
        self.known.get(metadata_name).copied()
    }

    pub fn bind_type(&self, syntax: &TypeSyntax, ctx: &BindContext) -> TypeRef {
        match syntax {
            TypeSyntax::Predefined { keyword, .. } => self.predefined(keyword),
            TypeSyntax::Nullable { inner, .. } => {
                let inner = self.bind_type(inner, ctx);
                self.make_nullable(inner)
            }
            TypeSyntax::Array { element, .. } => {
                TypeRef::Array(Box::new(self.bind_type(element, ctx)))
            }
            TypeSyntax::Named { segments, .. } => self.bind_named(segments, ctx),
            TypeSyntax::Other { .. } => TypeRef::Unknown,
        }
    }

    /// Type of a predefined keyword such as `int` or `string`.
    pub fn predefined(&self, keyword: &str) -> TypeRef {
        let name = match keyword {
            "object" | "dynamic" => "System.Object",
            "string" => "System.String",
            "bool" => "System.Boolean",
            "char" => "System.Char",
            "sbyte" => "System.SByte",
            "byte" => "System.Byte",
            "short" => "System.Int16",
            "ushort" => "System.UInt16",
            "int" => "System.Int32",
            "uint" => "System.UInt32",
            "long" => "System.Int64",
            "ulong" => "System.UInt64",
            "float" => "System.Single",
            "double" => "System.Double",
            "decimal" => "System.Decimal",
            "void" => "System.Void",
            _ => return TypeRef::Unknown,
        };
        self.known_type(name)
            .map(TypeRef::named)
            .unwrap_or(TypeRef::Unknown)
    }

    /// `T?` is `Nullable<T>` for value types and an annotation otherwise.
    pub fn make_nullable(&self, inner: TypeRef) -> TypeRef {
        let is_value_type = inner.symbol().is_some_and(|id| {
            matches!(
                self.symbols.get(id).type_kind(),
                Some(TypeKind::Struct | TypeKind::Enum)
            )
        });
        match (is_value_type, self.known_type("System.Nullable`1")) {
            (true, Some(nullable)) if inner.symbol() != Some(nullable) => TypeRef::Named {
                symbol: nullable,
                args: vec![inner],
            },
            _ => inner,
        }
    }

    fn bind_named(&self, segments: &[TypeSegment], ctx: &BindContext) -> TypeRef {
        if let [single] = segments {
            if single.type_arguments.is_empty() {
                if self.is_type_parameter(&single.ident.text, ctx) {
                    return TypeRef::TypeParameter(single.ident.text.clone());
                }
                if single.ident.text == "var" && self.lookup_name("var", 0, ctx).is_none() {
                    return TypeRef::Unknown;
                }
            }
        }

        match self.resolve_qualified(segments, ctx) {
            Some(NamespaceOrType::Type(ty)) => ty,
            _ => TypeRef::Unknown,
        }
    }

    /// Resolves a dotted namespace-or-type name segment by segment.
    pub fn resolve_qualified(
        &self,
        segments: &[TypeSegment],
        ctx: &BindContext,
    ) -> Option<NamespaceOrType> {
        let (first, rest) = segments.split_first()?;
        let mut current = self.lookup_name(&first.ident.text, first.type_arguments.len(), ctx)?;
        current = self.with_arguments(current, &first.type_arguments, ctx);

        for segment in rest {
            let arity = segment.type_arguments.len();
            let next = match &current {
                NamespaceOrType::Namespace(ns) => {
                    self.symbols
                        .child_type_or_namespace(*ns, &segment.ident.text, arity)?
                }
                NamespaceOrType::Type(ty) => {
                    self.nested_type(ty.symbol()?, &segment.ident.text, arity)?
                }
            };
            current = self.with_arguments(self.classify(next), &segment.type_arguments, ctx);
        }

        Some(current)
    }

    fn with_arguments(
        &self,
        target: NamespaceOrType,
        arguments: &[TypeSyntax],
        ctx: &BindContext,
    ) -> NamespaceOrType {
        match target {
            NamespaceOrType::Type(TypeRef::Named { symbol, .. }) if !arguments.is_empty() => {
                NamespaceOrType::Type(TypeRef::Named {
                    symbol,
                    args: arguments.iter().map(|a| self.bind_type(a, ctx)).collect(),
                })
            }
            other => other,
        }
    }

    fn classify(&self, id: SymbolId) -> NamespaceOrType {
        if self.symbols.get(id).kind == SymbolKind::Namespace {
            NamespaceOrType::Namespace(id)
        } else {
            NamespaceOrType::Type(TypeRef::named(id))
        }
    }

    fn is_type_parameter(&self, name: &str, ctx: &BindContext) -> bool {
        if ctx.type_parameters.iter().any(|p| p == name) {
            return true;
        }
        self.enclosing_types(ctx)
            .any(|ty| self.symbols.get(ty).type_parameters.iter().any(|p| p == name))
    }

    fn enclosing_types(&self, ctx: &BindContext) -> impl Iterator<Item = SymbolId> + '_ {
        std::iter::successors(ctx.enclosing_type, |&ty| {
            self.symbols
                .get(ty)
                .container
                .filter(|&c| self.symbols.get(c).kind.is_type())
        })
    }

    /// Nested type declared in `ty` or one of its base types.
    pub fn nested_type(&self, ty: SymbolId, name: &str, arity: usize) -> Option<SymbolId> {
        self.symbols.base_chain(ty).find_map(|candidate| {
            self.symbols
                .child_type_or_namespace(candidate, name, arity)
                .filter(|&id| self.symbols.get(id).kind.is_type())
        })
    }

    /// Simple-name lookup of a namespace or type.
    pub fn lookup_name(&self, name: &str, arity: usize, ctx: &BindContext) -> Option<NamespaceOrType> {
        for ty in self.enclosing_types(ctx) {
            if let Some(nested) = self.nested_type(ty, name, arity) {
                return Some(NamespaceOrType::Type(TypeRef::named(nested)));
            }
        }

        for scope in self.scopes.ancestors(ctx.scope) {
            let stop = scope.parent.map(|p| self.scopes.get(p).namespace);
            let mut namespace = Some(scope.namespace);
            while let Some(ns) = namespace {
                if Some(ns) == stop {
                    break;
                }
                if let Some(found) = self.symbols.child_type_or_namespace(ns, name, arity) {
                    return Some(self.classify(found));
                }
                namespace = self.symbols.get(ns).container;
            }

            if arity == 0 {
                if let Some(target) = scope.alias(name) {
                    return Some(target.clone());
                }
            }

            for &imported in &scope.imported_namespaces {
                let found = self
                    .symbols
                    .child_type_or_namespace(imported, name, arity)
                    .filter(|&id| self.symbols.get(id).kind.is_type());
                if let Some(found) = found {
                    return Some(NamespaceOrType::Type(TypeRef::named(found)));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ParsedFile;
    use crate::semantic::{Compilation, TypeRef};

    fn field_type(code: &str, field: &str) -> String {
        let file = ParsedFile::from_source("Test.cs", code);
        let compilation = Compilation::builder().add_file(&file).build();
        let symbols = compilation.symbols();
        let symbol = symbols
            .all_symbols()
            .find(|s| s.name == field && s.is_from_source())
            .expect("field declared");
        compilation.display_type(&symbol.ty)
    }

    #[test]
    fn binds_predefined_keywords() {
        let code = "class Foo { int a; string b; object c; }";

        assert_eq!(field_type(code, "a"), "System.Int32");
        assert_eq!(field_type(code, "b"), "System.String");
        assert_eq!(field_type(code, "c"), "System.Object");
    }

    #[test]
    fn binds_through_using_directive() {
        let code = r#"
using System.Windows;
class Foo { DependencyProperty p; }
"#;

        assert_eq!(field_type(code, "p"), "System.Windows.DependencyProperty");
    }

    #[test]
    fn binds_fully_qualified_name_without_using() {
        let code = "class Foo { System.Windows.DependencyProperty p; }";

        assert_eq!(field_type(code, "p"), "System.Windows.DependencyProperty");
    }

    #[test]
    fn binds_using_alias() {
        let code = r#"
using DP = System.Windows.DependencyProperty;
class Foo { DP p; }
"#;

        assert_eq!(field_type(code, "p"), "System.Windows.DependencyProperty");
    }

    #[test]
    fn binds_namespace_member_before_using() {
        let code = r#"
using System.Windows;
namespace Demo
{
    class DependencyProperty { }
    class Foo { DependencyProperty p; }
}
"#;

        assert_eq!(field_type(code, "p"), "Demo.DependencyProperty");
    }

    #[test]
    fn binds_nullable_value_type_and_arrays() {
        let code = "class Foo { int? a; string[] b; }";

        assert_eq!(field_type(code, "a"), "System.Nullable<System.Int32>");
        assert_eq!(field_type(code, "b"), "System.String[]");
    }

    #[test]
    fn binds_type_parameters() {
        let code = "class Foo<T> { T a; }";

        assert_eq!(field_type(code, "a"), "T");
    }

    #[test]
    fn binds_nested_type_of_base() {
        let code = r#"
namespace Demo
{
    class Base { public class Inner { } }
    class Derived : Base { Inner a; }
}
"#;

        assert_eq!(field_type(code, "a"), "Demo.Base.Inner");
    }

    #[test]
    fn unresolved_name_is_unknown() {
        let file = ParsedFile::from_source("Test.cs", "class Foo { Missing a; }");
        let compilation = Compilation::builder().add_file(&file).build();
        let symbol = compilation
            .symbols()
            .all_symbols()
            .find(|s| s.name == "a")
            .expect("field declared");

        assert_eq!(symbol.ty, TypeRef::Unknown);
    }
}
