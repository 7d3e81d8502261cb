//! Compilation: the symbol arena over every file of an analysis run.
//!
//! Building runs in phases so that every name a later phase binds has been declared by an
//! earlier one:
//!
//! 1. declare namespaces and types (partial types merge into one symbol) and open an
//!    import scope per compilation unit and namespace declaration;
//! 2. resolve `using` directives of every scope;
//! 3. bind base types;
//! 4. declare members with bound types, then parameters and locals with the region in
//!    which they are visible.
//!
//! The arena is immutable once built. The only interior mutability is the memo of
//! well-known types, which makes a `Compilation` safe to share between threads.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::Instant;

use dashmap::DashMap;
use tracing::debug;

use super::binder::{BindContext, Binder};
use super::reference::{self, CORE_LIBRARY, FRAMEWORK};
use super::scope::{NamespaceOrType, ScopeId, ScopeTree};
use super::symbols::{Accessibility, FileId, SymbolId, SymbolKind, SymbolTable, TypeRef};
use crate::parser::ParsedFile;
use crate::syntax::{
    Accessor, Block, Body, ConstructorDecl, Expr, FieldDecl, Ident, Lambda, Member, MethodDecl,
    NamespaceDecl, Parameter, PropertyDecl, Span, Stmt, TypeDecl, TypeKind, TypeSegment, TypeSyntax,
    UsingDirective, VariableDeclarator,
};
use crate::visitor::{self, AstVisitor, VisitorContext};

/// Syntax that declared a source symbol.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Type(&'a TypeDecl),
    Field {
        field: &'a FieldDecl,
        declarator: &'a VariableDeclarator,
    },
    Property(&'a PropertyDecl),
    Method(&'a MethodDecl),
    Constructor(&'a ConstructorDecl),
    Parameter(&'a Parameter),
    /// Implicit `value` parameter of a `set` or `init` accessor.
    ImplicitValue(&'a Accessor),
    Local {
        ty: &'a TypeSyntax,
        declarator: &'a VariableDeclarator,
    },
    EnumMember(&'a Ident),
}

/// One `partial` declaration of a source type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypePart<'a> {
    pub symbol: SymbolId,
    pub decl: &'a TypeDecl,
    pub file: FileId,
    pub scope: ScopeId,
}

/// Per-file lookup tables.
#[derive(Debug)]
pub(crate) struct FileIndex {
    pub root_scope: ScopeId,
    /// Type declarations as (declaration span, symbol).
    pub types: Vec<(Span, SymbolId)>,
    /// Member declarations as (declaration span, symbol).
    pub members: Vec<(Span, SymbolId)>,
    /// Parameters and locals; each carries its visibility span.
    pub locals: Vec<SymbolId>,
    /// Declared symbols keyed by the start offset of their identifier.
    pub declared: HashMap<u32, SymbolId>,
}

pub struct Compilation<'a> {
    files: Vec<&'a ParsedFile>,
    symbols: SymbolTable,
    scopes: ScopeTree,
    declarations: Vec<Option<Declaration<'a>>>,
    parts: Vec<TypePart<'a>>,
    indexes: Vec<FileIndex>,
    global: SymbolId,
    known: HashMap<String, SymbolId>,
    well_known: DashMap<&'static str, Option<SymbolId>>,
    has_framework: bool,
}

pub struct CompilationBuilder<'a> {
    files: Vec<&'a ParsedFile>,
    framework: bool,
}

impl<'a> CompilationBuilder<'a> {
    pub fn add_file(mut self, file: &'a ParsedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn add_files(mut self, files: impl IntoIterator<Item = &'a ParsedFile>) -> Self {
        self.files.extend(files);
        self
    }

    /// Whether the WPF reference model is available; on by default.
    pub fn with_framework(mut self, enabled: bool) -> Self {
        self.framework = enabled;
        self
    }

    pub fn build(self) -> Compilation<'a> {
        let start = Instant::now();
        let mut symbols = SymbolTable::new();
        let global = symbols.declare("", SymbolKind::Namespace, None);
        let sets: Vec<&[reference::RefType]> = if self.framework {
            vec![CORE_LIBRARY, FRAMEWORK]
        } else {
            vec![CORE_LIBRARY]
        };
        let known = reference::declare_reference(&mut symbols, global, &sets);

        let mut compilation = Compilation {
            files: self.files,
            symbols,
            scopes: ScopeTree::new(),
            declarations: Vec::new(),
            parts: Vec::new(),
            indexes: Vec::new(),
            global,
            known,
            well_known: DashMap::new(),
            has_framework: self.framework,
        };

        let mut usings = Vec::new();
        for index in 0..compilation.files.len() {
            let file = compilation.files[index];
            compilation.declare_file(FileId(index), file, &mut usings);
        }
        compilation.resolve_usings(&usings);
        compilation.bind_base_types();
        compilation.declare_members();

        debug!(
            files = compilation.files.len(),
            symbols = compilation.symbols.len(),
            types = compilation.parts.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Built compilation"
        );
        compilation
    }
}

impl<'a> Compilation<'a> {
    pub fn builder() -> CompilationBuilder<'a> {
        CompilationBuilder {
            files: Vec::new(),
            framework: true,
        }
    }

    pub fn files(&self) -> &[&'a ParsedFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&'a ParsedFile> {
        self.files.get(id.0).copied()
    }

    /// Id of a file of this compilation, compared by identity.
    pub fn file_id(&self, file: &ParsedFile) -> Option<FileId> {
        self.files
            .iter()
            .position(|f| std::ptr::eq(*f, file))
            .map(FileId)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn global_namespace(&self) -> SymbolId {
        self.global
    }

    pub fn has_framework(&self) -> bool {
        self.has_framework
    }

    pub fn declaration(&self, id: SymbolId) -> Option<Declaration<'a>> {
        self.declarations.get(id.index()).copied().flatten()
    }

    pub fn binder(&self) -> Binder<'_> {
        Binder::new(&self.symbols, &self.scopes, &self.known)
    }

    pub(crate) fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub(crate) fn index(&self, file: FileId) -> Option<&FileIndex> {
        self.indexes.get(file.0)
    }

    /// Every partial declaration of a source type.
    pub fn type_declarations(&self, ty: SymbolId) -> impl Iterator<Item = &'a TypeDecl> + '_ {
        self.parts
            .iter()
            .filter(move |part| part.symbol == ty)
            .map(|part| part.decl)
    }

    /// Every partial declaration of a source type with the file declaring it.
    pub fn type_parts(&self, ty: SymbolId) -> impl Iterator<Item = (FileId, &'a TypeDecl)> + '_ {
        self.parts
            .iter()
            .filter(move |part| part.symbol == ty)
            .map(|part| (part.file, part.decl))
    }

    /// Type by namespace-qualified metadata name, e.g. `System.Windows.DependencyObject`.
    ///
    /// Memoized per compilation; a missing type is remembered as missing.
    pub fn well_known_type(&self, metadata_name: &'static str) -> Option<SymbolId> {
        if let Some(cached) = self.well_known.get(metadata_name) {
            return *cached;
        }
        let resolved = self.resolve_metadata_name(metadata_name);
        self.well_known.insert(metadata_name, resolved);
        resolved
    }

    fn resolve_metadata_name(&self, metadata_name: &str) -> Option<SymbolId> {
        if let Some(&id) = self.known.get(metadata_name) {
            return Some(id);
        }
        let mut current = self.global;
        for segment in metadata_name.split(['.', '+']) {
            let (name, arity) = match segment.split_once('`') {
                Some((name, arity)) => (name, arity.parse().ok()?),
                None => (segment, 0),
            };
            current = self.symbols.child_type_or_namespace(current, name, arity)?;
        }
        self.symbols.get(current).kind.is_type().then_some(current)
    }

    /// Human-readable rendering of a type, e.g. `System.Nullable<System.Int32>`.
    pub fn display_type(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Named { symbol, args } if args.is_empty() => {
                self.symbols.qualified_name(*symbol)
            }
            TypeRef::Named { symbol, args } => format!(
                "{}<{}>",
                self.symbols.qualified_name(*symbol),
                args.iter()
                    .map(|a| self.display_type(a))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TypeRef::Array(element) => format!("{}[]", self.display_type(element)),
            TypeRef::TypeParameter(name) => name.clone(),
            TypeRef::Null => "null".to_string(),
            TypeRef::Unknown => "?".to_string(),
        }
    }

    /// Simple C# spelling of a type as it would be written in source, e.g. `int` or `Brush`.
    pub fn short_type_name(&self, ty: &TypeRef) -> Option<String> {
        match ty {
            TypeRef::Named { symbol, args } => {
                let name = self.symbols.qualified_name(*symbol);
                if let Some(keyword) = keyword_for(&name) {
                    return Some(keyword.to_string());
                }
                let simple = self.symbols.get(*symbol).name.clone();
                if args.is_empty() {
                    return Some(simple);
                }
                let args = args
                    .iter()
                    .map(|a| self.short_type_name(a))
                    .collect::<Option<Vec<_>>>()?;
                if name == "System.Nullable" && args.len() == 1 {
                    return Some(format!("{}?", args[0]));
                }
                Some(format!("{}<{}>", simple, args.join(", ")))
            }
            TypeRef::Array(element) => Some(format!("{}[]", self.short_type_name(element)?)),
            TypeRef::TypeParameter(name) => Some(name.clone()),
            TypeRef::Null | TypeRef::Unknown => None,
        }
    }

    fn set_declaration(&mut self, id: SymbolId, declaration: Declaration<'a>) {
        let index = id.index();
        if self.declarations.len() <= index {
            self.declarations.resize(index + 1, None);
        }
        self.declarations[index] = Some(declaration);
    }

    fn set_source(&mut self, id: SymbolId, file: FileId, span: Span, name_span: Option<Span>) {
        let symbol = self.symbols.get_mut(id);
        symbol.file = Some(file);
        symbol.span = Some(span);
        symbol.name_span = name_span;
        if let Some(name_span) = name_span {
            self.indexes[file.0].declared.insert(name_span.lo, id);
        }
    }

    fn declare_file(
        &mut self,
        file_id: FileId,
        file: &'a ParsedFile,
        usings: &mut Vec<(ScopeId, &'a UsingDirective)>,
    ) {
        let unit = file.unit();
        let root = self
            .scopes
            .create_scope(self.global, None, file_id, unit.span);
        self.indexes.push(FileIndex {
            root_scope: root,
            types: Vec::new(),
            members: Vec::new(),
            locals: Vec::new(),
            declared: HashMap::new(),
        });

        usings.extend(unit.usings.iter().map(|u| (root, u)));
        for namespace in &unit.namespaces {
            self.declare_namespace(file_id, namespace, self.global, root, usings);
        }
        for ty in &unit.types {
            self.declare_type(file_id, ty, self.global, root);
        }
    }

    fn declare_namespace(
        &mut self,
        file_id: FileId,
        decl: &'a NamespaceDecl,
        parent: SymbolId,
        parent_scope: ScopeId,
        usings: &mut Vec<(ScopeId, &'a UsingDirective)>,
    ) {
        let namespace = reference::namespace_symbol(&mut self.symbols, parent, &decl.dotted_name());
        let scope = self
            .scopes
            .create_scope(namespace, Some(parent_scope), file_id, decl.span);

        usings.extend(decl.usings.iter().map(|u| (scope, u)));
        for nested in &decl.namespaces {
            self.declare_namespace(file_id, nested, namespace, scope, usings);
        }
        for ty in &decl.types {
            self.declare_type(file_id, ty, namespace, scope);
        }
    }

    fn declare_type(&mut self, file_id: FileId, decl: &'a TypeDecl, container: SymbolId, scope: ScopeId) {
        let arity = decl.type_parameters.len();
        let existing = self
            .symbols
            .child_type_or_namespace(container, &decl.name.text, arity)
            .filter(|&id| {
                let symbol = self.symbols.get(id);
                symbol.kind.is_type() && symbol.is_from_source()
            });

        let id = match existing {
            Some(id) => {
                self.indexes[file_id.0].declared.insert(decl.name.span.lo, id);
                id
            }
            None => {
                let id = self
                    .symbols
                    .declare(&decl.name.text, SymbolKind::Type(decl.kind), Some(container));
                let nested = self.symbols.get(container).kind.is_type();
                let symbol = self.symbols.get_mut(id);
                let default = if nested {
                    Accessibility::Private
                } else {
                    Accessibility::Internal
                };
                symbol.accessibility = Accessibility::from_keywords(|k| decl.modifiers.has(k), default);
                symbol.flags.is_static = decl.modifiers.is_static();
                symbol.flags.is_abstract = decl.modifiers.has("abstract");
                symbol.type_parameters = decl.type_parameters.iter().map(|p| p.text.clone()).collect();
                self.set_source(id, file_id, decl.span, Some(decl.name.span));
                self.set_declaration(id, Declaration::Type(decl));
                id
            }
        };

        self.indexes[file_id.0].types.push((decl.span, id));
        self.parts.push(TypePart {
            symbol: id,
            decl,
            file: file_id,
            scope,
        });

        for member in &decl.members {
            if let Member::Type(nested) = member {
                self.declare_type(file_id, nested, id, scope);
            }
        }
    }

    fn resolve_usings(&mut self, usings: &[(ScopeId, &'a UsingDirective)]) {
        for &(scope, using) in usings {
            let resolved = self.resolve_using(scope, using);
            let import = self.scopes.get_mut(scope);
            match (resolved, &using.alias) {
                (Some(target), Some(alias)) => {
                    import.aliases.push((alias.text.clone(), target));
                }
                (Some(NamespaceOrType::Namespace(ns)), None) if !using.is_static => {
                    import.imported_namespaces.push(ns);
                }
                (Some(NamespaceOrType::Type(ty)), None) if using.is_static => {
                    if let Some(symbol) = ty.symbol() {
                        import.static_imports.push(symbol);
                    }
                }
                _ => {}
            }
        }
    }

    /// Using directives bind in the context of their declaring namespace, without the
    /// directives of their own scope.
    fn resolve_using(&self, scope: ScopeId, using: &UsingDirective) -> Option<NamespaceOrType> {
        let TypeSyntax::Named { segments, .. } = &using.name else {
            return match &using.name {
                TypeSyntax::Predefined { .. } | TypeSyntax::Nullable { .. } | TypeSyntax::Array { .. } => {
                    let ctx = BindContext::new(scope);
                    Some(NamespaceOrType::Type(self.binder().bind_type(&using.name, &ctx)))
                }
                _ => None,
            };
        };

        let import = self.scopes.get(scope);
        let (first, rest) = segments.split_first()?;
        let arity = first.type_arguments.len();

        let mut namespace = Some(import.namespace);
        while let Some(ns) = namespace {
            if self
                .symbols
                .child_type_or_namespace(ns, &first.ident.text, arity)
                .is_some()
            {
                let resolved = self.resolve_from(ns, segments, scope);
                if resolved.is_some() || rest.is_empty() {
                    return resolved;
                }
            }
            namespace = self.symbols.get(ns).container;
        }

        let parent = import.parent?;
        let ctx = BindContext::new(parent);
        self.binder().resolve_qualified(segments, &ctx)
    }

    fn resolve_from(
        &self,
        start: SymbolId,
        segments: &[TypeSegment],
        scope: ScopeId,
    ) -> Option<NamespaceOrType> {
        let binder = self.binder();
        let ctx = BindContext::new(scope);
        let mut current = NamespaceOrType::Namespace(start);
        for segment in segments {
            let arity = segment.type_arguments.len();
            let next = match &current {
                NamespaceOrType::Namespace(ns) => {
                    self.symbols
                        .child_type_or_namespace(*ns, &segment.ident.text, arity)?
                }
                NamespaceOrType::Type(ty) => binder.nested_type(ty.symbol()?, &segment.ident.text, arity)?,
            };
            current = if self.symbols.get(next).kind == SymbolKind::Namespace {
                NamespaceOrType::Namespace(next)
            } else if segment.type_arguments.is_empty() {
                NamespaceOrType::Type(TypeRef::named(next))
            } else {
                NamespaceOrType::Type(TypeRef::Named {
                    symbol: next,
                    args: segment
                        .type_arguments
                        .iter()
                        .map(|a| binder.bind_type(a, &ctx))
                        .collect(),
                })
            };
        }
        Some(current)
    }

    fn bind_base_types(&mut self) {
        let mut bound = Vec::new();
        {
            let binder = self.binder();
            for part in &self.parts {
                if part.decl.base_types.is_empty() {
                    continue;
                }
                let symbol = self.symbols.get(part.symbol);
                let ctx = BindContext::new(part.scope)
                    .in_type(symbol.container.filter(|&c| self.symbols.get(c).kind.is_type()))
                    .with_type_parameters(symbol.type_parameters.clone());
                let types: Vec<TypeRef> = part
                    .decl
                    .base_types
                    .iter()
                    .map(|syntax| binder.bind_type(syntax, &ctx))
                    .collect();
                bound.push((part.symbol, part.decl.kind, types));
            }
        }

        for (id, kind, types) in bound {
            let mut types = types.into_iter();
            if matches!(kind, TypeKind::Class | TypeKind::Record) {
                if self.symbols.get(id).base_type.is_some() {
                    self.symbols.get_mut(id).interfaces.extend(types);
                    continue;
                }
                if let Some(first) = types.next() {
                    let is_interface = first.symbol().is_some_and(|s| {
                        self.symbols.get(s).type_kind() == Some(TypeKind::Interface)
                    });
                    let symbol = self.symbols.get_mut(id);
                    if is_interface {
                        symbol.interfaces.push(first);
                    } else {
                        symbol.base_type = Some(first);
                    }
                }
            }
            self.symbols.get_mut(id).interfaces.extend(types);
        }

        let defaults: Vec<(SymbolId, Option<SymbolId>)> = self
            .parts
            .iter()
            .filter(|part| self.symbols.get(part.symbol).base_type.is_none())
            .map(|part| {
                let base = match part.decl.kind {
                    TypeKind::Class | TypeKind::Record => self.known.get("System.Object"),
                    TypeKind::Struct => self.known.get("System.ValueType"),
                    TypeKind::Enum => self.known.get("System.Enum"),
                    TypeKind::Delegate => self.known.get("System.MulticastDelegate"),
                    TypeKind::Interface => None,
                };
                (part.symbol, base.copied())
            })
            .collect();
        for (id, base) in defaults {
            if let Some(base) = base {
                self.symbols.get_mut(id).base_type = Some(TypeRef::named(base));
            }
        }
    }

    fn declare_members(&mut self) {
        for index in 0..self.parts.len() {
            let part = self.parts[index];
            let is_interface = part.decl.kind == TypeKind::Interface;
            let default_access = if is_interface {
                Accessibility::Public
            } else {
                Accessibility::Private
            };

            for name in &part.decl.enum_members {
                let id = self.symbols.declare(&name.text, SymbolKind::Field, Some(part.symbol));
                {
                    let symbol = self.symbols.get_mut(id);
                    symbol.accessibility = Accessibility::Public;
                    symbol.flags.is_const = true;
                    symbol.ty = TypeRef::named(part.symbol);
                }
                self.set_source(id, part.file, name.span, Some(name.span));
                self.set_declaration(id, Declaration::EnumMember(name));
            }

            if let Some((returns, parameters)) = &part.decl.delegate_signature {
                let ctx = self.member_context(&part, &[]);
                let return_type = self.binder().bind_type(returns, &ctx);
                let id = self.symbols.declare("Invoke", SymbolKind::Method, Some(part.symbol));
                {
                    let symbol = self.symbols.get_mut(id);
                    symbol.accessibility = Accessibility::Public;
                    symbol.ty = return_type;
                    symbol.flags.is_implicit = true;
                }
                self.declare_parameters(&part, id, parameters, &ctx, part.decl.span);
            }

            for member in &part.decl.members {
                match member {
                    Member::Field(field) => self.declare_field(&part, field, default_access),
                    Member::Property(property) => {
                        self.declare_property(&part, property, default_access)
                    }
                    Member::Method(method) => self.declare_method(&part, method, default_access),
                    Member::Constructor(ctor) => self.declare_constructor(&part, ctor),
                    Member::Type(_) | Member::Other(_) => {}
                }
            }
        }
    }

    fn member_context(&self, part: &TypePart<'a>, method_type_parameters: &[Ident]) -> BindContext {
        BindContext::new(part.scope)
            .in_type(Some(part.symbol))
            .with_type_parameters(method_type_parameters.iter().map(|p| p.text.clone()))
    }

    fn declare_field(&mut self, part: &TypePart<'a>, field: &'a FieldDecl, default_access: Accessibility) {
        let ctx = self.member_context(part, &[]);
        let ty = self.binder().bind_type(&field.ty, &ctx);
        for declarator in &field.declarators {
            let id = self
                .symbols
                .declare(&declarator.name.text, SymbolKind::Field, Some(part.symbol));
            {
                let symbol = self.symbols.get_mut(id);
                symbol.accessibility =
                    Accessibility::from_keywords(|k| field.modifiers.has(k), default_access);
                symbol.flags.is_static = field.modifiers.is_static();
                symbol.flags.is_readonly = field.modifiers.has("readonly");
                symbol.flags.is_const = field.modifiers.has("const");
                symbol.ty = ty.clone();
            }
            self.set_source(id, part.file, declarator.span, Some(declarator.name.span));
            self.set_declaration(id, Declaration::Field { field, declarator });
            self.indexes[part.file.0].members.push((declarator.span, id));

            if let Some(init) = &declarator.initializer {
                self.declare_locals_in(part, id, &ctx, |walker, visitor, vctx| {
                    walker.expr(init, visitor, vctx)
                });
            }
        }
    }

    fn declare_property(
        &mut self,
        part: &TypePart<'a>,
        property: &'a PropertyDecl,
        default_access: Accessibility,
    ) {
        let ctx = self.member_context(part, &[]);
        let ty = self.binder().bind_type(&property.ty, &ctx);
        let id = self
            .symbols
            .declare(&property.name.text, SymbolKind::Property, Some(part.symbol));
        {
            let access = if property.explicit_interface.is_some() {
                Accessibility::Private
            } else {
                Accessibility::from_keywords(|k| property.modifiers.has(k), default_access)
            };
            let symbol = self.symbols.get_mut(id);
            symbol.accessibility = access;
            symbol.flags.is_static = property.modifiers.is_static();
            symbol.flags.is_abstract = property.modifiers.has("abstract");
            symbol.flags.has_getter = property.getter().is_some() || property.expression_body.is_some();
            symbol.flags.has_setter = property.setter().is_some();
            symbol.ty = ty.clone();
        }
        self.set_source(id, part.file, property.span, Some(property.name.span));
        self.set_declaration(id, Declaration::Property(property));
        self.indexes[part.file.0].members.push((property.span, id));

        if let Some(setter) = property.setter() {
            let value = self.symbols.declare("value", SymbolKind::Parameter, Some(id));
            {
                let symbol = self.symbols.get_mut(value);
                symbol.ty = ty.clone();
                symbol.flags.is_implicit = true;
                symbol.scope = Some(setter.span);
                symbol.file = Some(part.file);
                symbol.span = Some(setter.span);
            }
            self.symbols.get_mut(id).parameters.push(value);
            self.set_declaration(value, Declaration::ImplicitValue(setter));
            self.indexes[part.file.0].locals.push(value);
        }

        for accessor in &property.accessors {
            if let Some(body) = &accessor.body {
                self.declare_locals_in(part, id, &ctx, |walker, visitor, vctx| {
                    walker.body(body, visitor, vctx)
                });
            }
        }
        for expr in property.expression_body.iter().chain(&property.initializer) {
            self.declare_locals_in(part, id, &ctx, |walker, visitor, vctx| {
                walker.expr(expr, visitor, vctx)
            });
        }
    }

    fn declare_method(&mut self, part: &TypePart<'a>, method: &'a MethodDecl, default_access: Accessibility) {
        let ctx = self.member_context(part, &method.type_parameters);
        let return_type = self.binder().bind_type(&method.return_type, &ctx);
        let id = self
            .symbols
            .declare(&method.name.text, SymbolKind::Method, Some(part.symbol));
        {
            let access = if method.explicit_interface.is_some() {
                Accessibility::Private
            } else {
                Accessibility::from_keywords(|k| method.modifiers.has(k), default_access)
            };
            let symbol = self.symbols.get_mut(id);
            symbol.accessibility = access;
            symbol.flags.is_static = method.modifiers.is_static();
            symbol.flags.is_abstract = method.modifiers.has("abstract");
            symbol.type_parameters = method.type_parameters.iter().map(|p| p.text.clone()).collect();
            symbol.ty = return_type;
        }
        self.set_source(id, part.file, method.span, Some(method.name.span));
        self.set_declaration(id, Declaration::Method(method));
        self.indexes[part.file.0].members.push((method.span, id));
        self.declare_parameters(part, id, &method.parameters, &ctx, method.span);

        if let Some(body) = &method.body {
            self.declare_locals_in(part, id, &ctx, |walker, visitor, vctx| {
                walker.body(body, visitor, vctx)
            });
        }
    }

    fn declare_constructor(&mut self, part: &TypePart<'a>, ctor: &'a ConstructorDecl) {
        let ctx = self.member_context(part, &[]);
        let id = self
            .symbols
            .declare(&ctor.name.text, SymbolKind::Constructor, Some(part.symbol));
        {
            let symbol = self.symbols.get_mut(id);
            symbol.accessibility =
                Accessibility::from_keywords(|k| ctor.modifiers.has(k), Accessibility::Private);
            symbol.flags.is_static = ctor.modifiers.is_static();
            symbol.ty = TypeRef::named(part.symbol);
        }
        self.set_source(id, part.file, ctor.span, Some(ctor.name.span));
        self.set_declaration(id, Declaration::Constructor(ctor));
        self.indexes[part.file.0].members.push((ctor.span, id));
        self.declare_parameters(part, id, &ctor.parameters, &ctx, ctor.span);

        for argument in &ctor.initializer {
            self.declare_locals_in(part, id, &ctx, |walker, visitor, vctx| {
                walker.expr(&argument.expr, visitor, vctx)
            });
        }
        if let Some(body) = &ctor.body {
            self.declare_locals_in(part, id, &ctx, |walker, visitor, vctx| {
                walker.body(body, visitor, vctx)
            });
        }
    }

    fn declare_parameters(
        &mut self,
        part: &TypePart<'a>,
        owner: SymbolId,
        parameters: &'a [Parameter],
        ctx: &BindContext,
        scope: Span,
    ) {
        let mut ids = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let ty = parameter
                .ty
                .as_ref()
                .map(|syntax| self.binder().bind_type(syntax, ctx))
                .unwrap_or(TypeRef::Unknown);
            let id = self
                .symbols
                .declare(&parameter.name.text, SymbolKind::Parameter, Some(owner));
            {
                let symbol = self.symbols.get_mut(id);
                symbol.ty = ty;
                symbol.flags.has_default = parameter.default.is_some();
                symbol.flags.is_params = parameter.modifiers.has("params");
                symbol.scope = Some(scope);
            }
            self.set_source(id, part.file, parameter.span, Some(parameter.name.span));
            self.set_declaration(id, Declaration::Parameter(parameter));
            self.indexes[part.file.0].locals.push(id);
            ids.push(id);
        }
        self.symbols.get_mut(owner).parameters = ids;
    }

    /// Declares the locals and lambda parameters found by `walk` as children of `owner`.
    fn declare_locals_in<F>(&mut self, part: &TypePart<'a>, owner: SymbolId, ctx: &BindContext, walk: F)
    where
        F: FnOnce(&Walker, &mut LocalCollector<'a>, &VisitorContext) -> ControlFlow<()>,
    {
        let Some(file) = self.file(part.file) else {
            return;
        };
        let mut collector = LocalCollector::default();
        let vctx = VisitorContext::new(file);
        let _ = walk(&Walker, &mut collector, &vctx);

        for (ty, declarator) in collector.locals {
            let block_end = collector
                .blocks
                .iter()
                .filter(|block| block.encloses(declarator.span))
                .min_by_key(|block| block.len())
                .map(|block| block.hi)
                .unwrap_or(declarator.span.hi);
            let is_var = matches!(ty, TypeSyntax::Named { segments, .. }
                if segments.len() == 1 && segments[0].ident.text == "var");
            let bound = self.binder().bind_type(ty, ctx);
            let id = self
                .symbols
                .declare(&declarator.name.text, SymbolKind::Local, Some(owner));
            {
                let symbol = self.symbols.get_mut(id);
                symbol.ty = bound;
                symbol.flags.is_implicit = is_var;
                symbol.scope = Some(Span::new(declarator.span.lo, block_end));
            }
            self.set_source(id, part.file, declarator.span, Some(declarator.name.span));
            self.set_declaration(id, Declaration::Local { ty, declarator });
            self.indexes[part.file.0].locals.push(id);
        }

        for lambda in collector.lambdas {
            for parameter in &lambda.parameters {
                let ty = parameter
                    .ty
                    .as_ref()
                    .map(|syntax| self.binder().bind_type(syntax, ctx))
                    .unwrap_or(TypeRef::Unknown);
                let id = self
                    .symbols
                    .declare(&parameter.name.text, SymbolKind::Parameter, Some(owner));
                {
                    let symbol = self.symbols.get_mut(id);
                    symbol.ty = ty;
                    symbol.scope = Some(lambda.span);
                }
                self.set_source(id, part.file, parameter.span, Some(parameter.name.span));
                self.set_declaration(id, Declaration::Parameter(parameter));
                self.indexes[part.file.0].locals.push(id);
            }
        }
    }
}

/// Entry points handed to `declare_locals_in` callers.
struct Walker;

impl Walker {
    fn expr<'a>(&self, expr: &'a Expr, v: &mut LocalCollector<'a>, ctx: &VisitorContext) -> ControlFlow<()> {
        visitor::walk_expr(expr, v, ctx)
    }

    fn body<'a>(&self, body: &'a Body, v: &mut LocalCollector<'a>, ctx: &VisitorContext) -> ControlFlow<()> {
        if let Body::Block(block) = body {
            v.blocks.push(block.span);
        }
        visitor::walk_body(body, v, ctx)
    }
}

#[derive(Default)]
struct LocalCollector<'a> {
    locals: Vec<(&'a TypeSyntax, &'a VariableDeclarator)>,
    lambdas: Vec<&'a Lambda>,
    blocks: Vec<Span>,
}

impl<'a> AstVisitor<'a> for LocalCollector<'a> {
    fn visit_stmt(&mut self, node: &'a Stmt, _ctx: &VisitorContext) -> ControlFlow<()> {
        match node {
            Stmt::Block(Block { span, .. }) => self.blocks.push(*span),
            Stmt::LocalDeclaration { ty, declarators, .. } => {
                self.locals.extend(declarators.iter().map(|d| (ty, d)));
            }
            Stmt::Other { span, .. } => self.blocks.push(*span),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn visit_lambda(&mut self, node: &'a Lambda, _ctx: &VisitorContext) -> ControlFlow<()> {
        if let Body::Block(block) = node.body.as_ref() {
            self.blocks.push(block.span);
        }
        self.lambdas.push(node);
        ControlFlow::Continue(())
    }
}

fn keyword_for(qualified: &str) -> Option<&'static str> {
    Some(match qualified {
        "System.Object" => "object",
        "System.String" => "string",
        "System.Boolean" => "bool",
        "System.Char" => "char",
        "System.SByte" => "sbyte",
        "System.Byte" => "byte",
        "System.Int16" => "short",
        "System.UInt16" => "ushort",
        "System.Int32" => "int",
        "System.UInt32" => "uint",
        "System.Int64" => "long",
        "System.UInt64" => "ulong",
        "System.Single" => "float",
        "System.Double" => "double",
        "System.Decimal" => "decimal",
        "System.Void" => "void",
        _ => return None,
    })
}
