//! Symbol table for declarations of the whole compilation
//!
//! Every namespace, type, member, parameter and local gets one [`Symbol`] in an arena.
//! Symbols are compared by [`SymbolId`]; two members with the same name in different
//! types are different symbols.

use std::collections::HashMap;

use id_arena::{Arena, Id};

use crate::syntax::{Span, TypeKind};

pub type SymbolId = Id<Symbol>;

/// Index of a source file inside its compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Namespace,
    Type(TypeKind),
    Field,
    Property,
    Method,
    Constructor,
    Parameter,
    Local,
}

impl SymbolKind {
    pub fn is_type(&self) -> bool {
        matches!(self, SymbolKind::Type(_))
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            SymbolKind::Field | SymbolKind::Property | SymbolKind::Method | SymbolKind::Constructor
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    #[default]
    Private,
}

impl Accessibility {
    pub fn from_keywords(has: impl Fn(&str) -> bool, default: Accessibility) -> Self {
        match (
            has("public"),
            has("protected"),
            has("internal"),
            has("private"),
        ) {
            (true, _, _, _) => Accessibility::Public,
            (_, true, true, _) => Accessibility::ProtectedInternal,
            (_, true, _, true) => Accessibility::PrivateProtected,
            (_, true, _, _) => Accessibility::Protected,
            (_, _, true, _) => Accessibility::Internal,
            (_, _, _, true) => Accessibility::Private,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolFlags {
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_const: bool,
    pub is_abstract: bool,
    pub has_getter: bool,
    pub has_setter: bool,
    pub has_default: bool,
    pub is_params: bool,
    pub is_implicit: bool,
}

/// A type as the semantic model sees it.
///
/// `Unknown` stands for anything the model cannot bind; every conversion query treats it
/// as compatible so that unresolved code never produces a type mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named { symbol: SymbolId, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    TypeParameter(String),
    Null,
    Unknown,
}

impl TypeRef {
    pub fn named(symbol: SymbolId) -> Self {
        TypeRef::Named {
            symbol,
            args: Vec::new(),
        }
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        match self {
            TypeRef::Named { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeRef::Unknown | TypeRef::TypeParameter(_))
    }
}

#[derive(Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub container: Option<SymbolId>,
    pub flags: SymbolFlags,
    pub accessibility: Accessibility,
    /// Field, property, parameter and local type; return type of methods.
    pub ty: TypeRef,
    pub parameters: Vec<SymbolId>,
    pub type_parameters: Vec<String>,
    pub base_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<SymbolId>,
    pub file: Option<FileId>,
    /// Whole declaration node.
    pub span: Option<Span>,
    /// Declared identifier.
    pub name_span: Option<Span>,
    /// Region in which a parameter or local is visible.
    pub scope: Option<Span>,
}

impl Symbol {
    pub fn is_static(&self) -> bool {
        self.flags.is_static || self.flags.is_const
    }

    pub fn type_kind(&self) -> Option<TypeKind> {
        match self.kind {
            SymbolKind::Type(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_from_source(&self) -> bool {
        self.file.is_some()
    }
}

pub struct SymbolTable {
    arena: Arena<Symbol>,
    by_container: HashMap<SymbolId, HashMap<String, Vec<SymbolId>>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_container: HashMap::new(),
        }
    }

    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        container: Option<SymbolId>,
    ) -> SymbolId {
        let id = self.arena.alloc_with_id(|id| Symbol {
            id,
            name: name.to_string(),
            kind,
            container,
            flags: SymbolFlags::default(),
            accessibility: Accessibility::default(),
            ty: TypeRef::Unknown,
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            base_type: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            file: None,
            span: None,
            name_span: None,
            scope: None,
        });

        if let Some(container_id) = container {
            if !matches!(kind, SymbolKind::Parameter | SymbolKind::Local) {
                self.arena[container_id].members.push(id);
                self.by_container
                    .entry(container_id)
                    .or_default()
                    .entry(name.to_string())
                    .or_default()
                    .push(id);
            }
        }

        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id]
    }

    /// Members of `container` declared with `name`, in declaration order.
    pub fn members_named(&self, container: SymbolId, name: &str) -> &[SymbolId] {
        self.by_container
            .get(&container)
            .and_then(|members| members.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nested type or namespace of `container` with the given name and generic arity.
    pub fn child_type_or_namespace(
        &self,
        container: SymbolId,
        name: &str,
        arity: usize,
    ) -> Option<SymbolId> {
        self.members_named(container, name).iter().copied().find(|&id| {
            let symbol = self.get(id);
            match symbol.kind {
                SymbolKind::Namespace => arity == 0,
                SymbolKind::Type(_) => symbol.type_parameters.len() == arity,
                _ => false,
            }
        })
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.arena.iter().map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// `ty` followed by its base types, nearest first.
    pub fn base_chain(&self, ty: SymbolId) -> BaseChain<'_> {
        BaseChain {
            table: self,
            current: Some(ty),
            remaining: MAX_BASE_DEPTH,
        }
    }

    /// Nearest enclosing type of a member, parameter or local, or the type itself.
    pub fn containing_type(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = Some(id);
        while let Some(symbol_id) = current {
            let symbol = self.get(symbol_id);
            if symbol.kind.is_type() {
                return Some(symbol_id);
            }
            current = symbol.container;
        }
        None
    }

    /// Dotted name including containing namespaces and types, e.g. `System.Windows.DependencyProperty`.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(symbol_id) = current {
            let symbol = self.get(symbol_id);
            if symbol.name.is_empty() {
                break;
            }
            parts.push(symbol.name.as_str());
            current = symbol.container;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Namespace-qualified name with generic arity markers, e.g. `System.Nullable`1`.
    pub fn metadata_name(&self, id: SymbolId) -> String {
        let symbol = self.get(id);
        let own = if symbol.type_parameters.is_empty() {
            symbol.name.clone()
        } else {
            format!("{}`{}", symbol.name, symbol.type_parameters.len())
        };
        match symbol.container {
            Some(container) if !self.get(container).name.is_empty() => {
                let separator = if self.get(container).kind.is_type() {
                    "+"
                } else {
                    "."
                };
                format!("{}{}{}", self.metadata_name(container), separator, own)
            }
            _ => own,
        }
    }
}

/// Bound on inheritance depth; malformed code may declare cyclic bases.
const MAX_BASE_DEPTH: usize = 64;

pub struct BaseChain<'a> {
    table: &'a SymbolTable,
    current: Option<SymbolId>,
    remaining: usize,
}

impl Iterator for BaseChain<'_> {
    type Item = SymbolId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.current?;
        self.current = self
            .table
            .get(current)
            .base_type
            .as_ref()
            .and_then(TypeRef::symbol)
            .filter(|&base| base != current);
        Some(current)
    }
}
