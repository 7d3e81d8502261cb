//! Import scopes for name binding
//!
//! Each compilation unit and each namespace declaration opens an import scope that records
//! its namespace, its `using` directives (already resolved) and its parent scope. Type name
//! lookup walks the scope chain from the innermost declaration outwards.

use id_arena::{Arena, Id};

use super::symbols::{FileId, SymbolId, TypeRef};
use crate::syntax::Span;

pub type ScopeId = Id<ImportScope>;

#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceOrType {
    Namespace(SymbolId),
    Type(TypeRef),
}

#[derive(Debug)]
pub struct ImportScope {
    pub id: ScopeId,
    pub namespace: SymbolId,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub file: FileId,
    pub span: Span,
    pub aliases: Vec<(String, NamespaceOrType)>,
    pub imported_namespaces: Vec<SymbolId>,
    pub static_imports: Vec<SymbolId>,
}

impl ImportScope {
    pub fn alias(&self, name: &str) -> Option<&NamespaceOrType> {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, target)| target)
    }
}

pub struct ScopeTree {
    arena: Arena<ImportScope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    pub fn create_scope(
        &mut self,
        namespace: SymbolId,
        parent: Option<ScopeId>,
        file: FileId,
        span: Span,
    ) -> ScopeId {
        let id = self.arena.alloc_with_id(|id| ImportScope {
            id,
            namespace,
            parent,
            children: Vec::new(),
            file,
            span,
            aliases: Vec::new(),
            imported_namespaces: Vec::new(),
            static_imports: Vec::new(),
        });

        if let Some(parent_id) = parent {
            self.arena[parent_id].children.push(id);
        }

        id
    }

    pub fn get(&self, id: ScopeId) -> &ImportScope {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut ImportScope {
        &mut self.arena[id]
    }

    pub fn parent(&self, id: ScopeId) -> Option<&ImportScope> {
        self.arena[id].parent.map(|p| &self.arena[p])
    }

    pub fn ancestors(&self, id: ScopeId) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: Some(id),
        }
    }

    /// Innermost scope among `root` and its descendants whose span contains `offset`.
    pub fn innermost_at(&self, root: ScopeId, offset: u32) -> ScopeId {
        let mut current = root;
        'descend: loop {
            for &child in &self.arena[current].children {
                if self.arena[child].span.contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }
}

pub struct AncestorIter<'a> {
    tree: &'a ScopeTree,
    current: Option<ScopeId>,
}

impl<'a> Iterator for AncestorIter<'a> {
    type Item = &'a ImportScope;

    fn next(&mut self) -> Option<Self::Item> {
        let current_id = self.current?;
        let scope = &self.tree.arena[current_id];
        self.current = scope.parent;
        Some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::symbols::{SymbolKind, SymbolTable};

    fn namespaces() -> (SymbolTable, SymbolId, SymbolId) {
        let mut table = SymbolTable::new();
        let global = table.declare("", SymbolKind::Namespace, None);
        let demo = table.declare("Demo", SymbolKind::Namespace, Some(global));
        (table, global, demo)
    }

    #[test]
    fn nested_scopes_have_correct_parent() {
        let (_table, global, demo) = namespaces();
        let mut tree = ScopeTree::new();
        let unit = tree.create_scope(global, None, FileId(0), Span::new(0, 100));
        let ns = tree.create_scope(demo, Some(unit), FileId(0), Span::new(10, 90));

        assert_eq!(tree.get(ns).parent, Some(unit));
        assert_eq!(tree.get(unit).children, vec![ns]);
        assert_eq!(tree.parent(ns).map(|s| s.namespace), Some(global));
    }

    #[test]
    fn ancestors_iterator_traverses_parent_chain() {
        let (_table, global, demo) = namespaces();
        let mut tree = ScopeTree::new();
        let unit = tree.create_scope(global, None, FileId(0), Span::new(0, 100));
        let outer = tree.create_scope(demo, Some(unit), FileId(0), Span::new(10, 90));
        let inner = tree.create_scope(demo, Some(outer), FileId(0), Span::new(20, 80));

        let chain: Vec<ScopeId> = tree.ancestors(inner).map(|s| s.id).collect();

        assert_eq!(chain, vec![inner, outer, unit]);
    }

    #[test]
    fn innermost_at_descends_by_span() {
        let (_table, global, demo) = namespaces();
        let mut tree = ScopeTree::new();
        let unit = tree.create_scope(global, None, FileId(0), Span::new(0, 100));
        let first = tree.create_scope(demo, Some(unit), FileId(0), Span::new(10, 40));
        let second = tree.create_scope(demo, Some(unit), FileId(0), Span::new(50, 90));

        assert_eq!(tree.innermost_at(unit, 5), unit);
        assert_eq!(tree.innermost_at(unit, 20), first);
        assert_eq!(tree.innermost_at(unit, 60), second);
    }

    #[test]
    fn alias_lookup_by_name() {
        let (_table, global, demo) = namespaces();
        let mut tree = ScopeTree::new();
        let unit = tree.create_scope(global, None, FileId(0), Span::new(0, 100));
        tree.get_mut(unit)
            .aliases
            .push(("D".to_string(), NamespaceOrType::Namespace(demo)));

        assert_eq!(
            tree.get(unit).alias("D"),
            Some(&NamespaceOrType::Namespace(demo))
        );
        assert!(tree.get(unit).alias("X").is_none());
    }
}
