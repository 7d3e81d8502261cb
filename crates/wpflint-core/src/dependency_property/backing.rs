//! Fields and properties that hold a `DependencyProperty` or `DependencyPropertyKey`.

use serde::Serialize;

use super::alias;
use crate::cancellation::CancellationToken;
use crate::catalog::{DEPENDENCY_PROPERTY, DEPENDENCY_PROPERTY_KEY};
use crate::semantic::{Compilation, Declaration, SemanticModel, SymbolId, SymbolKind, TypeRef};
use crate::syntax::{Argument, Body, Expr, Member, Span, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackingKind {
    Field,
    Property,
    KeyField,
    KeyProperty,
}

impl BackingKind {
    pub fn is_key(self) -> bool {
        matches!(self, BackingKind::KeyField | BackingKind::KeyProperty)
    }

    pub fn is_field(self) -> bool {
        matches!(self, BackingKind::Field | BackingKind::KeyField)
    }

    /// Expected suffix of the member name.
    pub fn suffix(self) -> &'static str {
        if self.is_key() { "PropertyKey" } else { "Property" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackingMember {
    pub symbol: SymbolId,
    pub containing_type: SymbolId,
    pub kind: BackingKind,
}

/// Name a property was registered with.
#[derive(Debug, Clone)]
pub struct RegisteredName<'a> {
    /// The name argument; `None` when the name is inherited through `AddOwner`.
    pub argument: Option<&'a Argument>,
    pub name: String,
}

/// The expression a backing member is assigned, with the model of its file.
pub struct BackingValue<'c, 'a> {
    pub expr: &'a Expr,
    pub model: SemanticModel<'c, 'a>,
}

impl BackingMember {
    /// Classifies a field or property whose type is `DependencyProperty` or
    /// `DependencyPropertyKey`.
    pub fn match_symbol(symbol: SymbolId, compilation: &Compilation<'_>) -> Option<Self> {
        let member = compilation.symbols().get(symbol);
        let is_key = if DEPENDENCY_PROPERTY.is_type(&member.ty, compilation) {
            false
        } else if DEPENDENCY_PROPERTY_KEY.is_type(&member.ty, compilation) {
            true
        } else {
            return None;
        };
        let kind = match (member.kind, is_key) {
            (SymbolKind::Field, false) => BackingKind::Field,
            (SymbolKind::Field, true) => BackingKind::KeyField,
            (SymbolKind::Property, false) => BackingKind::Property,
            (SymbolKind::Property, true) => BackingKind::KeyProperty,
            _ => return None,
        };
        Some(Self {
            symbol,
            containing_type: member.container?,
            kind,
        })
    }

    pub fn is_key(&self) -> bool {
        self.kind.is_key()
    }

    pub fn name<'c>(&self, compilation: &'c Compilation<'_>) -> &'c str {
        &compilation.symbols().get(self.symbol).name
    }

    /// Span of the declared identifier.
    pub fn name_span(&self, compilation: &Compilation<'_>) -> Option<Span> {
        compilation.symbols().get(self.symbol).name_span
    }

    /// Field initializer, property initializer or expression-bodied getter, or else the
    /// single assignment to the member in the static constructor of its type.
    pub fn value<'c, 'a>(&self, compilation: &'c Compilation<'a>) -> Option<BackingValue<'c, 'a>> {
        let model = compilation.model(compilation.symbols().get(self.symbol).file?)?;
        let declared = match compilation.declaration(self.symbol)? {
            Declaration::Field { declarator, .. } => declarator.initializer.as_ref(),
            Declaration::Property(property) => property
                .initializer
                .as_ref()
                .or(property.expression_body.as_ref())
                .or_else(|| single_expression(property.getter()?.body.as_ref()?)),
            _ => return None,
        };
        if let Some(expr) = declared {
            return Some(BackingValue { expr, model });
        }
        self.static_constructor_assignment(compilation)
    }

    fn static_constructor_assignment<'c, 'a>(
        &self,
        compilation: &'c Compilation<'a>,
    ) -> Option<BackingValue<'c, 'a>> {
        let mut found = None;
        for (file, decl) in compilation.type_parts(self.containing_type) {
            let model = compilation.model(file)?;
            let constructors = decl.members.iter().filter_map(|member| match member {
                Member::Constructor(ctor) if ctor.modifiers.is_static() => Some(ctor),
                _ => None,
            });
            for ctor in constructors {
                let Some(Body::Block(block)) = &ctor.body else {
                    continue;
                };
                for stmt in &block.statements {
                    let Stmt::Expression { expr: Expr::Assignment(assignment), .. } = stmt else {
                        continue;
                    };
                    if assignment.operator != "=" || model.symbol_info(&assignment.left) != Some(self.symbol) {
                        continue;
                    }
                    if found.is_some() {
                        return None;
                    }
                    found = Some(BackingValue {
                        expr: assignment.right.as_ref(),
                        model,
                    });
                }
            }
        }
        found
    }

    /// Registered name, following `DependencyPropertyKey.DependencyProperty` and `AddOwner`.
    pub fn registered_name<'a>(
        &self,
        model: &SemanticModel<'_, 'a>,
        cancellation: &CancellationToken,
    ) -> Option<RegisteredName<'a>> {
        let compilation = model.compilation();
        let resolved = alias::resolve_registration(*self, compilation, cancellation)?;
        let name = resolved.call.registered_name(compilation)?;
        Some(RegisteredName {
            argument: if resolved.inherited { None } else { resolved.call.name },
            name,
        })
    }

    /// Type passed as `typeof(...)` to the registration.
    pub fn registered_type(
        &self,
        model: &SemanticModel<'_, '_>,
        cancellation: &CancellationToken,
    ) -> Option<TypeRef> {
        let compilation = model.compilation();
        alias::resolve_registration(*self, compilation, cancellation)?
            .call
            .registered_type(compilation)
    }

    /// Member name without its `Property` / `PropertyKey` suffix.
    pub fn registered_name_by_convention<'c>(&self, compilation: &'c Compilation<'_>) -> Option<&'c str> {
        let name = self.name(compilation);
        name.strip_suffix("PropertyKey")
            .or_else(|| name.strip_suffix("Property"))
            .filter(|stripped| !stripped.is_empty())
    }

    /// The single CLR property of the containing type named by convention.
    ///
    /// `None` when no member or more than one member has that name.
    pub fn clr_property_by_convention(&self, compilation: &Compilation<'_>) -> Option<SymbolId> {
        let name = self.registered_name_by_convention(compilation)?;
        match compilation.symbols().members_named(self.containing_type, name) {
            [single] if compilation.symbols().get(*single).kind == SymbolKind::Property => Some(*single),
            _ => None,
        }
    }
}

/// The expression of `=> expr`, `{ return expr; }` or `{ expr; }`.
pub(crate) fn single_expression(body: &Body) -> Option<&Expr> {
    match body {
        Body::Expression(expr) => Some(expr),
        Body::Block(block) => match block.statements.as_slice() {
            [Stmt::Return { expr: Some(expr), .. }] | [Stmt::Expression { expr, .. }] => Some(expr),
            _ => None,
        },
    }
}
