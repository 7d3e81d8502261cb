//! Callback arguments of metadata and registration calls, and the names they should have.

use serde::Serialize;

use super::alias;
use super::backing::BackingMember;
use super::registration;
use crate::cancellation::CancellationToken;
use crate::catalog::{
    QualifiedType, COERCE_VALUE_CALLBACK, PROPERTY_CHANGED_CALLBACK, VALIDATE_VALUE_CALLBACK,
};
use crate::semantic::{Declaration, Lookup, SemanticModel, SymbolId, SymbolKind};
use crate::syntax::{Argument, Body, Expr, Ident, Span, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackKind {
    PropertyChanged,
    CoerceValue,
    ValidateValue,
}

impl CallbackKind {
    pub const ALL: [CallbackKind; 3] = [
        CallbackKind::PropertyChanged,
        CallbackKind::CoerceValue,
        CallbackKind::ValidateValue,
    ];

    pub fn delegate(self) -> &'static QualifiedType {
        match self {
            CallbackKind::PropertyChanged => &PROPERTY_CHANGED_CALLBACK,
            CallbackKind::CoerceValue => &COERCE_VALUE_CALLBACK,
            CallbackKind::ValidateValue => &VALIDATE_VALUE_CALLBACK,
        }
    }

    /// Parameter count of the delegate's `Invoke`.
    fn arity(self) -> usize {
        match self {
            CallbackKind::PropertyChanged | CallbackKind::CoerceValue => 2,
            CallbackKind::ValidateValue => 1,
        }
    }

    pub fn expected_name(self, registered_name: &str) -> String {
        expected_name(self, registered_name)
    }

    /// `name` is an accepted callback name for the property.
    pub fn accepts(self, name: &str, registered_name: &str) -> bool {
        name == expected_name(self, registered_name)
            || (self == CallbackKind::ValidateValue && name == format!("{registered_name}ValidateValue"))
    }
}

/// `On{Name}Changed`, `Coerce{Name}` or `Validate{Name}`.
pub fn expected_name(kind: CallbackKind, registered_name: &str) -> String {
    match kind {
        CallbackKind::PropertyChanged => format!("On{registered_name}Changed"),
        CallbackKind::CoerceValue => format!("Coerce{registered_name}"),
        CallbackKind::ValidateValue => format!("Validate{registered_name}"),
    }
}

/// A method passed as a callback: `OnBarChanged`, `this.OnBarChanged`, `Foo.OnBarChanged`
/// or `new PropertyChangedCallback(OnBarChanged)`.
#[derive(Debug, Clone, Copy)]
pub struct CallbackReference<'a> {
    pub argument: &'a Argument,
    /// The method name as written.
    pub identifier: &'a Ident,
    /// The method, when exactly one overload fits the delegate.
    pub method: Option<SymbolId>,
}

impl<'a> CallbackReference<'a> {
    pub fn match_argument(
        argument: &'a Argument,
        kind: CallbackKind,
        model: &SemanticModel<'_, 'a>,
    ) -> Option<Self> {
        let mut expr = argument.expr.unparenthesized();
        if let Expr::ObjectCreation(creation) = expr {
            if !kind.delegate().is_type(&model.bind_type(&creation.ty), model.compilation()) {
                return None;
            }
            let [inner] = creation.arguments.as_slice() else {
                return None;
            };
            expr = inner.expr.unparenthesized();
        }

        let identifier = match expr {
            Expr::Name(name) => &name.ident,
            Expr::MemberAccess(access) if is_this_or_type(&access.target, model) => &access.name,
            _ => return None,
        };
        let group = model.method_group(expr);
        if group.is_empty() {
            return None;
        }
        let fitting: Vec<SymbolId> = group
            .into_iter()
            .filter(|&m| model.symbol(m).parameters.len() == kind.arity())
            .collect();
        Some(Self {
            argument,
            identifier,
            method: match fitting.as_slice() {
                [single] => Some(*single),
                _ => None,
            },
        })
    }

    pub fn name(&self) -> &'a str {
        &self.identifier.text
    }

    /// Declared name span of the method, when it is declared in source.
    pub fn declaration_span(&self, model: &SemanticModel<'_, 'a>) -> Option<Span> {
        let method = model.symbol(self.method?);
        method.is_from_source().then_some(method.name_span).flatten()
    }
}

fn is_this_or_type(target: &Expr, model: &SemanticModel<'_, '_>) -> bool {
    match target.unparenthesized() {
        Expr::This(_) => true,
        expr @ (Expr::Name(_) | Expr::MemberAccess(_)) => {
            matches!(model.lookup(expr), Lookup::Symbol(id) if model.symbol(id).kind.is_type())
        }
        _ => false,
    }
}

/// Expected name of a callback passed somewhere inside a registration, e.g.
/// `OnBarChanged` for the callback in the metadata of `BarProperty`.
pub fn expected_callback_name(
    argument: &Argument,
    kind: CallbackKind,
    model: &SemanticModel<'_, '_>,
    cancellation: &CancellationToken,
) -> Option<String> {
    let backing = enclosing_backing_member(argument.span, model)?;
    let registered = backing.registered_name(model, cancellation)?;
    if registered.name.is_empty() {
        return None;
    }
    Some(expected_name(kind, &registered.name))
}

/// Backing member whose registration contains `span`: the field or property initializer
/// around it, or the static constructor statement assigning or overriding the member.
pub fn enclosing_backing_member(span: Span, model: &SemanticModel<'_, '_>) -> Option<BackingMember> {
    let compilation = model.compilation();
    let member = model.enclosing_member(span.lo)?;
    match model.symbol(member).kind {
        SymbolKind::Field | SymbolKind::Property => BackingMember::match_symbol(member, compilation),
        SymbolKind::Constructor if model.symbol(member).is_static() => {
            let Some(Declaration::Constructor(ctor)) = model.declaration(member) else {
                return None;
            };
            let Some(Body::Block(block)) = &ctor.body else {
                return None;
            };
            let stmt = block
                .statements
                .iter()
                .find(|stmt| stmt.span().encloses(span))?;
            match stmt {
                Stmt::Expression { expr: Expr::Assignment(assignment), .. } => {
                    alias::receiver_backing(&assignment.left, model)
                }
                Stmt::Expression { expr: Expr::Invocation(invocation), .. } => {
                    let call = registration::match_override_metadata(invocation, model)
                        .or_else(|| registration::match_add_owner(invocation, model))?;
                    alias::receiver_backing(call.receiver?, model)
                }
                _ => None,
            }
        }
        _ => None,
    }
}
