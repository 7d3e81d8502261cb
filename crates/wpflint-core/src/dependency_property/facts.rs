//! Everything the engine knows about each dependency property declared in a file.

use std::ops::ControlFlow;

use serde::Serialize;

use super::accessors::{attached_accessors, ClrProperty};
use super::alias::{self, strip_conversion};
use super::backing::{BackingKind, BackingMember};
use super::callbacks::{expected_name, CallbackKind, CallbackReference};
use super::metadata::PropertyMetadataCall;
use super::registration::{self, RegistrationCall, RegistrationKind};
use crate::cancellation::CancellationToken;
use crate::semantic::{SemanticModel, SymbolId, SymbolKind, TypeRef};
use crate::syntax::{Argument, Expr, FieldDecl, PropertyDecl};
use crate::visitor::{self, AstVisitor, VisitorContext};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyPropertyFacts {
    pub member: String,
    pub containing_type: String,
    pub kind: BackingKind,
    pub line: usize,
    pub column: usize,
    pub registration: Option<RegistrationKind>,
    /// `Some("")` for an explicit empty name; `None` when it cannot be resolved.
    pub registered_name: Option<String>,
    /// The name comes from another owner through `AddOwner`.
    pub name_inherited: bool,
    pub registered_type: Option<String>,
    /// `ownerType` of the member's own `AddOwner`, of the registration otherwise.
    pub owner_type: Option<String>,
    pub clr_property: Option<ClrPropertyFacts>,
    pub attached: Option<AttachedFacts>,
    pub callbacks: Vec<CallbackFacts>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClrPropertyFacts {
    pub name: String,
    pub property_type: String,
    /// Getter and setter pass through to the same dependency property.
    pub valid_pair: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachedFacts {
    pub get: Option<String>,
    pub set: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallbackFacts {
    pub kind: CallbackKind,
    pub name: String,
    pub expected_name: Option<String>,
    /// A method with a fitting signature was found.
    pub resolved: bool,
}

/// Backing members declared in the file, in source order.
pub fn backing_members(model: &SemanticModel<'_, '_>) -> Vec<BackingMember> {
    struct Collector<'m, 'c, 'a> {
        model: &'m SemanticModel<'c, 'a>,
        found: Vec<BackingMember>,
    }

    impl Collector<'_, '_, '_> {
        fn push(&mut self, symbol: Option<SymbolId>) {
            if let Some(backing) = symbol.and_then(|s| BackingMember::match_symbol(s, self.model.compilation())) {
                self.found.push(backing);
            }
        }
    }

    impl<'a> AstVisitor<'a> for Collector<'_, '_, '_> {
        fn visit_field(&mut self, node: &'a FieldDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
            for declarator in &node.declarators {
                let symbol = self.model.declared_symbol(&declarator.name);
                self.push(symbol);
            }
            ControlFlow::Continue(())
        }

        fn visit_property(&mut self, node: &'a PropertyDecl, _ctx: &VisitorContext) -> ControlFlow<()> {
            let symbol = self.model.declared_symbol(&node.name);
            self.push(symbol);
            ControlFlow::Continue(())
        }
    }

    let mut collector = Collector {
        model,
        found: Vec::new(),
    };
    let _ = visitor::walk_ast(model.file().unit(), &mut collector, &VisitorContext::new(model.file()));
    collector.found
}

/// Facts for every backing member declared in the file.
pub fn collect_facts(model: &SemanticModel<'_, '_>, cancellation: &CancellationToken) -> Vec<DependencyPropertyFacts> {
    backing_members(model)
        .into_iter()
        .take_while(|_| !cancellation.is_cancelled())
        .map(|backing| facts_for(backing, model, cancellation))
        .collect()
}

pub fn facts_for(
    backing: BackingMember,
    model: &SemanticModel<'_, '_>,
    cancellation: &CancellationToken,
) -> DependencyPropertyFacts {
    let compilation = model.compilation();
    let symbols = compilation.symbols();
    let display = |ty: TypeRef| compilation.display_type(&ty);
    let (line, column) = backing
        .name_span(compilation)
        .map_or((0, 0), |span| model.file().location(span.lo));

    let resolved = alias::resolve_registration(backing, compilation, cancellation);
    let registered = backing.registered_name(model, cancellation);
    let registered_name = registered.as_ref().map(|r| r.name.clone());
    let lookup_name = registered.as_ref().map(|r| r.name.as_str()).filter(|name| !name.is_empty());
    let registration = resolved.as_ref().map(|r| r.call.kind);
    let is_attached = registration.is_some_and(RegistrationKind::is_attached);

    let clr_property = if is_attached {
        None
    } else {
        clr_property_facts(backing, lookup_name, model)
    };
    let attached = if is_attached {
        attached_accessors(backing, model, cancellation).map(|accessors| AttachedFacts {
            get: accessors.get.map(|a| a.decl.name.text.clone()),
            set: accessors.set.map(|a| a.decl.name.text.clone()),
        })
    } else {
        None
    };

    DependencyPropertyFacts {
        member: backing.name(compilation).to_string(),
        containing_type: symbols.qualified_name(backing.containing_type),
        kind: backing.kind,
        line,
        column,
        registration,
        registered_name,
        name_inherited: registered.as_ref().is_some_and(|r| r.argument.is_none()),
        registered_type: resolved
            .as_ref()
            .and_then(|r| r.call.registered_type(compilation))
            .map(display),
        owner_type: resolved
            .as_ref()
            .and_then(|r| r.owning_call().registered_owner(compilation))
            .map(display),
        clr_property,
        attached,
        callbacks: callback_facts(backing, lookup_name, model),
    }
}

fn clr_property_facts(
    backing: BackingMember,
    registered_name: Option<&str>,
    model: &SemanticModel<'_, '_>,
) -> Option<ClrPropertyFacts> {
    let compilation = model.compilation();
    let symbols = compilation.symbols();
    let by_name = registered_name.and_then(|name| {
        match symbols.members_named(backing.containing_type, name) {
            [single] if symbols.get(*single).kind == SymbolKind::Property => Some(*single),
            _ => None,
        }
    });
    let symbol = by_name.or_else(|| backing.clr_property_by_convention(compilation))?;
    let property = symbols.get(symbol);
    let valid_pair = ClrProperty::match_symbol(symbol, compilation)
        .and_then(|clr| {
            let model = model.for_symbol(symbol)?;
            clr.backing_member(&model)
        })
        .is_some_and(|read| {
            read == backing || (backing.is_key() && alias::property_for_key(backing, compilation) == Some(read))
        });
    Some(ClrPropertyFacts {
        name: property.name.clone(),
        property_type: compilation.display_type(&property.ty),
        valid_pair,
    })
}

/// Callbacks passed in the member's own registration or `AddOwner` call.
fn callback_facts(
    backing: BackingMember,
    registered_name: Option<&str>,
    model: &SemanticModel<'_, '_>,
) -> Vec<CallbackFacts> {
    let compilation = model.compilation();
    let Some(value) = backing.value(compilation) else {
        return Vec::new();
    };
    let model = value.model;
    let Expr::Invocation(invocation) = strip_conversion(value.expr) else {
        return Vec::new();
    };
    let Some(call) = registration::match_any(invocation, &model)
        .or_else(|| registration::match_add_owner(invocation, &model))
    else {
        return Vec::new();
    };

    callback_arguments(&call, &model)
        .into_iter()
        .filter_map(|(kind, argument)| {
            let reference = CallbackReference::match_argument(argument, kind, &model)?;
            Some(CallbackFacts {
                kind,
                name: reference.name().to_string(),
                expected_name: registered_name.map(|name| expected_name(kind, name)),
                resolved: reference.method.is_some(),
            })
        })
        .collect()
}

/// Callback arguments of a registration: those of its metadata and the validate callback.
pub fn callback_arguments<'a>(
    call: &RegistrationCall<'a>,
    model: &SemanticModel<'_, 'a>,
) -> Vec<(CallbackKind, &'a Argument)> {
    let mut arguments = Vec::new();
    if let Some(metadata) = call.metadata.and_then(|m| PropertyMetadataCall::match_argument(m, model)) {
        arguments.extend(metadata.property_changed.map(|a| (CallbackKind::PropertyChanged, a)));
        arguments.extend(metadata.coerce_value.map(|a| (CallbackKind::CoerceValue, a)));
    }
    arguments.extend(call.validate_value_callback.map(|a| (CallbackKind::ValidateValue, a)));
    arguments
}
