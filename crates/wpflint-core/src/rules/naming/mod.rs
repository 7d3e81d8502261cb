//! Naming rules: backing members, CLR wrappers, attached accessors and callbacks follow
//! the name a property was registered with.

pub mod attached_accessor_name;
pub mod backing_field_name;
pub mod backing_key_name;
pub mod clr_property_name;
pub mod coerce_value_callback_name;
pub mod property_changed_callback_name;
pub mod validate_value_callback_name;

pub use attached_accessor_name::AttachedAccessorName;
pub use backing_field_name::BackingFieldName;
pub use backing_key_name::BackingKeyName;
pub use clr_property_name::ClrPropertyName;
pub use coerce_value_callback_name::CoerceValueCallbackName;
pub use property_changed_callback_name::PropertyChangedCallbackName;
pub use validate_value_callback_name::ValidateValueCallbackName;

use crate::dependency_property::{
    backing_members, callback_arguments, enclosing_backing_member, CallbackKind,
    CallbackReference,
};
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::{registration_calls, rename_fix};
use crate::rules::{RuleContext, RuleMetadata};

/// Backing members (keys or plain properties) whose name is not `{Name}Property` /
/// `{Name}PropertyKey`.
fn misnamed_backing_members(
    ctx: &RuleContext<'_, '_, '_>,
    metadata: &RuleMetadata,
    keys: bool,
) -> Vec<Diagnostic> {
    let model = ctx.model;
    let compilation = ctx.compilation();

    backing_members(&model)
        .into_iter()
        .filter(|backing| backing.is_key() == keys)
        .take_while(|_| !ctx.is_cancelled())
        .filter_map(|backing| {
            let registered = backing.registered_name(&model, ctx.cancellation)?;
            if registered.name.is_empty() {
                return None;
            }
            let expected = format!("{}{}", registered.name, backing.kind.suffix());
            let actual = backing.name(compilation);
            if actual == expected {
                return None;
            }
            let span = backing.name_span(compilation)?;
            let mut diagnostic = Diagnostic::at_span(
                metadata.id,
                metadata.severity,
                format!(
                    "`{actual}` should be named `{expected}` to match the registered name `{}`",
                    registered.name
                ),
                ctx.file(),
                span,
            )
            .with_suggestion(format!("Rename to `{expected}`"));
            if let Some(fix) = rename_fix(backing.symbol, &expected, &model) {
                diagnostic = diagnostic.with_fix(fix);
            }
            Some(diagnostic)
        })
        .collect()
}

/// Callback methods of `kind` whose name does not follow the registered name.
///
/// Methods shared by several registrations are left alone.
fn misnamed_callbacks(
    ctx: &RuleContext<'_, '_, '_>,
    metadata: &RuleMetadata,
    kind: CallbackKind,
) -> Vec<Diagnostic> {
    let model = ctx.model;

    registration_calls(ctx)
        .iter()
        .flat_map(|call| callback_arguments(call, &model))
        .filter(|(argument_kind, _)| *argument_kind == kind)
        .filter_map(|(_, argument)| {
            let reference = CallbackReference::match_argument(argument, kind, &model)?;
            let method = reference.method?;
            reference.declaration_span(&model)?;
            let backing = enclosing_backing_member(argument.span, &model)?;
            let registered = backing.registered_name(&model, ctx.cancellation)?;
            if registered.name.is_empty() || kind.accepts(reference.name(), &registered.name) {
                return None;
            }
            if model.find_references(method).len() > 1 {
                return None;
            }

            let expected = kind.expected_name(&registered.name);
            let mut diagnostic = Diagnostic::at_span(
                metadata.id,
                metadata.severity,
                format!(
                    "Callback `{}` of `{}` should be named `{expected}`",
                    reference.name(),
                    backing.name(ctx.compilation())
                ),
                ctx.file(),
                reference.identifier.span,
            )
            .with_suggestion(format!("Rename to `{expected}`"));
            if let Some(fix) = rename_fix(method, &expected, &model) {
                diagnostic = diagnostic.with_fix(fix);
            }
            Some(diagnostic)
        })
        .collect()
}
