//! Correctness rules: registrations, wrappers and value calls agree on types and owners.

pub mod attached_accessor_type;
pub mod clr_property_type;
pub mod default_value_type;
pub mod owner_is_dependency_object;
pub mod registered_owner_type;
pub mod set_value_type;
pub mod use_nameof_for_registered_name;

pub use attached_accessor_type::AttachedAccessorType;
pub use clr_property_type::ClrPropertyType;
pub use default_value_type::DefaultValueType;
pub use owner_is_dependency_object::OwnerIsDependencyObject;
pub use registered_owner_type::RegisteredOwnerType;
pub use set_value_type::SetValueType;
pub use use_nameof_for_registered_name::UseNameofForRegisteredName;

use crate::catalog::SYSTEM_OBJECT;
use crate::dependency_property::alias::receiver_backing;
use crate::dependency_property::RegistrationCall;
use crate::diagnostic::{Fix, TextEdit};
use crate::parser::ParsedFile;
use crate::rules::RuleContext;
use crate::semantic::{Compilation, TypeRef};
use crate::syntax::Span;

/// How a type reads in a message: the C# spelling when there is one.
fn type_name(ty: &TypeRef, compilation: &Compilation<'_>) -> String {
    compilation
        .short_type_name(ty)
        .unwrap_or_else(|| compilation.display_type(ty))
}

/// Property type of a Register* call, or of the property `AddOwner` / `OverrideMetadata`
/// is called on.
fn registered_type_of(call: &RegistrationCall<'_>, ctx: &RuleContext<'_, '_, '_>) -> Option<TypeRef> {
    if call.kind.is_register() {
        return call.registered_type(ctx.compilation());
    }
    let backing = receiver_backing(call.receiver?, &ctx.model)?;
    backing.registered_type(&ctx.model, ctx.cancellation)
}

/// Types worth comparing: known and not a type parameter.
fn is_concrete(ty: &TypeRef) -> bool {
    !matches!(ty, TypeRef::Unknown | TypeRef::TypeParameter(_))
}

/// Every base of `ty` resolved up to `object`.
fn has_known_ancestry(ty: &TypeRef, compilation: &Compilation<'_>) -> bool {
    let (Some(symbol), Some(object)) = (ty.symbol(), SYSTEM_OBJECT.resolve(compilation)) else {
        return false;
    };
    compilation.symbols().base_chain(symbol).last() == Some(object)
}

/// Replaces the type written at `span` with `expected`.
fn retype_fix(
    file: &ParsedFile,
    span: Span,
    expected: &TypeRef,
    compilation: &Compilation<'_>,
) -> Option<Fix> {
    let name = compilation.short_type_name(expected)?;
    Some(Fix::new(format!("Change type to `{name}`")).with_edit(TextEdit::replace_span(file, span, name)))
}
