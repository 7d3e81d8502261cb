//! Usage rules: how backing fields are declared and how values are read and written.

pub mod accessors_use_same_property;
pub mod backing_field_static_readonly;
pub mod key_declared_before_property;
pub mod no_set_current_value_for_data_context;
pub mod no_side_effects_in_clr_accessors;
pub mod read_only_set_via_key;
pub mod set_mutable_with_set_current_value;
pub mod setter_uses_set_value;

pub use accessors_use_same_property::AccessorsUseSameProperty;
pub use backing_field_static_readonly::BackingFieldStaticReadonly;
pub use key_declared_before_property::KeyDeclaredBeforeProperty;
pub use no_set_current_value_for_data_context::NoSetCurrentValueForDataContext;
pub use no_side_effects_in_clr_accessors::NoSideEffectsInClrAccessors;
pub use read_only_set_via_key::ReadOnlySetViaKey;
pub use set_mutable_with_set_current_value::SetMutableWithSetCurrentValue;
pub use setter_uses_set_value::SetterUsesSetValue;

use crate::catalog::{DATA_CONTEXT_PROPERTY, STYLE_PROPERTY};
use crate::diagnostic::{Fix, TextEdit};
use crate::parser::ParsedFile;
use crate::rules::helpers::callee_name_span;
use crate::semantic::{Compilation, SymbolId};
use crate::syntax::Invocation;

/// Replaces the method name of `invocation`, keeping receiver and arguments.
fn rename_callee_edit(file: &ParsedFile, invocation: &Invocation, name: &str) -> Option<TextEdit> {
    Some(TextEdit::replace_span(file, callee_name_span(invocation)?, name))
}

fn rename_callee_fix(file: &ParsedFile, invocation: &Invocation, name: &str) -> Option<Fix> {
    Some(Fix::new(format!("Use {name}")).with_edit(rename_callee_edit(file, invocation, name)?))
}

/// `DataContextProperty` and `StyleProperty`, which are meant to be set with `SetValue`.
fn is_local_value_property(symbol: SymbolId, compilation: &Compilation<'_>) -> bool {
    DATA_CONTEXT_PROPERTY.matches(symbol, compilation) || STYLE_PROPERTY.matches(symbol, compilation)
}
