//! Recovers dependency property declarations from syntax and the semantic model.
//!
//! Every query answers `None` when the code does not have the expected shape or a symbol
//! cannot be resolved; nothing here logs or panics on malformed input.

pub mod accessors;
pub mod alias;
pub mod backing;
pub mod callbacks;
pub mod facts;
pub mod metadata;
pub mod registration;

pub use accessors::{
    attached_accessors, find_value_calls, match_any_value_call, match_attached_get,
    match_attached_set, match_value_call, AccessorPair, AttachedAccessor, AttachedAccessors,
    ClrProperty, ValueCall, ValueCallKind,
};
pub use alias::{property_for_key, resolve_override, resolve_registration, Resolved};
pub use backing::{BackingKind, BackingMember, BackingValue, RegisteredName};
pub use callbacks::{
    enclosing_backing_member, expected_callback_name, expected_name, CallbackKind,
    CallbackReference,
};
pub use facts::{
    backing_members, callback_arguments, collect_facts, facts_for, AttachedFacts,
    CallbackFacts, ClrPropertyFacts, DependencyPropertyFacts,
};
pub use metadata::PropertyMetadataCall;
pub use registration::{RegistrationCall, RegistrationKind};
