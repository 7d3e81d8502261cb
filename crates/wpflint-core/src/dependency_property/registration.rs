//! Matching of `DependencyProperty.Register*`, `AddOwner` and `OverrideMetadata` calls.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::catalog::{
    QualifiedMember, ADD_OWNER, KEY_OVERRIDE_METADATA, OVERRIDE_METADATA, REGISTER,
    REGISTER_ATTACHED, REGISTER_ATTACHED_READ_ONLY, REGISTER_READ_ONLY,
};
use crate::semantic::{Compilation, ConstantValue, FileId, SemanticModel, SymbolId, TypeRef};
use crate::syntax::{Argument, Expr, Invocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationKind {
    Register,
    RegisterReadOnly,
    RegisterAttached,
    RegisterAttachedReadOnly,
    AddOwner,
    OverrideMetadata,
}

impl RegistrationKind {
    pub const REGISTER_KINDS: [RegistrationKind; 4] = [
        RegistrationKind::Register,
        RegistrationKind::RegisterReadOnly,
        RegistrationKind::RegisterAttached,
        RegistrationKind::RegisterAttachedReadOnly,
    ];

    pub fn method_name(self) -> &'static str {
        match self {
            RegistrationKind::Register => "Register",
            RegistrationKind::RegisterReadOnly => "RegisterReadOnly",
            RegistrationKind::RegisterAttached => "RegisterAttached",
            RegistrationKind::RegisterAttachedReadOnly => "RegisterAttachedReadOnly",
            RegistrationKind::AddOwner => "AddOwner",
            RegistrationKind::OverrideMetadata => "OverrideMetadata",
        }
    }

    fn members(self) -> &'static [QualifiedMember] {
        match self {
            RegistrationKind::Register => &[REGISTER],
            RegistrationKind::RegisterReadOnly => &[REGISTER_READ_ONLY],
            RegistrationKind::RegisterAttached => &[REGISTER_ATTACHED],
            RegistrationKind::RegisterAttachedReadOnly => &[REGISTER_ATTACHED_READ_ONLY],
            RegistrationKind::AddOwner => &[ADD_OWNER],
            RegistrationKind::OverrideMetadata => &[OVERRIDE_METADATA, KEY_OVERRIDE_METADATA],
        }
    }

    fn arity(self) -> RangeInclusive<usize> {
        match self {
            RegistrationKind::Register | RegistrationKind::RegisterAttached => 3..=5,
            RegistrationKind::RegisterReadOnly | RegistrationKind::RegisterAttachedReadOnly => 4..=5,
            RegistrationKind::AddOwner => 1..=2,
            RegistrationKind::OverrideMetadata => 2..=3,
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterReadOnly | RegistrationKind::RegisterAttachedReadOnly
        )
    }

    pub fn is_attached(self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterAttached | RegistrationKind::RegisterAttachedReadOnly
        )
    }

    /// One of the four calls that create a new property.
    pub fn is_register(self) -> bool {
        Self::REGISTER_KINDS.contains(&self)
    }
}

/// A matched registration call with its arguments mapped to positions.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationCall<'a> {
    pub kind: RegistrationKind,
    pub invocation: &'a Invocation,
    pub method: SymbolId,
    /// File containing the invocation.
    pub file: FileId,
    pub name: Option<&'a Argument>,
    pub property_type: Option<&'a Argument>,
    /// `ownerType` of Register* and AddOwner, `forType` of OverrideMetadata.
    pub owner_type: Option<&'a Argument>,
    pub metadata: Option<&'a Argument>,
    pub validate_value_callback: Option<&'a Argument>,
    /// Property the call is made on, for `AddOwner` and `OverrideMetadata`.
    pub receiver: Option<&'a Expr>,
}

impl PartialEq for RegistrationCall<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.invocation, other.invocation)
    }
}

impl Eq for RegistrationCall<'_> {}

impl<'a> RegistrationCall<'a> {
    /// Constant name argument, e.g. `Bar` for both `"Bar"` and `nameof(Bar)`.
    pub fn registered_name(&self, compilation: &Compilation<'a>) -> Option<String> {
        let model = compilation.model(self.file)?;
        match model.constant_value(&self.name?.expr)? {
            ConstantValue::String(name) => Some(name),
            _ => None,
        }
    }

    /// Type of the `typeof(...)` property type argument.
    pub fn registered_type(&self, compilation: &Compilation<'a>) -> Option<TypeRef> {
        type_of_argument(self.property_type?, compilation, self.file)
    }

    /// Type of the `typeof(...)` owner argument.
    pub fn registered_owner(&self, compilation: &Compilation<'a>) -> Option<TypeRef> {
        type_of_argument(self.owner_type?, compilation, self.file)
    }
}

fn type_of_argument(argument: &Argument, compilation: &Compilation<'_>, file: FileId) -> Option<TypeRef> {
    let Expr::TypeOf(type_of) = argument.expr.unparenthesized() else {
        return None;
    };
    let ty = compilation.model(file)?.bind_type(&type_of.ty);
    (!matches!(ty, TypeRef::Unknown)).then_some(ty)
}

pub fn match_register<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    match_kind(RegistrationKind::Register, invocation, model)
}

pub fn match_register_read_only<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    match_kind(RegistrationKind::RegisterReadOnly, invocation, model)
}

pub fn match_register_attached<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    match_kind(RegistrationKind::RegisterAttached, invocation, model)
}

pub fn match_register_attached_read_only<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    match_kind(RegistrationKind::RegisterAttachedReadOnly, invocation, model)
}

pub fn match_add_owner<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    match_kind(RegistrationKind::AddOwner, invocation, model)
}

pub fn match_override_metadata<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    match_kind(RegistrationKind::OverrideMetadata, invocation, model)
}

/// Any of the four Register* calls.
pub fn match_any<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    RegistrationKind::REGISTER_KINDS
        .iter()
        .find_map(|&kind| match_kind(kind, invocation, model))
}

pub fn match_kind<'a>(
    kind: RegistrationKind,
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<RegistrationCall<'a>> {
    if invocation.method_name() != Some(kind.method_name())
        || !kind.arity().contains(&invocation.arguments.len())
    {
        return None;
    }

    let compilation = model.compilation();
    let is_kind = |method: SymbolId| kind.members().iter().any(|m| m.matches(method, compilation));
    let method = match model.resolve_invocation(invocation) {
        Some(method) => method,
        None => {
            // Unresolvable argument types leave ties; accept when only one overload fits the shape.
            let fitting: Vec<SymbolId> = model
                .method_group(&invocation.callee)
                .into_iter()
                .filter(|&m| model.map_arguments(m, &invocation.arguments).is_some())
                .collect();
            match fitting.as_slice() {
                [single] => *single,
                _ => return None,
            }
        }
    };
    if !is_kind(method) {
        return None;
    }

    let parameters = model.map_arguments(method, &invocation.arguments)?;
    let receiver = match kind {
        RegistrationKind::AddOwner | RegistrationKind::OverrideMetadata => {
            match invocation.callee.as_ref() {
                Expr::MemberAccess(access) => Some(access.target.as_ref()),
                _ => None,
            }
        }
        _ => None,
    };

    let mut call = RegistrationCall {
        kind,
        invocation,
        method,
        file: model.file_id(),
        name: None,
        property_type: None,
        owner_type: None,
        metadata: None,
        validate_value_callback: None,
        receiver,
    };
    for (argument, parameter) in invocation.arguments.iter().zip(parameters) {
        let slot = match model.symbol(parameter).name.as_str() {
            "name" => &mut call.name,
            "propertyType" => &mut call.property_type,
            "ownerType" | "forType" => &mut call.owner_type,
            "typeMetadata" | "defaultMetadata" => &mut call.metadata,
            "validateValueCallback" => &mut call.validate_value_callback,
            _ => continue,
        };
        *slot = Some(argument);
    }

    if kind.is_register() && (call.name.is_none() || call.property_type.is_none() || call.owner_type.is_none()) {
        return None;
    }
    Some(call)
}
