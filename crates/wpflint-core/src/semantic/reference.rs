//! Built-in reference model of the framework surface the analyzer needs.
//!
//! Real assemblies are never loaded. The core library types are always declared; the WPF
//! surface (`System.Windows`) is declared when the compilation is built with the framework
//! reference enabled. Types in member signatures are written as namespace-qualified
//! metadata names and bound after every reference type has been declared.

use std::collections::HashMap;

use super::symbols::{Accessibility, SymbolId, SymbolKind, SymbolTable, TypeRef};
use crate::syntax::TypeKind;

pub(crate) struct RefType {
    pub namespace: &'static str,
    pub name: &'static str,
    pub kind: TypeKind,
    pub type_parameters: &'static [&'static str],
    pub base: Option<&'static str>,
    pub is_static: bool,
    pub members: &'static [RefMember],
}

pub(crate) enum RefMember {
    Field {
        name: &'static str,
        ty: &'static str,
        is_static: bool,
        is_const: bool,
    },
    Property {
        name: &'static str,
        ty: &'static str,
        settable: bool,
    },
    Method {
        name: &'static str,
        returns: &'static str,
        params: &'static [(&'static str, &'static str)],
        is_static: bool,
    },
    Constructor {
        params: &'static [(&'static str, &'static str)],
    },
    EnumMember(&'static str),
}

const fn class(
    namespace: &'static str,
    name: &'static str,
    base: &'static str,
    members: &'static [RefMember],
) -> RefType {
    RefType {
        namespace,
        name,
        kind: TypeKind::Class,
        type_parameters: &[],
        base: Some(base),
        is_static: false,
        members,
    }
}

const fn value_type(namespace: &'static str, name: &'static str, members: &'static [RefMember]) -> RefType {
    RefType {
        namespace,
        name,
        kind: TypeKind::Struct,
        type_parameters: &[],
        base: Some("System.ValueType"),
        is_static: false,
        members,
    }
}

const fn enumeration(namespace: &'static str, name: &'static str, members: &'static [RefMember]) -> RefType {
    RefType {
        namespace,
        name,
        kind: TypeKind::Enum,
        type_parameters: &[],
        base: Some("System.Enum"),
        is_static: false,
        members,
    }
}

/// Delegates carry a single `Invoke` member describing their signature.
const fn delegate(namespace: &'static str, name: &'static str, invoke: &'static [RefMember]) -> RefType {
    RefType {
        namespace,
        name,
        kind: TypeKind::Delegate,
        type_parameters: &[],
        base: Some("System.MulticastDelegate"),
        is_static: false,
        members: invoke,
    }
}

const fn method(
    name: &'static str,
    returns: &'static str,
    params: &'static [(&'static str, &'static str)],
) -> RefMember {
    RefMember::Method {
        name,
        returns,
        params,
        is_static: false,
    }
}

const fn static_method(
    name: &'static str,
    returns: &'static str,
    params: &'static [(&'static str, &'static str)],
) -> RefMember {
    RefMember::Method {
        name,
        returns,
        params,
        is_static: true,
    }
}

const fn ctor(params: &'static [(&'static str, &'static str)]) -> RefMember {
    RefMember::Constructor { params }
}

const fn getter(name: &'static str, ty: &'static str) -> RefMember {
    RefMember::Property {
        name,
        ty,
        settable: false,
    }
}

const fn property(name: &'static str, ty: &'static str) -> RefMember {
    RefMember::Property {
        name,
        ty,
        settable: true,
    }
}

const fn static_field(name: &'static str, ty: &'static str) -> RefMember {
    RefMember::Field {
        name,
        ty,
        is_static: true,
        is_const: false,
    }
}

const fn constant(name: &'static str, ty: &'static str) -> RefMember {
    RefMember::Field {
        name,
        ty,
        is_static: true,
        is_const: true,
    }
}

const OBJECT: &str = "System.Object";
const STRING: &str = "System.String";
const BOOLEAN: &str = "System.Boolean";
const INT32: &str = "System.Int32";
const DOUBLE: &str = "System.Double";
const VOID: &str = "System.Void";
const TYPE: &str = "System.Type";
const DP: &str = "System.Windows.DependencyProperty";
const DP_KEY: &str = "System.Windows.DependencyPropertyKey";
const DO: &str = "System.Windows.DependencyObject";
const METADATA: &str = "System.Windows.PropertyMetadata";
const OPTIONS: &str = "System.Windows.FrameworkPropertyMetadataOptions";
const CHANGED: &str = "System.Windows.PropertyChangedCallback";
const COERCE: &str = "System.Windows.CoerceValueCallback";
const VALIDATE: &str = "System.Windows.ValidateValueCallback";
const BRUSH: &str = "System.Windows.Media.Brush";
const THICKNESS: &str = "System.Windows.Thickness";

const NAME: (&str, &str) = ("name", STRING);
const PROPERTY_TYPE: (&str, &str) = ("propertyType", TYPE);
const OWNER_TYPE: (&str, &str) = ("ownerType", TYPE);
const TYPE_METADATA: (&str, &str) = ("typeMetadata", METADATA);
const DEFAULT_METADATA: (&str, &str) = ("defaultMetadata", METADATA);
const VALIDATE_CALLBACK: (&str, &str) = ("validateValueCallback", VALIDATE);
const DEFAULT_VALUE: (&str, &str) = ("defaultValue", OBJECT);
const CHANGED_CALLBACK: (&str, &str) = ("propertyChangedCallback", CHANGED);
const COERCE_CALLBACK: (&str, &str) = ("coerceValueCallback", COERCE);
const FLAGS: (&str, &str) = ("flags", OPTIONS);
const ANIMATION_PROHIBITED: (&str, &str) = ("isAnimationProhibited", BOOLEAN);

pub(crate) const CORE_LIBRARY: &[RefType] = &[
    RefType {
        namespace: "System",
        name: "Object",
        kind: TypeKind::Class,
        type_parameters: &[],
        base: None,
        is_static: false,
        members: &[
            ctor(&[]),
            method("ToString", STRING, &[]),
            method("Equals", BOOLEAN, &[("obj", OBJECT)]),
            method("GetHashCode", INT32, &[]),
            method("GetType", TYPE, &[]),
        ],
    },
    class("System", "ValueType", OBJECT, &[]),
    class("System", "Enum", "System.ValueType", &[]),
    class(
        "System",
        "String",
        OBJECT,
        &[
            static_field("Empty", STRING),
            getter("Length", INT32),
            static_method("IsNullOrEmpty", BOOLEAN, &[("value", STRING)]),
        ],
    ),
    value_type("System", "Boolean", &[]),
    value_type("System", "Char", &[]),
    value_type("System", "SByte", &[]),
    value_type("System", "Byte", &[]),
    value_type("System", "Int16", &[]),
    value_type("System", "UInt16", &[]),
    value_type(
        "System",
        "Int32",
        &[constant("MaxValue", INT32), constant("MinValue", INT32)],
    ),
    value_type("System", "UInt32", &[]),
    value_type("System", "Int64", &[]),
    value_type("System", "UInt64", &[]),
    value_type("System", "Single", &[]),
    value_type(
        "System",
        "Double",
        &[
            constant("NaN", DOUBLE),
            constant("PositiveInfinity", DOUBLE),
            constant("NegativeInfinity", DOUBLE),
            constant("MaxValue", DOUBLE),
            constant("MinValue", DOUBLE),
            static_method("IsNaN", BOOLEAN, &[("d", DOUBLE)]),
        ],
    ),
    value_type("System", "Decimal", &[]),
    value_type("System", "Void", &[]),
    RefType {
        namespace: "System",
        name: "Nullable",
        kind: TypeKind::Struct,
        type_parameters: &["T"],
        base: Some("System.ValueType"),
        is_static: false,
        members: &[getter("HasValue", BOOLEAN), getter("Value", "T")],
    },
    class(
        "System",
        "Type",
        OBJECT,
        &[getter("Name", STRING), getter("FullName", STRING)],
    ),
    class("System", "Delegate", OBJECT, &[]),
    class("System", "MulticastDelegate", "System.Delegate", &[]),
    class("System", "EventArgs", OBJECT, &[static_field("Empty", "System.EventArgs")]),
    class("System", "Attribute", OBJECT, &[]),
    class("System", "Exception", OBJECT, &[ctor(&[]), ctor(&[("message", STRING)])]),
    class(
        "System",
        "ArgumentException",
        "System.Exception",
        &[ctor(&[]), ctor(&[("message", STRING)])],
    ),
    delegate(
        "System",
        "EventHandler",
        &[method(
            "Invoke",
            VOID,
            &[("sender", OBJECT), ("e", "System.EventArgs")],
        )],
    ),
];

pub(crate) const FRAMEWORK: &[RefType] = &[
    class(
        "System.Windows.Threading",
        "DispatcherObject",
        OBJECT,
        &[method("CheckAccess", BOOLEAN, &[]), method("VerifyAccess", VOID, &[])],
    ),
    class(
        "System.Windows",
        "DependencyObject",
        "System.Windows.Threading.DispatcherObject",
        &[
            ctor(&[]),
            method("GetValue", OBJECT, &[("dp", DP)]),
            method("SetValue", VOID, &[("dp", DP), ("value", OBJECT)]),
            method("SetValue", VOID, &[("key", DP_KEY), ("value", OBJECT)]),
            method("SetCurrentValue", VOID, &[("dp", DP), ("value", OBJECT)]),
            method("ClearValue", VOID, &[("dp", DP)]),
            method("ClearValue", VOID, &[("key", DP_KEY)]),
            method("CoerceValue", VOID, &[("dp", DP)]),
            method("InvalidateProperty", VOID, &[("dp", DP)]),
            method("ReadLocalValue", OBJECT, &[("dp", DP)]),
        ],
    ),
    class(
        "System.Windows",
        "DependencyProperty",
        OBJECT,
        &[
            static_field("UnsetValue", OBJECT),
            getter("Name", STRING),
            getter("PropertyType", TYPE),
            getter("OwnerType", TYPE),
            getter("DefaultMetadata", METADATA),
            getter("ReadOnly", BOOLEAN),
            static_method("Register", DP, &[NAME, PROPERTY_TYPE, OWNER_TYPE]),
            static_method("Register", DP, &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA]),
            static_method(
                "Register",
                DP,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA, VALIDATE_CALLBACK],
            ),
            static_method(
                "RegisterReadOnly",
                DP_KEY,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA],
            ),
            static_method(
                "RegisterReadOnly",
                DP_KEY,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, TYPE_METADATA, VALIDATE_CALLBACK],
            ),
            static_method("RegisterAttached", DP, &[NAME, PROPERTY_TYPE, OWNER_TYPE]),
            static_method(
                "RegisterAttached",
                DP,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA],
            ),
            static_method(
                "RegisterAttached",
                DP,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA, VALIDATE_CALLBACK],
            ),
            static_method(
                "RegisterAttachedReadOnly",
                DP_KEY,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA],
            ),
            static_method(
                "RegisterAttachedReadOnly",
                DP_KEY,
                &[NAME, PROPERTY_TYPE, OWNER_TYPE, DEFAULT_METADATA, VALIDATE_CALLBACK],
            ),
            method("AddOwner", DP, &[OWNER_TYPE]),
            method("AddOwner", DP, &[OWNER_TYPE, TYPE_METADATA]),
            method("OverrideMetadata", VOID, &[("forType", TYPE), TYPE_METADATA]),
            method(
                "OverrideMetadata",
                VOID,
                &[("forType", TYPE), TYPE_METADATA, ("key", DP_KEY)],
            ),
            method("GetMetadata", METADATA, &[("forType", TYPE)]),
        ],
    ),
    class(
        "System.Windows",
        "DependencyPropertyKey",
        OBJECT,
        &[
            getter("DependencyProperty", DP),
            method("OverrideMetadata", VOID, &[("forType", TYPE), TYPE_METADATA]),
        ],
    ),
    class(
        "System.Windows",
        "PropertyMetadata",
        OBJECT,
        &[
            ctor(&[]),
            ctor(&[DEFAULT_VALUE]),
            ctor(&[CHANGED_CALLBACK]),
            ctor(&[DEFAULT_VALUE, CHANGED_CALLBACK]),
            ctor(&[DEFAULT_VALUE, CHANGED_CALLBACK, COERCE_CALLBACK]),
            property("DefaultValue", OBJECT),
            property("PropertyChangedCallback", CHANGED),
            property("CoerceValueCallback", COERCE),
        ],
    ),
    class(
        "System.Windows",
        "UIPropertyMetadata",
        METADATA,
        &[
            ctor(&[]),
            ctor(&[DEFAULT_VALUE]),
            ctor(&[CHANGED_CALLBACK]),
            ctor(&[DEFAULT_VALUE, CHANGED_CALLBACK]),
            ctor(&[DEFAULT_VALUE, CHANGED_CALLBACK, COERCE_CALLBACK]),
            ctor(&[
                DEFAULT_VALUE,
                CHANGED_CALLBACK,
                COERCE_CALLBACK,
                ANIMATION_PROHIBITED,
            ]),
        ],
    ),
    class(
        "System.Windows",
        "FrameworkPropertyMetadata",
        "System.Windows.UIPropertyMetadata",
        &[
            ctor(&[]),
            ctor(&[DEFAULT_VALUE]),
            ctor(&[CHANGED_CALLBACK]),
            ctor(&[CHANGED_CALLBACK, COERCE_CALLBACK]),
            ctor(&[DEFAULT_VALUE, FLAGS]),
            ctor(&[DEFAULT_VALUE, CHANGED_CALLBACK]),
            ctor(&[DEFAULT_VALUE, CHANGED_CALLBACK, COERCE_CALLBACK]),
            ctor(&[DEFAULT_VALUE, FLAGS, CHANGED_CALLBACK]),
            ctor(&[DEFAULT_VALUE, FLAGS, CHANGED_CALLBACK, COERCE_CALLBACK]),
            ctor(&[
                DEFAULT_VALUE,
                FLAGS,
                CHANGED_CALLBACK,
                COERCE_CALLBACK,
                ANIMATION_PROHIBITED,
            ]),
            property("AffectsMeasure", BOOLEAN),
            property("AffectsArrange", BOOLEAN),
            property("AffectsRender", BOOLEAN),
            property("Inherits", BOOLEAN),
            property("BindsTwoWayByDefault", BOOLEAN),
        ],
    ),
    enumeration(
        "System.Windows",
        "FrameworkPropertyMetadataOptions",
        &[
            RefMember::EnumMember("None"),
            RefMember::EnumMember("AffectsMeasure"),
            RefMember::EnumMember("AffectsArrange"),
            RefMember::EnumMember("AffectsParentMeasure"),
            RefMember::EnumMember("AffectsParentArrange"),
            RefMember::EnumMember("AffectsRender"),
            RefMember::EnumMember("Inherits"),
            RefMember::EnumMember("OverridesInheritanceBehavior"),
            RefMember::EnumMember("NotDataBindable"),
            RefMember::EnumMember("BindsTwoWayByDefault"),
            RefMember::EnumMember("Journal"),
            RefMember::EnumMember("SubPropertiesDoNotAffectRender"),
        ],
    ),
    delegate(
        "System.Windows",
        "PropertyChangedCallback",
        &[method(
            "Invoke",
            VOID,
            &[("d", DO), ("e", "System.Windows.DependencyPropertyChangedEventArgs")],
        )],
    ),
    delegate(
        "System.Windows",
        "CoerceValueCallback",
        &[method("Invoke", OBJECT, &[("d", DO), ("baseValue", OBJECT)])],
    ),
    delegate(
        "System.Windows",
        "ValidateValueCallback",
        &[method("Invoke", BOOLEAN, &[("value", OBJECT)])],
    ),
    value_type(
        "System.Windows",
        "DependencyPropertyChangedEventArgs",
        &[
            getter("OldValue", OBJECT),
            getter("NewValue", OBJECT),
            getter("Property", DP),
        ],
    ),
    class("System.Windows", "Freezable", DO, &[]),
    class("System.Windows.Media", "Visual", DO, &[]),
    class("System.Windows.Media", "Brush", "System.Windows.Freezable", &[]),
    class("System.Windows", "Style", OBJECT, &[ctor(&[])]),
    value_type(
        "System.Windows",
        "Thickness",
        &[
            ctor(&[("uniformLength", DOUBLE)]),
            ctor(&[
                ("left", DOUBLE),
                ("top", DOUBLE),
                ("right", DOUBLE),
                ("bottom", DOUBLE),
            ]),
        ],
    ),
    enumeration(
        "System.Windows",
        "Visibility",
        &[
            RefMember::EnumMember("Visible"),
            RefMember::EnumMember("Hidden"),
            RefMember::EnumMember("Collapsed"),
        ],
    ),
    class(
        "System.Windows",
        "UIElement",
        "System.Windows.Media.Visual",
        &[
            static_field("VisibilityProperty", DP),
            static_field("IsEnabledProperty", DP),
            property("Visibility", "System.Windows.Visibility"),
            property("IsEnabled", BOOLEAN),
            method("InvalidateVisual", VOID, &[]),
            method("InvalidateMeasure", VOID, &[]),
        ],
    ),
    class(
        "System.Windows",
        "FrameworkElement",
        "System.Windows.UIElement",
        &[
            static_field("DataContextProperty", DP),
            static_field("StyleProperty", DP),
            static_field("DefaultStyleKeyProperty", DP),
            static_field("WidthProperty", DP),
            static_field("HeightProperty", DP),
            static_field("MarginProperty", DP),
            static_field("TagProperty", DP),
            property("DataContext", OBJECT),
            property("Style", "System.Windows.Style"),
            property("Width", DOUBLE),
            property("Height", DOUBLE),
            property("Margin", THICKNESS),
            property("Tag", OBJECT),
        ],
    ),
    class(
        "System.Windows.Controls",
        "Control",
        "System.Windows.FrameworkElement",
        &[
            static_field("BackgroundProperty", DP),
            static_field("ForegroundProperty", DP),
            static_field("PaddingProperty", DP),
            property("Background", BRUSH),
            property("Foreground", BRUSH),
            property("Padding", THICKNESS),
        ],
    ),
    class(
        "System.Windows.Controls",
        "ContentControl",
        "System.Windows.Controls.Control",
        &[static_field("ContentProperty", DP), property("Content", OBJECT)],
    ),
    class(
        "System.Windows.Controls",
        "UserControl",
        "System.Windows.Controls.ContentControl",
        &[],
    ),
    class(
        "System.Windows.Controls",
        "Panel",
        "System.Windows.FrameworkElement",
        &[static_field("BackgroundProperty", DP), property("Background", BRUSH)],
    ),
    class(
        "System.Windows",
        "Window",
        "System.Windows.Controls.ContentControl",
        &[static_field("TitleProperty", DP), property("Title", STRING)],
    ),
];

/// Declares reference types into `table` under `global` and returns them by metadata name.
pub(crate) fn declare_reference(
    table: &mut SymbolTable,
    global: SymbolId,
    types: &[&[RefType]],
) -> HashMap<String, SymbolId> {
    let mut by_name = HashMap::new();

    for set in types {
        for ty in set.iter() {
            let namespace = namespace_symbol(table, global, ty.namespace);
            let id = table.declare(ty.name, SymbolKind::Type(ty.kind), Some(namespace));
            let symbol = table.get_mut(id);
            symbol.accessibility = Accessibility::Public;
            symbol.flags.is_static = ty.is_static;
            symbol.type_parameters = ty.type_parameters.iter().map(|t| t.to_string()).collect();
            let key = if ty.type_parameters.is_empty() {
                format!("{}.{}", ty.namespace, ty.name)
            } else {
                format!("{}.{}`{}", ty.namespace, ty.name, ty.type_parameters.len())
            };
            by_name.insert(key, id);
        }
    }

    for set in types {
        for ty in set.iter() {
            let key = if ty.type_parameters.is_empty() {
                format!("{}.{}", ty.namespace, ty.name)
            } else {
                format!("{}.{}`{}", ty.namespace, ty.name, ty.type_parameters.len())
            };
            let Some(&id) = by_name.get(&key) else {
                continue;
            };
            let base = ty.base.map(|base| resolve(&by_name, base));
            table.get_mut(id).base_type = base;
            for member in ty.members {
                declare_member(table, &by_name, id, ty, member);
            }
        }
    }

    by_name
}

pub(crate) fn namespace_symbol(table: &mut SymbolTable, global: SymbolId, dotted: &str) -> SymbolId {
    let mut current = global;
    for part in dotted.split('.').filter(|p| !p.is_empty()) {
        current = match table.child_type_or_namespace(current, part, 0) {
            Some(existing) if table.get(existing).kind == SymbolKind::Namespace => existing,
            _ => table.declare(part, SymbolKind::Namespace, Some(current)),
        };
    }
    current
}

fn resolve(by_name: &HashMap<String, SymbolId>, name: &str) -> TypeRef {
    match by_name.get(name) {
        Some(&id) => TypeRef::named(id),
        None if !name.contains('.') => TypeRef::TypeParameter(name.to_string()),
        None => TypeRef::Unknown,
    }
}

fn declare_member(
    table: &mut SymbolTable,
    by_name: &HashMap<String, SymbolId>,
    owner: SymbolId,
    ty: &RefType,
    member: &RefMember,
) {
    match member {
        RefMember::Field {
            name,
            ty: field_type,
            is_static,
            is_const,
        } => {
            let id = table.declare(name, SymbolKind::Field, Some(owner));
            let symbol = table.get_mut(id);
            symbol.accessibility = Accessibility::Public;
            symbol.flags.is_static = *is_static;
            symbol.flags.is_readonly = *is_static && !*is_const;
            symbol.flags.is_const = *is_const;
            symbol.ty = resolve(by_name, field_type);
        }
        RefMember::Property {
            name,
            ty: property_type,
            settable,
        } => {
            let id = table.declare(name, SymbolKind::Property, Some(owner));
            let symbol = table.get_mut(id);
            symbol.accessibility = Accessibility::Public;
            symbol.flags.has_getter = true;
            symbol.flags.has_setter = *settable;
            symbol.ty = resolve(by_name, property_type);
        }
        RefMember::Method {
            name,
            returns,
            params,
            is_static,
        } => {
            let id = table.declare(name, SymbolKind::Method, Some(owner));
            {
                let symbol = table.get_mut(id);
                symbol.accessibility = Accessibility::Public;
                symbol.flags.is_static = *is_static;
                symbol.ty = resolve(by_name, returns);
            }
            declare_parameters(table, by_name, id, params);
        }
        RefMember::Constructor { params } => {
            let id = table.declare(ty.name, SymbolKind::Constructor, Some(owner));
            {
                let symbol = table.get_mut(id);
                symbol.accessibility = Accessibility::Public;
                symbol.ty = TypeRef::named(owner);
            }
            declare_parameters(table, by_name, id, params);
        }
        RefMember::EnumMember(name) => {
            let id = table.declare(name, SymbolKind::Field, Some(owner));
            let symbol = table.get_mut(id);
            symbol.accessibility = Accessibility::Public;
            symbol.flags.is_const = true;
            symbol.ty = TypeRef::named(owner);
        }
    }
}

fn declare_parameters(
    table: &mut SymbolTable,
    by_name: &HashMap<String, SymbolId>,
    method: SymbolId,
    params: &[(&str, &str)],
) {
    let ids: Vec<SymbolId> = params
        .iter()
        .map(|(name, param_type)| {
            let id = table.declare(name, SymbolKind::Parameter, Some(method));
            table.get_mut(id).ty = resolve(by_name, param_type);
            id
        })
        .collect();
    table.get_mut(method).parameters = ids;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(framework: bool) -> (SymbolTable, HashMap<String, SymbolId>) {
        let mut table = SymbolTable::new();
        let global = table.declare("", SymbolKind::Namespace, None);
        let sets: Vec<&[RefType]> = if framework {
            vec![CORE_LIBRARY, FRAMEWORK]
        } else {
            vec![CORE_LIBRARY]
        };
        let by_name = declare_reference(&mut table, global, &sets);
        (table, by_name)
    }

    #[test]
    fn core_library_is_declared() {
        let (table, by_name) = declared(false);

        let object = by_name["System.Object"];
        let int32 = by_name["System.Int32"];
        assert!(table.get(object).base_type.is_none());
        assert_eq!(
            table.get(int32).base_type,
            Some(TypeRef::named(by_name["System.ValueType"]))
        );
        assert!(by_name.contains_key("System.Nullable`1"));
        assert!(!by_name.contains_key("System.Windows.DependencyProperty"));
    }

    #[test]
    fn register_overloads_have_named_parameters() {
        let (table, by_name) = declared(true);
        let dp = by_name["System.Windows.DependencyProperty"];

        let overloads = table.members_named(dp, "Register");
        assert_eq!(overloads.len(), 3);
        let arities: Vec<usize> = overloads
            .iter()
            .map(|&id| table.get(id).parameters.len())
            .collect();
        assert_eq!(arities, vec![3, 4, 5]);
        let last = table.get(overloads[2]);
        let names: Vec<&str> = last
            .parameters
            .iter()
            .map(|&p| table.get(p).name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "name",
                "propertyType",
                "ownerType",
                "typeMetadata",
                "validateValueCallback"
            ]
        );
        assert!(last.flags.is_static);
    }

    #[test]
    fn delegate_types_expose_invoke() {
        let (table, by_name) = declared(true);
        let changed = by_name["System.Windows.PropertyChangedCallback"];

        let invoke = table.members_named(changed, "Invoke");
        assert_eq!(invoke.len(), 1);
        assert_eq!(table.get(invoke[0]).parameters.len(), 2);
    }

    #[test]
    fn nullable_value_is_type_parameter() {
        let (table, by_name) = declared(false);
        let nullable = by_name["System.Nullable`1"];

        let value = table.members_named(nullable, "Value")[0];
        assert_eq!(table.get(value).ty, TypeRef::TypeParameter("T".to_string()));
    }
}
