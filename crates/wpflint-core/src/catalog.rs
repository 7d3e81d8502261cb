//! Well-known framework types and members.
//!
//! Descriptors are resolved against a compilation on first use and memoized there, so
//! "is this the framework's X" is a map lookup plus an id comparison afterwards. A
//! descriptor whose type is missing from the compilation matches nothing.

use crate::semantic::{Compilation, SymbolId, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedType {
    pub namespace: &'static str,
    pub name: &'static str,
    pub full_name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedMember {
    pub containing: &'static QualifiedType,
    pub name: &'static str,
}

macro_rules! qualified_type {
    ($ident:ident, $namespace:literal, $name:literal) => {
        pub const $ident: QualifiedType = QualifiedType {
            namespace: $namespace,
            name: $name,
            full_name: concat!($namespace, ".", $name),
        };
    };
}

macro_rules! qualified_member {
    ($ident:ident, $containing:ident, $name:literal) => {
        pub const $ident: QualifiedMember = QualifiedMember {
            containing: &$containing,
            name: $name,
        };
    };
}

qualified_type!(SYSTEM_OBJECT, "System", "Object");
qualified_type!(SYSTEM_STRING, "System", "String");
qualified_type!(SYSTEM_TYPE, "System", "Type");
qualified_type!(SYSTEM_VOID, "System", "Void");
qualified_type!(DEPENDENCY_OBJECT, "System.Windows", "DependencyObject");
qualified_type!(DEPENDENCY_PROPERTY, "System.Windows", "DependencyProperty");
qualified_type!(DEPENDENCY_PROPERTY_KEY, "System.Windows", "DependencyPropertyKey");
qualified_type!(PROPERTY_METADATA, "System.Windows", "PropertyMetadata");
qualified_type!(FRAMEWORK_PROPERTY_METADATA, "System.Windows", "FrameworkPropertyMetadata");
qualified_type!(
    FRAMEWORK_PROPERTY_METADATA_OPTIONS,
    "System.Windows",
    "FrameworkPropertyMetadataOptions"
);
qualified_type!(PROPERTY_CHANGED_CALLBACK, "System.Windows", "PropertyChangedCallback");
qualified_type!(COERCE_VALUE_CALLBACK, "System.Windows", "CoerceValueCallback");
qualified_type!(VALIDATE_VALUE_CALLBACK, "System.Windows", "ValidateValueCallback");
qualified_type!(FRAMEWORK_ELEMENT, "System.Windows", "FrameworkElement");
qualified_type!(FREEZABLE, "System.Windows", "Freezable");

qualified_member!(REGISTER, DEPENDENCY_PROPERTY, "Register");
qualified_member!(REGISTER_READ_ONLY, DEPENDENCY_PROPERTY, "RegisterReadOnly");
qualified_member!(REGISTER_ATTACHED, DEPENDENCY_PROPERTY, "RegisterAttached");
qualified_member!(REGISTER_ATTACHED_READ_ONLY, DEPENDENCY_PROPERTY, "RegisterAttachedReadOnly");
qualified_member!(ADD_OWNER, DEPENDENCY_PROPERTY, "AddOwner");
qualified_member!(OVERRIDE_METADATA, DEPENDENCY_PROPERTY, "OverrideMetadata");
qualified_member!(KEY_DEPENDENCY_PROPERTY, DEPENDENCY_PROPERTY_KEY, "DependencyProperty");
qualified_member!(KEY_OVERRIDE_METADATA, DEPENDENCY_PROPERTY_KEY, "OverrideMetadata");
qualified_member!(GET_VALUE, DEPENDENCY_OBJECT, "GetValue");
qualified_member!(SET_VALUE, DEPENDENCY_OBJECT, "SetValue");
qualified_member!(SET_CURRENT_VALUE, DEPENDENCY_OBJECT, "SetCurrentValue");
qualified_member!(DATA_CONTEXT_PROPERTY, FRAMEWORK_ELEMENT, "DataContextProperty");
qualified_member!(STYLE_PROPERTY, FRAMEWORK_ELEMENT, "StyleProperty");

impl QualifiedType {
    pub fn resolve(&self, compilation: &Compilation<'_>) -> Option<SymbolId> {
        compilation.well_known_type(self.full_name)
    }

    /// `symbol` is this type.
    pub fn is(&self, symbol: SymbolId, compilation: &Compilation<'_>) -> bool {
        self.resolve(compilation) == Some(symbol)
    }

    /// `ty` is exactly this type, ignoring type arguments.
    pub fn is_type(&self, ty: &TypeRef, compilation: &Compilation<'_>) -> bool {
        ty.symbol().is_some_and(|symbol| self.is(symbol, compilation))
    }

    /// `ty` is this type or derives from it. Unknown types are not.
    pub fn is_base_of(&self, ty: &TypeRef, compilation: &Compilation<'_>) -> bool {
        let (Some(target), Some(symbol)) = (self.resolve(compilation), ty.symbol()) else {
            return false;
        };
        compilation
            .symbols()
            .base_chain(symbol)
            .any(|base| base == target)
    }

    pub fn type_ref(&self, compilation: &Compilation<'_>) -> Option<TypeRef> {
        self.resolve(compilation).map(TypeRef::named)
    }
}

impl QualifiedMember {
    /// `symbol` is a member with this name declared directly on the described type.
    pub fn matches(&self, symbol: SymbolId, compilation: &Compilation<'_>) -> bool {
        let member = compilation.symbols().get(symbol);
        member.name == self.name
            && member
                .container
                .is_some_and(|container| self.containing.is(container, compilation))
    }

    pub fn matches_any(&self, symbol: Option<SymbolId>, compilation: &Compilation<'_>) -> bool {
        symbol.is_some_and(|symbol| self.matches(symbol, compilation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;

    const CODE: &str = r#"
using System.Windows;

namespace Demo
{
    public class Foo : FrameworkElement { }
    public class DependencyProperty { public static void Register() { } }
}
"#;

    #[test]
    fn descriptors_have_full_names() {
        assert_eq!(DEPENDENCY_PROPERTY.full_name, "System.Windows.DependencyProperty");
        assert_eq!(REGISTER.containing.name, "DependencyProperty");
        assert_eq!(SYSTEM_OBJECT.full_name, "System.Object");
    }

    #[test]
    fn resolves_framework_types() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();

        let dp = DEPENDENCY_PROPERTY.resolve(&compilation).expect("resolved");

        assert_eq!(
            compilation.symbols().qualified_name(dp),
            "System.Windows.DependencyProperty"
        );
        assert!(DEPENDENCY_PROPERTY.is(dp, &compilation));
    }

    #[test]
    fn same_named_source_member_does_not_match() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let source_register = compilation
            .symbols()
            .all_symbols()
            .find(|s| s.name == "Register" && s.is_from_source())
            .expect("source Register");
        let framework_register = compilation
            .symbols()
            .all_symbols()
            .find(|s| s.name == "Register" && !s.is_from_source())
            .expect("framework Register");

        assert!(!REGISTER.matches(source_register.id, &compilation));
        assert!(REGISTER.matches(framework_register.id, &compilation));
    }

    #[test]
    fn base_of_walks_inheritance() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let foo = compilation.well_known_type("Demo.Foo").expect("Foo");

        assert!(DEPENDENCY_OBJECT.is_base_of(&TypeRef::named(foo), &compilation));
        assert!(!FREEZABLE.is_base_of(&TypeRef::named(foo), &compilation));
        assert!(!DEPENDENCY_OBJECT.is_base_of(&TypeRef::Unknown, &compilation));
    }

    #[test]
    fn missing_framework_answers_false() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder()
            .add_file(&file)
            .with_framework(false)
            .build();
        let source_dp = compilation
            .well_known_type("Demo.DependencyProperty")
            .expect("source type");

        assert_eq!(DEPENDENCY_OBJECT.resolve(&compilation), None);
        assert!(!DEPENDENCY_PROPERTY.is(source_dp, &compilation));
        assert!(!DEPENDENCY_OBJECT.is_base_of(&TypeRef::named(source_dp), &compilation));
    }
}
