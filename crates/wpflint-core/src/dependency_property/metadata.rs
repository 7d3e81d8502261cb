//! `new PropertyMetadata(...)` and its subclasses.

use crate::catalog::{
    COERCE_VALUE_CALLBACK, FRAMEWORK_PROPERTY_METADATA_OPTIONS, PROPERTY_CHANGED_CALLBACK,
    PROPERTY_METADATA,
};
use crate::semantic::{SemanticModel, SymbolId, TypeRef};
use crate::syntax::{Argument, Expr, ObjectCreation};

#[derive(Debug, Clone, Copy)]
pub struct PropertyMetadataCall<'a> {
    pub creation: &'a ObjectCreation,
    pub constructor: SymbolId,
    pub default_value: Option<&'a Argument>,
    pub property_changed: Option<&'a Argument>,
    pub coerce_value: Option<&'a Argument>,
    pub options: Option<&'a Argument>,
}

impl<'a> PropertyMetadataCall<'a> {
    /// Maps the arguments of a metadata creation by the parameter types of the resolved
    /// constructor.
    pub fn match_creation(creation: &'a ObjectCreation, model: &SemanticModel<'_, 'a>) -> Option<Self> {
        let compilation = model.compilation();
        let ty = model.bind_type(&creation.ty);
        if !PROPERTY_METADATA.is_base_of(&ty, compilation) {
            return None;
        }
        let constructor = model.resolve_constructor(creation)?;
        let parameters = model.map_arguments(constructor, &creation.arguments)?;

        let mut call = Self {
            creation,
            constructor,
            default_value: None,
            property_changed: None,
            coerce_value: None,
            options: None,
        };
        for (argument, parameter) in creation.arguments.iter().zip(parameters) {
            let parameter = model.symbol(parameter);
            let slot = if PROPERTY_CHANGED_CALLBACK.is_type(&parameter.ty, compilation) {
                &mut call.property_changed
            } else if COERCE_VALUE_CALLBACK.is_type(&parameter.ty, compilation) {
                &mut call.coerce_value
            } else if FRAMEWORK_PROPERTY_METADATA_OPTIONS.is_type(&parameter.ty, compilation) {
                &mut call.options
            } else if parameter.name == "defaultValue" {
                &mut call.default_value
            } else {
                continue;
            };
            *slot = Some(argument);
        }
        Some(call)
    }

    pub fn match_argument(argument: &'a Argument, model: &SemanticModel<'_, 'a>) -> Option<Self> {
        match argument.expr.unparenthesized() {
            Expr::ObjectCreation(creation) => Self::match_creation(creation, model),
            _ => None,
        }
    }

    /// Type of the default value expression; `None` when it is absent or cannot be inferred.
    pub fn default_value_type(&self, model: &SemanticModel<'_, 'a>) -> Option<TypeRef> {
        let ty = model.type_of(&self.default_value?.expr);
        (!matches!(ty, TypeRef::Unknown)).then_some(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;
    use crate::semantic::{Compilation, Declaration};

    const CODE: &str = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly object A = new PropertyMetadata(1);
    public static readonly object B = new PropertyMetadata(1, OnChanged);
    public static readonly object C = new FrameworkPropertyMetadata(1.0, FrameworkPropertyMetadataOptions.AffectsRender, OnChanged, Coerce);
    public static readonly object D = new FrameworkPropertyMetadata(OnChanged);
    public static readonly object E = new PropertyMetadata(null);
    public static readonly object F = new object();

    private static void OnChanged(DependencyObject d, DependencyPropertyChangedEventArgs e) { }
    private static object Coerce(DependencyObject d, object value) => value;
}
"#;

    fn with_call(field: &str, check: impl FnOnce(Option<PropertyMetadataCall<'_>>, &SemanticModel<'_, '_>)) {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let model = compilation.model_for(&file).expect("model");
        let symbol = compilation
            .symbols()
            .all_symbols()
            .find(|s| s.name == field)
            .expect("field");
        let Some(Declaration::Field { declarator, .. }) = compilation.declaration(symbol.id) else {
            panic!("field declaration");
        };
        let Some(Expr::ObjectCreation(creation)) = declarator.initializer.as_ref() else {
            panic!("object creation");
        };
        check(PropertyMetadataCall::match_creation(creation, &model), &model);
    }

    fn text(argument: Option<&Argument>, model: &SemanticModel<'_, '_>) -> Option<String> {
        argument.and_then(|a| model.file().text(a.span)).map(str::to_string)
    }

    #[test]
    fn default_value_only() {
        with_call("A", |call, model| {
            let call = call.expect("metadata");
            assert_eq!(text(call.default_value, model).as_deref(), Some("1"));
            assert!(call.property_changed.is_none());
            let ty = call.default_value_type(model).expect("type");
            assert_eq!(model.compilation().display_type(&ty), "System.Int32");
        });
    }

    #[test]
    fn default_value_and_callback() {
        with_call("B", |call, model| {
            let call = call.expect("metadata");
            assert_eq!(text(call.default_value, model).as_deref(), Some("1"));
            assert_eq!(text(call.property_changed, model).as_deref(), Some("OnChanged"));
        });
    }

    #[test]
    fn framework_metadata_with_options() {
        with_call("C", |call, model| {
            let call = call.expect("metadata");
            assert_eq!(text(call.default_value, model).as_deref(), Some("1.0"));
            assert_eq!(
                text(call.options, model).as_deref(),
                Some("FrameworkPropertyMetadataOptions.AffectsRender")
            );
            assert_eq!(text(call.property_changed, model).as_deref(), Some("OnChanged"));
            assert_eq!(text(call.coerce_value, model).as_deref(), Some("Coerce"));
        });
    }

    #[test]
    fn method_group_binds_callback_overload() {
        with_call("D", |call, model| {
            let call = call.expect("metadata");
            assert!(call.default_value.is_none());
            assert_eq!(text(call.property_changed, model).as_deref(), Some("OnChanged"));
        });
    }

    #[test]
    fn null_picks_the_callback_overload() {
        with_call("E", |call, _model| {
            let call = call.expect("metadata");
            assert!(call.default_value.is_none());
            assert!(call.property_changed.is_some());
        });
    }

    #[test]
    fn other_creations_do_not_match() {
        with_call("F", |call, _| assert!(call.is_none()));
    }
}
