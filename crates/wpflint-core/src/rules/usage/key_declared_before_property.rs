//! key-declared-before-property rule (WPF0031): a `DependencyPropertyKey` field is
//! initialized before the field that reads `Key.DependencyProperty`.

use crate::catalog::KEY_DEPENDENCY_PROPERTY;
use crate::declare_rule;
use crate::dependency_property::alias::{receiver_backing, strip_conversion};
use crate::dependency_property::backing_members;
use crate::diagnostic::Diagnostic;
use crate::rules::{Rule, RuleContext, RuleMetadata};
use crate::semantic::{Declaration, Symbol};
use crate::syntax::{Expr, Span};

declare_rule!(
    KeyDeclaredBeforeProperty,
    id = "WPF0031",
    name = "key-declared-before-property",
    description = "DependencyPropertyKey field must be declared before the property field that uses it",
    category = Usage,
    severity = Error,
    examples = "// Bad: BarPropertyKey is still null when BarProperty is initialized\npublic static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;\nprivate static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(\n    nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0));\n\n// Good\nprivate static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(\n    nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0));\npublic static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;"
);

/// Span of a static field's initializer, when it has one.
fn static_initializer(symbol: &Symbol, declaration: Declaration<'_>) -> Option<Span> {
    match declaration {
        Declaration::Field { declarator, .. } if symbol.flags.is_static => {
            declarator.initializer.as_ref().map(Expr::span)
        }
        _ => None,
    }
}

impl Rule for KeyDeclaredBeforeProperty {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        backing_members(&model)
            .into_iter()
            .filter(|backing| !backing.is_key())
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|property| {
                let Declaration::Field { declarator, .. } = compilation.declaration(property.symbol)? else {
                    return None;
                };
                let initializer = declarator.initializer.as_ref()?;
                if !model.symbol(property.symbol).is_static() {
                    return None;
                }

                let value = strip_conversion(initializer);
                let Expr::MemberAccess(access) = value else {
                    return None;
                };
                if !KEY_DEPENDENCY_PROPERTY.matches_any(model.symbol_info(value), compilation) {
                    return None;
                }
                let key = receiver_backing(&access.target, &model)?;
                let key_symbol = model.symbol(key.symbol);
                if !key.is_key()
                    || key.containing_type != property.containing_type
                    || key_symbol.file != Some(model.file_id())
                {
                    return None;
                }
                let key_initializer = static_initializer(key_symbol, compilation.declaration(key.symbol)?)?;
                if key_initializer.lo < initializer.span().lo {
                    return None;
                }

                Some(
                    Diagnostic::at_span(
                        self.metadata.id,
                        self.metadata.severity,
                        format!(
                            "`{}` reads `{}` before it is initialized",
                            property.name(compilation),
                            key.name(compilation)
                        ),
                        ctx.file(),
                        initializer.span(),
                    )
                    .with_suggestion(format!(
                        "Move `{}` above `{}`",
                        key.name(compilation),
                        property.name(compilation)
                    )),
                )
            })
            .collect()
    }
}
