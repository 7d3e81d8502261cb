//! no-set-current-value-for-data-context rule (WPF0043).

use super::{is_local_value_property, rename_callee_fix};
use crate::declare_rule;
use crate::dependency_property::ValueCallKind;
use crate::diagnostic::Diagnostic;
use crate::rules::helpers::{callee_name_span, value_calls};
use crate::rules::{Rule, RuleContext, RuleMetadata};

declare_rule!(
    NoSetCurrentValueForDataContext,
    id = "WPF0043",
    name = "no-set-current-value-for-data-context",
    description = "Use SetValue, not SetCurrentValue, for DataContext and Style",
    category = Usage,
    severity = Warning,
    examples = "// Bad\nthis.SetCurrentValue(DataContextProperty, viewModel);\n\n// Good\nthis.SetValue(DataContextProperty, viewModel);"
);

impl Rule for NoSetCurrentValueForDataContext {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn check(&self, ctx: &RuleContext<'_, '_, '_>) -> Vec<Diagnostic> {
        let model = ctx.model;
        let compilation = ctx.compilation();

        value_calls(ctx)
            .into_iter()
            .filter(|call| call.kind == ValueCallKind::SetCurrentValue)
            .take_while(|_| !ctx.is_cancelled())
            .filter_map(|call| {
                let property = model.symbol_info(call.property.expr.unparenthesized())?;
                if !is_local_value_property(property, compilation) {
                    return None;
                }
                let name = &model.symbol(property).name;
                let mut diagnostic = Diagnostic::at_span(
                    self.metadata.id,
                    self.metadata.severity,
                    format!("Use SetValue to set `{name}`"),
                    ctx.file(),
                    callee_name_span(call.invocation)?,
                )
                .with_suggestion("Use SetValue");
                if let Some(fix) = rename_callee_fix(ctx.file(), call.invocation, "SetValue") {
                    diagnostic = diagnostic.with_fix(fix);
                }
                Some(diagnostic)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply_first_fix, run_rule};

    fn run_data_context(code: &str) -> Vec<Diagnostic> {
        run_rule(&NoSetCurrentValueForDataContext::new(), code)
    }

    #[test]
    fn flags_data_context_and_style() {
        let code = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public void Attach(object model, Style style)
    {
        SetCurrentValue(DataContextProperty, model);
        this.SetCurrentValue(FrameworkElement.StyleProperty, style);
        SetValue(DataContextProperty, model);
    }
}
"#;
        let diagnostics = run_data_context(code);

        let lines: Vec<usize> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, [8, 9]);
        assert_eq!(diagnostics[0].rule_id, "WPF0043");
        assert_eq!(diagnostics[0].message, "Use SetValue to set `DataContextProperty`");
        assert_eq!(diagnostics[1].message, "Use SetValue to set `StyleProperty`");
        let fixed = apply_first_fix(code, &diagnostics[0]);
        assert!(fixed.contains("        SetValue(DataContextProperty, model);\n        this.SetCurrentValue"));
    }

    #[test]
    fn ignores_other_properties() {
        let code = r#"
using System.Windows;

public class Foo : FrameworkElement
{
    public static readonly DependencyProperty BarProperty = DependencyProperty.Register(
        nameof(Bar), typeof(int), typeof(Foo));

    public void Reset() => SetCurrentValue(BarProperty, 0);
}
"#;
        assert!(run_data_context(code).is_empty());
    }
}
