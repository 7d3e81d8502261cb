//! Follows `DependencyPropertyKey.DependencyProperty`, `AddOwner` and `OverrideMetadata`
//! back to the call that registered the property.

use super::backing::BackingMember;
use super::registration::{self, RegistrationCall};
use crate::cancellation::CancellationToken;
use crate::catalog::KEY_DEPENDENCY_PROPERTY;
use crate::semantic::{Compilation, SemanticModel, SymbolKind};
use crate::syntax::{Expr, Invocation};

/// Bound on alias chains; real code rarely goes past two hops.
const MAX_ALIAS_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    /// The Register* call at the end of the chain.
    pub call: RegistrationCall<'a>,
    /// Backing members visited, starting with the one asked about.
    pub chain: Vec<BackingMember>,
    /// The chain went through `AddOwner`.
    pub inherited: bool,
    /// The `AddOwner` call nearest the member asked about.
    pub add_owner: Option<RegistrationCall<'a>>,
}

impl<'a> Resolved<'a> {
    /// The call that made the asked-about member's owner an owner of the property:
    /// its `AddOwner` when the chain has one, the registration otherwise.
    pub fn owning_call(&self) -> &RegistrationCall<'a> {
        self.add_owner.as_ref().unwrap_or(&self.call)
    }
}

/// Resolves a backing member to its registration call.
///
/// Cycles, dead ends, chains deeper than the bound and cancellation answer `None`.
pub fn resolve_registration<'a>(
    backing: BackingMember,
    compilation: &Compilation<'a>,
    cancellation: &CancellationToken,
) -> Option<Resolved<'a>> {
    let mut chain: Vec<BackingMember> = Vec::new();
    let mut inherited = false;
    let mut add_owner_call = None;
    let mut current = backing;

    loop {
        if cancellation.is_cancelled()
            || chain.len() >= MAX_ALIAS_DEPTH
            || chain.iter().any(|visited| visited.symbol == current.symbol)
        {
            return None;
        }
        chain.push(current);

        let value = current.value(compilation)?;
        let model = value.model;
        let expr = strip_conversion(value.expr);
        match expr {
            Expr::Invocation(invocation) => {
                if let Some(call) = registration::match_any(invocation, &model) {
                    return Some(Resolved {
                        call,
                        chain,
                        inherited,
                        add_owner: add_owner_call,
                    });
                }
                let add_owner = registration::match_add_owner(invocation, &model)?;
                current = receiver_backing(add_owner.receiver?, &model)?;
                inherited = true;
                add_owner_call.get_or_insert(add_owner);
            }
            Expr::MemberAccess(access) => {
                let property = model.symbol_info(expr)?;
                if !KEY_DEPENDENCY_PROPERTY.matches(property, compilation) {
                    return None;
                }
                let key = receiver_backing(&access.target, &model)?;
                if !key.is_key() {
                    return None;
                }
                current = key;
            }
            _ => return None,
        }
    }
}

/// Resolves `X.OverrideMetadata(...)` to the override call and the registration of `X`.
pub fn resolve_override<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
    cancellation: &CancellationToken,
) -> Option<(RegistrationCall<'a>, Resolved<'a>)> {
    let call = registration::match_override_metadata(invocation, model)?;
    let backing = receiver_backing(call.receiver?, model)?;
    let resolved = resolve_registration(backing, model.compilation(), cancellation)?;
    Some((call, resolved))
}

/// The `DependencyProperty` member exposing the key's property, e.g. `BarProperty` for
/// `BarPropertyKey` when it is initialized with `BarPropertyKey.DependencyProperty`.
pub fn property_for_key(key: BackingMember, compilation: &Compilation<'_>) -> Option<BackingMember> {
    if !key.is_key() {
        return None;
    }
    let symbols = compilation.symbols();
    symbols
        .get(key.containing_type)
        .members
        .iter()
        .filter(|&&member| matches!(symbols.get(member).kind, SymbolKind::Field | SymbolKind::Property))
        .filter_map(|&member| BackingMember::match_symbol(member, compilation))
        .filter(|candidate| !candidate.is_key())
        .find(|candidate| {
            let Some(value) = candidate.value(compilation) else {
                return false;
            };
            let Expr::MemberAccess(access) = strip_conversion(value.expr) else {
                return false;
            };
            KEY_DEPENDENCY_PROPERTY.matches_any(value.model.symbol_info(value.expr), compilation)
                && value.model.symbol_info(&access.target) == Some(key.symbol)
        })
}

/// Backing member an expression such as `Other.BarProperty` refers to.
pub(crate) fn receiver_backing(expr: &Expr, model: &SemanticModel<'_, '_>) -> Option<BackingMember> {
    let symbol = model.symbol_info(expr.unparenthesized())?;
    BackingMember::match_symbol(symbol, model.compilation())
}

/// Strips at most one cast or `as`. Parentheses around and inside it are transparent.
pub(crate) fn strip_conversion(expr: &Expr) -> &Expr {
    match expr.unparenthesized() {
        Expr::Cast(cast) => cast.expr.unparenthesized(),
        Expr::As(as_expr) => as_expr.expr.unparenthesized(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParsedFile;

    const CODE: &str = r#"
using System.Windows;

public class Foo : DependencyObject
{
    private static readonly DependencyPropertyKey BarPropertyKey = DependencyProperty.RegisterReadOnly(
        nameof(Bar), typeof(int), typeof(Foo), new PropertyMetadata(0));

    public static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;

    public static readonly DependencyProperty LoopAProperty = LoopBProperty.AddOwner(typeof(Foo));
    public static readonly DependencyProperty LoopBProperty = LoopAProperty.AddOwner(typeof(Foo));

    public int Bar => (int)GetValue(BarProperty);
}

public class Derived : Foo
{
    public static readonly DependencyProperty BarProperty = Foo.BarProperty.AddOwner(typeof(Derived));

    static Derived()
    {
        Foo.BarProperty.OverrideMetadata(typeof(Derived), new PropertyMetadata(1));
    }
}
"#;

    fn member(compilation: &Compilation<'_>, owner: &str, name: &str) -> BackingMember {
        let symbols = compilation.symbols();
        let symbol = symbols
            .all_symbols()
            .find(|s| s.name == name && s.container.is_some_and(|c| symbols.get(c).name == owner))
            .expect("declared");
        BackingMember::match_symbol(symbol.id, compilation).expect("backing")
    }

    #[test]
    fn key_and_property_resolve_to_same_call() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let token = CancellationToken::new();

        let from_key = resolve_registration(member(&compilation, "Foo", "BarPropertyKey"), &compilation, &token)
            .expect("key resolves");
        let from_property = resolve_registration(member(&compilation, "Foo", "BarProperty"), &compilation, &token)
            .expect("property resolves");

        assert_eq!(from_key.call, from_property.call);
        assert!(std::ptr::eq(from_key.call.invocation, from_property.call.invocation));
        assert_eq!(from_property.chain.len(), 2);
        assert!(!from_property.inherited);
    }

    #[test]
    fn add_owner_chain_is_inherited() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();

        let resolved = resolve_registration(
            member(&compilation, "Derived", "BarProperty"),
            &compilation,
            &CancellationToken::new(),
        )
        .expect("resolves");

        assert!(resolved.inherited);
        assert_eq!(resolved.chain.len(), 3);
        assert_eq!(resolved.call.registered_name(&compilation).as_deref(), Some("Bar"));
    }

    #[test]
    fn cycles_answer_none() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();

        let resolved = resolve_registration(
            member(&compilation, "Foo", "LoopAProperty"),
            &compilation,
            &CancellationToken::new(),
        );

        assert!(resolved.is_none());
    }

    #[test]
    fn cancellation_answers_none() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let token = CancellationToken::new();
        token.cancel();

        let resolved = resolve_registration(member(&compilation, "Foo", "BarProperty"), &compilation, &token);

        assert!(resolved.is_none());
    }

    #[test]
    fn key_maps_to_its_property() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let key = member(&compilation, "Foo", "BarPropertyKey");

        let property = property_for_key(key, &compilation).expect("property");

        assert_eq!(property.name(&compilation), "BarProperty");
        assert!(property_for_key(property, &compilation).is_none());
    }

    #[test]
    fn override_metadata_resolves_receiver() {
        let file = ParsedFile::from_source("Foo.cs", CODE);
        let compilation = Compilation::builder().add_file(&file).build();
        let model = compilation.model_for(&file).expect("model");
        let derived = &file.unit().types[1];
        let crate::syntax::Member::Constructor(ctor) = &derived.members[1] else {
            panic!("static constructor");
        };
        let Some(crate::syntax::Body::Block(block)) = &ctor.body else {
            panic!("block body");
        };
        let crate::syntax::Stmt::Expression { expr: Expr::Invocation(invocation), .. } = &block.statements[0] else {
            panic!("invocation statement");
        };

        let (call, resolved) =
            resolve_override(invocation, &model, &CancellationToken::new()).expect("override");

        assert_eq!(call.kind, registration::RegistrationKind::OverrideMetadata);
        assert_eq!(resolved.call.kind, registration::RegistrationKind::RegisterReadOnly);
    }
}
