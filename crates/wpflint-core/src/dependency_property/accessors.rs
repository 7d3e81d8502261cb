//! CLR property and attached `Get`/`Set` accessors that pass through to `GetValue` /
//! `SetValue`.

use std::ops::ControlFlow;

use serde::Serialize;

use super::alias::{self, strip_conversion};
use super::backing::{single_expression, BackingMember};
use crate::cancellation::CancellationToken;
use crate::catalog::{
    QualifiedMember, DEPENDENCY_OBJECT, GET_VALUE, KEY_DEPENDENCY_PROPERTY, SET_CURRENT_VALUE,
    SET_VALUE, SYSTEM_OBJECT, SYSTEM_VOID,
};
use crate::semantic::{Compilation, Declaration, SemanticModel, SymbolId, SymbolKind};
use crate::syntax::{Argument, Body, Expr, Invocation, MethodDecl, PropertyDecl};
use crate::visitor::{self, AstVisitor, VisitorContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueCallKind {
    GetValue,
    SetValue,
    SetCurrentValue,
}

impl ValueCallKind {
    pub const ALL: [ValueCallKind; 3] = [
        ValueCallKind::GetValue,
        ValueCallKind::SetValue,
        ValueCallKind::SetCurrentValue,
    ];

    pub fn method_name(self) -> &'static str {
        match self {
            ValueCallKind::GetValue => "GetValue",
            ValueCallKind::SetValue => "SetValue",
            ValueCallKind::SetCurrentValue => "SetCurrentValue",
        }
    }

    fn member(self) -> &'static QualifiedMember {
        match self {
            ValueCallKind::GetValue => &GET_VALUE,
            ValueCallKind::SetValue => &SET_VALUE,
            ValueCallKind::SetCurrentValue => &SET_CURRENT_VALUE,
        }
    }

    fn arity(self) -> usize {
        match self {
            ValueCallKind::GetValue => 1,
            ValueCallKind::SetValue | ValueCallKind::SetCurrentValue => 2,
        }
    }
}

/// A `GetValue`, `SetValue` or `SetCurrentValue` call.
#[derive(Debug, Clone, Copy)]
pub struct ValueCall<'a> {
    pub kind: ValueCallKind,
    pub invocation: &'a Invocation,
    pub method: SymbolId,
    /// Explicit receiver; `None` for an implicit `this`.
    pub receiver: Option<&'a Expr>,
    pub property: &'a Argument,
    pub value: Option<&'a Argument>,
}

impl<'a> ValueCall<'a> {
    /// Called on `this`, explicitly or implicitly.
    pub fn is_on_this(&self) -> bool {
        matches!(self.receiver, None | Some(Expr::This(_)))
    }

    /// Backing member passed as the property argument. `Key.DependencyProperty` answers
    /// the key.
    pub fn backing_member(&self, model: &SemanticModel<'_, 'a>) -> Option<BackingMember> {
        property_argument_backing(&self.property.expr, model)
    }

    /// The value argument is the `value` parameter, possibly cast or boxed.
    pub fn uses_parameter(&self, parameter: SymbolId, model: &SemanticModel<'_, 'a>) -> bool {
        self.value
            .is_some_and(|value| uses_parameter(&value.expr, parameter, model))
    }
}

fn property_argument_backing(expr: &Expr, model: &SemanticModel<'_, '_>) -> Option<BackingMember> {
    let expr = expr.unparenthesized();
    if let Expr::MemberAccess(access) = expr {
        if KEY_DEPENDENCY_PROPERTY.matches_any(model.symbol_info(expr), model.compilation()) {
            return alias::receiver_backing(&access.target, model);
        }
    }
    alias::receiver_backing(expr, model)
}

/// `value`, `(T)value`, `value as T` or a boxing call on `value` such as
/// `BooleanBoxes.Box(value)`.
fn uses_parameter(expr: &Expr, parameter: SymbolId, model: &SemanticModel<'_, '_>) -> bool {
    let expr = strip_conversion(expr);
    if model.symbol_info(expr) == Some(parameter) {
        return true;
    }
    match expr {
        Expr::Invocation(invocation) => match invocation.arguments.as_slice() {
            [argument] => {
                model.symbol_info(argument.expr.unparenthesized()) == Some(parameter)
                    && is_boxing_call(invocation, model)
            }
            _ => false,
        },
        _ => false,
    }
}

/// A static one-parameter method returning `object`.
fn is_boxing_call(invocation: &Invocation, model: &SemanticModel<'_, '_>) -> bool {
    let compilation = model.compilation();
    model.resolve_invocation(invocation).is_some_and(|method| {
        let method = compilation.symbols().get(method);
        method.is_static() && method.parameters.len() == 1 && SYSTEM_OBJECT.is_type(&method.ty, compilation)
    })
}

/// Matches a value call of the given kind by resolved method.
pub fn match_value_call<'a>(
    kind: ValueCallKind,
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<ValueCall<'a>> {
    if invocation.method_name() != Some(kind.method_name())
        || invocation.arguments.len() != kind.arity()
    {
        return None;
    }
    let method = model.resolve_invocation(invocation).or_else(|| {
        // `SetValue(dp, x)` and `SetValue(key, x)` tie when the property argument is unresolved.
        let group = model.method_group(&invocation.callee);
        group
            .iter()
            .all(|&m| kind.member().matches(m, model.compilation()))
            .then(|| group.first().copied())
            .flatten()
    })?;
    if !kind.member().matches(method, model.compilation()) {
        return None;
    }

    let parameters = model.map_arguments(method, &invocation.arguments)?;
    let mut property = None;
    let mut value = None;
    for (argument, parameter) in invocation.arguments.iter().zip(parameters) {
        match model.symbol(parameter).name.as_str() {
            "value" => value = Some(argument),
            _ => property = Some(argument),
        }
    }
    let receiver = match invocation.callee.as_ref() {
        Expr::MemberAccess(access) => Some(access.target.as_ref()),
        _ => None,
    };

    Some(ValueCall {
        kind,
        invocation,
        method,
        receiver,
        property: property?,
        value,
    })
}

pub fn match_any_value_call<'a>(
    invocation: &'a Invocation,
    model: &SemanticModel<'_, 'a>,
) -> Option<ValueCall<'a>> {
    ValueCallKind::ALL
        .iter()
        .find_map(|&kind| match_value_call(kind, invocation, model))
}

/// Every value call anywhere in a body.
pub fn find_value_calls<'a>(body: &'a Body, model: &SemanticModel<'_, 'a>) -> Vec<ValueCall<'a>> {
    struct Finder<'m, 'c, 'a> {
        model: &'m SemanticModel<'c, 'a>,
        calls: Vec<ValueCall<'a>>,
    }

    impl<'a> AstVisitor<'a> for Finder<'_, '_, 'a> {
        fn visit_invocation(&mut self, node: &'a Invocation, _ctx: &VisitorContext) -> ControlFlow<()> {
            if let Some(call) = match_any_value_call(node, self.model) {
                self.calls.push(call);
            }
            ControlFlow::Continue(())
        }
    }

    let mut finder = Finder {
        model,
        calls: Vec::new(),
    };
    let _ = visitor::walk_body(body, &mut finder, &VisitorContext::new(model.file()));
    finder.calls
}

/// A CLR property wrapping a dependency property.
#[derive(Debug, Clone, Copy)]
pub struct ClrProperty<'a> {
    pub symbol: SymbolId,
    pub decl: &'a PropertyDecl,
}

/// Getter and setter calls that agree on one backing member.
#[derive(Debug, Clone, Copy)]
pub struct AccessorPair<'a> {
    pub getter: ValueCall<'a>,
    pub setter: Option<ValueCall<'a>>,
    pub backing: BackingMember,
}

impl<'a> ClrProperty<'a> {
    /// Instance property declared in source.
    pub fn match_symbol(symbol: SymbolId, compilation: &Compilation<'a>) -> Option<Self> {
        let property = compilation.symbols().get(symbol);
        if property.kind != SymbolKind::Property || property.is_static() {
            return None;
        }
        match compilation.declaration(symbol)? {
            Declaration::Property(decl) => Some(Self { symbol, decl }),
            _ => None,
        }
    }

    fn getter_body(&self) -> Option<&'a Expr> {
        match &self.decl.expression_body {
            Some(expr) => Some(expr),
            None => single_expression(self.decl.getter()?.body.as_ref()?),
        }
    }

    /// `GetValue(P)` in the getter, after stripping one cast or `as` and any parentheses.
    pub fn getter_call(&self, model: &SemanticModel<'_, 'a>) -> Option<ValueCall<'a>> {
        let Expr::Invocation(invocation) = strip_conversion(self.getter_body()?) else {
            return None;
        };
        let call = match_value_call(ValueCallKind::GetValue, invocation, model)?;
        call.is_on_this().then_some(call)
    }

    /// Single `SetValue(P, value)` or `SetCurrentValue(P, value)` in the setter.
    pub fn setter_call(&self, model: &SemanticModel<'_, 'a>) -> Option<ValueCall<'a>> {
        let setter = self.decl.setter()?;
        let Expr::Invocation(invocation) = single_expression(setter.body.as_ref()?)? else {
            return None;
        };
        let call = match_value_call(ValueCallKind::SetValue, invocation, model)
            .or_else(|| match_value_call(ValueCallKind::SetCurrentValue, invocation, model))?;
        let value = implicit_value_parameter(self.symbol, model.compilation())?;
        (call.is_on_this() && call.uses_parameter(value, model)).then_some(call)
    }

    /// Backing member read by the getter, provided the setter (if any) writes the same one.
    pub fn backing_member(&self, model: &SemanticModel<'_, 'a>) -> Option<BackingMember> {
        self.accessor_pair(model).map(|pair| pair.backing)
    }

    pub fn accessor_pair(&self, model: &SemanticModel<'_, 'a>) -> Option<AccessorPair<'a>> {
        let getter = self.getter_call(model)?;
        let backing = getter.backing_member(model)?;
        let setter = match self.decl.setter() {
            Some(_) => {
                let setter = self.setter_call(model)?;
                let written = setter.backing_member(model)?;
                if !agree(backing, written, model.compilation()) {
                    return None;
                }
                Some(setter)
            }
            None => None,
        };
        Some(AccessorPair {
            getter,
            setter,
            backing,
        })
    }

    /// Accessors do nothing but read and write the dependency property.
    pub fn is_pure_pass_through(&self, model: &SemanticModel<'_, 'a>) -> bool {
        self.accessor_pair(model).is_some()
    }
}

/// The setter's implicit `value` parameter.
fn implicit_value_parameter(property: SymbolId, compilation: &Compilation<'_>) -> Option<SymbolId> {
    compilation
        .symbols()
        .get(property)
        .parameters
        .iter()
        .copied()
        .find(|&p| compilation.symbols().get(p).flags.is_implicit)
}

/// The getter's property and the setter's property or its key are the same registration.
pub(crate) fn agree(read: BackingMember, written: BackingMember, compilation: &Compilation<'_>) -> bool {
    read == written || (written.is_key() && alias::property_for_key(written, compilation) == Some(read))
}

/// Attached property accessor method, `GetBar(element)` or `SetBar(element, value)`.
#[derive(Debug, Clone, Copy)]
pub struct AttachedAccessor<'a> {
    pub method: SymbolId,
    pub decl: &'a MethodDecl,
    pub call: ValueCall<'a>,
    pub backing: BackingMember,
    /// The `DependencyObject` parameter used as receiver.
    pub element: SymbolId,
}

#[derive(Debug, Clone, Copy)]
pub struct AttachedAccessors<'a> {
    pub get: Option<AttachedAccessor<'a>>,
    pub set: Option<AttachedAccessor<'a>>,
}

fn public_static_method<'a>(method: SymbolId, compilation: &Compilation<'a>) -> Option<&'a MethodDecl> {
    let symbol = compilation.symbols().get(method);
    if symbol.kind != SymbolKind::Method
        || !symbol.flags.is_static
        || symbol.accessibility != crate::semantic::Accessibility::Public
    {
        return None;
    }
    match compilation.declaration(method)? {
        Declaration::Method(decl) => Some(decl),
        _ => None,
    }
}

/// `public static T GetBar(DependencyObject element) => (T)element.GetValue(BarProperty);`
pub fn match_attached_get<'a>(method: SymbolId, compilation: &Compilation<'a>) -> Option<AttachedAccessor<'a>> {
    let decl = public_static_method(method, compilation)?;
    let symbol = compilation.symbols().get(method);
    let [element] = symbol.parameters.as_slice() else {
        return None;
    };
    if !DEPENDENCY_OBJECT.is_base_of(&compilation.symbols().get(*element).ty, compilation)
        || SYSTEM_VOID.is_type(&symbol.ty, compilation)
    {
        return None;
    }

    let model = compilation.model(symbol.file?)?;
    let Expr::Invocation(invocation) = strip_conversion(single_expression(decl.body.as_ref()?)?) else {
        return None;
    };
    let call = match_value_call(ValueCallKind::GetValue, invocation, &model)?;
    if model.symbol_info(call.receiver?.unparenthesized()) != Some(*element) {
        return None;
    }
    Some(AttachedAccessor {
        method,
        decl,
        call,
        backing: call.backing_member(&model)?,
        element: *element,
    })
}

/// `public static void SetBar(DependencyObject element, T value) => element.SetValue(BarProperty, value);`
pub fn match_attached_set<'a>(method: SymbolId, compilation: &Compilation<'a>) -> Option<AttachedAccessor<'a>> {
    let decl = public_static_method(method, compilation)?;
    let symbol = compilation.symbols().get(method);
    let [element, value] = symbol.parameters.as_slice() else {
        return None;
    };
    if !DEPENDENCY_OBJECT.is_base_of(&compilation.symbols().get(*element).ty, compilation)
        || !SYSTEM_VOID.is_type(&symbol.ty, compilation)
    {
        return None;
    }

    let model = compilation.model(symbol.file?)?;
    let Expr::Invocation(invocation) = single_expression(decl.body.as_ref()?)? else {
        return None;
    };
    let call = match_value_call(ValueCallKind::SetValue, invocation, &model)?;
    if model.symbol_info(call.receiver?.unparenthesized()) != Some(*element)
        || !call.uses_parameter(*value, &model)
    {
        return None;
    }
    Some(AttachedAccessor {
        method,
        decl,
        call,
        backing: call.backing_member(&model)?,
        element: *element,
    })
}

/// `Get{Name}` / `Set{Name}` of an attached property, when at least one exists and both
/// agree on the backing member.
pub fn attached_accessors<'a>(
    backing: BackingMember,
    model: &SemanticModel<'_, 'a>,
    cancellation: &CancellationToken,
) -> Option<AttachedAccessors<'a>> {
    let compilation = model.compilation();
    let name = match backing.registered_name(model, cancellation) {
        Some(registered) => registered.name,
        None => backing.registered_name_by_convention(compilation)?.to_string(),
    };
    let find = |prefix: &str| {
        compilation
            .symbols()
            .members_named(backing.containing_type, &format!("{prefix}{name}"))
            .iter()
            .copied()
            .filter(|&m| compilation.symbols().get(m).kind == SymbolKind::Method)
            .collect::<Vec<_>>()
    };
    let get = find("Get").into_iter().find_map(|m| match_attached_get(m, compilation));
    let set = find("Set").into_iter().find_map(|m| match_attached_set(m, compilation));

    let property = if backing.is_key() {
        alias::property_for_key(backing, compilation).unwrap_or(backing)
    } else {
        backing
    };
    let matches_backing = |accessor: &AttachedAccessor<'_>| {
        agree(property, accessor.backing, compilation) || accessor.backing == backing
    };
    if get.is_none() && set.is_none() {
        return None;
    }
    if !get.iter().chain(set.iter()).all(matches_backing) {
        return None;
    }
    Some(AttachedAccessors { get, set })
}
