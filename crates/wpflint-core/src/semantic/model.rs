//! Per-file semantic queries over a [`Compilation`].
//!
//! A `SemanticModel` is cheap to create and holds no state of its own: every answer is
//! computed from the immutable compilation, so asking the same question twice gives the
//! same answer.

use std::ops::ControlFlow;

use super::binder::{BindContext, Binder};
use super::compilation::{Compilation, Declaration, FileIndex};
use super::scope::NamespaceOrType;
use super::symbols::{FileId, Symbol, SymbolId, SymbolKind, SymbolTable, TypeRef};
use crate::parser::ParsedFile;
use crate::syntax::{
    Argument, Body, Expr, Ident, Invocation, LiteralKind, MemberAccess, NameExpr, ObjectCreation,
    Span, Stmt, TypeKind, TypeSyntax,
};
use crate::visitor::{self, AstVisitor, VisitorContext};

/// Bound on nested inference (`var` initializers, constant fields referring to each other).
const MAX_INFERENCE_DEPTH: usize = 16;

/// Compile-time value of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    String(String),
    Char(char),
    Integer(i128),
    Real(f64),
    Bool(bool),
    Null,
}

impl ConstantValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Result of looking a name up.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Symbol(SymbolId),
    /// Every accessible method with the name, derived types first.
    Methods(Vec<SymbolId>),
    None,
}

/// What the left side of a member access denotes.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Namespace(SymbolId),
    Type(SymbolId),
    Value(TypeRef),
}

#[derive(Clone, Copy)]
pub struct SemanticModel<'c, 'a> {
    compilation: &'c Compilation<'a>,
    file_id: FileId,
    file: &'a ParsedFile,
    index: &'c FileIndex,
}

impl<'a> Compilation<'a> {
    pub fn model(&self, file: FileId) -> Option<SemanticModel<'_, 'a>> {
        Some(SemanticModel {
            compilation: self,
            file_id: file,
            file: self.file(file)?,
            index: self.index(file)?,
        })
    }

    pub fn model_for(&self, file: &ParsedFile) -> Option<SemanticModel<'_, 'a>> {
        self.model(self.file_id(file)?)
    }
}

impl<'c, 'a> SemanticModel<'c, 'a> {
    pub fn compilation(&self) -> &'c Compilation<'a> {
        self.compilation
    }

    pub fn file(&self) -> &'a ParsedFile {
        self.file
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn symbols(&self) -> &'c SymbolTable {
        self.compilation.symbols()
    }

    pub fn symbol(&self, id: SymbolId) -> &'c Symbol {
        self.compilation.symbols().get(id)
    }

    pub fn declaration(&self, id: SymbolId) -> Option<Declaration<'a>> {
        self.compilation.declaration(id)
    }

    fn binder(&self) -> Binder<'c> {
        self.compilation.binder()
    }

    /// Model of the file declaring `symbol`; `self` when it is declared in this file.
    pub fn for_symbol(&self, symbol: SymbolId) -> Option<SemanticModel<'c, 'a>> {
        let file = self.symbol(symbol).file?;
        self.compilation.model(file)
    }

    /// Innermost source type whose declaration contains `offset`.
    pub fn enclosing_type(&self, offset: u32) -> Option<SymbolId> {
        innermost(&self.index.types, offset)
    }

    /// Innermost field, property, method or constructor whose declaration contains `offset`.
    pub fn enclosing_member(&self, offset: u32) -> Option<SymbolId> {
        innermost(&self.index.members, offset)
    }

    /// Symbol declared by an identifier of a declaration in this file.
    pub fn declared_symbol(&self, name: &Ident) -> Option<SymbolId> {
        self.index.declared.get(&name.span.lo).copied()
    }

    pub fn bind_context_at(&self, offset: u32) -> BindContext {
        let scope = self
            .compilation
            .scopes()
            .innermost_at(self.index.root_scope, offset);
        let method_type_parameters = self
            .enclosing_member(offset)
            .map(|m| self.symbol(m).type_parameters.clone())
            .unwrap_or_default();
        BindContext::new(scope)
            .in_type(self.enclosing_type(offset))
            .with_type_parameters(method_type_parameters)
    }

    pub fn bind_type(&self, syntax: &TypeSyntax) -> TypeRef {
        let ctx = self.bind_context_at(syntax.span().lo);
        self.binder().bind_type(syntax, &ctx)
    }

    /// Declared type of a field, property, parameter or local; return type of a method.
    ///
    /// `var` locals take the type of their initializer.
    pub fn symbol_type(&self, id: SymbolId) -> TypeRef {
        self.symbol_type_at(id, 0)
    }

    fn symbol_type_at(&self, id: SymbolId, depth: usize) -> TypeRef {
        let symbol = self.symbol(id);
        if symbol.kind == SymbolKind::Local && symbol.flags.is_implicit {
            if depth >= MAX_INFERENCE_DEPTH {
                return TypeRef::Unknown;
            }
            if let Some(Declaration::Local { declarator, .. }) = self.declaration(id) {
                if let (Some(init), Some(model)) = (&declarator.initializer, self.for_symbol(id)) {
                    return model.type_of_at(init, depth + 1);
                }
            }
            return TypeRef::Unknown;
        }
        match symbol.kind {
            SymbolKind::Type(_) | SymbolKind::Namespace => TypeRef::Unknown,
            _ => symbol.ty.clone(),
        }
    }

    /// The symbol an expression refers to.
    ///
    /// Method groups answer only when they hold a single method; invocations and object
    /// creations answer with the method or constructor chosen by overload resolution.
    pub fn symbol_info(&self, expr: &Expr) -> Option<SymbolId> {
        match expr {
            Expr::Invocation(invocation) => self.resolve_invocation(invocation),
            Expr::ObjectCreation(creation) => self.resolve_constructor(creation),
            Expr::Parenthesized(paren) => self.symbol_info(&paren.expr),
            _ => match self.lookup(expr) {
                Lookup::Symbol(id) => Some(id),
                Lookup::Methods(methods) if methods.len() == 1 => Some(methods[0]),
                _ => None,
            },
        }
    }

    /// Methods an expression names, e.g. every `SetValue` overload for `this.SetValue`.
    pub fn method_group(&self, expr: &Expr) -> Vec<SymbolId> {
        match self.lookup(expr) {
            Lookup::Methods(methods) => methods,
            _ => Vec::new(),
        }
    }

    pub fn lookup(&self, expr: &Expr) -> Lookup {
        match expr {
            Expr::Name(name) => self.lookup_name(name),
            Expr::MemberAccess(access) => self.lookup_member_access(access),
            Expr::Parenthesized(paren) => self.lookup(&paren.expr),
            _ => Lookup::None,
        }
    }

    fn lookup_name(&self, name: &NameExpr) -> Lookup {
        let text = name.ident.text.as_str();
        let offset = name.span.lo;
        let arity = name.type_arguments.len();

        if arity == 0 {
            if let Some(local) = self.lookup_local(text, offset) {
                return Lookup::Symbol(local);
            }
        }

        let mut ty = self.enclosing_type(offset);
        while let Some(current) = ty {
            let found = self.members_of(current, text, arity);
            if found != Lookup::None {
                return found;
            }
            ty = self
                .symbol(current)
                .container
                .filter(|&c| self.symbol(c).kind.is_type());
        }

        let ctx = self.bind_context_at(offset);
        for scope in self.compilation.scopes().ancestors(ctx.scope) {
            for &imported in &scope.static_imports {
                let found = self.members_of(imported, text, arity);
                if found != Lookup::None {
                    return found;
                }
            }
        }

        match self.binder().lookup_name(text, arity, &ctx) {
            Some(NamespaceOrType::Namespace(ns)) => Lookup::Symbol(ns),
            Some(NamespaceOrType::Type(ty)) => ty.symbol().map_or(Lookup::None, Lookup::Symbol),
            None => Lookup::None,
        }
    }

    /// Innermost parameter or local named `name` visible at `offset`.
    fn lookup_local(&self, name: &str, offset: u32) -> Option<SymbolId> {
        self.index
            .locals
            .iter()
            .copied()
            .filter(|&id| {
                let symbol = self.symbol(id);
                symbol.name == name && symbol.scope.is_some_and(|s| s.contains(offset))
            })
            .max_by_key(|&id| self.symbol(id).scope.map(|s| s.lo))
    }

    /// Members named `name` of `ty` and its base types. Methods aggregate across bases;
    /// a base method with the same signature as a derived one is hidden.
    fn members_of(&self, ty: SymbolId, name: &str, arity: usize) -> Lookup {
        let symbols = self.symbols();
        let mut methods: Vec<SymbolId> = Vec::new();

        for base in symbols.base_chain(ty) {
            for &member in symbols.members_named(base, name) {
                let symbol = symbols.get(member);
                match symbol.kind {
                    SymbolKind::Method => {
                        if symbol.type_parameters.len() < arity {
                            continue;
                        }
                        if !methods.iter().any(|&m| self.same_signature(m, member)) {
                            methods.push(member);
                        }
                    }
                    SymbolKind::Field | SymbolKind::Property if methods.is_empty() => {
                        return Lookup::Symbol(member);
                    }
                    SymbolKind::Type(_) if methods.is_empty() => {
                        if symbol.type_parameters.len() == arity {
                            return Lookup::Symbol(member);
                        }
                    }
                    _ => {}
                }
            }
        }

        if methods.is_empty() {
            Lookup::None
        } else {
            Lookup::Methods(methods)
        }
    }

    fn same_signature(&self, a: SymbolId, b: SymbolId) -> bool {
        let (a, b) = (self.symbol(a), self.symbol(b));
        a.parameters.len() == b.parameters.len()
            && a
                .parameters
                .iter()
                .zip(&b.parameters)
                .all(|(&pa, &pb)| self.symbol(pa).ty == self.symbol(pb).ty)
    }

    fn lookup_member_access(&self, access: &MemberAccess) -> Lookup {
        let name = access.name.text.as_str();
        let arity = access.type_arguments.len();
        match self.classify_target(&access.target) {
            Some(Target::Namespace(ns)) => self
                .symbols()
                .child_type_or_namespace(ns, name, arity)
                .map_or(Lookup::None, Lookup::Symbol),
            Some(Target::Type(ty)) => self.members_of(ty, name, arity),
            Some(Target::Value(value)) => match value.symbol() {
                Some(ty) => self.members_of(ty, name, arity),
                None => Lookup::None,
            },
            None => Lookup::None,
        }
    }

    fn classify_target(&self, target: &Expr) -> Option<Target> {
        match target {
            Expr::PredefinedType(predefined) => {
                let ty = self.binder().predefined(&predefined.keyword);
                ty.symbol().map(Target::Type)
            }
            Expr::This(span) => self
                .enclosing_type(span.lo)
                .map(|ty| Target::Value(TypeRef::named(ty))),
            Expr::Name(_) | Expr::MemberAccess(_) => match self.lookup(target) {
                Lookup::Symbol(id) => {
                    let symbol = self.symbol(id);
                    match symbol.kind {
                        SymbolKind::Namespace => Some(Target::Namespace(id)),
                        SymbolKind::Type(_) => Some(Target::Type(id)),
                        _ => Some(Target::Value(self.type_of(target))),
                    }
                }
                _ => None,
            },
            _ => Some(Target::Value(self.type_of(target))),
        }
    }

    pub fn resolve_invocation(&self, invocation: &Invocation) -> Option<SymbolId> {
        let candidates = self.method_group(&invocation.callee);
        if candidates.is_empty() {
            return None;
        }
        self.select_overload(&candidates, &invocation.arguments)
    }

    pub fn resolve_constructor(&self, creation: &ObjectCreation) -> Option<SymbolId> {
        let ty = self.bind_type(&creation.ty).symbol()?;
        let name = self.symbol(ty).name.clone();
        let constructors: Vec<SymbolId> = self
            .symbols()
            .members_named(ty, &name)
            .iter()
            .copied()
            .filter(|&id| {
                let symbol = self.symbol(id);
                symbol.kind == SymbolKind::Constructor && !symbol.flags.is_static
            })
            .collect();
        if constructors.is_empty() {
            return None;
        }
        self.select_overload(&constructors, &creation.arguments)
    }

    /// Parameter each argument binds to, by position or by name.
    pub fn map_arguments(&self, method: SymbolId, arguments: &[Argument]) -> Option<Vec<SymbolId>> {
        let parameters = &self.symbol(method).parameters;
        let mut used = vec![false; parameters.len()];
        let mut mapped = Vec::with_capacity(arguments.len());
        let mut named_seen = false;

        for (position, argument) in arguments.iter().enumerate() {
            let index = match &argument.name {
                Some(name) => {
                    named_seen = true;
                    parameters
                        .iter()
                        .position(|&p| self.symbol(p).name == name.text)?
                }
                None if named_seen => return None,
                None if position < parameters.len() => position,
                None => {
                    let last = parameters.len().checked_sub(1)?;
                    if !self.symbol(parameters[last]).flags.is_params {
                        return None;
                    }
                    last
                }
            };
            if used[index] && !self.symbol(parameters[index]).flags.is_params {
                return None;
            }
            used[index] = true;
            mapped.push(parameters[index]);
        }

        let all_supplied = parameters.iter().zip(&used).all(|(&p, &was_used)| {
            let flags = self.symbol(p).flags;
            was_used || flags.has_default || flags.is_params
        });
        all_supplied.then_some(mapped)
    }

    /// Overload resolution: applicable candidates, then the single most specific one.
    fn select_overload(&self, candidates: &[SymbolId], arguments: &[Argument]) -> Option<SymbolId> {
        let applicable: Vec<(SymbolId, Vec<SymbolId>)> = candidates
            .iter()
            .filter_map(|&candidate| {
                let mapped = self.map_arguments(candidate, arguments)?;
                let compatible = arguments
                    .iter()
                    .zip(&mapped)
                    .all(|(argument, &parameter)| {
                        self.argument_compatible(&argument.expr, &self.symbol(parameter).ty)
                    });
                compatible.then_some((candidate, mapped))
            })
            .collect();

        match applicable.as_slice() {
            [] => None,
            [(only, _)] => Some(*only),
            _ => {
                let best: Vec<SymbolId> = applicable
                    .iter()
                    .filter(|(candidate, mapped)| {
                        applicable.iter().all(|(other, other_mapped)| {
                            other == candidate
                                || self.is_better(*candidate, mapped, *other, other_mapped)
                        })
                    })
                    .map(|(candidate, _)| *candidate)
                    .collect();
                match best.as_slice() {
                    [single] => Some(*single),
                    _ => None,
                }
            }
        }
    }

    fn is_better(&self, a: SymbolId, a_params: &[SymbolId], b: SymbolId, b_params: &[SymbolId]) -> bool {
        let pairs: Vec<(&TypeRef, &TypeRef)> = a_params
            .iter()
            .zip(b_params)
            .map(|(&pa, &pb)| (&self.symbol(pa).ty, &self.symbol(pb).ty))
            .collect();
        let more_specific =
            |ta: &TypeRef, tb: &TypeRef| self.is_convertible(ta, tb) && !self.is_convertible(tb, ta);

        if !pairs.iter().all(|(ta, tb)| ta == tb || more_specific(ta, tb)) {
            return false;
        }
        if pairs.iter().any(|(ta, tb)| ta != tb) {
            return true;
        }
        // Same parameter types: the candidate that needs fewer defaulted parameters wins.
        let omitted = |method: SymbolId, mapped: &[SymbolId]| {
            self.symbol(method).parameters.len().saturating_sub(mapped.len())
        };
        omitted(a, a_params) < omitted(b, b_params)
    }

    fn argument_compatible(&self, argument: &Expr, parameter: &TypeRef) -> bool {
        if parameter.is_unknown() {
            return true;
        }
        match argument.unparenthesized() {
            Expr::Lambda(lambda) => self
                .delegate_invoke(parameter)
                .is_some_and(|invoke| self.symbol(invoke).parameters.len() == lambda.parameters.len()),
            expr @ (Expr::Name(_) | Expr::MemberAccess(_)) => match self.lookup(expr) {
                Lookup::Methods(methods) => self.delegate_invoke(parameter).is_some_and(|invoke| {
                    let arity = self.symbol(invoke).parameters.len();
                    methods.iter().any(|&m| self.symbol(m).parameters.len() == arity)
                }),
                _ => self.expression_convertible(expr, parameter),
            },
            expr => self.expression_convertible(expr, parameter),
        }
    }

    fn expression_convertible(&self, expr: &Expr, target: &TypeRef) -> bool {
        let source = self.type_of(expr);
        if self.is_convertible(&source, target) {
            return true;
        }
        // Constant int expressions convert to any integral type.
        matches!(
            (self.constant_value(expr), self.numeric_name(target)),
            (Some(ConstantValue::Integer(_)), Some(name)) if INTEGRAL.contains(&name)
        ) && self.numeric_name(&source) == Some("System.Int32")
    }

    /// `Invoke` of the delegate type `ty`.
    pub fn delegate_invoke(&self, ty: &TypeRef) -> Option<SymbolId> {
        let symbol = ty.symbol()?;
        if self.symbol(symbol).type_kind() != Some(TypeKind::Delegate) {
            return None;
        }
        self.symbols()
            .members_named(symbol, "Invoke")
            .first()
            .copied()
    }

    /// Static type of an expression; `Unknown` when it cannot be inferred.
    pub fn type_of(&self, expr: &Expr) -> TypeRef {
        self.type_of_at(expr, 0)
    }

    fn type_of_at(&self, expr: &Expr, depth: usize) -> TypeRef {
        if depth > MAX_INFERENCE_DEPTH {
            return TypeRef::Unknown;
        }
        match expr {
            Expr::Literal(literal) => self.literal_type(&literal.kind),
            Expr::Name(_) | Expr::MemberAccess(_) => match self.lookup(expr) {
                Lookup::Symbol(id) => {
                    let ty = self.symbol_type_at(id, depth);
                    match expr {
                        Expr::MemberAccess(access) => self.substitute(&access.target, ty),
                        _ => ty,
                    }
                }
                _ => TypeRef::Unknown,
            },
            Expr::Invocation(invocation) if invocation.is_nameof() => self.known("System.String"),
            Expr::Invocation(invocation) => match self.resolve_invocation(invocation) {
                Some(method) => {
                    let ty = self.symbol(method).ty.clone();
                    match invocation.callee.as_ref() {
                        Expr::MemberAccess(access) => self.substitute(&access.target, ty),
                        _ => ty,
                    }
                }
                None => TypeRef::Unknown,
            },
            Expr::ObjectCreation(creation) => self.bind_type(&creation.ty),
            Expr::Cast(cast) => self.bind_type(&cast.ty),
            Expr::As(as_expr) => self.bind_type(&as_expr.ty),
            Expr::TypeOf(_) => self.known("System.Type"),
            Expr::Default(default) => default
                .ty
                .as_ref()
                .map_or(TypeRef::Unknown, |ty| self.bind_type(ty)),
            Expr::Unary(unary) => match unary.operator.as_str() {
                "!" => self.known("System.Boolean"),
                "-" | "+" | "~" | "++" | "--" => self.type_of_at(&unary.operand, depth + 1),
                _ => TypeRef::Unknown,
            },
            Expr::Parenthesized(paren) => self.type_of_at(&paren.expr, depth + 1),
            Expr::Assignment(assignment) => self.type_of_at(&assignment.left, depth + 1),
            Expr::This(span) => self
                .enclosing_type(span.lo)
                .map_or(TypeRef::Unknown, TypeRef::named),
            Expr::Other(other) => match other.kind.as_str() {
                "interpolated_string_expression" => self.known("System.String"),
                "is_expression" | "is_pattern_expression" => self.known("System.Boolean"),
                _ => TypeRef::Unknown,
            },
            Expr::Lambda(_) | Expr::PredefinedType(_) => TypeRef::Unknown,
        }
    }

    /// Replaces a type parameter of the receiver's generic type by its type argument.
    fn substitute(&self, receiver: &Expr, ty: TypeRef) -> TypeRef {
        let TypeRef::TypeParameter(name) = &ty else {
            return ty;
        };
        let receiver_type = match self.classify_target(receiver) {
            Some(Target::Value(value)) => value,
            _ => return ty,
        };
        match &receiver_type {
            TypeRef::Named { symbol, args } => self
                .symbol(*symbol)
                .type_parameters
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i).cloned())
                .unwrap_or(ty),
            _ => ty,
        }
    }

    fn literal_type(&self, literal: &LiteralKind) -> TypeRef {
        match literal {
            LiteralKind::String(_) => self.known("System.String"),
            LiteralKind::Char(_) => self.known("System.Char"),
            LiteralKind::Boolean(_) => self.known("System.Boolean"),
            LiteralKind::Null => TypeRef::Null,
            LiteralKind::Integer { value, suffix } => {
                let name = match suffix.as_str() {
                    "l" => "System.Int64",
                    "u" => "System.UInt32",
                    "ul" | "lu" => "System.UInt64",
                    _ if *value <= i32::MAX as u64 => "System.Int32",
                    _ if *value <= u32::MAX as u64 => "System.UInt32",
                    _ if *value <= i64::MAX as u64 => "System.Int64",
                    _ => "System.UInt64",
                };
                self.known(name)
            }
            LiteralKind::Real { suffix, .. } => match suffix.as_str() {
                "f" => self.known("System.Single"),
                "m" => self.known("System.Decimal"),
                _ => self.known("System.Double"),
            },
        }
    }

    fn known(&self, metadata_name: &str) -> TypeRef {
        self.binder()
            .known_type(metadata_name)
            .map_or(TypeRef::Unknown, TypeRef::named)
    }

    /// Compile-time constant value of literals, `nameof` and constant fields.
    pub fn constant_value(&self, expr: &Expr) -> Option<ConstantValue> {
        self.constant_value_at(expr, 0)
    }

    fn constant_value_at(&self, expr: &Expr, depth: usize) -> Option<ConstantValue> {
        if depth > MAX_INFERENCE_DEPTH {
            return None;
        }
        match expr {
            Expr::Literal(literal) => Some(match &literal.kind {
                LiteralKind::String(s) => ConstantValue::String(s.clone()),
                LiteralKind::Char(c) => ConstantValue::Char(*c),
                LiteralKind::Integer { value, .. } => ConstantValue::Integer(i128::from(*value)),
                LiteralKind::Real { value, .. } => ConstantValue::Real(*value),
                LiteralKind::Boolean(b) => ConstantValue::Bool(*b),
                LiteralKind::Null => ConstantValue::Null,
            }),
            Expr::Invocation(invocation) if invocation.is_nameof() => {
                let argument = invocation.arguments.first()?;
                let name = match argument.expr.unparenthesized() {
                    Expr::Name(name) => name.ident.text.clone(),
                    Expr::MemberAccess(access) => access.name.text.clone(),
                    Expr::PredefinedType(predefined) => predefined.keyword.clone(),
                    _ => return None,
                };
                Some(ConstantValue::String(name))
            }
            Expr::Parenthesized(paren) => self.constant_value_at(&paren.expr, depth + 1),
            Expr::Cast(cast) => self.constant_value_at(&cast.expr, depth + 1),
            Expr::Unary(unary) => match (unary.operator.as_str(), self.constant_value_at(&unary.operand, depth + 1)?) {
                ("-", ConstantValue::Integer(i)) => Some(ConstantValue::Integer(-i)),
                ("-", ConstantValue::Real(r)) => Some(ConstantValue::Real(-r)),
                ("+", value @ (ConstantValue::Integer(_) | ConstantValue::Real(_))) => Some(value),
                ("!", ConstantValue::Bool(b)) => Some(ConstantValue::Bool(!b)),
                _ => None,
            },
            Expr::Name(_) | Expr::MemberAccess(_) => {
                let Lookup::Symbol(id) = self.lookup(expr) else {
                    return None;
                };
                if !self.symbol(id).flags.is_const {
                    return None;
                }
                let Some(Declaration::Field { declarator, .. }) = self.declaration(id) else {
                    return None;
                };
                let init = declarator.initializer.as_ref()?;
                self.for_symbol(id)?.constant_value_at(init, depth + 1)
            }
            _ => None,
        }
    }

    /// Implicit reference or boxing conversion; unknown types are assignable both ways.
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if from.is_unknown() || to.is_unknown() || from == to {
            return true;
        }
        match (from, to) {
            (TypeRef::Null, _) => self.is_reference_or_nullable(to),
            (TypeRef::Array(a), TypeRef::Array(b)) => self.is_reference_type(a) && self.is_assignable(a, b),
            (TypeRef::Array(_), TypeRef::Named { symbol, .. }) => {
                Some(*symbol) == self.binder().known_type("System.Object")
            }
            (TypeRef::Named { .. }, TypeRef::Named { symbol: target, args }) => {
                if self.is_nullable_of(to, from) {
                    return true;
                }
                let Some(source) = from.symbol() else {
                    return false;
                };
                let symbols = self.symbols();
                if symbols.base_chain(source).skip(1).any(|base| base == *target) {
                    return args.is_empty() || self.base_args_match(source, *target, args);
                }
                self.implements(source, *target)
            }
            _ => false,
        }
    }

    fn base_args_match(&self, source: SymbolId, target: SymbolId, args: &[TypeRef]) -> bool {
        self.symbols()
            .base_chain(source)
            .filter_map(|ty| self.symbol(ty).base_type.clone())
            .find(|base| base.symbol() == Some(target))
            .is_some_and(|base| match base {
                TypeRef::Named { args: base_args, .. } => {
                    base_args.is_empty() || base_args.as_slice() == args
                }
                _ => false,
            })
    }

    fn implements(&self, source: SymbolId, interface: SymbolId) -> bool {
        let symbols = self.symbols();
        let mut pending: Vec<SymbolId> = symbols
            .base_chain(source)
            .flat_map(|ty| symbols.get(ty).interfaces.iter().filter_map(TypeRef::symbol))
            .collect();
        let mut seen = Vec::new();
        while let Some(current) = pending.pop() {
            if current == interface {
                return true;
            }
            if seen.contains(&current) || seen.len() > 64 {
                continue;
            }
            seen.push(current);
            pending.extend(symbols.get(current).interfaces.iter().filter_map(TypeRef::symbol));
        }
        false
    }

    fn is_nullable_of(&self, nullable: &TypeRef, inner: &TypeRef) -> bool {
        match nullable {
            TypeRef::Named { symbol, args } => {
                Some(*symbol) == self.binder().known_type("System.Nullable`1")
                    && args.first().is_some_and(|arg| arg == inner)
            }
            _ => false,
        }
    }

    pub fn is_reference_type(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Array(_) | TypeRef::Null => true,
            TypeRef::Named { symbol, .. } => matches!(
                self.symbol(*symbol).type_kind(),
                Some(TypeKind::Class | TypeKind::Interface | TypeKind::Delegate | TypeKind::Record)
            ),
            TypeRef::TypeParameter(_) | TypeRef::Unknown => false,
        }
    }

    pub fn is_value_type(&self, ty: &TypeRef) -> bool {
        ty.symbol().is_some_and(|symbol| {
            matches!(
                self.symbol(symbol).type_kind(),
                Some(TypeKind::Struct | TypeKind::Enum)
            )
        })
    }

    fn is_reference_or_nullable(&self, ty: &TypeRef) -> bool {
        self.is_reference_type(ty)
            || ty.symbol().is_some_and(|s| Some(s) == self.binder().known_type("System.Nullable`1"))
    }

    /// Implicit conversion: assignability plus implicit numeric widening.
    pub fn is_convertible(&self, from: &TypeRef, to: &TypeRef) -> bool {
        if self.is_assignable(from, to) {
            return true;
        }
        let target = match to {
            TypeRef::Named { symbol, args }
                if Some(*symbol) == self.binder().known_type("System.Nullable`1") =>
            {
                args.first().unwrap_or(to)
            }
            _ => to,
        };
        match (self.numeric_name(from), self.numeric_name(target)) {
            (Some(source), Some(target)) => widens(source, target),
            _ => false,
        }
    }

    fn numeric_name(&self, ty: &TypeRef) -> Option<&'static str> {
        let TypeRef::Named { symbol, args } = ty else {
            return None;
        };
        if !args.is_empty() {
            return None;
        }
        NUMERIC
            .iter()
            .copied()
            .find(|name| self.binder().known_type(name) == Some(*symbol))
    }

    /// Identifier spans in this file that refer to `target`.
    pub fn find_references(&self, target: SymbolId) -> Vec<Span> {
        let name = self.symbol(target).name.clone();
        let mut finder = ReferenceFinder {
            model: self,
            target,
            name: &name,
            found: Vec::new(),
        };
        let ctx = VisitorContext::new(self.file);
        let _ = visitor::walk_ast(self.file.unit(), &mut finder, &ctx);
        finder.found.sort();
        finder.found.dedup();
        finder.found
    }

    fn refers_to(&self, expr: &Expr, target: SymbolId) -> bool {
        match self.lookup(expr) {
            Lookup::Symbol(id) => id == target,
            Lookup::Methods(methods) => methods.contains(&target),
            Lookup::None => false,
        }
    }
}

fn innermost(spans: &[(Span, SymbolId)], offset: u32) -> Option<SymbolId> {
    spans
        .iter()
        .filter(|(span, _)| span.contains(offset))
        .min_by_key(|(span, _)| span.len())
        .map(|(_, id)| *id)
}

const NUMERIC: &[&str] = &[
    "System.SByte",
    "System.Byte",
    "System.Int16",
    "System.UInt16",
    "System.Int32",
    "System.UInt32",
    "System.Int64",
    "System.UInt64",
    "System.Char",
    "System.Single",
    "System.Double",
    "System.Decimal",
];

const INTEGRAL: &[&str] = &[
    "System.SByte",
    "System.Byte",
    "System.Int16",
    "System.UInt16",
    "System.Int32",
    "System.UInt32",
    "System.Int64",
    "System.UInt64",
];

/// Implicit numeric conversions.
fn widens(from: &str, to: &str) -> bool {
    let targets: &[&str] = match from {
        "System.SByte" => &["Int16", "Int32", "Int64", "Single", "Double", "Decimal"],
        "System.Byte" => &[
            "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64", "Single", "Double", "Decimal",
        ],
        "System.Int16" => &["Int32", "Int64", "Single", "Double", "Decimal"],
        "System.UInt16" => &["Int32", "UInt32", "Int64", "UInt64", "Single", "Double", "Decimal"],
        "System.Int32" => &["Int64", "Single", "Double", "Decimal"],
        "System.UInt32" => &["Int64", "UInt64", "Single", "Double", "Decimal"],
        "System.Int64" | "System.UInt64" => &["Single", "Double", "Decimal"],
        "System.Char" => &[
            "UInt16", "Int32", "UInt32", "Int64", "UInt64", "Single", "Double", "Decimal",
        ],
        "System.Single" => &["Double"],
        _ => &[],
    };
    to.strip_prefix("System.")
        .is_some_and(|simple| targets.contains(&simple))
}

struct ReferenceFinder<'m, 'c, 'a> {
    model: &'m SemanticModel<'c, 'a>,
    target: SymbolId,
    name: &'m str,
    found: Vec<Span>,
}

impl<'ast> AstVisitor<'ast> for ReferenceFinder<'_, '_, '_> {
    fn visit_expr(&mut self, node: &'ast Expr, _ctx: &VisitorContext) -> ControlFlow<()> {
        let ident = match node {
            Expr::Name(name) => &name.ident,
            Expr::MemberAccess(access) => &access.name,
            _ => return ControlFlow::Continue(()),
        };
        if ident.text == self.name && self.model.refers_to(node, self.target) {
            self.found.push(ident.span);
        }
        ControlFlow::Continue(())
    }
}

/// Statements of a member body, with an expression body as its only statement.
pub fn body_expressions(body: &Body) -> Vec<&Expr> {
    match body {
        Body::Expression(expr) => vec![expr],
        Body::Block(block) => block
            .statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expression { expr, .. } => Some(expr),
                Stmt::Return { expr: Some(expr), .. } => Some(expr),
                _ => None,
            })
            .collect(),
    }
}
