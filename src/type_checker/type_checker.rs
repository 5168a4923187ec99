use std::collections::{BTreeSet, HashMap};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayDerefExpr, FuncCallExpr, IndexAccessExpr, NotExpr, ObjectDerefExpr, VariableExpr,
        },
        types::{ArrayType, ExprType, ObjectType},
        visitor::{walk, Visitor},
    },
    config::CheckConfig,
    errors::errors::{quote_all, ExprError},
    MK_ERROR,
};

use super::{
    builtins::{BUILTIN_FUNC_SIGNATURES, BUILTIN_GLOBAL_VARIABLE_TYPES, SPECIAL_FUNCTION_NAMES},
    functions::{check_format_call, check_from_json_call, FuncSignature},
    untrusted::UntrustedInputChecker,
};

lazy_static! {
    static ref CONFIG_VARIABLE_NAME: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

/// Infers types of expressions and validates them against the contexts and
/// functions available at one location.
///
/// Built-in context types are shared by every checker. Narrowing through the
/// `update_*` methods only writes to this checker's overlay, so checkers can
/// run side by side without seeing each other's changes.
#[derive(Debug, Default)]
pub struct SemanticChecker {
    overlay: HashMap<String, ExprType>,
    available_contexts: Option<Vec<String>>,
    available_special_funcs: Option<Vec<String>>,
    config_variables: Option<Vec<String>>,
    check_untrusted: bool,
    errors: Vec<ExprError>,
    stack: Vec<ExprType>,
}

impl SemanticChecker {
    pub fn new() -> Self {
        SemanticChecker::default()
    }

    pub fn with_config(config: &CheckConfig) -> Self {
        let mut checker = SemanticChecker {
            config_variables: config.config_variables.clone(),
            check_untrusted: config.check_untrusted_input,
            ..SemanticChecker::default()
        };
        if let Some(contexts) = &config.available_contexts {
            checker.set_context_availability(contexts.clone());
        }
        if let Some(funcs) = &config.available_special_funcs {
            checker.set_special_function_availability(funcs.clone());
        }
        checker
    }

    pub fn set_context_availability(&mut self, contexts: Vec<String>) {
        self.available_contexts = Some(contexts.into_iter().map(|c| c.to_lowercase()).collect());
    }

    pub fn set_special_function_availability(&mut self, funcs: Vec<String>) {
        self.available_special_funcs = Some(funcs.into_iter().map(|f| f.to_lowercase()).collect());
    }

    pub fn set_config_variables(&mut self, names: Vec<String>) {
        self.config_variables = Some(names);
    }

    pub fn enable_untrusted_input_check(&mut self, enabled: bool) {
        self.check_untrusted = enabled;
    }

    fn narrow(&mut self, name: &str, ty: ExprType) {
        tracing::trace!(context = name, ty = %ty, "narrowing context");
        self.overlay.insert(name.to_string(), ty);
    }

    pub fn update_matrix(&mut self, ty: ObjectType) {
        self.narrow("matrix", ExprType::Object(ty));
    }

    pub fn update_steps(&mut self, ty: ObjectType) {
        self.narrow("steps", ExprType::Object(ty));
    }

    pub fn update_needs(&mut self, ty: ObjectType) {
        self.narrow("needs", ExprType::Object(ty));
    }

    /// `secrets.GITHUB_TOKEN` is always available in addition to `ty`.
    pub fn update_secrets(&mut self, mut ty: ObjectType) {
        ty.insert("github_token", ExprType::String);
        self.narrow("secrets", ExprType::Object(ty));
    }

    pub fn update_inputs(&mut self, ty: ObjectType) {
        self.narrow("inputs", ExprType::Object(ty));
    }

    /// Inputs of `workflow_dispatch` are also reachable as
    /// `github.event.inputs`.
    pub fn update_dispatch_inputs(&mut self, ty: ObjectType) {
        let Some(ExprType::Object(mut github)) = self.lookup_variable("github").cloned() else {
            tracing::error!("github context is not an object");
            return;
        };
        let mut event = match github.props.get("event") {
            Some(ExprType::Object(event)) => event.clone(),
            _ => ObjectType::empty_loose(),
        };
        event.insert("inputs", ExprType::Object(ty));
        github.insert("event", ExprType::Object(event));
        self.narrow("github", ExprType::Object(github));
    }

    pub fn update_jobs(&mut self, ty: ObjectType) {
        self.narrow("jobs", ExprType::Object(ty));
    }

    /// Type of a context, narrowed or built-in.
    pub fn lookup_variable(&self, name: &str) -> Option<&ExprType> {
        self.overlay
            .get(name)
            .or_else(|| BUILTIN_GLOBAL_VARIABLE_TYPES.get(name))
    }

    fn variable_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = BUILTIN_GLOBAL_VARIABLE_TYPES
            .keys()
            .copied()
            .chain(self.overlay.keys().map(String::as_str))
            .collect();
        names.into_iter().map(String::from).collect()
    }

    /// Infers the type of `expr`. Type errors do not stop the check, so the
    /// returned type is always set; erroneous sub-expressions are `any`.
    #[tracing::instrument(level = "trace", skip_all, fields(expr = %expr))]
    pub fn check(&mut self, expr: &Expr) -> (ExprType, Vec<ExprError>) {
        self.errors.clear();
        self.stack.clear();

        let check_untrusted = self.check_untrusted;
        let mut untrusted = UntrustedInputChecker::builtin();
        {
            let mut subscribers: Vec<&mut dyn Visitor> = Vec::with_capacity(2);
            subscribers.push(&mut *self);
            if check_untrusted {
                subscribers.push(&mut untrusted);
            }
            walk(expr, &mut subscribers);
        }

        let mut errors = std::mem::take(&mut self.errors);
        if check_untrusted {
            errors.extend(untrusted.finish());
        }

        let ty = match self.stack.pop() {
            Some(ty) if self.stack.is_empty() => ty,
            top => {
                tracing::error!(remaining = self.stack.len(), "type stack is not balanced");
                self.stack.clear();
                top.unwrap_or(ExprType::Any)
            }
        };

        (ty, errors)
    }

    fn error(&mut self, error: ExprError) {
        self.errors.push(error);
    }

    fn pop_children(&mut self, n: usize) -> Vec<ExprType> {
        if self.stack.len() < n {
            tracing::error!(expected = n, actual = self.stack.len(), "type stack underflow");
            let mut tys = std::mem::take(&mut self.stack);
            tys.resize(n, ExprType::Any);
            return tys;
        }
        let at = self.stack.len() - n;
        self.stack.split_off(at)
    }

    fn pop_child(&mut self) -> ExprType {
        self.pop_children(1).pop().unwrap_or(ExprType::Any)
    }

    fn check_variable(&mut self, var: &VariableExpr) -> ExprType {
        let Some(ty) = self.lookup_variable(&var.name).cloned() else {
            let available = quote_all(&self.variable_names());
            self.error(MK_ERROR!(
                UndefinedVariable {
                    name: var.name.clone(),
                    available,
                },
                var.token.position
            ));
            return ExprType::Any;
        };

        if let Some(contexts) = &self.available_contexts {
            if !contexts.iter().any(|c| *c == var.name) {
                let noun = if contexts.len() == 1 {
                    "context is"
                } else {
                    "contexts are"
                };
                let error = MK_ERROR!(
                    ContextNotAllowed {
                        name: var.name.clone(),
                        noun: noun.to_string(),
                        available: quote_all(contexts),
                    },
                    var.token.position
                );
                self.error(error);
            }
        }

        ty
    }

    /// Validates the name of a `vars` configuration variable, whether accessed
    /// as `vars.name` or `vars['name']`.
    fn check_config_variable(&mut self, receiver: &Expr, object: &ObjectType, name: &str) {
        let is_vars = matches!(receiver, Expr::Variable(v) if v.name == "vars");
        if !is_vars || object.props.contains_key(name) {
            return;
        }
        let position = receiver.get_position();

        let reason = if name.starts_with("github_") {
            Some("must not start with the GITHUB_ prefix (case insensitive)")
        } else if name.starts_with(|c: char| c.is_ascii_digit()) {
            Some("must not start with a decimal number")
        } else if !CONFIG_VARIABLE_NAME.is_match(name) {
            Some("can only contain alphabets, decimal numbers, and '_'")
        } else {
            None
        };

        if let Some(reason) = reason {
            self.error(MK_ERROR!(
                InvalidConfigVariableName {
                    name: name.to_string(),
                    reason: reason.to_string(),
                },
                position
            ));
            return;
        }

        let Some(defined) = &self.config_variables else {
            return;
        };
        if !defined.iter().any(|v| v.eq_ignore_ascii_case(name)) {
            let error = MK_ERROR!(
                UndefinedConfigVariable {
                    name: name.to_string(),
                    available: quote_all(defined),
                },
                position
            );
            self.error(error);
        }
    }

    /// Resolves `name` on an object. Strict objects report unknown names.
    fn property_of(&mut self, object: &ObjectType, name: &str, deref: &Expr) -> ExprType {
        match object.get_property_type(name) {
            Some(ty) => ty,
            None => {
                self.error(MK_ERROR!(
                    UndefinedProperty {
                        property: name.to_string(),
                        object: object.to_string(),
                    },
                    deref.get_position()
                ));
                ExprType::Any
            }
        }
    }

    fn check_object_deref(&mut self, node: &Expr, deref: &ObjectDerefExpr, receiver: ExprType) -> ExprType {
        match receiver {
            ExprType::Any => ExprType::Any,
            ExprType::Object(object) => {
                self.check_config_variable(&deref.receiver, &object, &deref.property);
                self.property_of(&object, &deref.property, node)
            }
            ExprType::Array(array) if array.deref => match *array.elem {
                ExprType::Any => ExprType::filtered_array(ExprType::Any),
                ExprType::Object(elem) => match elem.get_property_type(&deref.property) {
                    Some(ty) => ExprType::filtered_array(ty),
                    None => {
                        self.error(MK_ERROR!(
                            UndefinedFilteredProperty {
                                property: deref.property.clone(),
                                object: elem.to_string(),
                            },
                            deref.token.position
                        ));
                        ExprType::filtered_array(ExprType::Any)
                    }
                },
                elem => {
                    self.error(MK_ERROR!(
                        InvalidFilteredElement {
                            property: deref.property.clone(),
                            received: elem.to_string(),
                        },
                        deref.token.position
                    ));
                    ExprType::filtered_array(ExprType::Any)
                }
            },
            received => {
                self.error(MK_ERROR!(
                    InvalidDerefReceiver {
                        property: deref.property.clone(),
                        received: received.to_string(),
                    },
                    deref.token.position
                ));
                ExprType::Any
            }
        }
    }

    fn check_array_deref(&mut self, deref: &ArrayDerefExpr, receiver: ExprType) -> ExprType {
        match receiver {
            ExprType::Any => ExprType::filtered_array(ExprType::Any),
            ExprType::Array(array) => ExprType::Array(ArrayType::new(*array.elem, true)),
            ExprType::Object(object) if !object.is_strict() => {
                ExprType::filtered_array(object.fallback_type().unwrap_or(ExprType::Any))
            }
            ExprType::Object(object)
                if object
                    .props
                    .values()
                    .any(|ty| matches!(ty, ExprType::Object(_))) =>
            {
                ExprType::filtered_array(ExprType::Any)
            }
            received => {
                self.error(MK_ERROR!(
                    InvalidFilterReceiver {
                        received: received.to_string(),
                    },
                    deref.token.position
                ));
                ExprType::filtered_array(ExprType::Any)
            }
        }
    }

    fn check_index_access(
        &mut self,
        node: &Expr,
        access: &IndexAccessExpr,
        index: ExprType,
        operand: ExprType,
    ) -> ExprType {
        match operand {
            ExprType::Any => ExprType::Any,
            ExprType::Array(array) => match index {
                ExprType::Any | ExprType::Number => *array.elem,
                received => {
                    self.error(MK_ERROR!(
                        InvalidArrayIndex {
                            received: received.to_string(),
                        },
                        access.index.get_position()
                    ));
                    ExprType::Any
                }
            },
            ExprType::Object(object) => match index {
                ExprType::Any => ExprType::Any,
                ExprType::String => match access.index.as_ref() {
                    Expr::String(literal) => {
                        let name = literal.value.to_lowercase();
                        self.check_config_variable(&access.operand, &object, &name);
                        self.property_of(&object, &name, node)
                    }
                    _ => object.fallback_type().unwrap_or(ExprType::Any),
                },
                received => {
                    self.error(MK_ERROR!(
                        InvalidObjectIndex {
                            received: received.to_string(),
                        },
                        access.index.get_position()
                    ));
                    ExprType::Any
                }
            },
            received => {
                self.error(MK_ERROR!(
                    InvalidIndexOperand {
                        received: received.to_string(),
                    },
                    access.token.position
                ));
                ExprType::Any
            }
        }
    }

    fn check_special_function(&mut self, call: &FuncCallExpr, name: &str) {
        let (Some(available), Some(keys)) = (&self.available_special_funcs, SPECIAL_FUNCTION_NAMES.get(name)) else {
            return;
        };
        if available.iter().any(|f| f == name) {
            return;
        }
        let error = MK_ERROR!(
            SpecialFunctionNotAllowed {
                name: call.callee.clone(),
                available_in: quote_all(keys),
            },
            call.token.position
        );
        self.error(error);
    }

    /// Extra checks of a call that matched `sig`. Returns the call's type.
    fn check_builtin_call(&mut self, call: &FuncCallExpr, sig: &FuncSignature) -> ExprType {
        match sig.name {
            "format" => {
                self.errors.extend(check_format_call(call));
                sig.ret.clone()
            }
            "fromJSON" => {
                let (ty, error) = check_from_json_call(call, &sig.ret);
                self.errors.extend(error);
                ty
            }
            _ => sig.ret.clone(),
        }
    }

    fn check_func_call(&mut self, call: &FuncCallExpr, args: Vec<ExprType>) -> ExprType {
        let name = call.callee.to_lowercase();
        let Some(sigs) = BUILTIN_FUNC_SIGNATURES.get(name.as_str()) else {
            let mut names: Vec<&str> = BUILTIN_FUNC_SIGNATURES.keys().copied().collect();
            names.sort();
            self.error(MK_ERROR!(
                UndefinedFunction {
                    name: call.callee.clone(),
                    available: quote_all(&names),
                },
                call.token.position
            ));
            return ExprType::Any;
        };

        self.check_special_function(call, &name);

        let mut failures = vec![];
        for sig in sigs {
            match sig.check_args(call, &args) {
                Ok(()) => return self.check_builtin_call(call, sig),
                Err(error) => failures.push(error),
            }
        }

        let ret = sigs.first().map(|s| s.ret.clone()).unwrap_or(ExprType::Any);
        if failures.len() == 1 {
            self.errors.extend(failures);
        } else {
            let errors = failures
                .iter()
                .map(|e| e.get_message())
                .collect::<Vec<String>>()
                .join("; ");
            self.error(MK_ERROR!(
                NoMatchingOverload {
                    name: call.callee.clone(),
                    errors,
                },
                call.token.position
            ));
        }
        ret
    }

    fn check_not(&mut self, not: &NotExpr, operand: ExprType) -> ExprType {
        if !ExprType::Bool.assignable(&operand) {
            self.error(MK_ERROR!(
                InvalidNotOperand {
                    received: operand.to_string(),
                },
                not.token.position
            ));
        }
        ExprType::Bool
    }

    fn check_node(&mut self, expr: &Expr) -> ExprType {
        match expr {
            Expr::Variable(var) => self.check_variable(var),
            Expr::Null(_) => ExprType::Null,
            Expr::Bool(_) => ExprType::Bool,
            Expr::Int(_) | Expr::Float(_) => ExprType::Number,
            Expr::String(_) => ExprType::String,
            Expr::ObjectDeref(deref) => {
                let receiver = self.pop_child();
                self.check_object_deref(expr, deref, receiver)
            }
            Expr::ArrayDeref(deref) => {
                let receiver = self.pop_child();
                self.check_array_deref(deref, receiver)
            }
            Expr::IndexAccess(access) => {
                let mut tys = self.pop_children(2);
                let operand = tys.pop().unwrap_or(ExprType::Any);
                let index = tys.pop().unwrap_or(ExprType::Any);
                self.check_index_access(expr, access, index, operand)
            }
            Expr::Not(not) => {
                let operand = self.pop_child();
                self.check_not(not, operand)
            }
            Expr::Compare(_) => {
                // Loose comparison accepts any pair of types
                self.pop_children(2);
                ExprType::Bool
            }
            Expr::Logical(_) => {
                let mut tys = self.pop_children(2);
                let right = tys.pop().unwrap_or(ExprType::Any);
                let left = tys.pop().unwrap_or(ExprType::Any);
                left.merge(&right)
            }
            Expr::FuncCall(call) => {
                let args = self.pop_children(call.args.len());
                self.check_func_call(call, args)
            }
        }
    }
}

impl Visitor for SemanticChecker {
    fn leave(&mut self, expr: &Expr) {
        let ty = self.check_node(expr);
        self.stack.push(ty);
    }
}
