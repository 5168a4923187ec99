//! Built-in function signatures and the per-function checks that go beyond
//! matching argument types.

use std::{collections::BTreeSet, fmt::Display};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    ast::{ast::Expr, expressions::FuncCallExpr, types::ExprType},
    errors::errors::ExprError,
    MK_ERROR,
};

lazy_static! {
    // `{{` and `}}` are escaped braces, not placeholders
    static ref FORMAT_PLACEHOLDER: Regex = Regex::new(r"\{\{|\}\}|\{(\d+)\}").unwrap();
}

/// Signature of one overload of a built-in function.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncSignature {
    /// Name as documented, e.g. `startsWith`. Lookup is case-insensitive.
    pub name: &'static str,
    pub ret: ExprType,
    pub params: Vec<ExprType>,
    /// The last parameter may repeat any number of times, at least once.
    pub variadic: bool,
}

impl FuncSignature {
    pub fn new(name: &'static str, ret: ExprType, params: Vec<ExprType>) -> Self {
        FuncSignature {
            name,
            ret,
            params,
            variadic: false,
        }
    }

    pub fn variadic(name: &'static str, ret: ExprType, params: Vec<ExprType>) -> Self {
        FuncSignature {
            name,
            ret,
            params,
            variadic: true,
        }
    }

    /// Checks argument count and argument types of `call` against this
    /// overload. Extra arguments of a variadic call are checked against the
    /// last parameter.
    pub fn check_args(&self, call: &FuncCallExpr, args: &[ExprType]) -> Result<(), ExprError> {
        let (expected, received) = (self.params.len(), args.len());

        if self.variadic && received < expected {
            return Err(MK_ERROR!(
                MissingArguments {
                    signature: self.to_string(),
                    expected,
                    received,
                },
                call.token.position
            ));
        }
        if !self.variadic && received != expected {
            return Err(MK_ERROR!(
                UnexpectedArguments {
                    signature: self.to_string(),
                    expected,
                    received,
                },
                call.token.position
            ));
        }

        for (i, (arg, ty)) in call.args.iter().zip(args).enumerate() {
            let Some(param) = self.params.get(i).or(self.params.last()) else {
                break;
            };
            if !param.assignable(ty) {
                return Err(MK_ERROR!(
                    ArgumentTypeMatchError {
                        ordinal: ordinal(i + 1),
                        expected: param.to_string(),
                        received: ty.to_string(),
                        signature: self.to_string(),
                    },
                    arg.get_position()
                ));
            }
        }

        Ok(())
    }
}

impl Display for FuncSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        if self.variadic {
            write!(f, "...")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// `1st`, `2nd`, `3rd`, `4th`, ... `11th`, `12th`, `13th`, `21st`, ...
pub fn ordinal(i: usize) -> String {
    let suffix = match (i % 10, i % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", i, suffix)
}

/// Placeholder indices `{N}` used in a format string.
pub fn format_placeholders(format: &str) -> BTreeSet<usize> {
    FORMAT_PLACEHOLDER
        .captures_iter(format)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .collect()
}

/// Checks that placeholders of a literal format string and the arguments
/// given to `format()` match one to one.
pub fn check_format_call(call: &FuncCallExpr) -> Vec<ExprError> {
    let Some(Expr::String(format)) = call.args.first() else {
        return vec![];
    };

    let mut errors = vec![];
    let mut placeholders = format_placeholders(&format.value);
    let given = call.args.len() - 1;

    for index in 0..given {
        if !placeholders.remove(&index) {
            errors.push(MK_ERROR!(
                UnusedFormatArgument {
                    format: format.value.clone(),
                    index,
                },
                call.args[index + 1].get_position()
            ));
        }
    }

    for index in placeholders {
        errors.push(MK_ERROR!(
            MissingFormatArgument {
                format: format.value.clone(),
                index,
                given,
            },
            format.token.position
        ));
    }

    errors
}

/// Infers the result of `fromJSON()` from a literal argument. Returns
/// `fallback` when the argument is not a literal.
pub fn check_from_json_call(
    call: &FuncCallExpr,
    fallback: &ExprType,
) -> (ExprType, Option<ExprError>) {
    let Some(Expr::String(literal)) = call.args.first() else {
        return (fallback.clone(), None);
    };

    match serde_json::from_str::<serde_json::Value>(&literal.value) {
        Ok(value) => (ExprType::from_json_value(&value), None),
        Err(e) => (
            fallback.clone(),
            Some(MK_ERROR!(
                BrokenJson {
                    message: e.to_string(),
                },
                literal.token.position
            )),
        ),
    }
}
