use std::fmt::Display;

use thiserror::Error;

use crate::Position;

const SECURITY_HARDENING_URL: &str =
    "https://docs.github.com/en/actions/security-guides/security-hardening-for-github-actions";
const CONTEXT_AVAILABILITY_URL: &str =
    "https://docs.github.com/en/actions/learn-github-actions/contexts#context-availability";

/// Broad class of an error, used by callers to decide how fatal it is.
///
/// Lex and parse errors stop checking of the current expression only. Type
/// and taint errors accumulate and checking continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lex,
    Parse,
    Type,
    Taint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprError {
    internal_error: ErrorImpl,
    position: Position,
}

impl ExprError {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        ExprError {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_line(&self) -> usize {
        self.position.line
    }

    pub fn get_column(&self) -> usize {
        self.position.column
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// Message without the position, as shown to users.
    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    /// Moves an expression-local position into the coordinate space of the
    /// document the expression was extracted from.
    pub fn translate(mut self, anchor: &Position) -> Self {
        self.position = self.position.translate(anchor);
        self
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnexpectedCharacter { .. }
            | ErrorImpl::UnexpectedEof { .. }
            | ErrorImpl::InvalidNumberTerminator { .. } => ErrorKind::Lex,
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedEndOfInput { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::RemainingTokens { .. }
            | ErrorImpl::NestingTooDeep { .. } => ErrorKind::Parse,
            ErrorImpl::UntrustedInput { .. } | ErrorImpl::UntrustedInputs { .. } => {
                ErrorKind::Taint
            }
            _ => ErrorKind::Type,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnexpectedCharacter { .. } => "UnexpectedCharacter",
            ErrorImpl::UnexpectedEof { .. } => "UnexpectedEof",
            ErrorImpl::InvalidNumberTerminator { .. } => "InvalidNumberTerminator",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedEndOfInput { .. } => "UnexpectedEndOfInput",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::RemainingTokens { .. } => "RemainingTokens",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
            ErrorImpl::UndefinedVariable { .. } => "UndefinedVariable",
            ErrorImpl::ContextNotAllowed { .. } => "ContextNotAllowed",
            ErrorImpl::UndefinedProperty { .. } => "UndefinedProperty",
            ErrorImpl::UndefinedFilteredProperty { .. } => "UndefinedFilteredProperty",
            ErrorImpl::InvalidDerefReceiver { .. } => "InvalidDerefReceiver",
            ErrorImpl::InvalidFilteredElement { .. } => "InvalidFilteredElement",
            ErrorImpl::InvalidFilterReceiver { .. } => "InvalidFilterReceiver",
            ErrorImpl::InvalidArrayIndex { .. } => "InvalidArrayIndex",
            ErrorImpl::InvalidObjectIndex { .. } => "InvalidObjectIndex",
            ErrorImpl::InvalidIndexOperand { .. } => "InvalidIndexOperand",
            ErrorImpl::InvalidNotOperand { .. } => "InvalidNotOperand",
            ErrorImpl::UndefinedFunction { .. } => "UndefinedFunction",
            ErrorImpl::SpecialFunctionNotAllowed { .. } => "SpecialFunctionNotAllowed",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::NoMatchingOverload { .. } => "NoMatchingOverload",
            ErrorImpl::UnusedFormatArgument { .. } => "UnusedFormatArgument",
            ErrorImpl::MissingFormatArgument { .. } => "MissingFormatArgument",
            ErrorImpl::BrokenJson { .. } => "BrokenJson",
            ErrorImpl::InvalidConfigVariableName { .. } => "InvalidConfigVariableName",
            ErrorImpl::UndefinedConfigVariable { .. } => "UndefinedConfigVariable",
            ErrorImpl::UntrustedInput { .. } => "UntrustedInput",
            ErrorImpl::UntrustedInputs { .. } => "UntrustedInputs",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UntrustedInput { .. } => ErrorTip::Suggestion(format!(
                "avoid using it directly in inline scripts. instead, pass it through an environment variable. see {} for more details",
                SECURITY_HARDENING_URL
            )),
            ErrorImpl::UntrustedInputs { .. } => ErrorTip::Suggestion(format!(
                "avoid using the value directly in inline scripts. instead, pass the value through an environment variable. see {} for more details",
                SECURITY_HARDENING_URL
            )),
            ErrorImpl::ContextNotAllowed { .. } => ErrorTip::Suggestion(format!(
                "see {} for more details",
                CONTEXT_AVAILABILITY_URL
            )),
            ErrorImpl::SpecialFunctionNotAllowed { .. } => ErrorTip::Suggestion(format!(
                "see {} for more details",
                CONTEXT_AVAILABILITY_URL
            )),
            ErrorImpl::UnusedFormatArgument { .. } => ErrorTip::Suggestion(String::from(
                "remove the argument which is unused in the format string",
            )),
            ErrorImpl::RemainingTokens { .. } => ErrorTip::Suggestion(String::from(
                "an expression must be a single value. did you forget an operator?",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.line, self.position.column, self.internal_error
        )?;
        if let ErrorTip::Suggestion(tip) = self.get_tip() {
            write!(f, ". {}", tip)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExprError {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

/// Renders a list of names as `"a", "b", "c"`.
pub fn quote_all<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("{:?}", n.as_ref()))
        .collect::<Vec<String>>()
        .join(", ")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexer
    #[error("got unexpected character {found:?} while lexing {context}, expecting {expecting}")]
    UnexpectedCharacter {
        found: char,
        context: String,
        expecting: String,
    },
    #[error("unexpected EOF while lexing {context}, expecting {expecting}")]
    UnexpectedEof { context: String, expecting: String },
    #[error("character {found:?} is invalid for number literal {literal:?}")]
    InvalidNumberTerminator { found: char, literal: String },

    // Parser
    #[error("unexpected token {token:?} while parsing {context}. expecting {expecting}")]
    UnexpectedToken {
        token: String,
        context: String,
        expecting: String,
    },
    #[error("unexpected end of input while parsing {context}. expecting {expecting}")]
    UnexpectedEndOfInput { context: String, expecting: String },
    #[error("parsing invalid {kind} literal {token:?}: {reason}")]
    NumberParseError {
        kind: String,
        token: String,
        reason: String,
    },
    #[error("parser did not reach end of input after parsing the expression. {count} remaining token(s) in input: {kinds}")]
    RemainingTokens { count: usize, kinds: String },
    #[error("expression is nested too deeply. nesting must not exceed {max} levels")]
    NestingTooDeep { max: usize },

    // Semantics
    #[error("undefined variable {name:?}. available variables are {available}")]
    UndefinedVariable { name: String, available: String },
    #[error("context {name:?} is not allowed here. available {noun} {available}")]
    ContextNotAllowed {
        name: String,
        noun: String,
        available: String,
    },
    #[error("property {property:?} is not defined in object type {object}")]
    UndefinedProperty { property: String, object: String },
    #[error("property {property:?} is not defined in object type {object} as element of filtered array")]
    UndefinedFilteredProperty { property: String, object: String },
    #[error("receiver of object dereference {property:?} must be type of object but got {received:?}")]
    InvalidDerefReceiver { property: String, received: String },
    #[error("property filtered by {property:?} at object filtering must be type of object but got {received:?}")]
    InvalidFilteredElement { property: String, received: String },
    #[error("receiver of object filtering `.*` must be type of array or object but got {received:?}")]
    InvalidFilterReceiver { received: String },
    #[error("index access of array must be type of number but got {received:?}")]
    InvalidArrayIndex { received: String },
    #[error("property access of object must be type of string but got {received:?}")]
    InvalidObjectIndex { received: String },
    #[error("index access operand must be type of object or array but got {received:?}")]
    InvalidIndexOperand { received: String },
    #[error("type of operand of ! operator {received:?} is not assignable to type \"bool\"")]
    InvalidNotOperand { received: String },
    #[error("undefined function {name:?}. available functions are {available}")]
    UndefinedFunction { name: String, available: String },
    #[error("calling function {name:?} is not allowed here. {name:?} is only available in {available_in}")]
    SpecialFunctionNotAllowed { name: String, available_in: String },
    #[error("number of arguments is wrong. function {signature:?} takes {expected} parameters but {received} arguments are given")]
    UnexpectedArguments {
        signature: String,
        expected: usize,
        received: usize,
    },
    #[error("number of arguments is not enough. function {signature:?} takes at least {expected} parameters but {received} arguments are given")]
    MissingArguments {
        signature: String,
        expected: usize,
        received: usize,
    },
    #[error("{ordinal} argument of function call is not assignable. {received:?} cannot be assigned to {expected:?}. called function type is {signature:?}")]
    ArgumentTypeMatchError {
        ordinal: String,
        expected: String,
        received: String,
        signature: String,
    },
    #[error("no overload of function {name:?} accepts the given arguments: {errors}")]
    NoMatchingOverload { name: String, errors: String },
    #[error("format string {format:?} does not contain placeholder {{{index}}}")]
    UnusedFormatArgument { format: String, index: usize },
    #[error("format string {format:?} contains placeholder {{{index}}} but only {given} arguments are given to format")]
    MissingFormatArgument {
        format: String,
        index: usize,
        given: usize,
    },
    #[error("broken JSON string is passed to fromJSON(): {message}")]
    BrokenJson { message: String },
    #[error("configuration variable name {name:?} {reason}")]
    InvalidConfigVariableName { name: String, reason: String },
    #[error("undefined configuration variable {name:?}. defined variables are {available}")]
    UndefinedConfigVariable { name: String, available: String },

    // Taint
    #[error("{path:?} is potentially untrusted")]
    UntrustedInput { path: String },
    #[error("object filter extracts potentially untrusted properties {paths}")]
    UntrustedInputs { paths: String },
}
