//! Utility macros for the expression checker.
//!
//! This module defines helper macros used throughout the crate:
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_ERROR!` - Creates an ExprError from an ErrorImpl variant
//!
//! These macros reduce boilerplate in the lexer, parser and checkers.

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's string value
/// * `$position` - The position of the token's first character
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Int, "42".to_string(), position);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $position:expr) => {
        Token {
            kind: $kind,
            value: $value,
            position: $position,
        }
    };
}

/// Creates an ExprError from an ErrorImpl variant and a position.
///
/// # Example
///
/// ```ignore
/// let error = MK_ERROR!(UndefinedVariable { name, available }, token.position);
/// ```
#[macro_export]
macro_rules! MK_ERROR {
    ($variant:ident { $($field:ident $(: $value:expr)?),* $(,)? }, $position:expr) => {
        $crate::errors::errors::ExprError::new(
            $crate::errors::errors::ErrorImpl::$variant { $($field $(: $value)?),* },
            $position,
        )
    };
}
