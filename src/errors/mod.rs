//! Error types and error handling for the expression checker.
//!
//! This module defines the error types produced while checking an
//! expression. It includes:
//!
//! - Error structures carrying the source position they refer to
//! - Specific error variants for lexing, parsing, typing and taint findings
//! - Error formatting, position translation and remediation tips

pub mod errors;
