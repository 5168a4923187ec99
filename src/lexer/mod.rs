//! Lexical analysis module for the expression checker.
//!
//! This module contains the lexer (tokenizer) that converts the source of a
//! `${{ }}` expression into a stream of tokens for parsing. It handles:
//!
//! - Recognition of identifiers, keyword literals, numbers and strings
//! - One and two character operators
//! - The `}}` end marker
//! - Token position tracking for error reporting

pub mod lexer;
pub mod tokens;
