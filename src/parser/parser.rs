//! Parser implementation for building the expression tree.
//!
//! This module contains the Parser struct, which owns the token stream and
//! tracks the current position in it, and the [`parse`] entry point. The
//! grammar functions themselves live in `expr.rs`.

use crate::{
    ast::ast::Expr,
    errors::errors::ExprError,
    lexer::tokens::{Token, TokenKind},
    MK_ERROR, MK_TOKEN,
};

use super::expr::parse_logical_or;

/// Deepest expression tree the parser builds. Traversal, rendering and
/// dropping of the tree recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 128;

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, always terminated by an end token
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// Open parentheses, index brackets, call argument lists and `!` operands
    depth: usize,
    /// Height of the expression built last
    height: usize,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// An end token is appended when the stream does not already finish
    /// with one, so the parser never runs past the last token.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::End) {
            let position = tokens
                .last()
                .map(|t| t.position)
                .unwrap_or_else(crate::Position::start);
            tokens.push(MK_TOKEN!(TokenKind::End, String::from("}}"), position));
        }

        Parser {
            tokens,
            pos: 0,
            depth: 0,
            height: 0,
        }
    }

    /// Returns the current token without advancing.
    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous token. The end
    /// token is never consumed.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if token.kind != TokenKind::End {
            self.pos += 1;
        }
        token
    }

    /// Tokens not consumed yet, excluding the final end token.
    pub fn remaining(&self) -> &[Token] {
        let end = self.tokens.len() - 1;
        &self.tokens[self.pos.min(end)..end]
    }

    /// Builds the error for an unexpected current token. Reaching the end
    /// marker early gets its own wording.
    pub fn unexpected(&self, context: &str, expecting: &str) -> ExprError {
        let token = self.current_token();
        if token.kind == TokenKind::End {
            MK_ERROR!(
                UnexpectedEndOfInput {
                    context: String::from(context),
                    expecting: String::from(expecting),
                },
                token.position
            )
        } else {
            MK_ERROR!(
                UnexpectedToken {
                    token: token.value.clone(),
                    context: String::from(context),
                    expecting: String::from(expecting),
                },
                token.position
            )
        }
    }

    fn nesting_too_deep(&self) -> ExprError {
        MK_ERROR!(
            NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            },
            self.current_token().position
        )
    }

    /// Enters a nested sub-expression such as a parenthesized expression.
    pub fn enter_nested(&mut self) -> Result<(), ExprError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.nesting_too_deep());
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn mark_leaf(&mut self) {
        self.height = 1;
    }

    /// Records a node built on top of children whose tallest one has height
    /// `children`.
    pub fn mark_node(&mut self, children: usize) -> Result<(), ExprError> {
        if children >= MAX_NESTING_DEPTH {
            return Err(self.nesting_too_deep());
        }
        self.height = children + 1;
        Ok(())
    }

    pub fn last_height(&self) -> usize {
        self.height
    }

    /// Expects a token of the specified kind.
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise an error
    /// describing what was being parsed.
    pub fn expect(
        &mut self,
        expected_kind: TokenKind,
        context: &str,
    ) -> Result<Token, ExprError> {
        if self.current_token_kind() != expected_kind {
            Err(self.unexpected(context, expected_kind.describe()))
        } else {
            Ok(self.advance())
        }
    }
}

/// Parses a token stream, terminated by the `}}` end token, into one
/// expression tree.
///
/// Every token before the end token must be consumed; leftovers are
/// reported in a single error listing their kinds.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ExprError> {
    let mut parser = Parser::new(tokens);
    let expr = parse_logical_or(&mut parser)?;

    let remaining = parser.remaining();
    if !remaining.is_empty() {
        let kinds = remaining
            .iter()
            .map(|t| t.kind.describe())
            .collect::<Vec<&str>>()
            .join(", ");
        return Err(MK_ERROR!(
            RemainingTokens {
                count: remaining.len(),
                kinds,
            },
            remaining[0].position
        ));
    }

    Ok(expr)
}
