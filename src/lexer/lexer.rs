use lazy_static::lazy_static;
use regex::Regex;

use crate::{errors::errors::ExprError, Position, MK_ERROR, MK_TOKEN};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

const EXPRESSION_ALPHABET: &str = "'a'..'z', 'A'..'Z', '_', '0'..'9', ''', '}', '(', ')', '[', ']', '.', '!', '<', '>', '=', '&', '|', '*', ',', ' '";

lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex = Regex::new("^[a-zA-Z_][a-zA-Z0-9_-]*").unwrap();
    static ref NUMBER_PATTERN: Regex =
        Regex::new("^-?(?:0x[0-9a-fA-F]+|[0-9]+(?:\\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)").unwrap();
    static ref STRING_PATTERN: Regex = Regex::new("^'(?:[^']|'')*'").unwrap();
}

/// Converts expression source into tokens, one at a time.
///
/// The source is the text right after `${{`. Lexing stops at the `}}` end
/// marker; anything after it is left for the caller. The first error is
/// latched: from then on [`Lexer::next`] only returns end tokens.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    error: Option<ExprError>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            offset: 0,
            line: 1,
            column: 1,
            error: None,
            finished: false,
        }
    }

    /// Byte offset of the next unread character. After the end marker was
    /// lexed this points just past `}}`.
    pub fn get_offset(&self) -> usize {
        self.offset
    }

    pub fn get_error(&self) -> Option<&ExprError> {
        self.error.as_ref()
    }

    pub fn get_position(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    fn remainder(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remainder().chars().nth(n)
    }

    fn advance_n(&mut self, bytes: usize) {
        let consumed = &self.source[self.offset..self.offset + bytes];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += bytes;
    }

    fn skip_whitespace(&mut self) {
        let skipped = self.remainder().len()
            - self
                .remainder()
                .trim_start_matches([' ', '\t', '\n', '\r'])
                .len();
        self.advance_n(skipped);
    }

    fn end_token(&self) -> Token {
        MK_TOKEN!(TokenKind::End, String::from("}}"), self.get_position())
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let position = self.get_position();
        let value = self.remainder()[..len].to_string();
        self.advance_n(len);
        MK_TOKEN!(kind, value, position)
    }

    /// Returns the next token, or an end token once the end marker was
    /// reached or an error was latched.
    pub fn next(&mut self) -> Token {
        if self.error.is_some() || self.finished {
            return self.end_token();
        }

        match self.lex_token() {
            Ok(token) => {
                if token.kind == TokenKind::End {
                    self.finished = true;
                }
                token
            }
            Err(error) => {
                self.error = Some(error);
                self.end_token()
            }
        }
    }

    /// Lexes up to and including the end marker.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = vec![];

        loop {
            let token = self.next();
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            let is_end = token.kind == TokenKind::End;
            tokens.push(token);
            if is_end {
                return Ok(tokens);
            }
        }
    }

    fn lex_token(&mut self) -> Result<Token, ExprError> {
        self.skip_whitespace();

        let Some(ch) = self.peek_nth(0) else {
            return Err(MK_ERROR!(
                UnexpectedEof {
                    context: String::from("expression"),
                    expecting: String::from(EXPRESSION_ALPHABET),
                },
                self.get_position()
            ));
        };

        match ch {
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.lex_identifier()),
            '0'..='9' | '-' => self.lex_number(),
            '\'' => self.lex_string(),
            '}' => {
                self.expect_second('}', "end marker }}")?;
                let position = self.get_position();
                self.advance_n(2);
                Ok(MK_TOKEN!(TokenKind::End, String::from("}}"), position))
            }
            '(' => Ok(self.emit(TokenKind::OpenParen, 1)),
            ')' => Ok(self.emit(TokenKind::CloseParen, 1)),
            '[' => Ok(self.emit(TokenKind::OpenBracket, 1)),
            ']' => Ok(self.emit(TokenKind::CloseBracket, 1)),
            '.' => Ok(self.emit(TokenKind::Dot, 1)),
            '*' => Ok(self.emit(TokenKind::Star, 1)),
            ',' => Ok(self.emit(TokenKind::Comma, 1)),
            '!' => self.lex_optional_equals(TokenKind::Not, TokenKind::NotEquals, "! operator"),
            '<' => self.lex_optional_equals(TokenKind::Less, TokenKind::LessEquals, "< operator"),
            '>' => {
                self.lex_optional_equals(TokenKind::Greater, TokenKind::GreaterEquals, "> operator")
            }
            '=' => {
                self.expect_second('=', "== operator")?;
                Ok(self.emit(TokenKind::Equals, 2))
            }
            '&' => {
                self.expect_second('&', "&& operator")?;
                Ok(self.emit(TokenKind::And, 2))
            }
            '|' => {
                self.expect_second('|', "|| operator")?;
                Ok(self.emit(TokenKind::Or, 2))
            }
            _ => Err(MK_ERROR!(
                UnexpectedCharacter {
                    found: ch,
                    context: String::from("expression"),
                    expecting: String::from(EXPRESSION_ALPHABET),
                },
                self.get_position()
            )),
        }
    }

    /// Errors unless the character after the current one is `second`.
    fn expect_second(&self, second: char, context: &str) -> Result<(), ExprError> {
        let mut position = self.get_position();
        position.column += 1;
        position.offset += 1;

        match self.peek_nth(1) {
            Some(c) if c == second => Ok(()),
            Some(c) => Err(MK_ERROR!(
                UnexpectedCharacter {
                    found: c,
                    context: String::from(context),
                    expecting: format!("'{}'", second),
                },
                position
            )),
            None => Err(MK_ERROR!(
                UnexpectedEof {
                    context: String::from(context),
                    expecting: format!("'{}'", second),
                },
                position
            )),
        }
    }

    fn lex_optional_equals(
        &mut self,
        single: TokenKind,
        double: TokenKind,
        context: &str,
    ) -> Result<Token, ExprError> {
        match self.peek_nth(1) {
            Some('=') => Ok(self.emit(double, 2)),
            Some(_) => Ok(self.emit(single, 1)),
            None => Err(MK_ERROR!(
                UnexpectedEof {
                    context: String::from(context),
                    expecting: String::from(EXPRESSION_ALPHABET),
                },
                self.get_position()
            )),
        }
    }

    fn lex_identifier(&mut self) -> Token {
        let len = IDENTIFIER_PATTERN
            .find(self.remainder())
            .map(|m| m.end())
            .unwrap_or(1);
        let value = &self.remainder()[..len];

        let kind = RESERVED_LOOKUP
            .get(value)
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.emit(kind, len)
    }

    fn lex_number(&mut self) -> Result<Token, ExprError> {
        let Some(matched) = NUMBER_PATTERN.find(self.remainder()) else {
            // Only a lone `-` can fail to match here.
            let mut position = self.get_position();
            position.column += 1;
            position.offset += 1;
            return Err(match self.peek_nth(1) {
                Some(c) => MK_ERROR!(
                    UnexpectedCharacter {
                        found: c,
                        context: String::from("number"),
                        expecting: String::from("'0'..'9'"),
                    },
                    position
                ),
                None => MK_ERROR!(
                    UnexpectedEof {
                        context: String::from("number"),
                        expecting: String::from("'0'..'9'"),
                    },
                    position
                ),
            });
        };

        let literal = matched.as_str();
        let len = matched.end();

        if let Some(next) = self.remainder()[len..].chars().next() {
            if next.is_ascii_alphanumeric() || next == '_' || next == '\'' {
                let mut position = self.get_position();
                position.column += literal.chars().count();
                position.offset += len;
                return Err(MK_ERROR!(
                    InvalidNumberTerminator {
                        found: next,
                        literal: literal.to_string(),
                    },
                    position
                ));
            }
        }

        let is_hex = literal.trim_start_matches('-').starts_with("0x");
        let kind = if !is_hex && literal.contains(['.', 'e', 'E']) {
            TokenKind::Float
        } else {
            TokenKind::Int
        };

        Ok(self.emit(kind, len))
    }

    fn lex_string(&mut self) -> Result<Token, ExprError> {
        match STRING_PATTERN.find(self.remainder()) {
            Some(matched) => Ok(self.emit(TokenKind::String, matched.end())),
            None => {
                let mut end = self.clone();
                end.advance_n(self.remainder().len());
                Err(MK_ERROR!(
                    UnexpectedEof {
                        context: String::from("end of string literal"),
                        expecting: String::from("'''"),
                    },
                    end.get_position()
                ))
            }
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    Lexer::new(source).tokenize()
}
