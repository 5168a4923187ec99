use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Position;

lazy_static! {
    /// Keyword literals. Matching is case-sensitive: `True` is a plain
    /// identifier.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("null", TokenKind::Null);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    /// The `}}` sequence closing an expression.
    End,
    Identifier,
    String,
    Int,
    Float,

    // Reserved
    Null,
    True,
    False,

    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,

    Dot,
    Not,     // !
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,    // ==
    NotEquals, // !=
    And,
    Or,
    Star,
    Comma,
}

impl TokenKind {
    /// Human readable name used in parser diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::End => "end marker",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::OpenBracket => "'['",
            TokenKind::CloseBracket => "']'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Dot => "'.'",
            TokenKind::Not => "'!'",
            TokenKind::Less => "'<'",
            TokenKind::LessEquals => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEquals => "'>='",
            TokenKind::Equals => "'=='",
            TokenKind::NotEquals => "'!='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Star => "'*'",
            TokenKind::Comma => "','",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. String literals keep their quotes and
    /// doubled `''` escapes.
    pub value: String,
    pub position: Position,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn get_offset(&self) -> usize {
        self.position.offset
    }

    pub fn get_line(&self) -> usize {
        self.position.line
    }

    pub fn get_column(&self) -> usize {
        self.position.column
    }

    /// Value of a string literal token with the quotes removed and `''`
    /// turned back into `'`.
    pub fn unescaped_string(&self) -> String {
        unescape_string_literal(&self.value)
    }
}

pub fn unescape_string_literal(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'")
}
