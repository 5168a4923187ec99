use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayDerefExpr, BoolExpr, CompareExpr, CompareOpKind, FloatExpr, FuncCallExpr,
            IndexAccessExpr, IntExpr, LogicalExpr, LogicalOpKind, NotExpr, NullExpr,
            ObjectDerefExpr, StringExpr, VariableExpr,
        },
    },
    errors::errors::ExprError,
    lexer::tokens::{Token, TokenKind},
    MK_ERROR,
};

use super::parser::Parser;

const PRIMARY_EXPECTING: &str =
    "variable, function call, '(', number, string, null, true or false";

// Precedence, lowest first:
// || , && , comparison , prefix ! , postfix (. .* []) , primary

pub fn parse_logical_or(parser: &mut Parser) -> Result<Expr, ExprError> {
    let mut left = parse_logical_and(parser)?;

    while parser.current_token_kind() == TokenKind::Or {
        let left_height = parser.last_height();
        parser.advance();
        let right = parse_logical_and(parser)?;
        parser.mark_node(left_height.max(parser.last_height()))?;
        left = Expr::Logical(LogicalExpr {
            kind: LogicalOpKind::Or,
            token: left.get_token().clone(),
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    Ok(left)
}

pub fn parse_logical_and(parser: &mut Parser) -> Result<Expr, ExprError> {
    let mut left = parse_compare(parser)?;

    while parser.current_token_kind() == TokenKind::And {
        let left_height = parser.last_height();
        parser.advance();
        let right = parse_compare(parser)?;
        parser.mark_node(left_height.max(parser.last_height()))?;
        left = Expr::Logical(LogicalExpr {
            kind: LogicalOpKind::And,
            token: left.get_token().clone(),
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    Ok(left)
}

fn compare_kind(kind: TokenKind) -> Option<CompareOpKind> {
    match kind {
        TokenKind::Less => Some(CompareOpKind::Less),
        TokenKind::LessEquals => Some(CompareOpKind::LessEquals),
        TokenKind::Greater => Some(CompareOpKind::Greater),
        TokenKind::GreaterEquals => Some(CompareOpKind::GreaterEquals),
        TokenKind::Equals => Some(CompareOpKind::Equals),
        TokenKind::NotEquals => Some(CompareOpKind::NotEquals),
        _ => None,
    }
}

pub fn parse_compare(parser: &mut Parser) -> Result<Expr, ExprError> {
    let mut left = parse_prefix(parser)?;

    while let Some(kind) = compare_kind(parser.current_token_kind()) {
        let left_height = parser.last_height();
        parser.advance();
        let right = parse_prefix(parser)?;
        parser.mark_node(left_height.max(parser.last_height()))?;
        left = Expr::Compare(CompareExpr {
            kind,
            token: left.get_token().clone(),
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    Ok(left)
}

pub fn parse_prefix(parser: &mut Parser) -> Result<Expr, ExprError> {
    if parser.current_token_kind() != TokenKind::Not {
        return parse_postfix(parser);
    }

    let token = parser.advance();
    parser.enter_nested()?;
    let operand = parse_prefix(parser)?;
    parser.leave_nested();
    parser.mark_node(parser.last_height())?;

    Ok(Expr::Not(NotExpr {
        operand: Box::new(operand),
        token,
    }))
}

pub fn parse_postfix(parser: &mut Parser) -> Result<Expr, ExprError> {
    let mut expr = parse_primary(parser)?;

    loop {
        match parser.current_token_kind() {
            TokenKind::Dot => {
                parser.advance();
                let token = expr.get_token().clone();
                match parser.current_token_kind() {
                    // Keyword literals are fine as property names: `foo.true`
                    TokenKind::Identifier | TokenKind::Null | TokenKind::True | TokenKind::False => {
                        let property = parser.advance().value.to_lowercase();
                        parser.mark_node(parser.last_height())?;
                        expr = Expr::ObjectDeref(ObjectDerefExpr {
                            receiver: Box::new(expr),
                            property,
                            token,
                        });
                    }
                    TokenKind::Star => {
                        parser.advance();
                        parser.mark_node(parser.last_height())?;
                        expr = Expr::ArrayDeref(ArrayDerefExpr {
                            receiver: Box::new(expr),
                            token,
                        });
                    }
                    _ => {
                        return Err(parser.unexpected(
                            "object property dereference",
                            "identifier or '*'",
                        ))
                    }
                }
            }
            TokenKind::OpenBracket => {
                let operand_height = parser.last_height();
                parser.advance();
                parser.enter_nested()?;
                let index = parse_logical_or(parser)?;
                parser.leave_nested();
                parser.expect(TokenKind::CloseBracket, "closing bracket of index access")?;
                parser.mark_node(operand_height.max(parser.last_height()))?;
                expr = Expr::IndexAccess(IndexAccessExpr {
                    token: expr.get_token().clone(),
                    operand: Box::new(expr),
                    index: Box::new(index),
                });
            }
            _ => return Ok(expr),
        }
    }
}

pub fn parse_primary(parser: &mut Parser) -> Result<Expr, ExprError> {
    parser.mark_leaf();
    match parser.current_token_kind() {
        TokenKind::Identifier => {
            let token = parser.advance();
            if parser.current_token_kind() == TokenKind::OpenParen {
                parse_call_expr(parser, token)
            } else {
                Ok(Expr::Variable(VariableExpr {
                    name: token.value.to_lowercase(),
                    token,
                }))
            }
        }
        TokenKind::OpenParen => {
            parser.advance();
            parser.enter_nested()?;
            let expr = parse_logical_or(parser)?;
            parser.leave_nested();
            parser.expect(TokenKind::CloseParen, "parenthesized expression")?;
            Ok(expr)
        }
        TokenKind::Int => {
            let token = parser.advance();
            let value = parse_int(&token)?;
            Ok(Expr::Int(IntExpr { value, token }))
        }
        TokenKind::Float => {
            let token = parser.advance();
            match token.value.parse::<f64>() {
                Ok(value) => Ok(Expr::Float(FloatExpr { value, token })),
                Err(e) => Err(MK_ERROR!(
                    NumberParseError {
                        kind: String::from("float"),
                        token: token.value.clone(),
                        reason: e.to_string(),
                    },
                    token.position
                )),
            }
        }
        TokenKind::String => {
            let token = parser.advance();
            Ok(Expr::String(StringExpr {
                value: token.unescaped_string(),
                token,
            }))
        }
        TokenKind::Null => Ok(Expr::Null(NullExpr {
            token: parser.advance(),
        })),
        TokenKind::True => Ok(Expr::Bool(BoolExpr {
            value: true,
            token: parser.advance(),
        })),
        TokenKind::False => Ok(Expr::Bool(BoolExpr {
            value: false,
            token: parser.advance(),
        })),
        _ => Err(parser.unexpected("expression", PRIMARY_EXPECTING)),
    }
}

fn parse_int(token: &Token) -> Result<i64, ExprError> {
    // The sign stays on the digits so that i64::MIN parses
    let (sign, digits) = match token.value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", token.value.as_str()),
    };

    let parsed = match digits.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(&format!("{}{}", sign, hex), 16),
        None => token.value.parse::<i64>(),
    };

    match parsed {
        Ok(value) => Ok(value),
        Err(e) => Err(MK_ERROR!(
            NumberParseError {
                kind: String::from("integer"),
                token: token.value.clone(),
                reason: e.to_string(),
            },
            token.position
        )),
    }
}

/// Parses the argument list of `callee(...)`. The current token is `(`.
pub fn parse_call_expr(parser: &mut Parser, callee: Token) -> Result<Expr, ExprError> {
    parser.advance();
    parser.enter_nested()?;

    let mut args = vec![];
    let mut args_height = 0;

    if parser.current_token_kind() == TokenKind::CloseParen {
        parser.advance();
    } else {
        loop {
            args.push(parse_logical_or(parser)?);
            args_height = args_height.max(parser.last_height());
            match parser.current_token_kind() {
                TokenKind::Comma => {
                    parser.advance();
                }
                TokenKind::CloseParen => {
                    parser.advance();
                    break;
                }
                _ => {
                    return Err(parser.unexpected("arguments of function call", "',' or ')'"));
                }
            }
        }
    }

    parser.leave_nested();
    parser.mark_node(args_height)?;

    Ok(Expr::FuncCall(FuncCallExpr {
        callee: callee.value.clone(),
        args,
        token: callee,
    }))
}
