//! Recursive descent parser for formula expressions
//!
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = unary (('*' | '/') unary)*
//! unary   = ('-' | '+') unary | power
//! power   = primary ('**' unary)?
//! primary = number | ident | ident '(' expr ')' | '(' expr ')'
//! ```
//!
//! `**` is right-associative and binds tighter than a unary minus on its
//! left, so `-N ** 2` is `-(N ** 2)` while `N ** -2` is accepted.

use super::token::Token;
use super::Expr;
use crate::error::{Error, Result};
use crate::value::{BinaryOp, UnaryFn};

pub(crate) struct Parser<'a> {
    formula: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(formula: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            formula,
            tokens,
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::InvalidFormula {
            formula: self.formula.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// Parse the whole token stream; trailing tokens are an error.
    pub(crate) fn parse(mut self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(self.error("empty formula"));
        }
        let expr = self.parse_expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(t) => Err(self.error(format!("unexpected trailing token {t:?}"))),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(match operand {
                    Expr::Num(n) => Expr::Num(-n),
                    other => Expr::Unary {
                        func: UnaryFn::Neg,
                        arg: Box::new(other),
                    },
                })
            }
            Some(Token::Plus) => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let base = self.parse_primary()?;
        if let Some(Token::Power) = self.peek() {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Num(n)),
            Some(Token::Ident(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    let func = UnaryFn::from_name(&name)
                        .ok_or_else(|| self.error(format!("unknown function `{name}`")))?;
                    self.advance();
                    let arg = self.parse_expr()?;
                    self.expect_rparen()?;
                    return Ok(Expr::Unary {
                        func,
                        arg: Box::new(arg),
                    });
                }
                Ok(Expr::Symbol(name))
            }
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            Some(other) => Err(self.error(format!("unexpected token {other:?}"))),
            None => Err(self.error("unexpected end of formula")),
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            _ => Err(self.error("expected closing parenthesis")),
        }
    }
}
