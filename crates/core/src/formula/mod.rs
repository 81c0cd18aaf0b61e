//! Parsed formula expressions
//!
//! A [`Formula`] is parsed once from its source text and then evaluated any
//! number of times against different bindings. Formulas support `+ - * /`,
//! `**`, parentheses, numeric literals, symbols, and the unary functions
//! `exp`, `sqrt`, `abs` and `ln`.
//!
//! Examples:
//! - `"(N - R) / (N + R)"` → NDVI
//! - `"(1.0 + L) * (N - R) / (N + R + L)"` → SAVI
//! - `"exp((-1.0 * (a - b) ** 2.0) / (2.0 * sigma ** 2.0))"` → RBF kernel

mod cache;
mod parser;
mod token;

pub use cache::FormulaCache;

use std::fmt;

use crate::error::Result;
use crate::value::{BinaryOp, UnaryFn};

/// A node in the formula AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Symbol(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        func: UnaryFn,
        arg: Box<Expr>,
    },
}

impl Expr {
    pub(crate) fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn collect_symbols<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Symbol(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Binary { left, right, .. } => {
                left.collect_symbols(names);
                right.collect_symbols(names);
            }
            Expr::Unary { arg, .. } => arg.collect_symbols(names),
            Expr::Num(_) => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{n}"),
            Expr::Symbol(s) => f.write_str(s),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Unary {
                func: UnaryFn::Neg,
                arg,
            } => write!(f, "-{arg}"),
            Expr::Unary { func, arg } => {
                let name = match func {
                    UnaryFn::Exp => "exp",
                    UnaryFn::Sqrt => "sqrt",
                    UnaryFn::Abs => "abs",
                    UnaryFn::Ln => "ln",
                    UnaryFn::Neg => unreachable!(),
                };
                write!(f, "{name}({arg})")
            }
        }
    }
}

/// A parsed formula together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
    symbols: Vec<String>,
}

impl Formula {
    /// Parse a formula.
    ///
    /// # Errors
    /// [`Error::InvalidFormula`](crate::Error::InvalidFormula) on any
    /// tokenizer or grammar error.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = token::tokenize(source)?;
        let expr = parser::Parser::new(source, tokens).parse()?;
        let mut names = Vec::new();
        expr.collect_symbols(&mut names);
        let symbols = names.into_iter().map(str::to_string).collect();
        Ok(Self {
            source: source.to_string(),
            expr,
            symbols,
        })
    }

    /// Source text as written in the catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Root of the parsed expression.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Symbols referenced by the formula, in first-occurrence order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn references(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Formula {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn shape(src: &str) -> String {
        Formula::parse(src).unwrap().expr().to_string()
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(shape("N - R / 2"), "(N - (R / 2))");
        assert_eq!(shape("(N - R) / 2"), "((N - R) / 2)");
        assert_eq!(shape("a - b - c"), "((a - b) - c)");
        assert_eq!(shape("a / b * c"), "((a / b) * c)");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(shape("a ** b ** c"), "(a ** (b ** c))");
        assert_eq!(shape("2 * N ** 2"), "(2 * (N ** 2))");
    }

    #[test]
    fn unary_minus_and_power() {
        assert_eq!(shape("-N ** 2"), "-(N ** 2)");
        assert_eq!(shape("N ** -2"), "(N ** -2)");
        assert_eq!(shape("-1.0 * a"), "(-1 * a)");
    }

    #[test]
    fn functions() {
        assert_eq!(shape("exp(-a)"), "exp(-a)");
        assert_eq!(shape("sqrt(N + 1)"), "sqrt((N + 1))");
    }

    #[test]
    fn symbols_in_order_without_duplicates() {
        let f = Formula::parse("(N - R) / (N + R + L) * (1.0 + L)").unwrap();
        assert_eq!(f.symbols(), &["N", "R", "L"]);
        assert!(f.references("L"));
        assert!(!f.references("G"));
    }

    #[test]
    fn invalid_formulas() {
        for src in ["", "(N - ", "N R", "N +", "foo(N)", ")", "N ** "] {
            assert!(
                matches!(Formula::parse(src), Err(Error::InvalidFormula { .. })),
                "`{src}` should not parse"
            );
        }
    }

    #[test]
    fn display_keeps_source() {
        let f: Formula = "(N-R)/(N+R)".parse().unwrap();
        assert_eq!(f.to_string(), "(N-R)/(N+R)");
    }
}
