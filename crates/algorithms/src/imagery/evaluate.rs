//! Formula evaluation over any [`SpectralValue`]
//!
//! Arithmetic between two scalars stays in `f64`; as soon as a caller value
//! is involved the value type's own operators take over, so the result has
//! the caller's type. A formula that never touches a caller value (all of its
//! symbols bound to scalars) is lifted with [`SpectralValue::from_scalar`].

use specdex_core::formula::Expr;
use specdex_core::{Error, Formula, Operand, Result, SpectralValue};

use super::resolve::Bindings;

/// Intermediate result: a bare number, a caller value, or a new value.
enum Term<'a, V> {
    Scalar(f64),
    Borrowed(&'a V),
    Owned(V),
}

impl<V> Term<'_, V> {
    fn operand(&self) -> Operand<&V> {
        match self {
            Term::Scalar(s) => Operand::Scalar(*s),
            Term::Borrowed(v) => Operand::Value(v),
            Term::Owned(v) => Operand::Value(v),
        }
    }
}

/// Evaluate `formula` against `bindings`.
///
/// Every symbol of the formula must be bound; the resolver guarantees this
/// for catalog definitions.
pub fn evaluate<V: SpectralValue>(formula: &Formula, bindings: &Bindings<'_, V>) -> Result<V> {
    match eval_expr(formula.expr(), formula, bindings)? {
        Term::Scalar(s) => Ok(V::from_scalar(s)),
        Term::Borrowed(v) => Ok(v.clone()),
        Term::Owned(v) => Ok(v),
    }
}

fn eval_expr<'a, V: SpectralValue>(
    expr: &Expr,
    formula: &Formula,
    bindings: &Bindings<'a, V>,
) -> Result<Term<'a, V>> {
    match expr {
        Expr::Num(n) => Ok(Term::Scalar(*n)),
        Expr::Symbol(name) => match bindings.get(name) {
            Some(Operand::Scalar(s)) => Ok(Term::Scalar(s)),
            Some(Operand::Value(v)) => Ok(Term::Borrowed(v)),
            None => Err(Error::MissingParameter {
                definition: formula.source().to_string(),
                missing: vec![name.clone()],
            }),
        },
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, formula, bindings)?;
            let r = eval_expr(right, formula, bindings)?;
            let out = match (l.operand(), r.operand()) {
                (Operand::Scalar(a), Operand::Scalar(b)) => return Ok(Term::Scalar(op.apply(a, b))),
                (Operand::Scalar(a), Operand::Value(rv)) => V::scalar_binary(a, *op, rv)?,
                (Operand::Value(lv), Operand::Scalar(b)) => lv.binary_scalar(*op, b)?,
                (Operand::Value(lv), Operand::Value(rv)) => lv.binary(*op, rv)?,
            };
            Ok(Term::Owned(out))
        }
        Expr::Unary { func, arg } => match eval_expr(arg, formula, bindings)? {
            Term::Scalar(s) => Ok(Term::Scalar(func.apply(s))),
            Term::Borrowed(v) => Ok(Term::Owned(v.apply(*func))),
            Term::Owned(v) => Ok(Term::Owned(v.apply(*func))),
        },
    }
}
