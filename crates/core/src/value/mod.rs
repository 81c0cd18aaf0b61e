//! Arithmetic capability shared by every value type a formula can run on
//!
//! The evaluator never inspects values. It only emits operator calls through
//! [`SpectralValue`], so any container whose operators mean elementwise math
//! can be plugged in: plain floats, n-dimensional arrays, labeled arrays,
//! table columns, georeferenced rasters.
//!
//! Types whose `+` means something else (a `Vec<f64>` concatenates) must not
//! implement this trait; convert them to an array type first.

pub(crate) mod array;
mod operand;
mod scalar;

pub use array::co_broadcast_shape;
pub use operand::{Operand, Params};

use crate::error::Result;

/// Binary operators a formula may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    /// Apply the operator to two plain numbers.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Pow => lhs.powf(rhs),
        }
    }

    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
        }
    }
}

/// Unary operations: negation plus the few functions kernel formulas need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFn {
    Neg,
    Exp,
    Sqrt,
    Abs,
    Ln,
}

impl UnaryFn {
    /// Look up a callable function by its formula name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exp" => Some(Self::Exp),
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            "ln" | "log" => Some(Self::Ln),
            _ => None,
        }
    }

    #[inline]
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Neg => -v,
            Self::Exp => v.exp(),
            Self::Sqrt => v.sqrt(),
            Self::Abs => v.abs(),
            Self::Ln => v.ln(),
        }
    }
}

/// Whether several results of a type can be combined into one composite
/// carrying a new labeled axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    /// Results are returned as an ordered `Vec`.
    Unsupported,
    /// Results can be stacked with [`SpectralValue::stack`].
    Labeled,
}

/// A value type formulas can be evaluated over.
///
/// Operations return `Result` so that shape problems surface as
/// [`Error::IncompatibleOperands`](crate::Error::IncompatibleOperands) or
/// [`Error::SizeMismatch`](crate::Error::SizeMismatch) instead of panicking.
/// Numeric edge cases (division by zero, fractional powers of negatives)
/// follow the type's own float semantics.
pub trait SpectralValue: Clone + std::fmt::Debug + Sized {
    /// Composite produced when several results are stacked.
    type Stacked: std::fmt::Debug;

    /// Lift a bare number into this type.
    fn from_scalar(value: f64) -> Self;

    /// `self op rhs`
    fn binary(&self, op: BinaryOp, rhs: &Self) -> Result<Self>;

    /// `self op rhs` with a scalar right-hand side.
    fn binary_scalar(&self, op: BinaryOp, rhs: f64) -> Result<Self>;

    /// `lhs op rhs` with a scalar left-hand side.
    fn scalar_binary(lhs: f64, op: BinaryOp, rhs: &Self) -> Result<Self>;

    /// Apply a unary function elementwise.
    fn apply(&self, func: UnaryFn) -> Self;

    /// Labeled stacking support of this type.
    fn stacking() -> Stacking {
        Stacking::Unsupported
    }

    /// Combine `values` (one per label, same order) along a new axis named
    /// `coordinate`.
    fn stack(values: Vec<Self>, labels: &[String], coordinate: &str) -> Result<Self::Stacked> {
        let _ = (values, labels);
        Err(crate::Error::Other(format!(
            "{} values cannot be stacked along `{coordinate}`",
            std::any::type_name::<Self>()
        )))
    }
}
