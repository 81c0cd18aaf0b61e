//! Plain floating point numbers

use super::{BinaryOp, SpectralValue, UnaryFn};
use crate::error::Result;

macro_rules! impl_spectral_value_float {
    ($t:ty) => {
        impl SpectralValue for $t {
            type Stacked = std::convert::Infallible;

            fn from_scalar(value: f64) -> Self {
                value as $t
            }

            fn binary(&self, op: BinaryOp, rhs: &Self) -> Result<Self> {
                Ok(match op {
                    BinaryOp::Add => self + rhs,
                    BinaryOp::Sub => self - rhs,
                    BinaryOp::Mul => self * rhs,
                    BinaryOp::Div => self / rhs,
                    BinaryOp::Pow => self.powf(*rhs),
                })
            }

            fn binary_scalar(&self, op: BinaryOp, rhs: f64) -> Result<Self> {
                self.binary(op, &(rhs as $t))
            }

            fn scalar_binary(lhs: f64, op: BinaryOp, rhs: &Self) -> Result<Self> {
                (lhs as $t).binary(op, rhs)
            }

            fn apply(&self, func: UnaryFn) -> Self {
                match func {
                    UnaryFn::Neg => -self,
                    UnaryFn::Exp => self.exp(),
                    UnaryFn::Sqrt => self.sqrt(),
                    UnaryFn::Abs => self.abs(),
                    UnaryFn::Ln => self.ln(),
                }
            }
        }
    };
}

impl_spectral_value_float!(f32);
impl_spectral_value_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Stacking;

    #[test]
    fn f32_arithmetic_stays_f32() {
        let v: f32 = 0.5f32.binary(BinaryOp::Mul, &4.0).unwrap();
        assert_eq!(v, 2.0f32);
        let w = f32::scalar_binary(1.0, BinaryOp::Sub, &v).unwrap();
        assert_eq!(w, -1.0f32);
    }

    #[test]
    fn division_by_zero_follows_float_rules() {
        assert!(1.0f64.binary(BinaryOp::Div, &0.0).unwrap().is_infinite());
        assert!(0.0f64.binary(BinaryOp::Div, &0.0).unwrap().is_nan());
    }

    #[test]
    fn scalars_do_not_stack() {
        assert_eq!(f64::stacking(), Stacking::Unsupported);
        assert!(f64::stack(vec![1.0, 2.0], &["A".into(), "B".into()], "index").is_err());
    }
}
