//! Numeric precision of parts and coefficient tables

use scirs2_core::numeric::{Float, FloatConst, FromPrimitive, NumAssign};
use std::fmt::{self, Debug, Display};

/// Precision tag used to key coefficient caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit floats
    Single,
    /// 64-bit floats
    Double,
}

impl Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "f32"),
            Precision::Double => write!(f, "f64"),
        }
    }
}

/// Real scalar type of SO(3) parts
///
/// Coefficients are always evaluated in `f64` and narrowed with
/// [`SO3Float::from_f64_lossy`], so the trait carries its own infallible
/// narrowing instead of going through `NumCast`.
pub trait SO3Float:
    Float + FloatConst + NumAssign + FromPrimitive + Debug + Display + Default + Send + Sync + 'static
{
    /// Cache key component for this scalar type
    const PRECISION: Precision;

    /// Narrow (or pass through) an `f64`
    fn from_f64_lossy(value: f64) -> Self;
}

impl SO3Float for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }
}

impl SO3Float for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_tags() {
        assert_eq!(<f32 as SO3Float>::PRECISION, Precision::Single);
        assert_eq!(<f64 as SO3Float>::PRECISION, Precision::Double);
        assert_eq!(Precision::Single.to_string(), "f32");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(f32::from_f64_lossy(0.5), 0.5f32);
        assert_eq!(f64::from_f64_lossy(0.1), 0.1f64);
    }
}
