//! Numeric helpers shared by the coefficient tables

/// `ln(n!)` for `n >= 0`
pub(crate) fn ln_factorial(n: isize) -> f64 {
    debug_assert!(n >= 0);
    (2..=n).map(|k| (k as f64).ln()).sum()
}
