//! Clebsch-Gordan coefficient tables
//!
//! A table `C(l1, l2, l)` is a real `(2l1+1) × (2l2+1)` matrix whose entry
//! `(m1+l1, m2+l2)` is `⟨l1 m1; l2 m2 | l, m1+m2⟩`. Entries whose `m1+m2`
//! falls outside `[-l, l]` are stored as zero and never read by the engines.
//!
//! Coefficients are evaluated from the Racah closed form in `f64` using
//! log-factorials, then narrowed to the requested precision.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use so3rs_core::{Precision, SO3Float};

use crate::cache::KeyedCache;
use crate::error::{fatal, KernelError, KernelResult};
use crate::selection::{band, triangle_ok};
use crate::utils::ln_factorial;

/// Immutable coefficient table for one `(l1, l2, l)` triple
#[derive(Debug, Clone, PartialEq)]
pub struct CGCoefficients<T> {
    l1: usize,
    l2: usize,
    l: usize,
    table: Array2<T>,
}

impl<T: SO3Float> CGCoefficients<T> {
    /// Evaluate the table directly, bypassing any cache
    pub fn compute(l1: usize, l2: usize, l: usize) -> KernelResult<Self> {
        if !triangle_ok(l1, l2, l) {
            return Err(KernelError::triangle_rule("cg_coefficients", l1, l2, l));
        }
        let mut table = Array2::from_elem((2 * l1 + 1, 2 * l2 + 1), T::zero());
        let l1i = l1 as isize;
        let l2i = l2 as isize;
        for m1 in -l1i..=l1i {
            for m2 in band(l1, l2, l, m1) {
                let value = racah(l1, l2, l, m1, m2);
                table[[(m1 + l1i) as usize, (m2 + l2i) as usize]] = T::from_f64_lossy(value);
            }
        }
        Ok(Self { l1, l2, l, table })
    }
}

impl<T: Copy> CGCoefficients<T> {
    /// Degree of the first factor
    pub fn l1(&self) -> usize {
        self.l1
    }

    /// Degree of the second factor
    pub fn l2(&self) -> usize {
        self.l2
    }

    /// Degree of the coupled output
    pub fn l(&self) -> usize {
        self.l
    }

    /// Entry at storage offsets `(m1 + l1, m2 + l2)`
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> T {
        self.table[[i, j]]
    }

    /// Entry at signed indices `(m1, m2)`
    #[inline]
    pub fn get(&self, m1: isize, m2: isize) -> T {
        self.at(
            (m1 + self.l1 as isize) as usize,
            (m2 + self.l2 as isize) as usize,
        )
    }

    /// The raw table
    pub fn table(&self) -> ArrayView2<'_, T> {
        self.table.view()
    }
}

type CGKey = (usize, usize, usize, Precision);

/// Process-lifetime memo of coefficient tables, keyed by degrees and precision
///
/// # Examples
///
/// ```
/// use so3rs_kernels::CGBank;
///
/// let bank = CGBank::new();
/// let c = bank.get::<f64>(1, 1, 0);
/// assert!((c.get(1, -1) - 1.0 / 3f64.sqrt()).abs() < 1e-12);
///
/// // Second lookup is served from the cache
/// let again = bank.get::<f64>(1, 1, 0);
/// assert_eq!(c, again);
/// assert_eq!(bank.computed(), 1);
/// ```
#[derive(Default)]
pub struct CGBank {
    tables: KeyedCache<CGKey, Arc<dyn Any + Send + Sync>>,
}

impl CGBank {
    /// Empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `(l1, l2, l)`; aborts when the triangle rule fails
    #[track_caller]
    pub fn get<T: SO3Float>(&self, l1: usize, l2: usize, l: usize) -> Arc<CGCoefficients<T>> {
        fatal(self.try_get(l1, l2, l))
    }

    /// Table for `(l1, l2, l)`, computing it on first request
    pub fn try_get<T: SO3Float>(
        &self,
        l1: usize,
        l2: usize,
        l: usize,
    ) -> KernelResult<Arc<CGCoefficients<T>>> {
        if !triangle_ok(l1, l2, l) {
            return Err(KernelError::triangle_rule("cg_bank", l1, l2, l));
        }
        let key = (l1, l2, l, T::PRECISION);
        let erased = self.tables.get_or_try_init(&key, || {
            let start = Instant::now();
            let table = CGCoefficients::<T>::compute(l1, l2, l)?;
            tracing::debug!(
                l1,
                l2,
                l,
                precision = %T::PRECISION,
                elapsed_us = start.elapsed().as_micros() as u64,
                "computed Clebsch-Gordan table"
            );
            Ok::<_, KernelError>(Arc::new(table) as Arc<dyn Any + Send + Sync>)
        })?;
        match erased.downcast::<CGCoefficients<T>>() {
            Ok(table) => Ok(table),
            Err(_) => unreachable!("cache key carries the precision tag"),
        }
    }

    /// Number of tables computed so far (cache misses)
    pub fn computed(&self) -> usize {
        self.tables.computed()
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `⟨l1 m1; l2 m2 | l, m1+m2⟩` from the Racah formula
fn racah(l1: usize, l2: usize, l: usize, m1: isize, m2: isize) -> f64 {
    let (j1, j2, j) = (l1 as isize, l2 as isize, l as isize);
    let m = m1 + m2;

    let ln_prefactor = 0.5
        * (((2 * j + 1) as f64).ln() + ln_factorial(j + j1 - j2) + ln_factorial(j - j1 + j2)
            + ln_factorial(j1 + j2 - j)
            - ln_factorial(j1 + j2 + j + 1)
            + ln_factorial(j + m)
            + ln_factorial(j - m)
            + ln_factorial(j1 - m1)
            + ln_factorial(j1 + m1)
            + ln_factorial(j2 - m2)
            + ln_factorial(j2 + m2));

    let kmin = 0isize.max(j2 - j - m1).max(j1 - j + m2);
    let kmax = (j1 + j2 - j).min(j1 - m1).min(j2 + m2);

    let mut sum = 0.0;
    for k in kmin..=kmax {
        let ln_denominator = ln_factorial(k)
            + ln_factorial(j1 + j2 - j - k)
            + ln_factorial(j1 - m1 - k)
            + ln_factorial(j2 + m2 - k)
            + ln_factorial(j - j2 + m1 + k)
            + ln_factorial(j - j1 - m2 + k);
        let term = (ln_prefactor - ln_denominator).exp();
        if k % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::thread;

    #[test]
    fn test_known_values() {
        let bank = CGBank::new();
        let c110 = bank.get::<f64>(1, 1, 0);
        assert_abs_diff_eq!(c110.get(1, -1), 1.0 / 3f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(c110.get(0, 0), -1.0 / 3f64.sqrt(), epsilon = 1e-12);

        let c111 = bank.get::<f64>(1, 1, 1);
        assert_abs_diff_eq!(c111.get(1, 0), 1.0 / 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(c111.get(0, 1), -1.0 / 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(c111.get(0, 0), 0.0, epsilon = 1e-12);

        let c112 = bank.get::<f64>(1, 1, 2);
        assert_abs_diff_eq!(c112.get(1, 1), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c112.get(0, 0), (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_degree_zero_identity() {
        let c = CGCoefficients::<f64>::compute(0, 0, 0).unwrap();
        assert_eq!(c.table().shape(), &[1, 1]);
        assert_abs_diff_eq!(c.at(0, 0), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_coupling_to_scalar_is_trivial() {
        // ⟨l1 m1; 0 0 | l1 m1⟩ = 1
        for l1 in 0..5usize {
            let c = CGCoefficients::<f64>::compute(l1, 0, l1).unwrap();
            for m1 in -(l1 as isize)..=(l1 as isize) {
                assert_abs_diff_eq!(c.get(m1, 0), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_orthonormality() {
        let (l1, l2) = (2usize, 3usize);
        let tables: Vec<_> = (1..=5)
            .map(|l| CGCoefficients::<f64>::compute(l1, l2, l).unwrap())
            .collect();
        for (a, ca) in tables.iter().enumerate() {
            for (b, cb) in tables.iter().enumerate() {
                let la = ca.l() as isize;
                let lb = cb.l() as isize;
                for m in -la.min(lb)..=la.min(lb) {
                    let mut dot = 0.0;
                    for m1 in -(l1 as isize)..=(l1 as isize) {
                        let m2 = m - m1;
                        if m2.unsigned_abs() <= l2 {
                            dot += ca.get(m1, m2) * cb.get(m1, m2);
                        }
                    }
                    let expected = if a == b { 1.0 } else { 0.0 };
                    assert_abs_diff_eq!(dot, expected, epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_out_of_band_entries_are_zero() {
        let c = CGCoefficients::<f64>::compute(2, 2, 1).unwrap();
        assert_eq!(c.get(2, 2), 0.0);
        assert_eq!(c.get(-2, -1), 0.0);
    }

    #[test]
    fn test_triangle_violation_is_error() {
        let bank = CGBank::new();
        let err = bank.try_get::<f64>(1, 1, 3).unwrap_err();
        assert!(matches!(err, KernelError::TriangleRule { l: 3, .. }));
        assert!(bank.is_empty());
    }

    #[test]
    #[should_panic(expected = "triangle rule violated")]
    fn test_triangle_violation_is_fatal() {
        CGBank::new().get::<f64>(0, 2, 1);
    }

    #[test]
    fn test_precision_is_part_of_key() {
        let bank = CGBank::new();
        let single = bank.get::<f32>(2, 1, 2);
        let double = bank.get::<f64>(2, 1, 2);
        assert_eq!(bank.computed(), 2);
        assert_abs_diff_eq!(single.get(1, 0) as f64, double.get(1, 0), epsilon = 1e-6);
    }

    #[test]
    fn test_concurrent_first_lookup_computes_once() {
        let bank = Arc::new(CGBank::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bank = Arc::clone(&bank);
                thread::spawn(move || bank.get::<f64>(4, 3, 5))
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(bank.computed(), 1);
        for t in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], t));
        }
    }
}
