//! Initialization patterns for newly allocated parts
//!
//! Every constructor in this crate takes a [`FillPattern`] instead of a
//! family of type-level fill markers. Random fills go through
//! `scirs2_core::random`.

use crate::precision::SO3Float;
use scirs2_core::ndarray_ext::{Array, Dimension, ShapeBuilder};
use scirs2_core::numeric::Complex;
use scirs2_core::random::{rngs::StdRng, thread_rng, Rng, SeedableRng};

/// How a freshly allocated part is initialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillPattern {
    /// Storage is allocated but its contents are unspecified
    ///
    /// The current implementation zero-fills; callers must not rely on it.
    Raw,
    /// All entries are zero
    Zero,
    /// Real and imaginary parts drawn independently from N(0, 1)
    Gaussian,
    /// The row-major element index written into the real part
    Sequential,
}

impl FillPattern {
    /// Allocate an array of the given shape with this pattern
    ///
    /// `seed` only affects [`FillPattern::Gaussian`]; `None` seeds from the
    /// thread-local generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use so3rs_core::FillPattern;
    /// use scirs2_core::numeric::Complex;
    ///
    /// let a = FillPattern::Sequential.generate::<f64, _, _>((2, 3), None);
    /// assert_eq!(a[[1, 2]], Complex::new(5.0, 0.0));
    /// ```
    pub fn generate<T, Sh, D>(self, shape: Sh, seed: Option<u64>) -> Array<Complex<T>, D>
    where
        T: SO3Float,
        Sh: ShapeBuilder<Dim = D>,
        D: Dimension,
    {
        let zero = Complex::new(T::zero(), T::zero());
        match self {
            FillPattern::Raw | FillPattern::Zero => Array::from_elem(shape, zero),
            FillPattern::Sequential => {
                let mut counter = 0usize;
                Array::from_shape_fn(shape, |_| {
                    let value = T::from_f64_lossy(counter as f64);
                    counter += 1;
                    Complex::new(value, T::zero())
                })
            }
            FillPattern::Gaussian => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::seed_from_u64(thread_rng().random::<u64>()),
                };
                Array::from_shape_fn(shape, |_| {
                    let (re, im) = box_muller(&mut rng);
                    Complex::new(T::from_f64_lossy(re), T::from_f64_lossy(im))
                })
            }
        }
    }
}

/// Two independent standard normal samples
fn box_muller<R: Rng>(rng: &mut R) -> (f64, f64) {
    // u1 in (0, 1] keeps the logarithm finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * std::f64::consts::PI * u2;
    (radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::Array3;

    #[test]
    fn test_zero_fill() {
        let a: Array3<Complex<f64>> = FillPattern::Zero.generate((2, 3, 4), None);
        assert!(a.iter().all(|z| z.re == 0.0 && z.im == 0.0));
    }

    #[test]
    fn test_sequential_fill_is_row_major() {
        let a: Array3<Complex<f32>> = FillPattern::Sequential.generate((2, 3, 4), None);
        assert_eq!(a[[0, 0, 1]].re, 1.0);
        assert_eq!(a[[0, 1, 0]].re, 4.0);
        assert_eq!(a[[1, 0, 0]].re, 12.0);
        assert!(a.iter().all(|z| z.im == 0.0));
    }

    #[test]
    fn test_gaussian_seeded_is_reproducible() {
        let a: Array3<Complex<f64>> = FillPattern::Gaussian.generate((2, 3, 4), Some(7));
        let b: Array3<Complex<f64>> = FillPattern::Gaussian.generate((2, 3, 4), Some(7));
        assert_eq!(a, b);

        let c: Array3<Complex<f64>> = FillPattern::Gaussian.generate((2, 3, 4), Some(8));
        assert_ne!(a, c);
    }

    #[test]
    fn test_gaussian_moments() {
        let a: Array3<Complex<f64>> = FillPattern::Gaussian.generate((10, 20, 50), Some(1));
        let n = a.len() as f64;
        let mean: f64 = a.iter().map(|z| z.re).sum::<f64>() / n;
        let var: f64 = a.iter().map(|z| (z.re - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1);
        assert!((var - 1.0).abs() < 0.1);
    }
}
