//! Angular transform matrices
//!
//! The inverse transform samples a degree-`l` function on the grid
//!
//! - `αₐ = 2πa / n_phi`, `γ_c = 2πc / n_psi` (azimuthal, endpoint excluded)
//! - `βₜ = π(2t+1) / (2 n_theta)` (polar, midpoint rule)
//!
//! and reconstructs `f(α, β, γ) = Σ p(m, m') e^{-imα} d^l_{mm'}(β) e^{-im'γ}`.
//! [`FourierMatrixBank`] memoizes the two factor families per
//! `(degree, samples, device, precision)`.

use std::any::Any;
use std::f64::consts::PI;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

use scirs2_core::ndarray_ext::{Array2, Array3};
use scirs2_core::numeric::Complex;
use so3rs_core::{Device, GridResolution, Precision, SO3Float};

use crate::cache::KeyedCache;
use crate::utils::ln_factorial;

/// Wigner small-d element `d^l_{row,col}(β)`
///
/// Uses the convention `D^l_{m'm}(α,β,γ) = e^{-im'α} d^l_{m'm}(β) e^{-imγ}`,
/// under which `d^1_{1,0}(β) = -sin β / √2`.
pub fn small_d(l: usize, row: isize, col: isize, beta: f64) -> f64 {
    let j = l as isize;
    debug_assert!(row.abs() <= j && col.abs() <= j);

    let (half_cos, half_sin) = ((beta / 2.0).cos(), (beta / 2.0).sin());
    let ln_norm = 0.5
        * (ln_factorial(j + row) + ln_factorial(j - row) + ln_factorial(j + col)
            + ln_factorial(j - col));

    let smin = 0isize.max(col - row);
    let smax = (j + col).min(j - row);

    let mut sum = 0.0;
    for s in smin..=smax {
        let ln_den = ln_factorial(j + col - s)
            + ln_factorial(s)
            + ln_factorial(row - col + s)
            + ln_factorial(j - row - s);
        let magnitude = (ln_norm - ln_den).exp()
            * half_cos.powi((2 * j + col - row - 2 * s) as i32)
            * half_sin.powi((row - col + 2 * s) as i32);
        if (row - col + s).rem_euclid(2) == 0 {
            sum += magnitude;
        } else {
            sum -= magnitude;
        }
    }
    sum
}

/// Wigner D-matrix of degree `l`, indexed `D(m'+l, m+l)`
///
/// `D^l_{m'm}(α, β, γ) = e^{-im'α} d^l_{m'm}(β) e^{-imγ}`. A rotated vector
/// part is `x'(m', n) = Σ_m D^l_{m'm} x(m, n)`.
///
/// # Examples
///
/// ```
/// use so3rs_kernels::wigner::wigner_big_d;
///
/// let d = wigner_big_d::<f64>(1, 0.0, 0.0, 0.0);
/// assert_eq!(d[[1, 1]].re, 1.0);
/// assert_eq!(d[[0, 2]].norm(), 0.0);
/// ```
pub fn wigner_big_d<T: SO3Float>(
    l: usize,
    alpha: f64,
    beta: f64,
    gamma: f64,
) -> Array2<Complex<T>> {
    let li = l as isize;
    Array2::from_shape_fn((2 * l + 1, 2 * l + 1), |(i, j)| {
        let (row, col) = (i as isize - li, j as isize - li);
        let magnitude = small_d(l, row, col, beta);
        let angle = -(row as f64) * alpha - (col as f64) * gamma;
        Complex::new(
            T::from_f64_lossy(magnitude * angle.cos()),
            T::from_f64_lossy(magnitude * angle.sin()),
        )
    })
}

/// Polar sample `βₜ`
#[inline]
pub fn polar_angle(t: usize, n_theta: usize) -> f64 {
    PI * (2 * t + 1) as f64 / (2 * n_theta) as f64
}

/// Azimuthal sample `αₐ`
#[inline]
pub fn azimuthal_angle(a: usize, n: usize) -> f64 {
    2.0 * PI * a as f64 / n as f64
}

/// Array tagged with the device it was prepared for
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceArray<A> {
    device: Device,
    data: A,
}

impl<A> DeviceArray<A> {
    /// Device this copy is resident on
    pub fn device(&self) -> Device {
        self.device
    }

    /// Underlying storage
    pub fn data(&self) -> &A {
        &self.data
    }
}

impl<A> Deref for DeviceArray<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.data
    }
}

/// Polar matrix `D(m+l, t, m'+l) = d^l_{mm'}(βₜ)`, shape `(2l+1, n_theta, 2l+1)`
pub type WignerMatrix<T> = DeviceArray<Array3<T>>;

/// Phase matrix `F(a, m+l) = e^{-imαₐ}`, shape `(n, 2l+1)`
pub type PhaseMatrix<T> = DeviceArray<Array2<Complex<T>>>;

/// The three factors of the degree-`l` inverse transform
#[derive(Debug, Clone)]
pub struct AngularMatrices<T> {
    /// Polar factor over `n_theta`
    pub d: Arc<WignerMatrix<T>>,
    /// First azimuthal factor over `n_phi`
    pub phi: Arc<PhaseMatrix<T>>,
    /// Second azimuthal factor over `n_psi`
    pub psi: Arc<PhaseMatrix<T>>,
}

type AngularKey = (usize, usize, Device, Precision);

/// Memo of Wigner and phase matrices
#[derive(Default)]
pub struct FourierMatrixBank {
    wigner: KeyedCache<AngularKey, Arc<dyn Any + Send + Sync>>,
    phase: KeyedCache<AngularKey, Arc<dyn Any + Send + Sync>>,
}

impl FourierMatrixBank {
    /// Empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Polar matrix for degree `l` on `n_theta` samples
    pub fn wigner_d<T: SO3Float>(
        &self,
        l: usize,
        n_theta: usize,
        device: Device,
    ) -> Arc<WignerMatrix<T>> {
        let key = (l, n_theta, device, T::PRECISION);
        let erased = self.wigner.get_or_try_init(&key, || {
            let start = Instant::now();
            let data = wigner_table::<T>(l, n_theta);
            tracing::debug!(
                l,
                n_theta,
                %device,
                precision = %T::PRECISION,
                elapsed_us = start.elapsed().as_micros() as u64,
                "computed Wigner d matrix"
            );
            Ok::<_, std::convert::Infallible>(
                Arc::new(DeviceArray { device, data }) as Arc<dyn Any + Send + Sync>
            )
        });
        downcast(erased)
    }

    /// Phase matrix for degree `l` on `n` azimuthal samples
    pub fn phase_matrix<T: SO3Float>(
        &self,
        l: usize,
        n: usize,
        device: Device,
    ) -> Arc<PhaseMatrix<T>> {
        let key = (l, n, device, T::PRECISION);
        let erased = self.phase.get_or_try_init(&key, || {
            let data = phase_table::<T>(l, n);
            tracing::debug!(l, n, %device, precision = %T::PRECISION, "computed phase matrix");
            Ok::<_, std::convert::Infallible>(
                Arc::new(DeviceArray { device, data }) as Arc<dyn Any + Send + Sync>
            )
        });
        downcast(erased)
    }

    /// All three factors for degree `l` at the given resolution
    pub fn angular_matrices<T: SO3Float>(
        &self,
        l: usize,
        resolution: GridResolution,
        device: Device,
    ) -> AngularMatrices<T> {
        AngularMatrices {
            d: self.wigner_d(l, resolution.n_theta, device),
            phi: self.phase_matrix(l, resolution.n_phi, device),
            psi: self.phase_matrix(l, resolution.n_psi, device),
        }
    }

    /// Number of matrices computed so far (both families)
    pub fn computed(&self) -> usize {
        self.wigner.computed() + self.phase.computed()
    }
}

fn downcast<V: Any + Send + Sync>(
    erased: Result<Arc<dyn Any + Send + Sync>, std::convert::Infallible>,
) -> Arc<V> {
    let erased = match erased {
        Ok(value) => value,
        Err(never) => match never {},
    };
    match erased.downcast::<V>() {
        Ok(value) => value,
        Err(_) => unreachable!("cache key carries the precision tag"),
    }
}

fn wigner_table<T: SO3Float>(l: usize, n_theta: usize) -> Array3<T> {
    let li = l as isize;
    let dim = 2 * l + 1;
    Array3::from_shape_fn((dim, n_theta, dim), |(i, t, j)| {
        let beta = polar_angle(t, n_theta);
        T::from_f64_lossy(small_d(l, i as isize - li, j as isize - li, beta))
    })
}

fn phase_table<T: SO3Float>(l: usize, n: usize) -> Array2<Complex<T>> {
    let li = l as isize;
    Array2::from_shape_fn((n, 2 * l + 1), |(a, i)| {
        let m = (i as isize - li) as f64;
        let angle = -m * azimuthal_angle(a, n);
        Complex::new(
            T::from_f64_lossy(angle.cos()),
            T::from_f64_lossy(angle.sin()),
        )
    })
}
