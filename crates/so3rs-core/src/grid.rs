//! Sampled functions on SO(3)
//!
//! The inverse transform writes function values on a regular grid of Euler
//! angles `(α, β, γ)` into an [`SO3Grid`] of shape
//! `(batch, n_phi, n_theta, n_psi)`.

use crate::device::Device;
use crate::precision::SO3Float;
use scirs2_core::ndarray_ext::{Array4, ArrayView4, ArrayViewMut4, Zip};
use scirs2_core::numeric::Complex;

/// Number of samples along each Euler angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridResolution {
    /// Samples of the first azimuthal angle α ∈ [0, 2π)
    pub n_phi: usize,
    /// Samples of the polar angle β ∈ (0, π)
    pub n_theta: usize,
    /// Samples of the second azimuthal angle γ ∈ [0, 2π)
    pub n_psi: usize,
}

impl GridResolution {
    /// Explicit resolution
    pub fn new(n_phi: usize, n_theta: usize, n_psi: usize) -> Self {
        Self {
            n_phi,
            n_theta,
            n_psi,
        }
    }

    /// Same number of samples on every axis
    pub fn uniform(n: usize) -> Self {
        Self::new(n, n, n)
    }

    /// Grid able to resolve degrees up to `maxl` without aliasing
    pub fn for_bandlimit(maxl: usize) -> Self {
        let n = 2 * maxl + 2;
        Self::new(n, n, n)
    }

    /// Total number of grid points
    pub fn len(&self) -> usize {
        self.n_phi * self.n_theta * self.n_psi
    }

    /// True when any axis has zero samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Batched function values on an Euler-angle grid
#[derive(Clone, Debug, PartialEq)]
pub struct SO3Grid<T> {
    data: Array4<Complex<T>>,
    device: Device,
}

impl<T: SO3Float> SO3Grid<T> {
    /// Zero grid
    pub fn zero(b: usize, resolution: GridResolution, device: Device) -> Self {
        let GridResolution {
            n_phi,
            n_theta,
            n_psi,
        } = resolution;
        Self {
            data: Array4::from_elem(
                (b, n_phi, n_theta, n_psi),
                Complex::new(T::zero(), T::zero()),
            ),
            device,
        }
    }

    /// Wrap an existing array
    pub fn from_array(data: Array4<Complex<T>>, device: Device) -> Self {
        Self { data, device }
    }

    /// Largest elementwise modulus of `self - other`
    pub fn max_abs_diff(&self, other: &Self) -> T {
        assert_eq!(self.shape(), other.shape(), "diff requires equal shapes");
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (a, b)| acc.max((*a - *b).norm()))
    }

    /// Add `other` into `self` elementwise
    pub fn add_assign(&mut self, other: &Self) {
        assert_eq!(self.shape(), other.shape(), "add requires equal shapes");
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a += b);
    }

    /// Value at grid point `(b, a, t, c)`
    pub fn get(&self, b: usize, a: usize, t: usize, c: usize) -> Complex<T> {
        self.data[[b, a, t, c]]
    }
}

impl<T> SO3Grid<T> {
    /// Batch size
    pub fn batch(&self) -> usize {
        self.data.shape()[0]
    }

    /// Resolution read back from the shape
    pub fn resolution(&self) -> GridResolution {
        let s = self.data.shape();
        GridResolution::new(s[1], s[2], s[3])
    }

    /// Device tag
    pub fn device(&self) -> Device {
        self.device
    }

    /// Full shape
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Read-only view
    pub fn view(&self) -> ArrayView4<'_, Complex<T>> {
        self.data.view()
    }

    /// Mutable view
    pub fn view_mut(&mut self) -> ArrayViewMut4<'_, Complex<T>> {
        self.data.view_mut()
    }

    /// Borrow the underlying array
    pub fn array(&self) -> &Array4<Complex<T>> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_roundtrip() {
        let g = SO3Grid::<f64>::zero(2, GridResolution::new(4, 5, 6), Device::Host);
        assert_eq!(g.shape(), &[2, 4, 5, 6]);
        assert_eq!(g.resolution(), GridResolution::new(4, 5, 6));
        assert_eq!(g.resolution().len(), 120);
    }

    #[test]
    fn test_bandlimit_resolution() {
        assert_eq!(GridResolution::for_bandlimit(3), GridResolution::uniform(8));
        assert!(!GridResolution::uniform(1).is_empty());
        assert!(GridResolution::new(0, 2, 2).is_empty());
    }
}
