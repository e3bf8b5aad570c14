//! Fourier parts: degree-`l` Fourier coefficients of functions on SO(3)
//!
//! An [`SO3FPart`] is a `(batch, 2l+1, 2l+1)` complex tensor; entry
//! `(b, M+l, m+l)` is the coefficient of the Wigner matrix element
//! `D^l_{Mm}` of batch item `b`.

use crate::device::Device;
use crate::error::{CoreError, CoreResult};
use crate::fill::FillPattern;
use crate::part::hermitian_inner;
use crate::precision::SO3Float;
use scirs2_core::ndarray_ext::{s, Array3, ArrayView3, ArrayViewMut3, Zip};
use scirs2_core::numeric::Complex;

/// Batched square Fourier part of degree `l`
#[derive(Clone, Debug, PartialEq)]
pub struct SO3FPart<T> {
    data: Array3<Complex<T>>,
    device: Device,
}

impl<T: SO3Float> SO3FPart<T> {
    /// Allocate with the given fill pattern
    pub fn new(b: usize, l: usize, fill: FillPattern, device: Device) -> Self {
        let d = 2 * l + 1;
        Self {
            data: fill.generate((b, d, d), None),
            device,
        }
    }

    /// All-zero Fourier part
    pub fn zero(b: usize, l: usize, device: Device) -> Self {
        Self::new(b, l, FillPattern::Zero, device)
    }

    /// Fourier part with standard complex Gaussian entries
    pub fn gaussian(b: usize, l: usize, device: Device) -> Self {
        Self::new(b, l, FillPattern::Gaussian, device)
    }

    /// Gaussian Fourier part from a fixed seed
    pub fn gaussian_seeded(b: usize, l: usize, seed: u64, device: Device) -> Self {
        let d = 2 * l + 1;
        Self {
            data: FillPattern::Gaussian.generate((b, d, d), Some(seed)),
            device,
        }
    }

    /// Fourier part holding its row-major element index
    pub fn sequential(b: usize, l: usize, device: Device) -> Self {
        Self::new(b, l, FillPattern::Sequential, device)
    }

    /// Zero part with the same shape and device as `self`
    pub fn zeros_like(&self) -> Self {
        Self::zero(self.batch(), self.getl(), self.device)
    }

    /// Wrap an existing array
    ///
    /// # Errors
    ///
    /// Fails unless axes 1 and 2 are equal and odd.
    pub fn from_array(data: Array3<Complex<T>>, device: Device) -> CoreResult<Self> {
        let (rows, cols) = (data.shape()[1], data.shape()[2]);
        if rows != cols {
            return Err(CoreError::NotSquare { rows, cols });
        }
        if rows % 2 == 0 {
            return Err(CoreError::EvenRepresentationAxis {
                axis: 1,
                extent: rows,
            });
        }
        Ok(Self { data, device })
    }

    /// Copy of this part tagged with another device
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            data: self.data.clone(),
            device,
        }
    }

    /// Coefficient at signed indices `(M, m)` of batch item `b`
    pub fn get(&self, b: usize, big_m: isize, m: isize) -> Complex<T> {
        let l = self.getl() as isize;
        self.data[[b, (big_m + l) as usize, (m + l) as usize]]
    }

    /// Both representation axes sign-reversed: `flip(M, m) = self(-M, -m)`
    ///
    /// # Examples
    ///
    /// ```
    /// use so3rs_core::{Device, SO3FPart};
    ///
    /// let p = SO3FPart::<f64>::sequential(1, 1, Device::Host);
    /// let f = p.flip();
    /// assert_eq!(f.get(0, -1, 0), p.get(0, 1, 0));
    /// assert_eq!(f.get(0, 1, -1), p.get(0, -1, 1));
    /// ```
    pub fn flip(&self) -> Self {
        Self {
            data: self.data.slice(s![.., ..;-1, ..;-1]).to_owned(),
            device: self.device,
        }
    }

    /// Elementwise complex conjugate
    pub fn conj(&self) -> Self {
        Self {
            data: self.data.mapv(|z| z.conj()),
            device: self.device,
        }
    }

    /// Hermitian inner product `Σ conj(self) · other`
    pub fn inner(&self, other: &Self) -> Complex<T> {
        assert_eq!(
            self.shape(),
            other.shape(),
            "inner product requires equal shapes"
        );
        hermitian_inner(self.data.iter(), other.data.iter())
    }

    /// Add `other` into `self` elementwise
    pub fn add_assign(&mut self, other: &Self) {
        assert_eq!(self.shape(), other.shape(), "add requires equal shapes");
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|a, &b| *a += b);
    }

    /// Largest elementwise modulus of `self - other`
    pub fn max_abs_diff(&self, other: &Self) -> T {
        assert_eq!(self.shape(), other.shape(), "diff requires equal shapes");
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (a, b)| acc.max((*a - *b).norm()))
    }
}

impl<T> SO3FPart<T> {
    /// Representation degree
    pub fn getl(&self) -> usize {
        (self.data.shape()[1] - 1) / 2
    }

    /// Batch size
    pub fn batch(&self) -> usize {
        self.data.shape()[0]
    }

    /// Device tag
    pub fn device(&self) -> Device {
        self.device
    }

    /// Full shape `(batch, 2l+1, 2l+1)`
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Read-only view of the storage
    pub fn view(&self) -> ArrayView3<'_, Complex<T>> {
        self.data.view()
    }

    /// Mutable view of the storage
    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, Complex<T>> {
        self.data.view_mut()
    }

    /// Borrow the underlying array
    pub fn array(&self) -> &Array3<Complex<T>> {
        &self.data
    }

    /// Consume the part and return its array
    pub fn into_array(self) -> Array3<Complex<T>> {
        self.data
    }
}
