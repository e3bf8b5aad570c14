//! Vector parts: batched vectors transforming in one irreducible representation
//!
//! An [`SO3Part`] of degree `l` with multiplicity `n` is a complex tensor of
//! shape `(batch, 2l+1, n)`. Axis 1 is the representation index `m`, stored
//! at offset `m + l`; axis 2 enumerates independent channels ("fragments").

use crate::device::Device;
use crate::error::{CoreError, CoreResult};
use crate::fill::FillPattern;
use crate::precision::SO3Float;
use scirs2_core::ndarray_ext::{Array3, ArrayView3, ArrayViewMut3, Zip};
use scirs2_core::numeric::Complex;

/// Batched degree-`l` vector part with `n` channels
///
/// # Examples
///
/// ```
/// use so3rs_core::{Device, SO3Part};
///
/// let p = SO3Part::<f64>::zero(4, 2, 3, Device::Host);
/// assert_eq!(p.shape(), &[4, 5, 3]);
/// assert_eq!(p.getl(), 2);
/// assert_eq!(p.getn(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SO3Part<T> {
    data: Array3<Complex<T>>,
    device: Device,
}

impl<T: SO3Float> SO3Part<T> {
    /// Allocate a part with the given fill pattern
    pub fn new(b: usize, l: usize, n: usize, fill: FillPattern, device: Device) -> Self {
        Self {
            data: fill.generate((b, 2 * l + 1, n), None),
            device,
        }
    }

    /// All-zero part
    pub fn zero(b: usize, l: usize, n: usize, device: Device) -> Self {
        Self::new(b, l, n, FillPattern::Zero, device)
    }

    /// Part with unspecified contents
    pub fn raw(b: usize, l: usize, n: usize, device: Device) -> Self {
        Self::new(b, l, n, FillPattern::Raw, device)
    }

    /// Part with standard complex Gaussian entries
    pub fn gaussian(b: usize, l: usize, n: usize, device: Device) -> Self {
        Self::new(b, l, n, FillPattern::Gaussian, device)
    }

    /// Gaussian part from a fixed seed
    pub fn gaussian_seeded(b: usize, l: usize, n: usize, seed: u64, device: Device) -> Self {
        Self {
            data: FillPattern::Gaussian.generate((b, 2 * l + 1, n), Some(seed)),
            device,
        }
    }

    /// Part holding its row-major element index
    pub fn sequential(b: usize, l: usize, n: usize, device: Device) -> Self {
        Self::new(b, l, n, FillPattern::Sequential, device)
    }

    /// Zero part with the same shape and device as `self`
    pub fn zeros_like(&self) -> Self {
        Self::zero(self.batch(), self.getl(), self.getn(), self.device)
    }

    /// Wrap an existing array
    ///
    /// # Errors
    ///
    /// Fails if axis 1 has even extent.
    pub fn from_array(data: Array3<Complex<T>>, device: Device) -> CoreResult<Self> {
        let extent = data.shape()[1];
        if extent % 2 == 0 {
            return Err(CoreError::EvenRepresentationAxis { axis: 1, extent });
        }
        Ok(Self { data, device })
    }

    /// Build a part from flat row-major data
    pub fn from_vec(
        data: Vec<Complex<T>>,
        b: usize,
        l: usize,
        n: usize,
        device: Device,
    ) -> CoreResult<Self> {
        let shape = (b, 2 * l + 1, n);
        let expected = b * (2 * l + 1) * n;
        let actual = data.len();
        let array = Array3::from_shape_vec(shape, data).map_err(|_| CoreError::ShapeMismatch {
            shape: vec![b, 2 * l + 1, n],
            expected,
            actual,
        })?;
        Ok(Self {
            data: array,
            device,
        })
    }
}

impl<T> SO3Part<T> {
    /// Representation degree
    pub fn getl(&self) -> usize {
        (self.data.shape()[1] - 1) / 2
    }

    /// Multiplicity (number of channels)
    pub fn getn(&self) -> usize {
        self.data.shape()[2]
    }

    /// Batch size
    pub fn batch(&self) -> usize {
        self.data.shape()[0]
    }

    /// Device tag
    pub fn device(&self) -> Device {
        self.device
    }

    /// Full shape `(batch, 2l+1, n)`
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

impl<T: SO3Float> SO3Part<T> {
    /// Copy of this part tagged with another device
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            data: self.data.clone(),
            device,
        }
    }

    /// Element `(b, m + l, n)` for signed `m`
    pub fn get(&self, b: usize, m: isize, n: usize) -> Complex<T> {
        let row = (m + self.getl() as isize) as usize;
        self.data[[b, row, n]]
    }

    /// Elementwise complex conjugate
    pub fn conj(&self) -> Self {
        Self {
            data: self.data.mapv(|z| z.conj()),
            device: self.device,
        }
    }

    /// Hermitian inner product `Σ conj(self) · other`
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
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

/// Hermitian inner product of two equally long element streams
pub(crate) fn hermitian_inner<'a, T, I, J>(a: I, b: J) -> Complex<T>
where
    T: SO3Float,
    I: Iterator<Item = &'a Complex<T>>,
    J: Iterator<Item = &'a Complex<T>>,
{
    a.zip(b)
        .fold(Complex::new(T::zero(), T::zero()), |acc, (x, y)| {
            acc + x.conj() * *y
        })
}
