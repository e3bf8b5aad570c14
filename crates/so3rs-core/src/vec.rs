//! Multi-degree collections of parts
//!
//! [`SO3Vec`] stores one vector part per degree `0..=maxl` with the
//! per-degree multiplicities recorded in a [`Tau`]; [`SO3FVec`] stores the
//! Fourier parts of a band-limited function on SO(3).

use crate::device::Device;
use crate::error::{CoreError, CoreResult};
use crate::fill::FillPattern;
use crate::fpart::SO3FPart;
use crate::part::SO3Part;
use crate::precision::SO3Float;
use scirs2_core::numeric::Complex;
use std::fmt;

/// Multiplicity of each degree, indexed by `l`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tau(pub Vec<usize>);

impl Tau {
    /// Build from per-degree multiplicities
    pub fn new(multiplicities: Vec<usize>) -> Self {
        Self(multiplicities)
    }

    /// Highest degree present, `None` when empty
    pub fn maxl(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// Multiplicity of degree `l` (zero past the end)
    pub fn get(&self, l: usize) -> usize {
        self.0.get(l).copied().unwrap_or(0)
    }

    /// Add `n` channels at degree `l`, growing as needed
    pub fn add(&mut self, l: usize, n: usize) {
        if self.0.len() <= l {
            self.0.resize(l + 1, 0);
        }
        self.0[l] += n;
    }

    /// Iterate over `(l, multiplicity)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

impl fmt::Display for Tau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", n)?;
        }
        write!(f, ")")
    }
}

/// Check batch and device agreement across a slice of `(batch, device)` pairs
fn check_uniform(items: impl Iterator<Item = (usize, Device)>) -> CoreResult<(usize, Device)> {
    let mut first: Option<(usize, Device)> = None;
    for (b, dev) in items {
        match first {
            None => first = Some((b, dev)),
            Some((b0, d0)) => {
                if b != b0 {
                    return Err(CoreError::BatchMismatch {
                        expected: b0,
                        actual: b,
                    });
                }
                if dev != d0 {
                    return Err(CoreError::DeviceMismatch {
                        expected: d0,
                        actual: dev,
                    });
                }
            }
        }
    }
    first.ok_or(CoreError::Empty { what: "collection" })
}

/// Vector of parts, one per degree
#[derive(Clone, Debug, PartialEq)]
pub struct SO3Vec<T> {
    parts: Vec<SO3Part<T>>,
}

impl<T: SO3Float> SO3Vec<T> {
    /// Allocate parts for every degree in `tau`
    pub fn new(b: usize, tau: &Tau, fill: FillPattern, device: Device) -> Self {
        let parts = tau
            .iter()
            .map(|(l, n)| SO3Part::new(b, l, n, fill, device))
            .collect();
        Self { parts }
    }

    /// All-zero vector of type `tau`
    pub fn zero(b: usize, tau: &Tau, device: Device) -> Self {
        Self::new(b, tau, FillPattern::Zero, device)
    }

    /// Gaussian vector of type `tau`
    pub fn gaussian(b: usize, tau: &Tau, device: Device) -> Self {
        Self::new(b, tau, FillPattern::Gaussian, device)
    }

    /// Gaussian vector with per-part seeds derived from `seed`
    pub fn gaussian_seeded(b: usize, tau: &Tau, seed: u64, device: Device) -> Self {
        let parts = tau
            .iter()
            .map(|(l, n)| SO3Part::gaussian_seeded(b, l, n, seed.wrapping_add(l as u64), device))
            .collect();
        Self { parts }
    }

    /// Assemble from parts ordered by degree
    ///
    /// # Errors
    ///
    /// Fails on an empty list, a part in the wrong slot, or mixed batch
    /// sizes and devices.
    pub fn from_parts(parts: Vec<SO3Part<T>>) -> CoreResult<Self> {
        for (slot, p) in parts.iter().enumerate() {
            if p.getl() != slot {
                return Err(CoreError::DegreeSlot {
                    slot,
                    found: p.getl(),
                });
            }
        }
        check_uniform(parts.iter().map(|p| (p.batch(), p.device())))?;
        Ok(Self { parts })
    }

    /// Zero vector with the same type, batch and device
    pub fn zeros_like(&self) -> Self {
        Self {
            parts: self.parts.iter().map(SO3Part::zeros_like).collect(),
        }
    }

    /// Multiplicities of each degree
    pub fn tau(&self) -> Tau {
        Tau(self.parts.iter().map(SO3Part::getn).collect())
    }

    /// Highest degree
    pub fn maxl(&self) -> usize {
        self.parts.len().saturating_sub(1)
    }

    /// Batch size (zero for an empty vector)
    pub fn batch(&self) -> usize {
        self.parts.first().map(SO3Part::batch).unwrap_or(0)
    }

    /// Device of the parts
    pub fn device(&self) -> Device {
        self.parts
            .first()
            .map(SO3Part::device)
            .unwrap_or_default()
    }

    /// Part of degree `l`
    pub fn part(&self, l: usize) -> &SO3Part<T> {
        &self.parts[l]
    }

    /// Mutable part of degree `l`
    pub fn part_mut(&mut self, l: usize) -> &mut SO3Part<T> {
        &mut self.parts[l]
    }

    /// All parts in degree order
    pub fn parts(&self) -> &[SO3Part<T>] {
        &self.parts
    }

    /// Hermitian inner product summed over degrees
    pub fn inner(&self, other: &Self) -> Complex<T> {
        assert_eq!(self.tau(), other.tau(), "inner product requires equal types");
        self.parts
            .iter()
            .zip(other.parts.iter())
            .fold(Complex::new(T::zero(), T::zero()), |acc, (a, b)| acc + a.inner(b))
    }
}

/// Fourier coefficients of a band-limited function, degrees `0..=maxl`
#[derive(Clone, Debug, PartialEq)]
pub struct SO3FVec<T> {
    parts: Vec<SO3FPart<T>>,
}

impl<T: SO3Float> SO3FVec<T> {
    /// Allocate parts for degrees `0..=maxl`
    pub fn new(b: usize, maxl: usize, fill: FillPattern, device: Device) -> Self {
        Self {
            parts: (0..=maxl)
                .map(|l| SO3FPart::new(b, l, fill, device))
                .collect(),
        }
    }

    /// All-zero Fourier vector
    pub fn zero(b: usize, maxl: usize, device: Device) -> Self {
        Self::new(b, maxl, FillPattern::Zero, device)
    }

    /// Gaussian Fourier vector
    pub fn gaussian(b: usize, maxl: usize, device: Device) -> Self {
        Self::new(b, maxl, FillPattern::Gaussian, device)
    }

    /// Gaussian Fourier vector with per-part seeds derived from `seed`
    pub fn gaussian_seeded(b: usize, maxl: usize, seed: u64, device: Device) -> Self {
        Self {
            parts: (0..=maxl)
                .map(|l| SO3FPart::gaussian_seeded(b, l, seed.wrapping_add(l as u64), device))
                .collect(),
        }
    }

    /// Assemble from Fourier parts ordered by degree
    pub fn from_parts(parts: Vec<SO3FPart<T>>) -> CoreResult<Self> {
        for (slot, p) in parts.iter().enumerate() {
            if p.getl() != slot {
                return Err(CoreError::DegreeSlot {
                    slot,
                    found: p.getl(),
                });
            }
        }
        check_uniform(parts.iter().map(|p| (p.batch(), p.device())))?;
        Ok(Self { parts })
    }

    /// Highest degree
    pub fn maxl(&self) -> usize {
        self.parts.len().saturating_sub(1)
    }

    /// Batch size
    pub fn batch(&self) -> usize {
        self.parts.first().map(SO3FPart::batch).unwrap_or(0)
    }

    /// Device of the parts
    pub fn device(&self) -> Device {
        self.parts
            .first()
            .map(SO3FPart::device)
            .unwrap_or_default()
    }

    /// Part of degree `l`
    pub fn part(&self, l: usize) -> &SO3FPart<T> {
        &self.parts[l]
    }

    /// Mutable part of degree `l`
    pub fn part_mut(&mut self, l: usize) -> &mut SO3FPart<T> {
        &mut self.parts[l]
    }

    /// All parts in degree order
    pub fn parts(&self) -> &[SO3FPart<T>] {
        &self.parts
    }
}
