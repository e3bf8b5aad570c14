//! Error types for part construction and collection assembly
//!
//! Kernel preconditions (triangle rule, device agreement, batch agreement)
//! live in `so3rs-kernels`; this module only covers the failures that can
//! happen while building parts from caller-supplied arrays.

use crate::device::Device;
use thiserror::Error;

/// Errors raised while constructing parts and part collections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A representation axis has even extent, so no degree l satisfies 2l+1 = extent
    #[error("axis {axis} has extent {extent}, expected an odd extent 2l+1")]
    EvenRepresentationAxis { axis: usize, extent: usize },

    /// A Fourier part is not square in its two representation axes
    #[error("Fourier part must be square in axes 1 and 2, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// A part in a collection has the wrong degree for its slot
    #[error("part in slot {slot} has degree {found}, expected {slot}")]
    DegreeSlot { slot: usize, found: usize },

    /// Parts in a collection disagree on batch size
    #[error("batch size mismatch: expected {expected}, got {actual}")]
    BatchMismatch { expected: usize, actual: usize },

    /// Parts in a collection live on different devices
    #[error("device mismatch: expected {expected}, got {actual}")]
    DeviceMismatch { expected: Device, actual: Device },

    /// A collection was assembled from zero parts
    #[error("{what} must contain at least one part")]
    Empty { what: &'static str },

    /// Flat data does not match the requested shape
    #[error("shape {shape:?} requires {expected} elements, but got {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
}

/// Result type for part construction
pub type CoreResult<T> = Result<T, CoreError>;
