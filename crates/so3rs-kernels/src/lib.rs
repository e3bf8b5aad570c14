//! # so3rs-kernels
//!
//! Rotation-equivariant tensor kernels on SO(3).
//!
//! ## Overview
//!
//! This crate provides the numerical engine consumed by equivariant models:
//!
//! - **Coefficient banks** - memoized Clebsch-Gordan tables ([`CGBank`]) and
//!   angular transform matrices ([`FourierMatrixBank`]), keyed by degree,
//!   resolution, device and precision
//! - **Vector products** - diagonal and full Clebsch-Gordan products of
//!   [`SO3Part`](so3rs_core::SO3Part)s with both backward operators
//! - **Fourier products** - products of matrix-valued
//!   [`SO3FPart`](so3rs_core::SO3FPart)s with parity-selected adjoints
//! - **Inverse transform** - reconstruction of a function on an Euler-angle
//!   grid from its Fourier parts
//! - **Multi-degree drivers** - the same operations over
//!   [`SO3Vec`](so3rs_core::SO3Vec) / [`SO3FVec`](so3rs_core::SO3FVec)
//! - **Rotations** - Wigner D-matrix action on parts and vectors, under
//!   which every product is equivariant
//!
//! ## Quick Start
//!
//! ```rust
//! use so3rs_core::{Device, SO3Part};
//! use so3rs_kernels::{add_diag_cg_product, add_diag_cg_product_back1, Banks};
//!
//! let banks = Banks::new();
//! let x = SO3Part::<f64>::gaussian_seeded(4, 1, 2, 1, Device::Host);
//! let y = SO3Part::<f64>::gaussian_seeded(4, 2, 2, 2, Device::Host);
//!
//! // Couple degrees 1 and 2 into degree 3
//! let mut r = SO3Part::zero(4, 3, 2, Device::Host);
//! add_diag_cg_product(&banks, &mut r, &x, &y, 0);
//!
//! // Gradient with respect to y for an upstream gradient on r
//! let g = SO3Part::<f64>::gaussian_seeded(4, 3, 2, 3, Device::Host);
//! let mut yg = SO3Part::zero(4, 2, 2, Device::Host);
//! add_diag_cg_product_back1(&banks, &mut yg, &g, &x, 0);
//!
//! let lhs = g.inner(&r);
//! let rhs = yg.inner(&y);
//! assert!((lhs - rhs).norm() < 1e-9);
//! ```
//!
//! ## Entry Points
//!
//! Every accumulating operation `op` comes in four forms:
//!
//! | Form | Backend | Failure |
//! |------|---------|---------|
//! | `op(banks, ..)` | chosen from the output's device | panics |
//! | `try_op(banks, ..)` | chosen from the output's device | [`KernelError`] |
//! | `op_with(backend, banks, ..)` | explicit [`Backend`] | panics |
//! | `try_op_with(backend, banks, ..)` | explicit [`Backend`] | [`KernelError`] |
//!
//! Precondition violations (triangle rule, device, batch, multiplicity,
//! channel count) are caller bugs, so the plain forms abort.
//!
//! ## Features
//!
//! - `parallel` (default) - batch-parallel host loops via `scirs2_core::parallel_ops`
//! - `accelerator` - deferred in-order execution [`Stream`]s for
//!   accelerator-tagged parts
//! - `serde` - serialization of core tags
//!
//! ## SciRS2 Integration
//!
//! All array storage and complex arithmetic go through `scirs2-core`
//! (`ndarray_ext`, `numeric`, `parallel_ops`).

pub mod backend;
pub mod banks;
pub mod cg_bank;
pub mod cg_product;
pub mod config;
pub mod error;
pub mod fproduct;
pub mod ifft;
pub mod rotation;
pub mod selection;
pub mod vec_ops;
pub mod wigner;

#[cfg(feature = "accelerator")]
pub mod accelerator;

mod cache;
mod dispatch;
mod host;
mod utils;

#[cfg(test)]
mod property_tests;

// Re-exports
#[cfg(feature = "accelerator")]
pub use accelerator::Stream;
pub use backend::{Backend, HostBackend, Job};
pub use banks::Banks;
pub use cg_bank::{CGBank, CGCoefficients};
pub use cg_product::*;
pub use config::KernelConfig;
pub use error::{fatal, KernelError, KernelResult};
pub use fproduct::*;
pub use ifft::*;
pub use rotation::{rotate_part, rotate_vec, EulerAngles};
pub use selection::{band, band_pairs, coupled_degrees, pair_count, triangle_ok};
pub use vec_ops::*;
pub use wigner::{
    wigner_big_d, AngularMatrices, DeviceArray, FourierMatrixBank, PhaseMatrix, WignerMatrix,
};
