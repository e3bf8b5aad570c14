//! # so3rs-core
//!
//! Parts, devices and initialization patterns for rotation-equivariant
//! tensor computation.
//!
//! This crate provides the storage side of the so3rs stack:
//!
//! - **Vector parts** ([`SO3Part`]) of shape `(batch, 2l+1, n)`
//! - **Fourier parts** ([`SO3FPart`]) of shape `(batch, 2l+1, 2l+1)`
//! - **Multi-degree collections** ([`SO3Vec`], [`SO3FVec`], [`Tau`])
//! - **Euler-angle grids** ([`SO3Grid`], [`GridResolution`])
//! - **Device tags** ([`Device`]) and fill patterns ([`FillPattern`])
//!
//! The numerical kernels that consume these types live in `so3rs-kernels`.
//!
//! ## Quick Start
//!
//! ```
//! use so3rs_core::{Device, FillPattern, SO3Part, SO3FPart};
//!
//! // Degree-2 part, batch of 4, 3 channels
//! let x = SO3Part::<f64>::new(4, 2, 3, FillPattern::Gaussian, Device::Host);
//! assert_eq!(x.shape(), &[4, 5, 3]);
//!
//! // Degree-1 Fourier part
//! let f = SO3FPart::<f32>::zero(4, 1, Device::Host);
//! assert_eq!(f.shape(), &[4, 3, 3]);
//! ```
//!
//! ## Indexing Convention
//!
//! The representation index `m ∈ {-l, ..., l}` is stored at offset `m + l`.
//! Signed accessors (`get`) take `m` directly.
//!
//! ## SciRS2 Integration
//!
//! Storage uses `scirs2_core::ndarray_ext`, complex scalars are
//! `scirs2_core::numeric::Complex`, and random fills use
//! `scirs2_core::random`.
//!
//! ## Features
//!
//! - `serde`: derive serialization for tags and resolutions
//! - `subscriber`: ready-made `tracing-subscriber` setup in [`logging`]

pub mod device;
pub mod error;
pub mod fill;
pub mod fpart;
pub mod grid;
pub mod logging;
pub mod part;
pub mod precision;
pub mod vec;

pub use device::Device;
pub use error::{CoreError, CoreResult};
pub use fill::FillPattern;
pub use fpart::SO3FPart;
pub use grid::{GridResolution, SO3Grid};
pub use part::SO3Part;
pub use precision::{Precision, SO3Float};
pub use vec::{SO3FVec, SO3Vec, Tau};
