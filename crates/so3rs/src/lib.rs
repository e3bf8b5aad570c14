//! # so3rs - Rotation-Equivariant Tensor Products
//!
//! Clebsch-Gordan products, Fourier-domain products and inverse transforms
//! on the rotation group SO(3), the building blocks of equivariant models.
//!
//! This is the **meta crate** that re-exports all so3rs components.
//!
//! ## Quick Start
//!
//! ```
//! use so3rs::prelude::*;
//!
//! let banks = Banks::new();
//! let tau = Tau::new(vec![2, 2]);
//! let x = SO3Vec::<f64>::gaussian_seeded(4, &tau, 1, Device::Host);
//! let y = SO3Vec::<f64>::gaussian_seeded(4, &tau, 2, Device::Host);
//!
//! // Couple every pair of degrees up to maxl = 2
//! let r = diag_cg_product(&banks, &x, &y, Some(2));
//! assert_eq!(r.tau(), Tau::new(vec![4, 6, 2]));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Parts and Grids ([`core`])
//!
//! Vector parts `(batch, 2l+1, n)`, Fourier parts `(batch, 2l+1, 2l+1)`,
//! multi-degree collections, Euler-angle grids, device tags, fill patterns
//! and logging setup.
//!
//! ```
//! use so3rs::core::{Device, FillPattern, SO3Part};
//!
//! let p = SO3Part::<f32>::new(2, 3, 8, FillPattern::Sequential, Device::Host);
//! assert_eq!(p.shape(), &[2, 7, 8]);
//! ```
//!
//! ### Kernels ([`kernels`])
//!
//! Coefficient banks, product engines with their backward operators, the
//! inverse transform, rotations, and execution backends.
//!
//! ```
//! use so3rs::core::{Device, GridResolution, SO3FVec};
//! use so3rs::kernels::{inverse_fft, Banks};
//!
//! let f = SO3FVec::<f64>::gaussian_seeded(1, 2, 9, Device::Host);
//! let grid = inverse_fft(Banks::global(), &f, GridResolution::for_bandlimit(2));
//! assert_eq!(grid.shape(), &[1, 6, 6, 6]);
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): batch-parallel host loops
//! - `accelerator`: deferred in-order streams for accelerator-tagged parts
//! - `subscriber`: `tracing-subscriber` setup in [`core::logging`]
//! - `serde`: serialization of tags and resolutions
//! - `full`: all of the above

pub use so3rs_core as core;
pub use so3rs_kernels as kernels;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use so3rs::prelude::*;
    //!
    //! let x = SO3Part::<f64>::zero(1, 2, 3, Device::Host);
    //! assert_eq!(x.getl(), 2);
    //! ```

    // Storage
    pub use crate::core::{
        Device, FillPattern, GridResolution, SO3FPart, SO3FVec, SO3Float, SO3Grid, SO3Part,
        SO3Vec, Tau,
    };

    // Banks and backends
    pub use crate::kernels::{Backend, Banks, HostBackend, KernelConfig, KernelError, KernelResult};

    // Part-level engines
    pub use crate::kernels::{
        add_cg_product, add_cg_product_back0, add_cg_product_back1, add_diag_cg_product,
        add_diag_cg_product_back0, add_diag_cg_product_back1, add_fmodsq, add_fproduct,
        add_fproduct_back0, add_fproduct_back1, add_inverse_transform,
    };

    // Multi-degree drivers
    pub use crate::kernels::{
        cg_product, diag_cg_product, fmodsq, fproduct, inverse_fft, triangle_ok,
    };

    // Rotations
    pub use crate::kernels::{rotate_part, rotate_vec, EulerAngles};

    pub use scirs2_core::numeric::Complex;
}
