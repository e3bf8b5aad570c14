//! Rotation of vector parts
//!
//! A rotation with Euler angles `(α, β, γ)` acts on a degree-`l` part by
//! left multiplication with the Wigner D-matrix
//! [`wigner_big_d`](crate::wigner::wigner_big_d). The product engines are
//! equivariant under this action: rotating both operands of
//! [`add_diag_cg_product`](crate::add_diag_cg_product) rotates the result
//! by the output degree's D-matrix.
//!
//! # Examples
//!
//! ```
//! use so3rs_core::{Device, SO3Part};
//! use so3rs_kernels::{rotate_part, EulerAngles};
//!
//! let x = SO3Part::<f64>::gaussian_seeded(2, 1, 3, 5, Device::Host);
//! let r = rotate_part(&x, EulerAngles::new(0.3, 1.2, -0.4));
//! assert!((r.inner(&r) - x.inner(&x)).norm() < 1e-10);
//! ```

use so3rs_core::{SO3Float, SO3Part, SO3Vec};

use crate::config::KernelConfig;
use crate::host;
use crate::wigner::wigner_big_d;

/// ZYZ Euler angles of a rotation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    /// First rotation about z
    pub alpha: f64,
    /// Rotation about y
    pub beta: f64,
    /// Second rotation about z
    pub gamma: f64,
}

impl EulerAngles {
    /// Rotation from its three angles
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// The identity rotation
    pub fn identity() -> Self {
        Self::default()
    }
}

/// Rotated copy of `x`: `x'(m', n) = Σ_m D^l_{m'm} x(m, n)`
///
/// The result keeps the device tag of `x`.
pub fn rotate_part<T: SO3Float>(x: &SO3Part<T>, rotation: EulerAngles) -> SO3Part<T> {
    let EulerAngles { alpha, beta, gamma } = rotation;
    let d = wigner_big_d::<T>(x.getl(), alpha, beta, gamma);
    let parallel = KernelConfig::default().parallel_for(x.batch());
    tracing::trace!(l = x.getl(), batch = x.batch(), n = x.getn(), "rotate_part");

    let mut out = x.zeros_like();
    host::apply_rotation(d.view(), out.view_mut(), x.view(), parallel);
    out
}

/// Rotated copy of every part of `x`
pub fn rotate_vec<T: SO3Float>(x: &SO3Vec<T>, rotation: EulerAngles) -> SO3Vec<T> {
    let mut out = x.zeros_like();
    for (l, part) in x.parts().iter().enumerate() {
        *out.part_mut(l) = rotate_part(part, rotation);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use so3rs_core::{Device, Tau};

    #[test]
    fn test_identity_rotation() {
        let x = SO3Part::<f64>::gaussian_seeded(3, 2, 4, 1, Device::Host);
        let r = rotate_part(&x, EulerAngles::identity());
        assert!(r.max_abs_diff(&x) < 1e-14);
    }

    #[test]
    fn test_degree_zero_is_invariant() {
        let x = SO3Part::<f32>::gaussian_seeded(2, 0, 3, 2, Device::Host);
        let r = rotate_part(&x, EulerAngles::new(1.0, 2.0, 3.0));
        assert!(r.max_abs_diff(&x) < 1e-6);
    }

    #[test]
    fn test_z_rotation_is_a_phase() {
        let x = SO3Part::<f64>::sequential(1, 1, 1, Device::Host);
        let alpha = 0.7;
        let r = rotate_part(&x, EulerAngles::new(alpha, 0.0, 0.0));
        for m in -1isize..=1 {
            let phase = scirs2_core::numeric::Complex::new(0.0, -(m as f64) * alpha).exp();
            assert!((r.get(0, m, 0) - x.get(0, m, 0) * phase).norm() < 1e-12);
        }
    }

    #[test]
    fn test_inverse_rotation_restores() {
        let x = SO3Part::<f64>::gaussian_seeded(2, 3, 2, 9, Device::Host);
        let (a, b, g) = (0.5, 1.1, -0.8);
        let forward = rotate_part(&x, EulerAngles::new(a, b, g));
        let back = rotate_part(&forward, EulerAngles::new(-g, -b, -a));
        assert!(back.max_abs_diff(&x) < 1e-10);
    }

    #[test]
    fn test_rotate_vec_keeps_type_and_device() {
        let tau = Tau::new(vec![1, 2, 1]);
        let x = SO3Vec::<f64>::gaussian_seeded(2, &tau, 4, Device::Accelerator(0));
        let r = rotate_vec(&x, EulerAngles::new(0.1, 0.2, 0.3));
        assert_eq!(r.tau(), tau);
        assert_eq!(r.device(), Device::Accelerator(0));
    }
}
