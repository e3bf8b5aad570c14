//! Property-based tests for the product engines and the inverse transform
//!
//! These tests verify adjointness, parity and linearity for random degrees,
//! batch sizes, multiplicities and operands.

use super::*;
use proptest::prelude::*;
use scirs2_core::numeric::Complex;
use so3rs_core::{Device, GridResolution, SO3FPart, SO3Grid, SO3Part, SO3Vec, Tau};

/// Strategy for an admissible degree triple
fn coupled_triple() -> impl Strategy<Value = (usize, usize, usize)> {
    (0usize..4, 0usize..4).prop_flat_map(|(l1, l2)| (Just(l1), Just(l2), l1.abs_diff(l2)..=l1 + l2))
}

/// Strategy for Euler angles covering the whole group
fn euler_angles() -> impl Strategy<Value = EulerAngles> {
    use std::f64::consts::PI;
    (-PI..PI, 0.0..PI, -PI..PI).prop_map(|(a, b, g)| EulerAngles::new(a, b, g))
}

fn close(a: Complex<f64>, b: Complex<f64>) -> bool {
    (a - b).norm() <= 1e-8 * (1.0 + a.norm())
}

proptest! {
    /// ⟨g, x ⊗ y⟩ = ⟨back1(g, x), y⟩ = ⟨back0(g, y), x⟩
    #[test]
    fn test_diag_product_adjoint(
        (l1, l2, l) in coupled_triple(),
        batch in 1usize..4,
        n in 1usize..4,
        offset in 0usize..3,
        seed in any::<u64>(),
    ) {
        let banks = Banks::new();
        let x = SO3Part::<f64>::gaussian_seeded(batch, l1, n, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(batch, l2, n, seed ^ 1, Device::Host);
        let g = SO3Part::<f64>::gaussian_seeded(batch, l, n + offset, seed ^ 2, Device::Host);

        let mut r = SO3Part::zero(batch, l, n + offset, Device::Host);
        add_diag_cg_product(&banks, &mut r, &x, &y, offset);
        let mut xg = SO3Part::zero(batch, l1, n, Device::Host);
        add_diag_cg_product_back0(&banks, &mut xg, &g, &y, offset);
        let mut yg = SO3Part::zero(batch, l2, n, Device::Host);
        add_diag_cg_product_back1(&banks, &mut yg, &g, &x, offset);

        let lhs = g.inner(&r);
        prop_assert!(close(lhs, xg.inner(&x)));
        prop_assert!(close(lhs, yg.inner(&y)));
    }

    /// Same adjoint identities for the full (all channel pairs) product
    #[test]
    fn test_full_product_adjoint(
        (l1, l2, l) in coupled_triple(),
        n1 in 1usize..3,
        n2 in 1usize..3,
        seed in any::<u64>(),
    ) {
        let banks = Banks::new();
        let x = SO3Part::<f64>::gaussian_seeded(2, l1, n1, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(2, l2, n2, seed ^ 3, Device::Host);
        let g = SO3Part::<f64>::gaussian_seeded(2, l, n1 * n2, seed ^ 4, Device::Host);

        let mut r = SO3Part::zero(2, l, n1 * n2, Device::Host);
        add_cg_product(&banks, &mut r, &x, &y, 0);
        let mut xg = SO3Part::zero(2, l1, n1, Device::Host);
        add_cg_product_back0(&banks, &mut xg, &g, &y, 0);
        let mut yg = SO3Part::zero(2, l2, n2, Device::Host);
        add_cg_product_back1(&banks, &mut yg, &g, &x, 0);

        let lhs = g.inner(&r);
        prop_assert!(close(lhs, xg.inner(&x)));
        prop_assert!(close(lhs, yg.inner(&y)));
    }

    /// Both Fourier-product adjoints, the second one through the flip
    #[test]
    fn test_fproduct_adjoint((l1, l2, l) in coupled_triple(), seed in any::<u64>()) {
        let banks = Banks::new();
        let x = SO3FPart::<f64>::gaussian_seeded(2, l1, seed, Device::Host);
        let y = SO3FPart::<f64>::gaussian_seeded(2, l2, seed ^ 5, Device::Host);
        let g = SO3FPart::<f64>::gaussian_seeded(2, l, seed ^ 6, Device::Host);

        let mut r = SO3FPart::zero(2, l, Device::Host);
        add_fproduct(&banks, &mut r, &x, &y);
        let mut xg = SO3FPart::zero(2, l1, Device::Host);
        add_fproduct_back0(&banks, &mut xg, &g, &y, 0);
        let mut yg = SO3FPart::zero(2, l2, Device::Host);
        add_fproduct_back1(&banks, &mut yg, &g, &x, 0);

        let lhs = g.inner(&r);
        prop_assert!(close(lhs, xg.inner(&x)));
        prop_assert!(close(lhs, yg.inner(&y.flip().conj())));
    }

    /// Odd conjugation flags conjugate the whole gradient
    #[test]
    fn test_fproduct_back_parity(
        (l1, l2, l) in coupled_triple(),
        flag in 0i32..4,
        seed in any::<u64>(),
    ) {
        let banks = Banks::new();
        let x = SO3FPart::<f64>::gaussian_seeded(1, l1, seed, Device::Host);
        let y = SO3FPart::<f64>::gaussian_seeded(1, l2, seed ^ 7, Device::Host);
        let g = SO3FPart::<f64>::gaussian_seeded(1, l, seed ^ 8, Device::Host);

        let mut even = SO3FPart::zero(1, l2, Device::Host);
        add_fproduct_back1(&banks, &mut even, &g, &x, 2 * flag);
        let mut odd = SO3FPart::zero(1, l2, Device::Host);
        add_fproduct_back1(&banks, &mut odd, &g, &x, 2 * flag + 1);
        prop_assert!(even.conj().max_abs_diff(&odd) < 1e-12);

        let mut even0 = SO3FPart::zero(1, l1, Device::Host);
        add_fproduct_back0(&banks, &mut even0, &g, &y, 0);
        let mut odd0 = SO3FPart::zero(1, l1, Device::Host);
        add_fproduct_back0(&banks, &mut odd0, &g, &y, 1);
        prop_assert!(even0.conj().max_abs_diff(&odd0) < 1e-12);
    }

    /// Transform of a sum equals the sum of transforms
    #[test]
    fn test_inverse_transform_linear(l in 0usize..4, n in 1usize..6, seed in any::<u64>()) {
        let banks = Banks::new();
        let res = GridResolution::new(n, n + 1, n);
        let p = SO3FPart::<f64>::gaussian_seeded(2, l, seed, Device::Host);
        let q = SO3FPart::<f64>::gaussian_seeded(2, l, seed ^ 9, Device::Host);
        let mut sum = p.clone();
        sum.add_assign(&q);

        let mut separate = SO3Grid::zero(2, res, Device::Host);
        add_inverse_transform(&banks, &mut separate, &p);
        add_inverse_transform(&banks, &mut separate, &q);
        let mut joint = SO3Grid::zero(2, res, Device::Host);
        add_inverse_transform(&banks, &mut joint, &sum);

        prop_assert!(separate.max_abs_diff(&joint) < 1e-9);
    }

    /// Parallel and sequential host execution agree
    #[test]
    fn test_parallel_host_agrees((l1, l2, l) in coupled_triple(), seed in any::<u64>()) {
        let banks = Banks::new();
        let x = SO3Part::<f64>::gaussian_seeded(5, l1, 2, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(5, l2, 2, seed ^ 10, Device::Host);

        let mut seq = SO3Part::zero(5, l, 2, Device::Host);
        let sequential = HostBackend::with_config(KernelConfig::sequential());
        add_diag_cg_product_with(&sequential, &banks, &mut seq, &x, &y, 0);

        let mut par = SO3Part::zero(5, l, 2, Device::Host);
        let eager = HostBackend::with_config(KernelConfig::new().with_parallel_min_batch(1));
        add_diag_cg_product_with(&eager, &banks, &mut par, &x, &y, 0);

        prop_assert!(seq.max_abs_diff(&par) < 1e-12);
    }

    /// Rotating both operands rotates the diagonal product
    #[test]
    fn test_diag_product_equivariant(
        (l1, l2, l) in coupled_triple(),
        rotation in euler_angles(),
        seed in any::<u64>(),
    ) {
        let banks = Banks::new();
        let x = SO3Part::<f64>::gaussian_seeded(2, l1, 3, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(2, l2, 3, seed ^ 14, Device::Host);

        let mut r = SO3Part::zero(2, l, 3, Device::Host);
        add_diag_cg_product(&banks, &mut r, &x, &y, 0);

        let (xr, yr) = (rotate_part(&x, rotation), rotate_part(&y, rotation));
        let mut rr = SO3Part::zero(2, l, 3, Device::Host);
        add_diag_cg_product(&banks, &mut rr, &xr, &yr, 0);

        prop_assert!(rotate_part(&r, rotation).max_abs_diff(&rr) < 1e-9);
    }

    /// Same for the full product, where channel pairs are mixed
    #[test]
    fn test_full_product_equivariant(
        (l1, l2, l) in coupled_triple(),
        rotation in euler_angles(),
        seed in any::<u64>(),
    ) {
        let banks = Banks::new();
        let x = SO3Part::<f64>::gaussian_seeded(1, l1, 2, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(1, l2, 3, seed ^ 15, Device::Host);

        let mut r = SO3Part::zero(1, l, 6, Device::Host);
        add_cg_product(&banks, &mut r, &x, &y, 0);

        let (xr, yr) = (rotate_part(&x, rotation), rotate_part(&y, rotation));
        let mut rr = SO3Part::zero(1, l, 6, Device::Host);
        add_cg_product(&banks, &mut rr, &xr, &yr, 0);

        prop_assert!(rotate_part(&r, rotation).max_abs_diff(&rr) < 1e-9);
    }

    /// Multi-degree products commute with rotating every part
    #[test]
    fn test_vec_product_equivariant(rotation in euler_angles(), seed in any::<u64>()) {
        let banks = Banks::new();
        let tau = Tau::new(vec![2, 2, 2]);
        let x = SO3Vec::<f64>::gaussian_seeded(2, &tau, seed, Device::Host);
        let y = SO3Vec::<f64>::gaussian_seeded(2, &tau, seed ^ 16, Device::Host);

        let r = rotate_vec(&diag_cg_product(&banks, &x, &y, Some(3)), rotation);
        let (xr, yr) = (rotate_vec(&x, rotation), rotate_vec(&y, rotation));
        let rr = diag_cg_product(&banks, &xr, &yr, Some(3));

        prop_assert_eq!(r.tau(), rr.tau());
        for (a, b) in r.parts().iter().zip(rr.parts()) {
            prop_assert!(a.max_abs_diff(b) < 1e-9);
        }
    }

    /// Rotations preserve the Hermitian inner product
    #[test]
    fn test_rotation_is_unitary(l in 0usize..5, rotation in euler_angles(), seed in any::<u64>()) {
        let x = SO3Part::<f64>::gaussian_seeded(2, l, 2, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(2, l, 2, seed ^ 17, Device::Host);
        let (xr, yr) = (rotate_part(&x, rotation), rotate_part(&y, rotation));
        prop_assert!(close(x.inner(&y), xr.inner(&yr)));
    }

    /// Selection-rule band sizes match the closed-form pair count
    #[test]
    fn test_band_pair_counts((l1, l2, l) in coupled_triple()) {
        let li = l as isize;
        for m in -li..=li {
            let counted = band_pairs(l1, l2, l).filter(|&(m1, m2)| m1 + m2 == m).count();
            prop_assert_eq!(counted, pair_count(l1, l2, m));
        }
    }
}

#[cfg(feature = "accelerator")]
proptest! {
    /// Host and accelerator streams produce identical results
    #[test]
    fn test_host_accelerator_agree((l1, l2, l) in coupled_triple(), seed in any::<u64>()) {
        let banks = Banks::new();
        let device = Device::Accelerator(0);
        let x = SO3Part::<f64>::gaussian_seeded(3, l1, 2, seed, Device::Host);
        let y = SO3Part::<f64>::gaussian_seeded(3, l2, 2, seed ^ 11, Device::Host);
        let fx = SO3FPart::<f64>::gaussian_seeded(3, l1, seed ^ 12, Device::Host);
        let fy = SO3FPart::<f64>::gaussian_seeded(3, l2, seed ^ 13, Device::Host);

        let mut host = SO3Part::zero(3, l, 2, Device::Host);
        add_diag_cg_product(&banks, &mut host, &x, &y, 0);
        let (xa, ya) = (x.to_device(device), y.to_device(device));
        let mut accel = SO3Part::zero(3, l, 2, device);
        add_diag_cg_product(&banks, &mut accel, &xa, &ya, 0);
        prop_assert!(host.max_abs_diff(&accel.to_device(Device::Host)) < 1e-12);

        let mut fhost = SO3FPart::zero(3, l, Device::Host);
        add_fproduct(&banks, &mut fhost, &fx, &fy);
        let (fxa, fya) = (fx.to_device(device), fy.to_device(device));
        let mut faccel = SO3FPart::zero(3, l, device);
        add_fproduct(&banks, &mut faccel, &fxa, &fya);
        prop_assert!(fhost.max_abs_diff(&faccel.to_device(Device::Host)) < 1e-12);
    }
}
