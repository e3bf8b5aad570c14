//! Products of Fourier-domain (matrix) parts
//!
//! A Fourier part holds the degree-`l` coefficients of a function on SO(3)
//! as a `(2l+1) × (2l+1)` matrix per batch entry. The product of two such
//! functions couples both matrix axes through the same Clebsch-Gordan table,
//! with the second factor entering through its flip:
//!
//! `r(M1+M2, m1+m2) += c · C(M1,M2) · C(m1,m2) · x(M1,m1) · conj(y(-M2,-m2))`
//!
//! where `c = (2l1+1)(2l2+1)/(2l+1)`.

use so3rs_core::{SO3FPart, SO3Float};

use crate::backend::Backend;
use crate::banks::Banks;
use crate::cg_product::relabel;
use crate::dispatch::{check_operands, entry_points};
use crate::error::KernelResult;
use crate::host;

/// Fourier product on an explicit backend
pub fn try_add_fproduct_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    r: &'env mut SO3FPart<T>,
    x: &'env SO3FPart<T>,
    y: &'env SO3FPart<T>,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    launch_fproduct(backend, banks, "add_fproduct", r, x, y)
}

fn launch_fproduct<'env, T, B>(
    backend: &B,
    banks: &Banks,
    op: &'static str,
    r: &'env mut SO3FPart<T>,
    x: &'env SO3FPart<T>,
    y: &'env SO3FPart<T>,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    check_operands(
        op,
        backend,
        &[r.device(), x.device(), y.device()],
        &[r.batch(), x.batch(), y.batch()],
    )?;
    let cg = banks
        .cg
        .try_get::<T>(x.getl(), y.getl(), r.getl())
        .map_err(|err| relabel(err, op))?;

    let parallel = backend.config().parallel_for(r.batch());
    tracing::trace!(l1 = x.getl(), l2 = y.getl(), l = r.getl(), batch = r.batch(), "{}", op);
    let (x, y) = (x.view(), y.view());
    let r = r.view_mut();
    backend.launch(op, Box::new(move || host::fproduct(&cg, r, x, y, parallel)))
}

/// Gradient of the Fourier product in `x` on an explicit backend
pub fn try_add_fproduct_back0_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    xg: &'env mut SO3FPart<T>,
    g: &'env SO3FPart<T>,
    y: &'env SO3FPart<T>,
    conj: i32,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_fproduct_back0";
    check_operands(
        OP,
        backend,
        &[xg.device(), g.device(), y.device()],
        &[xg.batch(), g.batch(), y.batch()],
    )?;
    let cg = banks
        .cg
        .try_get::<T>(xg.getl(), y.getl(), g.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(xg.batch());
    tracing::trace!(l1 = xg.getl(), l2 = y.getl(), l = g.getl(), conj, "{}", OP);
    let (g, y) = (g.view(), y.view());
    let xg = xg.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::fproduct_back0(&cg, xg, g, y, conj, parallel)),
    )
}

/// Gradient of the Fourier product in `y` on an explicit backend
pub fn try_add_fproduct_back1_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    yg: &'env mut SO3FPart<T>,
    g: &'env SO3FPart<T>,
    x: &'env SO3FPart<T>,
    conj: i32,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_fproduct_back1";
    check_operands(
        OP,
        backend,
        &[yg.device(), g.device(), x.device()],
        &[yg.batch(), g.batch(), x.batch()],
    )?;
    let cg = banks
        .cg
        .try_get::<T>(x.getl(), yg.getl(), g.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(yg.batch());
    tracing::trace!(l1 = x.getl(), l2 = yg.getl(), l = g.getl(), conj, "{}", OP);
    let (g, x) = (g.view(), x.view());
    let yg = yg.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::fproduct_back1(&cg, yg, g, x, conj, parallel)),
    )
}

/// Fourier modulus squared on an explicit backend
pub fn try_add_fmodsq_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    r: &'env mut SO3FPart<T>,
    x: &'env SO3FPart<T>,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    launch_fproduct(backend, banks, "add_fmodsq", r, x, x)
}

entry_points! {
    /// Accumulate the Fourier-domain product of `x` and `y` into `r`
    ///
    /// Both matrix axes follow the clipped band of the vector product;
    /// `y` is read through its flip and conjugated.
    add_fproduct, try_add_fproduct, add_fproduct_with => try_add_fproduct_with
    (r: &'env mut SO3FPart<T>, x: &'env SO3FPart<T>, y: &'env SO3FPart<T>)
}

entry_points! {
    /// Accumulate the gradient of [`add_fproduct`] with respect to `x`
    ///
    /// `xg(M1,m1) += c · C(M1,M2) · C(m1,m2) · g(M1+M2, m1+m2) · y(-M2,-m2)`.
    /// When `conj` is odd the whole term is conjugated before accumulation.
    add_fproduct_back0, try_add_fproduct_back0, add_fproduct_back0_with
        => try_add_fproduct_back0_with
    (xg: &'env mut SO3FPart<T>, g: &'env SO3FPart<T>, y: &'env SO3FPart<T>, conj: i32)
}

entry_points! {
    /// Accumulate the gradient of [`add_fproduct`] with respect to `y`
    ///
    /// `yg(M2,m2) += c · C(M1,M2) · C(m1,m2) · g(M1+M2, m1+m2) · conj(x(M1,m1))`.
    /// When `conj` is odd the whole term is conjugated before accumulation,
    /// so even and odd results are exact complex conjugates of each other.
    add_fproduct_back1, try_add_fproduct_back1, add_fproduct_back1_with
        => try_add_fproduct_back1_with
    (yg: &'env mut SO3FPart<T>, g: &'env SO3FPart<T>, x: &'env SO3FPart<T>, conj: i32)
}

entry_points! {
    /// Accumulate `add_fproduct(r, x, x)`
    add_fmodsq, try_add_fmodsq, add_fmodsq_with => try_add_fmodsq_with
    (r: &'env mut SO3FPart<T>, x: &'env SO3FPart<T>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use approx::assert_abs_diff_eq;
    use so3rs_core::Device;

    #[test]
    fn test_back1_parity_is_conjugation() {
        let banks = Banks::new();
        let g = SO3FPart::<f64>::gaussian_seeded(2, 2, 1, Device::Host);
        let x = SO3FPart::<f64>::gaussian_seeded(2, 1, 2, Device::Host);
        let mut even = SO3FPart::zero(2, 1, Device::Host);
        let mut odd = SO3FPart::zero(2, 1, Device::Host);
        add_fproduct_back1(&banks, &mut even, &g, &x, 0);
        add_fproduct_back1(&banks, &mut odd, &g, &x, 1);
        assert!(even.conj().max_abs_diff(&odd) < 1e-12);
        assert!(even.max_abs_diff(&odd) > 1e-6);
    }

    #[test]
    fn test_back0_adjoint() {
        let banks = Banks::new();
        let x = SO3FPart::<f64>::gaussian_seeded(1, 1, 3, Device::Host);
        let y = SO3FPart::<f64>::gaussian_seeded(1, 2, 4, Device::Host);
        let g = SO3FPart::<f64>::gaussian_seeded(1, 2, 5, Device::Host);

        let mut r = SO3FPart::zero(1, 2, Device::Host);
        add_fproduct(&banks, &mut r, &x, &y);
        let mut xg = SO3FPart::zero(1, 1, Device::Host);
        add_fproduct_back0(&banks, &mut xg, &g, &y, 0);

        let lhs = g.inner(&r);
        let rhs = xg.inner(&x);
        assert_abs_diff_eq!(lhs.re, rhs.re, epsilon = 1e-9);
        assert_abs_diff_eq!(lhs.im, rhs.im, epsilon = 1e-9);
    }

    #[test]
    fn test_back1_adjoint_through_flip() {
        let banks = Banks::new();
        let x = SO3FPart::<f64>::gaussian_seeded(2, 2, 6, Device::Host);
        let y = SO3FPart::<f64>::gaussian_seeded(2, 1, 7, Device::Host);
        let g = SO3FPart::<f64>::gaussian_seeded(2, 3, 8, Device::Host);

        let mut r = SO3FPart::zero(2, 3, Device::Host);
        add_fproduct(&banks, &mut r, &x, &y);
        let mut yg = SO3FPart::zero(2, 1, Device::Host);
        add_fproduct_back1(&banks, &mut yg, &g, &x, 0);

        let lhs = g.inner(&r);
        let rhs = yg.inner(&y.flip().conj());
        assert_abs_diff_eq!(lhs.re, rhs.re, epsilon = 1e-9);
        assert_abs_diff_eq!(lhs.im, rhs.im, epsilon = 1e-9);
    }

    #[test]
    fn test_fmodsq_matches_self_product() {
        let banks = Banks::new();
        let x = SO3FPart::<f64>::gaussian_seeded(2, 1, 9, Device::Host);
        let mut a = SO3FPart::zero(2, 2, Device::Host);
        let mut b = SO3FPart::zero(2, 2, Device::Host);
        add_fmodsq(&banks, &mut a, &x);
        add_fproduct(&banks, &mut b, &x, &x);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degree_mismatch_is_triangle_error() {
        let banks = Banks::new();
        let x = SO3FPart::<f32>::zero(1, 0, Device::Host);
        let mut r = SO3FPart::zero(1, 1, Device::Host);
        assert_eq!(
            try_add_fmodsq(&banks, &mut r, &x),
            Err(KernelError::triangle_rule("add_fmodsq", 0, 0, 1))
        );
    }
}
