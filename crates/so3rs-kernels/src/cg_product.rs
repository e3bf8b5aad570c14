//! Clebsch-Gordan products of vector parts
//!
//! The diagonal product couples channel `n` of `x` with channel `n` of `y`;
//! the full product couples every channel pair `(n1, n2)` and writes it to
//! output channel `offset + n1·N2 + n2`. Both accumulate into the output and
//! come with the two adjoint operators `back0` (gradient in `x`) and `back1`
//! (gradient in `y`).
//!
//! # Examples
//!
//! ```
//! use so3rs_core::{Device, SO3Part};
//! use so3rs_kernels::{add_diag_cg_product, Banks};
//!
//! let banks = Banks::new();
//! let x = SO3Part::<f64>::gaussian_seeded(2, 1, 3, 7, Device::Host);
//! let y = SO3Part::<f64>::gaussian_seeded(2, 1, 3, 8, Device::Host);
//! let mut r = SO3Part::<f64>::zero(2, 2, 3, Device::Host);
//!
//! add_diag_cg_product(&banks, &mut r, &x, &y, 0);
//! assert!(r.inner(&r).re > 0.0);
//! ```

use so3rs_core::{SO3Float, SO3Part};

use crate::backend::Backend;
use crate::banks::Banks;
use crate::dispatch::{check_operands, entry_points};
use crate::error::{KernelError, KernelResult};
use crate::host;

fn check_channels(
    operation: &'static str,
    out: &SO3Part<impl SO3Float>,
    required: usize,
) -> KernelResult<()> {
    if out.getn() < required {
        return Err(KernelError::dimension_mismatch(
            operation,
            vec![out.batch(), out.shape()[1], required],
            out.shape().to_vec(),
            "output part has too few channels for offset + multiplicity",
        ));
    }
    Ok(())
}

fn check_equal_multiplicity(operation: &'static str, a: usize, b: usize) -> KernelResult<()> {
    if a != b {
        return Err(KernelError::multiplicity_mismatch(operation, a, b));
    }
    Ok(())
}

/// Diagonal product on an explicit backend
pub fn try_add_diag_cg_product_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    r: &'env mut SO3Part<T>,
    x: &'env SO3Part<T>,
    y: &'env SO3Part<T>,
    offset: usize,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_diag_cg_product";
    check_operands(
        OP,
        backend,
        &[r.device(), x.device(), y.device()],
        &[r.batch(), x.batch(), y.batch()],
    )?;
    check_equal_multiplicity(OP, x.getn(), y.getn())?;
    check_channels(OP, r, offset + x.getn())?;
    let cg = banks
        .cg
        .try_get::<T>(x.getl(), y.getl(), r.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(r.batch());
    tracing::trace!(
        l1 = x.getl(),
        l2 = y.getl(),
        l = r.getl(),
        batch = r.batch(),
        n = x.getn(),
        offset,
        "add_diag_cg_product"
    );
    let (x, y) = (x.view(), y.view());
    let r = r.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::diag_cg_product(&cg, r, x, y, offset, parallel)),
    )
}

/// Gradient of the diagonal product in `x` on an explicit backend
pub fn try_add_diag_cg_product_back0_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    xg: &'env mut SO3Part<T>,
    g: &'env SO3Part<T>,
    y: &'env SO3Part<T>,
    offset: usize,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_diag_cg_product_back0";
    check_operands(
        OP,
        backend,
        &[xg.device(), g.device(), y.device()],
        &[xg.batch(), g.batch(), y.batch()],
    )?;
    check_equal_multiplicity(OP, xg.getn(), y.getn())?;
    check_channels(OP, g, offset + y.getn())?;
    let cg = banks
        .cg
        .try_get::<T>(xg.getl(), y.getl(), g.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(xg.batch());
    tracing::trace!(l1 = xg.getl(), l2 = y.getl(), l = g.getl(), batch = xg.batch(), "{}", OP);
    let (g, y) = (g.view(), y.view());
    let xg = xg.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::diag_cg_product_back0(&cg, xg, g, y, offset, parallel)),
    )
}

/// Gradient of the diagonal product in `y` on an explicit backend
pub fn try_add_diag_cg_product_back1_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    yg: &'env mut SO3Part<T>,
    g: &'env SO3Part<T>,
    x: &'env SO3Part<T>,
    offset: usize,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_diag_cg_product_back1";
    check_operands(
        OP,
        backend,
        &[yg.device(), g.device(), x.device()],
        &[yg.batch(), g.batch(), x.batch()],
    )?;
    check_equal_multiplicity(OP, x.getn(), yg.getn())?;
    check_channels(OP, g, offset + x.getn())?;
    let cg = banks
        .cg
        .try_get::<T>(x.getl(), yg.getl(), g.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(yg.batch());
    tracing::trace!(l1 = x.getl(), l2 = yg.getl(), l = g.getl(), batch = yg.batch(), "{}", OP);
    let (g, x) = (g.view(), x.view());
    let yg = yg.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::diag_cg_product_back1(&cg, yg, g, x, offset, parallel)),
    )
}

/// Full product on an explicit backend
pub fn try_add_cg_product_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    r: &'env mut SO3Part<T>,
    x: &'env SO3Part<T>,
    y: &'env SO3Part<T>,
    offset: usize,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_cg_product";
    check_operands(
        OP,
        backend,
        &[r.device(), x.device(), y.device()],
        &[r.batch(), x.batch(), y.batch()],
    )?;
    check_channels(OP, r, offset + x.getn() * y.getn())?;
    let cg = banks
        .cg
        .try_get::<T>(x.getl(), y.getl(), r.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(r.batch());
    tracing::trace!(
        l1 = x.getl(),
        l2 = y.getl(),
        l = r.getl(),
        batch = r.batch(),
        n1 = x.getn(),
        n2 = y.getn(),
        offset,
        "add_cg_product"
    );
    let (x, y) = (x.view(), y.view());
    let r = r.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::cg_product(&cg, r, x, y, offset, parallel)),
    )
}

/// Gradient of the full product in `x` on an explicit backend
pub fn try_add_cg_product_back0_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    xg: &'env mut SO3Part<T>,
    g: &'env SO3Part<T>,
    y: &'env SO3Part<T>,
    offset: usize,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_cg_product_back0";
    check_operands(
        OP,
        backend,
        &[xg.device(), g.device(), y.device()],
        &[xg.batch(), g.batch(), y.batch()],
    )?;
    check_channels(OP, g, offset + xg.getn() * y.getn())?;
    let cg = banks
        .cg
        .try_get::<T>(xg.getl(), y.getl(), g.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(xg.batch());
    tracing::trace!(l1 = xg.getl(), l2 = y.getl(), l = g.getl(), batch = xg.batch(), "{}", OP);
    let (g, y) = (g.view(), y.view());
    let xg = xg.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::cg_product_back0(&cg, xg, g, y, offset, parallel)),
    )
}

/// Gradient of the full product in `y` on an explicit backend
pub fn try_add_cg_product_back1_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    yg: &'env mut SO3Part<T>,
    g: &'env SO3Part<T>,
    x: &'env SO3Part<T>,
    offset: usize,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_cg_product_back1";
    check_operands(
        OP,
        backend,
        &[yg.device(), g.device(), x.device()],
        &[yg.batch(), g.batch(), x.batch()],
    )?;
    check_channels(OP, g, offset + x.getn() * yg.getn())?;
    let cg = banks
        .cg
        .try_get::<T>(x.getl(), yg.getl(), g.getl())
        .map_err(|err| relabel(err, OP))?;

    let parallel = backend.config().parallel_for(yg.batch());
    tracing::trace!(l1 = x.getl(), l2 = yg.getl(), l = g.getl(), batch = yg.batch(), "{}", OP);
    let (g, x) = (g.view(), x.view());
    let yg = yg.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::cg_product_back1(&cg, yg, g, x, offset, parallel)),
    )
}

/// Attribute a bank error to the engine operation that triggered it
pub(crate) fn relabel(err: KernelError, operation: &str) -> KernelError {
    match err {
        KernelError::TriangleRule { l1, l2, l, .. } => {
            KernelError::triangle_rule(operation, l1, l2, l)
        }
        other => other,
    }
}

entry_points! {
    /// Accumulate the diagonal Clebsch-Gordan product of `x` and `y` into `r`
    ///
    /// For every batch index and channel `n < N`:
    /// `r(m1+m2, offset+n) += C(m1,m2) · x(m1,n) · y(m2,n)`, with `m2`
    /// clipped to [`band`](crate::band). Aborts on any violated precondition
    /// (triangle rule, device, batch, multiplicity, channel count).
    add_diag_cg_product, try_add_diag_cg_product, add_diag_cg_product_with
        => try_add_diag_cg_product_with
    (r: &'env mut SO3Part<T>, x: &'env SO3Part<T>, y: &'env SO3Part<T>, offset: usize)
}

entry_points! {
    /// Accumulate the gradient of [`add_diag_cg_product`] with respect to `x`
    ///
    /// `xg(m1,n) += C(m1,m2) · g(m1+m2, offset+n) · conj(y(m2,n))`
    add_diag_cg_product_back0, try_add_diag_cg_product_back0, add_diag_cg_product_back0_with
        => try_add_diag_cg_product_back0_with
    (xg: &'env mut SO3Part<T>, g: &'env SO3Part<T>, y: &'env SO3Part<T>, offset: usize)
}

entry_points! {
    /// Accumulate the gradient of [`add_diag_cg_product`] with respect to `y`
    ///
    /// `yg(m2,n) += C(m1,m2) · g(m1+m2, offset+n) · conj(x(m1,n))`
    add_diag_cg_product_back1, try_add_diag_cg_product_back1, add_diag_cg_product_back1_with
        => try_add_diag_cg_product_back1_with
    (yg: &'env mut SO3Part<T>, g: &'env SO3Part<T>, x: &'env SO3Part<T>, offset: usize)
}

entry_points! {
    /// Accumulate the full Clebsch-Gordan product of `x` and `y` into `r`
    ///
    /// Channel pair `(n1, n2)` lands in output channel `offset + n1·N2 + n2`.
    add_cg_product, try_add_cg_product, add_cg_product_with => try_add_cg_product_with
    (r: &'env mut SO3Part<T>, x: &'env SO3Part<T>, y: &'env SO3Part<T>, offset: usize)
}

entry_points! {
    /// Accumulate the gradient of [`add_cg_product`] with respect to `x`
    add_cg_product_back0, try_add_cg_product_back0, add_cg_product_back0_with
        => try_add_cg_product_back0_with
    (xg: &'env mut SO3Part<T>, g: &'env SO3Part<T>, y: &'env SO3Part<T>, offset: usize)
}

entry_points! {
    /// Accumulate the gradient of [`add_cg_product`] with respect to `y`
    add_cg_product_back1, try_add_cg_product_back1, add_cg_product_back1_with
        => try_add_cg_product_back1_with
    (yg: &'env mut SO3Part<T>, g: &'env SO3Part<T>, x: &'env SO3Part<T>, offset: usize)
}
