//! Inverse Fourier transform on SO(3)
//!
//! Degree-`l` coefficients `p` are mapped onto an Euler-angle grid by three
//! chained contractions against the polar matrix and the two phase matrices
//! from [`FourierMatrixBank`](crate::FourierMatrixBank). The transform only
//! accumulates, so a full band-limited function is reconstructed by calling
//! it once per degree on the same grid.

use so3rs_core::{SO3FPart, SO3Float, SO3Grid};

use crate::backend::Backend;
use crate::banks::Banks;
use crate::dispatch::{check_operands, entry_points};
use crate::error::KernelResult;
use crate::host;

/// Inverse transform on an explicit backend
pub fn try_add_inverse_transform_with<'env, T, B>(
    backend: &B,
    banks: &Banks,
    f: &'env mut SO3Grid<T>,
    p: &'env SO3FPart<T>,
) -> KernelResult<()>
where
    T: SO3Float,
    B: Backend<'env> + ?Sized,
{
    const OP: &str = "add_inverse_transform";
    check_operands(
        OP,
        backend,
        &[f.device(), p.device()],
        &[f.batch(), p.batch()],
    )?;
    let resolution = f.resolution();
    let matrices = banks
        .fourier
        .angular_matrices::<T>(p.getl(), resolution, f.device());

    let parallel = backend.config().parallel_for(f.batch());
    tracing::trace!(
        l = p.getl(),
        batch = f.batch(),
        n_phi = resolution.n_phi,
        n_theta = resolution.n_theta,
        n_psi = resolution.n_psi,
        "add_inverse_transform"
    );
    let p = p.view();
    let f = f.view_mut();
    backend.launch(
        OP,
        Box::new(move || host::inverse_transform(&matrices, f, p, parallel)),
    )
}

entry_points! {
    /// Accumulate the degree-`l` part of the inverse transform into `f`
    ///
    /// `f(b, a, t, c) += Σ p(b, m, m') e^{-imαₐ} d^l_{mm'}(βₜ) e^{-im'γ_c}`
    add_inverse_transform, try_add_inverse_transform, add_inverse_transform_with
        => try_add_inverse_transform_with
    (f: &'env mut SO3Grid<T>, p: &'env SO3FPart<T>)
}
