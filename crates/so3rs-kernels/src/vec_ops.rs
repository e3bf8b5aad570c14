//! Products and transforms of multi-degree collections
//!
//! A product of two [`SO3Vec`]s couples every degree pair `(l1, l2)` into
//! every admissible `l <= maxl`. Output channels for degree `l` are laid out
//! block by block in loop order (`l1` ascending, then `l2`, then `l`), and
//! the backward drivers replay the same [`Coupling`] plan so gradient
//! channels line up with the forward output.

use so3rs_core::{GridResolution, SO3FVec, SO3Float, SO3Grid, SO3Vec, Tau};

use crate::banks::Banks;
use crate::cg_product::{
    try_add_cg_product, try_add_cg_product_back0, try_add_cg_product_back1,
    try_add_diag_cg_product, try_add_diag_cg_product_back0, try_add_diag_cg_product_back1,
};
use crate::error::{fatal, KernelError, KernelResult};
use crate::fproduct::{
    try_add_fmodsq, try_add_fproduct, try_add_fproduct_back0, try_add_fproduct_back1,
};
use crate::ifft::try_add_inverse_transform;
use crate::selection::coupled_degrees;

/// One `(l1, l2) -> l` block of a multi-degree product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coupling {
    /// Degree taken from the first operand
    pub l1: usize,
    /// Degree taken from the second operand
    pub l2: usize,
    /// Output degree
    pub l: usize,
    /// First output channel of this block
    pub offset: usize,
}

fn plan(
    tau1: &Tau,
    tau2: &Tau,
    maxl: usize,
    mut width: impl FnMut(usize, usize) -> KernelResult<usize>,
) -> KernelResult<(Tau, Vec<Coupling>)> {
    let mut tau = Tau::new(vec![0; maxl + 1]);
    let mut couplings = Vec::new();
    for (l1, n1) in tau1.iter() {
        for (l2, n2) in tau2.iter() {
            if n1 == 0 || n2 == 0 {
                continue;
            }
            let channels = width(n1, n2)?;
            for l in coupled_degrees(l1, l2, maxl) {
                couplings.push(Coupling {
                    l1,
                    l2,
                    l,
                    offset: tau.get(l),
                });
                tau.add(l, channels);
            }
        }
    }
    Ok((tau, couplings))
}

/// Output type and block layout of the diagonal product
///
/// Every pair of non-empty degrees must carry equal multiplicities.
pub fn diag_cg_product_plan(
    tau1: &Tau,
    tau2: &Tau,
    maxl: usize,
) -> KernelResult<(Tau, Vec<Coupling>)> {
    plan(tau1, tau2, maxl, |n1, n2| {
        if n1 == n2 {
            Ok(n1)
        } else {
            Err(KernelError::multiplicity_mismatch("diag_cg_product", n1, n2))
        }
    })
}

/// Output type and block layout of the full product
pub fn cg_product_plan(tau1: &Tau, tau2: &Tau, maxl: usize) -> (Tau, Vec<Coupling>) {
    match plan(tau1, tau2, maxl, |n1, n2| Ok(n1 * n2)) {
        Ok(result) => result,
        Err(_) => unreachable!("full product widths are infallible"),
    }
}

/// Output type of the diagonal product
pub fn diag_cg_product_type(tau1: &Tau, tau2: &Tau, maxl: usize) -> KernelResult<Tau> {
    diag_cg_product_plan(tau1, tau2, maxl).map(|(tau, _)| tau)
}

/// Output type of the full product
///
/// # Examples
///
/// ```
/// use so3rs_core::Tau;
/// use so3rs_kernels::cg_product_type;
///
/// let tau = cg_product_type(&Tau::new(vec![1, 1]), &Tau::new(vec![2, 1]), 2);
/// assert_eq!(tau, Tau::new(vec![3, 4, 1]));
/// ```
pub fn cg_product_type(tau1: &Tau, tau2: &Tau, maxl: usize) -> Tau {
    cg_product_plan(tau1, tau2, maxl).0
}

fn check_type(operation: &'static str, expected: &Tau, actual: &Tau) -> KernelResult<()> {
    if expected != actual {
        return Err(KernelError::dimension_mismatch(
            operation,
            expected.0.clone(),
            actual.0.clone(),
            "gradient type does not match the product type",
        ));
    }
    Ok(())
}

/// Diagonal Clebsch-Gordan product of two collections
///
/// `maxl` defaults to `x.maxl() + y.maxl()`.
pub fn try_diag_cg_product<T: SO3Float>(
    banks: &Banks,
    x: &SO3Vec<T>,
    y: &SO3Vec<T>,
    maxl: Option<usize>,
) -> KernelResult<SO3Vec<T>> {
    let maxl = maxl.unwrap_or(x.maxl() + y.maxl());
    let (tau, couplings) = diag_cg_product_plan(&x.tau(), &y.tau(), maxl)?;
    let mut r = SO3Vec::zero(x.batch(), &tau, x.device());
    for c in couplings {
        try_add_diag_cg_product(banks, r.part_mut(c.l), x.part(c.l1), y.part(c.l2), c.offset)?;
    }
    Ok(r)
}

/// Aborting form of [`try_diag_cg_product`]
#[track_caller]
pub fn diag_cg_product<T: SO3Float>(
    banks: &Banks,
    x: &SO3Vec<T>,
    y: &SO3Vec<T>,
    maxl: Option<usize>,
) -> SO3Vec<T> {
    fatal(try_diag_cg_product(banks, x, y, maxl))
}

/// Accumulate the gradient of [`diag_cg_product`] with respect to `x`
pub fn try_diag_cg_product_back0<T: SO3Float>(
    banks: &Banks,
    xg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    y: &SO3Vec<T>,
) -> KernelResult<()> {
    let (tau, couplings) = diag_cg_product_plan(&xg.tau(), &y.tau(), g.maxl())?;
    check_type("diag_cg_product_back0", &tau, &g.tau())?;
    for c in couplings {
        try_add_diag_cg_product_back0(banks, xg.part_mut(c.l1), g.part(c.l), y.part(c.l2), c.offset)?;
    }
    Ok(())
}

/// Accumulate the gradient of [`diag_cg_product`] with respect to `y`
pub fn try_diag_cg_product_back1<T: SO3Float>(
    banks: &Banks,
    yg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    x: &SO3Vec<T>,
) -> KernelResult<()> {
    let (tau, couplings) = diag_cg_product_plan(&x.tau(), &yg.tau(), g.maxl())?;
    check_type("diag_cg_product_back1", &tau, &g.tau())?;
    for c in couplings {
        try_add_diag_cg_product_back1(banks, yg.part_mut(c.l2), g.part(c.l), x.part(c.l1), c.offset)?;
    }
    Ok(())
}

/// Aborting form of [`try_diag_cg_product_back0`]
#[track_caller]
pub fn diag_cg_product_back0<T: SO3Float>(
    banks: &Banks,
    xg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    y: &SO3Vec<T>,
) {
    fatal(try_diag_cg_product_back0(banks, xg, g, y))
}

/// Aborting form of [`try_diag_cg_product_back1`]
#[track_caller]
pub fn diag_cg_product_back1<T: SO3Float>(
    banks: &Banks,
    yg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    x: &SO3Vec<T>,
) {
    fatal(try_diag_cg_product_back1(banks, yg, g, x))
}

/// Full Clebsch-Gordan product of two collections
pub fn try_cg_product<T: SO3Float>(
    banks: &Banks,
    x: &SO3Vec<T>,
    y: &SO3Vec<T>,
    maxl: Option<usize>,
) -> KernelResult<SO3Vec<T>> {
    let maxl = maxl.unwrap_or(x.maxl() + y.maxl());
    let (tau, couplings) = cg_product_plan(&x.tau(), &y.tau(), maxl);
    let mut r = SO3Vec::zero(x.batch(), &tau, x.device());
    for c in couplings {
        try_add_cg_product(banks, r.part_mut(c.l), x.part(c.l1), y.part(c.l2), c.offset)?;
    }
    Ok(r)
}

/// Aborting form of [`try_cg_product`]
#[track_caller]
pub fn cg_product<T: SO3Float>(
    banks: &Banks,
    x: &SO3Vec<T>,
    y: &SO3Vec<T>,
    maxl: Option<usize>,
) -> SO3Vec<T> {
    fatal(try_cg_product(banks, x, y, maxl))
}

/// Accumulate the gradient of [`cg_product`] with respect to `x`
pub fn try_cg_product_back0<T: SO3Float>(
    banks: &Banks,
    xg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    y: &SO3Vec<T>,
) -> KernelResult<()> {
    let (tau, couplings) = cg_product_plan(&xg.tau(), &y.tau(), g.maxl());
    check_type("cg_product_back0", &tau, &g.tau())?;
    for c in couplings {
        try_add_cg_product_back0(banks, xg.part_mut(c.l1), g.part(c.l), y.part(c.l2), c.offset)?;
    }
    Ok(())
}

/// Accumulate the gradient of [`cg_product`] with respect to `y`
pub fn try_cg_product_back1<T: SO3Float>(
    banks: &Banks,
    yg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    x: &SO3Vec<T>,
) -> KernelResult<()> {
    let (tau, couplings) = cg_product_plan(&x.tau(), &yg.tau(), g.maxl());
    check_type("cg_product_back1", &tau, &g.tau())?;
    for c in couplings {
        try_add_cg_product_back1(banks, yg.part_mut(c.l2), g.part(c.l), x.part(c.l1), c.offset)?;
    }
    Ok(())
}

/// Aborting form of [`try_cg_product_back0`]
#[track_caller]
pub fn cg_product_back0<T: SO3Float>(
    banks: &Banks,
    xg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    y: &SO3Vec<T>,
) {
    fatal(try_cg_product_back0(banks, xg, g, y))
}

/// Aborting form of [`try_cg_product_back1`]
#[track_caller]
pub fn cg_product_back1<T: SO3Float>(
    banks: &Banks,
    yg: &mut SO3Vec<T>,
    g: &SO3Vec<T>,
    x: &SO3Vec<T>,
) {
    fatal(try_cg_product_back1(banks, yg, g, x))
}

fn fourier_triples(maxl1: usize, maxl2: usize, maxl: usize) -> Vec<(usize, usize, usize)> {
    let mut triples = Vec::new();
    for l1 in 0..=maxl1 {
        for l2 in 0..=maxl2 {
            for l in coupled_degrees(l1, l2, maxl) {
                triples.push((l1, l2, l));
            }
        }
    }
    triples
}

/// Product of two band-limited functions given by their Fourier parts
///
/// Every admissible `(l1, l2, l)` with `l <= maxl` is summed into part `l`;
/// `maxl` defaults to `x.maxl() + y.maxl()`.
pub fn try_fproduct<T: SO3Float>(
    banks: &Banks,
    x: &SO3FVec<T>,
    y: &SO3FVec<T>,
    maxl: Option<usize>,
) -> KernelResult<SO3FVec<T>> {
    let maxl = maxl.unwrap_or(x.maxl() + y.maxl());
    let mut r = SO3FVec::zero(x.batch(), maxl, x.device());
    for (l1, l2, l) in fourier_triples(x.maxl(), y.maxl(), maxl) {
        try_add_fproduct(banks, r.part_mut(l), x.part(l1), y.part(l2))?;
    }
    Ok(r)
}

/// Aborting form of [`try_fproduct`]
#[track_caller]
pub fn fproduct<T: SO3Float>(
    banks: &Banks,
    x: &SO3FVec<T>,
    y: &SO3FVec<T>,
    maxl: Option<usize>,
) -> SO3FVec<T> {
    fatal(try_fproduct(banks, x, y, maxl))
}

/// Accumulate the gradient of [`fproduct`] with respect to `x`
pub fn try_fproduct_back0<T: SO3Float>(
    banks: &Banks,
    xg: &mut SO3FVec<T>,
    g: &SO3FVec<T>,
    y: &SO3FVec<T>,
    conj: i32,
) -> KernelResult<()> {
    for (l1, l2, l) in fourier_triples(xg.maxl(), y.maxl(), g.maxl()) {
        try_add_fproduct_back0(banks, xg.part_mut(l1), g.part(l), y.part(l2), conj)?;
    }
    Ok(())
}

/// Accumulate the gradient of [`fproduct`] with respect to `y`
pub fn try_fproduct_back1<T: SO3Float>(
    banks: &Banks,
    yg: &mut SO3FVec<T>,
    g: &SO3FVec<T>,
    x: &SO3FVec<T>,
    conj: i32,
) -> KernelResult<()> {
    for (l1, l2, l) in fourier_triples(x.maxl(), yg.maxl(), g.maxl()) {
        try_add_fproduct_back1(banks, yg.part_mut(l2), g.part(l), x.part(l1), conj)?;
    }
    Ok(())
}

/// Aborting form of [`try_fproduct_back0`]
#[track_caller]
pub fn fproduct_back0<T: SO3Float>(
    banks: &Banks,
    xg: &mut SO3FVec<T>,
    g: &SO3FVec<T>,
    y: &SO3FVec<T>,
    conj: i32,
) {
    fatal(try_fproduct_back0(banks, xg, g, y, conj))
}

/// Aborting form of [`try_fproduct_back1`]
#[track_caller]
pub fn fproduct_back1<T: SO3Float>(
    banks: &Banks,
    yg: &mut SO3FVec<T>,
    g: &SO3FVec<T>,
    x: &SO3FVec<T>,
    conj: i32,
) {
    fatal(try_fproduct_back1(banks, yg, g, x, conj))
}

/// Fourier parts of `|f|²`-style self products
pub fn try_fmodsq<T: SO3Float>(
    banks: &Banks,
    x: &SO3FVec<T>,
    maxl: Option<usize>,
) -> KernelResult<SO3FVec<T>> {
    let maxl = maxl.unwrap_or(2 * x.maxl());
    let mut r = SO3FVec::zero(x.batch(), maxl, x.device());
    for (l1, l2, l) in fourier_triples(x.maxl(), x.maxl(), maxl) {
        if l1 == l2 {
            try_add_fmodsq(banks, r.part_mut(l), x.part(l1))?;
        } else {
            try_add_fproduct(banks, r.part_mut(l), x.part(l1), x.part(l2))?;
        }
    }
    Ok(r)
}

/// Aborting form of [`try_fmodsq`]
#[track_caller]
pub fn fmodsq<T: SO3Float>(banks: &Banks, x: &SO3FVec<T>, maxl: Option<usize>) -> SO3FVec<T> {
    fatal(try_fmodsq(banks, x, maxl))
}

/// Sample the function with Fourier parts `f` on a grid
pub fn try_inverse_fft<T: SO3Float>(
    banks: &Banks,
    f: &SO3FVec<T>,
    resolution: GridResolution,
) -> KernelResult<SO3Grid<T>> {
    let mut grid = SO3Grid::zero(f.batch(), resolution, f.device());
    for part in f.parts() {
        try_add_inverse_transform(banks, &mut grid, part)?;
    }
    Ok(grid)
}

/// Aborting form of [`try_inverse_fft`]
#[track_caller]
pub fn inverse_fft<T: SO3Float>(
    banks: &Banks,
    f: &SO3FVec<T>,
    resolution: GridResolution,
) -> SO3Grid<T> {
    fatal(try_inverse_fft(banks, f, resolution))
}
