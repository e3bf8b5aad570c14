//! Host contraction loops
//!
//! Every routine here accumulates into a batch of output cells. Cells are
//! disjoint slices along axis 0, so batch-parallel execution needs no
//! synchronization beyond the split itself.

use scirs2_core::ndarray_ext::{
    Array3, ArrayView2, ArrayView3, ArrayViewMut, ArrayViewMut3, ArrayViewMut4, Axis, RemoveAxis,
};
use scirs2_core::numeric::Complex;
use so3rs_core::SO3Float;

use crate::cg_bank::CGCoefficients;
use crate::selection::band;
use crate::wigner::AngularMatrices;

/// Visit each batch slice of `out`, in parallel when requested
pub(crate) fn for_each_cell<A, D, F>(mut out: ArrayViewMut<'_, A, D>, parallel: bool, f: F)
where
    A: Send + Sync,
    D: RemoveAxis,
    F: Fn(usize, ArrayViewMut<'_, A, D::Smaller>) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    if parallel {
        use scirs2_core::parallel_ops::*;

        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(b, cell)| f(b, cell));
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for (b, cell) in out.axis_iter_mut(Axis(0)).enumerate() {
        f(b, cell);
    }
}

#[inline]
fn storage(m: isize, l: usize) -> usize {
    (m + l as isize) as usize
}

/// `out(m', n) += Σ_m D(m', m) · x(m, n)`
pub(crate) fn apply_rotation<T: SO3Float>(
    d: ArrayView2<'_, Complex<T>>,
    out: ArrayViewMut3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    parallel: bool,
) {
    let (dim, n) = (x.len_of(Axis(1)), x.len_of(Axis(2)));
    for_each_cell(out, parallel, |b, mut out| {
        let x = x.index_axis(Axis(0), b);
        for i in 0..dim {
            for j in 0..dim {
                let w = d[[i, j]];
                for ch in 0..n {
                    out[[i, ch]] += w * x[[j, ch]];
                }
            }
        }
    });
}

/// `r(m1+m2, offset+n) += C · x(m1, n) · y(m2, n)`
pub(crate) fn diag_cg_product<T: SO3Float>(
    cg: &CGCoefficients<T>,
    r: ArrayViewMut3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    y: ArrayView3<'_, Complex<T>>,
    offset: usize,
    parallel: bool,
) {
    let n = x.len_of(Axis(2));
    for_each_cell(r, parallel, |b, mut r| {
        let (x, y) = (x.index_axis(Axis(0), b), y.index_axis(Axis(0), b));
        visit_band(cg, |i, j, k, c| {
            for ch in 0..n {
                r[[k, offset + ch]] += x[[i, ch]] * y[[j, ch]] * c;
            }
        });
    });
}

/// `xg(m1, n) += C · g(m1+m2, offset+n) · conj(y(m2, n))`
pub(crate) fn diag_cg_product_back0<T: SO3Float>(
    cg: &CGCoefficients<T>,
    xg: ArrayViewMut3<'_, Complex<T>>,
    g: ArrayView3<'_, Complex<T>>,
    y: ArrayView3<'_, Complex<T>>,
    offset: usize,
    parallel: bool,
) {
    let n = y.len_of(Axis(2));
    for_each_cell(xg, parallel, |b, mut xg| {
        let (g, y) = (g.index_axis(Axis(0), b), y.index_axis(Axis(0), b));
        visit_band(cg, |i, j, k, c| {
            for ch in 0..n {
                xg[[i, ch]] += g[[k, offset + ch]] * y[[j, ch]].conj() * c;
            }
        });
    });
}

/// `yg(m2, n) += C · g(m1+m2, offset+n) · conj(x(m1, n))`
pub(crate) fn diag_cg_product_back1<T: SO3Float>(
    cg: &CGCoefficients<T>,
    yg: ArrayViewMut3<'_, Complex<T>>,
    g: ArrayView3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    offset: usize,
    parallel: bool,
) {
    let n = x.len_of(Axis(2));
    for_each_cell(yg, parallel, |b, mut yg| {
        let (g, x) = (g.index_axis(Axis(0), b), x.index_axis(Axis(0), b));
        visit_band(cg, |i, j, k, c| {
            for ch in 0..n {
                yg[[j, ch]] += g[[k, offset + ch]] * x[[i, ch]].conj() * c;
            }
        });
    });
}

/// `r(m1+m2, offset + n1·N2 + n2) += C · x(m1, n1) · y(m2, n2)`
pub(crate) fn cg_product<T: SO3Float>(
    cg: &CGCoefficients<T>,
    r: ArrayViewMut3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    y: ArrayView3<'_, Complex<T>>,
    offset: usize,
    parallel: bool,
) {
    let (n1, n2) = (x.len_of(Axis(2)), y.len_of(Axis(2)));
    for_each_cell(r, parallel, |b, mut r| {
        let (x, y) = (x.index_axis(Axis(0), b), y.index_axis(Axis(0), b));
        visit_band(cg, |i, j, k, c| {
            for a in 0..n1 {
                let xc = x[[i, a]] * c;
                for bb in 0..n2 {
                    r[[k, offset + a * n2 + bb]] += xc * y[[j, bb]];
                }
            }
        });
    });
}

/// `xg(m1, n1) += Σ_{n2} C · g(m1+m2, offset + n1·N2 + n2) · conj(y(m2, n2))`
pub(crate) fn cg_product_back0<T: SO3Float>(
    cg: &CGCoefficients<T>,
    xg: ArrayViewMut3<'_, Complex<T>>,
    g: ArrayView3<'_, Complex<T>>,
    y: ArrayView3<'_, Complex<T>>,
    offset: usize,
    parallel: bool,
) {
    let n1 = xg.len_of(Axis(2));
    let n2 = y.len_of(Axis(2));
    for_each_cell(xg, parallel, |b, mut xg| {
        let (g, y) = (g.index_axis(Axis(0), b), y.index_axis(Axis(0), b));
        visit_band(cg, |i, j, k, c| {
            for a in 0..n1 {
                let mut acc = Complex::new(T::zero(), T::zero());
                for bb in 0..n2 {
                    acc += g[[k, offset + a * n2 + bb]] * y[[j, bb]].conj();
                }
                xg[[i, a]] += acc * c;
            }
        });
    });
}

/// `yg(m2, n2) += Σ_{n1} C · g(m1+m2, offset + n1·N2 + n2) · conj(x(m1, n1))`
pub(crate) fn cg_product_back1<T: SO3Float>(
    cg: &CGCoefficients<T>,
    yg: ArrayViewMut3<'_, Complex<T>>,
    g: ArrayView3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    offset: usize,
    parallel: bool,
) {
    let n1 = x.len_of(Axis(2));
    let n2 = yg.len_of(Axis(2));
    for_each_cell(yg, parallel, |b, mut yg| {
        let (g, x) = (g.index_axis(Axis(0), b), x.index_axis(Axis(0), b));
        visit_band(cg, |i, j, k, c| {
            for a in 0..n1 {
                let xc = x[[i, a]].conj() * c;
                for bb in 0..n2 {
                    yg[[j, bb]] += g[[k, offset + a * n2 + bb]] * xc;
                }
            }
        });
    });
}

/// Walk the clipped band, yielding storage offsets `(m1+l1, m2+l2, m1+m2+l)`
/// and the coefficient
#[inline]
fn visit_band<T: SO3Float>(cg: &CGCoefficients<T>, mut f: impl FnMut(usize, usize, usize, T)) {
    let (l1, l2, l) = (cg.l1(), cg.l2(), cg.l());
    let l1i = l1 as isize;
    for m1 in -l1i..=l1i {
        for m2 in band(l1, l2, l, m1) {
            f(
                storage(m1, l1),
                storage(m2, l2),
                storage(m1 + m2, l),
                cg.get(m1, m2),
            );
        }
    }
}

/// Walk both band pairs of a Fourier-domain product
///
/// Yields `(M1+l1, M2+l2, M1+M2+l)`, `(m1+l1, m2+l2, m1+m2+l)`, and the
/// combined weight `c · C(M1,M2) · C(m1,m2)`.
#[inline]
fn visit_band_pairs<T: SO3Float>(
    cg: &CGCoefficients<T>,
    mut f: impl FnMut((usize, usize, usize), (usize, usize, usize), T),
) {
    let (l1, l2, l) = (cg.l1(), cg.l2(), cg.l());
    let norm = T::from_f64_lossy(((2 * l1 + 1) * (2 * l2 + 1)) as f64 / (2 * l + 1) as f64);
    visit_band(cg, |ri, rj, rk, rc| {
        let row_weight = rc * norm;
        visit_band(cg, |ci, cj, ck, cc| {
            f((ri, rj, rk), (ci, cj, ck), row_weight * cc);
        });
    });
}

/// `r(M1+M2, m1+m2) += w · x(M1, m1) · conj(y(-M2, -m2))`
pub(crate) fn fproduct<T: SO3Float>(
    cg: &CGCoefficients<T>,
    r: ArrayViewMut3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    y: ArrayView3<'_, Complex<T>>,
    parallel: bool,
) {
    let flip = 2 * cg.l2();
    for_each_cell(r, parallel, |b, mut r| {
        let (x, y) = (x.index_axis(Axis(0), b), y.index_axis(Axis(0), b));
        visit_band_pairs(cg, |(ri, rj, rk), (ci, cj, ck), w| {
            r[[rk, ck]] += x[[ri, ci]] * y[[flip - rj, flip - cj]].conj() * w;
        });
    });
}

/// `xg(M1, m1) += w · g(M1+M2, m1+m2) · y(-M2, -m2)`, conjugated when `conj` is odd
pub(crate) fn fproduct_back0<T: SO3Float>(
    cg: &CGCoefficients<T>,
    xg: ArrayViewMut3<'_, Complex<T>>,
    g: ArrayView3<'_, Complex<T>>,
    y: ArrayView3<'_, Complex<T>>,
    conj: i32,
    parallel: bool,
) {
    let flip = 2 * cg.l2();
    let odd = conj.rem_euclid(2) == 1;
    for_each_cell(xg, parallel, |b, mut xg| {
        let (g, y) = (g.index_axis(Axis(0), b), y.index_axis(Axis(0), b));
        visit_band_pairs(cg, |(ri, rj, rk), (ci, cj, ck), w| {
            let term = g[[rk, ck]] * y[[flip - rj, flip - cj]] * w;
            xg[[ri, ci]] += if odd { term.conj() } else { term };
        });
    });
}

/// `yg(M2, m2) += w · g(M1+M2, m1+m2) · conj(x(M1, m1))`, conjugated when `conj` is odd
pub(crate) fn fproduct_back1<T: SO3Float>(
    cg: &CGCoefficients<T>,
    yg: ArrayViewMut3<'_, Complex<T>>,
    g: ArrayView3<'_, Complex<T>>,
    x: ArrayView3<'_, Complex<T>>,
    conj: i32,
    parallel: bool,
) {
    let odd = conj.rem_euclid(2) == 1;
    for_each_cell(yg, parallel, |b, mut yg| {
        let (g, x) = (g.index_axis(Axis(0), b), x.index_axis(Axis(0), b));
        visit_band_pairs(cg, |(ri, rj, rk), (ci, cj, ck), w| {
            let term = g[[rk, ck]] * x[[ri, ci]].conj() * w;
            yg[[rj, cj]] += if odd { term.conj() } else { term };
        });
    });
}

/// Three chained contractions of one degree's coefficients onto the grid
///
/// 1. `A(i, t, j) = p(i, j) · D(i, t, j)`
/// 2. `B(a, t, j) = Σ_i Fφ(a, i) · A(i, t, j)`
/// 3. `f(a, t, c) += Σ_j Fψ(c, j) · B(a, t, j)`
pub(crate) fn inverse_transform<T: SO3Float>(
    matrices: &AngularMatrices<T>,
    f: ArrayViewMut4<'_, Complex<T>>,
    p: ArrayView3<'_, Complex<T>>,
    parallel: bool,
) {
    let d = matrices.d.data().view();
    let phi = matrices.phi.data().view();
    let psi = matrices.psi.data().view();
    for_each_cell(f, parallel, |b, f| {
        let polar = expand_polar(p.index_axis(Axis(0), b), d);
        let mixed = mix_first_azimuth(polar.view(), phi);
        mix_second_azimuth(f, mixed.view(), psi);
    });
}

fn expand_polar<T: SO3Float>(
    p: ArrayView2<'_, Complex<T>>,
    d: ArrayView3<'_, T>,
) -> Array3<Complex<T>> {
    let (dim, n_theta, _) = d.dim();
    let mut a = Array3::from_elem((dim, n_theta, dim), Complex::new(T::zero(), T::zero()));
    for ((i, t, j), value) in a.indexed_iter_mut() {
        *value += p[[i, j]] * d[[i, t, j]];
    }
    a
}

fn mix_first_azimuth<T: SO3Float>(
    a: ArrayView3<'_, Complex<T>>,
    phi: ArrayView2<'_, Complex<T>>,
) -> Array3<Complex<T>> {
    let (dim, n_theta, _) = a.dim();
    let n_phi = phi.nrows();
    let mut mixed = Array3::from_elem((n_phi, n_theta, dim), Complex::new(T::zero(), T::zero()));
    for alpha in 0..n_phi {
        for i in 0..dim {
            let w = phi[[alpha, i]];
            for t in 0..n_theta {
                for j in 0..dim {
                    mixed[[alpha, t, j]] += w * a[[i, t, j]];
                }
            }
        }
    }
    mixed
}

fn mix_second_azimuth<T: SO3Float>(
    mut f: ArrayViewMut3<'_, Complex<T>>,
    mixed: ArrayView3<'_, Complex<T>>,
    psi: ArrayView2<'_, Complex<T>>,
) {
    let (n_phi, n_theta, dim) = mixed.dim();
    let n_psi = psi.nrows();
    for alpha in 0..n_phi {
        for t in 0..n_theta {
            for gamma in 0..n_psi {
                let mut acc = Complex::new(T::zero(), T::zero());
                for j in 0..dim {
                    acc += psi[[gamma, j]] * mixed[[alpha, t, j]];
                }
                f[[alpha, t, gamma]] += acc;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cg_bank::CGBank;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn test_for_each_cell_parallel_complex() {
        let mut out = Array3::from_elem((6, 3, 2), c(0.0, 0.0));
        for parallel in [false, true] {
            for_each_cell(out.view_mut(), parallel, |b, mut cell| {
                cell.mapv_inplace(|z| z + c(b as f64, 1.0));
            });
        }
        for b in 0..6 {
            assert_eq!(out[[b, 2, 1]], c(2.0 * b as f64, 2.0));
        }
    }

    #[test]
    fn test_degree_zero_is_elementwise() {
        let bank = CGBank::new();
        let cg = bank.get::<f64>(0, 0, 0);
        let x = Array3::from_shape_vec((1, 1, 3), vec![c(1.0, 0.0), c(0.0, 2.0), c(3.0, 1.0)])
            .unwrap();
        let y = Array3::from_shape_vec((1, 1, 3), vec![c(2.0, 0.0), c(0.0, 1.0), c(1.0, -1.0)])
            .unwrap();
        let mut r = Array3::from_elem((1, 1, 4), c(1.0, 0.0));
        diag_cg_product(&cg, r.view_mut(), x.view(), y.view(), 1, false);
        assert_eq!(r[[0, 0, 0]], c(1.0, 0.0));
        assert_eq!(r[[0, 0, 1]], c(3.0, 0.0));
        assert_eq!(r[[0, 0, 2]], c(-1.0, 0.0));
        assert_eq!(r[[0, 0, 3]], c(5.0, -2.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let bank = CGBank::new();
        let cg = bank.get::<f64>(1, 2, 2);
        let x = Array3::from_shape_fn((6, 3, 2), |(b, i, n)| c((b + i) as f64, n as f64 - 0.5));
        let y = Array3::from_shape_fn((6, 5, 2), |(b, j, n)| c(j as f64 * 0.25, (b * n) as f64));
        let mut seq = Array3::from_elem((6, 5, 2), c(0.0, 0.0));
        let mut par = seq.clone();
        diag_cg_product(&cg, seq.view_mut(), x.view(), y.view(), 0, false);
        diag_cg_product(&cg, par.view_mut(), x.view(), y.view(), 0, true);
        for (a, b) in seq.iter().zip(par.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_full_product_channel_layout() {
        let bank = CGBank::new();
        let cg = bank.get::<f64>(0, 0, 0);
        let x = Array3::from_shape_vec((1, 1, 2), vec![c(1.0, 0.0), c(2.0, 0.0)]).unwrap();
        let y = Array3::from_shape_vec((1, 1, 3), vec![c(1.0, 0.0), c(10.0, 0.0), c(100.0, 0.0)])
            .unwrap();
        let mut r = Array3::from_elem((1, 1, 6), c(0.0, 0.0));
        cg_product(&cg, r.view_mut(), x.view(), y.view(), 0, false);
        let got: Vec<f64> = r.iter().map(|z| z.re).collect();
        assert_eq!(got, vec![1.0, 10.0, 100.0, 2.0, 20.0, 200.0]);
    }

    #[test]
    fn test_fproduct_degree_zero() {
        let bank = CGBank::new();
        let cg = bank.get::<f64>(0, 0, 0);
        let x = Array3::from_elem((1, 1, 1), c(1.0, 2.0));
        let y = Array3::from_elem((1, 1, 1), c(3.0, 1.0));
        let mut r = Array3::from_elem((1, 1, 1), c(0.0, 0.0));
        fproduct(&cg, r.view_mut(), x.view(), y.view(), false);
        // (1+2i)(3-i) = 5+5i
        assert_eq!(r[[0, 0, 0]], c(5.0, 5.0));
    }
}
