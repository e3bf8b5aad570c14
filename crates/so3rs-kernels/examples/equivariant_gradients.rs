//! Forward and backward pass of a Clebsch-Gordan layer
//!
//! Couples two random multi-degree collections, pulls a random output
//! gradient back through both operands, and checks the adjoint identity
//! `<g, r> = <back0, x> = <back1, y>`. Finally samples a band-limited
//! function on an Euler-angle grid.
//!
//! Run with: cargo run --example equivariant_gradients --features parallel

use so3rs_core::logging::{init_logging, LogConfig};
use so3rs_core::{Device, GridResolution, SO3FVec, SO3Vec, Tau};
use so3rs_kernels::{diag_cg_product, diag_cg_product_back0, diag_cg_product_back1, inverse_fft, Banks};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    init_logging(LogConfig::default())?;

    println!("=== Clebsch-Gordan Layer Example ===\n");

    let batch = 16;
    let tau = Tau::new(vec![4, 4, 4]);
    let maxl = 2;
    let banks = Banks::global();

    println!("Inputs:");
    println!("  Batch: {}", batch);
    println!("  Multiplicities: {:?}", tau.0);
    println!("  Output maxl: {}\n", maxl);

    let x = SO3Vec::<f64>::gaussian_seeded(batch, &tau, 7, Device::Host);
    let y = SO3Vec::<f64>::gaussian_seeded(batch, &tau, 11, Device::Host);

    let start = Instant::now();
    let r = diag_cg_product(banks, &x, &y, Some(maxl));
    println!("Forward pass: {:?}", start.elapsed());
    println!("  Output multiplicities: {:?}", r.tau().0);

    let g = SO3Vec::<f64>::gaussian_seeded(batch, &r.tau(), 13, Device::Host);
    let mut xg = x.zeros_like();
    let mut yg = y.zeros_like();

    let start = Instant::now();
    diag_cg_product_back0(banks, &mut xg, &g, &y);
    diag_cg_product_back1(banks, &mut yg, &g, &x);
    println!("Backward pass: {:?}\n", start.elapsed());

    let forward = g.inner(&r);
    let through_x = xg.inner(&x);
    let through_y = yg.inner(&y);
    println!("Adjoint check:");
    println!("  <g, r>      = {:.6}", forward);
    println!("  <back0, x>  = {:.6}", through_x);
    println!("  <back1, y>  = {:.6}", through_y);
    println!("  |difference| = {:.2e}\n", (forward - through_x).norm());

    let f = SO3FVec::<f64>::gaussian_seeded(1, maxl, 17, Device::Host);
    let resolution = GridResolution::for_bandlimit(maxl);
    let start = Instant::now();
    let grid = inverse_fft(banks, &f, resolution);
    println!("Inverse transform onto {:?}: {:?}", grid.shape(), start.elapsed());
    println!("  Coefficient tables computed: {}", banks.cg.computed());

    Ok(())
}
