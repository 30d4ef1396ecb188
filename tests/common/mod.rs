//! Common test utilities for gridfield-core integration tests

#![allow(dead_code)]

use ndarray::Array3;
use num_complex::Complex64;

/// Largest element-wise distance between two complex fields
pub fn max_abs_diff(a: &Array3<Complex64>, b: &Array3<Complex64>) -> f64 {
    assert_eq!(a.dim(), b.dim(), "fields must share a shape");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

/// Root-mean-square distance between two complex fields
pub fn rmse(a: &Array3<Complex64>, b: &Array3<Complex64>) -> f64 {
    let n = a.len();
    if n == 0 {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm_sqr()).sum();
    (sum_sq / n as f64).sqrt()
}

/// Deterministic pseudo-random field in [-1, 1) (xorshift, fixed seed)
pub fn noise_field(dims: (usize, usize, usize), seed: u64) -> Array3<Complex64> {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    };
    Array3::from_shape_fn(dims, |_| {
        let re = next();
        let im = next();
        Complex64::new(re, im)
    })
}

/// Real Gaussian bump centred in the box, periodic images ignored
pub fn gaussian_blob(dims: (usize, usize, usize), sigma_cells: f64) -> Array3<f64> {
    let (nx, ny, nz) = dims;
    let c = (nx as f64 / 2.0, ny as f64 / 2.0, nz as f64 / 2.0);
    Array3::from_shape_fn(dims, |(i, j, k)| {
        let dx = i as f64 - c.0;
        let dy = j as f64 - c.1;
        let dz = k as f64 - c.2;
        (-(dx * dx + dy * dy + dz * dz) / (2.0 * sigma_cells * sigma_cells)).exp()
    })
}
