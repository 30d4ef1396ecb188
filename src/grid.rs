//! Coordinate grids in configuration and Fourier space
//!
//! Every grid has shape `grid_dims` and is indexed `[i, j, k]`. Fourier-space
//! grids follow the unshifted FFT bin layout: DC at index 0, positive
//! frequencies ascending, then negative frequencies from the midpoint.

use ndarray::Array3;

use crate::geometry::GridGeometry;

/// Offset added to magnitude grids so the DC cell is never exactly zero.
///
/// Anything that later divides by a magnitude grid (direction cosines, power
/// weights) stays finite at `[0, 0, 0]`. Far below any physical magnitude.
pub const MAGNITUDE_GUARD: f64 = 1e-20;

/// Signed frequency labels for one axis of length `n`.
///
/// Raw indices `0..n`; every index `>= n / 2` is shifted down by `n`.
/// `n = 4` gives `[0, 1, -2, -1]`, `n = 5` gives `[0, 1, 2, -2, -1]`.
pub fn wrapped_indices(n: usize) -> Vec<i64> {
    let half = n / 2;
    (0..n)
        .map(|i| if i >= half { i as i64 - n as i64 } else { i as i64 })
        .collect()
}

/// Euclidean norm of a 3-vector plus `guard`.
#[inline]
pub fn guarded_norm(x: f64, y: f64, z: f64, guard: f64) -> f64 {
    (x * x + y * y + z * z).sqrt() + guard
}

/// Index and magnitude grids shared by transforms and projections.
#[derive(Debug, Clone)]
pub struct CoordinateGrids {
    /// Plain 0-based cell index along x, y, z
    pub config_index: [Array3<i64>; 3],
    /// Signed wrapped frequency index along x, y, z
    pub freq_index: [Array3<i64>; 3],
    /// |k_f ⊙ n| + guard
    pub wavenumber: Array3<f64>,
    /// |n| + guard (mode count, unit-less)
    pub freq_count: Array3<f64>,
    /// |grid_spacing · n| + guard (physical distance from the origin cell,
    /// with periodic images folded onto the nearest side)
    pub radial: Array3<f64>,
    pub guard: f64,
}

impl CoordinateGrids {
    /// Build all grids for `geometry`, adding `guard` to the magnitudes.
    pub fn build(geometry: &GridGeometry, guard: f64) -> Self {
        let dims = geometry.grid_dims;
        let [kfx, kfy, kfz] = geometry.fundamental_wavenumber;
        let h = geometry.grid_spacing;

        let config_index = [
            Array3::from_shape_fn(dims, |(i, _, _)| i as i64),
            Array3::from_shape_fn(dims, |(_, j, _)| j as i64),
            Array3::from_shape_fn(dims, |(_, _, k)| k as i64),
        ];

        let wx = wrapped_indices(dims.0);
        let wy = wrapped_indices(dims.1);
        let wz = wrapped_indices(dims.2);

        let freq_index = [
            Array3::from_shape_fn(dims, |(i, _, _)| wx[i]),
            Array3::from_shape_fn(dims, |(_, j, _)| wy[j]),
            Array3::from_shape_fn(dims, |(_, _, k)| wz[k]),
        ];

        // Same signed labels under three scalings
        let scaled = |sx: f64, sy: f64, sz: f64| {
            Array3::from_shape_fn(dims, |(i, j, k)| {
                guarded_norm(sx * wx[i] as f64, sy * wy[j] as f64, sz * wz[k] as f64, guard)
            })
        };

        let wavenumber = scaled(kfx, kfy, kfz);
        let freq_count = scaled(1.0, 1.0, 1.0);
        let radial = scaled(h, h, h);

        Self {
            config_index,
            freq_index,
            wavenumber,
            freq_count,
            radial,
            guard,
        }
    }

    /// Wavevector components `k_f[a] * n_a` at cell `[i, j, k]`.
    #[inline]
    pub fn wavevector(&self, geometry: &GridGeometry, i: usize, j: usize, k: usize) -> [f64; 3] {
        let kf = geometry.fundamental_wavenumber;
        [
            kf[0] * self.freq_index[0][[i, j, k]] as f64,
            kf[1] * self.freq_index[1][[i, j, k]] as f64,
            kf[2] * self.freq_index[2][[i, j, k]] as f64,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_indices_even_odd() {
        assert_eq!(wrapped_indices(4), vec![0, 1, -2, -1]);
        assert_eq!(wrapped_indices(5), vec![0, 1, 2, -2, -1]);
        assert_eq!(wrapped_indices(1), vec![0]);
        assert_eq!(wrapped_indices(2), vec![0, -1]);
    }

    #[test]
    fn test_wrapped_indices_match_fft_bins() {
        // Each label must be congruent to its raw index modulo n
        for n in 1..12 {
            for (i, &w) in wrapped_indices(n).iter().enumerate() {
                assert_eq!((w + n as i64).rem_euclid(n as i64), i as i64);
                assert!(w > -(n as i64) / 2 - 1 && w <= n as i64 / 2);
            }
        }
    }

    #[test]
    fn test_index_grids() {
        let g = GridGeometry::new([100.0, 50.0, 50.0], 4, false).unwrap();
        let grids = CoordinateGrids::build(&g, MAGNITUDE_GUARD);

        for grid in grids.config_index.iter().chain(grids.freq_index.iter()) {
            assert_eq!(grid.dim(), (4, 2, 2));
        }
        assert_eq!(grids.config_index[0][[3, 1, 0]], 3);
        assert_eq!(grids.config_index[1][[3, 1, 0]], 1);
        assert_eq!(grids.config_index[2][[3, 1, 1]], 1);

        let xs: Vec<i64> = (0..4).map(|i| grids.freq_index[0][[i, 0, 0]]).collect();
        assert_eq!(xs, vec![0, 1, -2, -1]);
        let ys: Vec<i64> = (0..2).map(|j| grids.freq_index[1][[0, j, 1]]).collect();
        assert_eq!(ys, vec![0, -1]);
    }

    #[test]
    fn test_dc_cell_is_guard() {
        let g = GridGeometry::new([100.0, 100.0, 100.0], 8, true).unwrap();
        let grids = CoordinateGrids::build(&g, MAGNITUDE_GUARD);
        assert_eq!(grids.wavenumber[[0, 0, 0]], MAGNITUDE_GUARD);
        assert_eq!(grids.freq_count[[0, 0, 0]], MAGNITUDE_GUARD);
        assert_eq!(grids.radial[[0, 0, 0]], MAGNITUDE_GUARD);

        let bare = CoordinateGrids::build(&g, 0.0);
        assert_eq!(bare.wavenumber[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_magnitude_scalings() {
        let g = GridGeometry::new([100.0, 100.0, 100.0], 4, true).unwrap();
        let grids = CoordinateGrids::build(&g, 0.0);
        let kf = 2.0 * std::f64::consts::PI / 100.0;

        // (i, j, k) = (1, 3, 2) -> n = (1, -1, -2), |n| = sqrt(6)
        let n = 6.0f64.sqrt();
        assert!((grids.freq_count[[1, 3, 2]] - n).abs() < 1e-12);
        assert!((grids.wavenumber[[1, 3, 2]] - kf * n).abs() < 1e-12);
        assert!((grids.radial[[1, 3, 2]] - 25.0 * n).abs() < 1e-10);
    }

    #[test]
    fn test_wavenumber_increases_away_from_dc() {
        let g = GridGeometry::new([200.0, 200.0, 200.0], 8, true).unwrap();
        let grids = CoordinateGrids::build(&g, MAGNITUDE_GUARD);
        let n = g.grid_dims.0;

        // positive side along x, and along the (1,1,1) diagonal
        for i in 1..n / 2 {
            assert!(grids.wavenumber[[i, 0, 0]] > grids.wavenumber[[i - 1, 0, 0]]);
            assert!(grids.wavenumber[[i, i, i]] > grids.wavenumber[[i - 1, i - 1, i - 1]]);
        }
        // negative side walking away from DC: -1, -2, ...
        for step in 1..n / 2 {
            let a = n - step;
            let b = n - step - 1;
            assert!(grids.wavenumber[[0, b, 0]] > grids.wavenumber[[0, a, 0]]);
        }
    }

    #[test]
    fn test_wavevector() {
        let g = GridGeometry::new([100.0, 50.0, 50.0], 4, false).unwrap();
        let grids = CoordinateGrids::build(&g, MAGNITUDE_GUARD);
        let kv = grids.wavevector(&g, 3, 1, 0);
        assert!((kv[0] + g.fundamental_wavenumber[0]).abs() < 1e-15);
        assert!((kv[1] + g.fundamental_wavenumber[1]).abs() < 1e-15);
        assert_eq!(kv[2], 0.0);
    }
}
