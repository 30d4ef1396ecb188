//! Line-of-sight projection of Fourier-space wavevectors
//!
//! For a direction n̂ this gives, per Fourier cell, the parallel wavenumber
//! `k_∥ = k · n̂`, the cosine `μ = k_∥ / |k|` and `|μ|`. The projection is
//! computed on request and cached on the owning field.

use ndarray::{Array3, Zip};

use crate::error::{GridError, Result};
use crate::geometry::GridGeometry;
use crate::grid::CoordinateGrids;

/// Projection grids for one line-of-sight direction.
#[derive(Debug, Clone, PartialEq)]
pub struct LosProjection {
    /// Unit direction the grids were computed for
    pub direction: [f64; 3],
    /// k · n̂
    pub parallel_wavenumber: Array3<f64>,
    /// k · n̂ / |k|, zero where |k| is exactly zero (DC with no guard)
    pub cosine: Array3<f64>,
    /// |k · n̂ / |k||
    pub abs_cosine: Array3<f64>,
}

/// Cached projection state of a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LosState {
    /// No direction has been set yet
    #[default]
    Unset,
    Projected(LosProjection),
}

impl LosState {
    pub fn projection(&self) -> Option<&LosProjection> {
        match self {
            LosState::Unset => None,
            LosState::Projected(p) => Some(p),
        }
    }

    pub fn direction(&self) -> Option<[f64; 3]> {
        self.projection().map(|p| p.direction)
    }
}

/// Scale `direction` to unit length.
///
/// Fails on a zero or non-finite norm.
pub fn unit_direction(direction: [f64; 3]) -> Result<[f64; 3]> {
    let [x, y, z] = direction;
    let norm = (x * x + y * y + z * z).sqrt();
    if !(norm.is_finite() && norm > 0.0) {
        return Err(GridError::InvalidDirection(direction));
    }
    Ok([x / norm, y / norm, z / norm])
}

impl LosProjection {
    /// Project the wavevectors of `grids` onto `direction` (any non-zero length).
    pub fn compute(
        geometry: &GridGeometry,
        grids: &CoordinateGrids,
        direction: [f64; 3],
    ) -> Result<Self> {
        let nhat = unit_direction(direction)?;
        let kf = geometry.fundamental_wavenumber;
        let [ix, iy, iz] = &grids.freq_index;

        let mut parallel_wavenumber = Array3::<f64>::zeros(geometry.grid_dims);
        Zip::from(&mut parallel_wavenumber)
            .and(ix)
            .and(iy)
            .and(iz)
            .for_each(|kp, &nx, &ny, &nz| {
                *kp = kf[0] * nx as f64 * nhat[0]
                    + kf[1] * ny as f64 * nhat[1]
                    + kf[2] * nz as f64 * nhat[2];
            });

        let cosine = Zip::from(&parallel_wavenumber)
            .and(&grids.wavenumber)
            .map_collect(|&kp, &k| if k == 0.0 { 0.0 } else { kp / k.abs() });
        let abs_cosine = cosine.mapv(f64::abs);

        Ok(Self {
            direction: nhat,
            parallel_wavenumber,
            cosine,
            abs_cosine,
        })
    }
}
