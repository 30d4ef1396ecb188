//! Box and grid geometry
//!
//! Derives spacing, cell counts, volumes and characteristic wavenumbers from
//! the physical box size and the number of cells along the longest axis.
//! One spacing is shared by all three axes, so a non-cubic transform box gets
//! a different number of cells per axis.

use serde::Serialize;
use std::f64::consts::PI;

use crate::error::{GridError, Result};

/// Ulps of slack below which a length/spacing ratio counts as the integer it
/// rounds to before taking the ceiling.
const CEIL_SNAP_ULPS: f64 = 4.0;

/// Derived geometry of a periodic 3D grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridGeometry {
    pub box_lengths: [f64; 3],
    pub grid_count: usize,
    pub cube_mode: bool,
    pub max_box_length: f64,
    /// Volume of the cube with side `max_box_length`
    pub max_cube_volume: f64,
    pub grid_spacing: f64,
    pub cell_volume: f64,
    /// π / grid_spacing
    pub nyquist_wavenumber: f64,
    /// 2π / grid_spacing
    pub sampling_wavenumber: f64,
    pub transform_box_lengths: [f64; 3],
    /// 2π / transform_box_lengths, per axis
    pub fundamental_wavenumber: [f64; 3],
    pub survey_volume: f64,
    pub transform_volume: f64,
    /// Factor applied after the configuration -> Fourier transform
    pub forward_norm: f64,
    /// Factor applied after the Fourier -> configuration transform
    pub inverse_norm: f64,
    pub grid_dims: (usize, usize, usize),
    pub total_cells: usize,
}

impl GridGeometry {
    /// Derive the geometry of a box.
    ///
    /// # Arguments
    /// * `box_lengths` - Physical box size per axis, all positive
    /// * `grid_count` - Cells along the longest axis, at least 1
    /// * `cube_mode` - Use a cube of the longest side as the transform box
    pub fn new(box_lengths: [f64; 3], grid_count: usize, cube_mode: bool) -> Result<Self> {
        validate_box(box_lengths, grid_count)?;

        let max_box_length = box_lengths.iter().copied().fold(f64::MIN, f64::max);
        let grid_spacing = max_box_length / grid_count as f64;
        let nyquist_wavenumber = PI / grid_spacing;

        let transform_box_lengths = if cube_mode {
            [max_box_length; 3]
        } else {
            box_lengths
        };
        let fundamental_wavenumber = transform_box_lengths.map(|l| 2.0 * PI / l);

        let survey_volume = box_lengths.iter().product::<f64>();
        let transform_volume = transform_box_lengths.iter().product::<f64>();

        let [nx, ny, nz] = transform_box_lengths.map(|l| cells_along(l, grid_spacing));

        Ok(Self {
            box_lengths,
            grid_count,
            cube_mode,
            max_box_length,
            max_cube_volume: max_box_length.powi(3),
            grid_spacing,
            cell_volume: grid_spacing.powi(3),
            nyquist_wavenumber,
            sampling_wavenumber: 2.0 * nyquist_wavenumber,
            transform_box_lengths,
            fundamental_wavenumber,
            survey_volume,
            transform_volume,
            forward_norm: transform_volume,
            inverse_norm: 1.0 / transform_volume,
            grid_dims: (nx, ny, nz),
            total_cells: nx * ny * nz,
        })
    }

    /// Grid dims as an array, handy for per-axis loops.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        let (nx, ny, nz) = self.grid_dims;
        [nx, ny, nz]
    }
}

/// Check the inputs shared by [`GridGeometry::new`] and config validation.
pub fn validate_box(box_lengths: [f64; 3], grid_count: usize) -> Result<()> {
    for (axis, &len) in ["x", "y", "z"].iter().zip(box_lengths.iter()) {
        if !(len.is_finite() && len > 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "box length along {axis} must be positive and finite, got {len}"
            )));
        }
    }
    if grid_count == 0 {
        return Err(GridError::InvalidConfig(
            "grid_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// ceil(length / spacing), snapping ratios that sit on an integer up to
/// a few ulps of division error.
fn cells_along(length: f64, spacing: f64) -> usize {
    let ratio = length / spacing;
    let nearest = ratio.round();
    let slack = CEIL_SNAP_ULPS * f64::EPSILON * nearest.max(1.0);
    let cells = if (ratio - nearest).abs() <= slack {
        nearest
    } else {
        ratio.ceil()
    };
    (cells as usize).max(1)
}
