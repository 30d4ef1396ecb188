//! Construction parameters for a [`GridField`](crate::field::GridField)

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::geometry::validate_box;
use crate::grid::MAGNITUDE_GUARD;

/// User-facing grid configuration.
///
/// Deserializes from JSON such as
/// `{"box_lengths": [100.0, 100.0, 100.0], "grid_count": 64}`; omitted fields
/// take their defaults (cubic transform box, all cores, standard guard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Physical box size along x, y, z
    pub box_lengths: [f64; 3],
    /// Number of cells along the longest axis
    pub grid_count: usize,
    /// Pad the transform box to a cube of the longest side (default: true)
    #[serde(default = "default_cube_mode")]
    pub cube_mode: bool,
    /// FFT worker threads. `None` uses every available core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Offset added to every magnitude grid (default: 1e-20)
    #[serde(default = "default_magnitude_guard")]
    pub magnitude_guard: f64,
}

fn default_cube_mode() -> bool {
    true
}

fn default_magnitude_guard() -> f64 {
    MAGNITUDE_GUARD
}

impl GridConfig {
    pub fn new(box_lengths: [f64; 3], grid_count: usize) -> Self {
        Self {
            box_lengths,
            grid_count,
            cube_mode: default_cube_mode(),
            threads: None,
            magnitude_guard: default_magnitude_guard(),
        }
    }

    pub fn with_cube_mode(mut self, cube_mode: bool) -> Self {
        self.cube_mode = cube_mode;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Override the DC-cell guard. Zero disables it.
    pub fn with_magnitude_guard(mut self, guard: f64) -> Self {
        self.magnitude_guard = guard;
        self
    }

    /// Check every parameter without building any grids.
    pub fn validate(&self) -> Result<()> {
        validate_box(self.box_lengths, self.grid_count)?;
        if self.threads == Some(0) {
            return Err(GridError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }
        if !(self.magnitude_guard.is_finite() && self.magnitude_guard >= 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "magnitude guard must be finite and non-negative, got {}",
                self.magnitude_guard
            )));
        }
        Ok(())
    }

    /// Thread count handed to the FFT engine when a call gives no hint.
    pub fn resolved_threads(&self) -> usize {
        self.threads.unwrap_or_else(available_threads)
    }
}

/// Number of processor cores visible to this process, at least 1.
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
