//! GridField-Core: scalar fields on a periodic 3D grid
//!
//! This crate provides the grid primitive used by Fourier-space clustering
//! estimators: box geometry, wavenumber grids, line-of-sight projection and
//! volume-normalized forward/inverse transforms.
//!
//! # Modules
//! - `config`: Construction parameters (serde)
//! - `geometry`: Spacing, cell counts, volumes, Nyquist and fundamental wavenumbers
//! - `grid`: Index grids and magnitude grids in both spaces
//! - `los`: Line-of-sight projection grids
//! - `fft`: 3D FFT engine trait and rustfft implementation
//! - `field`: `GridField`, tying it all together
//!
//! # Example
//! ```
//! use gridfield_core::{GridConfig, GridField};
//! use ndarray::Array3;
//!
//! let mut field = GridField::new(GridConfig::new([100.0, 100.0, 100.0], 8)).unwrap();
//! let density = Array3::<f64>::ones(field.dims());
//! let delta_k = field.forward_real(&density, Some(1)).unwrap();
//! field.set_los([0.0, 0.0, 1.0]).unwrap();
//! assert_eq!(delta_k.dim(), (8, 8, 8));
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod geometry;

// Grids and projections
pub mod grid;
pub mod los;

// Transforms
pub mod fft;
pub mod field;

pub use config::GridConfig;
pub use error::{FftError, GridError, Result};
pub use fft::{FftEngine, RustFftEngine};
pub use field::GridField;
pub use geometry::GridGeometry;
pub use grid::{CoordinateGrids, MAGNITUDE_GUARD};
pub use los::{LosProjection, LosState};
