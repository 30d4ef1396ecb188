//! Scalar field container on a periodic 3D grid
//!
//! [`GridField`] bundles the box geometry, the coordinate grids and the
//! line-of-sight cache, and moves fields between configuration space and
//! Fourier space with volume normalization.
//!
//! # Transform convention
//!
//! With `V` the transform box volume and `N` the number of cells:
//!
//! ```text
//! forward:  F(k) = (V/N) Σ_x f(x) exp(+i k·x)   // engine inverse_transform_3d (1/N) × V
//! inverse:  f(x) = (1/V) Σ_k F(k) exp(-i k·x)   // engine transform_3d × 1/V
//! ```
//!
//! so `inverse(forward(f)) == f` and `forward` approximates the continuum
//! integral `∫ d³x f(x) e^{+ik·x}`.

use ndarray::{Array3, ShapeBuilder};
use num_complex::Complex64;
use tracing::{debug, instrument};

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::fft::{FftEngine, RustFftEngine};
use crate::geometry::GridGeometry;
use crate::grid::CoordinateGrids;
use crate::los::{LosProjection, LosState};

/// A periodic 3D grid with its Fourier-space bookkeeping.
#[derive(Debug)]
pub struct GridField<E: FftEngine = RustFftEngine> {
    config: GridConfig,
    geometry: GridGeometry,
    grids: CoordinateGrids,
    los: LosState,
    threads: usize,
    engine: E,
}

impl GridField<RustFftEngine> {
    /// Build a field grid with the default rustfft engine.
    pub fn new(config: GridConfig) -> Result<Self> {
        Self::with_engine(config, RustFftEngine::new())
    }

    /// Shorthand for `GridField::new(GridConfig::new(..).with_cube_mode(..))`.
    pub fn from_box(box_lengths: [f64; 3], grid_count: usize, cube_mode: bool) -> Result<Self> {
        Self::new(GridConfig::new(box_lengths, grid_count).with_cube_mode(cube_mode))
    }
}

impl<E: FftEngine> GridField<E> {
    /// Build a field grid that delegates transforms to `engine`.
    pub fn with_engine(config: GridConfig, engine: E) -> Result<Self> {
        config.validate()?;
        let geometry = GridGeometry::new(config.box_lengths, config.grid_count, config.cube_mode)?;
        let grids = CoordinateGrids::build(&geometry, config.magnitude_guard);
        let threads = config.resolved_threads();

        debug!(
            dims = ?geometry.grid_dims,
            spacing = geometry.grid_spacing,
            cube_mode = geometry.cube_mode,
            threads,
            "grid field constructed"
        );

        Ok(Self {
            config,
            geometry,
            grids,
            los: LosState::Unset,
            threads,
            engine,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn grids(&self) -> &CoordinateGrids {
        &self.grids
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.geometry.grid_dims
    }

    /// Thread count used when a transform call gives no hint.
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn wavenumber_grid(&self) -> &Array3<f64> {
        &self.grids.wavenumber
    }

    pub fn freq_count_grid(&self) -> &Array3<f64> {
        &self.grids.freq_count
    }

    pub fn radial_grid(&self) -> &Array3<f64> {
        &self.grids.radial
    }

    /// Transform backend; holds its plan and thread-pool caches.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn los_state(&self) -> &LosState {
        &self.los
    }

    /// The cached projection, if a direction has been set.
    pub fn los(&self) -> Option<&LosProjection> {
        self.los.projection()
    }

    /// Set the line-of-sight direction and recompute the projection grids.
    ///
    /// `direction` need not be normalized. On a zero-norm direction the
    /// previous projection is kept and `InvalidDirection` is returned.
    pub fn set_los(&mut self, direction: [f64; 3]) -> Result<()> {
        let projection = LosProjection::compute(&self.geometry, &self.grids, direction)?;
        debug!(direction = ?projection.direction, "line-of-sight projection updated");
        self.los = LosState::Projected(projection);
        Ok(())
    }

    /// Configuration space -> Fourier space.
    ///
    /// The input is copied; `threads` overrides the configured worker count.
    #[instrument(skip_all, fields(dims = ?self.geometry.grid_dims))]
    pub fn forward(&self, field: &Array3<Complex64>, threads: Option<usize>) -> Result<Array3<Complex64>> {
        let threads = self.check_call(field.dim(), threads)?;
        let mut buf = to_column_major(field);
        debug!(threads, "forward transform");
        self.engine
            .inverse_transform_3d(&mut buf, self.geometry.grid_dims, threads)?;
        let norm = self.geometry.forward_norm;
        buf.iter_mut().for_each(|v| *v *= norm);
        self.field_from_buffer(buf)
    }

    /// Fourier space -> configuration space.
    ///
    /// The input is copied; `threads` overrides the configured worker count.
    #[instrument(skip_all, fields(dims = ?self.geometry.grid_dims))]
    pub fn inverse(&self, field: &Array3<Complex64>, threads: Option<usize>) -> Result<Array3<Complex64>> {
        let threads = self.check_call(field.dim(), threads)?;
        let mut buf = to_column_major(field);
        debug!(threads, "inverse transform");
        self.engine
            .transform_3d(&mut buf, self.geometry.grid_dims, threads)?;
        let norm = self.geometry.inverse_norm;
        buf.iter_mut().for_each(|v| *v *= norm);
        self.field_from_buffer(buf)
    }

    /// [`forward`](Self::forward) for a real-valued configuration-space field.
    pub fn forward_real(&self, field: &Array3<f64>, threads: Option<usize>) -> Result<Array3<Complex64>> {
        self.check_shape(field.dim())?;
        let complex = field.mapv(|v| Complex64::new(v, 0.0));
        self.forward(&complex, threads)
    }

    /// [`inverse`](Self::inverse) keeping only the real part.
    pub fn inverse_real(&self, field: &Array3<Complex64>, threads: Option<usize>) -> Result<Array3<f64>> {
        Ok(self.inverse(field, threads)?.mapv(|c| c.re))
    }

    fn check_shape(&self, found: (usize, usize, usize)) -> Result<()> {
        let expected = self.geometry.grid_dims;
        if found != expected {
            return Err(GridError::ShapeMismatch { expected, found });
        }
        Ok(())
    }

    fn check_call(&self, found: (usize, usize, usize), threads: Option<usize>) -> Result<usize> {
        self.check_shape(found)?;
        match threads {
            Some(0) => Err(GridError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(self.threads),
        }
    }

    fn field_from_buffer(&self, buf: Vec<Complex64>) -> Result<Array3<Complex64>> {
        let found = buf.len();
        Array3::from_shape_vec(self.geometry.grid_dims.f(), buf).map_err(|_| {
            GridError::ShapeMismatch {
                expected: self.geometry.grid_dims,
                found: (found, 1, 1),
            }
        })
    }
}

/// Copy into a flat buffer ordered `i + j*nx + k*nx*ny`.
fn to_column_major(field: &Array3<Complex64>) -> Vec<Complex64> {
    // reversed axes iterate with i fastest
    field.t().iter().copied().collect()
}
