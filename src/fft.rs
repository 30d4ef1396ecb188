//! 3D FFT capability and the default rustfft-backed engine
//!
//! Buffers are flat and column-major: `index = i + j*nx + k*nx*ny`
//! (see [`idx3d`]). Output bins are unshifted, DC at index 0, which lines up
//! with [`wrapped_indices`](crate::grid::wrapped_indices).
//!
//! Conventions (NumPy-compatible):
//! - `transform_3d`: exponent `-i`, unnormalized (`numpy.fft.fftn`)
//! - `inverse_transform_3d`: exponent `+i`, scaled by `1/N` (`numpy.fft.ifftn`)

use num_complex::Complex64;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use rustfft::{Fft, FftDirection, FftPlanner};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::error::FftError;

/// A black-box 3D discrete Fourier transform over a rectangular buffer.
pub trait FftEngine: Send + Sync {
    /// In-place forward 3D DFT (exponent `-i`, no normalization).
    fn transform_3d(
        &self,
        data: &mut [Complex64],
        dims: (usize, usize, usize),
        threads: usize,
    ) -> Result<(), FftError>;

    /// In-place inverse 3D DFT (exponent `+i`, normalized by `1/N`).
    fn inverse_transform_3d(
        &self,
        data: &mut [Complex64],
        dims: (usize, usize, usize),
        threads: usize,
    ) -> Result<(), FftError>;
}

/// Index into a 3D array stored in Fortran order (column-major)
/// index = x + y*nx + z*nx*ny
#[inline(always)]
pub fn idx3d(i: usize, j: usize, k: usize, nx: usize, ny: usize) -> usize {
    i + j * nx + k * nx * ny
}

/// rustfft engine; independent 1D lines run in parallel on a rayon pool.
///
/// Plans are cached per `(dims, direction)` and thread pools per thread
/// count, so repeated transforms of one grid only pay for the butterflies.
#[derive(Default)]
pub struct RustFftEngine {
    plans: Mutex<HashMap<PlanKey, Arc<Fft3dPlan>>>,
    pools: Mutex<HashMap<usize, Arc<ThreadPool>>>,
}

/// (dims, is_inverse)
type PlanKey = ((usize, usize, usize), bool);

impl fmt::Debug for RustFftEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustFftEngine")
            .field("cached_plans", &self.cached_plans())
            .field("cached_pools", &self.cached_pools())
            .finish()
    }
}

/// A poisoned cache is still a valid cache.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RustFftEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct `(dims, direction)` plans built so far.
    pub fn cached_plans(&self) -> usize {
        lock(&self.plans).len()
    }

    /// Number of distinct thread pools built so far.
    pub fn cached_pools(&self) -> usize {
        lock(&self.pools).len()
    }

    fn plan(&self, dims: (usize, usize, usize), direction: FftDirection) -> Arc<Fft3dPlan> {
        let key = (dims, direction == FftDirection::Inverse);
        let mut plans = lock(&self.plans);
        let plan = plans.entry(key).or_insert_with(|| {
            trace!(?dims, ?direction, "planning 3d fft");
            Arc::new(Fft3dPlan::new(dims, direction))
        });
        Arc::clone(plan)
    }

    fn pool(&self, threads: usize) -> Result<Arc<ThreadPool>, FftError> {
        let threads = threads.max(1);
        let mut pools = lock(&self.pools);
        if let Some(pool) = pools.get(&threads) {
            return Ok(Arc::clone(pool));
        }
        trace!(threads, "building fft thread pool");
        let pool = Arc::new(ThreadPoolBuilder::new().num_threads(threads).build()?);
        pools.insert(threads, Arc::clone(&pool));
        Ok(pool)
    }

    fn run(
        &self,
        data: &mut [Complex64],
        dims: (usize, usize, usize),
        threads: usize,
        direction: FftDirection,
    ) -> Result<(), FftError> {
        let expected = dims.0 * dims.1 * dims.2;
        if data.len() != expected {
            return Err(FftError::LengthMismatch {
                dims,
                expected,
                found: data.len(),
            });
        }
        if expected == 0 {
            return Ok(());
        }

        let plan = self.plan(dims, direction);
        let pool = self.pool(threads)?;
        pool.install(|| {
            plan.process(data);
            if direction == FftDirection::Inverse {
                let scale = 1.0 / expected as f64;
                data.par_iter_mut().for_each(|v| *v *= scale);
            }
        });
        Ok(())
    }
}

impl FftEngine for RustFftEngine {
    fn transform_3d(
        &self,
        data: &mut [Complex64],
        dims: (usize, usize, usize),
        threads: usize,
    ) -> Result<(), FftError> {
        self.run(data, dims, threads, FftDirection::Forward)
    }

    fn inverse_transform_3d(
        &self,
        data: &mut [Complex64],
        dims: (usize, usize, usize),
        threads: usize,
    ) -> Result<(), FftError> {
        self.run(data, dims, threads, FftDirection::Inverse)
    }
}

/// Per-axis plans for one direction and one set of dims
struct Fft3dPlan {
    nx: usize,
    ny: usize,
    nz: usize,
    fft_x: Arc<dyn Fft<f64>>,
    fft_y: Arc<dyn Fft<f64>>,
    fft_z: Arc<dyn Fft<f64>>,
}

impl Fft3dPlan {
    fn new((nx, ny, nz): (usize, usize, usize), direction: FftDirection) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            nx,
            ny,
            nz,
            fft_x: planner.plan_fft(nx, direction),
            fft_y: planner.plan_fft(ny, direction),
            fft_z: planner.plan_fft(nz, direction),
        }
    }

    /// Unnormalized in-place transform along x, then y, then z.
    /// Must run inside the target rayon pool.
    fn process(&self, data: &mut [Complex64]) {
        let (nx, ny, nz) = (self.nx, self.ny, self.nz);
        let plane = nx * ny;
        let zero = Complex64::new(0.0, 0.0);

        // x-axis: contiguous lines
        trace!(len = nx, lines = ny * nz, "fft pass x");
        let scratch_len = self.fft_x.get_inplace_scratch_len();
        data.par_chunks_mut(nx).for_each_init(
            || vec![zero; scratch_len],
            |scratch, line| self.fft_x.process_with_scratch(line, scratch),
        );

        // y-axis: stride nx, every line stays inside one z-plane
        trace!(len = ny, lines = nx * nz, "fft pass y");
        let scratch_len = self.fft_y.get_inplace_scratch_len();
        data.par_chunks_mut(plane).for_each_init(
            || (vec![zero; scratch_len], vec![zero; ny]),
            |(scratch, buffer), slab| {
                for i in 0..nx {
                    for j in 0..ny {
                        buffer[j] = slab[i + j * nx];
                    }
                    self.fft_y.process_with_scratch(buffer, scratch);
                    for j in 0..ny {
                        slab[i + j * nx] = buffer[j];
                    }
                }
            },
        );

        // z-axis: stride nx*ny, lines cross planes so gather then scatter
        trace!(len = nz, lines = plane, "fft pass z");
        let scratch_len = self.fft_z.get_inplace_scratch_len();
        let lines: Vec<Vec<Complex64>> = {
            let src: &[Complex64] = &*data;
            (0..plane)
                .into_par_iter()
                .map_init(
                    || vec![zero; scratch_len],
                    |scratch, ij| {
                        let mut line: Vec<Complex64> = (0..nz).map(|k| src[ij + k * plane]).collect();
                        self.fft_z.process_with_scratch(&mut line, scratch);
                        line
                    },
                )
                .collect()
        };
        for (ij, line) in lines.iter().enumerate() {
            for (k, &v) in line.iter().enumerate() {
                data[ij + k * plane] = v;
            }
        }
    }
}
