//! Error types for grid construction, line-of-sight projection and transforms

use thiserror::Error;

/// Failures raised by an [`FftEngine`](crate::fft::FftEngine).
#[derive(Error, Debug)]
pub enum FftError {
    #[error("buffer holds {found} values but dims {dims:?} need {expected}")]
    LengthMismatch {
        dims: (usize, usize, usize),
        expected: usize,
        found: usize,
    },

    #[error("failed to build FFT thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error("Line-of-sight direction {0:?} has zero norm")]
    InvalidDirection([f64; 3]),

    #[error("Field shape {found:?} does not match grid dims {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error(transparent)]
    Fft(#[from] FftError),
}

pub type Result<T> = std::result::Result<T, GridError>;
