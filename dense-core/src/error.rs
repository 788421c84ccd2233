use thiserror::Error;

/// Failure reported by a numerical kernel.
///
/// `Breakdown` is the only structured outcome: the factorization stopped at
/// `step` (1-indexed). What a breakdown means depends on the routine (zero
/// pivot for LU, non-positive leading minor for Cholesky), so the solvers
/// translate it; everything else is passed through untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("factorization broke down at step {step}")]
    Breakdown { step: usize },

    #[error("{routine}: argument {position} had an illegal value")]
    IllegalArgument {
        routine: &'static str,
        position: usize,
    },

    #[error("kernel failure: {0}")]
    Failed(String),
}

/// Errors reported by the dense solvers and the matrix handles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Matrix is singular: zero pivot at row {index}")]
    SingularMatrix { index: usize },

    #[error("Matrix is not positive definite: leading minor of order {index} is not positive")]
    NotPositiveDefinite { index: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Kernel failure: {0}")]
    KernelFailure(#[from] KernelError),
}

pub type Result<T> = core::result::Result<T, LinalgError>;
