//! `dense-lsolver`: direct solvers for dense linear systems `A·X = B`.
//!
//! Two solvers share one pattern: factor `A` in place, then overwrite `B`
//! with the solution.
//!
//! * [`GeneralSolver`] / [`solve_general_system`]: LU with partial pivoting.
//! * [`SpdSolver`] / [`solve_spd_system`]: Cholesky, for symmetric (Hermitian)
//!   positive-definite matrices.
//!
//! The factorization and triangular-solve work is delegated to a
//! [`DenseKernel`]; [`ReferenceKernel`] is the default backend. With the
//! `faer` cargo feature, `FaerKernel` runs the same primitives on `faer`.
//!
//! ```
//! use dense_lsolver::{solve_general_system, ReferenceKernel, StorageOrder};
//!
//! let mut a = vec![4.0f64, 3.0, 6.0, 3.0];
//! let mut b = vec![1.0, 1.0];
//! solve_general_system(&ReferenceKernel, StorageOrder::RowMajor, 2, 1, &mut a, 2, &mut b, 1)?;
//! assert!(b[0].abs() < 1e-12);
//! assert!((b[1] - 1.0 / 3.0).abs() < 1e-12);
//! # Ok::<(), dense_lsolver::LinalgError>(())
//! ```

// Core modules
pub mod algorithms;
pub mod dispatch;
pub mod kernel;
mod validate;

pub use algorithms::{
    solve_general_system, solve_general_system_raw, solve_spd_system, solve_spd_system_raw,
    GeneralSolveInfo, GeneralSolver, SolveOptions, SpdSolver,
};
pub use dispatch::{solve_general_dyn, solve_spd_dyn, AnyKernel, DynMatrixMut};
#[cfg(feature = "faer")]
pub use kernel::FaerKernel;
pub use kernel::{DenseKernel, PivotSequence, ReferenceKernel};

// Re-export from dense_core
pub use dense_core::{
    Complex32, Complex64, DenseMatrix, ElementType, KernelError, LinalgError, Matrix, MatrixMut,
    MatrixRef, Result, Scalar, StorageOrder, Transpose, Uplo,
};
