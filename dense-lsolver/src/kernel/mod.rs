//! Numerical kernel interface.
//!
//! The solvers never factor anything themselves: they validate their inputs
//! and then drive the four primitives below. Any LAPACK-like backend can sit
//! behind this trait; [`ReferenceKernel`] is the one shipped with the crate.
//!
//! Every handle passed to a kernel has already been checked for shape,
//! storage order and leading dimension by the caller.

use dense_core::{KernelError, Matrix, MatrixMut, MatrixRef, Scalar, Transpose, Uplo};

#[cfg(feature = "faer")]
pub mod faer;
pub mod reference;

#[cfg(feature = "faer")]
pub use self::faer::FaerKernel;
pub use reference::ReferenceKernel;

/// Row interchanges recorded by an LU factorization.
///
/// `as_slice()[k]` is the 0-indexed row swapped with row `k` at step `k`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PivotSequence {
    ipiv: Vec<usize>,
}

impl PivotSequence {
    pub fn new(ipiv: Vec<usize>) -> Self {
        Self { ipiv }
    }

    pub fn len(&self) -> usize {
        self.ipiv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ipiv.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.ipiv
    }

    /// 1-indexed pivots, as LAPACK `ipiv` reports them.
    pub fn to_lapack(&self) -> Vec<usize> {
        self.ipiv.iter().map(|&p| p + 1).collect()
    }
}

pub(crate) fn ensure_square(routine: &'static str, a: &impl Matrix) -> Result<usize, KernelError> {
    if !a.is_square() {
        return Err(KernelError::IllegalArgument {
            routine,
            position: 1,
        });
    }
    Ok(a.rows())
}

pub(crate) fn ensure_rhs(routine: &'static str, n: usize, b: &impl Matrix) -> Result<(), KernelError> {
    if b.rows() != n {
        return Err(KernelError::IllegalArgument {
            routine,
            position: 2,
        });
    }
    Ok(())
}

pub(crate) fn ensure_pivots(
    routine: &'static str,
    n: usize,
    pivots: &PivotSequence,
) -> Result<(), KernelError> {
    if pivots.len() != n || pivots.as_slice().iter().enumerate().any(|(k, &p)| p < k || p >= n) {
        return Err(KernelError::IllegalArgument {
            routine,
            position: 3,
        });
    }
    Ok(())
}

/// Trait representing a dense factorization/solve backend for element type `T`.
///
/// Both factorizations work in place and report structural breakdown as
/// [`KernelError::Breakdown`] with a 1-indexed step.
pub trait DenseKernel<T: Scalar> {
    /// LU factorization with partial pivoting, `P·A = L·U`, of a square `A`.
    fn factor_general(&self, a: MatrixMut<'_, T>) -> Result<PivotSequence, KernelError>;

    /// Solves `op(A)·X = B` in place using the output of [`factor_general`](Self::factor_general).
    fn solve_general(
        &self,
        trans: Transpose,
        a: MatrixRef<'_, T>,
        pivots: &PivotSequence,
        b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError>;

    /// Cholesky factorization of the `uplo` triangle: `A = Uᴴ·U` or `A = L·Lᴴ`.
    fn factor_spd(&self, uplo: Uplo, a: MatrixMut<'_, T>) -> Result<(), KernelError>;

    /// Solves `A·X = B` in place using the output of [`factor_spd`](Self::factor_spd).
    fn solve_spd(
        &self,
        uplo: Uplo,
        a: MatrixRef<'_, T>,
        b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError>;
}

impl<T: Scalar, K: DenseKernel<T> + ?Sized> DenseKernel<T> for &K {
    fn factor_general(&self, a: MatrixMut<'_, T>) -> Result<PivotSequence, KernelError> {
        (**self).factor_general(a)
    }

    fn solve_general(
        &self,
        trans: Transpose,
        a: MatrixRef<'_, T>,
        pivots: &PivotSequence,
        b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        (**self).solve_general(trans, a, pivots, b)
    }

    fn factor_spd(&self, uplo: Uplo, a: MatrixMut<'_, T>) -> Result<(), KernelError> {
        (**self).factor_spd(uplo, a)
    }

    fn solve_spd(
        &self,
        uplo: Uplo,
        a: MatrixRef<'_, T>,
        b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        (**self).solve_spd(uplo, a, b)
    }
}
