use dense_core::{KernelError, LinalgError, MatrixMut, Result, Scalar, StorageOrder, Uplo};
use log::{debug, warn};

use super::SolveOptions;
use crate::kernel::{DenseKernel, ReferenceKernel};
use crate::validate;

/// Solves `A·X = B` for a symmetric (Hermitian) positive-definite `A` by Cholesky factorization.
///
/// Only the `uplo` triangle of `A` is read, and only that triangle is
/// overwritten with the factor. Positive-definiteness is not checked up
/// front; the factorization discovers it.
#[derive(Debug, Clone, Default)]
pub struct SpdSolver<K = ReferenceKernel> {
    kernel: K,
    options: SolveOptions,
}

impl<K> SpdSolver<K> {
    /// Creates a solver over `kernel` with default options.
    pub fn new(kernel: K) -> Self {
        Self::with_options(kernel, SolveOptions::default())
    }

    pub fn with_options(kernel: K, options: SolveOptions) -> Self {
        Self { kernel, options }
    }

    /// Factors the `uplo` triangle of `a` and overwrites `b` with the solution.
    ///
    /// Errors as [`GeneralSolver::solve`](super::GeneralSolver::solve), except
    /// that a breakdown is reported as `NotPositiveDefinite { index }`, the
    /// order of the first leading minor that is not positive.
    pub fn solve<T>(
        &self,
        order: StorageOrder,
        uplo: Uplo,
        n: usize,
        nrhs: usize,
        mut a: MatrixMut<'_, T>,
        mut b: MatrixMut<'_, T>,
    ) -> Result<()>
    where
        T: Scalar,
        K: DenseKernel<T>,
    {
        validate::check_system(order, n, nrhs, &a, &b)?;
        if self.options.check_finite {
            validate::check_finite_spd(uplo, &a.rb(), &b.rb())?;
        }
        if n == 0 {
            return Ok(());
        }

        debug!(
            "Cholesky solve: n = {}, nrhs = {}, order = {:?}, uplo = {:?}, dtype = {}",
            n,
            nrhs,
            order,
            uplo,
            T::ELEMENT_TYPE
        );

        self.kernel
            .factor_spd(uplo, a.rb_mut())
            .map_err(|e| match e {
                KernelError::Breakdown { step } => {
                    warn!(
                        "Cholesky factorization failed: leading minor of order {} is not positive",
                        step
                    );
                    LinalgError::NotPositiveDefinite { index: step }
                }
                other => LinalgError::KernelFailure(other),
            })?;

        self.kernel.solve_spd(uplo, a.rb(), b.rb_mut())?;

        debug!("Cholesky solve finished for {} right-hand side(s)", nrhs);
        Ok(())
    }
}

/// Solves the SPD system `A·X = B` over raw buffers with explicit leading dimensions.
///
/// Only the `uplo` triangle of `a` is referenced.
#[allow(clippy::too_many_arguments)]
pub fn solve_spd_system<T, K>(
    kernel: &K,
    order: StorageOrder,
    uplo: Uplo,
    n: usize,
    nrhs: usize,
    a: &mut [T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> Result<()>
where
    T: Scalar,
    K: DenseKernel<T> + ?Sized,
{
    let a = MatrixMut::from_slice(a, n, n, lda, order)?;
    let b = MatrixMut::from_slice(b, n, nrhs, ldb, order)?;
    SpdSolver::new(kernel).solve(order, uplo, n, nrhs, a, b)
}

/// Same as [`solve_spd_system`] with `order` (101/102) and `uplo` (121/122) given as CBLAS codes.
///
/// A code that names neither triangle is rejected with `InvalidArgument`
/// before any buffer is looked at.
#[allow(clippy::too_many_arguments)]
pub fn solve_spd_system_raw<T, K>(
    kernel: &K,
    order: i32,
    uplo: i32,
    n: usize,
    nrhs: usize,
    a: &mut [T],
    lda: usize,
    b: &mut [T],
    ldb: usize,
) -> Result<()>
where
    T: Scalar,
    K: DenseKernel<T> + ?Sized,
{
    let order = StorageOrder::try_from(order)?;
    let uplo = Uplo::try_from(uplo)?;
    solve_spd_system(kernel, order, uplo, n, nrhs, a, lda, b, ldb)
}
