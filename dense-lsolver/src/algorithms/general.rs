use dense_core::{
    KernelError, LinalgError, MatrixMut, Result, Scalar, StorageOrder, Transpose,
};
use log::{debug, warn};

use super::SolveOptions;
use crate::kernel::{DenseKernel, PivotSequence, ReferenceKernel};
use crate::validate;

/// Metadata about a successful general solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralSolveInfo {
    /// Row interchanges of the LU factorization now stored in `A`.
    pub pivots: PivotSequence,
}

/// Solves `A·X = B` for a general square `A` by LU factorization with partial pivoting.
///
/// On success `A` holds `L` (unit diagonal, not stored) and `U`, and `B`
/// holds `X`. Callers that still need the original `A` must copy it first.
#[derive(Debug, Clone, Default)]
pub struct GeneralSolver<K = ReferenceKernel> {
    kernel: K,
    options: SolveOptions,
}

impl<K> GeneralSolver<K> {
    /// Creates a solver over `kernel` with default options.
    pub fn new(kernel: K) -> Self {
        Self::with_options(kernel, SolveOptions::default())
    }

    pub fn with_options(kernel: K, options: SolveOptions) -> Self {
        Self { kernel, options }
    }

    /// Factors `a` and overwrites `b` with the solution.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` if either handle is not stored in `order`, or if
    ///   `check_finite` is set and an input holds NaN/Inf.
    /// * `DimensionMismatch` if `a` is not `n x n` or `b` is not `n x nrhs`.
    /// * `SingularMatrix { index }` if the factorization meets a zero pivot.
    ///   `a` is then partially factored and `b` is untouched.
    /// * `KernelFailure` for anything else the kernel reports.
    pub fn solve<T>(
        &self,
        order: StorageOrder,
        n: usize,
        nrhs: usize,
        mut a: MatrixMut<'_, T>,
        mut b: MatrixMut<'_, T>,
    ) -> Result<GeneralSolveInfo>
    where
        T: Scalar,
        K: DenseKernel<T>,
    {
        validate::check_system(order, n, nrhs, &a, &b)?;
        if self.options.check_finite {
            validate::check_finite_general(&a.rb(), &b.rb())?;
        }
        if n == 0 {
            return Ok(GeneralSolveInfo {
                pivots: PivotSequence::default(),
            });
        }

        debug!(
            "LU solve: n = {}, nrhs = {}, order = {:?}, dtype = {}",
            n,
            nrhs,
            order,
            T::ELEMENT_TYPE
        );

        let pivots = self
            .kernel
            .factor_general(a.rb_mut())
            .map_err(|e| match e {
                KernelError::Breakdown { step } => {
                    warn!("LU factorization hit a zero pivot at row {}", step);
                    LinalgError::SingularMatrix { index: step }
                }
                other => LinalgError::KernelFailure(other),
            })?;

        self.kernel
            .solve_general(Transpose::NoTrans, a.rb(), &pivots, b.rb_mut())?;

        debug!("LU solve finished for {} right-hand side(s)", nrhs);
        Ok(GeneralSolveInfo { pivots })
    }
}

/// Solves `A·X = B` over raw buffers with explicit leading dimensions.
///
/// `a` holds the `n x n` matrix with stride `lda`, `b` the `n x nrhs`
/// right-hand sides with stride `ldb`, both in `order`. Both buffers are
/// overwritten as described on [`GeneralSolver::solve`].
#[allow(clippy::too_many_arguments)]
pub fn solve_general_system<T, K>(
    kernel: &K,
    order: StorageOrder,
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
    GeneralSolver::new(kernel)
        .solve(order, n, nrhs, a, b)
        .map(|_| ())
}

/// Same as [`solve_general_system`] with the storage order given as a CBLAS code (101/102).
#[allow(clippy::too_many_arguments)]
pub fn solve_general_system_raw<T, K>(
    kernel: &K,
    order: i32,
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
    solve_general_system(kernel, order, n, nrhs, a, lda, b, ldb)
}
