//! Input checks shared by both solvers.
//!
//! Everything here runs before the first kernel call, so a rejected system
//! leaves both buffers untouched.

use dense_core::{LinalgError, Matrix, MatrixRef, Result, Scalar, StorageOrder, Uplo};

/// Checks that `a` is an `n x n` and `b` an `n x nrhs` matrix, both laid out in `order`.
///
/// Leading dimensions were already checked when the handles were built.
pub(crate) fn check_system<T: Scalar>(
    order: StorageOrder,
    n: usize,
    nrhs: usize,
    a: &impl Matrix<Value = T>,
    b: &impl Matrix<Value = T>,
) -> Result<()> {
    for (name, m) in [("A", a.order()), ("B", b.order())] {
        if m != order {
            return Err(LinalgError::InvalidArgument(format!(
                "{} is stored {:?} but the system was declared {:?}",
                name, m, order
            )));
        }
    }
    if a.dims() != (n, n) {
        return Err(LinalgError::DimensionMismatch(format!(
            "Matrix A must be {}x{} (dims: {}x{})",
            n,
            n,
            a.rows(),
            a.cols()
        )));
    }
    if b.rows() != n {
        return Err(LinalgError::DimensionMismatch(format!(
            "Matrix A rows ({}) must match B rows ({})",
            n,
            b.rows()
        )));
    }
    if b.cols() != nrhs {
        return Err(LinalgError::DimensionMismatch(format!(
            "Matrix B must have {} columns (got {})",
            nrhs,
            b.cols()
        )));
    }
    Ok(())
}

fn first_non_finite<T: Scalar>(
    m: &MatrixRef<'_, T>,
    keep: impl Fn(usize, usize) -> bool,
) -> Option<(usize, usize)> {
    for j in 0..m.cols() {
        for i in 0..m.rows() {
            if keep(i, j) && !m.at(i, j).is_finite() {
                return Some((i, j));
            }
        }
    }
    None
}

fn non_finite_error(name: &str, (i, j): (usize, usize)) -> LinalgError {
    LinalgError::InvalidArgument(format!(
        "{} contains a non-finite value at ({}, {})",
        name, i, j
    ))
}

/// Rejects NaN/Inf anywhere in `a` or `b`.
pub(crate) fn check_finite_general<T: Scalar>(
    a: &MatrixRef<'_, T>,
    b: &MatrixRef<'_, T>,
) -> Result<()> {
    if let Some(pos) = first_non_finite(a, |_, _| true) {
        return Err(non_finite_error("A", pos));
    }
    if let Some(pos) = first_non_finite(b, |_, _| true) {
        return Err(non_finite_error("B", pos));
    }
    Ok(())
}

/// Like [`check_finite_general`] but only looks at the `uplo` triangle of `a`.
pub(crate) fn check_finite_spd<T: Scalar>(
    uplo: Uplo,
    a: &MatrixRef<'_, T>,
    b: &MatrixRef<'_, T>,
) -> Result<()> {
    if let Some(pos) = first_non_finite(a, |i, j| uplo.contains(i, j)) {
        return Err(non_finite_error("A", pos));
    }
    if let Some(pos) = first_non_finite(b, |_, _| true) {
        return Err(non_finite_error("B", pos));
    }
    Ok(())
}
