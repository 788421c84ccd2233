use crate::layout::StorageOrder;
use crate::scalar::Scalar;
use std::fmt::Debug;

/// Generic trait representing a dense matrix.
/// Implemented by borrowed strided views and by owned buffers alike.
pub trait Matrix: Debug {
    /// The underlying numeric type of the matrix elements.
    type Value: Scalar;

    /// Returns the dimensions of the matrix as (rows, columns).
    fn dims(&self) -> (usize, usize);

    /// Storage order of the underlying buffer.
    fn order(&self) -> StorageOrder;

    /// Stride between consecutive rows (row-major) or columns (column-major).
    fn leading_dim(&self) -> usize;

    /// Returns the number of rows.
    fn rows(&self) -> usize {
        self.dims().0
    }

    /// Returns the number of columns.
    fn cols(&self) -> usize {
        self.dims().1
    }

    /// Checks if the matrix is square.
    fn is_square(&self) -> bool {
        let (rows, cols) = self.dims();
        rows == cols
    }
}
