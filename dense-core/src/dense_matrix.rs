use crate::error::{LinalgError, Result};
use crate::layout::StorageOrder;
use crate::matrix::{MatrixMut, MatrixRef};
use crate::scalar::Scalar;
use crate::traits::Matrix;

/// Represents an owned dense matrix stored contiguously (no padding) in either order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T: Scalar> {
    rows: usize,
    cols: usize,
    order: StorageOrder,
    data: Vec<T>,
}

impl<T: Scalar> DenseMatrix<T> {
    /// Creates a new DenseMatrix from raw data laid out in `order`.
    pub fn new(rows: usize, cols: usize, order: StorageOrder, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(LinalgError::DimensionMismatch(format!(
                "Data length ({}) does not match dimensions ({}x{})",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            order,
            data,
        })
    }

    /// Creates a new DenseMatrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize, order: StorageOrder) -> Self {
        Self {
            rows,
            cols,
            order,
            data: vec![T::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize, order: StorageOrder) -> Self {
        Self::from_fn(n, n, order, |i, j| if i == j { T::one() } else { T::zero() })
    }

    /// Creates a matrix whose element `(i, j)` is `f(i, j)`.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        order: StorageOrder,
        mut f: impl FnMut(usize, usize) -> T,
    ) -> Self {
        let mut m = Self::zeros(rows, cols, order);
        for i in 0..rows {
            for j in 0..cols {
                let idx = order.index(i, j, m.ld());
                m.data[idx] = f(i, j);
            }
        }
        m
    }

    /// Builds a matrix from a list of rows, stored in `order`.
    pub fn from_rows(rows: &[Vec<T>], order: StorageOrder) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(LinalgError::DimensionMismatch(format!(
                "Row {} has {} entries, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        Ok(Self::from_fn(rows.len(), cols, order, |i, j| rows[i][j]))
    }

    fn ld(&self) -> usize {
        self.order.min_leading_dim(self.rows, self.cols)
    }

    /// Returns a slice view of the underlying data vector.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns a mutable slice view of the underlying data vector.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Gets the element at the specified row and column.
    /// Returns None if indices are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            self.data.get(self.order.index(row, col, self.ld())).copied()
        } else {
            None
        }
    }

    /// Gets the element at the specified row and column (mutable).
    /// Returns None if indices are out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            let idx = self.order.index(row, col, self.ld());
            self.data.get_mut(idx)
        } else {
            None
        }
    }

    pub fn view(&self) -> MatrixRef<'_, T> {
        let ld = self.ld();
        MatrixRef::new_unchecked(&self.data, self.rows, self.cols, ld, self.order)
    }

    pub fn view_mut(&mut self) -> MatrixMut<'_, T> {
        let ld = self.ld();
        MatrixMut::new_unchecked(&mut self.data, self.rows, self.cols, ld, self.order)
    }

    /// Naive product `self · rhs`, stored in `self`'s order.
    pub fn matmul(&self, rhs: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        if self.cols != rhs.rows {
            return Err(LinalgError::DimensionMismatch(format!(
                "Cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        let (lhs, rhs_view) = (self.view(), rhs.view());
        Ok(Self::from_fn(self.rows, rhs.cols, self.order, |i, j| {
            (0..self.cols).fold(T::zero(), |acc, k| acc + lhs.at(i, k) * rhs_view.at(k, j))
        }))
    }

    /// Copies the matrix into `order`.
    pub fn to_order(&self, order: StorageOrder) -> DenseMatrix<T> {
        let src = self.view();
        Self::from_fn(self.rows, self.cols, order, |i, j| src.at(i, j))
    }
}

// Implement the generic Matrix trait
impl<T: Scalar> Matrix for DenseMatrix<T> {
    type Value = T;

    fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn order(&self) -> StorageOrder {
        self.order
    }

    fn leading_dim(&self) -> usize {
        self.ld()
    }
}
