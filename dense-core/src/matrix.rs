//! Borrowed strided matrix handles.
//!
//! A handle does not own its buffer. It records the logical shape, the
//! storage order and the leading dimension, and it is only constructed once
//! the buffer is known to be large enough for every addressable element.

use crate::error::{LinalgError, Result};
use crate::layout::StorageOrder;
use crate::scalar::Scalar;
use crate::traits::Matrix;

fn check_view(
    len: usize,
    rows: usize,
    cols: usize,
    ld: usize,
    order: StorageOrder,
) -> Result<()> {
    let min_ld = order.min_leading_dim(rows, cols);
    if ld < min_ld {
        return Err(LinalgError::DimensionMismatch(format!(
            "leading dimension ({}) must be at least {} for a {}x{} {:?} matrix",
            ld, min_ld, rows, cols, order
        )));
    }
    let required = order.required_len(rows, cols, ld).ok_or_else(|| {
        LinalgError::DimensionMismatch(format!(
            "a {}x{} matrix with leading dimension {} spans more elements than a buffer can hold",
            rows, cols, ld
        ))
    })?;
    if len < required {
        return Err(LinalgError::DimensionMismatch(format!(
            "buffer length ({}) is smaller than the {} elements spanned by a {}x{} matrix with leading dimension {}",
            len, required, rows, cols, ld
        )));
    }
    Ok(())
}

/// Read-only view of a dense matrix stored in a caller-owned buffer.
#[derive(Debug, Clone, Copy)]
pub struct MatrixRef<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
    ld: usize,
    order: StorageOrder,
}

impl<'a, T: Scalar> MatrixRef<'a, T> {
    /// Creates a view over `data`.
    ///
    /// # Errors
    /// `DimensionMismatch` if `ld` is smaller than the strided dimension or if
    /// `data` is too short for the requested shape.
    pub fn from_slice(
        data: &'a [T],
        rows: usize,
        cols: usize,
        ld: usize,
        order: StorageOrder,
    ) -> Result<Self> {
        check_view(data.len(), rows, cols, ld, order)?;
        Ok(Self {
            data,
            rows,
            cols,
            ld,
            order,
        })
    }

    /// Caller guarantees the shape fits in `data`.
    pub(crate) fn new_unchecked(
        data: &'a [T],
        rows: usize,
        cols: usize,
        ld: usize,
        order: StorageOrder,
    ) -> Self {
        debug_assert!(check_view(data.len(), rows, cols, ld, order).is_ok());
        Self {
            data,
            rows,
            cols,
            ld,
            order,
        }
    }

    /// Element `(i, j)`, or `None` when out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        if i < self.rows && j < self.cols {
            Some(self.data[self.order.index(i, j, self.ld)])
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn at(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[self.order.index(i, j, self.ld)]
    }

    /// The whole backing buffer, padding included.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }
}

/// Mutable view of a dense matrix stored in a caller-owned buffer.
///
/// Holding a `MatrixMut` is what grants a kernel exclusive access to the
/// buffer for the duration of a call.
#[derive(Debug)]
pub struct MatrixMut<'a, T> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    ld: usize,
    order: StorageOrder,
}

impl<'a, T: Scalar> MatrixMut<'a, T> {
    /// Creates a mutable view over `data`. Same validation as [`MatrixRef::from_slice`].
    pub fn from_slice(
        data: &'a mut [T],
        rows: usize,
        cols: usize,
        ld: usize,
        order: StorageOrder,
    ) -> Result<Self> {
        check_view(data.len(), rows, cols, ld, order)?;
        Ok(Self {
            data,
            rows,
            cols,
            ld,
            order,
        })
    }

    /// Caller guarantees the shape fits in `data`.
    pub(crate) fn new_unchecked(
        data: &'a mut [T],
        rows: usize,
        cols: usize,
        ld: usize,
        order: StorageOrder,
    ) -> Self {
        debug_assert!(check_view(data.len(), rows, cols, ld, order).is_ok());
        Self {
            data,
            rows,
            cols,
            ld,
            order,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        self.rb().get(i, j)
    }

    #[inline(always)]
    pub fn at(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[self.order.index(i, j, self.ld)]
    }

    #[inline(always)]
    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut T {
        debug_assert!(i < self.rows && j < self.cols);
        &mut self.data[self.order.index(i, j, self.ld)]
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        *self.at_mut(i, j) = value;
    }

    /// Exchanges rows `r1` and `r2` across every column.
    pub fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 == r2 {
            return;
        }
        for j in 0..self.cols {
            let a = self.order.index(r1, j, self.ld);
            let b = self.order.index(r2, j, self.ld);
            self.data.swap(a, b);
        }
    }

    /// Reborrows as a read-only view.
    pub fn rb(&self) -> MatrixRef<'_, T> {
        MatrixRef {
            data: &*self.data,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
            order: self.order,
        }
    }

    /// Reborrows mutably for a shorter lifetime.
    pub fn rb_mut(&mut self) -> MatrixMut<'_, T> {
        MatrixMut {
            data: &mut *self.data,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
            order: self.order,
        }
    }

    /// The whole backing buffer, padding included. Writes outside the
    /// logical `rows x cols` region are the caller's responsibility.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }
}

impl<T: Scalar> Matrix for MatrixRef<'_, T> {
    type Value = T;

    fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn order(&self) -> StorageOrder {
        self.order
    }

    fn leading_dim(&self) -> usize {
        self.ld
    }
}

impl<T: Scalar> Matrix for MatrixMut<'_, T> {
    type Value = T;

    fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn order(&self) -> StorageOrder {
        self.order
    }

    fn leading_dim(&self) -> usize {
        self.ld
    }
}
