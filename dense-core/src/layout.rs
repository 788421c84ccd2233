//! Storage order, triangle and transpose flags.
//!
//! The numeric discriminants follow the CBLAS convention so that callers
//! holding raw integer codes can convert them with `TryFrom<i32>`. Character
//! forms (`'R'`, `'U'`, `'N'`, ...) follow the LAPACK convention.

use crate::error::LinalgError;
use serde::{Deserialize, Serialize};

/// Memory layout of a dense matrix buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum StorageOrder {
    /// Elements of a row are contiguous; `ld` strides between rows.
    #[default]
    RowMajor = 101,
    /// Elements of a column are contiguous; `ld` strides between columns.
    ColMajor = 102,
}

impl StorageOrder {
    /// Smallest valid leading dimension for a `rows x cols` matrix.
    ///
    /// Never less than one, so that empty matrices still have a usable stride.
    #[inline]
    pub fn min_leading_dim(self, rows: usize, cols: usize) -> usize {
        let minor = match self {
            StorageOrder::RowMajor => cols,
            StorageOrder::ColMajor => rows,
        };
        minor.max(1)
    }

    /// Linear offset of element `(i, j)` for leading dimension `ld`.
    #[inline(always)]
    pub fn index(self, i: usize, j: usize, ld: usize) -> usize {
        match self {
            StorageOrder::RowMajor => i * ld + j,
            StorageOrder::ColMajor => j * ld + i,
        }
    }

    /// Number of buffer elements a `rows x cols` matrix with stride `ld` spans.
    ///
    /// `None` if that count does not fit in a `usize`.
    pub fn required_len(self, rows: usize, cols: usize, ld: usize) -> Option<usize> {
        if rows == 0 || cols == 0 {
            return Some(0);
        }
        let (outer, inner) = match self {
            StorageOrder::RowMajor => (rows - 1, cols - 1),
            StorageOrder::ColMajor => (cols - 1, rows - 1),
        };
        outer.checked_mul(ld)?.checked_add(inner)?.checked_add(1)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for StorageOrder {
    type Error = LinalgError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            101 => Ok(StorageOrder::RowMajor),
            102 => Ok(StorageOrder::ColMajor),
            other => Err(LinalgError::InvalidArgument(format!(
                "storage order code {} is neither row-major (101) nor column-major (102)",
                other
            ))),
        }
    }
}

impl TryFrom<char> for StorageOrder {
    type Error = LinalgError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'R' => Ok(StorageOrder::RowMajor),
            'C' => Ok(StorageOrder::ColMajor),
            _ => Err(LinalgError::InvalidArgument(format!(
                "storage order '{}' is neither 'R' nor 'C'",
                c
            ))),
        }
    }
}

/// Which triangle of a symmetric (Hermitian) matrix holds valid data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum Uplo {
    #[default]
    Upper = 121,
    Lower = 122,
}

impl Uplo {
    /// Whether `(i, j)` lies in this triangle, diagonal included.
    #[inline(always)]
    pub fn contains(self, i: usize, j: usize) -> bool {
        match self {
            Uplo::Upper => i <= j,
            Uplo::Lower => i >= j,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Uplo {
    type Error = LinalgError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            121 => Ok(Uplo::Upper),
            122 => Ok(Uplo::Lower),
            other => Err(LinalgError::InvalidArgument(format!(
                "uplo code {} is neither upper (121) nor lower (122)",
                other
            ))),
        }
    }
}

impl TryFrom<char> for Uplo {
    type Error = LinalgError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'U' => Ok(Uplo::Upper),
            'L' => Ok(Uplo::Lower),
            _ => Err(LinalgError::InvalidArgument(format!(
                "uplo '{}' is neither 'U' nor 'L'",
                c
            ))),
        }
    }
}

/// Operation applied to the coefficient matrix by a triangular solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum Transpose {
    #[default]
    NoTrans = 111,
    Trans = 112,
    /// Conjugate transpose; identical to `Trans` for real element types.
    ConjTrans = 113,
}

impl Transpose {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Transpose {
    type Error = LinalgError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            111 => Ok(Transpose::NoTrans),
            112 => Ok(Transpose::Trans),
            113 => Ok(Transpose::ConjTrans),
            other => Err(LinalgError::InvalidArgument(format!(
                "transpose code {} is not one of 111, 112, 113",
                other
            ))),
        }
    }
}

impl TryFrom<char> for Transpose {
    type Error = LinalgError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'N' => Ok(Transpose::NoTrans),
            'T' => Ok(Transpose::Trans),
            'C' => Ok(Transpose::ConjTrans),
            _ => Err(LinalgError::InvalidArgument(format!(
                "transpose '{}' is not one of 'N', 'T', 'C'",
                c
            ))),
        }
    }
}
