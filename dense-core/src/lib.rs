//! # Dense Core Library
//!
//! Data model shared by the dense direct solvers: storage order and triangle
//! flags, the supported element types, borrowed strided matrix handles, an owned
//! convenience matrix and the error taxonomy.

// Declare modules
pub mod dense_matrix;
pub mod error;
pub mod layout;
pub mod matrix;
pub mod scalar;
pub mod traits;

// Re-export public types
pub use dense_matrix::DenseMatrix;
pub use error::{KernelError, LinalgError, Result};
pub use layout::{StorageOrder, Transpose, Uplo};
pub use matrix::{MatrixMut, MatrixRef};
pub use scalar::{ElementType, Scalar};
pub use traits::Matrix;

pub use num_complex::{Complex32, Complex64};
