//! Entry points for callers that only learn the element type at runtime.

use dense_core::{
    Complex32, Complex64, ElementType, LinalgError, Matrix, MatrixMut, Result, StorageOrder, Uplo,
};

use crate::algorithms::{GeneralSolver, SpdSolver};
use crate::kernel::DenseKernel;

/// A mutable matrix handle whose element type is a runtime value.
#[derive(Debug)]
pub enum DynMatrixMut<'a> {
    F32(MatrixMut<'a, f32>),
    F64(MatrixMut<'a, f64>),
    C32(MatrixMut<'a, Complex32>),
    C64(MatrixMut<'a, Complex64>),
}

impl DynMatrixMut<'_> {
    pub fn element_type(&self) -> ElementType {
        match self {
            DynMatrixMut::F32(_) => ElementType::F32,
            DynMatrixMut::F64(_) => ElementType::F64,
            DynMatrixMut::C32(_) => ElementType::C32,
            DynMatrixMut::C64(_) => ElementType::C64,
        }
    }

    pub fn dims(&self) -> (usize, usize) {
        match self {
            DynMatrixMut::F32(m) => m.dims(),
            DynMatrixMut::F64(m) => m.dims(),
            DynMatrixMut::C32(m) => m.dims(),
            DynMatrixMut::C64(m) => m.dims(),
        }
    }
}

macro_rules! impl_from_matrix_mut {
    ($ty:ty, $variant:ident) => {
        impl<'a> From<MatrixMut<'a, $ty>> for DynMatrixMut<'a> {
            fn from(m: MatrixMut<'a, $ty>) -> Self {
                DynMatrixMut::$variant(m)
            }
        }
    };
}

impl_from_matrix_mut!(f32, F32);
impl_from_matrix_mut!(f64, F64);
impl_from_matrix_mut!(Complex32, C32);
impl_from_matrix_mut!(Complex64, C64);

/// A kernel that covers every supported element type.
pub trait AnyKernel:
    DenseKernel<f32> + DenseKernel<f64> + DenseKernel<Complex32> + DenseKernel<Complex64>
{
}

impl<K> AnyKernel for K where
    K: DenseKernel<f32> + DenseKernel<f64> + DenseKernel<Complex32> + DenseKernel<Complex64>
{
}

fn element_type_mismatch(a: &DynMatrixMut<'_>, b: &DynMatrixMut<'_>) -> LinalgError {
    LinalgError::InvalidArgument(format!(
        "A and B must share an element type (A is {}, B is {})",
        a.element_type(),
        b.element_type()
    ))
}

/// [`GeneralSolver::solve`] for handles of runtime element type.
///
/// # Errors
/// `InvalidArgument` if `a` and `b` hold different element types; otherwise
/// whatever the typed solver reports.
pub fn solve_general_dyn<K: AnyKernel>(
    kernel: &K,
    order: StorageOrder,
    n: usize,
    nrhs: usize,
    a: DynMatrixMut<'_>,
    b: DynMatrixMut<'_>,
) -> Result<()> {
    let solver = GeneralSolver::new(kernel);
    let info = match (a, b) {
        (DynMatrixMut::F32(a), DynMatrixMut::F32(b)) => solver.solve(order, n, nrhs, a, b),
        (DynMatrixMut::F64(a), DynMatrixMut::F64(b)) => solver.solve(order, n, nrhs, a, b),
        (DynMatrixMut::C32(a), DynMatrixMut::C32(b)) => solver.solve(order, n, nrhs, a, b),
        (DynMatrixMut::C64(a), DynMatrixMut::C64(b)) => solver.solve(order, n, nrhs, a, b),
        (a, b) => return Err(element_type_mismatch(&a, &b)),
    };
    info.map(|_| ())
}

/// [`SpdSolver::solve`] for handles of runtime element type.
pub fn solve_spd_dyn<K: AnyKernel>(
    kernel: &K,
    order: StorageOrder,
    uplo: Uplo,
    n: usize,
    nrhs: usize,
    a: DynMatrixMut<'_>,
    b: DynMatrixMut<'_>,
) -> Result<()> {
    let solver = SpdSolver::new(kernel);
    match (a, b) {
        (DynMatrixMut::F32(a), DynMatrixMut::F32(b)) => solver.solve(order, uplo, n, nrhs, a, b),
        (DynMatrixMut::F64(a), DynMatrixMut::F64(b)) => solver.solve(order, uplo, n, nrhs, a, b),
        (DynMatrixMut::C32(a), DynMatrixMut::C32(b)) => solver.solve(order, uplo, n, nrhs, a, b),
        (DynMatrixMut::C64(a), DynMatrixMut::C64(b)) => solver.solve(order, uplo, n, nrhs, a, b),
        (a, b) => Err(element_type_mismatch(&a, &b)),
    }
}
