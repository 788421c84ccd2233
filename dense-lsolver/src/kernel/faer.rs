//! Kernel backed by the `faer` crate (cargo feature `faer`).
//!
//! The caller's strided buffers are borrowed as faer views without copying:
//! a column-major handle maps to a column-major `MatMut` with column stride
//! `ld`, and a row-major handle is the transpose of the `cols x rows`
//! column-major view over the same slice.
//!
//! faer reports its row permutation as a forward/inverse pair, while
//! [`PivotSequence`] stores LAPACK-style successive interchanges, so both
//! directions are converted here. Factors are stored in the same positions
//! as [`ReferenceKernel`](super::ReferenceKernel) stores them.

use ::faer::dyn_stack::{MemBuffer, MemStack, StackReq};
use ::faer::linalg::cholesky::llt::factor::{
    cholesky_in_place, cholesky_in_place_scratch, LltError, LltRegularization,
};
use ::faer::linalg::lu::partial_pivoting::{factor as lu_factor, solve as lu_solve};
use ::faer::linalg::triangular_solve::{
    solve_lower_triangular_in_place_with_conj, solve_upper_triangular_in_place_with_conj,
};
use ::faer::perm::PermRef;
use ::faer::traits::ComplexField;
use ::faer::{Conj, MatMut, MatRef, Par, Spec};
use dense_core::{
    KernelError, Matrix, MatrixMut, MatrixRef, Scalar, StorageOrder, Transpose, Uplo,
};
use log::trace;
use num_traits::Zero;

use super::{ensure_pivots, ensure_rhs, ensure_square, DenseKernel, PivotSequence};

#[derive(Debug, Clone, Copy, Default)]
pub struct FaerKernel;

impl FaerKernel {
    pub fn new() -> Self {
        Self
    }
}

fn view_mut<'a, T: Scalar>(a: &'a mut MatrixMut<'_, T>) -> MatMut<'a, T> {
    let (rows, cols) = a.dims();
    let (order, ld) = (a.order(), a.leading_dim());
    let data = a.as_mut_slice();
    match order {
        StorageOrder::ColMajor => {
            MatMut::from_column_major_slice_with_stride_mut(data, rows, cols, ld)
        }
        StorageOrder::RowMajor => {
            MatMut::from_column_major_slice_with_stride_mut(data, cols, rows, ld).transpose_mut()
        }
    }
}

fn view<'a, T: Scalar>(a: &MatrixRef<'a, T>) -> MatRef<'a, T> {
    let (rows, cols) = a.dims();
    let data = a.as_slice();
    match a.order() {
        StorageOrder::ColMajor => {
            MatRef::from_column_major_slice_with_stride(data, rows, cols, a.leading_dim())
        }
        StorageOrder::RowMajor => {
            MatRef::from_column_major_slice_with_stride(data, cols, rows, a.leading_dim())
                .transpose()
        }
    }
}

fn workspace(routine: &'static str, req: StackReq) -> Result<MemBuffer, KernelError> {
    MemBuffer::try_new(req)
        .map_err(|_| KernelError::Failed(format!("{}: could not allocate faer workspace", routine)))
}

fn flip(conj: Conj) -> Conj {
    match conj {
        Conj::No => Conj::Yes,
        Conj::Yes => Conj::No,
    }
}

/// Successive interchanges that move row `forward[k]` to position `k`.
fn swaps_from_forward(forward: &[usize]) -> Vec<usize> {
    let n = forward.len();
    // cur[i]: original row now at position i; pos is its inverse.
    let mut cur: Vec<usize> = (0..n).collect();
    let mut pos: Vec<usize> = (0..n).collect();
    let mut ipiv = Vec::with_capacity(n);
    for k in 0..n {
        let p = pos[forward[k]];
        ipiv.push(p);
        cur.swap(k, p);
        pos[cur[k]] = k;
        pos[cur[p]] = p;
    }
    ipiv
}

/// Forward and inverse permutation arrays equivalent to `pivots`.
fn forward_from_swaps(pivots: &PivotSequence) -> (Vec<usize>, Vec<usize>) {
    let n = pivots.len();
    let mut forward: Vec<usize> = (0..n).collect();
    for (k, &p) in pivots.as_slice().iter().enumerate() {
        forward.swap(k, p);
    }
    let mut inverse = vec![0; n];
    for (i, &row) in forward.iter().enumerate() {
        inverse[row] = i;
    }
    (forward, inverse)
}

/// Moves the strictly opposite triangle out of `a`, leaving zeros behind.
fn take_opposite<T: Scalar>(a: &mut MatrixMut<'_, T>, uplo: Uplo) -> Vec<T> {
    let n = a.rows();
    let mut saved = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for j in 0..n {
        for i in (0..n).filter(|&i| !uplo.contains(i, j)) {
            saved.push(a.at(i, j));
            a.set(i, j, T::zero());
        }
    }
    saved
}

fn restore_opposite<T: Scalar>(a: &mut MatrixMut<'_, T>, uplo: Uplo, saved: Vec<T>) {
    let n = a.rows();
    let mut values = saved.into_iter();
    for j in 0..n {
        for i in (0..n).filter(|&i| !uplo.contains(i, j)) {
            if let Some(v) = values.next() {
                a.set(i, j, v);
            }
        }
    }
}

impl<T: Scalar + ComplexField> DenseKernel<T> for FaerKernel {
    fn factor_general(&self, mut a: MatrixMut<'_, T>) -> Result<PivotSequence, KernelError> {
        let n = ensure_square("getrf", &a)?;
        if n == 0 {
            return Ok(PivotSequence::default());
        }

        let mut forward = vec![0usize; n];
        let mut inverse = vec![0usize; n];
        {
            let mut buf = workspace(
                "getrf",
                lu_factor::lu_in_place_scratch::<usize, T>(n, n, Par::Seq, Spec::default()),
            )?;
            let stack = MemStack::new(&mut buf);
            lu_factor::lu_in_place(
                view_mut(&mut a),
                &mut forward,
                &mut inverse,
                Par::Seq,
                stack,
                Spec::default(),
            );
        }

        let ipiv = swaps_from_forward(&forward);
        // faer runs through a zero pivot; the first exact zero on U's
        // diagonal is where an unblocked factorization would have stopped.
        if let Some(k) = (0..n).find(|&k| Zero::is_zero(&a.at(k, k))) {
            trace!("getrf: zero pivot at step {}", k + 1);
            return Err(KernelError::Breakdown { step: k + 1 });
        }
        trace!("getrf: factored {}x{} with faer", n, n);
        Ok(PivotSequence::new(ipiv))
    }

    fn solve_general(
        &self,
        trans: Transpose,
        a: MatrixRef<'_, T>,
        pivots: &PivotSequence,
        mut b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        let n = ensure_square("getrs", &a)?;
        ensure_rhs("getrs", n, &b)?;
        ensure_pivots("getrs", n, pivots)?;
        let nrhs = b.cols();
        if n == 0 || nrhs == 0 {
            return Ok(());
        }

        let (forward, inverse) = forward_from_swaps(pivots);
        let perm = PermRef::new_checked(&forward, &inverse, n);
        let lu = view(&a);
        let rhs = view_mut(&mut b);

        match trans {
            Transpose::NoTrans => {
                let mut buf = workspace(
                    "getrs",
                    lu_solve::solve_in_place_scratch::<usize, T>(n, nrhs, Par::Seq),
                )?;
                let stack = MemStack::new(&mut buf);
                lu_solve::solve_in_place_with_conj(lu, lu, perm, Conj::No, rhs, Par::Seq, stack);
            }
            Transpose::Trans | Transpose::ConjTrans => {
                let conj = if trans == Transpose::ConjTrans {
                    Conj::Yes
                } else {
                    Conj::No
                };
                let mut buf = workspace(
                    "getrs",
                    lu_solve::solve_transpose_in_place_scratch::<usize, T>(n, nrhs, Par::Seq),
                )?;
                let stack = MemStack::new(&mut buf);
                lu_solve::solve_transpose_in_place_with_conj(
                    lu,
                    lu,
                    perm,
                    conj,
                    rhs,
                    Par::Seq,
                    stack,
                );
            }
        }
        Ok(())
    }

    fn factor_spd(&self, uplo: Uplo, mut a: MatrixMut<'_, T>) -> Result<(), KernelError> {
        let n = ensure_square("potrf", &a)?;
        if n == 0 {
            return Ok(());
        }

        let mut buf = workspace(
            "potrf",
            cholesky_in_place_scratch::<T>(n, Par::Seq, Spec::default()),
        )?;
        let stack = MemStack::new(&mut buf);

        // faer uses the strictly opposite triangle as scratch.
        let saved = take_opposite(&mut a, uplo);
        let result = {
            // faer factors the lower triangle. The transpose of an
            // upper-stored matrix is lower-stored, and its factor L' lands
            // where U = L'ᵀ goes.
            let full = view_mut(&mut a);
            let target = match uplo {
                Uplo::Lower => full,
                Uplo::Upper => full.transpose_mut(),
            };
            cholesky_in_place(
                target,
                LltRegularization::default(),
                Par::Seq,
                stack,
                Spec::default(),
            )
        };
        restore_opposite(&mut a, uplo, saved);

        match result {
            Ok(_) => {
                trace!("potrf: factored {}x{} ({:?}) with faer", n, n, uplo);
                Ok(())
            }
            Err(LltError::NonPositivePivot { index }) => {
                trace!("potrf: non-positive minor at step {}", index + 1);
                Err(KernelError::Breakdown { step: index + 1 })
            }
            #[allow(unreachable_patterns)]
            Err(err) => Err(KernelError::Failed(format!("potrf: {:?}", err))),
        }
    }

    fn solve_spd(
        &self,
        uplo: Uplo,
        a: MatrixRef<'_, T>,
        mut b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        let n = ensure_square("potrs", &a)?;
        ensure_rhs("potrs", n, &b)?;
        if n == 0 || b.cols() == 0 {
            return Ok(());
        }

        // `lower` holds L with A = L·Lᴴ, or L' = Uᵀ with A = conj(L'·L'ᴴ).
        let (lower, conj) = match uplo {
            Uplo::Lower => (view(&a), Conj::No),
            Uplo::Upper => (view(&a).transpose(), Conj::Yes),
        };
        let mut rhs = view_mut(&mut b);
        solve_lower_triangular_in_place_with_conj(lower, conj, rhs.rb_mut(), Par::Seq);
        solve_upper_triangular_in_place_with_conj(lower.transpose(), flip(conj), rhs, Par::Seq);
        Ok(())
    }
}
