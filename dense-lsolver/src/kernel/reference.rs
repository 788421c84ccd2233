//! Unblocked reference implementation of the kernel primitives.
//!
//! Straightforward right-looking LU with partial pivoting (largest modulus
//! in the column) and column-by-column Cholesky. Works for every element
//! type and both storage orders by going through the handles' `(i, j)`
//! accessors; it makes no attempt at blocking or cache tiling.

use dense_core::{KernelError, Matrix, MatrixMut, MatrixRef, Scalar, Transpose, Uplo};
use log::trace;
use num_traits::{Float, Zero};

use super::{ensure_pivots, ensure_rhs, ensure_square, DenseKernel, PivotSequence};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceKernel;

impl ReferenceKernel {
    pub fn new() -> Self {
        Self
    }
}

#[inline(always)]
fn op<T: Scalar>(value: T, conjugate: bool) -> T {
    if conjugate {
        value.conj()
    } else {
        value
    }
}

impl<T: Scalar> DenseKernel<T> for ReferenceKernel {
    fn factor_general(&self, mut a: MatrixMut<'_, T>) -> Result<PivotSequence, KernelError> {
        let n = ensure_square("getrf", &a)?;
        let mut ipiv = Vec::with_capacity(n);

        for k in 0..n {
            // Pivot search: largest |A[i, k]| for i in k..n.
            let mut p = k;
            let mut max_val = a.at(k, k).modulus();
            for i in (k + 1)..n {
                let v = a.at(i, k).modulus();
                if v > max_val {
                    max_val = v;
                    p = i;
                }
            }
            ipiv.push(p);

            if max_val.is_zero() {
                return Err(KernelError::Breakdown { step: k + 1 });
            }

            a.swap_rows(k, p);
            trace!("getrf step {}: pivot row {} (|pivot| = {:?})", k + 1, p + 1, max_val);

            let pivot = a.at(k, k);
            for i in (k + 1)..n {
                let l = a.at(i, k) / pivot;
                a.set(i, k, l);
            }

            // Rank-1 update of the trailing submatrix.
            for i in (k + 1)..n {
                let l = a.at(i, k);
                if l.is_zero() {
                    continue;
                }
                for j in (k + 1)..n {
                    let updated = a.at(i, j) - l * a.at(k, j);
                    a.set(i, j, updated);
                }
            }
        }

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
        let ipiv = pivots.as_slice();
        let nrhs = b.cols();

        match trans {
            Transpose::NoTrans => {
                // A = Pᵀ·L·U: apply P, then L, then U.
                for (k, &p) in ipiv.iter().enumerate() {
                    b.swap_rows(k, p);
                }
                for j in 0..nrhs {
                    for i in 0..n {
                        let mut s = b.at(i, j);
                        for k in 0..i {
                            s = s - a.at(i, k) * b.at(k, j);
                        }
                        b.set(i, j, s);
                    }
                    for i in (0..n).rev() {
                        let mut s = b.at(i, j);
                        for k in (i + 1)..n {
                            s = s - a.at(i, k) * b.at(k, j);
                        }
                        b.set(i, j, s / a.at(i, i));
                    }
                }
            }
            Transpose::Trans | Transpose::ConjTrans => {
                // op(A) = op(U)·op(L)·P: solve with op(U), then op(L), then undo P.
                let conjugate = trans == Transpose::ConjTrans;
                for j in 0..nrhs {
                    for i in 0..n {
                        let mut s = b.at(i, j);
                        for k in 0..i {
                            s = s - op(a.at(k, i), conjugate) * b.at(k, j);
                        }
                        b.set(i, j, s / op(a.at(i, i), conjugate));
                    }
                    for i in (0..n).rev() {
                        let mut s = b.at(i, j);
                        for k in (i + 1)..n {
                            s = s - op(a.at(k, i), conjugate) * b.at(k, j);
                        }
                        b.set(i, j, s);
                    }
                }
                for (k, &p) in ipiv.iter().enumerate().rev() {
                    b.swap_rows(k, p);
                }
            }
        }
        Ok(())
    }

    fn factor_spd(&self, uplo: Uplo, mut a: MatrixMut<'_, T>) -> Result<(), KernelError> {
        let n = ensure_square("potrf", &a)?;

        for j in 0..n {
            // Only entries inside `uplo` are read or written.
            let mut d = a.at(j, j).real();
            for k in 0..j {
                let f = match uplo {
                    Uplo::Upper => a.at(k, j),
                    Uplo::Lower => a.at(j, k),
                };
                let m = f.modulus();
                d = d - m * m;
            }
            if !(d > <T::Real as Zero>::zero()) {
                return Err(KernelError::Breakdown { step: j + 1 });
            }
            let djj = d.sqrt();
            trace!("potrf column {}: diagonal {:?}", j + 1, djj);
            a.set(j, j, T::from_real(djj));
            let diag = T::from_real(djj);

            for i in (j + 1)..n {
                match uplo {
                    Uplo::Upper => {
                        // A[j, i] = Σ conj(U[k, j]) · U[k, i]
                        let mut s = a.at(j, i);
                        for k in 0..j {
                            s = s - a.at(k, j).conj() * a.at(k, i);
                        }
                        a.set(j, i, s / diag);
                    }
                    Uplo::Lower => {
                        // A[i, j] = Σ L[i, k] · conj(L[j, k])
                        let mut s = a.at(i, j);
                        for k in 0..j {
                            s = s - a.at(i, k) * a.at(j, k).conj();
                        }
                        a.set(i, j, s / diag);
                    }
                }
            }
        }
        Ok(())
    }

    fn solve_spd(
        &self,
        uplo: Uplo,
        a: MatrixRef<'_, T>,
        mut b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        let n = ensure_square("potrs", &a)?;
        ensure_rhs("potrs", n, &b)?;

        // Triangular factor as seen from the lower side: F = Uᴴ or F = L,
        // so that A = F·Fᴴ either way.
        let f = |i: usize, k: usize| -> T {
            match uplo {
                Uplo::Upper => a.at(k, i).conj(),
                Uplo::Lower => a.at(i, k),
            }
        };

        for j in 0..b.cols() {
            for i in 0..n {
                let mut s = b.at(i, j);
                for k in 0..i {
                    s = s - f(i, k) * b.at(k, j);
                }
                b.set(i, j, s / f(i, i));
            }
            for i in (0..n).rev() {
                let mut s = b.at(i, j);
                for k in (i + 1)..n {
                    s = s - f(k, i).conj() * b.at(k, j);
                }
                b.set(i, j, s / f(i, i).conj());
            }
        }
        Ok(())
    }
}
