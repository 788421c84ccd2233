use std::cell::Cell;

use dense_lsolver::{
    solve_general_system, solve_general_system_raw, solve_spd_system, Complex64, DenseKernel,
    DenseMatrix, GeneralSolver, KernelError, LinalgError, Matrix, MatrixMut, MatrixRef,
    PivotSequence, ReferenceKernel, Scalar, SolveOptions, SpdSolver, StorageOrder, Transpose, Uplo,
};
use num_traits::ToPrimitive;

// Helper for float comparison in tests
fn assert_approx_eq_vec(a: &[f64], b: &[f64], tolerance: f64) {
    assert_eq!(a.len(), b.len(), "Vector lengths differ");
    for i in 0..a.len() {
        let diff = (a[i] - b[i]).abs();
        assert!(
            diff <= tolerance,
            "Verification failed at index {}: expected {}, got {}, diff {}",
            i,
            b[i],
            a[i],
            diff
        );
    }
}

fn max_abs_diff<T: Scalar>(a: &DenseMatrix<T>, b: &DenseMatrix<T>) -> f64 {
    assert_eq!(a.dims(), b.dims());
    let (rows, cols) = a.dims();
    let mut worst = 0.0f64;
    for i in 0..rows {
        for j in 0..cols {
            let d = (a.get(i, j).unwrap() - b.get(i, j).unwrap())
                .modulus()
                .to_f64()
                .unwrap();
            worst = worst.max(d);
        }
    }
    worst
}

/// Copies `m` into a buffer with leading dimension `ld`, padding slots set to `fill`.
fn padded<T: Scalar>(m: &DenseMatrix<T>, ld: usize, fill: T) -> Vec<T> {
    let (rows, cols) = m.dims();
    let order = m.order();
    let mut buf = vec![fill; order.required_len(rows, cols, ld).unwrap()];
    for i in 0..rows {
        for j in 0..cols {
            buf[order.index(i, j, ld)] = m.get(i, j).unwrap();
        }
    }
    buf
}

fn unpadded<T: Scalar>(
    buf: &[T],
    rows: usize,
    cols: usize,
    ld: usize,
    order: StorageOrder,
) -> DenseMatrix<T> {
    let view = MatrixRef::from_slice(buf, rows, cols, ld, order).unwrap();
    DenseMatrix::from_fn(rows, cols, order, |i, j| view.at(i, j))
}

fn random_f64(rng: &mut fastrand::Rng) -> f64 {
    rng.f64() * 2.0 - 1.0
}

/// Random matrix with a boosted diagonal so that it is comfortably invertible.
fn random_invertible(rng: &mut fastrand::Rng, n: usize, order: StorageOrder) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(n, n, order, |i, j| {
        let v = random_f64(rng);
        if i == j {
            v + n as f64
        } else {
            v
        }
    })
}

/// `M·Mᵀ + n·I` for a random `M`.
fn random_spd(rng: &mut fastrand::Rng, n: usize, order: StorageOrder) -> DenseMatrix<f64> {
    let m = DenseMatrix::from_fn(n, n, order, |_, _| random_f64(rng));
    let mt = DenseMatrix::from_fn(n, n, order, |i, j| m.get(j, i).unwrap());
    let mut a = m.matmul(&mt).unwrap();
    for i in 0..n {
        *a.get_mut(i, i).unwrap() += n as f64;
    }
    a
}

/// `M·Mᴴ + n·I` for a random complex `M`.
fn random_hpd(rng: &mut fastrand::Rng, n: usize, order: StorageOrder) -> DenseMatrix<Complex64> {
    let m = DenseMatrix::from_fn(n, n, order, |_, _| {
        Complex64::new(random_f64(rng), random_f64(rng))
    });
    let mh = DenseMatrix::from_fn(n, n, order, |i, j| m.get(j, i).unwrap().conj());
    let mut a = m.matmul(&mh).unwrap();
    for i in 0..n {
        *a.get_mut(i, i).unwrap() += Complex64::new(n as f64, 0.0);
    }
    a
}

/// Counts kernel invocations and optionally fails the solve step.
#[derive(Default)]
struct RecordingKernel {
    calls: Cell<usize>,
    last_trans: Cell<Option<Transpose>>,
    fail_solve: Option<KernelError>,
}

impl RecordingKernel {
    fn failing_solve(err: KernelError) -> Self {
        Self {
            fail_solve: Some(err),
            ..Default::default()
        }
    }

    fn bump(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl<T: Scalar> DenseKernel<T> for RecordingKernel {
    fn factor_general(&self, a: MatrixMut<'_, T>) -> Result<PivotSequence, KernelError> {
        self.bump();
        ReferenceKernel.factor_general(a)
    }

    fn solve_general(
        &self,
        trans: Transpose,
        a: MatrixRef<'_, T>,
        pivots: &PivotSequence,
        b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        self.bump();
        self.last_trans.set(Some(trans));
        if let Some(err) = &self.fail_solve {
            return Err(err.clone());
        }
        ReferenceKernel.solve_general(trans, a, pivots, b)
    }

    fn factor_spd(&self, uplo: Uplo, a: MatrixMut<'_, T>) -> Result<(), KernelError> {
        self.bump();
        ReferenceKernel.factor_spd(uplo, a)
    }

    fn solve_spd(
        &self,
        uplo: Uplo,
        a: MatrixRef<'_, T>,
        b: MatrixMut<'_, T>,
    ) -> Result<(), KernelError> {
        self.bump();
        if let Some(err) = &self.fail_solve {
            return Err(err.clone());
        }
        ReferenceKernel.solve_spd(uplo, a, b)
    }
}

#[test]
fn test_general_solve_small_system() -> Result<(), LinalgError> {
    let mut a = vec![4.0, 3.0, 6.0, 3.0];
    let mut b = vec![1.0, 1.0];

    solve_general_system(
        &ReferenceKernel,
        StorageOrder::RowMajor,
        2,
        1,
        &mut a,
        2,
        &mut b,
        1,
    )?;

    assert_approx_eq_vec(&b, &[0.0, 1.0 / 3.0], 1e-12);
    Ok(())
}

#[test]
fn test_spd_solve_small_system_lower() -> Result<(), LinalgError> {
    let mut a = vec![4.0, 2.0, 2.0, 3.0];
    let mut b = vec![1.0, 1.0];

    solve_spd_system(
        &ReferenceKernel,
        StorageOrder::RowMajor,
        Uplo::Lower,
        2,
        1,
        &mut a,
        2,
        &mut b,
        1,
    )?;

    // [[4, 2], [2, 3]]·[0.125, 0.25] = [1, 1]
    assert_approx_eq_vec(&b, &[0.125, 0.25], 1e-12);
    // Lower factor L = [[2, 0], [1, sqrt(2)]]; the upper entry is left alone.
    assert_approx_eq_vec(&a, &[2.0, 2.0, 1.0, 2.0f64.sqrt()], 1e-12);
    Ok(())
}

#[test]
fn test_general_round_trip_random_padded() {
    let mut rng = fastrand::Rng::with_seed(7);
    for order in [StorageOrder::RowMajor, StorageOrder::ColMajor] {
        for &(n, nrhs) in &[(1usize, 1usize), (5, 3), (12, 2)] {
            let a = random_invertible(&mut rng, n, order);
            let b = DenseMatrix::from_fn(n, nrhs, order, |_, _| random_f64(&mut rng));

            let (lda, ldb) = (n + 2, order.min_leading_dim(n, nrhs) + 1);
            let mut a_buf = padded(&a, lda, -999.0);
            let mut b_buf = padded(&b, ldb, -999.0);

            solve_general_system(
                &ReferenceKernel, order, n, nrhs, &mut a_buf, lda, &mut b_buf, ldb,
            )
            .unwrap();

            let x = unpadded(&b_buf, n, nrhs, ldb, order);
            let residual = max_abs_diff(&a.matmul(&x).unwrap(), &b);
            assert!(residual < 1e-10, "{:?} n={} residual {}", order, n, residual);

            // Padding slots are never touched.
            let untouched = |buf: &[f64], rows: usize, cols: usize, ld: usize| {
                (0..buf.len()).all(|idx| {
                    let inside = (0..rows).any(|i| (0..cols).any(|j| order.index(i, j, ld) == idx));
                    inside || buf[idx] == -999.0
                })
            };
            assert!(untouched(&a_buf[..], n, n, lda));
            assert!(untouched(&b_buf[..], n, nrhs, ldb));
        }
    }
}

#[test]
fn test_general_round_trip_complex() {
    let mut rng = fastrand::Rng::with_seed(11);
    let n = 6;
    let order = StorageOrder::ColMajor;
    let a = DenseMatrix::from_fn(n, n, order, |i, j| {
        let boost = if i == j { n as f64 } else { 0.0 };
        Complex64::new(random_f64(&mut rng) + boost, random_f64(&mut rng))
    });
    let b = DenseMatrix::from_fn(n, 2, order, |_, _| {
        Complex64::new(random_f64(&mut rng), random_f64(&mut rng))
    });

    let mut lu = a.clone();
    let mut x = b.clone();
    let info = GeneralSolver::<ReferenceKernel>::default()
        .solve(order, n, 2, lu.view_mut(), x.view_mut())
        .unwrap();

    assert_eq!(info.pivots.len(), n);
    assert!(max_abs_diff(&a.matmul(&x).unwrap(), &b) < 1e-10);
}

#[test]
fn test_general_solve_f32() {
    let order = StorageOrder::ColMajor;
    let a = DenseMatrix::from_rows(
        &[
            vec![2.0f32, -1.0, 0.0],
            vec![-1.0, 2.0, -1.0],
            vec![0.0, -1.0, 2.0],
        ],
        order,
    )
    .unwrap();
    let mut lu = a.clone();
    let mut x = DenseMatrix::from_rows(&[vec![1.0f32], vec![0.0], vec![1.0]], order).unwrap();
    GeneralSolver::new(ReferenceKernel)
        .solve(order, 3, 1, lu.view_mut(), x.view_mut())
        .unwrap();
    for i in 0..3 {
        assert!((x.get(i, 0).unwrap() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn test_spd_round_trip_reads_only_declared_triangle() {
    let mut rng = fastrand::Rng::with_seed(3);
    for order in [StorageOrder::RowMajor, StorageOrder::ColMajor] {
        for uplo in [Uplo::Upper, Uplo::Lower] {
            let n = 8;
            let a = random_spd(&mut rng, n, order);
            let b = DenseMatrix::from_fn(n, 2, order, |_, _| random_f64(&mut rng));

            // Poison the triangle that must be ignored.
            let mut factor = a.clone();
            for i in 0..n {
                for j in 0..n {
                    if !uplo.contains(i, j) {
                        *factor.get_mut(i, j).unwrap() = f64::NAN;
                    }
                }
            }
            let mut x = b.clone();
            SpdSolver::new(ReferenceKernel)
                .solve(order, uplo, n, 2, factor.view_mut(), x.view_mut())
                .unwrap();

            let residual = max_abs_diff(&a.matmul(&x).unwrap(), &b);
            assert!(residual < 1e-10, "{:?}/{:?} residual {}", order, uplo, residual);
            for i in 0..n {
                for j in 0..n {
                    if !uplo.contains(i, j) {
                        assert!(factor.get(i, j).unwrap().is_nan());
                    }
                }
            }
        }
    }
}

#[test]
fn test_spd_round_trip_hermitian() {
    let mut rng = fastrand::Rng::with_seed(5);
    let n = 5;
    for uplo in [Uplo::Upper, Uplo::Lower] {
        let order = StorageOrder::RowMajor;
        let a = random_hpd(&mut rng, n, order);
        let b = DenseMatrix::from_fn(n, 1, order, |_, _| {
            Complex64::new(random_f64(&mut rng), random_f64(&mut rng))
        });
        let mut factor = a.clone();
        let mut x = b.clone();
        SpdSolver::new(ReferenceKernel)
            .solve(order, uplo, n, 1, factor.view_mut(), x.view_mut())
            .unwrap();
        assert!(max_abs_diff(&a.matmul(&x).unwrap(), &b) < 1e-10);
    }
}

#[test]
fn test_empty_system_is_a_no_op() {
    let kernel = RecordingKernel::default();
    let mut a: Vec<f64> = vec![];
    let mut b = vec![7.0, 8.0];

    solve_general_system(&kernel, StorageOrder::RowMajor, 0, 2, &mut a, 1, &mut b, 2).unwrap();
    solve_spd_system(
        &kernel,
        StorageOrder::RowMajor,
        Uplo::Upper,
        0,
        2,
        &mut a,
        1,
        &mut b,
        2,
    )
    .unwrap();

    assert_eq!(b, vec![7.0, 8.0]);
    assert_eq!(kernel.calls.get(), 0);
}

#[test]
fn test_singular_matrix_reports_first_row() {
    let mut a = vec![0.0; 4];
    let mut b = vec![1.0, 2.0];
    let err = solve_general_system(
        &ReferenceKernel,
        StorageOrder::RowMajor,
        2,
        1,
        &mut a,
        2,
        &mut b,
        1,
    )
    .unwrap_err();

    assert_eq!(err, LinalgError::SingularMatrix { index: 1 });
    assert_eq!(err.to_string(), "Matrix is singular: zero pivot at row 1");
    // The solve step never ran.
    assert_eq!(b, vec![1.0, 2.0]);
}

#[test]
fn test_singular_matrix_later_pivot() {
    // Second row is twice the first.
    let mut a = vec![1.0, 2.0, 2.0, 4.0];
    let mut b = vec![1.0, 1.0];
    let err = solve_general_system(
        &ReferenceKernel,
        StorageOrder::RowMajor,
        2,
        1,
        &mut a,
        2,
        &mut b,
        1,
    )
    .unwrap_err();
    assert_eq!(err, LinalgError::SingularMatrix { index: 2 });
}

#[test]
fn test_negative_eigenvalue_is_not_positive_definite() {
    for uplo in [Uplo::Upper, Uplo::Lower] {
        let mut a = vec![1.0, 0.0, 0.0, -1.0];
        let mut b = vec![1.0, 1.0];
        let err = solve_spd_system(
            &ReferenceKernel,
            StorageOrder::ColMajor,
            uplo,
            2,
            1,
            &mut a,
            2,
            &mut b,
            2,
        )
        .unwrap_err();
        assert_eq!(err, LinalgError::NotPositiveDefinite { index: 2 });
    }
}

#[test]
fn test_shape_mismatch_never_reaches_kernel() {
    let kernel = RecordingKernel::default();
    let mut a = DenseMatrix::<f64>::identity(3, StorageOrder::RowMajor);
    let mut b = DenseMatrix::<f64>::zeros(4, 1, StorageOrder::RowMajor);

    let err = GeneralSolver::new(&kernel)
        .solve(StorageOrder::RowMajor, 3, 1, a.view_mut(), b.view_mut())
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    let err = SpdSolver::new(&kernel)
        .solve(
            StorageOrder::RowMajor,
            Uplo::Lower,
            3,
            1,
            a.view_mut(),
            b.view_mut(),
        )
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    // A is 3x3 but the caller claims n = 2.
    let mut b2 = DenseMatrix::<f64>::zeros(2, 1, StorageOrder::RowMajor);
    let err = GeneralSolver::new(&kernel)
        .solve(StorageOrder::RowMajor, 2, 1, a.view_mut(), b2.view_mut())
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    assert_eq!(kernel.calls.get(), 0);
}

#[test]
fn test_leading_dimension_too_small() {
    let kernel = RecordingKernel::default();
    let mut a = vec![1.0; 9];
    let mut b = vec![1.0; 3];
    let err = solve_general_system(&kernel, StorageOrder::ColMajor, 3, 1, &mut a, 2, &mut b, 3)
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    let err = solve_general_system(&kernel, StorageOrder::ColMajor, 3, 1, &mut a, 3, &mut b, 2)
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));
    assert_eq!(kernel.calls.get(), 0);
}

#[test]
fn test_oversized_leading_dimension_is_rejected() {
    let kernel = RecordingKernel::default();
    let mut a = vec![1.0, 0.0, 0.0, 1.0];
    let mut b = vec![1.0, 1.0];
    let err = solve_general_system(
        &kernel,
        StorageOrder::RowMajor,
        2,
        1,
        &mut a,
        usize::MAX,
        &mut b,
        1,
    )
    .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    // Row-major B: the second row sits one full stride past the first.
    let err = solve_spd_system(
        &kernel,
        StorageOrder::RowMajor,
        Uplo::Lower,
        2,
        1,
        &mut a,
        2,
        &mut b,
        usize::MAX,
    )
    .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    let err = solve_general_system_raw(&kernel, 102, 2, 1, &mut a, usize::MAX, &mut b, 2)
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    assert_eq!(a, vec![1.0, 0.0, 0.0, 1.0]);
    assert_eq!(b, vec![1.0, 1.0]);
    assert_eq!(kernel.calls.get(), 0);
}

#[test]
fn test_short_buffers_are_rejected() {
    let kernel = RecordingKernel::default();
    // 3x3 with lda = 4 spans 11 elements in column-major order.
    let mut a = vec![1.0; 10];
    let mut b = vec![1.0; 3];
    let err = solve_general_system(&kernel, StorageOrder::ColMajor, 3, 1, &mut a, 4, &mut b, 3)
        .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));

    let mut a = vec![1.0; 9];
    let mut b = vec![1.0; 5];
    let err = solve_spd_system(
        &kernel,
        StorageOrder::RowMajor,
        Uplo::Upper,
        3,
        2,
        &mut a,
        3,
        &mut b,
        2,
    )
    .unwrap_err();
    assert!(matches!(err, LinalgError::DimensionMismatch(_)));
    assert_eq!(b, vec![1.0; 5]);
    assert_eq!(kernel.calls.get(), 0);
}

#[test]
fn test_storage_order_mismatch_is_invalid_argument() {
    let mut a = DenseMatrix::<f64>::identity(2, StorageOrder::ColMajor);
    let mut b = DenseMatrix::<f64>::zeros(2, 1, StorageOrder::ColMajor);
    let err = GeneralSolver::new(ReferenceKernel)
        .solve(StorageOrder::RowMajor, 2, 1, a.view_mut(), b.view_mut())
        .unwrap_err();
    assert!(matches!(err, LinalgError::InvalidArgument(_)));
}

#[test]
fn test_general_solve_uses_no_transpose() {
    let kernel = RecordingKernel::default();
    // Non-symmetric, so a transposed solve would give a different answer.
    let mut a = vec![1.0, 2.0, 3.0, 4.0];
    let mut b = vec![5.0, 11.0];
    solve_general_system(&kernel, StorageOrder::RowMajor, 2, 1, &mut a, 2, &mut b, 1).unwrap();

    assert_eq!(kernel.last_trans.get(), Some(Transpose::NoTrans));
    assert_eq!(kernel.calls.get(), 2);
    assert_approx_eq_vec(&b, &[1.0, 2.0], 1e-12);
}

#[test]
fn test_kernel_failure_is_surfaced_unchanged() {
    let failure = KernelError::Failed("device lost".to_string());
    let kernel = RecordingKernel::failing_solve(failure.clone());

    let mut a = vec![2.0, 0.0, 0.0, 2.0];
    let mut b = vec![1.0, 1.0];
    let err = solve_general_system(&kernel, StorageOrder::RowMajor, 2, 1, &mut a, 2, &mut b, 1)
        .unwrap_err();
    assert_eq!(err, LinalgError::KernelFailure(failure.clone()));

    let mut a = vec![2.0, 0.0, 0.0, 2.0];
    let err = solve_spd_system(
        &kernel,
        StorageOrder::RowMajor,
        Uplo::Upper,
        2,
        1,
        &mut a,
        2,
        &mut b,
        1,
    )
    .unwrap_err();
    assert_eq!(err, LinalgError::KernelFailure(failure));
}

#[test]
fn test_check_finite_rejects_nan_before_factoring() {
    let kernel = RecordingKernel::default();
    let mut a = vec![1.0, 0.0, 0.0, 1.0];
    let mut b = vec![f64::NAN, 1.0];
    let err = solve_general_system(&kernel, StorageOrder::RowMajor, 2, 1, &mut a, 2, &mut b, 1)
        .unwrap_err();
    assert!(matches!(err, LinalgError::InvalidArgument(_)));
    assert_eq!(kernel.calls.get(), 0);

    // With the check disabled the NaN simply flows through.
    let solver = GeneralSolver::with_options(&kernel, SolveOptions::with_params(false));
    let a = MatrixMut::from_slice(&mut a, 2, 2, 2, StorageOrder::RowMajor).unwrap();
    let b_view = MatrixMut::from_slice(&mut b, 2, 1, 1, StorageOrder::RowMajor).unwrap();
    solver
        .solve(StorageOrder::RowMajor, 2, 1, a, b_view)
        .unwrap();
    assert!(b[0].is_nan());
}

#[test]
fn test_concurrent_solves_on_disjoint_buffers() {
    let kernel = ReferenceKernel::new();
    std::thread::scope(|s| {
        for t in 0..4u64 {
            let kernel = &kernel;
            s.spawn(move || {
                let mut rng = fastrand::Rng::with_seed(100 + t);
                let order = StorageOrder::ColMajor;
                let a = random_spd(&mut rng, 10, order);
                let b = DenseMatrix::from_fn(10, 1, order, |_, _| random_f64(&mut rng));
                let mut factor = a.clone();
                let mut x = b.clone();
                SpdSolver::new(kernel)
                    .solve(order, Uplo::Lower, 10, 1, factor.view_mut(), x.view_mut())
                    .unwrap();
                assert!(max_abs_diff(&a.matmul(&x).unwrap(), &b) < 1e-10);
            });
        }
    });
}
