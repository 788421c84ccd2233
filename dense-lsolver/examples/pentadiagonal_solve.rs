use dense_lsolver::{
    DenseMatrix, GeneralSolver, LinalgError, Matrix, ReferenceKernel, SpdSolver, StorageOrder,
    Uplo,
};
use std::time::Instant;

/// Creates a pentadiagonal matrix A of size n x n.
/// Diagonals:
/// - Main: 4.0
/// - Adjacent (+1, -1): -1.0
/// - Outer (+2, -2): -0.5
fn create_pentadiagonal_matrix(n: usize, order: StorageOrder) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(n, n, order, |i, j| match i.abs_diff(j) {
        0 => 4.0,
        1 => -1.0,
        2 => -0.5,
        _ => 0.0,
    })
}

/// Creates a right-hand side b of size n with b[i] = sin(i / n).
fn create_sin_vector(n: usize, order: StorageOrder) -> DenseMatrix<f64> {
    DenseMatrix::from_fn(n, 1, order, |i, _| (i as f64 / n as f64).sin())
}

/// Max-norm of `A·x - b`.
fn residual_norm(
    a: &DenseMatrix<f64>,
    x: &DenseMatrix<f64>,
    b: &DenseMatrix<f64>,
) -> Result<f64, LinalgError> {
    let ax = a.matmul(x)?;
    Ok((0..b.rows())
        .filter_map(|i| Some((ax.get(i, 0)? - b.get(i, 0)?).abs()))
        .fold(0.0, f64::max))
}

fn main() -> Result<(), LinalgError> {
    // Initialize logging based on RUST_LOG environment variable
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let n = 500;
    let order = StorageOrder::ColMajor;
    log::info!(
        "Setting up {}x{} pentadiagonal matrix A and sin vector b...",
        n,
        n
    );

    let a = create_pentadiagonal_matrix(n, order);
    let b = create_sin_vector(n, order);

    // A is symmetric and diagonally dominant, so both solvers apply.
    log::info!("Running Cholesky solver (lower triangle)...");
    let mut factor = a.clone();
    let mut x_spd = b.clone();
    let start_time = Instant::now();
    SpdSolver::new(ReferenceKernel).solve(
        order,
        Uplo::Lower,
        n,
        1,
        factor.view_mut(),
        x_spd.view_mut(),
    )?;
    let spd_duration = start_time.elapsed();
    log::info!("  Time elapsed: {:?}", spd_duration);
    log::info!("  Residual (max-norm): {:.6e}", residual_norm(&a, &x_spd, &b)?);

    log::info!("Running LU solver...");
    let mut lu = a.clone();
    let mut x_lu = b.clone();
    let start_time = Instant::now();
    let info =
        GeneralSolver::new(ReferenceKernel).solve(order, n, 1, lu.view_mut(), x_lu.view_mut())?;
    let lu_duration = start_time.elapsed();
    let swaps = info
        .pivots
        .as_slice()
        .iter()
        .enumerate()
        .filter(|(i, p)| i != *p)
        .count();
    log::info!("  Time elapsed: {:?}", lu_duration);
    log::info!("  Row interchanges: {}", swaps);
    log::info!("  Residual (max-norm): {:.6e}", residual_norm(&a, &x_lu, &b)?);

    let agreement = (0..n)
        .filter_map(|i| Some((x_spd.get(i, 0)? - x_lu.get(i, 0)?).abs()))
        .fold(0.0, f64::max);
    log::info!("Max difference between the two solutions: {:.6e}", agreement);
    log::debug!(
        "Solution vector x (first 10 elements): {:?}",
        &x_spd.data()[..10.min(n)]
    );

    Ok(())
}
