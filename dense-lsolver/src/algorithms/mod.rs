//! Direct solve algorithms: factor `A` in place, then solve `B` in place.
//!
//! Both solvers are stateless apart from their kernel and options; every call
//! is independent and a failed factorization ends the call.

use serde::{Deserialize, Serialize};

pub mod general;
pub mod spd;

pub use general::{
    solve_general_system, solve_general_system_raw, GeneralSolveInfo, GeneralSolver,
};
pub use spd::{solve_spd_system, solve_spd_system_raw, SpdSolver};

/// Options shared by both direct solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Reject NaN/Inf in the inputs before any factorization work is done.
    /// For SPD systems only the declared triangle of `A` is inspected.
    pub check_finite: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { check_finite: true }
    }
}

impl SolveOptions {
    /// Creates a new set of options with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new set of options with specified parameters.
    pub fn with_params(check_finite: bool) -> Self {
        Self { check_finite }
    }
}
