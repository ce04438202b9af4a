//! Analysis options

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};

/// How Dirichlet constraints enter the linear system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMethod {
    /// Solve only the free-DOF partition: K_ff u_f = F_f - K_fc u_c
    #[default]
    Elimination,
    /// Add stiff springs of `scale * max|K_ii|` at constrained DOFs
    Penalty { scale: f64 },
}

impl ConstraintMethod {
    /// Penalty scale used when none is given
    pub const DEFAULT_PENALTY_SCALE: f64 = 1e8;

    /// Penalty method with the default scale
    pub fn penalty() -> Self {
        Self::Penalty {
            scale: Self::DEFAULT_PENALTY_SCALE,
        }
    }
}

/// Direct factorization used for the reduced system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolver {
    /// LU with partial pivoting
    #[default]
    Lu,
    /// Cholesky (the reduced stiffness is symmetric positive definite)
    Cholesky,
}

/// Options for the linear static solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Constraint enforcement
    pub constraint_method: ConstraintMethod,
    /// Factorization
    pub solver: LinearSolver,
    /// Smallest accepted ratio of min to max pivot of the scaled system
    pub singular_tolerance: f64,
    /// Check that the supports suppress both rigid-body modes before solving
    pub check_stability: bool,
    /// Check static equilibrium after analysis
    pub check_statics: bool,
    /// Relative tolerance of the equilibrium check
    pub statics_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            constraint_method: ConstraintMethod::Elimination,
            solver: LinearSolver::Lu,
            singular_tolerance: 1e-14,
            check_stability: true,
            check_statics: false,
            statics_tolerance: 1e-6,
        }
    }
}

impl AnalysisOptions {
    /// Default options: elimination with LU
    pub fn linear() -> Self {
        Self::default()
    }

    /// Use the penalty method with the given scale factor
    pub fn with_penalty(mut self, scale: f64) -> Self {
        self.constraint_method = ConstraintMethod::Penalty { scale };
        self
    }

    /// Select the factorization
    pub fn with_solver(mut self, solver: LinearSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Set the singularity tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.singular_tolerance = tol;
        self
    }

    /// Enable the equilibrium check
    pub fn with_statics_check(mut self) -> Self {
        self.check_statics = true;
        self
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> BeamResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> BeamResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| BeamError::read(path, err))?;
        Self::from_json_str(&text)
    }
}
