//! Result types for beam analysis

use serde::{Deserialize, Serialize};

use crate::error::BeamResult;
use crate::math::{Mat, Vector};

/// Output of [`BeamFem::solve`](crate::fem::BeamFem::solve)
///
/// Holds the global displacement vector together with the stiffness matrix
/// and load vector it was solved from. The triple is immutable once built.
#[derive(Debug, Clone)]
pub struct Solution {
    displacements: Vector,
    stiffness: Mat,
    loads: Vector,
    free_dofs: usize,
}

impl Solution {
    pub(crate) fn new(displacements: Vector, stiffness: Mat, loads: Vector, free_dofs: usize) -> Self {
        Self {
            displacements,
            stiffness,
            loads,
            free_dofs,
        }
    }

    /// Global DOF vector U
    pub fn displacements(&self) -> &Vector {
        &self.displacements
    }

    /// Global stiffness matrix K
    pub fn stiffness(&self) -> &Mat {
        &self.stiffness
    }

    /// Global load vector F
    pub fn loads(&self) -> &Vector {
        &self.loads
    }

    /// Number of DOFs that were solved for
    pub fn free_dofs(&self) -> usize {
        self.free_dofs
    }

    /// Number of DOFs with prescribed values
    pub fn constrained_dofs(&self) -> usize {
        self.displacements.len() - self.free_dofs
    }

    /// Split into (U, K, F)
    pub fn into_parts(self) -> (Vector, Mat, Vector) {
        (self.displacements, self.stiffness, self.loads)
    }
}

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Transverse displacement
    pub w: f64,
    /// Rotation
    pub theta: f64,
}

/// Reaction force and moment at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeReaction {
    pub node: usize,
    /// Transverse reaction force
    pub force: f64,
    /// Reaction moment
    pub moment: f64,
}

/// End forces of one element in the DOF directions [F_i, M_i, F_j, M_j]
///
/// Computed as k_e u_e minus the equivalent nodal loads of the element's
/// distributed loads, i.e. the forces the nodes exert on the element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementForces {
    pub element: usize,
    pub shear_i: f64,
    pub moment_i: f64,
    pub shear_j: f64,
    pub moment_j: f64,
}

impl ElementForces {
    /// Create from an element force array [F_i, M_i, F_j, M_j]
    pub fn from_array(element: usize, forces: [f64; 4]) -> Self {
        Self {
            element,
            shear_i: forces[0],
            moment_i: forces[1],
            shear_j: forces[2],
            moment_j: forces[3],
        }
    }
}

/// Deflection sampled along the beam axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeflectionCurve {
    /// Axial positions
    pub x: Vec<f64>,
    /// Transverse displacement at each position
    pub w: Vec<f64>,
}

impl DeflectionCurve {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Sample with the largest absolute deflection as (x, w)
    pub fn max_abs(&self) -> Option<(f64, f64)> {
        self.x
            .iter()
            .zip(&self.w)
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(&x, &w)| (x, w))
    }
}

/// Residual of the global equilibrium equations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumCheck {
    /// Sum of transverse reactions and applied forces
    pub force: f64,
    /// Sum of moments about x = 0
    pub moment: f64,
}

/// Summary of analysis results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Maximum absolute nodal deflection
    pub max_deflection: f64,
    /// Node with maximum deflection
    pub max_deflection_node: usize,
    /// Maximum absolute nodal rotation
    pub max_rotation: f64,
    /// Node with maximum rotation
    pub max_rotation_node: usize,
    /// Largest absolute reaction force
    pub max_reaction: f64,
    /// Total number of nodes
    pub num_nodes: usize,
    /// Total number of elements
    pub num_elements: usize,
    /// Total DOFs
    pub total_dofs: usize,
    /// Free DOFs (unknown)
    pub free_dofs: usize,
    /// Constrained DOFs (prescribed)
    pub constrained_dofs: usize,
}

impl AnalysisSummary {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> BeamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
