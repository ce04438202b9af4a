//! Beam FEM - linear static analysis of 2D Euler-Bernoulli beams
//!
//! A straight prismatic beam is divided into two-node Hermite elements with
//! a transverse displacement w and a rotation θ at every node. The library
//! provides:
//! - Geometry and mesh generation (element count or target element size)
//! - Supports with prescribed values, point loads and distributed loads
//!   (uniform, linearly varying, partial-span)
//! - Global assembly and a direct solve with elimination or penalty constraints
//! - Reactions, Hermite deflection interpolation and legacy VTK export
//!
//! ## Example
//! ```rust
//! use beam_fem::prelude::*;
//!
//! let geometry = Geometry::new(210e9, 8.33e-6, 5.0, 0.01).unwrap();
//! let mesh = Mesh::uniform(&geometry, 10).unwrap();
//!
//! let mut bcs = BoundaryConditions::new(&mesh);
//! bcs.add_dirichlet(0, Support::fixed()).unwrap();
//! bcs.add_neumann_point(10, DofKind::Displacement, -1000.0).unwrap();
//!
//! let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
//! let solution = fem.solve().unwrap();
//!
//! let post = PostProcessing::from_solution(&mesh, &solution).unwrap();
//! let tip = post.deflection_at(5.0).unwrap();
//! let root = post.node_reactions(0).unwrap();
//! assert!(tip < 0.0);
//! assert!((root.force - 1000.0).abs() < 1e-6);
//! ```

pub mod analysis;
pub mod boundary_conditions;
pub mod elements;
pub mod error;
pub mod fem;
pub mod input;
pub mod loads;
pub mod math;
pub mod postprocess;
pub mod results;
pub mod vtk;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, ConstraintMethod, LinearSolver};
    pub use crate::boundary_conditions::BoundaryConditions;
    pub use crate::elements::{DofKind, Geometry, Mesh, MeshSpec, Support};
    pub use crate::error::{BeamError, BeamResult};
    pub use crate::fem::BeamFem;
    pub use crate::input::{BeamModel, BeamProblem};
    pub use crate::loads::{DistributedLoad, Intensity, NodeLoad};
    pub use crate::postprocess::PostProcessing;
    pub use crate::results::{
        AnalysisSummary, DeflectionCurve, ElementForces, NodeDisplacement, NodeReaction, Solution,
    };
    pub use crate::vtk::{VtkDataset, VtkOptions};
}
