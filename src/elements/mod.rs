//! Beam geometry, mesh and supports

mod geometry;
mod mesh;
mod node;
mod support;

pub use geometry::Geometry;
pub use mesh::{Mesh, MeshSpec, DOFS_PER_NODE};
pub use node::{element_dofs, global_dof, DofKind};
pub use support::Support;
