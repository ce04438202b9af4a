//! JSON problem definitions
//!
//! ```json
//! {
//!   "geometry": { "e": 210e9, "i": 8.33e-6, "length": 5.0, "area": 0.01 },
//!   "mesh": { "elements": 10 },
//!   "supports": [ { "node": 0, "w": 0.0, "theta": 0.0 } ],
//!   "point_loads": [ { "node": 10, "kind": "displacement", "magnitude": -1000.0 } ],
//!   "distributed_loads": [ { "span": { "x_start": 0.0, "x_end": 5.0, "q_start": -200.0, "q_end": -200.0 } } ]
//! }
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::boundary_conditions::BoundaryConditions;
use crate::elements::{Geometry, Mesh, MeshSpec, Support};
use crate::error::{BeamError, BeamResult};
use crate::fem::BeamFem;
use crate::loads::{Intensity, NodeLoad};
use crate::results::Solution;

/// Section and span properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryInput {
    /// Young's modulus
    pub e: f64,
    /// Second moment of area
    pub i: f64,
    /// Beam length
    pub length: f64,
    /// Cross-section area
    pub area: f64,
}

/// Support at one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportInput {
    pub node: usize,
    #[serde(flatten)]
    pub support: Support,
}

/// A distributed load either on one element or over an axial span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributedInput {
    Element { element: usize, intensity: Intensity },
    Span {
        x_start: f64,
        x_end: f64,
        q_start: f64,
        q_end: f64,
    },
}

/// Complete beam problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamProblem {
    pub geometry: GeometryInput,
    pub mesh: MeshSpec,
    #[serde(default)]
    pub supports: Vec<SupportInput>,
    #[serde(default)]
    pub point_loads: Vec<NodeLoad>,
    #[serde(default)]
    pub distributed_loads: Vec<DistributedInput>,
    #[serde(default)]
    pub analysis: AnalysisOptions,
}

/// Validated model built from a [`BeamProblem`]
#[derive(Debug, Clone)]
pub struct BeamModel {
    pub geometry: Geometry,
    pub mesh: Mesh,
    pub bcs: BoundaryConditions,
    pub options: AnalysisOptions,
}

impl BeamModel {
    /// Borrow the parts as a solver
    pub fn fem(&self) -> BeamResult<BeamFem<'_>> {
        Ok(BeamFem::new(&self.geometry, &self.mesh, &self.bcs)?.with_options(self.options.clone()))
    }
}

impl BeamProblem {
    pub fn from_json_str(json: &str) -> BeamResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> BeamResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| BeamError::read(path, err))?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> BeamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every input and build geometry, mesh and boundary conditions
    pub fn build(&self) -> BeamResult<BeamModel> {
        let g = &self.geometry;
        let geometry = Geometry::new(g.e, g.i, g.length, g.area)?;
        let mesh = Mesh::new(&geometry, self.mesh)?;

        let mut bcs = BoundaryConditions::new(&mesh);
        for s in &self.supports {
            bcs.add_dirichlet(s.node, s.support)?;
        }
        for &load in &self.point_loads {
            bcs.add_node_load(load)?;
        }
        for load in &self.distributed_loads {
            match *load {
                DistributedInput::Element { element, intensity } => {
                    bcs.add_distributed(element, intensity)?
                }
                DistributedInput::Span {
                    x_start,
                    x_end,
                    q_start,
                    q_end,
                } => bcs.add_distributed_span(x_start, x_end, q_start, q_end)?,
            }
        }

        info!(
            "built beam model: {} elements, {} constraints, {} point loads, {} distributed loads",
            mesh.num_elements(),
            bcs.num_constraints(),
            self.point_loads.len(),
            bcs.distributed_loads().len()
        );

        Ok(BeamModel {
            geometry,
            mesh,
            bcs,
            options: self.analysis.clone(),
        })
    }

    /// Build and solve
    pub fn run(&self) -> BeamResult<(BeamModel, Solution)> {
        let model = self.build()?;
        let solution = model.fem()?.solve()?;
        Ok((model, solution))
    }
}
