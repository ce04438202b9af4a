//! Boundary conditions: supports (Dirichlet) and loads (Neumann)

use std::collections::BTreeMap;

use crate::elements::{DofKind, Mesh, Support};
use crate::error::{BeamError, BeamResult};
use crate::loads::{DistributedLoad, Intensity, NodeLoad};

/// Relative tolerance for snapping span ends onto element boundaries
const SPAN_TOLERANCE: f64 = 1e-9;

/// Supports and loads applied to a meshed beam
///
/// Dirichlet entries are unique per (node, DOF) and re-adding overwrites.
/// Point loads at the same (node, DOF) are summed. Distributed loads are
/// kept in insertion order.
#[derive(Debug, Clone)]
pub struct BoundaryConditions {
    /// Node coordinates of the mesh the conditions refer to
    nodes: Vec<f64>,
    /// Prescribed DOF values
    dirichlet: BTreeMap<(usize, DofKind), f64>,
    /// Accumulated point loads
    point_loads: BTreeMap<(usize, DofKind), f64>,
    /// Element line loads
    distributed: Vec<DistributedLoad>,
}

impl BoundaryConditions {
    /// Create an empty set of conditions for `mesh`
    pub fn new(mesh: &Mesh) -> Self {
        Self {
            nodes: mesh.nodes().to_vec(),
            dirichlet: BTreeMap::new(),
            point_loads: BTreeMap::new(),
            distributed: Vec::new(),
        }
    }

    /// Number of nodes of the mesh the conditions were built for
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Whether these conditions were built for `mesh`
    pub fn matches_mesh(&self, mesh: &Mesh) -> bool {
        self.nodes.as_slice() == mesh.nodes()
    }

    fn num_elements(&self) -> usize {
        self.nodes.len() - 1
    }

    fn check_node(&self, node: usize) -> BeamResult<()> {
        if node >= self.num_nodes() {
            return Err(BeamError::InvalidBoundaryCondition(format!(
                "node index {} out of range (mesh has {} nodes)",
                node,
                self.num_nodes()
            )));
        }
        Ok(())
    }

    fn check_element(&self, element: usize) -> BeamResult<()> {
        if element >= self.num_elements() {
            return Err(BeamError::InvalidBoundaryCondition(format!(
                "element index {} out of range (mesh has {} elements)",
                element,
                self.num_elements()
            )));
        }
        Ok(())
    }

    fn check_finite(what: &str, value: f64) -> BeamResult<()> {
        if !value.is_finite() {
            return Err(BeamError::InvalidBoundaryCondition(format!(
                "{} must be finite, got {}",
                what, value
            )));
        }
        Ok(())
    }

    // ========================
    // Dirichlet conditions
    // ========================

    /// Apply a support at a node
    ///
    /// Restrained components overwrite any earlier constraint on the same
    /// DOF; free components leave earlier constraints untouched.
    pub fn add_dirichlet(&mut self, node: usize, support: Support) -> BeamResult<()> {
        self.check_node(node)?;
        let restrained = support.restrained();
        for &(_, value) in &restrained {
            Self::check_finite("prescribed value", value)?;
        }
        for (kind, value) in restrained {
            self.dirichlet.insert((node, kind), value);
        }
        Ok(())
    }

    /// Prescribe a single DOF
    pub fn add_dirichlet_dof(&mut self, node: usize, kind: DofKind, value: f64) -> BeamResult<()> {
        self.check_node(node)?;
        Self::check_finite("prescribed value", value)?;
        self.dirichlet.insert((node, kind), value);
        Ok(())
    }

    /// Prescribed value of a DOF, `None` if free
    pub fn prescribed(&self, node: usize, kind: DofKind) -> Option<f64> {
        self.dirichlet.get(&(node, kind)).copied()
    }

    /// Constrained DOFs in (node, kind) order
    pub fn dirichlet(&self) -> impl Iterator<Item = (usize, DofKind, f64)> + '_ {
        self.dirichlet
            .iter()
            .map(|(&(node, kind), &value)| (node, kind, value))
    }

    pub fn num_constraints(&self) -> usize {
        self.dirichlet.len()
    }

    /// Nodes carrying at least one constraint
    pub fn supported_nodes(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.dirichlet.keys().map(|&(node, _)| node).collect();
        nodes.dedup();
        nodes
    }

    // ========================
    // Neumann conditions
    // ========================

    /// Add a concentrated force (on w) or moment (on θ) at a node
    ///
    /// Repeated loads on the same DOF are superposed.
    pub fn add_neumann_point(&mut self, node: usize, kind: DofKind, magnitude: f64) -> BeamResult<()> {
        self.check_node(node)?;
        Self::check_finite("load magnitude", magnitude)?;
        *self.point_loads.entry((node, kind)).or_insert(0.0) += magnitude;
        Ok(())
    }

    /// Add a [`NodeLoad`]
    pub fn add_node_load(&mut self, load: NodeLoad) -> BeamResult<()> {
        self.add_neumann_point(load.node, load.kind, load.magnitude)
    }

    /// Add a transverse line load over a whole element
    pub fn add_distributed(&mut self, element: usize, intensity: Intensity) -> BeamResult<()> {
        self.check_element(element)?;
        let (start, end) = intensity.end_values();
        Self::check_finite("load intensity", start)?;
        Self::check_finite("load intensity", end)?;
        self.distributed.push(DistributedLoad::new(element, intensity));
        Ok(())
    }

    /// Add a linearly varying line load between two axial positions
    ///
    /// The span may cross any number of elements. Each element receives the
    /// part of the load it carries, with the intensity interpolated at its
    /// boundaries.
    pub fn add_distributed_span(
        &mut self,
        x_start: f64,
        x_end: f64,
        q_start: f64,
        q_end: f64,
    ) -> BeamResult<()> {
        for (what, value) in [
            ("span start", x_start),
            ("span end", x_end),
            ("load intensity", q_start),
            ("load intensity", q_end),
        ] {
            Self::check_finite(what, value)?;
        }

        let length = self.nodes[self.nodes.len() - 1];
        let tol = SPAN_TOLERANCE * length;
        if x_start < -tol || x_end > length + tol || x_end - x_start <= tol {
            return Err(BeamError::InvalidBoundaryCondition(format!(
                "span [{}, {}] must be non-empty and lie within [0, {}]",
                x_start, x_end, length
            )));
        }
        let x_start = x_start.max(0.0);
        let x_end = x_end.min(length);

        let intensity_at = |x: f64| q_start + (q_end - q_start) * (x - x_start) / (x_end - x_start);

        let mut loads = Vec::new();
        for element in 0..self.num_elements() {
            let (xi, xj) = (self.nodes[element], self.nodes[element + 1]);
            let a = x_start.max(xi);
            let b = x_end.min(xj);
            if b - a <= tol {
                continue;
            }

            let (w1, w2) = (intensity_at(a), intensity_at(b));
            let covers_element = (a - xi).abs() <= tol && (xj - b).abs() <= tol;
            loads.push(if covers_element {
                DistributedLoad::new(element, Intensity::Linear { start: w1, end: w2 })
            } else {
                DistributedLoad::partial(element, w1, w2, a - xi, b - xi)
            });
        }

        self.distributed.extend(loads);
        Ok(())
    }

    /// Accumulated point loads in (node, kind) order
    pub fn point_loads(&self) -> impl Iterator<Item = NodeLoad> + '_ {
        self.point_loads
            .iter()
            .map(|(&(node, kind), &magnitude)| NodeLoad::new(node, kind, magnitude))
    }

    /// Accumulated point load on a DOF
    pub fn point_load(&self, node: usize, kind: DofKind) -> f64 {
        self.point_loads.get(&(node, kind)).copied().unwrap_or(0.0)
    }

    /// Element line loads in insertion order
    pub fn distributed_loads(&self) -> &[DistributedLoad] {
        &self.distributed
    }

    /// Resultant of all applied transverse forces (point and distributed)
    pub fn total_transverse_load(&self) -> f64 {
        let point: f64 = self
            .point_loads
            .iter()
            .filter(|((_, kind), _)| *kind == DofKind::Displacement)
            .map(|(_, &m)| m)
            .sum();
        let distributed: f64 = self
            .distributed
            .iter()
            .map(|load| {
                let length = self.nodes[load.element + 1] - self.nodes[load.element];
                load.total_force(length)
            })
            .sum();
        point + distributed
    }
}
