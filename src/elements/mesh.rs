//! One-dimensional beam mesh

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use crate::error::{BeamError, BeamResult};

/// Degrees of freedom per node (transverse displacement and rotation)
pub const DOFS_PER_NODE: usize = 2;

/// Relative tolerance used when matching coordinates to the beam ends
const COORD_TOLERANCE: f64 = 1e-9;

/// How the beam is divided into elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshSpec {
    /// A fixed number of equal-length elements
    Elements(usize),
    /// A target element length; the last element is shortened to reach L
    ElementSize(f64),
}

/// Nodes along the beam axis and the elements joining consecutive nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    nodes: Vec<f64>,
    elements: Vec<(usize, usize)>,
}

impl Mesh {
    /// Build a mesh from a [`MeshSpec`]
    pub fn new(geometry: &Geometry, spec: MeshSpec) -> BeamResult<Self> {
        match spec {
            MeshSpec::Elements(n) => Self::uniform(geometry, n),
            MeshSpec::ElementSize(size) => Self::with_element_size(geometry, size),
        }
    }

    /// Divide the beam into `num_elements` elements of length L / n
    pub fn uniform(geometry: &Geometry, num_elements: usize) -> BeamResult<Self> {
        if num_elements < 1 {
            return Err(BeamError::InvalidMesh(
                "number of elements must be at least 1".to_string(),
            ));
        }

        let length = geometry.l();
        let h = length / num_elements as f64;
        let mut nodes: Vec<f64> = (0..num_elements).map(|i| i as f64 * h).collect();
        nodes.push(length);

        Ok(Self::from_sorted_nodes(nodes))
    }

    /// Divide the beam into elements of length `size`
    ///
    /// If L is not a multiple of `size` the last element is truncated so the
    /// mesh ends exactly at L. A remainder below the coordinate tolerance is
    /// absorbed by the previous element instead of forming a sliver.
    pub fn with_element_size(geometry: &Geometry, size: f64) -> BeamResult<Self> {
        let length = geometry.l();
        if !size.is_finite() || size <= 0.0 {
            return Err(BeamError::InvalidMesh(format!(
                "element size must be positive and finite, got {}",
                size
            )));
        }
        if size > length * (1.0 + COORD_TOLERANCE) {
            return Err(BeamError::InvalidMesh(format!(
                "element size {} exceeds beam length {}",
                size, length
            )));
        }

        let full = (length / size).floor() as usize;
        let remainder = length - full as f64 * size;

        let mut nodes: Vec<f64> = (0..full).map(|i| i as f64 * size).collect();
        if remainder > COORD_TOLERANCE * length || full == 0 {
            nodes.push(full as f64 * size);
        }
        nodes.push(length);

        // Guard against the absorbed-remainder case leaving a duplicate end node
        nodes.dedup_by(|b, a| (*b - *a).abs() <= COORD_TOLERANCE * length);
        if let Some(last) = nodes.last_mut() {
            *last = length;
        }

        Ok(Self::from_sorted_nodes(nodes))
    }

    /// Build a (possibly graded) mesh from explicit node coordinates
    pub fn from_coordinates(geometry: &Geometry, coords: Vec<f64>) -> BeamResult<Self> {
        let length = geometry.l();
        let tol = COORD_TOLERANCE * length;

        if coords.len() < 2 {
            return Err(BeamError::InvalidMesh(format!(
                "at least 2 node coordinates are required, got {}",
                coords.len()
            )));
        }
        if coords.iter().any(|x| !x.is_finite()) {
            return Err(BeamError::InvalidMesh(
                "node coordinates must be finite".to_string(),
            ));
        }
        if coords[0].abs() > tol {
            return Err(BeamError::InvalidMesh(format!(
                "first node must be at 0, got {}",
                coords[0]
            )));
        }
        let last = coords[coords.len() - 1];
        if (last - length).abs() > tol {
            return Err(BeamError::InvalidMesh(format!(
                "last node must be at L = {}, got {}",
                length, last
            )));
        }
        if let Some(k) = coords.windows(2).position(|w| w[1] <= w[0]) {
            return Err(BeamError::InvalidMesh(format!(
                "node coordinates must be strictly increasing (nodes {} and {})",
                k,
                k + 1
            )));
        }

        let mut nodes = coords;
        let n = nodes.len();
        nodes[0] = 0.0;
        nodes[n - 1] = length;
        Ok(Self::from_sorted_nodes(nodes))
    }

    fn from_sorted_nodes(nodes: Vec<f64>) -> Self {
        let elements = (0..nodes.len() - 1).map(|i| (i, i + 1)).collect();
        Self { nodes, elements }
    }

    /// Node coordinates along the beam axis
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Element connectivity as (i-node, j-node) pairs
    pub fn elements(&self) -> &[(usize, usize)] {
        &self.elements
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Total number of global degrees of freedom
    pub fn num_dofs(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    /// Axial coordinate of a node
    pub fn node_coordinate(&self, node: usize) -> BeamResult<f64> {
        self.nodes.get(node).copied().ok_or_else(|| {
            BeamError::InvalidMesh(format!(
                "node index {} out of range (mesh has {} nodes)",
                node,
                self.nodes.len()
            ))
        })
    }

    /// Length of an element
    pub fn element_length(&self, element: usize) -> BeamResult<f64> {
        let (i, j) = self.elements.get(element).copied().ok_or_else(|| {
            BeamError::InvalidMesh(format!(
                "element index {} out of range (mesh has {} elements)",
                element,
                self.elements.len()
            ))
        })?;
        Ok(self.nodes[j] - self.nodes[i])
    }

    /// Element containing the axial position `x`
    ///
    /// Interior nodes belong to the element on their left, except node 0
    /// which belongs to element 0. Returns `None` outside [0, L].
    pub fn element_at(&self, x: f64) -> Option<usize> {
        let length = self.nodes[self.nodes.len() - 1];
        let tol = COORD_TOLERANCE * length;
        if !(x >= -tol && x <= length + tol) {
            return None;
        }
        // First node strictly greater than or equal to x bounds the element
        let upper = self.nodes.partition_point(|&n| n < x);
        Some(upper.saturating_sub(1).min(self.elements.len() - 1))
    }
}
