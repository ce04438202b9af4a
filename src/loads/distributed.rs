//! Distributed loads on elements

use serde::{Deserialize, Serialize};

use crate::math::{self, Vec4};

/// Load intensity over a whole element, force per unit length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    /// Constant intensity
    Uniform(f64),
    /// Varies linearly from `start` at the i-node to `end` at the j-node
    Linear { start: f64, end: f64 },
}

impl Intensity {
    /// Intensities at the i and j ends
    pub fn end_values(&self) -> (f64, f64) {
        match *self {
            Intensity::Uniform(q) => (q, q),
            Intensity::Linear { start, end } => (start, end),
        }
    }
}

/// A transverse line load acting on one element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Element index
    pub element: usize,
    /// Start magnitude (at start position)
    pub w1: f64,
    /// End magnitude (at end position)
    pub w2: f64,
    /// Loaded part of the element in local coordinates; `None` for the full length
    pub span: Option<(f64, f64)>,
}

impl DistributedLoad {
    /// Create a load over the full element length
    pub fn new(element: usize, intensity: Intensity) -> Self {
        let (w1, w2) = intensity.end_values();
        Self {
            element,
            w1,
            w2,
            span: None,
        }
    }

    /// Create a uniform load over the full element length
    pub fn uniform(element: usize, w: f64) -> Self {
        Self::new(element, Intensity::Uniform(w))
    }

    /// Create a load on the local sub-span [x1, x2] of an element
    pub fn partial(element: usize, w1: f64, w2: f64, x1: f64, x2: f64) -> Self {
        Self {
            element,
            w1,
            w2,
            span: Some((x1, x2)),
        }
    }

    /// Check if the load is uniform (constant magnitude)
    pub fn is_uniform(&self) -> bool {
        (self.w1 - self.w2).abs() <= 1e-12 * self.w1.abs().max(self.w2.abs())
    }

    /// Length of the loaded part for an element of length `length`
    pub fn loaded_length(&self, length: f64) -> f64 {
        match self.span {
            Some((x1, x2)) => x2 - x1,
            None => length,
        }
    }

    /// Get the total force from this load
    pub fn total_force(&self, length: f64) -> f64 {
        (self.w1 + self.w2) / 2.0 * self.loaded_length(length)
    }

    /// Consistent equivalent nodal loads [F_i, M_i, F_j, M_j]
    pub fn equivalent_nodal_loads(&self, length: f64) -> Vec4 {
        match self.span {
            None if self.is_uniform() => math::uniform_load_vector(self.w1, length),
            None => math::linear_load_vector(self.w1, self.w2, length),
            Some((x1, x2)) => math::partial_load_vector(self.w1, self.w2, x1, x2, length),
        }
    }
}
