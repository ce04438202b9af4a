//! Node loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};

use crate::elements::DofKind;

/// A concentrated force or moment at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLoad {
    /// Node index
    pub node: usize,
    /// Force (on w) or moment (on θ)
    pub kind: DofKind,
    /// Magnitude in N or N·m
    pub magnitude: f64,
}

impl NodeLoad {
    /// Create a new node load
    pub fn new(node: usize, kind: DofKind, magnitude: f64) -> Self {
        Self {
            node,
            kind,
            magnitude,
        }
    }

    /// Transverse force at a node
    pub fn force(node: usize, magnitude: f64) -> Self {
        Self::new(node, DofKind::Displacement, magnitude)
    }

    /// Concentrated moment at a node
    pub fn moment(node: usize, magnitude: f64) -> Self {
        Self::new(node, DofKind::Rotation, magnitude)
    }
}
