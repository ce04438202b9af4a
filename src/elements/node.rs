//! Nodal degrees of freedom

use serde::{Deserialize, Serialize};

use super::mesh::DOFS_PER_NODE;

/// The two degrees of freedom carried by every beam node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DofKind {
    /// Transverse displacement w
    Displacement,
    /// Rotation θ = dw/dx
    Rotation,
}

impl DofKind {
    /// Offset of this DOF within a node's block
    pub fn offset(self) -> usize {
        match self {
            DofKind::Displacement => 0,
            DofKind::Rotation => 1,
        }
    }

    /// Both kinds in global DOF order
    pub fn all() -> [DofKind; 2] {
        [DofKind::Displacement, DofKind::Rotation]
    }
}

/// Global DOF index: 2 * node + {0 for w, 1 for θ}
#[inline]
pub fn global_dof(node: usize, kind: DofKind) -> usize {
    node * DOFS_PER_NODE + kind.offset()
}

/// Global DOF indices of an element in [w_i, θ_i, w_j, θ_j] order
#[inline]
pub fn element_dofs(i_node: usize, j_node: usize) -> [usize; 4] {
    [
        global_dof(i_node, DofKind::Displacement),
        global_dof(i_node, DofKind::Rotation),
        global_dof(j_node, DofKind::Displacement),
        global_dof(j_node, DofKind::Rotation),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_dof_numbering() {
        assert_eq!(global_dof(0, DofKind::Displacement), 0);
        assert_eq!(global_dof(0, DofKind::Rotation), 1);
        assert_eq!(global_dof(3, DofKind::Displacement), 6);
        assert_eq!(global_dof(3, DofKind::Rotation), 7);
    }

    #[test]
    fn test_element_dofs() {
        assert_eq!(element_dofs(2, 3), [4, 5, 6, 7]);
    }
}
