//! Support conditions

use serde::{Deserialize, Serialize};

use super::node::DofKind;

/// Support conditions at a node
///
/// Each component is either `None` (free) or the prescribed value of that
/// DOF. A plain support prescribes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Prescribed transverse displacement
    pub w: Option<f64>,
    /// Prescribed rotation
    pub theta: Option<f64>,
}

impl Support {
    /// Create a new support with no restraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamped support (displacement and rotation restrained)
    pub fn fixed() -> Self {
        Self {
            w: Some(0.0),
            theta: Some(0.0),
        }
    }

    /// Pinned or roller support (displacement restrained, rotation free)
    pub fn pinned() -> Self {
        Self {
            w: Some(0.0),
            theta: None,
        }
    }

    /// Guided support (rotation restrained, displacement free)
    pub fn guided() -> Self {
        Self {
            w: None,
            theta: Some(0.0),
        }
    }

    /// Create a support with specific restraints
    pub fn with_restraints(w: bool, theta: bool) -> Self {
        Self {
            w: w.then_some(0.0),
            theta: theta.then_some(0.0),
        }
    }

    /// Set an enforced displacement
    pub fn with_enforced_w(mut self, value: f64) -> Self {
        self.w = Some(value);
        self
    }

    /// Set an enforced rotation
    pub fn with_enforced_theta(mut self, value: f64) -> Self {
        self.theta = Some(value);
        self
    }

    /// Prescribed value for a DOF, `None` if free
    pub fn value(&self, kind: DofKind) -> Option<f64> {
        match kind {
            DofKind::Displacement => self.w,
            DofKind::Rotation => self.theta,
        }
    }

    /// Restrained DOFs with their prescribed values
    pub fn restrained(&self) -> Vec<(DofKind, f64)> {
        DofKind::all()
            .into_iter()
            .filter_map(|kind| self.value(kind).map(|v| (kind, v)))
            .collect()
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.w.is_some() || self.theta.is_some()
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.restrained().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let support = Support::fixed();
        assert_eq!(support.w, Some(0.0));
        assert_eq!(support.theta, Some(0.0));
        assert_eq!(support.num_restrained(), 2);
    }

    #[test]
    fn test_pinned_support() {
        let support = Support::pinned();
        assert!(support.is_supported());
        assert_eq!(support.value(DofKind::Rotation), None);
        assert_eq!(support.num_restrained(), 1);
    }

    #[test]
    fn test_free_support() {
        assert!(!Support::new().is_supported());
        assert_eq!(Support::with_restraints(false, true), Support::guided());
    }

    #[test]
    fn test_enforced_displacement() {
        let support = Support::pinned().with_enforced_w(-0.01);
        assert_eq!(support.restrained(), vec![(DofKind::Displacement, -0.01)]);
    }
}
