//! Material and section properties of the beam

use serde::Serialize;

use crate::error::{BeamError, BeamResult};

/// Material and cross-section properties shared by every element.
///
/// All values are in SI base units. A `Geometry` is validated on
/// construction and cannot be changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    /// Modulus of elasticity (Young's modulus) in Pa
    e: f64,
    /// Second moment of area in m⁴
    i: f64,
    /// Total beam length in m
    l: f64,
    /// Cross-sectional area in m²
    a: f64,
}

impl Geometry {
    /// Create a new geometry from E, I, L and A
    pub fn new(e: f64, i: f64, l: f64, a: f64) -> BeamResult<Self> {
        for (name, value) in [("E", e), ("I", i), ("L", l), ("A", a)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BeamError::InvalidGeometry(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(Self { e, i, l, a })
    }

    /// Create a geometry for a solid rectangular section
    ///
    /// A = b * h, I = b * h³ / 12 (bending about the axis parallel to `width`)
    pub fn rectangular(e: f64, width: f64, height: f64, length: f64) -> BeamResult<Self> {
        Self::new(
            e,
            width * height.powi(3) / 12.0,
            length,
            width * height,
        )
    }

    /// Young's modulus
    pub fn e(&self) -> f64 {
        self.e
    }

    /// Second moment of area
    pub fn i(&self) -> f64 {
        self.i
    }

    /// Beam length
    pub fn l(&self) -> f64 {
        self.l
    }

    /// Cross-sectional area
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Flexural rigidity EI
    pub fn ei(&self) -> f64 {
        self.e * self.i
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_geometry() {
        let g = Geometry::new(210e9, 8.33e-6, 5.0, 0.01).unwrap();
        assert_eq!(g.l(), 5.0);
        assert_relative_eq!(g.ei(), 210e9 * 8.33e-6);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(matches!(
            Geometry::new(0.0, 1.0, 1.0, 1.0),
            Err(BeamError::InvalidGeometry(_))
        ));
        assert!(Geometry::new(1.0, -1.0, 1.0, 1.0).is_err());
        assert!(Geometry::new(1.0, 1.0, f64::NAN, 1.0).is_err());
        assert!(Geometry::new(1.0, 1.0, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_rectangular_section() {
        let g = Geometry::rectangular(200e9, 0.1, 0.2, 3.0).unwrap();
        assert_relative_eq!(g.a(), 0.02);
        assert_relative_eq!(g.i(), 0.1 * 0.008 / 12.0);
    }
}
