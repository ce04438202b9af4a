//! Mathematical utilities for beam element calculations
//!
//! All element quantities use the local DOF order [w_i, θ_i, w_j, θ_j].

pub mod sparse;

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

use crate::analysis::LinearSolver;
use crate::error::{BeamError, BeamResult};

pub use sparse::TripletBuilder;

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;

/// 4x4 matrix for element stiffness
pub type Mat4 = SMatrix<f64, 4, 4>;
/// 4-element vector for element forces/displacements
pub type Vec4 = SVector<f64, 4>;

/// Three-point Gauss-Legendre rule on [-1, 1] as (point, weight)
const GAUSS_3: [(f64, f64); 3] = [
    (-0.774_596_669_241_483_4, 5.0 / 9.0),
    (0.0, 8.0 / 9.0),
    (0.774_596_669_241_483_4, 5.0 / 9.0),
];

/// Compute the local stiffness matrix of a 2-node Euler-Bernoulli element
///
/// # Arguments
/// * `ei` - Flexural rigidity E * I
/// * `length` - Element length
pub fn beam_local_stiffness(ei: f64, length: f64) -> Mat4 {
    let l = length;
    let l2 = l * l;
    let c = ei / (l2 * l);

    #[rustfmt::skip]
    let data = [
        12.0,      6.0 * l,    -12.0,     6.0 * l,
        6.0 * l,   4.0 * l2,   -6.0 * l,  2.0 * l2,
        -12.0,     -6.0 * l,   12.0,      -6.0 * l,
        6.0 * l,   2.0 * l2,   -6.0 * l,  4.0 * l2,
    ];

    Mat4::from_row_slice(&data) * c
}

/// Cubic Hermite shape functions at local coordinate `xi` in [0, 1]
pub fn hermite_shape_functions(xi: f64, length: f64) -> [f64; 4] {
    let xi2 = xi * xi;
    let xi3 = xi2 * xi;
    [
        1.0 - 3.0 * xi2 + 2.0 * xi3,
        length * (xi - 2.0 * xi2 + xi3),
        3.0 * xi2 - 2.0 * xi3,
        length * (xi3 - xi2),
    ]
}

/// First derivatives d/dx of the Hermite shape functions
pub fn hermite_shape_derivatives(xi: f64, length: f64) -> [f64; 4] {
    let xi2 = xi * xi;
    [
        6.0 * (xi2 - xi) / length,
        1.0 - 4.0 * xi + 3.0 * xi2,
        6.0 * (xi - xi2) / length,
        3.0 * xi2 - 2.0 * xi,
    ]
}

/// Equivalent nodal loads for a uniform transverse load `q` over the element
pub fn uniform_load_vector(q: f64, length: f64) -> Vec4 {
    let l = length;
    Vec4::new(q * l / 2.0, q * l * l / 12.0, q * l / 2.0, -q * l * l / 12.0)
}

/// Equivalent nodal loads for a load varying linearly from `q_i` to `q_j`
///
/// With q(ξ) = q_i (1 - ξ) + q_j ξ the consistent load is
/// f_k = ℓ ∫₀¹ N_k(ξ) q(ξ) dξ. The moments of the shape functions are
///
/// ```text
/// ∫ N1 = 1/2      ∫ ξ N1 = 3/20
/// ∫ N2 = ℓ/12     ∫ ξ N2 = ℓ/30
/// ∫ N3 = 1/2      ∫ ξ N3 = 7/20
/// ∫ N4 = -ℓ/12    ∫ ξ N4 = -ℓ/20
/// ```
///
/// which gives
///
/// ```text
/// f = [ ℓ(7q_i + 3q_j)/20,  ℓ²(3q_i + 2q_j)/60,
///       ℓ(3q_i + 7q_j)/20, -ℓ²(2q_i + 3q_j)/60 ]
/// ```
///
/// and reduces to the uniform case for q_i = q_j.
pub fn linear_load_vector(q_i: f64, q_j: f64, length: f64) -> Vec4 {
    let l = length;
    let l2 = l * l;
    Vec4::new(
        l * (7.0 * q_i + 3.0 * q_j) / 20.0,
        l2 * (3.0 * q_i + 2.0 * q_j) / 60.0,
        l * (3.0 * q_i + 7.0 * q_j) / 20.0,
        -l2 * (2.0 * q_i + 3.0 * q_j) / 60.0,
    )
}

/// Equivalent nodal loads for a linear load acting on part of the element
///
/// The load runs from local position `a` (intensity `q_a`) to `b`
/// (intensity `q_b`). The integrand is at most quartic, so the 3-point
/// Gauss rule integrates it exactly.
pub fn partial_load_vector(q_a: f64, q_b: f64, a: f64, b: f64, length: f64) -> Vec4 {
    let half = (b - a) / 2.0;
    let mid = (a + b) / 2.0;

    let mut f = Vec4::zeros();
    for &(t, weight) in &GAUSS_3 {
        let x = mid + half * t;
        let q = q_a + (q_b - q_a) * (t + 1.0) / 2.0;
        let n = hermite_shape_functions(x / length, length);
        for k in 0..4 {
            f[k] += weight * half * q * n[k];
        }
    }
    f
}

/// Solve a symmetric stiffness system with a conditioning check
///
/// The matrix is scaled to unit diagonal before factorization so the pivot
/// check compares like with like regardless of the units of w and θ. The
/// solve fails with [`BeamError::SingularSystem`] when the ratio of the
/// smallest to the largest pivot falls below `tolerance`.
pub fn solve_symmetric(
    a: &Mat,
    b: &Vector,
    solver: LinearSolver,
    tolerance: f64,
) -> BeamResult<Vector> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return Err(BeamError::InvalidInput(format!(
            "system dimensions do not match: {}x{} matrix, {} right-hand side",
            a.nrows(),
            a.ncols(),
            b.len()
        )));
    }

    let mut scale = Vector::zeros(n);
    for i in 0..n {
        let d = a[(i, i)];
        if !d.is_finite() || d <= 0.0 {
            return Err(BeamError::SingularSystem(format!(
                "reduced stiffness has diagonal {} at row {}",
                d, i
            )));
        }
        scale[i] = 1.0 / d.sqrt();
    }

    let scaled = Mat::from_fn(n, n, |i, j| a[(i, j)] * scale[i] * scale[j]);
    let rhs = b.component_mul(&scale);

    let y = match solver {
        LinearSolver::Lu => {
            let lu = scaled.lu();
            check_pivots(lu.u().diagonal().iter().map(|p| p.abs()), tolerance)?;
            lu.solve(&rhs).ok_or_else(|| {
                BeamError::SingularSystem("LU factorization is singular".to_string())
            })?
        }
        LinearSolver::Cholesky => {
            let chol = scaled.cholesky().ok_or_else(|| {
                BeamError::SingularSystem(
                    "reduced stiffness is not positive definite".to_string(),
                )
            })?;
            check_pivots(chol.l().diagonal().iter().map(|p| p * p), tolerance)?;
            chol.solve(&rhs)
        }
    };

    Ok(y.component_mul(&scale))
}

fn check_pivots(pivots: impl Iterator<Item = f64>, tolerance: f64) -> BeamResult<()> {
    let pivots: Vec<f64> = pivots.collect();
    if pivots.iter().any(|p| !p.is_finite()) {
        return Err(BeamError::SingularSystem(
            "factorization produced non-finite pivots".to_string(),
        ));
    }
    let (min, max) = pivots
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    if max == 0.0 {
        return Ok(());
    }
    let ratio = min / max;
    if tolerance.is_nan() || ratio < tolerance {
        return Err(BeamError::SingularSystem(format!(
            "pivot ratio {:e} is below tolerance {:e}",
            ratio, tolerance
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = beam_local_stiffness(210e9 * 8.33e-6, 1.7);
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_local_stiffness_values() {
        let k = beam_local_stiffness(2.0, 2.0);
        // EI / L³ = 0.25
        assert_relative_eq!(k[(0, 0)], 3.0);
        assert_relative_eq!(k[(0, 1)], 3.0);
        assert_relative_eq!(k[(1, 1)], 4.0);
        assert_relative_eq!(k[(1, 3)], 2.0);
        assert_relative_eq!(k[(2, 3)], -3.0);
    }

    #[test]
    fn test_rigid_body_modes_produce_no_force() {
        let l = 2.5;
        let k = beam_local_stiffness(1.0e4, l);
        let translation = Vec4::new(1.0, 0.0, 1.0, 0.0);
        let rotation = Vec4::new(0.0, 1.0, l, 1.0);
        assert!((k * translation).norm() < 1e-9);
        assert!((k * rotation).norm() < 1e-9);
    }

    #[test]
    fn test_shape_functions_interpolate_nodal_values() {
        let l = 3.0;
        assert_eq!(hermite_shape_functions(0.0, l), [1.0, 0.0, 0.0, 0.0]);
        let end = hermite_shape_functions(1.0, l);
        assert_relative_eq!(end[0], 0.0);
        assert_relative_eq!(end[1], 0.0);
        assert_relative_eq!(end[2], 1.0);
        assert_relative_eq!(end[3], 0.0);

        let d0 = hermite_shape_derivatives(0.0, l);
        assert_relative_eq!(d0[1], 1.0);
        let d1 = hermite_shape_derivatives(1.0, l);
        assert_relative_eq!(d1[3], 1.0);
        assert_relative_eq!(d1[0], 0.0);
    }

    #[test]
    fn test_uniform_load_vector() {
        let f = uniform_load_vector(-1200.0, 2.0);
        assert_relative_eq!(f[0], -1200.0);
        assert_relative_eq!(f[1], -400.0);
        assert_relative_eq!(f[2], -1200.0);
        assert_relative_eq!(f[3], 400.0);
    }

    #[test]
    fn test_linear_load_reduces_to_uniform() {
        let f_lin = linear_load_vector(-5.0, -5.0, 1.3);
        let f_uni = uniform_load_vector(-5.0, 1.3);
        assert_relative_eq!(f_lin, f_uni, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_load_total_force() {
        // Triangular load 0 -> q has resultant qL/2 split 1/3 : 2/3
        let f = linear_load_vector(0.0, 60.0, 2.0);
        assert_relative_eq!(f[0] + f[2], 60.0);
        assert_relative_eq!(f[0], 18.0);
        assert_relative_eq!(f[2], 42.0);
        assert_relative_eq!(f[1], 8.0);
        assert_relative_eq!(f[3], -12.0);
    }

    #[test]
    fn test_partial_load_over_full_length_matches_closed_form() {
        let l = 1.8;
        let f_gauss = partial_load_vector(3.0, -7.0, 0.0, l, l);
        let f_exact = linear_load_vector(3.0, -7.0, l);
        assert_relative_eq!(f_gauss, f_exact, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_load_resultant() {
        let f = partial_load_vector(10.0, 10.0, 0.5, 1.5, 2.0);
        assert_relative_eq!(f[0] + f[2], 10.0, epsilon = 1e-12);
        // Symmetric placement gives equal end shears and opposite moments
        assert_relative_eq!(f[0], f[2], epsilon = 1e-12);
        assert_relative_eq!(f[1], -f[3], epsilon = 1e-12);
    }

    #[test]
    fn test_solve_symmetric_both_solvers() {
        let a = Mat::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let b = Vector::from_vec(vec![1.0, 2.0, 3.0]);
        for solver in [LinearSolver::Lu, LinearSolver::Cholesky] {
            let x = solve_symmetric(&a, &b, solver, 1e-14).unwrap();
            assert_relative_eq!(&a * &x, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_solve_symmetric_detects_singular() {
        let a = Mat::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = Vector::from_vec(vec![1.0, 1.0]);
        for solver in [LinearSolver::Lu, LinearSolver::Cholesky] {
            assert!(matches!(
                solve_symmetric(&a, &b, solver, 1e-14),
                Err(BeamError::SingularSystem(_))
            ));
        }
    }

    #[test]
    fn test_solve_symmetric_zero_diagonal() {
        let a = Mat::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let b = Vector::zeros(2);
        assert!(solve_symmetric(&a, &b, LinearSolver::Lu, 1e-14).is_err());
    }

    #[test]
    fn test_solve_symmetric_rejects_non_finite_diagonal() {
        let b = Vector::from_vec(vec![1.0, 1.0]);
        for d in [f64::NAN, f64::INFINITY, -2.0] {
            let a = Mat::from_row_slice(2, 2, &[2.0, 0.0, 0.0, d]);
            assert!(matches!(
                solve_symmetric(&a, &b, LinearSolver::Lu, 1e-14),
                Err(BeamError::SingularSystem(_))
            ));
        }
    }

    #[test]
    fn test_pivot_ratio_check() {
        assert!(check_pivots([1.0, 0.5].into_iter(), 1e-14).is_ok());
        assert!(check_pivots([1.0, 1e-16].into_iter(), 1e-14).is_err());
        assert!(check_pivots([1.0, f64::NAN].into_iter(), 1e-14).is_err());
        assert!(check_pivots([1.0, 0.5].into_iter(), f64::NAN).is_err());
    }
}
