use approx::assert_relative_eq;
use beam_fem::prelude::*;

// Steel cantilever: E = 210 GPa, I = 8.33e-6 m^4, L = 5 m, P = -1 kN at the tip
const E: f64 = 210e9;
const I: f64 = 8.33e-6;
const L: f64 = 5.0;
const P: f64 = -1000.0;

fn build(n: usize) -> (Geometry, Mesh, BoundaryConditions) {
    let geometry = Geometry::new(E, I, L, 0.01).unwrap();
    let mesh = Mesh::uniform(&geometry, n).unwrap();
    let mut bcs = BoundaryConditions::new(&mesh);
    bcs.add_dirichlet(0, Support::fixed()).unwrap();
    bcs.add_neumann_point(n, DofKind::Displacement, P).unwrap();
    (geometry, mesh, bcs)
}

fn tip_deflection() -> f64 {
    P * L.powi(3) / (3.0 * E * I)
}

#[test]
fn tip_deflection_is_exact_for_any_mesh() {
    for &n in &[1usize, 4, 16] {
        let (geometry, mesh, bcs) = build(n);
        let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
        let solution = fem.solve().unwrap();

        let w_tip = solution.displacements()[2 * n];
        let theta_tip = solution.displacements()[2 * n + 1];
        assert_relative_eq!(w_tip, tip_deflection(), max_relative = 1e-6);
        assert_relative_eq!(theta_tip, P * L * L / (2.0 * E * I), max_relative = 1e-6);
    }
}

#[test]
fn reactions_balance_applied_load() {
    let (geometry, mesh, bcs) = build(8);
    let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
    let solution = fem.solve().unwrap();
    let post = PostProcessing::from_solution(&mesh, &solution).unwrap();

    let r = post.reaction_force();
    assert_relative_eq!(r[0], -P, max_relative = 1e-8);
    assert_relative_eq!(r[1], -P * L, max_relative = 1e-8);

    let scale = P.abs();
    for dof in 2..r.len() {
        assert!(r[dof].abs() < 1e-8 * scale * L, "DOF {}: {}", dof, r[dof]);
    }

    let total: f64 = post.support_reactions(&bcs).iter().map(|rxn| rxn.force).sum();
    assert_relative_eq!(total + bcs.total_transverse_load(), 0.0, epsilon = 1e-8);
}

#[test]
fn stiffness_is_symmetric() {
    let (geometry, mesh, bcs) = build(16);
    let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
    let k = fem.assemble_global_stiffness();
    assert_eq!(k.nrows(), 34);
    assert_relative_eq!(*k, k.transpose(), max_relative = 1e-12);
}

#[test]
fn solution_returns_assembled_system() {
    let (geometry, mesh, bcs) = build(4);
    let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
    let (u, k, f) = fem.solve().unwrap().into_parts();

    assert_eq!(&k, fem.assemble_global_stiffness());
    assert_eq!(&f, fem.assemble_global_load_vector());
    assert_eq!(u.len(), 10);
    assert_eq!(f[8], P);
}

#[test]
fn penalty_matches_elimination() {
    let (geometry, mesh, bcs) = build(8);
    let elimination = BeamFem::new(&geometry, &mesh, &bcs)
        .unwrap()
        .solve()
        .unwrap();
    let penalty = BeamFem::new(&geometry, &mesh, &bcs)
        .unwrap()
        .with_options(AnalysisOptions::default().with_penalty(1e8))
        .solve()
        .unwrap();

    assert_relative_eq!(
        penalty.displacements()[16],
        elimination.displacements()[16],
        max_relative = 1e-6
    );
    // Constrained DOFs hold their prescribed value exactly
    assert_eq!(penalty.displacements()[0], 0.0);
    assert_eq!(penalty.displacements()[1], 0.0);
}

#[test]
fn cholesky_matches_lu() {
    let (geometry, mesh, bcs) = build(8);
    let lu = BeamFem::new(&geometry, &mesh, &bcs).unwrap().solve().unwrap();
    let chol = BeamFem::new(&geometry, &mesh, &bcs)
        .unwrap()
        .with_options(AnalysisOptions::default().with_solver(LinearSolver::Cholesky))
        .solve()
        .unwrap();
    assert_relative_eq!(chol.displacements(), lu.displacements(), max_relative = 1e-10);
}

#[test]
fn element_size_mesh_gives_same_tip_deflection() {
    let geometry = Geometry::new(E, I, L, 0.01).unwrap();
    let mesh = Mesh::with_element_size(&geometry, 1.2).unwrap();
    let tip = mesh.num_nodes() - 1;
    let mut bcs = BoundaryConditions::new(&mesh);
    bcs.add_dirichlet(0, Support::fixed()).unwrap();
    bcs.add_neumann_point(tip, DofKind::Displacement, P).unwrap();

    let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
    let solution = fem.solve().unwrap();
    let post = PostProcessing::from_solution(&mesh, &solution).unwrap();
    assert_relative_eq!(post.deflection_at(L).unwrap(), tip_deflection(), max_relative = 1e-6);
}

#[test]
fn enforced_settlement_without_load() {
    // Fixed-fixed beam with the right end settled by delta
    let geometry = Geometry::new(E, I, L, 0.01).unwrap();
    let mesh = Mesh::uniform(&geometry, 6).unwrap();
    let delta = -0.01;
    let mut bcs = BoundaryConditions::new(&mesh);
    bcs.add_dirichlet(0, Support::fixed()).unwrap();
    bcs.add_dirichlet(6, Support::fixed().with_enforced_w(delta)).unwrap();

    let fem = BeamFem::new(&geometry, &mesh, &bcs).unwrap();
    let solution = fem.solve().unwrap();
    let post = PostProcessing::from_solution(&mesh, &solution).unwrap();

    assert_eq!(solution.displacements()[12], delta);
    // Shear 12 EI delta / L^3 and end moments 6 EI delta / L^2
    let left = post.node_reactions(0).unwrap();
    assert_relative_eq!(left.force, -12.0 * E * I * delta / L.powi(3), max_relative = 1e-8);
    assert_relative_eq!(left.moment, -6.0 * E * I * delta / L.powi(2), max_relative = 1e-8);
    // Midspan moves by half the settlement
    assert_relative_eq!(post.deflection_at(L / 2.0).unwrap(), delta / 2.0, max_relative = 1e-8);
}
