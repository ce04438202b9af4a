//! Post-processing of a solved beam: reactions, deflection interpolation
//! and export

use std::path::Path;

use crate::boundary_conditions::BoundaryConditions;
use crate::elements::{element_dofs, global_dof, DofKind, Mesh};
use crate::error::{BeamError, BeamResult};
use crate::math::{self, Mat, Vector};
use crate::results::{
    AnalysisSummary, DeflectionCurve, EquilibriumCheck, NodeDisplacement, NodeReaction, Solution,
};
use crate::vtk::{VtkOptions, VtkWriter};

/// Results view over a displacement field and the system it solves
#[derive(Debug)]
pub struct PostProcessing<'a> {
    mesh: &'a Mesh,
    u: &'a Vector,
    k: &'a Mat,
    f: &'a Vector,
    free_dofs: Option<usize>,
}

impl<'a> PostProcessing<'a> {
    /// Wrap U, K and F for a mesh
    pub fn new(mesh: &'a Mesh, u: &'a Vector, k: &'a Mat, f: &'a Vector) -> BeamResult<Self> {
        let n = mesh.num_dofs();
        if u.len() != n || f.len() != n || k.nrows() != n || k.ncols() != n {
            return Err(BeamError::InvalidInput(format!(
                "mesh has {} DOFs but U has {}, K is {}x{} and F has {}",
                n,
                u.len(),
                k.nrows(),
                k.ncols(),
                f.len()
            )));
        }
        Ok(Self {
            mesh,
            u,
            k,
            f,
            free_dofs: None,
        })
    }

    /// Wrap the output of a solve
    pub fn from_solution(mesh: &'a Mesh, solution: &'a Solution) -> BeamResult<Self> {
        let mut post = Self::new(
            mesh,
            solution.displacements(),
            solution.stiffness(),
            solution.loads(),
        )?;
        post.free_dofs = Some(solution.free_dofs());
        Ok(post)
    }

    // ========================
    // Reactions
    // ========================

    /// Reaction vector R = K U - F
    ///
    /// Nonzero only at constrained DOFs, up to roundoff.
    pub fn reaction_force(&self) -> Vector {
        self.k * self.u - self.f
    }

    /// Reaction force and moment at a node
    pub fn node_reactions(&self, node: usize) -> BeamResult<NodeReaction> {
        self.check_node(node)?;
        let r = self.reaction_force();
        Ok(NodeReaction {
            node,
            force: r[global_dof(node, DofKind::Displacement)],
            moment: r[global_dof(node, DofKind::Rotation)],
        })
    }

    /// Reactions at every node with at least one constrained DOF
    pub fn support_reactions(&self, bcs: &BoundaryConditions) -> Vec<NodeReaction> {
        let r = self.reaction_force();
        bcs.supported_nodes()
            .into_iter()
            .filter(|&node| node < self.mesh.num_nodes())
            .map(|node| NodeReaction {
                node,
                force: r[global_dof(node, DofKind::Displacement)],
                moment: r[global_dof(node, DofKind::Rotation)],
            })
            .collect()
    }

    /// Residual of global force and moment equilibrium
    ///
    /// Adds the reactions at the constrained DOFs of `bcs` to all applied
    /// nodal loads F, as transverse force and as moment about x = 0. Both
    /// vanish only if the free-DOF equations K U = F are satisfied.
    pub fn equilibrium_residual(&self, bcs: &BoundaryConditions) -> EquilibriumCheck {
        let r = self.reaction_force();
        let nodes = self.mesh.nodes();
        let mut force = 0.0;
        let mut moment = 0.0;

        for (node, kind, _) in bcs.dirichlet() {
            if node >= nodes.len() {
                continue;
            }
            let value = r[global_dof(node, kind)];
            match kind {
                DofKind::Displacement => {
                    force += value;
                    moment += value * nodes[node];
                }
                DofKind::Rotation => moment += value,
            }
        }

        for (node, &x) in nodes.iter().enumerate() {
            let fw = self.f[global_dof(node, DofKind::Displacement)];
            force += fw;
            moment += fw * x + self.f[global_dof(node, DofKind::Rotation)];
        }
        EquilibriumCheck { force, moment }
    }

    // ========================
    // Displacements
    // ========================

    /// Nodal deflection and rotation
    pub fn node_displacement(&self, node: usize) -> BeamResult<NodeDisplacement> {
        self.check_node(node)?;
        Ok(NodeDisplacement {
            w: self.u[global_dof(node, DofKind::Displacement)],
            theta: self.u[global_dof(node, DofKind::Rotation)],
        })
    }

    /// Deflection at axial position `x` from the element's Hermite interpolant
    pub fn deflection_at(&self, x: f64) -> BeamResult<f64> {
        let (xi, length, u_e) = self.locate(x)?;
        let n = math::hermite_shape_functions(xi, length);
        Ok(n.iter().zip(&u_e).map(|(n, u)| n * u).sum())
    }

    /// Rotation dw/dx at axial position `x`
    pub fn rotation_at(&self, x: f64) -> BeamResult<f64> {
        let (xi, length, u_e) = self.locate(x)?;
        let dn = math::hermite_shape_derivatives(xi, length);
        Ok(dn.iter().zip(&u_e).map(|(dn, u)| dn * u).sum())
    }

    fn locate(&self, x: f64) -> BeamResult<(f64, f64, [f64; 4])> {
        let element = self.mesh.element_at(x).ok_or_else(|| {
            BeamError::InvalidInput(format!(
                "position {} is outside the beam [0, {}]",
                x,
                self.mesh.nodes()[self.mesh.num_nodes() - 1]
            ))
        })?;
        let (i, j) = self.mesh.elements()[element];
        let nodes = self.mesh.nodes();
        let length = nodes[j] - nodes[i];
        let xi = ((x - nodes[i]) / length).clamp(0.0, 1.0);
        Ok((xi, length, self.element_dofs_values(i, j)))
    }

    fn element_dofs_values(&self, i: usize, j: usize) -> [f64; 4] {
        element_dofs(i, j).map(|dof| self.u[dof])
    }

    /// Deflection sampled at `points_per_element` points on every element
    ///
    /// Element end points are shared, so the curve has
    /// `num_elements * (points_per_element - 1) + 1` samples.
    pub fn deflection_curve(&self, points_per_element: usize) -> BeamResult<DeflectionCurve> {
        if points_per_element < 2 {
            return Err(BeamError::InvalidInput(format!(
                "need at least 2 points per element, got {}",
                points_per_element
            )));
        }

        let nodes = self.mesh.nodes();
        let segments = points_per_element - 1;
        let mut curve = DeflectionCurve::default();
        for (element, &(i, j)) in self.mesh.elements().iter().enumerate() {
            let length = nodes[j] - nodes[i];
            let u_e = self.element_dofs_values(i, j);
            let first = if element == 0 { 0 } else { 1 };
            for s in first..=segments {
                let xi = s as f64 / segments as f64;
                let n = math::hermite_shape_functions(xi, length);
                curve.x.push(nodes[i] + xi * length);
                curve.w.push(n.iter().zip(&u_e).map(|(n, u)| n * u).sum());
            }
        }
        Ok(curve)
    }

    /// Summary of extreme values and DOF counts
    pub fn summary(&self) -> AnalysisSummary {
        let mut summary = AnalysisSummary {
            num_nodes: self.mesh.num_nodes(),
            num_elements: self.mesh.num_elements(),
            total_dofs: self.mesh.num_dofs(),
            ..Default::default()
        };

        for node in 0..self.mesh.num_nodes() {
            let w = self.u[global_dof(node, DofKind::Displacement)].abs();
            let theta = self.u[global_dof(node, DofKind::Rotation)].abs();
            if w > summary.max_deflection {
                summary.max_deflection = w;
                summary.max_deflection_node = node;
            }
            if theta > summary.max_rotation {
                summary.max_rotation = theta;
                summary.max_rotation_node = node;
            }
        }

        let reactions = self.reaction_force();
        summary.max_reaction = reactions.iter().fold(0.0_f64, |m, r| m.max(r.abs()));

        if let Some(free) = self.free_dofs {
            summary.free_dofs = free;
            summary.constrained_dofs = summary.total_dofs - free;
        }
        summary
    }

    // ========================
    // Export
    // ========================

    /// Write the undeformed mesh with displacement point data as legacy VTK
    pub fn export_to_vtk<P: AsRef<Path>>(&self, path: P) -> BeamResult<()> {
        self.export_to_vtk_with(path, &VtkOptions::default())
    }

    /// Write legacy VTK with explicit options
    pub fn export_to_vtk_with<P: AsRef<Path>>(
        &self,
        path: P,
        options: &VtkOptions,
    ) -> BeamResult<()> {
        let reactions = options.include_reactions.then(|| self.reaction_force());
        VtkWriter::new(self.mesh, self.u, reactions.as_ref(), options)?.write_vtk(path)
    }

    fn check_node(&self, node: usize) -> BeamResult<()> {
        if node >= self.mesh.num_nodes() {
            return Err(BeamError::InvalidInput(format!(
                "node {} out of range (mesh has {} nodes)",
                node,
                self.mesh.num_nodes()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Geometry, Support};
    use crate::fem::BeamFem;
    use approx::assert_relative_eq;

    struct Cantilever {
        geometry: Geometry,
        mesh: Mesh,
        bcs: BoundaryConditions,
    }

    fn cantilever(n: usize, p: f64) -> Cantilever {
        let geometry = Geometry::new(210e9, 8.33e-6, 5.0, 0.01).unwrap();
        let mesh = Mesh::uniform(&geometry, n).unwrap();
        let mut bcs = BoundaryConditions::new(&mesh);
        bcs.add_dirichlet(0, Support::fixed()).unwrap();
        bcs.add_neumann_point(n, DofKind::Displacement, p).unwrap();
        Cantilever { geometry, mesh, bcs }
    }

    #[test]
    fn test_reactions_balance_tip_load() {
        let model = cantilever(4, -1000.0);
        let fem = BeamFem::new(&model.geometry, &model.mesh, &model.bcs).unwrap();
        let solution = fem.solve().unwrap();
        let post = PostProcessing::from_solution(&model.mesh, &solution).unwrap();

        let root = post.node_reactions(0).unwrap();
        assert_relative_eq!(root.force, 1000.0, max_relative = 1e-8);
        assert_relative_eq!(root.moment, 5000.0, max_relative = 1e-8);

        let r = post.reaction_force();
        for dof in 2..r.len() {
            assert!(r[dof].abs() < 1e-6, "free DOF {} has reaction {}", dof, r[dof]);
        }

        let supports = post.support_reactions(&model.bcs);
        assert_eq!(supports.len(), 1);
        assert_eq!(supports[0].node, 0);

        let residual = post.equilibrium_residual(&model.bcs);
        assert!(residual.force.abs() < 1e-6);
        assert!(residual.moment.abs() < 1e-6);
    }

    #[test]
    fn test_residual_detects_wrong_displacements() {
        let model = cantilever(4, -1000.0);
        let fem = BeamFem::new(&model.geometry, &model.mesh, &model.bcs).unwrap();
        let k = fem.assemble_global_stiffness();
        let f = fem.assemble_global_load_vector();

        // Supports honoured, free DOFs arbitrary
        let u = Vector::from_fn(10, |i, _| if i < 2 { 0.0 } else { 1e-3 * (i as f64).sin() });
        let post = PostProcessing::new(&model.mesh, &u, k, f).unwrap();
        let residual = post.equilibrium_residual(&model.bcs);
        assert!(residual.force.abs() > 1.0, "force residual {}", residual.force);

        // Without any load the exact solution is zero and balances trivially
        let zero = Vector::zeros(10);
        let unloaded = Vector::zeros(10);
        let post = PostProcessing::new(&model.mesh, &zero, k, &unloaded).unwrap();
        let residual = post.equilibrium_residual(&model.bcs);
        assert_eq!(residual.force, 0.0);
        assert_eq!(residual.moment, 0.0);
    }

    #[test]
    fn test_interpolation_matches_nodes_and_cubic() {
        // A single element reproduces the cubic tip-load deflection exactly
        let model = cantilever(1, -1000.0);
        let fem = BeamFem::new(&model.geometry, &model.mesh, &model.bcs).unwrap();
        let solution = fem.solve().unwrap();
        let post = PostProcessing::from_solution(&model.mesh, &solution).unwrap();

        let ei = model.geometry.ei();
        let l = 5.0;
        let p = -1000.0;
        for &x in &[0.0, 1.0, 2.5, 4.0, 5.0] {
            let exact = p * x * x * (3.0 * l - x) / (6.0 * ei);
            let slope = p * x * (2.0 * l - x) / (2.0 * ei);
            assert_relative_eq!(post.deflection_at(x).unwrap(), exact, epsilon = 1e-12);
            assert_relative_eq!(post.rotation_at(x).unwrap(), slope, epsilon = 1e-12);
        }

        let tip = post.node_displacement(1).unwrap();
        assert_relative_eq!(post.deflection_at(5.0).unwrap(), tip.w, max_relative = 1e-12);
        assert!(post.deflection_at(5.1).is_err());
        assert!(post.deflection_at(-0.1).is_err());
    }

    #[test]
    fn test_deflection_curve_shares_end_points() {
        let model = cantilever(3, -1000.0);
        let fem = BeamFem::new(&model.geometry, &model.mesh, &model.bcs).unwrap();
        let solution = fem.solve().unwrap();
        let post = PostProcessing::from_solution(&model.mesh, &solution).unwrap();

        let curve = post.deflection_curve(5).unwrap();
        assert_eq!(curve.len(), 3 * 4 + 1);
        assert_eq!(curve.x[0], 0.0);
        assert_relative_eq!(curve.x[curve.len() - 1], 5.0);
        assert!(curve.x.windows(2).all(|w| w[1] > w[0]));

        let (x_max, w_max) = curve.max_abs().unwrap();
        assert_relative_eq!(x_max, 5.0);
        assert_relative_eq!(w_max, solution.displacements()[6], max_relative = 1e-12);

        assert!(post.deflection_curve(1).is_err());
    }

    #[test]
    fn test_summary() {
        let model = cantilever(2, -1000.0);
        let fem = BeamFem::new(&model.geometry, &model.mesh, &model.bcs).unwrap();
        let solution = fem.solve().unwrap();
        let post = PostProcessing::from_solution(&model.mesh, &solution).unwrap();

        let summary = post.summary();
        assert_eq!(summary.max_deflection_node, 2);
        assert_eq!(summary.max_rotation_node, 2);
        assert_eq!(summary.total_dofs, 6);
        assert_eq!(summary.free_dofs, 4);
        assert_eq!(summary.constrained_dofs, 2);
        assert_relative_eq!(summary.max_reaction, 5000.0, max_relative = 1e-8);
    }

    #[test]
    fn test_dimension_mismatch() {
        let geometry = Geometry::new(1.0, 1.0, 1.0, 1.0).unwrap();
        let mesh = Mesh::uniform(&geometry, 2).unwrap();
        let u = Vector::zeros(6);
        let k = Mat::zeros(6, 6);
        let short = Vector::zeros(4);
        assert!(PostProcessing::new(&mesh, &u, &k, &u).is_ok());
        assert!(matches!(
            PostProcessing::new(&mesh, &u, &k, &short),
            Err(BeamError::InvalidInput(_))
        ));
        let post = PostProcessing::new(&mesh, &u, &k, &u).unwrap();
        assert!(post.node_displacement(3).is_err());
    }
}
