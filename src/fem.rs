//! Beam finite element model: assembly and linear static solve

use std::cell::OnceCell;

use log::{debug, info, warn};

use crate::analysis::{AnalysisOptions, ConstraintMethod};
use crate::boundary_conditions::BoundaryConditions;
use crate::elements::{element_dofs, global_dof, DofKind, Geometry, Mesh};
use crate::error::{BeamError, BeamResult};
use crate::math::{self, Mat, Mat4, TripletBuilder, Vec4, Vector};
use crate::postprocess::PostProcessing;
use crate::results::{ElementForces, Solution};

/// Linear static model of an Euler-Bernoulli beam
///
/// Borrows the geometry, mesh and boundary conditions for its whole
/// lifetime, so none of them can change while the assembled stiffness
/// matrix and load vector are cached.
#[derive(Debug)]
pub struct BeamFem<'a> {
    geometry: &'a Geometry,
    mesh: &'a Mesh,
    bcs: &'a BoundaryConditions,
    options: AnalysisOptions,
    stiffness: OnceCell<Mat>,
    loads: OnceCell<Vector>,
}

impl<'a> BeamFem<'a> {
    /// Create a model with default analysis options
    pub fn new(
        geometry: &'a Geometry,
        mesh: &'a Mesh,
        bcs: &'a BoundaryConditions,
    ) -> BeamResult<Self> {
        if !bcs.matches_mesh(mesh) {
            return Err(BeamError::InvalidInput(format!(
                "boundary conditions were built for a different mesh ({} nodes, model mesh has {})",
                bcs.num_nodes(),
                mesh.num_nodes()
            )));
        }
        Ok(Self {
            geometry,
            mesh,
            bcs,
            options: AnalysisOptions::default(),
            stiffness: OnceCell::new(),
            loads: OnceCell::new(),
        })
    }

    /// Replace the analysis options
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    // ========================
    // Assembly
    // ========================

    /// Local stiffness matrix of an element
    pub fn element_stiffness(&self, element: usize) -> BeamResult<Mat4> {
        let length = self.mesh.element_length(element)?;
        Ok(math::beam_local_stiffness(self.geometry.ei(), length))
    }

    /// Equivalent nodal loads of all distributed loads on an element
    pub fn element_load_vector(&self, element: usize) -> BeamResult<Vec4> {
        let length = self.mesh.element_length(element)?;
        Ok(self
            .bcs
            .distributed_loads()
            .iter()
            .filter(|load| load.element == element)
            .fold(Vec4::zeros(), |acc, load| {
                acc + load.equivalent_nodal_loads(length)
            }))
    }

    /// Global stiffness matrix K, assembled on first use
    pub fn assemble_global_stiffness(&self) -> &Mat {
        self.stiffness.get_or_init(|| {
            let ei = self.geometry.ei();
            let nodes = self.mesh.nodes();
            let mut builder = TripletBuilder::new(self.mesh.num_dofs());

            for &(i, j) in self.mesh.elements() {
                let k_local = math::beam_local_stiffness(ei, nodes[j] - nodes[i]);
                builder.add_element_matrix(&element_dofs(i, j), &k_local);
            }

            debug!(
                "assembled {}x{} stiffness from {} elements ({} triplets)",
                builder.size(),
                builder.size(),
                self.mesh.num_elements(),
                builder.nnz()
            );
            builder.to_dense()
        })
    }

    /// Global load vector F, assembled on first use
    pub fn assemble_global_load_vector(&self) -> &Vector {
        self.loads.get_or_init(|| {
            let nodes = self.mesh.nodes();
            let mut f = Vector::zeros(self.mesh.num_dofs());

            for load in self.bcs.point_loads() {
                f[global_dof(load.node, load.kind)] += load.magnitude;
            }

            for load in self.bcs.distributed_loads() {
                let (i, j) = self.mesh.elements()[load.element];
                let f_eq = load.equivalent_nodal_loads(nodes[j] - nodes[i]);
                for (k, &dof) in element_dofs(i, j).iter().enumerate() {
                    f[dof] += f_eq[k];
                }
            }

            debug!(
                "assembled load vector: {} point loads, {} distributed loads",
                self.bcs.point_loads().count(),
                self.bcs.distributed_loads().len()
            );
            f
        })
    }

    // ========================
    // Solution
    // ========================

    /// Check that the supports suppress both rigid-body modes
    ///
    /// An unsupported beam can translate (w = a) and rotate (w = b x). The
    /// reduced stiffness is regular only if no combination of the two
    /// satisfies every constraint, which takes either two displacement
    /// constraints at different nodes or one displacement and one rotation
    /// constraint.
    pub fn check_stability(&self) -> BeamResult<()> {
        let mut w_nodes = Vec::new();
        let mut has_rotation = false;
        for (node, kind, _) in self.bcs.dirichlet() {
            match kind {
                DofKind::Displacement => w_nodes.push(node),
                DofKind::Rotation => has_rotation = true,
            }
        }

        let rank = match (w_nodes.len(), has_rotation) {
            (0, false) => 0,
            (0, true) | (1, false) => 1,
            _ => 2,
        };

        if rank < 2 {
            let reason = match (w_nodes.first(), has_rotation) {
                (None, false) => "no supports are defined".to_string(),
                (None, true) => "no transverse displacement is restrained".to_string(),
                (Some(node), _) => format!("the beam can rotate freely about node {}", node),
            };
            return Err(BeamError::SingularSystem(format!(
                "{} of 2 rigid-body modes unrestrained: {}",
                2 - rank,
                reason
            )));
        }
        Ok(())
    }

    /// Solve K U = F for the nodal displacements
    ///
    /// Uses whatever constraints exist at call time. Returns the full
    /// displacement vector with the stiffness matrix and load vector.
    pub fn solve(&self) -> BeamResult<Solution> {
        if self.options.check_stability {
            self.check_stability()?;
        }

        let k = self.assemble_global_stiffness();
        let f = self.assemble_global_load_vector();
        let n_dofs = self.mesh.num_dofs();

        // Partition DOFs with explicit index arrays
        let mut u = Vector::zeros(n_dofs);
        let mut is_constrained = vec![false; n_dofs];
        let mut constrained: Vec<usize> = Vec::new();
        for (node, kind, value) in self.bcs.dirichlet() {
            let dof = global_dof(node, kind);
            is_constrained[dof] = true;
            constrained.push(dof);
            u[dof] = value;
        }
        let free: Vec<usize> = (0..n_dofs).filter(|&d| !is_constrained[d]).collect();

        debug!(
            "partitioned {} DOFs: {} free, {} constrained",
            n_dofs,
            free.len(),
            constrained.len()
        );

        if free.is_empty() {
            warn!("all DOFs are constrained; nothing to solve");
            return Ok(Solution::new(u, k.clone(), f.clone(), 0));
        }

        match self.options.constraint_method {
            ConstraintMethod::Elimination => {
                let n_free = free.len();
                let k_ff = Mat::from_fn(n_free, n_free, |a, b| k[(free[a], free[b])]);
                let rhs = Vector::from_fn(n_free, |a, _| {
                    let coupling: f64 = constrained
                        .iter()
                        .map(|&c| k[(free[a], c)] * u[c])
                        .sum();
                    f[free[a]] - coupling
                });

                let u_f = math::solve_symmetric(
                    &k_ff,
                    &rhs,
                    self.options.solver,
                    self.options.singular_tolerance,
                )?;
                for (a, &dof) in free.iter().enumerate() {
                    u[dof] = u_f[a];
                }
            }
            ConstraintMethod::Penalty { scale } => {
                let max_diag = k.diagonal().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
                let alpha = scale * max_diag;

                let mut k_pen = k.clone();
                let mut f_pen = f.clone();
                for &c in &constrained {
                    k_pen[(c, c)] += alpha;
                    f_pen[c] += alpha * u[c];
                }

                let u_full = math::solve_symmetric(
                    &k_pen,
                    &f_pen,
                    self.options.solver,
                    self.options.singular_tolerance,
                )?;
                for &dof in &free {
                    u[dof] = u_full[dof];
                }
            }
        }

        let solution = Solution::new(u, k.clone(), f.clone(), free.len());

        let max_w = (0..self.mesh.num_nodes())
            .map(|node| solution.displacements()[global_dof(node, DofKind::Displacement)].abs())
            .fold(0.0_f64, f64::max);
        info!(
            "solved {} free DOFs ({} constrained), max |w| = {:e}",
            solution.free_dofs(),
            solution.constrained_dofs(),
            max_w
        );

        if self.options.check_statics {
            self.check_statics(&solution)?;
        }

        Ok(solution)
    }

    /// Check that the support reactions balance the applied loads
    ///
    /// Compares the force and moment residuals against the largest applied
    /// load or reaction, scaled by `statics_tolerance`. Logs a warning and
    /// returns `false` when they do not balance.
    pub fn check_statics(&self, solution: &Solution) -> BeamResult<bool> {
        let post = PostProcessing::from_solution(self.mesh, solution)?;
        let residual = post.equilibrium_residual(self.bcs);
        let reference = solution
            .loads()
            .iter()
            .chain(post.reaction_force().iter())
            .fold(0.0_f64, |m, v| m.max(v.abs()))
            .max(f64::MIN_POSITIVE);

        let tol = self.options.statics_tolerance;
        let balanced = residual.force.abs() <= tol * reference
            && residual.moment.abs() <= tol * reference * self.geometry.l();
        if balanced {
            debug!(
                "statics check passed: force residual {:e}, moment residual {:e}",
                residual.force, residual.moment
            );
        } else {
            warn!(
                "statics check failed: force residual {:e}, moment residual {:e}",
                residual.force, residual.moment
            );
        }
        Ok(balanced)
    }

    /// End forces of every element for a solved displacement field
    pub fn element_end_forces(&self, solution: &Solution) -> BeamResult<Vec<ElementForces>> {
        let u = solution.displacements();
        if u.len() != self.mesh.num_dofs() {
            return Err(BeamError::InvalidInput(format!(
                "solution has {} DOFs, mesh has {}",
                u.len(),
                self.mesh.num_dofs()
            )));
        }

        self.mesh
            .elements()
            .iter()
            .enumerate()
            .map(|(element, &(i, j))| {
                let dofs = element_dofs(i, j);
                let u_e = Vec4::from_fn(|k, _| u[dofs[k]]);
                let f_e = self.element_stiffness(element)? * u_e
                    - self.element_load_vector(element)?;
                Ok(ElementForces::from_array(
                    element,
                    [f_e[0], f_e[1], f_e[2], f_e[3]],
                ))
            })
            .collect()
    }
}
