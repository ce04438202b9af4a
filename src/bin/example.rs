//! Beam FEM example - cantilever with tip load, or a JSON problem file
//!
//! Usage: `beam-example [problem.json] [out.vtk]`

use std::env;

use anyhow::{Context, Result};
use beam_fem::prelude::*;
use log::info;

fn builtin_cantilever() -> BeamResult<BeamProblem> {
    // Steel cantilever, 5 m long, 1 kN downward at the tip
    //
    //  |====================== v P
    //  N0                      N10
    //
    let json = r#"{
        "geometry": { "e": 210e9, "i": 8.33e-6, "length": 5.0, "area": 0.01 },
        "mesh": { "elements": 10 },
        "supports": [ { "node": 0, "w": 0.0, "theta": 0.0 } ],
        "point_loads": [ { "node": 10, "kind": "displacement", "magnitude": -1000.0 } ],
        "analysis": { "check_statics": true }
    }"#;
    BeamProblem::from_json_str(json)
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let problem = match args.first() {
        Some(path) => BeamProblem::from_json_file(path)
            .with_context(|| format!("failed to read problem {}", path))?,
        None => builtin_cantilever()?,
    };
    let output = args.get(1).map(String::as_str).unwrap_or("beam.vtk");

    println!("=== Beam FEM ===\n");
    let (model, solution) = problem.run().context("analysis failed")?;
    let post = PostProcessing::from_solution(&model.mesh, &solution)?;

    println!("Node Displacements:");
    for node in 0..model.mesh.num_nodes() {
        let x = model.mesh.node_coordinate(node)?;
        let disp = post.node_displacement(node)?;
        println!(
            "  N{:<3} x={:>7.3}m  w={:>10.4}mm  θ={:>10.6}rad",
            node,
            x,
            disp.w * 1000.0,
            disp.theta
        );
    }

    println!("\nSupport Reactions:");
    for rxn in post.support_reactions(&model.bcs) {
        println!(
            "  N{}: F={:.3}kN, M={:.3}kN·m",
            rxn.node,
            rxn.force / 1000.0,
            rxn.moment / 1000.0
        );
    }

    let forces = model.fem()?.element_end_forces(&solution)?;
    println!("\nElement End Forces:");
    for f in &forces {
        println!(
            "  E{}: V_i={:.3}kN, M_i={:.3}kN·m, V_j={:.3}kN, M_j={:.3}kN·m",
            f.element,
            f.shear_i / 1000.0,
            f.moment_i / 1000.0,
            f.shear_j / 1000.0,
            f.moment_j / 1000.0
        );
    }

    let summary = post.summary();
    println!("\nSummary:\n{}", summary.to_json()?);

    post.export_to_vtk_with(output, &VtkOptions::default().with_reactions())
        .with_context(|| format!("failed to write {}", output))?;
    info!("wrote {}", output);

    println!("\n=== Analysis Complete ===");
    Ok(())
}
