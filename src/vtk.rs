//! Legacy VTK output for ParaView visualization
//!
//! Writes the beam as an ASCII unstructured grid of line cells with the
//! nodal deflection, rotation and optional reactions as point data, and
//! reads such files back.
//!
//! ```text
//! # vtk DataFile Version 3.0
//! beam-fem results
//! ASCII
//! DATASET UNSTRUCTURED_GRID
//! POINTS 3 double
//! ...
//! ```

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::elements::{global_dof, DofKind, Mesh};
use crate::error::{BeamError, BeamResult};
use crate::math::Vector;

/// VTK cell type code for a 2-node line
pub const VTK_LINE: u8 = 3;

/// Options for VTK export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VtkOptions {
    /// Write points at (x, scale * w, 0) instead of the undeformed axis
    pub deformed_scale: Option<f64>,
    /// Add reaction force and moment point data
    pub include_reactions: bool,
}

impl VtkOptions {
    pub fn deformed(mut self, scale: f64) -> Self {
        self.deformed_scale = Some(scale);
        self
    }

    pub fn with_reactions(mut self) -> Self {
        self.include_reactions = true;
        self
    }
}

/// VTK writer for a solved beam
pub struct VtkWriter<'a> {
    mesh: &'a Mesh,
    displacements: &'a Vector,
    reactions: Option<&'a Vector>,
    options: &'a VtkOptions,
}

impl<'a> VtkWriter<'a> {
    /// Create a writer; `reactions` is only written if the options ask for it
    pub fn new(
        mesh: &'a Mesh,
        displacements: &'a Vector,
        reactions: Option<&'a Vector>,
        options: &'a VtkOptions,
    ) -> BeamResult<Self> {
        let n = mesh.num_dofs();
        if displacements.len() != n {
            return Err(BeamError::InvalidInput(format!(
                "displacement vector has {} entries, mesh has {} DOFs",
                displacements.len(),
                n
            )));
        }
        if let Some(r) = reactions {
            if r.len() != n {
                return Err(BeamError::InvalidInput(format!(
                    "reaction vector has {} entries, mesh has {} DOFs",
                    r.len(),
                    n
                )));
            }
        }
        Ok(Self {
            mesh,
            displacements,
            reactions,
            options,
        })
    }

    /// Write a legacy VTK file
    ///
    /// Output goes to a temporary file next to `path` which replaces `path`
    /// only once everything is written. On error the temporary file is
    /// removed and `path` is left untouched.
    pub fn write_vtk<P: AsRef<Path>>(&self, path: P) -> BeamResult<()> {
        let path = path.as_ref();
        let tmp = temporary_path(path);

        let result = self
            .write_to_file(&tmp)
            .and_then(|()| fs::rename(&tmp, path));
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp);
            return Err(BeamError::Export(err));
        }

        debug!(
            "wrote VTK file {} ({} points, {} cells)",
            path.display(),
            self.mesh.num_nodes(),
            self.mesh.num_elements()
        );
        Ok(())
    }

    fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write(&mut file)?;
        file.flush()
    }

    /// Write the whole dataset to any writer
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_vtk_header(out)?;
        self.write_vtk_points(out)?;
        self.write_vtk_cells(out)?;
        self.write_vtk_point_data(out)?;
        Ok(())
    }

    fn write_vtk_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "# vtk DataFile Version 3.0")?;
        writeln!(out, "beam-fem results")?;
        writeln!(out, "ASCII")?;
        writeln!(out, "DATASET UNSTRUCTURED_GRID")?;
        Ok(())
    }

    fn write_vtk_points<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "POINTS {} double", self.mesh.num_nodes())?;
        for (node, &x) in self.mesh.nodes().iter().enumerate() {
            let y = match self.options.deformed_scale {
                Some(scale) => scale * self.value(node, DofKind::Displacement),
                None => 0.0,
            };
            writeln!(out, "{:e} {:e} {:e}", x, y, 0.0)?;
        }
        Ok(())
    }

    fn write_vtk_cells<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let num_elements = self.mesh.num_elements();

        // Each cell: count + 2 node indices
        writeln!(out, "CELLS {} {}", num_elements, 3 * num_elements)?;
        for &(i, j) in self.mesh.elements() {
            writeln!(out, "2 {} {}", i, j)?;
        }

        writeln!(out, "CELL_TYPES {}", num_elements)?;
        for _ in 0..num_elements {
            writeln!(out, "{}", VTK_LINE)?;
        }
        Ok(())
    }

    fn write_vtk_point_data<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "POINT_DATA {}", self.mesh.num_nodes())?;

        self.write_scalars(out, "deflection", self.displacements, DofKind::Displacement)?;
        self.write_scalars(out, "rotation", self.displacements, DofKind::Rotation)?;

        writeln!(out, "VECTORS displacement double")?;
        for node in 0..self.mesh.num_nodes() {
            let w = self.value(node, DofKind::Displacement);
            writeln!(out, "{:e} {:e} {:e}", 0.0, w, 0.0)?;
        }

        if self.options.include_reactions {
            if let Some(reactions) = self.reactions {
                self.write_scalars(out, "reaction_force", reactions, DofKind::Displacement)?;
                self.write_scalars(out, "reaction_moment", reactions, DofKind::Rotation)?;
            }
        }
        Ok(())
    }

    fn write_scalars<W: Write>(
        &self,
        out: &mut W,
        name: &str,
        data: &Vector,
        kind: DofKind,
    ) -> io::Result<()> {
        writeln!(out, "SCALARS {} double 1", name)?;
        writeln!(out, "LOOKUP_TABLE default")?;
        for node in 0..self.mesh.num_nodes() {
            writeln!(out, "{:e}", data[global_dof(node, kind)])?;
        }
        Ok(())
    }

    fn value(&self, node: usize, kind: DofKind) -> f64 {
        self.displacements[global_dof(node, kind)]
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or(OsStr::new("output.vtk")));
    name.push(".tmp");
    path.with_file_name(name)
}

// ========================
// Reading
// ========================

/// Contents of a legacy ASCII unstructured-grid VTK file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VtkDataset {
    pub title: String,
    pub points: Vec<[f64; 3]>,
    pub cells: Vec<Vec<usize>>,
    pub cell_types: Vec<u8>,
    /// Scalar point data by name
    pub scalars: BTreeMap<String, Vec<f64>>,
    /// Vector point data by name
    pub vectors: BTreeMap<String, Vec<[f64; 3]>>,
}

impl VtkDataset {
    /// Read a VTK file from disk
    pub fn read<P: AsRef<Path>>(path: P) -> BeamResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| BeamError::read(path, err))?;
        Self::parse(&text)
    }

    /// Parse legacy ASCII VTK text
    pub fn parse(text: &str) -> BeamResult<Self> {
        let mut lines = text.lines();

        let header = lines.next().unwrap_or_default();
        if !header.starts_with("# vtk DataFile") {
            return Err(BeamError::VtkFormat(format!("bad header line '{}'", header)));
        }
        let title = lines.next().unwrap_or_default().trim().to_string();
        let encoding = lines.next().unwrap_or_default().trim();
        if encoding != "ASCII" {
            return Err(BeamError::VtkFormat(format!(
                "unsupported encoding '{}', expected ASCII",
                encoding
            )));
        }

        let body: Vec<&str> = lines.flat_map(str::split_whitespace).collect();
        let mut tokens = Tokens {
            tokens: body,
            pos: 0,
        };

        let mut data = VtkDataset {
            title,
            ..Default::default()
        };
        let mut num_point_data: Option<usize> = None;

        while let Some(keyword) = tokens.next() {
            match keyword {
                "DATASET" => {
                    let kind = tokens.expect_token("dataset type")?;
                    if kind != "UNSTRUCTURED_GRID" {
                        return Err(BeamError::VtkFormat(format!(
                            "unsupported dataset '{}'",
                            kind
                        )));
                    }
                }
                "POINTS" => {
                    let n = tokens.usize("point count")?;
                    tokens.expect_token("point data type")?;
                    data.points = tokens.triples(n, "point coordinate")?;
                }
                "CELLS" => {
                    let m = tokens.usize("cell count")?;
                    let size = tokens.usize("cell list size")?;
                    let mut read = 0;
                    for _ in 0..m {
                        let count = tokens.usize("cell node count")?;
                        let nodes = (0..count)
                            .map(|_| tokens.usize("cell node index"))
                            .collect::<BeamResult<Vec<_>>>()?;
                        read += 1 + count;
                        data.cells.push(nodes);
                    }
                    if read != size {
                        return Err(BeamError::VtkFormat(format!(
                            "CELLS declares list size {} but contains {}",
                            size, read
                        )));
                    }
                }
                "CELL_TYPES" => {
                    let m = tokens.usize("cell type count")?;
                    data.cell_types = (0..m)
                        .map(|_| {
                            let t = tokens.expect_token("cell type")?;
                            t.parse::<u8>().map_err(|_| {
                                BeamError::VtkFormat(format!("invalid cell type '{}'", t))
                            })
                        })
                        .collect::<BeamResult<Vec<_>>>()?;
                }
                "POINT_DATA" => {
                    num_point_data = Some(tokens.usize("point data count")?);
                }
                "SCALARS" => {
                    let n = num_point_data.ok_or_else(|| {
                        BeamError::VtkFormat("SCALARS before POINT_DATA".to_string())
                    })?;
                    let name = tokens.expect_token("scalar name")?.to_string();
                    tokens.expect_token("scalar data type")?;
                    // Optional component count, then the lookup table line
                    let mut next = tokens.expect_token("LOOKUP_TABLE")?;
                    if next != "LOOKUP_TABLE" {
                        if next != "1" {
                            return Err(BeamError::VtkFormat(format!(
                                "scalar field '{}' has {} components, only 1 is supported",
                                name, next
                            )));
                        }
                        next = tokens.expect_token("LOOKUP_TABLE")?;
                    }
                    if next != "LOOKUP_TABLE" {
                        return Err(BeamError::VtkFormat(format!(
                            "expected LOOKUP_TABLE, found '{}'",
                            next
                        )));
                    }
                    tokens.expect_token("lookup table name")?;
                    let values = (0..n)
                        .map(|_| tokens.f64("scalar value"))
                        .collect::<BeamResult<Vec<_>>>()?;
                    data.scalars.insert(name, values);
                }
                "VECTORS" => {
                    let n = num_point_data.ok_or_else(|| {
                        BeamError::VtkFormat("VECTORS before POINT_DATA".to_string())
                    })?;
                    let name = tokens.expect_token("vector name")?.to_string();
                    tokens.expect_token("vector data type")?;
                    let values = tokens.triples(n, "vector component")?;
                    data.vectors.insert(name, values);
                }
                other => {
                    return Err(BeamError::VtkFormat(format!(
                        "unexpected keyword '{}'",
                        other
                    )));
                }
            }
        }

        Ok(data)
    }

    /// Scalar field by name
    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name).map(Vec::as_slice)
    }

    /// Vector field by name
    pub fn vector(&self, name: &str) -> Option<&[[f64; 3]]> {
        self.vectors.get(name).map(Vec::as_slice)
    }
}

struct Tokens<'t> {
    tokens: Vec<&'t str>,
    pos: usize,
}

impl<'t> Tokens<'t> {
    fn next(&mut self) -> Option<&'t str> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_token(&mut self, what: &str) -> BeamResult<&'t str> {
        self.next()
            .ok_or_else(|| BeamError::VtkFormat(format!("unexpected end of file, expected {}", what)))
    }

    fn usize(&mut self, what: &str) -> BeamResult<usize> {
        let token = self.expect_token(what)?;
        token
            .parse()
            .map_err(|_| BeamError::VtkFormat(format!("invalid {} '{}'", what, token)))
    }

    fn f64(&mut self, what: &str) -> BeamResult<f64> {
        let token = self.expect_token(what)?;
        token
            .parse()
            .map_err(|_| BeamError::VtkFormat(format!("invalid {} '{}'", what, token)))
    }

    fn triples(&mut self, n: usize, what: &str) -> BeamResult<Vec<[f64; 3]>> {
        (0..n)
            .map(|_| Ok([self.f64(what)?, self.f64(what)?, self.f64(what)?]))
            .collect()
    }
}
