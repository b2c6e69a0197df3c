//! Loading scene geometry from STL files

use super::Scene;
use crate::{Iso3, Point3, Result, ScanError};
use std::fs::File;
use std::path::Path;

impl Scene {
    /// Read an STL file (ASCII or binary) and add it to the scene as a triangle mesh, transformed
    /// into the world by `iso`.
    pub fn add_stl(&mut self, path: &Path, iso: &Iso3, layer: u8) -> Result<()> {
        let mut file = File::open(path)?;
        let stl = stl_io::read_stl(&mut file)?;

        let vertices = stl
            .vertices
            .iter()
            .map(|v| iso * Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
            .collect::<Vec<_>>();

        let mut faces = Vec::with_capacity(stl.faces.len());
        for face in stl.faces.iter() {
            let [a, b, c] = face.vertices;
            let ids = [a, b, c].map(u32::try_from);
            match ids {
                [Ok(a), Ok(b), Ok(c)] => faces.push([a, b, c]),
                _ => {
                    return Err(ScanError::Geometry(format!(
                        "STL file {} has more vertices than a mesh can index",
                        path.display()
                    )));
                }
            }
        }

        self.add_mesh(vertices, faces, layer)
    }
}
