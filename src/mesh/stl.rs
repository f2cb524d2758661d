use super::SurfaceMesh;
use crate::{Result, Vert3d};
use log::info;
use std::fs::OpenOptions;

/// Read a .stl file (ascii or binary) and return a triangle `SurfaceMesh`, all the elements
/// being tagged 1
pub fn read_stl(file_name: &str) -> Result<SurfaceMesh> {
    info!("Read {file_name}");

    let mut file = OpenOptions::new().read(true).open(file_name)?;
    let stl = stl_io::read_stl(&mut file)?;

    let mut res = SurfaceMesh::empty();
    res.add_verts(
        stl.vertices
            .iter()
            .map(|v| Vert3d::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))),
    );
    for f in &stl.faces {
        res.add_elem(&f.vertices, 1)?;
    }

    info!(
        "{} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    Ok(res)
}
