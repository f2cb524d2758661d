//! Text format, one record per line:
//! ```text
//! # Element centroid points <n>
//! vertex E <i> { x y z }
//! # boundary mid points <n>
//! vertex B <i> { x y z }
//! # connection mid points <n>
//! vertex B <i> { x y z }
//! # hard vertices <n>              (only if hard vertices were exported)
//! vertex B <i> { x y z }
//! # polygons <n>
//! poly <I|B> { i j k ... }
//! ```
use crate::{
    Result,
    dual::{DualMesh, DualVertex, DualVertexKind, FanKind},
};
use std::io::Write;

fn write_vertex<W: Write>(out: &mut W, i: usize, v: &DualVertex) -> Result<()> {
    let tag = match v.kind {
        DualVertexKind::Centroid => 'E',
        DualVertexKind::BoundaryMid | DualVertexKind::ConnectionMid | DualVertexKind::HardVertex => {
            'B'
        }
    };
    let p = &v.coords;
    writeln!(out, "vertex {tag} {i} {{ {} {} {} }}", p[0], p[1], p[2])?;
    Ok(())
}

/// Write `mesh` to `out`
pub fn write_dual<W: Write>(mesh: &DualMesh, out: &mut W) -> Result<()> {
    let sections = [
        ("Element centroid points", mesh.n_centroids()),
        ("boundary mid points", mesh.n_boundary_mids()),
        ("connection mid points", mesh.n_connection_mids()),
        ("hard vertices", mesh.n_hard_vertices()),
    ];

    let mut verts = mesh.verts().enumerate();
    for (i_section, (name, n)) in sections.into_iter().enumerate() {
        if i_section == 3 && n == 0 {
            continue;
        }
        writeln!(out, "# {name} {n}")?;
        for (i, v) in verts.by_ref().take(n) {
            write_vertex(out, i, v)?;
        }
    }

    writeln!(out, "# polygons {}", mesh.n_polygons())?;
    for p in mesh.polygons() {
        let tag = match p.kind {
            FanKind::Closed => 'I',
            FanKind::Open => 'B',
        };
        write!(out, "poly {tag} {{")?;
        for i in &p.members {
            write!(out, " {i}")?;
        }
        writeln!(out, " }}")?;
    }
    out.flush()?;

    Ok(())
}
