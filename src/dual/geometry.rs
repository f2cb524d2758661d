//! Geometric helpers used to place the dual vertices
use crate::{Error, Result, Vert3d, mesh::GridModel};

/// Squared length below which a segment is considered degenerate
const DEGENERATE_SEGMENT_SQ: f64 = 1e-8;

/// Get the coordinates of the `i`th vertex of `model`
pub fn vertex<M: GridModel>(model: &M, i: usize) -> Result<Vert3d> {
    model
        .vert(i)
        .ok_or_else(|| Error::VertexLookupFailed { vertex: i }.into())
}

/// Arithmetic mean of the coordinates of the vertices of element `e`
pub fn centroid<M: GridModel>(model: &M, e: &[usize]) -> Result<Vert3d> {
    let mut res = Vert3d::zeros();
    for &i in e {
        res += vertex(model, i)?;
    }
    Ok(res / e.len() as f64)
}

/// Project `p` on the segment `[v0, v1]`: the projection on the line is clamped to the segment
/// end points. If the segment is degenerate, `v0` is returned.
#[must_use]
pub fn project(p: &Vert3d, v0: &Vert3d, v1: &Vert3d) -> Vert3d {
    let d = v1 - v0;
    let len_sq = d.norm_squared();
    if len_sq < DEGENERATE_SEGMENT_SQ {
        return *v0;
    }
    let t = (p - v0).dot(&d) / len_sq;
    v0 + t.clamp(0.0, 1.0) * d
}
