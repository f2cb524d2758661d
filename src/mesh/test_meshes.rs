//! Simple structured meshes, in the z = 0 plane
use super::SurfaceMesh;
use crate::{Tag, Vert3d};

/// Create a triangle mesh of a `lx` by `ly` rectangle by splitting a `nx` by `ny` uniform
/// structured grid. All the elements are tagged 1.
#[must_use]
pub fn rectangle_mesh(lx: f64, nx: usize, ly: f64, ny: usize) -> SurfaceMesh {
    structured_mesh(lx, nx, ly, ny, |_| 1)
}

/// Same as `rectangle_mesh`, but the elements in the right half (`x > lx / 2`) are tagged 2,
/// so that a connection curve runs along `x = lx / 2`. `nx` should be odd.
#[must_use]
pub fn two_zone_rectangle_mesh(lx: f64, nx: usize, ly: f64, ny: usize) -> SurfaceMesh {
    structured_mesh(lx, nx, ly, ny, |i| if 2 * i < nx - 1 { 1 } else { 2 })
}

fn structured_mesh<G: Fn(usize) -> Tag>(
    lx: f64,
    nx: usize,
    ly: f64,
    ny: usize,
    tag: G,
) -> SurfaceMesh {
    let dx = lx / (nx as f64 - 1.);
    let dy = ly / (ny as f64 - 1.);

    let idx = |i, j| i + j * nx;

    let mut verts = vec![Vert3d::zeros(); nx * ny];
    for i in 0..nx {
        for j in 0..ny {
            verts[idx(i, j)] = Vert3d::new(i as f64 * dx, j as f64 * dy, 0.0);
        }
    }

    let mut res = SurfaceMesh::empty();
    res.add_verts(verts.iter().copied());
    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            let t = tag(i);
            res.push_elem(&[idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)], t);
            res.push_elem(&[idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)], t);
        }
    }
    res
}
