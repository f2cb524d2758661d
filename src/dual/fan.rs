//! Radial ordering of the elements around a primal vertex
//!
//! The vertices of each element around `v` are rotated so that `v` comes first:
//! ```text
//!   3---------2
//!   | \   B   |      B = (0, 2, 3)
//!   |   \     |      right edge of A = (0, 1)
//!   |     \ A |      left edge of A = (2, 0) = reversed right edge of B
//!   0---------1      A = (0, 1, 2)
//! ```
//! Two elements are neighbors in the fan if the left edge of one is the reversed right edge
//! of the other. Fans are built by walking from element to element through the left edges
//! (counter-clockwise for consistently oriented elements), then through the right edges if
//! the fan is open; hard edges stop the walk.
use super::HardEdgeRegistry;
use crate::{Error, Result, mesh::GridModel};
use log::trace;
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Element around a pivot vertex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FanCell {
    /// Element index
    pub cell: usize,
    /// Element vertices, rotated so that the pivot comes first
    pub verts: Vec<usize>,
}

impl FanCell {
    /// Rotate the vertices of element `cell` so that `pivot` comes first
    pub fn new(cell: usize, e: &[usize], pivot: usize) -> Result<Self> {
        let i = e
            .iter()
            .position(|&j| j == pivot)
            .ok_or(Error::CellMissingVertex {
                cell,
                vertex: pivot,
            })?;
        let mut verts = e.to_vec();
        verts.rotate_left(i);
        Ok(Self { cell, verts })
    }

    /// Edge from the pivot to the next vertex
    #[must_use]
    pub fn right_edge(&self) -> [usize; 2] {
        [self.verts[0], self.verts[1]]
    }

    /// Edge from the previous vertex to the pivot
    #[must_use]
    pub fn left_edge(&self) -> [usize; 2] {
        [self.verts[self.verts.len() - 1], self.verts[0]]
    }
}

/// Closed (interior) or open (bounded by hard edges) fan
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FanKind {
    Closed,
    Open,
}

/// Elements around a vertex, in radial order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FanRun {
    pub kind: FanKind,
    /// Element indices, from the right-most to the left-most
    pub cells: Vec<usize>,
    /// Right edge of the right-most element
    pub right_edge: [usize; 2],
    /// Left edge of the left-most element
    pub left_edge: [usize; 2],
}

/// Polygon of the dual mesh around a primal vertex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DualPolygon {
    /// Primal vertex
    pub vertex: usize,
    pub kind: FanKind,
    /// Dual vertex indices
    pub members: Vec<usize>,
}

impl DualPolygon {
    /// Number of members that are element centroids
    #[must_use]
    pub fn n_cells(&self, n_centroids: usize) -> usize {
        self.members.iter().filter(|&&i| i < n_centroids).count()
    }
}

/// Neighbors of the elements in a fan, through their left and right edges
struct FanNeighbors {
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
}

/// Sorts the elements around a vertex into fans, the hard edges being read from a registry
pub struct FanSorter<'a> {
    hard_edges: &'a HardEdgeRegistry,
}

impl<'a> FanSorter<'a> {
    /// Create a sorter
    #[must_use]
    pub const fn new(hard_edges: &'a HardEdgeRegistry) -> Self {
        Self { hard_edges }
    }

    /// Get the elements `cells` around `vertex`, rotated
    pub fn fan_cells<M: GridModel>(
        model: &M,
        vertex: usize,
        cells: &[usize],
    ) -> Result<Vec<FanCell>> {
        cells
            .iter()
            .map(|&i| {
                let e = model.elem(i).ok_or(Error::ElementLookupFailed { elem: i })?;
                FanCell::new(i, e, vertex)
            })
            .collect()
    }

    /// Compute the neighbors through every left and right edges that is not hard
    fn neighbors(&self, vertex: usize, cells: &[FanCell]) -> Result<FanNeighbors> {
        let n = cells.len();
        let mut by_right = FxHashMap::with_capacity_and_hasher(n, FxBuildHasher);
        let mut by_left = FxHashMap::with_capacity_and_hasher(n, FxBuildHasher);
        for (i, c) in cells.iter().enumerate() {
            let right = c.right_edge();
            if by_right.insert(right[1], i).is_some() {
                return Err(Error::NonManifold {
                    vertex,
                    edge: right,
                }
                .into());
            }
            let left = c.left_edge();
            if by_left.insert(left[0], i).is_some() {
                return Err(Error::NonManifold { vertex, edge: left }.into());
            }
        }

        let left = cells
            .iter()
            .map(|c| {
                let edge = c.left_edge();
                if self.hard_edges.is_hard_edge(edge) {
                    None
                } else {
                    by_right.get(&edge[0]).copied()
                }
            })
            .collect();
        let right = cells
            .iter()
            .map(|c| {
                let edge = c.right_edge();
                if self.hard_edges.is_hard_edge(edge) {
                    None
                } else {
                    by_left.get(&edge[1]).copied()
                }
            })
            .collect();

        Ok(FanNeighbors { left, right })
    }

    /// Partition the elements around `vertex` into radially ordered runs. Every element
    /// belongs to exactly one run.
    pub fn runs(&self, vertex: usize, cells: &[FanCell]) -> Result<Vec<FanRun>> {
        let n = cells.len();
        let nbrs = self.neighbors(vertex, cells)?;
        let mut visited = vec![false; n];
        let mut res = Vec::new();

        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;

            // walk left
            let mut left_part = Vec::new();
            let mut closed = false;
            let mut cur = seed;
            while let Some(next) = nbrs.left[cur] {
                if next == seed {
                    closed = true;
                    break;
                }
                if visited[next] {
                    return Err(Error::NonManifold {
                        vertex,
                        edge: cells[cur].left_edge(),
                    }
                    .into());
                }
                visited[next] = true;
                left_part.push(next);
                cur = next;
            }

            if closed {
                if left_part.len() + 1 != n {
                    // several closed fans around the same vertex
                    return Err(Error::NonManifold {
                        vertex,
                        edge: cells[seed].left_edge(),
                    }
                    .into());
                }
                let mut ids = Vec::with_capacity(n);
                ids.push(seed);
                ids.extend_from_slice(&left_part);
                res.push(FanRun {
                    kind: FanKind::Closed,
                    cells: ids.iter().map(|&i| cells[i].cell).collect(),
                    right_edge: cells[seed].right_edge(),
                    left_edge: cells[cur].left_edge(),
                });
                continue;
            }

            // walk right
            let mut right_part = Vec::new();
            let mut cur = seed;
            while let Some(next) = nbrs.right[cur] {
                if visited[next] {
                    return Err(Error::NonManifold {
                        vertex,
                        edge: cells[cur].right_edge(),
                    }
                    .into());
                }
                visited[next] = true;
                right_part.push(next);
                cur = next;
            }

            let ids = right_part
                .iter()
                .rev()
                .chain(std::iter::once(&seed))
                .chain(left_part.iter())
                .copied()
                .collect::<Vec<_>>();
            res.push(FanRun {
                kind: FanKind::Open,
                cells: ids.iter().map(|&i| cells[i].cell).collect(),
                right_edge: cells[ids[0]].right_edge(),
                left_edge: cells[ids[ids.len() - 1]].left_edge(),
            });
        }

        Ok(res)
    }

    /// Build the dual polygon for a run around `vertex`
    ///   - closed runs: the element centroids
    ///   - open runs: the dual vertex on the right-most edge, the element centroids, the dual
    ///     vertex on the left-most edge and, if it was exported, `vertex` itself
    pub fn polygon(&self, vertex: usize, run: &FanRun) -> Result<DualPolygon> {
        let members = match run.kind {
            FanKind::Closed => run.cells.clone(),
            FanKind::Open => {
                let right = self.hard_edges.require(vertex, run.right_edge)?;
                let left = self.hard_edges.require(vertex, run.left_edge)?;
                let mut members = Vec::with_capacity(run.cells.len() + 3);
                members.push(right);
                members.extend_from_slice(&run.cells);
                members.push(left);
                if let Some(i) = self.hard_edges.hard_vertex_dual_index(vertex) {
                    members.push(i);
                }
                members
            }
        };
        Ok(DualPolygon {
            vertex,
            kind: run.kind,
            members,
        })
    }

    /// Compute the dual polygons around `vertex`, touched by elements `cells`
    pub fn sort<M: GridModel>(
        &self,
        model: &M,
        vertex: usize,
        cells: &[usize],
    ) -> Result<Vec<DualPolygon>> {
        let fan_cells = Self::fan_cells(model, vertex, cells)?;
        let runs = self.runs(vertex, &fan_cells)?;
        trace!("vertex {vertex}: {} cells, {} fans", cells.len(), runs.len());
        runs.iter().map(|r| self.polygon(vertex, r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{FanCell, FanKind, FanSorter};
    use crate::{
        Error, Vert3d,
        dual::HardEdgeRegistry,
        mesh::{GridModel, SurfaceMesh},
    };
    use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

    /// `n` triangles around vertex 0, counter-clockwise; vertex `i + 1` is at angle
    /// `2 pi i / n`
    fn ring(n: usize) -> SurfaceMesh {
        let mut verts = vec![Vert3d::zeros()];
        for i in 0..n {
            let a = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            verts.push(Vert3d::new(a.cos(), a.sin(), 0.0));
        }
        let elems = (0..n)
            .map(|i| [0, i + 1, (i + 1) % n + 1])
            .collect::<Vec<_>>();
        SurfaceMesh::new(&verts, &elems, &vec![1; n]).unwrap()
    }

    /// Two triangles sharing edge (0, 2), vertex 0 on the boundary
    fn hinge() -> SurfaceMesh {
        let verts = [
            Vert3d::new(0., 0., 0.),
            Vert3d::new(1., 0., 0.),
            Vert3d::new(1., 1., 0.),
            Vert3d::new(0., 1., 0.),
        ];
        SurfaceMesh::new(&verts, &[[0, 1, 2], [0, 2, 3]], &[1, 1]).unwrap()
    }

    /// Two pairs of triangles touching at vertex 0 only
    fn bowtie() -> SurfaceMesh {
        let verts = [
            Vert3d::new(0., 0., 0.),
            Vert3d::new(1., -1., 0.),
            Vert3d::new(1.5, 0., 0.),
            Vert3d::new(1., 1., 0.),
            Vert3d::new(-1., 1., 0.),
            Vert3d::new(-1.5, 0., 0.),
            Vert3d::new(-1., -1., 0.),
        ];
        SurfaceMesh::new(
            &verts,
            &[[0, 1, 2], [0, 2, 3], [0, 4, 5], [0, 5, 6]],
            &[1, 1, 1, 1],
        )
        .unwrap()
    }

    /// Register the boundary edges of `msh`, the dual vertices being numbered from
    /// `msh.n_elems()`
    fn boundary_edges(msh: &SurfaceMesh) -> HardEdgeRegistry {
        let mut reg = HardEdgeRegistry::new();
        for (i, f) in msh.all_faces().unwrap().iter().enumerate() {
            if f.neighbor.is_none() {
                reg.register(f.verts, msh.n_elems() + i).unwrap();
            }
        }
        reg
    }

    fn is_cyclic_permutation(a: &[usize], b: &[usize]) -> bool {
        let n = b.len();
        a.len() == n && (n == 0 || (0..n).any(|s| (0..n).all(|i| a[i] == b[(s + i) % n])))
    }

    #[test]
    fn test_fan_cell() {
        let c = FanCell::new(7, &[4, 9, 0, 2], 0).unwrap();
        assert_eq!(c.verts, [0, 2, 4, 9]);
        assert_eq!(c.right_edge(), [0, 2]);
        assert_eq!(c.left_edge(), [9, 0]);

        let err = FanCell::new(7, &[4, 9, 1], 0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::CellMissingVertex { cell: 7, vertex: 0 })
        );
    }

    #[test]
    fn test_closed_ring() {
        let msh = ring(4);
        let reg = HardEdgeRegistry::new();
        let sorter = FanSorter::new(&reg);

        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..10 {
            let mut cells = vec![0, 1, 2, 3];
            cells.shuffle(&mut rng);
            let polys = sorter.sort(&msh, 0, &cells).unwrap();
            assert_eq!(polys.len(), 1);
            assert_eq!(polys[0].kind, FanKind::Closed);
            assert_eq!(polys[0].vertex, 0);
            // walking through the left edges goes counter-clockwise
            assert!(is_cyclic_permutation(&polys[0].members, &[0, 1, 2, 3]));
            assert_eq!(polys[0].members[0], cells[0]);
        }
    }

    #[test]
    fn test_closed_ring_large() {
        let n = 11;
        let msh = ring(n);
        let reg = HardEdgeRegistry::new();
        let sorter = FanSorter::new(&reg);
        let cells = (0..n).rev().collect::<Vec<_>>();
        let polys = sorter.sort(&msh, 0, &cells).unwrap();
        assert_eq!(polys.len(), 1);
        let expected = std::iter::once(n - 1).chain(0..n - 1).collect::<Vec<_>>();
        assert_eq!(polys[0].members, expected);
    }

    #[test]
    fn test_hinge() {
        let msh = hinge();
        let mut reg = boundary_edges(&msh);
        // faces: (0, 1), (1, 2), (2, 3), (3, 0) then (0, 2)
        assert_eq!(reg.lookup([0, 1]), Some(2));
        assert_eq!(reg.lookup([3, 0]), Some(5));

        for cells in [[0, 1], [1, 0]] {
            let sorter = FanSorter::new(&reg);
            let polys = sorter.sort(&msh, 0, &cells).unwrap();
            assert_eq!(polys.len(), 1);
            assert_eq!(polys[0].kind, FanKind::Open);
            assert_eq!(polys[0].members, [2, 0, 1, 5]);
            assert_eq!(polys[0].n_cells(msh.n_elems()), 2);
        }

        assert!(reg.set_hard_vertex_dual_index(0, 6));
        let sorter = FanSorter::new(&reg);
        let polys = sorter.sort(&msh, 0, &[1, 0]).unwrap();
        assert_eq!(polys[0].members, [2, 0, 1, 5, 6]);
    }

    #[test]
    fn test_single_cell() {
        let msh = hinge();
        let reg = boundary_edges(&msh);
        let sorter = FanSorter::new(&reg);
        // vertex 1 only belongs to element 0, bounded by (0, 1) and (1, 2)
        let polys = sorter.sort(&msh, 1, &[0]).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].kind, FanKind::Open);
        assert_eq!(polys[0].members, [3, 0, 2]);
    }

    #[test]
    fn test_bowtie() {
        let msh = bowtie();
        let reg = boundary_edges(&msh);
        let sorter = FanSorter::new(&reg);

        let polys = sorter.sort(&msh, 0, &[1, 3, 0, 2]).unwrap();
        assert_eq!(polys.len(), 2);
        for p in &polys {
            assert_eq!(p.kind, FanKind::Open);
            assert_eq!(p.members.len(), 4);
            assert_eq!(p.n_cells(msh.n_elems()), 2);
            assert!(p.members[0] >= msh.n_elems());
            assert!(p.members[3] >= msh.n_elems());
        }
        assert_eq!(&polys[0].members[1..3], &[0, 1]);
        assert_eq!(&polys[1].members[1..3], &[2, 3]);
        assert_eq!(polys[0].members[0], reg.lookup([0, 1]).unwrap());
        assert_eq!(polys[0].members[3], reg.lookup([3, 0]).unwrap());
        assert_eq!(polys[1].members[0], reg.lookup([0, 4]).unwrap());
        assert_eq!(polys[1].members[3], reg.lookup([6, 0]).unwrap());
    }

    #[test]
    fn test_split_by_hard_edge() {
        // the closed ring split along edge (0, 1): a single open fan
        let msh = ring(4);
        let mut reg = HardEdgeRegistry::new();
        reg.register([1, 0], 10).unwrap();
        let sorter = FanSorter::new(&reg);
        let polys = sorter.sort(&msh, 0, &[2, 0, 3, 1]).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].kind, FanKind::Open);
        assert_eq!(polys[0].members, [10, 0, 1, 2, 3, 10]);

        // and along (0, 1) and (0, 3): two open fans
        reg.register([0, 3], 11).unwrap();
        let sorter = FanSorter::new(&reg);
        let polys = sorter.sort(&msh, 0, &[2, 0, 3, 1]).unwrap();
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[0].members, [11, 2, 3, 10]);
        assert_eq!(polys[1].members, [10, 0, 1, 11]);
    }

    #[test]
    fn test_missing_hard_edge() {
        let msh = hinge();
        let reg = HardEdgeRegistry::new();
        let sorter = FanSorter::new(&reg);
        let err = sorter.sort(&msh, 0, &[0, 1]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::HardEdgeNotFound {
                vertex: 0,
                edge: [0, 1]
            })
        );
    }

    #[test]
    fn test_non_manifold() {
        // three triangles sharing edge (0, 1)
        let verts = [
            Vert3d::new(0., 0., 0.),
            Vert3d::new(1., 0., 0.),
            Vert3d::new(0., 1., 0.),
            Vert3d::new(0., -1., 0.),
            Vert3d::new(0., 0., 1.),
        ];
        let msh =
            SurfaceMesh::new(&verts, &[[0, 1, 2], [1, 0, 3], [0, 1, 4]], &[1, 1, 1]).unwrap();
        let reg = HardEdgeRegistry::new();
        let sorter = FanSorter::new(&reg);
        let err = sorter.sort(&msh, 0, &[0, 1, 2]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NonManifold { vertex: 0, .. })
        ));
    }

    #[test]
    fn test_cell_counts() {
        let msh = crate::mesh::rectangle_mesh(1.0, 5, 1.0, 4);
        let reg = boundary_edges(&msh);
        let sorter = FanSorter::new(&reg);
        for i in 0..msh.n_verts() {
            let cells = (0..msh.n_elems())
                .filter(|&j| msh.elem(j).unwrap().contains(&i))
                .collect::<Vec<_>>();
            let polys = sorter.sort(&msh, i, &cells).unwrap();
            assert_eq!(polys.len(), 1);
            let mut found = polys[0]
                .members
                .iter()
                .copied()
                .filter(|&j| j < msh.n_elems())
                .collect::<Vec<_>>();
            found.sort_unstable();
            assert_eq!(found, cells);
            if reg.is_hard(i) {
                assert_eq!(polys[0].kind, FanKind::Open);
            } else {
                assert_eq!(polys[0].kind, FanKind::Closed);
            }
        }
    }
}
