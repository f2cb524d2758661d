//! Boundary and connection ("hard") edges
//!
//! Edges are stored once, under their sorted vertex pair, with a flag telling in which
//! direction they were registered. A lookup therefore succeeds whatever the direction of the
//! query.
use crate::{Error, Result};
use rustc_hash::{FxBuildHasher, FxHashMap};

#[derive(Clone, Copy, Debug)]
struct HardEdge {
    dual: usize,
    /// registered as `[min, max]`
    forward: bool,
}

const fn sorted(edge: [usize; 2]) -> ([usize; 2], bool) {
    if edge[0] <= edge[1] {
        (edge, true)
    } else {
        ([edge[1], edge[0]], false)
    }
}

/// Hard edges, with the dual vertex placed on them, and hard vertices
#[derive(Clone, Debug, Default)]
pub struct HardEdgeRegistry {
    edges: FxHashMap<[usize; 2], HardEdge>,
    /// hard vertex -> dual vertex index, if the vertex is exported
    verts: FxHashMap<usize, Option<usize>>,
}

impl HardEdgeRegistry {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edges: FxHashMap::with_hasher(FxBuildHasher),
            verts: FxHashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Register `edge` with dual vertex `dual`; both end points become hard
    pub fn register(&mut self, edge: [usize; 2], dual: usize) -> Result<()> {
        let (key, forward) = sorted(edge);
        if let Some(other) = self.edges.get(&key) {
            return Err(Error::from(&format!(
                "edge {edge:?} registered twice (dual vertices {} and {dual})",
                other.dual
            )));
        }
        self.edges.insert(key, HardEdge { dual, forward });
        for i in edge {
            self.verts.entry(i).or_insert(None);
        }
        Ok(())
    }

    /// Get the dual vertex of `edge`, whatever its direction
    #[must_use]
    pub fn lookup(&self, edge: [usize; 2]) -> Option<usize> {
        let (key, _) = sorted(edge);
        self.edges.get(&key).map(|e| e.dual)
    }

    /// Same as `lookup`, but a missing edge bounding the fan around `vertex` is an error
    pub fn require(&self, vertex: usize, edge: [usize; 2]) -> Result<usize> {
        self.lookup(edge)
            .ok_or_else(|| Error::HardEdgeNotFound { vertex, edge }.into())
    }

    /// Check if `edge` is hard
    #[must_use]
    pub fn is_hard_edge(&self, edge: [usize; 2]) -> bool {
        self.edges.contains_key(&sorted(edge).0)
    }

    /// Check if vertex `i` is the end point of a hard edge
    #[must_use]
    pub fn is_hard(&self, i: usize) -> bool {
        self.verts.contains_key(&i)
    }

    /// Set the dual vertex index of hard vertex `i`; returns false if `i` is not hard
    pub fn set_hard_vertex_dual_index(&mut self, i: usize, dual: usize) -> bool {
        self.verts.get_mut(&i).is_some_and(|x| {
            *x = Some(dual);
            true
        })
    }

    /// Dual vertex index of hard vertex `i`, if it was exported
    #[must_use]
    pub fn hard_vertex_dual_index(&self, i: usize) -> Option<usize> {
        self.verts.get(&i).copied().flatten()
    }

    /// Sorted hard vertices
    #[must_use]
    pub fn hard_vertices(&self) -> Vec<usize> {
        let mut res = self.verts.keys().copied().collect::<Vec<_>>();
        res.sort_unstable();
        res
    }

    /// Number of hard edges
    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Hard edges, as registered, and their dual vertices, sorted by dual vertex
    #[must_use]
    pub fn edges(&self) -> Vec<([usize; 2], usize)> {
        let mut res = self
            .edges
            .iter()
            .map(|(&[i0, i1], e)| (if e.forward { [i0, i1] } else { [i1, i0] }, e.dual))
            .collect::<Vec<_>>();
        res.sort_unstable_by_key(|&(_, i)| i);
        res
    }
}
