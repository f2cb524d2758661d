//! Vertex to element connectivity
use crate::{Error, Result};

/// Collects the (vertex, element) incidences while the elements are visited
#[derive(Debug, Default, Clone)]
pub struct AdjacencyBuilder {
    pairs: Vec<(usize, usize)>,
    n_verts: usize,
}

impl AdjacencyBuilder {
    /// Create a builder, `n_verts` being a hint for the number of vertices
    #[must_use]
    pub const fn new(n_verts: usize) -> Self {
        Self {
            pairs: Vec::new(),
            n_verts,
        }
    }

    /// Record that element `i_elem` touches all the vertices in `e`
    pub fn add_element(&mut self, i_elem: usize, e: &[usize]) {
        for &i in e {
            self.pairs.push((i, i_elem));
            self.n_verts = self.n_verts.max(i + 1);
        }
    }

    /// Group the incidences by vertex
    #[must_use]
    pub fn build(self) -> VertexToCells {
        let nv = self.n_verts;
        let mut ptr = vec![0; nv + 1];
        for &(i, _) in &self.pairs {
            ptr[i + 1] += 1;
        }
        for i in 0..nv {
            ptr[i + 1] += ptr[i];
        }

        let mut next = ptr.clone();
        let mut indices = vec![usize::MAX; self.pairs.len()];
        for &(i, i_elem) in &self.pairs {
            indices[next[i]] = i_elem;
            next[i] += 1;
        }

        VertexToCells { ptr, indices }
    }
}

/// CSR representation of the vertex to element connectivity. The rows are in element
/// insertion order; an element appears as many times as it references the vertex.
#[derive(Debug, Default, Clone)]
pub struct VertexToCells {
    ptr: Vec<usize>,
    indices: Vec<usize>,
}

impl VertexToCells {
    /// Number of vertices
    #[must_use]
    pub const fn n(&self) -> usize {
        self.ptr.len().saturating_sub(1)
    }

    /// Total number of (vertex, element) incidences
    #[must_use]
    pub const fn n_incidences(&self) -> usize {
        self.indices.len()
    }

    /// Get the elements that touch the `i`th vertex (empty if `i` is out of range)
    #[must_use]
    pub fn cells_touching(&self, i: usize) -> &[usize] {
        if i < self.n() {
            &self.indices[self.ptr[i]..self.ptr[i + 1]]
        } else {
            &[]
        }
    }

    /// Sequential iterator over the vertices touched by at least one element and their
    /// elements
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        (0..self.n())
            .map(|i| (i, self.cells_touching(i)))
            .filter(|(_, c)| !c.is_empty())
    }

    /// Number of vertices touched by at least one element
    #[must_use]
    pub fn n_touched(&self) -> usize {
        self.iter().count()
    }

    /// Check that every incidence references an element in `[0, n_elems)`
    pub fn check(&self, n_elems: usize) -> Result<()> {
        if let Some(&i) = self.indices.iter().find(|&&i| i >= n_elems) {
            return Err(Error::ElementLookupFailed { elem: i }.into());
        }
        Ok(())
    }
}
