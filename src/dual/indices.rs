//! Numbering of the dual vertices
//!
//! The dual vertex indices are split into contiguous ranges, in this order:
//!   - `[0, n_centroids)`: element centroids, the index is the element index
//!   - boundary edge mid points, numbered in face stream order
//!   - connection edge mid points, numbered in face stream order
//!   - hard primal vertices (only if they are exported)
use crate::{Error, Result};

/// Origin of a dual vertex
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DualVertexKind {
    /// Centroid of a primal element
    Centroid,
    /// Point on a boundary edge
    BoundaryMid,
    /// Point on a connection edge
    ConnectionMid,
    /// Hard primal vertex
    HardVertex,
}

/// Dual vertex index assignment. Each counter only moves forward, so an index is never
/// returned twice.
#[derive(Clone, Debug)]
pub struct DualVertexIndices {
    n_centroids: usize,
    n_boundary_mids: Option<usize>,
    n_connection_mids: usize,
    next_boundary_mid: usize,
    next_connection_mid: usize,
    next_hard_vertex: usize,
}

impl DualVertexIndices {
    /// Create the numbering for a mesh with `n_centroids` elements
    #[must_use]
    pub const fn new(n_centroids: usize) -> Self {
        Self {
            n_centroids,
            n_boundary_mids: None,
            n_connection_mids: 0,
            next_boundary_mid: 0,
            next_connection_mid: 0,
            next_hard_vertex: 0,
        }
    }

    /// Set the number of boundary and connection mid points, known when the face stream
    /// begins
    pub fn begin_faces(&mut self, n_boundary_mids: usize, n_connection_mids: usize) -> Result<()> {
        if self.n_boundary_mids.is_some() {
            return Err(Error::StreamOrder("face stream started twice".into()).into());
        }
        self.n_boundary_mids = Some(n_boundary_mids);
        self.n_connection_mids = n_connection_mids;
        Ok(())
    }

    /// Number of element centroids
    #[must_use]
    pub const fn n_centroids(&self) -> usize {
        self.n_centroids
    }

    /// Number of boundary mid points (0 before the face stream begins)
    #[must_use]
    pub fn n_boundary_mids(&self) -> usize {
        self.n_boundary_mids.unwrap_or(0)
    }

    /// Number of connection mid points
    #[must_use]
    pub const fn n_connection_mids(&self) -> usize {
        self.n_connection_mids
    }

    /// Number of exported hard vertices
    #[must_use]
    pub const fn n_hard_vertices(&self) -> usize {
        self.next_hard_vertex
    }

    /// Total number of dual vertices assigned so far
    #[must_use]
    pub fn n_total(&self) -> usize {
        self.hard_vertex_start() + self.next_hard_vertex
    }

    /// Dual vertex index of the centroid of element `i_elem`
    pub fn centroid(&self, i_elem: usize) -> Result<usize> {
        if i_elem < self.n_centroids {
            Ok(i_elem)
        } else {
            Err(Error::ElementLookupFailed { elem: i_elem }.into())
        }
    }

    /// Index for the next boundary mid point
    pub fn next_boundary_mid(&mut self) -> Result<usize> {
        let n = self.n_boundary_mids.ok_or_else(|| {
            Error::StreamOrder("boundary face before the stream begins".into())
        })?;
        if self.next_boundary_mid >= n {
            return Err(
                Error::StreamOrder(format!("more than {n} boundary faces in the stream")).into(),
            );
        }
        let res = self.n_centroids + self.next_boundary_mid;
        self.next_boundary_mid += 1;
        Ok(res)
    }

    /// Index for the next connection mid point
    pub fn next_connection_mid(&mut self) -> Result<usize> {
        let n_bdy = self.n_boundary_mids.ok_or_else(|| {
            Error::StreamOrder("connection face before the stream begins".into())
        })?;
        if self.next_connection_mid >= self.n_connection_mids {
            return Err(Error::StreamOrder(format!(
                "more than {} connection faces in the stream",
                self.n_connection_mids
            ))
            .into());
        }
        let res = self.n_centroids + n_bdy + self.next_connection_mid;
        self.next_connection_mid += 1;
        Ok(res)
    }

    /// Index for the next exported hard vertex
    pub fn next_hard_vertex(&mut self) -> Result<usize> {
        if self.n_boundary_mids.is_none() {
            return Err(
                Error::StreamOrder("hard vertex exported before the face stream".into()).into(),
            );
        }
        let res = self.hard_vertex_start() + self.next_hard_vertex;
        self.next_hard_vertex += 1;
        Ok(res)
    }

    fn hard_vertex_start(&self) -> usize {
        self.n_centroids + self.n_boundary_mids() + self.n_connection_mids
    }

    /// Get the origin of dual vertex `i`
    #[must_use]
    pub fn kind(&self, i: usize) -> Option<DualVertexKind> {
        let n_bdy = self.n_boundary_mids();
        if i < self.n_centroids {
            Some(DualVertexKind::Centroid)
        } else if i < self.n_centroids + n_bdy {
            Some(DualVertexKind::BoundaryMid)
        } else if i < self.hard_vertex_start() {
            Some(DualVertexKind::ConnectionMid)
        } else if i < self.n_total() {
            Some(DualVertexKind::HardVertex)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DualVertexIndices, DualVertexKind};
    use crate::Error;

    #[test]
    fn test_ranges() {
        let mut ids = DualVertexIndices::new(10);
        assert_eq!(ids.centroid(0).unwrap(), 0);
        assert_eq!(ids.centroid(9).unwrap(), 9);
        assert!(ids.centroid(10).is_err());

        ids.begin_faces(4, 3).unwrap();
        let bdy = (0..4)
            .map(|_| ids.next_boundary_mid().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(bdy, [10, 11, 12, 13]);
        let cnx = (0..3)
            .map(|_| ids.next_connection_mid().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(cnx, [14, 15, 16]);
        let hard = (0..2)
            .map(|_| ids.next_hard_vertex().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(hard, [17, 18]);
        assert_eq!(ids.n_total(), 19);

        assert_eq!(ids.kind(9), Some(DualVertexKind::Centroid));
        assert_eq!(ids.kind(10), Some(DualVertexKind::BoundaryMid));
        assert_eq!(ids.kind(13), Some(DualVertexKind::BoundaryMid));
        assert_eq!(ids.kind(14), Some(DualVertexKind::ConnectionMid));
        assert_eq!(ids.kind(16), Some(DualVertexKind::ConnectionMid));
        assert_eq!(ids.kind(17), Some(DualVertexKind::HardVertex));
        assert_eq!(ids.kind(19), None);
    }

    #[test]
    fn test_connection_before_boundary_count() {
        let mut ids = DualVertexIndices::new(3);
        let err = ids.next_connection_mid().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::StreamOrder(_))
        ));
        assert!(ids.next_boundary_mid().is_err());
        assert!(ids.next_hard_vertex().is_err());
    }

    #[test]
    fn test_overflow() {
        let mut ids = DualVertexIndices::new(3);
        ids.begin_faces(1, 0).unwrap();
        assert_eq!(ids.next_boundary_mid().unwrap(), 3);
        assert!(ids.next_boundary_mid().is_err());
        assert!(ids.next_connection_mid().is_err());
        assert!(ids.begin_faces(1, 0).is_err());
    }
}
