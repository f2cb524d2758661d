//! Dual meshes of unstructured surface meshes
//!
//! One dual vertex is created per primal element (its centroid) and per
//! boundary / connection edge (a point on the edge), and one dual polygon is
//! created around each primal vertex by ordering the incident elements
//! radially. Boundary and connection edges are "hard": they split the
//! polygons around their end points.
use core::fmt;
use nalgebra::SVector;

pub mod config;
pub mod dual;
pub mod io;
pub mod mesh;

/// Result
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Tag used for elements
pub type Tag = i16;

/// Vertex in D dimensions
pub type Vertex<const D: usize> = SVector<f64, D>;
/// Vertex in 3D
pub type Vert3d = Vertex<3>;

/// Error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A vertex index could not be resolved by the grid model
    VertexLookupFailed { vertex: usize },
    /// An element index could not be resolved by the grid model
    ElementLookupFailed { elem: usize },
    /// An element listed around a vertex does not contain it
    CellMissingVertex { cell: usize, vertex: usize },
    /// A fan ends on an edge that was never registered as hard
    HardEdgeNotFound { vertex: usize, edge: [usize; 2] },
    /// Two cells around `vertex` claim the same fan edge
    NonManifold { vertex: usize, edge: [usize; 2] },
    /// An edge is shared by more than two elements
    NonManifoldEdge { edge: [usize; 2] },
    /// Face records arrived in an unexpected order
    StreamOrder(String),
    /// The export was cancelled through the progress callback
    Cancelled,
    /// Any other error
    Message(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::VertexLookupFailed { vertex } => {
                write!(f, "mesh inconsistency: vertex {vertex} not found")
            }
            Self::ElementLookupFailed { elem } => {
                write!(f, "mesh inconsistency: element {elem} not found")
            }
            Self::CellMissingVertex { cell, vertex } => {
                write!(f, "mesh inconsistency: cell {cell} does not contain vertex {vertex}")
            }
            Self::HardEdgeNotFound { vertex, edge } => write!(
                f,
                "open fan around vertex {vertex} ends on edge {edge:?} which is not a boundary or connection edge"
            ),
            Self::NonManifold { vertex, edge } => write!(
                f,
                "unsupported non-manifold configuration around vertex {vertex}: edge {edge:?} claimed by several cells"
            ),
            Self::NonManifoldEdge { edge } => {
                write!(f, "edge {edge:?} belongs to more than 2 elements")
            }
            Self::StreamOrder(msg) => write!(f, "invalid face stream: {msg}"),
            Self::Cancelled => write!(f, "export cancelled"),
            Self::Message(msg) => write!(f, "There is an error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Set the error message
    #[must_use]
    pub fn from(msg: &str) -> Box<Self> {
        Box::new(Self::Message(msg.into()))
    }
}

/// Assert that two floating point values are closer than a tolerance
#[macro_export]
macro_rules! assert_delta {
    ($x:expr, $y:expr, $d:expr) => {
        assert!(
            ($x - $y).abs() < $d,
            "({:.3e} - {:.3e}).abs() = {:.3e}",
            $x,
            $y,
            ($x - $y).abs()
        )
    };
}
