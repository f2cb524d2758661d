//! Dual mesh construction
//!
//! The dual vertices are the element centroids and one point on each boundary or connection
//! ("hard") edge. Around each primal vertex, the elements are sorted radially into one or
//! more fans, split at the hard edges:
//!   - a closed fan (interior vertex) gives a polygon made of element centroids
//!   - an open fan gives a polygon bounded by the dual vertices of the two hard edges where
//!     the fan stops
mod adjacency;
mod dual_mesh;
mod fan;
pub mod geometry;
mod hard_edges;
mod indices;
mod progress;
mod trace;

pub use adjacency::{AdjacencyBuilder, VertexToCells};
pub use dual_mesh::{DualMesh, DualVertex};
pub use fan::{DualPolygon, FanCell, FanKind, FanRun, FanSorter};
pub use hard_edges::HardEdgeRegistry;
pub use indices::{DualVertexIndices, DualVertexKind};
pub use progress::{Progress, Stage};
pub use trace::DebugTrace;
