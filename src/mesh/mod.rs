//! Primal meshes, seen through the `GridModel` interface
//!   - vertices, given by their coordinates
//!   - elements, given by an ordered (right-handed) list of at least 3 vertices
//!   - faces (edges), delivered as a stream: boundary faces first, then internal faces, then
//!     connection faces
mod stl;
mod surface_mesh;
mod test_meshes;

use crate::{Result, Tag, Vert3d};
pub use stl::read_stl;
pub use surface_mesh::{MeshFace, SurfaceMesh};
pub use test_meshes::{rectangle_mesh, two_zone_rectangle_mesh};

/// Classification of the faces of a surface mesh
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceKind {
    /// Face that belongs to a single element
    Boundary,
    /// Face shared by two elements with the same tag
    Interior,
    /// Face shared by two elements with different tags
    Connection,
}

/// Sent once before any face record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeginStream {
    pub n_boundary_faces: usize,
    pub n_interior_faces: usize,
    pub n_connection_faces: usize,
}

/// A face in the stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRecord {
    /// Ordinal of the face in the stream
    pub face: usize,
    pub kind: FaceKind,
    /// Face vertices, oriented as in the owner element
    pub verts: [usize; 2],
    /// Owner element
    pub owner: usize,
    /// Element on the other side (internal and connection faces only)
    pub neighbor: Option<usize>,
}

/// Consumer of a face stream
pub trait FaceStreamHandler {
    /// Called once before the first face
    fn stream_begin(&mut self, data: &BeginStream) -> Result<()>;

    /// Called for every face, in stream order
    fn stream_face(&mut self, data: &FaceRecord) -> Result<()>;

    /// Called once after the last face
    fn stream_end(&mut self) -> Result<()>;
}

/// Read-only access to a primal mesh
pub trait GridModel: Sync {
    /// Number of vertices
    fn n_verts(&self) -> usize;

    /// Get the `i`th vertex, if it exists
    fn vert(&self, i: usize) -> Option<Vert3d>;

    /// Number of elements
    fn n_elems(&self) -> usize;

    /// Get the vertices of the `i`th element, if it exists
    fn elem(&self, i: usize) -> Option<&[usize]>;

    /// Get the tag of the `i`th element
    fn etag(&self, i: usize) -> Tag;

    /// Sequential iterator over the elements
    fn elems(&self) -> impl ExactSizeIterator<Item = &[usize]> + '_ {
        (0..self.n_elems()).map(|i| self.elem(i).unwrap_or(&[]))
    }

    /// Stream the faces to `handler`: boundary faces, then interior faces, then connection
    /// faces. The stream stops at the first error returned by the handler.
    fn stream_faces<H: FaceStreamHandler>(&self, handler: &mut H) -> Result<()>;
}
