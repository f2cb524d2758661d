//! Polygonal surface meshes stored in memory
use super::{BeginStream, FaceKind, FaceRecord, FaceStreamHandler, GridModel};
use crate::{Error, Result, Tag, Vert3d};
use log::debug;
use rustc_hash::{FxBuildHasher, FxHashMap};

/// Face of a `SurfaceMesh`, computed from the element edges
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshFace {
    pub kind: FaceKind,
    /// Vertices, oriented as in `owner`
    pub verts: [usize; 2],
    pub owner: usize,
    pub neighbor: Option<usize>,
}

/// Surface mesh with polygonal elements (triangles, quadrangles, ...)
#[derive(Clone, Debug)]
pub struct SurfaceMesh {
    verts: Vec<Vert3d>,
    elem_to_vert_ptr: Vec<usize>,
    elem_to_vert: Vec<usize>,
    etags: Vec<Tag>,
}

impl SurfaceMesh {
    /// Create an empty mesh
    #[must_use]
    pub fn empty() -> Self {
        Self {
            verts: Vec::new(),
            elem_to_vert_ptr: vec![0],
            elem_to_vert: Vec::new(),
            etags: Vec::new(),
        }
    }

    /// Create a new mesh from coordinates, element connectivities and tags
    pub fn new<E: AsRef<[usize]>>(verts: &[Vert3d], elems: &[E], etags: &[Tag]) -> Result<Self> {
        if elems.len() != etags.len() {
            return Err(Error::from("Inconsistent sizes (elems)"));
        }
        let mut res = Self::empty();
        res.add_verts(verts.iter().copied());
        for (e, &t) in elems.iter().zip(etags) {
            res.add_elem(e.as_ref(), t)?;
        }
        Ok(res)
    }

    /// Add vertices
    pub fn add_verts<I: ExactSizeIterator<Item = Vert3d>>(&mut self, v: I) {
        self.verts.extend(v);
    }

    /// Add an element with at least 3 vertices and return its index
    pub fn add_elem(&mut self, e: &[usize], tag: Tag) -> Result<usize> {
        if e.len() < 3 {
            return Err(Error::from(&format!(
                "element {} has only {} vertices",
                self.etags.len(),
                e.len()
            )));
        }
        Ok(self.push_elem(e, tag))
    }

    /// Add an element whose size is already known to be valid
    pub(super) fn push_elem(&mut self, e: &[usize], tag: Tag) -> usize {
        self.elem_to_vert.extend_from_slice(e);
        self.elem_to_vert_ptr.push(self.elem_to_vert.len());
        self.etags.push(tag);
        self.etags.len() - 1
    }

    /// Sequential iterator over the mesh vertices
    #[must_use]
    pub fn verts(&self) -> impl ExactSizeIterator<Item = Vert3d> + Clone + '_ {
        self.verts.iter().copied()
    }

    /// Sequential iterator over the element tags
    #[must_use]
    pub fn etags(&self) -> impl ExactSizeIterator<Item = Tag> + Clone + '_ {
        self.etags.iter().copied()
    }

    /// Compute all the mesh faces (boundary, interior & connection)
    ///   - faces are oriented as in their owner element (the first element that uses them)
    ///   - within each kind, the faces are in the order they are met while looping over the
    ///     element edges
    ///   - faces are returned sorted by kind: boundary, interior, connection
    pub fn all_faces(&self) -> Result<Vec<MeshFace>> {
        let mut faces: Vec<MeshFace> = Vec::new();
        let mut ids = FxHashMap::with_hasher(FxBuildHasher);

        for i_elem in 0..GridModel::n_elems(self) {
            let e = self.elem_slice(i_elem);
            let n = e.len();
            for j in 0..n {
                let edg = [e[j], e[(j + 1) % n]];
                let key = if edg[0] < edg[1] {
                    edg
                } else {
                    [edg[1], edg[0]]
                };
                match ids.entry(key) {
                    std::collections::hash_map::Entry::Occupied(entry) => {
                        let f: &mut MeshFace = &mut faces[*entry.get()];
                        if f.neighbor.is_some() {
                            return Err(Error::NonManifoldEdge { edge: key }.into());
                        }
                        f.neighbor = Some(i_elem);
                        f.kind = if self.etag(f.owner) == self.etag(i_elem) {
                            FaceKind::Interior
                        } else {
                            FaceKind::Connection
                        };
                    }
                    std::collections::hash_map::Entry::Vacant(entry) => {
                        entry.insert(faces.len());
                        faces.push(MeshFace {
                            kind: FaceKind::Boundary,
                            verts: edg,
                            owner: i_elem,
                            neighbor: None,
                        });
                    }
                }
            }
        }

        let rank = |k: FaceKind| match k {
            FaceKind::Boundary => 0,
            FaceKind::Interior => 1,
            FaceKind::Connection => 2,
        };
        // stable: keeps the order within a kind
        faces.sort_by_key(|f| rank(f.kind));

        Ok(faces)
    }

    fn elem_slice(&self, i: usize) -> &[usize] {
        &self.elem_to_vert[self.elem_to_vert_ptr[i]..self.elem_to_vert_ptr[i + 1]]
    }
}

impl GridModel for SurfaceMesh {
    fn n_verts(&self) -> usize {
        self.verts.len()
    }

    fn vert(&self, i: usize) -> Option<Vert3d> {
        self.verts.get(i).copied()
    }

    fn n_elems(&self) -> usize {
        self.etags.len()
    }

    fn elem(&self, i: usize) -> Option<&[usize]> {
        if i < self.etags.len() {
            Some(self.elem_slice(i))
        } else {
            None
        }
    }

    fn etag(&self, i: usize) -> Tag {
        self.etags[i]
    }

    fn stream_faces<H: FaceStreamHandler>(&self, handler: &mut H) -> Result<()> {
        let faces = self.all_faces()?;
        let count = |k: FaceKind| faces.iter().filter(|f| f.kind == k).count();
        let begin = BeginStream {
            n_boundary_faces: count(FaceKind::Boundary),
            n_interior_faces: count(FaceKind::Interior),
            n_connection_faces: count(FaceKind::Connection),
        };
        debug!(
            "stream {} boundary, {} interior and {} connection faces",
            begin.n_boundary_faces, begin.n_interior_faces, begin.n_connection_faces
        );

        handler.stream_begin(&begin)?;
        for (i, f) in faces.iter().enumerate() {
            handler.stream_face(&FaceRecord {
                face: i,
                kind: f.kind,
                verts: f.verts,
                owner: f.owner,
                neighbor: f.neighbor,
            })?;
        }
        handler.stream_end()
    }
}

#[cfg(test)]
mod tests {
    use super::SurfaceMesh;
    use crate::{
        Error, Vert3d,
        mesh::{
            BeginStream, FaceKind, FaceRecord, FaceStreamHandler, GridModel, rectangle_mesh,
            two_zone_rectangle_mesh,
        },
    };

    #[derive(Default)]
    struct Recorder {
        begin: Option<BeginStream>,
        faces: Vec<FaceRecord>,
        ended: bool,
    }

    impl FaceStreamHandler for Recorder {
        fn stream_begin(&mut self, data: &BeginStream) -> crate::Result<()> {
            self.begin = Some(*data);
            Ok(())
        }

        fn stream_face(&mut self, data: &FaceRecord) -> crate::Result<()> {
            assert!(self.begin.is_some());
            self.faces.push(*data);
            Ok(())
        }

        fn stream_end(&mut self) -> crate::Result<()> {
            self.ended = true;
            Ok(())
        }
    }

    #[test]
    fn test_new_invalid() {
        let verts = [Vert3d::zeros(); 3];
        assert!(SurfaceMesh::new(&verts, &[[0, 1]], &[1]).is_err());
        assert!(SurfaceMesh::new(&verts, &[[0, 1, 2]], &[1, 2]).is_err());

        let mut msh = SurfaceMesh::empty();
        assert_eq!(msh.add_elem(&[0, 1, 2], 1).unwrap(), 0);
        assert!(msh.add_elem(&[0, 1], 1).is_err());
        assert_eq!(msh.add_elem(&[0, 1, 2, 3], 2).unwrap(), 1);
        assert_eq!(msh.n_elems(), 2);
        assert_eq!(msh.elem(1).unwrap(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_faces_square() {
        let msh = rectangle_mesh(1.0, 2, 1.0, 2);
        assert_eq!(msh.n_verts(), 4);
        assert_eq!(msh.n_elems(), 2);

        let faces = msh.all_faces().unwrap();
        assert_eq!(faces.len(), 5);
        assert_eq!(
            faces.iter().filter(|f| f.kind == FaceKind::Boundary).count(),
            4
        );
        assert_eq!(faces[4].kind, FaceKind::Interior);
        for f in faces.iter().take(4) {
            assert!(f.neighbor.is_none());
            // oriented as in the owner element
            let e = msh.elem(f.owner).unwrap();
            let n = e.len();
            assert!((0..n).any(|j| e[j] == f.verts[0] && e[(j + 1) % n] == f.verts[1]));
        }
    }

    #[test]
    fn test_stream_order() {
        let msh = two_zone_rectangle_mesh(2.0, 5, 1.0, 3);
        let mut rec = Recorder::default();
        msh.stream_faces(&mut rec).unwrap();
        assert!(rec.ended);

        let begin = rec.begin.unwrap();
        assert_eq!(begin.n_boundary_faces, 2 * 4 + 2 * 2);
        assert_eq!(begin.n_connection_faces, 2);
        assert_eq!(
            begin.n_boundary_faces + begin.n_interior_faces + begin.n_connection_faces,
            rec.faces.len()
        );

        let kinds = rec.faces.iter().map(|f| f.kind).collect::<Vec<_>>();
        let n_b = begin.n_boundary_faces;
        let n_i = begin.n_interior_faces;
        assert!(kinds[..n_b].iter().all(|&k| k == FaceKind::Boundary));
        assert!(kinds[n_b..n_b + n_i].iter().all(|&k| k == FaceKind::Interior));
        assert!(kinds[n_b + n_i..].iter().all(|&k| k == FaceKind::Connection));

        for (i, f) in rec.faces.iter().enumerate() {
            assert_eq!(f.face, i);
            if f.kind == FaceKind::Connection {
                let other = f.neighbor.unwrap();
                assert_ne!(msh.etag(f.owner), msh.etag(other));
                // the connection curve is the vertical line x = 1
                let p0 = msh.vert(f.verts[0]).unwrap();
                let p1 = msh.vert(f.verts[1]).unwrap();
                assert!((p0[0] - 1.0).abs() < 1e-12 && (p1[0] - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_non_manifold_edge() {
        let verts = [
            Vert3d::new(0., 0., 0.),
            Vert3d::new(1., 0., 0.),
            Vert3d::new(0., 1., 0.),
            Vert3d::new(0., -1., 0.),
            Vert3d::new(0., 0., 1.),
        ];
        let msh =
            SurfaceMesh::new(&verts, &[[0, 1, 2], [1, 0, 3], [0, 1, 4]], &[1, 1, 1]).unwrap();
        let err = msh.all_faces().unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::NonManifoldEdge { edge: [0, 1] })
        );
    }
}
