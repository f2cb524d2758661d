use super::{
    AdjacencyBuilder, DebugTrace, DualPolygon, DualVertexIndices, DualVertexKind, FanKind,
    FanSorter, HardEdgeRegistry, Progress, Stage, VertexToCells,
    geometry::{centroid, project, vertex},
};
use crate::{
    Error, Result, Vert3d,
    config::ExportOptions,
    io::{VTUEncoding, VTUFile, write_dual},
    mesh::{BeginStream, FaceKind, FaceRecord, FaceStreamHandler, GridModel},
};
use log::{debug, info};
use rayon::prelude::*;
use std::{
    fs::File,
    io::BufWriter,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Vertex of the dual mesh
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualVertex {
    pub kind: DualVertexKind,
    pub coords: Vert3d,
}

/// Dual of a surface mesh
///   - vertices: element centroids, then points on the boundary edges, then points on the
///     connection edges, then (optionally) the hard primal vertices
///   - polygons: one or more around every primal vertex, sorted by primal vertex
#[derive(Clone, Debug)]
pub struct DualMesh {
    verts: Vec<DualVertex>,
    polys: Vec<DualPolygon>,
    n_centroids: usize,
    n_boundary_mids: usize,
    n_connection_mids: usize,
    n_hard_vertices: usize,
}

/// Creates the dual vertices on the boundary and connection faces and registers the hard
/// edges
struct FaceHandler<'a, M: GridModel> {
    model: &'a M,
    progress: &'a Progress,
    indices: &'a mut DualVertexIndices,
    registry: &'a mut HardEdgeRegistry,
    verts: &'a mut Vec<DualVertex>,
    n_faces: usize,
}

impl<M: GridModel> FaceHandler<'_, M> {
    fn centroid(&self, i_elem: usize) -> Result<Vert3d> {
        let i = self.indices.centroid(i_elem)?;
        Ok(self.verts[i].coords)
    }
}

impl<M: GridModel> FaceStreamHandler for FaceHandler<'_, M> {
    fn stream_begin(&mut self, data: &BeginStream) -> Result<()> {
        debug!(
            "face stream: {} boundary, {} interior, {} connection faces",
            data.n_boundary_faces, data.n_interior_faces, data.n_connection_faces
        );
        self.indices
            .begin_faces(data.n_boundary_faces, data.n_connection_faces)?;
        self.n_faces = data.n_boundary_faces + data.n_interior_faces + data.n_connection_faces;
        self.verts
            .reserve(data.n_boundary_faces + data.n_connection_faces);
        self.progress.report(Stage::Faces, 0, self.n_faces)
    }

    fn stream_face(&mut self, data: &FaceRecord) -> Result<()> {
        let [i0, i1] = data.verts;
        match data.kind {
            FaceKind::Boundary => {
                let i = self.indices.next_boundary_mid()?;
                let p0 = vertex(self.model, i0)?;
                let p1 = vertex(self.model, i1)?;
                let coords = project(&self.centroid(data.owner)?, &p0, &p1);
                self.verts.push(DualVertex {
                    kind: DualVertexKind::BoundaryMid,
                    coords,
                });
                self.registry.register(data.verts, i)?;
            }
            FaceKind::Interior => {}
            FaceKind::Connection => {
                let neighbor = data.neighbor.ok_or_else(|| {
                    Error::StreamOrder(format!("connection face {} without neighbor", data.face))
                })?;
                let i = self.indices.next_connection_mid()?;
                let p0 = vertex(self.model, i0)?;
                let p1 = vertex(self.model, i1)?;
                // average of the projections of the centroids on both sides
                let c0 = project(&self.centroid(data.owner)?, &p0, &p1);
                let c1 = project(&self.centroid(neighbor)?, &p0, &p1);
                self.verts.push(DualVertex {
                    kind: DualVertexKind::ConnectionMid,
                    coords: 0.5 * (c0 + c1),
                });
                self.registry.register(data.verts, i)?;
            }
        }
        self.progress
            .report(Stage::Faces, data.face + 1, self.n_faces)
    }

    fn stream_end(&mut self) -> Result<()> {
        if self.verts.len() != self.indices.n_total() {
            return Err(Error::StreamOrder(format!(
                "{} boundary and {} connection faces announced, {} received",
                self.indices.n_boundary_mids(),
                self.indices.n_connection_mids(),
                self.verts.len() - self.indices.n_centroids()
            ))
            .into());
        }
        self.progress
            .report(Stage::Faces, self.n_faces, self.n_faces)
    }
}

/// Convert an error so that it can be sent between threads
fn into_error(e: Box<dyn std::error::Error>) -> Error {
    match e.downcast::<Error>() {
        Ok(e) => *e,
        Err(e) => Error::Message(e.to_string()),
    }
}

impl DualMesh {
    /// Build the dual of `model`. No debug dump is written, see `with_trace`
    pub fn new<M: GridModel>(
        model: &M,
        options: &ExportOptions,
        progress: &Progress,
    ) -> Result<Self> {
        Self::with_trace(model, options, progress, &mut DebugTrace::disabled())
    }

    /// Build the dual of `model`, writing the intermediate state to `trace`
    ///   - element pass: centroids and vertex to element connectivity
    ///   - face stream: dual vertices on the boundary and connection faces, hard edges
    ///   - hard vertices, if `options.export_hard_vertices` is set
    ///   - fan pass: polygons around every vertex touched by an element
    pub fn with_trace<M: GridModel>(
        model: &M,
        options: &ExportOptions,
        progress: &Progress,
        trace: &mut DebugTrace,
    ) -> Result<Self> {
        let n_elems = model.n_elems();
        info!(
            "Build the dual mesh of a mesh with {} vertices and {n_elems} elements",
            model.n_verts()
        );

        // Element pass
        progress.report(Stage::Elements, 0, n_elems)?;
        let mut verts = Vec::with_capacity(n_elems);
        let mut adjacency = AdjacencyBuilder::new(model.n_verts());
        for i_elem in 0..n_elems {
            let e = model
                .elem(i_elem)
                .ok_or(Error::ElementLookupFailed { elem: i_elem })?;
            verts.push(DualVertex {
                kind: DualVertexKind::Centroid,
                coords: centroid(model, e)?,
            });
            adjacency.add_element(i_elem, e);
            progress.report(Stage::Elements, i_elem + 1, n_elems)?;
        }
        let v2c = adjacency.build();
        v2c.check(n_elems)?;
        debug!(
            "{} vertices touched by {} (vertex, element) pairs",
            v2c.n_touched(),
            v2c.n_incidences()
        );

        // Face stream
        let mut indices = DualVertexIndices::new(n_elems);
        let mut registry = HardEdgeRegistry::new();
        let mut handler = FaceHandler {
            model,
            progress,
            indices: &mut indices,
            registry: &mut registry,
            verts: &mut verts,
            n_faces: 0,
        };
        model.stream_faces(&mut handler)?;
        debug!(
            "{} hard edges, {} hard vertices",
            registry.n_edges(),
            registry.hard_vertices().len()
        );

        // Hard vertices
        if options.export_hard_vertices {
            for i in registry.hard_vertices() {
                let idx = indices.next_hard_vertex()?;
                registry.set_hard_vertex_dual_index(i, idx);
                verts.push(DualVertex {
                    kind: DualVertexKind::HardVertex,
                    coords: vertex(model, i)?,
                });
            }
        }
        trace.hard_edges(&registry);

        // Fan pass
        let polys =
            Self::polygons_around_vertices(model, &v2c, &registry, options, progress, trace)?;
        trace.finish();

        let res = Self {
            verts,
            polys,
            n_centroids: indices.n_centroids(),
            n_boundary_mids: indices.n_boundary_mids(),
            n_connection_mids: indices.n_connection_mids(),
            n_hard_vertices: indices.n_hard_vertices(),
        };
        info!(
            "Dual mesh: {} vertices ({} centroids, {} boundary, {} connection, {} hard), {} polygons ({} open)",
            res.n_verts(),
            res.n_centroids,
            res.n_boundary_mids,
            res.n_connection_mids,
            res.n_hard_vertices,
            res.n_polygons(),
            res.polys.iter().filter(|p| p.kind == FanKind::Open).count()
        );

        Ok(res)
    }

    /// Sort the elements around every vertex of `v2c` into fans and build the polygons, in
    /// vertex order
    fn polygons_around_vertices<M: GridModel>(
        model: &M,
        v2c: &VertexToCells,
        registry: &HardEdgeRegistry,
        options: &ExportOptions,
        progress: &Progress,
        trace: &mut DebugTrace,
    ) -> Result<Vec<DualPolygon>> {
        let sorter = FanSorter::new(registry);
        let n_touched = v2c.n_touched();
        progress.report(Stage::Polygons, 0, n_touched)?;

        if options.parallel && !trace.is_enabled() {
            debug!("build the polygons in parallel");
            let rows = v2c.iter().collect::<Vec<_>>();
            let done = AtomicUsize::new(0);
            let polys = rows
                .par_iter()
                .map(|&(i, cells)| {
                    let res = sorter.sort(model, i, cells).map_err(into_error)?;
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    progress
                        .report(Stage::Polygons, n, n_touched)
                        .map_err(into_error)?;
                    Ok::<_, Error>(res)
                })
                .collect::<std::result::Result<Vec<_>, Error>>()?;
            return Ok(polys.into_iter().flatten().collect());
        }

        let mut polys = Vec::with_capacity(n_touched);
        for (n, (i, cells)) in v2c.iter().enumerate() {
            let fan_cells = FanSorter::fan_cells(model, i, cells)?;
            let runs = sorter.runs(i, &fan_cells)?;
            let tmp = runs
                .iter()
                .map(|r| sorter.polygon(i, r))
                .collect::<Result<Vec<_>>>()?;
            trace.fan(i, &fan_cells, &tmp);
            polys.extend(tmp);
            progress.report(Stage::Polygons, n + 1, n_touched)?;
        }
        Ok(polys)
    }

    /// Number of element centroids
    #[must_use]
    pub const fn n_centroids(&self) -> usize {
        self.n_centroids
    }

    /// Number of dual vertices on boundary edges
    #[must_use]
    pub const fn n_boundary_mids(&self) -> usize {
        self.n_boundary_mids
    }

    /// Number of dual vertices on connection edges
    #[must_use]
    pub const fn n_connection_mids(&self) -> usize {
        self.n_connection_mids
    }

    /// Number of exported hard vertices
    #[must_use]
    pub const fn n_hard_vertices(&self) -> usize {
        self.n_hard_vertices
    }

    /// Number of dual vertices
    #[must_use]
    pub const fn n_verts(&self) -> usize {
        self.verts.len()
    }

    /// Number of dual polygons
    #[must_use]
    pub const fn n_polygons(&self) -> usize {
        self.polys.len()
    }

    /// Sequential iterator over the dual vertices
    #[must_use]
    pub fn verts(&self) -> impl ExactSizeIterator<Item = &DualVertex> + '_ {
        self.verts.iter()
    }

    /// Sequential iterator over the dual polygons
    #[must_use]
    pub fn polygons(&self) -> impl ExactSizeIterator<Item = &DualPolygon> + '_ {
        self.polys.iter()
    }

    /// Origin of the `i`th dual vertex
    #[must_use]
    pub fn vertex_kind(&self, i: usize) -> Option<DualVertexKind> {
        self.verts.get(i).map(|v| v.kind)
    }

    /// Write the dual mesh in text format
    pub fn write(&self, file_name: &str) -> Result<()> {
        info!("Write {file_name}");
        let f = File::create(file_name)?;
        let mut writer = BufWriter::new(f);
        write_dual(self, &mut writer)
    }

    /// Write the dual mesh in a .vtu file
    pub fn write_vtk(&self, file_name: &str) -> Result<()> {
        info!("Write {file_name}");
        let vtu = VTUFile::from_dual_mesh(self, VTUEncoding::Binary);

        vtu.export(file_name)?;

        Ok(())
    }
}
