//! Optional diagnostic dump of the intermediate state: hard edges, and the rotated elements
//! and polygons around every vertex. Failing to write the dump never fails the export.
use super::{DualPolygon, FanCell, FanKind, HardEdgeRegistry};
use crate::config::ExportOptions;
use log::{debug, warn};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Diagnostic dump file, possibly disabled
#[derive(Debug, Default)]
pub struct DebugTrace {
    out: Option<BufWriter<File>>,
}

impl DebugTrace {
    /// A trace that writes nothing
    #[must_use]
    pub const fn disabled() -> Self {
        Self { out: None }
    }

    /// Path of the dump file associated with output file `output`
    #[must_use]
    pub fn dump_path(output: &Path) -> PathBuf {
        let mut res = output.as_os_str().to_owned();
        res.push(".dump");
        PathBuf::from(res)
    }

    /// Open `path`; on failure a warning is issued and the trace is disabled
    #[must_use]
    pub fn open(path: &Path) -> Self {
        match File::create(path) {
            Ok(f) => {
                debug!("debug dump file: {}", path.display());
                Self {
                    out: Some(BufWriter::new(f)),
                }
            }
            Err(e) => {
                warn!("unable to open debug dump file {}: {e}", path.display());
                Self::disabled()
            }
        }
    }

    /// Create the trace for output file `output`: if `options.debug_dump` is not set, any dump
    /// left by a previous run is removed
    #[must_use]
    pub fn for_output(output: &Path, options: &ExportOptions) -> Self {
        let path = Self::dump_path(output);
        if options.debug_dump {
            Self::open(&path)
        } else {
            if path.exists() {
                debug!("remove stale debug dump file {}", path.display());
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!("unable to remove {}: {e}", path.display());
                }
            }
            Self::disabled()
        }
    }

    /// Check if the trace is written
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    fn write_with<F>(&mut self, f: F)
    where
        F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    {
        if let Some(out) = self.out.as_mut()
            && let Err(e) = f(out)
        {
            warn!("debug dump disabled after a write error: {e}");
            self.out = None;
        }
    }

    /// Dump the hard edges and vertices
    pub fn hard_edges(&mut self, registry: &HardEdgeRegistry) {
        self.write_with(|out| {
            let edges = registry.edges();
            writeln!(out, "# hard edges {}", edges.len())?;
            for ([i0, i1], dual) in edges {
                writeln!(out, "#    edge {{ {i0} {i1} }} dual={dual}")?;
            }
            let verts = registry.hard_vertices();
            writeln!(out, "# hard vertices {}", verts.len())?;
            for i in verts {
                match registry.hard_vertex_dual_index(i) {
                    Some(dual) => writeln!(out, "#    vert={i} dual={dual}")?,
                    None => writeln!(out, "#    vert={i}")?,
                }
            }
            Ok(())
        });
    }

    /// Dump the elements around `vertex` and the resulting polygons
    pub fn fan(&mut self, vertex: usize, cells: &[FanCell], polys: &[DualPolygon]) {
        self.write_with(|out| {
            writeln!(out, "\n# vertex {vertex}")?;
            for c in cells {
                write!(out, "#    cell ndx={} {{", c.cell)?;
                for i in &c.verts {
                    write!(out, " {i}")?;
                }
                let [l0, l1] = c.left_edge();
                let [r0, r1] = c.right_edge();
                writeln!(out, " }} leftEdge {{ {l0} {l1} }} rightEdge {{ {r0} {r1} }}")?;
            }
            for p in polys {
                let tag = match p.kind {
                    FanKind::Closed => 'I',
                    FanKind::Open => 'B',
                };
                write!(out, "#    poly {tag} {{")?;
                for i in &p.members {
                    write!(out, " {i}")?;
                }
                writeln!(out, " }}")?;
            }
            Ok(())
        });
    }

    /// Flush the dump file
    pub fn finish(&mut self) {
        self.write_with(Write::flush);
    }
}
