use crate::{
    Result,
    dual::{DualMesh, DualVertexKind, FanKind},
};
use base64::Engine as _;
use quick_xml::se::to_utf8_io_writer;
use serde::Serialize;
use std::io::{BufWriter, Write};

/// VTK cell type for polygons
const VTK_POLYGON: u8 = 7;

/// Encoding for vtk files
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VTUEncoding {
    /// Ascii
    Ascii,
    /// Binary
    Binary,
}

#[derive(Serialize)]
#[serde(rename = "VTKFile", rename_all = "PascalCase")]
/// VTU file writer
pub struct VTUFile {
    #[serde(rename = "@type")]
    grid_type: String,
    #[serde(rename = "@version")]
    version: f64,
    #[serde(rename = "@header_type")]
    header_type: String,
    #[serde(rename = "@byte_order")]
    byte_order: String,
    unstructured_grid: UnstructuredGrid,
}

impl VTUFile {
    /// Create a vtu writer for a dual mesh
    ///   - point data: `kind` (0: centroid, 1: boundary, 2: connection, 3: hard vertex)
    ///   - cell data: `kind` (0: closed, 1: open) and `vertex` (primal vertex)
    #[must_use]
    pub fn from_dual_mesh(mesh: &DualMesh, encoding: VTUEncoding) -> Self {
        let n_verts = mesh.n_verts();
        let n_polys = mesh.n_polygons();

        let point_kind = mesh.verts().map(|v| match v.kind {
            DualVertexKind::Centroid => 0_u8,
            DualVertexKind::BoundaryMid => 1,
            DualVertexKind::ConnectionMid => 2,
            DualVertexKind::HardVertex => 3,
        });
        let cell_kind = mesh.polygons().map(|p| match p.kind {
            FanKind::Closed => 0_u8,
            FanKind::Open => 1,
        });
        let cell_vertex = mesh.polygons().map(|p| p.vertex as i64);

        Self {
            grid_type: "UnstructuredGrid".to_string(),
            version: 0.1,
            header_type: "UInt32".to_string(),
            byte_order: "LittleEndian".to_string(),
            unstructured_grid: UnstructuredGrid {
                piece: Piece {
                    number_of_points: n_verts,
                    number_of_cells: n_polys,
                    points: Points::from_dual_mesh(mesh, encoding),
                    cells: Cells::from_dual_mesh(mesh, encoding),
                    cell_data: Data {
                        data_array: vec![
                            DataArray::new_u8("kind", 1, n_polys, cell_kind, encoding),
                            DataArray::new_i64("vertex", 1, n_polys, cell_vertex, encoding),
                        ],
                    },
                    point_data: Data {
                        data_array: vec![DataArray::new_u8(
                            "kind", 1, n_verts, point_kind, encoding,
                        )],
                    },
                },
            },
        }
    }

    /// Write the file
    pub fn export(&self, file_name: &str) -> Result<()> {
        let f = std::fs::File::create(file_name)?;
        let mut writer = BufWriter::new(f);
        writeln!(writer, "<?xml version=\"1.0\"?>")?;
        to_utf8_io_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UnstructuredGrid {
    piece: Piece,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Piece {
    #[serde(rename = "@NumberOfPoints")]
    number_of_points: usize,
    #[serde(rename = "@NumberOfCells")]
    number_of_cells: usize,
    points: Points,
    cells: Cells,
    cell_data: Data,
    point_data: Data,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Points {
    data_array: DataArray,
}

impl Points {
    fn from_dual_mesh(mesh: &DualMesh, encoding: VTUEncoding) -> Self {
        Self {
            data_array: DataArray::new_f64(
                "Points",
                3,
                3 * mesh.n_verts(),
                mesh.verts().flat_map(|v| [v.coords[0], v.coords[1], v.coords[2]]),
                encoding,
            ),
        }
    }
}

#[derive(Serialize)]
struct DataArray {
    #[serde(rename = "@type")]
    data_type: String,
    #[serde(rename = "@Name")]
    name: String,
    #[serde(rename = "@format")]
    format: String,
    #[serde(rename = "@NumberOfComponents")]
    number_of_components: usize,
    #[serde(rename = "$text")]
    data: String,
}

fn encode<T, I: Iterator<Item = u8>>(len: usize, data: I) -> String {
    let capacity = size_of::<u32>() + len * size_of::<T>();

    let mut out = Vec::with_capacity(capacity);
    let header = ((len * size_of::<T>()) as u32).to_le_bytes();
    out.extend_from_slice(&header);
    out.extend(data);
    assert_eq!(out.len(), capacity);
    base64::prelude::BASE64_STANDARD.encode(out)
}

fn ascii<T: std::fmt::Display, I: Iterator<Item = T>>(data: I) -> String {
    use std::fmt::Write;
    data.fold(String::new(), |mut output, b| {
        let _ = write!(output, "{b} ");
        output
    })
}

impl DataArray {
    fn new(
        data_type: &str,
        name: &str,
        number_of_components: usize,
        encoding: VTUEncoding,
        data: String,
    ) -> Self {
        let format = match encoding {
            VTUEncoding::Ascii => "ascii",
            VTUEncoding::Binary => "binary",
        };
        Self {
            data_type: data_type.to_string(),
            name: name.to_string(),
            format: format.to_string(),
            number_of_components,
            data,
        }
    }

    fn new_f64<I: Iterator<Item = f64>>(
        name: &str,
        number_of_components: usize,
        len: usize,
        data: I,
        encoding: VTUEncoding,
    ) -> Self {
        let data = match encoding {
            VTUEncoding::Ascii => ascii(data),
            VTUEncoding::Binary => encode::<f64, _>(len, data.flat_map(f64::to_le_bytes)),
        };
        Self::new("Float64", name, number_of_components, encoding, data)
    }

    fn new_i64<I: Iterator<Item = i64>>(
        name: &str,
        number_of_components: usize,
        len: usize,
        data: I,
        encoding: VTUEncoding,
    ) -> Self {
        let data = match encoding {
            VTUEncoding::Ascii => ascii(data),
            VTUEncoding::Binary => encode::<i64, _>(len, data.flat_map(i64::to_le_bytes)),
        };
        Self::new("Int64", name, number_of_components, encoding, data)
    }

    fn new_u8<I: Iterator<Item = u8>>(
        name: &str,
        number_of_components: usize,
        len: usize,
        data: I,
        encoding: VTUEncoding,
    ) -> Self {
        let data = match encoding {
            VTUEncoding::Ascii => ascii(data),
            VTUEncoding::Binary => encode::<u8, _>(len, data),
        };
        Self::new("UInt8", name, number_of_components, encoding, data)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Cells {
    data_array: Vec<DataArray>,
}

impl Cells {
    fn from_dual_mesh(mesh: &DualMesh, encoding: VTUEncoding) -> Self {
        let n = mesh.n_polygons();

        let len = mesh.polygons().map(|p| p.members.len()).sum::<usize>();
        let connectivity = DataArray::new_i64(
            "connectivity",
            1,
            len,
            mesh.polygons()
                .flat_map(|p| p.members.iter().map(|&i| i as i64)),
            encoding,
        );

        let data = mesh.polygons().scan(0, |offset, p| {
            *offset += p.members.len() as i64;
            Some(*offset)
        });
        let offsets = DataArray::new_i64("offsets", 1, n, data, encoding);

        let data = (0..n).map(|_i| VTK_POLYGON);
        let types = DataArray::new_u8("types", 1, n, data, encoding);

        Self {
            data_array: vec![connectivity, offsets, types],
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Data {
    data_array: Vec<DataArray>,
}
