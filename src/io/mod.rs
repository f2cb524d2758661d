//! Dual mesh output: text format and .vtu files
mod dual_writer;
mod vtu_output;

pub use dual_writer::write_dual;
pub use vtu_output::{VTUEncoding, VTUFile};
