//! Export options, read from a JSON file; missing fields take their default value
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;

/// Options of the dual mesh export
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Write the intermediate state to `<output>.dump`
    pub debug_dump: bool,
    /// Export the hard primal vertices as dual vertices, and add them to the open polygons
    pub export_hard_vertices: bool,
    /// Build the polygons in parallel (ignored when `debug_dump` is set)
    pub parallel: bool,
}

impl ExportOptions {
    /// Read the options from a JSON file
    pub fn from_json(fname: &str) -> Result<Self> {
        let file = File::open(fname)?;
        let res = serde_json::from_reader(file)?;
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::ExportOptions;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn from_str(s: &str) -> crate::Result<ExportOptions> {
        let mut file = NamedTempFile::new()?;
        file.write_all(s.as_bytes())?;
        let fname = file.path().to_str().unwrap().to_owned();
        ExportOptions::from_json(&fname)
    }

    #[test]
    fn test_defaults() {
        let opts = from_str("{}").unwrap();
        assert_eq!(opts, ExportOptions::default());
        assert!(!opts.debug_dump);
        assert!(!opts.export_hard_vertices);
        assert!(!opts.parallel);
    }

    #[test]
    fn test_partial() {
        let opts = from_str(r#"{"export_hard_vertices": true, "parallel": true}"#).unwrap();
        assert!(!opts.debug_dump);
        assert!(opts.export_hard_vertices);
        assert!(opts.parallel);
    }

    #[test]
    fn test_invalid() {
        assert!(from_str(r#"{"debug_dump": 1}"#).is_err());
        assert!(from_str(r#"{"unknown": true}"#).is_err());
        assert!(ExportOptions::from_json("/nonexistent/options.json").is_err());
    }
}
