//! Progress reporting and cooperative cancellation
//!
//! ```ignore
//! use dualmesh::dual::{Progress, Stage};
//!
//! let progress = Progress::new(|stage, current, total| {
//!     println!("{stage}: {current}/{total}");
//!     true
//! });
//! ```
use crate::{Error, Result};
use std::fmt;

/// Stages of the dual mesh construction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Element pass: centroids and vertex to element connectivity
    Elements,
    /// Face stream: boundary and connection mid points
    Faces,
    /// Fan pass: one or more polygons per vertex
    Polygons,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Elements => write!(f, "elements"),
            Self::Faces => write!(f, "faces"),
            Self::Polygons => write!(f, "polygons"),
        }
    }
}

/// A progress callback, called at the beginning of each stage (with `current = 0`), after
/// every unit of work and at the end of each stage. Returning `false` cancels the
/// construction.
pub struct Progress {
    callback: Box<dyn Fn(Stage, usize, usize) -> bool + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Stage, usize, usize) -> bool + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a reporter that ignores all updates and never cancels
    #[must_use]
    pub fn none() -> Self {
        Self::new(|_, _, _| true)
    }

    /// Report progress; an error is returned if the caller requested cancellation
    #[inline]
    pub fn report(&self, stage: Stage, current: usize, total: usize) -> Result<()> {
        if (self.callback)(stage, current, total) {
            Ok(())
        } else {
            Err(Error::Cancelled.into())
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Progress, Stage};
    use crate::Error;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn test_none() {
        let progress = Progress::none();
        for i in 0..10 {
            progress.report(Stage::Faces, i, 10).unwrap();
        }
        assert_eq!(format!("{progress:?}"), "Progress { .. }");
    }

    #[test]
    fn test_cancel() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let progress = Progress::new(move |stage, current, _| {
            c.fetch_add(1, Ordering::Relaxed);
            stage != Stage::Polygons || current < 3
        });

        progress.report(Stage::Elements, 100, 10).unwrap();
        progress.report(Stage::Polygons, 2, 10).unwrap();
        let err = progress.report(Stage::Polygons, 3, 10).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Cancelled));
        assert_eq!(count.load(Ordering::Relaxed), 3);
        assert_eq!(Stage::Polygons.to_string(), "polygons");
    }
}
