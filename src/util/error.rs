//! Error types for scene loading.

use std::path::PathBuf;
use thiserror::Error;

/// Broad class of an [`Error`].
///
/// Every class is fatal to the load; the split only tells the caller
/// whether the input, the configuration or the machine is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Corrupt or incompatible scene data.
    Structural,
    /// Load options that cannot work for this input.
    Configuration,
    /// Memory or I/O failure.
    Resource,
}

/// Main error type for scene operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Triangle index references a vertex that does not exist
    #[error("Geometry {geometry}: index {index} at position {position} out of range (vertex count: {vertex_count})")]
    IndexOutOfRange {
        geometry: usize,
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Index list length is not a multiple of three
    #[error("Geometry {geometry}: index count {count} is not a triangle list")]
    IndexCountNotTriangles { geometry: usize, count: usize },

    /// Part range falls outside the geometry's index range
    #[error("Geometry {geometry}: part {part} range {offset}+{count} exceeds index count {total}")]
    PartOutOfRange {
        geometry: usize,
        part: usize,
        offset: usize,
        count: usize,
        total: usize,
    },

    /// Parts leave a gap, overlap, or do not end at the last index
    #[error("Geometry {geometry}: part {part} does not continue the previous part at index {expected}")]
    PartsNotContiguous {
        geometry: usize,
        part: usize,
        expected: usize,
    },

    /// Per-vertex attribute array has the wrong length
    #[error("Geometry {geometry}: expected {expected} normals, got {actual}")]
    AttributeCountMismatch {
        geometry: usize,
        expected: usize,
        actual: usize,
    },

    /// Handle into a table does not exist
    #[error("Invalid {kind} handle {handle} (count: {count})")]
    InvalidHandle {
        kind: &'static str,
        handle: usize,
        count: usize,
    },

    /// Object overrides a different number of parts than its geometry has
    #[error("Object {object}: {actual} part overrides, geometry has {expected} parts")]
    PartCountMismatch {
        object: usize,
        expected: usize,
        actual: usize,
    },

    /// Object leaves one of its geometry's parts without an override
    #[error("Object {object}: part {part} has no override")]
    MissingPartOverride { object: usize, part: usize },

    /// A single triangle does not fit the meshlet budgets
    #[error("Geometry {geometry:?}: triangle {triangle} does not fit meshlet limits ({max_vertices} vertices, {max_primitives} primitives)")]
    MeshletBudget {
        geometry: Option<usize>,
        triangle: usize,
        max_vertices: u32,
        max_primitives: u32,
    },

    /// Option value out of its accepted range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Buffer allocation failed
    #[error("Failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::IndexCountNotTriangles { .. }
            | Self::PartOutOfRange { .. }
            | Self::PartsNotContiguous { .. }
            | Self::AttributeCountMismatch { .. }
            | Self::InvalidHandle { .. }
            | Self::PartCountMismatch { .. }
            | Self::MissingPartOverride { .. } => ErrorKind::Structural,
            Self::MeshletBudget { .. } | Self::InvalidConfig(_) | Self::ConfigParse(_) => {
                ErrorKind::Configuration
            }
            Self::FileNotFound(_) | Self::Allocation { .. } | Self::Io(_) => ErrorKind::Resource,
        }
    }

    /// Create an invalid configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Attach the geometry index to a meshlet budget error raised by the builder.
    pub(crate) fn with_geometry(self, index: usize) -> Self {
        match self {
            Self::MeshletBudget {
                triangle,
                max_vertices,
                max_primitives,
                ..
            } => Self::MeshletBudget {
                geometry: Some(index),
                triangle,
                max_vertices,
                max_primitives,
            },
            other => other,
        }
    }
}

/// Result type alias for scene operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Allocate an empty byte buffer with exactly `len` bytes of capacity.
///
/// Packed GPU blocks go through here so that an allocation failure surfaces
/// as [`Error::Allocation`] instead of aborting the process.
pub fn alloc_bytes(what: &'static str, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { what, bytes: len })?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::IndexOutOfRange {
            geometry: 2,
            position: 7,
            index: 99,
            vertex_count: 4,
        };
        let s = e.to_string();
        assert!(s.contains("99"));
        assert!(s.contains("Geometry 2"));

        let e = Error::PartCountMismatch {
            object: 1,
            expected: 3,
            actual: 2,
        };
        assert!(e.to_string().contains("3 parts"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::MissingPartOverride { object: 0, part: 1 }.kind(),
            ErrorKind::Structural
        );
        assert_eq!(Error::config("bad").kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::Allocation { what: "vbo", bytes: 1 }.kind(),
            ErrorKind::Resource
        );
    }

    #[test]
    fn test_with_geometry() {
        let e = Error::MeshletBudget {
            geometry: None,
            triangle: 4,
            max_vertices: 2,
            max_primitives: 126,
        }
        .with_geometry(7);
        assert!(matches!(e, Error::MeshletBudget { geometry: Some(7), triangle: 4, .. }));

        // other variants pass through untouched
        let e = Error::config("x").with_geometry(7);
        assert!(matches!(e, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Resource);
    }

    #[test]
    fn test_alloc_bytes() {
        let buf = alloc_bytes("test", 64).unwrap();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 64);
    }
}
