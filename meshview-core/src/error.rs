/// Error types for mesh loading.
use std::path::PathBuf;

use thiserror::Error;

/// Which index table a face corner refers into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Vertex,
    Texture,
    Normal,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexKind::Vertex => "vertex",
            IndexKind::Texture => "texture",
            IndexKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Every way loading a mesh can fail. None of them are recoverable.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line had the wrong number of tokens or a token that is not a number.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A face referenced an element that does not exist.
    #[error("line {line}: {kind} index {index} out of range (have {len})")]
    IndexOutOfRange {
        line: usize,
        kind: IndexKind,
        index: i64,
        len: usize,
    },

    /// The file declared no vertices, so there is nothing to frame.
    #[error("mesh contains no vertices")]
    Empty,
}

/// Convenience alias for `Result<T, MeshError>`.
pub type MeshResult<T> = Result<T, MeshError>;
