//! Import failures shared by the OBJ/MTL parsers and the buffer builder.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Which attribute array a face index points into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AttributeRef {
    Position,
    Texcoord,
    Normal,
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttributeRef::Position => "position",
            AttributeRef::Texcoord => "texcoord",
            AttributeRef::Normal => "normal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("missing or invalid {what} on line {line}")]
    InvalidNumber { line: usize, what: &'static str },

    #[error("invalid face index '{token}' on line {line}")]
    InvalidIndex { line: usize, token: String },

    #[error("malformed face on line {line}: expected {expected}, found '{found}'")]
    MalformedFace {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("{attribute} index {index} out of bounds (len={len}) on line {line}")]
    IndexOutOfRange {
        line: usize,
        attribute: AttributeRef,
        index: usize,
        len: usize,
    },

    #[error("face on line {line} has no normal but the layout requires one")]
    MissingNormal { line: usize },

    #[error("mesh produced no vertices")]
    Empty,
}

pub type ImportResult<T> = Result<T, ImportError>;
