use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the three import inputs a fatal error refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputKind {
    SkeletonDocument,
    Atlas,
    TextureDirectory,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SkeletonDocument => "skeleton document",
            Self::Atlas => "atlas",
            Self::TextureDirectory => "texture directory",
        })
    }
}

/// Problems that abort an import before any model is built.
///
/// Everything else (a bad bone, a missing texture, an unknown animation bone) is
/// recorded in the [`ImportLog`](crate::ImportLog) instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} not found: {}", path.display())]
    MissingInput { kind: InputKind, path: PathBuf },

    #[error("{kind} path is empty")]
    EmptyPath { kind: InputKind },

    #[error("failed to read {kind} '{}': {source}", path.display())]
    Io {
        kind: InputKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Spine JSON: {message}")]
    JsonParse { message: String },

    #[error("invalid skeleton document: {message}")]
    InvalidDocument { message: String },
}

impl Error {
    /// The input the error was raised for.
    pub fn kind(&self) -> InputKind {
        match self {
            Self::MissingInput { kind, .. } | Self::EmptyPath { kind } | Self::Io { kind, .. } => {
                *kind
            }
            Self::JsonParse { .. } | Self::InvalidDocument { .. } => InputKind::SkeletonDocument,
        }
    }
}
