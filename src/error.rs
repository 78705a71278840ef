//! Error types for the csharp-surgeon crate.

use std::path::PathBuf;

/// Coarse classification callers use to tell failures apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    ParseError,
    ArgumentError,
    Io,
}

impl ErrorKind {
    /// Stable snake_case tag used in tool replies.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidState => "invalid_state",
            Self::ParseError => "parse_error",
            Self::ArgumentError => "argument_error",
            Self::Io => "io_error",
        }
    }
}

/// Surgeon-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum SurgeonError {
    /// No session registered under this id.
    #[error("session not found: {id}")]
    SessionNotFound { id: String },

    /// No method declaration with this name.
    #[error("method '{name}' not found")]
    MethodNotFound { name: String },

    /// File or directory does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Save requested for a session that was created without a path.
    #[error("session {id} has no associated file path")]
    SessionWithoutPath { id: String },

    /// Refusing to overwrite a file the operation would create.
    #[error("file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Method exists but declares no body (abstract, extern, interface member).
    #[error("method '{name}' has no body")]
    MissingBody { name: String },

    /// Source text or a replacement fragment could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Missing or contradictory arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SurgeonError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionNotFound { .. } | Self::MethodNotFound { .. } | Self::FileNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::SessionWithoutPath { .. } | Self::MissingBody { .. } | Self::AlreadyExists { .. } => {
                ErrorKind::InvalidState
            }
            Self::Parse(_) => ErrorKind::ParseError,
            Self::InvalidArgument(_) => ErrorKind::ArgumentError,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound { path };
        }
        Self::Io { path, source }
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Convenience result type for surgeon operations.
pub type SurgeonResult<T> = Result<T, SurgeonError>;
