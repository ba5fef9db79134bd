use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

/// Exit code for invalid command line usage
pub const EXIT_USAGE: u8 = 4;

/// Exit code for schema definition and file-list errors
pub const EXIT_SCHEMA: u8 = 5;

/// Run-level errors. Any of these aborts the run before a single document is
/// validated; per-document problems are outcomes, not errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("{}: invalid file list: {reason}", path.display())]
    FileList { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },
}

impl ValidationError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            ValidationError::Usage(_) | ValidationError::Config(_) => EXIT_USAGE,
            ValidationError::Schema(_) | ValidationError::FileList { .. } => EXIT_SCHEMA,
            // Same bit as a per-document error: something could not be evaluated.
            ValidationError::Concurrency { .. } => 2,
        }
    }

    /// True when the usage text should accompany the message
    pub fn is_usage(&self) -> bool {
        matches!(self, ValidationError::Usage(_) | ValidationError::Config(_))
    }
}

/// Schema definition errors (primary or referenced schema)
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{}: unable to load schema: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("{}: unable to load schema ref: {reason}", path.display())]
    LoadRef { path: PathBuf, reason: String },

    #[error("{}: invalid schema: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("{}: unable to convert to absolute path: {source}", path.display())]
    AbsolutePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] DiscoveryError),
}

/// A document or schema glob could not be expanded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("{pattern}: no such file or directory")]
    NoMatch { pattern: String },

    #[error("{pattern}: invalid glob pattern: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{pattern}: {reason}")]
    Unreadable { pattern: String, reason: String },
}

/// Charset normalization failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CharsetError {
    #[error("unexpected BOM, see `-b` flag")]
    UnexpectedBom,

    #[error("{encoding}: truncated code unit, {len} bytes is not a multiple of 2")]
    TruncatedCodeUnit { encoding: &'static str, len: usize },

    #[error("{encoding}: unpaired surrogate 0x{unit:04X}")]
    UnpairedSurrogate { encoding: &'static str, unit: u16 },
}

/// Why a document's bytes could not be turned into a parser-ready buffer
#[derive(Error, Debug)]
pub enum LoadCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Charset(#[from] CharsetError),

    #[error("yaml: {0}")]
    Yaml(String),
}

/// A document could not be read, decoded or converted
#[derive(Error, Debug)]
#[error("{}: {cause}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub cause: LoadCause,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, cause: impl Into<LoadCause>) -> Self {
        Self {
            path: path.into(),
            cause: cause.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The schema engine could not evaluate a decoded document
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Schema result type alias
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
