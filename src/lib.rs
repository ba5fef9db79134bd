//! # validate-json Library
//!
//! Concurrent validation of JSON and YAML documents against a JSON Schema.
//! Documents are decoded (UTF-8, UTF-8 with BOM, UTF-16 in either byte order,
//! or YAML), evaluated in parallel under a concurrency bound, and classified
//! as pass, fail or error.

pub mod aggregator;
pub mod app;
pub mod charset;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_discovery;
pub mod loader;
pub mod logging;
pub mod output;
pub mod schema;
pub mod validator;

pub use aggregator::{
    DocumentReport, ErrorStage, ExitStatus, ResultAggregator, RunSummary, ValidationOutcome,
};
pub use charset::{Detection, Encoding};
pub use cli::Cli;
pub use config::{Config, ConfigError, ConfigManager, EnvProvider, SystemEnvProvider};
pub use error::{
    CharsetError, DiscoveryError, LoadCause, LoadError, SchemaError, ValidateError,
    ValidationError,
};
pub use file_discovery::FileDiscovery;
pub use loader::{DecodedBuffer, DocumentFormat, DocumentLoader, RawDocument};
pub use logging::{LogFormat, LogLevel};
pub use output::Output;
pub use schema::{CompiledSchema, DocumentSchema, SchemaCompiler};
pub use validator::{ValidationConfig, ValidationEngine};
