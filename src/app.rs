//! Run orchestration
//!
//! Resolves the document set, compiles the schema and hands the batch to the
//! validation engine. Usage and schema problems abort here, before any
//! document is touched.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, info};

use crate::aggregator::{ExitStatus, RunSummary};
use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::file_discovery::FileDiscovery;
use crate::loader::DocumentLoader;
use crate::schema::SchemaCompiler;
use crate::validator::ValidationEngine;

/// Validate the documents named on the command line, writing report lines to
/// `out`. Returns the exit status alongside the writer.
pub async fn run<W>(cli: &Cli, config: &Config, out: W) -> Result<(ExitStatus, W)>
where
    W: Write + Send + 'static,
{
    let (summary, out) = run_with(cli, config, &FileDiscovery::new(), out).await?;
    Ok((summary.exit_status(), out))
}

/// Same as [`run`] with an explicit discovery engine, returning the full
/// summary.
pub async fn run_with<W>(
    cli: &Cli,
    config: &Config,
    discovery: &FileDiscovery,
    out: W,
) -> Result<(RunSummary, W)>
where
    W: Write + Send + 'static,
{
    let schema_path = cli
        .schema
        .as_deref()
        .ok_or_else(|| ValidationError::Usage("missing required -s schema argument".to_string()))?;

    let documents = discovery.resolve_documents(&cli.documents, &cli.lists).await?;
    if documents.is_empty() {
        return Err(ValidationError::Usage("no documents to validate".to_string()));
    }
    debug!(documents = documents.len(), "resolved documents");

    let refs = discovery.resolve_refs(&cli.refs)?;
    let compiler = SchemaCompiler::new(DocumentLoader::new(config.validation.allow_bom));
    let schema = compiler.compile(schema_path, &refs).await?;
    info!(schema = %schema_path.display(), refs = refs.len(), "schema compiled");

    let engine = ValidationEngine::new(Arc::new(schema), config.validation_config());
    engine.run_all(documents, out).await
}
