//! Concurrent validation engine
//!
//! One tokio task is spawned per document path. A semaphore bounds how many
//! documents are in flight at once, which keeps the number of open files in
//! check when the document count vastly exceeds the core count. Inside a
//! task the file read is async; decoding and schema evaluation run under
//! `spawn_blocking`, since both are CPU-bound and may take a while for large
//! documents.
//!
//! Every task records exactly one outcome with the shared
//! [`ResultAggregator`]. The engine joins all tasks before it finalizes the
//! aggregator, so no partial results are ever observable.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::aggregator::{ErrorStage, ResultAggregator, RunSummary, ValidationOutcome};
use crate::error::{Result, ValidationError};
use crate::loader::{DocumentLoader, RawDocument};
use crate::schema::DocumentSchema;

/// Headroom on top of the core count so file I/O overlaps with evaluation
pub const CONCURRENCY_HEADROOM: usize = 10;

/// Default number of documents in flight
pub fn default_concurrency() -> usize {
    num_cpus::get() + CONCURRENCY_HEADROOM
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Maximum number of documents loaded or validated at the same time
    pub max_concurrent_validations: usize,
    /// Accept (and strip) a UTF-8 byte order mark in JSON documents
    pub allow_bom: bool,
    /// Suppress pass lines and the end-of-run summary
    pub quiet: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_validations: default_concurrency(),
            allow_bom: false,
            quiet: false,
        }
    }
}

/// Validates batches of documents against one compiled schema
pub struct ValidationEngine {
    schema: Arc<dyn DocumentSchema>,
    loader: DocumentLoader,
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(schema: Arc<dyn DocumentSchema>, config: ValidationConfig) -> Self {
        let loader = DocumentLoader::new(config.allow_bom);
        Self {
            schema,
            loader,
            config,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn loader(&self) -> DocumentLoader {
        self.loader
    }

    /// Validate every path and return once all of them have an outcome.
    ///
    /// Report lines are streamed to `out` as documents complete, followed by
    /// the summary. Duplicate paths are validated (and reported) once per
    /// occurrence.
    pub async fn run_all<W>(&self, paths: Vec<PathBuf>, out: W) -> Result<(RunSummary, W)>
    where
        W: Write + Send + 'static,
    {
        let start = Instant::now();
        let total = paths.len();
        let concurrency = self.config.max_concurrent_validations.max(1);
        debug!(documents = total, concurrency, "starting validation");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let aggregator = Arc::new(ResultAggregator::new(out, self.config.quiet));

        let tasks: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let semaphore = Arc::clone(&semaphore);
                let aggregator = Arc::clone(&aggregator);
                let schema = Arc::clone(&self.schema);
                let loader = self.loader;

                tokio::spawn(async move {
                    // The semaphore is never closed, so acquisition only fails
                    // if that invariant is broken.
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        ValidationError::Concurrency {
                            details: format!("semaphore closed: {e}"),
                        }
                    })?;

                    let outcome = validate_document(loader, schema, &path).await;
                    aggregator.record(&path, outcome);
                    Ok::<(), ValidationError>(())
                })
            })
            .collect();

        for joined in join_all(tasks).await {
            joined.map_err(|e| ValidationError::Concurrency {
                details: format!("task join error: {e}"),
            })??;
        }

        let aggregator =
            Arc::try_unwrap(aggregator).map_err(|_| ValidationError::Concurrency {
                details: "result aggregator still shared after join".to_string(),
            })?;
        let (summary, out) = aggregator.finalize();

        info!(
            documents = total,
            passed = summary.passed_count(),
            failed = summary.failed_count(),
            errors = summary.error_count(),
            clean = summary.exit_status().is_success(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "validation complete"
        );

        Ok((summary, out))
    }

    /// Load and classify one document without recording it anywhere
    pub async fn validate_single_file(&self, path: &Path) -> ValidationOutcome {
        validate_document(self.loader, Arc::clone(&self.schema), path).await
    }
}

async fn validate_document(
    loader: DocumentLoader,
    schema: Arc<dyn DocumentSchema>,
    path: &Path,
) -> ValidationOutcome {
    let raw = match loader.read(path).await {
        Ok(raw) => raw,
        Err(e) => return load_error(e.cause),
    };

    let outcome = tokio::task::spawn_blocking(move || classify(loader, schema.as_ref(), raw))
        .await
        .unwrap_or_else(|e| ValidationOutcome::Error {
            stage: ErrorStage::Internal,
            cause: e.to_string(),
        });

    debug!(path = %path.display(), pass = outcome.is_pass(), "document validated");
    outcome
}

/// Decode a raw document and evaluate it against the schema
fn classify(
    loader: DocumentLoader,
    schema: &dyn DocumentSchema,
    raw: RawDocument,
) -> ValidationOutcome {
    let buffer = match loader.decode(raw) {
        Ok(buffer) => buffer,
        Err(e) => return load_error(e.cause),
    };

    match schema.validate(buffer.as_bytes()) {
        Err(e) => ValidationOutcome::Error {
            stage: ErrorStage::Validate,
            cause: e.to_string(),
        },
        Ok(violations) if violations.is_empty() => ValidationOutcome::Pass,
        Ok(violations) => ValidationOutcome::Fail(violations),
    }
}

fn load_error(cause: impl ToString) -> ValidationOutcome {
    ValidationOutcome::Error {
        stage: ErrorStage::LoadDoc,
        cause: cause.to_string(),
    }
}
