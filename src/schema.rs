//! Schema compilation and document evaluation
//!
//! The worker pool only sees the [`DocumentSchema`] trait. [`CompiledSchema`]
//! implements it on top of the `jsonschema` crate.
//!
//! ## Reference resolution
//!
//! Schemas passed with `-r` are registered with a local retriever under their
//! absolute `file://` URI, their `$id` (or draft-4 `id`) and their bare file
//! name. When the primary schema declares no identifier it gets its own
//! `file://` URI as base, so a relative `"$ref": "defs.json"` lands on the
//! sibling ref file. Nothing is ever fetched over the network; an unknown
//! reference fails compilation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{LoadCause, SchemaError, SchemaResult, ValidateError};
use crate::loader::DocumentLoader;

/// Opaque validation capability used by the worker pool
#[cfg_attr(test, mockall::automock)]
pub trait DocumentSchema: Send + Sync {
    /// Evaluate a decoded document.
    ///
    /// `Ok` holds one human-readable description per violation (empty means
    /// the document is valid). `Err` means the document could not be
    /// evaluated at all.
    fn validate(&self, document: &[u8]) -> Result<Vec<String>, ValidateError>;
}

/// A schema compiled by the `jsonschema` engine
pub struct CompiledSchema {
    path: PathBuf,
    validator: Validator,
}

impl CompiledSchema {
    /// Compile a schema value that has no external references
    pub fn from_value(path: impl Into<PathBuf>, schema: &Value) -> SchemaResult<Self> {
        let path = path.into();
        let validator = jsonschema::validator_for(schema).map_err(|e| SchemaError::Invalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { path, validator })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DocumentSchema for CompiledSchema {
    fn validate(&self, document: &[u8]) -> Result<Vec<String>, ValidateError> {
        let instance: Value = serde_json::from_slice(document)?;
        Ok(self
            .validator
            .iter_errors(&instance)
            .map(|error| describe_violation(&error))
            .collect())
    }
}

/// Render a violation as `<field>: <description>`, where the field is
/// `(root)` or the dotted instance path.
fn describe_violation(error: &jsonschema::ValidationError<'_>) -> String {
    let pointer = error.instance_path.to_string();
    let field = if pointer.is_empty() {
        "(root)".to_string()
    } else {
        pointer.trim_start_matches('/').replace('/', ".")
    };

    let description = match &error.kind {
        ValidationErrorKind::Required { property } => match property.as_str() {
            Some(name) => format!("{name} is required"),
            None => format!("{property} is required"),
        },
        _ => error.to_string(),
    };

    format!("{field}: {description}")
}

/// Resolves `$ref` URIs against the schemas registered with `-r`
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let file_name = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(file_name) {
            return Ok(value.clone());
        }

        Err(format!("unresolved schema reference: {uri_str}").into())
    }
}

/// Compiles the primary schema together with its referenced schemas
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaCompiler {
    loader: DocumentLoader,
}

impl SchemaCompiler {
    /// Schemas are read with the same loader as documents, so YAML schemas and
    /// the BOM policy apply to them as well.
    pub fn new(loader: DocumentLoader) -> Self {
        Self { loader }
    }

    /// Compile `schema`, registering every path in `refs` for `$ref`
    /// resolution. A ref that is the primary schema itself is skipped.
    pub async fn compile(&self, schema: &Path, refs: &[PathBuf]) -> SchemaResult<CompiledSchema> {
        let schema_path = absolute(schema)?;
        let mut schemas_by_uri = HashMap::new();

        for ref_path in refs {
            let abs_ref = absolute(ref_path)?;
            if abs_ref == schema_path {
                continue;
            }

            let value = self
                .load_value(&abs_ref)
                .await
                .map_err(|reason| SchemaError::LoadRef {
                    path: ref_path.clone(),
                    reason,
                })?
                .map_err(|reason| SchemaError::Invalid {
                    path: ref_path.clone(),
                    reason,
                })?;

            debug!(path = %ref_path.display(), "registered schema ref");
            register(&mut schemas_by_uri, &abs_ref, value)?;
        }

        let mut value = self
            .load_value(&schema_path)
            .await
            .map_err(|reason| SchemaError::Load {
                path: schema.to_path_buf(),
                reason,
            })?
            .map_err(|reason| SchemaError::Invalid {
                path: schema.to_path_buf(),
                reason,
            })?;

        if let Value::Object(object) = &mut value
            && !object.contains_key("$id")
            && !object.contains_key("id")
        {
            let base = file_uri(&schema_path)?;
            object.insert("$id".to_string(), Value::String(base.clone()));
            object.insert("id".to_string(), Value::String(base));
        }

        let validator = jsonschema::options()
            .with_retriever(LocalSchemaRetriever { schemas_by_uri })
            .build(&value)
            .map_err(|e| SchemaError::Invalid {
                path: schema.to_path_buf(),
                reason: e.to_string(),
            })?;

        debug!(path = %schema.display(), refs = refs.len(), "compiled schema");
        Ok(CompiledSchema {
            path: schema.to_path_buf(),
            validator,
        })
    }

    /// Outer error: the file could not be loaded. Inner error: it loaded but
    /// is not a schema document.
    async fn load_value(&self, path: &Path) -> Result<Result<Value, String>, String> {
        let buffer = self.loader.load(path).await.map_err(|e| match e.cause {
            LoadCause::Io(io) => io.to_string(),
            other => other.to_string(),
        })?;

        let parsed = serde_json::from_slice::<Value>(buffer.as_bytes())
            .map_err(|e| e.to_string())
            .and_then(|value| match value {
                Value::Object(_) | Value::Bool(_) => Ok(value),
                other => Err(format!(
                    "schema must be an object or a boolean, found {}",
                    json_type(&other)
                )),
            });
        Ok(parsed)
    }
}

fn register(
    schemas_by_uri: &mut HashMap<String, Value>,
    path: &Path,
    value: Value,
) -> SchemaResult<()> {
    for key in ["$id", "id"] {
        if let Some(id) = value.get(key).and_then(Value::as_str) {
            schemas_by_uri.insert(id.trim_end_matches('#').to_string(), value.clone());
        }
    }

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if schemas_by_uri.contains_key(name) {
            warn!(name, "two schema refs share a file name, keeping the last");
        }
        schemas_by_uri.insert(name.to_string(), value.clone());
    }

    schemas_by_uri.insert(file_uri(path)?, value);
    Ok(())
}

fn absolute(path: &Path) -> SchemaResult<PathBuf> {
    std::path::absolute(path).map_err(|source| SchemaError::AbsolutePath {
        path: path.to_path_buf(),
        source,
    })
}

/// `file://` URI for an absolute path
fn file_uri(path: &Path) -> SchemaResult<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|()| SchemaError::Invalid {
            path: path.to_path_buf(),
            reason: "path cannot be expressed as a file URI".to_string(),
        })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
