//! Document loading
//!
//! Reads a document's bytes and turns them into a UTF-8 JSON buffer the schema
//! engine can parse. The format is resolved once from the file extension:
//! `.yml`/`.yaml` go through YAML-to-JSON conversion, everything else through
//! the charset normalizer.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::trace;

use crate::charset;
use crate::error::{LoadCause, LoadError};

/// Document family, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// Bytes exactly as read from storage
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self {
            path,
            format,
            bytes,
        }
    }
}

/// UTF-8 JSON text ready for structural parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBuffer {
    bytes: Vec<u8>,
}

impl DecodedBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Loads documents with an explicit BOM policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentLoader {
    allow_bom: bool,
}

impl DocumentLoader {
    pub fn new(allow_bom: bool) -> Self {
        Self { allow_bom }
    }

    pub fn allow_bom(&self) -> bool {
        self.allow_bom
    }

    /// Read the raw bytes of a document
    pub async fn read(&self, path: &Path) -> Result<RawDocument, LoadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LoadError::new(path, e))?;
        trace!(path = %path.display(), bytes = bytes.len(), "read document");
        Ok(RawDocument::new(path, bytes))
    }

    /// Convert raw bytes into a parser-ready buffer. CPU-bound for large YAML.
    pub fn decode(&self, raw: RawDocument) -> Result<DecodedBuffer, LoadError> {
        let RawDocument {
            path,
            format,
            bytes,
        } = raw;

        let decoded = match format {
            DocumentFormat::Yaml => yaml_to_json(&bytes),
            DocumentFormat::Json => charset::normalize(bytes, self.allow_bom).map_err(Into::into),
        };

        decoded
            .map(|bytes| DecodedBuffer { bytes })
            .map_err(|cause| LoadError { path, cause })
    }

    pub async fn load(&self, path: &Path) -> Result<DecodedBuffer, LoadError> {
        let raw = self.read(path).await?;
        self.decode(raw)
    }
}

fn yaml_to_json(bytes: &[u8]) -> Result<Vec<u8>, LoadCause> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_slice(bytes).map_err(|e| LoadCause::Yaml(e.to_string()))?;
    let json = yaml_to_json_value(&yaml).map_err(LoadCause::Yaml)?;
    serde_json::to_vec(&json).map_err(|e| LoadCause::Yaml(e.to_string()))
}

/// Convert a `serde_yaml::Value` tree to the equivalent JSON tree. Tags are
/// dropped; scalar map keys become strings.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => return Err(format!("unsupported map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
