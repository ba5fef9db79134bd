use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DiscoveryError, Result, SchemaError, ValidationError};

/// Resolves command line globs and file lists into concrete paths
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Replacement for a leading `~` (None leaves patterns untouched)
    home_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Create a discovery engine that expands `~` to the user's home directory
    pub fn new() -> Self {
        Self {
            home_dir: dirs::home_dir(),
        }
    }

    /// Override the directory substituted for a leading `~`
    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// Expand a leading `~` or `~/`; `~user` forms are left alone.
    pub fn expand_home(&self, pattern: &str) -> String {
        let Some(home) = &self.home_dir else {
            return pattern.to_string();
        };

        if pattern == "~" {
            home.to_string_lossy().into_owned()
        } else if let Some(rest) = pattern
            .strip_prefix("~/")
            .or_else(|| pattern.strip_prefix("~\\"))
        {
            home.join(rest).to_string_lossy().into_owned()
        } else {
            pattern.to_string()
        }
    }

    /// Expand one glob into the paths it matches, in sorted order.
    ///
    /// A pattern that matches nothing is an error, so a typo never silently
    /// shrinks the batch.
    pub fn glob(&self, pattern: &str) -> std::result::Result<Vec<PathBuf>, DiscoveryError> {
        let expanded = self.expand_home(pattern);
        let entries = glob::glob(&expanded).map_err(|e| DiscoveryError::InvalidPattern {
            pattern: expanded.clone(),
            reason: e.msg.to_string(),
        })?;

        let paths = entries
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| DiscoveryError::Unreadable {
                pattern: expanded.clone(),
                reason: e.to_string(),
            })?;

        if paths.is_empty() {
            return Err(DiscoveryError::NoMatch { pattern: expanded });
        }

        debug!(pattern = %expanded, matches = paths.len(), "expanded glob");
        Ok(paths)
    }

    /// Resolve positional document arguments followed by the entries of each
    /// list file. Order is preserved and duplicates are kept.
    pub async fn resolve_documents(
        &self,
        args: &[String],
        lists: &[PathBuf],
    ) -> Result<Vec<PathBuf>> {
        let mut docs = Vec::new();

        for arg in args {
            let paths = self
                .glob(arg)
                .map_err(|e| ValidationError::Usage(e.to_string()))?;
            docs.extend(paths);
        }

        for list in lists {
            docs.extend(self.read_file_list(list).await?);
        }

        Ok(docs)
    }

    /// Read a newline separated list of globs. Relative entries are resolved
    /// against the directory containing the list file.
    pub async fn read_file_list(&self, list: &Path) -> Result<Vec<PathBuf>> {
        let invalid = |reason: String| ValidationError::FileList {
            path: list.to_path_buf(),
            reason,
        };

        let content = tokio::fs::read_to_string(list)
            .await
            .map_err(|e| invalid(e.to_string()))?;
        let dir = list.parent().unwrap_or_else(|| Path::new(""));

        let mut docs = Vec::new();
        for line in content.lines() {
            let entry = line.trim();
            if entry.is_empty() {
                continue;
            }

            let expanded = self.expand_home(entry);
            let pattern = if Path::new(&expanded).is_absolute() {
                expanded
            } else {
                dir.join(&expanded).to_string_lossy().into_owned()
            };

            docs.extend(self.glob(&pattern).map_err(|e| invalid(e.to_string()))?);
        }

        debug!(list = %list.display(), documents = docs.len(), "read file list");
        Ok(docs)
    }

    /// Resolve `-r` globs. A pattern matching nothing is a schema error.
    pub fn resolve_refs(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
        let mut refs = Vec::new();
        for pattern in patterns {
            refs.extend(self.glob(pattern).map_err(SchemaError::from)?);
        }
        Ok(refs)
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}
