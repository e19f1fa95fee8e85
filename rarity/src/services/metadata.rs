//! Token metadata directory loader
//!
//! Reads a collection laid out as one JSON document per token, the way
//! collection metadata is usually exported.

use std::path::{Path, PathBuf};

use shared::{component_debug, logging, Component, TokenMetadata};

use crate::error::{RarityError, RarityResult};

pub struct MetadataDirectory {
    dir: PathBuf,
}

impl MetadataDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every `*.json` file in file-name order
    pub async fn load(&self) -> RarityResult<Vec<TokenMetadata>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| self.error(&self.dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.error(&self.dir, e))? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") && entry.file_type().await?.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut tokens = Vec::with_capacity(files.len());
        for path in &files {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| self.error(path, e))?;
            let token = TokenMetadata::from_json_str(&text).map_err(|e| self.error(path, e))?;
            component_debug!(Component::Metadata, "Loaded {} ({} attributes)", path.display(), token.attributes.len());
            tokens.push(token);
        }

        logging::log_progress(
            Component::Metadata,
            "Loaded metadata",
            &format!("{} tokens from {}", tokens.len(), self.dir.display()),
        );
        Ok(tokens)
    }

    fn error(&self, path: &Path, cause: impl std::fmt::Display) -> RarityError {
        RarityError::Metadata {
            path: path.display().to_string(),
            message: cause.to_string(),
        }
    }
}
