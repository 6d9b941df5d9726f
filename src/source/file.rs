//! Guild metadata from a local JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{PackError, Result};
use crate::types::Guild;

use super::GuildSource;

/// Reads a guild from a JSON file in the Discord guild object shape.
///
/// The file describes exactly one guild; lookups for any other id fail.
#[derive(Debug, Clone)]
pub struct JsonGuildSource {
    path: PathBuf,
}

impl JsonGuildSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file without checking the id.
    pub async fn read(&self) -> Result<Guild> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PackError::Io {
                path: self.path.clone(),
                message: format!("Failed to read guild file: {}", e),
            })?;

        serde_json::from_str(&content).map_err(|e| PackError::Config {
            message: format!("Invalid guild file {}: {}", self.path.display(), e),
            help: Some("Expected a Discord guild object with id, name and emojis".to_string()),
        })
    }
}

#[async_trait]
impl GuildSource for JsonGuildSource {
    async fn guild(&self, guild_id: &str) -> Result<Guild> {
        let guild = self.read().await.map_err(|e| PackError::GuildLookupFailed {
            guild_id: guild_id.to_string(),
            message: e.to_string(),
        })?;

        if guild.id != guild_id {
            return Err(PackError::GuildLookupFailed {
                guild_id: guild_id.to_string(),
                message: format!("{} describes guild {}", self.path.display(), guild.id),
            });
        }

        Ok(guild)
    }
}
