//! Pack configuration (emotepack.yaml) parsing.
//!
//! The config file sets the naming, template and transcoding options for
//! a build. Every field has a default, so an empty file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

/// The name of the config file looked up next to the template.
pub const CONFIG_FILENAME: &str = "emotepack.yaml";

/// How to treat a missing sentinel, placeholder or title line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPolicy {
    /// Leave the asset untouched where the marker is missing.
    #[default]
    Lenient,
    /// Refuse to load a template with a missing marker.
    Strict,
}

/// How to treat names that are not safe as archive path segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamePolicy {
    /// Replace unsafe characters with `_`.
    #[default]
    Escape,
    /// Fail with `InvalidName`.
    Reject,
}

/// Pack configuration loaded from emotepack.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Prefix of the generated pack name (`<prefix> - <guild name>`).
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Template directory. Its directory name is the placeholder that gets
    /// remapped to the pack name.
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Side length in pixels of every transcoded emoji.
    #[serde(default = "default_image_size")]
    pub image_size: u32,

    /// Maximum number of emoji transcoded at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout for image downloads, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed image download.
    #[serde(default)]
    pub retries: u32,

    /// Base URL for emoji images; `<id>.png` is appended.
    #[serde(default = "default_cdn_base")]
    pub cdn_base: String,

    /// Base URL of the Discord REST API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub markers: MarkerPolicy,

    #[serde(default)]
    pub names: NamePolicy,
}

fn default_prefix() -> String {
    "TwitchEmotes".to_string()
}

fn default_template() -> PathBuf {
    PathBuf::from("DiscordEmotes")
}

fn default_image_size() -> u32 {
    32
}

fn default_concurrency() -> usize {
    8
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cdn_base() -> String {
    "https://cdn.discordapp.com/emojis/".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            template: default_template(),
            image_size: default_image_size(),
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            cdn_base: default_cdn_base(),
            api_base: default_api_base(),
            markers: MarkerPolicy::default(),
            names: NamePolicy::default(),
        }
    }
}

impl PackConfig {
    /// Load config from an emotepack.yaml file.
    ///
    /// A relative `template` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        let mut config = Self::parse(&content)?;
        if config.template.is_relative() {
            if let Some(dir) = path.parent() {
                config.template = dir.join(&config.template);
            }
        }
        Ok(config)
    }

    /// Parse config from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| PackError::Config {
            message: format!("Invalid config: {}", e),
            help: Some("Check emotepack.yaml syntax".to_string()),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(PackError::Config {
                message: "image_size must be at least 1".to_string(),
                help: None,
            });
        }
        if self.prefix.trim().is_empty() {
            return Err(PackError::Config {
                message: "prefix must not be empty".to_string(),
                help: None,
            });
        }
        Ok(())
    }

    /// Get the effective worker count (never zero).
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
