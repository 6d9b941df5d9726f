//! Discord REST API and CDN clients.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{PackError, Result};
use crate::types::{Emote, Guild};

use super::{GuildSource, ImageFetcher};

/// First delay between download attempts; doubles after each failure.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

fn build_client(timeout: Duration) -> std::result::Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("emotepack/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Fetches guilds from the Discord REST API with a bot token.
#[derive(Debug, Clone)]
pub struct DiscordGuildSource {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl DiscordGuildSource {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = build_client(timeout).map_err(|e| PackError::Config {
            message: format!("HTTP client build failed: {e}"),
            help: None,
        })?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl GuildSource for DiscordGuildSource {
    async fn guild(&self, guild_id: &str) -> Result<Guild> {
        let lookup_err = |message: String| PackError::GuildLookupFailed {
            guild_id: guild_id.to_string(),
            message,
        };

        let url = format!("{}/guilds/{}", self.api_base, guild_id);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| lookup_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| lookup_err(e.to_string()))?;

        let guild: Guild = response
            .json()
            .await
            .map_err(|e| lookup_err(format!("invalid guild payload: {e}")))?;

        debug!(guild_id, emotes = guild.emotes.len(), "guild retrieved");
        Ok(guild)
    }
}

/// Downloads emoji PNGs from the Discord CDN.
#[derive(Debug, Clone)]
pub struct CdnFetcher {
    http: reqwest::Client,
    base: String,
    retries: u32,
}

impl CdnFetcher {
    /// `base` is joined with `<id>.png`; `retries` extra attempts are made
    /// after a failure, with exponential backoff.
    pub fn new(base: impl Into<String>, timeout: Duration, retries: u32) -> Result<Self> {
        let http = build_client(timeout).map_err(|e| PackError::Config {
            message: format!("HTTP client build failed: {e}"),
            help: None,
        })?;

        let mut base = base.into();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http,
            base,
            retries,
        })
    }

    pub fn url_for(&self, emote: &Emote) -> String {
        format!("{}{}.png", self.base, emote.id)
    }

    async fn fetch_once(&self, url: &str) -> std::result::Result<Vec<u8>, reqwest::Error> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for CdnFetcher {
    async fn fetch(&self, emote: &Emote) -> Result<Vec<u8>> {
        let url = self.url_for(emote);
        let mut delay = RETRY_BASE_DELAY;
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(emote = %emote.name, attempt, error = %e, "download failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    return Err(PackError::ImageFetchFailed {
                        emote: emote.name.clone(),
                        id: emote.id.clone(),
                        message: e.to_string(),
                    })
                }
            }
        }
    }
}
