//! Outside collaborators the pipeline pulls data from.
//!
//! The pipeline never talks to Discord directly. It is handed a
//! `GuildSource` for metadata and an `ImageFetcher` for emoji images, so a
//! run can be driven by the live API, a local JSON file, or test fakes.

mod discord;
mod file;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Emote, Guild};

pub use discord::{CdnFetcher, DiscordGuildSource};
pub use file::JsonGuildSource;

/// Looks up a guild and its emoji.
#[async_trait]
pub trait GuildSource: Send + Sync {
    /// Fails with `GuildLookupFailed`.
    async fn guild(&self, guild_id: &str) -> Result<Guild>;
}

/// Downloads the source image of one emoji.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fails with `ImageFetchFailed`.
    async fn fetch(&self, emote: &Emote) -> Result<Vec<u8>>;
}
