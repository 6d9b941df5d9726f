//! emotepack - TwitchEmotes add-on packs from Discord guild emoji
//!
//! A library for turning a guild's custom emoji into an installable
//! World of Warcraft add-on: a template tree is rendered for the guild,
//! every emoji is transcoded to TGA, and the result is zipped in memory.

pub mod archive;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod handler;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod template;
pub mod transcode;
pub mod types;

pub use archive::{image_entry_path, ArchiveEntry, Assembler};
pub use config::{MarkerPolicy, NamePolicy, PackConfig};
pub use delivery::{Delivery, DirectoryDelivery};
pub use error::{PackError, Result};
pub use handler::{handle_request, RequestOutcome};
pub use pipeline::{PackOutput, Pipeline, PipelineOptions, Stage};
pub use source::{CdnFetcher, DiscordGuildSource, GuildSource, ImageFetcher, JsonGuildSource};
pub use template::{AssetRole, Template, TemplateAsset};
pub use transcode::{transcode_all, transcode_image, TranscodedImage};
pub use types::{Emote, Guild, PackName};
