//! Pack generation pipeline.
//!
//! One run turns a guild id into a finished zip:
//!
//! ```text
//! Idle -> FetchingGuild -> WalkingTemplates -> TranscodingImages -> Assembling -> Done
//!                   \______________________________________________________/
//!                                        any error -> Failed
//! ```
//!
//! Template rendering and image transcoding write disjoint parts of the
//! archive, so they run concurrently; both finish before assembly starts.
//! Runs share nothing mutable, so any number may execute at once against
//! the same `Pipeline`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::archive::{image_entry_path, ArchiveEntry, Assembler};
use crate::config::{NamePolicy, PackConfig};
use crate::error::{PackError, Result};
use crate::source::{GuildSource, ImageFetcher};
use crate::template::Template;
use crate::transcode::{transcode_all, OUTPUT_EXTENSION};
use crate::types::{path_segment, Guild, PackName};

/// Progress of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    FetchingGuild,
    WalkingTemplates,
    TranscodingImages,
    Assembling,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::FetchingGuild => "fetching-guild",
            Stage::WalkingTemplates => "walking-templates",
            Stage::TranscodingImages => "transcoding-images",
            Stage::Assembling => "assembling",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// A finished pack.
#[derive(Debug, Clone)]
pub struct PackOutput {
    pub pack: PackName,
    /// Name to deliver the archive under (`<pack>.zip`).
    pub file_name: String,
    /// Every archive path, in the order written.
    pub paths: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Options that shape every run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub prefix: String,
    pub image_size: u32,
    pub concurrency: usize,
    pub names: NamePolicy,
}

impl From<&PackConfig> for PipelineOptions {
    fn from(config: &PackConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            image_size: config.image_size,
            concurrency: config.effective_concurrency(),
            names: config.names,
        }
    }
}

/// Builds packs from a loaded template and an image fetcher.
#[derive(Clone)]
pub struct Pipeline {
    template: Arc<Template>,
    fetcher: Arc<dyn ImageFetcher>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        template: Arc<Template>,
        fetcher: Arc<dyn ImageFetcher>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            template,
            fetcher,
            options,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Look up `guild_id` and build its pack.
    pub async fn run(&self, source: &dyn GuildSource, guild_id: &str) -> Result<PackOutput> {
        let mut stage = Stage::Idle;
        self.run_observed(source, guild_id, &mut stage).await
    }

    /// Like [`Pipeline::run`], leaving the final stage in `stage`.
    pub async fn run_observed(
        &self,
        source: &dyn GuildSource,
        guild_id: &str,
        stage: &mut Stage,
    ) -> Result<PackOutput> {
        let result = async {
            enter(stage, Stage::FetchingGuild);
            let guild = source.guild(guild_id).await?;
            self.assemble(&guild, stage).await
        }
        .await;

        finish(stage, result)
    }

    /// Build the pack for an already-fetched guild.
    pub async fn build(&self, guild: &Guild) -> Result<PackOutput> {
        let mut stage = Stage::Idle;
        let result = self.assemble(guild, &mut stage).await;
        finish(&mut stage, result)
    }

    async fn assemble(&self, guild: &Guild, stage: &mut Stage) -> Result<PackOutput> {
        let pack = PackName::new(&self.options.prefix, &guild.name, self.options.names)?;
        info!(
            guild_id = %guild.id,
            pack = %pack,
            emotes = guild.emotes.len(),
            "building pack"
        );

        enter(stage, Stage::WalkingTemplates);
        let render = async {
            let entries = self.template.render(&pack, guild, self.options.names)?;
            enter(stage, Stage::TranscodingImages);
            Ok::<_, PackError>(entries)
        };
        let transcode = transcode_all(
            self.fetcher.clone(),
            &guild.emotes,
            self.options.image_size,
            self.options.concurrency,
        );
        let (assets, images) = tokio::try_join!(render, transcode)?;

        enter(stage, Stage::Assembling);
        let guild_segment = path_segment(&guild.id, self.options.names)?;
        let mut entries: Vec<ArchiveEntry> = assets;
        for image in images {
            let emote_segment = path_segment(&image.emote.name, self.options.names)?;
            let path = image_entry_path(
                pack.segment(),
                &guild_segment,
                &emote_segment,
                OUTPUT_EXTENSION,
            );
            entries.push(ArchiveEntry::new(path, image.bytes));
        }

        let mut assembler = Assembler::new();
        for entry in &entries {
            assembler.add_entry(entry)?;
        }
        let bytes = assembler.finalize()?;

        Ok(PackOutput {
            file_name: pack.archive_file_name(),
            pack,
            paths: entries.into_iter().map(|e| e.path).collect(),
            bytes,
        })
    }
}

fn enter(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "pipeline stage");
    *stage = next;
}

fn finish(stage: &mut Stage, result: Result<PackOutput>) -> Result<PackOutput> {
    match &result {
        Ok(output) => {
            enter(stage, Stage::Done);
            info!(
                file = %output.file_name,
                entries = output.paths.len(),
                bytes = output.bytes.len(),
                "pack built"
            );
        }
        Err(e) => {
            warn!(stage = %stage, step = e.step(), error = %e, "pack build failed");
            enter(stage, Stage::Failed);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{AssetRole, TemplateAsset};
    use crate::types::Emote;
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct SolidFetcher;

    #[async_trait]
    impl ImageFetcher for SolidFetcher {
        async fn fetch(&self, emote: &Emote) -> Result<Vec<u8>> {
            if emote.name == "gone" {
                return Err(PackError::ImageFetchFailed {
                    emote: emote.name.clone(),
                    id: emote.id.clone(),
                    message: "404 Not Found".to_string(),
                });
            }
            let img = image::RgbaImage::from_pixel(3, 5, image::Rgba([1, 2, 3, 255]));
            let mut out = std::io::Cursor::new(Vec::new());
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut out, image::ImageFormat::Png)
                .unwrap();
            Ok(out.into_inner())
        }
    }

    struct FixedSource(Guild);

    #[async_trait]
    impl GuildSource for FixedSource {
        async fn guild(&self, guild_id: &str) -> Result<Guild> {
            if guild_id == self.0.id {
                Ok(self.0.clone())
            } else {
                Err(PackError::GuildLookupFailed {
                    guild_id: guild_id.to_string(),
                    message: "unknown guild".to_string(),
                })
            }
        }
    }

    fn template() -> Arc<Template> {
        let assets = vec![
            TemplateAsset {
                relative_path: "DiscordEmotes/DiscordEmotes.lua".to_string(),
                bytes: b"n='discord_server_id'\n--Pack\n--Emoticons\n".to_vec(),
                role: AssetRole::Script,
            },
            TemplateAsset {
                relative_path: "DiscordEmotes/DiscordEmotes.toc".to_string(),
                bytes: b"## Title: DiscordEmotes\n".to_vec(),
                role: AssetRole::Manifest,
            },
        ];
        let template = Template::from_assets(
            PathBuf::from("DiscordEmotes"),
            "DiscordEmotes".to_string(),
            assets,
            crate::config::MarkerPolicy::Strict,
        )
        .unwrap();
        Arc::new(template)
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(
            template(),
            Arc::new(SolidFetcher),
            PipelineOptions::from(&PackConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_run_reaches_done() {
        let guild = Guild::new("42", "Acme", vec![Emote::new("7", "pog")]);
        let source = FixedSource(guild);
        let mut stage = Stage::Idle;

        let output = pipeline()
            .run_observed(&source, "42", &mut stage)
            .await
            .unwrap();

        assert_eq!(stage, Stage::Done);
        assert_eq!(output.file_name, "TwitchEmotes - Acme.zip");
        assert_eq!(
            output.paths,
            vec![
                "TwitchEmotes - Acme/TwitchEmotes - Acme.lua",
                "TwitchEmotes - Acme/TwitchEmotes - Acme.toc",
                "TwitchEmotes - Acme/42/pog.tga",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_guild_fails() {
        let source = FixedSource(Guild::new("42", "Acme", vec![]));
        let mut stage = Stage::Idle;

        let err = pipeline()
            .run_observed(&source, "99", &mut stage)
            .await
            .unwrap_err();

        assert_eq!(stage, Stage::Failed);
        assert!(matches!(err, PackError::GuildLookupFailed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_run() {
        let guild = Guild::new(
            "42",
            "Acme",
            vec![Emote::new("1", "pog"), Emote::new("2", "gone")],
        );

        let err = pipeline().build(&guild).await.unwrap_err();
        assert!(matches!(err, PackError::ImageFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_colliding_emote_names_fail() {
        // both names escape to "a_b"
        let guild = Guild::new(
            "42",
            "Acme",
            vec![Emote::new("1", "a/b"), Emote::new("2", "a\\b")],
        );

        let err = pipeline().build(&guild).await.unwrap_err();
        assert!(matches!(err, PackError::PathCollision { .. }));
    }

    #[tokio::test]
    async fn test_reject_policy_rejects_unsafe_guild_name() {
        let options = PipelineOptions {
            names: NamePolicy::Reject,
            ..PipelineOptions::from(&PackConfig::default())
        };
        let pipeline = Pipeline::new(template(), Arc::new(SolidFetcher), options);
        let guild = Guild::new("42", "AC/DC", vec![]);

        let err = pipeline.build(&guild).await.unwrap_err();
        assert!(matches!(err, PackError::InvalidName { .. }));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::default().to_string(), "idle");
        assert_eq!(Stage::TranscodingImages.to_string(), "transcoding-images");
    }
}
