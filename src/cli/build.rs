//! Build command implementation.
//!
//! Fetches a guild's emoji and writes the generated add-on pack as a zip
//! into the output directory.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::config::{MarkerPolicy, PackConfig};
use crate::delivery::DirectoryDelivery;
use crate::error::{PackError, Result};
use crate::handler::{handle_request, RequestOutcome};
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::source::{CdnFetcher, DiscordGuildSource, GuildSource, JsonGuildSource};
use crate::template::Template;

/// Build an add-on pack for a guild
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Guild id to look up through the Discord API
    #[arg(long, required_unless_present = "guild_file")]
    pub guild: Option<String>,

    /// Read the guild from a JSON file instead of the Discord API
    #[arg(long, conflicts_with = "guild")]
    pub guild_file: Option<PathBuf>,

    /// Bot token for the Discord API
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Template directory (default: from emotepack.yaml)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Output directory
    #[arg(long, short, default_value = "dist")]
    pub output: PathBuf,

    /// Config file (default: ./emotepack.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail on templates with missing markers
    #[arg(long)]
    pub strict: bool,

    /// Maximum concurrent emoji downloads
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Download timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Extra download attempts per emoji
    #[arg(long)]
    pub retries: Option<u32>,
}

impl BuildArgs {
    /// Apply command-line overrides on top of the file config.
    fn apply(&self, config: &mut PackConfig) {
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if self.strict {
            config.markers = MarkerPolicy::Strict;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
    }
}

pub async fn run(args: BuildArgs, printer: &Printer) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    args.apply(&mut config);

    let template = Template::load(&config.template, config.markers)?;
    printer.info(
        "Template",
        &format!(
            "{} ({})",
            display_path(template.root()),
            plural(template.assets().len(), "asset", "assets")
        ),
    );

    let fetcher = CdnFetcher::new(&config.cdn_base, config.timeout(), config.retries)?;
    let pipeline = Pipeline::new(
        Arc::new(template),
        Arc::new(fetcher),
        PipelineOptions::from(&config),
    );

    let given = (&args.guild_file, &args.guild);
    let (source, guild_id): (Box<dyn GuildSource>, String) = match given {
        (Some(path), _) => {
            let source = JsonGuildSource::new(path);
            let guild_id = source.read().await?.id;
            (Box::new(source) as Box<dyn GuildSource>, guild_id)
        }
        (None, Some(guild_id)) => {
            let token = args.token.clone().ok_or_else(|| PackError::Config {
                message: "no bot token".to_string(),
                help: Some("Set DISCORD_TOKEN or pass --token".to_string()),
            })?;
            let source = DiscordGuildSource::new(&config.api_base, token, config.timeout())?;
            (Box::new(source) as Box<dyn GuildSource>, guild_id.clone())
        }
        (None, None) => {
            return Err(PackError::Config {
                message: "no guild given".to_string(),
                help: Some("Pass --guild <id> or --guild-file <path>".to_string()),
            })
        }
    };

    printer.status("Generating", &format!("pack for guild {}", guild_id));
    let delivery = DirectoryDelivery::new(&args.output).with_printer(*printer);

    match handle_request(&pipeline, source.as_ref(), &delivery, &guild_id).await {
        RequestOutcome::Delivered { file_name, .. } => {
            printer.status("Finished", &display_path(&args.output.join(file_name)));
            Ok(())
        }
        RequestOutcome::Failed { error, .. } => Err(error),
    }
}
