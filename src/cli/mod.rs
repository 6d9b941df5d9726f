pub mod build;
pub mod check;
pub mod init;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::config::{PackConfig, CONFIG_FILENAME};
use crate::error::Result;

/// emotepack - TwitchEmotes add-on packs from Discord guild emoji
#[derive(Parser, Debug)]
#[command(name = "emotepack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an add-on pack for a guild
    Build(build::BuildArgs),

    /// Validate a template tree
    Check(check::CheckArgs),

    /// Write an emotepack.yaml with default settings
    Init(init::InitArgs),
}

/// Load the given config file, or ./emotepack.yaml if present, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<PackConfig> {
    match path {
        Some(path) => PackConfig::load(path),
        None => {
            let default_path = Path::new(CONFIG_FILENAME);
            if default_path.exists() {
                PackConfig::load(default_path)
            } else {
                Ok(PackConfig::default())
            }
        }
    }
}
