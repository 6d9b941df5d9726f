//! Check command implementation.
//!
//! Loads a template tree with strict markers and lists what was found.

use std::path::PathBuf;

use clap::Args;

use crate::config::MarkerPolicy;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::template::{AssetRole, Template};

/// Validate a template tree without building a pack
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Template directory (default: from emotepack.yaml)
    pub template: Option<PathBuf>,

    /// Config file (default: ./emotepack.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: CheckArgs, printer: &Printer) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let root = args.template.unwrap_or(config.template);

    printer.status("Checking", &display_path(&root));
    let template = Template::load(&root, MarkerPolicy::Strict)?;

    for asset in template.assets() {
        let role = match asset.role {
            AssetRole::Script => "script",
            AssetRole::Manifest => "manifest",
            AssetRole::Plain => "plain",
        };
        printer.info(
            role,
            &format!(
                "{} {}",
                asset.relative_path,
                printer.dim(&format!("({} bytes)", asset.bytes.len()))
            ),
        );
    }

    printer.status(
        "Finished",
        &format!(
            "{} ok ({}, placeholder '{}')",
            display_path(template.root()),
            plural(template.assets().len(), "asset", "assets"),
            template.placeholder()
        ),
    );
    Ok(())
}
