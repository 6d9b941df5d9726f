//! Init command implementation.
//!
//! Generates an `emotepack.yaml` config, pointing it at a template
//! directory if one is found.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::config::{PackConfig, CONFIG_FILENAME};
use crate::error::{PackError, Result};
use crate::output::{display_path, Printer};

/// Write an emotepack.yaml with default settings
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write the config into (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing emotepack.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(PackError::Config {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let mut config = PackConfig::default();
    if let Some(template) = find_template(&args.path) {
        printer.info("Discovered", &display_path(&args.path.join(&template)));
        config.template = template;
    }

    let yaml = serde_yaml::to_string(&config).map_err(|e| PackError::Config {
        message: format!("Failed to serialize config: {}", e),
        help: None,
    })?;

    fs::write(&config_path, yaml).map_err(|e| PackError::Io {
        path: config_path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;

    printer.status("Created", CONFIG_FILENAME);
    Ok(())
}

/// First directory (relative to `root`) holding a `.toc` file directly.
fn find_template(root: &Path) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(3)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "toc"))
        .filter_map(|e| e.path().parent()?.strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();

    dirs.sort();
    dirs.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_config() {
        let dir = tempdir().unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        run(args, &Printer::plain()).unwrap();

        let config = PackConfig::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.prefix, "TwitchEmotes");
        assert_eq!(config.template, dir.path().join("DiscordEmotes"));
    }

    #[test]
    fn test_init_discovers_template() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("addons/MyEmotes")).unwrap();
        fs::write(
            dir.path().join("addons/MyEmotes/MyEmotes.toc"),
            "## Title: DiscordEmotes",
        )
        .unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        run(args, &Printer::plain()).unwrap();

        let config_path = dir.path().join(CONFIG_FILENAME);
        let written = fs::read_to_string(&config_path).unwrap();
        assert!(written.contains("template: addons/MyEmotes"));

        // loading from elsewhere still finds the template
        let config = crate::cli::load_config(Some(&config_path)).unwrap();
        assert_eq!(config.template, dir.path().join("addons/MyEmotes"));
        assert!(config.template.join("MyEmotes.toc").is_file());
    }

    #[test]
    fn test_init_errors_if_config_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "prefix: Old").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        assert!(run(args, &Printer::plain()).is_err());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "prefix: Old").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: true,
        };
        run(args, &Printer::plain()).unwrap();

        let config = PackConfig::load(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.prefix, "TwitchEmotes");
    }
}
