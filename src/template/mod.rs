//! The add-on template tree and its per-guild rendering.
//!
//! A template is loaded once from disk and can then be rendered for any
//! number of guilds. Rendering patches the `.toc` title, registers every
//! emoji in the Lua script and remaps each path from the template root's
//! name to the pack name.
//!
//! # Example
//!
//! ```ignore
//! use emotepack::template::Template;
//!
//! let template = Template::load("./DiscordEmotes", MarkerPolicy::Strict)?;
//! let entries = template.render(&pack, &guild, NamePolicy::Escape)?;
//! ```

mod loader;
mod remap;
mod script;
mod toc;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::archive::ArchiveEntry;
use crate::config::{MarkerPolicy, NamePolicy};
use crate::error::{PackError, Result};
use crate::types::{Guild, PackName};

pub use loader::{assign_roles, root_name, scan_template, AssetRole, TemplateAsset};
pub use remap::{remap_all, remap_path};
pub use script::{ScriptTemplate, ALIAS_MARKER, ID_PLACEHOLDER, PACK_MARKER};
pub use toc::{TocTemplate, TITLE_LINE};

/// A loaded, validated template tree.
#[derive(Debug, Clone)]
pub struct Template {
    root: PathBuf,
    placeholder: String,
    assets: Vec<TemplateAsset>,
    script: Option<ScriptTemplate>,
    toc: Option<TocTemplate>,
}

impl Template {
    /// Read the template tree at `root`.
    ///
    /// With `MarkerPolicy::Strict` the tree must contain a script and a
    /// manifest with all of their markers.
    pub fn load(root: impl AsRef<Path>, policy: MarkerPolicy) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let placeholder = root_name(&root)?;
        let assets = scan_template(&root, &placeholder)?;

        let template = Self::from_assets(root, placeholder, assets, policy)?;
        debug!(
            root = %template.root.display(),
            assets = template.assets.len(),
            "template loaded"
        );
        Ok(template)
    }

    /// Build a template from assets that are already in memory.
    pub fn from_assets(
        root: PathBuf,
        placeholder: String,
        assets: Vec<TemplateAsset>,
        policy: MarkerPolicy,
    ) -> Result<Self> {
        let mut script = None;
        let mut toc = None;

        for asset in &assets {
            let taken = match asset.role {
                AssetRole::Script => script.is_some(),
                AssetRole::Manifest => toc.is_some(),
                AssetRole::Plain => false,
            };
            if taken {
                return Err(PackError::TemplateMalformed {
                    path: asset.relative_path.clone(),
                    message: format!("a second {:?} asset", asset.role),
                    help: Some("A template holds one script and one manifest".to_string()),
                });
            }

            match asset.role {
                AssetRole::Script => {
                    script = Some(ScriptTemplate::parse(
                        &asset.relative_path,
                        &asset.bytes,
                        policy,
                    )?)
                }
                AssetRole::Manifest => {
                    toc = Some(TocTemplate::parse(
                        &asset.relative_path,
                        &asset.bytes,
                        policy,
                    )?)
                }
                AssetRole::Plain => {}
            }
        }

        if policy == MarkerPolicy::Strict {
            let missing = match (&script, &toc) {
                (None, _) => Some("a Lua script"),
                (_, None) => Some("a .toc manifest"),
                _ => None,
            };
            if let Some(what) = missing {
                return Err(PackError::TemplateMalformed {
                    path: root.display().to_string(),
                    message: format!("template has no {}", what),
                    help: Some(format!(
                        "Name it {}.lua / {}.toc, or keep only one such file",
                        placeholder, placeholder
                    )),
                });
            }
        }

        Ok(Self {
            root,
            placeholder,
            assets,
            script,
            toc,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory name that is replaced by the pack name in paths.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn assets(&self) -> &[TemplateAsset] {
        &self.assets
    }

    /// Render every asset for `guild`, returning archive entries in
    /// template path order.
    pub fn render(
        &self,
        pack: &PackName,
        guild: &Guild,
        names: NamePolicy,
    ) -> Result<Vec<ArchiveEntry>> {
        let paths = remap_all(
            self.assets.iter().map(|a| a.relative_path.as_str()),
            &self.placeholder,
            pack.segment(),
        )?;

        let mut entries = Vec::with_capacity(self.assets.len());
        for (asset, path) in self.assets.iter().zip(paths) {
            let bytes = match (asset.role, &self.script, &self.toc) {
                (AssetRole::Script, Some(script), _) => script.render(pack, guild, names)?,
                (AssetRole::Manifest, _, Some(toc)) => toc.render(pack),
                _ => asset.bytes.clone(),
            };
            entries.push(ArchiveEntry::new(path, bytes));
        }

        Ok(entries)
    }
}
