//! File system scanner for the template tree.
//!
//! Recursively reads every file under the template root and assigns each
//! one a role. Paths are stored relative to the root's parent, with forward
//! slashes, so they start with the root directory's name.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PackError, Result};

/// What a template file is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    /// Copied verbatim.
    Plain,
    /// The Lua script that receives emoji registrations.
    Script,
    /// The `.toc` descriptor whose title is patched.
    Manifest,
}

/// One file read from the template tree.
#[derive(Debug, Clone)]
pub struct TemplateAsset {
    pub relative_path: String,
    pub bytes: Vec<u8>,
    pub role: AssetRole,
}

/// Name of the template root directory, used as the remapping placeholder.
pub fn root_name(root: &Path) -> Result<String> {
    let resolved;
    let named = match root.file_name() {
        Some(_) => root,
        None => {
            resolved = root.canonicalize().map_err(|e| PackError::TemplateReadFailed {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;
            &resolved
        }
    };

    named
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| PackError::TemplateReadFailed {
            path: root.to_path_buf(),
            message: "template root has no usable directory name".to_string(),
        })
}

/// Read every file under `root`, sorted by path.
pub fn scan_template(root: &Path, root_name: &str) -> Result<Vec<TemplateAsset>> {
    if !root.is_dir() {
        return Err(PackError::TemplateReadFailed {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut assets = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| PackError::TemplateReadFailed {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;

        // Skip directories
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let bytes = std::fs::read(path).map_err(|e| PackError::TemplateReadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        assets.push(TemplateAsset {
            relative_path: relative_path(root, root_name, path)?,
            bytes,
            role: AssetRole::Plain,
        });
    }

    assign_roles(&mut assets, root_name);
    Ok(assets)
}

fn relative_path(root: &Path, root_name: &str, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| PackError::TemplateReadFailed {
        path: path.to_path_buf(),
        message: "file is outside the template root".to_string(),
    })?;

    let mut parts = vec![root_name.to_string()];
    for component in rel.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| PackError::TemplateReadFailed {
                path: PathBuf::from(path),
                message: "file name is not valid UTF-8".to_string(),
            })?;
        parts.push(part.to_string());
    }

    Ok(parts.join("/"))
}

/// Pick the script and manifest among the scanned files.
///
/// A file named after the root (`<root>.lua`, `<root>.toc`) wins. Failing
/// that, a lone `.lua` or `.toc` file in the tree takes the role.
pub fn assign_roles(assets: &mut [TemplateAsset], root_name: &str) {
    if let Some(i) = pick(assets, root_name, "lua") {
        assets[i].role = AssetRole::Script;
    }
    if let Some(i) = pick(assets, root_name, "toc") {
        assets[i].role = AssetRole::Manifest;
    }
}

fn pick(assets: &[TemplateAsset], root_name: &str, ext: &str) -> Option<usize> {
    let named = format!("{}.{}", root_name, ext);
    let suffix = format!(".{}", ext);

    if let Some(i) = assets
        .iter()
        .position(|a| file_name(&a.relative_path) == named)
    {
        return Some(i);
    }

    let mut candidates = assets
        .iter()
        .enumerate()
        .filter(|(_, a)| file_name(&a.relative_path).ends_with(&suffix));
    match (candidates.next(), candidates.next()) {
        (Some((i, _)), None) => Some(i),
        _ => None,
    }
}

fn file_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn asset(path: &str) -> TemplateAsset {
        TemplateAsset {
            relative_path: path.to_string(),
            bytes: vec![],
            role: AssetRole::Plain,
        }
    }

    #[test]
    fn test_scan_recursive_sorted() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("DiscordEmotes");
        fs::create_dir_all(root.join("libs/inner")).unwrap();
        fs::write(root.join("DiscordEmotes.toc"), "## Title: DiscordEmotes").unwrap();
        fs::write(root.join("DiscordEmotes.lua"), "--Pack").unwrap();
        fs::write(root.join("libs/inner/util.lua"), "return 1").unwrap();

        let assets = scan_template(&root, "DiscordEmotes").unwrap();
        let paths: Vec<&str> = assets.iter().map(|a| a.relative_path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "DiscordEmotes/DiscordEmotes.lua",
                "DiscordEmotes/DiscordEmotes.toc",
                "DiscordEmotes/libs/inner/util.lua",
            ]
        );
        assert_eq!(assets[0].role, AssetRole::Script);
        assert_eq!(assets[1].role, AssetRole::Manifest);
        assert_eq!(assets[2].role, AssetRole::Plain);
        assert_eq!(assets[0].bytes, b"--Pack");
    }

    #[test]
    fn test_scan_missing_root() {
        let err = scan_template(Path::new("/nonexistent/DiscordEmotes"), "DiscordEmotes")
            .unwrap_err();
        assert!(matches!(err, PackError::TemplateReadFailed { .. }));
    }

    #[test]
    fn test_root_name() {
        assert_eq!(
            root_name(Path::new("assets/DiscordEmotes")).unwrap(),
            "DiscordEmotes"
        );

        let dir = tempdir().unwrap();
        let expected = dir
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert_eq!(root_name(&dir.path().join(".")).unwrap(), expected);
    }

    #[test]
    fn test_assign_roles_lone_files() {
        let mut assets = vec![
            asset("DiscordEmotes/core.lua"),
            asset("DiscordEmotes/manifest.toc"),
            asset("DiscordEmotes/readme.txt"),
        ];

        assign_roles(&mut assets, "DiscordEmotes");

        assert_eq!(assets[0].role, AssetRole::Script);
        assert_eq!(assets[1].role, AssetRole::Manifest);
        assert_eq!(assets[2].role, AssetRole::Plain);
    }

    #[test]
    fn test_assign_roles_prefers_root_named() {
        let mut assets = vec![
            asset("DiscordEmotes/aaa.lua"),
            asset("DiscordEmotes/DiscordEmotes.lua"),
        ];

        assign_roles(&mut assets, "DiscordEmotes");

        assert_eq!(assets[0].role, AssetRole::Plain);
        assert_eq!(assets[1].role, AssetRole::Script);
    }

    #[test]
    fn test_assign_roles_ambiguous() {
        let mut assets = vec![asset("T/a.lua"), asset("T/b.lua")];

        assign_roles(&mut assets, "DiscordEmotes");

        assert!(assets.iter().all(|a| a.role == AssetRole::Plain));
    }
}
