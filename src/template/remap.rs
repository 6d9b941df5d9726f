//! Template path remapping.
//!
//! Template paths are rooted at the template directory's name, which doubles
//! as the placeholder for the pack name (`DiscordEmotes/DiscordEmotes.toc`
//! becomes `TwitchEmotes - Acme/TwitchEmotes - Acme.toc`).

use std::collections::HashSet;

use crate::error::{PackError, Result};

/// Replace every occurrence of `placeholder` in `path` with `pack_segment`.
pub fn remap_path(path: &str, placeholder: &str, pack_segment: &str) -> String {
    if placeholder.is_empty() {
        return path.to_string();
    }
    path.replace(placeholder, pack_segment)
}

/// Remap a set of paths, failing if two inputs land on the same output.
pub fn remap_all<'a, I>(paths: I, placeholder: &str, pack_segment: &str) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut remapped = Vec::new();

    for path in paths {
        let out = remap_path(path, placeholder, pack_segment);
        if !seen.insert(out.clone()) {
            return Err(PackError::PathCollision { path: out });
        }
        remapped.push(out);
    }

    Ok(remapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_remap_preserves_structure() {
        assert_eq!(
            remap_path(
                "DiscordEmotes/textures/DiscordEmotes.tga",
                "DiscordEmotes",
                "TwitchEmotes - Acme"
            ),
            "TwitchEmotes - Acme/textures/TwitchEmotes - Acme.tga"
        );
        assert_eq!(
            remap_path("DiscordEmotes/core.lua", "DiscordEmotes", "P"),
            "P/core.lua"
        );
    }

    #[test]
    fn test_remap_without_placeholder() {
        assert_eq!(remap_path("other/file.txt", "DiscordEmotes", "P"), "other/file.txt");
        assert_eq!(remap_path("a/b", "", "P"), "a/b");
    }

    #[test]
    fn test_remap_all_distinct() {
        let paths = ["DiscordEmotes/a.lua", "DiscordEmotes/b.lua"];
        let out = remap_all(paths, "DiscordEmotes", "P").unwrap();
        assert_eq!(out, vec!["P/a.lua", "P/b.lua"]);
    }

    #[test]
    fn test_remap_all_collision() {
        // a file already named after the pack collides with the remapped placeholder
        let paths = ["DiscordEmotes/DiscordEmotes.lua", "DiscordEmotes/P.lua"];
        let err = remap_all(paths, "DiscordEmotes", "P").unwrap_err();

        match err {
            PackError::PathCollision { path } => assert_eq!(path, "P/P.lua"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
