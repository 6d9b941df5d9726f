//! Title patching for the add-on's `.toc` descriptor.

use tracing::warn;

use crate::config::MarkerPolicy;
use crate::error::{PackError, Result};
use crate::types::PackName;

/// Title line as it appears in the unmodified template.
pub const TITLE_LINE: &str = "## Title: DiscordEmotes";

const TITLE_PREFIX: &str = "## Title: ";

/// A validated `.toc` template.
#[derive(Debug, Clone)]
pub struct TocTemplate {
    path: String,
    bytes: Vec<u8>,
    title_at: Option<usize>,
}

impl TocTemplate {
    pub fn parse(path: &str, bytes: &[u8], policy: MarkerPolicy) -> Result<Self> {
        let title_at = find(bytes, TITLE_LINE.as_bytes());

        if title_at.is_none() && policy == MarkerPolicy::Strict {
            return Err(PackError::TemplateMalformed {
                path: path.to_string(),
                message: format!("missing title line '{}'", TITLE_LINE),
                help: None,
            });
        }

        Ok(Self {
            path: path.to_string(),
            bytes: bytes.to_vec(),
            title_at,
        })
    }

    pub fn has_title(&self) -> bool {
        self.title_at.is_some()
    }

    /// Replace the title value with the pack title; other bytes pass through.
    pub fn render(&self, pack: &PackName) -> Vec<u8> {
        let Some(at) = self.title_at else {
            warn!(path = %self.path, "title line missing, manifest copied unchanged");
            return self.bytes.clone();
        };

        let replacement = format!("{}{}", TITLE_PREFIX, pack.display());
        let mut out = Vec::with_capacity(self.bytes.len() + replacement.len());
        out.extend_from_slice(&self.bytes[..at]);
        out.extend_from_slice(replacement.as_bytes());
        out.extend_from_slice(&self.bytes[at + TITLE_LINE.len()..]);
        out
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamePolicy;
    use pretty_assertions::assert_eq;

    fn pack() -> PackName {
        PackName::new("TwitchEmotes", "Acme", NamePolicy::Escape).unwrap()
    }

    #[test]
    fn test_render_patches_title() {
        let source = b"## Interface: 80000\n## Title: DiscordEmotes\n## Author: someone\n";
        let toc = TocTemplate::parse("a.toc", source, MarkerPolicy::Strict).unwrap();

        let out = String::from_utf8(toc.render(&pack())).unwrap();

        assert_eq!(
            out,
            "## Interface: 80000\n## Title: TwitchEmotes - Acme\n## Author: someone\n"
        );
    }

    #[test]
    fn test_render_only_first_title() {
        let source = b"## Title: DiscordEmotes\n## Title: DiscordEmotes\n";
        let toc = TocTemplate::parse("a.toc", source, MarkerPolicy::Lenient).unwrap();

        let out = String::from_utf8(toc.render(&pack())).unwrap();

        assert_eq!(out, "## Title: TwitchEmotes - Acme\n## Title: DiscordEmotes\n");
    }

    #[test]
    fn test_missing_title_lenient_passes_through() {
        let source = b"## Title: Something Else\n";
        let toc = TocTemplate::parse("a.toc", source, MarkerPolicy::Lenient).unwrap();

        assert!(!toc.has_title());
        assert_eq!(toc.render(&pack()), source.to_vec());
    }

    #[test]
    fn test_missing_title_strict_fails() {
        let err = TocTemplate::parse("a.toc", b"", MarkerPolicy::Strict).unwrap_err();
        assert!(matches!(err, PackError::TemplateMalformed { .. }));
    }

    #[test]
    fn test_non_utf8_bytes_preserved() {
        let mut source = vec![0xff, b'\n'];
        source.extend_from_slice(TITLE_LINE.as_bytes());
        let toc = TocTemplate::parse("a.toc", &source, MarkerPolicy::Strict).unwrap();

        let out = toc.render(&pack());

        assert_eq!(out[0], 0xff);
        assert!(out.ends_with(b"## Title: TwitchEmotes - Acme"));
    }
}
