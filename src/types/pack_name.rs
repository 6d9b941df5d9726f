//! Pack names and path-segment sanitizing.

use std::fmt;

use crate::config::NamePolicy;
use crate::error::{PackError, Result};

/// The generated name of one add-on pack.
///
/// Holds the display title (used in the `.toc` title and the archive file
/// name) and the path segment (used for directories inside the archive).
/// The two differ only when the guild name contains unsafe characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackName {
    display: String,
    segment: String,
}

impl PackName {
    /// Build `<prefix> - <guild_name>` and derive its path segment.
    pub fn new(prefix: &str, guild_name: &str, policy: NamePolicy) -> Result<Self> {
        let display = format!("{} - {}", prefix, guild_name);
        let segment = path_segment(&display, policy)?;
        Ok(Self { display, segment })
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// File name for the delivered archive.
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.segment)
    }
}

impl fmt::Display for PackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

fn is_unsafe(c: char) -> bool {
    matches!(c, '/' | '\\' | ':') || c.is_control()
}

/// Turn a name into a single archive path segment according to `policy`.
///
/// Separators, `:` and control characters are unsafe, as are segments that
/// are empty or consist only of dots after trimming.
pub fn path_segment(name: &str, policy: NamePolicy) -> Result<String> {
    let trimmed = name.trim();
    let dots_only = trimmed.chars().all(|c| c == '.');
    let has_unsafe = trimmed.chars().any(is_unsafe);

    if !dots_only && !has_unsafe && trimmed == name {
        return Ok(name.to_string());
    }

    match policy {
        NamePolicy::Reject => Err(PackError::InvalidName {
            name: name.to_string(),
        }),
        NamePolicy::Escape => {
            if dots_only {
                return Ok("_".to_string());
            }
            Ok(trimmed
                .chars()
                .map(|c| if is_unsafe(c) { '_' } else { c })
                .collect())
        }
    }
}
