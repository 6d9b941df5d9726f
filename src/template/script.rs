//! Emoji registration for the add-on's Lua script.
//!
//! The script carries two sentinel comments. Every emote gets a pack
//! registration line inserted before `--Pack` and an alias line inserted
//! before `--Emoticons`. The sentinels stay in place so the script can be
//! rendered again, and the first `discord_server_id` is replaced with the
//! pack title.

use tracing::warn;

use crate::config::{MarkerPolicy, NamePolicy};
use crate::error::{PackError, Result};
use crate::types::{path_segment, Guild, PackName};

/// Sentinel that registration lines are inserted before.
pub const PACK_MARKER: &str = "--Pack";

/// Sentinel that alias lines are inserted before.
pub const ALIAS_MARKER: &str = "--Emoticons";

/// Placeholder replaced by the pack title.
pub const ID_PLACEHOLDER: &str = "discord_server_id";

/// Size suffix the client uses when drawing an emoji inline.
const INLINE_SIZE: &str = ":28:28";

/// A validated script template.
#[derive(Debug, Clone)]
pub struct ScriptTemplate {
    path: String,
    source: String,
    has_pack_marker: bool,
    has_alias_marker: bool,
    has_placeholder: bool,
}

impl ScriptTemplate {
    /// Validate script bytes.
    ///
    /// With `MarkerPolicy::Strict` every marker must be present; otherwise
    /// missing markers are recorded and skipped at render time.
    pub fn parse(path: &str, bytes: &[u8], policy: MarkerPolicy) -> Result<Self> {
        let source = std::str::from_utf8(bytes)
            .map_err(|e| PackError::TemplateMalformed {
                path: path.to_string(),
                message: format!("script is not UTF-8: {}", e),
                help: None,
            })?
            .to_string();

        let script = Self {
            path: path.to_string(),
            has_pack_marker: source.contains(PACK_MARKER),
            has_alias_marker: source.contains(ALIAS_MARKER),
            has_placeholder: source.contains(ID_PLACEHOLDER),
            source,
        };

        if policy == MarkerPolicy::Strict {
            if let Some(missing) = script.missing_markers().first() {
                return Err(PackError::TemplateMalformed {
                    path: script.path.clone(),
                    message: format!("missing marker '{}'", missing),
                    help: Some(format!(
                        "The script must contain '{}', '{}' and '{}'",
                        ID_PLACEHOLDER, PACK_MARKER, ALIAS_MARKER
                    )),
                });
            }
        }

        Ok(script)
    }

    /// Markers that are absent from the script.
    pub fn missing_markers(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_placeholder {
            missing.push(ID_PLACEHOLDER);
        }
        if !self.has_pack_marker {
            missing.push(PACK_MARKER);
        }
        if !self.has_alias_marker {
            missing.push(ALIAS_MARKER);
        }
        missing
    }

    /// Render the script for one guild.
    pub fn render(&self, pack: &PackName, guild: &Guild, names: NamePolicy) -> Result<Vec<u8>> {
        for marker in self.missing_markers() {
            warn!(path = %self.path, marker, "marker missing, substitution skipped");
        }

        let guild_segment = path_segment(&guild.id, names)?;
        let mut pack_lines = String::new();
        let mut alias_lines = String::new();

        for emote in &guild.emotes {
            let key = lua_escape(&format!("discord.{}.{}", guild.id, emote.name));
            let file = path_segment(&emote.name, names)?;
            // Lua string: Interface\AddOns\<pack>\<guild>\<name>.tga:28:28
            pack_lines.push_str(&format!(
                "['{}']='Interface\\\\AddOns\\\\{}\\\\{}\\\\{}.tga{}',\n",
                key,
                lua_escape(pack.segment()),
                lua_escape(&guild_segment),
                lua_escape(&file),
                INLINE_SIZE
            ));
            alias_lines.push_str(&format!(
                "['{}']='{}',\n",
                lua_escape(&format!(":{}:", emote.name)),
                key
            ));
        }

        // Edits are located in the original source so generated text is
        // never searched for markers.
        let title = lua_escape(pack.display());
        let mut edits: Vec<(usize, usize, &str)> = Vec::with_capacity(3);
        if let Some(at) = self.source.find(ID_PLACEHOLDER) {
            edits.push((at, ID_PLACEHOLDER.len(), title.as_str()));
        }
        if let Some(at) = self.source.find(PACK_MARKER) {
            edits.push((at, 0, pack_lines.as_str()));
        }
        if let Some(at) = self.source.find(ALIAS_MARKER) {
            edits.push((at, 0, alias_lines.as_str()));
        }
        edits.sort_by_key(|&(at, _, _)| at);

        let mut out =
            String::with_capacity(self.source.len() + pack_lines.len() + alias_lines.len());
        let mut cursor = 0;
        for (at, len, text) in edits {
            out.push_str(&self.source[cursor..at]);
            out.push_str(text);
            cursor = at + len;
        }
        out.push_str(&self.source[cursor..]);

        Ok(out.into_bytes())
    }
}

/// Escape a value for a single-quoted Lua string.
fn lua_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
