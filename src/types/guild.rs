//! Guild and emote models.

use serde::{Deserialize, Serialize};

/// A named custom emoji belonging to a guild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emote {
    pub id: String,
    pub name: String,
}

impl Emote {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A guild and its emoji, in the order the platform lists them.
///
/// Deserializes from the Discord REST guild object, where the emoji list is
/// named `emojis`. Unicode emoji entries without an id are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        alias = "emojis",
        deserialize_with = "deserialize_emotes"
    )]
    pub emotes: Vec<Emote>,
}

impl Guild {
    pub fn new(id: impl Into<String>, name: impl Into<String>, emotes: Vec<Emote>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            emotes,
        }
    }
}

#[derive(Deserialize)]
struct RawEmote {
    id: Option<String>,
    name: Option<String>,
}

fn deserialize_emotes<'de, D>(deserializer: D) -> std::result::Result<Vec<Emote>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Vec<RawEmote> = Vec::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|e| match (e.id, e.name) {
            (Some(id), Some(name)) => Some(Emote { id, name }),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_discord_guild() {
        let json = r#"{
            "id": "42",
            "name": "Acme",
            "owner_id": "1",
            "emojis": [
                {"id": "7", "name": "pog", "animated": false, "roles": []},
                {"id": null, "name": "😀"},
                {"id": "8", "name": "kek", "animated": true}
            ]
        }"#;

        let guild: Guild = serde_json::from_str(json).unwrap();

        assert_eq!(guild.id, "42");
        assert_eq!(guild.name, "Acme");
        assert_eq!(
            guild.emotes,
            vec![Emote::new("7", "pog"), Emote::new("8", "kek")]
        );
    }

    #[test]
    fn test_deserialize_without_emotes() {
        let guild: Guild = serde_json::from_str(r#"{"id": "1", "name": "Empty"}"#).unwrap();
        assert!(guild.emotes.is_empty());
    }

    #[test]
    fn test_deserialize_local_file_shape() {
        let json = r#"{"id": "5", "name": "Local", "emotes": [{"id": "9", "name": "wave"}]}"#;
        let guild: Guild = serde_json::from_str(json).unwrap();
        assert_eq!(guild.emotes, vec![Emote::new("9", "wave")]);
    }
}
