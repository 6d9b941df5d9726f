use miette::Diagnostic;
use thiserror::Error;

/// Main error type for pack generation
#[derive(Error, Diagnostic, Debug)]
pub enum PackError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(emotepack::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(emotepack::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unable to retrieve guild {guild_id}: {message}")]
    #[diagnostic(code(emotepack::guild))]
    GuildLookupFailed { guild_id: String, message: String },

    #[error("Unable to read template {path}: {message}")]
    #[diagnostic(code(emotepack::template::read))]
    TemplateReadFailed {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Malformed template {path}: {message}")]
    #[diagnostic(code(emotepack::template::malformed))]
    TemplateMalformed {
        path: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Archive path '{path}' is produced more than once")]
    #[diagnostic(
        code(emotepack::path_collision),
        help("Two template files or emoji map to the same archive entry")
    )]
    PathCollision { path: String },

    #[error("Name '{name}' is not a valid archive path segment")]
    #[diagnostic(
        code(emotepack::invalid_name),
        help("Use `names: escape` to replace unsafe characters instead of rejecting them")
    )]
    InvalidName { name: String },

    #[error("Unable to download emoji {emote} ({id}): {message}")]
    #[diagnostic(code(emotepack::image::fetch))]
    ImageFetchFailed {
        emote: String,
        id: String,
        message: String,
    },

    #[error("Unable to decode emoji {emote} as png: {message}")]
    #[diagnostic(code(emotepack::image::decode))]
    ImageDecodeFailed { emote: String, message: String },

    #[error("Unable to encode emoji {emote}: {message}")]
    #[diagnostic(code(emotepack::image::encode))]
    ImageEncodeFailed { emote: String, message: String },

    #[error("Unable to write '{path}' to archive: {message}")]
    #[diagnostic(code(emotepack::archive::write))]
    ArchiveWriteFailed { path: String, message: String },

    #[error("Unable to finalize archive: {message}")]
    #[diagnostic(code(emotepack::archive::finalize))]
    ArchiveFinalizeFailed { message: String },

    #[error("Unable to deliver result: {message}")]
    #[diagnostic(code(emotepack::delivery))]
    Delivery { message: String },
}

impl PackError {
    /// Short name of the pipeline step this error originated from.
    pub fn step(&self) -> &'static str {
        match self {
            PackError::Io { .. } | PackError::Config { .. } => "setup",
            PackError::GuildLookupFailed { .. } => "guild",
            PackError::TemplateReadFailed { .. }
            | PackError::TemplateMalformed { .. }
            | PackError::InvalidName { .. } => "template",
            PackError::PathCollision { .. } => "paths",
            PackError::ImageFetchFailed { .. }
            | PackError::ImageDecodeFailed { .. }
            | PackError::ImageEncodeFailed { .. } => "transcode",
            PackError::ArchiveWriteFailed { .. } | PackError::ArchiveFinalizeFailed { .. } => {
                "archive"
            }
            PackError::Delivery { .. } => "delivery",
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
