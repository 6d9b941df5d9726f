//! Core domain types for emotepack.
//!
//! - `Guild` / `Emote` - the emoji set a pack is generated from
//! - `PackName` - the generated pack title and its archive path segment

mod guild;
mod pack_name;

pub use guild::{Emote, Guild};
pub use pack_name::{path_segment, PackName};
