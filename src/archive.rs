//! In-memory zip assembly.
//!
//! Entries are Deflate-compressed with a fixed timestamp, so the same
//! entries added in the same order always produce the same bytes. Each path
//! may be written once, and the archive is closed by `finalize`.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{PackError, Result};

/// One file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// Archive path of a transcoded emoji: `<pack>/<guild>/<emote>.<ext>`.
pub fn image_entry_path(
    pack_segment: &str,
    guild_segment: &str,
    emote_segment: &str,
    ext: &str,
) -> String {
    format!("{}/{}/{}.{}", pack_segment, guild_segment, emote_segment, ext)
}

/// Write-once zip builder.
pub struct Assembler {
    writer: Option<ZipWriter<Cursor<Vec<u8>>>>,
    paths: HashSet<String>,
    options: SimpleFileOptions,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        Self {
            writer: Some(ZipWriter::new(Cursor::new(Vec::new()))),
            paths: HashSet::new(),
            options,
        }
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.writer.is_none()
    }

    /// Append one entry.
    ///
    /// Fails with `PathCollision` if the path was already written and with
    /// `ArchiveWriteFailed` after `finalize` or for paths that would escape
    /// the archive root.
    pub fn add(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        check_path(path)?;

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| PackError::ArchiveWriteFailed {
                path: path.to_string(),
                message: "archive is already finalized".to_string(),
            })?;

        if self.paths.contains(path) {
            return Err(PackError::PathCollision {
                path: path.to_string(),
            });
        }

        let write_err = |e: &dyn std::fmt::Display| PackError::ArchiveWriteFailed {
            path: path.to_string(),
            message: e.to_string(),
        };
        writer
            .start_file(path, self.options)
            .map_err(|e| write_err(&e))?;
        writer.write_all(bytes).map_err(|e| write_err(&e))?;

        self.paths.insert(path.to_string());
        Ok(())
    }

    pub fn add_entry(&mut self, entry: &ArchiveEntry) -> Result<()> {
        self.add(&entry.path, &entry.bytes)
    }

    /// Close the archive and return its bytes. A second call is rejected.
    pub fn finalize(&mut self) -> Result<Vec<u8>> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| PackError::ArchiveFinalizeFailed {
                message: "archive is already finalized".to_string(),
            })?;

        let cursor = writer
            .finish()
            .map_err(|e| PackError::ArchiveFinalizeFailed {
                message: e.to_string(),
            })?;

        Ok(cursor.into_inner())
    }
}

fn check_path(path: &str) -> Result<()> {
    let unsafe_path = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|part| part.is_empty() || part == "." || part == "..");

    if unsafe_path {
        return Err(PackError::ArchiveWriteFailed {
            path: path.to_string(),
            message: "not a relative archive path".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_back(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[test]
    fn test_add_and_finalize() {
        let mut assembler = Assembler::new();
        assembler.add("Pack/a.lua", b"print(1)").unwrap();
        assembler
            .add_entry(&ArchiveEntry::new("Pack/42/pog.tga", vec![0, 1, 2]))
            .unwrap();
        assert_eq!(assembler.len(), 2);

        let entries = read_back(assembler.finalize().unwrap());

        assert_eq!(
            entries,
            vec![
                ("Pack/a.lua".to_string(), b"print(1)".to_vec()),
                ("Pack/42/pog.tga".to_string(), vec![0, 1, 2]),
            ]
        );
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut assembler = Assembler::new();
        assembler.add("Pack/a.lua", b"1").unwrap();

        let err = assembler.add("Pack/a.lua", b"2").unwrap_err();
        assert!(matches!(err, PackError::PathCollision { .. }));

        // the first write survives
        let entries = read_back(assembler.finalize().unwrap());
        assert_eq!(entries, vec![("Pack/a.lua".to_string(), b"1".to_vec())]);
    }

    #[test]
    fn test_second_finalize_rejected() {
        let mut assembler = Assembler::new();
        assembler.finalize().unwrap();

        assert!(assembler.is_finalized());
        let err = assembler.finalize().unwrap_err();
        assert!(matches!(err, PackError::ArchiveFinalizeFailed { .. }));
    }

    #[test]
    fn test_add_after_finalize_rejected() {
        let mut assembler = Assembler::new();
        assembler.finalize().unwrap();

        let err = assembler.add("Pack/a.lua", b"1").unwrap_err();
        assert!(matches!(err, PackError::ArchiveWriteFailed { .. }));
    }

    #[test]
    fn test_unsafe_paths_rejected() {
        let mut assembler = Assembler::new();
        for path in ["", "/abs", "a/../b", "a//b", "a\\b", "./a"] {
            assert!(
                matches!(
                    assembler.add(path, b"x"),
                    Err(PackError::ArchiveWriteFailed { .. })
                ),
                "{path:?} should be rejected"
            );
        }
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = || {
            let mut assembler = Assembler::new();
            assembler.add("Pack/a.lua", b"hello").unwrap();
            assembler.add("Pack/b/c.tga", &[9; 64]).unwrap();
            assembler.finalize().unwrap()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn test_image_entry_path() {
        assert_eq!(
            image_entry_path("TwitchEmotes - Acme", "42", "pog", "tga"),
            "TwitchEmotes - Acme/42/pog.tga"
        );
    }
}
