//! Outbound delivery of status messages and finished packs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{PackError, Result};
use crate::output::{display_path, Printer};

pub const GENERATING_MESSAGE: &str = "Generating...";
pub const DONE_MESSAGE: &str = "All done! 🎉";
pub const FAILURE_MESSAGE: &str = "Unable to generate emoji. ☹️";

/// Failure notice shown to the requester, with an optional correlation id.
pub fn failure_message(error_id: Option<&str>) -> String {
    match error_id {
        Some(id) => format!("{}\nerror_id: {}", FAILURE_MESSAGE, id),
        None => FAILURE_MESSAGE.to_string(),
    }
}

/// Where status messages and archives are sent.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<()>;

    async fn send_file(&self, message: &str, file_name: &str, bytes: Vec<u8>) -> Result<()>;
}

/// Writes archives into a directory and prints messages as status lines.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
    printer: Printer,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            printer: Printer::new(),
        }
    }

    pub fn with_printer(mut self, printer: Printer) -> Self {
        self.printer = printer;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Delivery for DirectoryDelivery {
    async fn send_message(&self, message: &str) -> Result<()> {
        if message.starts_with(FAILURE_MESSAGE) {
            self.printer.error("Failed", message);
        } else {
            self.printer.info("Bot", message);
        }
        Ok(())
    }

    async fn send_file(&self, message: &str, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(PackError::Delivery {
                message: format!(
                    "refusing to write '{}' outside {}",
                    file_name,
                    self.dir.display()
                ),
            });
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PackError::Io {
                path: self.dir.clone(),
                message: format!("Failed to create output directory: {}", e),
            })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| PackError::Io {
                path: path.clone(),
                message: format!("Failed to write archive: {}", e),
            })?;

        self.printer.status(
            "Wrote",
            &format!(
                "{} {}",
                self.printer.cyan(&display_path(&path)),
                self.printer.dim(&format!("({} bytes)", bytes.len()))
            ),
        );
        self.printer.info("Bot", message);
        Ok(())
    }
}
