use std::path::{Path, PathBuf};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExtractError, Result};

pub const DEFAULT_BINARY: &str = "tesseract";

/// Turns an image file into the raw text an OCR engine sees in it
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String>;
}

/// Runs the `tesseract` command line tool and reads its stdout
#[derive(Clone, Debug)]
pub struct TesseractCli {
    binary: PathBuf,
    language: Option<String>,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>, language: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            language,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, image: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg(image).arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }
        command
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY, None)
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &Path) -> Result<String> {
        debug!("Running {} on {}", self.binary.display(), image.display());

        let output = self
            .command(image)
            .output()
            .await
            .map_err(|e| ExtractError::Recognition {
                path: image.to_path_buf(),
                details: format!("failed to run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(ExtractError::Recognition {
                path: image.to_path_buf(),
                details: format!(
                    "{} exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
