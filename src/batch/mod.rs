use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::{info, warn};

use crate::error::{ExtractError, Result};
use crate::ocr::TextRecognizer;
use crate::validity::{Classification, Classifier, SlangLookup};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Images that went through a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<Classification>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Regular files directly inside `dir`, sorted by name
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_error = |source| ExtractError::InputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        if path.is_file() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Drives OCR and classification over every image of a directory
pub struct BatchDriver<'a, R: ?Sized, S: ?Sized> {
    recognizer: &'a R,
    classifier: Classifier<'a, S>,
}

impl<'a, R, S> BatchDriver<'a, R, S>
where
    R: TextRecognizer + ?Sized,
    S: SlangLookup + ?Sized,
{
    pub fn new(recognizer: &'a R, classifier: Classifier<'a, S>) -> Self {
        Self { recognizer, classifier }
    }

    /// Process images one at a time. A recognition failure skips that image;
    /// a classification error aborts the run.
    pub async fn run(&self, input_dir: &Path) -> Result<BatchReport> {
        let images = list_images(input_dir)?;
        info!(
            "Processing the following images: {:?}",
            images.iter().map(|p| image_name(p)).collect::<Vec<_>>()
        );

        let mut report = BatchReport::default();
        for image in images {
            let name = image_name(&image);
            let raw_text = match self.recognizer.recognize(&image).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("⚠️ Skipping image '{}': {}", name, e);
                    report.failed.push((image, e.to_string()));
                    continue;
                }
            };

            let classification = self
                .classifier
                .classify(&image.display().to_string(), &raw_text)
                .await?;
            info!("Processed image '{}' and got {:?}", name, classification.valid_line());
            report.processed.push(classification);
        }

        Ok(report)
    }
}

fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<timestamp>_<count>.txt`
pub fn output_file_name<Tz: TimeZone>(now: &DateTime<Tz>, count: usize) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.txt", now.format(TIMESTAMP_FORMAT), count)
}

/// Write one line of space-joined valid tokens per processed image
pub fn write_output<Tz: TimeZone>(
    output_dir: &Path,
    records: &[Classification],
    now: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let path = output_dir.join(output_file_name(now, records.len()));
    let output_error = |source| ExtractError::Output {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(output_dir).map_err(output_error)?;
    let mut file = fs::File::create(&path).map_err(output_error)?;
    for record in records {
        writeln!(file, "{}", record.valid_line()).map_err(output_error)?;
    }
    file.flush().map_err(output_error)?;

    info!("Extracted {} images and wrote to file '{}'", records.len(), path.display());
    Ok(path)
}
