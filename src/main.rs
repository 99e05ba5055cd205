use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

mod batch;
mod config;
mod error;
mod ocr;
mod validity;

use batch::{write_output, BatchDriver};
use config::{Args, Config};
use ocr::TesseractCli;
use validity::{
    CachedSlangLookup, Classification, Classifier, Dictionary, HttpSlangClient, SlangLookup,
    SlangSource,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    args.apply(&mut config);

    if args.write_config {
        config.save(&args.config)?;
        info!("Wrote configuration to {}", args.config.display());
        return Ok(());
    }

    // Fail on bad settings before touching any image.
    config.validate()?;
    let template = config.slang.template()?;
    let dictionary = Dictionary::build(&config.word_sources).context("building dictionary")?;
    if dictionary.is_empty() {
        warn!("Dictionary is empty, every token will go to the slang endpoint");
    }
    info!(
        "✅ Dictionary ready with {} words from {} source(s)",
        dictionary.len(),
        dictionary.summaries().len()
    );

    let client = HttpSlangClient::new(
        template,
        config.slang.timeout,
        config.slang.retries,
        config.slang.policy,
    )?;
    info!("Slang endpoint: {}", client.template());
    let slang = match (config.slang.cache, &config.slang.cache_path) {
        (false, _) => SlangSource::Direct(client),
        (true, Some(path)) => SlangSource::Cached(CachedSlangLookup::load(client, path)?),
        (true, None) => SlangSource::Cached(CachedSlangLookup::new(client)),
    };

    let recognizer = TesseractCli::new(config.ocr.binary.clone(), config.ocr.language.clone());
    info!("OCR engine: {}", recognizer.binary().display());
    let driver = BatchDriver::new(&recognizer, Classifier::new(&dictionary, &slang));

    info!("🚀 Extracting words from {}", config.input_dir.display());
    let report = driver.run(&config.input_dir).await?;
    if !report.failed.is_empty() {
        info!("{} image(s) could not be read and were skipped", report.failed.len());
    }

    let output = save_results(
        &config.output_dir,
        &report.processed,
        &slang,
        config.slang.cache_path.as_deref(),
    )?;
    info!("Wrote {}", output.display());
    Ok(())
}

/// Write the batch output, then save the slang cache if one is configured.
/// A cache that cannot be saved only costs the next run some lookups.
fn save_results<S: SlangLookup>(
    output_dir: &Path,
    records: &[Classification],
    slang: &SlangSource<S>,
    cache_path: Option<&Path>,
) -> Result<PathBuf> {
    let output = write_output(output_dir, records, &chrono::Local::now())?;

    if let Some(cache) = slang.cache() {
        info!(
            "Slang lookups: {} remote, {} answered from cache, {} tokens cached",
            cache.misses(),
            cache.hits(),
            cache.len()
        );
        if let Some(path) = cache_path {
            if let Err(e) = cache.persist(path) {
                warn!("⚠️ Could not save slang cache: {}", e);
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use crate::validity::slang::MockSlangLookup;

    #[test]
    fn test_output_survives_unwritable_cache() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("out");
        // A non-empty directory where the cache file should go.
        let cache_path = temp_dir.path().join("slang.json");
        fs::create_dir_all(cache_path.join("occupied")).unwrap();

        let slang = SlangSource::Cached(CachedSlangLookup::new(MockSlangLookup::new()));
        let output = save_results(&output_dir, &[], &slang, Some(&cache_path)).unwrap();

        assert!(output.exists());
        assert!(output.starts_with(&output_dir));
        assert!(cache_path.is_dir());
    }

    #[test]
    fn test_direct_source_writes_output_only() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("out");
        let cache_path = temp_dir.path().join("slang.json");

        let slang = SlangSource::Direct(MockSlangLookup::new());
        let output = save_results(&output_dir, &[], &slang, Some(&cache_path)).unwrap();

        assert!(output.exists());
        assert!(!cache_path.exists());
    }
}
