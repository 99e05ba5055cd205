use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::info;

use super::slang::{SlangLookup, SlangOutcome};
use crate::error::{ExtractError, Result};

/// Token-keyed memo in front of a slang lookup.
///
/// Only definitive answers (`Found` / `NotFound`) are remembered; an
/// `Unavailable` outcome is asked again next time.
pub struct CachedSlangLookup<S> {
    inner: S,
    entries: Mutex<HashMap<String, bool>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<S: SlangLookup> CachedSlangLookup<S> {
    pub fn new(inner: S) -> Self {
        Self::with_entries(inner, HashMap::new())
    }

    fn with_entries(inner: S, entries: HashMap<String, bool>) -> Self {
        Self {
            inner,
            entries: Mutex::new(entries),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Seed the cache from a JSON file written by `persist`.
    /// A missing file gives an empty cache.
    pub fn load(inner: S, path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No slang cache at {}, starting empty", path.display());
            return Ok(Self::new(inner));
        }

        let contents = fs::read_to_string(path).map_err(|e| ExtractError::Cache {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        let entries: HashMap<String, bool> =
            serde_json::from_str(&contents).map_err(|e| ExtractError::Cache {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        info!("📦 Loaded {} cached slang verdicts from {}", entries.len(), path.display());
        Ok(Self::with_entries(inner, entries))
    }

    /// Write the cache as a JSON object, replacing the file atomically
    pub fn persist(&self, path: &Path) -> Result<()> {
        let snapshot: BTreeMap<String, bool> = self.lock_entries().clone().into_iter().collect();
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| ExtractError::Cache {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut staging = NamedTempFile::new_in(parent)?;
        staging.write_all(json.as_bytes())?;
        staging.persist(path).map_err(|e| ExtractError::Cache {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        info!("💾 Saved {} slang verdicts to {}", snapshot.len(), path.display());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, bool>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<S: SlangLookup> SlangLookup for CachedSlangLookup<S> {
    async fn lookup(&self, token: &str) -> Result<SlangOutcome> {
        let cached = self.lock_entries().get(token).copied();
        if let Some(found) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            let outcome = if found { SlangOutcome::Found } else { SlangOutcome::NotFound };
            info!("Slang cache returned {:?} for token '{}'", outcome, token);
            return Ok(outcome);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let outcome = self.inner.lookup(token).await?;
        match outcome {
            SlangOutcome::Found => {
                self.lock_entries().insert(token.to_string(), true);
            }
            SlangOutcome::NotFound => {
                self.lock_entries().insert(token.to_string(), false);
            }
            SlangOutcome::Unavailable => {}
        }
        Ok(outcome)
    }
}

/// A slang lookup used either directly or behind the memo
pub enum SlangSource<S> {
    /// Every occurrence of a token goes to the inner lookup.
    Direct(S),
    Cached(CachedSlangLookup<S>),
}

impl<S: SlangLookup> SlangSource<S> {
    pub fn cache(&self) -> Option<&CachedSlangLookup<S>> {
        match self {
            SlangSource::Direct(_) => None,
            SlangSource::Cached(cache) => Some(cache),
        }
    }
}

#[async_trait]
impl<S: SlangLookup> SlangLookup for SlangSource<S> {
    async fn lookup(&self, token: &str) -> Result<SlangOutcome> {
        match self {
            SlangSource::Direct(inner) => inner.lookup(token).await,
            SlangSource::Cached(cache) => cache.lookup(token).await,
        }
    }
}
