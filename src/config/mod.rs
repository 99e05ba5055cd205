use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use toml_edit::{value, Array, DocumentMut, Item, Table};
use tracing::info;

use crate::error::{ExtractError, Result};
use crate::ocr::DEFAULT_BINARY;
use crate::validity::slang::DEFAULT_TIMEOUT;
use crate::validity::{EndpointTemplate, TransportPolicy};

pub mod args;

pub use args::Args;

pub const DEFAULT_CONFIG_FILE: &str = "wordsift.toml";
pub const DEFAULT_ENDPOINT: &str = "https://www.urbandictionary.com/define.php?term={}";

#[derive(Clone, Debug, PartialEq)]
pub struct SlangConfig {
    pub endpoint_template: String,
    pub timeout: Duration,
    pub retries: u32,
    pub policy: TransportPolicy,
    /// Memoize verdicts per token within a run
    pub cache: bool,
    pub cache_path: Option<PathBuf>,
}

impl Default for SlangConfig {
    fn default() -> Self {
        Self {
            endpoint_template: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 2,
            policy: TransportPolicy::default(),
            cache: true,
            cache_path: None,
        }
    }
}

impl SlangConfig {
    /// Validate the endpoint template before any lookup happens
    pub fn template(&self) -> Result<EndpointTemplate> {
        EndpointTemplate::parse(&self.endpoint_template)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OcrConfig {
    pub binary: PathBuf,
    pub language: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
            language: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub word_sources: Vec<PathBuf>,
    pub slang: SlangConfig,
    pub ocr: OcrConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("training_memes"),
            output_dir: PathBuf::from("training_text"),
            word_sources: vec![
                PathBuf::from("/usr/share/dict/words"),
                PathBuf::from("resources/popular_words.txt"),
            ],
            slang: SlangConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl Config {
    /// Read a TOML config file. A missing file yields the defaults; keys that
    /// are absent keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Config::default();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file at {}, using defaults", path.display());
                return Ok(config);
            }
            Err(e) => return Err(e.into()),
        };

        let doc = contents.parse::<DocumentMut>().map_err(|e| ExtractError::Config {
            details: format!("{}: {}", path.display(), e),
        })?;

        if let Some(input_dir) = get_str(doc.as_item(), "input_dir")? {
            config.input_dir = PathBuf::from(input_dir);
        }
        if let Some(output_dir) = get_str(doc.as_item(), "output_dir")? {
            config.output_dir = PathBuf::from(output_dir);
        }
        if let Some(item) = doc.get("word_sources") {
            let array = item.as_array().ok_or_else(|| type_error("word_sources", "array"))?;
            config.word_sources = array
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(PathBuf::from)
                        .ok_or_else(|| type_error("word_sources", "array of strings"))
                })
                .collect::<Result<_>>()?;
        }

        if let Some(slang) = doc.get("slang") {
            if let Some(template) = get_str(slang, "endpoint_template")? {
                config.slang.endpoint_template = template.to_string();
            }
            if let Some(secs) = get_int(slang, "timeout_secs")? {
                config.slang.timeout = Duration::from_secs(secs);
            }
            if let Some(retries) = get_int(slang, "retries")? {
                config.slang.retries = u32::try_from(retries)
                    .map_err(|_| type_error("slang.retries", "small non-negative integer"))?;
            }
            if let Some(policy) = get_str(slang, "on_transport_error")? {
                config.slang.policy = policy.parse()?;
            }
            if let Some(cache) = get_bool(slang, "cache")? {
                config.slang.cache = cache;
            }
            if let Some(cache_path) = get_str(slang, "cache_path")? {
                config.slang.cache_path = Some(PathBuf::from(cache_path));
            }
        }

        if let Some(ocr) = doc.get("ocr") {
            if let Some(binary) = get_str(ocr, "binary")? {
                config.ocr.binary = PathBuf::from(binary);
            }
            if let Some(language) = get_str(ocr, "language")? {
                config.ocr.language = Some(language.to_string());
            }
        }

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check the settings that only make sense together, after CLI overrides
    pub fn validate(&self) -> Result<()> {
        if self.slang.timeout.is_zero() {
            return Err(ExtractError::Config {
                details: "'slang.timeout_secs' must be at least 1".to_string(),
            });
        }
        if self.slang.cache_path.is_some() && !self.slang.cache {
            return Err(ExtractError::Config {
                details: "'slang.cache_path' needs 'slang.cache = true'".to_string(),
            });
        }
        self.slang.template()?;
        Ok(())
    }

    pub fn to_toml(&self) -> String {
        let mut doc = DocumentMut::new();
        doc["input_dir"] = value(self.input_dir.to_string_lossy().to_string());
        doc["output_dir"] = value(self.output_dir.to_string_lossy().to_string());
        let mut sources = Array::new();
        for source in &self.word_sources {
            sources.push(source.to_string_lossy().to_string());
        }
        doc["word_sources"] = value(sources);

        let mut slang = Table::new();
        slang["endpoint_template"] = value(self.slang.endpoint_template.clone());
        slang["timeout_secs"] = value(self.slang.timeout.as_secs() as i64);
        slang["retries"] = value(i64::from(self.slang.retries));
        slang["on_transport_error"] = value(self.slang.policy.as_str());
        slang["cache"] = value(self.slang.cache);
        if let Some(cache_path) = &self.slang.cache_path {
            slang["cache_path"] = value(cache_path.to_string_lossy().to_string());
        }
        doc.insert("slang", Item::Table(slang));

        let mut ocr = Table::new();
        ocr["binary"] = value(self.ocr.binary.to_string_lossy().to_string());
        if let Some(language) = &self.ocr.language {
            ocr["language"] = value(language.clone());
        }
        doc.insert("ocr", Item::Table(ocr));

        doc.to_string()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, format!("# wordsift configuration\n{}", self.to_toml()))?;
        Ok(())
    }
}

fn type_error(key: &str, expected: &str) -> ExtractError {
    ExtractError::Config {
        details: format!("'{}' must be a {}", key, expected),
    }
}

fn get_str<'a>(item: &'a Item, key: &str) -> Result<Option<&'a str>> {
    match item.get(key) {
        None => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| type_error(key, "string")),
    }
}

fn get_bool(item: &Item, key: &str) -> Result<Option<bool>> {
    match item.get(key) {
        None => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| type_error(key, "boolean")),
    }
}

fn get_int(item: &Item, key: &str) -> Result<Option<u64>> {
    match item.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_integer()
            .and_then(|i| u64::try_from(i).ok())
            .map(Some)
            .ok_or_else(|| type_error(key, "non-negative integer")),
    }
}
