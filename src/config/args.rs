//! Command line arguments, layered over the config file.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use super::{Config, DEFAULT_CONFIG_FILE};
use crate::validity::TransportPolicy;

/// Extract valid words from input memes
#[derive(Parser, Debug, Clone)]
#[command(name = "wordsift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// TOML config file; CLI flags override its values
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "WORDSIFT_CONFIG")]
    pub config: PathBuf,

    /// Directory from which to read input memes
    #[arg(long)]
    pub input_data_path: Option<PathBuf>,

    /// Directory to which to write extracted text
    #[arg(long)]
    pub output_data_path: Option<PathBuf>,

    /// Comma separated word lists from which to build the dictionary
    #[arg(long, value_delimiter = ',')]
    pub word_sources: Option<Vec<PathBuf>>,

    /// Slang endpoint URL with a single {} placeholder for the token
    #[arg(long, alias = "urban-dictionary-endpoint-template")]
    pub slang_endpoint_template: Option<String>,

    /// Per-request timeout for slang lookups, in seconds
    #[arg(long)]
    pub slang_timeout_secs: Option<u64>,

    /// Retries on slang transport errors before giving up
    #[arg(long)]
    pub slang_retries: Option<u32>,

    /// Abort the batch when the slang endpoint is unreachable
    #[arg(long)]
    pub fatal_transport_errors: bool,

    /// JSON file used to keep slang verdicts between runs
    #[arg(long)]
    pub slang_cache: Option<PathBuf>,

    /// Query the slang endpoint for every occurrence of a token
    #[arg(long, conflicts_with = "slang_cache")]
    pub no_slang_cache: bool,

    /// Path of the tesseract executable
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// Tesseract language code, e.g. "eng"
    #[arg(long)]
    pub ocr_language: Option<String>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    pub write_config: bool,

    /// Verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(input_dir) = &self.input_data_path {
            config.input_dir = input_dir.clone();
        }
        if let Some(output_dir) = &self.output_data_path {
            config.output_dir = output_dir.clone();
        }
        if let Some(sources) = &self.word_sources {
            config.word_sources = sources.clone();
        }
        if let Some(template) = &self.slang_endpoint_template {
            config.slang.endpoint_template = template.clone();
        }
        if let Some(secs) = self.slang_timeout_secs {
            config.slang.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = self.slang_retries {
            config.slang.retries = retries;
        }
        if self.fatal_transport_errors {
            config.slang.policy = TransportPolicy::Fatal;
        }
        if self.no_slang_cache {
            config.slang.cache = false;
            config.slang.cache_path = None;
        }
        if let Some(cache_path) = &self.slang_cache {
            config.slang.cache = true;
            config.slang.cache_path = Some(cache_path.clone());
        }
        if let Some(binary) = &self.tesseract {
            config.ocr.binary = binary.clone();
        }
        if let Some(language) = &self.ocr_language {
            config.ocr.language = Some(language.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let args = Args::try_parse_from(["wordsift"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config, Config::default());
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(args.log_level(), Level::INFO);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "wordsift",
            "--input-data-path",
            "memes",
            "--word-sources",
            "/usr/share/dict/words,extra.txt",
            "--urban-dictionary-endpoint-template",
            "http://localhost:8080/{}",
            "--slang-timeout-secs",
            "2",
            "--fatal-transport-errors",
            "--ocr-language",
            "eng",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.input_dir, PathBuf::from("memes"));
        assert_eq!(
            config.word_sources,
            vec![PathBuf::from("/usr/share/dict/words"), PathBuf::from("extra.txt")]
        );
        assert_eq!(config.slang.endpoint_template, "http://localhost:8080/{}");
        assert_eq!(config.slang.timeout, Duration::from_secs(2));
        assert_eq!(config.slang.policy, TransportPolicy::Fatal);
        assert_eq!(config.ocr.language.as_deref(), Some("eng"));
        assert_eq!(config.output_dir, Config::default().output_dir);
    }

    #[test]
    fn test_log_level() {
        let args = Args::try_parse_from(["wordsift", "-vv"]).unwrap();
        assert_eq!(args.log_level(), Level::TRACE);

        let args = Args::try_parse_from(["wordsift", "-v", "--quiet"]).unwrap();
        assert_eq!(args.log_level(), Level::WARN);
    }

    #[test]
    fn test_no_slang_cache_flag() {
        let args = Args::try_parse_from(["wordsift", "--no-slang-cache"]).unwrap();
        let mut config = Config::default();
        config.slang.cache_path = Some(PathBuf::from("slang.json"));
        args.apply(&mut config);

        assert!(!config.slang.cache);
        assert_eq!(config.slang.cache_path, None);
        assert!(config.validate().is_ok());

        let conflict =
            Args::try_parse_from(["wordsift", "--no-slang-cache", "--slang-cache", "x.json"]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_zero_timeout_flag_fails_validation() {
        let args = Args::try_parse_from(["wordsift", "--slang-timeout-secs", "0"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(config.validate().is_err());
    }
}
