use std::path::PathBuf;

/// Errors raised by the token validity pipeline and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to read word source {path}: {source}")]
    DictionarySource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid slang endpoint template '{template}': {details}")]
    InvalidTemplate { template: String, details: String },

    #[error("Slang lookup for '{token}' failed after {attempts} attempt(s): {source}")]
    SlangTransport {
        token: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Text recognition failed for {path}: {details}")]
    Recognition { path: PathBuf, details: String },

    #[error("Cannot read input directory {path}: {source}")]
    InputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {details}")]
    Config { details: String },

    #[error("Slang cache {path} is unusable: {details}")]
    Cache { path: PathBuf, details: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
