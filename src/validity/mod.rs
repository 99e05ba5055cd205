//! Token validity pipeline
//!
//! Turns raw OCR text into tokens and decides which ones are real words:
//!
//! - `sanitizer`: whitespace splitting, ASCII transliteration and filtering
//! - `dictionary`: immutable word set loaded from word-list files
//! - `slang`: remote slang lookup over HTTP, with endpoint validation
//! - `cache`: token-keyed memo in front of any slang lookup
//! - `classifier`: dictionary-then-slang decision rule and per-image partition

pub mod cache;
pub mod classifier;
pub mod dictionary;
pub mod sanitizer;
pub mod slang;

pub use cache::{CachedSlangLookup, SlangSource};
pub use classifier::{Classification, Classifier};
pub use dictionary::Dictionary;
pub use slang::{EndpointTemplate, HttpSlangClient, SlangLookup, TransportPolicy};
