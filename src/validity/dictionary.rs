use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ExtractError, Result};

/// Figures reported after loading one word source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub added: usize,
    pub total: usize,
}

/// Immutable set of known words, built once from word-list files
#[derive(Debug, Default)]
pub struct Dictionary {
    words: HashSet<String>,
    summaries: Vec<SourceSummary>,
}

impl Dictionary {
    /// Load every source in order. Any unreadable source aborts the build.
    pub fn build<P: AsRef<Path>>(sources: &[P]) -> Result<Self> {
        let mut dictionary = Self::default();
        for source in sources {
            dictionary.add_source(source.as_ref())?;
        }
        Ok(dictionary)
    }

    /// Build from in-memory words, normalized the same way as file lines
    #[cfg(test)]
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| normalize_entry(word.as_ref()))
            .collect();
        Self { words, summaries: Vec::new() }
    }

    fn add_source(&mut self, path: &Path) -> Result<()> {
        let source_error = |source| ExtractError::DictionarySource {
            path: path.to_path_buf(),
            source,
        };

        let reader = BufReader::new(File::open(path).map_err(source_error)?);
        let mut added = 0;
        for line in reader.lines() {
            let line = line.map_err(source_error)?;
            if self.words.insert(normalize_entry(&line)) {
                added += 1;
            }
        }

        let summary = SourceSummary {
            path: path.to_path_buf(),
            added,
            total: self.words.len(),
        };
        info!(
            "📚 Added {} valid words to dictionary from {}. Current size: {}",
            summary.added,
            summary.path.display(),
            summary.total
        );
        self.summaries.push(summary);
        Ok(())
    }

    /// Exact membership test against normalized entries
    pub fn is_valid(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Per-source load figures, in load order
    pub fn summaries(&self) -> &[SourceSummary] {
        &self.summaries
    }
}

// Leading whitespace and inner characters are kept as-is.
fn normalize_entry(line: &str) -> String {
    line.to_lowercase().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validity::sanitizer::sanitize;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_build_normalizes_case_and_trailing_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(&temp_dir, "words.txt", "Apple\nBANANA  \r\ncherry\t\n");

        let dictionary = Dictionary::build(&[source]).unwrap();
        assert!(dictionary.is_valid("apple"));
        assert!(dictionary.is_valid("banana"));
        assert!(dictionary.is_valid("cherry"));
        assert!(!dictionary.is_valid("Apple"));
    }

    #[test]
    fn test_build_keeps_leading_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(&temp_dir, "words.txt", "  indented\n");

        let dictionary = Dictionary::build(&[source]).unwrap();
        assert!(dictionary.is_valid("  indented"));
        assert!(!dictionary.is_valid("indented"));
    }

    #[test]
    fn test_sanitized_token_matches_entry() {
        let temp_dir = TempDir::new().unwrap();
        let source = write_source(&temp_dir, "words.txt", "Apple\n");
        let dictionary = Dictionary::build(&[source]).unwrap();

        let tokens = sanitize("Apple");
        assert!(dictionary.is_valid(tokens[0].as_str()));
    }

    #[test]
    fn test_build_deduplicates_across_sources() {
        let temp_dir = TempDir::new().unwrap();
        let first = write_source(&temp_dir, "first.txt", "cat\ndog\ncat\n");
        let second = write_source(&temp_dir, "second.txt", "Dog\nemu\n");

        let dictionary = Dictionary::build(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(dictionary.len(), 3);

        let summaries = dictionary.summaries();
        assert_eq!(
            summaries,
            &[
                SourceSummary { path: first, added: 2, total: 2 },
                SourceSummary { path: second, added: 1, total: 3 },
            ]
        );
    }

    #[test]
    fn test_every_source_word_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        let words = ["aardvark", "Zebra", "well-known", "x-ray", "Quokka  "];
        let source = write_source(&temp_dir, "words.txt", &(words.join("\n") + "\n"));

        let dictionary = Dictionary::build(&[source]).unwrap();
        for word in words {
            assert!(dictionary.is_valid(&word.to_lowercase().trim_end().to_string()));
        }
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let present = write_source(&temp_dir, "words.txt", "apple\n");
        let missing = temp_dir.path().join("missing.txt");

        let result = Dictionary::build(&[present, missing.clone()]);
        match result {
            Err(ExtractError::DictionarySource { path, .. }) => assert_eq!(path, missing),
            other => panic!("Expected DictionarySource error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_utf8_source_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let latin1 = temp_dir.path().join("latin1.txt");
        fs::write(&latin1, b"caf\xe9\n").unwrap();

        match Dictionary::build(&[latin1.clone()]) {
            Err(ExtractError::DictionarySource { path, source }) => {
                assert_eq!(path, latin1);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("Expected DictionarySource error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_source_list() {
        let sources: Vec<PathBuf> = Vec::new();
        let dictionary = Dictionary::build(&sources).unwrap();
        assert!(dictionary.is_empty());
        assert!(!dictionary.is_valid("anything"));
    }

    #[test]
    fn test_from_words() {
        let dictionary = Dictionary::from_words(["Thats", "the "]);
        assert!(dictionary.is_valid("thats"));
        assert!(dictionary.is_valid("the"));
        assert!(dictionary.summaries().is_empty());
    }
}
