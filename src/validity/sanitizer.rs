use std::fmt;

/// A normalized word candidate: lowercase ASCII letters and hyphens, never empty
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '-'
}

/// Split raw recognized text on whitespace and normalize every unit.
/// Units that normalize to nothing are dropped.
pub fn sanitize(raw_text: &str) -> Vec<Token> {
    raw_text.split_whitespace().filter_map(sanitize_unit).collect()
}

/// Normalize one whitespace-free unit: transliterate to ASCII, lowercase,
/// then keep only `a-z` and `-`.
pub fn sanitize_unit(unit: &str) -> Option<Token> {
    let filtered: String = deunicode::deunicode(unit)
        .to_lowercase()
        .chars()
        .filter(|&c| is_token_char(c))
        .collect();

    if filtered.is_empty() {
        None
    } else {
        Some(Token(filtered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(Token::as_str).collect()
    }

    #[test]
    fn test_sanitize_strips_punctuation_and_case() {
        let tokens = sanitize("LOL that's Wack!!");
        assert_eq!(strings(&tokens), vec!["lol", "thats", "wack"]);
    }

    #[test]
    fn test_sanitize_empty_input() {
        assert!(sanitize("").is_empty());
        assert!(sanitize("   \n\t  ").is_empty());
    }

    #[test]
    fn test_sanitize_drops_units_that_become_empty() {
        let tokens = sanitize("hello 123 !!! ... world");
        assert_eq!(strings(&tokens), vec!["hello", "world"]);
    }

    #[test]
    fn test_sanitize_any_whitespace_run_separates() {
        let tokens = sanitize("  one\t\ttwo\n\nthree\r\nfour  ");
        assert_eq!(strings(&tokens), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_sanitize_keeps_hyphens() {
        let tokens = sanitize("Well-Known x-ray --");
        assert_eq!(strings(&tokens), vec!["well-known", "x-ray", "--"]);
    }

    #[test]
    fn test_sanitize_transliterates_accents() {
        let tokens = sanitize("Café naïve Straße");
        assert_eq!(strings(&tokens), vec!["cafe", "naive", "strasse"]);
    }

    #[test]
    fn test_sanitize_non_latin_never_fails() {
        let tokens = sanitize("😂 ☃ ¿¡ 北京");
        for token in &tokens {
            assert!(token.as_str().chars().all(is_token_char));
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let raw = "OMG!! Ça   c'est  TROP-bien 42 #meme";
        let first = sanitize(raw);
        let second = sanitize(raw);
        assert_eq!(first, second);

        let rejoined = strings(&first).join(" ");
        assert_eq!(sanitize(&rejoined), first);
    }

    #[test]
    fn test_sanitize_unit_on_clean_token_is_noop() {
        for word in ["apple", "x-ray", "-", "yeet"] {
            assert_eq!(sanitize_unit(word).unwrap().as_str(), word);
        }
    }

    #[test]
    fn test_sanitize_unit_rejects_units_without_letters() {
        assert!(sanitize_unit("").is_none());
        assert!(sanitize_unit("1234").is_none());
        assert!(sanitize_unit("'!?").is_none());
        assert_eq!(sanitize_unit("don't").unwrap(), "dont");
    }

    #[test]
    fn test_token_display_and_compare() {
        let token = sanitize_unit("Wack!").unwrap();
        assert_eq!(token.to_string(), "wack");
        assert_eq!(token, "wack");
        assert_eq!(token.as_ref(), "wack");
    }
}
