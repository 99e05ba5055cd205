use std::fmt;

use tracing::info;

use super::dictionary::Dictionary;
use super::sanitizer::{sanitize, Token};
use super::slang::{SlangLookup, SlangOutcome};
use crate::error::Result;

/// Which source vouched for a token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerdictSource {
    Dictionary,
    Slang,
    None,
}

impl fmt::Display for VerdictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerdictSource::Dictionary => "dictionary",
            VerdictSource::Slang => "slang",
            VerdictSource::None => "none",
        };
        f.write_str(name)
    }
}

/// Validity of a single token, with provenance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub token: Token,
    pub source: VerdictSource,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.source != VerdictSource::None
    }
}

/// Valid and invalid tokens of one image, each in order of appearance
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub image_id: String,
    pub valid: Vec<Token>,
    pub invalid: Vec<Token>,
}

impl Classification {
    /// The output line for this image: valid tokens joined by single spaces
    pub fn valid_line(&self) -> String {
        self.valid.iter().map(Token::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// Order in which sources are consulted. The local dictionary always comes
/// first so a hit never reaches the remote slang source.
pub const LOOKUP_ORDER: [VerdictSource; 2] = [VerdictSource::Dictionary, VerdictSource::Slang];

/// Partitions sanitized tokens into valid and invalid using a dictionary and a
/// slang source
pub struct Classifier<'a, S: ?Sized> {
    dictionary: &'a Dictionary,
    slang: &'a S,
}

impl<'a, S: SlangLookup + ?Sized> Classifier<'a, S> {
    pub fn new(dictionary: &'a Dictionary, slang: &'a S) -> Self {
        Self { dictionary, slang }
    }

    /// Decide one token, stopping at the first source in `LOOKUP_ORDER` that
    /// recognizes it.
    pub async fn verdict(&self, token: &Token) -> Result<Verdict> {
        for source in LOOKUP_ORDER {
            let recognized = match source {
                VerdictSource::Dictionary => self.dictionary.is_valid(token.as_str()),
                VerdictSource::Slang => {
                    let outcome: SlangOutcome = self.slang.lookup(token.as_str()).await?;
                    outcome.is_valid()
                }
                VerdictSource::None => false,
            };
            if recognized {
                return Ok(Verdict { token: token.clone(), source });
            }
        }

        Ok(Verdict { token: token.clone(), source: VerdictSource::None })
    }

    /// Sanitize `raw_text` and classify every token in order.
    /// Repeated tokens are classified once per occurrence.
    pub async fn classify(&self, image_id: &str, raw_text: &str) -> Result<Classification> {
        let mut classification = Classification {
            image_id: image_id.to_string(),
            ..Classification::default()
        };

        for token in sanitize(raw_text) {
            let verdict = self.verdict(&token).await?;
            if verdict.is_valid() {
                classification.valid.push(verdict.token);
            } else {
                classification.invalid.push(verdict.token);
            }
        }

        info!(
            "Image {} had valid words {:?} and invalid words {:?}",
            classification.image_id,
            as_strs(&classification.valid),
            as_strs(&classification.invalid)
        );
        Ok(classification)
    }
}

fn as_strs(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(Token::as_str).collect()
}
