use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, Url};
use tracing::{info, warn};

use crate::error::{ExtractError, Result};

pub const PLACEHOLDER: &str = "{}";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BACKOFF_BASE: Duration = Duration::from_millis(250);
const BACKOFF_MAX: Duration = Duration::from_secs(30);

/// What the slang source said about one token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlangOutcome {
    Found,
    NotFound,
    /// The endpoint could not be reached and the failure was absorbed.
    Unavailable,
}

impl SlangOutcome {
    pub fn is_valid(self) -> bool {
        self == SlangOutcome::Found
    }
}

/// A remote-backed source answering whether a token is recognized slang
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SlangLookup: Send + Sync {
    async fn lookup(&self, token: &str) -> Result<SlangOutcome>;
}

/// What to do once a lookup has exhausted its retries on a transport error
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportPolicy {
    /// Log a warning and treat the token as not found.
    #[default]
    FailClosed,
    /// Propagate the error and abort the batch.
    Fatal,
}

impl TransportPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportPolicy::FailClosed => "fail-closed",
            TransportPolicy::Fatal => "fatal",
        }
    }
}

impl FromStr for TransportPolicy {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail-closed" => Ok(TransportPolicy::FailClosed),
            "fatal" => Ok(TransportPolicy::Fatal),
            other => Err(ExtractError::Config {
                details: format!(
                    "unknown transport policy '{}', expected 'fail-closed' or 'fatal'",
                    other
                ),
            }),
        }
    }
}

/// URL pattern with a single `{}` slot for the token, checked up front
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointTemplate {
    template: String,
}

impl EndpointTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |details: String| ExtractError::InvalidTemplate {
            template: template.to_string(),
            details,
        };

        let placeholders = template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(invalid(format!(
                "expected exactly one '{}' placeholder, found {}",
                PLACEHOLDER, placeholders
            )));
        }

        let sample = template.replace(PLACEHOLDER, "sample");
        let url = Url::parse(&sample).map_err(|e| invalid(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        Ok(Self { template: template.to_string() })
    }

    pub fn url_for(&self, token: &str) -> String {
        self.template.replacen(PLACEHOLDER, token, 1)
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Slang lookup over HTTP GET; any 2xx status means the term exists
#[derive(Debug)]
pub struct HttpSlangClient {
    client: Client,
    template: EndpointTemplate,
    retries: u32,
    policy: TransportPolicy,
}

impl HttpSlangClient {
    pub fn new(
        template: EndpointTemplate,
        timeout: Duration,
        retries: u32,
        policy: TransportPolicy,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ExtractError::Config {
                details: format!("failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self { client, template, retries, policy })
    }

    pub fn template(&self) -> &EndpointTemplate {
        &self.template
    }

    async fn fetch_status(&self, url: &str) -> reqwest::Result<reqwest::StatusCode> {
        let response = self.client.get(url).send().await?;
        Ok(response.status())
    }
}

/// Delay before retrying after the given failed attempt, doubling up to a cap
fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE
        .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(BACKOFF_MAX)
}

#[async_trait]
impl SlangLookup for HttpSlangClient {
    async fn lookup(&self, token: &str) -> Result<SlangOutcome> {
        let url = self.template.url_for(token);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_status(&url).await {
                Ok(status) => {
                    info!("Slang endpoint returned {} for token '{}'", status, token);
                    return Ok(if status.is_success() {
                        SlangOutcome::Found
                    } else {
                        SlangOutcome::NotFound
                    });
                }
                Err(e) if attempt <= self.retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "⚠️ Slang lookup for '{}' failed (attempt {}): {}, retrying in {:?}",
                        token, attempt, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return match self.policy {
                        TransportPolicy::FailClosed => {
                            warn!(
                                "⚠️ Slang lookup for '{}' unavailable after {} attempt(s), treating as invalid: {}",
                                token, attempt, e
                            );
                            Ok(SlangOutcome::Unavailable)
                        }
                        TransportPolicy::Fatal => Err(ExtractError::SlangTransport {
                            token: token.to_string(),
                            attempts: attempt,
                            source: e,
                        }),
                    };
                }
            }
        }
    }
}
