use std::time::Duration;

use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, REFERER,
};
use tracing::warn;

use super::ScrapeError;
use crate::config::ScrapeConfig;

/// Substrings that mark a WAF block page delivered with a 2xx status.
const BLOCK_MARKERS: [&str; 4] = ["access denied", "request blocked", "forbidden", "error 403"];

/// HTML fetch layer for the source site.
///
/// Sends browser-mimicking headers, detects soft-block pages returned with a
/// success status, and retries with exponential backoff plus jitter. The
/// kill switch in [`ScrapeConfig`] short-circuits every call before any
/// network I/O happens.
pub struct UfcClient {
    config: ScrapeConfig,
    client: reqwest::Client,
}

impl UfcClient {
    pub fn new(config: ScrapeConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.ufc.com/"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .expect("static client configuration is valid");

        Self { config, client }
    }

    pub fn is_disabled(&self) -> bool {
        self.config.disabled
    }

    /// Fetch one page by site-relative path, retrying transport errors and
    /// soft blocks. Fails with [`ScrapeError::RetriesExhausted`] once the
    /// attempt budget runs out.
    pub async fn fetch(&self, path: &str) -> Result<String, ScrapeError> {
        if self.config.disabled {
            return Err(ScrapeError::Disabled);
        }

        let mut last_error = String::from("unknown error");

        for attempt in 0..self.config.attempts {
            match self.fetch_once(path).await {
                Ok(html) => return Ok(html),
                Err(err) => {
                    last_error = err.to_string();
                    if attempt + 1 == self.config.attempts {
                        break;
                    }
                    let delay = self.backoff_delay(attempt, &last_error);
                    warn!(
                        path,
                        attempt = attempt + 1,
                        attempts = self.config.attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %last_error,
                        "fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(ScrapeError::RetriesExhausted {
            path: path.to_string(),
            attempts: self.config.attempts,
            last_error,
        })
    }

    async fn fetch_once(&self, path: &str) -> Result<String, ScrapeError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ScrapeError::Request {
                path: path.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(ScrapeError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| ScrapeError::Request {
            path: path.to_string(),
            message: err.to_string(),
        })?;

        // The WAF sometimes serves its denial page with a 200.
        let lower = body.to_lowercase();
        if let Some(marker) = BLOCK_MARKERS.iter().find(|m| lower.contains(*m)) {
            return Err(ScrapeError::Blocked {
                path: path.to_string(),
                marker: (*marker).to_string(),
            });
        }

        Ok(body)
    }

    /// Exponential backoff with jitter, biased further when the failure
    /// looks like blocking rather than a plain transport error.
    fn backoff_delay(&self, attempt: u32, error_text: &str) -> Duration {
        let jitter: u64 = rand::thread_rng().gen_range(0..250);
        let lower = error_text.to_lowercase();
        let looks_403 = lower.contains("403") || lower.contains("forbidden");
        let looks_429 = lower.contains("429") || lower.contains("too many");

        let mut delay = self.config.base_delay_ms * 2u64.pow(attempt) + jitter;
        if looks_403 {
            delay += 500;
        }
        if looks_429 {
            delay += 1200;
        }
        Duration::from_millis(delay)
    }
}
