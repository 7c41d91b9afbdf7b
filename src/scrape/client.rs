//! HTTP client shared by all source adapters
//!
//! One pooled client serves every source: browser identity string, French
//! language preference, gzip/brotli decompression, bounded redirects, and a
//! whole-request timeout that turns into a transient fetch error.

use crate::config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upper bound on response body size; listing result pages are small and
/// anything larger is not a result page.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Errors that can occur while fetching a result page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    #[error("unusable content type: {0}")]
    InvalidContentType(String),
    #[error("content too large: {0} bytes")]
    ContentTooLarge(usize),
    #[error("failed to build request URL: {0}")]
    InvalidUrl(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// Transient failures abandon one page chain and the sweep moves on;
    /// permanent failures are fatal for the whole adapter.
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::InvalidUrl(_) | FetchError::Config(_))
    }
}

/// Pooled HTTP client all adapters fetch through.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl SourceClient {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        // HeaderValue lets opaque bytes above 0x1F through, so the ASCII
        // check has to happen here
        if !config.accept_language.is_ascii() {
            return Err(FetchError::Config(
                "accept_language must be ASCII".to_string(),
            ));
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::Config(format!("accept_language: {}", e)))?,
        );

        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_timeout,
        })
    }

    /// Fetch one result page and return its HTML body.
    pub async fn get_html(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();
        if !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
            && !content_type.contains("text/plain")
        {
            return Err(FetchError::InvalidContentType(content_type));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_BODY_BYTES {
                return Err(FetchError::ContentTooLarge(len as usize));
            }
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        if body.len() > MAX_BODY_BYTES {
            return Err(FetchError::ContentTooLarge(body.len()));
        }

        Ok(body)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.request_timeout)
        } else {
            FetchError::Http(err)
        }
    }
}
