//! HTTP client configuration

use serde::{Deserialize, Serialize};

/// Settings for the shared HTTP client all adapters fetch through.
///
/// The defaults present a realistic browser identity and a French language
/// preference, since every source is a French-market listing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Accept-Language header sent with every request
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// Whole-request timeout in seconds; expiry is a transient fetch error
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum redirects followed per request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_user_agent() -> String {
    super::DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    "fr-FR,fr;q=0.9".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}
