use std::time::Duration;

use hls_adfilter::AdFilterConfig;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::retry::RetryPolicy;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// Configurable options for playlist loading
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Overall timeout for a single request
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// User agent string
    pub user_agent: String,

    /// Custom HTTP headers for requests
    pub headers: HeaderMap,

    /// Custom query parameters appended to every request
    pub params: Vec<(String, String)>,

    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,

    /// Rewrite playlists through the ad filter
    pub filter_ads: bool,

    pub ad_filter: AdFilterConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: LoaderConfig::get_default_headers(),
            params: Vec::new(),
            retry: RetryPolicy::default(),
            filter_ads: true,
            ad_filter: AdFilterConfig::default(),
        }
    }
}

impl LoaderConfig {
    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "application/vnd.apple.mpegurl,application/x-mpegurl,*/*;q=0.8",
            ),
        );
        default_headers
    }

    /// Merges `headers` over the defaults, custom values winning.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT;

    #[test]
    fn custom_headers_override_defaults() {
        let mut custom = HeaderMap::new();
        custom.insert(ACCEPT, HeaderValue::from_static("*/*"));
        custom.insert("referer", HeaderValue::from_static("https://example.com/"));

        let config = LoaderConfig::default().with_headers(custom);

        assert_eq!(config.headers.get(ACCEPT).unwrap(), "*/*");
        assert_eq!(config.headers.get("referer").unwrap(), "https://example.com/");
        assert!(config.headers.contains_key(reqwest::header::ACCEPT_ENCODING));
    }
}
