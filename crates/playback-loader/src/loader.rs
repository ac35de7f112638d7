// Playlist loading hook: the interface the ABR engine fetches resources through,
// plus the default HTTP implementation.

use crate::LoaderError;
use crate::config::LoaderConfig;
use crate::retry::retry_with_backoff;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Master or standalone media playlist.
    Manifest,
    /// Variant (quality level) playlist.
    Level,
    /// Alternate audio rendition playlist.
    AudioTrack,
    Segment,
    Key,
}

impl ResourceKind {
    pub fn is_playlist(self) -> bool {
        matches!(self, Self::Manifest | Self::Level | Self::AudioTrack)
    }
}

#[derive(Debug, Clone)]
pub struct LoaderContext {
    pub url: String,
    pub kind: ResourceKind,
}

impl LoaderContext {
    pub fn new(url: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoaderResponse {
    /// Final URL after redirects.
    pub url: String,
    pub data: Bytes,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait PlaylistLoader: Send + Sync {
    async fn load(
        &self,
        context: &LoaderContext,
        token: &CancellationToken,
    ) -> Result<LoaderResponse, LoaderError>;
}

/// Installs the process-wide rustls crypto provider once.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

pub struct HttpLoader {
    client: Client,
    config: LoaderConfig,
}

impl HttpLoader {
    pub fn new(config: LoaderConfig) -> Result<Self, LoaderError> {
        install_rustls_provider();
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        };
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(config.headers.clone())
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    async fn fetch_once(
        &self,
        url: &Url,
        kind: ResourceKind,
        token: &CancellationToken,
    ) -> Result<LoaderResponse, LoaderError> {
        let request = self
            .client
            .get(url.clone())
            .query(&self.config.params)
            .send();

        let response = tokio::select! {
            _ = token.cancelled() => return Err(LoaderError::Cancelled),
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::http_status(status, url.as_str()));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let data = response.bytes().await?;
        if kind.is_playlist() && data.iter().all(u8::is_ascii_whitespace) {
            return Err(LoaderError::InvalidContent {
                url: final_url,
                reason: "empty playlist body".to_string(),
            });
        }
        trace!(url = %final_url, bytes = data.len(), "Fetched resource");
        Ok(LoaderResponse {
            url: final_url,
            data,
            content_type,
        })
    }
}

#[async_trait]
impl PlaylistLoader for HttpLoader {
    async fn load(
        &self,
        context: &LoaderContext,
        token: &CancellationToken,
    ) -> Result<LoaderResponse, LoaderError> {
        let url = Url::parse(&context.url)
            .map_err(|e| LoaderError::invalid_url(&context.url, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoaderError::invalid_url(
                &context.url,
                format!("unsupported scheme `{}`", url.scheme()),
            ));
        }

        debug!(url = %url, kind = ?context.kind, "Loading resource");
        let url = &url;
        retry_with_backoff(&self.config.retry, context, token, move |_| {
            self.fetch_once(url, context.kind, token)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_playlists_are_playlist_kinds() {
        assert!(ResourceKind::Manifest.is_playlist());
        assert!(ResourceKind::Level.is_playlist());
        assert!(ResourceKind::AudioTrack.is_playlist());
        assert!(!ResourceKind::Segment.is_playlist());
        assert!(!ResourceKind::Key.is_playlist());
    }

    #[tokio::test]
    async fn rejects_unparseable_and_non_http_urls() {
        let loader = HttpLoader::new(LoaderConfig::default()).expect("client should build");
        let token = CancellationToken::new();

        let err = loader
            .load(&LoaderContext::new("not a url", ResourceKind::Manifest), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidUrl { .. }));

        let err = loader
            .load(
                &LoaderContext::new("ftp://example.com/index.m3u8", ResourceKind::Manifest),
                &token,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::InvalidUrl { .. }));
    }
}
