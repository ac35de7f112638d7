// Ad-filtering decorator over the engine's playlist loader.
//
// Playlist-class responses are rewritten before the engine parses them, so the
// engine (and everything seeking or timing against it) only ever sees a
// playlist without ad segments. Media segments and keys are never touched.

use crate::config::LoaderConfig;
use crate::loader::{HttpLoader, LoaderContext, LoaderResponse, PlaylistLoader};
use crate::LoaderError;
use async_trait::async_trait;
use bytes::Bytes;
use hls_adfilter::{AdFilter, AdFilterConfig, FilterOutcome, PLAYLIST_SIGNATURE};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Running totals across every playlist seen by one loader.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterStats {
    pub playlists_seen: u64,
    pub playlists_filtered: u64,
    pub segments_removed: u64,
    pub seconds_removed: f64,
    /// Playlists passed through unmodified because filtering could not be
    /// applied safely.
    pub passthrough_fallbacks: u64,
}

pub struct AdFilteringLoader<L> {
    inner: L,
    filter: AdFilter,
    enabled: bool,
    stats: Mutex<FilterStats>,
}

impl AdFilteringLoader<HttpLoader> {
    /// HTTP loader that filters when `config.filter_ads` is set.
    pub fn http(config: LoaderConfig) -> Result<Self, LoaderError> {
        let ad_filter = config.ad_filter.clone();
        let enabled = config.filter_ads;
        let mut loader = Self::new(HttpLoader::new(config)?, ad_filter);
        loader.enabled = enabled;
        Ok(loader)
    }
}

impl<L: PlaylistLoader> AdFilteringLoader<L> {
    pub fn new(inner: L, config: AdFilterConfig) -> Self {
        Self {
            inner,
            filter: AdFilter::new(config),
            enabled: true,
            stats: Mutex::new(FilterStats::default()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn stats(&self) -> FilterStats {
        *self.stats.lock()
    }

    /// Filters a playlist body. Returns `None` when the body must be handed
    /// to the engine unchanged.
    pub fn filter_body(&self, source_url: &str, body: &[u8]) -> Option<(Bytes, FilterOutcome)> {
        let Ok(text) = std::str::from_utf8(body) else {
            debug!(url = source_url, "Playlist body is not UTF-8, passing through");
            self.stats.lock().passthrough_fallbacks += 1;
            return None;
        };
        if !text.contains(PLAYLIST_SIGNATURE) {
            return None;
        }

        self.stats.lock().playlists_seen += 1;
        let outcome = self.filter.filter(text, source_url);
        if !outcome.is_modified() {
            return None;
        }

        if m3u8_rs::parse_playlist_res(body).is_ok()
            && m3u8_rs::parse_playlist_res(outcome.filtered_text.as_bytes()).is_err()
        {
            warn!(
                url = source_url,
                "Filtered playlist no longer parses, passing original through"
            );
            self.stats.lock().passthrough_fallbacks += 1;
            return None;
        }

        {
            let mut stats = self.stats.lock();
            stats.playlists_filtered += 1;
            stats.segments_removed += outcome.ad_segments_removed as u64;
            stats.seconds_removed += outcome.ad_duration_seconds;
        }

        let body = Bytes::from(outcome.filtered_text.clone());
        Some((body, outcome))
    }
}

#[async_trait]
impl<L: PlaylistLoader> PlaylistLoader for AdFilteringLoader<L> {
    async fn load(
        &self,
        context: &LoaderContext,
        token: &CancellationToken,
    ) -> Result<LoaderResponse, LoaderError> {
        let mut response = self.inner.load(context, token).await?;
        if !self.enabled || !context.kind.is_playlist() {
            return Ok(response);
        }

        if let Some((body, outcome)) = self.filter_body(&response.url, &response.data) {
            debug!(
                url = %response.url,
                kind = ?context.kind,
                removed = outcome.ad_segments_removed,
                "Serving filtered playlist"
            );
            response.data = body;
        }
        Ok(response)
    }
}
