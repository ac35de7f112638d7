//! # HLS ad filter
//!
//! Strips inserted advertisement segments from HLS playlists using only what
//! the playlist itself shows: explicit cue blocks, deny-listed URLs and the
//! shape of discontinuity-delimited segment groups.
//!
//! ## Component Overview
//!
//! - `manifest`: line-level playlist model and discontinuity grouping
//! - `classifier`: explicit and heuristic ad detection
//! - `rewriter`: rebuilds a playable playlist without the ad segments
//!
//! Filtering is pure and never fails; input that cannot be understood is
//! passed through unchanged.

pub mod classifier;
pub mod config;
pub mod manifest;
pub mod rewriter;

pub use classifier::{AdDecision, AdRule, Classification, Classifier, reference_domain};
pub use config::AdFilterConfig;
pub use manifest::{Line, LineKind, Manifest, Segment, SegmentGroup};
pub use rewriter::rewrite;

use serde::Serialize;
use tracing::{debug, info};
use url::Url;

/// Signature every playlist starts with.
pub const PLAYLIST_SIGNATURE: &str = "#EXTM3U";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub filtered_text: String,
    pub ad_duration_seconds: f64,
    pub ad_segments_removed: usize,
    pub reference_domain: Option<String>,
    pub decisions: Vec<AdDecision>,
}

impl FilterOutcome {
    pub fn is_modified(&self) -> bool {
        self.ad_segments_removed > 0 || !self.decisions.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdFilter {
    config: AdFilterConfig,
}

impl AdFilter {
    pub fn new(config: AdFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdFilterConfig {
        &self.config
    }

    /// Parses and classifies without rewriting.
    pub fn analyze<'a>(
        &self,
        manifest_text: &'a str,
        source_url: &str,
    ) -> (Manifest<'a>, Classification) {
        let source = Url::parse(source_url).ok();
        let manifest = Manifest::parse(manifest_text, source.as_ref());
        let classification = Classifier::new(&self.config).classify(&manifest, source.as_ref());
        (manifest, classification)
    }

    /// Filters until the output classifies clean.
    ///
    /// Removing a group can change which host dominates or which group comes
    /// first, so one pass may expose more ads. Repeating on the rewritten text
    /// until nothing more goes makes the result a fixed point: filtering it
    /// again removes nothing.
    pub fn filter(&self, manifest_text: &str, source_url: &str) -> FilterOutcome {
        let mut text = manifest_text.to_string();
        let mut decisions = Vec::new();
        let mut pass = 0;

        let reference_domain = loop {
            let (manifest, classification) = self.analyze(&text, source_url);
            if classification.is_empty() {
                break classification.reference_domain;
            }
            let rewritten = rewrite(&manifest, &classification);
            if rewritten.len() >= text.len() {
                break classification.reference_domain;
            }

            debug!(
                pass,
                segments = classification.ad_segments(),
                "Filter pass removed advertisement segments"
            );
            decisions.extend(classification.decisions.into_iter().map(|mut decision| {
                decision.pass = pass;
                decision
            }));
            text = rewritten;
            pass += 1;
        };

        let outcome = FilterOutcome {
            filtered_text: text,
            ad_duration_seconds: decisions.iter().map(|d| d.duration).sum(),
            ad_segments_removed: decisions.iter().map(AdDecision::segment_count).sum(),
            reference_domain,
            decisions,
        };

        if outcome.ad_segments_removed > 0 {
            info!(
                source = source_url,
                segments = outcome.ad_segments_removed,
                seconds = outcome.ad_duration_seconds,
                passes = pass,
                "Removed advertisement segments from playlist"
            );
        } else {
            debug!(source = source_url, "No advertisement segments found");
        }
        outcome
    }
}

/// Filters with the default configuration.
pub fn filter(manifest_text: &str, source_url: &str) -> FilterOutcome {
    AdFilter::default().filter(manifest_text, source_url)
}
