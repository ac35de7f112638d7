use serde::{Deserialize, Serialize};

/// Hosts that only ever serve advertising. Matched as the exact host or any
/// subdomain of it.
pub const DEFAULT_DENY_HOSTS: [&str; 10] = [
    "doubleclick.net",
    "googlesyndication.com",
    "googleadservices.com",
    "imasdk.googleapis.com",
    "fwmrm.net",
    "adnxs.com",
    "springserve.com",
    "spotxchange.com",
    "adsrvr.org",
    "advertising.com",
];

pub const DEFAULT_DENY_PATH_KEYWORDS: [&str; 5] = ["/ad/", "/ads/", "preroll", "vast", "vpaid"];

/// Tuning for the ad classifier.
///
/// The duration thresholds were picked empirically. They are exposed so they
/// can be evaluated against labelled data, not adjusted by feel: short cold
/// opens isolated by a discontinuity can be misclassified at the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdFilterConfig {
    /// Strip `CUE-OUT`/`SCTE35` … `CUE-IN` blocks.
    pub cue_markers: bool,
    /// Drop segments served from deny-listed hosts or paths.
    pub deny_list: bool,
    /// Apply the discontinuity-group heuristics.
    pub heuristics: bool,
    /// Longest first group still treated as a pre-roll.
    pub preroll_max_secs: f64,
    /// Longest discontinuity-opened group still treated as a mid-roll.
    pub midroll_max_secs: f64,
    /// A mid-roll must also be shorter than this fraction of the longest group.
    pub midroll_max_ratio: f64,
    /// Longest group with a foreign host still treated as an inserted clip.
    pub foreign_max_secs: f64,
    pub deny_hosts: Vec<String>,
    pub deny_path_keywords: Vec<String>,
}

impl Default for AdFilterConfig {
    fn default() -> Self {
        Self {
            cue_markers: true,
            deny_list: true,
            heuristics: true,
            preroll_max_secs: 35.0,
            midroll_max_secs: 35.0,
            midroll_max_ratio: 0.10,
            foreign_max_secs: 60.0,
            deny_hosts: DEFAULT_DENY_HOSTS.iter().map(|s| s.to_string()).collect(),
            deny_path_keywords: DEFAULT_DENY_PATH_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AdFilterConfig {
    pub fn is_denied_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.deny_hosts.iter().any(|denied| {
            let denied = denied.to_ascii_lowercase();
            host == denied
                || host
                    .strip_suffix(denied.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Returns the first deny-listed keyword found in `path`.
    pub fn denied_path_keyword(&self, path: &str) -> Option<&str> {
        let path = path.to_ascii_lowercase();
        self.deny_path_keywords
            .iter()
            .find(|keyword| path.contains(keyword.to_ascii_lowercase().as_str()))
            .map(String::as_str)
    }
}
