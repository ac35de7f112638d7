//! Decides which segments of a playlist are advertisements.
//!
//! Pass A trusts explicit signals: cue blocks and deny-listed URLs. Pass B
//! looks only at the shape of what is left (short, discontinuous or
//! foreign-hosted runs of segments). No pass ever removes the single longest
//! group.

use crate::config::AdFilterConfig;
use crate::manifest::{LineKind, Manifest, Segment, SegmentGroup};
use serde::Serialize;
use std::fmt;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdRule {
    CueBlock,
    DenyListedHost,
    DenyListedPath,
    PreRoll,
    MidRoll,
    ForeignShortClip,
}

impl AdRule {
    /// Same spelling as the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            AdRule::CueBlock => "cue_block",
            AdRule::DenyListedHost => "deny_listed_host",
            AdRule::DenyListedPath => "deny_listed_path",
            AdRule::PreRoll => "pre_roll",
            AdRule::MidRoll => "mid_roll",
            AdRule::ForeignShortClip => "foreign_short_clip",
        }
    }
}

impl fmt::Display for AdRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdDecision {
    pub rule: AdRule,
    /// Ordinals of the removed segments.
    pub segments: Vec<usize>,
    pub duration: f64,
    /// Heuristic group index, for group-level rules.
    pub group: Option<usize>,
    /// Filter pass that made the decision. Ordinals refer to that pass's input.
    pub pass: usize,
}

impl AdDecision {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub reference_domain: Option<String>,
    pub decisions: Vec<AdDecision>,
    /// Groups seen by the heuristic pass, after explicit removals.
    pub groups: Vec<SegmentGroup>,
    removed_lines: Vec<bool>,
    /// First line removed by a shape rule.
    heuristic_from: Option<usize>,
}

impl Classification {
    pub fn removed_lines(&self) -> &[bool] {
        &self.removed_lines
    }

    pub fn ad_duration(&self) -> f64 {
        self.decisions.iter().map(|d| d.duration).sum()
    }

    pub fn ad_segments(&self) -> usize {
        self.decisions.iter().map(AdDecision::segment_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        !self.removed_lines.iter().any(|removed| *removed)
    }

    pub fn decision_for_group(&self, group: usize) -> Option<&AdDecision> {
        self.decisions.iter().find(|d| d.group == Some(group))
    }

    /// Whether a shape rule removed anything before line `end`.
    pub fn heuristic_removal_before(&self, end: usize) -> bool {
        self.heuristic_from.is_some_and(|line| line < end)
    }
}

/// The most frequent segment host, ties going to the host seen first.
/// Falls back to the host of the playlist itself.
pub fn reference_domain(manifest: &Manifest<'_>, source: Option<&Url>) -> Option<String> {
    most_frequent_host(manifest.segments().iter(), source)
}

fn most_frequent_host<'m>(
    segments: impl Iterator<Item = &'m Segment>,
    source: Option<&Url>,
) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for host in segments.filter_map(Segment::host) {
        match counts.iter_mut().find(|(seen, _)| *seen == host) {
            Some((_, count)) => *count += 1,
            None => counts.push((host, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (host, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((host, count));
        }
    }

    best.map(|(host, _)| host.to_string())
        .or_else(|| source.and_then(Url::host_str).map(str::to_string))
}

pub struct Classifier<'c> {
    config: &'c AdFilterConfig,
}

impl<'c> Classifier<'c> {
    pub fn new(config: &'c AdFilterConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, manifest: &Manifest<'_>, source: Option<&Url>) -> Classification {
        let mut removed = vec![false; manifest.lines().len()];
        let mut decisions = Vec::new();

        if self.config.cue_markers {
            self.remove_cue_blocks(manifest, &mut removed, &mut decisions);
        }
        if self.config.deny_list {
            self.remove_deny_listed(manifest, &mut removed, &mut decisions);
        }

        // Explicit ads do not get a say in what the main host is.
        let reference = most_frequent_host(
            manifest
                .segments()
                .iter()
                .filter(|segment| !removed[segment.uri_line]),
            source,
        );
        let groups = manifest.group_retained(&removed, reference.as_deref());
        let heuristic_from = if self.config.heuristics {
            self.remove_by_shape(manifest, &groups, &mut removed, &mut decisions)
        } else {
            None
        };

        Classification {
            reference_domain: reference,
            decisions,
            groups,
            removed_lines: removed,
            heuristic_from,
        }
    }

    fn remove_cue_blocks(
        &self,
        manifest: &Manifest<'_>,
        removed: &mut [bool],
        decisions: &mut Vec<AdDecision>,
    ) {
        let mut blocks: Vec<(usize, usize)> = Vec::new();
        let mut open: Option<usize> = None;

        for (index, line) in manifest.lines().iter().enumerate() {
            match line.kind {
                LineKind::CueOut | LineKind::Scte35 | LineKind::CueOutCont => {
                    open.get_or_insert(index);
                    removed[index] = true;
                }
                LineKind::CueIn => {
                    removed[index] = true;
                    if let Some(start) = open.take() {
                        blocks.push((start, index));
                    }
                }
                // The playlist ends here, and so does any break still open.
                LineKind::EndList => {
                    if let Some(start) = open.take() {
                        blocks.push((start, index));
                    }
                }
                _ => {
                    if open.is_some() {
                        removed[index] = true;
                    }
                }
            }
        }
        // An unterminated break runs to the end of the window.
        if let Some(start) = open {
            blocks.push((start, manifest.lines().len().saturating_sub(1)));
        }

        for (start, end) in blocks {
            let inside: Vec<&Segment> = manifest
                .segments()
                .iter()
                .filter(|s| (start..=end).contains(&s.uri_line))
                .collect();
            if inside.is_empty() {
                continue;
            }
            for segment in &inside {
                mark(removed, segment);
            }
            let decision = AdDecision {
                rule: AdRule::CueBlock,
                segments: inside.iter().map(|s| s.ordinal).collect(),
                duration: inside.iter().map(|s| s.duration).sum(),
                group: None,
                pass: 0,
            };
            debug!(
                lines = ?(start..=end),
                segments = decision.segment_count(),
                duration = decision.duration,
                "Cue block classified as advertisement"
            );
            decisions.push(decision);
        }
    }

    fn remove_deny_listed(
        &self,
        manifest: &Manifest<'_>,
        removed: &mut [bool],
        decisions: &mut Vec<AdDecision>,
    ) {
        for segment in manifest.segments() {
            if removed[segment.uri_line] {
                continue;
            }
            let rule = if segment
                .host()
                .is_some_and(|host| self.config.is_denied_host(host))
            {
                AdRule::DenyListedHost
            } else if segment
                .path()
                .and_then(|path| self.config.denied_path_keyword(path))
                .is_some()
            {
                AdRule::DenyListedPath
            } else {
                continue;
            };

            debug!(uri = %segment.uri, ?rule, "Deny-listed segment");
            mark(removed, segment);
            decisions.push(AdDecision {
                rule,
                segments: vec![segment.ordinal],
                duration: segment.duration,
                group: None,
                pass: 0,
            });
        }
    }

    /// Returns the first line removed.
    fn remove_by_shape(
        &self,
        manifest: &Manifest<'_>,
        groups: &[SegmentGroup],
        removed: &mut [bool],
        decisions: &mut Vec<AdDecision>,
    ) -> Option<usize> {
        let longest = longest_group(groups)?;
        let mut first_removed: Option<usize> = None;
        let longest_duration = groups[longest].total_duration;

        for group in groups.iter().filter(|g| g.index != longest) {
            let Some(rule) = self.match_shape(group, longest_duration) else {
                continue;
            };

            for &ordinal in &group.segments {
                let segment = &manifest.segments()[ordinal];
                mark(removed, segment);
                first_removed = first_removed.or(Some(segment.first_line()));
            }
            debug!(
                group = group.index,
                ?rule,
                duration = group.total_duration,
                segments = group.segment_count(),
                "Segment group classified as advertisement"
            );
            decisions.push(AdDecision {
                rule,
                segments: group.segments.clone(),
                duration: group.total_duration,
                group: Some(group.index),
                pass: 0,
            });
        }
        first_removed
    }

    fn match_shape(&self, group: &SegmentGroup, longest_duration: f64) -> Option<AdRule> {
        let duration = group.total_duration;
        let config = self.config;

        if group.index == 0 && group.starts_on_discontinuity && duration <= config.preroll_max_secs
        {
            Some(AdRule::PreRoll)
        } else if group.starts_on_discontinuity
            && duration <= config.midroll_max_secs
            && duration < longest_duration * config.midroll_max_ratio
        {
            Some(AdRule::MidRoll)
        } else if group.foreign_domain && duration <= config.foreign_max_secs {
            Some(AdRule::ForeignShortClip)
        } else {
            None
        }
    }
}

/// Index of the longest group, first one on ties.
fn longest_group(groups: &[SegmentGroup]) -> Option<usize> {
    let mut longest: Option<&SegmentGroup> = None;
    for group in groups {
        if longest.is_none_or(|best| group.total_duration > best.total_duration) {
            longest = Some(group);
        }
    }
    longest.map(|group| group.index)
}

fn mark(removed: &mut [bool], segment: &Segment) {
    for line in segment.line_indices() {
        removed[line] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SOURCE: &str = "https://cdn.example.com/vod/index.m3u8";

    fn classify(text: &str) -> Classification {
        let config = AdFilterConfig::default();
        let source = Url::parse(SOURCE).unwrap();
        let manifest = Manifest::parse(text, Some(&source));
        Classifier::new(&config).classify(&manifest, Some(&source))
    }

    fn segments(prefix: &str, count: usize, duration: f64) -> String {
        (0..count)
            .map(|i| format!("#EXTINF:{duration:.3},\n{prefix}{i}.ts\n"))
            .collect()
    }

    #[test]
    fn rule_names_match_serialized_form() {
        for rule in [
            AdRule::CueBlock,
            AdRule::DenyListedHost,
            AdRule::DenyListedPath,
            AdRule::PreRoll,
            AdRule::MidRoll,
            AdRule::ForeignShortClip,
        ] {
            assert_eq!(serde_json::to_value(rule).unwrap(), rule.to_string());
        }
    }

    #[test]
    fn reference_domain_prefers_most_frequent_then_first() {
        let text = format!(
            "#EXTM3U\n{}{}{}",
            segments("https://a.example.com/x", 2, 4.0),
            segments("https://b.example.com/x", 2, 4.0),
            segments("https://c.example.com/x", 1, 4.0),
        );
        let source = Url::parse(SOURCE).unwrap();
        let manifest = Manifest::parse(&text, Some(&source));
        assert_eq!(
            reference_domain(&manifest, Some(&source)).as_deref(),
            Some("a.example.com")
        );

        let empty = Manifest::parse("#EXTM3U\n", Some(&source));
        assert_eq!(
            reference_domain(&empty, Some(&source)).as_deref(),
            Some("cdn.example.com")
        );
    }

    #[test]
    fn cue_block_sums_durations_exactly() {
        let text = format!(
            "#EXTM3U\n{}#EXT-X-CUE-OUT:15\n#EXTINF:5.5,\nad0.ts\n#EXTINF:4.25,\nad1.ts\n#EXTINF:5.25,\nad2.ts\n#EXT-X-CUE-IN\n{}",
            segments("main", 10, 10.0),
            segments("tail", 10, 10.0),
        );
        let result = classify(&text);

        assert_eq!(result.ad_segments(), 3);
        assert_eq!(result.ad_duration(), 15.0);
        assert_eq!(result.decisions[0].rule, AdRule::CueBlock);
    }

    #[test]
    fn unterminated_cue_block_runs_to_end() {
        let text = format!(
            "#EXTM3U\n{}#EXT-X-CUE-OUT:30\n{}",
            segments("main", 4, 10.0),
            segments("ad", 2, 6.0)
        );
        let result = classify(&text);
        assert_eq!(result.ad_segments(), 2);
        assert_eq!(result.ad_duration(), 12.0);
    }

    #[test]
    fn deny_listed_segments_are_removed_individually() {
        let text = format!(
            "#EXTM3U\n{}#EXTINF:6,\nhttps://pubads.g.doubleclick.net/seg.ts\n#EXTINF:6,\nhttps://cdn.example.com/vast/seg.ts\n{}",
            segments("main", 3, 10.0),
            segments("tail", 3, 10.0)
        );
        let result = classify(&text);
        let rules: Vec<AdRule> = result.decisions.iter().map(|d| d.rule).collect();
        assert_eq!(rules, vec![AdRule::DenyListedHost, AdRule::DenyListedPath]);
        assert_eq!(result.ad_segments(), 2);
    }

    #[test]
    fn pre_roll_group_is_removed() {
        let text = format!(
            "#EXTM3U\n#EXT-X-DISCONTINUITY\n{}{}",
            segments("pre", 3, 4.0),
            segments("main", 8, 225.0)
        );
        let result = classify(&text);
        // Without a discontinuity between them both runs form one group.
        assert!(result.is_empty());

        let text = format!(
            "#EXTM3U\n#EXT-X-DISCONTINUITY\n{}#EXT-X-DISCONTINUITY\n{}",
            segments("pre", 3, 4.0),
            segments("main", 8, 225.0)
        );
        let result = classify(&text);
        assert_eq!(result.decisions.len(), 1);
        assert_eq!(result.decisions[0].rule, AdRule::PreRoll);
        assert_eq!(result.decisions[0].segments, vec![0, 1, 2]);
    }

    #[rstest]
    #[case::stray_cue_in("#EXT-X-CUE-IN\n", 0)]
    #[case::head_break("#EXT-X-CUE-OUT:8\n#EXTINF:8.000,\nbreak0.ts\n#EXT-X-CUE-IN\n", 1)]
    fn pre_roll_rule_survives_explicit_removals_ahead(#[case] head: &str, #[case] first: usize) {
        let text = format!(
            "#EXTM3U\n{head}#EXT-X-DISCONTINUITY\n{}#EXT-X-DISCONTINUITY\n{}",
            segments("pre", 3, 4.0),
            segments("main", 8, 225.0)
        );
        let result = classify(&text);
        let pre_roll = result
            .decisions
            .iter()
            .find(|d| d.rule == AdRule::PreRoll)
            .expect("pre-roll should be detected");
        assert_eq!(pre_roll.segments, vec![first, first + 1, first + 2]);
        assert_eq!(result.ad_segments(), first + 3);
        assert!(result.heuristic_removal_before(text.lines().count()));
    }

    #[test]
    fn mid_roll_needs_to_be_small_relative_to_feature() {
        let short = format!(
            "#EXTM3U\n{}#EXT-X-DISCONTINUITY\n{}#EXT-X-DISCONTINUITY\n{}",
            segments("main", 10, 60.0),
            segments("mid", 3, 10.0),
            segments("rest", 10, 60.0)
        );
        let result = classify(&short);
        assert_eq!(result.decisions.len(), 1);
        assert_eq!(result.decisions[0].rule, AdRule::MidRoll);
        assert_eq!(result.decisions[0].group, Some(1));

        // 30s is under 35s but not under 10% of a 200s feature.
        let relative = format!(
            "#EXTM3U\n{}#EXT-X-DISCONTINUITY\n{}",
            segments("main", 10, 20.0),
            segments("mid", 3, 10.0)
        );
        assert!(classify(&relative).is_empty());
    }

    #[rstest]
    #[case(59.0, true)]
    #[case(60.0, true)]
    #[case(61.0, false)]
    fn foreign_clip_threshold(#[case] duration: f64, #[case] removed: bool) {
        let text = format!(
            "#EXTM3U\n{}#EXT-X-DISCONTINUITY\n#EXTINF:{duration:.1},\nhttps://other-cdn.example.org/clip.ts\n#EXT-X-DISCONTINUITY\n{}",
            segments("main", 10, 60.0),
            segments("rest", 10, 60.0)
        );
        let result = classify(&text);
        assert_eq!(!result.is_empty(), removed);
        if removed {
            assert_eq!(result.decisions[0].rule, AdRule::ForeignShortClip);
        }
    }

    #[test]
    fn longest_group_is_never_removed() {
        // Every group qualifies by shape, but the longest one stays.
        let text = format!(
            "#EXTM3U\n#EXT-X-DISCONTINUITY\n{}#EXT-X-DISCONTINUITY\n{}",
            segments("https://x.example.org/a", 1, 20.0),
            segments("https://y.example.org/b", 1, 10.0)
        );
        let result = classify(&text);
        assert_eq!(result.decisions.len(), 1);
        assert_eq!(result.decisions[0].group, Some(1));
    }

    #[test]
    fn disabled_heuristics_leave_groups_alone() {
        let config = AdFilterConfig {
            heuristics: false,
            ..AdFilterConfig::default()
        };
        let text = format!(
            "#EXTM3U\n#EXT-X-DISCONTINUITY\n{}#EXT-X-DISCONTINUITY\n{}",
            segments("pre", 3, 4.0),
            segments("main", 8, 225.0)
        );
        let source = Url::parse(SOURCE).unwrap();
        let manifest = Manifest::parse(&text, Some(&source));
        let result = Classifier::new(&config).classify(&manifest, Some(&source));
        assert!(result.is_empty());
        assert_eq!(result.groups.len(), 2);
    }
}
