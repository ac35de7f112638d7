//! Line-level model of an HLS playlist.
//!
//! Every line is kept verbatim together with its terminator, so whatever the
//! filter does not remove is written back byte-for-byte. Recognition is purely
//! syntactic: unknown tags, comments and malformed lines are carried along
//! untouched.

use serde::Serialize;
use url::Url;

pub const DISCONTINUITY_TAG: &str = "#EXT-X-DISCONTINUITY";

/// Tags that describe the segment following them and are dropped with it.
const SEGMENT_TAGS: [&str; 4] = [
    "#EXT-X-BYTERANGE",
    "#EXT-X-PROGRAM-DATE-TIME",
    "#EXT-X-GAP",
    "#EXT-X-BITRATE",
];

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Header,
    Inf { duration: f64, title: String },
    Uri,
    Discontinuity,
    CueOut,
    CueOutCont,
    CueIn,
    Scte35,
    EndList,
    SegmentTag,
    Tag,
    Comment,
    Blank,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return Self::Blank;
        }
        if !line.starts_with('#') {
            return Self::Uri;
        }

        if line.starts_with("#EXTM3U") {
            Self::Header
        } else if let Some(rest) = line.strip_prefix("#EXTINF:") {
            parse_inf(rest)
        } else if line.starts_with("#EXT-X-DISCONTINUITY-SEQUENCE") {
            Self::Tag
        } else if line.starts_with(DISCONTINUITY_TAG) {
            Self::Discontinuity
        } else if line.starts_with("#EXT-X-CUE-OUT-CONT") {
            Self::CueOutCont
        } else if line.starts_with("#EXT-X-CUE-OUT") {
            Self::CueOut
        } else if line.starts_with("#EXT-X-CUE-IN") {
            Self::CueIn
        } else if line.starts_with("#EXT-X-SCTE35") {
            Self::Scte35
        } else if line.starts_with("#EXT-X-ENDLIST") {
            Self::EndList
        } else if SEGMENT_TAGS.iter().any(|tag| line.starts_with(tag)) {
            Self::SegmentTag
        } else if line.starts_with("#EXT") {
            Self::Tag
        } else {
            Self::Comment
        }
    }
}

fn parse_inf(rest: &str) -> LineKind {
    let (duration, title) = match rest.split_once(',') {
        Some((duration, title)) => (duration, title),
        None => (rest, ""),
    };
    let duration = duration
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    LineKind::Inf {
        duration,
        title: title.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// The line exactly as it appeared, terminator included.
    pub raw: &'a str,
    pub kind: LineKind,
}

impl Line<'_> {
    pub fn text(&self) -> &str {
        self.raw.trim_end_matches(['\r', '\n'])
    }
}

/// An `#EXTINF` + URI pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub ordinal: usize,
    pub duration: f64,
    pub uri: String,
    pub url: Option<Url>,
    pub inf_line: usize,
    pub uri_line: usize,
    /// Segment-scoped tag lines attached to this segment.
    pub tag_lines: Vec<usize>,
}

impl Segment {
    pub fn host(&self) -> Option<&str> {
        self.url.as_ref().and_then(|url| url.host_str())
    }

    pub fn path(&self) -> Option<&str> {
        self.url.as_ref().map(|url| url.path())
    }

    pub fn first_line(&self) -> usize {
        self.tag_lines
            .iter()
            .copied()
            .min()
            .map_or(self.inf_line, |tag| tag.min(self.inf_line))
    }

    pub fn line_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.tag_lines
            .iter()
            .copied()
            .chain([self.inf_line, self.uri_line])
    }
}

/// A run of segments between discontinuity markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentGroup {
    pub index: usize,
    /// Ordinals of the member segments.
    pub segments: Vec<usize>,
    pub total_duration: f64,
    pub starts_on_discontinuity: bool,
    pub foreign_domain: bool,
}

impl SegmentGroup {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[derive(Debug, Clone)]
pub struct Manifest<'a> {
    source: &'a str,
    lines: Vec<Line<'a>>,
    segments: Vec<Segment>,
    line_ending: &'static str,
}

impl<'a> Manifest<'a> {
    /// Parses `text`, resolving segment URIs against `base` when given.
    pub fn parse(text: &'a str, base: Option<&Url>) -> Self {
        let lines: Vec<Line<'a>> = text
            .split_inclusive('\n')
            .map(|raw| Line {
                raw,
                kind: LineKind::classify(raw),
            })
            .collect();

        let line_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };

        let mut segments = Vec::new();
        let mut pending_inf: Option<(usize, f64)> = None;
        let mut pending_tags = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            match &line.kind {
                LineKind::SegmentTag => pending_tags.push(index),
                LineKind::Inf { duration, .. } => pending_inf = Some((index, *duration)),
                LineKind::Uri => {
                    let Some((inf_line, duration)) = pending_inf.take() else {
                        // Variant URIs and stray lines are not segments.
                        pending_tags.clear();
                        continue;
                    };
                    let uri = line.text().trim().to_string();
                    let url = resolve(base, &uri);
                    segments.push(Segment {
                        ordinal: segments.len(),
                        duration,
                        uri,
                        url,
                        inf_line,
                        uri_line: index,
                        tag_lines: std::mem::take(&mut pending_tags),
                    });
                }
                _ => {}
            }
        }

        Self {
            source: text,
            lines,
            segments,
            line_ending,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn lines(&self) -> &[Line<'a>] {
        &self.lines
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    /// True when the first non-blank line is `#EXTM3U`.
    pub fn has_header(&self) -> bool {
        self.lines
            .iter()
            .find(|line| line.kind != LineKind::Blank)
            .is_some_and(|line| line.kind == LineKind::Header)
    }

    pub fn group_by_discontinuity(&self, reference_domain: Option<&str>) -> Vec<SegmentGroup> {
        let removed = vec![false; self.lines.len()];
        self.group_retained(&removed, reference_domain)
    }

    /// Groups the segments whose lines survive `removed`.
    ///
    /// A group opens on a discontinuity when any marker, removed or not, sits
    /// in the stretch ahead of its first segment. The rewriter keeps one
    /// marker in every such stretch that still has retained segments on both
    /// sides, and in the leading stretch unless a heuristic removal lies in it.
    pub(crate) fn group_retained(
        &self,
        removed: &[bool],
        reference_domain: Option<&str>,
    ) -> Vec<SegmentGroup> {
        let gaps = GapIndex::new(self, removed);
        let mut groups: Vec<SegmentGroup> = Vec::new();
        let mut previous_uri: Option<usize> = None;

        for segment in self.segments.iter().filter(|s| !removed[s.uri_line]) {
            let start = previous_uri.map_or(0, |uri| uri + 1);
            let opens = gaps.discontinuities(start, segment.inf_line) > 0;

            if previous_uri.is_none() || opens {
                groups.push(SegmentGroup {
                    index: groups.len(),
                    segments: Vec::new(),
                    total_duration: 0.0,
                    starts_on_discontinuity: opens,
                    foreign_domain: false,
                });
            }

            if let Some(group) = groups.last_mut() {
                group.segments.push(segment.ordinal);
                group.total_duration += segment.duration;
                if let (Some(reference), Some(host)) = (reference_domain, segment.host())
                    && !host.eq_ignore_ascii_case(reference)
                {
                    group.foreign_domain = true;
                }
            }
            previous_uri = Some(segment.uri_line);
        }

        groups
    }
}

fn resolve(base: Option<&Url>, uri: &str) -> Option<Url> {
    match base {
        Some(base) => base.join(uri).ok(),
        None => Url::parse(uri).ok(),
    }
}

/// Prefix counts over the line sequence, used to ask questions about the
/// stretch of lines between two segments in O(1).
pub(crate) struct GapIndex {
    discontinuities: Vec<usize>,
    removed: Vec<usize>,
}

impl GapIndex {
    pub(crate) fn new(manifest: &Manifest<'_>, removed: &[bool]) -> Self {
        let mut discontinuities = Vec::with_capacity(manifest.lines.len() + 1);
        let mut removed_counts = Vec::with_capacity(manifest.lines.len() + 1);
        discontinuities.push(0);
        removed_counts.push(0);

        for (index, line) in manifest.lines.iter().enumerate() {
            let disc = usize::from(line.kind == LineKind::Discontinuity);
            let gone = usize::from(removed[index]);
            discontinuities.push(discontinuities[index] + disc);
            removed_counts.push(removed_counts[index] + gone);
        }

        Self {
            discontinuities,
            removed: removed_counts,
        }
    }

    /// Discontinuity markers in `start..end`, removed or not.
    pub(crate) fn discontinuities(&self, start: usize, end: usize) -> usize {
        self.discontinuities[end] - self.discontinuities[start]
    }

    /// Whether any line in `start..end` is removed.
    pub(crate) fn lost(&self, start: usize, end: usize) -> bool {
        self.removed[end] > self.removed[start]
    }
}
