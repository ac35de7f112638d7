//! Rebuilds playlist text from a [`Classification`].

use crate::classifier::Classification;
use crate::manifest::{DISCONTINUITY_TAG, GapIndex, LineKind, Manifest, Segment};

/// Writes out every line that survives `classification`.
///
/// Discontinuity markers are normalised only in the stretches around
/// retained segments that actually lost lines. Such a stretch between two
/// retained segments keeps exactly one marker when it had one before (reusing
/// a surviving marker, otherwise synthesising one). The stretch before the
/// first retained segment does the same unless a shape rule removed a group
/// in it, in which case it keeps none, as does the stretch after the last
/// retained segment. Untouched stretches are copied verbatim.
pub fn rewrite(manifest: &Manifest<'_>, classification: &Classification) -> String {
    let removed = classification.removed_lines();
    if classification.is_empty() {
        return manifest.source().to_string();
    }

    let lines = manifest.lines();
    let gaps = GapIndex::new(manifest, removed);
    let retained: Vec<&Segment> = manifest
        .segments()
        .iter()
        .filter(|s| !removed[s.uri_line])
        .collect();

    let mut drop_marker = vec![false; lines.len()];
    let mut synthesize_before = vec![false; lines.len()];

    for k in 0..=retained.len() {
        let start = if k == 0 { 0 } else { retained[k - 1].uri_line + 1 };
        let end = retained.get(k).map_or(lines.len(), |s| s.inf_line);
        if start >= end || !gaps.lost(start, end) {
            continue;
        }

        let markers: Vec<usize> = (start..end)
            .filter(|&i| lines[i].kind == LineKind::Discontinuity)
            .collect();
        let keeps_one = if k == 0 {
            !retained.is_empty() && !classification.heuristic_removal_before(end)
        } else {
            k < retained.len()
        };

        let keep = if keeps_one && !markers.is_empty() {
            let survivor = markers.iter().copied().find(|&i| !removed[i]);
            if survivor.is_none() {
                synthesize_before[retained[k].first_line()] = true;
            }
            survivor
        } else {
            None
        };

        for marker in markers {
            if Some(marker) != keep {
                drop_marker[marker] = true;
            }
        }
    }

    let mut out = String::with_capacity(manifest.source().len());
    for (index, line) in lines.iter().enumerate() {
        if synthesize_before[index] {
            out.push_str(DISCONTINUITY_TAG);
            out.push_str(manifest.line_ending());
        }
        if removed[index] || drop_marker[index] {
            continue;
        }
        out.push_str(line.raw);
    }
    out
}
