//! Catalog search and match resolution

use crate::entities::{PartRecord, RecognitionResult, ResolvedMatch};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Case-insensitive substring search on part number or part name.
/// An empty term returns every record; catalog order is preserved.
pub fn search_parts<'a>(parts: &'a [PartRecord], term: &str) -> Vec<&'a PartRecord> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return parts.iter().collect();
    }

    parts
        .iter()
        .filter(|p| {
            p.part_number.to_lowercase().contains(&needle)
                || p.part_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Join model matches with catalog records.
///
/// Ids that do not resolve to a record are skipped. Scores are clamped into
/// `0..=100` and the result is ordered by descending score (stable). A part
/// named more than once keeps only its best entry.
pub fn resolve_matches<'a>(
    result: &'a RecognitionResult,
    catalog: &'a [PartRecord],
) -> Vec<ResolvedMatch<'a>> {
    let by_id: HashMap<&str, &PartRecord> = catalog.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut resolved: Vec<ResolvedMatch<'a>> = result
        .matches
        .iter()
        .filter_map(|m| match by_id.get(m.id.trim()).copied() {
            Some(part) => Some(ResolvedMatch {
                part,
                score: clamp_score(m.score),
                reason: m.reason.as_str(),
            }),
            None => {
                debug!(id = %m.id, "Skipping match that references no catalog record");
                None
            }
        })
        .collect();

    resolved.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen: HashSet<&'a str> = HashSet::new();
    resolved.retain(|m| {
        let part: &'a PartRecord = m.part;
        seen.insert(part.id.as_str())
    });
    resolved
}

fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
