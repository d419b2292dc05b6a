//! Overlap resolution.
//!
//! Local greedy walk over start-sorted candidates. Not globally optimal: a
//! different removal order could keep a higher-confidence set.

use clinyx_common::EntitySpan;

/// Collapse candidates into a start-ascending, non-overlapping list.
///
/// A candidate that overlaps nothing is kept. One that overlaps exactly one
/// retained span replaces it only with strictly higher confidence, so ties go
/// to the first-encountered span. One that overlaps several is dropped.
pub fn resolve_overlaps(mut candidates: Vec<EntitySpan>) -> Vec<EntitySpan> {
    if candidates.is_empty() {
        return candidates;
    }

    // Stable: equal starts keep scan order
    candidates.sort_by_key(|span| span.start);

    let mut retained: Vec<EntitySpan> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let overlapping: Vec<usize> = retained
            .iter()
            .enumerate()
            .filter(|(_, existing)| candidate.overlaps(existing))
            .map(|(idx, _)| idx)
            .collect();

        match overlapping.as_slice() {
            [] => retained.push(candidate),
            [idx] => {
                if candidate.confidence > retained[*idx].confidence {
                    retained[*idx] = candidate;
                }
            }
            // Cannot occur with start-sorted input
            _ => {}
        }
    }

    retained
}
