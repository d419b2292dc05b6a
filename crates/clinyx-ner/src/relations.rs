//! Pairwise relation inference from category co-occurrence.
//!
//! Proximity is measured start-to-start, regardless of entity length.
//! Pair enumeration is O(n²); clinical notes carry tens of entities.

use clinyx_common::{EntityCategory, EntityRelation, EntitySpan, RelationType};

/// Directed rule table: (earlier entity category, later entity category) → relation.
pub const RELATION_RULES: &[(EntityCategory, EntityCategory, RelationType)] = &[
    (EntityCategory::Disease, EntityCategory::Symptom, RelationType::HasSymptom),
    (EntityCategory::Disease, EntityCategory::Medication, RelationType::TreatedWith),
    (EntityCategory::Symptom, EntityCategory::Anatomy, RelationType::LocatedIn),
    (EntityCategory::Procedure, EntityCategory::Anatomy, RelationType::PerformedOn),
    (EntityCategory::Test, EntityCategory::Disease, RelationType::Diagnoses),
];

/// Look up the relation for an ordered category pair.
pub fn relation_for(first: EntityCategory, second: EntityCategory) -> Option<RelationType> {
    RELATION_RULES
        .iter()
        .find(|(a, b, _)| *a == first && *b == second)
        .map(|(_, _, rel)| *rel)
}

/// Emit one relation per pair of spans within `window` characters (start to
/// start) whose ordered categories appear in the rule table.
///
/// `spans` must be start-sorted, as the overlap resolver returns them.
pub fn infer_relations(spans: &[EntitySpan], window: usize, confidence: f64) -> Vec<EntityRelation> {
    let mut relations = Vec::new();

    for (i, first) in spans.iter().enumerate() {
        for second in spans.iter().skip(i + 1) {
            if first.start.abs_diff(second.start) > window {
                continue;
            }
            if let Some(relation_type) = relation_for(first.category, second.category) {
                relations.push(EntityRelation {
                    source_entity: first.text.clone(),
                    target_entity: second.text.clone(),
                    relation_type,
                    confidence,
                });
            }
        }
    }

    relations
}
