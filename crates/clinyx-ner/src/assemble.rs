//! Result assembly: aggregate confidence and distribution metadata.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use clinyx_common::confidence::mean_confidence;
use clinyx_common::{
    EngineConfig, EntityCategory, EntityExtractionResult, EntityRelation, EntitySpan,
    ExtractionMetadata, NormalizedEntity,
};

/// Count of retained spans per category.
pub fn type_distribution(spans: &[EntitySpan]) -> BTreeMap<EntityCategory, usize> {
    let mut distribution = BTreeMap::new();
    for span in spans {
        *distribution.entry(span.category).or_insert(0) += 1;
    }
    distribution
}

/// Build the result for one document.
pub fn assemble(
    config: &EngineConfig,
    document_id: Option<&str>,
    entities: Vec<EntitySpan>,
    normalized_entities: Vec<NormalizedEntity>,
    entity_relations: Vec<EntityRelation>,
    elapsed: Duration,
) -> EntityExtractionResult {
    let confidences: Vec<f64> = entities.iter().map(|e| e.confidence).collect();
    let confidence = mean_confidence(&confidences);

    let metadata = ExtractionMetadata {
        total_entities_found: entities.len(),
        entity_type_distribution: type_distribution(&entities),
        average_confidence: confidence,
        processing_model: config.processing_model.clone(),
        extraction_parameters: config.extraction_parameters(),
    };

    EntityExtractionResult {
        extraction_id: Uuid::new_v4(),
        document_id: document_id.map(str::to_string),
        entities,
        normalized_entities,
        entity_relations,
        confidence,
        metadata,
        processing_time_ms: elapsed.as_millis() as u64,
        extracted_at: Utc::now(),
    }
}
