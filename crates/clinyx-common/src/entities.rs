//! Core entity records produced by the clinical extraction engine.
//! Field names serialise as camelCase so HTTP and storage layers can emit them as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Entity category
// ---------------------------------------------------------------------------

/// Medical category an entity span is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Disease,
    Symptom,
    Medication,
    Procedure,
    Anatomy,
    Test,
}

impl EntityCategory {
    /// All categories, in pattern-table order.
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::Disease,
        EntityCategory::Symptom,
        EntityCategory::Medication,
        EntityCategory::Procedure,
        EntityCategory::Anatomy,
        EntityCategory::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Disease    => "DISEASE",
            EntityCategory::Symptom    => "SYMPTOM",
            EntityCategory::Medication => "MEDICATION",
            EntityCategory::Procedure  => "PROCEDURE",
            EntityCategory::Anatomy    => "ANATOMY",
            EntityCategory::Test       => "TEST",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// A character range in the source text tagged with a category and confidence.
///
/// `start`/`end` are half-open character (not byte) offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySpan {
    pub text: String,
    pub category: EntityCategory,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

impl EntitySpan {
    /// Half-open interval intersection, covering containment and partial overlap.
    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && self.end > other.start
    }
}

// ---------------------------------------------------------------------------
// Coding systems
// ---------------------------------------------------------------------------

/// A record in an external coding system (ICD-10, SNOMED-CT, RxNorm, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCode {
    pub code_system: String,
    pub code: String,
    pub display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl EntityCode {
    pub fn new(code_system: &str, code: &str, display: &str) -> Self {
        Self {
            code_system: code_system.to_string(),
            code: code.to_string(),
            display: display.to_string(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temporal {
    Past,
    Present,
    Future,
}

impl Temporal {
    /// Evaluation order for cue sets; the first matching set wins.
    pub const ORDER: [Temporal; 3] = [Temporal::Past, Temporal::Present, Temporal::Future];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Evaluation order for cue sets; the first matching set wins.
    pub const ORDER: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Laterality {
    Left,
    Right,
    Bilateral,
}

impl Laterality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Laterality::Left      => "left",
            Laterality::Right     => "right",
            Laterality::Bilateral => "bilateral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certainty {
    Affirmed,
    Negated,
}

/// Derived attributes attached to a normalized entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<Temporal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certainty: Option<Certainty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laterality: Option<Laterality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anatomical_site: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalized entity / relation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntity {
    pub original_text: String,
    pub normalized_text: String,
    pub entity_type: EntityCategory,
    pub confidence: f64,
    pub codes: Vec<EntityCode>,
    pub attributes: EntityAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    HasSymptom,
    TreatedWith,
    LocatedIn,
    PerformedOn,
    Diagnoses,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::HasSymptom  => "has_symptom",
            RelationType::TreatedWith => "treated_with",
            RelationType::LocatedIn   => "located_in",
            RelationType::PerformedOn => "performed_on",
            RelationType::Diagnoses   => "diagnoses",
        }
    }
}

/// A labelled pair of nearby entities, referenced by surface text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRelation {
    pub source_entity: String,
    pub target_entity: String,
    pub relation_type: RelationType,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Result aggregate
// ---------------------------------------------------------------------------

/// Configuration values echoed into each result for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionParameters {
    pub confidence_threshold: f64,
    pub enable_normalization: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub total_entities_found: usize,
    pub entity_type_distribution: BTreeMap<EntityCategory, usize>,
    pub average_confidence: f64,
    pub processing_model: String,
    pub extraction_parameters: ExtractionParameters,
}

/// Everything one `extract` call produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityExtractionResult {
    pub extraction_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub entities: Vec<EntitySpan>,
    pub normalized_entities: Vec<NormalizedEntity>,
    pub entity_relations: Vec<EntityRelation>,
    pub confidence: f64,
    pub metadata: ExtractionMetadata,
    pub processing_time_ms: u64,
    pub extracted_at: DateTime<Utc>,
}

/// Processing model recorded on placeholder results for failed batch documents.
pub const ERROR_PROCESSING_MODEL: &str = "error";

impl EntityExtractionResult {
    /// Zero-value result substituted for a document that failed inside a batch.
    pub fn failed(document_id: &str, parameters: ExtractionParameters) -> Self {
        Self {
            extraction_id: Uuid::new_v4(),
            document_id: Some(document_id.to_string()),
            entities: Vec::new(),
            normalized_entities: Vec::new(),
            entity_relations: Vec::new(),
            confidence: 0.0,
            metadata: ExtractionMetadata {
                total_entities_found: 0,
                entity_type_distribution: BTreeMap::new(),
                average_confidence: 0.0,
                processing_model: ERROR_PROCESSING_MODEL.to_string(),
                extraction_parameters: parameters,
            },
            processing_time_ms: 0,
            extracted_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.metadata.processing_model == ERROR_PROCESSING_MODEL
    }
}
