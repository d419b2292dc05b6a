//! Clinical entity extraction from free-text notes.
//!
//! Deterministic pattern matching over a curated vocabulary: span detection,
//! overlap resolution, contextual attributes (negation, temporal framing,
//! severity), normalization with coding-system lookup, and pairwise relation
//! inference. No models, no network, no files.
//!
//! # Example
//!
//! ```rust,no_run
//! use clinyx_ner::{EngineConfig, ExtractionEngine};
//!
//! fn main() -> Result<(), clinyx_ner::EngineError> {
//!     let engine = ExtractionEngine::new(EngineConfig::default());
//!     engine.initialize()?;
//!
//!     let result = engine.extract_entities("Denies chest pain.", Some("note-1"))?;
//!     for entity in &result.entities {
//!         println!("{} [{}] {:.2}", entity.text, entity.category, entity.confidence);
//!     }
//!     Ok(())
//! }
//! ```

pub mod assemble;
pub mod batch;
pub mod codes;
pub mod context;
pub mod engine;
pub mod history;
pub mod normalise;
pub mod offset;
pub mod overlap;
pub mod patterns;
pub mod relations;
pub mod scanner;

pub use batch::{BatchCoordinator, Document};
pub use codes::CodeRegistry;
pub use context::{AnnotatedSpan, ContextFindings, ContextualAnnotator};
pub use engine::ExtractionEngine;
pub use history::HistoryCache;
pub use normalise::Normaliser;
pub use patterns::PatternRegistry;
pub use scanner::{RegexScanner, SpanScanner};

pub use clinyx_common::{
    EngineConfig, EntityAttributes, EntityCategory, EntityCode, EntityExtractionResult,
    EntityRelation, EntitySpan, NormalizedEntity, RelationType,
};

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Extraction engine is not initialized")]
    NotInitialized,

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid base confidence {confidence} for pattern {pattern:?}")]
    InvalidConfidence { pattern: String, confidence: f64 },

    #[error("Extraction failed for document {id}: {reason}")]
    DocumentFailed { id: String, reason: String },
}
