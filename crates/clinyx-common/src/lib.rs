//! clinyx-common: shared types, errors, and configuration used across all Clinyx crates.

pub mod error;
pub mod entities;
pub mod confidence;
pub mod config;

// Re-export commonly used types
pub use config::EngineConfig;
pub use entities::{
    Certainty, EntityAttributes, EntityCategory, EntityCode, EntityExtractionResult,
    EntityRelation, EntitySpan, ExtractionMetadata, ExtractionParameters, Laterality,
    NormalizedEntity, RelationType, Severity, Temporal,
};
pub use error::{ClinyxError, Result};
