//! Concurrent multi-document extraction with per-document failure isolation.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use clinyx_common::EntityExtractionResult;

use crate::engine::ExtractionEngine;
use crate::{EngineError, Result};

/// One input document for batch extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// Fans documents out to the blocking pool, at most `max_concurrent` at a time.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    max_concurrent: usize,
}

impl BatchCoordinator {
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent: max_concurrent.max(1) }
    }

    /// Extract every document. Never fails as a whole: a document whose
    /// extraction errors or panics is logged and replaced by a zero-value
    /// placeholder, so every input id is present in the output.
    ///
    /// Results are merged in input order, so for duplicate ids the last one wins.
    pub async fn run(
        &self,
        engine: &ExtractionEngine,
        documents: Vec<Document>,
    ) -> BTreeMap<String, EntityExtractionResult> {
        let start = Instant::now();
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        let tasks = documents.into_iter().map(|Document { id, text }| {
            let engine = engine.clone();
            let semaphore = Arc::clone(&semaphore);
            async move {
                let outcome = extract_one(engine, semaphore, &id, text).await;
                (id, outcome)
            }
        });
        let outcomes = futures::future::join_all(tasks).await;

        let parameters = engine.config().extraction_parameters();
        let mut results = BTreeMap::new();
        let mut failed = 0usize;

        for (id, outcome) in outcomes {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    warn!("Batch document {} failed: {}", id, e);
                    failed += 1;
                    EntityExtractionResult::failed(&id, parameters.clone())
                }
            };
            results.insert(id, result);
        }

        info!(
            total,
            failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch extraction complete"
        );

        results
    }
}

async fn extract_one(
    engine: ExtractionEngine,
    semaphore: Arc<Semaphore>,
    id: &str,
    text: String,
) -> Result<EntityExtractionResult> {
    let document_failed = |reason: String| EngineError::DocumentFailed { id: id.to_string(), reason };

    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| document_failed(e.to_string()))?;

    let task_id = id.to_string();
    tokio::task::spawn_blocking(move || engine.extract_entities(&text, Some(&task_id)))
        .await
        .map_err(|e| document_failed(e.to_string()))?
}
