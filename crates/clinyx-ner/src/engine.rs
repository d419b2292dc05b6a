//! Extraction engine facade.
//!
//! Owns the initialized pipeline stages and the history cache. Single-document
//! extraction is synchronous and pure apart from the final history write;
//! batch extraction fans out through [`BatchCoordinator`].

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, info, instrument};

use clinyx_common::{EngineConfig, EntityExtractionResult, EntitySpan, NormalizedEntity};

use crate::assemble::assemble;
use crate::batch::{BatchCoordinator, Document};
use crate::codes::CodeRegistry;
use crate::context::ContextualAnnotator;
use crate::history::HistoryCache;
use crate::normalise::Normaliser;
use crate::overlap::resolve_overlaps;
use crate::patterns::{PatternRegistry, RegistryStats};
use crate::relations::infer_relations;
use crate::scanner::{RegexScanner, SpanScanner};
use crate::{EngineError, Result};

/// Stages built by `initialize`, shared read-only across extractions.
struct Pipeline {
    registry: Arc<PatternRegistry>,
    codes: CodeRegistry,
    scanner: Arc<dyn SpanScanner>,
    annotator: ContextualAnnotator,
    normaliser: Normaliser,
}

/// Clinical entity extraction engine.
///
/// Cheap to clone; clones share the pipeline and the history cache.
#[derive(Clone)]
pub struct ExtractionEngine {
    config: Arc<EngineConfig>,
    pipeline: Arc<RwLock<Option<Arc<Pipeline>>>>,
    history: HistoryCache,
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl ExtractionEngine {
    /// Uninitialized engine; call [`initialize`](Self::initialize) before extracting.
    pub fn new(config: EngineConfig) -> Self {
        let history = HistoryCache::new(config.history_capacity);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(RwLock::new(None)),
            history,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the built-in pattern, cue and code tables.
    pub fn initialize(&self) -> Result<()> {
        self.initialize_with(PatternRegistry::builtin()?, CodeRegistry::builtin())
    }

    /// Initialize with substitute tables, scanning with the regex scanner.
    pub fn initialize_with(&self, registry: PatternRegistry, codes: CodeRegistry) -> Result<()> {
        let registry = Arc::new(registry);
        let scanner = Arc::new(RegexScanner::new(Arc::clone(&registry)));
        self.install(registry, codes, scanner)
    }

    /// Initialize with substitute tables and a custom span scanner.
    pub fn initialize_with_scanner(
        &self,
        registry: PatternRegistry,
        codes: CodeRegistry,
        scanner: Arc<dyn SpanScanner>,
    ) -> Result<()> {
        self.install(Arc::new(registry), codes, scanner)
    }

    fn install(
        &self,
        registry: Arc<PatternRegistry>,
        codes: CodeRegistry,
        scanner: Arc<dyn SpanScanner>,
    ) -> Result<()> {
        let normaliser = Normaliser::builtin()?;
        let annotator = ContextualAnnotator::new(Arc::clone(&registry), self.config.context_window);
        let stats = registry.stats();

        let pipeline = Pipeline {
            registry,
            codes,
            scanner,
            annotator,
            normaliser,
        };
        let codes_loaded = pipeline.codes.len();

        *self.pipeline.write().unwrap_or_else(|p| p.into_inner()) = Some(Arc::new(pipeline));

        info!(
            entity_patterns = stats.entity_patterns,
            codes = codes_loaded,
            "Extraction engine initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.pipeline.read().unwrap_or_else(|p| p.into_inner()).is_some()
    }

    /// Counts of the loaded rule tables, if initialized.
    pub fn registry_stats(&self) -> Option<RegistryStats> {
        self.current().ok().map(|p| p.registry.stats())
    }

    fn current(&self) -> Result<Arc<Pipeline>> {
        self.pipeline
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or(EngineError::NotInitialized)
    }

    /// Extract entities, attributes, codes and relations from one document.
    ///
    /// Fails only with [`EngineError::NotInitialized`]; text with no matches
    /// yields an empty result. When `document_id` is given the result is
    /// stored in the history cache, replacing any earlier entry for that id.
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn extract_entities(
        &self,
        text: &str,
        document_id: Option<&str>,
    ) -> Result<EntityExtractionResult> {
        let pipeline = self.current()?;
        let start = Instant::now();

        let candidates = pipeline.scanner.scan(text);
        let candidate_count = candidates.len();
        let retained = resolve_overlaps(candidates);
        let annotated = pipeline.annotator.annotate(text, retained);

        let normalized: Vec<NormalizedEntity> = if self.config.enable_normalization {
            annotated
                .iter()
                .map(|a| pipeline.normaliser.normalize_entity(a, &pipeline.codes))
                .collect()
        } else {
            Vec::new()
        };

        let entities: Vec<EntitySpan> = annotated.into_iter().map(|a| a.span).collect();
        let relations = infer_relations(
            &entities,
            self.config.relation_window,
            self.config.relation_confidence,
        );

        let result = assemble(
            &self.config,
            document_id,
            entities,
            normalized,
            relations,
            start.elapsed(),
        );

        debug!(
            candidates = candidate_count,
            entities = result.entities.len(),
            relations = result.entity_relations.len(),
            confidence = result.confidence,
            "Extraction complete"
        );

        if let Some(id) = document_id {
            self.history.insert(id, result.clone());
        }

        Ok(result)
    }

    /// Extract every document concurrently. Never fails as a whole; see
    /// [`BatchCoordinator::run`].
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn batch_extract_entities(
        &self,
        documents: Vec<Document>,
    ) -> BTreeMap<String, EntityExtractionResult> {
        BatchCoordinator::new(self.config.max_concurrent_documents)
            .run(self, documents)
            .await
    }

    /// Last result stored for `document_id`.
    pub fn get_extraction_history(&self, document_id: &str) -> Option<EntityExtractionResult> {
        self.history.get(document_id)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drop all tables and the history cache. Extraction fails with
    /// `NotInitialized` until the engine is initialized again.
    pub fn cleanup(&self) {
        self.pipeline.write().unwrap_or_else(|p| p.into_inner()).take();
        self.history.clear();
        info!("Extraction engine cleaned up");
    }
}
