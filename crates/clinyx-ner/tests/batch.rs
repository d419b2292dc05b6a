use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use clinyx_ner::codes::CodeRegistry;
use clinyx_ner::{
    Document, EngineConfig, EntitySpan, ExtractionEngine, PatternRegistry, RegexScanner,
    SpanScanner,
};

const POISON: &str = "<<scanner-fault>>";

/// Regex scanner that panics on a marker string.
struct FaultyScanner {
    inner: RegexScanner,
}

impl SpanScanner for FaultyScanner {
    fn scan(&self, text: &str) -> Vec<EntitySpan> {
        if text.contains(POISON) {
            panic!("scanner fault");
        }
        self.inner.scan(text)
    }
}

/// Regex scanner that holds each call until `parties` calls are in flight
/// together, or until `patience` runs out.
struct RendezvousScanner {
    inner: RegexScanner,
    parties: usize,
    patience: Duration,
    arrived: Mutex<usize>,
    all_arrived: Condvar,
    met: Mutex<Vec<bool>>,
}

impl SpanScanner for RendezvousScanner {
    fn scan(&self, text: &str) -> Vec<EntitySpan> {
        let mut arrived = self.arrived.lock().unwrap();
        *arrived += 1;
        self.all_arrived.notify_all();
        let (arrived, _) = self
            .all_arrived
            .wait_timeout_while(arrived, self.patience, |n| *n < self.parties)
            .unwrap();
        let met = *arrived >= self.parties;
        drop(arrived);

        self.met.lock().unwrap().push(met);
        self.inner.scan(text)
    }
}

fn faulty_engine() -> ExtractionEngine {
    let registry = PatternRegistry::builtin().unwrap();
    let scanner = FaultyScanner {
        inner: RegexScanner::new(Arc::new(registry.clone())),
    };
    let engine = ExtractionEngine::new(EngineConfig::default());
    engine
        .initialize_with_scanner(registry, CodeRegistry::builtin(), Arc::new(scanner))
        .unwrap();
    engine
}

#[tokio::test]
async fn test_failing_document_gets_placeholder() {
    let engine = faulty_engine();
    let docs = vec![
        Document::new("doc-1", "Denies chest pain."),
        Document::new("doc-2", format!("cough {}", POISON)),
    ];

    let results = engine.batch_extract_entities(docs).await;

    assert_eq!(results.len(), 2);
    assert!(!results["doc-1"].is_error());
    assert_eq!(results["doc-1"].entities.len(), 1);

    let failed = &results["doc-2"];
    assert!(failed.entities.is_empty());
    assert_eq!(failed.confidence, 0.0);
    assert_eq!(failed.metadata.processing_model, "error");
    assert_eq!(failed.document_id.as_deref(), Some("doc-2"));
}

#[tokio::test]
async fn test_every_id_present() {
    let engine = faulty_engine();
    let docs: Vec<Document> = (0..25)
        .map(|i| {
            let text = if i % 5 == 0 { POISON.to_string() } else { format!("fever day {}", i) };
            Document::new(format!("doc-{:02}", i), text)
        })
        .collect();

    let results = engine.batch_extract_entities(docs).await;

    assert_eq!(results.len(), 25);
    for i in 0..25 {
        let result = &results[&format!("doc-{:02}", i)];
        assert_eq!(result.is_error(), i % 5 == 0);
    }
}

#[tokio::test]
async fn test_batch_writes_history() {
    let engine = faulty_engine();
    let docs = vec![
        Document::new("ok", "cough"),
        Document::new("bad", POISON),
    ];
    engine.batch_extract_entities(docs).await;

    assert!(engine.get_extraction_history("ok").is_some());
    // Placeholders are never stored
    assert!(engine.get_extraction_history("bad").is_none());
}

#[tokio::test]
async fn test_batch_matches_single_extraction() {
    let engine = faulty_engine();
    let text = "History of HTN, now with severe headache. Started metoprolol.";
    let single = engine.extract_entities(text, None).unwrap();
    let batch = engine
        .batch_extract_entities(vec![Document::new("x", text)])
        .await;
    assert_eq!(batch["x"].entities, single.entities);
    assert_eq!(batch["x"].entity_relations, single.entity_relations);
}

#[tokio::test]
async fn test_concurrency_of_one_still_completes() {
    let engine = ExtractionEngine::new(EngineConfig {
        max_concurrent_documents: 1,
        ..Default::default()
    });
    engine.initialize().unwrap();
    let docs = (0..10)
        .map(|i| Document::new(i.to_string(), "nausea and vomiting"))
        .collect();
    let results = engine.batch_extract_entities(docs).await;
    assert_eq!(results.len(), 10);
    assert!(results.values().all(|r| r.entities.len() == 2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_documents_are_extracted_concurrently() {
    let registry = PatternRegistry::builtin().unwrap();
    let scanner = Arc::new(RendezvousScanner {
        inner: RegexScanner::new(Arc::new(registry.clone())),
        parties: 2,
        patience: Duration::from_secs(5),
        arrived: Mutex::new(0),
        all_arrived: Condvar::new(),
        met: Mutex::new(Vec::new()),
    });
    let engine = ExtractionEngine::new(EngineConfig::default());
    engine
        .initialize_with_scanner(registry, CodeRegistry::builtin(), scanner.clone())
        .unwrap();

    let docs = vec![Document::new("a", "fever"), Document::new("b", "cough")];
    let results = tokio::time::timeout(
        Duration::from_secs(10),
        engine.batch_extract_entities(docs),
    )
    .await
    .expect("batch finished");

    assert_eq!(results.len(), 2);
    assert!(results.values().all(|r| !r.is_error() && r.entities.len() == 1));
    // Both scans were in flight at the same time
    assert_eq!(*scanner.met.lock().unwrap(), vec![true, true]);
}
