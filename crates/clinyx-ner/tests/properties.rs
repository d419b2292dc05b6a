use proptest::prelude::*;

use clinyx_ner::overlap::resolve_overlaps;
use clinyx_ner::{EngineConfig, EntityCategory, EntitySpan, ExtractionEngine, Normaliser};

const VOCAB: &[&str] = &[
    "chest pain", "pain", "chest", "no", "denies", "history of", "MI", "HTN", "T2DM", "SOB",
    "mild", "severe", "left knee", "lisinopril", "fever", "x-ray", "chest x-ray", "HFrEF",
    "HbA1c", "cough", "will", "currently", "and", ",", ".", "the", "patient",
];

fn note() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 0..25).prop_map(|words| words.join(" "))
}

fn candidate() -> impl Strategy<Value = EntitySpan> {
    (0usize..200, 1usize..30, 1u32..=10).prop_map(|(start, len, c)| EntitySpan {
        text: "x".repeat(len),
        category: EntityCategory::Symptom,
        start,
        end: start + len,
        confidence: f64::from(c) / 10.0,
    })
}

proptest! {
    #[test]
    fn resolved_spans_never_overlap(candidates in prop::collection::vec(candidate(), 0..40)) {
        let kept = resolve_overlaps(candidates);
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                prop_assert!(!(a.start < b.end && b.start < a.end));
            }
        }
    }

    #[test]
    fn resolved_spans_are_start_sorted(candidates in prop::collection::vec(candidate(), 0..40)) {
        let kept = resolve_overlaps(candidates);
        prop_assert!(kept.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn equal_confidence_keeps_first(start in 0usize..100, len in 2usize..20, shift in 0usize..2) {
        let first = EntitySpan {
            text: "first".to_string(),
            category: EntityCategory::Disease,
            start,
            end: start + len,
            confidence: 0.8,
        };
        let second = EntitySpan {
            text: "second".to_string(),
            category: EntityCategory::Symptom,
            start: start + shift,
            end: start + shift + len,
            confidence: 0.8,
        };
        let kept = resolve_overlaps(vec![first, second]);
        prop_assert_eq!(kept.len(), 1);
        prop_assert_eq!(kept[0].text.as_str(), "first");
    }

    #[test]
    fn normalize_is_idempotent(text in "[a-zA-Z0-9 ,./\t-]{0,60}") {
        let n = Normaliser::builtin().unwrap();
        let once = n.normalize(&text);
        prop_assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn normalize_is_idempotent_on_clinical_text(text in note()) {
        let n = Normaliser::builtin().unwrap();
        let once = n.normalize(&text);
        prop_assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn extraction_invariants_hold(text in note()) {
        let engine = ExtractionEngine::new(EngineConfig::default());
        engine.initialize().unwrap();
        let result = engine.extract_entities(&text, None).unwrap();

        let len = text.chars().count();
        for w in result.entities.windows(2) {
            prop_assert!(w[0].end <= w[1].start);
        }
        for e in &result.entities {
            prop_assert!(e.end <= len);
            prop_assert!((0.0..=1.0).contains(&e.confidence));
            let slice: String = text.chars().skip(e.start).take(e.end - e.start).collect();
            prop_assert_eq!(&slice, &e.text);
        }
        prop_assert_eq!(result.normalized_entities.len(), result.entities.len());
        prop_assert_eq!(result.metadata.total_entities_found, result.entities.len());
    }
}
