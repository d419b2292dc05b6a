//! Contextual attribute inference.
//!
//! Each retained span is inspected through a window of `radius` characters on
//! either side, clipped to the text and to the span's own clause. Clause
//! delimiters stop cues from leaking across list items and sentences
//! ("history of hypertension, denies chest pain").

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use clinyx_common::confidence::{adjust_confidence, ContextModifiers};
use clinyx_common::{EntitySpan, Severity, Temporal};

use crate::offset::SpanConverter;
use crate::patterns::PatternRegistry;

/// What the context window said about one span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFindings {
    pub negated: bool,
    pub temporal: Option<Temporal>,
    pub severity: Option<Severity>,
}

/// A retained span with its confidence adjusted and its context findings.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSpan {
    pub span: EntitySpan,
    pub findings: ContextFindings,
}

#[derive(Debug, Clone)]
pub struct ContextualAnnotator {
    registry: Arc<PatternRegistry>,
    radius: usize,
}

fn is_clause_delimiter(c: char) -> bool {
    matches!(c, '.' | ';' | ':' | ',' | '!' | '?' | '\n' | '\r')
}

impl ContextualAnnotator {
    pub fn new(registry: Arc<PatternRegistry>, radius: usize) -> Self {
        Self { registry, radius }
    }

    /// Annotate every span. Spans are never dropped, only down-weighted.
    pub fn annotate(&self, text: &str, spans: Vec<EntitySpan>) -> Vec<AnnotatedSpan> {
        let converter = SpanConverter::new(text);
        spans
            .into_iter()
            .map(|span| self.annotate_span(text, &converter, span))
            .collect()
    }

    fn annotate_span(&self, text: &str, converter: &SpanConverter, mut span: EntitySpan) -> AnnotatedSpan {
        let window = self.window(text, converter, &span);

        let findings = ContextFindings {
            negated: self.registry.is_negated(window),
            temporal: self.registry.temporal(window),
            severity: self.registry.severity(window),
        };

        let mods = ContextModifiers {
            negated: findings.negated,
            past: findings.temporal == Some(Temporal::Past),
        };
        span.confidence = adjust_confidence(span.confidence, &mods);

        AnnotatedSpan { span, findings }
    }

    /// The span plus up to `radius` chars either side, clipped to the text and
    /// to the nearest clause delimiters outside the span.
    pub fn window<'a>(&self, text: &'a str, converter: &SpanConverter, span: &EntitySpan) -> &'a str {
        let lo = span.start.saturating_sub(self.radius);
        let hi = (span.end + self.radius).min(converter.char_len());

        let before = converter.slice(text, lo, span.start);
        let after = converter.slice(text, span.end, hi);

        let start_byte = match before.rfind(is_clause_delimiter) {
            Some(idx) => {
                let delim_len = before[idx..].chars().next().map_or(1, char::len_utf8);
                converter.char_to_byte(lo) + idx + delim_len
            }
            None => converter.char_to_byte(lo),
        };
        let end_byte = match after.find(is_clause_delimiter) {
            Some(idx) => converter.char_to_byte(span.end) + idx,
            None => converter.char_to_byte(hi),
        };

        &text[start_byte..end_byte]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinyx_common::EntityCategory;

    fn annotator() -> ContextualAnnotator {
        ContextualAnnotator::new(Arc::new(PatternRegistry::builtin().unwrap()), 50)
    }

    fn span_of(text: &str, needle: &str, category: EntityCategory, confidence: f64) -> EntitySpan {
        let byte = text.find(needle).unwrap();
        let start = text[..byte].chars().count();
        EntitySpan {
            text: needle.to_string(),
            category,
            start,
            end: start + needle.chars().count(),
            confidence,
        }
    }

    const NOTE: &str = "Patient with history of hypertension, denies chest pain. Started on lisinopril 10mg daily.";

    #[test]
    fn test_window_clipped_to_clause() {
        let a = annotator();
        let conv = SpanConverter::new(NOTE);
        let htn = span_of(NOTE, "hypertension", EntityCategory::Disease, 0.9);
        assert_eq!(a.window(NOTE, &conv, &htn), "Patient with history of hypertension");
        let cp = span_of(NOTE, "chest pain", EntityCategory::Symptom, 0.85);
        assert_eq!(a.window(NOTE, &conv, &cp), " denies chest pain");
        let lis = span_of(NOTE, "lisinopril", EntityCategory::Medication, 0.9);
        assert_eq!(a.window(NOTE, &conv, &lis), " Started on lisinopril 10mg daily");
    }

    #[test]
    fn test_window_radius_clips_long_clause() {
        let a = ContextualAnnotator::new(Arc::new(PatternRegistry::new()), 5);
        let text = "aaaaaaaaaa cough bbbbbbbbbb";
        let conv = SpanConverter::new(text);
        let s = span_of(text, "cough", EntityCategory::Symptom, 0.8);
        assert_eq!(a.window(text, &conv, &s), "aaaa cough bbbb");
    }

    #[test]
    fn test_history_is_past_and_down_weighted() {
        let htn = span_of(NOTE, "hypertension", EntityCategory::Disease, 0.9);
        let out = annotator().annotate(NOTE, vec![htn]);
        assert_eq!(out[0].findings.temporal, Some(Temporal::Past));
        assert!(!out[0].findings.negated);
        assert!((out[0].span.confidence - 0.81).abs() < 1e-9);
    }

    #[test]
    fn test_negated_symptom() {
        let cp = span_of(NOTE, "chest pain", EntityCategory::Symptom, 0.85);
        let out = annotator().annotate(NOTE, vec![cp]);
        assert!(out[0].findings.negated);
        assert_eq!(out[0].findings.temporal, None);
        assert!((out[0].span.confidence - 0.595).abs() < 1e-9);
    }

    #[test]
    fn test_list_negation_stops_at_comma() {
        let text = "Denies fever, chills, cough or nausea.";
        let spans = ["fever", "chills", "cough", "nausea"]
            .into_iter()
            .map(|s| span_of(text, s, EntityCategory::Symptom, 0.8))
            .collect();
        let out = annotator().annotate(text, spans);

        assert!(out[0].findings.negated);
        assert!((out[0].span.confidence - 0.56).abs() < 1e-9);
        for a in &out[1..] {
            assert!(!a.findings.negated, "{} should not be negated", a.span.text);
            assert_eq!(a.span.confidence, 0.8);
        }
    }

    #[test]
    fn test_unmodified_medication() {
        let lis = span_of(NOTE, "lisinopril", EntityCategory::Medication, 0.9);
        let out = annotator().annotate(NOTE, vec![lis]);
        assert_eq!(out[0].findings, ContextFindings::default());
        assert_eq!(out[0].span.confidence, 0.9);
    }

    #[test]
    fn test_severity_does_not_adjust_confidence() {
        let text = "mild headache";
        let h = span_of(text, "headache", EntityCategory::Symptom, 0.8);
        let out = annotator().annotate(text, vec![h]);
        assert_eq!(out[0].findings.severity, Some(Severity::Mild));
        assert_eq!(out[0].span.confidence, 0.8);
    }

    #[test]
    fn test_present_and_future_do_not_adjust_confidence() {
        let text = "currently has cough";
        let c = span_of(text, "cough", EntityCategory::Symptom, 0.8);
        let out = annotator().annotate(text, vec![c]);
        assert_eq!(out[0].findings.temporal, Some(Temporal::Present));
        assert_eq!(out[0].span.confidence, 0.8);

        let text = "will start metformin";
        let m = span_of(text, "metformin", EntityCategory::Medication, 0.9);
        let out = annotator().annotate(text, vec![m]);
        assert_eq!(out[0].findings.temporal, Some(Temporal::Future));
        assert_eq!(out[0].span.confidence, 0.9);
    }

    #[test]
    fn test_window_handles_multibyte_text() {
        let text = "Naïve patient; no fièvre but cough.";
        let conv = SpanConverter::new(text);
        let c = span_of(text, "cough", EntityCategory::Symptom, 0.8);
        assert_eq!(annotator().window(text, &conv, &c), " no fièvre but cough");
    }
}
