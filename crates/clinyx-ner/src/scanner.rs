//! Raw span detection.
//!
//! Every registered pattern is run independently over the text; patterns do
//! not de-duplicate against each other here, that is the overlap resolver's job.

use std::sync::Arc;

use clinyx_common::EntitySpan;

use crate::offset::SpanConverter;
use crate::patterns::PatternRegistry;

/// Produces raw candidate spans for a text.
pub trait SpanScanner: Send + Sync {
    /// Candidate spans with base confidence, in no particular order.
    fn scan(&self, text: &str) -> Vec<EntitySpan>;
}

/// Default scanner backed by the compiled pattern registry.
#[derive(Debug, Clone)]
pub struct RegexScanner {
    registry: Arc<PatternRegistry>,
}

impl RegexScanner {
    pub fn new(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }
}

impl SpanScanner for RegexScanner {
    fn scan(&self, text: &str) -> Vec<EntitySpan> {
        if text.is_empty() {
            return Vec::new();
        }

        let converter = SpanConverter::new(text);
        let mut spans = Vec::new();

        for (category, rule) in self.registry.entity_rules() {
            // find_iter yields non-overlapping matches of this one pattern
            for mat in rule.regex().find_iter(text) {
                if mat.start() == mat.end() {
                    continue;
                }
                spans.push(EntitySpan {
                    text: mat.as_str().to_string(),
                    category,
                    start: converter.byte_to_char(mat.start()),
                    end: converter.byte_to_char(mat.end()),
                    confidence: rule.base_confidence,
                });
            }
        }

        spans
    }
}
