//! Entity normalisation.
//!
//! Canonicalises surface text (case, whitespace, abbreviations) into the form
//! the code registry is keyed by, then attaches codes and attributes.
//!
//! Abbreviation rules run in table order and each sees the previous rule's
//! output, so `t2dm` becomes `type 2 dm` and then `type 2 diabetes mellitus`.

use regex::Regex;

use clinyx_common::{
    Certainty, EntityAttributes, EntityCategory, EntityCode, Laterality, NormalizedEntity,
};

use crate::codes::CodeRegistry;
use crate::context::AnnotatedSpan;
use crate::patterns::compile_bounded;
use crate::Result;

/// Ordered abbreviation expansions. Order is significant.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("t2dm", "type 2 dm"),
    ("t1dm", "type 1 dm"),
    ("mi", "myocardial infarction"),
    ("htn", "hypertension"),
    ("dm", "diabetes mellitus"),
    ("sob", "shortness of breath"),
    ("cad", "coronary artery disease"),
    ("chf", "congestive heart failure"),
    ("copd", "chronic obstructive pulmonary disease"),
    ("afib", "atrial fibrillation"),
    ("ckd", "chronic kidney disease"),
    ("uti", "urinary tract infection"),
    ("gerd", "gastroesophageal reflux disease"),
    ("cva", "cerebrovascular accident"),
    ("hfref", "heart failure with reduced ef"),
    ("ef", "ejection fraction"),
    ("ekg", "electrocardiogram"),
    ("ecg", "electrocardiogram"),
    ("cbc", "complete blood count"),
    ("hba1c", "hemoglobin a1c"),
    ("cabg", "coronary artery bypass graft"),
];

/// Laterality keywords, in priority order.
const LATERALITY: [Laterality; 3] = [Laterality::Left, Laterality::Right, Laterality::Bilateral];

#[derive(Debug, Clone)]
pub struct Normaliser {
    abbreviations: Vec<(Regex, String)>,
}

impl Normaliser {
    /// Normaliser with the built-in abbreviation table.
    pub fn builtin() -> Result<Self> {
        Self::with_abbreviations(ABBREVIATIONS)
    }

    pub fn with_abbreviations(table: &[(&str, &str)]) -> Result<Self> {
        let abbreviations = table
            .iter()
            .map(|(abbr, expansion)| Ok((compile_bounded(&regex::escape(abbr))?, expansion.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { abbreviations })
    }

    /// Lowercase, trim, collapse whitespace, expand abbreviations.
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let mut out = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

        for (re, expansion) in &self.abbreviations {
            if re.is_match(&out) {
                out = re.replace_all(&out, regex::NoExpand(expansion)).into_owned();
            }
        }

        out
    }

    /// Exact-match code lookup; unknown text yields no codes.
    pub fn attach_codes(&self, codes: &CodeRegistry, normalized_text: &str) -> Vec<EntityCode> {
        codes.lookup(normalized_text)
    }

    /// Laterality from the raw span text; everything else from the annotator.
    pub fn derive_attributes(&self, annotated: &AnnotatedSpan, normalized_text: &str) -> EntityAttributes {
        let laterality = detect_laterality(&annotated.span.text);
        let findings = &annotated.findings;

        let anatomical_site = (annotated.span.category == EntityCategory::Anatomy).then(|| {
            match laterality {
                Some(side) => normalized_text
                    .split(' ')
                    .filter(|word| *word != side.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
                None => normalized_text.to_string(),
            }
        });

        EntityAttributes {
            negated: Some(findings.negated),
            temporal: findings.temporal,
            certainty: Some(if findings.negated { Certainty::Negated } else { Certainty::Affirmed }),
            severity: findings.severity,
            laterality,
            anatomical_site,
        }
    }

    /// Build the normalized record for one annotated span.
    pub fn normalize_entity(&self, annotated: &AnnotatedSpan, codes: &CodeRegistry) -> NormalizedEntity {
        let normalized_text = self.normalize(&annotated.span.text);
        let codes = self.attach_codes(codes, &normalized_text);
        let attributes = self.derive_attributes(annotated, &normalized_text);

        NormalizedEntity {
            original_text: annotated.span.text.clone(),
            normalized_text,
            entity_type: annotated.span.category,
            confidence: annotated.span.confidence,
            codes,
            attributes,
        }
    }
}

/// First of `left`, `right`, `bilateral` occurring as a substring of the span.
pub fn detect_laterality(span_text: &str) -> Option<Laterality> {
    let lowered = span_text.to_lowercase();
    LATERALITY.into_iter().find(|side| lowered.contains(side.as_str()))
}
