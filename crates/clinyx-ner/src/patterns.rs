//! Pattern registry: entity rules per category plus negation, temporal and
//! severity cue sets.
//!
//! Every pattern is compiled case-insensitive and wrapped in word boundaries,
//! so a match can never be a substring of a larger word. Pattern confidences
//! were tuned against exactly those semantics.

use regex::Regex;
use tracing::info;

use clinyx_common::{EntityCategory, Severity, Temporal};

use crate::{EngineError, Result};

/// One compiled entity rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: String,
    pub base_confidence: f64,
    regex: Regex,
}

impl PatternRule {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Holds all rule tables. Built once at initialization, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    entity_rules: Vec<(EntityCategory, Vec<PatternRule>)>,
    negation_cues: Vec<Regex>,
    temporal_cues: Vec<(Temporal, Vec<Regex>)>,
    severity_cues: Vec<(Severity, Vec<Regex>)>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    pub entity_patterns: usize,
    pub negation_cues: usize,
    pub temporal_cues: usize,
    pub severity_cues: usize,
}

/// Compile `pattern` case-insensitive with word boundaries on both ends.
pub(crate) fn compile_bounded(pattern: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)\b(?:{})\b", pattern)).map_err(|source| {
        EngineError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })
}

impl PatternRegistry {
    /// Empty registry, for substitute tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated from the built-in clinical tables.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();

        for (category, rules) in ENTITY_TABLE {
            for (pattern, confidence) in *rules {
                registry.add_entity_pattern(*category, pattern, *confidence)?;
            }
        }
        for cue in NEGATION_CUES {
            registry.add_negation_cue(cue)?;
        }
        for (temporal, cues) in TEMPORAL_CUES {
            for cue in *cues {
                registry.add_temporal_cue(*temporal, cue)?;
            }
        }
        for (severity, cues) in SEVERITY_CUES {
            for cue in *cues {
                registry.add_severity_cue(*severity, cue)?;
            }
        }

        let stats = registry.stats();
        info!(
            "PatternRegistry loaded: {} entity patterns, {} negation / {} temporal / {} severity cues",
            stats.entity_patterns, stats.negation_cues, stats.temporal_cues, stats.severity_cues
        );

        Ok(registry)
    }

    /// Append an entity rule. Rules keep insertion order within a category.
    pub fn add_entity_pattern(
        &mut self,
        category: EntityCategory,
        pattern: &str,
        base_confidence: f64,
    ) -> Result<()> {
        if !(base_confidence > 0.0 && base_confidence <= 1.0) {
            return Err(EngineError::InvalidConfidence {
                pattern: pattern.to_string(),
                confidence: base_confidence,
            });
        }

        let rule = PatternRule {
            pattern: pattern.to_string(),
            base_confidence,
            regex: compile_bounded(pattern)?,
        };

        match self.entity_rules.iter_mut().find(|(c, _)| *c == category) {
            Some((_, rules)) => rules.push(rule),
            None => self.entity_rules.push((category, vec![rule])),
        }
        Ok(())
    }

    pub fn add_negation_cue(&mut self, pattern: &str) -> Result<()> {
        self.negation_cues.push(compile_bounded(pattern)?);
        Ok(())
    }

    pub fn add_temporal_cue(&mut self, temporal: Temporal, pattern: &str) -> Result<()> {
        let regex = compile_bounded(pattern)?;
        match self.temporal_cues.iter_mut().find(|(t, _)| *t == temporal) {
            Some((_, cues)) => cues.push(regex),
            None => self.temporal_cues.push((temporal, vec![regex])),
        }
        Ok(())
    }

    pub fn add_severity_cue(&mut self, severity: Severity, pattern: &str) -> Result<()> {
        let regex = compile_bounded(pattern)?;
        match self.severity_cues.iter_mut().find(|(s, _)| *s == severity) {
            Some((_, cues)) => cues.push(regex),
            None => self.severity_cues.push((severity, vec![regex])),
        }
        Ok(())
    }

    /// Entity rules grouped by category, categories in first-registered order.
    pub fn entity_rules(&self) -> impl Iterator<Item = (EntityCategory, &PatternRule)> {
        self.entity_rules
            .iter()
            .flat_map(|(category, rules)| rules.iter().map(move |rule| (*category, rule)))
    }

    pub fn is_negated(&self, window: &str) -> bool {
        self.negation_cues.iter().any(|re| re.is_match(window))
    }

    /// First temporal category, in `past, present, future` order, with a cue in `window`.
    pub fn temporal(&self, window: &str) -> Option<Temporal> {
        Temporal::ORDER.into_iter().find(|temporal| {
            self.temporal_cues
                .iter()
                .filter(|(t, _)| t == temporal)
                .any(|(_, cues)| cues.iter().any(|re| re.is_match(window)))
        })
    }

    /// First severity, in `mild, moderate, severe` order, with a cue in `window`.
    pub fn severity(&self, window: &str) -> Option<Severity> {
        Severity::ORDER.into_iter().find(|severity| {
            self.severity_cues
                .iter()
                .filter(|(s, _)| s == severity)
                .any(|(_, cues)| cues.iter().any(|re| re.is_match(window)))
        })
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            entity_patterns: self.entity_rules.iter().map(|(_, r)| r.len()).sum(),
            negation_cues: self.negation_cues.len(),
            temporal_cues: self.temporal_cues.iter().map(|(_, c)| c.len()).sum(),
            severity_cues: self.severity_cues.iter().map(|(_, c)| c.len()).sum(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in tables

const ENTITY_TABLE: &[(EntityCategory, &[(&str, f64)])] = &[
    (EntityCategory::Disease, &[
        ("hypertension|high blood pressure", 0.9),
        ("type [12] diabetes(?: mellitus)?|diabetes mellitus(?: type [12])?|diabetes", 0.9),
        ("myocardial infarction|heart attack", 0.9),
        ("coronary artery disease", 0.9),
        ("(?:congestive )?heart failure", 0.85),
        ("chronic obstructive pulmonary disease|emphysema", 0.9),
        ("pneumonia|sepsis", 0.9),
        ("atrial fibrillation", 0.85),
        ("stroke|cerebrovascular accident", 0.85),
        ("chronic kidney disease|acute kidney injury", 0.85),
        ("hyperlipidemia|hypercholesterolemia", 0.85),
        ("urinary tract infection", 0.85),
        ("gastroesophageal reflux disease", 0.85),
        ("asthma", 0.85),
        ("cancer|carcinoma|malignancy", 0.8),
        ("osteoarthritis|rheumatoid arthritis|arthritis", 0.8),
        ("depression|anxiety disorder", 0.75),
        ("mi|htn|dm|cad|chf|copd|afib|ckd|uti|gerd|cva", 0.75),
    ]),
    (EntityCategory::Symptom, &[
        ("chest pain", 0.85),
        ("shortness of breath|dyspnea", 0.85),
        ("abdominal pain", 0.85),
        ("headaches?|migraine", 0.8),
        ("back pain", 0.8),
        ("nausea|vomiting", 0.8),
        ("fever|chills", 0.8),
        ("cough", 0.8),
        ("dizziness|vertigo", 0.8),
        ("palpitations", 0.8),
        ("diarrhea|constipation", 0.8),
        ("fatigue|malaise", 0.75),
        ("swelling|edema", 0.75),
        ("rash", 0.75),
        ("weakness|numbness", 0.7),
        ("sob", 0.7),
        ("pain", 0.6),
    ]),
    (EntityCategory::Medication, &[
        ("lisinopril|enalapril|ramipril|losartan", 0.9),
        ("metformin|insulin|glipizide", 0.9),
        ("atorvastatin|simvastatin|rosuvastatin", 0.9),
        ("aspirin|clopidogrel|warfarin|apixaban|heparin", 0.9),
        ("metoprolol|atenolol|carvedilol", 0.9),
        ("amlodipine|hydrochlorothiazide|furosemide", 0.9),
        ("nitroglycerin", 0.9),
        ("albuterol|prednisone", 0.9),
        ("amoxicillin|azithromycin|ciprofloxacin|vancomycin|ceftriaxone", 0.9),
        ("ibuprofen|acetaminophen|morphine|oxycodone", 0.85),
        ("omeprazole|pantoprazole", 0.85),
        ("levothyroxine|sertraline|gabapentin", 0.85),
    ]),
    (EntityCategory::Procedure, &[
        ("coronary artery bypass graft(?:ing)?|cabg", 0.9),
        ("cardiac catheterization|angioplasty|stent placement", 0.9),
        ("appendectomy|cholecystectomy|colectomy|mastectomy", 0.9),
        ("(?:total )?(?:knee|hip) (?:replacement|arthroplasty)", 0.85),
        ("colonoscopy|endoscopy|bronchoscopy", 0.85),
        ("intubation|dialysis|transfusion", 0.85),
        ("biopsy", 0.8),
        ("surgery", 0.7),
    ]),
    (EntityCategory::Anatomy, &[
        ("(?:(?:left|right|bilateral) )?(?:knee|hip|shoulder|elbow|wrist|ankle|arm|leg|foot|hand|breast|lung|kidney|eye|ear)s?", 0.75),
        ("heart|liver|stomach|colon|brain|spine|abdomen|pancreas|thyroid", 0.7),
        ("chest|back|head|neck", 0.6),
    ]),
    (EntityCategory::Test, &[
        ("hemoglobin a1c|hba1c|a1c", 0.9),
        ("electrocardiogram|ekg|ecg", 0.9),
        ("troponin", 0.9),
        ("complete blood count|cbc", 0.85),
        ("(?:basic|comprehensive) metabolic panel|bmp|cmp", 0.85),
        ("chest x-ray|cxr", 0.85),
        ("ct scan|mri|ultrasound|echocardiogram", 0.85),
        ("lipid panel|urinalysis|blood cultures?", 0.85),
        ("x-ray", 0.8),
    ]),
];

const NEGATION_CUES: &[&str] = &[
    "no",
    "not",
    "denies",
    "denied",
    "deny",
    "without",
    "negative for",
    "absence of",
    "ruled out",
    "rules out",
    "free of",
    "never",
];

const TEMPORAL_CUES: &[(Temporal, &[&str])] = &[
    (Temporal::Past, &[
        "history of",
        "hx of",
        "h/o",
        "previous(?:ly)?",
        "prior",
        "past",
        "status post",
        "s/p",
        "resolved",
        "years ago",
    ]),
    (Temporal::Present, &[
        "currently",
        "current",
        "presents with",
        "presenting with",
        "today",
        "now",
        "ongoing",
        "active",
    ]),
    (Temporal::Future, &[
        "will",
        "plan(?:ned)? to",
        "scheduled for",
        "to start",
        "follow[- ]up",
        "consider",
    ]),
];

const SEVERITY_CUES: &[(Severity, &[&str])] = &[
    (Severity::Mild, &["mild(?:ly)?", "slight(?:ly)?", "minimal"]),
    (Severity::Moderate, &["moderate(?:ly)?"]),
    (Severity::Severe, &["severe(?:ly)?", "serious", "marked(?:ly)?", "intense", "excruciating"]),
];
