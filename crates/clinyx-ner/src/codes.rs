//! Coding-system lookup keyed by normalized entity text.
//!
//! Build once at startup; share behind the engine's pipeline `Arc`.

use std::collections::HashMap;

use tracing::info;

use clinyx_common::EntityCode;

/// In-memory lookup from normalized text → external codes.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    lookup: HashMap<String, Vec<EntityCode>>,
}

const ICD10: &str = "ICD-10-CM";
const SNOMED: &str = "SNOMED-CT";
const RXNORM: &str = "RxNorm";
const LOINC: &str = "LOINC";

impl CodeRegistry {
    /// Empty registry, for substitute tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated from the built-in table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (text, system, code, display) in CODE_TABLE {
            let mut entry = EntityCode::new(system, code, display);
            if *system == ICD10 {
                entry = entry.with_version("2024");
            }
            registry.insert(text, entry);
        }
        info!("CodeRegistry loaded: {} terms, {} codes", registry.len(), registry.code_count());
        registry
    }

    /// Add a code under a normalized key. Multiple codes per key keep insertion order.
    pub fn insert(&mut self, normalized_text: &str, code: EntityCode) {
        self.lookup
            .entry(normalized_text.to_string())
            .or_default()
            .push(code);
    }

    /// Exact-match lookup. Unknown text yields an empty list, not an error.
    pub fn lookup(&self, normalized_text: &str) -> Vec<EntityCode> {
        self.lookup
            .get(normalized_text)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    fn code_count(&self) -> usize {
        self.lookup.values().map(Vec::len).sum()
    }
}

/// (normalized text, code system, code, display)
const CODE_TABLE: &[(&str, &str, &str, &str)] = &[
    // Diseases
    ("hypertension", ICD10, "I10", "Essential (primary) hypertension"),
    ("hypertension", SNOMED, "38341003", "Hypertensive disorder"),
    ("myocardial infarction", ICD10, "I21.9", "Acute myocardial infarction, unspecified"),
    ("myocardial infarction", SNOMED, "22298006", "Myocardial infarction"),
    ("diabetes mellitus", ICD10, "E11.9", "Type 2 diabetes mellitus without complications"),
    ("diabetes mellitus", SNOMED, "73211009", "Diabetes mellitus"),
    ("type 2 diabetes mellitus", ICD10, "E11.9", "Type 2 diabetes mellitus without complications"),
    ("type 2 diabetes mellitus", SNOMED, "44054006", "Diabetes mellitus type 2"),
    ("coronary artery disease", ICD10, "I25.10", "Atherosclerotic heart disease of native coronary artery"),
    ("coronary artery disease", SNOMED, "53741008", "Coronary arteriosclerosis"),
    ("congestive heart failure", ICD10, "I50.9", "Heart failure, unspecified"),
    ("congestive heart failure", SNOMED, "42343007", "Congestive heart failure"),
    ("heart failure", ICD10, "I50.9", "Heart failure, unspecified"),
    ("chronic obstructive pulmonary disease", ICD10, "J44.9", "Chronic obstructive pulmonary disease, unspecified"),
    ("chronic obstructive pulmonary disease", SNOMED, "13645005", "Chronic obstructive lung disease"),
    ("pneumonia", ICD10, "J18.9", "Pneumonia, unspecified organism"),
    ("pneumonia", SNOMED, "233604007", "Pneumonia"),
    ("atrial fibrillation", ICD10, "I48.91", "Unspecified atrial fibrillation"),
    ("atrial fibrillation", SNOMED, "49436004", "Atrial fibrillation"),
    ("chronic kidney disease", ICD10, "N18.9", "Chronic kidney disease, unspecified"),
    ("urinary tract infection", ICD10, "N39.0", "Urinary tract infection, site not specified"),
    ("gastroesophageal reflux disease", ICD10, "K21.9", "Gastro-esophageal reflux disease without esophagitis"),
    ("cerebrovascular accident", ICD10, "I63.9", "Cerebral infarction, unspecified"),
    ("stroke", ICD10, "I63.9", "Cerebral infarction, unspecified"),
    ("asthma", ICD10, "J45.909", "Unspecified asthma, uncomplicated"),
    ("hyperlipidemia", ICD10, "E78.5", "Hyperlipidemia, unspecified"),
    // Symptoms
    ("chest pain", ICD10, "R07.9", "Chest pain, unspecified"),
    ("chest pain", SNOMED, "29857009", "Chest pain"),
    ("shortness of breath", ICD10, "R06.02", "Shortness of breath"),
    ("shortness of breath", SNOMED, "267036007", "Dyspnea"),
    ("headache", ICD10, "R51.9", "Headache, unspecified"),
    ("headache", SNOMED, "25064002", "Headache"),
    ("fever", ICD10, "R50.9", "Fever, unspecified"),
    ("fever", SNOMED, "386661006", "Fever"),
    ("cough", ICD10, "R05.9", "Cough, unspecified"),
    ("nausea", ICD10, "R11.0", "Nausea"),
    ("abdominal pain", ICD10, "R10.9", "Unspecified abdominal pain"),
    ("dizziness", ICD10, "R42", "Dizziness and giddiness"),
    // Medications
    ("lisinopril", RXNORM, "29046", "lisinopril"),
    ("metformin", RXNORM, "6809", "metformin"),
    ("aspirin", RXNORM, "1191", "aspirin"),
    ("atorvastatin", RXNORM, "83367", "atorvastatin"),
    ("metoprolol", RXNORM, "6918", "metoprolol"),
    ("amlodipine", RXNORM, "17767", "amlodipine"),
    ("insulin", RXNORM, "5856", "insulin"),
    ("warfarin", RXNORM, "11289", "warfarin"),
    ("furosemide", RXNORM, "4603", "furosemide"),
    // Tests
    ("hemoglobin a1c", LOINC, "4548-4", "Hemoglobin A1c/Hemoglobin.total in Blood"),
    ("a1c", LOINC, "4548-4", "Hemoglobin A1c/Hemoglobin.total in Blood"),
    ("troponin", LOINC, "6598-7", "Troponin T.cardiac [Mass/volume] in Serum or Plasma"),
    ("complete blood count", LOINC, "58410-2", "CBC panel - Blood by Automated count"),
    ("lipid panel", LOINC, "57698-3", "Lipid panel with direct LDL - Serum or Plasma"),
    ("electrocardiogram", SNOMED, "29303009", "Electrocardiographic procedure"),
];
