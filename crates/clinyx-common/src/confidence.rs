//! Confidence arithmetic for extracted entities.
//! Contextual modifiers are multiplicative on top of a pattern's base confidence.

/// Multiplier applied when a negation cue is in scope.
pub const NEGATION_FACTOR: f64 = 0.7;

/// Multiplier applied when the finding is framed as historical.
pub const PAST_TEMPORAL_FACTOR: f64 = 0.9;

/// Contextual findings that may modify a base confidence.
#[derive(Debug, Clone, Default)]
pub struct ContextModifiers {
    pub negated: bool,
    pub past: bool,
}

/// Apply contextual modifiers to a base confidence.
/// Entities are only down-weighted, never dropped. Returns value in [0.0, 1.0].
pub fn adjust_confidence(base: f64, mods: &ContextModifiers) -> f64 {
    let mut confidence = base;

    if mods.negated {
        confidence *= NEGATION_FACTOR;
    }

    if mods.past {
        confidence *= PAST_TEMPORAL_FACTOR;
    }

    confidence.clamp(0.0, 1.0)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean rounded to two decimals; 0 for an empty slice.
pub fn mean_confidence(confidences: &[f64]) -> f64 {
    if confidences.is_empty() {
        return 0.0;
    }
    round2(confidences.iter().sum::<f64>() / confidences.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_penalty() {
        let mods = ContextModifiers { negated: true, ..Default::default() };
        let c = adjust_confidence(0.85, &mods);
        assert!((c - 0.595).abs() < 1e-9);
    }

    #[test]
    fn test_past_penalty() {
        let mods = ContextModifiers { past: true, ..Default::default() };
        let c = adjust_confidence(0.9, &mods);
        assert!((c - 0.81).abs() < 1e-9);
    }

    #[test]
    fn test_modifiers_compose() {
        let mods = ContextModifiers { negated: true, past: true };
        let c = adjust_confidence(1.0, &mods);
        assert!((c - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_no_modifiers_is_identity() {
        assert_eq!(adjust_confidence(0.75, &ContextModifiers::default()), 0.75);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean_confidence(&[]), 0.0);
    }

    #[test]
    fn test_mean_rounds_to_two_decimals() {
        // (0.81 + 0.595 + 0.9) / 3 = 0.768333...
        assert_eq!(mean_confidence(&[0.81, 0.595, 0.9]), 0.77);
    }
}
