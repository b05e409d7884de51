use regex::Regex;
use std::sync::OnceLock;

/// Coarse three-level risk classification derived from the label text.
/// Labels matching neither keyword set fall back to `Low`; there is no
/// separate "unknown" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub(crate) fn for_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("high") || label.contains("critical") {
            return RiskTier::High;
        }
        if label.contains("moderate") || label.contains("medium") {
            return RiskTier::Moderate;
        }
        RiskTier::Low
    }

    pub(crate) fn level(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Moderate => "Moderate Risk",
            RiskTier::High => "High Risk",
        }
    }

    pub(crate) fn description(self) -> &'static str {
        match self {
            RiskTier::Low => "This prompt appears safe and benign.",
            RiskTier::Moderate => "This prompt may require attention.",
            RiskTier::High => "This prompt contains potentially harmful content.",
        }
    }

    pub(crate) fn glyph(self) -> &'static str {
        match self {
            RiskTier::Low => "[ok]",
            RiskTier::Moderate => "[!]",
            RiskTier::High => "[!!]",
        }
    }
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\((\d+)-(\d+)\)").expect("range pattern is valid"))
}

/// Upper bound of the `"(lo-hi)"` range annotation embedded in a label,
/// e.g. `"High-Critical (5-10)"` scores 10.0. Labels without the
/// annotation, including partial forms like `"(5-)"`, score 0.0.
pub(crate) fn extract_severity(label: &str) -> f64 {
    range_pattern()
        .captures(label)
        .and_then(|captures| captures.get(2))
        .and_then(|upper| upper.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_keywords_map_to_high_tier() {
        assert_eq!(RiskTier::for_label("High-Critical (5-10)"), RiskTier::High);
        assert_eq!(RiskTier::for_label("CRITICAL injection"), RiskTier::High);
        assert_eq!(RiskTier::for_label("somewhat highbrow"), RiskTier::High);
    }

    #[test]
    fn moderate_keywords_map_to_moderate_tier() {
        assert_eq!(RiskTier::for_label("Moderate (2-4)"), RiskTier::Moderate);
        assert_eq!(RiskTier::for_label("MEDIUM risk"), RiskTier::Moderate);
    }

    #[test]
    fn high_keywords_win_over_moderate() {
        assert_eq!(RiskTier::for_label("moderate-to-high"), RiskTier::High);
    }

    #[test]
    fn unmatched_labels_fall_back_to_low() {
        assert_eq!(RiskTier::for_label("Low-Risk"), RiskTier::Low);
        assert_eq!(RiskTier::for_label("benign"), RiskTier::Low);
        assert_eq!(RiskTier::for_label(""), RiskTier::Low);
    }

    #[test]
    fn severity_is_upper_bound_of_range() {
        assert_eq!(extract_severity("High-Critical (5-10)"), 10.0);
        assert_eq!(extract_severity("Moderate (2-4)"), 4.0);
    }

    #[test]
    fn severity_defaults_to_zero_without_range() {
        assert_eq!(extract_severity("Low-Risk"), 0.0);
        assert_eq!(extract_severity(""), 0.0);
        assert_eq!(extract_severity("(5-)"), 0.0);
    }

    #[test]
    fn severity_extraction_is_idempotent() {
        let label = "High-Critical (5-10)";
        assert_eq!(extract_severity(label), extract_severity(label));
    }
}
