use serde::{Deserialize, Serialize};

use crate::model::Condition;

/// Coarse semantic class of a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionClass {
    Clear,
    Rain,
    Other,
}

impl ConditionClass {
    /// Classify a WMO code or a provider label. Unknown input is `Other`.
    pub fn classify(condition: &Condition) -> Self {
        match condition {
            Condition::Code(code) => Self::from_wmo_code(*code),
            Condition::Label(label) => Self::from_label(label),
        }
    }

    /// Like [`ConditionClass::classify`], but measurable precipitation turns an
    /// unclassified, non-frozen condition into rain.
    pub fn classify_observation(condition: &Condition, precipitation_mm: f64) -> Self {
        match Self::classify(condition) {
            Self::Other if precipitation_mm > 0.0 && !is_frozen(condition) => Self::Rain,
            class => class,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Rain => "rain",
            Self::Other => "other",
        }
    }

    fn from_wmo_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Clear,
            // drizzle, freezing drizzle, rain, freezing rain, rain showers
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => Self::Rain,
            _ => Self::Other,
        }
    }

    fn from_label(label: &str) -> Self {
        let label = label.trim();
        if let Ok(code) = label.parse::<i32>() {
            return Self::from_wmo_code(code);
        }

        let lower = label.to_lowercase();
        if lower.contains("clear") {
            Self::Clear
        } else if lower.contains("snow") || lower.contains("sleet") {
            Self::Other
        } else if lower.contains("drizzle") || lower.contains("rain") {
            Self::Rain
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for ConditionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_frozen(condition: &Condition) -> bool {
    match condition {
        Condition::Code(code) => matches!(code, 71 | 73 | 75 | 77 | 85 | 86),
        Condition::Label(label) => {
            let lower = label.to_lowercase();
            lower.contains("snow") || lower.contains("sleet")
        }
    }
}
