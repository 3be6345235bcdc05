//! Cloud cover rules: qualitative phrase table and where a threshold came from
use serde::Serialize;
use std::collections::HashMap;

use crate::config::CloudPhraseRule;
use crate::module::aoi::normalize_hint;

/// Which rule produced `cloud_cover_max`, highest precedence first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CloudCoverSource {
    Explicit,
    Phrase { phrase: String },
    AoiDefault { aoi_id: String },
    DurationDefault { days: i64 },
}

impl std::fmt::Display for CloudCoverSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloudCoverSource::Explicit => write!(f, "explicit threshold"),
            CloudCoverSource::Phrase { phrase } => write!(f, "phrase '{}'", phrase),
            CloudCoverSource::AoiDefault { aoi_id } => write!(f, "default for AOI '{}'", aoi_id),
            CloudCoverSource::DurationDefault { days } => {
                write!(f, "default for a {}-day range", days)
            }
        }
    }
}

/// Phrase -> threshold lookup, matched after the same normalization as AOI
/// names, so "cloud free" and "Cloud-Free" hit the same rule.
#[derive(Debug, Clone, Default)]
pub struct CloudPhraseTable {
    thresholds: HashMap<String, f64>,
}

impl CloudPhraseTable {
    /// Later rules overwrite earlier ones for the same phrase.
    pub fn from_rules(rules: &[CloudPhraseRule]) -> Self {
        let mut thresholds = HashMap::new();
        for rule in rules {
            for phrase in &rule.phrases {
                let key = normalize_hint(phrase);
                if key.is_empty() {
                    continue;
                }
                if let Some(prev) = thresholds.insert(key, rule.cloud_cover_max) {
                    tracing::warn!(
                        "Cloud phrase '{}' redefined: {} -> {}",
                        phrase,
                        prev,
                        rule.cloud_cover_max
                    );
                }
            }
        }
        Self { thresholds }
    }

    pub fn lookup(&self, phrase: &str) -> Option<f64> {
        self.thresholds.get(&normalize_hint(phrase)).copied()
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}
