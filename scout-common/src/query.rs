use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Bbox;

/// Structured hints handed over by the upstream interpretation layer.
///
/// Every field is optional; the planner decides which combinations are
/// sufficient. Free text is limited to `aoi_hint` and `cloud_phrase`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerHint {
    pub bbox: Option<Bbox>,
    pub aoi_hint: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub cloud_cover_max: Option<f64>,
    pub cloud_phrase: Option<String>,
    pub collections: Option<Vec<String>>,
    /// Signed so that zero and negative requests can be rejected explicitly
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// STAC interval string, e.g. "2023-06-01T00:00:00Z/2023-08-31T23:59:59Z"
    pub fn to_interval(&self) -> String {
        format!(
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_interval())
    }
}

/// A fully specified scene search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub bbox: Bbox,
    pub datetime_range: TimeRange,
    /// Inclusive upper bound, percent
    pub cloud_cover_max: f64,
    pub collections: Vec<String>,
    pub limit: u32,
}

/// A broken [`SearchQuery`] invariant, naming the field at fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryViolation {
    pub field: &'static str,
    pub reason: String,
}

impl std::fmt::Display for QueryViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl SearchQuery {
    /// First invariant violated by this query, checked in field order.
    pub fn violation(&self) -> Option<QueryViolation> {
        if let Some(reason) = self.bbox.violation() {
            return Some(QueryViolation { field: "bbox", reason });
        }
        if self.datetime_range.start >= self.datetime_range.end {
            return Some(QueryViolation {
                field: "datetime_range",
                reason: format!(
                    "start ({}) must be before end ({})",
                    self.datetime_range.start, self.datetime_range.end
                ),
            });
        }
        if !(0.0..=100.0).contains(&self.cloud_cover_max) {
            return Some(QueryViolation {
                field: "cloud_cover_max",
                reason: format!("{} is outside [0, 100]", self.cloud_cover_max),
            });
        }
        if self.collections.is_empty() {
            return Some(QueryViolation {
                field: "collections",
                reason: "at least one collection is required".to_string(),
            });
        }
        if self.limit == 0 {
            return Some(QueryViolation {
                field: "limit",
                reason: "must be a positive integer".to_string(),
            });
        }
        None
    }
}
