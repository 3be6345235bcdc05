//! Query planner - turns resolved location + hints into a validated SearchQuery
//!
//! Rules are applied in a fixed order:
//! 1. bbox: explicit bbox, else a matched AOI
//! 2. time: explicit start and end, both required
//! 3. cloud cover: explicit > phrase table > AOI default > duration default
//! 4. collections: supported only, default to the first supported one
//! 5. limit: positive, default from config
//! 6. cross-validation of the finished query
//!
//! Nothing is clamped or reordered; every rule either yields a value or a
//! typed [`PlanError`] the caller can turn into a clarification request.

use chrono::Duration;

use scout_common::{Bbox, PlannerHint, ResolvedAoi, SearchQuery, TimeRange};

use super::cloud::{CloudCoverSource, CloudPhraseTable};
use crate::config::PlannerConfig;
use crate::error::{ConfigurationError, PlanError, PlanResult};

#[derive(Debug, Clone)]
pub struct QueryPlanner {
    phrases: CloudPhraseTable,
    supported_collections: Vec<String>,
    default_limit: u32,
    short_range: Duration,
    short_range_cloud_cover: f64,
    long_range_cloud_cover: f64,
}

impl Default for QueryPlanner {
    fn default() -> Self {
        let config = PlannerConfig::default();
        Self::with_short_range(&config, Duration::days(config.short_range_days))
    }
}

impl QueryPlanner {
    /// Fails on planner settings that no request could satisfy.
    pub fn new(config: &PlannerConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self::with_short_range(config, config.short_range()?))
    }

    fn with_short_range(config: &PlannerConfig, short_range: Duration) -> Self {
        Self {
            phrases: CloudPhraseTable::from_rules(&config.cloud_phrases),
            supported_collections: config.supported_collections.clone(),
            default_limit: config.default_limit,
            short_range,
            short_range_cloud_cover: config.short_range_cloud_cover,
            long_range_cloud_cover: config.long_range_cloud_cover,
        }
    }

    pub fn supported_collections(&self) -> &[String] {
        &self.supported_collections
    }

    pub fn plan(&self, aoi: Option<&ResolvedAoi>, hint: &PlannerHint) -> PlanResult<SearchQuery> {
        self.plan_with_rationale(aoi, hint).map(|(query, _)| query)
    }

    /// Like [`plan`](Self::plan), also reporting which rule set the cloud
    /// cover threshold.
    pub fn plan_with_rationale(
        &self,
        aoi: Option<&ResolvedAoi>,
        hint: &PlannerHint,
    ) -> PlanResult<(SearchQuery, CloudCoverSource)> {
        let bbox = self.select_bbox(aoi, hint)?;
        // an unmatched AOI contributes nothing past this point, not even a default
        let aoi = aoi.filter(|a| a.matched);

        let datetime_range = self.select_time_range(hint)?;
        let (cloud_cover_max, source) = self.select_cloud_cover(aoi, hint, &datetime_range)?;
        let collections = self.select_collections(hint)?;
        let limit = self.select_limit(hint)?;

        let query = SearchQuery {
            bbox,
            datetime_range,
            cloud_cover_max,
            collections,
            limit,
        };
        if let Some(violation) = query.violation() {
            return Err(violation.into());
        }

        tracing::debug!(
            "Planned query: bbox={} datetime={} cloud_cover_max={} ({}) collections={:?} limit={}",
            query.bbox,
            query.datetime_range,
            query.cloud_cover_max,
            source,
            query.collections,
            query.limit
        );
        Ok((query, source))
    }

    fn select_bbox(&self, aoi: Option<&ResolvedAoi>, hint: &PlannerHint) -> PlanResult<Bbox> {
        if let Some(bbox) = hint.bbox {
            return Ok(bbox);
        }
        match aoi {
            Some(a) if a.matched => a.bbox.ok_or_else(|| {
                PlanError::UnresolvedLocation(format!(
                    "AOI {:?} has no bbox",
                    a.aoi_id.as_deref().unwrap_or_default()
                ))
            }),
            Some(a) => Err(PlanError::UnresolvedLocation(a.message.clone())),
            None => Err(PlanError::UnresolvedLocation(
                "no explicit bbox and no AOI hint; ask for a bounding box or a known area name"
                    .to_string(),
            )),
        }
    }

    fn select_time_range(&self, hint: &PlannerHint) -> PlanResult<TimeRange> {
        match (hint.time_start, hint.time_end) {
            (Some(start), Some(end)) => Ok(TimeRange::new(start, end)),
            (start, end) => {
                let missing = match (start, end) {
                    (None, None) => "time_start and time_end",
                    (None, Some(_)) => "time_start",
                    _ => "time_end",
                };
                Err(PlanError::AmbiguousTime(format!(
                    "{} missing; ask for an explicit date range",
                    missing
                )))
            }
        }
    }

    fn select_cloud_cover(
        &self,
        aoi: Option<&ResolvedAoi>,
        hint: &PlannerHint,
        range: &TimeRange,
    ) -> PlanResult<(f64, CloudCoverSource)> {
        let (value, source) = if let Some(explicit) = hint.cloud_cover_max {
            (explicit, CloudCoverSource::Explicit)
        } else if let Some((value, phrase)) = self.phrase_threshold(hint) {
            (value, CloudCoverSource::Phrase { phrase })
        } else if let Some((value, aoi_id)) = aoi.and_then(|a| {
            a.default_cloud_cover
                .map(|v| (v, a.aoi_id.clone().unwrap_or_default()))
        }) {
            (value, CloudCoverSource::AoiDefault { aoi_id })
        } else {
            let duration = range.duration();
            let value = if duration <= self.short_range {
                self.short_range_cloud_cover
            } else {
                self.long_range_cloud_cover
            };
            (value, CloudCoverSource::DurationDefault { days: duration.num_days() })
        };

        if !(0.0..=100.0).contains(&value) {
            return Err(PlanError::OutOfRange {
                field: "cloud_cover_max",
                value,
            });
        }
        Ok((value, source))
    }

    fn phrase_threshold(&self, hint: &PlannerHint) -> Option<(f64, String)> {
        let phrase = hint.cloud_phrase.as_deref()?.trim();
        if phrase.is_empty() {
            return None;
        }
        match self.phrases.lookup(phrase) {
            Some(value) => Some((value, phrase.to_string())),
            None => {
                tracing::warn!("Unknown cloud phrase '{}', falling back to defaults", phrase);
                None
            }
        }
    }

    fn select_collections(&self, hint: &PlannerHint) -> PlanResult<Vec<String>> {
        let requested = hint.collections.as_deref().unwrap_or_default();
        if requested.is_empty() {
            return Ok(self.supported_collections.iter().take(1).cloned().collect());
        }

        let mut collections: Vec<String> = Vec::with_capacity(requested.len());
        for name in requested {
            let wanted = name.trim().to_lowercase();
            let supported = self
                .supported_collections
                .iter()
                .find(|s| s.to_lowercase() == wanted)
                .ok_or_else(|| PlanError::UnsupportedCollection(name.trim().to_string()))?;
            if !collections.contains(supported) {
                collections.push(supported.clone());
            }
        }
        Ok(collections)
    }

    fn select_limit(&self, hint: &PlannerHint) -> PlanResult<u32> {
        match hint.limit {
            None => Ok(self.default_limit),
            Some(n) if n <= 0 => Err(PlanError::InvalidLimit(n)),
            Some(n) => u32::try_from(n).map_err(|_| PlanError::InvalidLimit(n)),
        }
    }
}
