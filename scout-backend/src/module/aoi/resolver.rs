//! Location hint -> canonical AOI
use regex::Regex;
use std::sync::{Arc, LazyLock};
use strsim::jaro_winkler;

use scout_common::ResolvedAoi;

use super::catalog::AoiCatalog;

/// Default similarity needed before an id is offered as a suggestion
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.85;

const MAX_SUGGESTIONS: usize = 3;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_\-]+").expect("separator pattern is valid"));

/// Normalize a name for matching: trim, lowercase, and collapse any run of
/// spaces, hyphens and underscores into a single `_`.
///
/// "Eastern Hokkaido", "eastern-hokkaido" and "eastern_hokkaido" all become
/// "eastern_hokkaido".
pub fn normalize_hint(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    SEPARATORS
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Exact (normalized) lookup against the catalog.
///
/// Similarity is only used to *name* candidates in the failure message; a
/// near miss never produces a bbox.
#[derive(Debug, Clone)]
pub struct AoiResolver {
    catalog: Arc<AoiCatalog>,
    suggestion_threshold: f64,
}

impl AoiResolver {
    pub fn new(catalog: Arc<AoiCatalog>) -> Self {
        Self::with_threshold(catalog, DEFAULT_SUGGESTION_THRESHOLD)
    }

    pub fn with_threshold(catalog: Arc<AoiCatalog>, suggestion_threshold: f64) -> Self {
        Self {
            catalog,
            suggestion_threshold,
        }
    }

    pub fn catalog(&self) -> &Arc<AoiCatalog> {
        &self.catalog
    }

    pub fn resolve(&self, hint: &str) -> ResolvedAoi {
        let key = normalize_hint(hint);

        if !key.is_empty() {
            if let Some(entry) = self.catalog.lookup_normalized(&key) {
                tracing::debug!("Resolved '{}' to AOI '{}'", hint, entry.id);
                return ResolvedAoi::from_entry(entry);
            }
        }

        let suggestions = self.suggest(hint);
        tracing::debug!(
            "No AOI for '{}' (suggestions: {:?})",
            hint,
            suggestions
        );

        let mut message = format!(
            "No matching known AOI for '{}'. Ask the user for an explicit bounding box \
             [min_lon, min_lat, max_lon, max_lat] or coordinates instead of guessing one.",
            hint.trim()
        );
        if !suggestions.is_empty() {
            message.push_str(&format!(" Closest known AOIs: {}.", suggestions.join(", ")));
        }
        ResolvedAoi::unmatched(message)
    }

    /// Catalog ids whose id or an alias is similar to `hint`, best first
    pub fn suggest(&self, hint: &str) -> Vec<String> {
        let key = normalize_hint(hint);
        if key.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &str)> = Vec::new();
        for entry in self.catalog.entries() {
            let best = std::iter::once(&entry.id)
                .chain(entry.aliases.iter())
                .map(|name| jaro_winkler(&key, &normalize_hint(name)))
                .fold(0.0_f64, f64::max);

            if best >= self.suggestion_threshold {
                scored.push((best, entry.id.as_str()));
            }
        }

        // stable: equal scores keep catalog order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, id)| id.to_string())
            .collect()
    }
}
