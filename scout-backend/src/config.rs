use std::path::Path;
use std::sync::OnceLock;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// AOI catalog JSON file; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub stac: StacConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// First entry is the default collection
    #[serde(default = "default_collections")]
    pub supported_collections: Vec<String>,

    #[serde(default = "default_short_range_days")]
    pub short_range_days: i64,

    #[serde(default = "default_short_range_cloud_cover")]
    pub short_range_cloud_cover: f64,

    #[serde(default = "default_long_range_cloud_cover")]
    pub long_range_cloud_cover: f64,

    #[serde(default = "default_cloud_phrases")]
    pub cloud_phrases: Vec<CloudPhraseRule>,
}

/// Qualitative cloud phrases sharing one numeric threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudPhraseRule {
    pub phrases: Vec<String>,
    pub cloud_cover_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Jaro-Winkler similarity needed for an id to be suggested
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_base_url() -> String {
    "https://earth-search.aws.element84.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("scenescout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_limit() -> u32 {
    5
}

fn default_collections() -> Vec<String> {
    vec!["sentinel-2-l2a".to_string()]
}

fn default_short_range_days() -> i64 {
    31
}

fn default_short_range_cloud_cover() -> f64 {
    30.0
}

fn default_long_range_cloud_cover() -> f64 {
    50.0
}

fn default_cloud_phrases() -> Vec<CloudPhraseRule> {
    let rule = |phrases: &[&str], cloud_cover_max: f64| CloudPhraseRule {
        phrases: phrases.iter().map(|p| p.to_string()).collect(),
        cloud_cover_max,
    };
    vec![
        rule(&["cloud-free"], 10.0),
        rule(&["almost cloud-free", "very few clouds"], 15.0),
        rule(&["low cloud", "mostly clear"], 20.0),
    ]
}

fn default_suggestion_threshold() -> f64 {
    0.85
}

impl Default for StacConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            supported_collections: default_collections(),
            short_range_days: default_short_range_days(),
            short_range_cloud_cover: default_short_range_cloud_cover(),
            long_range_cloud_cover: default_long_range_cloud_cover(),
            cloud_phrases: default_cloud_phrases(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            catalog_path: None,
            stac: StacConfig::default(),
            planner: PlannerConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl BackendConfig {
    /// Parse and validate; an out-of-range value is as fatal as bad TOML.
    pub fn from_str(content: &str) -> Result<Self, ConfigurationError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every later request fail, or panic.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.stac.timeout_secs == 0 {
            return Err(invalid_config("stac.timeout_secs", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.resolver.suggestion_threshold) {
            return Err(invalid_config(
                "resolver.suggestion_threshold",
                format!("{} is outside [0, 1]", self.resolver.suggestion_threshold),
            ));
        }
        self.planner.validate()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.default_limit == 0 {
            return Err(invalid_config("planner.default_limit", "must be positive"));
        }
        if self.supported_collections.is_empty() {
            return Err(invalid_config(
                "planner.supported_collections",
                "at least one collection is required",
            ));
        }
        if let Some(blank) = self.supported_collections.iter().find(|c| c.trim().is_empty()) {
            return Err(invalid_config(
                "planner.supported_collections",
                format!("empty collection name {:?}", blank),
            ));
        }
        self.short_range()?;

        check_percent("planner.short_range_cloud_cover", self.short_range_cloud_cover)?;
        check_percent("planner.long_range_cloud_cover", self.long_range_cloud_cover)?;
        for rule in &self.cloud_phrases {
            check_percent("planner.cloud_phrases.cloud_cover_max", rule.cloud_cover_max)?;
        }
        Ok(())
    }

    /// `short_range_days` as a duration
    pub fn short_range(&self) -> Result<TimeDelta, ConfigurationError> {
        if self.short_range_days <= 0 {
            return Err(invalid_config(
                "planner.short_range_days",
                format!("{} is not positive", self.short_range_days),
            ));
        }
        TimeDelta::try_days(self.short_range_days).ok_or_else(|| {
            invalid_config(
                "planner.short_range_days",
                format!("{} days is too large", self.short_range_days),
            )
        })
    }
}

fn check_percent(key: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid_config(key, format!("{} is outside [0, 100]", value)))
    }
}

fn invalid_config(key: &'static str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidConfig {
        key,
        reason: reason.into(),
    }
}

/// Load the config file into [`CONFIG`]. A missing file means defaults.
///
/// Runs before logging is up, so nothing is traced here; the caller reports
/// which source was used.
pub fn read_config(path: impl AsRef<Path>) -> Result<&'static BackendConfig, ConfigurationError> {
    let path = path.as_ref();
    let config = if path.exists() {
        BackendConfig::from_file(path)?
    } else {
        BackendConfig::default()
    };

    CONFIG
        .set(config)
        .map_err(|_| ConfigurationError::AlreadyInitialized)?;
    CONFIG.get().ok_or(ConfigurationError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BackendConfig::from_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.catalog_path.is_none());
        assert_eq!(config.stac.base_url, "https://earth-search.aws.element84.com/v1");
        assert_eq!(config.planner.default_limit, 5);
        assert_eq!(config.planner.supported_collections, vec!["sentinel-2-l2a"]);
        assert_eq!(config.planner.cloud_phrases.len(), 3);
    }

    #[test]
    fn test_phrase_table_is_extensible() {
        let config = BackendConfig::from_str(
            r#"
            log_level = "debug"

            [planner]
            default_limit = 10

            [[planner.cloud_phrases]]
            phrases = ["crystal clear"]
            cloud_cover_max = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.planner.default_limit, 10);
        assert_eq!(config.planner.cloud_phrases.len(), 1);
        assert_eq!(config.planner.cloud_phrases[0].cloud_cover_max, 5.0);
        // untouched sections keep their defaults
        assert_eq!(config.planner.short_range_days, 31);
        assert_eq!(config.stac.timeout_secs, 60);
    }

    #[test]
    fn test_malformed_config_rejected() {
        let err = BackendConfig::from_str("log_level = [").unwrap_err();
        assert!(matches!(err, ConfigurationError::ConfigFormat(_)));
    }

    fn invalid_key(content: &str) -> &'static str {
        match BackendConfig::from_str(content) {
            Err(ConfigurationError::InvalidConfig { key, .. }) => key,
            other => panic!("expected InvalidConfig, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(BackendConfig::default().validate().is_ok());
        assert_eq!(
            PlannerConfig::default().short_range().unwrap(),
            TimeDelta::days(31)
        );
    }

    #[test]
    fn test_empty_collections_rejected() {
        assert_eq!(
            invalid_key("[planner]\nsupported_collections = []"),
            "planner.supported_collections"
        );
        assert_eq!(
            invalid_key("[planner]\nsupported_collections = [\" \"]"),
            "planner.supported_collections"
        );
    }

    #[test]
    fn test_zero_default_limit_rejected() {
        assert_eq!(
            invalid_key("[planner]\ndefault_limit = 0"),
            "planner.default_limit"
        );
    }

    #[test]
    fn test_short_range_days_rejected() {
        assert_eq!(
            invalid_key("[planner]\nshort_range_days = 0"),
            "planner.short_range_days"
        );
        assert_eq!(
            invalid_key("[planner]\nshort_range_days = -7"),
            "planner.short_range_days"
        );
        assert_eq!(
            invalid_key("[planner]\nshort_range_days = 1000000000000000"),
            "planner.short_range_days"
        );
    }

    #[test]
    fn test_cloud_thresholds_rejected() {
        assert_eq!(
            invalid_key("[planner]\nshort_range_cloud_cover = 101.0"),
            "planner.short_range_cloud_cover"
        );
        assert_eq!(
            invalid_key("[planner]\nlong_range_cloud_cover = -5.0"),
            "planner.long_range_cloud_cover"
        );
        assert_eq!(
            invalid_key(
                "[[planner.cloud_phrases]]\nphrases = [\"clear\"]\ncloud_cover_max = 150.0"
            ),
            "planner.cloud_phrases.cloud_cover_max"
        );
    }

    #[test]
    fn test_stac_and_resolver_values_rejected() {
        assert_eq!(invalid_key("[stac]\ntimeout_secs = 0"), "stac.timeout_secs");
        assert_eq!(
            invalid_key("[resolver]\nsuggestion_threshold = 1.5"),
            "resolver.suggestion_threshold"
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "catalog_path = \"data/aois.json\"\n").unwrap();

        let config = BackendConfig::from_file(&path).unwrap();
        assert_eq!(config.catalog_path.as_deref(), Some("data/aois.json"));

        let missing = BackendConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigurationError::Io { .. })));
    }
}
