use scout_common::{QueryViolation, SearchQuery};
use thiserror::Error;

/// Startup-time problems with the catalog or config file. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed AOI catalog: {0}")]
    CatalogFormat(#[from] serde_json::Error),

    #[error("malformed config file: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    #[error("invalid AOI entry #{index} ({id}): {reason}")]
    InvalidEntry { index: usize, id: String, reason: String },

    #[error("duplicate AOI id: {0}")]
    DuplicateId(String),

    #[error("alias '{alias}' of '{second}' overlaps with '{first}'")]
    OverlappingAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("invalid config value {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("config already initialized")]
    AlreadyInitialized,
}

/// Caller-input problems found while planning a query.
///
/// All of these are recoverable: the calling layer should turn them into a
/// clarification request and plan again with corrected hints.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("location could not be resolved: {0}")]
    UnresolvedLocation(String),

    #[error("time range is ambiguous: {0}")]
    AmbiguousTime(String),

    #[error("{field} value {value} is outside [0, 100]")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("unsupported collection: {0}")]
    UnsupportedCollection(String),

    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl From<QueryViolation> for PlanError {
    fn from(v: QueryViolation) -> Self {
        PlanError::Validation {
            field: v.field,
            reason: v.reason,
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Provider or transport failure. The query is kept for diagnostics.
    #[error("scene search unavailable: {source}")]
    Unavailable {
        query: Box<SearchQuery>,
        #[source]
        source: anyhow::Error,
    },

    #[error("refusing to dispatch invalid query: {0}")]
    InvalidQuery(QueryViolation),
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Any failure of a full resolve → plan → search run
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Search(#[from] SearchError),
}
