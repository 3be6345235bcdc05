//! SceneScout backend
//!
//! Turns structured search hints into a validated STAC query, runs it and
//! ranks the returned scenes:
//!
//! hint -> `AoiResolver` -> `QueryPlanner` -> `SceneSearchClient` -> `rank`

pub mod config;
pub mod error;
pub mod logging;
pub mod module;

pub use error::{ConfigurationError, Error, PlanError, PlanResult, SearchError, SearchResult};
pub use module::aoi::{AoiCatalog, AoiResolver};
pub use module::handler::{FindOutcome, PlannedSearch, SceneFinder};
pub use module::planner::{CloudCoverSource, QueryPlanner};
pub use module::ranker::rank;
pub use module::stac::{HttpTransport, SceneSearchClient, SearchTransport, StacSearchRequest};
