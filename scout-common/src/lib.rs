//! Shared data model for SceneScout: areas of interest, planner hints,
//! search queries and scene records.

mod query;
mod types;

pub use query::{PlannerHint, QueryViolation, SearchQuery, TimeRange};
pub use types::{AoiCatalogEntry, Bbox, Center, ResolvedAoi, SceneRecord};
