//! Query planning
//!
//! Deterministic rules that turn a resolved AOI and structured hints into a
//! [`scout_common::SearchQuery`], or a typed reason why they can't.

mod cloud;
mod query_planner;

pub use cloud::{CloudCoverSource, CloudPhraseTable};
pub use query_planner::QueryPlanner;
