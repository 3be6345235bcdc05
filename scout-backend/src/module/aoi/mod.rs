//! Areas of interest
//!
//! - `AoiCatalog`: validated, read-only registry loaded at startup
//! - `AoiResolver`: exact, separator-insensitive hint lookup

mod catalog;
mod resolver;

pub use catalog::AoiCatalog;
pub use resolver::{AoiResolver, DEFAULT_SUGGESTION_THRESHOLD, normalize_hint};
