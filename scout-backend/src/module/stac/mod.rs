//! STAC scene search
//!
//! - `types`: request body sent to `POST /search`
//! - `parser`: tolerant ItemCollection -> SceneRecord mapping
//! - `client`: `SceneSearchClient` over a pluggable `SearchTransport`

pub mod types;
pub mod parser;
mod client;

pub use client::{HttpTransport, SceneSearchClient, SearchTransport};
pub use parser::{PREVIEW_ASSET_KEYS, parse_item_collection};
pub use types::StacSearchRequest;

#[cfg(test)]
pub(crate) use client::tests::FakeTransport;
