//! STAC API search request body
use serde::Serialize;

use scout_common::SearchQuery;

/// `POST /search` body, a 1:1 image of [`SearchQuery`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StacSearchRequest {
    pub collections: Vec<String>,
    pub bbox: [f64; 4],
    /// "<start>/<end>" in RFC 3339, UTC
    pub datetime: String,
    pub limit: u32,
    pub query: StacQueryFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StacQueryFilter {
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub lte: f64,
}

impl From<&SearchQuery> for StacSearchRequest {
    fn from(query: &SearchQuery) -> Self {
        Self {
            collections: query.collections.clone(),
            bbox: query.bbox.as_array(),
            datetime: query.datetime_range.to_interval(),
            limit: query.limit,
            query: StacQueryFilter {
                cloud_cover: Comparison {
                    lte: query.cloud_cover_max,
                },
            },
        }
    }
}
