//! Scene search client and its transports
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use scout_common::{SceneRecord, SearchQuery};

use super::parser::parse_item_collection;
use super::types::StacSearchRequest;
use crate::config::StacConfig;
use crate::error::{SearchError, SearchResult};

/// Carries one search request to the provider and hands back the raw body.
///
/// Any error means "provider unavailable" to the caller; implementations
/// must not retry on their own.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &StacSearchRequest) -> Result<Value>;
}

/// `POST <base_url>/search` over HTTP
pub struct HttpTransport {
    client: Client,
    search_url: String,
}

impl HttpTransport {
    pub fn new(config: &StacConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn search(&self, request: &StacSearchRequest) -> Result<Value> {
        let response = self
            .client
            .post(&self.search_url)
            .json(request)
            .send()
            .await
            .context(format!("Failed to send search request to {}", self.search_url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP error {} from {}",
                response.status(),
                self.search_url
            ));
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse STAC search response")
    }
}

/// Runs one [`SearchQuery`] against the provider, one request per call.
#[derive(Clone)]
pub struct SceneSearchClient {
    transport: Arc<dyn SearchTransport>,
}

impl SceneSearchClient {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self { transport }
    }

    pub fn http(config: &StacConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Raw, unranked scenes in provider order.
    pub async fn execute(&self, query: &SearchQuery) -> SearchResult<Vec<SceneRecord>> {
        if let Some(violation) = query.violation() {
            return Err(SearchError::InvalidQuery(violation));
        }

        let request = StacSearchRequest::from(query);
        tracing::info!(
            "Searching {:?} bbox={} datetime={} cloud<={} limit={}",
            request.collections,
            query.bbox,
            request.datetime,
            query.cloud_cover_max,
            request.limit
        );

        let body = match self.transport.search(&request).await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Scene search failed: {:#}", e);
                return Err(SearchError::Unavailable {
                    query: Box::new(query.clone()),
                    source: e,
                });
            }
        };

        let records = parse_item_collection(&body);
        tracing::info!("Provider returned {} scenes", records.len());
        Ok(records)
    }
}
