//! Request handling: command parsing and the resolve -> plan -> search -> rank pipeline
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

use scout_common::{PlannerHint, ResolvedAoi, SceneRecord, SearchQuery};

use super::aoi::{AoiCatalog, AoiResolver};
use super::planner::{CloudCoverSource, QueryPlanner};
use super::ranker::rank;
use super::stac::SceneSearchClient;
use crate::config::BackendConfig;
use crate::error::{Error, PlanResult};

/// A planned query together with how it was derived
#[derive(Debug, Clone, Serialize)]
pub struct PlannedSearch {
    /// Present whenever the hint named an area, matched or not
    pub aoi: Option<ResolvedAoi>,
    pub query: SearchQuery,
    pub cloud_cover_source: CloudCoverSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindOutcome {
    pub request_id: String,
    pub plan: PlannedSearch,
    /// Ranked and truncated to the query limit
    pub scenes: Vec<SceneRecord>,
    /// How many usable records the provider sent before ranking
    pub returned: usize,
}

/// Owns one resolver, planner and search client. Holds no per-request
/// state, so a single instance can serve concurrent requests.
#[derive(Clone)]
pub struct SceneFinder {
    resolver: AoiResolver,
    planner: QueryPlanner,
    client: SceneSearchClient,
}

impl SceneFinder {
    pub fn new(resolver: AoiResolver, planner: QueryPlanner, client: SceneSearchClient) -> Self {
        Self {
            resolver,
            planner,
            client,
        }
    }

    /// Wire everything from config: catalog file (or built-in), planner
    /// rules and the HTTP transport.
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => AoiCatalog::load_from_file(path)?,
            None => AoiCatalog::builtin()?,
        };
        let resolver =
            AoiResolver::with_threshold(Arc::new(catalog), config.resolver.suggestion_threshold);
        let planner = QueryPlanner::new(&config.planner)?;
        let client = SceneSearchClient::http(&config.stac)?;

        Ok(Self::new(resolver, planner, client))
    }

    pub fn catalog(&self) -> &AoiCatalog {
        self.resolver.catalog()
    }

    pub fn resolve(&self, hint: &str) -> ResolvedAoi {
        self.resolver.resolve(hint)
    }

    /// Resolve the AOI hint (if any) and plan, without touching the network.
    ///
    /// The AOI is resolved even when an explicit bbox is given, so its
    /// default cloud cover can still apply.
    pub fn plan(&self, hint: &PlannerHint) -> PlanResult<PlannedSearch> {
        let aoi = hint
            .aoi_hint
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .map(|h| self.resolver.resolve(h));

        let (query, cloud_cover_source) = self.planner.plan_with_rationale(aoi.as_ref(), hint)?;
        Ok(PlannedSearch {
            aoi,
            query,
            cloud_cover_source,
        })
    }

    pub async fn find(&self, hint: &PlannerHint) -> Result<FindOutcome, Error> {
        let request_id = uuid::Uuid::now_v7().to_string();
        let span = tracing::info_span!("find", request_id = %request_id);

        async move {
            let plan = match self.plan(hint) {
                Ok(plan) => plan,
                Err(e) => {
                    tracing::info!("Planning refused: {}", e);
                    return Err(Error::from(e));
                }
            };

            let records = self.client.execute(&plan.query).await?;
            let returned = records.len();
            let scenes = rank(records, plan.query.limit as usize);

            tracing::info!("Ranked {} of {} scenes", scenes.len(), returned);
            Ok::<_, Error>(FindOutcome {
                request_id,
                plan,
                scenes,
                returned,
            })
        }
        .instrument(span)
        .await
    }
}

/// CLI commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the AOI catalog
    Aois,
    /// Resolve one location hint
    Resolve(String),
    /// Plan from a hint file ("-" for stdin) without searching
    Plan(String),
    /// Plan, search and rank
    Search(String),
}

/// Parse `[--config <path>] <command> [args...]` (program name excluded).
///
/// Returns the config path override and the command.
pub fn parse_command(args: &[String]) -> Result<(Option<String>, Command), String> {
    let mut config_path = None;
    let mut rest = args;

    if let Some(first) = rest.first() {
        if first == "--config" || first == "-c" {
            let path = rest
                .get(1)
                .ok_or_else(|| format!("{} needs a path", first))?;
            config_path = Some(path.clone());
            rest = &rest[2..];
        }
    }

    let (name, args) = rest.split_first().ok_or_else(|| "no command given".to_string())?;
    let joined = args.join(" ");
    let single_arg = |what: &str| -> Result<String, String> {
        match args {
            [one] => Ok(one.clone()),
            [] => Err(format!("'{}' needs {}", name, what)),
            _ => Err(format!("'{}' takes exactly one argument", name)),
        }
    };

    let command = match name.as_str() {
        "aois" | "list" => Command::Aois,
        "resolve" => {
            if joined.trim().is_empty() {
                return Err("'resolve' needs a location hint".to_string());
            }
            Command::Resolve(joined)
        }
        "plan" => Command::Plan(single_arg("a hint file or '-'")?),
        "search" | "find" => Command::Search(single_arg("a hint file or '-'")?),
        other => return Err(format!("unknown command: {}", other)),
    };

    Ok((config_path, command))
}
