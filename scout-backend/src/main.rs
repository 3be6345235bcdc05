use scout_backend::config::{self, DEFAULT_CONFIG_PATH};
use scout_backend::module::handler::{Command, parse_command};
use scout_backend::module::renderer::{relaxation_hints, render_scene_table};
use scout_backend::{Error, SceneFinder};

use anyhow::{Context, Result};
use scout_common::PlannerHint;
use std::io::Read;
use std::process::ExitCode;

const USAGE: &str = "usage: scout-backend [--config <path>] <aois | resolve <text> | plan <hint.json|-> | search <hint.json|->>";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, command) = match parse_command(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return Ok(ExitCode::from(2));
        }
    };

    // Load configuration
    let config_path = config_path.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = config::read_config(&config_path)?;

    // Initialize logging
    let _logging_guard =
        scout_backend::logging::init_logging(&config.log_dir, "scout-backend", &config.log_level)?;
    tracing::debug!("Configuration source: {}", config_path);

    let finder = SceneFinder::from_config(config)?;

    match command {
        Command::Aois => {
            println!("{}", finder.catalog().describe());
        }
        Command::Resolve(text) => {
            let resolved = finder.resolve(&text);
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            if !resolved.matched {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Plan(source) => {
            let hint = read_hint(&source)?;
            match finder.plan(&hint) {
                Ok(plan) => println!("{}", serde_json::to_string_pretty(&plan)?),
                Err(e) => {
                    println!("Cannot plan this search: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Search(source) => {
            let hint = read_hint(&source)?;
            match finder.find(&hint).await {
                Ok(outcome) => {
                    let query = &outcome.plan.query;
                    println!(
                        "Searched {} over {} for {} (cloud cover <= {}%, {}).\n",
                        query.collections.join(", "),
                        query.bbox,
                        query.datetime_range,
                        query.cloud_cover_max,
                        outcome.plan.cloud_cover_source
                    );
                    if outcome.scenes.is_empty() {
                        println!("No scenes found. You could:");
                        for hint in relaxation_hints(query) {
                            println!("- {}", hint);
                        }
                    } else {
                        println!("{}", render_scene_table(&outcome.scenes));
                        println!(
                            "\nShowing {} of {} scenes, lowest cloud cover first. Cloud cover is \
                             scene-level metadata and may differ over the exact area.",
                            outcome.scenes.len(),
                            outcome.returned
                        );
                    }
                }
                Err(Error::Plan(e)) => {
                    println!("Cannot plan this search: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Read a planner hint as JSON from a file, or stdin for "-"
fn read_hint(source: &str) -> Result<PlannerHint> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read hint from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).context(format!("Failed to read hint file {}", source))?
    };

    serde_json::from_str(&content).context("Hint is not a valid planner hint JSON object")
}
