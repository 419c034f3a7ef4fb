use std::{sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, Debouncer, FilePreferenceStore, LocationCandidate, PreferenceStore, ScreenState,
    ViewStateController, WeatherClient, client_from_config,
};
use inquire::{Select, Text};
use tokio::sync::watch;
use tracing::debug;

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather and 7-day forecast")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherapi.com API key and screen defaults.
    Configure,

    /// Show the forecast for the last selected city.
    Show {
        /// Select this city instead; it becomes the saved city on success.
        #[arg(long)]
        city: Option<String>,
    },

    /// List locations matching a query.
    Search {
        /// At least three characters of a city name.
        query: String,
    },

    /// Browse and search interactively.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city } => {
                let (_, ctrl) = build_controller()?;
                match city {
                    Some(city) => ctrl.on_select_location(LocationCandidate::named(city, "")).await,
                    None => ctrl.initialize().await,
                }
                println!("{}", render(&ctrl.snapshot()));
                fail_on_forecast_error(&ctrl.snapshot())?;
            }
            Command::Search { query } => {
                let config = Config::load()?;
                let client = client_from_config(&config)?;
                let candidates = client
                    .search_locations(&query)
                    .await
                    .with_context(|| format!("Search for '{query}' failed"))?;

                if candidates.is_empty() {
                    println!("No locations match '{query}'.");
                }
                for candidate in candidates {
                    println!("{}", candidate.label());
                }
            }
            Command::Interactive => interactive().await?,
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("weatherapi.com API key:")
        .with_help_message("Create one at https://www.weatherapi.com/my/")
        .prompt()?;
    config.set_api_key(api_key);

    let default_city = Text::new("Default city:").with_default(&config.default_city).prompt()?;
    config.default_city = default_city.trim().to_string();

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn build_controller() -> anyhow::Result<(Config, ViewStateController)> {
    let config = Config::load()?;
    let client = client_from_config(&config)?;
    let prefs: Arc<dyn PreferenceStore> = Arc::new(FilePreferenceStore::in_data_dir()?);

    let ctrl = ViewStateController::new(
        client,
        prefs,
        config.screen_settings(),
        Debouncer::new(config.debounce_interval()),
    );

    Ok((config, ctrl))
}

/// A forecast failure with nothing to fall back on is a failed run.
fn fail_on_forecast_error(state: &ScreenState) -> anyhow::Result<()> {
    match &state.forecast_error {
        Some(error) if state.weather.is_none() => {
            Err(anyhow::anyhow!(
                "{}\nHint: check the city name, or run `forecast configure` to update the API key.",
                error.message
            ))
        }
        _ => Ok(()),
    }
}

const SEARCH: &str = "Search city";
const RETRY: &str = "Retry";
const QUIT: &str = "Quit";

async fn interactive() -> anyhow::Result<()> {
    let (config, ctrl) = build_controller()?;
    let mut rx = ctrl.subscribe();

    ctrl.initialize().await;

    loop {
        println!("\n{}\n", render(&ctrl.snapshot()));

        let choice = Select::new("What next?", vec![SEARCH, RETRY, QUIT]).prompt()?;
        match choice {
            SEARCH => {
                ctrl.on_toggle_search();
                let query = Text::new("City:").prompt()?;
                let long_enough = query.trim().chars().count() >= ctrl.settings().min_query_chars;
                let generation = ctrl.snapshot().search_generation;
                ctrl.on_search_text_changed(query.trim());

                if !long_enough {
                    println!("Type at least {} characters.", ctrl.settings().min_query_chars);
                    ctrl.on_toggle_search();
                    continue;
                }

                // quiet interval plus the request itself
                let budget = config.debounce_interval() + Duration::from_secs(config.timeout_secs);
                let settled = wait_for_search(&mut rx, generation, budget).await;
                debug!(settled, "search wait finished");

                let state = ctrl.snapshot();
                if let Some(error) = &state.search_error {
                    println!("Search failed: {}", error.message);
                }
                let candidates = state.visible_candidates().to_vec();
                if candidates.is_empty() {
                    println!("No matching locations.");
                    ctrl.on_toggle_search();
                    continue;
                }

                let labels: Vec<String> = candidates.iter().map(LocationCandidate::label).collect();
                let picked = Select::new("Location:", labels).raw_prompt()?;
                ctrl.on_select_location(candidates[picked.index].clone()).await;
            }
            RETRY => ctrl.retry().await,
            _ => break,
        }
    }

    Ok(())
}

/// Wait until a search newer than `generation` settles, whatever its outcome.
async fn wait_for_search(
    rx: &mut watch::Receiver<ScreenState>,
    generation: u64,
    budget: Duration,
) -> bool {
    tokio::time::timeout(budget, rx.wait_for(|s| s.search_generation > generation))
        .await
        .is_ok_and(|r| r.is_ok())
}
