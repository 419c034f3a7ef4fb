use crate::{
    Config, WeatherError,
    model::{LocationCandidate, WeatherSnapshot},
    provider::weatherapi::WeatherApiClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod weatherapi;

/// Remote source of location search results and forecasts.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    /// Candidates for a (partial) city name, most relevant first.
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, WeatherError>;

    /// Current conditions plus a `days`-long daily forecast for `city`.
    async fn get_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the weatherapi.com client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherClient>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for weatherapi.com.\n\
                 Hint: run `forecast configure` or set WEATHERAPI_KEY."
        )
    })?;

    let client = WeatherApiClient::with_options(
        api_key,
        config.base_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;

    Ok(Arc::new(client))
}
