use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    error::WeatherError,
    model::{CurrentConditions, ForecastDay, LocationCandidate, Place, WeatherSnapshot},
};

use super::WeatherClient;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// weatherapi.com error code for "No matching location found."
const NO_MATCHING_LOCATION: i64 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_options(api_key, DEFAULT_BASE_URL, Duration::from_secs(30))
    }

    pub fn with_options(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { api_key, base_url: base_url.into(), http })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            // the url carries the api key, keep it out of error messages
            .map_err(|e| {
                WeatherError::Network(format!(
                    "Failed to send request to WeatherAPI.com ({endpoint}): {}",
                    e.without_url()
                ))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            WeatherError::Network(format!(
                "Failed to read WeatherAPI {endpoint} response body: {}",
                e.without_url()
            ))
        })?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Parse(format!(
                "Failed to parse WeatherAPI {endpoint} JSON: {e} (body: {})",
                truncate_body(&body)
            ))
        })
    }
}

#[async_trait]
impl WeatherClient for WeatherApiClient {
    #[instrument(skip(self))]
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, WeatherError> {
        let hits: Vec<WaSearchHit> = self.get_json("search.json", &[("q", query)]).await?;
        debug!(count = hits.len(), "location search finished");

        Ok(hits.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn get_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError> {
        let days = days.to_string();
        let parsed: WaForecastResponse = self
            .get_json(
                "forecast.json",
                &[("q", city), ("days", days.as_str()), ("aqi", "no"), ("alerts", "no")],
            )
            .await?;
        debug!(location = %parsed.location.name, days = parsed.forecast.forecastday.len(), "forecast fetched");

        Ok(parsed.into())
    }
}

/// Maps a non-success response to the error taxonomy.
fn classify_failure(status: u16, body: &str) -> WeatherError {
    match serde_json::from_str::<WaErrorEnvelope>(body) {
        Ok(envelope) if envelope.error.code == NO_MATCHING_LOCATION => {
            WeatherError::NotFound(envelope.error.message)
        }
        Ok(envelope) => WeatherError::Api { status, message: envelope.error.message },
        Err(_) if status == 404 => WeatherError::NotFound(truncate_body(body)),
        Err(_) => WeatherError::Api { status, message: truncate_body(body) },
    }
}

#[derive(Debug, Deserialize)]
struct WaErrorEnvelope {
    error: WaErrorBody,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaSearchHit {
    id: Option<i64>,
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
    url: Option<String>,
}

impl From<WaSearchHit> for LocationCandidate {
    fn from(hit: WaSearchHit) -> Self {
        Self {
            id: hit.id,
            name: hit.name,
            region: hit.region,
            country: hit.country,
            lat: hit.lat,
            lon: hit.lon,
            url: hit.url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    #[serde(default)]
    region: String,
    country: String,
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    wind_mph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

impl From<WaForecastResponse> for WeatherSnapshot {
    fn from(parsed: WaForecastResponse) -> Self {
        let days = parsed
            .forecast
            .forecastday
            .into_iter()
            .map(|fd| ForecastDay {
                date: fd.date,
                avg_temp_c: fd.day.avgtemp_c,
                max_temp_c: fd.day.maxtemp_c,
                min_temp_c: fd.day.mintemp_c,
                condition: fd.day.condition.text,
                sunrise: fd.astro.sunrise,
                sunset: fd.astro.sunset,
            })
            .collect();

        WeatherSnapshot {
            location: Place {
                name: parsed.location.name,
                region: parsed.location.region,
                country: parsed.location.country,
                localtime: parsed.location.localtime,
            },
            current: CurrentConditions {
                temperature_c: parsed.current.temp_c,
                feels_like_c: parsed.current.feelslike_c,
                condition: parsed.current.condition.text,
                wind_kph: parsed.current.wind_kph,
                wind_mph: parsed.current.wind_mph,
                humidity_pct: parsed.current.humidity,
            },
            days,
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
