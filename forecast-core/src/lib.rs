//! Core library for the forecast screen.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather client abstraction and its weatherapi.com implementation
//! - A durable preference store for the last selected city
//! - The debounced search / view state controller that front-ends observe
//!
//! It is used by `forecast-cli`, but can also back other front-ends.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod model;
pub mod prefs;
pub mod provider;

pub use config::Config;
pub use controller::{
    ErrorOrigin, ScreenAction, ScreenError, ScreenSettings, ScreenState, ViewStateController,
};
pub use debounce::Debouncer;
pub use error::{ErrorKind, PreferenceError, WeatherError};
pub use model::{CurrentConditions, ForecastDay, LocationCandidate, Place, WeatherSnapshot};
pub use prefs::{CITY_KEY, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use provider::{WeatherClient, client_from_config, weatherapi::WeatherApiClient};
