//! View state for the forecast screen.
//!
//! [`ViewStateController`] owns the only copy of [`ScreenState`] and is the
//! only thing allowed to change it. Front-ends observe it through a
//! [`watch`] channel and feed user input back through the four actions.
//!
//! Forecast and search requests each carry a sequence token. A result is
//! applied only when its token is still the newest one issued for that kind
//! of request, so whatever the user did last wins even when responses
//! arrive out of order.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    debounce::Debouncer,
    error::{ErrorKind, WeatherError},
    model::{LocationCandidate, WeatherSnapshot},
    prefs::{CITY_KEY, PreferenceStore},
    provider::WeatherClient,
};

/// Knobs the controller needs from [`crate::Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    pub default_city: String,
    pub forecast_days: u8,
    pub min_query_chars: usize,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self { default_city: "Yangon".to_string(), forecast_days: 7, min_query_chars: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    Search,
    Forecast,
}

/// A failure the screen should show.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenError {
    pub origin: ErrorOrigin,
    pub kind: ErrorKind,
    pub message: String,
}

impl ScreenError {
    fn new(origin: ErrorOrigin, err: &WeatherError) -> Self {
        Self { origin, kind: err.kind(), message: err.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    pub search_visible: bool,
    pub candidates: Vec<LocationCandidate>,
    /// Last successfully fetched forecast. Kept on failure.
    pub weather: Option<WeatherSnapshot>,
    pub loading: bool,
    /// Last failed forecast; cleared by the next successful one.
    pub forecast_error: Option<ScreenError>,
    /// Last failed search; cleared by the next successful one.
    pub search_error: Option<ScreenError>,
    /// Bumped every time a search settles, including empty and failed ones.
    pub search_generation: u64,
}

impl Default for ScreenState {
    fn default() -> Self {
        // the screen starts out waiting for its first forecast
        Self {
            search_visible: false,
            candidates: Vec::new(),
            weather: None,
            loading: true,
            forecast_error: None,
            search_error: None,
            search_generation: 0,
        }
    }
}

impl ScreenState {
    /// Candidates that should actually be drawn.
    pub fn visible_candidates(&self) -> &[LocationCandidate] {
        if self.search_visible { &self.candidates } else { &[] }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ScreenError> {
        self.forecast_error.iter().chain(self.search_error.iter())
    }
}

/// User input the presentation layer can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    ToggleSearch,
    SearchTextChanged(String),
    SelectLocation(LocationCandidate),
    Retry,
}

#[derive(Debug)]
struct Shared {
    client: Arc<dyn WeatherClient>,
    prefs: Arc<dyn PreferenceStore>,
    settings: ScreenSettings,
    state: watch::Sender<ScreenState>,
    search_seq: AtomicU64,
    forecast_seq: AtomicU64,
    // (city, persist on success) of the last forecast request, for retry
    last_forecast: Mutex<Option<(String, bool)>>,
}

#[derive(Debug)]
pub struct ViewStateController {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl ViewStateController {
    pub fn new(
        client: Arc<dyn WeatherClient>,
        prefs: Arc<dyn PreferenceStore>,
        settings: ScreenSettings,
        debouncer: Debouncer,
    ) -> Self {
        let (state, _) = watch::channel(ScreenState::default());
        let shared = Shared {
            client,
            prefs,
            settings,
            state,
            search_seq: AtomicU64::new(0),
            forecast_seq: AtomicU64::new(0),
            last_forecast: Mutex::new(None),
        };

        Self { shared: Arc::new(shared), debouncer }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> ScreenState {
        self.shared.state.borrow().clone()
    }

    pub fn settings(&self) -> &ScreenSettings {
        &self.shared.settings
    }

    /// Load the saved city (or the default one) on screen mount.
    pub async fn initialize(&self) {
        // reserved before the preference read so a selection made meanwhile still wins
        let token = self.shared.next_forecast_token();
        let default_city = &self.shared.settings.default_city;
        let city = match self.shared.prefs.get(CITY_KEY).await {
            Ok(Some(city)) if !city.trim().is_empty() => city,
            Ok(_) => default_city.clone(),
            Err(e) => {
                warn!(error = %e, "could not read saved city, falling back to default");
                default_city.clone()
            }
        };

        info!(%city, "loading initial forecast");
        self.shared.load_forecast_with(token, city, false).await;
    }

    /// Debounced; queries shorter than the minimum only clear the list.
    pub fn on_search_text_changed(&self, text: impl Into<String>) {
        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(text.into(), move |text| async move {
            shared.run_search(text).await;
        });
    }

    pub fn on_toggle_search(&self) {
        let mut visible = false;
        self.shared.state.send_modify(|s| {
            s.search_visible = !s.search_visible;
            visible = s.search_visible;
            if !visible {
                s.candidates.clear();
            }
        });

        if !visible {
            self.debouncer.cancel();
            self.shared.invalidate_searches();
        }
        debug!(visible, "search toggled");
    }

    pub async fn on_select_location(&self, candidate: LocationCandidate) {
        self.debouncer.cancel();
        self.shared.invalidate_searches();
        self.shared.state.send_modify(|s| {
            s.candidates.clear();
            s.search_visible = false;
            s.loading = true;
        });

        info!(city = candidate.forecast_query(), country = %candidate.country, "location selected");
        self.shared.load_forecast(candidate.forecast_query().to_string(), true).await;
    }

    /// Repeat the last forecast request, e.g. after a failure.
    pub async fn retry(&self) {
        let last = self.shared.last_forecast.lock().clone();
        match last {
            Some((city, persist)) => {
                self.shared.state.send_modify(|s| s.loading = true);
                self.shared.load_forecast(city, persist).await;
            }
            None => self.initialize().await,
        }
    }

    pub async fn dispatch(&self, action: ScreenAction) {
        match action {
            ScreenAction::ToggleSearch => self.on_toggle_search(),
            ScreenAction::SearchTextChanged(text) => self.on_search_text_changed(text),
            ScreenAction::SelectLocation(candidate) => self.on_select_location(candidate).await,
            ScreenAction::Retry => self.retry().await,
        }
    }
}

impl Shared {
    fn invalidate_searches(&self) {
        self.search_seq.fetch_add(1, Ordering::SeqCst);
    }

    async fn run_search(&self, query: String) {
        let token = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;

        if query.chars().count() < self.settings.min_query_chars {
            self.state.send_modify(|s| {
                s.candidates.clear();
                s.search_generation += 1;
            });
            return;
        }

        let result = self.client.search_locations(&query).await;

        if self.search_seq.load(Ordering::SeqCst) != token {
            debug!(%query, token, "discarding superseded search results");
            return;
        }

        match result {
            Ok(candidates) => {
                debug!(%query, count = candidates.len(), "search results applied");
                self.state.send_modify(|s| {
                    if s.search_visible {
                        s.candidates = candidates;
                    }
                    s.search_error = None;
                    s.search_generation += 1;
                });
            }
            Err(e) => {
                warn!(%query, error = %e, "location search failed");
                self.state.send_modify(|s| {
                    s.search_error = Some(ScreenError::new(ErrorOrigin::Search, &e));
                    s.search_generation += 1;
                });
            }
        }
    }

    fn next_forecast_token(&self) -> u64 {
        self.forecast_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn load_forecast(&self, city: String, persist: bool) {
        let token = self.next_forecast_token();
        self.load_forecast_with(token, city, persist).await;
    }

    async fn load_forecast_with(&self, token: u64, city: String, persist: bool) {
        if self.forecast_seq.load(Ordering::SeqCst) != token {
            debug!(%city, token, "forecast superseded before it was sent");
            return;
        }
        *self.last_forecast.lock() = Some((city.clone(), persist));

        let result = self.client.get_forecast(&city, self.settings.forecast_days).await;

        if self.forecast_seq.load(Ordering::SeqCst) != token {
            debug!(%city, token, "discarding superseded forecast");
            return;
        }

        match result {
            Ok(snapshot) => {
                self.state.send_modify(|s| {
                    s.weather = Some(snapshot);
                    s.loading = false;
                    s.forecast_error = None;
                });

                if persist {
                    if let Err(e) = self.prefs.set(CITY_KEY, &city).await {
                        warn!(%city, error = %e, "failed to persist selected city");
                    }
                }
            }
            Err(e) => {
                warn!(%city, error = %e, "forecast fetch failed");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.forecast_error = Some(ScreenError::new(ErrorOrigin::Forecast, &e));
                });
            }
        }
    }
}
