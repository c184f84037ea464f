//! Application state and the user-triggered operations that change it.
//!
//! Network work runs in spawned tasks that report back over a channel as
//! [`Update`]s. Each search bumps a generation counter; updates carrying an
//! older generation are discarded, so a superseded lookup can never mix its
//! forecast or air quality into a newer location's view.

use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    capabilities::{
        FixedPosition, GEOLOCATION_TIMEOUT, GeolocationProvider, ShareOutcome, ShareTarget,
        StaticTheme, ThemeProbe, locate, resolve_dark, share_with_fallback,
    },
    classify::classify,
    error::{self, WeatherError},
    format::{Background, background_for, share_text},
    gateway::WeatherGateway,
    model::{
        AirQualitySample, Coordinates, CurrentConditions, FavoriteLocation, ForecastSeries,
        LocationQuery, Preference, Preferences, Tab,
    },
    store::PreferenceStore,
};

/// Everything a front end needs to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub conditions: Option<CurrentConditions>,
    pub forecast: Option<ForecastSeries>,
    pub air_quality: Option<AirQualitySample>,
    pub tab: Tab,
    pub loading: bool,
    pub error: Option<String>,
}

/// Result of one background fetch, tagged with the search that issued it.
#[derive(Debug)]
pub enum Update {
    Conditions {
        generation: u64,
        result: error::Result<CurrentConditions>,
    },
    Forecast {
        generation: u64,
        result: error::Result<ForecastSeries>,
    },
    AirQuality {
        generation: u64,
        sample: Option<AirQualitySample>,
    },
}

impl Update {
    pub fn generation(&self) -> u64 {
        match self {
            Update::Conditions { generation, .. }
            | Update::Forecast { generation, .. }
            | Update::AirQuality { generation, .. } => *generation,
        }
    }
}

/// Where the follow-up forecast is fetched: the name the provider resolved,
/// or the coordinates the user typed.
#[derive(Debug, Clone)]
enum ForecastTarget {
    Name(String),
    Coords(Coordinates),
}

pub struct Orchestrator {
    gateway: Arc<dyn WeatherGateway>,
    geolocation: Arc<dyn GeolocationProvider>,
    theme_probe: Arc<dyn ThemeProbe>,
    geolocation_timeout: Duration,
    store: PreferenceStore,
    preferences: Preferences,
    favorites: Vec<FavoriteLocation>,
    view: ViewState,
    generation: u64,
    /// Outstanding updates for the current generation.
    pending: usize,
    task: Option<JoinHandle<()>>,
    activated: bool,
    tx: UnboundedSender<Update>,
    rx: UnboundedReceiver<Update>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("gateway", &self.gateway)
            .field("preferences", &self.preferences)
            .field("favorites", &self.favorites.len())
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Preferences and favorites are read from `store` once, here.
    pub fn new(gateway: Arc<dyn WeatherGateway>, store: PreferenceStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let preferences = store.preferences();
        let favorites = store.favorites();

        Self {
            gateway,
            geolocation: Arc::new(FixedPosition(None)),
            theme_probe: Arc::new(StaticTheme::default()),
            geolocation_timeout: GEOLOCATION_TIMEOUT,
            store,
            preferences,
            favorites,
            view: ViewState::default(),
            generation: 0,
            pending: 0,
            task: None,
            activated: false,
            tx,
            rx,
        }
    }

    pub fn with_geolocation(mut self, provider: Arc<dyn GeolocationProvider>) -> Self {
        self.geolocation = provider;
        self
    }

    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    pub fn with_theme_probe(mut self, probe: Arc<dyn ThemeProbe>) -> Self {
        self.theme_probe = probe;
        self
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn favorites(&self) -> &[FavoriteLocation] {
        &self.favorites
    }

    /// True while any fetch of the current search has not reported back.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// Classify `raw` and start fetching. Results arrive via [`Self::recv`] / [`Self::settle`].
    ///
    /// Spawns the fetch onto the current Tokio runtime; panics if called outside one.
    pub fn search(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.view.error = Some(WeatherError::InvalidInput.to_string());
            return;
        }
        self.start(classify(trimmed));
    }

    /// Like [`Self::search`], this must run inside a Tokio runtime.
    pub fn search_coordinates(&mut self, coords: Coordinates) {
        self.start(LocationQuery::Coordinates(coords));
    }

    fn start(&mut self, query: LocationQuery) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.generation += 1;
        self.pending = 1;
        self.view.loading = true;
        self.view.error = None;
        info!(generation = self.generation, ?query, "Starting lookup");

        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let prefs = self.preferences;
        let generation = self.generation;

        self.task = Some(tokio::spawn(async move {
            load_location(gateway, query, prefs, generation, tx).await;
        }));
    }

    /// Wait for the next update from a background fetch.
    pub async fn recv(&mut self) -> Option<Update> {
        self.rx.recv().await
    }

    /// Fold one update into the view. Returns `false` if it belonged to a superseded search.
    pub fn apply(&mut self, update: Update) -> bool {
        if update.generation() != self.generation {
            debug!(
                stale = update.generation(),
                current = self.generation,
                "Discarding result of superseded lookup"
            );
            return false;
        }
        self.pending = self.pending.saturating_sub(1);

        match update {
            Update::Conditions { result: Ok(conditions), .. } => {
                info!(name = %conditions.name, country = %conditions.country, "Conditions loaded");
                self.view.conditions = Some(conditions);
                self.view.forecast = None;
                self.view.air_quality = None;
                self.view.loading = false;
                self.pending += 2;
            }
            Update::Conditions { result: Err(e), .. } => {
                warn!(error = ?e, "Conditions lookup failed");
                self.view.error = Some(e.to_string());
                self.view.loading = false;
            }
            Update::Forecast { result: Ok(series), .. } => {
                debug!(points = series.points.len(), "Forecast loaded");
                self.view.forecast = Some(series);
            }
            Update::Forecast { result: Err(e), .. } => {
                warn!(error = ?e, "Forecast lookup failed");
                self.view.error = Some(e.to_string());
            }
            Update::AirQuality { sample, .. } => {
                if sample.is_none() {
                    debug!("No air quality for this location");
                }
                self.view.air_quality = sample;
            }
        }
        true
    }

    /// Apply updates until every fetch of the current search has reported.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            match self.rx.recv().await {
                Some(update) => {
                    self.apply(update);
                }
                None => break,
            }
        }
    }

    /// Ask the host for its position and look it up.
    pub async fn use_current_location(&mut self) {
        let was_loading = self.view.loading;
        self.view.loading = true;

        match locate(self.geolocation.as_ref(), self.geolocation_timeout).await {
            Ok(coords) => self.search_coordinates(coords),
            Err(e) => {
                self.view.error = Some(e.to_string());
                self.view.loading = was_loading;
            }
        }
    }

    /// First activation: look up the current location once if nothing is shown or loading.
    /// Returns whether a lookup was triggered.
    pub async fn activate(&mut self) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;

        if self.view.conditions.is_some() || self.view.loading || self.is_busy() {
            return false;
        }
        self.use_current_location().await;
        true
    }

    pub fn is_favorite(&self, conditions: &CurrentConditions) -> bool {
        let id = conditions.favorite_id();
        self.favorites.iter().any(|f| f.id == id)
    }

    /// Add or remove `conditions` from favorites. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, conditions: &CurrentConditions) -> Result<bool> {
        let id = conditions.favorite_id();
        let now_favorite = if self.favorites.iter().any(|f| f.id == id) {
            self.favorites.retain(|f| f.id != id);
            false
        } else {
            self.favorites.push(FavoriteLocation::from_conditions(conditions));
            true
        };

        info!(%id, now_favorite, "Toggled favorite");
        self.store.save_favorites(&self.favorites)?;
        Ok(now_favorite)
    }

    /// Returns whether anything was removed.
    pub fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != id);
        if self.favorites.len() == before {
            return Ok(false);
        }
        self.store.save_favorites(&self.favorites)?;
        Ok(true)
    }

    pub fn select_favorite(&mut self, favorite: &FavoriteLocation) {
        self.search_coordinates(favorite.coordinates());
    }

    /// Persist the new value. Already-fetched data keeps the units it was fetched in;
    /// the next search picks the change up.
    pub fn change_preference(&mut self, preference: Preference) -> Result<()> {
        match preference {
            Preference::Theme(theme) => self.preferences.theme = theme,
            Preference::Units(units) => self.preferences.units = units,
            Preference::Language(language) => self.preferences.language = language,
        }
        self.store.save_preference(preference)
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.view.tab = tab;
    }

    pub fn is_dark(&self) -> bool {
        resolve_dark(self.preferences.theme, self.theme_probe.as_ref())
    }

    pub fn background(&self) -> Option<Background> {
        self.view
            .conditions
            .as_ref()
            .map(|c| background_for(c.condition, self.is_dark()))
    }

    /// Share a summary of the current conditions; `None` when nothing is shown.
    pub async fn share(
        &self,
        native: Option<&dyn ShareTarget>,
        clipboard: &dyn ShareTarget,
    ) -> Option<ShareOutcome> {
        let conditions = self.view.conditions.as_ref()?;
        Some(share_with_fallback(native, clipboard, &share_text(conditions)).await)
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn load_location(
    gateway: Arc<dyn WeatherGateway>,
    query: LocationQuery,
    prefs: Preferences,
    generation: u64,
    tx: UnboundedSender<Update>,
) {
    let Preferences { units, language, .. } = prefs;

    let result = match &query {
        LocationQuery::Coordinates(coords) => {
            gateway.current_by_coords(*coords, units, language).await
        }
        LocationQuery::PostalCode(text) | LocationQuery::CityName(text) => {
            gateway.current_by_name(text, units, language).await
        }
    };

    let conditions = match result {
        Ok(conditions) => conditions,
        Err(e) => {
            let _ = tx.send(Update::Conditions { generation, result: Err(e) });
            return;
        }
    };

    let (forecast_target, air_target) = match query {
        LocationQuery::Coordinates(coords) => (ForecastTarget::Coords(coords), coords),
        _ => (ForecastTarget::Name(conditions.name.clone()), conditions.coordinates),
    };

    // The receiver is gone only when the orchestrator was dropped.
    if tx.send(Update::Conditions { generation, result: Ok(conditions) }).is_err() {
        return;
    }

    let forecast = async {
        let result = match &forecast_target {
            ForecastTarget::Name(name) => gateway.forecast_by_name(name, units, language).await,
            ForecastTarget::Coords(coords) => {
                gateway.forecast_by_coords(*coords, units, language).await
            }
        };
        let _ = tx.send(Update::Forecast { generation, result });
    };

    let air = async {
        let sample = gateway.air_quality(air_target).await;
        let _ = tx.send(Update::AirQuality { generation, sample });
    };

    tokio::join!(forecast, air);
}
