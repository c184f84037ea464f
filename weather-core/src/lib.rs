//! Core library for `skyview`.
//!
//! This crate defines:
//! - Search text classification (coordinates, postal code, city name)
//! - The weather provider gateway and its OpenWeatherMap implementation
//! - The orchestrator that turns user actions into a consistent view
//! - Formatting helpers, preference/favorite persistence and configuration
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod capabilities;
pub mod classify;
pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod model;
pub mod orchestrator;
pub mod store;

pub use classify::classify;
pub use config::{Config, GatewayConfig};
pub use error::WeatherError;
pub use gateway::{OpenWeatherGateway, WeatherGateway};
pub use model::{
    AirQualitySample, Coordinates, CurrentConditions, FavoriteLocation, ForecastPoint,
    ForecastSeries, Language, LocationQuery, Preference, Preferences, Tab, Theme, Units,
    WeatherCondition,
};
pub use orchestrator::{Orchestrator, Update, ViewState};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, PreferenceStore};
