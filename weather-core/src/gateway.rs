use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    model::{AirQualitySample, Coordinates, CurrentConditions, ForecastSeries, Language, Units},
};

pub mod openweather;

pub use openweather::OpenWeatherGateway;

/// The three provider endpoints, by name or by coordinates.
///
/// Implementations hold no per-request state; every call is independent and
/// may run concurrently with the others.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// `query` is a city name or postal code, passed to the provider verbatim.
    async fn current_by_name(
        &self,
        query: &str,
        units: Units,
        lang: Language,
    ) -> Result<CurrentConditions>;

    async fn current_by_coords(
        &self,
        coords: Coordinates,
        units: Units,
        lang: Language,
    ) -> Result<CurrentConditions>;

    async fn forecast_by_name(
        &self,
        name: &str,
        units: Units,
        lang: Language,
    ) -> Result<ForecastSeries>;

    async fn forecast_by_coords(
        &self,
        coords: Coordinates,
        units: Units,
        lang: Language,
    ) -> Result<ForecastSeries>;

    /// `None` on any failure: the rest of the view stays valid without it.
    async fn air_quality(&self, coords: Coordinates) -> Option<AirQualitySample>;
}
