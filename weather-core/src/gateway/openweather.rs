use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    config::GatewayConfig,
    error::{Result, WeatherError},
    model::{
        AirQualitySample, Coordinates, CurrentConditions, ForecastPoint, ForecastSeries, Language,
        Pollutants, Units, WeatherCondition,
    },
};

use super::WeatherGateway;

const USER_AGENT: &str = concat!("skyview/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct OpenWeatherGateway {
    base_url: String,
    api_key: String,
    http: Client,
}

/// How the location was addressed; 404 means "not recognised" only for names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Name,
    Coords,
}

impl OpenWeatherGateway {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url,
            api_key: config.api_key,
            http,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut params: Vec<(&'static str, String)>,
        lookup: Lookup,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        params.push(("appid", self.api_key.clone()));

        let res = self.http.get(&url).query(&params).send().await.map_err(|e| {
            warn!(endpoint, error = %e, "OpenWeather request failed");
            WeatherError::Unavailable
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            warn!(endpoint, error = %e, "Failed to read OpenWeather response body");
            WeatherError::Unavailable
        })?;

        debug!(endpoint, %status, "OpenWeather responded");

        if !status.is_success() {
            warn!(endpoint, %status, body = %truncate_body(&body), "OpenWeather request rejected");
            return Err(map_status(status, lookup));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(endpoint, error = %e, "Failed to parse OpenWeather JSON");
            WeatherError::Unavailable
        })
    }
}

fn map_status(status: StatusCode, lookup: Lookup) -> WeatherError {
    match status {
        StatusCode::NOT_FOUND if lookup == Lookup::Name => WeatherError::NotFound,
        StatusCode::UNAUTHORIZED => WeatherError::Unauthorized,
        _ => WeatherError::Unavailable,
    }
}

fn name_params(name: &str, units: Units, lang: Language) -> Vec<(&'static str, String)> {
    vec![
        ("q", name.to_string()),
        ("units", units.as_str().to_string()),
        ("lang", lang.code().to_string()),
    ]
}

fn coord_params(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
}

fn coord_params_with(
    coords: Coordinates,
    units: Units,
    lang: Language,
) -> Vec<(&'static str, String)> {
    let mut params = coord_params(coords);
    params.push(("units", units.as_str().to_string()));
    params.push(("lang", lang.code().to_string()));
    params
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
    visibility: Option<u32>,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAqiMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    main: OwAqiMain,
    components: Pollutants,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    list: Vec<OwAirEntry>,
}

/// Condition, description and icon of the first `weather` entry.
fn primary(weather: &[OwWeather]) -> (WeatherCondition, String, String) {
    weather
        .first()
        .map(|w| (WeatherCondition::from_code(&w.main), w.description.clone(), w.icon.clone()))
        .unwrap_or((WeatherCondition::Other, String::new(), String::new()))
}

impl OwCurrentResponse {
    fn into_conditions(self, units: Units) -> CurrentConditions {
        let (condition, description, icon) = primary(&self.weather);

        CurrentConditions {
            name: self.name,
            country: self.sys.country,
            coordinates: Coordinates::new(self.coord.lat, self.coord.lon),
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed: self.wind.speed,
            visibility_m: self.visibility,
            utc_offset_secs: self.timezone,
            condition,
            description,
            icon,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            units,
        }
    }
}

impl OwForecastResponse {
    fn into_series(self, units: Units) -> ForecastSeries {
        let points = self
            .list
            .into_iter()
            .map(|entry| {
                let (condition, description, icon) = primary(&entry.weather);
                ForecastPoint {
                    timestamp: entry.dt,
                    temperature: entry.main.temp,
                    condition,
                    description,
                    icon,
                }
            })
            .collect();

        ForecastSeries {
            name: self.city.name,
            country: self.city.country,
            utc_offset_secs: self.city.timezone,
            points,
            units,
        }
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn current_by_name(
        &self,
        query: &str,
        units: Units,
        lang: Language,
    ) -> Result<CurrentConditions> {
        let parsed: OwCurrentResponse =
            self.get("weather", name_params(query, units, lang), Lookup::Name).await?;
        Ok(parsed.into_conditions(units))
    }

    async fn current_by_coords(
        &self,
        coords: Coordinates,
        units: Units,
        lang: Language,
    ) -> Result<CurrentConditions> {
        let parsed: OwCurrentResponse =
            self.get("weather", coord_params_with(coords, units, lang), Lookup::Coords).await?;
        Ok(parsed.into_conditions(units))
    }

    async fn forecast_by_name(
        &self,
        name: &str,
        units: Units,
        lang: Language,
    ) -> Result<ForecastSeries> {
        let parsed: OwForecastResponse =
            self.get("forecast", name_params(name, units, lang), Lookup::Name).await?;
        Ok(parsed.into_series(units))
    }

    async fn forecast_by_coords(
        &self,
        coords: Coordinates,
        units: Units,
        lang: Language,
    ) -> Result<ForecastSeries> {
        let parsed: OwForecastResponse =
            self.get("forecast", coord_params_with(coords, units, lang), Lookup::Coords).await?;
        Ok(parsed.into_series(units))
    }

    async fn air_quality(&self, coords: Coordinates) -> Option<AirQualitySample> {
        let parsed: OwAirResponse =
            match self.get("air_pollution", coord_params(coords), Lookup::Coords).await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(%coords, error = %e, "Air quality unavailable");
                    return None;
                }
            };

        let sample = parsed.list.into_iter().next().map(|entry| AirQualitySample {
            aqi: entry.main.aqi,
            pollutants: entry.components,
        });
        if sample.is_none() {
            warn!(%coords, "Air quality response contained no samples");
        }
        sample
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_only_for_name_lookups() {
        assert_eq!(map_status(StatusCode::NOT_FOUND, Lookup::Name), WeatherError::NotFound);
        assert_eq!(map_status(StatusCode::NOT_FOUND, Lookup::Coords), WeatherError::Unavailable);
    }

    #[test]
    fn unauthorized_and_other_statuses() {
        assert_eq!(map_status(StatusCode::UNAUTHORIZED, Lookup::Name), WeatherError::Unauthorized);
        assert_eq!(map_status(StatusCode::UNAUTHORIZED, Lookup::Coords), WeatherError::Unauthorized);
        assert_eq!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, Lookup::Name),
            WeatherError::Unavailable
        );
        assert_eq!(map_status(StatusCode::TOO_MANY_REQUESTS, Lookup::Name), WeatherError::Unavailable);
        assert_eq!(map_status(StatusCode::BAD_REQUEST, Lookup::Coords), WeatherError::Unavailable);
    }

    #[test]
    fn current_response_without_weather_entries_is_other() {
        let json = r#"{
            "name": "Nowhere",
            "coord": {"lat": 1.0, "lon": 2.0},
            "main": {"temp": 3.3},
            "timezone": -3600
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(json).expect("valid json");
        let conditions = parsed.into_conditions(Units::Metric);

        assert_eq!(conditions.condition, WeatherCondition::Other);
        assert_eq!(conditions.country, "");
        assert_eq!(conditions.visibility_m, None);
        assert_eq!(conditions.utc_offset_secs, -3600);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
