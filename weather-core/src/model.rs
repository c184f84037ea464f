use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// What a piece of search text was recognised as.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    PostalCode(String),
    CityName(String),
}

/// Primary condition group reported by the provider (`weather[0].main`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    /// Anything the provider sends that is not in the known set.
    Other,
}

impl WeatherCondition {
    pub const fn all() -> &'static [WeatherCondition] {
        use WeatherCondition::*;
        &[
            Clear,
            Clouds,
            Rain,
            Drizzle,
            Thunderstorm,
            Snow,
            Mist,
            Smoke,
            Haze,
            Dust,
            Fog,
            Sand,
            Ash,
            Squall,
            Tornado,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        use WeatherCondition::*;
        match self {
            Clear => "Clear",
            Clouds => "Clouds",
            Rain => "Rain",
            Drizzle => "Drizzle",
            Thunderstorm => "Thunderstorm",
            Snow => "Snow",
            Mist => "Mist",
            Smoke => "Smoke",
            Haze => "Haze",
            Dust => "Dust",
            Fog => "Fog",
            Sand => "Sand",
            Ash => "Ash",
            Squall => "Squall",
            Tornado => "Tornado",
            Other => "default",
        }
    }

    /// Total mapping from the provider's condition code; unknown codes become `Other`.
    pub fn from_code(code: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == code)
            .unwrap_or(WeatherCondition::Other)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions for one location, as returned by a single provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed: f64,
    /// Metres; the provider omits it for some stations.
    pub visibility_m: Option<u32>,
    pub utc_offset_secs: i32,
    pub condition: WeatherCondition,
    pub description: String,
    pub icon: String,
    pub sunrise: i64,
    pub sunset: i64,
    /// Unit system the numeric fields were fetched in.
    pub units: Units,
}

impl CurrentConditions {
    /// Favorite identity: `name-country`.
    pub fn favorite_id(&self) -> String {
        favorite_id(&self.name, &self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Unix seconds, UTC.
    pub timestamp: i64,
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub description: String,
    pub icon: String,
}

/// 5-day / 3-hour forecast, ordered by timestamp as the provider returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub name: String,
    pub country: String,
    pub utc_offset_secs: i32,
    pub points: Vec<ForecastPoint>,
    pub units: Units,
}

/// Pollutant concentrations in μg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pollutants {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualitySample {
    /// Provider index, 1 (good) ..= 5 (very poor).
    pub aqi: u8,
    pub pollutants: Pollutants,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub id: String,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl FavoriteLocation {
    pub fn from_conditions(conditions: &CurrentConditions) -> Self {
        Self {
            id: conditions.favorite_id(),
            name: conditions.name.clone(),
            country: conditions.country.clone(),
            lat: conditions.coordinates.lat,
            lon: conditions.coordinates.lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Two places sharing a name and country share an identity.
pub fn favorite_id(name: &str, country: &str) -> String {
    format!("{name}-{country}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            _ => Err(anyhow::anyhow!("Unknown theme '{s}'. Supported themes: light, dark, auto.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!("Unknown units '{s}'. Supported units: metric, imperial.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Ru,
    Ja,
    Zh,
    Hi,
    Ar,
}

impl Language {
    pub const fn all() -> &'static [Language] {
        use Language::*;
        &[En, Es, Fr, De, It, Pt, Ru, Ja, Zh, Hi, Ar]
    }

    pub fn code(&self) -> &'static str {
        use Language::*;
        match self {
            En => "en",
            Es => "es",
            Fr => "fr",
            De => "de",
            It => "it",
            Pt => "pt",
            Ru => "ru",
            Ja => "ja",
            Zh => "zh",
            Hi => "hi",
            Ar => "ar",
        }
    }

    pub fn native_name(&self) -> &'static str {
        use Language::*;
        match self {
            En => "English",
            Es => "Español",
            Fr => "Français",
            De => "Deutsch",
            It => "Italiano",
            Pt => "Português",
            Ru => "Русский",
            Ja => "日本語",
            Zh => "中文",
            Hi => "हिन्दी",
            Ar => "العربية",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Language::all().iter().copied().find(|l| l.code() == lower).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown language '{s}'. Supported languages: {}.",
                Language::all().iter().map(Language::code).collect::<Vec<_>>().join(", ")
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub units: Units,
    pub language: Language,
}

/// One preference change, as issued by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Theme(Theme),
    Units(Units),
    Language(Language),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Current,
    Forecast,
    AirQuality,
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" => Ok(Tab::Current),
            "forecast" => Ok(Tab::Forecast),
            "air-quality" | "air" | "aqi" => Ok(Tab::AirQuality),
            _ => Err(anyhow::anyhow!(
                "Unknown tab '{s}'. Supported tabs: current, forecast, air-quality."
            )),
        }
    }
}
