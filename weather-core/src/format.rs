//! Display helpers. No I/O; only [`local_date_time`] reads the clock.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::model::{CurrentConditions, ForecastPoint, Units, WeatherCondition};

/// Number of 3-hour points shown in the hourly strip (~24h).
pub const HOURLY_POINTS: usize = 8;
/// Maximum number of day groups in the daily view.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Round half up to an integer and append the unit suffix, e.g. `21°C`.
pub fn format_temperature(value: f64, units: Units) -> String {
    format!("{}{}", round_half_up(value), units.temperature_suffix())
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Wall clock of a location, given its offset from UTC in seconds.
/// Timestamps chrono cannot represent fall back to the Unix epoch.
fn shifted(ts: i64, utc_offset_secs: i32) -> NaiveDateTime {
    match ts
        .checked_add(i64::from(utc_offset_secs))
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    {
        Some(local) => local.naive_utc(),
        None => {
            warn!(ts, utc_offset_secs, "Timestamp out of range, showing epoch");
            NaiveDateTime::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDateTime {
    /// e.g. `Monday, January 15, 2024`
    pub date: String,
    /// e.g. `02:30:05 PM`
    pub time: String,
}

pub fn local_date_time(utc_offset_secs: i32) -> LocalDateTime {
    local_date_time_at(Utc::now(), utc_offset_secs)
}

pub fn local_date_time_at(now: DateTime<Utc>, utc_offset_secs: i32) -> LocalDateTime {
    let local = shifted(now.timestamp(), utc_offset_secs);
    LocalDateTime {
        date: local.format("%A, %B %-d, %Y").to_string(),
        time: local.format("%I:%M:%S %p").to_string(),
    }
}

/// `03:00 PM` in location-local time.
pub fn format_time(ts: i64, utc_offset_secs: i32) -> String {
    shifted(ts, utc_offset_secs).format("%I:%M %p").to_string()
}

/// `Mon, Jan 15` in location-local time.
pub fn format_date(ts: i64, utc_offset_secs: i32) -> String {
    shifted(ts, utc_offset_secs).format("%a, %b %-d").to_string()
}

/// `3 PM` in location-local time; used for the hourly strip.
pub fn format_hour(ts: i64, utc_offset_secs: i32) -> String {
    shifted(ts, utc_offset_secs).format("%-I %p").to_string()
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

/// Two-stop gradient behind the current conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub from: &'static str,
    pub to: &'static str,
}

impl Background {
    const fn new(from: &'static str, to: &'static str) -> Self {
        Self { from, to }
    }

    pub fn css(&self) -> String {
        format!("linear-gradient(135deg, {} 0%, {} 100%)", self.from, self.to)
    }
}

const SUNSET: Background = Background::new("#f093fb", "#f5576c");
const NIGHT_BLUE: Background = Background::new("#1e3c72", "#2a5298");
const OVERCAST: Background = Background::new("#d7d2cc", "#304352");
const CHARCOAL: Background = Background::new("#434343", "#000000");
const SKY: Background = Background::new("#89f7fe", "#66a6ff");
const DEEP_RAIN: Background = Background::new("#0c3483", "#a2b6df");
const STORM: Background = Background::new("#373b44", "#4286f4");
const DARK_STORM: Background = Background::new("#2c1810", "#8b4513");
const SNOWFIELD: Background = Background::new("#e6ddd4", "#d5d4d0");
const HAZE: Background = Background::new("#606c88", "#3f4c6b");
const DEFAULT: Background = Background::new("#667eea", "#764ba2");

pub fn background_for(condition: WeatherCondition, is_dark: bool) -> Background {
    use WeatherCondition::*;
    match (condition, is_dark) {
        (Clear, false) => SUNSET,
        (Clear, true) => NIGHT_BLUE,
        (Clouds, false) => OVERCAST,
        (Clouds, true) => CHARCOAL,
        (Rain | Drizzle | Squall, false) => SKY,
        (Rain | Drizzle | Squall, true) => DEEP_RAIN,
        (Thunderstorm | Tornado, false) => STORM,
        (Thunderstorm | Tornado, true) => DARK_STORM,
        (Snow, _) => SNOWFIELD,
        (Mist | Fog | Smoke | Haze | Dust | Sand | Ash, _) => HAZE,
        (Other, _) => DEFAULT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiTier {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AqiTier {
    pub fn label(&self) -> &'static str {
        match self {
            AqiTier::Good => "Good",
            AqiTier::Fair => "Fair",
            AqiTier::Moderate => "Moderate",
            AqiTier::Poor => "Poor",
            AqiTier::VeryPoor => "Very Poor",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AqiTier::Good => "#00e400",
            AqiTier::Fair => "#ffff00",
            AqiTier::Moderate => "#ff7e00",
            AqiTier::Poor => "#ff0000",
            AqiTier::VeryPoor => "#8f3f97",
        }
    }
}

/// Values above 5 clamp to `VeryPoor`; 0 is treated as `Good`.
pub fn aqi_tier(aqi: u8) -> AqiTier {
    match aqi {
        0 | 1 => AqiTier::Good,
        2 => AqiTier::Fair,
        3 => AqiTier::Moderate,
        4 => AqiTier::Poor,
        _ => AqiTier::VeryPoor,
    }
}

/// The forecast points that fall on one location-local calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Condition of the day's first point.
    pub condition: WeatherCondition,
    pub description: String,
    pub icon: String,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub points: Vec<ForecastPoint>,
}

impl DaySummary {
    fn start(date: NaiveDate, point: &ForecastPoint) -> Self {
        Self {
            date,
            condition: point.condition,
            description: point.description.clone(),
            icon: point.icon.clone(),
            min_temperature: point.temperature,
            max_temperature: point.temperature,
            points: vec![point.clone()],
        }
    }

    fn push(&mut self, point: &ForecastPoint) {
        self.min_temperature = self.min_temperature.min(point.temperature);
        self.max_temperature = self.max_temperature.max(point.temperature);
        self.points.push(point.clone());
    }
}

/// Group points by location-local date, in order of first appearance.
///
/// At most [`MAX_FORECAST_DAYS`] groups are returned; points on later dates
/// are dropped.
pub fn group_forecast_by_day(points: &[ForecastPoint], utc_offset_secs: i32) -> Vec<DaySummary> {
    let mut days: Vec<DaySummary> = Vec::new();

    for point in points {
        let date = shifted(point.timestamp, utc_offset_secs).date();
        match days.iter_mut().find(|d| d.date == date) {
            Some(day) => day.push(point),
            None => days.push(DaySummary::start(date, point)),
        }
    }

    days.truncate(MAX_FORECAST_DAYS);
    days
}

pub fn hourly(points: &[ForecastPoint]) -> &[ForecastPoint] {
    &points[..points.len().min(HOURLY_POINTS)]
}

/// One-line summary used by the share action.
pub fn share_text(conditions: &CurrentConditions) -> String {
    format!(
        "Current weather in {}, {}: {}, {}",
        conditions.name,
        conditions.country,
        format_temperature(conditions.temperature, conditions.units),
        conditions.description
    )
}
