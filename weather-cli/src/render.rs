use skyview_core::{
    AirQualitySample, CurrentConditions, ForecastSeries, Orchestrator, Tab, ViewState,
    format::{
        Background, aqi_tier, format_date, format_hour, format_temperature, format_time,
        group_forecast_by_day, hourly, icon_url, local_date_time,
    },
};
use std::fmt::Write;

/// Presentation state that lives outside [`ViewState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Decor {
    pub is_favorite: bool,
    pub is_dark: bool,
    pub background: Option<Background>,
}

impl Decor {
    pub fn of(app: &Orchestrator) -> Self {
        Self {
            is_favorite: app.view().conditions.as_ref().is_some_and(|c| app.is_favorite(c)),
            is_dark: app.is_dark(),
            background: app.background(),
        }
    }
}

/// Human-readable rendering of the active tab. Values are shown in the units
/// they were fetched in, not the current preference.
pub fn render_view(view: &ViewState, decor: &Decor) -> String {
    let mut out = String::new();

    if let Some(error) = &view.error {
        let _ = writeln!(out, "✗ {error}");
    }

    let Some(conditions) = &view.conditions else {
        if view.error.is_none() {
            out.push_str(
                "Enter a city name, ZIP code, or coordinates (lat,lon), \
                 or run `skyview here` for your configured location.\n",
            );
        }
        return out;
    };

    match view.tab {
        Tab::Current => render_current(&mut out, conditions, decor),
        Tab::Forecast => match &view.forecast {
            Some(forecast) => render_forecast(&mut out, forecast),
            None => out.push_str("Forecast unavailable.\n"),
        },
        Tab::AirQuality => match &view.air_quality {
            Some(sample) => render_air_quality(&mut out, sample),
            None => out.push_str("Air quality unavailable for this location.\n"),
        },
    }

    out
}

fn render_current(out: &mut String, c: &CurrentConditions, decor: &Decor) {
    let local = local_date_time(c.utc_offset_secs);
    let star = if decor.is_favorite { " ★" } else { "" };

    let _ = writeln!(out, "{}, {}{star}", c.name, c.country);
    let _ = writeln!(out, "{} · {}", local.date, local.time);
    let _ = writeln!(
        out,
        "{}  {} (feels like {})",
        format_temperature(c.temperature, c.units),
        c.description,
        format_temperature(c.feels_like, c.units)
    );
    let _ = writeln!(out, "Humidity    {}%", c.humidity_pct);
    let _ = writeln!(out, "Wind        {:.1} {}", c.wind_speed, c.units.speed_suffix());
    let _ = writeln!(out, "Pressure    {} hPa", c.pressure_hpa.round());
    if let Some(visibility) = c.visibility_m {
        let _ = writeln!(out, "Visibility  {:.1} km", f64::from(visibility) / 1000.0);
    }
    let _ = writeln!(out, "Sunrise     {}", format_time(c.sunrise, c.utc_offset_secs));
    let _ = writeln!(out, "Sunset      {}", format_time(c.sunset, c.utc_offset_secs));
    let _ = writeln!(out, "Icon        {}", icon_url(&c.icon));
    if let Some(background) = decor.background {
        let scheme = if decor.is_dark { "dark" } else { "light" };
        let _ = writeln!(out, "Backdrop    {scheme} · {}", background.css());
    }
}

fn render_forecast(out: &mut String, f: &ForecastSeries) {
    let _ = writeln!(out, "5-Day Forecast · {}, {}", f.name, f.country);
    for day in group_forecast_by_day(&f.points, f.utc_offset_secs) {
        let first = day.points.first().map(|p| p.timestamp).unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<12} {:>6} / {:<6} {}",
            format_date(first, f.utc_offset_secs),
            format_temperature(day.max_temperature, f.units),
            format_temperature(day.min_temperature, f.units),
            day.condition
        );
    }

    out.push_str("24-Hour Forecast\n");
    for point in hourly(&f.points) {
        let _ = writeln!(
            out,
            "  {:<6} {:>6} {}",
            format_hour(point.timestamp, f.utc_offset_secs),
            format_temperature(point.temperature, f.units),
            point.condition
        );
    }
}

fn render_air_quality(out: &mut String, sample: &AirQualitySample) {
    let tier = aqi_tier(sample.aqi);
    let p = &sample.pollutants;

    let _ = writeln!(out, "Air Quality Index  {} ({})", sample.aqi, tier.label());
    let _ = writeln!(out, "  PM2.5  {:.1} μg/m³", p.pm2_5);
    let _ = writeln!(out, "  PM10   {:.1} μg/m³", p.pm10);
    let _ = writeln!(out, "  O₃     {:.1} μg/m³", p.o3);
    let _ = writeln!(out, "  NO₂    {:.1} μg/m³", p.no2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyview_core::{
        Coordinates, ForecastPoint, Units, WeatherCondition, format::background_for,
        model::Pollutants,
    };

    fn paris(units: Units) -> CurrentConditions {
        CurrentConditions {
            name: "Paris".into(),
            country: "FR".into(),
            coordinates: Coordinates::new(48.85, 2.35),
            temperature: 20.6,
            feels_like: 19.4,
            humidity_pct: 55,
            pressure_hpa: 1016.0,
            wind_speed: 3.04,
            visibility_m: Some(8000),
            utc_offset_secs: 7200,
            condition: WeatherCondition::Clear,
            description: "clear sky".into(),
            icon: "01d".into(),
            sunrise: 1_718_339_400,
            sunset: 1_718_397_000,
            units,
        }
    }

    #[test]
    fn empty_view_shows_welcome() {
        let out = render_view(&ViewState::default(), &Decor::default());
        assert!(out.contains("Enter a city name"));
    }

    #[test]
    fn error_without_conditions_shows_only_error() {
        let view = ViewState { error: Some("Location request timed out.".into()), ..Default::default() };
        let out = render_view(&view, &Decor::default());
        assert_eq!(out, "✗ Location request timed out.\n");
    }

    #[test]
    fn current_tab_uses_fetched_units() {
        let view = ViewState { conditions: Some(paris(Units::Imperial)), ..Default::default() };
        let out = render_view(&view, &Decor { is_favorite: true, ..Default::default() });

        assert!(out.starts_with("Paris, FR ★\n"));
        assert!(out.contains("21°F  clear sky (feels like 19°F)"));
        assert!(out.contains("3.0 mph"));
        assert!(out.contains("Visibility  8.0 km"));
        assert!(out.contains("Icon        https://openweathermap.org/img/wn/01d@2x.png"));
        assert!(!out.contains("Backdrop"));
    }

    #[test]
    fn current_tab_shows_resolved_backdrop() {
        let view = ViewState { conditions: Some(paris(Units::Metric)), ..Default::default() };
        let decor = Decor {
            is_dark: true,
            background: Some(background_for(WeatherCondition::Clear, true)),
            ..Default::default()
        };
        let out = render_view(&view, &decor);

        assert!(out.contains(
            "Backdrop    dark · linear-gradient(135deg, #1e3c72 0%, #2a5298 100%)"
        ));
    }

    #[test]
    fn error_is_shown_above_previous_conditions() {
        let view = ViewState {
            conditions: Some(paris(Units::Metric)),
            error: Some("City not found. Please check the spelling and try again.".into()),
            ..Default::default()
        };
        let out = render_view(&view, &Decor::default());

        assert!(out.starts_with("✗ City not found"));
        assert!(out.contains("Paris, FR"));
    }

    #[test]
    fn forecast_tab_lists_days_and_hours() {
        let points = (0..16)
            .map(|i| ForecastPoint {
                timestamp: 1_718_323_200 + i * 10_800,
                temperature: 15.0 + i as f64,
                condition: WeatherCondition::Rain,
                description: "light rain".into(),
                icon: "10d".into(),
            })
            .collect();
        let view = ViewState {
            conditions: Some(paris(Units::Metric)),
            forecast: Some(ForecastSeries {
                name: "Paris".into(),
                country: "FR".into(),
                utc_offset_secs: 0,
                points,
                units: Units::Metric,
            }),
            tab: Tab::Forecast,
            ..Default::default()
        };
        let out = render_view(&view, &Decor::default());

        assert!(out.contains("5-Day Forecast · Paris, FR"));
        assert!(out.contains("24-Hour Forecast"));
        assert_eq!(out.lines().filter(|l| l.contains("Rain")).count(), 2 + 8);
    }

    #[test]
    fn missing_air_quality_is_reported_gently() {
        let view = ViewState {
            conditions: Some(paris(Units::Metric)),
            tab: Tab::AirQuality,
            ..Default::default()
        };
        assert!(render_view(&view, &Decor::default()).contains("Air quality unavailable"));
    }

    #[test]
    fn air_quality_tab_shows_tier() {
        let view = ViewState {
            conditions: Some(paris(Units::Metric)),
            air_quality: Some(AirQualitySample {
                aqi: 4,
                pollutants: Pollutants { pm2_5: 35.25, ..Default::default() },
            }),
            tab: Tab::AirQuality,
            ..Default::default()
        };
        let out = render_view(&view, &Decor::default());
        assert!(out.contains("Air Quality Index  4 (Poor)"));
        assert!(out.contains("PM2.5  35.2 μg/m³") || out.contains("PM2.5  35.3 μg/m³"));
    }
}
