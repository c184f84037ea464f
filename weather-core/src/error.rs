use thiserror::Error;

/// Failures that reach the user. `Display` is the message shown in the view.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherError {
    #[error("City not found. Please check the spelling and try again.")]
    NotFound,

    #[error("Invalid API key. Please check your OpenWeatherMap API key.")]
    Unauthorized,

    #[error("Failed to fetch weather data. Please try again later.")]
    Unavailable,

    #[error("Location access denied. Please enable location services.")]
    PermissionDenied,

    #[error("Location information is unavailable.")]
    PositionUnavailable,

    #[error("Location request timed out.")]
    Timeout,

    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    #[error("Please enter a city name")]
    InvalidInput,
}

pub type Result<T> = std::result::Result<T, WeatherError>;
