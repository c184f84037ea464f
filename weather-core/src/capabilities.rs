//! Host capabilities the orchestrator depends on but does not own:
//! device position, the system colour-scheme preference and sharing.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use tracing::{debug, warn};

use crate::{
    error::{Result, WeatherError},
    model::{Coordinates, Theme},
};

/// Default bound on a position request.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait GeolocationProvider: Send + Sync + Debug {
    /// Fails with `PermissionDenied`, `PositionUnavailable`, `Timeout` or `Unsupported`.
    async fn current_position(&self) -> Result<Coordinates>;
}

/// A position known up front (e.g. from config); `None` means the host cannot locate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Coordinates>);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        self.0.ok_or(WeatherError::Unsupported)
    }
}

/// Ask `provider` for a position, giving up after `timeout`.
pub async fn locate(provider: &dyn GeolocationProvider, timeout: Duration) -> Result<Coordinates> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(coords)) => {
            debug!(%coords, "Position acquired");
            Ok(coords)
        }
        Ok(Err(e)) => {
            warn!(error = ?e, "Geolocation failed");
            Err(e)
        }
        Err(_) => {
            warn!(?timeout, "Geolocation timed out");
            Err(WeatherError::Timeout)
        }
    }
}

pub trait ThemeProbe: Send + Sync + Debug {
    /// Whether the host asks for a dark colour scheme.
    fn prefers_dark(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticTheme {
    pub dark: bool,
}

impl ThemeProbe for StaticTheme {
    fn prefers_dark(&self) -> bool {
        self.dark
    }
}

pub fn resolve_dark(theme: Theme, probe: &dyn ThemeProbe) -> bool {
    match theme {
        Theme::Dark => true,
        Theme::Light => false,
        Theme::Auto => probe.prefers_dark(),
    }
}

#[async_trait]
pub trait ShareTarget: Send + Sync + Debug {
    async fn share(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Failed,
}

/// Try the native share capability, then fall back to the clipboard. Never fails.
pub async fn share_with_fallback(
    native: Option<&dyn ShareTarget>,
    clipboard: &dyn ShareTarget,
    text: &str,
) -> ShareOutcome {
    if let Some(native) = native {
        match native.share(text).await {
            Ok(()) => return ShareOutcome::Shared,
            Err(e) => debug!(error = %e, "Native share failed, falling back to clipboard"),
        }
    }

    match clipboard.share(text).await {
        Ok(()) => ShareOutcome::Copied,
        Err(e) => {
            warn!(error = %e, "Clipboard fallback failed");
            ShareOutcome::Failed
        }
    }
}
