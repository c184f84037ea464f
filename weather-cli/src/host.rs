//! Terminal stand-ins for the capabilities a browser would provide.

use async_trait::async_trait;
use skyview_core::capabilities::{ShareTarget, ThemeProbe};

pub const THEME_ENV: &str = "SKYVIEW_THEME";

/// Reads the terminal's colour scheme from `SKYVIEW_THEME` (`dark` / `light`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTheme;

impl ThemeProbe for EnvTheme {
    fn prefers_dark(&self) -> bool {
        std::env::var(THEME_ENV)
            .map(|v| v.eq_ignore_ascii_case("dark"))
            .unwrap_or(false)
    }
}

/// The terminal has no clipboard we can rely on; print the text so it can be copied.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintToStdout;

#[async_trait]
impl ShareTarget for PrintToStdout {
    async fn share(&self, text: &str) -> anyhow::Result<()> {
        println!("{text}");
        Ok(())
    }
}
