use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use skyview_core::{
    Config, JsonFileStore, Language, LocationQuery, OpenWeatherGateway, Orchestrator, Preference,
    PreferenceStore, Tab, Theme, Units,
    capabilities::{FixedPosition, ShareOutcome},
    classify,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    host::{EnvTheme, PrintToStdout},
    render::{Decor, render_view},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Current weather, forecast and air quality")]
pub struct Cli {
    /// Without a subcommand, look up the configured current location.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and, optionally, your home coordinates.
    Configure,

    /// Show weather for a city name, ZIP code or `lat,lon`.
    Show {
        #[arg(required = true)]
        query: Vec<String>,

        /// current, forecast or air-quality
        #[arg(long, default_value = "current")]
        tab: Tab,

        /// Add the result to favorites, or remove it if already there.
        #[arg(long)]
        fav: bool,
    },

    /// Show weather for the configured current location.
    Here {
        #[arg(long, default_value = "current")]
        tab: Tab,
    },

    /// Manage favorite locations.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesCommand>,
    },

    /// Change a preference.
    Set {
        #[command(subcommand)]
        setting: SetCommand,
    },

    /// Look up a location and share a one-line summary.
    Share {
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    List,
    /// Show weather for a favorite, by id (e.g. `Paris-FR`).
    Open {
        id: String,
        #[arg(long, default_value = "current")]
        tab: Tab,
    },
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// light, dark or auto
    Theme { value: Theme },
    /// metric or imperial
    Units { value: Units },
    /// en, es, fr, de, it, pt, ru, ja, zh, hi or ar
    Language { value: Language },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Some(Command::Configure) => configure(config),
            Some(Command::Set { setting }) => {
                let preference = match setting {
                    SetCommand::Theme { value } => Preference::Theme(value),
                    SetCommand::Units { value } => Preference::Units(value),
                    SetCommand::Language { value } => Preference::Language(value),
                };
                let mut app = session(&config)?;
                app.change_preference(preference)?;
                println!("{}", describe_preference(&app, preference));
                Ok(())
            }
            Some(Command::Favorites { action: None | Some(FavoritesCommand::List) }) => {
                list_favorites(&open_store()?);
                Ok(())
            }
            Some(Command::Favorites { action: Some(FavoritesCommand::Remove { id }) }) => {
                let mut app = session(&config)?;
                if app.remove_favorite(&id)? {
                    println!("Removed {id}.");
                } else {
                    println!("No favorite with id '{id}'.");
                }
                Ok(())
            }
            Some(Command::Favorites { action: Some(FavoritesCommand::Open { id, tab }) }) => {
                let mut app = session(&config)?;
                let favorite = app
                    .favorites()
                    .iter()
                    .find(|f| f.id == id)
                    .cloned()
                    .with_context(|| format!("No favorite with id '{id}'"))?;
                app.set_tab(tab);
                app.select_favorite(&favorite);
                app.settle().await;
                show(&app)
            }
            Some(Command::Show { query, tab, fav }) => {
                let mut app = session(&config)?;
                app.set_tab(tab);
                app.search(&query.join(" "));
                app.settle().await;

                if fav {
                    if let Some(conditions) = app.view().conditions.clone() {
                        let added = app.toggle_favorite(&conditions)?;
                        let verb = if added { "Added to" } else { "Removed from" };
                        println!("{verb} favorites: {}", conditions.favorite_id());
                    }
                }
                show(&app)
            }
            Some(Command::Here { tab }) => {
                let mut app = session(&config)?;
                app.set_tab(tab);
                app.use_current_location().await;
                app.settle().await;
                show(&app)
            }
            Some(Command::Share { query }) => {
                let mut app = session(&config)?;
                app.search(&query.join(" "));
                app.settle().await;

                match app.share(None, &PrintToStdout).await {
                    Some(ShareOutcome::Failed) => eprintln!("Could not share."),
                    Some(outcome) => debug!(?outcome, "Shared summary"),
                    None => return show(&app),
                }
                Ok(())
            }
            None => {
                let mut app = session(&config)?;
                app.activate().await;
                app.settle().await;
                show(&app)
            }
        }
    }
}

fn open_store() -> Result<PreferenceStore> {
    let store = JsonFileStore::open(Config::store_file_path()?)?;
    debug!(path = %store.path().display(), "Opened preference store");
    Ok(PreferenceStore::new(store))
}

fn session(config: &Config) -> Result<Orchestrator> {
    let gateway = OpenWeatherGateway::new(config.gateway_config()?)?;

    Ok(Orchestrator::new(Arc::new(gateway), open_store()?)
        .with_geolocation(Arc::new(FixedPosition(config.home)))
        .with_geolocation_timeout(config.geolocation_timeout())
        .with_theme_probe(Arc::new(EnvTheme)))
}

fn show(app: &Orchestrator) -> Result<()> {
    let view = app.view();
    if let (None, Some(error)) = (&view.conditions, &view.error) {
        anyhow::bail!("{error}");
    }

    print!("{}", render_view(view, &Decor::of(app)));
    Ok(())
}

fn describe_preference(app: &Orchestrator, preference: Preference) -> String {
    match preference {
        Preference::Theme(theme) => {
            let scheme = if app.is_dark() { "dark" } else { "light" };
            format!("Theme set to {} (currently {scheme}).", theme.as_str())
        }
        Preference::Units(units) => format!(
            "Units set to {}. New lookups will use {}.",
            units.as_str(),
            units.temperature_suffix()
        ),
        Preference::Language(language) => {
            format!("Language set to {} ({}).", language.native_name(), language.code())
        }
    }
}

fn list_favorites(store: &PreferenceStore) {
    let favorites = store.favorites();
    if favorites.is_empty() {
        println!("No favorites yet. Add one with `skyview show <city> --fav`.");
        return;
    }
    for f in favorites {
        println!("{:<24} {}, {}  ({:.4}, {:.4})", f.id, f.name, f.country, f.lat, f.lon);
    }
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let home = Text::new("Home coordinates as lat,lon (leave empty to skip):")
        .prompt()
        .context("Failed to read home coordinates")?;
    if !home.trim().is_empty() {
        match classify(&home) {
            LocationQuery::Coordinates(coords) => config.home = Some(coords),
            _ => anyhow::bail!("'{}' is not a lat,lon pair", home.trim()),
        }
    }

    config.save()?;
    info!(home = ?config.home, "Saved configuration");
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
