//! Key-value persistence for preferences and favorites.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::model::{FavoriteLocation, Language, Preference, Preferences, Theme, Units};

pub const THEME_KEY: &str = "weather-theme";
pub const UNITS_KEY: &str = "weather-units";
pub const LANGUAGE_KEY: &str = "weather-language";
pub const FAVORITES_KEY: &str = "weather-saved-cities";

/// String-keyed JSON values that survive restarts.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in one JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, values: Map::new() });
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store file: {}", path.display()))?;
        let values = if contents.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Store file is unreadable, starting empty");
                Map::new()
            })
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a sibling temp file and renames it over the store.
    fn flush(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create store directory: {}", parent.display()))?;

        let json = serde_json::to_string_pretty(&self.values).context("Failed to serialize store")?;
        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("Failed to write store file: {}", self.path.display()))?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

/// Typed view over a [`KeyValueStore`]. Absent or undecodable values read as defaults.
pub struct PreferenceStore {
    inner: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(inner: impl KeyValueStore + 'static) -> Self {
        Self { inner: Box::new(inner) }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.inner.get(key) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!(key, error = %e, "Ignoring undecodable stored value");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Failed to read stored value");
                T::default()
            }
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize value for '{key}'"))?;
        debug!(key, "Persisting value");
        self.inner.set(key, value)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            theme: self.read::<Theme>(THEME_KEY),
            units: self.read::<Units>(UNITS_KEY),
            language: self.read::<Language>(LANGUAGE_KEY),
        }
    }

    pub fn save_preference(&mut self, preference: Preference) -> Result<()> {
        match preference {
            Preference::Theme(theme) => self.write(THEME_KEY, &theme),
            Preference::Units(units) => self.write(UNITS_KEY, &units),
            Preference::Language(language) => self.write(LANGUAGE_KEY, &language),
        }
    }

    pub fn favorites(&self) -> Vec<FavoriteLocation> {
        self.read(FAVORITES_KEY)
    }

    pub fn save_favorites(&mut self, favorites: &[FavoriteLocation]) -> Result<()> {
        self.write(FAVORITES_KEY, &favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_store_yields_defaults() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.preferences(), Preferences::default());
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn preferences_are_persisted_independently() {
        let mut store = PreferenceStore::in_memory();
        store.save_preference(Preference::Units(Units::Imperial)).unwrap();
        store.save_preference(Preference::Language(Language::De)).unwrap();

        let prefs = store.preferences();
        assert_eq!(prefs.theme, Theme::Auto);
        assert_eq!(prefs.units, Units::Imperial);
        assert_eq!(prefs.language, Language::De);
    }

    #[test]
    fn undecodable_value_reads_as_default() {
        let mut inner = MemoryStore::new();
        inner.set(THEME_KEY, json!("neon")).unwrap();
        inner.set(FAVORITES_KEY, json!({"not": "a list"})).unwrap();

        let store = PreferenceStore::new(inner);
        assert_eq!(store.preferences().theme, Theme::Auto);
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn favorites_use_saved_city_shape() {
        let mut inner = MemoryStore::new();
        inner
            .set(
                FAVORITES_KEY,
                json!([{"id": "Paris-FR", "name": "Paris", "country": "FR", "lat": 48.85, "lon": 2.35}]),
            )
            .unwrap();

        let favorites = PreferenceStore::new(inner).favorites();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, "Paris-FR");
        assert_eq!(favorites[0].lon, 2.35);
    }

    #[test]
    fn json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("store.json");

        let mut store = PreferenceStore::new(JsonFileStore::open(&path).unwrap());
        store.save_preference(Preference::Theme(Theme::Dark)).unwrap();
        store
            .save_favorites(&[FavoriteLocation {
                id: "Oslo-NO".into(),
                name: "Oslo".into(),
                country: "NO".into(),
                lat: 59.91,
                lon: 10.75,
            }])
            .unwrap();

        let reopened = PreferenceStore::new(JsonFileStore::open(&path).unwrap());
        assert_eq!(reopened.preferences().theme, Theme::Dark);
        assert_eq!(reopened.favorites()[0].name, "Oslo");
    }

    #[test]
    fn truncated_store_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        fs::write(&path, "{\n  \"weather-theme\": \"da").unwrap();

        let store = PreferenceStore::new(JsonFileStore::open(&path).unwrap());
        assert_eq!(store.preferences(), Preferences::default());
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn truncated_store_file_is_replaced_on_next_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(UNITS_KEY, json!("imperial")).unwrap();

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({"weather-units": "imperial"}));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
