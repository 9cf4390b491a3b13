use protocol::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{LocalStore, SETTINGS_KEY, THEME_KEY};

pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.1;

#[derive(Clone, PartialEq, Serialize)]
pub(crate) struct Settings {
    pub(crate) api_base: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) temperature: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_base", &self.api_base)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Settings {
    pub(crate) fn trimmed(&self) -> Self {
        Self {
            api_base: self.api_base.trim().to_string(),
            api_key: self.api_key.trim().to_string(),
            model: self.model.trim().to_string(),
            temperature: self.temperature,
        }
    }
}

#[derive(Deserialize)]
struct StoredSettings {
    #[serde(default, deserialize_with = "lenient::text")]
    api_base: String,
    #[serde(default, deserialize_with = "lenient::text")]
    api_key: String,
    #[serde(default, deserialize_with = "lenient::text")]
    model: String,
    #[serde(default)]
    temperature: Option<Value>,
}

/// Unreadable or corrupt records yield defaults.
pub(crate) fn load_settings(store: &LocalStore) -> Settings {
    let raw = match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Settings::default(),
        Err(err) => {
            tracing::debug!(event = "settings.read_failed", error = %err);
            return Settings::default();
        }
    };
    match serde_json::from_str::<StoredSettings>(&raw) {
        Ok(stored) => Settings {
            api_base: stored.api_base,
            api_key: stored.api_key,
            model: stored.model,
            temperature: temperature_from_value(stored.temperature.as_ref()),
        },
        Err(err) => {
            tracing::debug!(event = "settings.parse_failed", error = %err);
            Settings::default()
        }
    }
}

pub(crate) fn save_settings(store: &LocalStore, settings: &Settings) -> anyhow::Result<()> {
    let record = serde_json::to_string(&settings.trimmed())?;
    store.set(SETTINGS_KEY, &record)?;
    tracing::info!(
        event = "settings.saved",
        api_base = %settings.api_base.trim(),
        model = %settings.model.trim(),
        temperature = settings.temperature,
    );
    Ok(())
}

pub(crate) fn parse_temperature(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(DEFAULT_TEMPERATURE)
}

fn temperature_from_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_TEMPERATURE),
        Some(Value::String(raw)) => parse_temperature(raw),
        _ => DEFAULT_TEMPERATURE,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub(crate) fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    pub(crate) fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

pub(crate) fn load_theme(store: &LocalStore) -> ThemeMode {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => ThemeMode::parse(&raw).unwrap_or_default(),
        Ok(None) => ThemeMode::default(),
        Err(err) => {
            tracing::debug!(event = "theme.read_failed", error = %err);
            ThemeMode::default()
        }
    }
}

/// Flips the theme and persists it. A failed write still switches the
/// in-memory theme.
pub(crate) fn toggle_theme(store: &LocalStore, current: ThemeMode) -> ThemeMode {
    let next = current.toggled();
    if let Err(err) = store.set(THEME_KEY, next.as_str()) {
        tracing::warn!(event = "theme.write_failed", error = %err);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path());
        (dir, store)
    }

    #[test]
    fn absent_record_yields_defaults() {
        let (_dir, store) = temp_store();
        let settings = load_settings(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn saved_settings_reload_exactly() {
        let (_dir, store) = temp_store();
        let settings = Settings {
            api_base: "https://llm.example/v1".to_string(),
            api_key: "sk-local".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.35,
        };
        save_settings(&store, &settings).expect("save");
        assert_eq!(load_settings(&store), settings);
    }

    #[test]
    fn save_trims_text_fields() {
        let (_dir, store) = temp_store();
        let settings = Settings {
            api_base: "  https://llm.example/v1 ".to_string(),
            api_key: " sk ".to_string(),
            model: "m\n".to_string(),
            temperature: 0.2,
        };
        save_settings(&store, &settings).expect("save");
        let loaded = load_settings(&store);
        assert_eq!(loaded.api_base, "https://llm.example/v1");
        assert_eq!(loaded.api_key, "sk");
        assert_eq!(loaded.model, "m");
    }

    #[test]
    fn zero_temperature_survives_reload() {
        let (_dir, store) = temp_store();
        let settings = Settings {
            temperature: 0.0,
            ..Settings::default()
        };
        save_settings(&store, &settings).expect("save");
        assert_eq!(load_settings(&store).temperature, 0.0);
    }

    #[test]
    fn corrupt_record_is_ignored() {
        let (_dir, store) = temp_store();
        store.set(SETTINGS_KEY, "{not json").expect("seed");
        assert_eq!(load_settings(&store), Settings::default());
    }

    #[test]
    fn unparseable_temperature_defaults() {
        let (_dir, store) = temp_store();
        store
            .set(
                SETTINGS_KEY,
                r#"{"api_base":"b","api_key":"k","model":"m","temperature":"warm"}"#,
            )
            .expect("seed");
        let loaded = load_settings(&store);
        assert_eq!(loaded.model, "m");
        assert_eq!(loaded.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(parse_temperature(""), DEFAULT_TEMPERATURE);
        assert_eq!(parse_temperature("0.7"), 0.7);
    }

    #[test]
    fn theme_defaults_to_dark_and_toggles() {
        let (_dir, store) = temp_store();
        assert_eq!(load_theme(&store), ThemeMode::Dark);
        let next = toggle_theme(&store, ThemeMode::Dark);
        assert_eq!(next, ThemeMode::Light);
        assert_eq!(store.get(THEME_KEY).expect("get").as_deref(), Some("light"));
        assert_eq!(load_theme(&store), ThemeMode::Light);
        store.set(THEME_KEY, "sepia").expect("seed");
        assert_eq!(load_theme(&store), ThemeMode::Dark);
    }
}
