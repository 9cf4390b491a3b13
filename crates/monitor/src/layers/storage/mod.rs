mod preferences;

pub(crate) use preferences::{
    load_settings, load_theme, parse_temperature, save_settings, toggle_theme, Settings,
    ThemeMode,
};

use anyhow::Context;
use std::io;
use std::path::{Path, PathBuf};

pub(crate) const SETTINGS_KEY: &str = "xh_ai_monitor_config";
pub(crate) const THEME_KEY: &str = "xh_ai_monitor_theme";

const APP_DIR_NAME: &str = "aigc-monitor";

/// Per-user key/value store; one file per key under `root`.
#[derive(Debug, Clone)]
pub(crate) struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub(crate) fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn default_root() -> anyhow::Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| anyhow::anyhow!("could not resolve user config directory"))
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.root.join(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    pub(crate) fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        let path = self.root.join(key);
        let staging = self.root.join(format!(".{key}.tmp"));
        std::fs::write(&staging, value)
            .with_context(|| format!("failed to write {}", staging.display()))?;
        std::fs::rename(&staging, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path());
        assert_eq!(store.get(THEME_KEY).expect("get"), None);
    }

    #[test]
    fn set_creates_root_and_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path().join("nested"));
        store.set(THEME_KEY, "light").expect("first write");
        store.set(THEME_KEY, "dark").expect("second write");
        assert_eq!(store.get(THEME_KEY).expect("get").as_deref(), Some("dark"));
    }
}
