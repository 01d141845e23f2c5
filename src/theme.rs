//! Light/dark theme preference, the only state persisted between visits.

use crate::config::THEME_KEY;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Value of the `data-theme` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Decode a stored value: a bare `light` / `dark`, or its JSON string form.
    pub fn decode(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            quoted => serde_json::from_str(quoted).ok(),
        }
    }
}

/// String key/value storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

/// Process-local store, for hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Saved theme, or the dark default when nothing usable is stored.
pub fn load_theme(store: &dyn PreferenceStore) -> Theme {
    match store.get(THEME_KEY) {
        Some(raw) => Theme::decode(&raw).unwrap_or_else(|| {
            debug!("Ignoring unknown stored theme {:?}", raw);
            Theme::default()
        }),
        None => Theme::default(),
    }
}

/// Stores the bare `light` / `dark` value.
pub fn save_theme(store: &dyn PreferenceStore, theme: Theme) {
    if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
        warn!("Could not save theme preference: {}", e);
    }
}

/// Flip the stored theme and return the new one.
pub fn toggle_theme(store: &dyn PreferenceStore, current: Theme) -> Theme {
    let next = current.toggled();
    save_theme(store, next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_dark() {
        let store = MemoryStore::default();
        assert_eq!(load_theme(&store), Theme::Dark);
        store.set(THEME_KEY, "purple").unwrap();
        assert_eq!(load_theme(&store), Theme::Dark);
    }

    #[test]
    fn stored_value_is_unquoted() {
        let store = MemoryStore::default();
        save_theme(&store, Theme::Dark);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));
        store.set(THEME_KEY, "\"light\"").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn toggle_persists() {
        let store = MemoryStore::default();
        let theme = toggle_theme(&store, load_theme(&store));
        assert_eq!(theme, Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(load_theme(&store), Theme::Light);
        assert_eq!(toggle_theme(&store, theme), Theme::Dark);
        assert_eq!(load_theme(&store), Theme::Dark);
    }

    #[test]
    fn reads_bare_and_quoted_values() {
        assert_eq!(Theme::decode("light"), Some(Theme::Light));
        assert_eq!(Theme::decode("\"dark\""), Some(Theme::Dark));
        assert_eq!(Theme::decode(" light\n"), Some(Theme::Light));
        assert_eq!(Theme::decode(""), None);
    }
}
