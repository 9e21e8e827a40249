// Light/dark display preference

use crate::kv::KeyValueStore;
use tracing::{debug, error, warn};

/// Default storage key for the theme preference
pub const DEFAULT_THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read the stored theme, falling back to light
pub fn load_theme<S: KeyValueStore + ?Sized>(kv: &S, key: &str) -> Theme {
    match kv.get(key) {
        Ok(Some(value)) => Theme::parse(&value).unwrap_or_else(|| {
            warn!(key, value = %value, "Unrecognized theme value, using light");
            Theme::Light
        }),
        Ok(None) => Theme::Light,
        Err(e) => {
            warn!(key, error = %e, "Failed to read theme, using light");
            Theme::Light
        }
    }
}

/// Write the theme; failures are logged and otherwise ignored
pub fn save_theme<S: KeyValueStore + ?Sized>(kv: &mut S, key: &str, theme: Theme) {
    match kv.set(key, theme.as_str()) {
        Ok(()) => debug!(key, theme = %theme, "Saved theme"),
        Err(e) => error!(key, theme = %theme, error = %e, "Failed to save theme"),
    }
}

/// Flip the stored theme and return the new value
pub fn toggle_theme<S: KeyValueStore + ?Sized>(kv: &mut S, key: &str) -> Theme {
    let theme = load_theme(kv, key).toggled();
    save_theme(kv, key, theme);
    theme
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    #[test]
    fn test_missing_theme_is_light() {
        let kv = MemoryKvStore::new();
        assert_eq!(load_theme(&kv, DEFAULT_THEME_KEY), Theme::Light);
    }

    #[test]
    fn test_unrecognized_theme_is_light() {
        let mut kv = MemoryKvStore::new();
        kv.set(DEFAULT_THEME_KEY, "solarized").unwrap();
        assert_eq!(load_theme(&kv, DEFAULT_THEME_KEY), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let mut kv = MemoryKvStore::new();

        assert_eq!(toggle_theme(&mut kv, DEFAULT_THEME_KEY), Theme::Dark);
        assert_eq!(kv.get(DEFAULT_THEME_KEY).unwrap().as_deref(), Some("dark"));

        assert_eq!(toggle_theme(&mut kv, DEFAULT_THEME_KEY), Theme::Light);
        assert_eq!(kv.get(DEFAULT_THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_theme_independent_of_tasks() {
        let mut kv = MemoryKvStore::new();
        kv.set("todos", "[]").unwrap();

        save_theme(&mut kv, DEFAULT_THEME_KEY, Theme::Dark);

        assert_eq!(kv.get("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_theme_write_is_swallowed() {
        let mut kv = MemoryKvStore::with_quota(4);
        save_theme(&mut kv, DEFAULT_THEME_KEY, Theme::Dark);
        assert_eq!(load_theme(&kv, DEFAULT_THEME_KEY), Theme::Light);
    }
}
