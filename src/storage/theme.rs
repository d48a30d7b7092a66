//! Theme preference, stored independently of the widget collection.

use crate::storage::error::StorageResult;
use crate::storage::kv::KeyValueStore;
use crate::storage::types::Theme;

/// Storage key holding the theme preference
pub const THEME_KEY: &str = "theme";

pub struct ThemeStore<S> {
    store: S,
}

impl<S: KeyValueStore> ThemeStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the saved theme, falling back to light
    pub fn load(&self) -> StorageResult<Theme> {
        let theme = match self.store.get(THEME_KEY)? {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; using light theme", e);
                Theme::Light
            }),
            None => Theme::Light,
        };
        Ok(theme)
    }

    pub fn set(&self, theme: Theme) -> StorageResult<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    /// Flip between light and dark and persist the result
    pub fn toggle(&self) -> StorageResult<Theme> {
        let next = self.load()?.toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        let themes = ThemeStore::new(MemoryStore::new());
        assert_eq!(themes.load().unwrap(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let themes = ThemeStore::new(std::sync::Arc::clone(&store));

        assert_eq!(themes.toggle().unwrap(), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(themes.toggle().unwrap(), Theme::Light);
        assert_eq!(themes.load().unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_value_falls_back() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "solarized").unwrap();
        assert_eq!(ThemeStore::new(store).load().unwrap(), Theme::Light);
    }
}
