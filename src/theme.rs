//! Light/dark preference and the colors derived from it.

use ratatui::style::Color;
use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::Gray,
                foreground: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                user: Color::Blue,
                assistant: Color::Magenta,
                selection_bg: Color::Blue,
                selection_fg: Color::White,
                error: Color::Red,
            },
            Theme::Dark => Palette {
                background: Color::Black,
                foreground: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                user: Color::Cyan,
                assistant: Color::Yellow,
                selection_bg: Color::Blue,
                selection_fg: Color::White,
                error: Color::LightRed,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub error: Color,
}

/// Holds the session's theme and mirrors every change into `S`.
///
/// Storage failures never reach the caller: a failed read falls back to
/// [`Theme::Light`], a failed write keeps the in-memory value for the rest of
/// the session.
pub struct ThemeStore<S> {
    storage: S,
    current: Theme,
}

impl<S: KeyValueStore> ThemeStore<S> {
    /// Reads the persisted preference once.
    pub fn initialize(storage: S) -> Self {
        let current = match storage.get(THEME_KEY) {
            Ok(Some(value)) => Theme::from_str(&value).unwrap_or_else(|| {
                warn!(value = %value, "ignoring unknown persisted theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!("theme read failed, using default: {err}");
                Theme::default()
            }
        };
        info!(theme = current.as_str(), "theme initialized");
        Self { storage, current }
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        match self.storage.set(THEME_KEY, self.current.as_str()) {
            Ok(()) => debug!(theme = self.current.as_str(), "theme persisted"),
            Err(err) => warn!("theme write failed, keeping in-memory value: {err}"),
        }
        self.current
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::FileStore;
    use tempfile::tempdir;

    #[test]
    fn test_initialize_defaults_to_light() {
        let store = ThemeStore::initialize(MemoryStore::default());
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn test_initialize_reads_persisted_value() {
        let store = ThemeStore::initialize(MemoryStore::with(THEME_KEY, "dark"));
        assert_eq!(store.get(), Theme::Dark);
    }

    #[test]
    fn test_initialize_ignores_garbage_and_read_failure() {
        let store = ThemeStore::initialize(MemoryStore::with(THEME_KEY, "sepia"));
        assert_eq!(store.get(), Theme::Light);

        let mut failing = MemoryStore::with(THEME_KEY, "dark");
        failing.fail_reads = true;
        let store = ThemeStore::initialize(failing);
        assert_eq!(store.get(), Theme::Light);
    }

    #[test]
    fn test_toggle_twice_round_trips_and_writes_each_time() {
        let backing = MemoryStore::default();
        let mut store = ThemeStore::initialize(backing.clone());

        assert_eq!(store.toggle(), Theme::Dark);
        assert_eq!(backing.raw(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(store.toggle(), Theme::Light);
        assert_eq!(backing.raw(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(*backing.writes.borrow(), 2);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_value() {
        let mut backing = MemoryStore::default();
        backing.fail_writes = true;
        let mut store = ThemeStore::initialize(backing);

        assert_eq!(store.toggle(), Theme::Dark);
        assert_eq!(store.get(), Theme::Dark);
        assert_eq!(store.into_storage().raw(THEME_KEY), None);
    }

    #[test]
    fn test_reinitialize_from_file_yields_last_set_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = ThemeStore::initialize(FileStore::new(&path));
        store.toggle();
        store.toggle();
        store.toggle();
        assert_eq!(store.get(), Theme::Dark);
        drop(store);

        let reloaded = ThemeStore::initialize(FileStore::new(&path));
        assert_eq!(reloaded.get(), Theme::Dark);
    }
}
