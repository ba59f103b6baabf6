//! Light/dark theme preference and where it is persisted.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ratatui::style::Color;
use serde_json::Value;

/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Unknown values fall back to the default theme.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Color::Black,
                foreground: Color::Gray,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                user_bubble: Color::Cyan,
                assistant_bubble: Color::Yellow,
                header_bg: Color::DarkGray,
            },
            Theme::Light => Palette {
                background: Color::White,
                foreground: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                user_bubble: Color::Blue,
                assistant_bubble: Color::Magenta,
                header_bg: Color::Gray,
            },
        }
    }
}

/// Colors used by the renderer for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub accent: Color,
    pub user_bubble: Color,
    pub assistant_bubble: Color,
    pub header_bg: Color,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Where the theme preference lives between runs.
pub trait ThemeStore: Send {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, value: &str) -> Result<(), StoreError>;
}

/// Small JSON key-value file, the terminal stand-in for browser local storage.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: PathBuf,
}

impl FileThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{config_dir}/cccc-chat/storage.json`
    pub fn default_location() -> Result<Self, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(config_dir.join("cccc-chat").join("storage.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let entries = self.read_all()?;
        Ok(entries
            .get(THEME_KEY)
            .and_then(|v| v.as_str())
            .map(String::from))
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        // Keep any other keys already in the file
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(THEME_KEY.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// In-process store for tests and for runs where no config directory exists.
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    value: Mutex<Option<String>>,
}

impl MemoryThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: Mutex::new(Some(value.to_string())),
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.value.lock().map(|v| v.clone()).unwrap_or(None))
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(value.to_string());
        }
        Ok(())
    }
}
