//! Display preferences: colour theme and 3D chart style.
//!
//! `Settings` is an explicit value loaded from a `PreferenceStore` and handed
//! to whatever needs it. Every change is written through to the store.

use std::collections::HashMap;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::logging::log_setting;

pub const THEME_KEY: &str = "theme";
pub const CHART_3D_KEY: &str = "chart3DStyle";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chart3DStyle {
    #[default]
    Off,
    Subtle,
    Iso,
}

impl Chart3DStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chart3DStyle::Off => "off",
            Chart3DStyle::Subtle => "subtle",
            Chart3DStyle::Iso => "iso",
        }
    }

    /// Class added to chart containers; none when 3D is off.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Chart3DStyle::Off => None,
            Chart3DStyle::Subtle => Some("chart-3d-subtle"),
            Chart3DStyle::Iso => Some("chart-3d-iso"),
        }
    }
}

impl FromStr for Chart3DStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Chart3DStyle::Off),
            "subtle" => Ok(Chart3DStyle::Subtle),
            "iso" => Ok(Chart3DStyle::Iso),
            other => Err(format!("unknown 3D style: {}", other)),
        }
    }
}

/// String key-value persistence.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

pub struct SqlitePreferenceStore {
    conn: Connection,
}

impl SqlitePreferenceStore {
    pub fn open(path: &str) -> Result<Self, SettingsError> {
        let mut store = Self { conn: Connection::open(path)? };
        store.init()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, SettingsError> {
        let mut store = Self { conn: Connection::open_in_memory()? };
        store.init()?;
        Ok(store)
    }

    fn init(&mut self) -> Result<(), SettingsError> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let value = self
            .conn
            .query_row("SELECT value FROM preferences WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    #[serde(rename = "chart3DStyle")]
    pub chart_3d_style: Chart3DStyle,
}

fn read_pref<T: FromStr + Default + Copy>(
    store: &dyn PreferenceStore,
    key: &str,
) -> Result<T, SettingsError> {
    let stored = store.get(key)?;
    let value = stored.as_deref().and_then(|s| s.parse().ok());
    let source = match (&stored, &value) {
        (None, _) => "default",
        (Some(_), None) => "default_invalid",
        (Some(_), Some(_)) => "store",
    };
    let value = value.unwrap_or_default();
    log_setting(key, stored.as_deref().unwrap_or(""), source);
    Ok(value)
}

impl Settings {
    /// Reads both preferences; missing or unrecognised values fall back to
    /// dark / off.
    pub fn load(store: &dyn PreferenceStore) -> Result<Self, SettingsError> {
        Ok(Self {
            theme: read_pref(store, THEME_KEY)?,
            chart_3d_style: read_pref(store, CHART_3D_KEY)?,
        })
    }

    pub fn set_theme(&mut self, store: &mut dyn PreferenceStore, theme: Theme) -> Result<(), SettingsError> {
        store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        log_setting(THEME_KEY, theme.as_str(), "user");
        Ok(())
    }

    pub fn set_chart_3d_style(
        &mut self,
        store: &mut dyn PreferenceStore,
        style: Chart3DStyle,
    ) -> Result<(), SettingsError> {
        store.set(CHART_3D_KEY, style.as_str())?;
        self.chart_3d_style = style;
        log_setting(CHART_3D_KEY, style.as_str(), "user");
        Ok(())
    }

    pub fn is_3d(&self) -> bool {
        self.chart_3d_style != Chart3DStyle::Off
    }
}
