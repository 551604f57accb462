//! Schema switcher: which schemas exist and which ones the user enabled.
//!
//! `SchemaCatalog` is a thin load → read/mutate → save wrapper over a
//! `SettingsStore`. Every call starts from a fresh `load`, so no stale copy
//! of the settings is kept between calls.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::{ProtoError, Result};

/// A schema as listed by the switcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaItem {
    pub schema_id: String,
    #[serde(default)]
    pub name: String,
}

impl SchemaItem {
    pub fn new<I: Into<String>, N: Into<String>>(schema_id: I, name: N) -> Self {
        Self {
            schema_id: schema_id.into(),
            name: name.into(),
        }
    }
}

/// Persisted switcher state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherSettings {
    pub available: Vec<SchemaItem>,
    /// Ids of the enabled schemas, in menu order
    pub selected: Vec<String>,
}

impl SwitcherSettings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn find(&self, schema_id: &str) -> Option<&SchemaItem> {
        self.available.iter().find(|s| s.schema_id == schema_id)
    }
}

/// Where switcher settings live.
pub trait SettingsStore {
    fn load(&self) -> Result<SwitcherSettings>;
    fn save(&self, settings: &SwitcherSettings) -> Result<()>;
}

/// Settings kept in a TOML file. A missing file loads as empty settings.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<SwitcherSettings> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => SwitcherSettings::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SwitcherSettings::default()),
            Err(e) => Err(ProtoError::Settings(format!(
                "read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, settings: &SwitcherSettings) -> Result<()> {
        let content = settings.to_toml_string()?;
        std::fs::write(&self.path, content)
            .map_err(|e| ProtoError::Settings(format!("write {}: {}", self.path.display(), e)))
    }
}

/// Settings held in memory.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<SwitcherSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: SwitcherSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<SwitcherSettings> {
        Ok(self
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, settings: &SwitcherSettings) -> Result<()> {
        *self.settings.lock().unwrap_or_else(PoisonError::into_inner) = settings.clone();
        Ok(())
    }
}

pub struct SchemaCatalog<S> {
    store: S,
}

impl<S: SettingsStore> SchemaCatalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load(&self) -> Option<SwitcherSettings> {
        match self.store.load() {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("failed to load switcher settings: {}", e);
                None
            }
        }
    }

    /// Every schema the switcher knows about.
    pub fn list_schemas(&self) -> Vec<SchemaItem> {
        self.load().map(|s| s.available).unwrap_or_default()
    }

    /// The enabled schemas, in stored order. Ids no longer available are
    /// listed with an empty name.
    pub fn list_selected_schemas(&self) -> Vec<SchemaItem> {
        let Some(settings) = self.load() else {
            return Vec::new();
        };
        settings
            .selected
            .iter()
            .map(|id| {
                settings
                    .find(id)
                    .cloned()
                    .unwrap_or_else(|| SchemaItem::new(id.as_str(), ""))
            })
            .collect()
    }

    /// Replace the enabled set and save it.
    ///
    /// Duplicate ids are dropped, keeping first occurrence order. Fails
    /// without saving if the set is empty or names an unavailable schema.
    pub fn select_schemas<T: AsRef<str>>(&self, ids: &[T]) -> bool {
        let Some(mut settings) = self.load() else {
            return false;
        };

        let mut selected: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let id: &str = id.as_ref();
            if settings.find(id).is_none() {
                tracing::warn!(schema_id = id, "select_schemas: schema not available");
                return false;
            }
            if !selected.iter().any(|s| s == id) {
                selected.push(id.to_string());
            }
        }
        if selected.is_empty() {
            tracing::warn!("select_schemas: refusing to select no schema");
            return false;
        }

        settings.selected = selected;
        match self.store.save(&settings) {
            Ok(()) => {
                tracing::debug!(count = settings.selected.len(), "saved selected schemas");
                true
            }
            Err(e) => {
                tracing::warn!("failed to save switcher settings: {}", e);
                false
            }
        }
    }
}
