use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{
    entities::{ExportDocument, SettingsEntity, TrackingDataEntity},
    kv_store::KeyValueStore,
};

pub const DEFAULT_NAMESPACE: &str = "focuswave";

/// Names of the keys the application owns in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub tracking: String,
    pub settings: String,
    /// Written by older dashboard versions. Only ever removed.
    pub analytics: String,
}

impl StoreKeys {
    pub fn namespaced(namespace: &str) -> Self {
        Self {
            tracking: format!("{namespace}_wellbeing"),
            settings: format!("{namespace}_settings"),
            analytics: format!("{namespace}_analytics"),
        }
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::namespaced(DEFAULT_NAMESPACE)
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Import document must be a JSON object")]
    NotAnObject,

    #[error("Failed to write imported data: {0}")]
    Store(anyhow::Error),
}

/// What an import wrote into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub wellbeing: bool,
    pub settings: bool,
}

/// Bridges the tracker and a [KeyValueStore].
///
/// Loading and saving tracking data never fail: unreadable data falls back to defaults and a
/// failed save is logged and skipped, the next save will write the state again.
pub struct Persistence<S> {
    store: S,
    keys: StoreKeys,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StoreKeys::default())
    }

    pub fn with_keys(store: S, keys: StoreKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self) -> TrackingDataEntity {
        self.read_or_default(&self.keys.tracking)
    }

    pub fn save(&self, data: &TrackingDataEntity) -> bool {
        let raw = match serde_json::to_string(data) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to serialize tracking data {e:?}");
                return false;
            }
        };
        match self.store.set(&self.keys.tracking, &raw) {
            Ok(()) => {
                debug!("Saved tracking data");
                true
            }
            Err(e) => {
                warn!("Skipping save, store refused tracking data {e:?}");
                false
            }
        }
    }

    /// Removes tracking data, settings and the legacy analytics key. The caller is expected to
    /// start over with a fresh tracker.
    pub fn clear(&self) {
        for key in [&self.keys.tracking, &self.keys.settings, &self.keys.analytics] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to remove {key} {e:?}");
            }
        }
        info!("Cleared all persisted data");
    }

    pub fn load_settings(&self) -> SettingsEntity {
        self.read_or_default(&self.keys.settings)
    }

    /// Whether settings were ever written. Stored goals are only overridden by settings that
    /// exist.
    pub fn has_settings(&self) -> bool {
        matches!(self.store.get(&self.keys.settings), Ok(Some(_)))
    }

    pub fn save_settings(&self, settings: &SettingsEntity) -> Result<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.set(&self.keys.settings, &raw)
    }

    /// Collects both stored documents for an export. Payloads that can't be parsed are exported
    /// as null.
    pub fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument> {
        Ok(ExportDocument {
            wellbeing: self.read_raw(&self.keys.tracking)?,
            settings: self.read_raw(&self.keys.settings)?,
            export_date: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        })
    }

    /// Writes the `wellbeing` and `settings` payloads of an export document back verbatim.
    /// The document is fully parsed before anything is written, so a malformed document leaves
    /// the store untouched. When the settings can't be written, the previous tracking data is put
    /// back.
    pub fn import(&self, raw: &str) -> Result<ImportOutcome, ImportError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(ImportError::NotAnObject);
        }
        let document: ExportDocument = serde_json::from_value(value)?;

        let mut outcome = ImportOutcome {
            wellbeing: false,
            settings: false,
        };
        let mut previous = None;
        if let Some(wellbeing) = document.wellbeing {
            previous = self
                .store
                .get(&self.keys.tracking)
                .map_err(ImportError::Store)?;
            self.write_raw(&self.keys.tracking, &wellbeing)?;
            outcome.wellbeing = true;
        }
        if let Some(settings) = document.settings {
            if let Err(e) = self.write_raw(&self.keys.settings, &settings) {
                if outcome.wellbeing {
                    self.restore(&self.keys.tracking, previous);
                }
                return Err(e);
            }
            outcome.settings = true;
        }
        info!("Imported {outcome:?}");
        Ok(outcome)
    }

    fn restore(&self, key: &str, previous: Option<String>) {
        let restored = match previous {
            Some(raw) => self.store.set(key, &raw),
            None => self.store.remove(key),
        };
        match restored {
            Ok(()) => info!("Restored {key} after a failed import"),
            Err(e) => error!("Failed to restore {key} after a failed import {e:?}"),
        }
    }

    fn read_or_default<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Stored {key} is unreadable, using defaults: {e}");
                T::default()
            }),
            Ok(None) => {
                debug!("Nothing stored under {key}, using defaults");
                T::default()
            }
            Err(e) => {
                warn!("Failed to read {key}, using defaults {e:?}");
                T::default()
            }
        }
    }

    fn read_raw(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.store.get(key)?.and_then(|raw| {
            serde_json::from_str(&raw)
                .inspect_err(|e| warn!("Stored {key} is not valid JSON: {e}"))
                .ok()
        }))
    }

    fn write_raw(&self, key: &str, value: &Value) -> Result<(), ImportError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw).map_err(ImportError::Store)
    }
}
