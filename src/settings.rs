//! User settings and the mode resolver.
//!
//! The engine only ever *reads* settings; mutation belongs to the external
//! settings collaborator (`SettingsStore::apply`), which persists the new
//! snapshot and notifies subscribers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};
use tokio::sync::broadcast;

use crate::reference::EnergyReference;

/// Coarse model-size proxy scaling energy per unit. Monotonic:
/// small < balanced < large.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Small,
    Large,
    // Last so the serde fallback attribute is accepted by the derive.
    #[default]
    #[serde(other)]
    Balanced,
}

impl Mode {
    pub fn multiplier(self) -> f64 {
        match self {
            Mode::Small => 0.4,
            Mode::Balanced => 1.0,
            Mode::Large => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Small => "small",
            Mode::Balanced => "balanced",
            Mode::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub mode: Mode,
    /// Cosmetic only; persisted for the UI but never interpreted here.
    pub theme: String,
    /// Grid carbon intensity override in g CO2/kWh. `None` or a non-positive
    /// value falls back to the reference default.
    pub grid_intensity: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Balanced,
            theme: "sage".into(),
            grid_intensity: None,
        }
    }
}

/// Fully resolved parameters consumed by one impact calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalcParams {
    pub multiplier: f64,
    pub grid_co2_g_per_kwh: f64,
    pub water_l_per_kwh: f64,
}

/// Resolve the active mode and grid intensity into calculation parameters.
/// Pure lookup; no mutation.
pub fn resolve(settings: &Settings, reference: &EnergyReference) -> CalcParams {
    let grid = settings
        .grid_intensity
        .filter(|g| *g > 0.0)
        .unwrap_or(reference.grid_co2_g_per_kwh);
    CalcParams {
        multiplier: settings.mode.multiplier(),
        grid_co2_g_per_kwh: grid,
        water_l_per_kwh: reference.water_l_per_kwh,
    }
}

/// JSON-file-backed settings collaborator with a change broadcast.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
    changes: broadcast::Sender<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Settings::default()
        };

        let (changes, _) = broadcast::channel(16);
        Ok(Self {
            path,
            data: RwLock::new(data),
            changes,
        })
    }

    /// Immutable snapshot consumed per calculation.
    pub fn get(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// External-collaborator entry point: replace, persist, notify.
    pub fn apply(&self, settings: Settings) -> Result<()> {
        {
            let mut guard = match self.data.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = settings.clone();
            self.persist(&guard)?;
        }
        let _ = self.changes.send(settings);
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Settings> {
        self.changes.subscribe()
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read settings from {}", self.path.display()))?;
        let data: Settings = serde_json::from_str(&contents)?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> EnergyReference {
        serde_json::from_str(
            r#"{
                "grid_CO2_g_per_kWh": 400,
                "water_L_per_kWh": 1.8,
                "modalities": {
                    "text": { "Wh_per_1k_tokens": 0.5 },
                    "image": { "Wh_per_image": 2.9 },
                    "audio": { "Wh_per_min": 0.8 }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn mode_multipliers_are_monotonic() {
        assert!(Mode::Small.multiplier() < Mode::Balanced.multiplier());
        assert!(Mode::Balanced.multiplier() < Mode::Large.multiplier());
    }

    #[test]
    fn unrecognized_mode_deserializes_to_balanced() {
        let settings: Settings =
            serde_json::from_str(r#"{"mode":"colossal","theme":"sage"}"#).unwrap();
        assert_eq!(settings.mode, Mode::Balanced);
    }

    #[test]
    fn absent_fields_take_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.mode, Mode::Balanced);
        assert_eq!(settings.grid_intensity, None);
    }

    #[test]
    fn resolver_prefers_positive_override() {
        let settings = Settings {
            grid_intensity: Some(250.0),
            ..Settings::default()
        };
        assert_eq!(resolve(&settings, &reference()).grid_co2_g_per_kwh, 250.0);
    }

    #[test]
    fn resolver_falls_back_on_absent_or_non_positive_override() {
        let absent = Settings::default();
        assert_eq!(resolve(&absent, &reference()).grid_co2_g_per_kwh, 400.0);

        let zero = Settings {
            grid_intensity: Some(0.0),
            ..Settings::default()
        };
        assert_eq!(resolve(&zero, &reference()).grid_co2_g_per_kwh, 400.0);
    }

    #[test]
    fn store_round_trips_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();
        let mut changed = store.subscribe();

        let updated = Settings {
            mode: Mode::Large,
            grid_intensity: Some(300.0),
            ..Settings::default()
        };
        store.apply(updated.clone()).unwrap();
        assert_eq!(store.get(), updated);
        assert_eq!(changed.try_recv().unwrap(), updated);

        // A fresh store sees the persisted snapshot.
        let reopened = SettingsStore::new(path).unwrap();
        assert_eq!(reopened.get(), updated);
    }
}
