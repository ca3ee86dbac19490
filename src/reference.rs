//! Static energy coefficients, loaded once per process.
//!
//! The reference document is the engine's only network/disk-bound dependency;
//! everything downstream of it is pure computation. A missing or malformed
//! file is a fatal initialization error: estimation calls made without a
//! resolved reference must consistently report "impact unknown" rather than
//! fall back to made-up coefficients.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextCoefficients {
    #[serde(rename = "Wh_per_1k_tokens")]
    pub wh_per_1k_tokens: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ImageCoefficients {
    #[serde(rename = "Wh_per_image")]
    pub wh_per_image: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioCoefficients {
    #[serde(rename = "Wh_per_min")]
    pub wh_per_min: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferenceModalities {
    pub text: TextCoefficients,
    pub image: ImageCoefficients,
    pub audio: AudioCoefficients,
}

/// Coefficient table: energy per unit by modality, default grid carbon
/// intensity, and the water-per-energy ratio. Immutable for the process
/// lifetime once loaded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnergyReference {
    #[serde(rename = "grid_CO2_g_per_kWh")]
    pub grid_co2_g_per_kwh: f64,
    #[serde(rename = "water_L_per_kWh")]
    pub water_l_per_kwh: f64,
    pub modalities: ReferenceModalities,
}

impl EnergyReference {
    fn validate(&self) -> Result<()> {
        let coefficients = [
            ("grid_CO2_g_per_kWh", self.grid_co2_g_per_kwh),
            ("water_L_per_kWh", self.water_l_per_kwh),
            ("Wh_per_1k_tokens", self.modalities.text.wh_per_1k_tokens),
            ("Wh_per_image", self.modalities.image.wh_per_image),
            ("Wh_per_min", self.modalities.audio.wh_per_min),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() || value <= 0.0 {
                bail!("energy reference field {name} must be a positive number, got {value}");
            }
        }
        Ok(())
    }
}

/// One-time memoized loader for the reference document.
///
/// Concurrent callers before the load resolves all await the same in-flight
/// read; there is never more than one pending fetch.
pub struct ReferenceLoader {
    path: PathBuf,
    cell: OnceCell<EnergyReference>,
}

impl ReferenceLoader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub async fn load(&self) -> Result<&EnergyReference> {
        self.cell
            .get_or_try_init(|| async {
                let raw = tokio::fs::read_to_string(&self.path)
                    .await
                    .with_context(|| {
                        format!("failed to read energy reference {}", self.path.display())
                    })?;
                let reference: EnergyReference = serde_json::from_str(&raw).with_context(|| {
                    format!("failed to parse energy reference {}", self.path.display())
                })?;
                reference.validate()?;
                Ok(reference)
            })
            .await
    }

    /// The reference, if the one-time load has already resolved.
    pub fn get(&self) -> Option<&EnergyReference> {
        self.cell.get()
    }
}
