use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Modality;
use crate::impact::Impact;

/// Format a timestamp as the ISO day key used for daily buckets.
pub fn day_key(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

/// The atomic record produced for one observed content item.
///
/// Immutable once created: `date` is fixed to the calendar day at creation
/// time and never recomputed, even if the record is folded or persisted later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub modality: Modality,
    pub units: f64,
    pub tokens: u64,
    pub energy_wh: f64,
    #[serde(rename = "co2g")]
    pub co2_g: f64,
    pub water_ml: f64,
    pub manual: bool,
}

impl ImpactRecord {
    pub fn new(
        modality: Modality,
        units: f64,
        tokens: u64,
        impact: Impact,
        manual: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            date: day_key(timestamp),
            modality,
            units,
            tokens,
            energy_wh: impact.energy_wh,
            co2_g: impact.co2_g,
            water_ml: impact.water_ml,
            manual,
        }
    }
}

/// Running totals for one calendar day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DayBucket {
    pub tokens: u64,
    pub energy_wh: f64,
    #[serde(rename = "co2g")]
    pub co2_g: f64,
    pub water_ml: f64,
}

impl DayBucket {
    /// Field-wise addition; commutative and associative, so fold order never
    /// changes a day's totals.
    pub fn add(&mut self, record: &ImpactRecord) {
        self.tokens += record.tokens;
        self.energy_wh += record.energy_wh;
        self.co2_g += record.co2_g;
        self.water_ml += record.water_ml;
    }
}
