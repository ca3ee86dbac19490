//! Export of aggregated daily totals. Pure serialization of already-folded
//! data, date ascending; rounding stays with the consumer.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::models::DayBucket;

pub const CSV_HEADER: &str = "date,total_tokens,total_Wh,total_CO2_g,total_water_mL";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    date: &'a str,
    tokens: u64,
    energy_wh: f64,
    #[serde(rename = "co2g")]
    co2_g: f64,
    water_ml: f64,
}

fn rows(totals: &BTreeMap<String, DayBucket>) -> impl Iterator<Item = ExportRow<'_>> {
    // BTreeMap iteration is already date ascending for ISO day keys.
    totals.iter().map(|(date, bucket)| ExportRow {
        date,
        tokens: bucket.tokens,
        energy_wh: bucket.energy_wh,
        co2_g: bucket.co2_g,
        water_ml: bucket.water_ml,
    })
}

pub fn to_json(totals: &BTreeMap<String, DayBucket>) -> Result<String> {
    let dataset: Vec<ExportRow> = rows(totals).collect();
    Ok(serde_json::to_string_pretty(&dataset)?)
}

pub fn to_csv(totals: &BTreeMap<String, DayBucket>) -> String {
    let mut out = String::from(CSV_HEADER);
    for row in rows(totals) {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{},{}",
            row.date, row.tokens, row.energy_wh, row.co2_g, row.water_ml
        ));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> BTreeMap<String, DayBucket> {
        let mut totals = BTreeMap::new();
        totals.insert(
            "2026-05-02".to_string(),
            DayBucket {
                tokens: 100,
                energy_wh: 0.05,
                co2_g: 0.02,
                water_ml: 0.09,
            },
        );
        totals.insert(
            "2026-05-01".to_string(),
            DayBucket {
                tokens: 2000,
                energy_wh: 1.0,
                co2_g: 0.4,
                water_ml: 1.8,
            },
        );
        totals
    }

    #[test]
    fn json_is_date_ascending_with_wire_names() {
        let json = to_json(&totals()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = parsed.as_array().unwrap();
        assert_eq!(rows[0]["date"], "2026-05-01");
        assert_eq!(rows[1]["date"], "2026-05-02");
        assert_eq!(rows[0]["energyWh"], 1.0);
        assert_eq!(rows[0]["co2g"], 0.4);
        assert_eq!(rows[0]["waterMl"], 1.8);
    }

    #[test]
    fn csv_has_expected_header_and_order() {
        let csv = to_csv(&totals());
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "2026-05-01,2000,1,0.4,1.8");
        assert_eq!(lines[2], "2026-05-02,100,0.05,0.02,0.09");
    }

    #[test]
    fn empty_totals_export_cleanly() {
        assert_eq!(to_json(&BTreeMap::new()).unwrap(), "[]");
        assert_eq!(to_csv(&BTreeMap::new()), format!("{CSV_HEADER}\n"));
    }
}
