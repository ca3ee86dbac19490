//! Pure impact calculation: (modality, units, calculation parameters) →
//! energy, CO₂, water. Never rounds or clamps (formatting is the caller's
//! concern) and never invents a value it cannot justify: an inestimable
//! input yields `None`, which callers must render distinctly from zero.

use crate::models::Modality;
use crate::reference::EnergyReference;
use crate::settings::CalcParams;

/// Physical-impact triple for one observed item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub energy_wh: f64,
    pub co2_g: f64,
    pub water_ml: f64,
}

/// Compute the impact of `units` of the given modality.
///
/// `None` when the unit count is non-positive or non-finite, or the modality
/// is `Unknown`. A missing reference short-circuits to the same sentinel one
/// layer up, before this is ever called.
pub fn compute_impact(
    modality: Modality,
    units: f64,
    params: &CalcParams,
    reference: &EnergyReference,
) -> Option<Impact> {
    if !units.is_finite() || units <= 0.0 {
        return None;
    }

    let energy_wh = match modality {
        Modality::Image => units * reference.modalities.image.wh_per_image * params.multiplier,
        Modality::Audio => units * reference.modalities.audio.wh_per_min * params.multiplier,
        Modality::Text | Modality::Pdf => {
            (units / 1000.0) * reference.modalities.text.wh_per_1k_tokens * params.multiplier
        }
        Modality::Unknown => return None,
    };

    let energy_kwh = energy_wh / 1000.0;
    Some(Impact {
        energy_wh,
        co2_g: energy_kwh * params.grid_co2_g_per_kwh,
        water_ml: energy_kwh * params.water_l_per_kwh * 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{resolve, Mode, Settings};

    fn reference() -> EnergyReference {
        serde_json::from_str(
            r#"{
                "grid_CO2_g_per_kWh": 400,
                "water_L_per_kWh": 1.8,
                "modalities": {
                    "text": { "Wh_per_1k_tokens": 0.5 },
                    "image": { "Wh_per_image": 0.3 },
                    "audio": { "Wh_per_min": 0.8 }
                }
            }"#,
        )
        .unwrap()
    }

    fn params_for(mode: Mode) -> CalcParams {
        let settings = Settings {
            mode,
            ..Settings::default()
        };
        resolve(&settings, &reference())
    }

    #[test]
    fn balanced_text_worked_example() {
        // 2000 tokens at 0.5 Wh/1k -> 1.0 Wh; 400 g/kWh -> 0.4 g; 1.8 L/kWh -> 1.8 mL.
        let impact =
            compute_impact(Modality::Text, 2000.0, &params_for(Mode::Balanced), &reference())
                .unwrap();
        assert!((impact.energy_wh - 1.0).abs() < 1e-12);
        assert!((impact.co2_g - 0.4).abs() < 1e-12);
        assert!((impact.water_ml - 1.8).abs() < 1e-12);
    }

    #[test]
    fn large_image_worked_example() {
        // 1000 images at 0.3 Wh, large mode x2 -> 0.6 Wh -> 0.24 g CO2.
        let impact =
            compute_impact(Modality::Image, 1000.0, &params_for(Mode::Large), &reference())
                .unwrap();
        assert!((impact.energy_wh - 0.6 * 1000.0).abs() < 1e-9);
        assert!((impact.co2_g - 0.24 * 1000.0).abs() < 1e-9);
    }

    #[test]
    fn energy_scales_linearly_with_units() {
        let reference = reference();
        let params = params_for(Mode::Balanced);
        for modality in [Modality::Text, Modality::Pdf, Modality::Image, Modality::Audio] {
            let one = compute_impact(modality, 10.0, &params, &reference).unwrap();
            let three = compute_impact(modality, 30.0, &params, &reference).unwrap();
            assert!((three.energy_wh - one.energy_wh * 3.0).abs() < 1e-9);
            assert!((three.co2_g - one.co2_g * 3.0).abs() < 1e-9);
            assert!((three.water_ml - one.water_ml * 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn mode_multiplier_scales_energy() {
        let reference = reference();
        let small = compute_impact(Modality::Audio, 5.0, &params_for(Mode::Small), &reference)
            .unwrap();
        let balanced =
            compute_impact(Modality::Audio, 5.0, &params_for(Mode::Balanced), &reference).unwrap();
        let large = compute_impact(Modality::Audio, 5.0, &params_for(Mode::Large), &reference)
            .unwrap();
        assert!((large.energy_wh - balanced.energy_wh * 2.0).abs() < 1e-12);
        assert!((large.energy_wh - small.energy_wh * 5.0).abs() < 1e-12);
        assert!(small.energy_wh < balanced.energy_wh && balanced.energy_wh < large.energy_wh);
    }

    #[test]
    fn unknown_modality_and_bad_units_yield_none() {
        let reference = reference();
        let params = params_for(Mode::Balanced);
        assert!(compute_impact(Modality::Unknown, 100.0, &params, &reference).is_none());
        assert!(compute_impact(Modality::Text, 0.0, &params, &reference).is_none());
        assert!(compute_impact(Modality::Text, -5.0, &params, &reference).is_none());
        assert!(compute_impact(Modality::Text, f64::NAN, &params, &reference).is_none());
    }

    #[test]
    fn outputs_are_non_negative_and_finite() {
        let reference = reference();
        let params = params_for(Mode::Large);
        let impact = compute_impact(Modality::Pdf, 1e9, &params, &reference).unwrap();
        for value in [impact.energy_wh, impact.co2_g, impact.water_ml] {
            assert!(value.is_finite() && value >= 0.0);
        }
    }
}
