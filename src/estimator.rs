//! Heuristic unit estimation: tokens for text, counts for images, minutes
//! for audio. Estimates are deliberately approximate; the floor of 1 unit for
//! non-empty content avoids zero-impact artifacts on trivial snippets.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Modality, StructuralHints};

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").expect("word pattern"));

static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s?(?:min|minute)").expect("minutes pattern")
});

static IMAGE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s?(?:images|pictures|renders|variations)").expect("image count pattern")
});

/// Estimated quantity for one content item: the modality-specific unit count
/// plus the token count carried separately into totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitEstimate {
    pub units: f64,
    pub tokens: u64,
}

/// Token estimate blending two heuristics: a word count (weighted 1.3 tokens
/// per word) and a character-density count (non-whitespace chars / 4).
/// Word count alone overcounts dense technical text and char density alone
/// undercounts short punctuation-heavy text, so the two are averaged.
/// Returns 0 only for empty/whitespace input, at least 1 otherwise.
pub fn estimate_tokens(text: &str) -> u64 {
    if text.trim().is_empty() {
        return 0;
    }
    let word_count = WORD.find_iter(text).count() as f64;
    let char_density = text.chars().filter(|c| !c.is_whitespace()).count() as f64 / 4.0;
    let average = (word_count * 1.3 + char_density) / 2.0;
    (average.round() as u64).max(1)
}

fn minutes_from_text(text: &str) -> Option<f64> {
    MINUTES
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
}

/// Estimate units for a finished response. Guarantees `units >= 1` whenever
/// the modality is concrete and the content is non-empty.
///
/// Audio precedence: an explicit duration hint from the observer, then a
/// "N min" phrase in the text, then a crude length-based guess.
pub fn estimate_units(
    modality: Modality,
    text: &str,
    hints: StructuralHints,
    duration_min: Option<f64>,
) -> UnitEstimate {
    match modality {
        Modality::Image => UnitEstimate {
            units: hints.image_element_count.max(1) as f64,
            tokens: 0,
        },
        Modality::Audio => {
            let minutes = duration_min
                .filter(|m| *m > 0.0)
                .or_else(|| minutes_from_text(text))
                .unwrap_or_else(|| (text.chars().count() as f64 / 900.0).ceil());
            UnitEstimate {
                units: minutes.max(1.0),
                tokens: 0,
            }
        }
        Modality::Text | Modality::Pdf => {
            let tokens = estimate_tokens(text);
            let fallback = (text.chars().count() as f64 / 4.0).ceil();
            let units = if tokens > 0 { tokens as f64 } else { fallback };
            UnitEstimate {
                units: units.max(1.0),
                tokens,
            }
        }
        Modality::Unknown => UnitEstimate {
            units: 0.0,
            tokens: 0,
        },
    }
}

/// Estimate units for draft/prompt text, where there are no structural hints
/// yet: requested quantities are read out of the phrasing instead.
pub fn estimate_prompt_units(modality: Modality, text: &str) -> UnitEstimate {
    match modality {
        Modality::Image => {
            let count = IMAGE_COUNT
                .captures(text)
                .and_then(|caps| caps[1].parse::<f64>().ok())
                .unwrap_or(1.0);
            UnitEstimate {
                units: count.max(1.0),
                tokens: 0,
            }
        }
        Modality::Audio => {
            let minutes = minutes_from_text(text).unwrap_or_else(|| {
                // Rough speaking rate: 150 words per minute.
                (WORD.find_iter(text).count() as f64 / 150.0).ceil()
            });
            UnitEstimate {
                units: minutes.max(1.0),
                tokens: 0,
            }
        }
        Modality::Text | Modality::Pdf => {
            let tokens = estimate_tokens(text);
            UnitEstimate {
                units: (tokens as f64).max(1.0),
                tokens,
            }
        }
        Modality::Unknown => UnitEstimate {
            units: 0.0,
            tokens: 0,
        },
    }
}
