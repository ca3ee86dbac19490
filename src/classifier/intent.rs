//! Intent classifier for not-yet-submitted draft content.
//!
//! Draft text is incomplete and noisier than a finished response, so a soft
//! bag-of-keywords vote is used instead of the strict precedence table: each
//! recognized word contributes a fixed indicator vector over
//! {text, image, audio} and the largest tally wins. Explicit strong keywords
//! still override the vote afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::classifier::rules::IMAGE_KEYWORDS;
use crate::models::Modality;

/// Tally dimensions, in tie-break order: earlier entries win ties.
const INTENT_LABELS: [Modality; 3] = [Modality::Text, Modality::Image, Modality::Audio];

#[rustfmt::skip]
const WORD_VOTES: &[(&str, [u32; 3])] = &[
    ("summarize",     [1, 0, 0]),
    ("summary",       [1, 0, 0]),
    ("essay",         [1, 0, 0]),
    ("paragraph",     [1, 0, 0]),
    ("outline",       [1, 0, 0]),
    ("report",        [1, 0, 0]),
    ("draw",          [0, 1, 0]),
    ("image",         [0, 1, 0]),
    ("images",        [0, 1, 0]),
    ("illustration",  [0, 1, 0]),
    ("render",        [0, 1, 0]),
    ("picture",       [0, 1, 0]),
    ("dalle",         [0, 1, 0]),
    ("diffusion",     [0, 1, 0]),
    ("photo",         [0, 1, 0]),
    ("sketch",        [0, 1, 0]),
    ("concept",       [0, 1, 0]),
    ("mosaic",        [0, 1, 0]),
    ("audio",         [0, 0, 1]),
    ("speech",        [0, 0, 1]),
    ("podcast",       [0, 0, 1]),
    ("transcribe",    [0, 0, 1]),
    ("transcription", [0, 0, 1]),
    ("voice",         [0, 0, 1]),
    ("minutes",       [0, 0, 1]),
];

static VOTE_TABLE: LazyLock<HashMap<&'static str, [u32; 3]>> =
    LazyLock::new(|| WORD_VOTES.iter().copied().collect());

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w'-]+\b").expect("word pattern"));

// Broader than the primary audio set: draft phrasing mentions podcasts.
static AUDIO_OVERRIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(transcribe|audio|recording|speech|podcast)\b")
        .expect("audio override pattern")
});

/// Classify draft text by keyword vote, then re-apply the strong keyword
/// overrides so explicit intent always beats the tally. No keyword match
/// defaults to `Text`.
pub fn classify_intent(text: &str) -> Modality {
    let lower = text.to_lowercase();

    let mut tally = [0u32; 3];
    for word in WORD.find_iter(&lower) {
        if let Some(vote) = VOTE_TABLE.get(word.as_str()) {
            for (slot, value) in tally.iter_mut().zip(vote) {
                *slot += value;
            }
        }
    }

    let mut modality = Modality::Text;
    let mut max = 0;
    for (score, label) in tally.iter().zip(INTENT_LABELS) {
        if *score > max {
            max = *score;
            modality = label;
        }
    }

    if IMAGE_KEYWORDS.is_match(&lower) {
        modality = Modality::Image;
    }
    if AUDIO_OVERRIDE.is_match(&lower) {
        modality = Modality::Audio;
    }
    modality
}
