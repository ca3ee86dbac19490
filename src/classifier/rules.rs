//! Primary modality classifier: an ordered table of predicate → modality
//! rules. Categories overlap in the raw signal (an image caption is also
//! text), so precedence decides, not confidence: first match wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Modality, StructuralHints};

pub(crate) static IMAGE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(image|images|draw|photo|render|picture|diffusion|dalle|dream|visual)\b")
        .expect("image keyword pattern")
});

static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").expect("markdown image pattern"));

static AUDIO_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(transcribe|audio|recording|speech)\b").expect("audio keyword pattern")
});

static DOCUMENT_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pdf|document|report|paper)\b").expect("document keyword pattern")
});

/// One row of the classification table.
pub struct ClassificationRule {
    pub name: &'static str,
    pub modality: Modality,
    predicate: fn(&str, StructuralHints) -> bool,
}

impl ClassificationRule {
    pub fn matches(&self, text: &str, hints: StructuralHints) -> bool {
        (self.predicate)(text, hints)
    }
}

fn is_image(text: &str, hints: StructuralHints) -> bool {
    hints.has_image_media || MARKDOWN_IMAGE.is_match(text) || IMAGE_KEYWORDS.is_match(text)
}

fn is_audio(text: &str, hints: StructuralHints) -> bool {
    hints.has_audio_media || AUDIO_KEYWORDS.is_match(text)
}

fn is_document(text: &str, _hints: StructuralHints) -> bool {
    DOCUMENT_KEYWORDS.is_match(text)
}

fn is_empty(text: &str, _hints: StructuralHints) -> bool {
    text.trim().is_empty()
}

/// Ordered by precedence; `classify` falls through to `Text`.
pub static RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "image",
        modality: Modality::Image,
        predicate: is_image,
    },
    ClassificationRule {
        name: "audio",
        modality: Modality::Audio,
        predicate: is_audio,
    },
    ClassificationRule {
        name: "document",
        modality: Modality::Pdf,
        predicate: is_document,
    },
    ClassificationRule {
        name: "empty",
        modality: Modality::Unknown,
        predicate: is_empty,
    },
];

/// Classify a finished piece of observed content. Pure function of its
/// inputs; no side effects.
pub fn classify(text: &str, hints: StructuralHints) -> Modality {
    for rule in RULES {
        if rule.matches(text, hints) {
            return rule.modality;
        }
    }
    Modality::Text
}
