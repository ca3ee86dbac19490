use serde::{Deserialize, Serialize};

/// Inferred category of an observed piece of AI-generated content.
///
/// Closed set: the classifier never produces anything outside it, and the
/// impact calculator treats `Unknown` as "cannot estimate" rather than zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Pdf,
    Image,
    Audio,
    Unknown,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Pdf => "pdf",
            Modality::Image => "image",
            Modality::Audio => "audio",
            Modality::Unknown => "unknown",
        }
    }

    /// Text and pdf share token-based unit semantics and the same energy
    /// coefficient; pdf does not get its own table entry.
    pub fn is_token_based(&self) -> bool {
        matches!(self, Modality::Text | Modality::Pdf)
    }
}

pub fn modality_from_str(value: &str) -> anyhow::Result<Modality> {
    match value {
        "text" => Ok(Modality::Text),
        "pdf" => Ok(Modality::Pdf),
        "image" => Ok(Modality::Image),
        "audio" => Ok(Modality::Audio),
        "unknown" => Ok(Modality::Unknown),
        _ => Err(anyhow::anyhow!("unknown modality '{value}'")),
    }
}
