/// Structural hints extracted by the external content observer.
///
/// The engine never traverses a page itself; the observer reports whether the
/// content node carried embedded media and how many image-bearing elements it
/// contained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralHints {
    pub has_image_media: bool,
    pub has_audio_media: bool,
    pub image_element_count: usize,
}

impl StructuralHints {
    pub fn has_media(&self) -> bool {
        self.has_image_media || self.has_audio_media
    }
}

/// One observed content item, already extracted from the page.
#[derive(Debug, Clone)]
pub struct ObservedContent {
    /// Caller-assigned identity, used for at-most-once claiming.
    pub id: String,
    pub text: String,
    pub hints: StructuralHints,
    /// Explicit duration in minutes, when the observer knows it (audio players
    /// expose this; free text does not).
    pub duration_min: Option<f64>,
}

impl ObservedContent {
    pub fn from_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hints: StructuralHints::default(),
            duration_min: None,
        }
    }
}
