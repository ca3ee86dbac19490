mod content;
mod modality;
mod record;

pub use content::{ObservedContent, StructuralHints};
pub use modality::{modality_from_str, Modality};
pub use record::{day_key, DayBucket, ImpactRecord};
