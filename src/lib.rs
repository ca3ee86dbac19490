//! ecotally: heuristic estimation of the energy, carbon, and water footprint
//! of AI-generated content, with bounded per-day usage history.
//!
//! Pipeline: observed content → modality classifier → unit estimator →
//! impact calculator → totals ledger → record store. Everything between the
//! one-time reference load and the store write is pure, synchronous
//! computation.

pub mod classifier;
pub mod db;
pub mod estimator;
pub mod export;
pub mod impact;
pub mod models;
pub mod reference;
pub mod session;
pub mod settings;
pub mod totals;

pub use classifier::{classify, classify_intent};
pub use db::{Database, RecordKey};
pub use estimator::{estimate_prompt_units, estimate_tokens, estimate_units, UnitEstimate};
pub use impact::{compute_impact, Impact};
pub use models::{day_key, DayBucket, ImpactRecord, Modality, ObservedContent, StructuralHints};
pub use reference::{EnergyReference, ReferenceLoader};
pub use session::{ManualEntry, Observation, PreviewEstimate, Session, STREAM_DEBOUNCE_MS};
pub use settings::{resolve, CalcParams, Mode, Settings, SettingsStore};
pub use totals::{Ledger, HISTORY_CAPACITY};
