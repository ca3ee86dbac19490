//! Engine session context.
//!
//! One `Session` owns everything a calculation needs: the resolved reference
//! table, a handle to the settings collaborator, the in-memory ledger, and
//! the record store. This keeps the pipeline functions pure, taking their
//! inputs explicitly instead of reading ambient state.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::{info, warn};

use crate::classifier::{classify, classify_intent};
use crate::db::{Database, RecordKey};
use crate::estimator::{estimate_prompt_units, estimate_units};
use crate::impact::{compute_impact, Impact};
use crate::models::{day_key, DayBucket, ImpactRecord, Modality, ObservedContent};
use crate::reference::{EnergyReference, ReferenceLoader};
use crate::settings::{resolve, SettingsStore};
use crate::totals::Ledger;

/// Callers should wait this long after first seeing a content node before
/// observing it, so streaming/partial responses settle into their final text.
pub const STREAM_DEBOUNCE_MS: u64 = 500;

/// Below this much trimmed text, with no media hints, an observation is
/// streaming noise rather than a finished response.
const MIN_OBSERVED_CHARS: usize = 20;

/// Retained claim ids; overflow evicts the oldest claim. Old enough claims
/// refer to content that is long gone, so re-claiming them is harmless.
const CLAIMED_CAPACITY: usize = 2048;

/// Outcome of observing one content item. `Unknown` is a sentinel the caller
/// must render distinctly from a zero-impact estimate.
#[derive(Debug, Clone)]
pub enum Observation {
    Estimated {
        record: ImpactRecord,
        /// False when the store write failed; the in-memory fold is still
        /// authoritative for this session, but may not survive a reload.
        persisted: bool,
    },
    /// Impact could not be estimated for this content.
    Unknown,
    /// Content too small to be a finished response; nothing was folded.
    Skipped,
}

/// Live estimate for draft content; never folded or persisted.
#[derive(Debug, Clone, Copy)]
pub struct PreviewEstimate {
    pub modality: Modality,
    pub units: f64,
    pub tokens: u64,
    pub impact: Impact,
}

/// A folded manual entry. Like `Observation::Estimated`, the persisted flag
/// lets the caller warn when the record may not survive a reload.
#[derive(Debug, Clone)]
pub struct ManualEntry {
    pub record: ImpactRecord,
    pub persisted: bool,
}

pub struct Session {
    reference: EnergyReference,
    settings: Arc<SettingsStore>,
    store: Database,
    ledger: Ledger,
    // At-most-once guard: content ids claimed before scheduling, bounded to
    // the most recent CLAIMED_CAPACITY. Dedup lives here with the caller,
    // not on the record; a crash between claim and fold loses the claim,
    // which is the documented race.
    claimed: HashSet<String>,
    claim_order: VecDeque<String>,
}

impl Session {
    /// Initialize a session: resolve the reference table (fatal if missing),
    /// seed absent store records, and hydrate totals/history.
    pub async fn new(
        loader: &ReferenceLoader,
        settings: Arc<SettingsStore>,
        store: Database,
    ) -> Result<Self> {
        let reference = *loader
            .load()
            .await
            .context("energy reference unavailable; estimation disabled")?;

        store.ensure_defaults().await?;

        let totals = store
            .get_record(RecordKey::Totals)
            .await?
            .unwrap_or_default();
        let history: Vec<ImpactRecord> = store
            .get_record(RecordKey::History)
            .await?
            .unwrap_or_default();
        let ledger = Ledger::from_parts(totals, history);

        Ok(Self {
            reference,
            settings,
            store,
            ledger,
            claimed: HashSet::new(),
            claim_order: VecDeque::new(),
        })
    }

    /// Mark a content item as claimed before scheduling its estimation.
    /// Returns false if it was already claimed; the caller must then skip it.
    pub fn claim(&mut self, content_id: &str) -> bool {
        if !self.claimed.insert(content_id.to_string()) {
            return false;
        }
        self.claim_order.push_back(content_id.to_string());
        while self.claim_order.len() > CLAIMED_CAPACITY {
            if let Some(oldest) = self.claim_order.pop_front() {
                self.claimed.remove(&oldest);
            }
        }
        true
    }

    /// Full pipeline for one finished content item: classify, estimate,
    /// compute, fold, persist. Classification and estimation failures never
    /// escape as errors; they resolve to `Observation::Unknown`.
    pub async fn observe(&mut self, content: &ObservedContent) -> Result<Observation> {
        let trimmed_len = content.text.trim().chars().count();
        if trimmed_len < MIN_OBSERVED_CHARS && !content.hints.has_media() {
            return Ok(Observation::Skipped);
        }

        let modality = classify(&content.text, content.hints);
        let estimate = estimate_units(modality, &content.text, content.hints, content.duration_min);

        let settings = self.settings.get();
        let params = resolve(&settings, &self.reference);
        let Some(impact) = compute_impact(modality, estimate.units, &params, &self.reference)
        else {
            return Ok(Observation::Unknown);
        };

        let record = ImpactRecord::new(
            modality,
            estimate.units,
            estimate.tokens,
            impact,
            false,
            Utc::now(),
        );
        info!(
            "observed {} content: {:.3} Wh, {:.3} g CO2, {:.3} mL",
            modality.as_str(),
            impact.energy_wh,
            impact.co2_g,
            impact.water_ml
        );

        self.ledger.fold(record.clone());
        let persisted = self.persist().await;
        Ok(Observation::Estimated { record, persisted })
    }

    /// Soft estimate for a draft prompt. Uses the keyword-vote intent
    /// classifier; nothing is folded or persisted.
    pub fn preview(&self, text: &str) -> Option<PreviewEstimate> {
        if text.trim().is_empty() {
            return None;
        }
        let modality = classify_intent(text);
        let estimate = estimate_prompt_units(modality, text);
        let params = resolve(&self.settings.get(), &self.reference);
        let impact = compute_impact(modality, estimate.units, &params, &self.reference)?;
        Some(PreviewEstimate {
            modality,
            units: estimate.units,
            tokens: estimate.tokens,
            impact,
        })
    }

    /// Manual entry: user-supplied modality and unit count, bypassing the
    /// classifier and estimator. Invalid input is rejected before any state
    /// mutation.
    pub async fn log_manual(&mut self, modality: Modality, units: f64) -> Result<ManualEntry> {
        if !units.is_finite() || units <= 0.0 {
            bail!("manual entry requires a positive, finite unit count");
        }
        if modality == Modality::Unknown {
            bail!("manual entry requires a concrete modality");
        }

        let settings = self.settings.get();
        let params = resolve(&settings, &self.reference);
        let Some(impact) = compute_impact(modality, units, &params, &self.reference) else {
            bail!("impact could not be estimated for {} units", modality.as_str());
        };

        // For token-based modalities the entered units are the tokens.
        let tokens = if modality.is_token_based() {
            units.round() as u64
        } else {
            0
        };

        let record = ImpactRecord::new(modality, units, tokens, impact, true, Utc::now());
        self.ledger.fold(record.clone());
        let persisted = self.persist().await;
        Ok(ManualEntry { record, persisted })
    }

    /// Zero one day's totals and drop its history entries.
    pub async fn reset_day(&mut self, date: &str) {
        self.ledger.reset_day(date);
        self.persist().await;
    }

    /// Clear all totals and history.
    pub async fn clear(&mut self) {
        self.ledger.clear();
        self.persist().await;
    }

    /// Write the ledger to the store. A failure leaves the in-memory state
    /// authoritative for this session and is reported, never fatal.
    async fn persist(&self) -> bool {
        let totals = self.ledger.totals().clone();
        let history: Vec<ImpactRecord> = self.ledger.history().iter().cloned().collect();

        let result = async {
            self.store.set_record(RecordKey::Totals, &totals).await?;
            self.store.set_record(RecordKey::History, &history).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("store write failed; totals may not survive a reload: {err:#}");
                false
            }
        }
    }

    pub fn today(&self) -> DayBucket {
        self.ledger.day(&day_key(Utc::now()))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn reference(&self) -> &EnergyReference {
        &self.reference
    }
}
