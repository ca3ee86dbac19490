//! Daily totals and the bounded impact history.
//!
//! The ledger performs no deduplication: at-most-once folding per observed
//! content item is the caller's responsibility (claim before scheduling).

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::models::{DayBucket, ImpactRecord};

/// Maximum retained history entries; overflow evicts from the oldest end.
pub const HISTORY_CAPACITY: usize = 500;

/// Per-day totals plus the append-only bounded record history. A `BTreeMap`
/// keeps day keys in ascending date order, which is also the export order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    totals: BTreeMap<String, DayBucket>,
    history: VecDeque<ImpactRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts, trimming an oversized history from the
    /// front so the capacity bound holds from the first insertion on.
    pub fn from_parts(totals: BTreeMap<String, DayBucket>, history: Vec<ImpactRecord>) -> Self {
        let mut history: VecDeque<ImpactRecord> = history.into();
        while history.len() > HISTORY_CAPACITY {
            history.pop_front();
        }
        Self { totals, history }
    }

    /// Fold one record into its day bucket and append it to the history.
    /// Addition is field-wise, so fold order never changes a day's totals.
    pub fn fold(&mut self, record: ImpactRecord) {
        let bucket = self.totals.entry(record.date.clone()).or_default();
        bucket.add(&record);

        self.history.push_back(record);
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    /// Zero the given day's bucket and drop exactly that day's history
    /// entries. Destructive and explicit, unlike folding.
    pub fn reset_day(&mut self, date: &str) {
        self.totals.insert(date.to_string(), DayBucket::default());
        self.history.retain(|record| record.date != date);
    }

    /// Reset everything: empty totals, empty history.
    pub fn clear(&mut self) {
        self.totals.clear();
        self.history.clear();
    }

    pub fn day(&self, date: &str) -> DayBucket {
        self.totals.get(date).copied().unwrap_or_default()
    }

    pub fn totals(&self) -> &BTreeMap<String, DayBucket> {
        &self.totals
    }

    pub fn history(&self) -> &VecDeque<ImpactRecord> {
        &self.history
    }
}
