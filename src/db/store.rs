//! Typed access to the named records.
//!
//! Reads and writes around a fold are not wrapped in a transaction: two
//! independent sessions racing on the same record is an accepted
//! eventual-consistency risk, not something this layer arbitrates.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use super::Database;
use crate::models::{DayBucket, ImpactRecord};

/// Logical record names. Settings are not among them: they live in the
/// settings collaborator's own file, not in this store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    Totals,
    History,
}

impl RecordKey {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKey::Totals => "totals",
            RecordKey::History => "history",
        }
    }
}

impl Database {
    pub async fn get_record<T>(&self, key: RecordKey) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let raw = self
            .execute(move |conn| {
                let value: Option<String> = conn
                    .query_row(
                        "SELECT value FROM records WHERE key = ?1",
                        params![key.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await?;

        match raw {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .with_context(|| format!("failed to parse record '{}'", key.as_str()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set_record<T>(&self, key: RecordKey, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)
            .with_context(|| format!("failed to serialize record '{}'", key.as_str()))?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO records (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key.as_str(), json, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write record '{}'", key.as_str()))?;
            Ok(())
        })
        .await?;

        self.notify_change(key);
        Ok(())
    }

    /// First-run initialization: write defaults for any absent record so
    /// later readers always find both names present.
    pub async fn ensure_defaults(&self) -> Result<()> {
        if self
            .get_record::<BTreeMap<String, DayBucket>>(RecordKey::Totals)
            .await?
            .is_none()
        {
            self.set_record(RecordKey::Totals, &BTreeMap::<String, DayBucket>::new())
                .await?;
        }
        if self
            .get_record::<Vec<ImpactRecord>>(RecordKey::History)
            .await?
            .is_none()
        {
            self.set_record(RecordKey::History, &Vec::<ImpactRecord>::new())
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store(dir: &tempfile::TempDir) -> Database {
        Database::new(dir.path().join("store.sqlite3")).unwrap()
    }

    #[tokio::test]
    async fn records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store
            .get_record::<BTreeMap<String, DayBucket>>(RecordKey::Totals)
            .await
            .unwrap()
            .is_none());

        let mut totals = BTreeMap::new();
        totals.insert(
            "2026-05-01".to_string(),
            DayBucket {
                tokens: 7,
                ..Default::default()
            },
        );
        store.set_record(RecordKey::Totals, &totals).await.unwrap();

        let loaded: BTreeMap<String, DayBucket> = store
            .get_record(RecordKey::Totals)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, totals);
    }

    #[tokio::test]
    async fn set_record_overwrites_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let mut changes = store.subscribe();

        store
            .set_record(RecordKey::Totals, &BTreeMap::<String, DayBucket>::new())
            .await
            .unwrap();
        assert_eq!(changes.recv().await.unwrap(), RecordKey::Totals);

        let mut totals = BTreeMap::new();
        totals.insert(
            "2026-05-01".to_string(),
            DayBucket {
                tokens: 42,
                ..Default::default()
            },
        );
        store.set_record(RecordKey::Totals, &totals).await.unwrap();

        let loaded: BTreeMap<String, DayBucket> = store
            .get_record(RecordKey::Totals)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.get("2026-05-01").unwrap().tokens, 42);
    }

    #[tokio::test]
    async fn ensure_defaults_initializes_missing_records_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store.ensure_defaults().await.unwrap();
        let totals: BTreeMap<String, DayBucket> = store
            .get_record(RecordKey::Totals)
            .await
            .unwrap()
            .unwrap();
        assert!(totals.is_empty());
        let history: Vec<ImpactRecord> = store
            .get_record(RecordKey::History)
            .await
            .unwrap()
            .unwrap();
        assert!(history.is_empty());

        // A present record is left untouched.
        let mut custom = BTreeMap::new();
        custom.insert(
            "2026-05-01".to_string(),
            DayBucket {
                tokens: 42,
                ..Default::default()
            },
        );
        store.set_record(RecordKey::Totals, &custom).await.unwrap();
        store.ensure_defaults().await.unwrap();
        let reloaded: BTreeMap<String, DayBucket> = store
            .get_record(RecordKey::Totals)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded, custom);
    }

    #[tokio::test]
    async fn store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.sqlite3");
        {
            let store = Database::new(path.clone()).unwrap();
            store
                .set_record(RecordKey::History, &vec!["marker".to_string()])
                .await
                .unwrap();
        }
        let store = Database::new(path).unwrap();
        let history: Vec<String> = store
            .get_record(RecordKey::History)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(history, vec!["marker".to_string()]);
    }
}
