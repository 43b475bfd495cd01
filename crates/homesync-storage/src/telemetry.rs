//! Append-only telemetry histories.
//!
//! Samples are keyed by `(kind, seq)`; `seq` increases monotonically per
//! kind and is never exposed outside the store. Queries walk the key range
//! backwards, so "most recent N" is a bounded reverse scan.

use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use homesync_core::{TelemetryKind, TelemetrySample};

use crate::Result;

const TELEMETRY: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("telemetry");

/// Append-only store for historical telemetry samples.
pub struct TelemetryStore {
    db: Arc<Database>,
}

impl TelemetryStore {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        // Create the table up front so reads before the first append see an
        // empty history instead of a missing-table error.
        let txn = db.begin_write()?;
        txn.open_table(TELEMETRY)?;
        txn.commit()?;
        Ok(Self { db })
    }

    /// Append a sample, returning its sequence number.
    pub fn append(&self, sample: &TelemetrySample) -> Result<u64> {
        let kind = sample.kind();
        let bytes = serde_json::to_vec(sample)?;

        let txn = self.db.begin_write()?;
        let seq;
        {
            let mut table = txn.open_table(TELEMETRY)?;
            let last = {
                let mut range =
                    table.range((kind.as_str(), u64::MIN)..=(kind.as_str(), u64::MAX))?;
                match range.next_back() {
                    Some(entry) => Some(entry?.0.value().1),
                    None => None,
                }
            };
            seq = last.map(|s| s + 1).unwrap_or(0);
            table.insert((kind.as_str(), seq), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(seq)
    }

    /// Most recent `limit` samples of a kind, newest first.
    pub fn recent(&self, kind: TelemetryKind, limit: usize) -> Result<Vec<TelemetrySample>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TELEMETRY)?;
        let range = table.range((kind.as_str(), u64::MIN)..=(kind.as_str(), u64::MAX))?;

        let mut samples = Vec::new();
        for entry in range.rev().take(limit) {
            let (_, value) = entry?;
            let sample: TelemetrySample = serde_json::from_slice(value.value())?;
            samples.push(sample);
        }
        Ok(samples)
    }

    /// Newest sample of a kind, if any.
    pub fn latest(&self, kind: TelemetryKind) -> Result<Option<TelemetrySample>> {
        Ok(self.recent(kind, 1)?.pop())
    }

    /// Total samples stored for a kind.
    pub fn count(&self, kind: TelemetryKind) -> Result<usize> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TELEMETRY)?;
        let range = table.range((kind.as_str(), u64::MIN)..=(kind.as_str(), u64::MAX))?;
        let mut count = 0usize;
        for entry in range {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TelemetryStore {
        TelemetryStore::new(crate::memory().unwrap()).unwrap()
    }

    fn fps(value: f64, timestamp: i64) -> TelemetrySample {
        TelemetrySample::Fps {
            fps: value,
            timestamp,
        }
    }

    #[test]
    fn test_append_and_recent_newest_first() {
        let store = store();
        for i in 0..5 {
            store.append(&fps(20.0 + i as f64, 1000 + i)).unwrap();
        }

        let samples = store.recent(TelemetryKind::Fps, 10).unwrap();
        assert_eq!(samples.len(), 5);
        // Newest first by insertion order.
        assert_eq!(samples[0].timestamp(), 1004);
        assert_eq!(samples[4].timestamp(), 1000);
    }

    #[test]
    fn test_recent_respects_limit() {
        let store = store();
        for i in 0..150 {
            store.append(&fps(30.0, i)).unwrap();
        }

        let samples = store.recent(TelemetryKind::Fps, 100).unwrap();
        assert_eq!(samples.len(), 100);
        assert_eq!(samples[0].timestamp(), 149);
        assert_eq!(samples[99].timestamp(), 50);
    }

    #[test]
    fn test_kinds_are_isolated() {
        let store = store();
        store.append(&fps(25.0, 1)).unwrap();
        store
            .append(&TelemetrySample::Temperature {
                value: 22.5,
                timestamp: 2,
            })
            .unwrap();

        assert_eq!(store.count(TelemetryKind::Fps).unwrap(), 1);
        assert_eq!(store.count(TelemetryKind::Temperature).unwrap(), 1);
        assert!(store.recent(TelemetryKind::Aircon, 10).unwrap().is_empty());
    }

    #[test]
    fn test_latest() {
        let store = store();
        assert!(store.latest(TelemetryKind::Fps).unwrap().is_none());

        store.append(&fps(24.0, 1)).unwrap();
        store.append(&fps(55.0, 2)).unwrap();

        let latest = store.latest(TelemetryKind::Fps).unwrap().unwrap();
        assert_eq!(latest.timestamp(), 2);
    }

    #[test]
    fn test_sequence_survives_reopen() {
        let db = crate::memory().unwrap();
        {
            let store = TelemetryStore::new(db.clone()).unwrap();
            assert_eq!(store.append(&fps(1.0, 1)).unwrap(), 0);
            assert_eq!(store.append(&fps(2.0, 2)).unwrap(), 1);
        }
        let store = TelemetryStore::new(db).unwrap();
        assert_eq!(store.append(&fps(3.0, 3)).unwrap(), 2);
    }
}
