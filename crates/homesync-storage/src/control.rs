//! Device control records.
//!
//! One record per device in the fixed fleet, keyed by the device's string
//! form. Records are seeded with defaults at store open and only ever
//! mutated, never deleted.

use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};

use homesync_core::{Device, DeviceRecord};

use crate::{Error, Result};

const DEVICE_CONTROL: TableDefinition<&str, &[u8]> = TableDefinition::new("device_control");

/// Authoritative store for per-device control state.
pub struct DeviceControlStore {
    db: Arc<Database>,
}

impl DeviceControlStore {
    /// Create the store, seeding a default record for any device that does
    /// not already have one.
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let store = Self { db };
        store.seed()?;
        Ok(store)
    }

    /// Insert default records for devices missing from the table. Existing
    /// records are left untouched so state survives restarts.
    fn seed(&self) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DEVICE_CONTROL)?;
            for device in Device::ALL {
                if table.get(device.as_str())?.is_none() {
                    let record = DeviceRecord::new(device);
                    let bytes = serde_json::to_vec(&record)?;
                    table.insert(device.as_str(), bytes.as_slice())?;
                    tracing::debug!(device = %device, "seeded default control record");
                }
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Get the record for a device.
    pub fn get(&self, device: Device) -> Result<DeviceRecord> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DEVICE_CONTROL)?;
        let guard = table
            .get(device.as_str())?
            .ok_or_else(|| Error::NotFound(format!("device not found: {}", device)))?;
        Ok(serde_json::from_slice(guard.value())?)
    }

    /// List every record, in fleet order.
    pub fn list(&self) -> Result<Vec<DeviceRecord>> {
        Device::ALL.iter().map(|d| self.get(*d)).collect()
    }

    /// Persist a record, stamping `last_updated` to the mutation time.
    ///
    /// The write is a single transaction: either the whole record lands or
    /// none of it does.
    pub fn put(&self, record: &mut DeviceRecord) -> Result<()> {
        record.last_updated = chrono::Utc::now().timestamp_millis();
        let bytes = serde_json::to_vec(&record)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DEVICE_CONTROL)?;
            table.insert(record.device.as_str(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}
