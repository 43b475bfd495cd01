//! Persistent storage for HomeSync.
//!
//! A single redb database holds one table per concern: the device control
//! records and the append-only telemetry histories. Values are stored as
//! JSON; telemetry rows are keyed by `(kind, seq)` where `seq` is a
//! per-kind monotonically increasing sequence number used only for
//! ordering.

pub mod control;
pub mod error;
pub mod telemetry;

pub use control::DeviceControlStore;
pub use error::{Error, Result};
pub use telemetry::TelemetryStore;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

/// Open (or create) the database file at `path`, creating parent
/// directories as needed.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Database>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = if path.exists() {
        Database::open(path)?
    } else {
        Database::create(path)?
    };
    Ok(Arc::new(db))
}

/// Create a throwaway database backed by a temporary file.
///
/// redb has no true in-memory mode, so this uses a uniquely named file in
/// the system temp directory.
pub fn memory() -> Result<Arc<Database>> {
    let path = std::env::temp_dir().join(format!("homesync_{}.redb", uuid::Uuid::new_v4()));
    Ok(Arc::new(Database::create(path)?))
}
