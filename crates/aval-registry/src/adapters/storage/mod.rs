//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait. The in-memory and file
//! stores share one ordered map representation; RocksDB is optional.

mod file;
mod memory;
#[cfg(feature = "rocksdb")]
mod rocksdb;

pub use file::FileBackedKVStore;
pub use memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStore};

use std::collections::BTreeMap;

use crate::ports::outbound::{BatchOperation, ScanResult};

/// Ordered key space used by the map-based stores.
pub(crate) type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

/// Apply a batch in order; a later operation on the same key wins.
pub(crate) fn apply_batch(entries: &mut Entries, operations: Vec<BatchOperation>) {
    for op in operations {
        match op {
            BatchOperation::Put { key, value } => {
                entries.insert(key, value);
            }
            BatchOperation::Delete { key } => {
                entries.remove(&key);
            }
        }
    }
}

/// Entries under `prefix`, in key order.
pub(crate) fn scan_prefix(entries: &Entries, prefix: &[u8]) -> ScanResult {
    entries
        .range(prefix.to_vec()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
