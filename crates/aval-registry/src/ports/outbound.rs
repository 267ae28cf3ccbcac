//! # Outbound Ports (Driven Ports)
//!
//! What the registry service needs from its host: an ordered key-value
//! store with atomic batches, a wall clock, checksums and a record codec.

use crate::domain::entities::{AvalRecord, Timestamp};
use crate::domain::errors::{KVStoreError, SerializationError};

/// Key/value pairs returned by [`KeyValueStore::prefix_scan`], in key order.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Durable byte-keyed storage.
///
/// Implemented by `FileBackedKVStore` (default), `RocksDbStore` (`rocksdb`
/// feature) and `InMemoryKVStore` (tests, dry runs).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Remove `key`; removing an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Apply every operation, in order, as one unit.
    ///
    /// ## Atomicity Guarantee
    ///
    /// On `Ok` the whole batch is durable. On `Err` nothing from the batch is
    /// visible to later reads, so a counter increment written together with
    /// its record can never survive on its own.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// All entries whose key starts with `prefix`, sorted by key.
    ///
    /// Record keys embed the id big-endian, so this yields records in id
    /// order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// CRC32 over stored record bytes.
pub trait ChecksumProvider: Send + Sync {
    fn compute_crc32(&self, data: &[u8]) -> u32;

    fn verify_crc32(&self, data: &[u8], expected: u32) -> bool {
        self.compute_crc32(data) == expected
    }
}

/// Wall clock used for `created_at`, `updated_at` and `anulado_at`.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Encoding of [`AvalRecord`] inside the checksum envelope.
pub trait RecordSerializer: Send + Sync {
    fn serialize(&self, record: &AvalRecord) -> Result<Vec<u8>, SerializationError>;

    fn deserialize(&self, data: &[u8]) -> Result<AvalRecord, SerializationError>;
}
