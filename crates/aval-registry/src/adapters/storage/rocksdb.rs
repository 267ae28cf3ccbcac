//! # RocksDB Storage Adapter
//!
//! Alternative durable backend behind the `rocksdb` feature.
//!
//! Every write goes through a `WriteBatch` with fsync enabled, so a batch
//! that returns `Ok` has reached the write-ahead log on disk.

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use std::path::Path;

/// RocksDB tuning for the registry. The data set is small; durability matters.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Write buffer size in bytes (default: 4MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

fn rocks_err(operation: &'static str) -> impl Fn(rocksdb::Error) -> KVStoreError {
    move |e| KVStoreError::IOError {
        message: format!("RocksDB {operation} failed: {e}"),
    }
}

/// Registry keys in a single RocksDB column family.
pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create a database at `path`.
    pub fn open(path: impl AsRef<Path>, config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, path.as_ref()).map_err(rocks_err("open"))?;

        tracing::info!(path = %path.as_ref().display(), "Opened RocksDB aval store");
        Ok(Self { db, config })
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(rocks_err("get"))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }

        self.db
            .write_opt(batch, &self.write_options())
            .map_err(rocks_err("batch write"))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.db.get_pinned(key).map_err(rocks_err("exists"))?.is_some())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        let mut entries = Vec::new();
        let scan = self
            .db
            .iterator(IteratorMode::From(prefix, Direction::Forward));
        for item in scan {
            let (key, value) = item.map_err(rocks_err("scan"))?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key.into_vec(), value.into_vec()));
        }
        Ok(entries)
    }
}
