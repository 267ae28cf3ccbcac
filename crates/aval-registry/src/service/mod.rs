//! # Aval Registry Service
//!
//! The application service behind every inbound port.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `SequenceApi` over durable named counters
//! 2. Implements `AvalRegistryApi` (issue, read, list, edit, void)
//! 3. Implements `ReconciliationApi` for bulk reloads
//! 4. Uses dependency injection for storage, clock, checksums and encoding
//!
//! Every mutation takes `&mut self`. Callers that share one registry across
//! threads wrap it in a [`SharedRegistry`], whose write lock is the single
//! writer that makes read-increment-write on the counter indivisible.

mod data_dir;
mod helpers;
mod query;
mod reconcile;
mod records;
mod sequence;

pub use data_dir::{DataDirRegistry, OpenError, STORE_FILE};

use std::sync::Arc;

use parking_lot::RwLock;

use crate::adapters::infra::{DefaultChecksumProvider, SystemTimeSource};
use crate::adapters::serializer::BincodeRecordSerializer;
use crate::adapters::storage::{FileBackedKVStore, InMemoryKVStore};
use crate::domain::correlativo::CorrelativoFormat;
use crate::domain::errors::AvalError;
use crate::domain::value_objects::RegistryConfig;
use crate::ports::inbound::SequenceApi;
use crate::ports::outbound::{
    BatchOperation, ChecksumProvider, KeyValueStore, RecordSerializer, TimeSource,
};

/// Registry handle shared between request handlers.
pub type SharedRegistry<S> = Arc<RwLock<S>>;

/// The Aval Registry Service.
pub struct AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    pub(crate) kv_store: KV,
    pub(crate) time_source: TS,
    pub(crate) checksum: CS,
    pub(crate) serializer: RS,
    pub(crate) config: RegistryConfig,
    pub(crate) format: CorrelativoFormat,
}

/// Dependencies for AvalRegistryService
pub struct RegistryDependencies<KV, TS, CS, RS> {
    pub kv_store: KV,
    pub time_source: TS,
    pub checksum: CS,
    pub serializer: RS,
}

/// Registry over the in-memory store, for tests and tooling dry runs.
pub type InMemoryRegistry = AvalRegistryService<
    InMemoryKVStore,
    SystemTimeSource,
    DefaultChecksumProvider,
    BincodeRecordSerializer,
>;

/// Registry over the durable single-file store.
pub type FileRegistry = AvalRegistryService<
    FileBackedKVStore,
    SystemTimeSource,
    DefaultChecksumProvider,
    BincodeRecordSerializer,
>;

/// Registry over RocksDB.
#[cfg(feature = "rocksdb")]
pub type RocksDbRegistry = AvalRegistryService<
    crate::adapters::storage::RocksDbStore,
    SystemTimeSource,
    DefaultChecksumProvider,
    BincodeRecordSerializer,
>;

impl<KV, TS, CS, RS> AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    /// Create a service over the given dependencies.
    ///
    /// The configured counter is not provisioned here; see
    /// [`SequenceApi::provision_sequence`].
    pub fn new(deps: RegistryDependencies<KV, TS, CS, RS>, config: RegistryConfig) -> Self {
        let format = config.correlativo_format();
        Self {
            kv_store: deps.kv_store,
            time_source: deps.time_source,
            checksum: deps.checksum,
            serializer: deps.serializer,
            config,
            format,
        }
    }

    /// Create a service and make sure its configured counter exists.
    pub fn provisioned(
        deps: RegistryDependencies<KV, TS, CS, RS>,
        config: RegistryConfig,
    ) -> Result<Self, AvalError> {
        let mut service = Self::new(deps, config);
        let name = service.config.sequence_name.clone();
        service.provision_sequence(&name)?;
        Ok(service)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn kv_store(&self) -> &KV {
        &self.kv_store
    }

    /// Wrap the service for use from several threads.
    pub fn into_shared(self) -> SharedRegistry<Self> {
        Arc::new(RwLock::new(self))
    }
}

impl InMemoryRegistry {
    /// Provisioned registry over an empty in-memory store.
    pub fn new_in_memory(config: RegistryConfig) -> Result<Self, AvalError> {
        Self::provisioned(
            RegistryDependencies {
                kv_store: InMemoryKVStore::new(),
                time_source: SystemTimeSource,
                checksum: DefaultChecksumProvider,
                serializer: BincodeRecordSerializer,
            },
            config,
        )
    }
}

#[cfg(feature = "rocksdb")]
impl RocksDbRegistry {
    /// Provisioned registry over the RocksDB database at `path`.
    ///
    /// RocksDB's own `LOCK` file keeps a second process out.
    pub fn open_rocksdb(
        path: impl AsRef<std::path::Path>,
        rocks: crate::adapters::storage::RocksDbConfig,
        config: RegistryConfig,
    ) -> Result<Self, AvalError> {
        let kv_store = crate::adapters::storage::RocksDbStore::open(path, rocks)?;
        Self::provisioned(
            RegistryDependencies {
                kv_store,
                time_source: SystemTimeSource,
                checksum: DefaultChecksumProvider,
                serializer: BincodeRecordSerializer,
            },
            config,
        )
    }
}
