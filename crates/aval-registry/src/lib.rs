//! # Aval Registry
//!
//! Issues and manages sequential approval codes ("correlativos") for the
//! office aval workflow: register a request, receive a uniquely numbered
//! code, search the historical log, edit payload fields and void an entry
//! with a reason. Records are never deleted by normal operation.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Gap-free issue | Concurrent creates on a fresh counter yield exactly `1..=N` |
//! | Durable counter | The counter and the record commit in one batch before returning |
//! | Unique codes | A correlativo is never reassigned or edited |
//! | Terminal void | `ANULADO` never returns to `ACTIVO`; voided payloads are frozen |
//! | Paired void data | Reason and timestamp exist exactly when voided |
//! | Data integrity | Record checksums are verified on every read |
//! | Atomic reload | Reconciliation replaces everything or nothing |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (entities, formatter, dates, filters)
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - Storage backends, serializer, clock, lock, request handler
//! - `service/` - Application service implementing the API
//! - `import/` - Delimited-text parser for reconciliation
//!
//! ## Usage
//!
//! ```ignore
//! use aval_registry::{AvalRegistryApi, DataDirRegistry, RegistryConfig};
//!
//! let mut registry = DataDirRegistry::open(Path::new("/var/lib/avales"), RegistryConfig::default())?;
//! let record = registry.create_aval(&payload)?;
//! assert_eq!(record.correlativo(), "DTI|DSST|AVAL|0001");
//! ```

pub mod adapters;
pub mod domain;
pub mod import;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_utils;

pub use domain::correlativo::{parse_sequence, CorrelativoFormat};
pub use domain::dates::{normalize_date, parse_date};
pub use domain::entities::{
    AvalFields, AvalId, AvalPatch, AvalPayload, AvalRecord, EditableField, Estado, Lifecycle,
    SequenceCounter, Timestamp,
};
pub use domain::errors::{AvalError, KVStoreError};
pub use domain::query::{AvalFilters, AvalPage, Paging, RawFilters};
pub use domain::value_objects::{KeyPrefix, RegistryConfig, DEFAULT_SEQUENCE};
pub use import::{decode_text, parse_import, ImportBatch, ImportError, ImportRow};
pub use ports::inbound::{AvalRegistryApi, ImportReport, ReconciliationApi, SequenceApi};
pub use ports::outbound::{
    BatchOperation, ChecksumProvider, KeyValueStore, RecordSerializer, TimeSource,
};
pub use service::{
    AvalRegistryService, DataDirRegistry, FileRegistry, InMemoryRegistry, OpenError,
    RegistryDependencies, SharedRegistry,
};
#[cfg(feature = "rocksdb")]
pub use service::RocksDbRegistry;
