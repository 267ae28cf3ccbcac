//! # Adapters Module
//!
//! Concrete implementations of the outbound ports plus the request boundary.
//!
//! ## Modules
//!
//! - `api_handler`: structured request/response boundary
//! - `infra`: clock and checksum providers
//! - `lock`: data directory locking (single writer per directory)
//! - `serializer`: record encoding
//! - `storage`: key-value store backends

pub mod api_handler;
pub mod infra;
#[cfg(feature = "locking")]
pub mod lock;
pub mod serializer;
pub mod storage;

pub use api_handler::{AvalApiHandler, ApiRequest, ApiResponse, AvalView};
pub use infra::{DefaultChecksumProvider, SystemTimeSource};
#[cfg(feature = "locking")]
pub use lock::{DirectoryLock, LockError};
pub use serializer::BincodeRecordSerializer;
pub use storage::{FileBackedKVStore, InMemoryKVStore};
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbStore};
