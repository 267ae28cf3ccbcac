//! # Data Directory
//!
//! Opens the durable registry inside a data directory: takes the directory
//! lock, opens the store file and provisions the configured counter.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[cfg(feature = "locking")]
use crate::adapters::lock::{DirectoryLock, LockError};

use super::*;

/// Name of the store file inside the data directory.
pub const STORE_FILE: &str = "avales.db";

/// Errors raised while opening a data directory.
#[derive(Debug, Error)]
pub enum OpenError {
    #[cfg(feature = "locking")]
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Failed to open registry store: {0}")]
    Registry(#[from] AvalError),
}

/// A [`FileRegistry`] bound to its data directory.
///
/// Holds the directory lock for as long as it lives, so no other process can
/// write the same store concurrently.
pub struct DataDirRegistry {
    service: FileRegistry,
    data_dir: PathBuf,
    #[cfg(feature = "locking")]
    _lock: DirectoryLock,
}

impl DataDirRegistry {
    pub fn open(data_dir: &Path, config: RegistryConfig) -> Result<Self, OpenError> {
        #[cfg(feature = "locking")]
        let lock = DirectoryLock::acquire(data_dir)?;
        #[cfg(not(feature = "locking"))]
        std::fs::create_dir_all(data_dir).map_err(|e| AvalError::DatabaseError {
            message: format!("Failed to create {}: {}", data_dir.display(), e),
        })?;

        let kv_store = FileBackedKVStore::open(data_dir.join(STORE_FILE)).map_err(AvalError::from)?;
        let service = FileRegistry::provisioned(
            RegistryDependencies {
                kv_store,
                time_source: SystemTimeSource,
                checksum: DefaultChecksumProvider,
                serializer: BincodeRecordSerializer,
            },
            config,
        )?;

        tracing::info!(data_dir = %data_dir.display(), "Opened aval registry");

        Ok(Self {
            service,
            data_dir: data_dir.to_path_buf(),
            #[cfg(feature = "locking")]
            _lock: lock,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Deref for DataDirRegistry {
    type Target = FileRegistry;

    fn deref(&self) -> &Self::Target {
        &self.service
    }
}

impl DerefMut for DataDirRegistry {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.service
    }
}
