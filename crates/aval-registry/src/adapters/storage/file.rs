use std::io::Write;
use std::path::{Path, PathBuf};

use super::{apply_batch, scan_prefix, Entries};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};

/// File-backed key-value store for single-office deployments.
///
/// The whole map is rewritten through a temp file, fsynced and renamed over
/// the previous file before any write returns, so a committed batch survives
/// a crash and a failed one leaves the previous file untouched.
///
/// File format: `[key_len:u32][key][value_len:u32][value]...[crc32:u32]`,
/// little-endian, checksum over everything before it.
pub struct FileBackedKVStore {
    data: Entries,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating an empty one if the file is absent.
    ///
    /// ## Errors
    ///
    /// - `CorruptionError`: the file exists but is truncated or fails its checksum
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::read(&path) {
            Ok(bytes) => {
                let data = Self::decode(&bytes)?;
                tracing::info!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    keys = data.len(),
                    "Loaded aval store"
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No existing aval store, starting empty");
                Entries::new()
            }
            Err(e) => {
                return Err(KVStoreError::IOError {
                    message: format!("Failed to read {}: {}", path.display(), e),
                })
            }
        };

        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(bytes: &[u8]) -> Result<Entries, KVStoreError> {
        let corrupt = |message: &str| KVStoreError::CorruptionError {
            message: message.to_string(),
        };

        if bytes.len() < 4 {
            return Err(corrupt("store file shorter than its checksum"));
        }
        let (body, trailer) = bytes.split_at(bytes.len() - 4);
        let expected = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        if crc32fast::hash(body) != expected {
            return Err(corrupt("store file checksum mismatch"));
        }

        let mut data = Entries::new();
        let mut cursor = 0;
        let mut read_chunk = |cursor: &mut usize| -> Result<Vec<u8>, KVStoreError> {
            let len_bytes = body
                .get(*cursor..*cursor + 4)
                .ok_or_else(|| corrupt("truncated length prefix"))?;
            let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]])
                as usize;
            *cursor += 4;
            let chunk = body
                .get(*cursor..*cursor + len)
                .ok_or_else(|| corrupt("truncated entry"))?;
            *cursor += len;
            Ok(chunk.to_vec())
        };

        while cursor < body.len() {
            let key = read_chunk(&mut cursor)?;
            let value = read_chunk(&mut cursor)?;
            data.insert(key, value);
        }

        Ok(data)
    }

    fn encode(data: &Entries) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        bytes
    }

    fn save(&self, data: &Entries) -> Result<(), KVStoreError> {
        let io_err = |e: std::io::Error| KVStoreError::IOError {
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_err)?;
        file.write_all(&Self::encode(data)).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;

        std::fs::rename(&temp_path, &self.path).map_err(io_err)?;
        sync_dir(self.path.parent())
    }

    /// Persist `next` and adopt it only once it is on disk.
    fn commit(&mut self, next: Entries) -> Result<(), KVStoreError> {
        self.save(&next)?;
        self.data = next;
        Ok(())
    }
}

/// Flush the directory entry left by a rename, so the new file is what a
/// crash recovers.
#[cfg(unix)]
fn sync_dir(dir: Option<&Path>) -> Result<(), KVStoreError> {
    let dir = match dir {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    std::fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| KVStoreError::IOError {
            message: format!("Failed to sync directory {}: {}", dir.display(), e),
        })
}

// Directories cannot be opened for fsync outside Unix.
#[cfg(not(unix))]
fn sync_dir(_dir: Option<&Path>) -> Result<(), KVStoreError> {
    Ok(())
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.commit(next)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_prefix(&self.data, prefix))
    }
}
