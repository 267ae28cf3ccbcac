use super::{apply_batch, scan_prefix, Entries};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};

/// Volatile store for tests and import dry runs.
#[derive(Default)]
pub struct InMemoryKVStore {
    entries: Entries,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys, counters and indexes included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        apply_batch(&mut self.entries, operations);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.entries.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_prefix(&self.entries, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::KeyPrefix;

    #[test]
    fn test_batch_applies_in_order() {
        let mut store = InMemoryKVStore::new();
        store.put(b"c:DTI|DSST|AVAL|0001", &1u64.to_be_bytes()).unwrap();

        store
            .atomic_batch_write(vec![
                BatchOperation::put(KeyPrefix::aval_key(2), b"second".to_vec()),
                BatchOperation::delete(b"c:DTI|DSST|AVAL|0001".to_vec()),
                BatchOperation::put(KeyPrefix::aval_key(2), b"final".to_vec()),
            ])
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(&KeyPrefix::aval_key(2)).unwrap(),
            Some(b"final".to_vec())
        );
        assert!(!store.exists(b"c:DTI|DSST|AVAL|0001").unwrap());
    }

    #[test]
    fn test_prefix_scan_is_ordered_by_id() {
        let mut store = InMemoryKVStore::new();
        for id in [300u64, 2, 17] {
            store.put(&KeyPrefix::aval_key(id), b"record").unwrap();
        }
        store.put(&KeyPrefix::sequence_key("AVAL"), &[0; 8]).unwrap();

        let keys: Vec<Vec<u8>> = store
            .prefix_scan(KeyPrefix::AVAL)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec![
                KeyPrefix::aval_key(2),
                KeyPrefix::aval_key(17),
                KeyPrefix::aval_key(300)
            ]
        );
        assert!(store.prefix_scan(b"x:").unwrap().is_empty());
    }
}
