//! # Aval Registry Service - Helper Methods
//!
//! Record envelopes and raw key access shared by the operation modules.
//!
//! Envelope layout: `[crc32 of body: u32 BE][bincode body]`.

use super::*;
use crate::domain::entities::{AvalId, AvalRecord, SequenceCounter};
use crate::domain::errors::KVStoreError;
use crate::domain::value_objects::KeyPrefix;

const CHECKSUM_LEN: usize = 4;

/// Log a storage failure and convert it. Storage failures are never retried.
pub(crate) fn storage_failure(operation: &'static str) -> impl Fn(KVStoreError) -> AvalError {
    move |err| {
        tracing::error!(operation, error = %err, "Storage failure");
        AvalError::from(err)
    }
}

impl<KV, TS, CS, RS> AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    pub(crate) fn encode_record(&self, record: &AvalRecord) -> Result<Vec<u8>, AvalError> {
        let body = self.serializer.serialize(record)?;
        let checksum = self.checksum.compute_crc32(&body);

        let mut bytes = Vec::with_capacity(CHECKSUM_LEN + body.len());
        bytes.extend_from_slice(&checksum.to_be_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Verify and decode a stored envelope.
    pub(crate) fn decode_record(&self, id: AvalId, bytes: &[u8]) -> Result<AvalRecord, AvalError> {
        if bytes.len() < CHECKSUM_LEN {
            return Err(AvalError::SerializationError {
                message: format!("Envelope for aval {} is truncated", id),
            });
        }
        let (head, body) = bytes.split_at(CHECKSUM_LEN);
        let expected = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);

        if !self.checksum.verify_crc32(body, expected) {
            let actual = self.checksum.compute_crc32(body);
            tracing::error!(id, expected, actual, "Checksum mismatch on stored aval");
            return Err(AvalError::DataCorruption {
                id,
                expected,
                actual,
            });
        }

        Ok(self.serializer.deserialize(body)?)
    }

    /// Load one record by id.
    pub(crate) fn load_record(&self, id: AvalId) -> Result<AvalRecord, AvalError> {
        let bytes = self
            .kv_store
            .get(&KeyPrefix::aval_key(id))
            .map_err(storage_failure("get_aval"))?
            .ok_or(AvalError::NotFound { id })?;
        self.decode_record(id, &bytes)
    }

    /// Load every record in ascending id order.
    pub(crate) fn load_all_records(&self) -> Result<Vec<AvalRecord>, AvalError> {
        let entries = self
            .kv_store
            .prefix_scan(KeyPrefix::AVAL)
            .map_err(storage_failure("scan_avales"))?;

        entries
            .iter()
            .map(|(key, value)| {
                let id = parse_id_key(key)?;
                self.decode_record(id, value)
            })
            .collect()
    }

    /// Read a big-endian `u64` value.
    pub(crate) fn read_u64(&self, key: &[u8]) -> Result<Option<u64>, AvalError> {
        let Some(bytes) = self.kv_store.get(key).map_err(storage_failure("read"))? else {
            return Ok(None);
        };
        SequenceCounter::from_bytes(&bytes)
            .map(|c| Some(c.last_value))
            .ok_or_else(|| AvalError::DatabaseError {
                message: format!(
                    "Malformed integer under key {}",
                    String::from_utf8_lossy(key)
                ),
            })
    }

    /// Read a counter, failing when it was never provisioned.
    pub(crate) fn read_counter(&self, name: &str) -> Result<SequenceCounter, AvalError> {
        self.read_u64(&KeyPrefix::sequence_key(name))?
            .map(SequenceCounter::new)
            .ok_or_else(|| AvalError::UnknownSequence {
                name: name.to_string(),
            })
    }

    /// Write one record back in a single-operation batch.
    pub(crate) fn store_record(
        &mut self,
        record: &AvalRecord,
        operation: &'static str,
    ) -> Result<(), AvalError> {
        let bytes = self.encode_record(record)?;
        self.kv_store
            .atomic_batch_write(vec![BatchOperation::put(
                KeyPrefix::aval_key(record.id),
                bytes,
            )])
            .map_err(storage_failure(operation))
    }
}

fn parse_id_key(key: &[u8]) -> Result<AvalId, AvalError> {
    key.strip_prefix(KeyPrefix::AVAL)
        .and_then(|raw| <[u8; 8]>::try_from(raw).ok())
        .map(u64::from_be_bytes)
        .ok_or_else(|| AvalError::DatabaseError {
            message: "Invalid aval key format".to_string(),
        })
}
