//! # Sequence Counter Operations
//!
//! Named durable counters. `next` and `resync` are the only writers of a
//! counter after provisioning; both persist before returning.

use super::helpers::storage_failure;
use super::*;
use crate::domain::entities::SequenceCounter;
use crate::domain::value_objects::KeyPrefix;

impl<KV, TS, CS, RS> SequenceApi for AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    fn provision_sequence(&mut self, name: &str) -> Result<u64, AvalError> {
        if let Some(value) = self.read_u64(&KeyPrefix::sequence_key(name))? {
            return Ok(value);
        }

        self.kv_store
            .atomic_batch_write(vec![BatchOperation::put(
                KeyPrefix::sequence_key(name),
                SequenceCounter::new(0).to_bytes().to_vec(),
            )])
            .map_err(storage_failure("provision_sequence"))?;

        tracing::info!(sequence = name, "Provisioned sequence counter");
        Ok(0)
    }

    fn current_sequence(&self, name: &str) -> Result<u64, AvalError> {
        Ok(self.read_counter(name)?.last_value)
    }

    fn next_sequence(&mut self, name: &str) -> Result<u64, AvalError> {
        let counter = self.read_counter(name)?;
        let candidate = counter
            .candidate()
            .ok_or_else(|| AvalError::SequenceExhausted {
                name: name.to_string(),
                last_value: counter.last_value,
            })?;

        self.kv_store
            .atomic_batch_write(vec![BatchOperation::put(
                KeyPrefix::sequence_key(name),
                SequenceCounter::new(candidate).to_bytes().to_vec(),
            )])
            .map_err(storage_failure("next_sequence"))?;

        tracing::debug!(sequence = name, value = candidate, "Advanced sequence counter");
        Ok(candidate)
    }

    fn resync_sequence(&mut self, name: &str, value: u64) -> Result<(), AvalError> {
        let previous = self.read_counter(name)?.last_value;

        self.kv_store
            .atomic_batch_write(vec![BatchOperation::put(
                KeyPrefix::sequence_key(name),
                SequenceCounter::new(value).to_bytes().to_vec(),
            )])
            .map_err(storage_failure("resync_sequence"))?;

        tracing::info!(sequence = name, previous, value, "Resynchronized sequence counter");
        Ok(())
    }
}
