//! # Reconciliation
//!
//! Replaces the whole record store from an import batch. Deleting the old
//! records, inserting the new ones and moving the counter share one atomic
//! batch, so a failure leaves the previous state untouched.

use std::collections::HashSet;

use super::helpers::storage_failure;
use super::*;
use crate::domain::correlativo::parse_sequence;
use crate::domain::entities::{AvalRecord, SequenceCounter};
use crate::domain::value_objects::KeyPrefix;
use crate::import::ImportBatch;
use crate::ports::inbound::{ImportReport, ReconciliationApi};

impl<KV, TS, CS, RS> ReconciliationApi for AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    fn reconcile(&mut self, batch: ImportBatch) -> Result<ImportReport, AvalError> {
        let name = self.config.sequence_name.clone();
        let previous = self.read_counter(&name)?.last_value;

        let mut seen = HashSet::new();
        if let Some(dup) = batch
            .rows
            .iter()
            .find(|row| !seen.insert(row.correlativo.as_str()))
        {
            return Err(AvalError::DuplicateCorrelativo {
                correlativo: dup.correlativo.clone(),
            });
        }

        let sequence_value = batch
            .rows
            .iter()
            .filter_map(|row| parse_sequence(&row.correlativo))
            .fold(batch.max_sequence, u64::max);

        let mut ops = Vec::new();
        let mut removed = 0;
        for prefix in [KeyPrefix::AVAL, KeyPrefix::CORRELATIVO] {
            let existing = self
                .kv_store
                .prefix_scan(prefix)
                .map_err(storage_failure("reconcile"))?;
            if prefix == KeyPrefix::AVAL {
                removed = existing.len();
            }
            ops.extend(existing.into_iter().map(|(key, _)| BatchOperation::delete(key)));
        }

        let now = self.time_source.now();
        let imported = batch.rows.len();
        for (index, row) in batch.rows.into_iter().enumerate() {
            let id = index as u64 + 1;
            let index_key = KeyPrefix::correlativo_key(&row.correlativo);
            let record = AvalRecord::issue(id, row.correlativo, row.fields, now);
            ops.push(BatchOperation::put(
                KeyPrefix::aval_key(id),
                self.encode_record(&record)?,
            ));
            ops.push(BatchOperation::put(index_key, id.to_be_bytes().to_vec()));
        }

        ops.push(BatchOperation::put(
            KeyPrefix::LAST_ID,
            (imported as u64).to_be_bytes().to_vec(),
        ));
        ops.push(BatchOperation::put(
            KeyPrefix::sequence_key(&name),
            SequenceCounter::new(sequence_value).to_bytes().to_vec(),
        ));

        self.kv_store
            .atomic_batch_write(ops)
            .map_err(storage_failure("reconcile"))?;

        tracing::info!(
            removed,
            imported,
            skipped = batch.skipped,
            previous,
            sequence_value,
            "Reconciled aval store"
        );

        Ok(ImportReport {
            imported,
            skipped: batch.skipped,
            sequence_value,
        })
    }
}
