//! # Record Operations
//!
//! Issue, read, edit and void. Issuing is the only path that touches the
//! counter, and it commits the counter together with the record.

use super::helpers::storage_failure;
use super::*;
use crate::domain::entities::{AvalId, AvalPatch, AvalPayload, AvalRecord, SequenceCounter};
use crate::domain::query::{AvalFilters, AvalPage, Paging};
use crate::domain::value_objects::KeyPrefix;
use crate::ports::inbound::AvalRegistryApi;

/// Log a rejected mutation at warn level and pass the error through.
fn rejected(operation: &'static str) -> impl Fn(AvalError) -> AvalError {
    move |err| {
        if err.is_rejection() {
            tracing::warn!(operation, kind = err.kind(), error = %err, "Rejected request");
        }
        err
    }
}

impl<KV, TS, CS, RS> AvalRegistryApi for AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    fn create_aval(&mut self, payload: &AvalPayload) -> Result<AvalRecord, AvalError> {
        let fields = payload.validate().map_err(rejected("create_aval"))?;

        let name = self.config.sequence_name.clone();
        let counter = self.read_counter(&name)?;
        let sequence = counter
            .candidate()
            .ok_or_else(|| AvalError::SequenceExhausted {
                name: name.clone(),
                last_value: counter.last_value,
            })?;
        let correlativo = self.format.format(sequence)?;

        let index_key = KeyPrefix::correlativo_key(&correlativo);
        if self
            .kv_store
            .exists(&index_key)
            .map_err(storage_failure("create_aval"))?
        {
            tracing::error!(%correlativo, "Counter points at an already issued correlativo");
            return Err(AvalError::DuplicateCorrelativo { correlativo });
        }

        let id = self
            .read_u64(KeyPrefix::LAST_ID)?
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| AvalError::DatabaseError {
                message: "Aval id space exhausted".to_string(),
            })?;

        let record = AvalRecord::issue(id, correlativo, fields, self.time_source.now());
        let envelope = self.encode_record(&record)?;

        self.kv_store
            .atomic_batch_write(vec![
                BatchOperation::put(
                    KeyPrefix::sequence_key(&name),
                    SequenceCounter::new(sequence).to_bytes().to_vec(),
                ),
                BatchOperation::put(KeyPrefix::LAST_ID, id.to_be_bytes().to_vec()),
                BatchOperation::put(KeyPrefix::aval_key(id), envelope),
                BatchOperation::put(index_key, id.to_be_bytes().to_vec()),
            ])
            .map_err(storage_failure("create_aval"))?;

        tracing::info!(
            id,
            sequence,
            correlativo = record.correlativo(),
            "Issued aval"
        );
        Ok(record)
    }

    fn get_aval(&self, id: AvalId) -> Result<AvalRecord, AvalError> {
        self.load_record(id)
    }

    fn list_avales(
        &self,
        filters: &AvalFilters,
        paging: Option<Paging>,
    ) -> Result<AvalPage, AvalError> {
        self.query(filters, paging)
    }

    fn edit_aval(&mut self, id: AvalId, patch: &AvalPatch) -> Result<AvalRecord, AvalError> {
        let mut record = self.load_record(id).map_err(rejected("edit_aval"))?;

        record
            .apply_patch(patch, self.time_source.now())
            .map_err(rejected("edit_aval"))?;
        if patch.is_empty() {
            return Err(rejected("edit_aval")(AvalError::validation(
                "No fields to update",
                Vec::<String>::new(),
            )));
        }
        self.store_record(&record, "edit_aval")?;

        let fields: Vec<&str> = patch.fields().map(|f| f.as_str()).collect();
        tracing::info!(
            id,
            correlativo = record.correlativo(),
            fields = ?fields,
            "Edited aval"
        );
        Ok(record)
    }

    fn void_aval(&mut self, id: AvalId, motivo: &str) -> Result<AvalRecord, AvalError> {
        let mut record = self.load_record(id).map_err(rejected("void_aval"))?;

        record
            .void(motivo, self.time_source.now())
            .map_err(rejected("void_aval"))?;
        self.store_record(&record, "void_aval")?;

        tracing::info!(
            id,
            correlativo = record.correlativo(),
            motivo = record.motivo_anulacion().unwrap_or_default(),
            "Voided aval"
        );
        Ok(record)
    }
}
