//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the aval registry, consumed by the form/API layer and
//! by the administrative tooling.

use crate::domain::entities::{AvalId, AvalPatch, AvalPayload, AvalRecord};
use crate::domain::errors::AvalError;
use crate::domain::query::{AvalFilters, AvalPage, Paging};
use crate::import::ImportBatch;

/// Primary API for aval records.
///
/// Implementations must enforce the lifecycle rules: correlativos are never
/// reassigned, `Voided` is terminal and records are never deleted.
pub trait AvalRegistryApi {
    /// Issue a new aval with the next correlativo.
    ///
    /// ## Atomicity
    ///
    /// The counter increment and the record insert commit together.
    ///
    /// ## Errors
    ///
    /// - `ValidationError`: required fields missing or malformed
    /// - `UnknownSequence`: the configured counter was never provisioned
    fn create_aval(&mut self, payload: &AvalPayload) -> Result<AvalRecord, AvalError>;

    /// Read one record.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `DataCorruption`: checksum mismatch on the stored record
    fn get_aval(&self, id: AvalId) -> Result<AvalRecord, AvalError>;

    /// Filter the log, most recent first.
    ///
    /// Without `paging` every match is returned. `total` always counts every
    /// match before paging.
    fn list_avales(
        &self,
        filters: &AvalFilters,
        paging: Option<Paging>,
    ) -> Result<AvalPage, AvalError>;

    /// Update payload fields of an active record.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `Immutable`: the record is voided
    fn edit_aval(&mut self, id: AvalId, patch: &AvalPatch) -> Result<AvalRecord, AvalError>;

    /// Edit from a raw name/value map as submitted by a caller.
    ///
    /// The record is checked before the submitted names, so an unknown id
    /// reports `NotFound` and a voided record reports `Immutable` whatever
    /// the map contains.
    ///
    /// ## Errors
    ///
    /// - `NotFound`, `Immutable`: as for [`edit_aval`](Self::edit_aval)
    /// - `ForbiddenField`: identity, lifecycle or unknown field name
    /// - `ValidationError`: blank or non-string values, or an empty map
    fn edit_fields(
        &mut self,
        id: AvalId,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<AvalRecord, AvalError> {
        let current = self.get_aval(id)?;
        if current.is_voided() {
            return Err(AvalError::Immutable {
                correlativo: current.correlativo().to_string(),
            });
        }
        let patch = AvalPatch::from_fields(fields.iter().map(|(k, v)| (k.as_str(), v)))?;
        self.edit_aval(id, &patch)
    }

    /// Void a record with a reason. Not idempotent.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no record with this id
    /// - `ValidationError`: blank reason
    /// - `AlreadyVoided`: the record was voided before
    fn void_aval(&mut self, id: AvalId, motivo: &str) -> Result<AvalRecord, AvalError>;
}

/// Named durable counters.
pub trait SequenceApi {
    /// Create the counter at zero if it does not exist yet.
    ///
    /// Returns the counter's current value.
    fn provision_sequence(&mut self, name: &str) -> Result<u64, AvalError>;

    /// Current value without advancing.
    ///
    /// ## Errors
    ///
    /// - `UnknownSequence`: the counter does not exist
    fn current_sequence(&self, name: &str) -> Result<u64, AvalError>;

    /// Durably advance the counter by one and return the new value.
    ///
    /// ## Errors
    ///
    /// - `UnknownSequence`: the counter does not exist
    /// - `SequenceExhausted`: the counter reached `u64::MAX`
    fn next_sequence(&mut self, name: &str) -> Result<u64, AvalError>;

    /// Overwrite the counter. Administrative use only.
    ///
    /// ## Errors
    ///
    /// - `UnknownSequence`: the counter does not exist
    fn resync_sequence(&mut self, name: &str, value: u64) -> Result<(), AvalError>;
}

/// Bulk replacement of the record store.
pub trait ReconciliationApi {
    /// Replace every record with `batch` and set the counter to the highest
    /// embedded sequence, in one atomic unit.
    fn reconcile(&mut self, batch: ImportBatch) -> Result<ImportReport, AvalError>;
}

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    /// Records written.
    pub imported: usize,
    /// Placeholder rows skipped by the parser.
    pub skipped: usize,
    /// Counter value after the import.
    pub sequence_value: u64,
}

impl<T: AvalRegistryApi + ?Sized> AvalRegistryApi for &mut T {
    fn create_aval(&mut self, payload: &AvalPayload) -> Result<AvalRecord, AvalError> {
        (**self).create_aval(payload)
    }

    fn get_aval(&self, id: AvalId) -> Result<AvalRecord, AvalError> {
        (**self).get_aval(id)
    }

    fn list_avales(
        &self,
        filters: &AvalFilters,
        paging: Option<Paging>,
    ) -> Result<AvalPage, AvalError> {
        (**self).list_avales(filters, paging)
    }

    fn edit_aval(&mut self, id: AvalId, patch: &AvalPatch) -> Result<AvalRecord, AvalError> {
        (**self).edit_aval(id, patch)
    }

    fn void_aval(&mut self, id: AvalId, motivo: &str) -> Result<AvalRecord, AvalError> {
        (**self).void_aval(id, motivo)
    }
}
