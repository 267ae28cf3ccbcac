//! # Domain Entities
//!
//! Core entities of the aval registry.
//!
//! ## Invariants
//!
//! - `correlativo` is assigned once at issue time and has no setter
//! - Lifecycle moves only from `Active` to `Voided`; `Voided` is terminal
//! - The void reason and timestamp live inside `Lifecycle::Voided`, so they
//!   exist exactly when the record is voided

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::dates::parse_date;
use super::errors::AvalError;

/// Local wall-clock timestamp.
pub type Timestamp = NaiveDateTime;

/// Surrogate record identifier assigned by the store.
pub type AvalId = u64;

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Lifecycle label as exposed to callers and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estado {
    #[serde(rename = "ACTIVO")]
    Active,
    #[serde(rename = "ANULADO")]
    Voided,
}

impl Estado {
    pub fn as_str(&self) -> &'static str {
        match self {
            Estado::Active => "ACTIVO",
            Estado::Voided => "ANULADO",
        }
    }

    /// Interpret a filter value. Unknown values yield `None` (no filter).
    pub fn from_filter(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "ACTIVO" | "ACTIVE" => Some(Estado::Active),
            "ANULADO" | "VOIDED" => Some(Estado::Voided),
            _ => None,
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state carrying the void details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    Voided {
        motivo: String,
        anulado_at: Timestamp,
    },
}

// =============================================================================
// EDITABLE FIELDS
// =============================================================================

/// The closed set of payload fields a caller may supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EditableField {
    FechaRegistro,
    FechaSolicitud,
    DireccionAdministrativa,
    UnidadInstitucion,
    NombreSolicitante,
    Cargo,
    Responsable,
    MemorandoSolicitud,
}

/// Names that identify or describe the lifecycle of a record. Only the
/// issue and void operations may set them.
pub const PROTECTED_FIELDS: [&str; 4] =
    ["correlativo", "estado", "motivo_anulacion", "anulado_at"];

impl EditableField {
    pub const ALL: [EditableField; 8] = [
        EditableField::FechaRegistro,
        EditableField::FechaSolicitud,
        EditableField::DireccionAdministrativa,
        EditableField::UnidadInstitucion,
        EditableField::NombreSolicitante,
        EditableField::Cargo,
        EditableField::Responsable,
        EditableField::MemorandoSolicitud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EditableField::FechaRegistro => "fecha_registro",
            EditableField::FechaSolicitud => "fecha_solicitud",
            EditableField::DireccionAdministrativa => "direccion_administrativa",
            EditableField::UnidadInstitucion => "unidad_institucion",
            EditableField::NombreSolicitante => "nombre_solicitante",
            EditableField::Cargo => "cargo",
            EditableField::Responsable => "responsable",
            EditableField::MemorandoSolicitud => "memorando_solicitud",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            EditableField::FechaRegistro | EditableField::FechaSolicitud
        )
    }

    /// Validate and normalize one raw value for this field.
    fn parse_value(&self, raw: &str) -> Option<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.is_date() {
            parse_date(trimmed).map(FieldValue::Date)
        } else {
            Some(FieldValue::Text(trimmed.to_string()))
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    fn date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(_) => None,
        }
    }

    fn text(&self) -> String {
        match self {
            FieldValue::Date(d) => d.to_string(),
            FieldValue::Text(t) => t.clone(),
        }
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Raw creation request as submitted by the form layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvalPayload {
    pub fecha_registro: String,
    pub fecha_solicitud: String,
    pub direccion_administrativa: String,
    pub unidad_institucion: String,
    pub nombre_solicitante: String,
    pub cargo: String,
    pub responsable: String,
    pub memorando_solicitud: String,
}

impl AvalPayload {
    fn raw(&self, field: EditableField) -> &str {
        match field {
            EditableField::FechaRegistro => &self.fecha_registro,
            EditableField::FechaSolicitud => &self.fecha_solicitud,
            EditableField::DireccionAdministrativa => &self.direccion_administrativa,
            EditableField::UnidadInstitucion => &self.unidad_institucion,
            EditableField::NombreSolicitante => &self.nombre_solicitante,
            EditableField::Cargo => &self.cargo,
            EditableField::Responsable => &self.responsable,
            EditableField::MemorandoSolicitud => &self.memorando_solicitud,
        }
    }

    /// Check every required field and normalize dates.
    ///
    /// ## Errors
    ///
    /// - `ValidationError`: lists every blank or unparseable field
    pub fn validate(&self) -> Result<AvalFields, AvalError> {
        let mut values = BTreeMap::new();
        let mut invalid = Vec::new();

        for field in EditableField::ALL {
            match field.parse_value(self.raw(field)) {
                Some(value) => {
                    values.insert(field, value);
                }
                None => invalid.push(field.as_str()),
            }
        }

        if !invalid.is_empty() {
            return Err(AvalError::validation(
                "Missing or invalid required fields",
                invalid,
            ));
        }

        let date = |f: EditableField| match values.get(&f) {
            Some(FieldValue::Date(d)) => Ok(*d),
            _ => Err(AvalError::validation("Invalid date", [f.as_str()])),
        };
        let text = |f: EditableField| match values.get(&f) {
            Some(FieldValue::Text(t)) => Ok(t.clone()),
            _ => Err(AvalError::validation("Invalid value", [f.as_str()])),
        };

        Ok(AvalFields {
            fecha_registro: date(EditableField::FechaRegistro)?,
            fecha_solicitud: Some(date(EditableField::FechaSolicitud)?),
            direccion_administrativa: text(EditableField::DireccionAdministrativa)?,
            unidad_institucion: text(EditableField::UnidadInstitucion)?,
            nombre_solicitante: text(EditableField::NombreSolicitante)?,
            cargo: text(EditableField::Cargo)?,
            responsable: Some(text(EditableField::Responsable)?),
            memorando_solicitud: text(EditableField::MemorandoSolicitud)?,
        })
    }
}

/// Validated payload values, ready to be issued or imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvalFields {
    pub fecha_registro: NaiveDate,
    pub fecha_solicitud: Option<NaiveDate>,
    pub direccion_administrativa: String,
    pub unidad_institucion: String,
    pub nombre_solicitante: String,
    pub cargo: String,
    pub responsable: Option<String>,
    pub memorando_solicitud: String,
}

/// Partial update of payload fields.
///
/// Only [`EditableField`] values can be represented, so identity and
/// lifecycle columns cannot reach the store through an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvalPatch {
    changes: BTreeMap<EditableField, FieldValue>,
}

impl AvalPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field, validating the value.
    pub fn set(mut self, field: EditableField, value: &str) -> Result<Self, AvalError> {
        let parsed = field
            .parse_value(value)
            .ok_or_else(|| AvalError::validation("Invalid fields for update", [field.as_str()]))?;
        self.changes.insert(field, parsed);
        Ok(self)
    }

    /// Build a patch from a raw name/value map submitted by a caller.
    ///
    /// ## Errors
    ///
    /// - `ForbiddenField`: a protected or unknown field name was submitted
    /// - `ValidationError`: a value is not a non-blank string (all offending
    ///   fields are listed), or no field was submitted at all
    pub fn from_fields<'a, I>(fields: I) -> Result<Self, AvalError>
    where
        I: IntoIterator<Item = (&'a str, &'a serde_json::Value)>,
    {
        let fields: Vec<_> = fields.into_iter().collect();

        if let Some((name, _)) = fields
            .iter()
            .find(|(name, _)| PROTECTED_FIELDS.contains(name))
        {
            return Err(AvalError::ForbiddenField {
                field: name.to_string(),
            });
        }

        let mut patch = Self::new();
        let mut invalid = Vec::new();

        for (name, value) in fields {
            let field = EditableField::from_name(name).ok_or_else(|| AvalError::ForbiddenField {
                field: name.to_string(),
            })?;
            match value.as_str().and_then(|raw| field.parse_value(raw)) {
                Some(parsed) => {
                    patch.changes.insert(field, parsed);
                }
                None => invalid.push(field.as_str()),
            }
        }

        if !invalid.is_empty() {
            return Err(AvalError::validation("Invalid fields for update", invalid));
        }
        if patch.is_empty() {
            return Err(AvalError::validation(
                "No fields to update",
                Vec::<String>::new(),
            ));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = EditableField> + '_ {
        self.changes.keys().copied()
    }
}

// =============================================================================
// AVAL RECORD
// =============================================================================

/// An issued approval record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvalRecord {
    pub id: AvalId,
    correlativo: String,
    pub fecha_registro: NaiveDate,
    pub fecha_solicitud: Option<NaiveDate>,
    pub direccion_administrativa: String,
    pub unidad_institucion: String,
    pub nombre_solicitante: String,
    pub cargo: String,
    pub responsable: Option<String>,
    pub memorando_solicitud: String,
    lifecycle: Lifecycle,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl AvalRecord {
    /// Issue a new active record.
    pub fn issue(id: AvalId, correlativo: String, fields: AvalFields, now: Timestamp) -> Self {
        Self {
            id,
            correlativo,
            fecha_registro: fields.fecha_registro,
            fecha_solicitud: fields.fecha_solicitud,
            direccion_administrativa: fields.direccion_administrativa,
            unidad_institucion: fields.unidad_institucion,
            nombre_solicitante: fields.nombre_solicitante,
            cargo: fields.cargo,
            responsable: fields.responsable,
            memorando_solicitud: fields.memorando_solicitud,
            lifecycle: Lifecycle::Active,
            created_at: now,
            updated_at: None,
        }
    }

    pub fn correlativo(&self) -> &str {
        &self.correlativo
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn estado(&self) -> Estado {
        match self.lifecycle {
            Lifecycle::Active => Estado::Active,
            Lifecycle::Voided { .. } => Estado::Voided,
        }
    }

    pub fn is_voided(&self) -> bool {
        self.estado() == Estado::Voided
    }

    pub fn motivo_anulacion(&self) -> Option<&str> {
        match &self.lifecycle {
            Lifecycle::Voided { motivo, .. } => Some(motivo),
            Lifecycle::Active => None,
        }
    }

    pub fn anulado_at(&self) -> Option<Timestamp> {
        match &self.lifecycle {
            Lifecycle::Voided { anulado_at, .. } => Some(*anulado_at),
            Lifecycle::Active => None,
        }
    }

    /// Apply a partial update. Fields absent from the patch keep their value.
    ///
    /// ## Errors
    ///
    /// - `Immutable`: the record is voided (nothing is changed)
    pub fn apply_patch(&mut self, patch: &AvalPatch, now: Timestamp) -> Result<(), AvalError> {
        if self.is_voided() {
            return Err(AvalError::Immutable {
                correlativo: self.correlativo.clone(),
            });
        }

        for (field, value) in &patch.changes {
            match field {
                EditableField::FechaRegistro => {
                    if let Some(d) = value.date() {
                        self.fecha_registro = d;
                    }
                }
                EditableField::FechaSolicitud => self.fecha_solicitud = value.date(),
                EditableField::DireccionAdministrativa => {
                    self.direccion_administrativa = value.text()
                }
                EditableField::UnidadInstitucion => self.unidad_institucion = value.text(),
                EditableField::NombreSolicitante => self.nombre_solicitante = value.text(),
                EditableField::Cargo => self.cargo = value.text(),
                EditableField::Responsable => self.responsable = Some(value.text()),
                EditableField::MemorandoSolicitud => self.memorando_solicitud = value.text(),
            }
        }

        self.updated_at = Some(now);
        Ok(())
    }

    /// Terminal transition to `Voided`.
    ///
    /// ## Errors
    ///
    /// - `ValidationError`: `motivo` is blank after trimming
    /// - `AlreadyVoided`: the record was voided before (nothing is changed)
    pub fn void(&mut self, motivo: &str, now: Timestamp) -> Result<(), AvalError> {
        let motivo = motivo.trim();
        if motivo.is_empty() {
            return Err(AvalError::validation(
                "A reason is required to void an aval",
                ["motivo"],
            ));
        }
        if self.is_voided() {
            return Err(AvalError::AlreadyVoided {
                correlativo: self.correlativo.clone(),
            });
        }

        self.lifecycle = Lifecycle::Voided {
            motivo: motivo.to_string(),
            anulado_at: now,
        };
        self.updated_at = Some(now);
        Ok(())
    }

    /// Current value of a payload field in its canonical text form.
    pub fn field_value(&self, field: EditableField) -> Option<String> {
        match field {
            EditableField::FechaRegistro => Some(self.fecha_registro.to_string()),
            EditableField::FechaSolicitud => self.fecha_solicitud.map(|d| d.to_string()),
            EditableField::DireccionAdministrativa => Some(self.direccion_administrativa.clone()),
            EditableField::UnidadInstitucion => Some(self.unidad_institucion.clone()),
            EditableField::NombreSolicitante => Some(self.nombre_solicitante.clone()),
            EditableField::Cargo => Some(self.cargo.clone()),
            EditableField::Responsable => self.responsable.clone(),
            EditableField::MemorandoSolicitud => Some(self.memorando_solicitud.clone()),
        }
    }
}

// =============================================================================
// SEQUENCE COUNTER
// =============================================================================

/// A named durable counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    pub last_value: u64,
}

impl SequenceCounter {
    pub fn new(last_value: u64) -> Self {
        Self { last_value }
    }

    /// Next candidate value, or `None` when the counter is exhausted.
    pub fn candidate(&self) -> Option<u64> {
        self.last_value.checked_add(1)
    }

    pub fn to_bytes(self) -> [u8; 8] {
        self.last_value.to_be_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; 8] = bytes.try_into().ok()?;
        Some(Self::new(u64::from_be_bytes(raw)))
    }
}
