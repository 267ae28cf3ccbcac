//! # API Handler Types
//!
//! Request and response shapes of the registry boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::entities::{AvalId, AvalPayload, AvalRecord, Estado, Timestamp};
use crate::domain::query::RawFilters;

/// Rendering of timestamps on the wire.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One call into the registry, as decoded by the form/API layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ApiRequest {
    Health,
    CreateAval {
        payload: AvalPayload,
    },
    ListAvales {
        #[serde(default)]
        filters: RawFilters,
        #[serde(default)]
        limit: Option<usize>,
        #[serde(default)]
        offset: Option<usize>,
    },
    GetAval {
        id: AvalId,
    },
    EditAval {
        id: AvalId,
        fields: Map<String, Value>,
    },
    VoidAval {
        id: AvalId,
        #[serde(default)]
        motivo: String,
    },
}

/// HTTP-like status plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Flat record shape returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvalView {
    pub id: AvalId,
    pub correlativo: String,
    pub fecha_registro: String,
    pub fecha_solicitud: Option<String>,
    pub direccion_administrativa: String,
    pub unidad_institucion: String,
    pub nombre_solicitante: String,
    pub cargo: String,
    pub responsable: Option<String>,
    pub memorando_solicitud: String,
    pub estado: Estado,
    pub motivo_anulacion: Option<String>,
    pub anulado_at: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

fn render(ts: Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

impl From<&AvalRecord> for AvalView {
    fn from(record: &AvalRecord) -> Self {
        Self {
            id: record.id,
            correlativo: record.correlativo().to_string(),
            fecha_registro: record.fecha_registro.to_string(),
            fecha_solicitud: record.fecha_solicitud.map(|d| d.to_string()),
            direccion_administrativa: record.direccion_administrativa.clone(),
            unidad_institucion: record.unidad_institucion.clone(),
            nombre_solicitante: record.nombre_solicitante.clone(),
            cargo: record.cargo.clone(),
            responsable: record.responsable.clone(),
            memorando_solicitud: record.memorando_solicitud.clone(),
            estado: record.estado(),
            motivo_anulacion: record.motivo_anulacion().map(str::to_string),
            anulado_at: record.anulado_at().map(render),
            created_at: render(record.created_at),
            updated_at: record.updated_at.map(render),
        }
    }
}
