//! # Query Model
//!
//! Filters and paging for the historical log. Filters are independent
//! predicates combined with AND; none of them changes how another matches.

use serde::{Deserialize, Serialize};

use super::dates::normalize_date;
use super::entities::{AvalRecord, Estado};

/// Optional filters over the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvalFilters {
    /// Case-insensitive substring of the correlativo.
    pub correlativo: Option<String>,
    /// Case-insensitive substring of the requester name.
    pub solicitante: Option<String>,
    /// Exact registration date, canonical `YYYY-MM-DD`.
    pub fecha_registro: Option<String>,
    /// Exact lifecycle state.
    pub estado: Option<Estado>,
}

/// Raw filter values as they arrive from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFilters {
    pub correlativo: Option<String>,
    pub solicitante: Option<String>,
    pub fecha: Option<String>,
    pub estado: Option<String>,
}

impl From<&RawFilters> for AvalFilters {
    fn from(raw: &RawFilters) -> Self {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        AvalFilters {
            correlativo: clean(&raw.correlativo),
            solicitante: clean(&raw.solicitante),
            fecha_registro: clean(&raw.fecha).map(|f| normalize_date(&f).unwrap_or(f)),
            estado: clean(&raw.estado).and_then(|e| Estado::from_filter(&e)),
        }
    }
}

impl AvalFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn correlativo(mut self, needle: impl Into<String>) -> Self {
        self.correlativo = Some(needle.into());
        self
    }

    pub fn solicitante(mut self, needle: impl Into<String>) -> Self {
        self.solicitante = Some(needle.into());
        self
    }

    pub fn fecha_registro(mut self, date: impl Into<String>) -> Self {
        self.fecha_registro = Some(date.into());
        self
    }

    pub fn estado(mut self, estado: Estado) -> Self {
        self.estado = Some(estado);
        self
    }

    /// Whether `record` satisfies every active filter.
    pub fn matches(&self, record: &AvalRecord) -> bool {
        contains_ci(record.correlativo(), self.correlativo.as_deref())
            && contains_ci(&record.nombre_solicitante, self.solicitante.as_deref())
            && self
                .fecha_registro
                .as_deref()
                .map_or(true, |d| record.fecha_registro.to_string() == d)
            && self.estado.map_or(true, |e| record.estado() == e)
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    }
}

/// Page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub limit: usize,
    pub offset: usize,
}

impl Paging {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Clamp `limit` into `[1, max]`.
    pub fn clamped(self, max: usize) -> Self {
        Self {
            limit: self.limit.clamp(1, max.max(1)),
            offset: self.offset,
        }
    }
}

/// Result of a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvalPage {
    /// Matching records, most recent first.
    pub items: Vec<AvalRecord>,
    /// Number of matches before paging.
    pub total: usize,
}
