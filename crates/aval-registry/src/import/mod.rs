//! # Import Parser
//!
//! Turns a delimited-text export of the office spreadsheet into an
//! [`ImportBatch`] ready for reconciliation.
//!
//! Parsing is fail-fast: a partially filled row, an unparseable date or a
//! repeated correlativo rejects the whole file, so nothing is ever applied
//! from a half-understood export.

use std::collections::HashSet;

use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::correlativo::parse_sequence;
use crate::domain::entities::{AvalFields, AvalPayload};
use crate::domain::errors::AvalError;

/// Errors raised while reading an import file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Could not find a header line containing \"Correlativo\" and \"Solicitante\"")]
    NoHeader,

    #[error("Missing required columns in header: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<&'static str> },

    #[error("Input must contain at least one data row after the header")]
    NoDataRows,

    #[error("File line {line} is missing required fields: {}", .fields.join(", "))]
    IncompleteRow { line: usize, fields: Vec<String> },

    #[error("File line {line} has invalid dates: {}", .fields.join(", "))]
    InvalidDate { line: usize, fields: Vec<String> },

    #[error("File line {line} repeats correlativo {correlativo}")]
    DuplicateCorrelativo { line: usize, correlativo: String },
}

/// One parsed data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub correlativo: String,
    pub fields: AvalFields,
}

/// Parsed contents of an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    pub rows: Vec<ImportRow>,
    /// Placeholder rows that carried no payload data.
    pub skipped: usize,
    /// Highest sequence embedded in an imported correlativo, 0 if none.
    pub max_sequence: u64,
}

/// Logical import columns, in the order missing ones are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    FechaRegistro,
    Correlativo,
    Solicitante,
    Cargo,
    Unidad,
    Direccion,
    Memorando,
    FechaSolicitud,
    Responsable,
}

const COLUMNS: [(Column, &str, &[&str]); 9] = [
    (
        Column::FechaRegistro,
        "fecha_registro",
        &["fecha", "fecha de registro", "fecha registro"],
    ),
    (
        Column::Correlativo,
        "correlativo",
        &["correlativo aval", "correlativo"],
    ),
    (
        Column::Solicitante,
        "nombre_solicitante",
        &["solicitante", "nombre del solicitante", "nombre solicitante"],
    ),
    (Column::Cargo, "cargo", &["cargo"]),
    (
        Column::Unidad,
        "unidad_institucion",
        &[
            "unidad administrativa",
            "unidad",
            "unidad institucion",
            "unidad de la institucion",
        ],
    ),
    (
        Column::Direccion,
        "direccion_administrativa",
        &[
            "direccion",
            "direccion administrativa",
            "direccion_administrativa",
        ],
    ),
    (
        Column::Memorando,
        "memorando_solicitud",
        &["memorando de solicitud", "memorando", "memorando_solicitud"],
    ),
    (
        Column::FechaSolicitud,
        "fecha_solicitud",
        &["fecha de solicitud", "fecha solicitud"],
    ),
    (Column::Responsable, "responsable", &["responsable"]),
];

/// Decode raw file bytes, falling back to Latin-1 when they are not UTF-8.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Lowercase, strip accents and collapse whitespace.
pub fn normalize_header(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && *c != '\u{fffd}')
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn detect_delimiter(header: &str) -> char {
    if header.contains('\t') {
        '\t'
    } else if header.contains(';') {
        ';'
    } else {
        ','
    }
}

/// Split one line. Tab-separated lines are split verbatim; `;` and `,`
/// lines honour double quotes with `""` as an escaped quote.
fn split_line(line: &str, delim: char) -> Vec<String> {
    if delim == '\t' {
        return line.split('\t').map(str::to_string).collect();
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delim && !in_quotes => out.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    out.push(current);
    out
}

fn is_separator_only(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || matches!(c, ';' | ',' | '\t'))
}

/// Parse an export into an [`ImportBatch`].
///
/// ## Errors
///
/// See [`ImportError`]; the first problem found aborts the parse.
pub fn parse_import(text: &str) -> Result<ImportBatch, ImportError> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    let header_index = lines
        .iter()
        .position(|l| {
            let n = normalize_header(l);
            n.contains("correlativo") && n.contains("solicitante")
        })
        .ok_or(ImportError::NoHeader)?;

    let delim = detect_delimiter(lines[header_index]);
    let headers: Vec<String> = split_line(lines[header_index], delim)
        .iter()
        .map(|h| normalize_header(h))
        .collect();

    let mut indices = [0usize; 9];
    let mut missing = Vec::new();
    for (slot, (_, name, synonyms)) in indices.iter_mut().zip(COLUMNS.iter()) {
        match synonyms
            .iter()
            .find_map(|s| headers.iter().position(|h| h == s))
        {
            Some(idx) => *slot = idx,
            None => missing.push(*name),
        }
    }
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns { columns: missing });
    }

    // (file line number, content); file lines are 1-based
    let data: Vec<(usize, &str)> = lines
        .iter()
        .enumerate()
        .skip(header_index + 1)
        .filter(|(_, l)| !is_separator_only(l))
        .map(|(i, l)| (i + 1, *l))
        .collect();
    if data.is_empty() {
        return Err(ImportError::NoDataRows);
    }

    let mut batch = ImportBatch::default();
    let mut seen = HashSet::new();

    for (line_no, line) in data {
        let parts = split_line(line, delim);
        let cell = |column: Column| -> String {
            COLUMNS
                .iter()
                .position(|(c, _, _)| *c == column)
                .and_then(|i| parts.get(indices[i]))
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let correlativo = cell(Column::Correlativo);
        let payload = AvalPayload {
            fecha_registro: cell(Column::FechaRegistro),
            fecha_solicitud: cell(Column::FechaSolicitud),
            direccion_administrativa: cell(Column::Direccion),
            unidad_institucion: cell(Column::Unidad),
            nombre_solicitante: cell(Column::Solicitante),
            cargo: cell(Column::Cargo),
            responsable: cell(Column::Responsable),
            memorando_solicitud: cell(Column::Memorando),
        };

        let empty: Vec<String> = COLUMNS
            .iter()
            .filter(|(c, _, _)| cell(*c).is_empty())
            .map(|(_, name, _)| name.to_string())
            .collect();

        let payload_columns = COLUMNS.len() - 1;
        let payload_empty = empty.iter().filter(|n| *n != "correlativo").count();
        if payload_empty == payload_columns {
            batch.skipped += 1;
            continue;
        }
        if !empty.is_empty() {
            return Err(ImportError::IncompleteRow {
                line: line_no,
                fields: empty,
            });
        }

        let fields = payload.validate().map_err(|e| match e {
            AvalError::ValidationError { fields, .. } => ImportError::InvalidDate {
                line: line_no,
                fields,
            },
            other => ImportError::InvalidDate {
                line: line_no,
                fields: vec![other.to_string()],
            },
        })?;

        if !seen.insert(correlativo.clone()) {
            return Err(ImportError::DuplicateCorrelativo {
                line: line_no,
                correlativo,
            });
        }

        if let Some(seq) = parse_sequence(&correlativo) {
            batch.max_sequence = batch.max_sequence.max(seq);
        }
        batch.rows.push(ImportRow {
            correlativo,
            fields,
        });
    }

    tracing::debug!(
        rows = batch.rows.len(),
        skipped = batch.skipped,
        max_sequence = batch.max_sequence,
        "Parsed import file"
    );

    Ok(batch)
}
