//! # Correlativos Aval Test Suite
//!
//! Unified test crate exercising the registry through its public API only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs     # Issue, edit, void through the request boundary
//!     ├── concurrency.rs   # Concurrent issuance on a shared registry
//!     ├── persistence.rs   # Data directory restart, locking, import
//!     └── properties.rs    # Filter, paging and formatter properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p aval-tests
//! cargo test -p aval-tests integration::concurrency
//! cargo bench -p aval-tests
//! ```

pub mod integration;

use aval_registry::{AvalPayload, InMemoryRegistry, RegistryConfig};

/// Complete payload for a requester, registered on `fecha`.
pub fn payload(solicitante: &str, fecha: &str) -> AvalPayload {
    AvalPayload {
        fecha_registro: fecha.to_string(),
        fecha_solicitud: fecha.to_string(),
        direccion_administrativa: "DSST".to_string(),
        unidad_institucion: "Soporte Técnico".to_string(),
        nombre_solicitante: solicitante.to_string(),
        cargo: "Analista".to_string(),
        responsable: "Luis Gómez".to_string(),
        memorando_solicitud: "MEM-2024-001".to_string(),
    }
}

/// Provisioned in-memory registry with the office defaults.
pub fn memory_registry() -> InMemoryRegistry {
    InMemoryRegistry::new_in_memory(RegistryConfig::default())
        .unwrap_or_else(|e| panic!("in-memory registry failed to open: {e}"))
}

/// Sheet as exported by the office, with a title line above the header.
pub const EXPORTED_SHEET: &str = "REGISTRO DE AVALES 2024\n\
Fecha\tCorrelativo\tSolicitante\tCargo\tUnidad\tDirección\tMemorando\tFecha de Solicitud\tResponsable\n\
04/03/2024\tDTI|DSST|AVAL|0040\tMarta Ruiz\tJefa\tRRHH\tDSST\tMEM-40\t01/03/2024\tLuis\n\
05/03/2024\tDTI|DSST|AVAL|0041\tAna Pérez\tAnalista\tTI\tDSST\tMEM-41\t04/03/2024\tLuis\n\
06/03/2024\tDTI|DSST|AVAL|0042\tJosé Díaz\tTécnico\tTI\tDSST\tMEM-42\t05/03/2024\tMarta\n\
\tDTI|DSST|AVAL|0043\t\t\t\t\t\t\t\n";
