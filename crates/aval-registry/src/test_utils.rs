use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Duration, NaiveDate};

use crate::adapters::infra::DefaultChecksumProvider;
use crate::adapters::serializer::BincodeRecordSerializer;
use crate::adapters::storage::InMemoryKVStore;
use crate::domain::entities::{AvalPayload, Timestamp};
use crate::domain::value_objects::RegistryConfig;
use crate::ports::outbound::TimeSource;
use crate::service::{AvalRegistryService, RegistryDependencies};

/// Clock that starts at a fixed instant and advances one minute per reading.
pub struct SteppingClock {
    start: Timestamp,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        Self::new(base_time())
    }
}

impl TimeSource for SteppingClock {
    fn now(&self) -> Timestamp {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::minutes(tick)
    }
}

pub fn base_time() -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

pub type TestRegistry = AvalRegistryService<
    InMemoryKVStore,
    SteppingClock,
    DefaultChecksumProvider,
    BincodeRecordSerializer,
>;

pub fn make_test_service() -> TestRegistry {
    make_test_service_with(RegistryConfig::default())
}

pub fn make_test_service_with(config: RegistryConfig) -> TestRegistry {
    let deps = RegistryDependencies {
        kv_store: InMemoryKVStore::new(),
        time_source: SteppingClock::default(),
        checksum: DefaultChecksumProvider,
        serializer: BincodeRecordSerializer,
    };
    AvalRegistryService::provisioned(deps, config).unwrap()
}

pub fn sample_payload(solicitante: &str) -> AvalPayload {
    AvalPayload {
        fecha_registro: "05/03/2024".into(),
        fecha_solicitud: "2024-03-04".into(),
        direccion_administrativa: "Dirección de Tecnologías".into(),
        unidad_institucion: "Soporte Técnico".into(),
        nombre_solicitante: solicitante.into(),
        cargo: "Analista".into(),
        responsable: "Luis Gómez".into(),
        memorando_solicitud: "MEM-2024-015".into(),
    }
}
