//! # Data Directory Persistence
//!
//! Counter and records must survive a restart, the directory lock must keep
//! a second process out, and a reconciliation must be durable as one unit.

#[cfg(test)]
mod tests {
    use aval_registry::{
        decode_text, parse_import, AvalError, AvalFilters, AvalRegistryApi, DataDirRegistry,
        OpenError, ReconciliationApi, RegistryConfig, SequenceApi,
    };

    use crate::{payload, EXPORTED_SHEET};

    fn open(dir: &std::path::Path) -> DataDirRegistry {
        DataDirRegistry::open(dir, RegistryConfig::default()).unwrap()
    }

    #[test]
    fn test_counter_and_records_survive_restart() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut registry = open(dir.path());
            for name in ["Ana", "Luis", "Marta"] {
                registry.create_aval(&payload(name, "05/03/2024")).unwrap();
            }
            registry.void_aval(2, "Memorando equivocado").unwrap();
        }

        let mut registry = open(dir.path());
        assert_eq!(registry.current_sequence("AVAL").unwrap(), 3);
        assert!(registry.get_aval(2).unwrap().is_voided());

        let next = registry.create_aval(&payload("José", "06/03/2024")).unwrap();
        assert_eq!(next.id, 4);
        assert_eq!(next.correlativo(), "DTI|DSST|AVAL|0004");
    }

    #[test]
    fn test_second_open_is_locked_out() {
        let dir = tempfile::tempdir().unwrap();
        let _held = open(dir.path());

        match DataDirRegistry::open(dir.path(), RegistryConfig::default()) {
            Err(OpenError::Lock(_)) => {}
            Err(other) => panic!("expected lock error, got {other}"),
            Ok(_) => panic!("second open must fail while the lock is held"),
        }
    }

    #[test]
    fn test_corrupted_store_refuses_to_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut registry = open(dir.path());
            registry.create_aval(&payload("Ana", "05/03/2024")).unwrap();
        }

        let path = dir.path().join(aval_registry::service::STORE_FILE);
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x5A;
        std::fs::write(&path, bytes).unwrap();

        match DataDirRegistry::open(dir.path(), RegistryConfig::default()) {
            Err(OpenError::Registry(AvalError::DatabaseError { .. })) => {}
            Err(other) => panic!("expected storage error, got {other}"),
            Ok(_) => panic!("corrupted store must not open"),
        }
    }

    #[test]
    fn test_import_replaces_history_durably() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut registry = open(dir.path());
            for name in ["Ana", "Luis"] {
                registry.create_aval(&payload(name, "01/02/2024")).unwrap();
            }

            let batch = parse_import(&decode_text(EXPORTED_SHEET.as_bytes())).unwrap();
            let report = registry.reconcile(batch).unwrap();
            assert_eq!(report.imported, 3);
            assert_eq!(report.skipped, 1);
            assert_eq!(report.sequence_value, 42);
        }

        let mut registry = open(dir.path());
        let page = registry.list_avales(&AvalFilters::new(), None).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|r| r.updated_at.is_none()));
        assert_eq!(page.items[0].correlativo(), "DTI|DSST|AVAL|0042");

        let next = registry.create_aval(&payload("Nueva", "07/03/2024")).unwrap();
        assert_eq!(next.correlativo(), "DTI|DSST|AVAL|0043");
        assert_eq!(next.id, 4);
    }

    #[test]
    fn test_custom_namespace_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegistryConfig::default()
            .with_prefix("DTI|DSST|AVAL|2025")
            .with_sequence_name("AVAL_2025");

        let mut registry = DataDirRegistry::open(dir.path(), config).unwrap();
        let record = registry.create_aval(&payload("Ana", "05/03/2025")).unwrap();

        assert_eq!(record.correlativo(), "DTI|DSST|AVAL|2025|0001");
        assert_eq!(registry.current_sequence("AVAL_2025").unwrap(), 1);
        assert!(matches!(
            registry.current_sequence("AVAL"),
            Err(AvalError::UnknownSequence { .. })
        ));
    }
}
