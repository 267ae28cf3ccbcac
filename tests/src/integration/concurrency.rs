//! # Concurrent Issuance
//!
//! Many request handlers sharing one registry must never see the same
//! correlativo twice, and the numbers handed out must be exactly `1..=N`.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::thread;

    use aval_registry::{AvalFilters, AvalRegistryApi, SequenceApi};

    use crate::{memory_registry, payload};

    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    #[test]
    fn test_concurrent_creates_are_gap_free_and_unique() {
        let shared = memory_registry().into_shared();

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let registry = shared.clone();
                thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| {
                            let p = payload(&format!("hilo-{t}-{i}"), "05/03/2024");
                            registry.write().create_aval(&p).unwrap()
                        })
                        .map(|r| r.correlativo().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut codes = BTreeSet::new();
        for handle in handles {
            for code in handle.join().unwrap() {
                assert!(codes.insert(code), "correlativo issued twice");
            }
        }

        let total = THREADS * PER_THREAD;
        let expected: BTreeSet<String> = (1..=total)
            .map(|n| format!("DTI|DSST|AVAL|{n:04}"))
            .collect();
        assert_eq!(codes, expected);

        let registry = shared.read();
        assert_eq!(registry.current_sequence("AVAL").unwrap(), total as u64);
        let page = registry.list_avales(&AvalFilters::new(), None).unwrap();
        assert_eq!(page.total, total);
    }

    #[test]
    fn test_readers_see_consistent_snapshots() {
        let shared = memory_registry().into_shared();

        let writer = {
            let registry = shared.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    registry
                        .write()
                        .create_aval(&payload(&format!("w{i}"), "05/03/2024"))
                        .unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        let guard = registry.read();
                        let page = guard.list_avales(&AvalFilters::new(), None).unwrap();
                        let counter = guard.current_sequence("AVAL").unwrap();
                        assert_eq!(page.total as u64, counter);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
