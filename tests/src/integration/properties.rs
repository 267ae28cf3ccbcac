//! # Query and Formatter Properties
//!
//! Filters are independent: combining two filters gives exactly the
//! intersection of applying each alone. Paging slices the same ordered list
//! the unpaged query returns.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use aval_registry::{
        parse_sequence, AvalFilters, AvalId, AvalRegistryApi, CorrelativoFormat, Estado,
        InMemoryRegistry, Paging,
    };
    use proptest::prelude::*;

    use crate::{memory_registry, payload};

    const NAMES: [&str; 4] = ["Ana Pérez", "Luis Gómez", "ana maría", "Marta"];
    const DATES: [&str; 3] = ["05/03/2024", "2024-03-06", "07/03/2024"];

    /// (name index, date index, voided)
    fn seed_strategy() -> impl Strategy<Value = Vec<(usize, usize, bool)>> {
        prop::collection::vec((0..NAMES.len(), 0..DATES.len(), any::<bool>()), 0..30)
    }

    fn filter_strategy() -> impl Strategy<Value = AvalFilters> {
        (
            prop::option::of(prop::sample::select(vec!["0001", "AVAL|00", "1", "9"])),
            prop::option::of(prop::sample::select(vec!["ana", "GÓMEZ", "ar", "zz"])),
            prop::option::of(prop::sample::select(vec![
                "2024-03-05",
                "2024-03-06",
                "2024-03-08",
            ])),
            prop::option::of(prop::sample::select(vec![Estado::Active, Estado::Voided])),
        )
            .prop_map(|(correlativo, solicitante, fecha, estado)| AvalFilters {
                correlativo: correlativo.map(str::to_string),
                solicitante: solicitante.map(str::to_string),
                fecha_registro: fecha.map(str::to_string),
                estado,
            })
    }

    fn seeded(seed: &[(usize, usize, bool)]) -> InMemoryRegistry {
        let mut registry = memory_registry();
        for (name, date, voided) in seed {
            let record = registry
                .create_aval(&payload(NAMES[*name], DATES[*date]))
                .unwrap();
            if *voided {
                registry.void_aval(record.id, "anulado en prueba").unwrap();
            }
        }
        registry
    }

    fn ids(registry: &InMemoryRegistry, filters: &AvalFilters) -> BTreeSet<AvalId> {
        registry
            .list_avales(filters, None)
            .unwrap()
            .items
            .iter()
            .map(|r| r.id)
            .collect()
    }

    /// Merge two filters that set disjoint criteria.
    fn both(a: &AvalFilters, b: &AvalFilters) -> AvalFilters {
        AvalFilters {
            correlativo: a.correlativo.clone().or_else(|| b.correlativo.clone()),
            solicitante: a.solicitante.clone().or_else(|| b.solicitante.clone()),
            fecha_registro: a.fecha_registro.clone().or_else(|| b.fecha_registro.clone()),
            estado: a.estado.or(b.estado),
        }
    }

    fn only_correlativo_and_estado(f: &AvalFilters) -> AvalFilters {
        AvalFilters {
            correlativo: f.correlativo.clone(),
            estado: f.estado,
            ..AvalFilters::default()
        }
    }

    fn only_solicitante_and_fecha(f: &AvalFilters) -> AvalFilters {
        AvalFilters {
            solicitante: f.solicitante.clone(),
            fecha_registro: f.fecha_registro.clone(),
            ..AvalFilters::default()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_filters_combine_as_intersection(
            seed in seed_strategy(),
            filters in filter_strategy(),
        ) {
            let registry = seeded(&seed);

            let left = only_correlativo_and_estado(&filters);
            let right = only_solicitante_and_fecha(&filters);
            let combined = ids(&registry, &both(&left, &right));

            let expected: BTreeSet<AvalId> =
                ids(&registry, &left).intersection(&ids(&registry, &right)).copied().collect();
            prop_assert_eq!(combined, expected);
        }

        #[test]
        fn prop_pages_tile_the_unpaged_list(
            seed in seed_strategy(),
            filters in filter_strategy(),
            limit in 1usize..7,
        ) {
            let registry = seeded(&seed);
            let all = registry.list_avales(&filters, None).unwrap();

            let mut collected = Vec::new();
            let mut offset = 0;
            loop {
                let page = registry
                    .list_avales(&filters, Some(Paging::new(limit, offset)))
                    .unwrap();
                prop_assert_eq!(page.total, all.total);
                if page.items.is_empty() {
                    break;
                }
                prop_assert!(page.items.len() <= limit);
                collected.extend(page.items);
                offset += limit;
            }
            prop_assert_eq!(collected, all.items.clone());

            let ordered: Vec<AvalId> = all.items.iter().map(|r| r.id).collect();
            prop_assert!(ordered.windows(2).all(|w| w[0] > w[1]));
        }

        #[test]
        fn prop_every_result_matches_its_filters(
            seed in seed_strategy(),
            filters in filter_strategy(),
        ) {
            let registry = seeded(&seed);
            for record in registry.list_avales(&filters, None).unwrap().items {
                prop_assert!(filters.matches(&record));
            }
        }

        #[test]
        fn prop_formatter_round_trip(n in 1u64..=99_999) {
            let code = CorrelativoFormat::default().format(n).unwrap();
            prop_assert_eq!(parse_sequence(&code), Some(n));
            prop_assert!(code.len() >= "DTI|DSST|AVAL|0001".len());
        }
    }
}
