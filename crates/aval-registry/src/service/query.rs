//! # Query Operations
//!
//! Read-only projection over the record store.

use super::*;
use crate::domain::query::{AvalFilters, AvalPage, Paging};

impl<KV, TS, CS, RS> AvalRegistryService<KV, TS, CS, RS>
where
    KV: KeyValueStore,
    TS: TimeSource,
    CS: ChecksumProvider,
    RS: RecordSerializer,
{
    /// Filter every record, newest first, then cut the requested page.
    ///
    /// Ids only grow, so id order is creation order and pages stay stable
    /// while new records are issued at the head.
    pub(crate) fn query(
        &self,
        filters: &AvalFilters,
        paging: Option<Paging>,
    ) -> Result<AvalPage, AvalError> {
        let mut items: Vec<_> = self
            .load_all_records()?
            .into_iter()
            .filter(|record| filters.matches(record))
            .collect();
        items.sort_by(|a, b| b.id.cmp(&a.id));

        let total = items.len();
        if let Some(paging) = paging {
            let paging = paging.clamped(self.config.max_page_size);
            items = items
                .into_iter()
                .skip(paging.offset)
                .take(paging.limit)
                .collect();
        }

        Ok(AvalPage { items, total })
    }
}
