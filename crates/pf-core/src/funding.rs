//! Final funding events for one exchange.
//!
//! Combines the pages returned by the generic and the exchange-specific
//! history endpoints, deduplicates them (final duplicates win), keeps only
//! events in a final state and sorts the result by timestamp.

use tracing::{debug, info};

use crate::dedup::EventDeduplicator;
use crate::final_status::StatusTable;
use crate::types::FundingEvent;

/// Filters deduplicated funding events down to final ones.
#[derive(Debug, Clone, Copy)]
pub struct FundingFilter<'a> {
    table: &'a StatusTable,
    trust_nonfinal: bool,
}

impl<'a> FundingFilter<'a> {
    pub fn new(table: &'a StatusTable) -> Self {
        Self { table, trust_nonfinal: false }
    }

    /// Keep every event regardless of status.
    pub fn trust_nonfinal(mut self, trust: bool) -> Self {
        self.trust_nonfinal = trust;
        self
    }

    /// Deduplicate `pages` and return the final events, oldest first.
    ///
    /// Events without a timestamp sort as `0`; ties keep dedup order.
    pub fn collect_final<P>(&self, exchange: &str, pages: impl IntoIterator<Item = P>) -> Vec<FundingEvent>
    where
        P: IntoIterator<Item = FundingEvent>,
    {
        let combined = EventDeduplicator::new()
            .prefer_final(self.table, exchange)
            .dedupe_pages(pages);
        let total = combined.len();

        let mut out: Vec<FundingEvent> = combined
            .into_iter()
            .filter(|ev| {
                let keep = self.trust_nonfinal || self.table.is_event_final(exchange, ev);
                if !keep {
                    debug!(
                        "{exchange}: skipping non-final {} id={:?} status={:?}",
                        ev.kind.as_deref().unwrap_or("event"),
                        ev.unique_id(),
                        ev.status,
                    );
                }
                keep
            })
            .collect();
        out.sort_by_key(|ev| ev.timestamp.unwrap_or(0));

        info!("{exchange}: {} final funding event(s) out of {} deduplicated", out.len(), total);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatusValue;

    fn event(id: &str, kind: &str, ts: i64, status: StatusValue) -> FundingEvent {
        FundingEvent {
            id: Some(id.into()),
            kind: Some(kind.into()),
            timestamp: Some(ts),
            currency: Some("BTC".into()),
            amount: Some(1.0),
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn pending_generic_event_replaced_by_final_raw_event() {
        let table = StatusTable::default();
        let generic = vec![event("1", "deposit", 1000, "pending".into())];
        let raw = vec![event("1", "deposit", 1000, "success".into())];

        let out = FundingFilter::new(&table).collect_final("binance", [generic, raw]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, Some(StatusValue::from("success")));
    }

    #[test]
    fn non_final_events_are_skipped() {
        let table = StatusTable::default();
        let pages = vec![vec![
            event("1", "withdrawal", 2000, StatusValue::Int(4)),
            event("2", "withdrawal", 1000, StatusValue::Int(6)),
        ]];
        let out = FundingFilter::new(&table).collect_final("binance", pages);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].unique_id().as_deref(), Some("2"));
    }

    #[test]
    fn trust_nonfinal_keeps_everything_sorted() {
        let table = StatusTable::default();
        let pages = vec![vec![
            event("1", "deposit", 3000, StatusValue::Int(0)),
            event("2", "deposit", 1000, StatusValue::Int(1)),
            FundingEvent { id: Some("3".into()), ..Default::default() },
        ]];
        let out = FundingFilter::new(&table).trust_nonfinal(true).collect_final("okx", pages);
        let ids: Vec<_> = out.iter().map(|e| e.unique_id().unwrap()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn unknown_exchange_yields_nothing() {
        let table = StatusTable::default();
        let pages = vec![vec![event("1", "deposit", 1, "success".into())]];
        assert!(FundingFilter::new(&table).collect_final("kraken", pages).is_empty());
    }
}
