//! Funding event deduplication.
//!
//! Deposit/withdrawal history is fetched page by page and often from more
//! than one endpoint, so the same record can show up several times. The
//! deduplicator keeps the *first* occurrence of each [`DedupKey`] and drops
//! later ones, preserving the relative order of first occurrences.
//!
//! With [`EventDeduplicator::prefer_final`] a later duplicate that has
//! reached a final status replaces a retained record that has not. The
//! replacement takes over the retained slot, so ordering is unchanged.

use ahash::AHashMap;
use tracing::debug;

use crate::final_status::StatusTable;
use crate::types::{DedupKey, FundingEvent};

/// Final-status preference applied to duplicates.
#[derive(Debug, Clone, Copy)]
struct FinalPreference<'a> {
    table: &'a StatusTable,
    exchange: &'a str,
}

/// Order-preserving deduplicator for [`FundingEvent`]s.
///
/// Stateless between calls: every `dedupe*` call starts from an empty seen
/// set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDeduplicator<'a> {
    preference: Option<FinalPreference<'a>>,
}

impl<'a> EventDeduplicator<'a> {
    pub fn new() -> Self {
        Self { preference: None }
    }

    /// Let a final duplicate replace a non-final retained record, using
    /// `table` to judge events from `exchange`.
    pub fn prefer_final(mut self, table: &'a StatusTable, exchange: &'a str) -> Self {
        self.preference = Some(FinalPreference { table, exchange });
        self
    }

    /// Deduplicate a flat sequence of events.
    pub fn dedupe(&self, events: impl IntoIterator<Item = FundingEvent>) -> Vec<FundingEvent> {
        let mut input = 0usize;
        let out = self.run(events.into_iter().inspect(|_| input += 1));
        debug!("deduplicated {} event(s) to {} ({} dropped)", input, out.len(), input - out.len());
        out
    }

    /// Deduplicate events collected across pages, concatenated in fetch order.
    pub fn dedupe_pages<P>(&self, pages: impl IntoIterator<Item = P>) -> Vec<FundingEvent>
    where
        P: IntoIterator<Item = FundingEvent>,
    {
        let mut page_count = 0usize;
        let mut input = 0usize;
        let events = pages
            .into_iter()
            .inspect(|_| page_count += 1)
            .flatten()
            .inspect(|_| input += 1);
        let out = self.run(events);
        debug!(
            "deduplicated {} page(s) containing {} event(s) to {} ({} dropped)",
            page_count,
            input,
            out.len(),
            input - out.len(),
        );
        out
    }

    fn run(&self, events: impl Iterator<Item = FundingEvent>) -> Vec<FundingEvent> {
        let mut seen: AHashMap<DedupKey, usize> = AHashMap::new();
        let mut unique: Vec<FundingEvent> = Vec::new();

        for event in events {
            let key = event.dedup_key();
            match seen.get(&key) {
                None => {
                    seen.insert(key, unique.len());
                    unique.push(event);
                }
                Some(&idx) => {
                    if let Some(pref) = self.preference {
                        let incoming = pref.table.is_event_final(pref.exchange, &event);
                        if incoming && !pref.table.is_event_final(pref.exchange, &unique[idx]) {
                            debug!("replacing non-final event {key:?} with final duplicate");
                            unique[idx] = event;
                        }
                    }
                }
            }
        }

        unique
    }
}

/// Deduplicate `events` keeping first occurrences.
pub fn dedupe(events: impl IntoIterator<Item = FundingEvent>) -> Vec<FundingEvent> {
    EventDeduplicator::new().dedupe(events)
}
