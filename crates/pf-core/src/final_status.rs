//! Final-status lookup for exchange deposits and withdrawals.
//!
//! A status is *final* when the exchange will not move the record to another
//! state. The predefined sets follow each exchange's public API docs and hold
//! both the numeric codes and the text labels an endpoint may return.
//!
//! [`StatusTable`] is built once from a [`FinalStatusConfig`] and then shared
//! by reference. Building is pure: the same config always yields an equal
//! table.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};

use crate::config::{FinalStatusConfig, status_list};
use crate::error::PfError;
use crate::types::{Exchange, FlowDirection, FundingEvent, StatusValue, UnknownExchangePolicy};

// ---------------------------------------------------------------------------
// Predefined sets
// ---------------------------------------------------------------------------

// Binance deposit: 0 pending, 1 success, 6 credited but cannot withdraw.
const BINANCE_DEPOSIT: &[&str] = &["1", "6", "success", "credited but cannot withdraw"];
// Binance withdraw: 0 email sent, 1 cancelled, 2 awaiting approval,
// 3 rejected, 4 processing, 5 failure, 6 completed.
const BINANCE_WITHDRAW: &[&str] = &[
    "1", "3", "5", "6", "cancelled", "canceled", "rejected", "failure", "completed",
];

// Bybit deposit: 0 pending, 1 to be confirmed, 2 confirming, 3 success, 4 failed.
const BYBIT_DEPOSIT: &[&str] = &["3", "4", "success", "failed"];
// Bybit withdraw: 0-4 pending stages, 5 completed, 6 cancelled, 7 rejected,
// 8 expired.
const BYBIT_WITHDRAW: &[&str] = &[
    "5", "6", "7", "8", "cancelled", "rejected", "failed", "expired", "completed",
];

// OKX deposit: 0 pending, 1 confirmation, 2 success, 8 credited, 9 failed.
const OKX_DEPOSIT: &[&str] = &["2", "8", "9", "success", "credited", "failed"];
// OKX withdraw: 0-5 pending, 6 completed, 7 cancelled, 8 awaiting
// confirmation (terminal on OKX's side), 9 failed, 10 rejected.
const OKX_WITHDRAW: &[&str] = &[
    "6", "7", "8", "9", "10", "completed", "cancelled", "failed", "rejected",
];

/// Labels treated as final for unknown exchanges under
/// [`UnknownExchangePolicy::Generic`].
const GENERIC_FINAL: &[&str] = &["ok", "completed", "complete", "success", "succeeded", "done"];

fn predefined(exchange: Exchange, direction: FlowDirection) -> &'static [&'static str] {
    match (exchange, direction) {
        (Exchange::Binance, FlowDirection::Deposit) => BINANCE_DEPOSIT,
        (Exchange::Binance, FlowDirection::Withdraw) => BINANCE_WITHDRAW,
        (Exchange::Bybit, FlowDirection::Deposit) => BYBIT_DEPOSIT,
        (Exchange::Bybit, FlowDirection::Withdraw) => BYBIT_WITHDRAW,
        (Exchange::Okx, FlowDirection::Deposit) => OKX_DEPOSIT,
        (Exchange::Okx, FlowDirection::Withdraw) => OKX_WITHDRAW,
    }
}

// ---------------------------------------------------------------------------
// Override scopes
// ---------------------------------------------------------------------------

/// Target of an extra-status override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
    /// `*`: every exchange, both directions.
    All,
    /// `<exchange>`: both directions.
    Exchange(Exchange),
    /// `<exchange>.<direction>`.
    Entry(Exchange, FlowDirection),
}

impl StatusScope {
    pub fn parse(scope: &str) -> Result<Self, PfError> {
        let scope = scope.trim();
        if scope == "*" {
            return Ok(Self::All);
        }

        let unknown = || PfError::Parse(format!("unknown status scope '{scope}'"));
        match scope.split_once('.') {
            Some((exchange, direction)) => {
                let exchange = Exchange::from_name(exchange).ok_or_else(unknown)?;
                let direction = FlowDirection::from_name(direction).ok_or_else(unknown)?;
                Ok(Self::Entry(exchange, direction))
            }
            None => Exchange::from_name(scope).map(Self::Exchange).ok_or_else(unknown),
        }
    }

    fn entries(self) -> Vec<(Exchange, FlowDirection)> {
        match self {
            Self::All => Exchange::ALL
                .into_iter()
                .flat_map(|ex| FlowDirection::ALL.into_iter().map(move |dir| (ex, dir)))
                .collect(),
            Self::Exchange(ex) => FlowDirection::ALL.into_iter().map(|dir| (ex, dir)).collect(),
            Self::Entry(ex, dir) => vec![(ex, dir)],
        }
    }
}

// ---------------------------------------------------------------------------
// StatusTable
// ---------------------------------------------------------------------------

/// Merged (exchange, direction) → final statuses table.
///
/// All statuses are stored in [`StatusValue::normalized`] form.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTable {
    sets: AHashMap<(Exchange, FlowDirection), AHashSet<String>>,
    /// `*` extras, also honoured for unknown exchanges under the generic policy.
    global_extra: AHashSet<String>,
    unknown_exchange: UnknownExchangePolicy,
}

impl StatusTable {
    /// Build the table from the predefined sets plus the configured extras.
    ///
    /// Unknown scopes and malformed status lists are logged and skipped.
    pub fn new(config: &FinalStatusConfig) -> Self {
        let mut sets = AHashMap::new();
        for ex in Exchange::ALL {
            for dir in FlowDirection::ALL {
                let set: AHashSet<String> = predefined(ex, dir).iter().map(|s| s.to_string()).collect();
                sets.insert((ex, dir), set);
            }
        }

        let mut table = Self {
            sets,
            global_extra: AHashSet::new(),
            unknown_exchange: config.unknown_exchange,
        };

        for (scope, statuses) in &config.extra_statuses {
            let parsed = match StatusScope::parse(scope) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("skipping extra final statuses: {e}");
                    continue;
                }
            };

            let normalized: Vec<String> =
                status_list(scope, statuses).iter().map(StatusValue::normalized).collect();
            if parsed == StatusScope::All {
                table.global_extra.extend(normalized.iter().cloned());
            }
            for key in parsed.entries() {
                if let Some(set) = table.sets.get_mut(&key) {
                    set.extend(normalized.iter().cloned());
                }
            }
            debug!("merged {} extra final status(es) for scope '{scope}'", normalized.len());
        }

        table
    }

    /// Whether `status` is final for `exchange` / `operation_type`.
    ///
    /// Names are case-insensitive; `withdrawal` is accepted for `withdraw`.
    /// An unknown exchange or operation type resolves through the configured
    /// [`UnknownExchangePolicy`] and never errors.
    pub fn is_final(&self, exchange: &str, operation_type: &str, status: impl Into<StatusValue>) -> bool {
        let status: StatusValue = status.into();

        match Exchange::from_name(exchange).zip(FlowDirection::from_name(operation_type)) {
            Some((exchange, direction)) => self.is_final_for(exchange, direction, &status),
            None => {
                debug!("no final status set for exchange='{exchange}' operation='{operation_type}'");
                self.unknown_is_final(&status.normalized())
            }
        }
    }

    /// Typed variant of [`is_final`](Self::is_final).
    pub fn is_final_for(&self, exchange: Exchange, direction: FlowDirection, status: &StatusValue) -> bool {
        self.sets
            .get(&(exchange, direction))
            .is_some_and(|set| set.contains(&status.normalized()))
    }

    /// Whether a funding event is final. Events without a type or status are
    /// not final.
    pub fn is_event_final(&self, exchange: &str, event: &FundingEvent) -> bool {
        match (event.kind.as_deref(), event.status.as_ref()) {
            (Some(kind), Some(status)) => self.is_final(exchange, kind, status),
            _ => false,
        }
    }

    fn unknown_is_final(&self, status: &str) -> bool {
        match self.unknown_exchange {
            UnknownExchangePolicy::Reject => false,
            UnknownExchangePolicy::Generic => {
                GENERIC_FINAL.contains(&status) || self.global_extra.contains(status)
            }
        }
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::new(&FinalStatusConfig::default())
    }
}
