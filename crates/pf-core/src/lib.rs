//! # pf-core
//!
//! Helpers for tracking exchange deposits and withdrawals in a portfolio:
//!
//! - **Types** (`types`): exchanges, flow directions, status values, funding events
//! - **Final statuses** (`final_status`): per-exchange table of terminal statuses
//! - **Deduplication** (`dedup`): order-preserving dedup of paginated events
//! - **Funding filter** (`funding`): dedup + final-status filter for one exchange
//! - **Configuration** (`config`): JSON config and textual overrides
//! - **Error types** (`error`): `PfError` via thiserror
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod dedup;
pub mod error;
pub mod final_status;
pub mod funding;
pub mod logging;
pub mod types;

pub use dedup::{EventDeduplicator, dedupe};
pub use final_status::StatusTable;
pub use funding::FundingFilter;
// Re-export types at crate root for convenience.
pub use types::*;
