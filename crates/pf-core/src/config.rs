//! Configuration parsing.
//!
//! Settings come from a single optional JSON file. Two environment-style
//! overrides (`EXTRA_FINAL_STATUSES`, `FLOW_TRUST_NONFINAL`) are read by the
//! caller and applied explicitly with [`AppConfig::apply_overrides`]; nothing
//! in this crate reads the process environment on its own.
//!
//! # Example config
//!
//! ```json
//! {
//!   "logging": { "level": "debug", "log_dir": "/tmp/log", "module_name": "flows" },
//!   "final_status": {
//!     "extra_statuses": { "binance.withdraw": [7], "*": ["done"] },
//!     "unknown_exchange": "generic"
//!   },
//!   "trust_nonfinal": false
//! }
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::PfError;
use crate::final_status::StatusScope;
use crate::types::{StatusValue, UnknownExchangePolicy};

/// Top-level application config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub final_status: FinalStatusConfig,

    /// Accept every deduped funding event regardless of status (debugging).
    #[serde(default)]
    pub trust_nonfinal: bool,
}

/// Logging block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: Option<String>,
    /// Directory for daily-rotating log files.
    pub log_dir: Option<String>,
    /// Log file prefix.
    pub module_name: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn module_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or("pf-runner")
    }
}

/// Inputs to [`StatusTable::new`](crate::final_status::StatusTable::new).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinalStatusConfig {
    /// Scope → list of additional final statuses. A scope is `*`,
    /// `<exchange>` or `<exchange>.<direction>`.
    ///
    /// Values stay raw JSON so a malformed entry is skipped with a warning
    /// when the table is built instead of failing the whole config.
    #[serde(default)]
    pub extra_statuses: HashMap<String, Value>,

    #[serde(default)]
    pub unknown_exchange: UnknownExchangePolicy,
}

impl FinalStatusConfig {
    /// Append `extra` to the configured extra statuses. A malformed value
    /// already configured for the same scope is replaced.
    pub fn merge_extra(&mut self, extra: HashMap<String, Vec<StatusValue>>) {
        for (scope, statuses) in extra {
            let added = statuses.into_iter().map(|status| match status {
                StatusValue::Int(code) => Value::from(code),
                StatusValue::Text(label) => Value::from(label),
            });
            match self.extra_statuses.entry(scope) {
                Entry::Occupied(mut slot) => {
                    let scope = slot.key().clone();
                    match slot.get_mut() {
                        Value::Array(items) => items.extend(added),
                        other => {
                            warn!("replacing malformed extra final statuses for '{scope}': {other}");
                            *other = Value::Array(added.collect());
                        }
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(Value::Array(added.collect()));
                }
            }
        }
    }
}

/// Statuses configured for one override scope.
///
/// Anything other than a list of integers and strings is logged and skipped.
pub(crate) fn status_list(scope: &str, value: &Value) -> Vec<StatusValue> {
    let Some(items) = value.as_array() else {
        warn!("ignoring extra final statuses for '{scope}': expected a list, got {value}");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(label) => Some(StatusValue::Text(label.clone())),
            Value::Number(n) if n.is_i64() => n.as_i64().map(StatusValue::Int),
            other => {
                warn!("ignoring extra final status {other} for '{scope}': not an integer or string");
                None
            }
        })
        .collect()
}

impl AppConfig {
    /// Apply the textual overrides on top of the file config.
    ///
    /// - `extra_statuses`: value of `EXTRA_FINAL_STATUSES`, see
    ///   [`parse_extra_statuses`].
    /// - `trust_nonfinal`: value of `FLOW_TRUST_NONFINAL`; `1`, `true`, `yes`
    ///   and `on` enable it.
    pub fn apply_overrides(&mut self, extra_statuses: Option<&str>, trust_nonfinal: Option<&str>) {
        if let Some(raw) = extra_statuses {
            self.final_status.merge_extra(parse_extra_statuses(raw));
        }
        if let Some(raw) = trust_nonfinal {
            self.trust_nonfinal = is_truthy(raw);
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Parse the textual extra-status override.
///
/// Format: `scope:status|status;scope:status`, e.g.
/// `binance.withdraw:7|8;okx:11;*:done`. An entry without a scope is a
/// comma-separated list for every exchange, so a plain `done,settled` keeps
/// working. Malformed entries are logged and skipped; the rest are kept.
pub fn parse_extra_statuses(raw: &str) -> HashMap<String, Vec<StatusValue>> {
    let mut out: HashMap<String, Vec<StatusValue>> = HashMap::new();

    for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        match parse_entry(entry) {
            Ok((scope, statuses)) => out.entry(scope).or_default().extend(statuses),
            Err(e) => warn!("ignoring extra final status entry '{entry}': {e}"),
        }
    }

    out
}

fn parse_entry(entry: &str) -> Result<(String, Vec<StatusValue>), PfError> {
    let (scope, list) = entry.split_once(':').unwrap_or(("*", entry));

    let scope = scope.trim().to_ascii_lowercase();
    StatusScope::parse(&scope)?;

    let statuses: Vec<StatusValue> = list
        .split(['|', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(StatusValue::from)
        .collect();
    if statuses.is_empty() {
        return Err(PfError::Parse(format!("no statuses listed for scope '{scope}'")));
    }

    Ok((scope, statuses))
}

/// Parse a JSON config string.
pub fn parse_config(content: &str) -> Result<AppConfig, PfError> {
    serde_json::from_str(content).map_err(|e| PfError::Config(e.to_string()))
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> Result<AppConfig, PfError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::logging::capture_logs;

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "logging": { "level": "debug", "module_name": "flows" },
            "final_status": {
                "extra_statuses": { "binance.withdraw": [7], "*": ["done"] },
                "unknown_exchange": "generic"
            },
            "trust_nonfinal": true
        }"#;
        let cfg = parse_config(json).unwrap();
        assert_eq!(cfg.logging.level(), "debug");
        assert_eq!(cfg.logging.module_name(), "flows");
        assert!(cfg.logging.log_dir.is_none());
        assert_eq!(cfg.final_status.unknown_exchange, UnknownExchangePolicy::Generic);
        assert_eq!(cfg.final_status.extra_statuses["binance.withdraw"], json!([7]));
        assert_eq!(cfg.final_status.extra_statuses["*"], json!(["done"]));
        assert!(cfg.trust_nonfinal);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = parse_config("{}").unwrap();
        assert_eq!(cfg.logging.level(), "info");
        assert_eq!(cfg.final_status, FinalStatusConfig::default());
        assert!(!cfg.trust_nonfinal);
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let err = parse_config(r#"{"trust_nonfinal": "maybe"}"#).unwrap_err();
        assert!(matches!(err, PfError::Config(_)));
    }

    #[test]
    fn parse_extra_statuses_entries() {
        let extra = parse_extra_statuses("binance.withdraw:7|8; OKX:11 ;*:done");
        assert_eq!(extra.len(), 3);
        assert_eq!(extra["binance.withdraw"], vec![StatusValue::from("7"), StatusValue::from("8")]);
        assert_eq!(extra["okx"], vec![StatusValue::from("11")]);
        assert_eq!(extra["*"], vec![StatusValue::from("done")]);
    }

    #[test]
    fn malformed_extra_entries_are_skipped() {
        let extra = parse_extra_statuses("kraken:1;bybit:;bybit.transfer:2;bybit:9");
        assert_eq!(extra.len(), 1);
        assert_eq!(extra["bybit"], vec![StatusValue::from("9")]);
        assert!(parse_extra_statuses("").is_empty());
    }

    #[test]
    fn overrides_merge_into_file_config() {
        let mut cfg = parse_config(r#"{"final_status": {"extra_statuses": {"okx": [11]}}}"#).unwrap();
        cfg.apply_overrides(Some("okx:12"), Some("YES"));
        assert_eq!(cfg.final_status.extra_statuses["okx"], json!([11, "12"]));
        assert!(cfg.trust_nonfinal);

        cfg.apply_overrides(None, Some("0"));
        assert!(!cfg.trust_nonfinal);
    }

    #[test]
    fn bare_comma_list_applies_to_every_exchange() {
        let extra = parse_extra_statuses("done,settled");
        assert_eq!(extra.len(), 1);
        assert_eq!(extra["*"], vec![StatusValue::from("done"), StatusValue::from("settled")]);

        let extra = parse_extra_statuses(" done , ;okx:11,12");
        assert_eq!(extra["*"], vec![StatusValue::from("done")]);
        assert_eq!(extra["okx"], vec![StatusValue::from("11"), StatusValue::from("12")]);
    }

    #[test]
    fn malformed_extra_entry_is_logged() {
        let logs = capture_logs(|| {
            parse_extra_statuses("kraken:1;okx:11");
        });
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("kraken:1"), "{logs}");
        assert!(!logs.contains("okx:11"), "{logs}");
    }

    #[test]
    fn malformed_override_in_config_file_does_not_fail_parsing() {
        let json = r#"{"final_status": {"extra_statuses": {"binance": "7", "okx": [11, 7.5, true, "x"]}}}"#;
        let cfg = parse_config(json).unwrap();
        assert_eq!(cfg.final_status.extra_statuses.len(), 2);

        let mut okx = Vec::new();
        let logs = capture_logs(|| {
            assert!(status_list("binance", &cfg.final_status.extra_statuses["binance"]).is_empty());
            okx = status_list("okx", &cfg.final_status.extra_statuses["okx"]);
        });
        assert_eq!(okx, vec![StatusValue::Int(11), StatusValue::from("x")]);
        assert!(logs.contains("expected a list"), "{logs}");
        assert!(logs.contains("7.5"), "{logs}");
        assert!(logs.contains("true"), "{logs}");
    }

    #[test]
    fn env_override_replaces_malformed_file_value() {
        let mut cfg = parse_config(r#"{"final_status": {"extra_statuses": {"binance": "7"}}}"#).unwrap();
        cfg.apply_overrides(Some("binance:8"), None);
        assert_eq!(cfg.final_status.extra_statuses["binance"], json!(["8"]));
    }
}
