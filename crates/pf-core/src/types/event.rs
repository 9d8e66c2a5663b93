//! Funding event records as collected from paginated exchange history calls.

use serde::{Deserialize, Serialize};

use super::enums::FlowDirection;

// ---------------------------------------------------------------------------
// Status values
// ---------------------------------------------------------------------------

/// A deposit/withdrawal status as reported by an exchange.
///
/// Some exchanges report numeric codes, others text labels. Comparison always
/// goes through [`StatusValue::normalized`], so `6` and `"6"` are the same
/// status and text matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Int(i64),
    Text(String),
}

impl StatusValue {
    /// Trimmed, lowercased string form.
    pub fn normalized(&self) -> String {
        match self {
            Self::Int(code) => code.to_string(),
            Self::Text(label) => label.trim().to_lowercase(),
        }
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(code) => write!(f, "{code}"),
            Self::Text(label) => write!(f, "{label}"),
        }
    }
}

impl From<i32> for StatusValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for StatusValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for StatusValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<&str> for StatusValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for StatusValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&StatusValue> for StatusValue {
    fn from(v: &StatusValue) -> Self {
        v.clone()
    }
}

// ---------------------------------------------------------------------------
// Record ids
// ---------------------------------------------------------------------------

/// An exchange record id. Some endpoints send ids as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// String form used as a dedup key; `None` for an empty string.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl From<i64> for RecordId {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for RecordId {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RecordId {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ---------------------------------------------------------------------------
// Funding event
// ---------------------------------------------------------------------------

/// One deposit or withdrawal record.
///
/// Every field is optional: exchanges and pagination endpoints disagree on
/// what they return, and the deduplicator builds its key from whatever is
/// present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FundingEvent {
    /// Exchange-assigned unique id. Checked before `id` and `exchange_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_id: Option<RecordId>,

    /// On-chain transaction id.
    #[serde(default, rename = "txId", alias = "txid", skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,

    /// Currency code (e.g. `"USDT"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Event time, ms since epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// `"deposit"`, `"withdraw"` or `"withdrawal"`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusValue>,
}

impl FundingEvent {
    /// First non-empty id among `uid`, `id` and `exchange_id`.
    pub fn unique_id(&self) -> Option<String> {
        [&self.uid, &self.id, &self.exchange_id]
            .into_iter()
            .flatten()
            .find_map(RecordId::as_key)
    }

    /// Flow direction parsed from `kind`.
    pub fn direction(&self) -> Option<FlowDirection> {
        self.kind.as_deref().and_then(FlowDirection::from_name)
    }

    /// Key used to detect duplicates across pages.
    ///
    /// Unique-id presence is the only discriminator: the composite key is
    /// used only when no id is available, and keeps whichever of its parts
    /// are present.
    pub fn dedup_key(&self) -> DedupKey {
        match self.unique_id() {
            Some(id) => DedupKey::UniqueId(id),
            None => DedupKey::Composite {
                tx_id: self.tx_id.clone(),
                currency: self.currency.clone(),
                timestamp: self.timestamp,
            },
        }
    }
}

/// Transient dedup key for a [`FundingEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    UniqueId(String),
    Composite {
        tx_id: Option<String>,
        currency: Option<String>,
        timestamp: Option<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_normalization() {
        assert_eq!(StatusValue::from(6).normalized(), "6");
        assert_eq!(StatusValue::from(" Completed ").normalized(), "completed");
        assert_eq!(StatusValue::from("6").normalized(), StatusValue::Int(6).normalized());
    }

    #[test]
    fn parse_event_with_field_aliases() {
        let json = r#"{
            "uid": "abc",
            "txid": "0xdead",
            "currency": "BTC",
            "timestamp": 1700000000000,
            "type": "withdrawal",
            "amount": 0.5,
            "status": 6
        }"#;
        let ev: FundingEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.unique_id().as_deref(), Some("abc"));
        assert_eq!(ev.tx_id.as_deref(), Some("0xdead"));
        assert_eq!(ev.direction(), Some(FlowDirection::Withdraw));
        assert_eq!(ev.status, Some(StatusValue::Int(6)));
    }

    #[test]
    fn text_status_parses_as_text() {
        let ev: FundingEvent = serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(ev.status, Some(StatusValue::Text("pending".into())));
    }

    #[test]
    fn empty_id_falls_back_to_composite_key() {
        let ev = FundingEvent {
            id: Some(String::new().into()),
            tx_id: Some("t2".into()),
            currency: Some("USD".into()),
            timestamp: Some(100),
            ..Default::default()
        };
        assert_eq!(
            ev.dedup_key(),
            DedupKey::Composite {
                tx_id: Some("t2".into()),
                currency: Some("USD".into()),
                timestamp: Some(100),
            }
        );
    }

    #[test]
    fn partial_composite_key() {
        let ev = FundingEvent { currency: Some("ETH".into()), ..Default::default() };
        assert_eq!(
            ev.dedup_key(),
            DedupKey::Composite { tx_id: None, currency: Some("ETH".into()), timestamp: None }
        );
    }

    #[test]
    fn numeric_id_is_accepted() {
        let ev: FundingEvent = serde_json::from_str(r#"{"id": 12345, "currency": "BTC"}"#).unwrap();
        assert_eq!(ev.id, Some(RecordId::Int(12345)));
        assert_eq!(ev.unique_id().as_deref(), Some("12345"));
        assert_eq!(ev.dedup_key(), DedupKey::UniqueId("12345".into()));
    }

    #[test]
    fn uid_wins_over_id_and_exchange_id() {
        let ev: FundingEvent =
            serde_json::from_str(r#"{"uid": "u1", "id": "i1", "exchange_id": "e1", "currency": "BTC"}"#).unwrap();
        assert_eq!(ev.unique_id().as_deref(), Some("u1"));

        let ev: FundingEvent = serde_json::from_str(r#"{"uid": "", "id": "i1", "exchange_id": "e1"}"#).unwrap();
        assert_eq!(ev.unique_id().as_deref(), Some("i1"));

        let ev: FundingEvent = serde_json::from_str(r#"{"exchange_id": 7}"#).unwrap();
        assert_eq!(ev.unique_id().as_deref(), Some("7"));
    }
}
