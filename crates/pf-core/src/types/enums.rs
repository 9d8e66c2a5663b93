//! Enumerations shared by the status table and the funding pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Exchange identifiers
// ---------------------------------------------------------------------------

/// Exchanges with a predefined final-status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Bybit,
    Okx,
}

impl Exchange {
    pub const ALL: [Exchange; 3] = [Exchange::Binance, Exchange::Bybit, Exchange::Okx];

    /// Case-insensitive lookup by exchange name. Surrounding whitespace is
    /// ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "binance" => Some(Self::Binance),
            "bybit" => Some(Self::Bybit),
            "okx" => Some(Self::Okx),
            _ => None,
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binance => write!(f, "binance"),
            Self::Bybit => write!(f, "bybit"),
            Self::Okx => write!(f, "okx"),
        }
    }
}

// ---------------------------------------------------------------------------
// Funding flow direction
// ---------------------------------------------------------------------------

/// Direction of a funding flow (the "operation type" of a status lookup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Deposit,
    #[serde(alias = "withdrawal")]
    Withdraw,
}

impl FlowDirection {
    pub const ALL: [FlowDirection; 2] = [FlowDirection::Deposit, FlowDirection::Withdraw];

    /// Accepts `deposit`, `withdraw` and `withdrawal`, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "deposit" => Some(Self::Deposit),
            "withdraw" | "withdrawal" => Some(Self::Withdraw),
            _ => None,
        }
    }
}

impl std::fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

// ---------------------------------------------------------------------------
// Unknown exchange handling
// ---------------------------------------------------------------------------

/// What `is_final` does for an exchange or direction missing from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownExchangePolicy {
    /// Never final.
    #[default]
    Reject,
    /// Final only for the generic terminal labels (`ok`, `completed`, ...).
    Generic,
}
