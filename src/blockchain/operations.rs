//! Operation contents as the node expects them in forge/preapply bodies.
//!
//! Numeric fields travel as decimal strings.

use serde::{Deserialize, Serialize};

/// Operation kinds this crate builds and understands in node responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ActivateAccount,
    Transaction,
    Reveal,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::ActivateAccount,
        OperationKind::Transaction,
        OperationKind::Reveal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ActivateAccount => "activate_account",
            OperationKind::Transaction => "transaction",
            OperationKind::Reveal => "reveal",
        }
    }

    /// Maps a wire `kind` tag; `None` for kinds outside this set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a batch's `contents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingOperation {
    Reveal(RevealOperation),
    Transaction(TransactionOperation),
    ActivateAccount(ActivateAccountOperation),
}

impl PendingOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            PendingOperation::Reveal(_) => OperationKind::Reveal,
            PendingOperation::Transaction(_) => OperationKind::Transaction,
            PendingOperation::ActivateAccount(_) => OperationKind::ActivateAccount,
        }
    }

    /// Manager counter; activations have none.
    pub fn counter(&self) -> Option<u64> {
        match self {
            PendingOperation::Reveal(op) => Some(op.counter),
            PendingOperation::Transaction(op) => Some(op.counter),
            PendingOperation::ActivateAccount(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealOperation {
    pub source: String,
    #[serde(with = "decimal_string")]
    pub fee: u64,
    #[serde(with = "decimal_string")]
    pub counter: u64,
    #[serde(with = "decimal_string")]
    pub gas_limit: u64,
    #[serde(with = "decimal_string")]
    pub storage_limit: u64,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOperation {
    pub source: String,
    #[serde(with = "decimal_string")]
    pub fee: u64,
    #[serde(with = "decimal_string")]
    pub counter: u64,
    #[serde(with = "decimal_string")]
    pub gas_limit: u64,
    #[serde(with = "decimal_string")]
    pub storage_limit: u64,
    /// Mutez.
    #[serde(with = "decimal_string")]
    pub amount: u64,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateAccountOperation {
    pub pkh: String,
    pub secret: String,
}

mod decimal_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(u64),
        }
        match Wire::deserialize(deserializer)? {
            Wire::Text(s) => s.parse().map_err(de::Error::custom),
            Wire::Number(n) => Ok(n),
        }
    }
}
