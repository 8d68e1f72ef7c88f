//! Typed per-operation results parsed from preapply responses.
//!
//! Each entry of the applied group's `contents` is routed by its `kind`
//! through [`ResultHandlers`]. Kinds without a registered handler are left
//! out of the results rather than failing the batch.

use serde_json::Value;

use crate::blockchain::operations::OperationKind;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Error strings longer than this are blanked on failed operations.
pub const MAX_ERROR_FIELD_CHARS: usize = 1000;

const APPLIED: &str = "applied";

/// Kind-specific result fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultDetails {
    ActivateAccount {
        /// Balance credited to the activated account, in mutez.
        change: Option<String>,
    },
    Transaction {
        consumed_gas: Option<String>,
    },
    Reveal {
        consumed_gas: Option<String>,
    },
}

/// Outcome of one operation in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    /// The node's JSON for this operation.
    pub data: Value,
    pub status: String,
    pub succeeded: bool,
    /// Set on the last result of an injected batch only.
    pub operation_hash: Option<String>,
    pub details: ResultDetails,
}

impl OperationResult {
    pub fn kind(&self) -> OperationKind {
        match self.details {
            ResultDetails::ActivateAccount { .. } => OperationKind::ActivateAccount,
            ResultDetails::Transaction { .. } => OperationKind::Transaction,
            ResultDetails::Reveal { .. } => OperationKind::Reveal,
        }
    }

    pub fn consumed_gas(&self) -> Option<&str> {
        match &self.details {
            ResultDetails::Transaction { consumed_gas } | ResultDetails::Reveal { consumed_gas } => {
                consumed_gas.as_deref()
            }
            ResultDetails::ActivateAccount { .. } => None,
        }
    }

    /// Records the injected operation hash, also mirrored into `data.op_hash`.
    pub fn attach_operation_hash(&mut self, hash: &str) {
        if let Value::Object(map) = &mut self.data {
            map.insert("op_hash".to_string(), Value::String(hash.to_string()));
        }
        self.operation_hash = Some(hash.to_string());
    }

    /// Blanks oversized strings in `metadata.operation_result.errors` of a
    /// failed operation. Returns how many fields were blanked.
    pub fn sanitize(&mut self) -> usize {
        if self.succeeded {
            return 0;
        }
        let Some(errors) = self
            .data
            .pointer_mut("/metadata/operation_result/errors")
            .and_then(Value::as_array_mut)
        else {
            return 0;
        };
        errors.iter_mut().map(blank_long_strings).sum()
    }
}

fn blank_long_strings(value: &mut Value) -> usize {
    match value {
        Value::String(s) if s.chars().count() > MAX_ERROR_FIELD_CHARS => {
            s.clear();
            1
        }
        Value::Array(items) => items.iter_mut().map(blank_long_strings).sum(),
        Value::Object(map) => map.values_mut().map(blank_long_strings).sum(),
        _ => 0,
    }
}

fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Result parsing for manager operations (transactions, reveals).
fn parse_manager_result(content: &Value) -> (String, Option<String>) {
    let op_result = content.pointer("/metadata/operation_result");
    let status = op_result
        .and_then(|r| r.get("status"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let consumed_gas = json_text(op_result.and_then(|r| r.get("consumed_gas")))
        .or_else(|| json_text(op_result.and_then(|r| r.get("consumed_milligas"))));
    (status, consumed_gas)
}

/// Activations carry balance updates instead of an `operation_result`.
fn parse_activation_result(content: &Value) -> (String, Option<String>) {
    let updates = content
        .pointer("/metadata/balance_updates")
        .and_then(Value::as_array);
    let status = match (updates, content.pointer("/metadata/operation_result/status")) {
        (_, Some(Value::String(status))) => status.clone(),
        (Some(_), _) => APPLIED.to_string(),
        _ => String::new(),
    };
    let change = updates.and_then(|list| {
        list.iter()
            .find(|u| u.get("kind").and_then(Value::as_str) == Some("contract"))
            .and_then(|u| json_text(u.get("change")))
    });
    (status, change)
}

/// The set of operation kinds whose results are parsed.
///
/// Built once and handed to the pipeline; the default registers every kind
/// in [`OperationKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultHandlers {
    registered: Vec<OperationKind>,
}

impl Default for ResultHandlers {
    fn default() -> Self {
        Self::with_kinds(OperationKind::ALL)
    }
}

impl ResultHandlers {
    pub fn with_kinds(kinds: impl IntoIterator<Item = OperationKind>) -> Self {
        let mut registered: Vec<OperationKind> = Vec::new();
        for kind in kinds {
            if !registered.contains(&kind) {
                registered.push(kind);
            }
        }
        Self { registered }
    }

    pub fn handles(&self, kind: OperationKind) -> bool {
        self.registered.contains(&kind)
    }

    /// Parses one applied operation; `None` when its kind has no handler.
    pub fn parse(&self, content: &Value) -> Option<OperationResult> {
        let tag = content.get("kind").and_then(Value::as_str).unwrap_or_default();
        let Some(kind) = OperationKind::from_tag(tag).filter(|k| self.handles(*k)) else {
            tracing::debug!(kind = tag, "Skipping operation without result handler");
            return None;
        };

        let (status, details) = match kind {
            OperationKind::Transaction => {
                let (status, consumed_gas) = parse_manager_result(content);
                (status, ResultDetails::Transaction { consumed_gas })
            }
            OperationKind::Reveal => {
                let (status, consumed_gas) = parse_manager_result(content);
                (status, ResultDetails::Reveal { consumed_gas })
            }
            OperationKind::ActivateAccount => {
                let (status, change) = parse_activation_result(content);
                (status, ResultDetails::ActivateAccount { change })
            }
        };

        Some(OperationResult {
            data: content.clone(),
            succeeded: status == APPLIED,
            status,
            operation_hash: None,
            details,
        })
    }

    /// Parses a full preapply response. Only the first applied group is
    /// read, since batches are submitted as a single group. A response
    /// without that group or its `contents` array is a `Parse` error.
    pub fn parse_preapply(&self, response: &Value) -> BlockchainResult<Vec<OperationResult>> {
        let groups = response.as_array().ok_or_else(|| {
            BlockchainError::Parse(format!("preapply response is not an array: {response}"))
        })?;
        let group = groups.first().ok_or_else(|| {
            BlockchainError::Parse("preapply response has no operation group".to_string())
        })?;
        let contents = group
            .get("contents")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BlockchainError::Parse(format!("preapply group has no contents array: {group}"))
            })?;
        Ok(contents.iter().filter_map(|c| self.parse(c)).collect())
    }
}
