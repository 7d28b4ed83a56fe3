use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{record_id, timestamp, RecurringTemplate};

/// Direction of money flow for a ledger entry or template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("`{other}` is not a transaction type (income|expense)")),
        }
    }
}

/// A concrete ledger entry, either entered by hand or materialized from a template.
///
/// Fields this crate does not model (sync flags, owner name, ...) are kept in `extra` so
/// a read-modify-write pass never drops them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub from_recurring: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "record_id::option::deserialize"
    )]
    pub recurring_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Builds a hand-entered ledger entry.
    pub fn new(
        amount: f64,
        kind: TransactionKind,
        category_name: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id("txn", Utc::now()),
            amount,
            kind,
            category_name: category_name.into(),
            payment_method: None,
            description: None,
            date,
            from_recurring: false,
            is_recurring: false,
            recurring_id: None,
            extra: Map::new(),
        }
    }

    /// Materializes one occurrence of `template`, dated at the occurrence itself.
    pub fn from_occurrence(
        template: &RecurringTemplate,
        occurrence: DateTime<Utc>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_id("rec", generated_at),
            amount: template.amount,
            kind: template.kind,
            category_name: template.category_name.clone(),
            payment_method: Some(template.payment_method.clone()),
            description: Some(template.description.clone()),
            date: occurrence,
            from_recurring: true,
            is_recurring: true,
            recurring_id: Some(template.id.clone()),
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    /// Signed contribution to a balance: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// `<prefix>-<epoch millis>-<8 hex chars>`; the random suffix keeps ids generated in the
/// same millisecond apart.
fn generate_id(prefix: &str, at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}-{}", at.timestamp_millis(), &suffix[..8])
}
