use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::{record_id, timestamp, Frequency, TransactionKind};

/// Reasons a template create/update request is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("a description is required")]
    MissingDescription,
    #[error("amount must be a positive number, got {0}")]
    NonPositiveAmount(f64),
    #[error("a category is required")]
    MissingCategory,
    #[error("a payment method is required")]
    MissingPaymentMethod,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("template {0} has been retired and cannot be reactivated")]
    Reactivation(String),
}

/// A recurring-transaction definition with its occurrence cursor.
///
/// `id` is opaque: new templates get a v4 UUID, stored ones keep whatever id they were
/// written with. Fields other clients stored on the record travel in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_name: String,
    pub payment_method: String,
    pub frequency: Frequency,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
    /// Earliest occurrence not yet materialized.
    #[serde(with = "timestamp")]
    pub next_occurrence: DateTime<Utc>,
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecurringTemplate {
    /// Validates `input` and builds a fresh template whose cursor sits on the start date.
    pub fn create(input: TemplateInput) -> Result<Self, ValidationError> {
        input.validate()?;
        let start_date = input.start_date;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            amount: input.amount,
            kind: input.kind,
            category_name: input.category_name.trim().to_string(),
            payment_method: input.payment_method.trim().to_string(),
            frequency: input.frequency,
            start_date,
            end_date: input.end_date,
            next_occurrence: start_date,
            active: true,
            extra: Map::new(),
        })
    }

    /// Replaces the editable fields with `input`.
    ///
    /// The cursor is kept, except that it is pulled forward to a start date that moved
    /// past it. A retired template stays retired.
    pub fn apply(&mut self, input: TemplateInput) -> Result<(), ValidationError> {
        input.validate()?;
        if input.active && !self.active {
            return Err(ValidationError::Reactivation(self.id.clone()));
        }
        self.description = input.description.trim().to_string();
        self.amount = input.amount;
        self.kind = input.kind;
        self.category_name = input.category_name.trim().to_string();
        self.payment_method = input.payment_method.trim().to_string();
        self.frequency = input.frequency;
        self.start_date = input.start_date;
        self.end_date = input.end_date;
        if self.next_occurrence < self.start_date {
            self.next_occurrence = self.start_date;
        }
        self.active = input.active;
        Ok(())
    }

    /// Day-of-month the monthly/yearly cadence aims for.
    pub fn anchor_day(&self) -> u32 {
        self.start_date.day()
    }

    pub fn retire(&mut self) {
        self.active = false;
    }

    /// Checks the invariants a stored record must hold to be scheduled.
    pub fn integrity_issue(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("id is empty".to_string());
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Some(format!("amount {} is not a positive number", self.amount));
        }
        if self.next_occurrence < self.start_date {
            return Some(format!(
                "next occurrence {} precedes start date {}",
                self.next_occurrence, self.start_date
            ));
        }
        None
    }
}

/// User-supplied fields for creating or editing a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInput {
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_name: String,
    pub payment_method: String,
    pub frequency: Frequency,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "TemplateInput::default_active")]
    pub active: bool,
}

impl TemplateInput {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        frequency: Frequency,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            kind,
            category_name: String::new(),
            payment_method: String::new(),
            frequency,
            start_date,
            end_date: None,
            active: true,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category_name = category.into();
        self
    }

    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn ending(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.category_name.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if self.payment_method.trim().is_empty() {
            return Err(ValidationError::MissingPaymentMethod);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(ValidationError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }
        Ok(())
    }

    fn default_active() -> bool {
        true
    }
}

impl From<&RecurringTemplate> for TemplateInput {
    fn from(template: &RecurringTemplate) -> Self {
        Self {
            description: template.description.clone(),
            amount: template.amount,
            kind: template.kind,
            category_name: template.category_name.clone(),
            payment_method: template.payment_method.clone(),
            frequency: template.frequency,
            start_date: template.start_date,
            end_date: template.end_date,
            active: template.active,
        }
    }
}
