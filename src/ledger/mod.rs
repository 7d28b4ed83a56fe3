//! Ledger domain models: recurring templates, ledger entries and their scheduling rules.

pub mod frequency;
pub mod record_id;
pub mod recurring;
pub mod template;
pub mod timestamp;
pub mod transaction;

pub use frequency::{Frequency, ParseFrequencyError};
pub use recurring::Schedule;
pub use template::{RecurringTemplate, TemplateInput, ValidationError};
pub use transaction::{Transaction, TransactionKind};
