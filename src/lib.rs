#![doc(test(attr(deny(warnings))))]

//! Expense Core schedules recurring income and expense templates and materializes
//! their due occurrences into a transaction ledger kept in a key-value store.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

pub use crate::config::{Config, ConfigManager};
pub use crate::core::{Clock, ManualClock, MaterializationEngine, ProcessReport, SessionContext, SystemClock};
pub use crate::errors::{CoreError, Result};
pub use crate::ledger::{Frequency, RecurringTemplate, TemplateInput, Transaction, TransactionKind};
pub use crate::storage::{BlobRepository, JsonFileStore, KeyValueStore, MemoryStore, RecurringRepository};

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with(&Config::default());
}

/// Initializes global tracing using the configured log filter. Later calls are no-ops.
pub fn init_with(config: &Config) {
    utils::init_tracing(config.log_filter.as_deref());
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
