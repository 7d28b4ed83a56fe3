#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use expense_core::errors::{CoreError, Result};
use expense_core::ledger::{Frequency, TemplateInput, TransactionKind};
use expense_core::storage::{keys, KeyValueStore, MemoryStore};

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn expense(description: &str, frequency: Frequency, start: DateTime<Utc>) -> TemplateInput {
    TemplateInput::new(description, 20.0, TransactionKind::Expense, frequency, start)
        .category("bills")
        .payment_method("card")
}

pub fn income(description: &str, frequency: Frequency, start: DateTime<Utc>) -> TemplateInput {
    TemplateInput::new(description, 1500.0, TransactionKind::Income, frequency, start)
        .category("salary")
        .payment_method("bank")
}

/// Wraps a [`MemoryStore`] and fails reads or writes of one key. Successful writes are
/// counted in `writes`.
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_key: &'static str,
    fail_reads: bool,
    pub writes: AtomicUsize,
}

impl FailingStore {
    pub fn failing_on(fail_key: &'static str, inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_key,
            fail_reads: false,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn failing_reads_of(fail_key: &'static str, inner: MemoryStore) -> Self {
        Self {
            fail_reads: true,
            ..Self::failing_on(fail_key, inner)
        }
    }

    pub fn failing_ledger(inner: MemoryStore) -> Self {
        Self::failing_on(keys::LEDGER, inner)
    }

    pub fn failing_templates(inner: MemoryStore) -> Self {
        Self::failing_on(keys::RECURRING_TEMPLATES, inner)
    }
}

impl KeyValueStore for FailingStore {
    fn get_blob(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads && key == self.fail_key {
            return Err(CoreError::read(key, "permission denied"));
        }
        self.inner.get_blob(key)
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<()> {
        if !self.fail_reads && key == self.fail_key {
            return Err(CoreError::write(key, "disk full"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_blob(key, value)
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        self.inner.remove_blob(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}
