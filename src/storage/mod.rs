pub mod json_backend;
pub mod memory;
pub mod repository;

use std::sync::Arc;

use crate::errors::Result;

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use repository::{BlobRepository, MalformedRecord, RecurringRepository, TemplateRecord};

/// Well-known blob keys.
pub mod keys {
    pub const RECURRING_TEMPLATES: &str = "recurringTransactions";
    pub const LEDGER: &str = "transactions";
    pub const USERNAME: &str = "username";
    pub const CURRENCY_SYMBOL: &str = "currencySymbol";

    /// Key holding the budget for `month` (1-12) of `year`.
    pub fn monthly_budget(year: i32, month: u32) -> String {
        format!("budget_{year}_{month}")
    }
}

/// Minimal key-value contract: whole blobs in, whole blobs out.
pub trait KeyValueStore: Send + Sync {
    fn get_blob(&self, key: &str) -> Result<Option<String>>;
    fn set_blob(&self, key: &str, value: &str) -> Result<()>;
    fn remove_blob(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_blob(&self, key: &str) -> Result<Option<String>> {
        (**self).get_blob(key)
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_blob(key, value)
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        (**self).remove_blob(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_blob(&self, key: &str) -> Result<Option<String>> {
        (**self).get_blob(key)
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_blob(key, value)
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        (**self).remove_blob(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_blob(&self, key: &str) -> Result<Option<String>> {
        (**self).get_blob(key)
    }

    fn set_blob(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_blob(key, value)
    }

    fn remove_blob(&self, key: &str) -> Result<()> {
        (**self).remove_blob(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
