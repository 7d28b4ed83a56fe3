//! Caller-owned session state: the store, the scheduler engine, the clock and a small
//! preference cache with explicit invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use super::clock::{Clock, SystemClock};
use super::engine::{MaterializationEngine, ProcessReport};
use super::services::{
    BudgetUsage, DailyGroup, LedgerService, MonthlySummary, SummaryService, TemplateService,
};
use crate::config::Config;
use crate::errors::{CoreError, Result};
use crate::ledger::{RecurringTemplate, TemplateInput, Transaction, TransactionKind};
use crate::storage::{keys, BlobRepository, KeyValueStore, RecurringRepository, TemplateRecord};

#[derive(Debug, Default)]
struct PreferenceCache {
    username: Option<String>,
    currency_symbol: Option<String>,
    budgets: HashMap<(i32, u32), f64>,
}

/// Everything one caller needs to drive the recurring engine and read preferences.
pub struct SessionContext<S> {
    repository: BlobRepository<S>,
    engine: MaterializationEngine,
    clock: Arc<dyn Clock>,
    default_username: String,
    default_currency: String,
    cache: PreferenceCache,
}

impl<S: KeyValueStore> SessionContext<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: BlobRepository::new(store),
            engine: MaterializationEngine::new(config.max_occurrences_per_template),
            clock,
            default_username: config.default_username.clone(),
            default_currency: config.currency_symbol.clone(),
            cache: PreferenceCache::default(),
        }
    }

    pub fn repository(&self) -> &BlobRepository<S> {
        &self.repository
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Runs a processing pass at the clock's current time.
    pub fn process_due_now(&self) -> Result<ProcessReport> {
        self.process_due(self.clock.now())
    }

    pub fn process_due(&self, as_of: DateTime<Utc>) -> Result<ProcessReport> {
        self.engine.process_due(&self.repository, as_of)
    }

    pub fn list_templates(&self, kind: Option<TransactionKind>) -> Result<Vec<RecurringTemplate>> {
        TemplateService::list_by_kind(&self.repository, kind)
    }

    pub fn add_template(&self, input: TemplateInput) -> Result<RecurringTemplate> {
        TemplateService::add(&self.repository, input)
    }

    pub fn update_template(&self, id: &str, input: TemplateInput) -> Result<RecurringTemplate> {
        TemplateService::update(&self.repository, id, input)
    }

    pub fn deactivate_template(&self, id: &str) -> Result<RecurringTemplate> {
        TemplateService::deactivate(&self.repository, id)
    }

    pub fn delete_template(&self, id: &str) -> Result<TemplateRecord> {
        TemplateService::remove(&self.repository, id)
    }

    pub fn ledger(&self) -> Result<Vec<Transaction>> {
        self.repository.load_ledger()
    }

    pub fn record_transaction(&self, txn: Transaction) -> Result<Transaction> {
        LedgerService::record(&self.repository, txn)
    }

    pub fn remove_transaction(&self, id: &str) -> Result<Transaction> {
        LedgerService::remove(&self.repository, id)
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> Result<MonthlySummary> {
        Ok(SummaryService::monthly(&self.ledger()?, year, month))
    }

    pub fn daily_summary(&self, year: i32, month: u32) -> Result<Vec<DailyGroup>> {
        Ok(SummaryService::daily(&self.ledger()?, year, month))
    }

    /// Budget usage for the month, based on that month's expense total.
    pub fn budget_usage(&mut self, year: i32, month: u32) -> Result<BudgetUsage> {
        let spent = self.monthly_summary(year, month)?.totals.expense;
        let budget = self.monthly_budget(year, month)?;
        Ok(SummaryService::budget_usage(budget, spent))
    }

    pub fn username(&mut self) -> Result<String> {
        if let Some(name) = &self.cache.username {
            return Ok(name.clone());
        }
        let name = self
            .read_text(keys::USERNAME)?
            .unwrap_or_else(|| self.default_username.clone());
        self.cache.username = Some(name.clone());
        Ok(name)
    }

    pub fn set_username(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("username cannot be empty".into()));
        }
        self.repository.store().set_blob(keys::USERNAME, name)?;
        self.cache.username = Some(name.to_string());
        Ok(())
    }

    pub fn currency_symbol(&mut self) -> Result<String> {
        if let Some(symbol) = &self.cache.currency_symbol {
            return Ok(symbol.clone());
        }
        let symbol = self
            .read_text(keys::CURRENCY_SYMBOL)?
            .unwrap_or_else(|| self.default_currency.clone());
        self.cache.currency_symbol = Some(symbol.clone());
        Ok(symbol)
    }

    pub fn set_currency_symbol(&mut self, symbol: &str) -> Result<()> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CoreError::InvalidInput("currency symbol cannot be empty".into()));
        }
        self.repository.store().set_blob(keys::CURRENCY_SYMBOL, symbol)?;
        self.cache.currency_symbol = Some(symbol.to_string());
        Ok(())
    }

    /// Budget for `month` (1-12) of `year`; 0 when unset.
    pub fn monthly_budget(&mut self, year: i32, month: u32) -> Result<f64> {
        if let Some(budget) = self.cache.budgets.get(&(year, month)) {
            return Ok(*budget);
        }
        let key = keys::monthly_budget(year, month);
        let budget = match self.read_text(&key)? {
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .unwrap_or_else(|| {
                    tracing::warn!(key = %key, raw = %raw, "ignoring unreadable budget value");
                    0.0
                }),
            None => 0.0,
        };
        self.cache.budgets.insert((year, month), budget);
        Ok(budget)
    }

    pub fn set_monthly_budget(&mut self, year: i32, month: u32, amount: f64) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidInput(format!("month {month} is out of range")));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "budget must be zero or positive, got {amount}"
            )));
        }
        let key = keys::monthly_budget(year, month);
        self.repository.store().set_blob(&key, &amount.to_string())?;
        self.cache.budgets.insert((year, month), amount);
        Ok(())
    }

    /// Budget for the month containing the clock's current date.
    pub fn current_budget(&mut self) -> Result<f64> {
        let today = self.clock.today();
        self.monthly_budget(today.year(), today.month())
    }

    /// Drops cached preferences so the next read goes to the store.
    pub fn invalidate_cache(&mut self) {
        self.cache = PreferenceCache::default();
    }

    /// Removes every stored blob and resets the cache.
    pub fn clear_all_data(&mut self) -> Result<()> {
        let store = self.repository.store();
        for key in store.keys()? {
            store.remove_blob(&key)?;
        }
        self.invalidate_cache();
        tracing::info!("all stored data cleared");
        Ok(())
    }

    fn read_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .repository
            .store()
            .get_blob(key)?
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty()))
    }
}
