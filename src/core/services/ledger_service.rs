//! Hand-entered ledger entries.

use crate::errors::{CoreError, Result};
use crate::ledger::Transaction;
use crate::storage::RecurringRepository;

/// Adds and removes ledger entries outside of template materialization.
pub struct LedgerService;

impl LedgerService {
    /// Validates `txn` and appends it to the stored ledger.
    pub fn record(repository: &dyn RecurringRepository, txn: Transaction) -> Result<Transaction> {
        validate(&txn)?;
        let mut ledger = repository.load_ledger()?;
        if ledger.iter().any(|existing| existing.id == txn.id) {
            return Err(CoreError::InvalidInput(format!(
                "ledger already holds an entry with id `{}`",
                txn.id
            )));
        }
        ledger.push(txn.clone());
        repository.save_ledger(&ledger)?;
        tracing::info!(entry = %txn.id, kind = %txn.kind, amount = txn.amount, "ledger entry recorded");
        Ok(txn)
    }

    /// Removes the entry `id`, returning it.
    pub fn remove(repository: &dyn RecurringRepository, id: &str) -> Result<Transaction> {
        let mut ledger = repository.load_ledger()?;
        let index = ledger
            .iter()
            .position(|txn| txn.id == id)
            .ok_or_else(|| CoreError::InvalidInput(format!("no ledger entry with id `{id}`")))?;
        let removed = ledger.remove(index);
        repository.save_ledger(&ledger)?;
        tracing::info!(entry = %id, "ledger entry removed");
        Ok(removed)
    }
}

fn validate(txn: &Transaction) -> Result<()> {
    if !txn.amount.is_finite() || txn.amount <= 0.0 {
        return Err(CoreError::InvalidInput(format!(
            "amount must be positive, got {}",
            txn.amount
        )));
    }
    if txn.category_name.trim().is_empty() {
        return Err(CoreError::InvalidInput("category cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use crate::storage::{keys, BlobRepository, KeyValueStore, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn lunch() -> Transaction {
        let date = Utc.with_ymd_and_hms(2024, 3, 2, 13, 0, 0).unwrap();
        Transaction::new(12.5, TransactionKind::Expense, "food", date)
            .with_description("Lunch")
            .with_payment_method("upi")
    }

    #[test]
    fn record_then_remove() {
        let repo = BlobRepository::new(MemoryStore::new());
        let txn = LedgerService::record(&repo, lunch()).unwrap();

        let ledger = repo.load_ledger().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].description.as_deref(), Some("Lunch"));
        assert!(!ledger[0].from_recurring);

        let removed = LedgerService::remove(&repo, &txn.id).unwrap();
        assert_eq!(removed.id, txn.id);
        assert!(repo.load_ledger().unwrap().is_empty());
    }

    #[test]
    fn invalid_entry_writes_nothing() {
        let repo = BlobRepository::new(MemoryStore::new());
        let mut bad = lunch();
        bad.amount = 0.0;
        assert!(matches!(
            LedgerService::record(&repo, bad),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(repo.store().get_blob(keys::LEDGER).unwrap().is_none());
    }

    #[test]
    fn removing_an_unknown_entry_fails() {
        let repo = BlobRepository::new(MemoryStore::new());
        LedgerService::record(&repo, lunch()).unwrap();
        assert!(LedgerService::remove(&repo, "txn-0-deadbeef").is_err());
        assert_eq!(repo.load_ledger().unwrap().len(), 1);
    }
}
