//! CRUD helpers for recurring templates.

use crate::errors::{CoreError, Result};
use crate::ledger::{RecurringTemplate, TemplateInput, TransactionKind};
use crate::storage::{RecurringRepository, TemplateRecord};

/// Provides validated CRUD over the stored template collection. Every call loads the
/// whole collection, mutates it and writes it back.
pub struct TemplateService;

impl TemplateService {
    /// Returns all schedulable templates in stored order.
    pub fn list(repository: &dyn RecurringRepository) -> Result<Vec<RecurringTemplate>> {
        Self::list_by_kind(repository, None)
    }

    /// Returns templates of the given kind, or all of them for `None`.
    pub fn list_by_kind(
        repository: &dyn RecurringRepository,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<RecurringTemplate>> {
        Ok(repository
            .load_templates()?
            .into_iter()
            .filter_map(|record| match record {
                TemplateRecord::Parsed(template) => Some(template),
                TemplateRecord::Malformed(_) => None,
            })
            .filter(|template| kind.map_or(true, |kind| template.kind == kind))
            .collect())
    }

    pub fn get(repository: &dyn RecurringRepository, id: &str) -> Result<RecurringTemplate> {
        repository
            .load_templates()?
            .into_iter()
            .find_map(|record| match record {
                TemplateRecord::Parsed(template) if template.id == id => Some(template),
                _ => None,
            })
            .ok_or_else(|| CoreError::TemplateNotFound(id.to_string()))
    }

    /// Validates and stores a new template, returning it with its assigned id.
    pub fn add(
        repository: &dyn RecurringRepository,
        input: TemplateInput,
    ) -> Result<RecurringTemplate> {
        let template = RecurringTemplate::create(input)?;
        let mut records = repository.load_templates()?;
        records.push(TemplateRecord::Parsed(template.clone()));
        repository.save_templates(&records)?;
        tracing::info!(template = %template.id, frequency = %template.frequency, "template added");
        Ok(template)
    }

    /// Replaces the editable fields of template `id`.
    pub fn update(
        repository: &dyn RecurringRepository,
        id: &str,
        input: TemplateInput,
    ) -> Result<RecurringTemplate> {
        Self::modify(repository, id, |template| template.apply(input).map_err(Into::into))
    }

    /// Retires template `id`; it will not fire again.
    pub fn deactivate(repository: &dyn RecurringRepository, id: &str) -> Result<RecurringTemplate> {
        Self::modify(repository, id, |template| {
            template.retire();
            Ok(())
        })
    }

    /// Removes template `id`, returning the removed record.
    pub fn remove(repository: &dyn RecurringRepository, id: &str) -> Result<TemplateRecord> {
        let mut records = repository.load_templates()?;
        let index = records
            .iter()
            .position(|record| record.has_id(id))
            .ok_or_else(|| CoreError::TemplateNotFound(id.to_string()))?;
        let removed = records.remove(index);
        repository.save_templates(&records)?;
        tracing::info!(template = %id, "template removed");
        Ok(removed)
    }

    fn modify<F>(repository: &dyn RecurringRepository, id: &str, mutator: F) -> Result<RecurringTemplate>
    where
        F: FnOnce(&mut RecurringTemplate) -> Result<()>,
    {
        let mut records = repository.load_templates()?;
        let template = records
            .iter_mut()
            .filter_map(TemplateRecord::template_mut)
            .find(|template| template.id == id)
            .ok_or_else(|| CoreError::TemplateNotFound(id.to_string()))?;
        mutator(template)?;
        let updated = template.clone();
        repository.save_templates(&records)?;
        tracing::info!(template = %id, active = updated.active, "template updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Frequency, ValidationError};
    use crate::storage::{keys, BlobRepository, KeyValueStore, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn input(kind: TransactionKind) -> TemplateInput {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TemplateInput::new("Netflix", 9.99, kind, Frequency::Monthly, start)
            .category("entertainment")
            .payment_method("card")
    }

    #[test]
    fn update_fails_for_missing_template() {
        let repo = BlobRepository::new(MemoryStore::new());
        let err = TemplateService::update(&repo, "no-such-template", input(TransactionKind::Expense))
            .expect_err("update must fail for unknown id");
        assert!(matches!(err, CoreError::TemplateNotFound(_)), "unexpected error: {err:?}");
    }

    #[test]
    fn invalid_add_writes_nothing() {
        let repo = BlobRepository::new(MemoryStore::new());
        let mut bad = input(TransactionKind::Expense);
        bad.payment_method.clear();
        let err = TemplateService::add(&repo, bad).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MissingPaymentMethod)
        ));
        assert!(repo.store().keys().unwrap().is_empty());
    }

    #[test]
    fn list_by_kind_filters() {
        let repo = BlobRepository::new(MemoryStore::new());
        TemplateService::add(&repo, input(TransactionKind::Expense)).unwrap();
        TemplateService::add(&repo, input(TransactionKind::Income)).unwrap();

        let incomes = TemplateService::list_by_kind(&repo, Some(TransactionKind::Income)).unwrap();
        assert_eq!(incomes.len(), 1);
        assert_eq!(TemplateService::list(&repo).unwrap().len(), 2);
    }

    #[test]
    fn deactivate_then_remove() {
        let repo = BlobRepository::new(MemoryStore::new());
        let template = TemplateService::add(&repo, input(TransactionKind::Expense)).unwrap();

        let retired = TemplateService::deactivate(&repo, &template.id).unwrap();
        assert!(!retired.active);

        let removed = TemplateService::remove(&repo, &template.id).unwrap();
        assert!(removed.has_id(&template.id));
        assert!(TemplateService::list(&repo).unwrap().is_empty());
        assert!(matches!(
            TemplateService::get(&repo, &template.id),
            Err(CoreError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn update_replaces_fields_and_keeps_the_cursor() {
        let repo = BlobRepository::new(MemoryStore::new());
        let template = TemplateService::add(&repo, input(TransactionKind::Expense)).unwrap();

        let mut edited = input(TransactionKind::Expense);
        edited.description = "Netflix Premium".into();
        edited.amount = 15.49;
        let updated = TemplateService::update(&repo, &template.id, edited).unwrap();

        assert_eq!(updated.id, template.id);
        assert_eq!(updated.next_occurrence, template.next_occurrence);
        let stored = TemplateService::get(&repo, &template.id).unwrap();
        assert_eq!(stored.description, "Netflix Premium");
        assert_eq!(stored.amount, 15.49);
    }

    #[test]
    fn rejected_update_leaves_the_store_untouched() {
        let repo = BlobRepository::new(MemoryStore::new());
        let template = TemplateService::add(&repo, input(TransactionKind::Expense)).unwrap();
        TemplateService::deactivate(&repo, &template.id).unwrap();
        let before = repo.store().get_blob(keys::RECURRING_TEMPLATES).unwrap();

        let mut blank = input(TransactionKind::Expense).inactive();
        blank.description = "   ".into();
        let err = TemplateService::update(&repo, &template.id, blank).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::MissingDescription)));

        let err = TemplateService::update(&repo, &template.id, input(TransactionKind::Expense))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Reactivation(_))));

        assert_eq!(repo.store().get_blob(keys::RECURRING_TEMPLATES).unwrap(), before);
    }
}
