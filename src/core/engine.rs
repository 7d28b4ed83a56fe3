//! Materialization of due recurring occurrences into the ledger.

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::ledger::{recurring, Transaction};
use crate::storage::{RecurringRepository, TemplateRecord};

/// A stored template the pass could not schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTemplate {
    pub id: Option<String>,
    pub reason: String,
}

/// Result of one processing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    pub as_of: DateTime<Utc>,
    pub materialized_count: usize,
    /// New ledger entries, grouped per template and oldest first within a template.
    pub generated: Vec<Transaction>,
    pub retired: Vec<String>,
    pub skipped: Vec<SkippedTemplate>,
    /// Templates that hit the per-pass occurrence cap and still have due occurrences.
    pub truncated: Vec<String>,
}

impl ProcessReport {
    fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            materialized_count: 0,
            generated: Vec::new(),
            retired: Vec::new(),
            skipped: Vec::new(),
            truncated: Vec::new(),
        }
    }

    /// True when the pass modified templates or the ledger.
    pub fn has_changes(&self) -> bool {
        self.materialized_count > 0 || !self.retired.is_empty()
    }
}

/// Runs processing passes: load, schedule every active template, write back.
///
/// By default a pass catches every template up to `as_of`. An optional per-template cap
/// bounds one pass; capped templates are listed in [`ProcessReport::truncated`] and the
/// next pass resumes from their cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterializationEngine {
    max_occurrences_per_template: Option<usize>,
}

impl MaterializationEngine {
    pub fn new(max_occurrences_per_template: Option<usize>) -> Self {
        Self {
            max_occurrences_per_template: max_occurrences_per_template.map(|limit| limit.max(1)),
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self::new(Some(limit))
    }

    /// Materializes every occurrence due at or before `as_of` and persists the result.
    ///
    /// A read or write failure aborts the pass with nothing further written. The ledger
    /// is written before the templates: a failure between the two writes leaves cursors
    /// unadvanced, so a retry duplicates entries instead of losing them.
    pub fn process_due(
        &self,
        repository: &dyn RecurringRepository,
        as_of: DateTime<Utc>,
    ) -> Result<ProcessReport> {
        let span = tracing::info_span!("process_due", %as_of);
        let _guard = span.enter();

        let mut records = repository.load_templates()?;
        let mut ledger = repository.load_ledger()?;
        let report = self.materialize(&mut records, as_of, Utc::now());

        if report.materialized_count > 0 {
            ledger.extend(report.generated.iter().cloned());
            repository.save_ledger(&ledger).inspect_err(|err| {
                tracing::warn!(error = %err, "ledger write failed; pass aborted");
            })?;
        }
        if report.has_changes() {
            repository.save_templates(&records).inspect_err(|err| {
                tracing::warn!(error = %err, "template write failed after ledger write");
            })?;
        }

        tracing::info!(
            materialized = report.materialized_count,
            retired = report.retired.len(),
            skipped = report.skipped.len(),
            "recurring pass complete"
        );
        Ok(report)
    }

    /// In-memory half of a pass: advances `records` and returns what was generated.
    pub fn materialize(
        &self,
        records: &mut [TemplateRecord],
        as_of: DateTime<Utc>,
        generated_at: DateTime<Utc>,
    ) -> ProcessReport {
        let mut report = ProcessReport::empty(as_of);

        for record in records.iter_mut() {
            let template = match record {
                TemplateRecord::Parsed(template) => template,
                TemplateRecord::Malformed(bad) => {
                    tracing::warn!(id = ?bad.id, reason = %bad.reason, "skipping malformed template");
                    report.skipped.push(SkippedTemplate {
                        id: bad.id.clone(),
                        reason: bad.reason.clone(),
                    });
                    continue;
                }
            };
            if !template.active {
                continue;
            }

            let schedule = recurring::plan(template, as_of, self.max_occurrences_per_template);
            for occurrence in &schedule.occurrences {
                tracing::debug!(template = %template.id, %occurrence, "materializing occurrence");
                report
                    .generated
                    .push(Transaction::from_occurrence(template, *occurrence, generated_at));
            }
            template.next_occurrence = schedule.next_occurrence;
            if schedule.retired {
                template.retire();
                report.retired.push(template.id.clone());
                tracing::info!(template = %template.id, "template retired");
            }
            if schedule.truncated {
                tracing::warn!(
                    template = %template.id,
                    limit = ?self.max_occurrences_per_template,
                    "occurrence cap reached; remaining occurrences deferred"
                );
                report.truncated.push(template.id.clone());
            }
        }

        report.materialized_count = report.generated.len();
        report
    }
}
