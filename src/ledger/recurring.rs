//! Occurrence scheduling: pure date decisions over a single template, no I/O.

use chrono::{DateTime, Utc};

use super::RecurringTemplate;

/// True when the template is active and its cursor is at or before `as_of`.
pub fn is_due(template: &RecurringTemplate, as_of: DateTime<Utc>) -> bool {
    template.active && template.next_occurrence <= as_of
}

/// Occurrence that follows the current cursor; `None` when it would leave the calendar.
pub fn next_occurrence(template: &RecurringTemplate) -> Option<DateTime<Utc>> {
    template
        .frequency
        .advance_anchored(template.next_occurrence, template.anchor_day())
}

/// True when `candidate` falls after the template's end date.
pub fn should_retire(template: &RecurringTemplate, candidate: DateTime<Utc>) -> bool {
    template.end_date.is_some_and(|end| candidate > end)
}

/// True when `as_of` is already past the end date.
pub fn has_expired(template: &RecurringTemplate, as_of: DateTime<Utc>) -> bool {
    template.end_date.is_some_and(|end| as_of > end)
}

/// Outcome of stepping one template through a processing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Occurrence dates due in this pass, oldest first.
    pub occurrences: Vec<DateTime<Utc>>,
    pub next_occurrence: DateTime<Utc>,
    pub retired: bool,
    /// Set when the occurrence limit stopped the walk before catching up with `as_of`.
    pub truncated: bool,
}

/// Walks `template` forward to `as_of`, collecting every due occurrence.
///
/// An occurrence on the end date itself fires; the first candidate past it retires the
/// template without firing. A cursor already past the end date retires immediately, and
/// so does a cadence that runs off the end of the calendar. `limit`, when set, caps the
/// occurrences collected.
pub fn plan(template: &RecurringTemplate, as_of: DateTime<Utc>, limit: Option<usize>) -> Schedule {
    let mut schedule = Schedule {
        occurrences: Vec::new(),
        next_occurrence: template.next_occurrence,
        retired: !template.active,
        truncated: false,
    };
    if !template.active {
        return schedule;
    }
    if has_expired(template, as_of) && should_retire(template, template.next_occurrence) {
        schedule.retired = true;
        return schedule;
    }

    let mut cursor = template.clone();
    while is_due(&cursor, as_of) {
        if limit.is_some_and(|limit| schedule.occurrences.len() >= limit) {
            schedule.truncated = true;
            break;
        }
        schedule.occurrences.push(cursor.next_occurrence);
        match next_occurrence(&cursor) {
            Some(candidate) if !should_retire(&cursor, candidate) => {
                cursor.next_occurrence = candidate;
            }
            _ => {
                cursor.retire();
                schedule.retired = true;
                break;
            }
        }
    }
    schedule.next_occurrence = cursor.next_occurrence;
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Frequency, TemplateInput, TransactionKind};
    use chrono::{Duration, TimeZone};

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn template(frequency: Frequency, start: DateTime<Utc>) -> RecurringTemplate {
        let input = TemplateInput::new("Gym", 15.0, TransactionKind::Expense, frequency, start)
            .category("health")
            .payment_method("card");
        RecurringTemplate::create(input).unwrap()
    }

    #[test]
    fn due_only_when_active_and_cursor_reached() {
        let mut t = template(Frequency::Daily, day(2024, 1, 5));
        assert!(!is_due(&t, day(2024, 1, 4)));
        assert!(is_due(&t, day(2024, 1, 5)));
        t.retire();
        assert!(!is_due(&t, day(2024, 2, 1)));
    }

    #[test]
    fn retirement_checks_end_date_strictly() {
        let mut t = template(Frequency::Daily, day(2024, 1, 1));
        assert!(!should_retire(&t, day(2030, 1, 1)));
        t.end_date = Some(day(2024, 1, 10));
        assert!(!should_retire(&t, day(2024, 1, 10)));
        assert!(should_retire(&t, day(2024, 1, 11)));
        assert!(has_expired(&t, day(2024, 1, 11)));
        assert!(!has_expired(&t, day(2024, 1, 10)));
    }

    #[test]
    fn plan_backfills_missed_days() {
        let t = template(Frequency::Daily, day(2024, 1, 1));
        let schedule = plan(&t, day(2024, 1, 3) + Duration::hours(12), None);
        assert_eq!(
            schedule.occurrences,
            vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]
        );
        assert_eq!(schedule.next_occurrence, day(2024, 1, 4));
        assert!(!schedule.retired);
    }

    #[test]
    fn occurrence_on_end_date_fires_then_retires() {
        let mut t = template(Frequency::Weekly, day(2024, 1, 1));
        t.end_date = Some(day(2024, 1, 15));
        let schedule = plan(&t, day(2024, 3, 1), None);
        assert_eq!(
            schedule.occurrences,
            vec![day(2024, 1, 1), day(2024, 1, 8), day(2024, 1, 15)]
        );
        assert!(schedule.retired);
        assert_eq!(schedule.next_occurrence, day(2024, 1, 15));
    }

    #[test]
    fn cursor_past_end_date_retires_without_firing() {
        let mut t = template(Frequency::Monthly, day(2024, 1, 1));
        t.next_occurrence = day(2024, 3, 1);
        t.end_date = Some(day(2024, 2, 15));
        let schedule = plan(&t, day(2024, 4, 1), None);
        assert!(schedule.occurrences.is_empty());
        assert!(schedule.retired);
    }

    #[test]
    fn limit_truncates_and_leaves_cursor_on_first_unfired() {
        let t = template(Frequency::Daily, day(2024, 1, 1));
        let schedule = plan(&t, day(2024, 12, 31), Some(5));
        assert_eq!(schedule.occurrences.len(), 5);
        assert!(schedule.truncated);
        assert_eq!(schedule.next_occurrence, day(2024, 1, 6));
    }

    #[test]
    fn cadence_leaving_the_calendar_retires() {
        let last = chrono::NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let mut t = template(Frequency::Daily, last);
        t.next_occurrence = last;
        let schedule = plan(&t, last, None);
        assert_eq!(schedule.occurrences, vec![last]);
        assert!(schedule.retired);
        assert_eq!(schedule.next_occurrence, last);
    }

    #[test]
    fn unlimited_plan_catches_up_years_of_days() {
        let t = template(Frequency::Daily, day(2020, 1, 1));
        let schedule = plan(&t, day(2024, 1, 1), None);
        assert_eq!(schedule.occurrences.len(), 1462);
        assert!(!schedule.truncated);
        assert_eq!(schedule.next_occurrence, day(2024, 1, 2));
    }

    #[test]
    fn monthly_schedule_keeps_anchor_day() {
        let t = template(Frequency::Monthly, day(2024, 1, 31));
        let schedule = plan(&t, day(2024, 4, 29), None);
        assert_eq!(
            schedule.occurrences,
            vec![day(2024, 1, 31), day(2024, 2, 29), day(2024, 3, 31)]
        );
        assert_eq!(schedule.next_occurrence, day(2024, 4, 30));
    }
}
