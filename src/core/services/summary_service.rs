//! Month-level summaries over the ledger.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::ledger::{Transaction, TransactionKind};

const WARNING_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl Totals {
    fn add(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionKind::Income => self.income += txn.amount,
            TransactionKind::Expense => self.expense += txn.amount,
        }
        self.net = self.income - self.expense;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    pub category_name: String,
    pub kind: TransactionKind,
    pub amount: f64,
    /// Share of the total for `kind`, 0-100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyGroup {
    pub date: NaiveDate,
    pub totals: Totals,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub totals: Totals,
    pub categories: Vec<CategoryBreakdown>,
    /// Entries of the month, newest first.
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Unset,
    Good,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetUsage {
    pub budget: f64,
    pub spent: f64,
    /// Spent as a share of the budget, capped at 100.
    pub percentage: f64,
    pub status: BudgetStatus,
}

pub struct SummaryService;

impl SummaryService {
    /// Summarises the ledger entries dated in `month` (1-12) of `year`.
    pub fn monthly(ledger: &[Transaction], year: i32, month: u32) -> MonthlySummary {
        let mut transactions: Vec<Transaction> = ledger
            .iter()
            .filter(|txn| txn.date.year() == year && txn.date.month() == month)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        let mut totals = Totals::default();
        let mut by_category: BTreeMap<(TransactionKind, String), f64> = BTreeMap::new();
        for txn in &transactions {
            totals.add(txn);
            *by_category
                .entry((txn.kind, txn.category_name.clone()))
                .or_default() += txn.amount;
        }

        let categories = by_category
            .into_iter()
            .map(|((kind, category_name), amount)| {
                let total = match kind {
                    TransactionKind::Income => totals.income,
                    TransactionKind::Expense => totals.expense,
                };
                CategoryBreakdown {
                    category_name,
                    kind,
                    amount,
                    percentage: share(amount, total),
                }
            })
            .collect();

        MonthlySummary {
            year,
            month,
            totals,
            categories,
            transactions,
        }
    }

    /// Groups a month's entries by calendar day, newest day first.
    pub fn daily(ledger: &[Transaction], year: i32, month: u32) -> Vec<DailyGroup> {
        let mut days: BTreeMap<NaiveDate, DailyGroup> = BTreeMap::new();
        for txn in Self::monthly(ledger, year, month).transactions {
            let date = txn.date.date_naive();
            let group = days.entry(date).or_insert_with(|| DailyGroup {
                date,
                totals: Totals::default(),
                transactions: Vec::new(),
            });
            group.totals.add(&txn);
            group.transactions.push(txn);
        }
        days.into_values().rev().collect()
    }

    /// Classifies month spending against `budget`; a zero budget means unset.
    pub fn budget_usage(budget: f64, spent: f64) -> BudgetUsage {
        if budget <= 0.0 {
            return BudgetUsage {
                budget: 0.0,
                spent,
                percentage: 0.0,
                status: BudgetStatus::Unset,
            };
        }
        let percentage = (spent / budget * 100.0).min(100.0);
        let status = if percentage >= 100.0 {
            BudgetStatus::Exceeded
        } else if percentage >= WARNING_THRESHOLD {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Good
        };
        BudgetUsage {
            budget,
            spent,
            percentage,
            status,
        }
    }
}

fn share(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}
