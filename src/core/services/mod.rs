pub mod ledger_service;
pub mod summary_service;
pub mod template_service;

pub use summary_service::{
    BudgetStatus, BudgetUsage, CategoryBreakdown, DailyGroup, MonthlySummary, SummaryService,
    Totals,
};
pub use ledger_service::LedgerService;
pub use template_service::TemplateService;
