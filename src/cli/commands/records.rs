use chrono::Datelike;

use crate::cli::core::{
    parse_amount, parse_day, parse_month, CommandError, CommandResult, CommandDef, ShellContext,
};
use crate::cli::output;
use crate::core::services::BudgetStatus;
use crate::ledger::{Transaction, TransactionKind};

const RECORD_USAGE: &str =
    "record <income|expense> <amount> <category> <YYYY-MM-DD> [description] [payment]";

pub(crate) const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "record",
        usage: RECORD_USAGE,
        summary: "Add a one-off ledger entry",
        run: cmd_record,
    },
    CommandDef {
        name: "erase",
        usage: "erase <entry id>",
        summary: "Delete a ledger entry",
        run: cmd_erase,
    },
    CommandDef {
        name: "ledger",
        usage: "ledger",
        summary: "Show ledger entries, newest first",
        run: cmd_ledger,
    },
    CommandDef {
        name: "daily",
        usage: "daily [YYYY-MM]",
        summary: "Day-by-day totals for a month",
        run: cmd_daily,
    },
    CommandDef {
        name: "summary",
        usage: "summary [YYYY-MM]",
        summary: "Monthly totals and category breakdown",
        run: cmd_summary,
    },
    CommandDef {
        name: "budget",
        usage: "budget [YYYY-MM] [amount]",
        summary: "Show or set a monthly budget",
        run: cmd_budget,
    },
];

fn cmd_record(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (kind, amount, category, day, rest) = match args {
        [kind, amount, category, day, rest @ ..] if rest.len() <= 2 => {
            (kind, amount, category, day, rest)
        }
        _ => return Err(CommandError::usage(RECORD_USAGE)),
    };
    let kind = kind
        .parse::<TransactionKind>()
        .map_err(CommandError::InvalidArguments)?;
    let mut txn = Transaction::new(parse_amount(amount)?, kind, *category, parse_day(day)?);
    if let Some(description) = rest.first() {
        txn = txn.with_description(*description);
    }
    if let Some(payment) = rest.get(1) {
        txn = txn.with_payment_method(*payment);
    }

    let txn = context.session.record_transaction(txn)?;
    output::success(format!("Recorded {} {}", txn.kind, txn.id));
    Ok(())
}

fn cmd_erase(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(CommandError::usage("erase <entry id>"));
    };
    let removed = context.session.remove_transaction(id)?;
    output::success(format!("Erased {} on {}", removed.id, removed.date.date_naive()));
    Ok(())
}

fn cmd_ledger(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let mut ledger = context.session.ledger()?;
    if ledger.is_empty() {
        output::info("Ledger is empty.");
        return Ok(());
    }
    ledger.sort_by(|a, b| b.date.cmp(&a.date));
    let symbol = context.currency()?;
    output::section(format!("Ledger ({} entries)", ledger.len()));
    for txn in ledger {
        output::info(format!(
            "{} {:>12} {} {} [{}]{}",
            txn.date.date_naive(),
            output::money(&symbol, txn.signed_amount()),
            txn.category_name,
            txn.description.as_deref().unwrap_or(""),
            txn.id,
            if txn.from_recurring { " (recurring)" } else { "" }
        ));
    }
    Ok(())
}

fn cmd_daily(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (year, month) = match args {
        [] => current_month(context),
        [raw] => parse_month(raw)?,
        _ => return Err(CommandError::usage("daily [YYYY-MM]")),
    };
    let days = context.session.daily_summary(year, month)?;
    if days.is_empty() {
        output::info(format!("No entries in {year}-{month:02}."));
        return Ok(());
    }
    let symbol = context.currency()?;
    output::section(format!("Daily {year}-{month:02}"));
    for day in days {
        output::info(format!(
            "{} in {:>12} out {:>12} net {:>12} ({} entries)",
            day.date,
            output::money(&symbol, day.totals.income),
            output::money(&symbol, day.totals.expense),
            output::money(&symbol, day.totals.net),
            day.transactions.len()
        ));
    }
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (year, month) = match args {
        [] => current_month(context),
        [raw] => parse_month(raw)?,
        _ => return Err(CommandError::usage("summary [YYYY-MM]")),
    };
    let summary = context.session.monthly_summary(year, month)?;
    let symbol = context.currency()?;

    output::section(format!("Summary {year}-{month:02}"));
    output::info(format!("Income : {}", output::money(&symbol, summary.totals.income)));
    output::info(format!("Expense: {}", output::money(&symbol, summary.totals.expense)));
    output::info(format!("Net    : {}", output::money(&symbol, summary.totals.net)));
    for category in &summary.categories {
        output::info(format!(
            "  {:<7} {:<16} {:>12} {:>5.1}%",
            category.kind,
            category.category_name,
            output::money(&symbol, category.amount),
            category.percentage
        ));
    }
    Ok(())
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (year, month) = match args {
        [] => current_month(context),
        [raw, ..] => parse_month(raw)?,
    };
    match args {
        [] | [_] => {}
        [_, amount] => {
            context.session.set_monthly_budget(year, month, parse_amount(amount)?)?;
            output::success(format!("Budget for {year}-{month:02} updated."));
        }
        _ => return Err(CommandError::usage("budget [YYYY-MM] [amount]")),
    }

    let usage = context.session.budget_usage(year, month)?;
    let symbol = context.currency()?;
    let line = format!(
        "Budget {year}-{month:02}: spent {} of {} ({:.0}%)",
        output::money(&symbol, usage.spent),
        output::money(&symbol, usage.budget),
        usage.percentage
    );
    match usage.status {
        BudgetStatus::Unset => output::info(format!("No budget set for {year}-{month:02}.")),
        BudgetStatus::Good => output::info(line),
        BudgetStatus::Warning => output::warning(format!("{line}, approaching the limit")),
        BudgetStatus::Exceeded => output::warning(format!("{line}, budget exceeded")),
    }
    Ok(())
}

fn current_month(context: &ShellContext) -> (i32, u32) {
    let today = context.today();
    (today.year(), today.month())
}
