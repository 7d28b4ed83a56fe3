use crate::cli::core::{
    parse_amount, parse_day, CommandError, CommandResult, CommandDef, ShellContext,
};
use crate::cli::output;
use crate::ledger::{Frequency, TemplateInput, TransactionKind};

const ADD_USAGE: &str = "add <description> <amount> <income|expense> <category> <payment> \
<daily|weekly|monthly|yearly> <start YYYY-MM-DD> [end YYYY-MM-DD]";

pub(crate) const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "list",
        usage: "list [income|expense]",
        summary: "List recurring templates",
        run: cmd_list,
    },
    CommandDef {
        name: "add",
        usage: ADD_USAGE,
        summary: "Create a recurring template",
        run: cmd_add,
    },
    CommandDef {
        name: "deactivate",
        usage: "deactivate <id>",
        summary: "Stop a template from firing",
        run: cmd_deactivate,
    },
    CommandDef {
        name: "remove",
        usage: "remove <id>",
        summary: "Delete a template",
        run: cmd_remove,
    },
    CommandDef {
        name: "process",
        usage: "process [YYYY-MM-DD]",
        summary: "Materialize due occurrences",
        run: cmd_process,
    },
];

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = match args {
        [] => None,
        [kind] => Some(kind.parse::<TransactionKind>().map_err(CommandError::InvalidArguments)?),
        _ => return Err(CommandError::usage("list [income|expense]")),
    };
    let templates = context.session.list_templates(kind)?;
    if templates.is_empty() {
        output::info("No recurring templates.");
        return Ok(());
    }
    let symbol = context.currency()?;
    output::section("Recurring templates");
    for template in templates {
        let state = if template.active { "active" } else { "inactive" };
        let ends = template
            .end_date
            .map(|end| format!(" until {}", end.date_naive()))
            .unwrap_or_default();
        output::info(format!(
            "{} {} {} {} {} next {}{} [{}]",
            template.id,
            template.description,
            template.kind,
            output::money(&symbol, template.amount),
            template.frequency,
            template.next_occurrence.date_naive(),
            ends,
            state
        ));
    }
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (description, amount, kind, category, payment, frequency, start, end) = match args {
        [d, a, k, c, p, f, s] => (d, a, k, c, p, f, s, None),
        [d, a, k, c, p, f, s, e] => (d, a, k, c, p, f, s, Some(e)),
        _ => return Err(CommandError::usage(ADD_USAGE)),
    };
    let kind = kind
        .parse::<TransactionKind>()
        .map_err(CommandError::InvalidArguments)?;
    let frequency = frequency
        .parse::<Frequency>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;

    let mut input = TemplateInput::new(
        *description,
        parse_amount(amount)?,
        kind,
        frequency,
        parse_day(start)?,
    )
    .category(*category)
    .payment_method(*payment);
    if let Some(end) = end {
        input = input.ending(parse_day(end)?);
    }

    let template = context.session.add_template(input)?;
    output::success(format!("Added recurring template {}", template.id));
    Ok(())
}

fn cmd_deactivate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(args, "deactivate <id>")?;
    context.session.deactivate_template(id)?;
    output::success(format!("Deactivated template {id}"));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(args, "remove <id>")?;
    context.session.delete_template(id)?;
    output::success(format!("Removed template {id}"));
    Ok(())
}

fn cmd_process(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let as_of = match args {
        [] => context.now(),
        [day] => parse_day(day)?,
        _ => return Err(CommandError::usage("process [YYYY-MM-DD]")),
    };
    let report = context.session.process_due(as_of)?;

    output::success(format!(
        "Materialized {} transaction(s) as of {}",
        report.materialized_count,
        report.as_of.date_naive()
    ));
    for id in &report.retired {
        output::info(format!("Template {id} reached its end date and was deactivated."));
    }
    for skipped in &report.skipped {
        output::warning(format!(
            "Skipped template {}: {}",
            skipped.id.as_deref().unwrap_or("<no id>"),
            skipped.reason
        ));
    }
    for id in &report.truncated {
        output::warning(format!(
            "Template {id} has more due occurrences; run `process` again to continue."
        ));
    }
    Ok(())
}

fn parse_id<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, CommandError> {
    match args {
        [raw] if !raw.trim().is_empty() => Ok(raw.trim()),
        _ => Err(CommandError::usage(usage)),
    }
}
