use chrono::Duration;

use crate::cli::core::{parse_day, CommandError, CommandResult, CommandDef, ShellContext};
use crate::cli::output;

const CLOCK_USAGE: &str = "clock [set <YYYY-MM-DD> | advance <days>]";

pub(crate) const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "clock",
        usage: CLOCK_USAGE,
        summary: "Show or move the session clock; moving forward catches up due templates",
        run: cmd_clock,
    },
    CommandDef {
        name: "user",
        usage: "user [name]",
        summary: "Show or change the user name",
        run: cmd_user,
    },
    CommandDef {
        name: "currency",
        usage: "currency [symbol]",
        summary: "Show or change the currency symbol",
        run: cmd_currency,
    },
    CommandDef {
        name: "reset",
        usage: "reset",
        summary: "Delete every stored record",
        run: cmd_reset,
    },
];

fn cmd_clock(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        ["set", day] => context.clock.set(parse_day(day)?),
        ["advance", raw] => {
            let out_of_range =
                || CommandError::InvalidArguments(format!("`{raw}` days is out of range"));
            let days = raw
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a day count")))?;
            let by = Duration::try_days(days).ok_or_else(out_of_range)?;
            context.clock.advance(by).ok_or_else(out_of_range)?;
        }
        _ => return Err(CommandError::usage(CLOCK_USAGE)),
    }
    output::info(format!("Clock: {}", context.now().format("%Y-%m-%d %H:%M:%S UTC")));
    Ok(())
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if !args.is_empty() {
        context.session.set_username(&args.join(" "))?;
        output::success("User name updated.");
    }
    output::info(format!("User: {}", context.session.username()?));
    Ok(())
}

fn cmd_currency(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [symbol] => {
            context.session.set_currency_symbol(symbol)?;
            output::success("Currency symbol updated.");
        }
        _ => return Err(CommandError::usage("currency [symbol]")),
    }
    output::info(format!("Currency: {}", context.currency()?));
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.session.clear_all_data()?;
    output::success("All data cleared.");
    Ok(())
}
