use crate::cli::commands;
use crate::cli::core::{CommandError, CommandResult, CommandDef, ShellContext};
use crate::cli::output;
use crate::utils::build_info;

pub(crate) const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: "help",
        usage: "help [command]",
        summary: "Show available commands",
        run: cmd_help,
    },
    CommandDef {
        name: "version",
        usage: "version",
        summary: "Show build metadata",
        run: cmd_version,
    },
    CommandDef {
        name: "exit",
        usage: "exit",
        summary: "Exit the shell",
        run: cmd_exit,
    },
];

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match commands::find(&name.to_ascii_lowercase()) {
            Some(entry) => {
                output::section(entry.name);
                output::info(entry.summary);
                output::info(format!("usage: {}", entry.usage));
            }
            None => context.suggest_command(name),
        }
        return Ok(());
    }

    output::section("Commands");
    for entry in commands::table() {
        output::info(format!("  {:<12} {}", entry.name, entry.summary));
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Expense Core {}", meta.version));
    output::info(format!("  Build hash : {} ({})", meta.git_hash, meta.git_status));
    output::info(format!("  Built at   : {}", meta.timestamp));
    output::info(format!("  Profile    : {}", meta.profile));
    output::info(format!("  Rustc      : {}", meta.rustc));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::info("Exiting shell.");
    Err(CommandError::ExitRequested)
}
