//! Shell context, the command table, dispatch and error reporting.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::config::{Config, ConfigManager};
use crate::core::{Clock, ManualClock, SessionContext};
use crate::errors::{CliError, CoreError};
use crate::storage::JsonFileStore;

use super::commands;
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub(crate) type Handler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// One row of the command table; each `commands` module exports a `COMMANDS` slice.
pub(crate) struct CommandDef {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub run: Handler,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }
}

/// State shared by every command of one shell session.
///
/// The session runs on a [`ManualClock`] seeded with wall-clock time, so `clock set`
/// and `clock advance` can replay how processing behaves on other days.
pub struct ShellContext {
    pub mode: CliMode,
    pub session: SessionContext<JsonFileStore>,
    pub clock: Arc<ManualClock>,
    pub config: Config,
    pub config_manager: ConfigManager,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        Self::with_manager(mode, config_manager)
    }

    pub fn with_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let store = JsonFileStore::new(config_manager.data_dir(&config))?;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let session =
            SessionContext::with_clock(store, &config, Arc::clone(&clock) as Arc<dyn Clock>);

        Ok(Self {
            mode,
            session,
            clock,
            config,
            config_manager,
        })
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn currency(&mut self) -> Result<String, CommandError> {
        Ok(self.session.currency_symbol()?)
    }

    pub(crate) fn prompt(&mut self) -> String {
        let user = self
            .session
            .username()
            .unwrap_or_else(|_| self.config.default_username.clone());
        format!("expense-core ({user} @ {})> ", self.today())
    }

    /// Runs a processing pass at the session clock, reporting only when something
    /// happened. Called at startup and whenever a command moves the clock forward.
    pub(crate) fn catch_up(&mut self) {
        match self.session.process_due_now() {
            Ok(report) if report.materialized_count > 0 => output::info(format!(
                "Caught up {} recurring transaction(s).",
                report.materialized_count
            )),
            Ok(_) => {}
            Err(err) => output::warning(format!("Recurring processing failed: {err}")),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(entry) = commands::find(command) {
            match (entry.run)(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, raw: &str) {
        let needle = raw.to_ascii_lowercase();
        let similar: Vec<&str> = commands::table()
            .map(|entry| entry.name)
            .filter(|name| name.starts_with(&needle) || needle.starts_with(name))
            .collect();
        output::error(format!("Unknown command `{raw}`."));
        if similar.is_empty() {
            output::hint("Type `help` to list commands.");
        } else {
            output::hint(format!("Did you mean: {}?", similar.join(", ")));
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(err) => {
                tracing::debug!(error = ?err, "command failed");
                let storage = err.is_storage();
                output::error(err);
                if storage {
                    output::hint(format!(
                        "Check the data directory {}.",
                        self.config_manager.data_dir(&self.config).display()
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Parses `YYYY-MM-DD` as midnight UTC.
pub(crate) fn parse_day(raw: &str) -> Result<DateTime<Utc>, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{raw}` is not a YYYY-MM-DD date")))
}

/// Parses `YYYY-MM` into a year and a 1-12 month.
pub(crate) fn parse_month(raw: &str) -> Result<(i32, u32), CommandError> {
    let invalid = || CommandError::InvalidArguments(format!("`{raw}` is not a YYYY-MM month"));
    let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

pub(crate) fn parse_amount(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("`{raw}` is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_days_and_months() {
        assert_eq!(
            parse_day("2024-02-29").unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
        assert!(parse_day("2023-02-29").is_err());
        assert_eq!(parse_month("2024-07").unwrap(), (2024, 7));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("July").is_err());
        assert!(parse_amount("12.5").is_ok());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn dispatch_runs_commands_against_a_temp_home() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut shell = ShellContext::with_manager(CliMode::Script, manager).unwrap();

        shell.dispatch("clock", "clock", &["set", "2024-01-22"]).unwrap();
        shell
            .dispatch(
                "add",
                "add",
                &["Gym", "25", "expense", "health", "card", "weekly", "2024-01-01"],
            )
            .unwrap();
        shell.dispatch("process", "process", &[]).unwrap();
        assert_eq!(shell.session.ledger().unwrap().len(), 4);

        let control = shell.dispatch("exit", "exit", &[]).unwrap();
        assert_eq!(control, LoopControl::Exit);
    }

    #[test]
    fn huge_clock_advance_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut shell = ShellContext::with_manager(CliMode::Script, manager).unwrap();
        shell.dispatch("clock", "clock", &["set", "2024-01-22"]).unwrap();

        for days in ["999999999999999", "-999999999999999", "99999999"] {
            let err = shell
                .dispatch("clock", "clock", &["advance", days])
                .expect_err("out-of-range advance must fail");
            assert!(matches!(err, CommandError::InvalidArguments(_)), "{days}: {err:?}");
        }
        assert_eq!(shell.today(), NaiveDate::from_ymd_opt(2024, 1, 22).unwrap());
    }

    #[test]
    fn every_command_name_is_unique() {
        let mut names: Vec<&str> = commands::table().map(|entry| entry.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert!(commands::find("record").is_some());
        assert!(commands::find("frobnicate").is_none());
    }
}
