use std::{
    borrow::Cow,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::commands;
use crate::cli::core::{CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output;
use crate::errors::CliError;

/// Environment variable that switches the shell to reading commands from stdin.
pub const SCRIPT_ENV: &str = "EXPENSE_CORE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    context.catch_up();

    match mode {
        CliMode::Interactive => {
            output::info("Type `help` to list commands.");
            drive(&mut context, &mut EditorLines::new()?)
        }
        CliMode::Script => drive(&mut context, &mut ScriptLines::new(io::stdin().lock())),
    }
}

/// Where the shell gets its command lines from.
trait LineSource {
    /// Next line to run, or `None` once input is exhausted.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>, CliError>;

    fn remember(&mut self, _line: &str) {}
}

struct EditorLines {
    editor: Editor<TokenCompleter, DefaultHistory>,
}

impl EditorLines {
    fn new() -> Result<Self, CliError> {
        let mut editor = Editor::<TokenCompleter, DefaultHistory>::new()?;
        editor.set_helper(Some(TokenCompleter));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(Self { editor })
    }
}

impl LineSource for EditorLines {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => return Ok(Some(line)),
                Err(ReadlineError::Interrupted) => {
                    output::hint("Type `exit` or press Ctrl-D to leave.");
                }
                Err(ReadlineError::Eof) => {
                    output::info("Exiting shell.");
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn remember(&mut self, line: &str) {
        self.editor.add_history_entry(line).ok();
    }
}

/// Reads a script line by line; `#` starts a comment line.
struct ScriptLines<R> {
    reader: R,
}

impl<R: BufRead> ScriptLines<R> {
    fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ScriptLines<R> {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>, CliError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if !line.trim_start().starts_with('#') {
                return Ok(Some(line));
            }
        }
    }
}

/// Runs lines from `source` until it ends or a command asks to exit. A command that moves
/// the session clock forward is followed by a processing pass, so templates that became
/// due in between are materialized the same way a real restart would.
fn drive(context: &mut ShellContext, source: &mut dyn LineSource) -> Result<(), CliError> {
    loop {
        let prompt = context.prompt();
        let Some(line) = source.next_line(&prompt)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        source.remember(line);

        let before = context.now();
        match run_line(context, line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
        if context.now() > before {
            context.catch_up();
        }
    }
    Ok(())
}

fn run_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not parse `{line}`: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.dispatch(&raw.to_lowercase(), raw, &args)
}

/// Completes command names, then the fixed vocabularies some commands take.
struct TokenCompleter;

impl TokenCompleter {
    fn vocabulary(command: &str, position: usize) -> Vec<&'static str> {
        match (command, position) {
            ("help", 1) => commands::table().map(|entry| entry.name).collect(),
            ("list", 1) | ("record", 1) => vec!["income", "expense"],
            ("add", 3) => vec!["income", "expense"],
            ("add", 6) => vec!["daily", "weekly", "monthly", "yearly"],
            ("clock", 1) => vec!["set", "advance"],
            _ => Vec::new(),
        }
    }
}

impl Helper for TokenCompleter {}

impl Completer for TokenCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before
            .rfind(|c: char| c.is_ascii_whitespace())
            .map_or(0, |index| index + 1);
        let needle = before[start..].to_ascii_lowercase();
        let words: Vec<&str> = before[..start].split_whitespace().collect();

        let options = match words.first() {
            None => commands::table().map(|entry| entry.name).collect(),
            Some(command) => Self::vocabulary(&command.to_ascii_lowercase(), words.len()),
        };
        let candidates = options
            .into_iter()
            .filter(|option| option.starts_with(&needle))
            .map(|option| Pair {
                display: option.to_string(),
                replacement: option.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for TokenCompleter {
    type Hint = String;
}

impl Highlighter for TokenCompleter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for TokenCompleter {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
