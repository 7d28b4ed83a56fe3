mod records;
mod session;
mod system;
mod templates;

use crate::cli::core::CommandDef;

/// Every shell command, in `help` order.
pub(crate) fn table() -> impl Iterator<Item = &'static CommandDef> {
    system::COMMANDS
        .iter()
        .chain(session::COMMANDS)
        .chain(templates::COMMANDS)
        .chain(records::COMMANDS)
}

pub(crate) fn find(name: &str) -> Option<&'static CommandDef> {
    table().find(|entry| entry.name == name)
}
