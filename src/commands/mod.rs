//! Registry of satchel's built-in commands.

pub mod doctor;

use crate::command::Command;

/// Every built-in command, in display order.
pub fn all() -> Vec<Command> {
    vec![doctor::command()]
}

/// Look a command up by name.
pub fn find(name: &str) -> Option<Command> {
    all().into_iter().find(|command| command.name() == name)
}
