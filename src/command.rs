//! Bot command recognition

use crate::telegram::MessageEntity;

pub const START: &str = "/start";
pub const END: &str = "/end";

/// Classification of an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NotACommand,
    Start,
    End,
    Unknown(String),
}

/// Classify a message by its first entity and raw text.
///
/// Only the first entity is inspected and its offset/length are not
/// checked. Comparison is case-sensitive; a trailing `@botname` (sent in
/// group chats) is ignored.
pub fn classify(entities: &[MessageEntity], text: &str) -> Command {
    let Some(first) = entities.first() else {
        return Command::NotACommand;
    };
    if !first.is_command() {
        return Command::NotACommand;
    }

    let literal = text.trim();
    let name = literal
        .split_whitespace()
        .next()
        .map(|word| word.split_once('@').map_or(word, |(name, _)| name))
        .unwrap_or_default();

    match name {
        START => Command::Start,
        END => Command::End,
        _ => Command::Unknown(literal.to_string()),
    }
}
