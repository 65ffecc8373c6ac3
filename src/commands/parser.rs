use anyhow::{bail, Result};
use serenity::model::prelude::interaction::application_command::{
    CommandDataOption, CommandDataOptionValue,
};
use thiserror::Error;

use crate::commands::{information::InformationKind, CommandKind};

/// Returned when the parsing of a command failed
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("Unknown command")]
    UnknownCommand,
    #[error("Missing option '{0}'")]
    MissingOption(&'static str),
    #[error("Invalid choice '{0}'")]
    InvalidChoice(String),
}

/// Find out which command an interaction is for, based on its name
pub fn parse(name: &str) -> Result<CommandKind> {
    match name {
        "help" => Ok(CommandKind::Help),
        "ping" => Ok(CommandKind::Ping),
        "information" => Ok(CommandKind::Information),
        _ => bail!(ParsingError::UnknownCommand),
    }
}

/// Read the `type` option of the information command
pub fn information_kind(options: &[CommandDataOption]) -> Result<InformationKind> {
    let value = options
        .iter()
        .find(|option| option.name == "type")
        .and_then(|option| option.resolved.as_ref());

    match value {
        Some(CommandDataOptionValue::String(choice)) => match choice.as_str() {
            "bot" => Ok(InformationKind::Bot),
            "company" => Ok(InformationKind::Company),
            other => bail!(ParsingError::InvalidChoice(other.to_string())),
        },
        Some(_) => bail!(ParsingError::InvalidChoice("not a string".to_string())),
        None => bail!(ParsingError::MissingOption("type")),
    }
}
