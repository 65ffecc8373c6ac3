use std::fmt::Display;

use anyhow::Result;
use async_trait::async_trait;
use serenity::{
    builder::{CreateApplicationCommand, CreateApplicationCommands},
    model::prelude::interaction::application_command::ApplicationCommandInteraction,
    prelude::Context,
};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::Snapshot;

pub mod help;
pub mod information;
pub mod parser;
pub mod ping;
pub mod utils;

/// A slash command the bot knows how to register and answer
#[async_trait]
pub trait Command {
    async fn run(
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        snapshot: &Snapshot,
    ) -> Result<()>;

    fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand;
}

/// The type of commands that can be used with this bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum CommandKind {
    Help,
    Ping,
    Information,
}

impl Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl CommandKind {
    /// Number of commands registered by the bot
    pub fn count() -> usize {
        CommandKind::iter().count()
    }

    /// Run the command matching this kind
    pub async fn run(
        self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        snapshot: &Snapshot,
    ) -> Result<()> {
        match self {
            CommandKind::Help => help::Help::run(ctx, command, snapshot).await,
            CommandKind::Ping => ping::Ping::run(ctx, command, snapshot).await,
            CommandKind::Information => {
                information::Information::run(ctx, command, snapshot).await
            }
        }
    }

    fn register(self, command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
        match self {
            CommandKind::Help => help::Help::register(command),
            CommandKind::Ping => ping::Ping::register(command),
            CommandKind::Information => information::Information::register(command),
        }
    }
}

/// Add every command of the bot to the set of commands to register
pub fn register_all(commands: &mut CreateApplicationCommands) -> &mut CreateApplicationCommands {
    CommandKind::iter().for_each(|kind| {
        commands.create_application_command(|command| kind.register(command));
    });
    commands
}
