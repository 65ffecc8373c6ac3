use anyhow::{Context, Result};
use async_trait::async_trait;
use serenity::{
    builder::CreateApplicationCommand,
    model::prelude::interaction::{
        application_command::ApplicationCommandInteraction, InteractionResponseType,
    },
};

use crate::Snapshot;

use super::Command;

/// Used for checking the bot is up and running
/// The bot will only answer with "Pong!"
pub struct Ping;

#[async_trait]
impl Command for Ping {
    async fn run(
        ctx: &serenity::prelude::Context,
        command: &ApplicationCommandInteraction,
        _snapshot: &Snapshot,
    ) -> Result<()> {
        command
            .create_interaction_response(ctx, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|d| d.content("Pong!"))
            })
            .await
            .context("Failed to write message")
    }

    fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
        command
            .name("ping")
            .description("Ping the bot to check if it is still available")
    }
}
