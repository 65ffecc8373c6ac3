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

pub struct Help;

#[async_trait]
impl Command for Help {
    async fn run(
        ctx: &serenity::prelude::Context,
        command: &ApplicationCommandInteraction,
        snapshot: &Snapshot,
    ) -> Result<()> {
        command
            .create_interaction_response(ctx, |c| {
                c.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| {
                        m.ephemeral(true).embed(|e| {
                            e.title("HELP")
                                .colour(snapshot.config.primary_color)
                                .fields(vec![
                                    ("/help", "Display this help message", false),
                                    (
                                        "/ping",
                                        "Ping the bot to check if it is still available",
                                        false,
                                    ),
                                    (
                                        "/information bot",
                                        "Show the bot's runtime statistics: CPU, memory, \
                                        uptime, cache and command counters",
                                        false,
                                    ),
                                    (
                                        "/information company",
                                        "Learn about the people behind the bot",
                                        false,
                                    ),
                                ])
                        })
                    })
            })
            .await
            .context("Failed to write message")
    }

    fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
        command.name("help").description("Display a help message")
    }
}
