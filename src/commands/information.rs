use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serenity::{
    builder::{CreateApplicationCommand, CreateEmbed},
    model::{
        permissions::Permissions,
        prelude::{
            command::CommandOptionType,
            interaction::{
                application_command::ApplicationCommandInteraction, InteractionResponseType,
            },
        },
    },
};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::{info, warn};

use crate::{
    commands::{
        parser::information_kind,
        utils::{format_duration, link_buttons, missing_permissions, reply_ephemeral},
        CommandKind,
    },
    config::Config,
    statistics::GlobalStatistics,
    system::{Percentage, ProcessUsage},
    Snapshot,
};

use super::Command;

const LIBRARY: &str = "[serenity-v0.11](https://github.com/serenity-rs/serenity)";

/// What the bot needs to be allowed to do to answer
fn required_bot_permissions() -> Permissions {
    Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS
}

/// Fail when the interaction says the bot lacks permissions it needs to answer
/// Interactions that don't report permissions are let through
pub fn check_bot_permissions(granted: Option<Permissions>) -> Result<()> {
    let Some(granted) = granted else {
        return Ok(());
    };
    let missing = missing_permissions(granted, required_bot_permissions());
    if !missing.is_empty() {
        bail!(
            "Missing bot permissions: {}",
            missing.get_permission_names().join(", ")
        );
    }
    Ok(())
}

/// The two pages of information the command can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum InformationKind {
    Bot,
    Company,
}

impl InformationKind {
    /// Name of the choice as displayed in Discord
    fn label(self) -> &'static str {
        match self {
            InformationKind::Bot => "Bot",
            InformationKind::Company => "Company",
        }
    }

    /// Value sent back by Discord when the choice is picked
    fn value(self) -> &'static str {
        match self {
            InformationKind::Bot => "bot",
            InformationKind::Company => "company",
        }
    }
}

/// Everything displayed by the bot page
#[derive(Debug, Clone)]
pub struct BotStatistics {
    pub cpu: Percentage,
    pub memory: Percentage,
    pub uptime: Duration,
    pub guilds_cached: usize,
    pub users_cached: usize,
    pub database_online: bool,
    pub total_commands: usize,
    pub global: GlobalStatistics,
}

impl BotStatistics {
    pub fn fields(&self) -> Vec<(&'static str, String, bool)> {
        let database_state = if self.database_online {
            "Online"
        } else {
            "Offline"
        };
        vec![
            ("CPU Usage", self.cpu.to_string(), true),
            ("Memory Usage", self.memory.to_string(), true),
            ("Uptime", format_duration(self.uptime), true),
            ("Guilds Cached", self.guilds_cached.to_string(), true),
            ("Guilds Joined", self.global.guilds_joined.to_string(), true),
            ("Guilds Left", self.global.guilds_left.to_string(), true),
            ("Users Cached", self.users_cached.to_string(), true),
            ("Discord API Library", LIBRARY.to_string(), true),
            ("Database State", database_state.to_string(), true),
            ("Total Commands", self.total_commands.to_string(), true),
            (
                "Commands Executed",
                self.global.commands_executed.to_string(),
                true,
            ),
            ("Commands Failed", self.global.commands_failed.to_string(), true),
        ]
    }
}

fn company_embed(config: &Config) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed
        .title("Company Statistics")
        .description("About the developers of Whisper Room")
        .field("Us", &config.company_bio, true)
        .field("Bot", &config.bot_bio, true)
        .colour(config.primary_color);
    embed
}

fn bot_embed(config: &Config, statistics: &BotStatistics) -> CreateEmbed {
    let mut embed = CreateEmbed::default();
    embed
        .title("Bot Statistics")
        .description("Displaying current data below")
        .colour(config.primary_color)
        .fields(statistics.fields());
    embed
}

pub struct Information;

#[async_trait]
impl Command for Information {
    async fn run(
        ctx: &serenity::prelude::Context,
        command: &ApplicationCommandInteraction,
        snapshot: &Snapshot,
    ) -> Result<()> {
        if let Err(e) = check_bot_permissions(command.app_permissions) {
            warn!("Cannot answer /information: {e}");
            reply_ephemeral(ctx, command, &format!("I can't answer here. {e}")).await?;
            return Err(e);
        }

        let kind = information_kind(&command.data.options)?;
        info!("Displaying {kind:?} information");

        let embed = match kind {
            InformationKind::Company => company_embed(&snapshot.config),
            InformationKind::Bot => {
                let usage = ProcessUsage::sample().await;
                let statistics = BotStatistics {
                    cpu: usage.cpu,
                    memory: usage.memory,
                    uptime: snapshot.uptime,
                    guilds_cached: ctx.cache.guild_count(),
                    users_cached: ctx.cache.user_count(),
                    database_online: snapshot.database_online,
                    total_commands: CommandKind::count(),
                    global: snapshot.global.clone(),
                };
                bot_embed(&snapshot.config, &statistics)
            }
        };

        command
            .create_interaction_response(ctx, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|d| {
                        d.add_embed(embed)
                            .components(|c| c.add_action_row(link_buttons(&snapshot.config)))
                    })
            })
            .await
            .context("Failed to write message")
    }

    fn register(command: &mut CreateApplicationCommand) -> &mut CreateApplicationCommand {
        command
            .name("information")
            .description("View information about the bot and its services")
            .dm_permission(false)
            .default_member_permissions(Permissions::SEND_MESSAGES)
            .create_option(|option| {
                option
                    .name("type")
                    .description("The type of statistics to show")
                    .kind(CommandOptionType::String)
                    .required(true);
                InformationKind::iter().for_each(|kind| {
                    option.add_string_choice(kind.label(), kind.value());
                });
                option
            })
    }
}
