use std::env;
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use serenity::client::{Context, EventHandler};
use serenity::model::application::command::Command as ApplicationCommand;
use serenity::model::prelude::interaction::Interaction;
use serenity::model::prelude::{Guild, GuildId, Ready, UnavailableGuild};
use serenity::prelude::{GatewayIntents, Mutex};
use serenity::{async_trait, Client};
use tracing::{error, info, warn};
use whisper_bot::commands::parser::parse;
use whisper_bot::commands::register_all;
use whisper_bot::statistics::Event;
use whisper_bot::{leave_counts, run_command, State};

struct Handler;

/// Get the global state stored in the client data
async fn get_state(ctx: &Context) -> Option<Arc<Mutex<State>>> {
    let state = ctx.data.read().await.get::<State>().cloned();
    if state.is_none() {
        error!("Global state is missing from the client data");
    }
    state
}

#[async_trait]
impl EventHandler for Handler {
    /// Handler for the `ready` event
    /// Called when the bot is connected, registers the slash commands
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        let Some(state) = get_state(&ctx).await else {
            return;
        };
        let dev_guild = {
            let mut state = state.lock().await;
            state.mark_ready(Instant::now());
            state
                .config
                .canary
                .then_some(state.config.dev_guild_id)
                .flatten()
        };

        let registered = match dev_guild {
            Some(id) => {
                info!("Canary mode, registering commands in guild {id}");
                GuildId(id)
                    .set_application_commands(&ctx.http, register_all)
                    .await
            }
            None => {
                info!("Registering global commands");
                ApplicationCommand::set_global_application_commands(&ctx.http, register_all).await
            }
        };
        match registered {
            Ok(commands) => info!("Registered {} commands", commands.len()),
            Err(e) => error!("Failed to register commands: {e}"),
        }
    }

    /// Handler for the `guild_create` event
    /// Also called for every guild at startup, only new guilds are counted
    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: bool) {
        if !is_new {
            return;
        }
        info!("Joined guild {}", guild.name);
        if let Some(state) = get_state(&ctx).await {
            state.lock().await.statistics.record(Event::GuildJoined);
        }
    }

    /// Handler for the `guild_delete` event
    async fn guild_delete(&self, ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        if !leave_counts(&incomplete) {
            warn!("Guild {} became unavailable", incomplete.id);
            return;
        }
        info!("Left guild {}", incomplete.id);
        if let Some(state) = get_state(&ctx).await {
            state.lock().await.statistics.record(Event::GuildLeft);
        }
    }

    /// Handler for the `interaction_create` event
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };
        let kind = match parse(&command.data.name) {
            Ok(kind) => kind,
            Err(e) => {
                warn!("Received '{}': {e}", command.data.name);
                return;
            }
        };
        let Some(state) = get_state(&ctx).await else {
            return;
        };

        info!("Received '{kind}' command from {}", command.user.name);
        let (ctx, command) = (&ctx, &command);
        let result = run_command(&state, |snapshot| async move {
            kind.run(ctx, command, &snapshot).await
        })
        .await;
        match result {
            Ok(()) => info!("Executed {kind} command successfully"),
            Err(e) => error!("Failed to execute {kind} command: {e:#}"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Setup tracing
    let subscriber = tracing_subscriber::FmtSubscriber::new();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eprintln!("Unable to set global default subscriber: {e}"))
        .ok();

    // Get the discord token from a .env file
    dotenv::dotenv().ok();
    let token = env::var("DISCORD_TOKEN").unwrap_or_else(|e| {
        error!("Expected a discord token in the .env file: {e}");
        exit(1);
    });
    info!("Found discord token in .env file");

    // Guild events feed the cache and the joined/left counters
    // GUILD_MEMBERS is privileged, so cached users are those seen in guild payloads
    let intents = GatewayIntents::GUILDS;

    // Create a new instance of the Client, logging in as a bot.
    let mut client = Client::builder(&token, intents)
        .event_handler(Handler)
        .await
        .unwrap_or_else(|e| {
            error!("Error creating client: {e}");
            exit(1);
        });
    info!("Client is setup");

    // Parse the config files and load the statistics
    let state = match State::from_config_files() {
        Ok(s) => s,
        Err(e) => {
            error!("An error occurred while loading your config files: {e:#}");
            exit(1);
        }
    };
    info!("Config files loaded successfully");

    // Add our global state to the client
    // Wrapped in a block to close the write lock before starting the client
    {
        let mut data = client.data.write().await;
        data.insert::<State>(Arc::new(Mutex::new(state)));
    }
    // Finally, start a single shard, and start listening to events.
    if let Err(err) = client.start().await {
        error!("Client error: {:?}", err);
        exit(1);
    }
}
