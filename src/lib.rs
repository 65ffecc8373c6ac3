use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use config::Config;
use serenity::model::prelude::UnavailableGuild;
use serenity::prelude::{Mutex, TypeMapKey};
use statistics::{Event, GlobalStatistics, StatisticsStore};

pub mod commands;
pub mod config;
pub mod statistics;
pub mod system;

/// Holds the configuration and the global statistics at all time
#[derive(Debug)]
pub struct State {
    pub config: Config,              // A global config
    pub statistics: StatisticsStore, // The counters displayed by /information
    pub ready_at: Option<Instant>,   // When the client first became ready
}

impl TypeMapKey for State {
    type Value = Arc<Mutex<Self>>;
}

/// What a command can read from the state, copied so the lock isn't held while it runs
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub config: Config,
    pub global: GlobalStatistics,
    pub database_online: bool,
    pub uptime: Duration,
}

impl State {
    pub fn new(config: Config, statistics: StatisticsStore) -> Self {
        State {
            config,
            statistics,
            ready_at: None,
        }
    }

    pub fn from_config_files() -> Result<Self> {
        let config_folder = "./config";
        let config = Config::from(&format!("{}/config.json", config_folder))?;
        let statistics = StatisticsStore::open(&config.statistics_path)
            .context("Could not load the global statistics")?;
        Ok(State::new(config, statistics))
    }

    /// Remember when the client became ready
    /// Reconnections fire `ready` again, uptime keeps counting from the first one
    pub fn mark_ready(&mut self, now: Instant) {
        self.ready_at.get_or_insert(now);
    }

    /// Time elapsed since the client became ready, zero if it isn't yet
    pub fn uptime(&self) -> Duration {
        self.ready_at.map(|at| at.elapsed()).unwrap_or_default()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            config: self.config.clone(),
            global: self.statistics.global(),
            database_online: self.statistics.network_status(),
            uptime: self.uptime(),
        }
    }
}

/// Run a command on a snapshot of the state, then count its outcome
/// The lock is only held to take the snapshot and to record the outcome
pub async fn run_command<F, Fut>(state: &Mutex<State>, run: F) -> Result<()>
where
    F: FnOnce(Snapshot) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let snapshot = state.lock().await.snapshot();
    let result = run(snapshot).await;
    state.lock().await.statistics.record(outcome(&result));
    result
}

/// Does the deletion of this guild mean the bot was removed from it?
/// An unavailable guild is an outage, not a removal
pub fn leave_counts(guild: &UnavailableGuild) -> bool {
    !guild.unavailable
}

/// The counter to bump once a command ran
pub fn outcome(result: &Result<()>) -> Event {
    match result {
        Ok(()) => Event::CommandExecuted,
        Err(_) => Event::CommandFailed,
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use anyhow::anyhow;
    use serenity::{
        model::{permissions::Permissions, prelude::UnavailableGuild},
        prelude::Mutex,
    };

    use super::{leave_counts, outcome, run_command, State};
    use crate::{
        commands::{information::check_bot_permissions, parser::information_kind},
        config::Config,
        statistics::{Event, StatisticsStore},
    };

    fn state(dir: &tempfile::TempDir) -> State {
        let config: Config = serde_json::from_value(serde_json::json!({
            "invite_url": "https://invite",
            "repository_url": "https://repo",
            "website_url": "https://site",
            "primary_color": 0,
            "company_bio": "",
            "bot_bio": "",
        }))
        .unwrap();
        let statistics = StatisticsStore::open(dir.path().join("statistics.json")).unwrap();
        State::new(config, statistics)
    }

    fn unavailable_guild(unavailable: bool) -> UnavailableGuild {
        serde_json::from_value(serde_json::json!({
            "id": "81384788765712384",
            "unavailable": unavailable,
        }))
        .unwrap()
    }

    #[test]
    fn mark_ready_keeps_first_instant_on_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        assert_eq!(state.uptime(), Duration::ZERO);

        let first = Instant::now();
        state.mark_ready(first);
        state.mark_ready(first + Duration::from_secs(30));
        assert_eq!(state.ready_at, Some(first));
    }

    #[test]
    fn snapshot_copies_counters() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(&dir);
        state.statistics.record(Event::GuildJoined);
        state.mark_ready(Instant::now());

        let snapshot = state.snapshot();
        state.statistics.record(Event::GuildJoined);
        assert_eq!(snapshot.global.guilds_joined, 1);
        assert!(snapshot.database_online);
        assert_eq!(snapshot.config.repository_url, "https://repo");
    }

    #[tokio::test]
    async fn run_command_releases_the_lock_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let state = Mutex::new(state(&dir));
        let shared = &state;

        let result = run_command(&state, |snapshot| async move {
            // A guild event arriving mid-command must not wait
            shared
                .try_lock()
                .expect("state should be unlocked")
                .statistics
                .record(Event::GuildJoined);
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_eq!(snapshot.global.guilds_joined, 0);
            Ok(())
        })
        .await;

        assert!(result.is_ok());
        let global = state.lock().await.statistics.global();
        assert_eq!(global.guilds_joined, 1);
        assert_eq!(global.commands_executed, 1);
        assert_eq!(global.commands_failed, 0);
    }

    #[tokio::test]
    async fn run_command_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let state = Mutex::new(state(&dir));

        let result =
            run_command(&state, |_| async { Err(anyhow!("Failed to write message")) }).await;

        assert!(result.is_err());
        let global = state.lock().await.statistics.global();
        assert_eq!(global.commands_executed, 0);
        assert_eq!(global.commands_failed, 1);
    }

    #[test]
    fn leave_counts_only_removals() {
        assert!(leave_counts(&unavailable_guild(false)));
        assert!(!leave_counts(&unavailable_guild(true)));
    }

    #[test]
    fn outcome_of_commands() {
        assert_eq!(outcome(&Ok(())), Event::CommandExecuted);
        assert_eq!(outcome(&Err(anyhow!("Failed to write message"))), Event::CommandFailed);
    }

    #[test]
    fn invalid_information_type_counts_as_failed() {
        let result = information_kind(&[]).map(|_| ());
        assert_eq!(outcome(&result), Event::CommandFailed);
    }

    #[test]
    fn missing_bot_permissions_counts_as_failed() {
        let result = check_bot_permissions(Some(Permissions::SEND_MESSAGES));
        assert_eq!(outcome(&result), Event::CommandFailed);
        let result = check_bot_permissions(Some(Permissions::all()));
        assert_eq!(outcome(&result), Event::CommandExecuted);
    }
}
