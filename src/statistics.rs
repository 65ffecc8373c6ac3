use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

/// Returned when the statistics document can't be read or written
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid statistics document {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The counters shared by every instance of the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStatistics {
    pub id: String,
    pub guilds_joined: u64,
    pub guilds_left: u64,
    pub commands_executed: u64,
    pub commands_failed: u64,
}

impl Default for GlobalStatistics {
    fn default() -> Self {
        GlobalStatistics {
            id: "global".to_string(),
            guilds_joined: 0,
            guilds_left: 0,
            commands_executed: 0,
            commands_failed: 0,
        }
    }
}

/// Something worth counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    GuildJoined,
    GuildLeft,
    CommandExecuted,
    CommandFailed,
}

/// Keeps the global statistics document in memory and mirrors it to a JSON file
#[derive(Debug)]
pub struct StatisticsStore {
    path: PathBuf,
    global: GlobalStatistics,
    online: bool, // Whether the last access to the file succeeded
}

impl StatisticsStore {
    /// Load the document at `path`, starting from zero if it doesn't exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let global = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No statistics found at {}, starting from zero", path.display());
                GlobalStatistics::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(StatisticsStore {
            path,
            global,
            online: true,
        })
    }

    /// A snapshot of the current counters
    pub fn global(&self) -> GlobalStatistics {
        self.global.clone()
    }

    /// Is the document still reachable?
    pub fn network_status(&self) -> bool {
        self.online
    }

    /// Increment the counter matching the event and save the document
    pub fn record(&mut self, event: Event) {
        let counter = match event {
            Event::GuildJoined => &mut self.global.guilds_joined,
            Event::GuildLeft => &mut self.global.guilds_left,
            Event::CommandExecuted => &mut self.global.commands_executed,
            Event::CommandFailed => &mut self.global.commands_failed,
        };
        *counter += 1;

        match self.save() {
            Ok(()) => self.online = true,
            Err(e) => {
                error!("Failed to save statistics after {event:?}: {e}");
                self.online = false;
            }
        }
    }

    /// Where the next version of the document is written before replacing the current one
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the document next to the current one, then rename it over
    /// A crash mid-write leaves the previous document intact
    fn save(&self) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(&self.global).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, content).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
