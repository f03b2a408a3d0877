use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use duelgrid_core::codec::SnapshotFormat;
use duelgrid_core::player::PlayerInfo;

use crate::session::SessionConfig;

/// Which game the runner hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    #[default]
    Snake,
    Conway,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerEntry {
    pub id: String,
    pub name: String,
}

/// Top-level runner configuration, loaded from `config/runner.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub game: GameKind,
    pub players: Vec<PlayerEntry>,
    /// How long a tick waits for missing moves before substituting timeouts.
    pub move_timeout_ms: u64,
    pub format: SnapshotFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            game: GameKind::Snake,
            players: vec![
                PlayerEntry {
                    id: "p1".to_string(),
                    name: "Player1".to_string(),
                },
                PlayerEntry {
                    id: "p2".to_string(),
                    name: "Player2".to_string(),
                },
            ],
            move_timeout_ms: 1000,
            format: SnapshotFormat::Json,
        }
    }
}

impl RunnerConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        duelgrid_core::config::load_or_default("DUELGRID_RUNNER_CONFIG", "config/runner.toml")
    }

    pub fn player_infos(&self) -> Vec<PlayerInfo> {
        self.players
            .iter()
            .map(|p| PlayerInfo::new(p.id.clone(), p.name.clone()))
            .collect()
    }

    /// Session settings for a fresh match.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            match_id: Uuid::new_v4(),
            move_timeout: Duration::from_millis(self.move_timeout_ms),
            format: self.format,
        }
    }
}
