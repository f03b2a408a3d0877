use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use duelgrid_core::codec::{self, CodecError, SnapshotFormat};
use duelgrid_core::game_trait::{DuelGame, PlayerId, Winner};

/// Commands sent from a transport to the match loop.
#[derive(Debug)]
pub enum SessionCommand<M> {
    SubmitMove { player_id: PlayerId, mv: M },
    Stop,
}

/// Broadcasts sent from the match loop to observers.
#[derive(Debug, Clone)]
pub enum MatchBroadcast {
    /// Encoded snapshot taken after `tick` ticks (0 is the initial state).
    Snapshot { tick: u32, data: Bytes },
    /// The loop has exited. `winner` is `None` when the match was stopped
    /// before a result.
    MatchEnded { winner: Option<Winner> },
}

/// Configuration for one match session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub match_id: Uuid,
    pub move_timeout: Duration,
    pub format: SnapshotFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            match_id: Uuid::new_v4(),
            move_timeout: Duration::from_secs(1),
            format: SnapshotFormat::Json,
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    WrongPlayerCount(usize),
    ChannelClosed,
    BadMove(String),
    Codec(CodecError),
    Io(std::io::Error),
    Task(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongPlayerCount(n) => write!(f, "a match needs exactly 2 players, got {n}"),
            Self::ChannelClosed => write!(f, "match loop closed its channel unexpectedly"),
            Self::BadMove(e) => write!(f, "malformed move: {e}"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Task(e) => write!(f, "match task failed: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CodecError> for SessionError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type MatchHandles<M> = (
    mpsc::UnboundedSender<SessionCommand<M>>,
    mpsc::UnboundedReceiver<MatchBroadcast>,
    JoinHandle<()>,
);

/// Spawn the match loop for a game with both players registered.
/// Returns the command sender and broadcast receiver.
pub fn spawn_match<G>(game: G, config: SessionConfig) -> Result<MatchHandles<G::Move>, SessionError>
where
    G: DuelGame + 'static,
{
    let players = game.player_ids().len();
    if players != 2 {
        return Err(SessionError::WrongPlayerCount(players));
    }

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        run_match_loop(game, config, cmd_rx, broadcast_tx).await;
    });

    Ok((cmd_tx, broadcast_rx, handle))
}

fn broadcast_snapshot<G: DuelGame>(
    game: &G,
    format: SnapshotFormat,
    broadcast_tx: &mpsc::UnboundedSender<MatchBroadcast>,
) {
    let tick = game.move_count();
    match codec::encode(format, &game.snapshot()) {
        Ok(data) => {
            let _ = broadcast_tx.send(MatchBroadcast::Snapshot {
                tick,
                data: Bytes::from(data),
            });
        },
        Err(e) => tracing::error!(tick, error = %e, "Failed to encode snapshot"),
    }
}

/// The match loop. The game is only touched here, so every snapshot is
/// taken between ticks.
async fn run_match_loop<G: DuelGame>(
    mut game: G,
    config: SessionConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand<G::Move>>,
    broadcast_tx: mpsc::UnboundedSender<MatchBroadcast>,
) {
    let match_id = config.match_id;
    let players = game.player_ids();
    tracing::info!(%match_id, game = %game.metadata().name, "Match started");
    broadcast_snapshot(&game, config.format, &broadcast_tx);

    let mut pending: HashMap<PlayerId, G::Move> = HashMap::with_capacity(players.len());

    'ticks: while !game.is_over() {
        let deadline = tokio::time::Instant::now() + config.move_timeout;
        while pending.len() < players.len() {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::SubmitMove { player_id, mv }) => {
                            if !players.contains(&player_id) {
                                tracing::debug!(%match_id, %player_id, "Dropped move from unknown player");
                            } else if pending.contains_key(&player_id) {
                                tracing::debug!(%match_id, %player_id, "Dropped duplicate move");
                            } else {
                                pending.insert(player_id, mv);
                            }
                        },
                        Some(SessionCommand::Stop) | None => {
                            tracing::info!(%match_id, tick = game.move_count(), "Match stopped");
                            break 'ticks;
                        },
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    break;
                }
            }
        }

        let batch: Vec<G::Move> = players
            .iter()
            .map(|id| {
                pending.remove(id).unwrap_or_else(|| {
                    tracing::debug!(%match_id, player_id = %id, "Move timed out");
                    game.timeout_move(id)
                })
            })
            .collect();

        if !game.process_moves(&batch) {
            tracing::warn!(%match_id, "Game rejected a tick, ending match");
            break;
        }
        broadcast_snapshot(&game, config.format, &broadcast_tx);
    }

    let winner = game.winner().cloned();
    tracing::info!(%match_id, ?winner, ticks = game.move_count(), "Match ended");
    let _ = broadcast_tx.send(MatchBroadcast::MatchEnded { winner });
}
