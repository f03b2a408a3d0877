pub mod config;
pub mod session;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use duelgrid_conway::ConwayGame;
use duelgrid_core::codec::{self, SnapshotFormat};
use duelgrid_core::game_trait::{DuelGame, PlayerId, Winner};
use duelgrid_snake::SnakeGame;

use config::{GameKind, RunnerConfig};
use session::{MatchBroadcast, SessionCommand, SessionError, spawn_match};

/// Split a JSON move line into its `playerId` and the game's move type.
pub fn parse_move_line<M: DeserializeOwned>(line: &str) -> Result<(PlayerId, M), SessionError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| SessionError::BadMove(e.to_string()))?;
    let player_id = value
        .get("playerId")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| SessionError::BadMove("missing playerId".to_string()))?
        .to_string();
    let mv = serde_json::from_value(value).map_err(|e| SessionError::BadMove(e.to_string()))?;
    Ok((player_id, mv))
}

/// Forward move lines to the session until input ends. Dropping the sender
/// on EOF stops the match.
async fn forward_moves<M, R>(input: R, cmd_tx: mpsc::UnboundedSender<SessionCommand<M>>)
where
    M: DeserializeOwned,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_move_line::<M>(&line) {
                    Ok((player_id, mv)) => {
                        if cmd_tx.send(SessionCommand::SubmitMove { player_id, mv }).is_err() {
                            break;
                        }
                    },
                    Err(e) => tracing::debug!(error = %e, "Dropped malformed move line"),
                }
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read move input");
                break;
            },
        }
    }
}

/// Snapshots are always written as JSON lines, whatever the session format.
fn to_json_line(format: SnapshotFormat, data: &[u8]) -> Result<Vec<u8>, SessionError> {
    let mut line = match format {
        SnapshotFormat::Json => data.to_vec(),
        SnapshotFormat::Msgpack => {
            let value: serde_json::Value = codec::decode(format, data)?;
            codec::encode(SnapshotFormat::Json, &value)?
        },
    };
    line.push(b'\n');
    Ok(line)
}

/// Register the configured players, run one match fed from `input`, and
/// write every snapshot to `output`. Returns the winner, or `None` when the
/// input ended before the match did.
pub async fn play<G, R, W>(
    mut game: G,
    config: &RunnerConfig,
    input: R,
    mut output: W,
) -> Result<Option<Winner>, SessionError>
where
    G: DuelGame + 'static,
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    for info in config.player_infos() {
        let id = info.id.clone();
        if !game.add_player(info) {
            tracing::warn!(player_id = %id, "Player registration rejected");
        }
    }

    let session = config.session();
    let format = session.format;
    let (cmd_tx, mut broadcast_rx, handle) = spawn_match(game, session)?;
    let reader = tokio::spawn(forward_moves::<G::Move, R>(input, cmd_tx));

    let mut result = Err(SessionError::ChannelClosed);
    while let Some(msg) = broadcast_rx.recv().await {
        match msg {
            MatchBroadcast::Snapshot { data, .. } => {
                output.write_all(&to_json_line(format, &data)?).await?;
                output.flush().await?;
            },
            MatchBroadcast::MatchEnded { winner } => {
                result = Ok(winner);
                break;
            },
        }
    }

    reader.abort();
    handle.await.map_err(|e| SessionError::Task(e.to_string()))?;
    result
}

/// Run the configured game over stdin and stdout.
pub async fn run(config: &RunnerConfig) -> Result<Option<Winner>, SessionError> {
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    match config.game {
        GameKind::Snake => play(SnakeGame::new(), config, input, output).await,
        GameKind::Conway => play(ConwayGame::new(), config, input, output).await,
    }
}
