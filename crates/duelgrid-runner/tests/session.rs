use std::io::Cursor;
use std::time::Duration;

use duelgrid_core::codec::{self, SnapshotFormat};
use duelgrid_core::game_trait::{DuelGame, Winner};
use duelgrid_core::grid::Direction;
use duelgrid_core::test_helpers::{make_players, register_two};
use duelgrid_conway::ConwayGame;
use duelgrid_conway::config::ConwayConfig;
use duelgrid_runner::config::{GameKind, RunnerConfig};
use duelgrid_runner::play;
use duelgrid_runner::session::{
    MatchBroadcast, SessionCommand, SessionConfig, SessionError, spawn_match,
};
use duelgrid_snake::SnakeGame;
use duelgrid_snake::config::SnakeConfig;
use duelgrid_snake::player::SnakeMove;

fn snake_config(max_moves: u32) -> SnakeConfig {
    SnakeConfig {
        max_moves,
        item_spawn_chance: 0.0,
        seed: Some(11),
        ..SnakeConfig::default()
    }
}

fn snake_game(max_moves: u32) -> SnakeGame {
    let mut game = SnakeGame::with_config(snake_config(max_moves));
    register_two(&mut game);
    game
}

fn session(timeout_ms: u64) -> SessionConfig {
    SessionConfig {
        move_timeout: Duration::from_millis(timeout_ms),
        ..SessionConfig::default()
    }
}

fn expect_snapshot(msg: Option<MatchBroadcast>) -> (u32, serde_json::Value) {
    match msg {
        Some(MatchBroadcast::Snapshot { tick, data }) => {
            let value = codec::decode(SnapshotFormat::Json, &data).expect("snapshot should decode");
            (tick, value)
        },
        other => panic!("expected a snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn match_needs_two_players() {
    let mut game = SnakeGame::with_config(snake_config(10));
    game.add_player(make_players(1).remove(0));
    let err = spawn_match(game, session(10)).unwrap_err();
    assert!(matches!(err, SessionError::WrongPlayerCount(1)));
}

#[tokio::test]
async fn initial_snapshot_then_one_per_tick() {
    let (cmd_tx, mut rx, handle) = spawn_match(snake_game(2), session(5_000)).expect("should spawn");

    let (tick, state) = expect_snapshot(rx.recv().await);
    assert_eq!(tick, 0);
    assert_eq!(state["moveCount"], 0);

    for expected in 1..=2 {
        cmd_tx
            .send(SessionCommand::SubmitMove {
                player_id: "p1".to_string(),
                mv: SnakeMove::new("p1", Direction::Right),
            })
            .unwrap();
        cmd_tx
            .send(SessionCommand::SubmitMove {
                player_id: "p2".to_string(),
                mv: SnakeMove::new("p2", Direction::Left),
            })
            .unwrap();
        let (tick, state) = expect_snapshot(rx.recv().await);
        assert_eq!(tick, expected);
        assert_eq!(state["moveCount"], expected);
    }

    // Symmetric moves to the ceiling end level.
    match rx.recv().await {
        Some(MatchBroadcast::MatchEnded { winner }) => assert_eq!(winner, Some(Winner::Draw)),
        other => panic!("expected MatchEnded, got {other:?}"),
    }
    handle.await.unwrap();
}

#[tokio::test]
async fn missing_moves_are_timed_out() {
    let (cmd_tx, mut rx, handle) = spawn_match(snake_game(50), session(20)).expect("should spawn");
    let _ = rx.recv().await;

    let (tick, state) = expect_snapshot(rx.recv().await);
    assert_eq!(tick, 1);
    let penalty = SnakeConfig::default().illegal_move_penalty;
    let expected = SnakeConfig::default().players_starting_score - penalty;
    assert_eq!(state["players"][0]["score"], expected);
    assert_eq!(state["players"][1]["score"], expected);
    assert_eq!(state["players"][0]["lastMoveDirection"], "timeout");

    cmd_tx.send(SessionCommand::Stop).unwrap();
    loop {
        match rx.recv().await {
            Some(MatchBroadcast::Snapshot { .. }) => {},
            Some(MatchBroadcast::MatchEnded { winner }) => {
                assert_eq!(winner, None);
                break;
            },
            None => panic!("loop exited without MatchEnded"),
        }
    }
    handle.await.unwrap();
}

#[tokio::test]
async fn duplicate_and_unknown_moves_are_dropped() {
    let (cmd_tx, mut rx, handle) = spawn_match(snake_game(50), session(5_000)).expect("should spawn");
    let _ = rx.recv().await;

    let submissions = [
        ("p9", Direction::Up),
        ("p1", Direction::Right),
        ("p1", Direction::Left),
        ("p2", Direction::Left),
    ];
    for (id, dir) in submissions {
        cmd_tx
            .send(SessionCommand::SubmitMove {
                player_id: id.to_string(),
                mv: SnakeMove::new(id, dir),
            })
            .unwrap();
    }

    let (tick, state) = expect_snapshot(rx.recv().await);
    assert_eq!(tick, 1);
    let cfg = SnakeConfig::default();
    let moved = cfg.players_starting_score + cfg.movement_towards_center_reward;
    // The first p1 move wins; the reverse duplicate would have been penalized.
    assert_eq!(state["players"][0]["score"], moved);
    assert_eq!(state["players"][0]["lastMoveDirection"], "right");
    assert_eq!(state["players"][1]["score"], moved);

    drop(cmd_tx);
    while let Some(msg) = rx.recv().await {
        if let MatchBroadcast::MatchEnded { winner } = msg {
            assert_eq!(winner, None);
        }
    }
    handle.await.unwrap();
}

#[tokio::test]
async fn play_writes_one_json_line_per_snapshot() {
    let input = [
        r#"{"playerId":"p1","direction":"right"}"#,
        r#"{"playerId":"p2","direction":"left"}"#,
        "this is not a move",
        "",
        r#"{"playerId":"p1","direction":"right"}"#,
        r#"{"playerId":"p2","direction":"left"}"#,
    ]
    .join("\n");
    let config = RunnerConfig {
        move_timeout_ms: 5_000,
        ..RunnerConfig::default()
    };
    let mut output = Vec::new();

    let winner = play(
        SnakeGame::with_config(snake_config(2)),
        &config,
        Cursor::new(input.into_bytes()),
        &mut output,
    )
    .await
    .expect("match should run");
    assert_eq!(winner, Some(Winner::Draw));

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2]["moveCount"], 2);
    assert_eq!(lines[2]["winner"], -1);
    assert!(lines[0]["winner"].is_null());
}

#[tokio::test]
async fn play_stops_when_input_closes() {
    let config = RunnerConfig {
        game: GameKind::Conway,
        format: SnapshotFormat::Msgpack,
        ..RunnerConfig::default()
    };
    let mut output = Vec::new();
    let winner = play(
        ConwayGame::with_config(ConwayConfig::default()),
        &config,
        Cursor::new(Vec::new()),
        &mut output,
    )
    .await
    .expect("match should run");
    assert_eq!(winner, None);

    let text = String::from_utf8(output).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["generationCount"], 0);
    assert_eq!(first["players"][0]["name"], "Player1");
}

#[tokio::test]
async fn conway_session_ends_on_stable_board() {
    let config = ConwayConfig {
        stability_threshold: 3,
        ..ConwayConfig::default()
    };
    let cycle = config.generation_cycle;
    let mut game = ConwayGame::with_config(config);
    register_two(&mut game);
    let (_cmd_tx, mut rx, handle) = spawn_match(game, session(5)).expect("should spawn");

    let mut last_tick = 0;
    let winner = loop {
        match rx.recv().await {
            Some(MatchBroadcast::Snapshot { tick, .. }) => last_tick = tick,
            Some(MatchBroadcast::MatchEnded { winner }) => break winner,
            None => panic!("loop exited without MatchEnded"),
        }
    };
    // An empty board never changes; the rule is checked at the first cycle boundary.
    assert_eq!(winner, Some(Winner::Draw));
    assert_eq!(last_tick, cycle);
    handle.await.unwrap();
}
