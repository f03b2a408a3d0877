pub mod codec;
pub mod config;
pub mod effect;
pub mod game_trait;
pub mod grid;
pub mod player;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::DuelGame;
    use crate::player::PlayerInfo;

    /// Create `n` test players with ids `p1..pn` and names `Player1..PlayerN`.
    pub fn make_players(n: usize) -> Vec<PlayerInfo> {
        (0..n)
            .map(|i| PlayerInfo::new(format!("p{}", i + 1), format!("Player{}", i + 1)))
            .collect()
    }

    /// Register the two standard test players.
    pub fn register_two<G: DuelGame>(game: &mut G) {
        for player in make_players(2) {
            assert!(game.add_player(player), "first two players must be accepted");
        }
    }

    /// Build a tick's batch of timeout moves for every registered player.
    pub fn timeout_batch<G: DuelGame>(game: &G) -> Vec<G::Move> {
        game.player_ids()
            .iter()
            .map(|id| game.timeout_move(id))
            .collect()
    }

    fn snapshot_json<G: DuelGame>(game: &G) -> serde_json::Value {
        serde_json::to_value(game.snapshot()).expect("snapshot must serialize")
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every DuelGame implementation must pass these. Game crates call them
    // from their own #[cfg(test)] modules with a fresh game instance.

    /// A third registration (and a reused id) is rejected without changing
    /// the registered players.
    pub fn contract_third_player_rejected<G: DuelGame>(game: &mut G) {
        let players = make_players(3);
        assert!(game.add_player(players[0].clone()));
        assert!(
            !game.add_player(players[0].clone()),
            "reused player id must be rejected"
        );
        assert!(game.add_player(players[1].clone()));
        let before = snapshot_json(game);
        assert!(
            !game.add_player(players[2].clone()),
            "third player must be rejected"
        );
        assert_eq!(game.player_ids().len(), 2);
        assert_eq!(before, snapshot_json(game), "rejection must not mutate state");
    }

    /// Ticks submitted before both seats are filled are rejected.
    pub fn contract_moves_rejected_before_registration<G: DuelGame>(game: &mut G) {
        let moves = vec![game.timeout_move("p1"), game.timeout_move("p2")];
        assert!(!game.process_moves(&moves));
        assert_eq!(game.move_count(), 0);

        let first = make_players(1).remove(0);
        assert!(game.add_player(first));
        let before = snapshot_json(game);
        assert!(!game.process_moves(&moves));
        assert_eq!(game.move_count(), 0);
        assert_eq!(before, snapshot_json(game));
    }

    /// A tick of timeout moves is accepted and advances the counter.
    pub fn contract_timeout_tick_advances<G: DuelGame>(game: &mut G) {
        register_two(game);
        let batch = timeout_batch(game);
        assert!(game.process_moves(&batch));
        assert_eq!(game.move_count(), 1);
    }

    /// Once a winner is set no further tick changes the state.
    pub fn contract_terminal_is_absorbing<G: DuelGame>(game: &mut G, max_ticks: usize) {
        register_two(game);
        for _ in 0..max_ticks {
            if game.is_over() {
                break;
            }
            let batch = timeout_batch(game);
            assert!(game.process_moves(&batch));
        }
        assert!(game.is_over(), "game must end within {max_ticks} ticks");

        let before = snapshot_json(game);
        let count = game.move_count();
        let batch = timeout_batch(game);
        assert!(!game.process_moves(&batch), "terminal game must reject ticks");
        assert_eq!(game.move_count(), count);
        assert_eq!(before, snapshot_json(game));
    }

    /// Reading the snapshot twice without a tick yields identical output.
    pub fn contract_snapshot_is_stable<G: DuelGame>(game: &G) {
        assert_eq!(snapshot_json(game), snapshot_json(game));
    }
}
