pub mod board;
pub mod collision;
pub mod config;
pub mod item;
pub mod player;
pub mod scoring;
pub mod spawner;

use std::collections::HashSet;

use serde::Serialize;

use duelgrid_core::game_trait::{DuelGame, GameMetadata, PlayerId, Winner};
use duelgrid_core::player::PlayerInfo;

use board::{Board, Borders, Cell};
use config::SnakeConfig;
use item::{Affect, BoardRequest, Item, ItemKind};
use player::{MoveDirection, Player, SnakeMove};
use spawner::Spawner;

/// Everything an external consumer may read between ticks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeSnapshot {
    pub map: Vec<Vec<Option<Cell>>>,
    pub borders: Borders,
    pub players: Vec<Player>,
    pub winner: Option<Winner>,
    pub move_count: u32,
}

/// One snake duel. Owns every player, item and the board projection.
pub struct SnakeGame {
    config: SnakeConfig,
    board: Board,
    players: Vec<Player>,
    items: Vec<Item>,
    spawner: Spawner,
    seed: u64,
    move_count: u32,
    winner: Option<Winner>,
}

impl SnakeGame {
    pub fn new() -> Self {
        Self::with_config(SnakeConfig::load())
    }

    pub fn with_config(config: SnakeConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        tracing::info!(seed, rows = config.num_of_rows, columns = config.num_of_columns, "Snake match created");
        Self {
            board: Board::new(config.num_of_rows, config.num_of_columns),
            players: Vec::with_capacity(2),
            items: Vec::new(),
            spawner: Spawner::new(seed),
            seed,
            move_count: 0,
            winner: None,
            config,
        }
    }

    pub fn config(&self) -> &SnakeConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Seed of the match rng, for replaying a match.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Step (a): move every player, picking up items on the way.
    fn resolve_moves(&mut self, moves: &[SnakeMove]) -> HashSet<u64> {
        for mv in moves {
            if !self.players.iter().any(|p| p.id == mv.player_id) {
                tracing::debug!(player_id = %mv.player_id, "Dropping move for unknown player");
            }
        }

        let mut collided = HashSet::new();
        for idx in 0..self.players.len() {
            let supplied = match moves.iter().find(|m| m.player_id == self.players[idx].id) {
                Some(m) => m.direction,
                None => {
                    tracing::debug!(player = %self.players[idx].name, "No move supplied");
                    MoveDirection::Invalid
                },
            };

            let player = &mut self.players[idx];
            let Some(direction) = player.begin_move(supplied, &self.config) else {
                continue;
            };
            let steps = if player.has_item(ItemKind::Leap) { 2 } else { 1 };
            player.advance(direction, steps, &self.config);
            collision::check_for_item_collision(&mut self.players, idx, &self.items, &mut collided);
            self.players[idx].finish_move(steps);
        }
        collided
    }

    /// Step (b): count down effects, run them, drop the expired ones.
    fn tick_effects(&mut self) {
        let mut requests = Vec::new();
        for player in &mut self.players {
            let mut active = std::mem::take(&mut player.active_items);
            for i in 0..active.len() {
                let length = player.body.len();
                active[i].effect.tick();
                if let Some(request) = active[i].apply_tick(player) {
                    requests.push(request);
                }
                let lost = length.saturating_sub(player.body.len());
                if lost > 0 {
                    for other in &mut active {
                        other.absorb_tail_loss(lost);
                    }
                }
            }
            active.retain(|effect| {
                if effect.effect.is_expired() {
                    effect.on_expire(player);
                    false
                } else {
                    true
                }
            });
            player.active_items = active;
        }

        for request in requests {
            match request {
                BoardRequest::ResetBorders => {
                    self.board.reset_borders();
                    tracing::info!("Borders reset");
                },
            }
        }
    }

    /// Step (d).
    fn maybe_shrink(&mut self) {
        let cfg = &self.config;
        let due = self.move_count > cfg.start_shrinking_map_after_moves
            && cfg.shrink_map_move_interval > 0
            && self.move_count % cfg.shrink_map_move_interval == 0;
        if !due || self.board.current_width() <= cfg.minimum_board_size {
            return;
        }
        self.board.shrink_map();
        let board = &self.board;
        let before = self.items.len();
        self.items.retain(|i| board.is_within_borders(i.position));
        tracing::info!(
            level = board.horizontal_shrink_level,
            width = board.current_width(),
            removed_items = before - self.items.len(),
            "Board shrunk"
        );
    }

    /// Step (e). Returns true when the match just ended.
    fn check_game_over(&mut self) -> bool {
        let mut dead = [false; 2];
        let mut reward_cells = Vec::new();
        for (i, player) in self.players.iter_mut().enumerate() {
            let check = collision::check_wall_collision(player, &self.board, &self.config);
            dead[i] |= check.fatal;
            reward_cells.extend(check.reward_cells);
        }
        for cell in reward_cells {
            if self.items.iter().all(|i| i.position != cell) {
                let apple = self
                    .spawner
                    .make_item(cell, ItemKind::Apple, Affect::Own, &self.config.items);
                self.items.push(apple);
            }
        }

        let hits = collision::resolve_player_collisions(&mut self.players, &self.config);
        for (i, player) in self.players.iter().enumerate() {
            dead[i] |= hits[i] || player.score == 0;
        }

        let ceiling = self.move_count >= self.config.max_moves;
        if !dead.contains(&true) && !ceiling {
            return false;
        }
        let winner = scoring::decide_winner(&self.players[0], &self.players[1], dead);
        tracing::info!(?winner, ?dead, move_count = self.move_count, "Game over");
        self.winner = Some(winner);
        true
    }

    /// Step (f).
    fn maybe_spawn(&mut self) {
        let interval = self.config.apple_spawn_interval;
        if interval > 0 && self.move_count % interval == 0 {
            self.spawner
                .spawn_mirrored_apples(&self.board, &self.players, &mut self.items, &self.config);
        }
        if self.spawner.roll() < self.config.item_spawn_chance {
            self.spawner
                .spawn_mirrored_items(&self.board, &self.players, &mut self.items, &self.config);
        }
    }
}

impl Default for SnakeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl DuelGame for SnakeGame {
    type Move = SnakeMove;
    type Snapshot = SnakeSnapshot;

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Snake Duel".to_string(),
            description: "Two snakes, mirrored pickups and a shrinking board".to_string(),
            player_count: 2,
        }
    }

    fn add_player(&mut self, info: PlayerInfo) -> bool {
        if self.players.len() >= 2 || self.players.iter().any(|p| p.id == info.id) {
            tracing::debug!(player_id = %info.id, "Rejected player registration");
            return false;
        }
        let seat = self.players.len();
        self.players.push(Player::new(info, seat, &self.config));
        self.board.update_map(&self.players, &self.items);
        true
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    fn process_moves(&mut self, moves: &[SnakeMove]) -> bool {
        if self.players.len() < 2 || self.winner.is_some() {
            return false;
        }

        let collided = self.resolve_moves(moves);
        self.move_count += 1;
        self.tick_effects();
        self.items.retain(|i| !collided.contains(&i.id));
        self.maybe_shrink();
        if !self.check_game_over() {
            self.maybe_spawn();
        }
        self.board.update_map(&self.players, &self.items);
        true
    }

    fn timeout_move(&self, player_id: &str) -> SnakeMove {
        SnakeMove::new(player_id, MoveDirection::Timeout)
    }

    fn snapshot(&self) -> SnakeSnapshot {
        SnakeSnapshot {
            map: self.board.map.clone(),
            borders: self.board.borders,
            players: self.players.clone(),
            winner: self.winner.clone(),
            move_count: self.move_count,
        }
    }

    fn move_count(&self) -> u32 {
        self.move_count
    }

    fn winner(&self) -> Option<&Winner> {
        self.winner.as_ref()
    }
}
