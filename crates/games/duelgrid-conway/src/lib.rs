pub mod config;
pub mod life;

use serde::{Deserialize, Serialize};

use duelgrid_core::game_trait::{DuelGame, GameMetadata, PlayerId, Winner};
use duelgrid_core::grid::Position;
use duelgrid_core::player::PlayerInfo;

use config::ConwayConfig;
use life::Grid;

/// One player's placements for a tick. Ignored outside placement ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConwayMove {
    pub player_id: PlayerId,
    #[serde(default)]
    pub placements: Vec<Position>,
}

/// A live cell as seen by external consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "playerName")]
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub cell_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConwaySnapshot {
    pub map: Vec<Vec<Option<CellView>>>,
    pub players: Vec<PlayerView>,
    pub winner: Option<Winner>,
    pub generation_count: u32,
}

/// Game of Life duel: both players seed their half, then the board evolves.
pub struct ConwayGame {
    config: ConwayConfig,
    grid: Grid,
    players: Vec<PlayerInfo>,
    generation_count: u32,
    stable_generations: u32,
    winner: Option<Winner>,
}

impl ConwayGame {
    pub fn new() -> Self {
        Self::with_config(ConwayConfig::load())
    }

    pub fn with_config(config: ConwayConfig) -> Self {
        Self {
            grid: life::empty_grid(config.num_of_rows, config.num_of_columns),
            players: Vec::with_capacity(2),
            generation_count: 0,
            stable_generations: 0,
            winner: None,
            config,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell_counts(&self) -> [usize; 2] {
        life::cell_counts(&self.grid)
    }

    fn in_own_half(&self, seat: usize, pos: Position) -> bool {
        let half = self.config.num_of_columns / 2;
        if seat == 0 {
            pos.column < half
        } else {
            pos.column >= half
        }
    }

    /// Place up to `cells_to_place` cells for `seat`; returns how many landed.
    fn place_cells(&mut self, seat: usize, placements: &[Position]) -> usize {
        let mut placed = 0;
        for &pos in placements.iter().take(self.config.cells_to_place) {
            if !self.in_own_half(seat, pos) {
                continue;
            }
            let (Ok(r), Ok(c)) = (usize::try_from(pos.row), usize::try_from(pos.column)) else {
                continue;
            };
            if let Some(slot) = self.grid.get_mut(r).and_then(|cols| cols.get_mut(c))
                && slot.is_none()
            {
                *slot = Some(seat);
                placed += 1;
            }
        }
        placed
    }

    fn check_game_over(&mut self, changed: bool) {
        let counts = self.cell_counts();
        self.stable_generations = if changed {
            0
        } else {
            self.stable_generations + 1
        };

        let ceiling = self.generation_count >= self.config.max_moves;
        if !ceiling && !self.config.is_cycle_boundary(self.generation_count) {
            return;
        }
        let extinct = (counts[0] == 0) != (counts[1] == 0);
        let stable = self.config.stability_threshold > 0
            && self.stable_generations >= self.config.stability_threshold;
        if !(extinct || stable || ceiling) {
            return;
        }
        let winner = Winner::by_ranking(
            (self.players[0].name.as_str(), counts[0]),
            (self.players[1].name.as_str(), counts[1]),
        );
        tracing::info!(?winner, ?counts, extinct, stable, generation = self.generation_count, "Game over");
        self.winner = Some(winner);
    }
}

impl Default for ConwayGame {
    fn default() -> Self {
        Self::new()
    }
}

impl DuelGame for ConwayGame {
    type Move = ConwayMove;
    type Snapshot = ConwaySnapshot;

    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Conway Duel".to_string(),
            description: "Seed your half and let the Game of Life decide".to_string(),
            player_count: 2,
        }
    }

    fn add_player(&mut self, info: PlayerInfo) -> bool {
        if self.players.len() >= 2 || self.players.iter().any(|p| p.id == info.id) {
            tracing::debug!(player_id = %info.id, "Rejected player registration");
            return false;
        }
        self.players.push(info);
        true
    }

    fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    fn process_moves(&mut self, moves: &[ConwayMove]) -> bool {
        if self.players.len() < 2 || self.winner.is_some() {
            return false;
        }

        if self.config.is_placement_tick(self.generation_count) {
            for seat in 0..2 {
                let id = &self.players[seat].id;
                let Some(mv) = moves.iter().find(|m| &m.player_id == id) else {
                    continue;
                };
                let placed = self.place_cells(seat, &mv.placements);
                tracing::debug!(seat, requested = mv.placements.len(), placed, "Cells placed");
            }
        }

        self.generation_count += 1;
        let next = life::next_generation(&self.grid);
        let changed = next != self.grid;
        self.grid = next;
        self.check_game_over(changed);
        true
    }

    fn timeout_move(&self, player_id: &str) -> ConwayMove {
        ConwayMove {
            player_id: player_id.to_string(),
            placements: Vec::new(),
        }
    }

    fn snapshot(&self) -> ConwaySnapshot {
        let counts = self.cell_counts();
        ConwaySnapshot {
            map: self
                .grid
                .iter()
                .map(|cols| {
                    cols.iter()
                        .map(|owner| {
                            owner.and_then(|seat| self.players.get(seat)).map(|p| CellView {
                                kind: "cell",
                                player_name: p.name.clone(),
                            })
                        })
                        .collect()
                })
                .collect(),
            players: self
                .players
                .iter()
                .zip(counts)
                .map(|(p, cell_count)| PlayerView {
                    name: p.name.clone(),
                    cell_count,
                })
                .collect(),
            winner: self.winner.clone(),
            generation_count: self.generation_count,
        }
    }

    fn move_count(&self) -> u32 {
        self.generation_count
    }

    fn winner(&self) -> Option<&Winner> {
        self.winner.as_ref()
    }
}
