use serde::{Deserialize, Serialize};

/// Data-driven configuration for the Conway duel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConwayConfig {
    /// Generation ceiling.
    pub max_moves: u32,
    pub num_of_rows: i32,
    pub num_of_columns: i32,
    /// Placements honoured per player on a placement tick.
    pub cells_to_place: usize,
    /// Placement ticks and game-over checks fall on multiples of this.
    pub generation_cycle: u32,
    /// Unchanged generations in a row that end the match at the next cycle
    /// boundary. 0 disables the rule.
    pub stability_threshold: u32,
}

impl Default for ConwayConfig {
    fn default() -> Self {
        Self {
            max_moves: 200,
            num_of_rows: 25,
            num_of_columns: 50,
            cells_to_place: 60,
            generation_cycle: 10,
            stability_threshold: 0,
        }
    }
}

impl ConwayConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        duelgrid_core::config::load_or_default("DUELGRID_CONWAY_CONFIG", "config/conway.toml")
    }

    /// Whether placements are accepted before generation `tick` runs.
    pub fn is_placement_tick(&self, tick: u32) -> bool {
        self.generation_cycle > 0
            && tick % self.generation_cycle == 0
            && tick <= self.max_moves / 2
    }

    /// Whether the survivor and stability rules are checked after
    /// generation `generation`. With no cycle, every generation is checked.
    pub fn is_cycle_boundary(&self, generation: u32) -> bool {
        self.generation_cycle == 0 || generation % self.generation_cycle == 0
    }
}
