use serde::{Deserialize, Serialize};

use crate::item::{ItemKind, SpawnAffect};

/// Data-driven configuration for the snake duel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    /// Tick ceiling; the match is decided on points once it is reached.
    pub max_moves: u32,
    pub num_of_rows: i32,
    pub num_of_columns: i32,
    pub players_starting_score: u32,
    pub players_starting_length: i32,
    pub movement_towards_center_reward: u32,
    pub movement_away_from_center_reward: u32,
    pub reverse_direction_penalty: u32,
    pub illegal_move_penalty: u32,
    /// Deducted per segment lost to a wall or a katana cut.
    pub body_segment_loss_penalty: u32,
    pub start_shrinking_map_after_moves: u32,
    pub shrink_map_move_interval: u32,
    /// Playable width (columns) below which the board stops shrinking.
    pub minimum_board_size: i32,
    /// Mirrored apples spawn on every tick that is a multiple of this.
    pub apple_spawn_interval: u32,
    /// Probability per tick of spawning a mirrored item pair.
    pub item_spawn_chance: f64,
    /// Spawns closer than this (Euclidean, inclusive) to a head are rejected.
    pub spawn_min_distance: f64,
    /// Fixed rng seed; a random seed is drawn and logged when absent.
    pub seed: Option<u64>,
    pub items: ItemCatalog,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            max_moves: 200,
            num_of_rows: 25,
            num_of_columns: 50,
            players_starting_score: 1000,
            players_starting_length: 5,
            movement_towards_center_reward: 3,
            movement_away_from_center_reward: 1,
            reverse_direction_penalty: 10,
            illegal_move_penalty: 50,
            body_segment_loss_penalty: 25,
            start_shrinking_map_after_moves: 100,
            shrink_map_move_interval: 10,
            minimum_board_size: 20,
            apple_spawn_interval: 5,
            item_spawn_chance: 0.1,
            spawn_min_distance: 1.5,
            seed: None,
            items: ItemCatalog::default(),
        }
    }
}

impl SnakeConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        duelgrid_core::config::load_or_default("DUELGRID_SNAKE_CONFIG", "config/snake.toml")
    }

    /// Exact board centre, which lies between cells on even dimensions.
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.num_of_rows - 1) / 2.0,
            f64::from(self.num_of_columns - 1) / 2.0,
        )
    }
}

/// Tunables for one item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub affect: SpawnAffect,
    pub pick_up_reward: u32,
    /// Effect duration in ticks.
    pub duration: u32,
    /// Relative weight in the item draw; zero never spawns.
    pub spawn_weight: u32,
    pub symbol: char,
}

impl ItemSpec {
    const fn new(
        affect: SpawnAffect,
        pick_up_reward: u32,
        duration: u32,
        spawn_weight: u32,
        symbol: char,
    ) -> Self {
        Self {
            affect,
            pick_up_reward,
            duration,
            spawn_weight,
            symbol,
        }
    }
}

/// One spec per item kind. Overriding a kind in TOML replaces its whole spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemCatalog {
    pub apple: ItemSpec,
    pub golden_apple: ItemSpec,
    pub tron: ItemSpec,
    pub reset_borders: ItemSpec,
    pub shorten: ItemSpec,
    pub katana: ItemSpec,
    pub armour: ItemSpec,
    pub leap: ItemSpec,
    pub freeze: ItemSpec,
    pub nausea: ItemSpec,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        use SpawnAffect::*;
        Self {
            apple: ItemSpec::new(Own, 50, 1, 0, 'A'),
            golden_apple: ItemSpec::new(Own, 150, 5, 3, 'G'),
            tron: ItemSpec::new(Random, 25, 15, 2, 'T'),
            reset_borders: ItemSpec::new(Map, 25, 1, 1, 'B'),
            shorten: ItemSpec::new(Random, 25, 1, 2, 'S'),
            katana: ItemSpec::new(Own, 25, 10, 2, 'K'),
            armour: ItemSpec::new(Own, 25, 10, 2, 'R'),
            leap: ItemSpec::new(Random, 25, 5, 2, 'L'),
            freeze: ItemSpec::new(Enemy, 25, 3, 2, 'F'),
            nausea: ItemSpec::new(Enemy, 25, 5, 2, 'N'),
        }
    }
}

impl ItemCatalog {
    pub fn spec(&self, kind: ItemKind) -> &ItemSpec {
        match kind {
            ItemKind::Apple => &self.apple,
            ItemKind::GoldenApple => &self.golden_apple,
            ItemKind::Tron => &self.tron,
            ItemKind::ResetBorders => &self.reset_borders,
            ItemKind::Shorten => &self.shorten,
            ItemKind::Katana => &self.katana,
            ItemKind::Armour => &self.armour,
            ItemKind::Leap => &self.leap,
            ItemKind::Freeze => &self.freeze,
            ItemKind::Nausea => &self.nausea,
        }
    }
}
