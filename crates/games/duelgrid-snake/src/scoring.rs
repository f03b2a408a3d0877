use duelgrid_core::game_trait::Winner;
use duelgrid_core::grid::Position;

use crate::config::SnakeConfig;
use crate::player::Player;

/// Points for a step: the larger reward when the head got strictly closer
/// (Manhattan) to the board centre, the smaller one otherwise.
pub fn movement_reward(previous: Position, next: Position, config: &SnakeConfig) -> u32 {
    let (row, column) = config.center();
    if next.manhattan_to(row, column) < previous.manhattan_to(row, column) {
        config.movement_towards_center_reward
    } else {
        config.movement_away_from_center_reward
    }
}

/// Decide a finished match. A lone survivor wins outright; otherwise score,
/// then body length, then a draw.
pub fn decide_winner(first: &Player, second: &Player, dead: [bool; 2]) -> Winner {
    match dead {
        [true, false] => Winner::Player(second.name.clone()),
        [false, true] => Winner::Player(first.name.clone()),
        _ => Winner::by_ranking(
            (first.name.as_str(), (first.score, first.body.len())),
            (second.name.as_str(), (second.score, second.body.len())),
        ),
    }
}
