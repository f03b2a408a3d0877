use std::collections::HashSet;

use duelgrid_core::grid::Position;

use crate::board::Board;
use crate::config::SnakeConfig;
use crate::item::{Affect, Item, ItemKind};
use crate::player::Player;

/// Split a two-player slice into the player at `idx` and the other one.
pub fn pair_mut(players: &mut [Player], idx: usize) -> Option<(&mut Player, Option<&mut Player>)> {
    if idx >= players.len() {
        return None;
    }
    let (left, right) = players.split_at_mut(idx);
    let (me, rest) = right.split_first_mut()?;
    let other = left.first_mut().or_else(|| rest.first_mut());
    Some((me, other))
}

/// Pick up the item under the head of `players[idx]`, if any.
///
/// Picked items are recorded in `collided` and stay on the board until the
/// end of the tick, so the other player can still reach the same cell.
pub fn check_for_item_collision(
    players: &mut [Player],
    idx: usize,
    items: &[Item],
    collided: &mut HashSet<u64>,
) {
    let Some((picker, mut opponent)) = pair_mut(players, idx) else {
        return;
    };
    let head = picker.head();
    let Some(item) = items.iter().find(|i| i.position == head) else {
        return;
    };
    collided.insert(item.id);
    picker.add_score(i64::from(item.pick_up_reward));
    tracing::debug!(player = %picker.name, kind = ?item.kind, affect = ?item.affect, "Item picked up");

    match item.affect {
        Affect::Own | Affect::Map => picker.add_or_extend_item(item.activate(item.affect)),
        Affect::Both => {
            picker.add_or_extend_item(item.activate(Affect::Own));
            if let Some(opponent) = opponent.as_deref_mut() {
                opponent.add_or_extend_item(item.activate(Affect::Enemy));
            }
        },
        Affect::Enemy => {
            if let Some(opponent) = opponent.as_deref_mut() {
                opponent.add_or_extend_item(item.activate(Affect::Enemy));
            }
        },
    }
}

/// Result of checking one snake against the borders.
#[derive(Debug, Default, PartialEq)]
pub struct WallCheck {
    pub fatal: bool,
    /// Disconnected segments still inside the borders, to become apples.
    pub reward_cells: Vec<Position>,
}

/// A head outside the borders is fatal. Otherwise every segment from the
/// first one outside the borders to the tail is cut off and penalized.
pub fn check_wall_collision(player: &mut Player, board: &Board, config: &SnakeConfig) -> WallCheck {
    if !board.is_within_borders(player.head()) {
        tracing::info!(player = %player.name, "Head hit the wall");
        return WallCheck {
            fatal: true,
            reward_cells: Vec::new(),
        };
    }
    let Some(cut) = player.body.iter().position(|s| !board.is_within_borders(*s)) else {
        return WallCheck::default();
    };
    let lost = player.cut_tail(cut);
    let penalty = lost.len() as i64 * i64::from(config.body_segment_loss_penalty);
    player.add_score(-penalty);
    tracing::debug!(player = %player.name, lost = lost.len(), "Segments cut off by the wall");

    WallCheck {
        fatal: false,
        reward_cells: lost
            .into_iter()
            .filter(|s| board.is_within_borders(*s))
            .collect(),
    }
}

/// Where a head landed on snake bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyHit {
    /// Head shares a cell with its own body at index 2 or later.
    pub own_body: bool,
    /// Index of the first opponent segment under the head.
    pub opponent_index: Option<usize>,
}

pub fn detect_body_hit(player: &Player, opponent: &Player) -> BodyHit {
    let head = player.head();
    BodyHit {
        own_body: player.body.iter().skip(2).any(|s| *s == head),
        opponent_index: opponent.body.iter().position(|s| *s == head),
    }
}

/// Resolve self and opponent collisions on the post-move bodies. Returns
/// which players died. Katana cuts are applied after every hit is known.
pub fn resolve_player_collisions(players: &mut [Player], config: &SnakeConfig) -> [bool; 2] {
    let mut dead = [false; 2];
    if players.len() != 2 {
        return dead;
    }
    let hits = [
        detect_body_hit(&players[0], &players[1]),
        detect_body_hit(&players[1], &players[0]),
    ];
    let mut cuts: Vec<(usize, usize)> = Vec::new();

    for (i, hit) in hits.iter().enumerate() {
        let me = &players[i];
        let other = &players[1 - i];
        let armoured = me.has_item(ItemKind::Armour);

        if hit.own_body && !armoured {
            dead[i] = true;
        }
        if let Some(index) = hit.opponent_index {
            if armoured {
                continue;
            }
            if me.has_item(ItemKind::Katana) && index >= 1 && !other.has_item(ItemKind::Armour) {
                cuts.push((1 - i, index));
            } else {
                dead[i] = true;
            }
        }
    }

    for (victim, index) in cuts {
        let player = &mut players[victim];
        let lost = player.cut_tail(index).len();
        player.add_score(-(lost as i64 * i64::from(config.body_segment_loss_penalty)));
        tracing::info!(player = %player.name, lost, "Body severed by katana");
    }

    for (i, died) in dead.iter().enumerate() {
        if *died {
            tracing::info!(player = %players[i].name, "Snake collided");
        }
    }
    dead
}
