use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use duelgrid_core::game_trait::PlayerId;
use duelgrid_core::grid::{Direction, Position};
use duelgrid_core::player::PlayerInfo;

use crate::config::SnakeConfig;
use crate::item::{ActiveItem, ItemKind};
use crate::scoring;

/// A submitted or forced move. Anything that is not a cardinal direction
/// resolves to a penalized no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "RawDirection")]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
    /// Only ever queued by an effect; skips the move entirely.
    Frozen,
    Timeout,
    #[default]
    Invalid,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDirection {
    Text(String),
    Other(IgnoredAny),
}

impl From<RawDirection> for MoveDirection {
    fn from(raw: RawDirection) -> Self {
        match raw {
            RawDirection::Text(s) if s == "timeout" => MoveDirection::Timeout,
            RawDirection::Text(s) => Direction::parse(&s)
                .map(MoveDirection::from)
                .unwrap_or(MoveDirection::Invalid),
            RawDirection::Other(_) => MoveDirection::Invalid,
        }
    }
}

impl From<Direction> for MoveDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
            Direction::Left => MoveDirection::Left,
            Direction::Right => MoveDirection::Right,
        }
    }
}

impl MoveDirection {
    pub fn cardinal(self) -> Option<Direction> {
        match self {
            MoveDirection::Up => Some(Direction::Up),
            MoveDirection::Down => Some(Direction::Down),
            MoveDirection::Left => Some(Direction::Left),
            MoveDirection::Right => Some(Direction::Right),
            MoveDirection::Frozen | MoveDirection::Timeout | MoveDirection::Invalid => None,
        }
    }
}

/// One player's entry in a tick's move batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeMove {
    pub player_id: PlayerId,
    #[serde(default)]
    pub direction: MoveDirection,
}

impl SnakeMove {
    pub fn new(player_id: impl Into<PlayerId>, direction: impl Into<MoveDirection>) -> Self {
        Self {
            player_id: player_id.into(),
            direction: direction.into(),
        }
    }
}

/// A snake. `body[0]` is the head.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(skip)]
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub body: Vec<Position>,
    pub active_items: Vec<ActiveItem>,
    pub last_move_direction: Option<MoveDirection>,
    #[serde(skip)]
    pub next_move_override: Option<MoveDirection>,
}

impl Player {
    /// Create the player for `seat` (0 or 1) with its mirrored starting body
    /// on the middle row.
    pub fn new(info: PlayerInfo, seat: usize, config: &SnakeConfig) -> Self {
        let row = config.num_of_rows / 2;
        let length = config.players_starting_length.max(1);
        let body = if seat == 0 {
            (0..length).map(|i| Position::new(row, length - i)).collect()
        } else {
            let head = config.num_of_columns - length - 1;
            (0..length).map(|i| Position::new(row, head + i)).collect()
        };
        Self::with_body(info.id, info.name, config.players_starting_score, body)
    }

    pub fn with_body(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        score: u32,
        body: Vec<Position>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score,
            body,
            active_items: Vec::new(),
            last_move_direction: None,
            next_move_override: None,
        }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Add (or with a negative value, deduct) points. Never drops below 0.
    pub fn add_score(&mut self, points: i64) {
        let next = (i64::from(self.score) + points).clamp(0, i64::from(u32::MAX));
        self.score = next as u32;
    }

    /// Drop up to `count` tail segments, always keeping the head.
    pub fn remove_segments(&mut self, count: usize) {
        let len = self.body.len().saturating_sub(count).max(1);
        self.body.truncate(len);
    }

    /// Cut the body down to `keep` segments (at least the head) and return
    /// what was cut off, tail last.
    pub fn cut_tail(&mut self, keep: usize) -> Vec<Position> {
        let lost = self.body.split_off(keep.max(1).min(self.body.len()));
        for effect in &mut self.active_items {
            effect.absorb_tail_loss(lost.len());
        }
        lost
    }

    /// Grow by duplicating the tail; the copy unfolds on the next move.
    pub fn grow(&mut self, count: usize) {
        if let Some(&tail) = self.body.last() {
            self.body.extend(std::iter::repeat_n(tail, count));
        }
    }

    pub fn has_item(&self, kind: ItemKind) -> bool {
        self.active_items.iter().any(|a| a.kind() == kind)
    }

    /// Start an effect, or restart the timer of an effect of the same kind.
    pub fn add_or_extend_item(&mut self, item: ActiveItem) {
        if let Some(existing) = self
            .active_items
            .iter_mut()
            .find(|a| a.kind() == item.kind())
        {
            existing.effect.refresh(item.effect.remaining);
        } else {
            self.active_items.push(item);
        }
    }

    /// Current heading, taken from the head and the first body segment that
    /// does not share its cell.
    pub fn heading(&self) -> Option<Direction> {
        let head = self.head();
        let neck = self.body.iter().find(|s| **s != head)?;
        Direction::between(*neck, head)
    }

    pub fn is_reverse_direction(&self, direction: Direction) -> bool {
        self.heading().is_some_and(|h| h.opposite() == direction)
    }

    /// Resolve the supplied direction against queued overrides and the move
    /// rules. Returns the direction to step in, or `None` when the player
    /// stays put this tick (frozen or penalized).
    pub fn begin_move(&mut self, supplied: MoveDirection, config: &SnakeConfig) -> Option<Direction> {
        let direction = self.next_move_override.take().unwrap_or(supplied);
        if direction == MoveDirection::Frozen {
            return None;
        }
        self.last_move_direction = Some(direction);

        match direction.cardinal() {
            Some(d) if self.is_reverse_direction(d) => {
                tracing::debug!(player = %self.name, direction = d.as_str(), "Reverse move penalized");
                self.add_score(-i64::from(config.reverse_direction_penalty));
                None
            },
            Some(d) => Some(d),
            None => {
                tracing::debug!(player = %self.name, ?direction, "Illegal move penalized");
                self.add_score(-i64::from(config.illegal_move_penalty));
                None
            },
        }
    }

    /// Prepend `steps` cells in `direction` and award the movement reward.
    /// The body is temporarily `steps` segments longer until
    /// [`Player::finish_move`].
    pub fn advance(&mut self, direction: Direction, steps: usize, config: &SnakeConfig) {
        let previous = self.head();
        for _ in 0..steps {
            let next = self.head().step(direction, 1);
            self.body.insert(0, next);
        }
        let reward = scoring::movement_reward(previous, self.head(), config);
        self.add_score(i64::from(reward));
    }

    /// Trim the tail back after [`Player::advance`].
    pub fn finish_move(&mut self, steps: usize) {
        self.remove_segments(steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SnakeConfig {
        SnakeConfig::default()
    }

    fn info(id: &str) -> PlayerInfo {
        PlayerInfo::new(id, id)
    }

    #[test]
    fn starting_bodies_are_mirrored() {
        let cfg = config();
        let a = Player::new(info("a"), 0, &cfg);
        let b = Player::new(info("b"), 1, &cfg);
        assert_eq!(a.body.first(), Some(&Position::new(12, 5)));
        assert_eq!(a.body.last(), Some(&Position::new(12, 1)));
        assert_eq!(b.body.first(), Some(&Position::new(12, 44)));
        assert_eq!(b.body.last(), Some(&Position::new(12, 48)));
        for (sa, sb) in a.body.iter().zip(&b.body) {
            assert_eq!(sa.column, cfg.num_of_columns - 1 - sb.column);
        }
        assert_eq!(a.heading(), Some(Direction::Right));
        assert_eq!(b.heading(), Some(Direction::Left));
    }

    #[test]
    fn reverse_move_is_penalized_and_ignored() {
        let cfg = config();
        let mut p = Player::with_body(
            "a",
            "a",
            100,
            vec![Position::new(5, 5), Position::new(5, 4)],
        );
        assert_eq!(p.begin_move(MoveDirection::Left, &cfg), None);
        assert_eq!(p.score, 90);
        assert_eq!(p.head(), Position::new(5, 5));
        assert_eq!(p.last_move_direction, Some(MoveDirection::Left));
    }

    #[test]
    fn stacked_body_has_no_heading() {
        let p = Player::with_body("a", "a", 10, vec![Position::new(1, 1); 3]);
        assert!(!p.is_reverse_direction(Direction::Left));
    }

    #[test]
    fn illegal_move_penalty_clamps_at_zero() {
        let cfg = config();
        let mut p = Player::with_body("a", "a", 20, vec![Position::new(5, 5)]);
        assert_eq!(p.begin_move(MoveDirection::Timeout, &cfg), None);
        assert_eq!(p.score, 0);
    }

    #[test]
    fn frozen_override_skips_move_without_scoring() {
        let cfg = config();
        let mut p = Player::with_body("a", "a", 20, vec![Position::new(5, 5)]);
        p.next_move_override = Some(MoveDirection::Frozen);
        assert_eq!(p.begin_move(MoveDirection::Up, &cfg), None);
        assert_eq!(p.score, 20);
        assert_eq!(p.last_move_direction, None);
        assert_eq!(p.next_move_override, None);
    }

    #[test]
    fn override_replaces_supplied_direction() {
        let cfg = config();
        let mut p = Player::with_body("a", "a", 20, vec![Position::new(5, 5)]);
        p.next_move_override = Some(MoveDirection::Down);
        assert_eq!(p.begin_move(MoveDirection::Up, &cfg), Some(Direction::Down));
    }

    #[test]
    fn move_keeps_length_and_rewards_centre_approach() {
        let cfg = config();
        let mut p = Player::new(info("a"), 0, &cfg);
        let before = p.score;
        let d = p.begin_move(MoveDirection::Right, &cfg).unwrap();
        p.advance(d, 1, &cfg);
        assert_eq!(p.body.len(), 6);
        p.finish_move(1);
        assert_eq!(p.body.len(), 5);
        assert_eq!(p.head(), Position::new(12, 6));
        assert_eq!(p.score, before + cfg.movement_towards_center_reward);

        let d = p.begin_move(MoveDirection::Up, &cfg).unwrap();
        p.advance(d, 1, &cfg);
        p.finish_move(1);
        assert_eq!(p.score, before + 3 + cfg.movement_away_from_center_reward);
    }

    #[test]
    fn single_segment_body_moves() {
        let cfg = config();
        let mut p = Player::with_body("a", "a", 10, vec![Position::new(3, 3)]);
        p.advance(Direction::Down, 1, &cfg);
        p.finish_move(1);
        assert_eq!(p.body, vec![Position::new(4, 3)]);
    }

    #[test]
    fn leap_advances_two_cells() {
        let cfg = config();
        let mut p = Player::with_body(
            "a",
            "a",
            10,
            vec![Position::new(3, 3), Position::new(3, 2), Position::new(3, 1)],
        );
        p.advance(Direction::Right, 2, &cfg);
        p.finish_move(2);
        assert_eq!(
            p.body,
            vec![Position::new(3, 5), Position::new(3, 4), Position::new(3, 3)]
        );
    }

    #[test]
    fn move_deserialization_is_lenient() {
        let m: SnakeMove = serde_json::from_str(r#"{"playerId":"a","direction":"up"}"#).unwrap();
        assert_eq!(m.direction, MoveDirection::Up);
        let m: SnakeMove = serde_json::from_str(r#"{"playerId":"a"}"#).unwrap();
        assert_eq!(m.direction, MoveDirection::Invalid);
        let m: SnakeMove = serde_json::from_str(r#"{"playerId":"a","direction":7}"#).unwrap();
        assert_eq!(m.direction, MoveDirection::Invalid);
        let m: SnakeMove =
            serde_json::from_str(r#"{"playerId":"a","direction":"timeout"}"#).unwrap();
        assert_eq!(m.direction, MoveDirection::Timeout);
        let m: SnakeMove = serde_json::from_str(r#"{"playerId":"a","direction":"frozen"}"#).unwrap();
        assert_eq!(m.direction, MoveDirection::Invalid);
    }

    #[test]
    fn refresh_does_not_duplicate() {
        use crate::item::{Affect, Item};
        let cfg = config();
        let mut p = Player::with_body("a", "a", 10, vec![Position::new(3, 3)]);
        let spec = cfg.items.spec(ItemKind::Katana);
        let item = Item::new(1, Position::new(0, 0), ItemKind::Katana, Affect::Own, spec);
        p.add_or_extend_item(item.activate(Affect::Own));
        p.active_items[0].effect.remaining = 2;
        p.add_or_extend_item(item.activate(Affect::Own));
        assert_eq!(p.active_items.len(), 1);
        assert_eq!(p.active_items[0].effect.remaining, spec.duration);
    }
}
