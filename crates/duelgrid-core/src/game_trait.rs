use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::player::PlayerInfo;

/// Unique identifier for a player, as assigned by the transport layer.
pub type PlayerId = String;

/// Core trait that all duelgrid games must implement.
///
/// A game instance owns the complete state of one match. The caller
/// registers exactly two players, then drives the match one tick at a time
/// by handing over a complete batch of moves; between ticks it may read a
/// snapshot. Nothing in a game is shared across instances.
pub trait DuelGame: Send {
    /// One player's submission for a tick.
    type Move: DeserializeOwned + Send + 'static;

    /// Read-only view of the match, serialized for external consumers.
    type Snapshot: Serialize + Send;

    /// Game metadata for match listings.
    fn metadata(&self) -> GameMetadata;

    /// Register a player. Returns false (and leaves the game untouched) when
    /// both seats are already taken or the id is already registered.
    fn add_player(&mut self, player: PlayerInfo) -> bool;

    /// Registered player ids in registration order.
    fn player_ids(&self) -> Vec<PlayerId>;

    /// Resolve one tick from a batch of moves. Returns false (state
    /// unchanged) when fewer than two players are registered or the match
    /// is already over.
    fn process_moves(&mut self, moves: &[Self::Move]) -> bool;

    /// The move substituted for a player that did not respond in time.
    fn timeout_move(&self, player_id: &str) -> Self::Move;

    /// Build the externally visible snapshot of the current state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Number of ticks processed so far.
    fn move_count(&self) -> u32;

    /// The match result, once decided.
    fn winner(&self) -> Option<&Winner>;

    /// Whether the match reached its terminal state.
    fn is_over(&self) -> bool {
        self.winner().is_some()
    }
}

/// Game metadata for match listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub player_count: u8,
}

/// Final result of a match.
///
/// On the wire a win is the winner's name and a draw is the integer `-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Winner {
    Player(String),
    Draw,
}

/// Sentinel used on the wire for a drawn match.
pub const DRAW_SENTINEL: i64 = -1;

impl Winner {
    /// Compare two players by a ranking key; the larger key wins and equal
    /// keys draw.
    pub fn by_ranking<K: Ord>(first: (&str, K), second: (&str, K)) -> Self {
        match first.1.cmp(&second.1) {
            std::cmp::Ordering::Greater => Winner::Player(first.0.to_string()),
            std::cmp::Ordering::Less => Winner::Player(second.0.to_string()),
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }

    /// The winning player's name, if the match was not drawn.
    pub fn name(&self) -> Option<&str> {
        match self {
            Winner::Player(name) => Some(name),
            Winner::Draw => None,
        }
    }
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Winner::Player(name) => serializer.serialize_str(name),
            Winner::Draw => serializer.serialize_i64(DRAW_SENTINEL),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireWinner {
    Name(String),
    Sentinel(i64),
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match WireWinner::deserialize(deserializer)? {
            WireWinner::Name(name) => Ok(Winner::Player(name)),
            WireWinner::Sentinel(DRAW_SENTINEL) => Ok(Winner::Draw),
            WireWinner::Sentinel(other) => Err(serde::de::Error::custom(format!(
                "invalid winner sentinel {other}, expected {DRAW_SENTINEL}"
            ))),
        }
    }
}
