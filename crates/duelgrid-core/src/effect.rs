use serde::{Deserialize, Serialize};

/// A timed effect attached to a player, generic over the game's kind enum.
///
/// `remaining` counts ticks. An effect is still applied on the tick its
/// counter reaches zero and is removed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect<K> {
    #[serde(rename = "type")]
    pub kind: K,
    pub remaining: u32,
}

impl<K> ActiveEffect<K> {
    pub fn new(kind: K, duration: u32) -> Self {
        Self {
            kind,
            remaining: duration,
        }
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Picking up the same kind again restarts the timer; durations never stack.
    pub fn refresh(&mut self, duration: u32) {
        self.remaining = duration;
    }
}
