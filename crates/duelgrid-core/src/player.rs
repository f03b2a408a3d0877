use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerId;

/// Maximum length of a display name, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// Registration data for a player joining a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
}

impl PlayerInfo {
    /// Build registration data, trimming the name and falling back to the
    /// id when the name is blank.
    pub fn new(id: impl Into<PlayerId>, name: impl AsRef<str>) -> Self {
        let id = id.into();
        let trimmed: String = name.as_ref().trim().chars().take(MAX_NAME_LEN).collect();
        let name = if trimmed.is_empty() {
            id.clone()
        } else {
            trimmed
        };
        Self { id, name }
    }
}
