use serde::{Deserialize, Serialize};

use duelgrid_core::effect::ActiveEffect;
use duelgrid_core::grid::{Direction, Position};

use crate::config::ItemSpec;
use crate::player::{MoveDirection, Player};

/// Every pickup the board can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Apple,
    GoldenApple,
    Tron,
    ResetBorders,
    Shorten,
    Katana,
    Armour,
    Leap,
    Freeze,
    Nausea,
}

impl ItemKind {
    /// Kinds drawn by the weighted item spawn. Apples follow their own
    /// schedule and are not part of the draw.
    pub const SPAWNABLE: [ItemKind; 9] = [
        ItemKind::GoldenApple,
        ItemKind::Tron,
        ItemKind::ResetBorders,
        ItemKind::Shorten,
        ItemKind::Katana,
        ItemKind::Armour,
        ItemKind::Leap,
        ItemKind::Freeze,
        ItemKind::Nausea,
    ];
}

/// Who receives an item's effect on pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affect {
    #[serde(rename = "self")]
    Own,
    Enemy,
    Both,
    Map,
}

/// Affect as configured in the catalog; `Random` is resolved at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnAffect {
    #[serde(rename = "self")]
    Own,
    Enemy,
    Both,
    Map,
    Random,
}

impl SpawnAffect {
    /// Resolve against a uniform roll in `[0, 1)`: 30% self, 50% enemy,
    /// 20% both. Fixed affects ignore the roll.
    pub fn resolve(self, roll: f64) -> Affect {
        match self {
            SpawnAffect::Own => Affect::Own,
            SpawnAffect::Enemy => Affect::Enemy,
            SpawnAffect::Both => Affect::Both,
            SpawnAffect::Map => Affect::Map,
            SpawnAffect::Random if roll < 0.3 => Affect::Own,
            SpawnAffect::Random if roll < 0.8 => Affect::Enemy,
            SpawnAffect::Random => Affect::Both,
        }
    }
}

/// A pickup lying on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Match-unique id, used to defer removal until the end of a tick.
    #[serde(skip)]
    pub id: u64,
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub affect: Affect,
    pub pick_up_reward: u32,
    pub duration: u32,
    pub spawn_weight: u32,
    pub symbol: char,
    /// Segments removed by `shorten`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<u32>,
    /// Forced direction of `nausea`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl Item {
    pub fn new(id: u64, position: Position, kind: ItemKind, affect: Affect, spec: &ItemSpec) -> Self {
        Self {
            id,
            position,
            kind,
            affect,
            pick_up_reward: spec.pick_up_reward,
            duration: spec.duration,
            spawn_weight: spec.spawn_weight,
            symbol: spec.symbol,
            magnitude: None,
            direction: None,
        }
    }

    /// The effect this item starts when applied with `affect`.
    pub fn activate(&self, affect: Affect) -> ActiveItem {
        ActiveItem {
            effect: ActiveEffect::new(self.kind, self.duration),
            affect,
            magnitude: self.magnitude,
            direction: self.direction,
            temporary_segments: 0,
        }
    }
}

/// An item effect running on a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveItem {
    #[serde(flatten)]
    pub effect: ActiveEffect<ItemKind>,
    /// The affect this instance was applied with (never `both`).
    pub affect: Affect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Segments grown by `tron`, removed again on expiry.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub temporary_segments: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Board-level work an effect asks the game to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardRequest {
    ResetBorders,
}

impl ActiveItem {
    pub fn kind(&self) -> ItemKind {
        self.effect.kind
    }

    /// Per-tick behaviour, run after the duration decrement.
    pub fn apply_tick(&mut self, holder: &mut Player) -> Option<BoardRequest> {
        match self.effect.kind {
            ItemKind::Apple | ItemKind::GoldenApple => holder.grow(1),
            ItemKind::Tron => {
                holder.grow(1);
                self.temporary_segments += 1;
            },
            ItemKind::ResetBorders => return Some(BoardRequest::ResetBorders),
            ItemKind::Shorten => {
                holder.remove_segments(self.magnitude.unwrap_or(DEFAULT_SHORTEN) as usize);
            },
            ItemKind::Freeze => holder.next_move_override = Some(MoveDirection::Frozen),
            ItemKind::Nausea => {
                if let Some(direction) = self.direction {
                    holder.next_move_override = Some(direction.into());
                }
            },
            // Passive: consulted during movement and collision.
            ItemKind::Katana | ItemKind::Armour | ItemKind::Leap => {},
        }
        None
    }

    /// Account for `lost` tail segments removed by something other than
    /// this effect. Temporary `tron` segments sit at the tail and go first.
    pub fn absorb_tail_loss(&mut self, lost: usize) {
        if self.effect.kind == ItemKind::Tron {
            let lost = u32::try_from(lost).unwrap_or(u32::MAX);
            self.temporary_segments = self.temporary_segments.saturating_sub(lost);
        }
    }

    /// Cleanup when the effect is dropped.
    pub fn on_expire(&self, holder: &mut Player) {
        if self.effect.kind == ItemKind::Tron && self.temporary_segments > 0 {
            holder.remove_segments(self.temporary_segments as usize);
        }
    }
}

/// Segments removed by a `shorten` without a rolled magnitude.
pub const DEFAULT_SHORTEN: u32 = 3;
