use serde::Serialize;

use duelgrid_core::grid::Position;

use crate::item::Item;
use crate::player::Player;

/// Value of one occupied map cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Cell {
    Border {
        symbol: char,
    },
    SnakeHead {
        #[serde(rename = "playerName")]
        player_name: String,
    },
    SnakeBody {
        #[serde(rename = "playerName")]
        player_name: String,
    },
    #[serde(untagged)]
    Item(Item),
}

pub const BORDER_SYMBOL: char = '#';

/// Exclusive edges of the playable rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Borders {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// The grid projection of a match. It owns border geometry only; the map is
/// rebuilt from players and items by [`Board::update_map`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub num_of_rows: i32,
    pub num_of_columns: i32,
    pub borders: Borders,
    /// Number of shrinks so far. Never decreases; a border reset moves
    /// `reset_base` instead.
    pub horizontal_shrink_level: i32,
    #[serde(skip)]
    reset_base: i32,
    pub map: Vec<Vec<Option<Cell>>>,
}

/// Shrink level of a full board: borders sit just outside the grid.
const INITIAL_SHRINK_LEVEL: i32 = -1;

impl Board {
    pub fn new(num_of_rows: i32, num_of_columns: i32) -> Self {
        let mut board = Self {
            num_of_rows,
            num_of_columns,
            borders: Borders {
                left: 0,
                right: 0,
                top: 0,
                bottom: 0,
            },
            horizontal_shrink_level: INITIAL_SHRINK_LEVEL,
            reset_base: 0,
            map: Vec::new(),
        };
        board.update_borders();
        board.update_map(&[], &[]);
        board
    }

    /// Whether `pos` lies on the physical grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        (0..self.num_of_rows).contains(&pos.row) && (0..self.num_of_columns).contains(&pos.column)
    }

    /// The cell at `(row, column)`, or `None` outside the physical grid.
    pub fn get_cell(&self, row: i32, column: i32) -> Option<&Option<Cell>> {
        if !self.is_valid_position(Position::new(row, column)) {
            return None;
        }
        self.map.get(row as usize)?.get(column as usize)
    }

    /// Write a cell; a no-op outside the physical grid.
    pub fn set_cell(&mut self, row: i32, column: i32, value: Option<Cell>) {
        if self.is_valid_position(Position::new(row, column))
            && let Some(slot) = self
                .map
                .get_mut(row as usize)
                .and_then(|cols| cols.get_mut(column as usize))
        {
            *slot = value;
        }
    }

    /// Strictly inside the current (possibly shrunk) borders.
    pub fn is_within_borders(&self, pos: Position) -> bool {
        let b = &self.borders;
        pos.column > b.left && pos.column < b.right && pos.row > b.top && pos.row < b.bottom
    }

    /// Number of playable columns.
    pub fn current_width(&self) -> i32 {
        self.borders.right - self.borders.left - 1
    }

    /// Move every border one step inward. Rows only start shrinking once the
    /// playable area is square.
    pub fn shrink_map(&mut self) {
        self.horizontal_shrink_level += 1;
        self.update_borders();
    }

    /// Restore the full-size borders. Later shrinks start over from the
    /// full board.
    pub fn reset_borders(&mut self) {
        self.reset_base = self.horizontal_shrink_level - INITIAL_SHRINK_LEVEL;
        self.update_borders();
    }

    /// Shrink level the borders are currently drawn at.
    pub fn effective_shrink_level(&self) -> i32 {
        self.horizontal_shrink_level - self.reset_base
    }

    fn update_borders(&mut self) {
        let level = self.effective_shrink_level();
        let vertical = (level - (self.num_of_columns - self.num_of_rows) / 2).max(INITIAL_SHRINK_LEVEL);
        self.borders = Borders {
            left: level,
            right: self.num_of_columns - 1 - level,
            top: vertical,
            bottom: self.num_of_rows - 1 - vertical,
        };
    }

    /// Rebuild the map: borders, then items, then each snake tail-to-head.
    pub fn update_map(&mut self, players: &[Player], items: &[Item]) {
        let rows = usize::try_from(self.num_of_rows).unwrap_or(0);
        let cols = usize::try_from(self.num_of_columns).unwrap_or(0);
        let b = self.borders;
        self.map = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| {
                        let (r, c) = (r as i32, c as i32);
                        let on_border =
                            c <= b.left || c >= b.right || r <= b.top || r >= b.bottom;
                        on_border.then_some(Cell::Border {
                            symbol: BORDER_SYMBOL,
                        })
                    })
                    .collect()
            })
            .collect();

        for item in items {
            self.set_cell(
                item.position.row,
                item.position.column,
                Some(Cell::Item(item.clone())),
            );
        }

        for player in players {
            for (i, segment) in player.body.iter().enumerate().rev() {
                let cell = if i == 0 {
                    Cell::SnakeHead {
                        player_name: player.name.clone(),
                    }
                } else {
                    Cell::SnakeBody {
                        player_name: player.name.clone(),
                    }
                };
                self.set_cell(segment.row, segment.column, Some(cell));
            }
        }
    }
}
