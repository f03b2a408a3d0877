use duelgrid_core::grid::Position;

/// Cell ownership by seat (0 or 1); `None` is a dead cell.
pub type Grid = Vec<Vec<Option<usize>>>;

pub fn empty_grid(rows: i32, columns: i32) -> Grid {
    let rows = usize::try_from(rows).unwrap_or(0);
    let columns = usize::try_from(columns).unwrap_or(0);
    vec![vec![None; columns]; rows]
}

pub fn cell(grid: &Grid, pos: Position) -> Option<&Option<usize>> {
    let r = usize::try_from(pos.row).ok()?;
    let c = usize::try_from(pos.column).ok()?;
    grid.get(r)?.get(c)
}

/// Live neighbours of `(row, column)` per seat. The board does not wrap.
pub fn count_neighbors(grid: &Grid, row: usize, column: usize) -> [u8; 2] {
    let mut counts = [0u8; 2];
    let center = Position::new(row as i32, column as i32);
    for dr in -1..=1 {
        for dc in -1..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let neighbour = Position::new(center.row + dr, center.column + dc);
            if let Some(Some(owner)) = cell(grid, neighbour)
                && let Some(count) = counts.get_mut(*owner)
            {
                *count += 1;
            }
        }
    }
    counts
}

/// One generation: survivors keep their owner, births go to the seat that
/// owns most of the three parents.
pub fn next_generation(grid: &Grid) -> Grid {
    grid.iter()
        .enumerate()
        .map(|(r, cols)| {
            cols.iter()
                .enumerate()
                .map(|(c, current)| {
                    let counts = count_neighbors(grid, r, c);
                    let total = counts[0] + counts[1];
                    match current {
                        Some(owner) if total == 2 || total == 3 => Some(*owner),
                        Some(_) => None,
                        None if total == 3 => Some(if counts[0] > counts[1] { 0 } else { 1 }),
                        None => None,
                    }
                })
                .collect()
        })
        .collect()
}

/// Live cells per seat.
pub fn cell_counts(grid: &Grid) -> [usize; 2] {
    let mut counts = [0; 2];
    for owner in grid.iter().flatten().flatten() {
        if let Some(count) = counts.get_mut(*owner) {
            *count += 1;
        }
    }
    counts
}
