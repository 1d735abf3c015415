use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::GameError;
use crate::grid::Grid;
use crate::snake::{Cell, Snake};

/// Random draws attempted before falling back to scanning the free cells.
const MAX_RANDOM_DRAWS: usize = 64;

/// Picks a uniformly random interior cell not covered by the snake.
pub fn place<R: Rng>(snake: &Snake, grid: &Grid, rng: &mut R) -> Result<Cell, GameError> {
    let max = grid.tile_count() as i16 - 1;

    if max > 1 && snake.len() < grid.interior_count() {
        for _ in 0..MAX_RANDOM_DRAWS {
            let cell = Cell::new(rng.gen_range(1..max), rng.gen_range(1..max));
            if !snake.contains(cell) {
                debug!(x = cell.x, y = cell.y, "food placed");
                return Ok(cell);
            }
        }
    }

    // Crowded board: choose among what is actually left
    let free: Vec<Cell> = grid.interior_cells().filter(|c| !snake.contains(*c)).collect();
    let cell = free.choose(rng).copied().ok_or(GameError::BoardFull)?;
    debug!(x = cell.x, y = cell.y, free = free.len(), "food placed after scan");
    Ok(cell)
}
