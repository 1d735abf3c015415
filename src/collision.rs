use crate::grid::Grid;
use crate::snake::{Cell, Snake};

/// Checked against the body as it is before the move, so the cell the tail
/// is about to leave still counts as occupied.
pub fn is_collision(new_head: Cell, snake: &Snake, grid: &Grid) -> bool {
    grid.is_wall(new_head) || snake.contains(new_head)
}
