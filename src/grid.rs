use crate::snake::Cell;

/// Square board of `tile_count` cells per side. The outer ring is wall.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    tile_count: i16,
    cell_size: (u16, u16),
}

impl Grid {
    pub fn new(tile_count: u16, cell_size: (u16, u16)) -> Self {
        Grid { tile_count: tile_count as i16, cell_size }
    }

    pub fn tile_count(&self) -> u16 {
        self.tile_count as u16
    }

    pub fn cell_size(&self) -> (u16, u16) {
        self.cell_size
    }

    /// Size of the whole board, walls included, in surface units.
    pub fn pixel_size(&self) -> (u16, u16) {
        (self.tile_count() * self.cell_size.0, self.tile_count() * self.cell_size.1)
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.tile_count / 2, self.tile_count / 2)
    }

    /// True for the border ring and anything outside the board.
    pub fn is_wall(&self, cell: Cell) -> bool {
        let max = self.tile_count - 1;
        cell.x <= 0 || cell.y <= 0 || cell.x >= max || cell.y >= max
    }

    pub fn interior_cells(&self) -> impl Iterator<Item = Cell> {
        let max = self.tile_count - 1;
        (1..max).flat_map(move |y| (1..max).map(move |x| Cell::new(x, y)))
    }

    pub fn interior_count(&self) -> usize {
        let side = (self.tile_count - 2).max(0) as usize;
        side * side
    }

    pub fn cell_to_pixel(&self, cell: Cell) -> (u16, u16) {
        (cell.x as u16 * self.cell_size.0, cell.y as u16 * self.cell_size.1)
    }
}
