use std::collections::VecDeque;

use Direction::*;

/// A grid cell as (column, row).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

impl Cell {
    pub const fn new(x: i16, y: i16) -> Self {
        Cell { x, y }
    }

    pub fn offset(self, (dx, dy): (i16, i16)) -> Self {
        Cell::new(self.x + dx, self.y + dy)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn vector(self) -> (i16, i16) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Up | Down => Axis::Vertical,
            Left | Right => Axis::Horizontal,
        }
    }
}

pub enum MoveResult {
    Slid { new_head: Cell, old_head: Cell, old_tail: Cell },
    Grew { new_head: Cell, old_head: Cell },
}

/// Body segments, head first. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    pub fn new(head: Cell) -> Self {
        let mut body = VecDeque::new();
        body.push_back(head);
        Snake { body }
    }

    /// Builds a snake from head-first segments. Returns `None` for an empty body.
    pub fn from_segments<I: IntoIterator<Item = Cell>>(segments: I) -> Option<Self> {
        let body: VecDeque<Cell> = segments.into_iter().collect();
        if body.is_empty() {
            None
        } else {
            Some(Snake { body })
        }
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.body.iter()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Where the head would land after one step in `direction`. Does not mutate.
    pub fn next_head(&self, direction: Direction) -> Cell {
        self.head().offset(direction.vector())
    }

    /// Commits a checked move: the new head is pushed, and the tail is dropped
    /// unless the head landed on `food`.
    pub fn commit(&mut self, new_head: Cell, food: Cell) -> MoveResult {
        let old_head = self.head();
        self.body.push_front(new_head);

        if new_head == food {
            MoveResult::Grew { new_head, old_head }
        } else {
            // Length was at least 2 after the push, so the pop always yields.
            let old_tail = self.body.pop_back().unwrap_or(new_head);
            MoveResult::Slid { new_head, old_head, old_tail }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(cells: &[(i16, i16)]) -> Snake {
        Snake::from_segments(cells.iter().map(|&(x, y)| Cell::new(x, y))).unwrap()
    }

    #[test]
    fn slide_keeps_length() {
        let mut s = snake(&[(5, 5), (4, 5), (3, 5)]);
        let head = s.next_head(Right);
        let res = s.commit(head, Cell::new(1, 1));

        assert_eq!(s.len(), 3);
        assert!(matches!(res, MoveResult::Slid { old_tail, .. } if old_tail == Cell::new(3, 5)));
        assert_eq!(s.segments().copied().collect::<Vec<_>>(),
                   vec![Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5)]);
    }

    #[test]
    fn eating_grows_by_one() {
        let mut s = snake(&[(5, 5), (4, 5), (3, 5)]);
        let head = s.next_head(Right);
        let res = s.commit(head, Cell::new(6, 5));

        assert!(matches!(res, MoveResult::Grew { .. }));
        assert_eq!(s.segments().copied().collect::<Vec<_>>(),
                   vec![Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)]);
    }

    #[test]
    fn single_segment_slides() {
        let mut s = Snake::new(Cell::new(10, 10));
        let head = s.next_head(Right);
        s.commit(head, Cell::new(3, 3));

        assert_eq!(s.head(), Cell::new(11, 10));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(Snake::from_segments(Vec::new()).is_none());
    }

    #[test]
    fn axes() {
        assert_eq!(Up.axis(), Down.axis());
        assert_eq!(Left.axis(), Right.axis());
        assert_ne!(Up.axis(), Left.axis());
    }
}
