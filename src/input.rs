use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction::{self, *};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Move(Direction),
    Pause,
    Quit,
}

impl Key {
    pub fn from_event(ev: &KeyEvent) -> Option<Key> {
        if is_ctrl_c(ev) {
            return Some(Key::Quit);
        }

        match ev.code {
            KeyCode::Char('w') | KeyCode::Up => Some(Key::Move(Up)),
            KeyCode::Char('a') | KeyCode::Left => Some(Key::Move(Left)),
            KeyCode::Char('s') | KeyCode::Down => Some(Key::Move(Down)),
            KeyCode::Char('d') | KeyCode::Right => Some(Key::Move(Right)),
            KeyCode::Char(' ') | KeyCode::Esc => Some(Key::Pause),
            _ => None,
        }
    }
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

/// Turn requests waiting for the next tick.
///
/// A turn is only accepted if it leaves the axis the snake travelled on
/// during the last tick, and only one turn is queued per tick. Until the
/// snake has moved at all, any direction goes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectionMapper {
    travelled: Option<Direction>,
    pending: Option<Direction>,
}

impl DirectionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapper for a snake already moving in `direction`.
    pub fn travelling(direction: Direction) -> Self {
        DirectionMapper { travelled: Some(direction), pending: None }
    }

    /// Direction the next tick will move in, if any.
    pub fn current(&self) -> Option<Direction> {
        self.pending.or(self.travelled)
    }

    /// Returns whether the proposal was accepted.
    pub fn on_key(&mut self, proposed: Direction) -> bool {
        let travelled = match self.travelled {
            None => {
                self.pending = Some(proposed);
                return true;
            }
            Some(d) => d,
        };

        if proposed.axis() == travelled.axis() {
            return false;
        }
        if matches!(self.pending, Some(p) if p.axis() == proposed.axis()) {
            return false;
        }

        self.pending = Some(proposed);
        true
    }

    /// Hands the tick its direction and marks it as travelled.
    pub fn consume(&mut self) -> Option<Direction> {
        if let Some(dir) = self.pending.take() {
            self.travelled = Some(dir);
        }
        self.travelled
    }
}
