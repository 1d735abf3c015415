use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown speed preset '{0}' (expected slow, medium or fast)")]
    InvalidSpeedConfig(String),

    #[error("grid size {0} is out of range ({min}..={max})", min = crate::config::MIN_GRID_SIZE, max = crate::config::MAX_GRID_SIZE)]
    InvalidGridSize(u16),

    #[error("no free cell left to place food")]
    BoardFull,

    #[error("terminal is too small: need {needed:?}, have {available:?}")]
    TerminalTooSmall { needed: (u16, u16), available: (u16, u16) },
}
