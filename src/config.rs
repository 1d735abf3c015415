use std::path::PathBuf;

use clap::Parser;

use crate::error::GameError;
use crate::score::{ScorePolicy, Speed};

pub const MIN_GRID_SIZE: u16 = 5;
pub const MAX_GRID_SIZE: u16 = 60;
pub const DEFAULT_GRID_SIZE: u16 = 20;

/// Terminal columns and rows per grid cell. Characters are about twice as
/// tall as they are wide, so two columns make a roughly square cell.
pub const CELL_SIZE: (u16, u16) = (2, 1);

#[derive(Parser, Debug)]
#[command(name = "snake", about = "Terminal snake")]
pub struct Cli {
    /// Game speed: slow, medium or fast
    #[arg(long, default_value = "medium", value_parser = parse_speed)]
    pub speed: Speed,

    /// Cells per side, walls included
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    pub grid_size: u16,

    /// Write logs to this file (filtered by RUST_LOG, default info)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_speed(s: &str) -> Result<Speed, GameError> {
    s.parse()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub speed: Speed,
    pub tile_count: u16,
}

impl GameConfig {
    pub fn new(speed: Speed, tile_count: u16) -> Result<Self, GameError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&tile_count) {
            return Err(GameError::InvalidGridSize(tile_count));
        }
        Ok(GameConfig { speed, tile_count })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, GameError> {
        GameConfig::new(cli.speed, cli.grid_size)
    }

    pub fn policy(&self) -> ScorePolicy {
        self.speed.policy()
    }
}
