use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::{GameConfig, CELL_SIZE};
use crate::error::GameError;
use crate::grid::Grid;
use crate::hud::Hud;
use crate::input::{is_ctrl_c, Key};
use crate::session::{EndReason, GameSession, Lifecycle, Renderer};
use crate::snake::Cell;
use crate::term::TermManager;

/// Upper bound on how long to block for input when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct SnakeGame {
    config: GameConfig,
    term: TermManager,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Result<Self> {
        let term = TermManager::new().context("reading terminal size")?;
        Ok(SnakeGame { config, term })
    }

    /// Fails before touching the screen if the board would not fit.
    pub fn initialize(&mut self) -> Result<()> {
        let grid = Grid::new(self.config.tile_count, CELL_SIZE);
        let (pw, ph) = grid.pixel_size();
        let needed = (pw, ph + 1);
        let available = self.term.size();

        if needed.0 > available.0 || needed.1 > available.1 {
            return Err(GameError::TerminalTooSmall { needed, available }.into());
        }

        self.term.setup().context("setting up terminal")?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore().context("restoring terminal")?;
        Ok(())
    }

    pub fn show_intro(&mut self) -> Result<Flow> {
        let speed = format!("Speed: {}", self.config.speed);
        let lines = &[
            "Arrow keys or WASD to move",
            "Space or Esc to pause",
            "CTRL+C to quit",
            &*speed,
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines)?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        self.term.hide_message()?;
        Ok(Flow::Continue)
    }

    /// Runs one session to its end, then waits for the player to go again or quit.
    pub fn play(&mut self) -> Result<Flow> {
        self.term.clear()?;

        let mut session = GameSession::new(self.config, Instant::now())?;
        let grid = *session.grid();
        let mut hud = Hud::new();

        self.term.draw_board(&grid)?;
        self.term.render(&session.frame());

        loop {
            let timeout = session.next_deadline()
                .map(|due| due.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_POLL);

            for key_ev in self.term.read_key_events(timeout)? {
                match Key::from_event(&key_ev) {
                    Some(Key::Quit) => return Ok(Flow::Quit),
                    Some(Key::Pause) => {
                        let state = session.toggle_pause();
                        self.show_pause(state)?;
                    }
                    Some(key) => session.handle_key(key),
                    None => {}
                }
            }

            if let Err(e) = session.advance(Instant::now(), &mut self.term, &mut hud) {
                // The session has already ended itself; the end screen follows
                warn!(error = %e, "session stopped");
            }

            if hud.take_dirty() {
                self.term.draw_status(&grid, &hud)?;
            }

            if let Some((score, reason)) = hud.take_ended() {
                let body: Vec<_> = session.snake().segments().copied().collect();
                self.game_over(&grid, &body, score, reason)?;
                break;
            }
        }

        // Quit if the user CTRL+C's after the game
        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }
        Ok(Flow::Continue)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn show_pause(&mut self, state: Lifecycle) -> Result<()> {
        match state {
            Lifecycle::Paused => {
                self.term.show_message(&["Paused", "Press Space or Esc to resume", "or Ctrl+C to quit"])?
            }
            Lifecycle::Running => self.term.hide_message()?,
            Lifecycle::Ended => {}
        }
        Ok(())
    }

    fn game_over(&mut self, grid: &Grid, body: &[Cell], score: u64, reason: EndReason) -> Result<()> {
        info!(score, ?reason, "game over");

        let title = match reason {
            EndReason::BoardFull => "Board full!",
            EndReason::Collision => {
                self.term.draw_dead_snake(grid, body)?;
                "Game over!"
            }
        };

        self.term.show_message(&[
            title,
            &*format!("Score: {}", score),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit.",
        ])?;
        Ok(())
    }
}
