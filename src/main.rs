use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use snake::config::{Cli, GameConfig};
use snake::game::{Flow, SnakeGame};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = GameConfig::from_cli(&cli)?;
    let mut game = SnakeGame::new(config)?;
    game.initialize()?;

    let res = run(&mut game);
    game.restore()?;

    info!("bye");
    res
}

fn run(game: &mut SnakeGame) -> Result<()> {
    if game.show_intro()? == Flow::Quit {
        return Ok(());
    }

    // Each round is one session; play() reports when the player wants out
    while game.play()? == Flow::Continue {}
    Ok(())
}

/// The game owns the terminal, so logs only go to a file when one is given.
fn init_logging(cli: &Cli) -> Result<()> {
    let path = match &cli.log_file {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
