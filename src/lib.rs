pub mod collision;
pub mod combo;
pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod grid;
pub mod hud;
pub mod input;
pub mod score;
pub mod session;
pub mod snake;
pub mod term;
pub mod timer;
