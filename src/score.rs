use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::GameError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Speed {
    Slow,
    Medium,
    Fast,
}

/// Everything a speed preset decides for a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScorePolicy {
    pub tick_interval: Duration,
    pub points_per_food: u64,
    pub combo_timeout: Duration,
}

impl Speed {
    pub fn policy(self) -> ScorePolicy {
        let (tick_ms, points_per_food, combo_ms) = match self {
            Speed::Slow => (150, 5, 3000),
            Speed::Medium => (100, 10, 2000),
            Speed::Fast => (50, 20, 1500),
        };

        ScorePolicy {
            tick_interval: Duration::from_millis(tick_ms),
            points_per_food,
            combo_timeout: Duration::from_millis(combo_ms),
        }
    }
}

impl FromStr for Speed {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Speed::Slow),
            "medium" => Ok(Speed::Medium),
            "fast" => Ok(Speed::Fast),
            _ => Err(GameError::InvalidSpeedConfig(s.to_string())),
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Speed::Slow => "slow",
            Speed::Medium => "medium",
            Speed::Fast => "fast",
        };
        f.write_str(s)
    }
}
