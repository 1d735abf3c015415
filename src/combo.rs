use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComboState {
    Idle,
    Active { count: u32, expires_at: Instant },
}

/// Counts food pickups that follow each other within `timeout`.
#[derive(Clone, Debug)]
pub struct ComboTracker {
    timeout: Duration,
    state: ComboState,
}

impl ComboTracker {
    pub fn new(timeout: Duration) -> Self {
        ComboTracker { timeout, state: ComboState::Idle }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> ComboState {
        self.state
    }

    pub fn count(&self) -> u32 {
        match self.state {
            ComboState::Idle => 0,
            ComboState::Active { count, .. } => count,
        }
    }

    pub fn expires_at(&self) -> Option<Instant> {
        match self.state {
            ComboState::Idle => None,
            ComboState::Active { expires_at, .. } => Some(expires_at),
        }
    }

    /// Bumps the count and restarts the window from `now`.
    pub fn record_pickup(&mut self, now: Instant) -> u32 {
        let count = self.count() + 1;
        self.state = ComboState::Active { count, expires_at: now + self.timeout };
        count
    }

    /// Drops back to idle if the window has run out. Returns true on that transition.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            ComboState::Active { expires_at, .. } if now >= expires_at => {
                self.state = ComboState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.state = ComboState::Idle;
    }

    /// 1.0 right after a pickup, falling to 0.0 at expiry. 0.0 when idle.
    pub fn remaining_fraction(&self, now: Instant) -> f32 {
        match self.state {
            ComboState::Idle => 0.0,
            ComboState::Active { expires_at, .. } => {
                let left = expires_at.saturating_duration_since(now);
                (left.as_secs_f32() / self.timeout.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }
}
