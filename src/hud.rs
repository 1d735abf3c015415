use crossterm::style::Color;

use crate::session::{EndReason, Presenter};

/// Combos shorter than this are not worth showing.
const MIN_SHOWN_COMBO: u32 = 2;
const COMBO_BAR_WIDTH: usize = 10;

/// Collects score/combo notifications between redraws of the status line.
#[derive(Debug, Default)]
pub struct Hud {
    score: u64,
    combo: u32,
    remaining: f32,
    ended: Option<(u64, EndReason)>,
    dirty: bool,
}

impl Hud {
    pub fn new() -> Self {
        Hud { dirty: true, ..Default::default() }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// True once per batch of changes.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn take_ended(&mut self) -> Option<(u64, EndReason)> {
        self.ended.take()
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn combo_text(&self) -> Option<String> {
        if self.combo < MIN_SHOWN_COMBO {
            return None;
        }

        let filled = (self.remaining * COMBO_BAR_WIDTH as f32).ceil() as usize;
        let filled = filled.min(COMBO_BAR_WIDTH);
        Some(format!(
            "Combo x{} [{}{}]",
            self.combo,
            "=".repeat(filled),
            " ".repeat(COMBO_BAR_WIDTH - filled)
        ))
    }

    /// The combo text fades out as its window runs down.
    pub fn combo_color(&self) -> Color {
        match self.remaining {
            r if r > 0.66 => Color::Yellow,
            r if r > 0.33 => Color::DarkYellow,
            _ => Color::DarkGrey,
        }
    }
}

impl Presenter for Hud {
    fn score_changed(&mut self, score: u64) {
        self.score = score;
        self.dirty = true;
    }

    fn combo_changed(&mut self, combo: u32, remaining: f32) {
        self.combo = combo;
        self.remaining = remaining;
        self.dirty = true;
    }

    fn session_ended(&mut self, final_score: u64, reason: EndReason) {
        self.score = final_score;
        self.ended = Some((final_score, reason));
        self.dirty = true;
    }
}
