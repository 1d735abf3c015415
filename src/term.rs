use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use tracing::warn;

use crate::grid::Grid;
use crate::hud::Hud;
use crate::session::{Frame, Renderer};
use crate::snake::{Cell, Direction};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const WALL_CHAR: char = '▒';
const DEAD_SNAKE_CHAR: char = 'X';

const SNAKE_COLOR: Color = Color::Green;
const FOOD_COLOR: Color = Color::Red;
const WALL_COLOR: Color = Color::DarkGrey;

pub type Pos = (u16, u16);

pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<(char, Color)>,
    current_msg: Option<Message>,
    origin: Pos,
    painted: Vec<Cell>,
}

struct Message {
    top_left: Pos,
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let screen = vec![(' ', Color::Reset); width as usize * height as usize];
        Ok(TermManager {
            width,
            height,
            stdout: stdout(),
            screen,
            current_msg: None,
            origin: (0, 0),
            painted: vec![],
        })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn size(&self) -> Pos {
        (self.width, self.height)
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Waits up to `timeout` for input, then drains whatever else is queued.
    pub fn read_key_events(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        if poll(timeout)? {
            loop {
                if let Event::Key(ev) = read()? {
                    events.push(ev);
                }
                if !poll(Duration::from_millis(0))? {
                    break;
                }
            }
        }

        Ok(events)
    }

    /// Centres the board and draws its wall ring.
    pub fn draw_board(&mut self, grid: &Grid) -> Result<()> {
        let (pw, ph) = grid.pixel_size();
        // One extra row below the board for the status line
        self.origin = (
            self.width.saturating_sub(pw) / 2,
            self.height.saturating_sub(ph + 1) / 2,
        );
        self.painted.clear();

        let max = grid.tile_count() as i16 - 1;
        for i in 0..=max {
            for cell in [Cell::new(i, 0), Cell::new(i, max), Cell::new(0, i), Cell::new(max, i)].iter() {
                self.paint_cell(grid, *cell, WALL_CHAR, WALL_COLOR);
            }
        }

        self.flush()
    }

    pub fn draw_status(&mut self, grid: &Grid, hud: &Hud) -> Result<()> {
        let (pw, ph) = grid.pixel_size();
        let y = self.origin.1 + ph;
        if y >= self.height {
            return Ok(());
        }

        for x in 0..pw {
            self.print_at((self.origin.0 + x, y), ' ', Color::Reset);
        }
        self.print_str_at((self.origin.0, y), &hud.score_text(), Color::Reset);

        if let Some(combo) = hud.combo_text() {
            let x = self.origin.0 + pw.saturating_sub(combo.chars().count() as u16);
            self.print_str_at((x, y), &combo, hud.combo_color());
        }

        self.flush()
    }

    pub fn draw_dead_snake(&mut self, grid: &Grid, body: &[Cell]) -> Result<()> {
        for cell in body {
            self.paint_cell(grid, *cell, DEAD_SNAKE_CHAR, SNAKE_COLOR);
        }
        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as u16;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ', Color::Reset)?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch, Color::Reset)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(&(ch, color)) = self.screen.get(self.index((x, y))) {
                    self.print_at_no_save((x, y), ch, color)?;
                }
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![(' ', Color::Reset); self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn paint_cell(&mut self, grid: &Grid, cell: Cell, ch: char, color: Color) {
        let (px, py) = grid.cell_to_pixel(cell);
        let (cw, ch_rows) = grid.cell_size();
        for dy in 0..ch_rows {
            for dx in 0..cw {
                self.print_at((self.origin.0 + px + dx, self.origin.1 + py + dy), ch, color);
            }
        }
    }

    fn print_str_at(&mut self, pos: Pos, s: &str, color: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.print_at((pos.0 + i as u16, pos.1), ch, color);
        }
    }

    fn print_at(&mut self, pos: Pos, ch: char, color: Color) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }

        let idx = self.index(pos);
        self.screen[idx] = (ch, color);

        // While a message is up, only the buffer is updated
        if !self.covered_by_message(pos) {
            if let Err(e) = self.print_at_no_save(pos, ch, color) {
                warn!(error = %e, "failed to queue output");
            }
        }
    }

    fn print_at_no_save(&mut self, pos: Pos, ch: char, color: Color) -> Result<()> {
        // Used for messages, which must not overwrite the buffer they get restored from
        queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(color),
            style::Print(ch),
            style::ResetColor
        )
    }

    fn covered_by_message(&self, pos: Pos) -> bool {
        match &self.current_msg {
            Some(m) => {
                pos.0 >= m.top_left.0 && pos.0 < m.top_left.0 + m.width
                    && pos.1 >= m.top_left.1 && pos.1 < m.top_left.1 + m.height
            }
            None => false,
        }
    }

    fn index(&self, pos: Pos) -> usize {
        self.width as usize * pos.1 as usize + pos.0 as usize
    }
}

impl Renderer for TermManager {
    fn render(&mut self, frame: &Frame<'_>) {
        let grid = *frame.grid;

        let stale: Vec<Cell> = self.painted.iter()
            .copied()
            .filter(|c| *c != frame.food && !frame.snake.contains(*c))
            .collect();
        for cell in stale {
            self.paint_cell(&grid, cell, ' ', Color::Reset);
        }

        self.paint_cell(&grid, frame.food, FOOD_CHAR, FOOD_COLOR);
        for (i, cell) in frame.snake.segments().enumerate() {
            let ch = if i == 0 { head_char(frame.heading) } else { SNAKE_BODY_CHAR };
            self.paint_cell(&grid, *cell, ch, SNAKE_COLOR);
        }

        self.painted.clear();
        self.painted.push(frame.food);
        self.painted.extend(frame.snake.segments().copied());

        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush frame");
        }
    }
}

pub fn head_char(heading: Option<Direction>) -> char {
    match heading {
        Some(Direction::Up) => '^',
        Some(Direction::Down) => 'v',
        Some(Direction::Left) => '<',
        Some(Direction::Right) => '>',
        None => '@',
    }
}
