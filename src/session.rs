use std::time::{Duration, Instant};

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info};

use crate::collision::is_collision;
use crate::combo::ComboTracker;
use crate::config::{GameConfig, CELL_SIZE};
use crate::error::GameError;
use crate::food;
use crate::grid::Grid;
use crate::input::{DirectionMapper, Key};
use crate::score::ScorePolicy;
use crate::snake::{Cell, Direction, MoveResult, Snake};
use crate::timer::{TimerHandle, TimerQueue};

/// How often a live combo reports its remaining time, for fading.
pub const COMBO_FADE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Running,
    Paused,
    Ended,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    Collision,
    BoardFull,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Task {
    Tick,
    ComboExpiry,
    ComboFade,
}

/// What gets drawn each tick.
pub struct Frame<'a> {
    pub grid: &'a Grid,
    pub snake: &'a Snake,
    pub food: Cell,
    pub heading: Option<Direction>,
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>);
}

pub trait Presenter {
    fn score_changed(&mut self, score: u64);

    /// `remaining` is the fraction of the combo window left, 0.0 when the combo is gone.
    fn combo_changed(&mut self, combo: u32, remaining: f32);

    fn session_ended(&mut self, final_score: u64, reason: EndReason);
}

/// One play-through, from the first frame to the crash.
pub struct GameSession<R = ThreadRng> {
    grid: Grid,
    snake: Snake,
    food: Cell,
    mapper: DirectionMapper,
    score: u64,
    combo: ComboTracker,
    policy: ScorePolicy,
    state: Lifecycle,
    timers: TimerQueue<Task>,
    combo_timer: Option<TimerHandle>,
    fade_timer: Option<TimerHandle>,
    rng: R,
}

impl GameSession<ThreadRng> {
    pub fn new(config: GameConfig, now: Instant) -> Result<Self, GameError> {
        GameSession::new_with_rng(config, rand::thread_rng(), now)
    }
}

impl<R: Rng> GameSession<R> {
    pub fn new_with_rng(config: GameConfig, mut rng: R, now: Instant) -> Result<Self, GameError> {
        let grid = Grid::new(config.tile_count, CELL_SIZE);
        let policy = config.policy();
        let snake = Snake::new(grid.center());
        let food = food::place(&snake, &grid, &mut rng)?;

        let mut timers = TimerQueue::new();
        timers.schedule_every(now + policy.tick_interval, policy.tick_interval, Task::Tick);

        info!(speed = %config.speed, grid = config.tile_count, "session started");

        Ok(GameSession {
            grid,
            snake,
            food,
            mapper: DirectionMapper::new(),
            score: 0,
            combo: ComboTracker::new(policy.combo_timeout),
            policy,
            state: Lifecycle::Running,
            timers,
            combo_timer: None,
            fade_timer: None,
            rng,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo.count()
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    pub fn direction(&self) -> Option<Direction> {
        self.mapper.current()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            grid: &self.grid,
            snake: &self.snake,
            food: self.food,
            heading: self.mapper.current(),
        }
    }

    /// Direction and pause keys. Quitting is up to the caller.
    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Move(dir) if self.state != Lifecycle::Ended => {
                if !self.mapper.on_key(dir) {
                    debug!(?dir, "turn rejected");
                }
            }
            Key::Pause => {
                self.toggle_pause();
            }
            _ => {}
        }
    }

    pub fn toggle_pause(&mut self) -> Lifecycle {
        self.state = match self.state {
            Lifecycle::Running => Lifecycle::Paused,
            Lifecycle::Paused => Lifecycle::Running,
            Lifecycle::Ended => Lifecycle::Ended,
        };
        info!(state = ?self.state, "pause toggled");
        self.state
    }

    /// Runs every scheduled task due by `now`, earliest first.
    pub fn advance(
        &mut self,
        now: Instant,
        renderer: &mut dyn Renderer,
        presenter: &mut dyn Presenter,
    ) -> Result<(), GameError> {
        while let Some((handle, task)) = self.timers.pop_due(now) {
            match task {
                Task::Tick => self.tick(now, renderer, presenter)?,
                Task::ComboExpiry => {
                    if self.combo_timer == Some(handle) {
                        self.expire_combo(now, presenter);
                    }
                }
                Task::ComboFade => {
                    presenter.combo_changed(self.combo.count(), self.combo.remaining_fraction(now));
                }
            }
        }
        Ok(())
    }

    /// One update-then-render step.
    pub fn tick(
        &mut self,
        now: Instant,
        renderer: &mut dyn Renderer,
        presenter: &mut dyn Presenter,
    ) -> Result<(), GameError> {
        if self.state != Lifecycle::Running {
            return Ok(());
        }

        let dir = match self.mapper.consume() {
            Some(dir) => dir,
            None => {
                renderer.render(&self.frame());
                return Ok(());
            }
        };

        let new_head = self.snake.next_head(dir);
        if is_collision(new_head, &self.snake, &self.grid) {
            debug!(x = new_head.x, y = new_head.y, "crashed");
            self.end(EndReason::Collision, presenter);
            return Ok(());
        }

        if let MoveResult::Grew { .. } = self.snake.commit(new_head, self.food) {
            self.eat(now, presenter);

            match food::place(&self.snake, &self.grid, &mut self.rng) {
                Ok(cell) => self.food = cell,
                Err(e) => {
                    renderer.render(&self.frame());
                    self.end(EndReason::BoardFull, presenter);
                    return Err(e);
                }
            }
        }

        renderer.render(&self.frame());
        Ok(())
    }

    /// Moves to Ended and cancels every scheduled task. Only the first call has any effect.
    pub fn end(&mut self, reason: EndReason, presenter: &mut dyn Presenter) {
        if self.state == Lifecycle::Ended {
            return;
        }

        self.state = Lifecycle::Ended;
        self.timers.cancel_all();
        self.combo_timer = None;
        self.fade_timer = None;
        self.combo.reset();

        info!(score = self.score, length = self.snake.len(), ?reason, "session ended");
        presenter.session_ended(self.score, reason);
    }

    ///////////////////////////////////////////////////////////////////////////

    fn eat(&mut self, now: Instant, presenter: &mut dyn Presenter) {
        self.score += self.policy.points_per_food;
        presenter.score_changed(self.score);

        let count = self.combo.record_pickup(now);
        if let Some(old) = self.combo_timer.take() {
            self.timers.cancel(old);
        }
        let expires_at = now + self.combo.timeout();
        self.combo_timer = Some(self.timers.schedule_once(expires_at, Task::ComboExpiry));
        if self.fade_timer.is_none() {
            self.fade_timer = Some(self.timers.schedule_every(
                now + COMBO_FADE_INTERVAL,
                COMBO_FADE_INTERVAL,
                Task::ComboFade,
            ));
        }

        debug!(score = self.score, combo = count, "food eaten");
        presenter.combo_changed(count, 1.0);
    }

    fn expire_combo(&mut self, now: Instant, presenter: &mut dyn Presenter) {
        self.combo_timer = None;
        if let Some(fade) = self.fade_timer.take() {
            self.timers.cancel(fade);
        }

        let count = self.combo.count();
        if self.combo.expire(now) {
            debug!(combo = count, "combo expired");
            presenter.combo_changed(0, 0.0);
        }
    }

    #[cfg(test)]
    fn set_board(&mut self, snake: Snake, food: Cell, travelling: Option<Direction>) {
        self.snake = snake;
        self.food = food;
        self.mapper = match travelling {
            Some(dir) => DirectionMapper::travelling(dir),
            None => DirectionMapper::new(),
        };
    }

    #[cfg(test)]
    fn set_food(&mut self, food: Cell) {
        self.food = food;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Speed;
    use crate::snake::Direction::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        frames: usize,
        scores: Vec<u64>,
        combos: Vec<(u32, f32)>,
        ended: Vec<(u64, EndReason)>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, _frame: &Frame<'_>) {
            self.frames += 1;
        }
    }

    impl Presenter for Recorder {
        fn score_changed(&mut self, score: u64) {
            self.scores.push(score);
        }

        fn combo_changed(&mut self, combo: u32, remaining: f32) {
            self.combos.push((combo, remaining));
        }

        fn session_ended(&mut self, final_score: u64, reason: EndReason) {
            self.ended.push((final_score, reason));
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session(tile_count: u16, t0: Instant) -> GameSession<StdRng> {
        let config = GameConfig::new(Speed::Medium, tile_count).unwrap();
        GameSession::new_with_rng(config, StdRng::seed_from_u64(42), t0).unwrap()
    }

    fn snake(cells: &[(i16, i16)]) -> Snake {
        Snake::from_segments(cells.iter().map(|&(x, y)| Cell::new(x, y))).unwrap()
    }

    fn cells(s: &Snake) -> Vec<(i16, i16)> {
        s.segments().map(|c| (c.x, c.y)).collect()
    }

    // Two separate recorders can't both be borrowed mutably from one value
    fn advance(g: &mut GameSession<StdRng>, now: Instant, rec: &mut Recorder) -> Result<(), GameError> {
        let mut frames = Recorder::default();
        let res = g.advance(now, &mut frames, rec);
        rec.frames += frames.frames;
        res
    }

    #[test]
    fn fresh_session() {
        let t0 = Instant::now();
        let g = session(20, t0);

        assert_eq!(g.state(), Lifecycle::Running);
        assert_eq!(cells(g.snake()), vec![(10, 10)]);
        assert_eq!(g.direction(), None);
        assert_eq!(g.score(), 0);
        assert!(!g.grid().is_wall(g.food()));
        assert!(!g.snake().contains(g.food()));
        assert_eq!(g.next_deadline(), Some(t0 + ms(100)));
    }

    #[test]
    fn waits_for_first_key() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        let mut rec = Recorder::default();

        advance(&mut g, t0 + ms(300), &mut rec).unwrap();

        assert_eq!(cells(g.snake()), vec![(10, 10)]);
        assert_eq!(rec.frames, 3);
    }

    #[test]
    fn first_move_right() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_food(Cell::new(3, 3));
        let mut rec = Recorder::default();

        g.handle_key(Key::Move(Right));
        assert_eq!(g.direction(), Some(Right));
        advance(&mut g, t0 + ms(100), &mut rec).unwrap();

        assert_eq!(cells(g.snake()), vec![(11, 10)]);
        assert_eq!(g.score(), 0);
        assert!(rec.scores.is_empty());
    }

    #[test]
    fn eating_grows_and_scores() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_board(snake(&[(5, 5), (4, 5), (3, 5)]), Cell::new(6, 5), Some(Right));
        let mut rec = Recorder::default();

        advance(&mut g, t0 + ms(100), &mut rec).unwrap();

        assert_eq!(cells(g.snake()), vec![(6, 5), (5, 5), (4, 5), (3, 5)]);
        assert_eq!(g.score(), 10);
        assert_eq!(rec.scores, vec![10]);
        assert_eq!(g.combo(), 1);
        assert_eq!(rec.combos, vec![(1, 1.0)]);
        assert!(!g.snake().contains(g.food()));
        assert!(!g.grid().is_wall(g.food()));
    }

    #[test]
    fn wall_ends_session_once() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_board(snake(&[(1, 5)]), Cell::new(9, 9), Some(Left));
        let mut rec = Recorder::default();

        advance(&mut g, t0 + ms(100), &mut rec).unwrap();
        assert_eq!(g.state(), Lifecycle::Ended);
        assert_eq!(rec.ended, vec![(0, EndReason::Collision)]);
        assert_eq!(g.pending_timers(), 0);

        advance(&mut g, t0 + ms(1000), &mut rec).unwrap();
        g.end(EndReason::Collision, &mut rec);
        assert_eq!(rec.ended.len(), 1);
        assert_eq!(cells(g.snake()), vec![(1, 5)]);
    }

    #[test]
    fn moving_into_vacating_tail_crashes() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_board(snake(&[(5, 5), (6, 5), (6, 6), (5, 6)]), Cell::new(9, 9), Some(Left));
        let mut rec = Recorder::default();

        g.handle_key(Key::Move(Down));
        advance(&mut g, t0 + ms(100), &mut rec).unwrap();

        assert_eq!(g.state(), Lifecycle::Ended);
    }

    #[test]
    fn length_is_kept_on_plain_ticks() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_board(snake(&[(5, 5), (4, 5), (3, 5)]), Cell::new(2, 2), Some(Right));
        let mut rec = Recorder::default();

        for i in 1..=5 {
            advance(&mut g, t0 + ms(100 * i), &mut rec).unwrap();
            assert_eq!(g.snake().len(), 3);
        }
        assert_eq!(g.snake().head(), Cell::new(10, 5));
    }

    #[test]
    fn pause_twice_is_a_no_op() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.handle_key(Key::Move(Up));
        let before = (g.snake().clone(), g.food(), g.score());

        assert_eq!(g.toggle_pause(), Lifecycle::Paused);
        assert_eq!(g.toggle_pause(), Lifecycle::Running);
        assert_eq!((g.snake().clone(), g.food(), g.score()), before);
    }

    #[test]
    fn paused_ticks_do_nothing() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_food(Cell::new(3, 3));
        let mut rec = Recorder::default();

        g.handle_key(Key::Move(Up));
        g.handle_key(Key::Pause);
        advance(&mut g, t0 + ms(500), &mut rec).unwrap();
        assert_eq!(cells(g.snake()), vec![(10, 10)]);
        assert_eq!(rec.frames, 0);

        g.handle_key(Key::Pause);
        advance(&mut g, t0 + ms(600), &mut rec).unwrap();
        assert_eq!(cells(g.snake()), vec![(10, 9)]);
    }

    #[test]
    fn pause_has_no_effect_after_end() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        let mut rec = Recorder::default();

        g.end(EndReason::Collision, &mut rec);

        assert_eq!(g.toggle_pause(), Lifecycle::Ended);
        g.handle_key(Key::Move(Left));
        assert_eq!(g.direction(), None);
    }

    #[test]
    fn combo_builds_and_expires() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_board(snake(&[(2, 5)]), Cell::new(3, 5), Some(Right));
        let mut rec = Recorder::default();

        advance(&mut g, t0 + ms(100), &mut rec).unwrap();
        assert_eq!(g.combo(), 1);

        g.set_food(Cell::new(8, 5));
        advance(&mut g, t0 + ms(600), &mut rec).unwrap();
        assert_eq!(g.snake().head(), Cell::new(8, 5));
        assert_eq!(g.combo(), 2);
        assert_eq!(g.score(), 20);
        // tick, one combo expiry, one fade
        assert_eq!(g.pending_timers(), 3);

        g.toggle_pause();
        advance(&mut g, t0 + ms(2599), &mut rec).unwrap();
        assert_eq!(g.combo(), 2);
        assert!(rec.combos.iter().any(|&(c, f)| c == 2 && f > 0.0 && f < 1.0));

        advance(&mut g, t0 + ms(2600), &mut rec).unwrap();
        assert_eq!(g.combo(), 0);
        assert_eq!(rec.combos.last(), Some(&(0, 0.0)));
        assert_eq!(g.pending_timers(), 1);
    }

    #[test]
    fn ending_cancels_combo_timers() {
        let t0 = Instant::now();
        let mut g = session(20, t0);
        g.set_board(snake(&[(17, 5)]), Cell::new(18, 5), Some(Right));
        let mut rec = Recorder::default();

        advance(&mut g, t0 + ms(100), &mut rec).unwrap();
        assert_eq!(g.combo(), 1);
        assert_eq!(g.pending_timers(), 3);

        // (19, 5) is wall
        g.set_food(Cell::new(3, 3));
        advance(&mut g, t0 + ms(200), &mut rec).unwrap();
        assert_eq!(g.state(), Lifecycle::Ended);
        assert_eq!(g.pending_timers(), 0);
        assert_eq!(g.combo(), 0);
        assert_eq!(rec.ended, vec![(10, EndReason::Collision)]);
    }

    #[test]
    fn board_full_ends_session() {
        let t0 = Instant::now();
        let mut g = session(5, t0);
        let body = snake(&[(2, 3), (1, 3), (1, 2), (1, 1), (2, 1), (3, 1), (3, 2), (2, 2)]);
        g.set_board(body, Cell::new(3, 3), Some(Right));
        let mut rec = Recorder::default();

        let res = advance(&mut g, t0 + ms(100), &mut rec);

        assert_eq!(res, Err(GameError::BoardFull));
        assert_eq!(g.snake().len(), 9);
        assert_eq!(g.state(), Lifecycle::Ended);
        assert_eq!(rec.ended, vec![(10, EndReason::BoardFull)]);
        assert_eq!(g.pending_timers(), 0);
    }
}
