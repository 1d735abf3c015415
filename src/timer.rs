use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<T> {
    handle: TimerHandle,
    due: Instant,
    period: Option<Duration>,
    task: T,
}

/// Scheduled callbacks for a single-threaded loop. Nothing runs on its own:
/// the owner asks for due tasks with [`TimerQueue::pop_due`].
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Default for TimerQueue<T> {
    fn default() -> Self {
        TimerQueue::new()
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        TimerQueue { next_id: 0, entries: vec![] }
    }

    pub fn schedule_once(&mut self, due: Instant, task: T) -> TimerHandle {
        self.insert(due, None, task)
    }

    /// First firing at `first`, then every `period` after the previous deadline.
    pub fn schedule_every(&mut self, first: Instant, period: Duration, task: T) -> TimerHandle {
        self.insert(first, Some(period), task)
    }

    /// Returns false if the handle already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Removes and returns the earliest task due at or before `now`.
    /// Periodic tasks are re-armed one period after the deadline they fired for.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerHandle, T)> {
        let idx = self.entries.iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.handle.0))
            .map(|(i, _)| i)?;

        match self.entries[idx].period {
            Some(period) => {
                let entry = &mut self.entries[idx];
                entry.due += period;
                Some((entry.handle, entry.task.clone()))
            }
            None => {
                let entry = self.entries.swap_remove(idx);
                Some((entry.handle, entry.task))
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn insert(&mut self, due: Instant, period: Option<Duration>, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, due, period, task });
        handle
    }
}
