//! Timer queue
//!
//! setTimeout / setInterval / requestAnimationFrame bookkeeping for a
//! single-threaded host loop. The caller supplies `now`, so a pass can be
//! driven from a real clock or stepped deterministically.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Handle for clearing a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Timeout,
    Interval,
    /// Runs on the next tick regardless of elapsed time
    Frame,
}

/// Timer entry
#[derive(Debug, Clone)]
struct Timer<T> {
    task: T,
    kind: TimerKind,
    delay: Duration,
    scheduled_at: Instant,
}

impl<T> Timer<T> {
    fn due_at(&self) -> Option<Instant> {
        match self.kind {
            TimerKind::Frame => None,
            _ => Some(self.scheduled_at + self.delay),
        }
    }
}

/// Timer manager
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    timers: BTreeMap<TimerId, Timer<T>>,
    next_id: u32,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Copy> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, task: T, kind: TimerKind, delay: Duration, now: Instant) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                task,
                kind,
                delay,
                scheduled_at: now,
            },
        );
        id
    }

    /// Run `task` once after `delay`
    pub fn set_timeout(&mut self, task: T, delay: Duration, now: Instant) -> TimerId {
        self.insert(task, TimerKind::Timeout, delay, now)
    }

    /// Run `task` every `delay` (at least 1ms) until cleared
    pub fn set_interval(&mut self, task: T, delay: Duration, now: Instant) -> TimerId {
        let delay = delay.max(Duration::from_millis(1));
        self.insert(task, TimerKind::Interval, delay, now)
    }

    /// Run `task` once on the next tick
    pub fn request_frame(&mut self, task: T, now: Instant) -> TimerId {
        self.insert(task, TimerKind::Frame, Duration::ZERO, now)
    }

    /// Clear a timer, reporting whether it was still pending
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Take the tasks that are due: frame callbacks first, then timers in
    /// due order. One-shot timers are removed, intervals rescheduled.
    pub fn ready(&mut self, now: Instant) -> Vec<(TimerId, T)> {
        let mut due: Vec<(Option<Instant>, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_at().is_none_or(|at| at <= now))
            .map(|(&id, t)| (t.due_at(), id))
            .collect();
        due.sort();

        let mut ready = Vec::with_capacity(due.len());
        for (_, id) in due {
            let Some(timer) = self.timers.get_mut(&id) else {
                continue;
            };
            ready.push((id, timer.task));
            if timer.kind == TimerKind::Interval {
                timer.scheduled_at = now;
            } else {
                self.timers.remove(&id);
            }
        }
        ready
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Get time until next timer fires
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.timers
            .values()
            .map(|t| match t.due_at() {
                Some(at) => at.saturating_duration_since(now),
                None => Duration::ZERO,
            })
            .min()
    }
}
