//! Simulated-time timers
//!
//! Two kinds: a repeating [`IntervalTimer`] that turns elapsed time into whole
//! periods, and a [`Scheduler`] of one-shot deferred tasks. Both run on
//! simulation time only, never the wall clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Repeating timer driven by an accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalTimer {
    period: Duration,
    accumulator: Duration,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulator: Duration::ZERO,
        }
    }

    /// Add elapsed time and return how many periods completed
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.period.is_zero() {
            return 1;
        }
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut fired = 0;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// What happens when input re-enable is scheduled while one is already pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReenablePolicy {
    /// Every bounce gets its own timer; the earliest to fire re-enables input
    #[default]
    Overlap,
    /// A new bounce cancels the pending timer and starts a fresh one
    Reschedule,
}

/// Deferred work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    ReenableInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled {
    id: TaskId,
    task: Task,
    deadline: Duration,
}

/// One-shot tasks keyed by deadline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    queue: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.queue.push(Scheduled {
            id,
            task,
            deadline: self.now.saturating_add(delay),
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|s| s.id != id);
        self.queue.len() != before
    }

    /// Cancel every pending instance of `task`
    pub fn cancel_task(&mut self, task: Task) -> usize {
        let before = self.queue.len();
        self.queue.retain(|s| s.task != task);
        before - self.queue.len()
    }

    /// Advance the clock and return due tasks in deadline order
    pub fn advance(&mut self, dt: Duration) -> Vec<Task> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;

        let mut due: Vec<Scheduled> = Vec::new();
        self.queue.retain(|s| {
            if s.deadline <= now {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.deadline, s.id));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn pending(&self, task: Task) -> usize {
        self.queue.iter().filter(|s| s.task == task).count()
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}
