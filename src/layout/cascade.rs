//! Cascading reveal
//!
//! "Expand all" does not jump to the fully expanded tree. It reveals one depth
//! level at a time: the first level is applied at once, every following level
//! after a fixed delay. Time is driven explicitly through `advance(dt)`, so the
//! scheduler works from a frame loop, a timer, or a test without real waits.

use std::collections::VecDeque;
use std::time::Duration;

// =============================================================================
// DELAY QUEUE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled<T> {
    due: Duration,
    task: T,
}

/// Queue of tasks released once their delay has elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayQueue<T> {
    /// Ordered by `due`; equal deadlines keep insertion order
    tasks: VecDeque<Scheduled<T>>,
    /// Time advanced so far
    clock: Duration,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
            clock: Duration::ZERO,
        }
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to be released `delay` from now
    pub fn schedule(&mut self, delay: Duration, task: T) {
        let due = self.clock + delay;
        let position = self.tasks.partition_point(|scheduled| scheduled.due <= due);
        self.tasks.insert(position, Scheduled { due, task });
    }

    /// Move time forward and release every task that became due, in order
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.clock += dt;
        let mut due = Vec::new();
        while self
            .tasks
            .front()
            .is_some_and(|scheduled| scheduled.due <= self.clock)
        {
            if let Some(scheduled) = self.tasks.pop_front() {
                due.push(scheduled.task);
            }
        }
        due
    }

    /// Time left until the next task is released
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks
            .front()
            .map(|scheduled| scheduled.due.saturating_sub(self.clock))
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// =============================================================================
// CASCADE
// =============================================================================

/// One level of a running cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeStep {
    /// Expand every collapsed node at or above this depth
    pub level: u32,
    /// Steps still scheduled after this one
    pub remaining: usize,
}

/// Level-by-level reveal schedule
#[derive(Debug, Clone)]
pub struct CascadeReveal {
    queue: DelayQueue<u32>,
    level_delay: Duration,
}

impl CascadeReveal {
    pub fn new(level_delay: Duration) -> Self {
        Self {
            queue: DelayQueue::new(),
            level_delay,
        }
    }

    /// Plan the levels `first..=last`. Returns the first step, to be applied
    /// immediately; the rest are released by [`CascadeReveal::advance`].
    pub fn start(&mut self, first: u32, last: u32) -> Option<CascadeStep> {
        self.queue.clear();
        if first > last {
            return None;
        }

        let mut delay = Duration::ZERO;
        for level in first + 1..=last {
            delay += self.level_delay;
            self.queue.schedule(delay, level);
        }

        tracing::debug!(first, last, delay_ms = self.level_delay.as_millis() as u64, "cascade planned");
        Some(CascadeStep {
            level: first,
            remaining: self.queue.len(),
        })
    }

    /// Steps that became due during `dt`, in level order
    pub fn advance(&mut self, dt: Duration) -> Vec<CascadeStep> {
        let levels = self.queue.advance(dt);
        let mut remaining = self.queue.len() + levels.len();
        levels
            .into_iter()
            .map(|level| {
                remaining -= 1;
                CascadeStep { level, remaining }
            })
            .collect()
    }

    /// Whether steps are still pending
    pub fn is_active(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.next_due()
    }

    pub fn cancel(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_delay_queue_releases_in_order() {
        let mut queue = DelayQueue::new();
        queue.schedule(MS * 20, "b");
        queue.schedule(MS * 10, "a");
        queue.schedule(MS * 20, "c");

        assert!(queue.advance(MS * 5).is_empty());
        assert_eq!(queue.next_due(), Some(MS * 5));
        assert_eq!(queue.advance(MS * 5), vec!["a"]);
        assert_eq!(queue.advance(MS * 100), vec!["b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut queue = DelayQueue::new();
        queue.advance(MS * 50);
        queue.schedule(MS * 10, 1);
        assert!(queue.advance(MS * 9).is_empty());
        assert_eq!(queue.advance(MS), vec![1]);
    }

    #[test]
    fn test_cascade_first_level_immediate() {
        let mut cascade = CascadeReveal::new(MS * 700);
        let first = cascade.start(1, 3).unwrap();
        assert_eq!(first, CascadeStep { level: 1, remaining: 2 });
        assert!(cascade.is_active());

        assert!(cascade.advance(MS * 699).is_empty());
        assert_eq!(
            cascade.advance(MS),
            vec![CascadeStep { level: 2, remaining: 1 }]
        );
        assert_eq!(
            cascade.advance(MS * 700),
            vec![CascadeStep { level: 3, remaining: 0 }]
        );
        assert!(!cascade.is_active());
    }

    #[test]
    fn test_cascade_catch_up_on_long_frame() {
        let mut cascade = CascadeReveal::new(MS * 100);
        cascade.start(0, 3);
        let steps = cascade.advance(MS * 1000);
        assert!(matches!(
            steps.as_slice(),
            [
                CascadeStep { level: 1, remaining: 2 },
                CascadeStep { level: 2, remaining: 1 },
                CascadeStep { level: 3, remaining: 0 },
            ]
        ));
    }

    #[test]
    fn test_cascade_single_level_and_cancel() {
        let mut cascade = CascadeReveal::new(MS * 100);
        assert_eq!(cascade.start(2, 2), Some(CascadeStep { level: 2, remaining: 0 }));
        assert!(!cascade.is_active());
        assert_eq!(cascade.start(3, 2), None);

        cascade.start(0, 5);
        cascade.cancel();
        assert!(!cascade.is_active());
        assert!(cascade.advance(MS * 1000).is_empty());
    }
}
