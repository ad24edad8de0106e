//! Deferred continuations.
//!
//! The table never sleeps. It posts wake-ups onto a [`Timeline`] measured from
//! its own creation, and whoever drives the table (an async loop, or a test)
//! advances the clock. Every wake-up carries the generation of the table state
//! it was issued against; the table drops any whose generation is stale.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use super::Seat;

/// A continuation the table has asked to be woken for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Wake {
    /// An automated seat should pick and play a card.
    RobotTurn { seat: Seat, generation: u64 },
    /// The post-trick pause is over: clear the table and continue.
    ClearTrick { generation: u64 },
}

impl Wake {
    pub fn generation(&self) -> u64 {
        match *self {
            Wake::RobotTurn { generation, .. } | Wake::ClearTrick { generation } => generation,
        }
    }
}

/// A virtual clock with a queue of pending wake-ups.
#[derive(Debug, Default)]
pub struct Timeline {
    now: Duration,
    seq: u64,
    // Ordered by deadline, then by insertion.
    queue: BinaryHeap<Reverse<(Duration, u64, Wake)>>,
}

impl Timeline {
    /// Time elapsed on the virtual clock.
    #[cfg(test)]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of wake-ups still pending.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Posts `wake` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, wake: Wake) {
        self.seq += 1;
        self.queue.push(Reverse((self.now + delay, self.seq, wake)));
    }

    /// The deadline of the earliest pending wake-up.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse((at, _, _))| *at)
    }

    /// Removes the earliest wake-up due at or before `now`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, now: Duration) -> Option<Wake> {
        match self.next_deadline() {
            Some(at) if at <= now => {
                let Reverse((at, _, wake)) = self.queue.pop().expect("peeked");
                self.now = self.now.max(at);
                Some(wake)
            }
            _ => None,
        }
    }

    /// Moves the clock forward to `now`. The clock never runs backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Drops every pending wake-up.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
