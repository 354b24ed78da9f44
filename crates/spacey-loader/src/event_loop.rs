// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Single-threaded timer loop
//!
//! A browser-style `setTimeout` queue: timers fire in deadline order, timers
//! with equal deadlines fire in the order they were scheduled, and nothing
//! fires until the owner calls [`EventLoop::tick`].

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::{Duration, Instant};

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// A scheduled timer carrying a task
#[derive(Debug)]
pub struct Timer<T> {
    /// Unique timer ID
    pub id: TimerId,
    /// When the timer should fire
    pub deadline: Instant,
    /// What to run
    pub task: T,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (earliest deadline, then lowest id)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// The timer loop
pub struct EventLoop<T> {
    next_timer_id: Cell<u64>,
    timers: RefCell<BinaryHeap<Timer<T>>>,
    cancelled: RefCell<HashSet<TimerId>>,
}

impl<T> EventLoop<T> {
    /// Create an empty loop
    pub fn new() -> Self {
        Self {
            next_timer_id: Cell::new(1),
            timers: RefCell::new(BinaryHeap::new()),
            cancelled: RefCell::new(HashSet::new()),
        }
    }

    fn next_id(&self) -> TimerId {
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1);
        TimerId(id)
    }

    /// Schedule `task` to run after `delay_ms` (setTimeout)
    pub fn set_timeout(&self, task: T, delay_ms: u64) -> TimerId {
        let id = self.next_id();
        self.timers.borrow_mut().push(Timer {
            id,
            deadline: Instant::now() + Duration::from_millis(delay_ms),
            task,
        });
        id
    }

    /// Cancel a timer (clearTimeout). Unknown or fired ids are ignored.
    pub fn clear_timer(&self, id: TimerId) {
        if self.timers.borrow().iter().any(|t| t.id == id) {
            self.cancelled.borrow_mut().insert(id);
        }
    }

    /// Pop every timer whose deadline has passed, in firing order
    pub fn tick(&self) -> Vec<T> {
        let now = Instant::now();
        let mut ready = Vec::new();
        let mut timers = self.timers.borrow_mut();
        let mut cancelled = self.cancelled.borrow_mut();

        while let Some(timer) = timers.peek() {
            if cancelled.remove(&timer.id) {
                timers.pop();
                continue;
            }
            if timer.deadline > now {
                break;
            }
            if let Some(timer) = timers.pop() {
                ready.push(timer.task);
            }
        }
        ready
    }

    /// Number of live timers
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len() - self.cancelled.borrow().len()
    }

    /// Check if there's pending work
    pub fn has_pending_work(&self) -> bool {
        self.pending_timers() > 0
    }

    /// Get time until next timer fires
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        let timers = self.timers.borrow();
        let cancelled = self.cancelled.borrow();
        timers
            .iter()
            .filter(|t| !cancelled.contains(&t.id))
            .map(|t| t.deadline.saturating_duration_since(Instant::now()))
            .min()
    }
}

impl<T> Default for EventLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}
