// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! define / require / execute
//!
//! Module payloads are registered by `define` and only run on the first
//! `require`. Calls submitted through `execute` are queued and flushed from a
//! zero-delay timer; a call whose module is not defined yet goes back on the
//! queue for the next flush.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use spacey_bundle::Call;
use tracing::{debug, trace};

use crate::error::{LoaderError, Result};
use crate::event_loop::{EventLoop, TimerId};
use crate::exports::{Exports, ModuleRecord};

/// A module body. Runs at most once, with the loader for nested requires and
/// the module record whose exports it fills in.
pub type Payload = Box<dyn FnOnce(&Loader, &ModuleRecord) -> Result<()>>;

/// Tasks the loader schedules on its event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Flush,
}

/// Outcome of one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Calls that ran
    pub executed: usize,
    /// Calls put back on the queue
    pub deferred: usize,
}

struct State {
    payloads: RefCell<HashMap<String, Payload>>,
    modules: RefCell<HashMap<String, Rc<ModuleRecord>>>,
    queue: RefCell<Vec<Call>>,
    scheduled: Cell<Option<TimerId>>,
    event_loop: EventLoop<Task>,
}

/// The loader runtime. Clones share state.
#[derive(Clone)]
pub struct Loader {
    state: Rc<State>,
}

impl Loader {
    /// Create a loader with its own event loop
    pub fn new() -> Self {
        Self {
            state: Rc::new(State {
                payloads: RefCell::new(HashMap::new()),
                modules: RefCell::new(HashMap::new()),
                queue: RefCell::new(Vec::new()),
                scheduled: Cell::new(None),
                event_loop: EventLoop::new(),
            }),
        }
    }

    /// Register a module payload without running it
    pub fn define<F>(&self, name: impl Into<String>, payload: F) -> Result<()>
    where
        F: FnOnce(&Loader, &ModuleRecord) -> Result<()> + 'static,
    {
        let name = name.into();
        if self.is_defined(&name) {
            return Err(LoaderError::AlreadyDefined(name));
        }
        debug!("define {}", name);
        self.state
            .payloads
            .borrow_mut()
            .insert(name, Box::new(payload));
        self.schedule();
        Ok(())
    }

    /// Instantiate `name` if needed and return its exports.
    ///
    /// The module record is registered before the payload runs, so a cyclic
    /// require observes the partially filled exports instead of recursing.
    pub fn require(&self, name: &str) -> Result<Exports> {
        if let Some(record) = self.state.modules.borrow().get(name) {
            return Ok(record.exports());
        }

        let payload = self
            .state
            .payloads
            .borrow_mut()
            .remove(name)
            .ok_or_else(|| LoaderError::NotFound(name.to_string()))?;

        let record = Rc::new(ModuleRecord::new(name));
        self.state
            .modules
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&record));

        trace!("instantiate {}", name);
        payload(self, &record)?;
        Ok(record.exports())
    }

    /// Queue a call to run once its module is defined. Never runs anything
    /// synchronously.
    pub fn execute(&self, call: Call) {
        self.state.queue.borrow_mut().push(call);
        self.schedule();
    }

    /// Whether `name` has a payload or an instance
    pub fn is_defined(&self, name: &str) -> bool {
        self.state.payloads.borrow().contains_key(name)
            || self.state.modules.borrow().contains_key(name)
    }

    /// Whether `name` has been instantiated
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.state.modules.borrow().contains_key(name)
    }

    /// Calls waiting for the next flush
    pub fn queued(&self) -> usize {
        self.state.queue.borrow().len()
    }

    /// Whether a flush is scheduled
    pub fn flush_scheduled(&self) -> bool {
        self.state.scheduled.get().is_some()
    }

    fn schedule(&self) {
        if self.state.scheduled.get().is_none() {
            let id = self.state.event_loop.set_timeout(Task::Flush, 0);
            self.state.scheduled.set(Some(id));
        }
    }

    /// Run exactly the calls queued so far.
    ///
    /// Calls whose module is not defined are queued again. The first failing
    /// call aborts the flush; calls after it in the same flush are dropped.
    pub fn flush(&self) -> Result<FlushStats> {
        let calls = std::mem::take(&mut *self.state.queue.borrow_mut());
        let mut stats = FlushStats::default();

        for call in calls {
            if self.is_defined(&call.module) {
                let exports = self.require(&call.module)?;
                exports.call(&call.module, &call.function, &call.args)?;
                stats.executed += 1;
            } else {
                self.execute(call);
                stats.deferred += 1;
            }
        }

        if stats.executed + stats.deferred > 0 {
            debug!(
                "flush ran {} calls, deferred {}",
                stats.executed, stats.deferred
            );
        }
        Ok(stats)
    }

    /// Drive the event loop until it is idle.
    ///
    /// Stops early when a flush runs nothing but deferrals, since only a new
    /// `define` can make progress then. The retry flush stays scheduled.
    pub fn run_pending(&self) -> Result<()> {
        loop {
            let tasks = self.state.event_loop.tick();
            if tasks.is_empty() {
                match self.state.event_loop.time_until_next_timer() {
                    None => return Ok(()),
                    Some(wait) if wait > Duration::ZERO => std::thread::sleep(wait),
                    Some(_) => {}
                }
                continue;
            }

            for task in tasks {
                match task {
                    Task::Flush => {
                        self.state.scheduled.set(None);
                        let stats = self.flush()?;
                        if stats.executed == 0 && stats.deferred > 0 {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
