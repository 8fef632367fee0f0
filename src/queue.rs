//! # Behavior Queue
//!
//! A single-threaded, tick-driven scheduler that runs one [`QueueItem`] at a
//! time, to completion, in FIFO order of readiness.
//!
//! ## Lifecycle
//!
//! ```text
//! queue() -> pending --(gate passes)--> ready --(first ready, FIFO)--> active
//!   active: start -> step, step, ... -> complete
//!   complete: resume shelved parent | re-queue (repeat) | discard
//! ```
//!
//! When the active item's current step is a composite, the item is pushed
//! onto the *shelf* and a synthetic item made of the composite's children
//! becomes active. When that item completes, the parent is popped off the
//! shelf and continues from the step it was paused on.
//!
//! The host calls [`BehaviorQueue::tick`] once per frame of its own loop.
//! Nothing here blocks or spawns; a step that takes time reports "not done"
//! until it is.

pub mod clock;
pub mod item;
pub mod step;
pub mod steps;

pub use clock::{Clock, ManualClock, SystemClock};
pub use item::{ItemCondition, ItemId, QueueItem};
pub use step::{Step, StepRef, step};

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Reasons [`BehaviorQueue::queue`] refuses an item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue item '{0}' has no steps")]
    EmptyItem(String),

    #[error("queue item '{name}' ({id}) is already queued or running")]
    Duplicate { name: String, id: ItemId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Minimum time between two rounds of gate checks on pending items.
    /// `Duration::ZERO` checks on every tick.
    pub readiness_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            readiness_interval: Duration::from_millis(250),
        }
    }
}

/// What a tick found to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// No item was active and none was ready.
    Idle,
    /// An item was started, advanced, shelved, resumed or completed.
    Running,
}

enum Next {
    Start,
    Advance,
    Shelve(String, Vec<StepRef>),
    Run(StepRef),
}

pub struct BehaviorQueue {
    config: QueueConfig,
    clock: Box<dyn Clock>,
    pending: VecDeque<QueueItem>,
    active: Option<QueueItem>,
    /// Paused ancestors of the active item, outermost first.
    shelf: Vec<QueueItem>,
    last_readiness_check: Option<Instant>,
}

impl Default for BehaviorQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorQueue {
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: QueueConfig, clock: impl Clock + 'static) -> Self {
        BehaviorQueue {
            config,
            clock: Box::new(clock),
            pending: VecDeque::new(),
            active: None,
            shelf: Vec::new(),
            last_readiness_check: None,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// The item currently being advanced.
    pub fn active(&self) -> Option<&QueueItem> {
        self.active.as_ref()
    }

    /// Items waiting to run, in queue order.
    pub fn pending(&self) -> impl Iterator<Item = &QueueItem> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Items paused on the shelf, outermost first.
    pub fn shelved(&self) -> impl Iterator<Item = &QueueItem> {
        self.shelf.iter()
    }

    pub fn shelf_depth(&self) -> usize {
        self.shelf.len()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// True if an item with `id` is active, shelved or pending.
    pub fn contains(&self, id: ItemId) -> bool {
        self.active.iter().any(|i| i.id() == id)
            || self.shelf.iter().any(|i| i.id() == id)
            || self.pending.iter().any(|i| i.id() == id)
    }

    /// Append an item to the pending list.
    ///
    /// Items without steps, and items whose identity is already active,
    /// shelved or pending, are refused.
    pub fn queue(&mut self, item: QueueItem) -> Result<ItemId, QueueError> {
        if item.nodes().is_empty() {
            debug!(item = item.name(), "refusing queue item without steps");
            return Err(QueueError::EmptyItem(item.name().to_string()));
        }

        let id = item.id();
        if self.contains(id) {
            debug!(item = item.name(), %id, "refusing duplicate queue item");
            return Err(QueueError::Duplicate {
                name: item.name().to_string(),
                id,
            });
        }

        debug!(item = item.name(), %id, steps = item.nodes().len(), "queued item");
        self.pending.push_back(item);
        Ok(id)
    }

    /// Advance the queue by one step of work.
    pub fn tick(&mut self) -> TickStatus {
        let now = self.clock.now();
        if self.readiness_due(now) {
            self.refresh_readiness();
            self.last_readiness_check = Some(now);
        }

        if self.active.is_none() && !self.select_next() {
            return TickStatus::Idle;
        }

        let Some(action) = self.next_action() else {
            return TickStatus::Idle;
        };

        match action {
            Next::Start => {
                if let Some(item) = self.active.as_mut() {
                    trace!(item = item.name(), "starting item");
                    item.start();
                }
            }
            Next::Advance => {
                let more = self.active.as_mut().is_some_and(QueueItem::advance);
                if !more {
                    self.complete_active();
                }
            }
            Next::Shelve(step_name, children) => self.shelve(&step_name, children),
            Next::Run(node) => node.borrow_mut().run(),
        }

        TickStatus::Running
    }

    fn readiness_due(&self, now: Instant) -> bool {
        match self.last_readiness_check {
            Some(last) => now.saturating_duration_since(last) >= self.config.readiness_interval,
            None => true,
        }
    }

    fn refresh_readiness(&mut self) {
        for item in self.pending.iter_mut().filter(|i| !i.is_ready()) {
            if item.check_ready() {
                trace!(item = item.name(), "item became ready");
            }
        }
    }

    /// Move the first ready pending item into the active slot.
    fn select_next(&mut self) -> bool {
        let Some(position) = self.pending.iter().position(QueueItem::is_ready) else {
            return false;
        };
        self.active = self.pending.remove(position);
        if let Some(item) = &self.active {
            debug!(item = item.name(), id = %item.id(), "activated item");
        }
        self.active.is_some()
    }

    fn next_action(&self) -> Option<Next> {
        let item = self.active.as_ref()?;
        if !item.is_started() {
            return Some(Next::Start);
        }

        let Some(node) = item.current_node() else {
            return Some(Next::Advance);
        };

        if node.borrow().is_done() {
            return Some(Next::Advance);
        }

        let children = node.borrow_mut().children();
        if !children.is_empty() {
            return Some(Next::Shelve(node.borrow().name().to_string(), children));
        }

        Some(Next::Run(node.clone()))
    }

    /// Pause the active item and run `children` as an item of their own.
    fn shelve(&mut self, step_name: &str, children: Vec<StepRef>) {
        let Some(parent) = self.active.take() else {
            return;
        };

        let child = QueueItem::child_of(&parent, step_name, children);
        debug!(
            parent = parent.name(),
            child = child.name(),
            depth = self.shelf.len() + 1,
            "shelving item"
        );
        self.shelf.push(parent);
        self.active = Some(child);
    }

    fn complete_active(&mut self) {
        let Some(mut finished) = self.active.take() else {
            return;
        };
        finished.finish();
        debug!(
            item = finished.name(),
            completed = finished.completed_nodes(),
            "item complete"
        );

        if let Some(parent) = self.shelf.pop() {
            if finished.parent() != Some(parent.id()) {
                warn!(
                    child = finished.name(),
                    parent = parent.name(),
                    "shelf top is not the parent of the completed item"
                );
            }
            debug!(item = parent.name(), node = ?parent.active_node(), "resuming shelved item");
            self.active = Some(parent);
            return;
        }

        if finished.is_repeat() {
            finished.reset();
            if let Err(e) = self.queue(finished) {
                debug!(error = %e, "repeat not re-queued");
            }
        }
    }

    /// Drop everything: pending items, the shelf and the active item.
    pub fn reset(&mut self) {
        debug!(
            pending = self.pending.len(),
            shelved = self.shelf.len(),
            "resetting queue"
        );
        self.pending.clear();
        self.shelf.clear();
        self.active = None;
        self.last_readiness_check = None;
    }

    /// Like [`reset`](Self::reset), but keep items flagged `persist`.
    ///
    /// Pending persistent items keep their order. A persistent item that was
    /// in flight (active, or at the bottom of the shelf) is reset and put at
    /// the front of the pending list.
    pub fn soft_reset(&mut self) {
        let in_flight = if self.shelf.is_empty() {
            self.active.take()
        } else {
            Some(self.shelf.remove(0))
        };
        self.shelf.clear();
        self.active = None;
        self.pending.retain(QueueItem::is_persist);

        if let Some(mut root) = in_flight.filter(QueueItem::is_persist) {
            root.reset();
            self.pending.push_front(root);
        }

        self.last_readiness_check = None;
        debug!(kept = self.pending.len(), "soft reset queue");
    }
}
