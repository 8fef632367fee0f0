//! Stock steps: a polled closure, a timed wait, and the composites the
//! queue flattens through shelving.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::engine::BoundCondition;
use crate::queue::clock::Clock;
use crate::queue::step::{Step, StepRef, step};

/// A gate evaluated by conditional composites.
pub type Gate = Box<dyn Fn() -> bool>;

/// Turn a bound condition into a gate for [`If`] / [`While`].
pub fn gate(condition: BoundCondition) -> Gate {
    Box::new(move || condition.is_satisfied())
}

fn all_done(children: &[StepRef]) -> bool {
    children.iter().all(|c| c.borrow().is_done())
}

fn reset_all(children: &[StepRef]) {
    for child in children {
        child.borrow_mut().reset();
    }
}

/// A leaf step that polls a closure once per tick until it returns true.
pub struct Action {
    name: String,
    action: Box<dyn FnMut() -> bool>,
    done: bool,
}

impl Action {
    pub fn new(name: impl Into<String>, action: impl FnMut() -> bool + 'static) -> Self {
        Action {
            name: name.into(),
            action: Box::new(action),
            done: false,
        }
    }

    /// An action that finishes on its first run.
    pub fn once(name: impl Into<String>, mut action: impl FnMut() + 'static) -> Self {
        Self::new(name, move || {
            action();
            true
        })
    }
}

impl Step for Action {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn run(&mut self) {
        if !self.done {
            self.done = (self.action)();
        }
    }

    fn reset(&mut self) {
        self.done = false;
    }
}

/// Waits for a fixed duration, measured from `on_start`.
pub struct Wait {
    name: String,
    duration: Duration,
    clock: Rc<dyn Clock>,
    started_at: Option<Instant>,
}

impl Wait {
    pub fn new(name: impl Into<String>, duration: Duration, clock: Rc<dyn Clock>) -> Self {
        Wait {
            name: name.into(),
            duration,
            clock,
            started_at: None,
        }
    }
}

impl Step for Wait {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        self.started_at
            .is_some_and(|start| self.clock.now().duration_since(start) >= self.duration)
    }

    fn run(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
    }

    fn on_start(&mut self) {
        self.started_at = Some(self.clock.now());
    }

    fn reset(&mut self) {
        self.started_at = None;
    }
}

/// Runs its children in order. Done once every child is done.
pub struct Sequence {
    name: String,
    children: Vec<StepRef>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, children: Vec<StepRef>) -> Self {
        Sequence {
            name: name.into(),
            children,
        }
    }

    pub fn boxed(name: impl Into<String>, children: Vec<StepRef>) -> StepRef {
        step(Self::new(name, children))
    }
}

impl Step for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        all_done(&self.children)
    }

    fn run(&mut self) {}

    fn children(&mut self) -> Vec<StepRef> {
        if self.is_done() {
            return Vec::new();
        }
        self.children.clone()
    }

    fn reset(&mut self) {
        reset_all(&self.children);
    }
}

/// Runs its children once if the gate holds when the step starts.
pub struct If {
    name: String,
    gate: Gate,
    children: Vec<StepRef>,
    entered: Option<bool>,
}

impl If {
    pub fn new(name: impl Into<String>, gate: Gate, children: Vec<StepRef>) -> Self {
        If {
            name: name.into(),
            gate,
            children,
            entered: None,
        }
    }

    fn decide(&mut self) -> bool {
        *self.entered.get_or_insert_with(|| (self.gate)())
    }
}

impl Step for If {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        match self.entered {
            Some(true) => all_done(&self.children),
            Some(false) => true,
            None => false,
        }
    }

    fn run(&mut self) {
        self.decide();
    }

    fn children(&mut self) -> Vec<StepRef> {
        if !self.decide() || all_done(&self.children) {
            return Vec::new();
        }
        self.children.clone()
    }

    fn on_start(&mut self) {
        let entered = self.decide();
        trace!(step = %self.name, entered, "if gate");
    }

    fn reset(&mut self) {
        self.entered = None;
        reset_all(&self.children);
    }
}

/// Re-runs its children for as long as the gate holds, checking the gate
/// each time the children have all finished.
pub struct While {
    name: String,
    gate: Gate,
    children: Vec<StepRef>,
    iterations: usize,
    finished: bool,
}

impl While {
    pub fn new(name: impl Into<String>, gate: Gate, children: Vec<StepRef>) -> Self {
        While {
            name: name.into(),
            gate,
            children,
            iterations: 0,
            finished: false,
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl Step for While {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_done(&self) -> bool {
        self.finished
    }

    fn run(&mut self) {}

    fn children(&mut self) -> Vec<StepRef> {
        if self.finished {
            return Vec::new();
        }

        let between_iterations = self.iterations == 0 || all_done(&self.children);
        if between_iterations {
            if !(self.gate)() {
                trace!(step = %self.name, iterations = self.iterations, "while gate closed");
                self.finished = true;
                return Vec::new();
            }
            reset_all(&self.children);
            self.iterations += 1;
        }

        self.children.clone()
    }

    fn reset(&mut self) {
        self.iterations = 0;
        self.finished = false;
        reset_all(&self.children);
    }
}
