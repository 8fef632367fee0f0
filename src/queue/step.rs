use std::cell::RefCell;
use std::rc::Rc;

/// One unit of work inside a queue item.
///
/// The queue drives a step across ticks: `on_start` when it becomes the
/// item's current step, then every tick either `run` (while not
/// `is_done`) or, once done, `on_done` before moving on. A step must never
/// block inside `run`; anything that takes time reports "not done" until it
/// is.
///
/// A composite step exposes its sub-steps through `children`. The queue
/// does not run them inline: it shelves the current item and runs the
/// children as an item of their own, then resumes the composite.
pub trait Step {
    fn name(&self) -> &str;

    fn is_done(&self) -> bool;

    fn run(&mut self);

    /// Sub-steps still to run. Leaf steps return nothing.
    fn children(&mut self) -> Vec<StepRef> {
        Vec::new()
    }

    fn on_start(&mut self) {}

    fn on_done(&mut self) {}

    /// Return to the initial state, so a repeating item can run it again.
    fn reset(&mut self) {}
}

/// Shared handle to a step. Composites and the items that run their
/// children hold the same handles.
pub type StepRef = Rc<RefCell<dyn Step>>;

/// Wrap a step into a [`StepRef`].
pub fn step<S: Step + 'static>(step: S) -> StepRef {
    Rc::new(RefCell::new(step))
}

/// Identity of a step handle, stable for as long as the step is alive.
pub fn step_key(step: &StepRef) -> usize {
    Rc::as_ptr(step) as *const () as usize
}
