use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::engine::BoundCondition;
use crate::queue::step::{StepRef, step_key};

/// Identity of a queue item, derived from its name and the identity of its
/// step handles. Two items built from the same handles under the same name
/// share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

impl ItemId {
    fn derive(name: &str, nodes: &[StepRef]) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        for node in nodes {
            step_key(node).hash(&mut hasher);
        }
        ItemId(hasher.finish())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

/// Gate deciding when a pending item may run. It sees the item's steps.
pub type ItemCondition = Box<dyn FnMut(&[StepRef]) -> bool>;

pub type ItemHook = Box<dyn FnMut()>;

/// A named, gated list of steps run one after another by the
/// [`BehaviorQueue`](crate::queue::BehaviorQueue).
///
/// # Examples
///
/// ```
/// use clause_lang::queue::{QueueItem, step, steps::Action};
///
/// let item = QueueItem::new("greet", vec![step(Action::once("wave", || {}))])
///     .when(|_| true)
///     .repeat(true);
///
/// assert_eq!(item.name(), "greet");
/// assert_eq!(item.active_node(), None);
/// ```
pub struct QueueItem {
    id: ItemId,
    name: String,
    nodes: Vec<StepRef>,
    active_node: Option<usize>,
    completed_nodes: usize,
    condition: Option<ItemCondition>,
    ready: bool,
    child_of: Option<ItemId>,
    repeat: bool,
    persist: bool,
    on_start: Option<ItemHook>,
    on_done: Option<ItemHook>,
}

impl fmt::Debug for QueueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItem")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("active_node", &self.active_node)
            .field("completed_nodes", &self.completed_nodes)
            .field("ready", &self.ready)
            .field("child_of", &self.child_of)
            .field("repeat", &self.repeat)
            .field("persist", &self.persist)
            .finish()
    }
}

impl QueueItem {
    pub fn new(name: impl Into<String>, nodes: Vec<StepRef>) -> Self {
        let name = name.into();
        QueueItem {
            id: ItemId::derive(&name, &nodes),
            name,
            nodes,
            active_node: None,
            completed_nodes: 0,
            condition: None,
            ready: false,
            child_of: None,
            repeat: false,
            persist: false,
            on_start: None,
            on_done: None,
        }
    }

    /// The synthetic item that runs a composite step's children while
    /// `parent` sits on the shelf.
    pub(crate) fn child_of(parent: &QueueItem, step_name: &str, nodes: Vec<StepRef>) -> Self {
        let mut child = QueueItem::new(format!("{}/{}", parent.name, step_name), nodes);
        child.child_of = Some(parent.id);
        child.ready = true;
        child
    }

    /// Gate the item on a closure. Without a gate the item is ready as soon
    /// as it is checked.
    pub fn when(mut self, condition: impl FnMut(&[StepRef]) -> bool + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Gate the item on a condition string.
    pub fn when_condition(self, condition: BoundCondition) -> Self {
        self.when(move |_| condition.is_satisfied())
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn on_start(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_done(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_done = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[StepRef] {
        &self.nodes
    }

    /// Index of the current step; `None` until the item starts.
    pub fn active_node(&self) -> Option<usize> {
        self.active_node
    }

    pub fn completed_nodes(&self) -> usize {
        self.completed_nodes
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Id of the item shelved while this one runs, for synthetic items.
    pub fn parent(&self) -> Option<ItemId> {
        self.child_of
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    pub fn is_persist(&self) -> bool {
        self.persist
    }

    pub fn is_started(&self) -> bool {
        self.active_node.is_some()
    }

    pub(crate) fn current_node(&self) -> Option<&StepRef> {
        self.active_node.and_then(|i| self.nodes.get(i))
    }

    /// Evaluate the gate unless the item is already ready.
    pub(crate) fn check_ready(&mut self) -> bool {
        if !self.ready {
            self.ready = match self.condition.as_mut() {
                Some(condition) => condition(&self.nodes),
                None => true,
            };
        }
        self.ready
    }

    /// Point at the first step and fire the start hooks.
    pub(crate) fn start(&mut self) {
        self.active_node = Some(0);
        if let Some(hook) = self.on_start.as_mut() {
            hook();
        }
        if let Some(first) = self.nodes.first() {
            first.borrow_mut().on_start();
        }
    }

    /// Close the current step and move to the next one. Returns false when
    /// there is no next step.
    pub(crate) fn advance(&mut self) -> bool {
        let Some(index) = self.active_node else {
            return false;
        };

        self.nodes[index].borrow_mut().on_done();
        self.completed_nodes += 1;

        let next = index + 1;
        match self.nodes.get(next) {
            Some(node) => {
                self.active_node = Some(next);
                node.borrow_mut().on_start();
                true
            }
            None => false,
        }
    }

    pub(crate) fn finish(&mut self) {
        if let Some(hook) = self.on_done.as_mut() {
            hook();
        }
    }

    /// Back to the freshly-queued state, steps included.
    pub(crate) fn reset(&mut self) {
        self.active_node = None;
        self.completed_nodes = 0;
        self.ready = false;
        for node in &self.nodes {
            node.borrow_mut().reset();
        }
    }
}
