// tests/queue_tests.rs

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use clause_lang::queue::steps::{Action, If, Sequence, Wait, While, gate};
use clause_lang::queue::{
    BehaviorQueue, Clock, ManualClock, QueueConfig, QueueError, QueueItem, StepRef, TickStatus,
    step,
};
use clause_lang::registry::PredicateRegistry;
use clause_lang::{ConditionEngine, FactSheet};
use pretty_assertions::assert_eq;

type Log = Rc<RefCell<Vec<String>>>;

fn every_tick() -> (BehaviorQueue, ManualClock) {
    let clock = ManualClock::new();
    let config = QueueConfig {
        readiness_interval: Duration::ZERO,
    };
    (BehaviorQueue::with_clock(config, clock.clone()), clock)
}

fn logged(log: &Log, name: &'static str) -> StepRef {
    let log = Rc::clone(log);
    step(Action::once(name, move || log.borrow_mut().push(name.to_string())))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Tick until the queue reports idle; returns the number of busy ticks.
fn run_to_idle(queue: &mut BehaviorQueue) -> usize {
    for ticks in 0..1000 {
        if queue.tick() == TickStatus::Idle {
            return ticks;
        }
    }
    panic!("queue never went idle");
}

// ============================================================================
// Queueing
// ============================================================================

#[test]
fn test_empty_item_is_rejected() {
    let (mut queue, _) = every_tick();
    let err = queue.queue(QueueItem::new("nothing", Vec::new())).unwrap_err();

    assert_eq!(err, QueueError::EmptyItem("nothing".to_string()));
    assert_eq!(queue.pending_len(), 0);
}

#[test]
fn test_duplicate_item_is_rejected() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let shared = logged(&log, "a");

    let id = queue.queue(QueueItem::new("job", vec![shared.clone()])).unwrap();
    let err = queue.queue(QueueItem::new("job", vec![shared.clone()])).unwrap_err();
    assert_eq!(
        err,
        QueueError::Duplicate {
            name: "job".to_string(),
            id
        }
    );

    // Same steps under another name, or another step under the same name,
    // are different items.
    assert!(queue.queue(QueueItem::new("other", vec![shared])).is_ok());
    assert!(queue.queue(QueueItem::new("job", vec![logged(&log, "a")])).is_ok());
    assert_eq!(queue.pending_len(), 3);
}

#[test]
fn test_active_item_counts_as_duplicate() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let shared = logged(&log, "a");

    let id = queue.queue(QueueItem::new("job", vec![shared.clone()])).unwrap();
    queue.tick();
    assert_eq!(queue.active().map(QueueItem::id), Some(id));
    assert!(queue.contains(id));
    assert!(queue.queue(QueueItem::new("job", vec![shared])).is_err());
}

// ============================================================================
// Running
// ============================================================================

#[test]
fn test_single_item_lifecycle() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    queue
        .queue(QueueItem::new("job", vec![logged(&log, "a"), logged(&log, "b")]))
        .unwrap();

    assert_eq!(queue.tick(), TickStatus::Running); // start
    assert_eq!(queue.active().and_then(QueueItem::active_node), Some(0));
    assert_eq!(queue.tick(), TickStatus::Running); // run a
    assert_eq!(entries(&log), ["a"]);
    assert_eq!(queue.tick(), TickStatus::Running); // advance to b
    assert_eq!(queue.active().map(QueueItem::completed_nodes), Some(1));
    assert_eq!(queue.tick(), TickStatus::Running); // run b
    assert_eq!(queue.tick(), TickStatus::Running); // complete
    assert!(queue.is_idle());
    assert_eq!(queue.tick(), TickStatus::Idle);
    assert_eq!(entries(&log), ["a", "b"]);
}

#[test]
fn test_one_item_runs_at_a_time_in_queue_order() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    queue.queue(QueueItem::new("first", vec![logged(&log, "1a"), logged(&log, "1b")])).unwrap();
    queue.queue(QueueItem::new("second", vec![logged(&log, "2a")])).unwrap();

    queue.tick();
    assert_eq!(queue.active().map(QueueItem::name), Some("first"));
    assert_eq!(queue.pending_len(), 1);

    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["1a", "1b", "2a"]);
}

#[test]
fn test_steps_are_polled_until_done() {
    let (mut queue, _) = every_tick();
    let polls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&polls);
    let slow = step(Action::new("slow", move || {
        counter.set(counter.get() + 1);
        counter.get() == 3
    }));
    queue.queue(QueueItem::new("job", vec![slow])).unwrap();

    run_to_idle(&mut queue);
    assert_eq!(polls.get(), 3);
}

#[test]
fn test_item_hooks_fire_around_the_run() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let (start_log, done_log) = (Rc::clone(&log), Rc::clone(&log));
    let item = QueueItem::new("job", vec![logged(&log, "work")])
        .on_start(move || start_log.borrow_mut().push("start".into()))
        .on_done(move || done_log.borrow_mut().push("done".into()));
    queue.queue(item).unwrap();

    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["start", "work", "done"]);
}

// ============================================================================
// Readiness
// ============================================================================

#[test]
fn test_gated_item_waits_and_later_items_overtake_it() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let open = Rc::new(Cell::new(false));
    let gate_open = Rc::clone(&open);

    queue
        .queue(QueueItem::new("gated", vec![logged(&log, "gated")]).when(move |_| gate_open.get()))
        .unwrap();
    queue.queue(QueueItem::new("free", vec![logged(&log, "free")])).unwrap();

    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["free"]);
    assert_eq!(queue.pending_len(), 1);

    open.set(true);
    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["free", "gated"]);
}

#[test]
fn test_readiness_is_debounced() {
    let clock = ManualClock::new();
    let config = QueueConfig {
        readiness_interval: Duration::from_millis(100),
    };
    let mut queue = BehaviorQueue::with_clock(config, clock.clone());

    let checks = Rc::new(Cell::new(0));
    let open = Rc::new(Cell::new(false));
    let (counter, gate_open) = (Rc::clone(&checks), Rc::clone(&open));
    let log = Log::default();
    queue
        .queue(QueueItem::new("gated", vec![logged(&log, "x")]).when(move |_| {
            counter.set(counter.get() + 1);
            gate_open.get()
        }))
        .unwrap();

    assert_eq!(queue.tick(), TickStatus::Idle);
    assert_eq!(checks.get(), 1);

    open.set(true);
    assert_eq!(queue.tick(), TickStatus::Idle);
    clock.advance(Duration::from_millis(99));
    assert_eq!(queue.tick(), TickStatus::Idle);
    assert_eq!(checks.get(), 1);

    clock.advance(Duration::from_millis(1));
    assert_eq!(queue.tick(), TickStatus::Running);
    assert_eq!(checks.get(), 2);
}

#[test]
fn test_readiness_is_sticky() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let checks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&checks);

    queue.queue(QueueItem::new("first", vec![logged(&log, "first")])).unwrap();
    queue
        .queue(QueueItem::new("second", vec![logged(&log, "second")]).when(move |_| {
            counter.set(counter.get() + 1);
            true
        }))
        .unwrap();

    run_to_idle(&mut queue);
    assert_eq!(checks.get(), 1);
    assert_eq!(entries(&log), ["first", "second"]);
}

#[test]
fn test_condition_string_gate() {
    let (mut queue, _) = every_tick();
    let facts = FactSheet::new();
    facts.set("hp", 80);
    let engine = Rc::new(ConditionEngine::new(PredicateRegistry::builder().with(&facts).build()));

    let log = Log::default();
    let item = QueueItem::new("heal", vec![logged(&log, "heal")])
        .when_condition(ConditionEngine::bind(&engine, "Fact(hp) < 50"));
    queue.queue(item).unwrap();

    run_to_idle(&mut queue);
    assert!(entries(&log).is_empty());

    facts.set("hp", 30);
    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["heal"]);
}

// ============================================================================
// Shelving
// ============================================================================

#[test]
fn test_composite_is_shelved_and_resumed_in_place() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let sequence = Sequence::boxed("seq", vec![logged(&log, "s1"), logged(&log, "s2")]);
    let parent = QueueItem::new("main", vec![logged(&log, "before"), sequence, logged(&log, "after")]);
    let parent_id = parent.id();
    queue.queue(parent).unwrap();

    while queue.shelf_depth() == 0 {
        queue.tick();
    }

    let shelved = queue.shelved().next().unwrap();
    assert_eq!(shelved.id(), parent_id);
    assert_eq!(shelved.active_node(), Some(1));

    let child = queue.active().unwrap();
    assert_eq!(child.name(), "main/seq");
    assert_eq!(child.parent(), Some(parent_id));
    assert_eq!(child.nodes().len(), 2);

    while queue.shelf_depth() == 1 {
        queue.tick();
    }
    let resumed = queue.active().unwrap();
    assert_eq!(resumed.id(), parent_id);
    assert_eq!(resumed.active_node(), Some(1));

    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["before", "s1", "s2", "after"]);
}

#[test]
fn test_nested_composites_stack_on_the_shelf() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let inner = Sequence::boxed("inner", vec![logged(&log, "deep")]);
    let outer = Sequence::boxed("outer", vec![logged(&log, "shallow"), inner]);
    queue.queue(QueueItem::new("root", vec![outer])).unwrap();

    let mut deepest = 0;
    while queue.tick() == TickStatus::Running {
        deepest = deepest.max(queue.shelf_depth());
    }

    assert_eq!(deepest, 2);
    assert_eq!(entries(&log), ["shallow", "deep"]);
}

#[test]
fn test_if_runs_children_only_when_gate_holds() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let yes = step(If::new("yes", Box::new(|| true), vec![logged(&log, "taken")]));
    let no = step(If::new("no", Box::new(|| false), vec![logged(&log, "skipped")]));
    queue.queue(QueueItem::new("branches", vec![no, yes])).unwrap();

    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["taken"]);
}

#[test]
fn test_while_repeats_until_gate_closes() {
    let (mut queue, _) = every_tick();
    let count = Rc::new(Cell::new(0));
    let (seen, bump) = (Rc::clone(&count), Rc::clone(&count));
    let body = step(Action::once("bump", move || bump.set(bump.get() + 1)));
    let looping = Rc::new(RefCell::new(While::new(
        "loop",
        Box::new(move || seen.get() < 3),
        vec![body],
    )));
    let handle: StepRef = looping.clone();
    queue.queue(QueueItem::new("counter", vec![handle])).unwrap();

    run_to_idle(&mut queue);
    assert_eq!(count.get(), 3);
    assert_eq!(looping.borrow().iterations(), 3);
}

#[test]
fn test_while_gate_from_condition_string() {
    let (mut queue, _) = every_tick();
    let facts = FactSheet::new();
    facts.set("arrows", 2);
    let engine = Rc::new(ConditionEngine::new(PredicateRegistry::builder().with(&facts).build()));

    let quiver = facts.clone();
    let shoot = step(Action::once("shoot", move || {
        let left = quiver.get("arrows").and_then(|v| v.as_i64()).unwrap_or(0);
        quiver.set("arrows", left - 1);
    }));
    let looping = step(While::new(
        "volley",
        gate(ConditionEngine::bind(&engine, "Fact(arrows) > 0")),
        vec![shoot],
    ));
    queue.queue(QueueItem::new("fight", vec![looping])).unwrap();

    run_to_idle(&mut queue);
    assert_eq!(facts.get("arrows"), Some(0.into()));
}

#[test]
fn test_wait_step_uses_the_clock() {
    let (mut queue, clock) = every_tick();
    let log = Log::default();
    let source: Rc<dyn Clock> = Rc::new(clock.clone());
    let wait = step(Wait::new("pause", Duration::from_secs(1), source));
    queue.queue(QueueItem::new("job", vec![wait, logged(&log, "after")])).unwrap();

    for _ in 0..5 {
        queue.tick();
    }
    assert!(entries(&log).is_empty());

    clock.advance(Duration::from_secs(1));
    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["after"]);
}

// ============================================================================
// Repeat and reset
// ============================================================================

#[test]
fn test_repeat_item_is_reset_and_requeued() {
    let (mut queue, _) = every_tick();
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    let item = QueueItem::new("patrol", vec![step(Action::once("lap", move || {
        counter.set(counter.get() + 1)
    }))])
    .repeat(true);
    let id = item.id();
    queue.queue(item).unwrap();

    for _ in 0..9 {
        queue.tick();
    }
    assert_eq!(runs.get(), 3);
    assert!(queue.contains(id));

    let requeued = queue.pending().next().unwrap();
    assert_eq!(requeued.active_node(), None);
    assert_eq!(requeued.completed_nodes(), 0);
}

#[test]
fn test_reset_clears_everything() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let sequence = Sequence::boxed("seq", vec![logged(&log, "s1")]);
    queue.queue(QueueItem::new("main", vec![sequence]).persist(true)).unwrap();
    queue.queue(QueueItem::new("other", vec![logged(&log, "o")])).unwrap();
    while queue.shelf_depth() == 0 {
        queue.tick();
    }

    queue.reset();
    assert!(queue.is_idle());
    assert_eq!(queue.shelf_depth(), 0);
    assert_eq!(queue.pending_len(), 0);
    assert_eq!(queue.tick(), TickStatus::Idle);
}

#[test]
fn test_soft_reset_keeps_persistent_items() {
    let (mut queue, _) = every_tick();
    let log = Log::default();
    let closed = || false;

    let sequence = Sequence::boxed("seq", vec![logged(&log, "s1"), logged(&log, "s2")]);
    queue.queue(QueueItem::new("root", vec![sequence]).persist(true)).unwrap();
    queue
        .queue(QueueItem::new("transient", vec![logged(&log, "t")]).when(move |_| closed()))
        .unwrap();
    queue
        .queue(QueueItem::new("kept", vec![logged(&log, "k")]).when(move |_| closed()).persist(true))
        .unwrap();

    while queue.shelf_depth() == 0 {
        queue.tick();
    }
    queue.soft_reset();

    assert!(queue.is_idle());
    assert_eq!(queue.shelf_depth(), 0);
    let names: Vec<&str> = queue.pending().map(QueueItem::name).collect();
    assert_eq!(names, ["root", "kept"]);

    let root = queue.pending().next().unwrap();
    assert_eq!(root.active_node(), None);
    assert!(!root.is_ready());

    run_to_idle(&mut queue);
    assert_eq!(entries(&log), ["s1", "s2"]);
}
