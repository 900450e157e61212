// tests/scheduler_policy.rs

use dagsim::dag::{SchedulingPolicy, Scheduler, TaskKey, WorkflowGraph};
use dagsim::errors::DagsimError;
use dagsim_test_utils::builders::{diamond, WorkflowBuilder};
use dagsim_test_utils::init_tracing;

fn scheduler_for(wf: &dagsim::config::WorkflowFile, policy: SchedulingPolicy) -> Scheduler {
    let graph = WorkflowGraph::from_config(wf, 1_000.0).unwrap();
    Scheduler::new(graph, policy).unwrap()
}

fn key(s: &Scheduler, id: &str) -> TaskKey {
    s.graph().key_of(id).unwrap()
}

fn queue_ids(s: &Scheduler) -> Vec<String> {
    s.ready_queue().map(|k| s.task(k).id.clone()).collect()
}

#[test]
fn shortest_runtime_first_orders_ascending() {
    init_tracing();
    let wf = WorkflowBuilder::new("roots")
        .job("slow", 3.0)
        .job("fast", 1.0)
        .job("mid", 2.0)
        .build();
    let mut s = scheduler_for(&wf, SchedulingPolicy::Srf);

    assert_eq!(queue_ids(&s), vec!["slow", "fast", "mid"]);
    s.cycle();
    assert_eq!(queue_ids(&s), vec!["fast", "mid", "slow"]);
}

#[test]
fn equal_keys_keep_queue_order() {
    let wf = WorkflowBuilder::new("ties")
        .job("first", 2.0)
        .job("second", 2.0)
        .job("short", 1.0)
        .job("third", 2.0)
        .build();
    let mut s = scheduler_for(&wf, SchedulingPolicy::Srf);
    s.cycle();

    assert_eq!(queue_ids(&s), vec!["short", "first", "second", "third"]);
}

#[test]
fn level_based_orders_ascending_level() {
    // X -> X2, Y -> Y2 -> Y3. Y3 (level 3) is released before X2 (level 2).
    let wf = WorkflowBuilder::new("levels")
        .job("X", 1.0)
        .job("Y", 1.0)
        .job("X2", 1.0)
        .job("Y2", 1.0)
        .job("Y3", 1.0)
        .child("X2", &["X"])
        .child("Y2", &["Y"])
        .child("Y3", &["Y2"])
        .build();
    let mut s = scheduler_for(&wf, SchedulingPolicy::Lb);

    s.cycle();
    assert_eq!(s.take_next(), Some(key(&s, "X")));
    assert_eq!(s.take_next(), Some(key(&s, "Y")));

    s.notify_executed(key(&s, "Y")).unwrap();
    s.cycle();
    assert_eq!(s.take_next(), Some(key(&s, "Y2")));

    s.notify_executed(key(&s, "Y2")).unwrap();
    s.notify_executed(key(&s, "X")).unwrap();
    let pending: Vec<TaskKey> = s.pending_ready().to_vec();
    assert_eq!(pending, vec![key(&s, "Y3"), key(&s, "X2")]);

    s.cycle();
    assert_eq!(queue_ids(&s), vec!["X2", "Y3"]);
}

#[test]
fn subsequent_task_based_orders_descending_descendants() {
    let wf = WorkflowBuilder::new("fanout")
        .job("leaf", 1.0)
        .job("hub", 1.0)
        .job("hub1", 1.0)
        .job("hub2", 1.0)
        .child("hub1", &["hub"])
        .child("hub2", &["hub1"])
        .build();
    let mut s = scheduler_for(&wf, SchedulingPolicy::Stb);

    s.cycle();
    assert_eq!(queue_ids(&s), vec!["hub", "leaf"]);
}

#[test]
fn child_is_released_by_its_last_parent_only() {
    init_tracing();
    let mut s = scheduler_for(&diamond(), SchedulingPolicy::Srf);
    let (a, b, c, d) = (key(&s, "A"), key(&s, "B"), key(&s, "C"), key(&s, "D"));

    assert_eq!(s.notify_executed(a).unwrap(), vec![b, c]);
    assert!(s.task(b).is_ready());
    assert!(!s.task(d).is_ready());

    assert!(s.notify_executed(b).unwrap().is_empty());
    assert!(!s.task(d).is_ready());

    assert_eq!(s.notify_executed(c).unwrap(), vec![d]);
    assert!(s.task(d).is_ready());
    assert_eq!(s.pending_ready(), &[b, c, d]);
}

#[test]
fn notifying_twice_is_rejected() {
    let mut s = scheduler_for(&diamond(), SchedulingPolicy::Srf);
    let a = key(&s, "A");
    s.notify_executed(a).unwrap();

    match s.notify_executed(a) {
        Err(DagsimError::AlreadyExecuted(id)) => assert_eq!(id, "A"),
        other => panic!("expected AlreadyExecuted, got {other:?}"),
    }
    assert_eq!(s.executed_count(), 1);
}

#[test]
fn remaining_work_until_every_task_executed() {
    let mut s = scheduler_for(&diamond(), SchedulingPolicy::Srf);
    for id in ["A", "B", "C"] {
        s.notify_executed(key(&s, id)).unwrap();
        assert!(s.has_remaining_work(), "work remains after {id}");
    }
    s.notify_executed(key(&s, "D")).unwrap();
    assert!(!s.has_remaining_work());
    assert_eq!(s.remaining(), 0);
}

#[test]
fn chain_order_beats_runtime_key() {
    // A(5) -> B(1) -> C(3): only one task is ever ready at a time.
    let wf = WorkflowBuilder::new("chain")
        .job("A", 5.0)
        .job("B", 1.0)
        .job("C", 3.0)
        .child("B", &["A"])
        .child("C", &["B"])
        .build();
    let mut s = scheduler_for(&wf, SchedulingPolicy::Srf);

    let mut order = Vec::new();
    while s.has_remaining_work() {
        s.cycle();
        let next = s.take_next().expect("a task is ready");
        assert!(s.take_next().is_none());
        order.push(s.task(next).id.clone());
        s.notify_executed(next).unwrap();
    }
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[test]
fn policy_names_parse() {
    assert_eq!("srf".parse::<SchedulingPolicy>(), Ok(SchedulingPolicy::Srf));
    assert_eq!("LB".parse::<SchedulingPolicy>(), Ok(SchedulingPolicy::Lb));
    assert_eq!(
        "subsequent-task-based".parse::<SchedulingPolicy>(),
        Ok(SchedulingPolicy::Stb)
    );
    assert!("fifo".parse::<SchedulingPolicy>().is_err());
}

#[test]
fn seeding_requires_a_preprocessed_graph() {
    let graph = WorkflowGraph::from_config(&diamond(), 1_000.0).unwrap();
    match Scheduler::seeded(graph.clone(), SchedulingPolicy::Srf) {
        Err(DagsimError::NotPreprocessed) => {}
        other => panic!("expected NotPreprocessed, got {other:?}"),
    }

    let mut graph = graph;
    graph.preprocess(SchedulingPolicy::Srf).unwrap();
    let s = Scheduler::seeded(graph, SchedulingPolicy::Srf).unwrap();
    assert_eq!(queue_ids(&s), vec!["A"]);
}
