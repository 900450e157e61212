// tests/property_dag.rs

use std::collections::HashMap;

use dagsim::config::WorkflowFile;
use dagsim::dag::{SchedulingPolicy, WorkflowGraph};
use dagsim::engine::{self, TraceEvent};
use dagsim_test_utils::builders::{SimConfigBuilder, WorkflowBuilder};
use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use proptest::prelude::*;

/// Random DAG: task `i` may only depend on tasks `< i`.
fn dag_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<Vec<usize>>)> {
    (1usize..12).prop_flat_map(|n| {
        let runtimes = proptest::collection::vec(0u32..50, n)
            .prop_map(|r| r.into_iter().map(f64::from).collect::<Vec<_>>());
        let parents = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    proptest::collection::vec(0..i, 0..=i.min(3)).boxed()
                }
            })
            .collect::<Vec<_>>();
        (runtimes, parents)
    })
}

fn policy_strategy() -> impl Strategy<Value = SchedulingPolicy> {
    prop_oneof![
        Just(SchedulingPolicy::Srf),
        Just(SchedulingPolicy::Lb),
        Just(SchedulingPolicy::Stb),
    ]
}

fn task_id(i: usize) -> String {
    format!("t{i:02}")
}

fn build(runtimes: &[f64], parents: &[Vec<usize>]) -> WorkflowFile {
    let mut builder = WorkflowBuilder::new("random");
    for (i, runtime) in runtimes.iter().enumerate() {
        builder = builder.job(&task_id(i), *runtime);
    }
    for (i, ps) in parents.iter().enumerate() {
        if ps.is_empty() {
            continue;
        }
        let ids: Vec<String> = ps.iter().map(|p| task_id(*p)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        builder = builder.child(&task_id(i), &refs);
    }
    builder.build()
}

proptest! {
    #[test]
    fn levels_are_one_past_the_deepest_parent((runtimes, parents) in dag_strategy()) {
        let mut graph = WorkflowGraph::from_config(&build(&runtimes, &parents), 1_000.0).unwrap();
        graph.preprocess(SchedulingPolicy::Lb).unwrap();

        for (_, task) in graph.tasks() {
            let expected = task
                .parents()
                .iter()
                .filter_map(|p| graph.task(*p).level())
                .max()
                .map_or(1, |deepest| deepest + 1);
            prop_assert_eq!(task.level(), Some(expected));
        }
    }

    #[test]
    fn descendants_match_reachability((runtimes, parents) in dag_strategy()) {
        let mut graph = WorkflowGraph::from_config(&build(&runtimes, &parents), 1_000.0).unwrap();
        graph.preprocess(SchedulingPolicy::Stb).unwrap();

        let mut reach: DiGraphMap<usize, ()> = DiGraphMap::new();
        for i in 0..runtimes.len() {
            reach.add_node(i);
        }
        for (child, ps) in parents.iter().enumerate() {
            for p in ps {
                reach.add_edge(*p, child, ());
            }
        }

        for from in 0..runtimes.len() {
            let expected: Vec<String> = (0..runtimes.len())
                .filter(|to| *to != from && has_path_connecting(&reach, from, *to, None))
                .map(task_id)
                .collect();
            let actual = graph.descendant_ids(&task_id(from)).unwrap();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn runs_respect_dependencies(
        (runtimes, parents) in dag_strategy(),
        policy in policy_strategy(),
        fast in 1usize..3,
    ) {
        let sim = SimConfigBuilder::new()
            .tier(1_000.0, 1)
            .tier(2_500.0, fast)
            .inter_cycle_delay(10.0)
            .build();
        let report = engine::simulate(&build(&runtimes, &parents), policy, &sim).unwrap();

        prop_assert_eq!(report.executed, runtimes.len());
        prop_assert!(report.makespan >= report.last_completion);

        let mut started: HashMap<String, f64> = HashMap::new();
        let mut finished: HashMap<String, f64> = HashMap::new();
        for event in &report.trace {
            match event {
                TraceEvent::Dispatch { at, task, .. } => {
                    prop_assert!(started.insert(task.clone(), *at).is_none(), "{} dispatched twice", task);
                }
                TraceEvent::Completion { task, end, .. } => {
                    finished.insert(task.clone(), *end);
                }
                _ => {}
            }
        }
        prop_assert_eq!(started.len(), runtimes.len());

        for (child, ps) in parents.iter().enumerate() {
            let child_start = started[&task_id(child)];
            for p in ps {
                prop_assert!(finished[&task_id(*p)] <= child_start);
            }
        }
    }
}
