// src/dag/scheduler.rs

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::dag::graph::WorkflowGraph;
use crate::dag::policy::SchedulingPolicy;
use crate::dag::task::{Task, TaskKey};
use crate::errors::{DagsimError, Result};

/// Scheduler holds the preprocessed workflow plus the ready queue.
///
/// It is responsible for:
/// - keeping the ordered queue of ready, not yet dispatched tasks
/// - buffering tasks that became ready since the last cycle
/// - re-sorting the whole queue with the active policy each cycle
/// - marking tasks executed and releasing children whose parents are done
///
/// Dispatch itself (pairing tasks with workers) belongs to the broker.
#[derive(Debug)]
pub struct Scheduler {
    graph: WorkflowGraph,
    policy: SchedulingPolicy,
    ready_queue: VecDeque<TaskKey>,
    /// Tasks released by completions since the last [`cycle`](Self::cycle).
    pending_ready: Vec<TaskKey>,
    executed_count: usize,
}

impl Scheduler {
    /// Preprocess `graph` for `policy` and seed the queue with its roots.
    pub fn new(mut graph: WorkflowGraph, policy: SchedulingPolicy) -> Result<Self> {
        graph.preprocess(policy)?;
        Self::seeded(graph, policy)
    }

    /// Wrap an already preprocessed graph and seed the queue with its roots.
    pub fn seeded(graph: WorkflowGraph, policy: SchedulingPolicy) -> Result<Self> {
        if !graph.is_preprocessed() {
            return Err(DagsimError::NotPreprocessed);
        }
        let mut scheduler = Self {
            graph,
            policy,
            ready_queue: VecDeque::new(),
            pending_ready: Vec::new(),
            executed_count: 0,
        };
        let roots = scheduler.graph.roots().to_vec();
        scheduler.seed(&roots);
        Ok(scheduler)
    }

    /// Replace the ready queue with `roots`.
    pub fn seed(&mut self, roots: &[TaskKey]) {
        self.ready_queue = roots.iter().copied().collect();
        debug!(
            policy = %self.policy,
            roots = roots.len(),
            "scheduler seeded with workflow roots"
        );
    }

    /// Merge newly ready tasks into the queue and re-sort it.
    pub fn cycle(&mut self) {
        let merged = self.pending_ready.len();
        self.ready_queue.extend(self.pending_ready.drain(..));
        self.policy
            .order(self.ready_queue.make_contiguous(), &self.graph);

        trace!(
            merged,
            queued = self.ready_queue.len(),
            "scheduler cycle reordered ready queue"
        );
    }

    /// Record that `key` finished and release children whose parents have
    /// all executed.
    ///
    /// Returns the children that became ready. A child is released exactly
    /// once, by its last parent to finish.
    pub fn notify_executed(&mut self, key: TaskKey) -> Result<Vec<TaskKey>> {
        let task = self.graph.task_mut(key);
        if task.executed {
            return Err(DagsimError::AlreadyExecuted(task.id.clone()));
        }
        task.executed = true;
        self.executed_count += 1;

        let mut released = Vec::new();
        for &child in self.graph.task(key).children() {
            let child_task = self.graph.task(child);
            if child_task.ready {
                continue;
            }
            if child_task
                .parents()
                .iter()
                .all(|&p| self.graph.task(p).executed)
            {
                released.push(child);
            }
        }

        for &child in &released {
            self.graph.task_mut(child).ready = true;
            debug!(
                task = %self.graph.task(child).id,
                after = %self.graph.task(key).id,
                "dependencies satisfied; task is ready"
            );
        }
        self.pending_ready.extend(released.iter().copied());

        Ok(released)
    }

    /// Remove and return the head of the ready queue.
    pub fn take_next(&mut self) -> Option<TaskKey> {
        self.ready_queue.pop_front()
    }

    pub fn has_remaining_work(&self) -> bool {
        self.executed_count < self.graph.len()
    }

    pub fn executed_count(&self) -> usize {
        self.executed_count
    }

    pub fn remaining(&self) -> usize {
        self.graph.len() - self.executed_count
    }

    /// Current queue order (after the last cycle plus any dispatches).
    pub fn ready_queue(&self) -> impl Iterator<Item = TaskKey> + '_ {
        self.ready_queue.iter().copied()
    }

    pub fn pending_ready(&self) -> &[TaskKey] {
        &self.pending_ready
    }

    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn task(&self, key: TaskKey) -> &Task {
        self.graph.task(key)
    }
}
