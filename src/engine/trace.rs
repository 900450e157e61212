// src/engine/trace.rs

//! Per-run output: the event trace and the makespan report.

use crate::dag::{SchedulingPolicy, TaskId};

use super::{SimTime, WorkerId};

/// One observable step of a run, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    WorkerAck {
        at: SimTime,
        worker: WorkerId,
        mips: f64,
        created: bool,
    },
    /// Ready queue after reordering, and the idle workers fastest first.
    Cycle {
        at: SimTime,
        ready: Vec<TaskId>,
        idle: Vec<WorkerId>,
    },
    Dispatch {
        at: SimTime,
        task: TaskId,
        worker: WorkerId,
    },
    Completion {
        at: SimTime,
        task: TaskId,
        worker: WorkerId,
        start: SimTime,
        end: SimTime,
        /// Tasks executed so far, including this one.
        executed: usize,
    },
    Finished {
        at: SimTime,
        executed: usize,
    },
}

impl TraceEvent {
    pub fn at(&self) -> SimTime {
        match self {
            TraceEvent::WorkerAck { at, .. }
            | TraceEvent::Cycle { at, .. }
            | TraceEvent::Dispatch { at, .. }
            | TraceEvent::Completion { at, .. }
            | TraceEvent::Finished { at, .. } => *at,
        }
    }
}

/// Result of simulating one workflow under one policy.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub workflow: String,
    pub policy: SchedulingPolicy,
    /// Simulated clock when the run terminated.
    pub makespan: SimTime,
    /// Time the last task finished (at or before `makespan`).
    pub last_completion: SimTime,
    pub executed: usize,
    pub trace: Vec<TraceEvent>,
}

impl RunReport {
    /// Task ids in the order they were dispatched.
    pub fn dispatch_order(&self) -> Vec<&str> {
        self.trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Dispatch { task, .. } => Some(task.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Task ids in the order they completed.
    pub fn completion_order(&self) -> Vec<&str> {
        self.trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Completion { task, .. } => Some(task.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> impl Iterator<Item = &TraceEvent> {
        self.trace
            .iter()
            .filter(|e| matches!(e, TraceEvent::Completion { .. }))
    }

    pub fn cycles(&self) -> usize {
        self.trace
            .iter()
            .filter(|e| matches!(e, TraceEvent::Cycle { .. }))
            .count()
    }
}
