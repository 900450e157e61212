// src/engine/mod.rs

//! Discrete-event dispatch engine.
//!
//! This module ties together:
//! - the simulated clock and its event queue ([`queue`])
//! - the worker pool and the provisioning seam ([`worker`])
//! - the broker state machine that reacts to:
//!   - worker creation acknowledgements
//!   - the fixed-delay scheduling timer
//!   - task completions
//!   - end of simulation
//!
//! Everything here is single-threaded and synchronous: simulated time only
//! advances by popping the next scheduled event.

use std::fmt;

use tracing::info_span;

use crate::config::model::{SimConfig, WorkflowFile};
use crate::dag::{SchedulingPolicy, Scheduler, TaskKey, WorkflowGraph};
use crate::errors::Result;

/// Simulated seconds.
pub type SimTime = f64;

/// Worker identifier, assigned sequentially in tier order.
pub type WorkerId = usize;

/// Events flowing through the broker's queue.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Provisioning answered a creation request.
    WorkerCreated { worker: WorkerId, created: bool },
    /// Fixed-delay timer: run one scheduling cycle.
    NextCycle,
    /// A worker finished the task it was holding.
    TaskFinished {
        worker: WorkerId,
        task: TaskKey,
        started: SimTime,
    },
    /// No further events are pending.
    EndOfSimulation,
}

impl SimEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::WorkerCreated { .. } => "WorkerCreated",
            SimEvent::NextCycle => "NextCycle",
            SimEvent::TaskFinished { .. } => "TaskFinished",
            SimEvent::EndOfSimulation => "EndOfSimulation",
        }
    }
}

/// Lifecycle of a [`DispatchLoop`].
///
/// `Init -> Provisioning -> Scheduling -> Terminated`; every event is only
/// accepted in the state that expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    Init,
    Provisioning,
    Scheduling,
    Terminated,
}

impl fmt::Display for BrokerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BrokerState::Init => "Init",
            BrokerState::Provisioning => "Provisioning",
            BrokerState::Scheduling => "Scheduling",
            BrokerState::Terminated => "Terminated",
        };
        f.write_str(s)
    }
}

pub mod broker;
pub mod event_handlers;
pub mod queue;
pub mod trace;
pub mod worker;

pub use broker::DispatchLoop;
pub use queue::EventQueue;
pub use trace::{RunReport, TraceEvent};
pub use worker::{AlwaysProvision, Provisioner, Worker, WorkerPool, WorkerStatus};

/// Simulate one workflow under one policy with the default provisioner.
pub fn simulate(
    workflow: &WorkflowFile,
    policy: SchedulingPolicy,
    sim: &SimConfig,
) -> Result<RunReport> {
    simulate_with(workflow, policy, sim, Box::new(AlwaysProvision))
}

/// Simulate one workflow under one policy, asking `provisioner` whether each
/// worker gets created.
pub fn simulate_with(
    workflow: &WorkflowFile,
    policy: SchedulingPolicy,
    sim: &SimConfig,
    provisioner: Box<dyn Provisioner>,
) -> Result<RunReport> {
    let span = info_span!("run", workflow = %workflow.name(), %policy);
    let _enter = span.enter();

    let graph = WorkflowGraph::from_config(workflow, sim.simulation.length_scale)?;
    let scheduler = Scheduler::new(graph, policy)?;

    DispatchLoop::new(scheduler, sim)
        .with_label(workflow.name())
        .with_provisioner(provisioner)
        .run()
}
