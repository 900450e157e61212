// src/engine/broker.rs

//! The broker: a single-threaded discrete-event loop.
//!
//! `DispatchLoop` owns the simulated clock, the event queue, the worker pool
//! and the [`Scheduler`]. [`run`](DispatchLoop::run) pops events in time
//! order and hands each to the handler for its variant (see
//! [`event_handlers`](super::event_handlers)). Handlers run to completion;
//! the only way to "wait" is to schedule a future event.

use std::fmt;

use tracing::{debug, info};

use crate::config::model::SimConfig;
use crate::dag::Scheduler;
use crate::errors::{DagsimError, Result};

use super::queue::EventQueue;
use super::trace::{RunReport, TraceEvent};
use super::worker::{AlwaysProvision, Provisioner, WorkerPool};
use super::{BrokerState, SimEvent, SimTime};

pub struct DispatchLoop {
    pub(super) state: BrokerState,
    pub(super) clock: SimTime,
    pub(super) queue: EventQueue,
    pub(super) pool: WorkerPool,
    pub(super) scheduler: Scheduler,
    pub(super) provisioner: Box<dyn Provisioner>,
    /// Fixed delay between scheduling cycles.
    pub(super) cycle_delay: SimTime,
    pub(super) acks: usize,
    pub(super) executed: usize,
    pub(super) last_completion: SimTime,
    pub(super) finish_time: Option<SimTime>,
    pub(super) trace: Vec<TraceEvent>,
    label: String,
}

impl fmt::Debug for DispatchLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchLoop")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("executed", &self.executed)
            .field("pending_events", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl DispatchLoop {
    /// Create a broker in `Init` for a seeded scheduler.
    pub fn new(scheduler: Scheduler, sim: &SimConfig) -> Self {
        Self {
            state: BrokerState::Init,
            clock: 0.0,
            queue: EventQueue::new(),
            pool: WorkerPool::from_tiers(&sim.worker_tier),
            scheduler,
            provisioner: Box::new(AlwaysProvision),
            cycle_delay: sim.simulation.inter_cycle_delay,
            acks: 0,
            executed: 0,
            last_completion: 0.0,
            finish_time: None,
            trace: Vec::new(),
            label: String::from("workflow"),
        }
    }

    /// Name used in logs and in the report.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_provisioner(mut self, provisioner: Box<dyn Provisioner>) -> Self {
        self.provisioner = provisioner;
        self
    }

    pub fn state(&self) -> BrokerState {
        self.state
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// Run the simulation to termination and return its report.
    pub fn run(mut self) -> Result<RunReport> {
        self.start()?;

        while let Some((at, event)) = self.queue.pop() {
            debug_assert!(at >= self.clock, "event queue went back in time");
            self.clock = at;
            self.step(event)?;

            if self.state == BrokerState::Terminated {
                break;
            }
            if self.queue.is_empty() {
                self.queue.schedule(self.clock, SimEvent::EndOfSimulation);
            }
        }

        self.into_report()
    }

    /// Handle a single event at the current clock.
    pub fn step(&mut self, event: SimEvent) -> Result<()> {
        match (self.state, event) {
            (BrokerState::Provisioning, SimEvent::WorkerCreated { worker, created }) => {
                self.handle_worker_created(worker, created)
            }
            (BrokerState::Scheduling, SimEvent::NextCycle) => self.handle_next_cycle(),
            (
                BrokerState::Scheduling,
                SimEvent::TaskFinished {
                    worker,
                    task,
                    started,
                },
            ) => self.handle_task_finished(worker, task, started),
            (BrokerState::Scheduling, SimEvent::EndOfSimulation) => {
                self.handle_end_of_simulation()
            }
            (state, event) => Err(DagsimError::InvalidTransition {
                state: state.to_string(),
                event: event.kind().to_string(),
            }),
        }
    }

    /// `Init -> Provisioning`: request every worker in the pool.
    pub fn start(&mut self) -> Result<()> {
        if self.state != BrokerState::Init {
            return Err(DagsimError::InvalidTransition {
                state: self.state.to_string(),
                event: "Start".to_string(),
            });
        }

        info!(
            workflow = %self.label,
            policy = %self.scheduler.policy(),
            tasks = self.scheduler.graph().len(),
            workers = self.pool.len(),
            "starting simulation"
        );

        self.state = BrokerState::Provisioning;
        for worker in self.pool.workers() {
            let created = self.provisioner.create(worker);
            debug!(worker = worker.id, mips = worker.mips, "requested worker creation");
            self.queue.schedule(
                self.clock,
                SimEvent::WorkerCreated {
                    worker: worker.id,
                    created,
                },
            );
        }

        Ok(())
    }

    fn into_report(self) -> Result<RunReport> {
        let makespan = self.finish_time.ok_or_else(|| DagsimError::InvalidTransition {
            state: self.state.to_string(),
            event: "Report".to_string(),
        })?;

        Ok(RunReport {
            workflow: self.label,
            policy: self.scheduler.policy(),
            makespan,
            last_completion: self.last_completion,
            executed: self.executed,
            trace: self.trace,
        })
    }
}
