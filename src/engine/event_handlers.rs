// src/engine/event_handlers.rs

//! One handler per [`SimEvent`](super::SimEvent) variant.

use tracing::{debug, info, warn};

use crate::dag::{TaskId, TaskKey};
use crate::errors::{DagsimError, Result};

use super::broker::DispatchLoop;
use super::trace::TraceEvent;
use super::{BrokerState, SimEvent, SimTime, WorkerId};

impl DispatchLoop {
    /// Record a creation acknowledgement. The last one starts scheduling.
    ///
    /// A failed worker only shrinks the pool; it is not retried.
    pub(super) fn handle_worker_created(
        &mut self,
        worker: WorkerId,
        created: bool,
    ) -> Result<()> {
        self.pool.mark_created(worker, created)?;
        self.acks += 1;

        let mips = self.pool.get(worker).map(|w| w.mips).unwrap_or_default();
        self.trace.push(TraceEvent::WorkerAck {
            at: self.clock,
            worker,
            mips,
            created,
        });

        if created {
            debug!(at = self.clock, worker, mips, "worker created");
        } else {
            warn!(at = self.clock, worker, mips, "worker creation failed; continuing without it");
        }

        if self.acks < self.pool.len() {
            return Ok(());
        }

        let usable = self.pool.usable();
        if usable == 0 {
            return Err(DagsimError::NoUsableWorkers);
        }

        info!(
            at = self.clock,
            usable,
            failed = self.pool.len() - usable,
            "all workers acknowledged; starting scheduling"
        );
        self.state = BrokerState::Scheduling;
        self.queue.schedule(self.clock, SimEvent::NextCycle);
        Ok(())
    }

    /// One scheduling cycle: reorder, pair ready tasks with the fastest idle
    /// workers, and arm the timer for the next cycle if work remains.
    pub(super) fn handle_next_cycle(&mut self) -> Result<()> {
        self.scheduler.cycle();

        let idle = self.pool.idle_by_speed();
        let ready: Vec<TaskId> = self
            .scheduler
            .ready_queue()
            .map(|k| self.scheduler.task(k).id.clone())
            .collect();

        debug!(at = self.clock, ?ready, ?idle, "scheduling cycle");
        self.trace.push(TraceEvent::Cycle {
            at: self.clock,
            ready,
            idle: idle.clone(),
        });

        for worker in idle {
            let Some(task) = self.scheduler.take_next() else {
                break;
            };
            self.dispatch(task, worker)?;
        }

        if !self.scheduler.has_remaining_work() {
            debug!(at = self.clock, "no remaining work; timer not re-armed");
            return Ok(());
        }

        if self.pool.busy() == 0 && self.scheduler.ready_queue().next().is_none() {
            return Err(DagsimError::Stalled {
                at: self.clock,
                remaining: self.scheduler.remaining(),
            });
        }

        self.queue
            .schedule(self.clock + self.cycle_delay, SimEvent::NextCycle);
        Ok(())
    }

    fn dispatch(&mut self, task: TaskKey, worker: WorkerId) -> Result<()> {
        let work_length = self.scheduler.task(task).work_length;
        let duration = self.pool.claim(worker, task)?.execution_time(work_length);
        let task_id = self.scheduler.task(task).id.clone();

        info!(
            at = self.clock,
            task = %task_id,
            worker,
            duration,
            "dispatching task"
        );
        self.trace.push(TraceEvent::Dispatch {
            at: self.clock,
            task: task_id,
            worker,
        });

        self.queue.schedule(
            self.clock + duration,
            SimEvent::TaskFinished {
                worker,
                task,
                started: self.clock,
            },
        );
        Ok(())
    }

    /// Free the worker and propagate the completion into the scheduler.
    ///
    /// Newly ready tasks wait for the next timer tick.
    pub(super) fn handle_task_finished(
        &mut self,
        worker: WorkerId,
        task: TaskKey,
        started: SimTime,
    ) -> Result<()> {
        let held = self.pool.release(worker)?;
        if held != task {
            return Err(DagsimError::Other(anyhow::anyhow!(
                "worker #{worker} finished {:?} but was holding {:?}",
                task,
                held
            )));
        }

        let released = self.scheduler.notify_executed(task)?;
        self.executed += 1;
        self.last_completion = self.clock;

        let task_id = self.scheduler.task(task).id.clone();
        info!(
            at = self.clock,
            task = %task_id,
            worker,
            start = started,
            end = self.clock,
            executed = self.executed,
            released = released.len(),
            "task finished"
        );
        self.trace.push(TraceEvent::Completion {
            at: self.clock,
            task: task_id,
            worker,
            start: started,
            end: self.clock,
            executed: self.executed,
        });

        Ok(())
    }

    /// `Scheduling -> Terminated`: the clock now is the makespan.
    pub(super) fn handle_end_of_simulation(&mut self) -> Result<()> {
        if self.scheduler.has_remaining_work() {
            return Err(DagsimError::Stalled {
                at: self.clock,
                remaining: self.scheduler.remaining(),
            });
        }

        self.state = BrokerState::Terminated;
        self.finish_time = Some(self.clock);
        self.trace.push(TraceEvent::Finished {
            at: self.clock,
            executed: self.executed,
        });

        info!(
            at = self.clock,
            executed = self.executed,
            last_completion = self.last_completion,
            "simulation finished"
        );
        Ok(())
    }
}
