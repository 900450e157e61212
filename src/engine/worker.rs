// src/engine/worker.rs

//! Simulated workers and the provisioning seam.
//!
//! The broker asks a [`Provisioner`] whether each requested worker comes up.
//! Production runs use [`AlwaysProvision`]; tests can supply their own
//! implementation to model creation failures.

use crate::config::model::WorkerTier;
use crate::dag::TaskKey;
use crate::errors::{DagsimError, Result};

use super::{SimTime, WorkerId};

/// Decides the outcome of a worker creation request.
pub trait Provisioner: Send {
    /// Return `true` if `worker` was created successfully.
    fn create(&mut self, worker: &Worker) -> bool;
}

/// Provisioner that creates every worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysProvision;

impl Provisioner for AlwaysProvision {
    fn create(&mut self, _worker: &Worker) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Creation requested, no acknowledgement yet.
    Requested,
    /// Created; may hold a task.
    Available,
    /// Creation failed; never used.
    Failed,
}

/// A single-task compute unit with a fixed speed.
#[derive(Debug, Clone)]
pub struct Worker {
    pub id: WorkerId,
    /// Instructions per simulated second.
    pub mips: f64,
    status: WorkerStatus,
    running: Option<TaskKey>,
}

impl Worker {
    pub fn new(id: WorkerId, mips: f64) -> Self {
        Self {
            id,
            mips,
            status: WorkerStatus::Requested,
            running: None,
        }
    }

    pub fn status(&self) -> WorkerStatus {
        self.status
    }

    pub fn running(&self) -> Option<TaskKey> {
        self.running
    }

    pub fn is_idle(&self) -> bool {
        self.status == WorkerStatus::Available && self.running.is_none()
    }

    /// Simulated time needed to execute `work_length` instructions.
    pub fn execution_time(&self, work_length: u64) -> SimTime {
        work_length as f64 / self.mips
    }
}

/// The broker's workers. Each holds at most one task at a time.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// `count` workers per tier, ids assigned in tier order from 0.
    pub fn from_tiers(tiers: &[WorkerTier]) -> Self {
        let workers = tiers
            .iter()
            .flat_map(|tier| std::iter::repeat_n(tier.mips, tier.count))
            .enumerate()
            .map(|(id, mips)| Worker::new(id, mips))
            .collect();
        Self { workers }
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(id)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Workers that were created successfully.
    pub fn usable(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| w.status == WorkerStatus::Available)
            .count()
    }

    pub fn busy(&self) -> usize {
        self.workers.iter().filter(|w| w.running.is_some()).count()
    }

    /// Idle workers, fastest first; equal speeds by ascending id.
    pub fn idle_by_speed(&self) -> Vec<WorkerId> {
        let mut idle: Vec<&Worker> = self.workers.iter().filter(|w| w.is_idle()).collect();
        idle.sort_by(|a, b| b.mips.total_cmp(&a.mips).then(a.id.cmp(&b.id)));
        idle.into_iter().map(|w| w.id).collect()
    }

    pub(crate) fn mark_created(&mut self, id: WorkerId, created: bool) -> Result<()> {
        let worker = self.worker_mut(id)?;
        worker.status = if created {
            WorkerStatus::Available
        } else {
            WorkerStatus::Failed
        };
        Ok(())
    }

    /// Bind `task` to an idle worker.
    pub(crate) fn claim(&mut self, id: WorkerId, task: TaskKey) -> Result<&Worker> {
        let worker = self.worker_mut(id)?;
        if !worker.is_idle() {
            return Err(DagsimError::Other(anyhow::anyhow!(
                "worker #{id} is not idle (status {:?}, running {:?})",
                worker.status,
                worker.running
            )));
        }
        worker.running = Some(task);
        Ok(worker)
    }

    /// Free a worker, returning the task it held.
    pub(crate) fn release(&mut self, id: WorkerId) -> Result<TaskKey> {
        let worker = self.worker_mut(id)?;
        worker.running.take().ok_or_else(|| {
            DagsimError::Other(anyhow::anyhow!("worker #{id} finished without a task"))
        })
    }

    fn worker_mut(&mut self, id: WorkerId) -> Result<&mut Worker> {
        self.workers
            .get_mut(id)
            .ok_or_else(|| DagsimError::Other(anyhow::anyhow!("unknown worker #{id}")))
    }
}
