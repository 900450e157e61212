// src/sweep.rs

//! Sweep driver: every workflow × every policy, one makespan per cell.
//!
//! Each (workflow, policy) run is independent and owns its own graph, so
//! runs are handed to Tokio's blocking pool. A workflow that fails to load,
//! a run that returns an error and a run that panics all end up as a
//! failed cell; the rest of the sweep carries on.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::loader::load_workflow;
use crate::config::model::{SimConfig, WorkflowFile};
use crate::dag::SchedulingPolicy;
use crate::engine::{self, AlwaysProvision, Provisioner, RunReport, SimTime};
use crate::errors::Result;

/// Printed in place of a makespan for a failed cell.
pub const FAILED_SENTINEL: i64 = -1;

/// Builds the provisioner for one (workflow, policy) run.
pub type ProvisionerFactory =
    Arc<dyn Fn(&WorkflowFile, SchedulingPolicy) -> Box<dyn Provisioner> + Send + Sync>;

/// Outcome of one (workflow, policy) run.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    Completed { makespan: SimTime, executed: usize },
    Failed(String),
}

impl CellOutcome {
    pub fn makespan(&self) -> Option<SimTime> {
        match self {
            CellOutcome::Completed { makespan, .. } => Some(*makespan),
            CellOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CellOutcome::Failed(_))
    }
}

impl From<&RunReport> for CellOutcome {
    fn from(report: &RunReport) -> Self {
        CellOutcome::Completed {
            makespan: report.makespan,
            executed: report.executed,
        }
    }
}

impl fmt::Display for CellOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellOutcome::Completed { makespan, .. } => write!(f, "{makespan:.2}"),
            CellOutcome::Failed(_) => write!(f, "{FAILED_SENTINEL}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepRow {
    pub workflow: String,
    pub path: PathBuf,
    /// One cell per policy, in [`SweepTable::policies`] order.
    pub cells: Vec<CellOutcome>,
}

#[derive(Debug, Clone)]
pub struct SweepTable {
    pub policies: Vec<SchedulingPolicy>,
    pub rows: Vec<SweepRow>,
}

impl SweepTable {
    pub fn cell(&self, workflow: &str, policy: SchedulingPolicy) -> Option<&CellOutcome> {
        let col = self.policies.iter().position(|p| *p == policy)?;
        self.rows
            .iter()
            .find(|r| r.workflow == workflow)
            .and_then(|r| r.cells.get(col))
    }

    pub fn failed_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .filter(|c| c.is_failed())
            .count()
    }

    /// Fixed-width text table, one row per workflow.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{:<30}", "workflow/policy");
        for policy in &self.policies {
            let _ = write!(out, "\t{:<10}", policy.short_name());
        }
        out.push('\n');
        out.push_str(&"=".repeat(30 + 11 * self.policies.len().max(1) + 8));
        out.push('\n');

        for row in &self.rows {
            let _ = write!(out, "{:<30}", row.workflow);
            for cell in &row.cells {
                let _ = write!(out, "\t{:<10}", cell.to_string());
            }
            out.push('\n');
        }
        out
    }
}

/// Run every workflow in `paths` under every policy in `sim`.
pub async fn run_sweep(paths: &[PathBuf], sim: SimConfig) -> SweepTable {
    run_sweep_with(paths, sim, Arc::new(always_provision)).await
}

fn always_provision(_: &WorkflowFile, _: SchedulingPolicy) -> Box<dyn Provisioner> {
    Box::new(AlwaysProvision)
}

/// Like [`run_sweep`], with every run's provisioner built by `provisioners`.
pub async fn run_sweep_with(
    paths: &[PathBuf],
    sim: SimConfig,
    provisioners: ProvisionerFactory,
) -> SweepTable {
    let sim = Arc::new(sim);
    let policies = sim.simulation.policies.clone();
    let names = row_names(paths);

    let mut pending: Vec<(String, PathBuf, PendingRow)> = Vec::new();
    for (path, name) in paths.iter().zip(names) {
        let row = match load_workflow(path) {
            Ok(workflow) => {
                let workflow = Arc::new(workflow);
                let handles = policies
                    .iter()
                    .map(|&policy| {
                        let provisioner = provisioners(workflow.as_ref(), policy);
                        spawn_run(Arc::clone(&workflow), policy, Arc::clone(&sim), provisioner)
                    })
                    .collect();
                PendingRow::Running(handles)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load workflow");
                PendingRow::LoadFailed(e.to_string())
            }
        };
        pending.push((name, path.clone(), row));
    }

    let mut rows = Vec::with_capacity(pending.len());
    for (workflow, path, row) in pending {
        let cells = match row {
            PendingRow::LoadFailed(msg) => vec![CellOutcome::Failed(msg); policies.len()],
            PendingRow::Running(handles) => {
                let mut cells = Vec::with_capacity(handles.len());
                for (policy, handle) in policies.iter().zip(handles) {
                    cells.push(collect_run(&workflow, *policy, handle).await);
                }
                cells
            }
        };
        rows.push(SweepRow {
            workflow,
            path,
            cells,
        });
    }

    let table = SweepTable { policies, rows };
    info!(
        workflows = table.rows.len(),
        failed = table.failed_cells(),
        "sweep complete"
    );
    table
}

enum PendingRow {
    LoadFailed(String),
    Running(Vec<JoinHandle<Result<RunReport>>>),
}

fn spawn_run(
    workflow: Arc<WorkflowFile>,
    policy: SchedulingPolicy,
    sim: Arc<SimConfig>,
    provisioner: Box<dyn Provisioner>,
) -> JoinHandle<Result<RunReport>> {
    tokio::task::spawn_blocking(move || {
        engine::simulate_with(&workflow, policy, &sim, provisioner)
    })
}

async fn collect_run(
    workflow: &str,
    policy: SchedulingPolicy,
    handle: JoinHandle<Result<RunReport>>,
) -> CellOutcome {
    match handle.await {
        Ok(Ok(report)) => {
            info!(
                workflow,
                %policy,
                makespan = report.makespan,
                executed = report.executed,
                "run completed"
            );
            CellOutcome::from(&report)
        }
        Ok(Err(e)) => {
            warn!(workflow, %policy, error = %e, "run failed; recording sentinel");
            CellOutcome::Failed(e.to_string())
        }
        Err(join_err) => {
            error!(workflow, %policy, error = %join_err, "run aborted; recording sentinel");
            CellOutcome::Failed(join_err.to_string())
        }
    }
}

/// Row label per path: the file name, or the full path where two paths
/// share a file name.
fn row_names(paths: &[PathBuf]) -> Vec<String> {
    let short: Vec<String> = paths.iter().map(|p| file_name(p)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &short {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    paths
        .iter()
        .zip(&short)
        .map(|(path, name)| {
            if counts[name.as_str()] > 1 {
                path.display().to_string()
            } else {
                name.clone()
            }
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
