// src/config/model.rs

use serde::Deserialize;

use crate::dag::SchedulingPolicy;

/// Workflow description as read from a TOML file, before validation.
///
/// The layout follows the DAX shape: a flat list of jobs followed by
/// `child` entries naming the parents each job waits for.
///
/// ```toml
/// [workflow]
/// name = "montage"
///
/// [[job]]
/// id = "ID00000"
/// namespace = "Montage"
/// name = "mProjectPP"
/// runtime = 13.59
///
/// [[child]]
/// ref = "ID00002"
/// parents = ["ID00000", "ID00001"]
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWorkflowFile {
    #[serde(default)]
    pub workflow: WorkflowSection,

    #[serde(default)]
    pub job: Vec<JobConfig>,

    #[serde(default)]
    pub child: Vec<ChildConfig>,
}

/// Validated workflow description. Build it with `WorkflowFile::try_from`.
#[derive(Debug, Clone)]
pub struct WorkflowFile {
    pub workflow: WorkflowSection,
    pub job: Vec<JobConfig>,
    pub child: Vec<ChildConfig>,
}

impl WorkflowFile {
    pub(crate) fn new_unchecked(raw: RawWorkflowFile) -> Self {
        Self {
            workflow: raw.workflow,
            job: raw.job,
            child: raw.child,
        }
    }

    pub fn name(&self) -> &str {
        self.workflow.name.as_deref().unwrap_or("workflow")
    }
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkflowSection {
    /// Display name; the loader falls back to the file stem.
    #[serde(default)]
    pub name: Option<String>,
}

/// `[[job]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub id: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub name: String,

    /// Runtime in simulated seconds.
    pub runtime: f64,
}

/// `[[child]]` entry: `task` waits for every id in `parents`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChildConfig {
    #[serde(rename = "ref")]
    pub task: String,

    #[serde(default)]
    pub parents: Vec<String>,
}

/// Simulation settings as read from `Dagsim.toml`, before validation.
///
/// ```toml
/// [simulation]
/// inter_cycle_delay = 600.0
/// length_scale = 1000.0
/// policies = ["srf", "lb", "stb"]
///
/// [[worker_tier]]
/// mips = 800
/// count = 4
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,

    #[serde(default = "default_worker_tiers")]
    pub worker_tier: Vec<WorkerTier>,
}

impl Default for RawSimConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationSection::default(),
            worker_tier: default_worker_tiers(),
        }
    }
}

/// Validated simulation settings. Build it with `SimConfig::try_from`.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub simulation: SimulationSection,
    pub worker_tier: Vec<WorkerTier>,
}

impl SimConfig {
    pub(crate) fn new_unchecked(raw: RawSimConfig) -> Self {
        Self {
            simulation: raw.simulation,
            worker_tier: raw.worker_tier,
        }
    }

    /// Total number of workers the broker will request.
    pub fn worker_count(&self) -> usize {
        self.worker_tier.iter().map(|t| t.count).sum()
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new_unchecked(RawSimConfig::default())
    }
}

/// `[simulation]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSection {
    /// Simulated time between two scheduling cycles.
    #[serde(default = "default_inter_cycle_delay")]
    pub inter_cycle_delay: f64,

    /// Multiplier from a job's runtime to its work length in instructions.
    #[serde(default = "default_length_scale")]
    pub length_scale: f64,

    /// Policies a sweep runs, in column order.
    #[serde(default = "default_policies")]
    pub policies: Vec<SchedulingPolicy>,
}

fn default_inter_cycle_delay() -> f64 {
    600.0
}

fn default_length_scale() -> f64 {
    1_000.0
}

fn default_policies() -> Vec<SchedulingPolicy> {
    SchedulingPolicy::ALL.to_vec()
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            inter_cycle_delay: default_inter_cycle_delay(),
            length_scale: default_length_scale(),
            policies: default_policies(),
        }
    }
}

/// `[[worker_tier]]` entry: `count` identical single-task workers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorkerTier {
    pub mips: f64,
    pub count: usize,
}

fn default_worker_tiers() -> Vec<WorkerTier> {
    [800.0, 1_200.0, 1_600.0]
        .into_iter()
        .map(|mips| WorkerTier { mips, count: 4 })
        .collect()
}
