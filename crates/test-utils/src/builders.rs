#![allow(dead_code)]

use dagsim::config::{
    ChildConfig, JobConfig, RawSimConfig, RawWorkflowFile, SimConfig, SimulationSection,
    WorkerTier, WorkflowFile, WorkflowSection,
};
use dagsim::dag::SchedulingPolicy;

/// Builder for `WorkflowFile` to simplify test setup.
pub struct WorkflowBuilder {
    workflow: RawWorkflowFile,
}

impl WorkflowBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            workflow: RawWorkflowFile {
                workflow: WorkflowSection {
                    name: Some(name.to_string()),
                },
                job: Vec::new(),
                child: Vec::new(),
            },
        }
    }

    /// Add a job whose name is its id and namespace is `test`.
    pub fn job(mut self, id: &str, runtime: f64) -> Self {
        self.workflow.job.push(JobConfig {
            id: id.to_string(),
            namespace: "test".to_string(),
            name: id.to_string(),
            runtime,
        });
        self
    }

    /// `child` waits for every id in `parents`.
    pub fn child(mut self, child: &str, parents: &[&str]) -> Self {
        self.workflow.child.push(ChildConfig {
            task: child.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn build_raw(self) -> RawWorkflowFile {
        self.workflow
    }

    pub fn build(self) -> WorkflowFile {
        WorkflowFile::try_from(self.workflow).expect("Failed to build valid workflow from builder")
    }
}

/// Builder for `SimConfig`.
pub struct SimConfigBuilder {
    config: RawSimConfig,
}

impl SimConfigBuilder {
    /// Defaults, but with no worker tiers yet.
    pub fn new() -> Self {
        Self {
            config: RawSimConfig {
                simulation: SimulationSection::default(),
                worker_tier: Vec::new(),
            },
        }
    }

    pub fn tier(mut self, mips: f64, count: usize) -> Self {
        self.config.worker_tier.push(WorkerTier { mips, count });
        self
    }

    pub fn inter_cycle_delay(mut self, delay: f64) -> Self {
        self.config.simulation.inter_cycle_delay = delay;
        self
    }

    pub fn length_scale(mut self, scale: f64) -> Self {
        self.config.simulation.length_scale = scale;
        self
    }

    pub fn policies(mut self, policies: &[SchedulingPolicy]) -> Self {
        self.config.simulation.policies = policies.to_vec();
        self
    }

    pub fn build(self) -> SimConfig {
        SimConfig::try_from(self.config).expect("Failed to build valid sim config from builder")
    }
}

impl Default for SimConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A → B, A → C, B → D, C → D with runtimes 10, 20, 30, 40.
pub fn diamond() -> WorkflowFile {
    WorkflowBuilder::new("diamond")
        .job("A", 10.0)
        .job("B", 20.0)
        .job("C", 30.0)
        .job("D", 40.0)
        .child("B", &["A"])
        .child("C", &["A"])
        .child("D", &["B", "C"])
        .build()
}

/// A → B → C with runtimes 5, 1, 3.
pub fn chain() -> WorkflowFile {
    WorkflowBuilder::new("chain")
        .job("A", 5.0)
        .job("B", 1.0)
        .job("C", 3.0)
        .child("B", &["A"])
        .child("C", &["B"])
        .build()
}

/// One worker each at 800, 1200 and 1600 MIPS, D = 600, scale 1000.
pub fn three_speed_pool() -> SimConfig {
    SimConfigBuilder::new()
        .tier(800.0, 1)
        .tier(1_200.0, 1)
        .tier(1_600.0, 1)
        .build()
}
