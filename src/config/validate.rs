// src/config/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{RawSimConfig, RawWorkflowFile, SimConfig, WorkflowFile};
use crate::errors::{DagsimError, Result};

impl TryFrom<RawWorkflowFile> for WorkflowFile {
    type Error = DagsimError;

    fn try_from(raw: RawWorkflowFile) -> std::result::Result<Self, Self::Error> {
        validate_workflow(&raw)?;
        Ok(WorkflowFile::new_unchecked(raw))
    }
}

impl TryFrom<RawSimConfig> for SimConfig {
    type Error = DagsimError;

    fn try_from(raw: RawSimConfig) -> std::result::Result<Self, Self::Error> {
        validate_sim_config(&raw)?;
        Ok(SimConfig::new_unchecked(raw))
    }
}

fn validate_workflow(wf: &RawWorkflowFile) -> Result<()> {
    ensure_has_jobs(wf)?;
    validate_jobs(wf)?;
    validate_dependencies(wf)?;
    validate_dag(wf)?;
    Ok(())
}

fn ensure_has_jobs(wf: &RawWorkflowFile) -> Result<()> {
    if wf.job.is_empty() {
        return Err(DagsimError::ConfigError(
            "workflow must contain at least one [[job]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_jobs(wf: &RawWorkflowFile) -> Result<()> {
    let mut seen = HashSet::new();
    for job in wf.job.iter() {
        if !seen.insert(job.id.as_str()) {
            return Err(DagsimError::ConfigError(format!(
                "job id '{}' is defined more than once",
                job.id
            )));
        }
        if !job.runtime.is_finite() || job.runtime < 0.0 {
            return Err(DagsimError::ConfigError(format!(
                "job '{}' has invalid runtime {} (must be finite and >= 0)",
                job.id, job.runtime
            )));
        }
    }
    Ok(())
}

fn validate_dependencies(wf: &RawWorkflowFile) -> Result<()> {
    let ids: HashSet<&str> = wf.job.iter().map(|j| j.id.as_str()).collect();

    for child in wf.child.iter() {
        if !ids.contains(child.task.as_str()) {
            return Err(DagsimError::ConfigError(format!(
                "dependency references unknown job '{}'",
                child.task
            )));
        }
        for parent in child.parents.iter() {
            if !ids.contains(parent.as_str()) {
                return Err(DagsimError::ConfigError(format!(
                    "job '{}' has unknown parent '{}'",
                    child.task, parent
                )));
            }
            if parent == &child.task {
                return Err(DagsimError::ConfigError(format!(
                    "job '{}' cannot be its own parent",
                    child.task
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(wf: &RawWorkflowFile) -> Result<()> {
    // Edge direction: parent -> child.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for job in wf.job.iter() {
        graph.add_node(job.id.as_str());
    }

    for child in wf.child.iter() {
        for parent in child.parents.iter() {
            graph.add_edge(parent.as_str(), child.task.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(DagsimError::DagCycle(format!(
            "cycle detected in workflow involving job '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_sim_config(cfg: &RawSimConfig) -> Result<()> {
    let sim = &cfg.simulation;

    if !(sim.inter_cycle_delay.is_finite() && sim.inter_cycle_delay > 0.0) {
        return Err(DagsimError::ConfigError(format!(
            "[simulation].inter_cycle_delay must be > 0 (got {})",
            sim.inter_cycle_delay
        )));
    }

    if !(sim.length_scale.is_finite() && sim.length_scale > 0.0) {
        return Err(DagsimError::ConfigError(format!(
            "[simulation].length_scale must be > 0 (got {})",
            sim.length_scale
        )));
    }

    if sim.policies.is_empty() {
        return Err(DagsimError::ConfigError(
            "[simulation].policies must name at least one policy".to_string(),
        ));
    }

    if cfg.worker_tier.is_empty() {
        return Err(DagsimError::ConfigError(
            "config must contain at least one [[worker_tier]]".to_string(),
        ));
    }

    for (i, tier) in cfg.worker_tier.iter().enumerate() {
        if !(tier.mips.is_finite() && tier.mips > 0.0) {
            return Err(DagsimError::ConfigError(format!(
                "worker_tier #{i}: mips must be > 0 (got {})",
                tier.mips
            )));
        }
        if tier.count == 0 {
            return Err(DagsimError::ConfigError(format!(
                "worker_tier #{i}: count must be >= 1 (got 0)"
            )));
        }
    }

    Ok(())
}
