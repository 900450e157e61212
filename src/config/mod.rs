// src/config/mod.rs

//! Workflow descriptions and simulation settings.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load files from disk (`loader.rs`).
//! - Validate invariants like DAG correctness and positive speeds (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, discover_workflows, load_raw_workflow, load_sim_config, load_workflow,
    resolve_sim_config,
};
pub use model::{
    ChildConfig, JobConfig, RawSimConfig, RawWorkflowFile, SimConfig, SimulationSection,
    WorkerTier, WorkflowFile, WorkflowSection,
};
