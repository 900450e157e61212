// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::engine::SimTime;

#[derive(Error, Debug)]
pub enum DagsimError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Cycle detected in workflow: {0}")]
    DagCycle(String),

    #[error("Workflow graph has already been preprocessed")]
    AlreadyPreprocessed,

    #[error("Workflow graph must be preprocessed before scheduling")]
    NotPreprocessed,

    #[error("Task already executed: {0}")]
    AlreadyExecuted(String),

    #[error("Event {event} is not valid in broker state {state}")]
    InvalidTransition { state: String, event: String },

    #[error("No worker was created successfully; nothing can execute")]
    NoUsableWorkers,

    #[error("Simulation stalled at t={at} with {remaining} task(s) never executed")]
    Stalled { at: SimTime, remaining: usize },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagsimError>;
