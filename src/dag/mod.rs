// src/dag/mod.rs

//! Workflow DAG representation and ready-set scheduling.
//!
//! - [`task`] holds the task record and the dependency bridge.
//! - [`graph`] owns the task table and derives levels / descendant sets.
//! - [`policy`] orders the ready set.
//! - [`scheduler`] keeps the ready queue and propagates completions.

pub mod graph;
pub mod policy;
pub mod scheduler;
pub mod task;

pub use graph::WorkflowGraph;
pub use policy::{DerivedAttributes, SchedulingPolicy};
pub use scheduler::Scheduler;
pub use task::{Dependency, Task, TaskId, TaskKey};
