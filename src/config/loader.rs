// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawSimConfig, RawWorkflowFile, SimConfig, WorkflowFile};
use crate::errors::{DagsimError, Result};

/// Load a workflow description and return the raw `RawWorkflowFile`.
///
/// This only performs TOML deserialization; use [`load_workflow`] for the
/// validated form.
pub fn load_raw_workflow(path: impl AsRef<Path>) -> Result<RawWorkflowFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let workflow: RawWorkflowFile = toml::from_str(&contents)?;
    Ok(workflow)
}

/// Load and validate a workflow description.
///
/// Checks for unknown parent/child ids, duplicate job ids, bad runtimes and
/// cycles. A missing `[workflow].name` falls back to the file stem.
pub fn load_workflow(path: impl AsRef<Path>) -> Result<WorkflowFile> {
    let path = path.as_ref();
    let mut raw = load_raw_workflow(path)?;

    if raw.workflow.name.is_none() {
        raw.workflow.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }

    let workflow = WorkflowFile::try_from(raw)?;
    debug!(
        path = %path.display(),
        jobs = workflow.job.len(),
        dependencies = workflow.child.len(),
        "loaded workflow description"
    );
    Ok(workflow)
}

/// Load and validate simulation settings from a TOML file.
pub fn load_sim_config(path: impl AsRef<Path>) -> Result<SimConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawSimConfig = toml::from_str(&contents)?;
    SimConfig::try_from(raw)
}

/// Resolve simulation settings for a run.
///
/// An explicitly given path must exist. Without one, [`default_config_path`]
/// is used if present and the built-in defaults otherwise.
pub fn resolve_sim_config(explicit: Option<&Path>) -> Result<SimConfig> {
    match explicit {
        Some(path) => load_sim_config(path),
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_sim_config(&path)
            } else {
                debug!("no simulation config found; using built-in defaults");
                Ok(SimConfig::default())
            }
        }
    }
}

/// Expand files and directories into a sorted list of workflow files.
///
/// Directories are walked recursively for `*.toml`; files are taken as is.
/// A path that does not exist is an error.
pub fn discover_workflows(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, &mut found)?;
        } else if path.exists() {
            found.push(path.clone());
        } else {
            return Err(DagsimError::ConfigError(format!(
                "workflow path '{}' does not exist",
                path.display()
            )));
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}

fn walk_dir(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            found.push(path);
        }
    }
    Ok(())
}

/// Default simulation config path: `Dagsim.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Dagsim.toml")
}
