use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use dagsim::engine::{Provisioner, Worker, WorkerId};

/// A fake provisioner that:
/// - fails creation for the worker ids it was given
/// - records every creation request in order.
pub struct ScriptedProvisioner {
    failing: HashSet<WorkerId>,
    requested: Arc<Mutex<Vec<WorkerId>>>,
}

impl ScriptedProvisioner {
    pub fn failing(ids: &[WorkerId]) -> Self {
        Self {
            failing: ids.iter().copied().collect(),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the ids requested so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<WorkerId>>> {
        Arc::clone(&self.requested)
    }
}

impl Provisioner for ScriptedProvisioner {
    fn create(&mut self, worker: &Worker) -> bool {
        self.requested.lock().unwrap().push(worker.id);
        !self.failing.contains(&worker.id)
    }
}

/// A provisioner whose every creation request panics.
pub struct PanickingProvisioner;

impl Provisioner for PanickingProvisioner {
    fn create(&mut self, worker: &Worker) -> bool {
        panic!("provisioning backend crashed on worker #{}", worker.id);
    }
}
