// src/dag/graph.rs

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use crate::config::model::WorkflowFile;
use crate::dag::policy::{DerivedAttributes, SchedulingPolicy};
use crate::dag::task::{Dependency, Task, TaskId, TaskKey};
use crate::errors::{DagsimError, Result};

/// The workflow DAG: a task table indexed by [`TaskKey`] plus an id lookup.
///
/// Edges are stored on the tasks themselves as key lists. The graph is
/// append-only: tasks and edges are never removed.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    tasks: Vec<Task>,
    index: HashMap<TaskId, TaskKey>,
    roots: Vec<TaskKey>,
    tails: Vec<TaskKey>,
    preprocessed: bool,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a validated [`WorkflowFile`].
    ///
    /// Jobs are added in file order first, then every `[[child]]` entry.
    pub fn from_config(cfg: &WorkflowFile, length_scale: f64) -> Result<Self> {
        let mut graph = Self::new();

        for job in cfg.job.iter() {
            graph.add_task(Task::new(
                job.id.clone(),
                job.namespace.clone(),
                job.name.clone(),
                job.runtime,
                length_scale,
            ));
        }

        for child in cfg.child.iter() {
            graph.add_dependency(&Dependency {
                child: child.task.clone(),
                parents: child.parents.clone(),
            })?;
        }

        debug!(
            workflow = %cfg.name(),
            tasks = graph.len(),
            "built workflow graph"
        );

        Ok(graph)
    }

    /// Add a task. If a task with the same id already exists the new one is
    /// dropped and the existing key is returned.
    pub fn add_task(&mut self, task: Task) -> TaskKey {
        if let Some(&key) = self.index.get(&task.id) {
            debug!(task = %task.id, "duplicate task id; keeping the first definition");
            return key;
        }

        let key = TaskKey(self.tasks.len());
        self.index.insert(task.id.clone(), key);
        self.tasks.push(task);
        key
    }

    /// Link every parent in `dep.parents` to `dep.child`.
    ///
    /// All endpoints are resolved before anything is linked, so an unknown id
    /// leaves the graph untouched.
    pub fn add_dependency(&mut self, dep: &Dependency) -> Result<()> {
        let child = self.require_key(&dep.child)?;
        let parents = dep
            .parents
            .iter()
            .map(|id| self.require_key(id))
            .collect::<Result<Vec<_>>>()?;

        for parent in parents {
            if self.tasks[parent.0].children.contains(&child) {
                debug!(
                    parent = %self.tasks[parent.0].id,
                    child = %dep.child,
                    "edge already present; skipping"
                );
                continue;
            }
            self.tasks[child.0].add_parent(parent);
            self.tasks[parent.0].add_child(child);
        }

        Ok(())
    }

    /// Collect roots and tails, then derive whatever `policy` sorts by.
    ///
    /// May only be called once, after every task and edge has been added.
    pub fn preprocess(&mut self, policy: SchedulingPolicy) -> Result<()> {
        self.preprocess_with(policy.required_attributes())
    }

    /// Like [`preprocess`](Self::preprocess) but derives both levels and
    /// descendant sets regardless of policy.
    pub fn preprocess_all(&mut self) -> Result<()> {
        self.preprocess_with(DerivedAttributes::ALL)
    }

    fn preprocess_with(&mut self, attrs: DerivedAttributes) -> Result<()> {
        if self.preprocessed {
            return Err(DagsimError::AlreadyPreprocessed);
        }
        self.preprocessed = true;

        self.roots = self
            .tasks()
            .filter_map(|(k, t)| t.is_root().then_some(k))
            .collect();
        self.tails = self
            .tasks()
            .filter_map(|(k, t)| t.is_tail().then_some(k))
            .collect();

        if attrs.levels {
            self.compute_levels();
        }
        if attrs.descendants {
            self.compute_descendants();
        }

        info!(
            tasks = self.len(),
            roots = self.roots.len(),
            tails = self.tails.len(),
            levels = attrs.levels,
            descendants = attrs.descendants,
            "workflow preprocessed"
        );

        Ok(())
    }

    /// Assign `level = max(parent levels) + 1`, roots at level 1.
    ///
    /// Kahn traversal: a task is visited once its last parent has a level.
    /// On a cyclic graph the tasks on or after a cycle stay unleveled.
    fn compute_levels(&mut self) {
        let mut unleveled_parents: Vec<usize> =
            self.tasks.iter().map(|t| t.parents.len()).collect();
        let mut queue: VecDeque<TaskKey> = self.roots.iter().copied().collect();

        for &root in &self.roots {
            self.tasks[root.0].raise_level(1);
        }

        let mut visited = 0usize;
        while let Some(key) = queue.pop_front() {
            visited += 1;
            let next = self.tasks[key.0].level.unwrap_or(1) + 1;

            for i in 0..self.tasks[key.0].children.len() {
                let child = self.tasks[key.0].children[i];
                self.tasks[child.0].raise_level(next);
                unleveled_parents[child.0] -= 1;
                if unleveled_parents[child.0] == 0 {
                    queue.push_back(child);
                }
            }
        }

        if visited != self.tasks.len() {
            warn!(
                unleveled = self.tasks.len() - visited,
                "some tasks were never leveled; the graph is not acyclic"
            );
        }
    }

    /// Fill each task's descendant set with its children plus their sets.
    ///
    /// Reverse Kahn traversal from the tails: a task is finished once every
    /// child has been finished and merged into it.
    fn compute_descendants(&mut self) {
        let mut pending_children: Vec<usize> =
            self.tasks.iter().map(|t| t.children.len()).collect();
        let mut queue: VecDeque<TaskKey> = self.tails.iter().copied().collect();

        let mut visited = 0usize;
        while let Some(key) = queue.pop_front() {
            visited += 1;
            let mut inherited = self.tasks[key.0].descendants.clone();
            inherited.insert(key);

            for i in 0..self.tasks[key.0].parents.len() {
                let parent = self.tasks[key.0].parents[i];
                self.tasks[parent.0].descendants.extend(inherited.iter().copied());
                pending_children[parent.0] -= 1;
                if pending_children[parent.0] == 0 {
                    queue.push_back(parent);
                }
            }
        }

        if visited != self.tasks.len() {
            warn!(
                unfinished = self.tasks.len() - visited,
                "some descendant sets are incomplete; the graph is not acyclic"
            );
        }
    }

    fn require_key(&self, id: &str) -> Result<TaskKey> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| DagsimError::UnknownTask(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_preprocessed(&self) -> bool {
        self.preprocessed
    }

    pub fn key_of(&self, id: &str) -> Option<TaskKey> {
        self.index.get(id).copied()
    }

    pub fn task(&self, key: TaskKey) -> &Task {
        &self.tasks[key.0]
    }

    pub(crate) fn task_mut(&mut self, key: TaskKey) -> &mut Task {
        &mut self.tasks[key.0]
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.key_of(id).map(|k| self.task(k))
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = (TaskKey, &Task)> {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskKey(i), t))
    }

    /// Tasks with no parents. Empty until preprocessing.
    pub fn roots(&self) -> &[TaskKey] {
        &self.roots
    }

    /// Tasks with no children. Empty until preprocessing.
    pub fn tails(&self) -> &[TaskKey] {
        &self.tails
    }

    /// Ids of the descendants of `id`, sorted.
    pub fn descendant_ids(&self, id: &str) -> Option<Vec<&str>> {
        let task = self.task_by_id(id)?;
        let mut ids: Vec<&str> = task
            .descendants
            .iter()
            .map(|k| self.tasks[k.0].id.as_str())
            .collect();
        ids.sort_unstable();
        Some(ids)
    }
}
