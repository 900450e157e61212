// src/dag/task.rs

//! Task records and the dependency bridge used while building a graph.

use std::collections::BTreeSet;

/// External task identity, e.g. `"ID00001"`.
pub type TaskId = String;

/// Index of a task inside a [`WorkflowGraph`](crate::dag::WorkflowGraph).
///
/// Tasks never reference each other directly; parents, children and
/// descendant sets all store keys into the graph's task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey(pub(crate) usize);

impl TaskKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single job of the workflow plus its scheduling state.
///
/// Topology (`parents`, `children`) is fixed once the graph is built.
/// `level` and `descendants` are written by preprocessing; `ready` and
/// `executed` are written by the scheduler at runtime.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub namespace: String,
    /// Runtime in simulated seconds, as declared by the workflow.
    pub base_runtime: f64,
    /// Runtime scaled to simulated instructions (see `length_scale`).
    pub work_length: u64,

    pub(crate) parents: Vec<TaskKey>,
    pub(crate) children: Vec<TaskKey>,
    pub(crate) level: Option<u32>,
    pub(crate) descendants: BTreeSet<TaskKey>,
    pub(crate) ready: bool,
    pub(crate) executed: bool,
}

impl Task {
    /// Create a task with no edges. A task without parents is ready.
    pub fn new(
        id: impl Into<TaskId>,
        namespace: impl Into<String>,
        name: impl Into<String>,
        base_runtime: f64,
        length_scale: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            namespace: namespace.into(),
            base_runtime,
            work_length: (base_runtime * length_scale) as u64,
            parents: Vec::new(),
            children: Vec::new(),
            level: None,
            descendants: BTreeSet::new(),
            ready: true,
            executed: false,
        }
    }

    pub fn parents(&self) -> &[TaskKey] {
        &self.parents
    }

    pub fn children(&self) -> &[TaskKey] {
        &self.children
    }

    /// Topological level, or `None` if levels were not computed.
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    /// Strict descendants of this task (transitive closure over children).
    pub fn descendants(&self) -> &BTreeSet<TaskKey> {
        &self.descendants
    }

    pub fn descendant_count(&self) -> usize {
        self.descendants.len()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_tail(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn add_parent(&mut self, parent: TaskKey) {
        self.parents.push(parent);
        self.ready = false;
    }

    pub(crate) fn add_child(&mut self, child: TaskKey) {
        self.children.push(child);
    }

    /// Levels only ever grow.
    pub(crate) fn raise_level(&mut self, level: u32) {
        if self.level.is_none_or(|current| level > current) {
            self.level = Some(level);
        }
    }
}

/// One child plus the ordered list of parents it waits for.
///
/// This is the shape workflow descriptions use (`<child ref=..>` with
/// `<parent ref=..>` entries); it is consumed by
/// [`WorkflowGraph::add_dependency`](crate::dag::WorkflowGraph::add_dependency).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    pub child: TaskId,
    pub parents: Vec<TaskId>,
}

impl Dependency {
    pub fn new(child: impl Into<TaskId>) -> Self {
        Self {
            child: child.into(),
            parents: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<TaskId>) -> Self {
        self.parents.push(parent.into());
        self
    }
}
