// src/dag/policy.rs

//! Ready-set ordering policies.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

use crate::dag::graph::WorkflowGraph;
use crate::dag::task::TaskKey;

/// Greedy ordering applied to the whole ready queue every cycle.
///
/// | policy | key | direction |
/// |---|---|---|
/// | `Srf` | base runtime | ascending |
/// | `Lb` | level | ascending |
/// | `Stb` | descendant count | descending |
///
/// Sorting is stable: tasks with equal keys keep their previous relative
/// order in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingPolicy {
    /// Shortest runtime first.
    #[value(name = "srf")]
    Srf,
    /// Level based: shallower tasks first.
    #[value(name = "lb")]
    Lb,
    /// Subsequent-task based: tasks unblocking the most work first.
    #[value(name = "stb")]
    Stb,
}

/// Which per-task attributes preprocessing must derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedAttributes {
    pub levels: bool,
    pub descendants: bool,
}

impl DerivedAttributes {
    pub const NONE: Self = Self {
        levels: false,
        descendants: false,
    };
    pub const ALL: Self = Self {
        levels: true,
        descendants: true,
    };
}

impl SchedulingPolicy {
    pub const ALL: [SchedulingPolicy; 3] = [
        SchedulingPolicy::Srf,
        SchedulingPolicy::Lb,
        SchedulingPolicy::Stb,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            SchedulingPolicy::Srf => "SRF",
            SchedulingPolicy::Lb => "LB",
            SchedulingPolicy::Stb => "STB",
        }
    }

    pub fn required_attributes(self) -> DerivedAttributes {
        match self {
            SchedulingPolicy::Srf => DerivedAttributes::NONE,
            SchedulingPolicy::Lb => DerivedAttributes {
                levels: true,
                descendants: false,
            },
            SchedulingPolicy::Stb => DerivedAttributes {
                levels: false,
                descendants: true,
            },
        }
    }

    /// Reorder `ready` in place.
    pub fn order(self, ready: &mut [TaskKey], graph: &WorkflowGraph) {
        match self {
            SchedulingPolicy::Srf => ready.sort_by(|a, b| {
                graph
                    .task(*a)
                    .base_runtime
                    .total_cmp(&graph.task(*b).base_runtime)
            }),
            // Unleveled tasks (only possible on a malformed graph) go last.
            SchedulingPolicy::Lb => {
                ready.sort_by_key(|k| graph.task(*k).level().unwrap_or(u32::MAX))
            }
            SchedulingPolicy::Stb => {
                ready.sort_by_key(|k| Reverse(graph.task(*k).descendant_count()))
            }
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for SchedulingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "srf" | "sjf" | "shortest-runtime-first" => Ok(SchedulingPolicy::Srf),
            "lb" | "level" | "level-based" => Ok(SchedulingPolicy::Lb),
            "stb" | "subsequent" | "subsequent-task-based" => Ok(SchedulingPolicy::Stb),
            other => Err(format!(
                "invalid scheduling policy: {other} (expected \"srf\", \"lb\" or \"stb\")"
            )),
        }
    }
}
