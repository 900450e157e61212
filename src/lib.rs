// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod sweep;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{discover_workflows, load_workflow, resolve_sim_config};
use crate::config::model::SimConfig;
use crate::dag::WorkflowGraph;
use crate::sweep::run_sweep;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - simulation config resolution
/// - workflow discovery
/// - either the dry-run listing or the policy sweep
pub async fn run(args: CliArgs) -> Result<()> {
    let mut sim = resolve_sim_config(args.config.as_deref())?;
    if !args.policies.is_empty() {
        sim.simulation.policies = args.policies.clone();
    }

    let workflows = discover_workflows(&args.paths)?;
    if workflows.is_empty() {
        bail!("no workflow files found in {:?}", args.paths);
    }
    info!(
        workflows = workflows.len(),
        policies = ?sim.simulation.policies,
        workers = sim.worker_count(),
        inter_cycle_delay = sim.simulation.inter_cycle_delay,
        "starting sweep"
    );

    if args.dry_run {
        print_dry_run(&workflows, &sim);
        return Ok(());
    }

    let table = run_sweep(&workflows, sim).await;
    println!();
    print!("{}", table.render());

    if table.failed_cells() > 0 {
        warn!(failed = table.failed_cells(), "some runs failed; see log for details");
    }
    Ok(())
}

/// Print each task's runtime, work length, level and descendant count.
fn print_dry_run(workflows: &[std::path::PathBuf], sim: &SimConfig) {
    println!("dagsim dry-run");
    println!(
        "  simulation.inter_cycle_delay = {}",
        sim.simulation.inter_cycle_delay
    );
    println!("  simulation.length_scale = {}", sim.simulation.length_scale);
    for tier in &sim.worker_tier {
        println!("  worker_tier: {} x {} mips", tier.count, tier.mips);
    }
    println!();

    for path in workflows {
        let graph = load_workflow(path)
            .and_then(|wf| WorkflowGraph::from_config(&wf, sim.simulation.length_scale))
            .and_then(|mut graph| graph.preprocess_all().map(|()| graph));

        let graph = match graph {
            Ok(graph) => graph,
            Err(e) => {
                println!("{}: error: {e}", path.display());
                continue;
            }
        };

        println!(
            "{} ({} tasks, {} roots, {} tails):",
            path.display(),
            graph.len(),
            graph.roots().len(),
            graph.tails().len()
        );
        for (_, task) in graph.tasks() {
            println!(
                "  id: {:<10} runtime: {:<10} length: {:<10} level: {:<5} stb: {:<5}",
                task.id,
                task.base_runtime,
                task.work_length,
                task.level().map_or_else(|| "-".to_string(), |l| l.to_string()),
                task.descendant_count()
            );
        }
    }

    debug!("dry-run complete (no simulation)");
}
