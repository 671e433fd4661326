//! Critical-path analysis over an in-memory task list.
//!
//! Every call builds its own dependency graph and node table, so the
//! analyzer is a pure function of its input. Dependency ids that name no
//! task in the list are ignored. Cyclic dependency graphs are rejected.

use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::critical_path::{critical_chains, merge_chains};
use crate::calculations::forward_pass::ForwardPass;
use crate::calculations::{CpmNode, task_durations};
use crate::config::AnalyzerConfig;
use crate::error::CpmError;
use crate::graph::TaskDag;
use crate::task::Task;
use crate::task_validation;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    /// One node per input task, in input order.
    pub nodes: Vec<CpmNode>,
    /// Largest earliest finish over all nodes; 0 for an empty task list.
    pub project_duration_days: i64,
    /// Representative critical path: every chain below, each task listed once.
    pub critical_path: Vec<String>,
    /// One chain per critical root.
    pub critical_chains: Vec<Vec<String>>,
}

impl CriticalPathAnalysis {
    pub fn node(&self, task_id: &str) -> Option<&CpmNode> {
        self.nodes.iter().find(|node| node.id == task_id)
    }

    pub fn critical_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_critical).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Runs CPM with the default 8 hour working day.
pub fn compute_critical_path(tasks: &[Task]) -> Result<CriticalPathAnalysis, CpmError> {
    compute_critical_path_with(tasks, &AnalyzerConfig::default())
}

pub fn compute_critical_path_with(
    tasks: &[Task],
    config: &AnalyzerConfig,
) -> Result<CriticalPathAnalysis, CpmError> {
    config.validate()?;
    task_validation::validate_task_collection(tasks)?;

    if tasks.is_empty() {
        return Ok(CriticalPathAnalysis::default());
    }

    let dag = TaskDag::build(tasks);
    let order = dag.topological_order()?;
    let durations = task_durations(tasks, config.hours_per_day)?;

    let early = ForwardPass::new(&dag, &durations).execute(&order)?;
    let project_duration_days = early.iter().map(|&(_, ef)| ef).max().unwrap_or(0);
    let late = BackwardPass::new(&dag, &durations)
        .with_anchor(config.sink_anchor)
        .execute(&order, &early)?;

    let nodes: Vec<CpmNode> = tasks
        .iter()
        .enumerate()
        .map(|(position, task)| {
            let (earliest_start, earliest_finish) = early[position];
            let (latest_start, latest_finish) = late[position];
            let slack = latest_start - earliest_start;
            CpmNode {
                id: task.id.clone(),
                duration_days: durations[position],
                earliest_start,
                earliest_finish,
                latest_start,
                latest_finish,
                slack,
                is_critical: slack == 0,
            }
        })
        .collect();

    let critical_chains = critical_chains(&dag, &nodes);
    let critical_path = merge_chains(&critical_chains);

    debug!(
        tasks = tasks.len(),
        edges = dag.graph.edge_count(),
        project_duration_days,
        critical = critical_path.len(),
        "critical path computed"
    );

    Ok(CriticalPathAnalysis {
        nodes,
        project_duration_days,
        critical_path,
        critical_chains,
    })
}
