//! Critical path calculation using forward and backward passes.

use thiserror::Error;

use crate::config::SchedulerConfig;
use crate::graph::{self, Graph, GraphError};
use crate::models::{RawTask, TaskTiming};
use crate::registry::NodeId;
use crate::{log_changes, log_checks, log_debug};

/// Errors raised by the scheduler on an already validated graph.
///
/// `InvariantViolation` indicates a defect in the scheduler, never bad input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Invariant violation: node {node:?} has negative total float {total_float}")]
    InvariantViolation { node: String, total_float: f64 },
    #[error("Project duration overflows: durations along a path sum to {0}")]
    DurationOverflow(f64),
}

/// Errors from building and scheduling a plan in one step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

/// Result of scheduling a graph.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleResult {
    /// Timing information indexed by node ID.
    timings: Vec<TaskTiming>,
    /// Early finish of the End node.
    project_duration: f64,
    /// Every edge between critical nodes with no gap between them.
    critical_edges: Vec<(NodeId, NodeId)>,
}

impl ScheduleResult {
    #[inline]
    pub fn timing(&self, id: NodeId) -> &TaskTiming {
        &self.timings[id as usize]
    }

    /// All timings indexed by node ID.
    pub fn timings(&self) -> &[TaskTiming] {
        &self.timings
    }

    /// Timings of real tasks keyed by name, in input order.
    pub fn task_timings<'a>(
        &'a self,
        graph: &'a Graph,
    ) -> impl Iterator<Item = (&'a str, &'a TaskTiming)> + 'a {
        graph.task_ids().map(move |id| (graph.name(id), self.timing(id)))
    }

    pub fn project_duration(&self) -> f64 {
        self.project_duration
    }

    pub fn critical_edges(&self) -> &[(NodeId, NodeId)] {
        &self.critical_edges
    }

    pub fn is_critical_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.critical_edges.contains(&(from, to))
    }

    /// IDs of all critical nodes, synthetic ones included.
    pub fn critical_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.timings
            .iter()
            .enumerate()
            .filter(|(_, timing)| timing.is_critical)
            .map(|(id, _)| id as NodeId)
    }

    /// One critical chain from Start to End, taking the lowest node ID at branches.
    ///
    /// The full set of critical edges may contain further chains; see `critical_edges`.
    pub fn critical_path(&self, graph: &Graph) -> Vec<NodeId> {
        let mut path = vec![graph.start()];
        let mut current = graph.start();
        while current != graph.end() {
            let next = self
                .critical_edges
                .iter()
                .filter(|&&(from, _)| from == current)
                .map(|&(_, to)| to)
                .min();
            match next {
                Some(to) => {
                    path.push(to);
                    current = to;
                }
                None => break,
            }
        }
        path
    }
}

/// Schedule a graph with the default configuration.
pub fn schedule(graph: &Graph) -> Result<ScheduleResult, SchedulingError> {
    schedule_with_config(graph, &SchedulerConfig::default())
}

/// Build and schedule a plan in one call.
pub fn plan(
    tasks: &[RawTask],
    config: &SchedulerConfig,
) -> Result<(Graph, ScheduleResult), PlanError> {
    let graph = graph::build(tasks)?;
    let result = schedule_with_config(&graph, config)?;
    Ok((graph, result))
}

/// Compute early/late times, floats and the critical edge set.
///
/// Assumes a graph produced by `graph::build`; the graph is not re-validated.
pub fn schedule_with_config(
    graph: &Graph,
    config: &SchedulerConfig,
) -> Result<ScheduleResult, SchedulingError> {
    let verbosity = config.verbosity;
    let order = graph.topological_order();
    let end = graph.end();

    let mut timings: Vec<TaskTiming> = vec![TaskTiming::default(); graph.len()];

    // Forward pass: early start = max predecessor early finish (identity 0)
    for &id in order {
        let early_start = graph
            .predecessors(id)
            .iter()
            .map(|&pred| timings[pred as usize].early_finish)
            .fold(0.0, f64::max);

        let timing = &mut timings[id as usize];
        timing.early_start = early_start;
        timing.early_finish = early_start + graph.duration(id);
        log_checks!(
            verbosity,
            "  Forward {}: ES={} EF={}",
            graph.name(id),
            timing.early_start,
            timing.early_finish
        );
    }

    let project_duration = timings[end as usize].early_finish;
    if !project_duration.is_finite() {
        return Err(SchedulingError::DurationOverflow(project_duration));
    }

    // Roundoff in ES + d and LF - d grows with the magnitude of the times
    let tolerance = config.float_tolerance * project_duration.abs().max(1.0);
    log_debug!(verbosity, "    Float tolerance: {}", tolerance);

    // Backward pass: late finish = min successor late start (identity T)
    for &id in order.iter().rev() {
        let late_finish = graph
            .successors(id)
            .iter()
            .map(|&succ| timings[succ as usize].late_start)
            .fold(project_duration, f64::min);

        let timing = &mut timings[id as usize];
        timing.late_finish = late_finish;
        timing.late_start = late_finish - graph.duration(id);
        log_checks!(
            verbosity,
            "  Backward {}: LS={} LF={}",
            graph.name(id),
            timing.late_start,
            timing.late_finish
        );
    }

    // Floats
    for &id in order {
        let earliest_successor_start = graph
            .successors(id)
            .iter()
            .filter(|&&succ| succ != end)
            .map(|&succ| timings[succ as usize].early_start)
            .reduce(f64::min);

        let timing = &mut timings[id as usize];
        let total_float = zero_within(timing.late_start - timing.early_start, tolerance);
        if total_float < 0.0 {
            return Err(SchedulingError::InvariantViolation {
                node: graph.name(id).to_string(),
                total_float,
            });
        }

        timing.total_float = total_float;
        timing.free_float = earliest_successor_start
            .map(|start| zero_within(start - timing.early_finish, tolerance))
            .unwrap_or(0.0);
        timing.is_critical = total_float == 0.0;
        log_debug!(
            verbosity,
            "    {}: TF={} FF={} critical={}",
            graph.name(id),
            timing.total_float,
            timing.free_float,
            timing.is_critical
        );
    }

    let critical_edges: Vec<(NodeId, NodeId)> = graph
        .edges()
        .filter(|&(from, to)| {
            let pred = &timings[from as usize];
            let succ = &timings[to as usize];
            pred.is_critical
                && succ.is_critical
                && (succ.early_start - pred.early_finish).abs() <= tolerance
        })
        .collect();

    let result = ScheduleResult {
        timings,
        project_duration,
        critical_edges,
    };

    log_changes!(
        verbosity,
        "Project duration: {} ({} critical edges)",
        result.project_duration,
        result.critical_edges.len()
    );
    log_changes!(
        verbosity,
        "Critical path: {}",
        result
            .critical_path(graph)
            .iter()
            .map(|&id| graph.name(id))
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(result)
}

/// Snap values within tolerance of zero to exactly zero.
fn zero_within(value: f64, tolerance: f64) -> f64 {
    if value.abs() <= tolerance {
        0.0
    } else {
        value
    }
}
