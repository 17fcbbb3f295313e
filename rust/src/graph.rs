//! Dependency graph construction and validation.
//!
//! Turns validated task records into a DAG anchored by a synthetic Start and
//! End node, and computes the topological order used by both scheduling passes.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use thiserror::Error;

use crate::models::RawTask;
use crate::registry::{NodeId, TaskRegistry};

/// Display name of the synthetic project start node.
pub const START_NAME: &str = "Start";
/// Display name of the synthetic project end node.
pub const END_NAME: &str = "End";

/// Errors detected while building the dependency graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Task #{0} has an empty name")]
    EmptyName(usize),
    #[error("Task {0:?} has invalid duration {1} (must be finite and non-negative)")]
    InvalidDuration(String, f64),
    #[error("Duplicate task: {0:?}")]
    DuplicateTask(String),
    #[error("Task {0:?} depends on unknown predecessor {1:?}")]
    UnknownPredecessor(String, String),
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Task,
    End,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub duration: f64,
    pub kind: NodeKind,
}

/// Immutable task graph.
///
/// Tasks keep their input position as node ID; Start and End follow them.
/// Adjacency lists are indexed by node ID.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    predecessors: Vec<Vec<NodeId>>,
    successors: Vec<Vec<NodeId>>,
    topo_order: Vec<NodeId>,
    index: FxHashMap<String, NodeId>,
}

/// Build and validate the task graph.
///
/// Validation runs in order: record checks and duplicate names, predecessor
/// resolution, then cycle detection.
pub fn build(tasks: &[RawTask]) -> Result<Graph, GraphError> {
    let registry = TaskRegistry::from_records(tasks)?;
    let mut predecessors = registry.resolve_predecessors()?;

    let task_count = registry.len();
    let start = task_count as NodeId;
    let end = start + 1;
    let node_count = task_count + 2;

    let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
    for (id, preds) in predecessors.iter().enumerate() {
        for &pred in preds {
            successors[pred as usize].push(id as NodeId);
        }
    }
    predecessors.push(Vec::new()); // Start
    predecessors.push(Vec::new()); // End

    // Anchor open ends on the synthetic nodes
    for id in 0..task_count {
        if predecessors[id].is_empty() {
            predecessors[id].push(start);
            successors[start as usize].push(id as NodeId);
        }
        if successors[id].is_empty() {
            successors[id].push(end);
            predecessors[end as usize].push(id as NodeId);
        }
    }
    if task_count == 0 {
        successors[start as usize].push(end);
        predecessors[end as usize].push(start);
    }

    let mut nodes: Vec<Node> = (0..task_count as NodeId)
        .filter_map(|id| registry.record(id))
        .map(|record| Node {
            name: record.name.clone(),
            duration: record.duration,
            kind: NodeKind::Task,
        })
        .collect();
    nodes.push(Node {
        name: START_NAME.to_string(),
        duration: 0.0,
        kind: NodeKind::Start,
    });
    nodes.push(Node {
        name: END_NAME.to_string(),
        duration: 0.0,
        kind: NodeKind::End,
    });

    let topo_order = match topological_sort(&predecessors, &successors, start) {
        Ok(order) => order,
        Err(unordered) => {
            let cycle = find_cycle(&predecessors, &unordered)
                .into_iter()
                .map(|id| nodes[id as usize].name.clone())
                .collect();
            return Err(GraphError::CycleDetected(cycle));
        }
    };

    let index = nodes
        .iter()
        .take(task_count)
        .enumerate()
        .map(|(id, node)| (node.name.clone(), id as NodeId))
        .collect();

    Ok(Graph {
        nodes,
        predecessors,
        successors,
        topo_order,
        index,
    })
}

/// Perform topological sort using Kahn's algorithm.
///
/// Returns node IDs with every node after all of its predecessors. On failure,
/// returns a flag per node marking the nodes that could not be ordered.
fn topological_sort(
    predecessors: &[Vec<NodeId>],
    successors: &[Vec<NodeId>],
    start: NodeId,
) -> Result<Vec<NodeId>, Vec<bool>> {
    let n = predecessors.len();
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();

    // Start is the only node without predecessors
    let mut queue: VecDeque<NodeId> = VecDeque::from([start]);
    let mut order: Vec<NodeId> = Vec::with_capacity(n);

    while let Some(id) = queue.pop_front() {
        order.push(id);
        for &succ in &successors[id as usize] {
            let degree = &mut in_degree[succ as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() != n {
        let mut unordered = vec![true; n];
        for &id in &order {
            unordered[id as usize] = false;
        }
        return Err(unordered);
    }

    Ok(order)
}

/// Extract one concrete cycle from the nodes Kahn's algorithm could not order.
///
/// Every unordered node still has an unordered predecessor, so walking
/// predecessors must revisit a node. The result is in dependency order and
/// closed by repeating its first node.
fn find_cycle(predecessors: &[Vec<NodeId>], unordered: &[bool]) -> Vec<NodeId> {
    let Some(first) = unordered.iter().position(|&u| u) else {
        return Vec::new();
    };

    let mut position: Vec<Option<usize>> = vec![None; predecessors.len()];
    let mut walk: Vec<NodeId> = Vec::new();
    let mut current = first as NodeId;

    while position[current as usize].is_none() {
        position[current as usize] = Some(walk.len());
        walk.push(current);
        match predecessors[current as usize]
            .iter()
            .find(|&&pred| unordered[pred as usize])
        {
            Some(&pred) => current = pred,
            None => return Vec::new(),
        }
    }

    let cycle_start = position[current as usize].unwrap_or(0);
    let mut cycle: Vec<NodeId> = walk[cycle_start..].to_vec();
    cycle.reverse();

    // Lowest ID first keeps the report stable across runs
    if let Some(lowest) = (0..cycle.len()).min_by_key(|&i| cycle[i]) {
        cycle.rotate_left(lowest);
    }
    if let Some(&head) = cycle.first() {
        cycle.push(head);
    }
    cycle
}

impl Graph {
    /// Total number of nodes, synthetic Start/End included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: Start and End are present even without tasks.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of real (non-synthetic) tasks.
    pub fn task_count(&self) -> usize {
        self.nodes.len() - 2
    }

    /// IDs of real tasks in input order.
    pub fn task_ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.task_count() as NodeId
    }

    pub fn start(&self) -> NodeId {
        self.task_count() as NodeId
    }

    pub fn end(&self) -> NodeId {
        self.start() + 1
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id as usize].name
    }

    #[inline]
    pub fn duration(&self, id: NodeId) -> f64 {
        self.nodes[id as usize].duration
    }

    pub fn is_synthetic(&self, id: NodeId) -> bool {
        self.nodes[id as usize].kind != NodeKind::Task
    }

    /// Look up a real task by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        &self.predecessors[id as usize]
    }

    #[inline]
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.successors[id as usize]
    }

    /// All nodes, Start first and End last.
    pub fn topological_order(&self) -> &[NodeId] {
        &self.topo_order
    }

    /// All edges as (predecessor, successor), in topological order of the predecessor.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.topo_order
            .iter()
            .flat_map(move |&from| self.successors(from).iter().map(move |&to| (from, to)))
    }
}
