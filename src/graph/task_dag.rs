use crate::error::CpmError;
use crate::task::Task;
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

/// Dependency graph over a task slice.
///
/// Node weights are positions in the slice the graph was built from, and
/// edges run `dependency -> dependent`. Dependency ids that name no task in
/// the slice produce no edge.
pub struct TaskDag {
    pub graph: DiGraph<usize, ()>,
    pub id_to_index: HashMap<String, NodeIndex>,
    nodes: Vec<NodeIndex>,
    ids: Vec<String>,
}

impl TaskDag {
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut nodes = Vec::with_capacity(tasks.len());
        let mut ids = Vec::with_capacity(tasks.len());

        // Add nodes first
        for (position, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(position);
            id_to_index.insert(task.id.clone(), node_ix);
            nodes.push(node_ix);
            ids.push(task.id.clone());
        }

        // Add edges: dependency -> task
        let mut skipped = 0usize;
        for (position, task) in tasks.iter().enumerate() {
            let task_ix = nodes[position];
            for dep_id in &task.dependencies {
                match id_to_index.get(dep_id) {
                    Some(&dep_ix) => {
                        graph.update_edge(dep_ix, task_ix, ());
                    }
                    None => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            debug!(skipped, "ignored dependency ids with no matching task");
        }

        Self {
            graph,
            id_to_index,
            nodes,
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Task positions ordered so every dependency precedes its dependents.
    pub fn topological_order(&self) -> Result<Vec<usize>, CpmError> {
        if let Some(edge) = self
            .graph
            .raw_edges()
            .iter()
            .find(|edge| edge.source() == edge.target())
        {
            return Err(self.cycle_at(edge.source()));
        }
        let order = toposort(&self.graph, None).map_err(|cycle| self.cycle_at(cycle.node_id()))?;
        Ok(order.into_iter().map(|ix| self.graph[ix]).collect())
    }

    /// Positions of the resolved dependencies of the task at `position`.
    pub fn dependencies_of(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(position, Direction::Incoming)
    }

    /// Positions of the tasks that depend on the task at `position`.
    pub fn dependents_of(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(position, Direction::Outgoing)
    }

    pub fn has_dependencies(&self, position: usize) -> bool {
        self.dependencies_of(position).next().is_some()
    }

    pub fn task_id(&self, position: usize) -> &str {
        &self.ids[position]
    }

    fn cycle_at(&self, node_ix: NodeIndex) -> CpmError {
        CpmError::CyclicDependency {
            task_id: self.task_id(self.graph[node_ix]).to_string(),
        }
    }

    fn neighbors(&self, position: usize, direction: Direction) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .neighbors_directed(self.nodes[position], direction)
            .map(move |ix| self.graph[ix])
    }
}
