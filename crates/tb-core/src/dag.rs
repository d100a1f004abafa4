//! Block dependency graph and topological ordering

use crate::block::Block;
use crate::error::{CoreError, CoreResult};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// A directed graph of block dependencies keyed by block uuid
#[derive(Debug, Default)]
pub struct BlockDag {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl BlockDag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block node, returning the existing index when already present
    pub fn add_block(&mut self, uuid: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(uuid) {
            return idx;
        }
        let idx = self.graph.add_node(uuid.to_string());
        self.node_map.insert(uuid.to_string(), idx);
        idx
    }

    /// Add an edge meaning `block` depends on `upstream`
    pub fn add_dependency(&mut self, block: &str, upstream: &str) {
        let block_idx = self.add_block(block);
        let upstream_idx = self.add_block(upstream);
        // Edge runs from dependency to dependent so toposort yields dependencies first
        if !self.graph.contains_edge(upstream_idx, block_idx) {
            self.graph.add_edge(upstream_idx, block_idx, ());
        }
    }

    /// Build a graph from blocks and their (nested) upstream lists
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let mut dag = Self::new();
        for block in blocks {
            dag.add_tree(block);
        }
        dag
    }

    fn add_tree(&mut self, block: &Block) {
        self.add_block(&block.uuid);
        for upstream in &block.upstream_blocks {
            self.add_dependency(&block.uuid, &upstream.uuid);
            self.add_tree(upstream);
        }
    }

    /// Validate the graph has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        self.topological_order().map(|_| ())
    }

    /// Block uuids in dependency order (dependencies first)
    pub fn topological_order(&self) -> CoreResult<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].clone()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].clone());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
