//! The restore dependency DAG (§4.5 step 5, §4.6): non-deferrable foreign
//! keys become edges from parent table to child table; a topological order
//! over this graph is what lets `RestoreItem`s run in dependency order. A
//! cycle among non-deferrable edges is a fatal configuration error naming
//! every table in the cycle.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use slicedb_errors::{ObjectId, SliceError};

pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index_of: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds one node per table id, plus one edge `parent -> child` for
    /// every `(parent, child)` pair (typically non-deferrable foreign keys,
    /// where `child` is the referencing table).
    pub fn build<I>(table_ids: I, edges: &[(String, String)]) -> DependencyGraph
    where
        I: IntoIterator<Item = String>,
    {
        let mut graph = DiGraph::new();
        let mut index_of = HashMap::new();
        for id in table_ids {
            let idx = graph.add_node(id.clone());
            index_of.insert(id, idx);
        }
        for (parent, child) in edges {
            if let (Some(&p), Some(&c)) = (index_of.get(parent), index_of.get(child)) {
                graph.add_edge(p, c, ());
            }
        }
        DependencyGraph { graph, index_of }
    }

    /// The direct non-deferrable parents of `table_id` — the tables its
    /// `RestoreItem` must wait for.
    pub fn parents_of(&self, table_id: &str) -> Vec<String> {
        let Some(&idx) = self.index_of.get(table_id) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Validates the graph is acyclic, returning the cycle's member tables
    /// (sorted, deduplicated) as a `configuration` error if not.
    pub fn check_acyclic(&self) -> Result<(), SliceError> {
        if petgraph::algo::toposort(&self.graph, None).is_ok() {
            return Ok(());
        }

        let mut cyclic: Vec<String> = petgraph::algo::tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.has_self_loop(scc[0]))
            .flat_map(|scc| scc.into_iter().map(|idx| self.graph[idx].clone()))
            .collect();
        cyclic.sort();
        Err(SliceError::configuration(
            ObjectId::None,
            format!("restore dependency cycle among tables: {}", cyclic.join(", ")),
        ))
    }

    fn has_self_loop(&self, idx: NodeIndex) -> bool {
        self.graph.neighbors(idx).any(|n| n == idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acyclic_graph_passes() {
        let graph = DependencyGraph::build(
            ["customer".to_string(), "order".to_string()],
            &[("customer".to_string(), "order".to_string())],
        );
        assert!(graph.check_acyclic().is_ok());
        assert_eq!(graph.parents_of("order"), vec!["customer".to_string()]);
        assert!(graph.parents_of("customer").is_empty());
    }

    #[test]
    fn direct_cycle_is_a_configuration_error() {
        let graph = DependencyGraph::build(
            ["a".to_string(), "b".to_string()],
            &[("a".to_string(), "b".to_string()), ("b".to_string(), "a".to_string())],
        );
        let err = graph.check_acyclic().unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let graph = DependencyGraph::build(["a".to_string()], &[("a".to_string(), "a".to_string())]);
        assert!(graph.check_acyclic().is_err());
    }
}
