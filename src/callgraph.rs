//! Named call-stack graphs grouped into `<module>/<file>` clusters.

use crate::host::StackFrame;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallNode {
    pub function: String,
    /// Index into [`NamedGraph::clusters`].
    pub cluster: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
    /// Line in the caller where the call happens, when known.
    pub call_site: Option<String>,
}

/// Functions deduplicated by name, edges by `(caller, callee)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamedGraph {
    pub name: String,
    pub clusters: Vec<String>,
    pub nodes: Vec<CallNode>,
    pub edges: Vec<CallEdge>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    edge_index: HashMap<(String, String), usize>,
}

impl NamedGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add `function` to `cluster`; a function already present keeps its
    /// first cluster.
    pub fn add_node(&mut self, function: &str, cluster: &str) {
        if self.node_index.contains_key(function) {
            return;
        }
        let cluster_idx = match self.clusters.iter().position(|c| c == cluster) {
            Some(idx) => idx,
            None => {
                self.clusters.push(cluster.to_string());
                self.clusters.len() - 1
            }
        };
        self.node_index
            .insert(function.to_string(), self.nodes.len());
        self.nodes.push(CallNode {
            function: function.to_string(),
            cluster: cluster_idx,
        });
    }

    /// Add or update the `caller → callee` edge; the latest call site wins.
    pub fn add_edge(&mut self, caller: &str, callee: &str, call_site: Option<String>) {
        let key = (caller.to_string(), callee.to_string());
        if let Some(&idx) = self.edge_index.get(&key) {
            self.edges[idx].call_site = call_site;
            return;
        }
        self.edge_index.insert(key, self.edges.len());
        self.edges.push(CallEdge {
            caller: caller.to_string(),
            callee: callee.to_string(),
            call_site,
        });
    }

    pub fn has_node(&self, function: &str) -> bool {
        self.node_index.contains_key(function)
    }

    /// Functions of one cluster in insertion order.
    pub fn cluster_members(&self, cluster: usize) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(move |n| n.cluster == cluster)
            .map(|n| n.function.as_str())
    }
}

/// Build a call graph from frames ordered outermost first.
///
/// Adds one node per frame and an edge `frames[i] → frames[i + 1]` labelled
/// with the line of `frames[i]`, which is where the call was made.
pub fn build_call_graph(name: &str, frames: &[StackFrame]) -> NamedGraph {
    let mut graph = NamedGraph::new(name);
    for frame in frames {
        graph.add_node(&frame.function, &frame.cluster_name());
    }
    for pair in frames.windows(2) {
        let (caller, callee) = (&pair[0], &pair[1]);
        graph.add_edge(
            &caller.function,
            &callee.function,
            caller.line.map(|l| l.to_string()),
        );
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(function: &str, file: &str, line: u32) -> StackFrame {
        StackFrame::new(function, Some(file), Some(line))
    }

    #[test]
    fn three_frames_make_a_chain() {
        let frames = vec![
            frame("main", "/src/bin/main.c", 40),
            frame("outer", "/src/parser/outer.c", 12),
            frame("inner", "/src/parser/inner.c", 7),
        ];
        let graph = build_call_graph("g1", &frames);

        assert_eq!(graph.nodes.len(), 3);
        let edges: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.caller.as_str(), e.callee.as_str()))
            .collect();
        assert_eq!(edges, vec![("main", "outer"), ("outer", "inner")]);
        assert_eq!(graph.edges[0].call_site.as_deref(), Some("40"));
        assert_eq!(
            graph.clusters,
            vec!["bin/main.c", "parser/outer.c", "parser/inner.c"]
        );
    }

    #[test]
    fn recursion_is_deduplicated() {
        let frames = vec![
            frame("main", "/src/bin/main.c", 40),
            frame("walk", "/src/parser/walk.c", 12),
            frame("walk", "/src/parser/walk.c", 15),
            frame("walk", "/src/parser/walk.c", 15),
        ];
        let graph = build_call_graph("rec", &frames);

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 2);
        let self_edge = graph
            .edges
            .iter()
            .find(|e| e.caller == "walk" && e.callee == "walk")
            .unwrap();
        assert_eq!(self_edge.call_site.as_deref(), Some("15"));
        assert_eq!(graph.cluster_members(1).collect::<Vec<_>>(), vec!["walk"]);
    }

    #[test]
    fn first_cluster_sticks() {
        let mut graph = NamedGraph::new("g");
        graph.add_node("f", "a/x.c");
        graph.add_node("f", "b/y.c");
        assert_eq!(graph.nodes[0].cluster, 0);
        assert_eq!(graph.clusters, vec!["a/x.c"]);
        assert!(graph.has_node("f"));
    }
}
