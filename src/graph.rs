//! Node/edge model of a parse tree for DOT and Cytoscape output.

use crate::tree::{TreeNode, role_of};
use crate::visitor::{TreeVisitor, walk_tree};
use itertools::Itertools;
use serde::Serialize;

/// One visited aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: usize,
    #[serde(rename = "type")]
    pub type_name: String,
    /// The node's own scalar fields, `(name, value)`.
    pub fields: Vec<(String, String)>,
}

impl GraphNode {
    /// Record label: the type name followed by `name: value` entries.
    pub fn label(&self) -> String {
        std::iter::once(self.type_name.clone())
            .chain(self.fields.iter().map(|(k, v)| format!("{k}: {v}")))
            .join("|")
    }
}

/// Directed `source → target` edge labelled with the child's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    pub label: String,
}

/// Write-once graph produced from one root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphModel {
    pub name: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphModel {
    pub fn from_tree(name: &str, tree: &TreeNode) -> Self {
        let mut builder = GraphBuilder::new(name);
        walk_tree(tree, &mut builder);
        builder.finish()
    }

    pub fn node(&self, id: usize) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_from(&self, id: usize) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.source == id)
    }
}

/// Allocates ids from a counter owned by one build; ids are never reused.
#[derive(Debug)]
pub struct GraphBuilder {
    model: GraphModel,
    next_id: usize,
    stack: Vec<usize>,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            model: GraphModel {
                name: name.to_string(),
                ..GraphModel::default()
            },
            next_id: 0,
            stack: Vec::new(),
        }
    }

    fn allocate(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn finish(self) -> GraphModel {
        self.model
    }
}

impl TreeVisitor for GraphBuilder {
    fn enter_node(&mut self, role: Option<&str>, node: &TreeNode) {
        let id = self.allocate();
        self.model.nodes.push(GraphNode {
            id,
            type_name: node.type_name().unwrap_or_default().to_string(),
            fields: node
                .leaves()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        if let (Some(&parent), Some(role)) = (self.stack.last(), role) {
            self.model.edges.push(GraphEdge {
                source: parent,
                target: id,
                label: role_of(role).to_string(),
            });
        }
        self.stack.push(id);
    }

    fn exit_node(&mut self, _node: &TreeNode) {
        self.stack.pop();
    }
}
