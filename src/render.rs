//! Text renderers for graph models: Graphviz DOT and Cytoscape elements JSON.

use crate::callgraph::NamedGraph;
use crate::graph::GraphModel;
use serde_json::{Map, Value, json};
use std::fmt::Write;

/// Escape a string for use inside a double-quoted DOT id or attribute.
pub fn escape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape record-label metacharacters in a single record field.
pub fn escape_record_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '{' | '}' | '|' | '<' | '>' | '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse-tree graph with record-shaped nodes.
pub fn parse_tree_dot(graph: &GraphModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape_quoted(&graph.name));
    out.push_str("    newrank=true;\n");
    out.push_str("    node [shape=record];\n");

    for node in &graph.nodes {
        let fields: Vec<String> = std::iter::once(escape_record_field(&node.type_name))
            .chain(
                node.fields
                    .iter()
                    .map(|(k, v)| escape_record_field(&format!("{k}: {v}"))),
            )
            .collect();
        let _ = writeln!(out, "    {} [label=\"{{{}}}\"];", node.id, fields.join("|"));
    }

    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{}\"];",
            edge.source,
            edge.target,
            escape_quoted(&edge.label)
        );
    }

    out.push_str("}\n");
    out
}

/// Call graph with one `cluster_<module>/<file>` subgraph per source file.
pub fn call_graph_dot(graph: &NamedGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape_quoted(&graph.name));
    out.push_str("    newrank=true;\n");

    for (idx, cluster) in graph.clusters.iter().enumerate() {
        let cluster = escape_quoted(cluster);
        let _ = writeln!(out, "    subgraph \"cluster_{cluster}\" {{");
        let _ = writeln!(out, "        label=\"{cluster}\";");
        for function in graph.cluster_members(idx) {
            let _ = writeln!(out, "        \"{}\";", escape_quoted(function));
        }
        out.push_str("    }\n");
    }

    for edge in &graph.edges {
        let _ = write!(
            out,
            "    \"{}\" -> \"{}\"",
            escape_quoted(&edge.caller),
            escape_quoted(&edge.callee)
        );
        match &edge.call_site {
            Some(site) => {
                let _ = writeln!(out, " [label=\"{}\"];", escape_quoted(site));
            }
            None => out.push_str(";\n"),
        }
    }

    out.push_str("}\n");
    out
}

/// `{"elements": {"nodes": [...], "edges": [...]}}` for a parse tree.
///
/// Node data carries `id`, `type` and the node's scalar fields.
pub fn parse_tree_cytoscape(graph: &GraphModel) -> Value {
    let nodes: Vec<Value> = graph
        .nodes
        .iter()
        .map(|node| {
            let mut data = Map::new();
            data.insert("id".to_string(), Value::String(node.id.to_string()));
            data.insert("type".to_string(), Value::String(node.type_name.clone()));
            for (k, v) in &node.fields {
                data.entry(k.clone())
                    .or_insert_with(|| Value::String(v.clone()));
            }
            json!({ "data": data })
        })
        .collect();

    let edges: Vec<Value> = graph
        .edges
        .iter()
        .map(|edge| {
            json!({
                "data": {
                    "id": format!("{}_{}", edge.source, edge.target),
                    "source": edge.source.to_string(),
                    "target": edge.target.to_string(),
                    "label": edge.label,
                }
            })
        })
        .collect();

    json!({ "elements": { "nodes": nodes, "edges": edges } })
}

/// Call graph as Cytoscape elements; clusters become compound parent nodes.
pub fn call_graph_cytoscape(graph: &NamedGraph) -> Value {
    let cluster_id = |idx: usize| format!("cluster_{}", graph.clusters[idx]);

    let mut nodes: Vec<Value> = graph
        .clusters
        .iter()
        .enumerate()
        .map(|(idx, cluster)| json!({ "data": { "id": cluster_id(idx), "label": cluster } }))
        .collect();
    nodes.extend(graph.nodes.iter().map(|node| {
        json!({
            "data": {
                "id": node.function,
                "label": node.function,
                "parent": cluster_id(node.cluster),
            }
        })
    }));

    let edges: Vec<Value> = graph
        .edges
        .iter()
        .map(|edge| {
            json!({
                "data": {
                    "id": format!("{}->{}", edge.caller, edge.callee),
                    "source": edge.caller,
                    "target": edge.callee,
                    "label": edge.call_site,
                }
            })
        })
        .collect();

    json!({ "elements": { "nodes": nodes, "edges": edges } })
}
