//! Per-session state: parsed roots, named call graphs and the output directory.
//!
//! One [`Session`] is owned by the command loop and passed by reference to
//! every operation. Nothing here is process-global.

use crate::callgraph::{NamedGraph, build_call_graph};
use crate::error::{PtvizError, PtvizResult};
use crate::graph::GraphModel;
use crate::host::{InspectedValue, StackFrame};
use crate::traverse::{TraversalOptions, TreeBuilder, TreeReport};
use crate::tree::TreeNode;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Session {
    options: TraversalOptions,
    output_dir: PathBuf,
    render_png: bool,
    trees: BTreeMap<String, TreeNode>,
    graphs: BTreeMap<String, NamedGraph>,
}

impl Session {
    pub fn new(options: TraversalOptions, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            options,
            output_dir: output_dir.into(),
            render_png: false,
            trees: BTreeMap::new(),
            graphs: BTreeMap::new(),
        }
    }

    pub fn with_render_png(mut self, render_png: bool) -> Self {
        self.render_png = render_png;
        self
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn render_png(&self) -> bool {
        self.render_png
    }

    /// Switch the output directory. The directory must already exist and be
    /// writable.
    pub fn init_output_dir(&mut self, dir: &Path) -> PtvizResult<&Path> {
        let meta = std::fs::metadata(dir)
            .map_err(|err| PtvizError::other(format!("{}: {err}", dir.display())))?;
        if !meta.is_dir() {
            crate::ptviz_bail!("{} is not a directory", dir.display());
        }
        if meta.permissions().readonly() {
            crate::ptviz_bail!("{} is not writable", dir.display());
        }
        self.output_dir = dir.to_path_buf();
        tracing::info!(dir = %dir.display(), "output directory set");
        Ok(&self.output_dir)
    }

    /// Traverse `root` and register the result under `name`.
    ///
    /// A name already taken in this session is rejected and the earlier tree
    /// is left as it was.
    pub fn build_tree<V: InspectedValue>(&mut self, name: &str, root: &V) -> PtvizResult<TreeReport> {
        if self.trees.contains_key(name) {
            return Err(PtvizError::DuplicateName(name.to_string()));
        }
        let report = TreeBuilder::new(&self.options).build(name, root);
        for diag in &report.diagnostics {
            tracing::warn!(root = name, "{diag}");
        }
        self.trees.insert(name.to_string(), report.tree.clone());
        Ok(report)
    }

    /// Like [`Session::build_tree`], then lay the tree out as a graph with ids
    /// starting from zero.
    pub fn build_graph<V: InspectedValue>(
        &mut self,
        name: &str,
        root: &V,
    ) -> PtvizResult<(GraphModel, TreeReport)> {
        let report = self.build_tree(name, root)?;
        let graph = GraphModel::from_tree(name, &report.tree);
        Ok((graph, report))
    }

    /// Register a call graph built from `frames`, given innermost first as a
    /// debugger prints them.
    pub fn create_call_graph(&mut self, name: &str, frames: &[StackFrame]) -> PtvizResult<&NamedGraph> {
        if self.graphs.contains_key(name) {
            return Err(PtvizError::DuplicateName(name.to_string()));
        }
        let outermost_first: Vec<StackFrame> = frames.iter().rev().cloned().collect();
        let graph = build_call_graph(name, &outermost_first);
        tracing::info!(
            graph = name,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "call graph created"
        );
        Ok(self.graphs.entry(name.to_string()).or_insert(graph))
    }

    pub fn has_graph(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    pub fn graph(&self, name: &str) -> PtvizResult<&NamedGraph> {
        self.graphs
            .get(name)
            .ok_or_else(|| PtvizError::UnknownGraph(name.to_string()))
    }

    pub fn tree(&self, name: &str) -> Option<&TreeNode> {
        self.trees.get(name)
    }

    pub fn tree_names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }
}
