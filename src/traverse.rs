//! Recursive value-graph traversal producing [`TreeNode`]s.
//!
//! Each recursion level returns its own node and the caller composes it into
//! its parent. Failures are confined to the field that caused them: they are
//! recorded as [`Diagnostic`]s and the walk continues with the next sibling.

use crate::diagnostics::{Diagnostic, SkipKind};
use crate::dispatch::{FieldFilter, NodeKind, Schema};
use crate::error::{PtvizError, PtvizResult};
use crate::host::{FieldDesc, InspectedValue};
use crate::tag::TagTable;
use crate::tree::{TreeEntry, TreeNode};
use crate::type_classifier::{
    DEFAULT_SENTINEL_ADDRESSES, is_array, is_container, is_nullish_with, is_pointer,
    is_primitive, is_readable, is_string,
};

/// Fields with no semantic value that are dropped everywhere.
pub const DEFAULT_EXCLUDED_FIELDS: &[&str] = &["qo_summary", "xasl"];

/// Nested nodes below one root. Long `next` chains nest one level per
/// element, so this bounds stack use on long lists.
pub const DEFAULT_MAX_DEPTH: usize = 256;

const MAX_ROOT_DEREF_DEPTH: usize = 8;

/// Immutable knobs for one traversal engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOptions {
    pub schema: Schema,
    pub tags: TagTable,
    pub excluded_fields: Vec<String>,
    pub sentinel_addresses: Vec<u64>,
    pub max_depth: usize,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            schema: Schema::default(),
            tags: TagTable::default(),
            excluded_fields: DEFAULT_EXCLUDED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sentinel_addresses: DEFAULT_SENTINEL_ADDRESSES.to_vec(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A built tree plus everything that was left out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    pub tree: TreeNode,
    pub diagnostics: Vec<Diagnostic>,
}

/// Walks one root. Create a fresh builder per root.
pub struct TreeBuilder<'a> {
    pub(crate) options: &'a TraversalOptions,
    path: Vec<String>,
    depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(options: &'a TraversalOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Build the tree for `root`, dereferencing it first when it is a pointer.
    pub fn build<V: InspectedValue>(mut self, name: &str, root: &V) -> TreeReport {
        let span = tracing::debug_span!("build_tree", root = %name);
        let _guard = span.enter();

        self.path.push(name.to_string());
        let tree = match self.root_value(root) {
            Ok(value) if is_container(&value) => self.visit(&value, &FieldFilter::new()),
            Ok(value) => {
                let mut node = TreeNode::new(value.type_info().name);
                match leaf_text(&value) {
                    Ok(text) => node.insert_leaf("value", text),
                    Err(err) => self.record(&err),
                }
                node
            }
            Err(err) => {
                self.record(&err);
                TreeNode::new(root.type_info().name)
            }
        };

        tracing::debug!(
            nodes = tree.node_count(),
            skipped = self.diagnostics.len(),
            "tree built"
        );
        TreeReport {
            tree,
            diagnostics: self.diagnostics,
        }
    }

    /// Visit every field of `node` in declaration order, minus `filter` and
    /// the always-excluded fields.
    ///
    /// Past `max_depth` nested nodes the node keeps only its type and the
    /// cut is recorded as a [`SkipKind::DepthLimit`] diagnostic.
    pub fn visit<V: InspectedValue>(&mut self, node: &V, filter: &FieldFilter) -> TreeNode {
        let mut out = TreeNode::new(node.type_info().name);
        if self.depth >= self.options.max_depth {
            self.skip(
                SkipKind::DepthLimit,
                format!("nesting exceeds {} levels", self.options.max_depth),
            );
            return out;
        }

        self.depth += 1;
        for field in node.fields() {
            if filter.excludes(&field.name) || self.is_always_excluded(&field.name) {
                continue;
            }
            self.path.push(field.name.clone());
            if let Some((key, entry)) = self.visit_field(node, &field) {
                out.insert(key, entry);
            }
            self.path.pop();
        }
        self.depth -= 1;
        out
    }

    fn visit_field<V: InspectedValue>(
        &mut self,
        owner: &V,
        field: &FieldDesc,
    ) -> Option<(String, TreeEntry)> {
        let value = match owner.field(&field.name) {
            Ok(v) => v,
            Err(err) => {
                self.record(&err);
                return None;
            }
        };

        if self.is_nullish(&value) {
            return None;
        }

        let value = if is_pointer(&value) {
            if is_string(&value) {
                return match value.read_string() {
                    Ok(text) => Some((field.name.clone(), TreeEntry::Leaf(text))),
                    Err(err) => {
                        self.record(&err);
                        None
                    }
                };
            }
            match value.dereference() {
                Ok(target) => target,
                Err(err) => {
                    self.record(&err);
                    return None;
                }
            }
        } else {
            value
        };

        if !is_readable(&value) {
            self.record(&PtvizError::not_accessible(format!(
                "`{}` value cannot be rendered",
                value.type_info()
            )));
            return None;
        }

        let info = value.type_info();
        if let Some(kind) = self.options.schema.classify(&info.name) {
            return self.dispatch(kind, field, owner, &value);
        }

        if is_container(&value) {
            let child = self.visit(&value, &FieldFilter::new());
            return Some((field.name.clone(), TreeEntry::Node(child)));
        }

        if is_primitive(&value) || is_array(&value) {
            return match value.render() {
                Ok(text) => Some((field.name.clone(), TreeEntry::Leaf(text))),
                Err(err) => {
                    self.record(&err);
                    None
                }
            };
        }

        self.skip(
            SkipKind::UnsupportedKind,
            format!("{} has unsupported kind `{}`", info.name, info.kind.as_str()),
        );
        None
    }

    fn dispatch<V: InspectedValue>(
        &mut self,
        kind: NodeKind,
        field: &FieldDesc,
        owner: &V,
        value: &V,
    ) -> Option<(String, TreeEntry)> {
        let result = match kind {
            NodeKind::Node => Ok((field.name.clone(), self.visit(value, &FieldFilter::new()))),
            NodeKind::StatementInfo => self.expand_tagged_union(owner, value),
            NodeKind::QueryInfo | NodeKind::ValueInfo | NodeKind::SpecInfo => self
                .visit_variant(kind, owner, value)
                .map(|node| (field.name.clone(), node)),
        };
        match result {
            Ok((key, node)) => Some((key, TreeEntry::Node(node))),
            Err(err) => {
                self.record(&err);
                None
            }
        }
    }

    fn root_value<V: InspectedValue>(&self, root: &V) -> PtvizResult<V> {
        let mut value = root.clone();
        for _ in 0..MAX_ROOT_DEREF_DEPTH {
            if !is_pointer(&value) || is_string(&value) {
                return Ok(value);
            }
            if self.is_nullish(&value) {
                return Err(PtvizError::deref(format!(
                    "root `{}` is a null pointer",
                    value.type_info()
                )));
            }
            value = value.dereference()?;
        }
        Err(PtvizError::deref("root pointer chain is too deep"))
    }

    // ------------------------------------------------------------------------
    // Shared helpers for the specialized handlers
    // ------------------------------------------------------------------------

    pub(crate) fn is_nullish<V: InspectedValue>(&self, value: &V) -> bool {
        is_nullish_with(value, &self.options.sentinel_addresses)
    }

    /// Member is readable and, for pointers, not null or a sentinel.
    pub(crate) fn is_present<V: InspectedValue>(&self, owner: &V, name: &str) -> bool {
        owner
            .field(name)
            .is_ok_and(|v| !self.is_nullish(&v) && is_readable(&v))
    }

    /// Dereference pointers, rejecting null and sentinel addresses.
    pub(crate) fn follow<V: InspectedValue>(&self, value: V) -> PtvizResult<V> {
        if !is_pointer(&value) {
            return Ok(value);
        }
        if self.is_nullish(&value) {
            return Err(PtvizError::deref(format!(
                "`{}` is a null pointer",
                value.type_info()
            )));
        }
        value.dereference()
    }

    pub(crate) fn with_path<T>(&mut self, segment: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment.to_string());
        let out = f(self);
        self.path.pop();
        out
    }

    fn is_always_excluded(&self, name: &str) -> bool {
        self.options.excluded_fields.iter().any(|f| f == name)
    }

    pub(crate) fn record(&mut self, err: &PtvizError) {
        self.skip(SkipKind::from_error(err), err.to_string());
    }

    pub(crate) fn skip(&mut self, kind: SkipKind, message: String) {
        let path = self.path.join(".");
        match kind {
            SkipKind::NotAccessible | SkipKind::Deref => {
                tracing::debug!(%path, kind = kind.as_str(), %message, "field skipped");
            }
            _ => tracing::warn!(%path, kind = kind.as_str(), %message, "field skipped"),
        }
        self.diagnostics.push(Diagnostic {
            path,
            kind,
            message,
        });
    }
}

/// Character pointers read as their contents, everything else as rendered.
pub(crate) fn leaf_text<V: InspectedValue>(value: &V) -> PtvizResult<String> {
    if is_string(value) {
        value.read_string()
    } else {
        value.render()
    }
}
