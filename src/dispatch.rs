//! Dispatch table: concrete type name → specialized handler kind.

use crate::host::IntrospectionHost;
use crate::type_classifier::normalize_type_name;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Node kinds that get bespoke treatment ahead of generic recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The top-level recursive node type.
    Node,
    /// The tagged-union `info` container.
    StatementInfo,
    /// SELECT / set-operation query variant.
    QueryInfo,
    /// Literal value variant.
    ValueInfo,
    /// Table / derived-table spec variant.
    SpecInfo,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Node,
        NodeKind::StatementInfo,
        NodeKind::QueryInfo,
        NodeKind::ValueInfo,
        NodeKind::SpecInfo,
    ];

    /// Variant kinds are only meaningful beneath an owning node.
    pub fn is_variant(&self) -> bool {
        matches!(
            self,
            NodeKind::QueryInfo | NodeKind::ValueInfo | NodeKind::SpecInfo
        )
    }
}

/// Names of the target's parse-tree types and discriminant fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Schema {
    pub node_type: String,
    pub statement_info_type: String,
    pub query_info_type: String,
    pub value_info_type: String,
    pub spec_info_type: String,
    /// Discriminant member on the node type.
    pub tag_field: String,
    /// Literal data-type member on the node type.
    pub type_enum_field: String,
    pub type_enum_prefix: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            node_type: "PT_NODE".to_string(),
            statement_info_type: "PT_STATEMENT_INFO".to_string(),
            query_info_type: "PT_QUERY_INFO".to_string(),
            value_info_type: "PT_VALUE_INFO".to_string(),
            spec_info_type: "PT_SPEC_INFO".to_string(),
            tag_field: "node_type".to_string(),
            type_enum_field: "type_enum".to_string(),
            type_enum_prefix: "PT_TYPE_".to_string(),
        }
    }
}

impl Schema {
    pub fn type_name(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::Node => &self.node_type,
            NodeKind::StatementInfo => &self.statement_info_type,
            NodeKind::QueryInfo => &self.query_info_type,
            NodeKind::ValueInfo => &self.value_info_type,
            NodeKind::SpecInfo => &self.spec_info_type,
        }
    }

    /// Look up the handler kind for a concrete type name.
    pub fn classify(&self, type_name: &str) -> Option<NodeKind> {
        let normalized = normalize_type_name(type_name);
        NodeKind::ALL
            .into_iter()
            .find(|kind| normalize_type_name(self.type_name(*kind)) == normalized)
    }

    /// Dispatch type names the host has no declaration for. Nodes of these
    /// types would silently fall back to generic traversal.
    pub fn missing_types<H: IntrospectionHost>(&self, host: &H) -> Vec<&str> {
        NodeKind::ALL
            .into_iter()
            .map(|kind| self.type_name(kind))
            .filter(|name| host.lookup_type(name).is_none())
            .collect()
    }
}

/// Field names excluded from one traversal step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    names: BTreeSet<String>,
}

impl FieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(&mut self, name: impl Into<String>) -> &mut Self {
        self.names.insert(name.into());
        self
    }

    pub fn excludes(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for FieldFilter {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}
