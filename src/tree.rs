//! Nested-mapping output model built by the traversal engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key every [`TreeNode`] carries with the concrete static type it came from.
pub const TYPE_KEY: &str = "TYPE";

/// Key under which an expanded tagged union is stored.
pub fn info_key(variant_type: &str) -> String {
    format!("info [{variant_type}]")
}

/// Edge role for a key: expanded unions collapse to `info`.
pub fn role_of(key: &str) -> &str {
    if key.starts_with("info [") && key.ends_with(']') {
        "info"
    } else {
        key
    }
}

/// One value in a [`TreeNode`]: a rendered scalar or a nested node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeEntry {
    Leaf(String),
    Node(TreeNode),
}

/// Mapping from field or role name to entry, serialized with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeNode {
    entries: BTreeMap<String, TreeEntry>,
}

impl TreeNode {
    pub fn new(type_name: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(TYPE_KEY.to_string(), TreeEntry::Leaf(type_name.into()));
        Self { entries }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.leaf(TYPE_KEY)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: TreeEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn insert_leaf(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, TreeEntry::Leaf(value.into()));
    }

    pub fn insert_node(&mut self, key: impl Into<String>, node: TreeNode) {
        self.insert(key, TreeEntry::Node(node));
    }

    /// Merge `other` into `self` without overwriting existing keys; `TYPE` is
    /// never taken from `other`.
    pub fn absorb(&mut self, other: TreeNode) {
        for (key, entry) in other.entries {
            if key == TYPE_KEY {
                continue;
            }
            self.entries.entry(key).or_insert(entry);
        }
    }

    pub fn get(&self, key: &str) -> Option<&TreeEntry> {
        self.entries.get(key)
    }

    pub fn leaf(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            TreeEntry::Leaf(s) => Some(s),
            TreeEntry::Node(_) => None,
        }
    }

    pub fn child(&self, key: &str) -> Option<&TreeNode> {
        match self.entries.get(key)? {
            TreeEntry::Node(n) => Some(n),
            TreeEntry::Leaf(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Scalar entries other than `TYPE`.
    pub fn leaves(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            TreeEntry::Leaf(s) if k != TYPE_KEY => Some((k.as_str(), s.as_str())),
            _ => None,
        })
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            TreeEntry::Node(n) => Some((k.as_str(), n)),
            TreeEntry::Leaf(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().map(|(_, c)| c.node_count()).sum::<usize>()
    }
}
