//! Tag resolution: which arm of a tagged union holds the live payload.
//!
//! A node's discriminant (e.g. `node_type = PT_SELECT`) selects one arm of its
//! `info` union. A small table names the arm explicitly for tags that do not
//! follow the naming convention; every other tag falls back to a rule derived
//! from the declared union type's own name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_VARIANT_PREFIX: &str = "PT_";
pub const DEFAULT_VARIANT_SUFFIX: &str = "_INFO";

/// Variant type and the union member that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    #[serde(rename = "type")]
    pub variant_type: String,
    pub field: String,
}

impl TagRule {
    pub fn new(variant_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            variant_type: variant_type.into(),
            field: field.into(),
        }
    }
}

/// Immutable tag → variant table plus the naming fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTable {
    rules: BTreeMap<String, TagRule>,
    prefix: String,
    suffix: String,
}

impl Default for TagTable {
    fn default() -> Self {
        let rules = [
            ("PT_SELECT", "PT_QUERY_INFO", "query"),
            ("PT_UNION", "PT_QUERY_INFO", "query"),
            ("PT_DIFFERENCE", "PT_QUERY_INFO", "query"),
            ("PT_INTERSECTION", "PT_QUERY_INFO", "query"),
            ("PT_EXPR", "PT_EXPR_INFO", "expr"),
            ("PT_FUNCTION", "PT_FUNCTION_INFO", "function"),
            ("PT_VALUE", "PT_VALUE_INFO", "value"),
            ("PT_SPEC", "PT_SPEC_INFO", "spec"),
            ("PT_NAME", "PT_NAME_INFO", "name"),
        ]
        .into_iter()
        .map(|(tag, ty, field)| (tag.to_string(), TagRule::new(ty, field)))
        .collect();

        Self {
            rules,
            prefix: DEFAULT_VARIANT_PREFIX.to_string(),
            suffix: DEFAULT_VARIANT_SUFFIX.to_string(),
        }
    }
}

impl TagTable {
    /// Table with exactly `rules` and the default naming affixes.
    pub fn new(rules: impl IntoIterator<Item = (String, TagRule)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_affixes(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }

    /// Add or replace rules on top of the current table.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = (String, TagRule)>) {
        self.rules.extend(rules);
    }

    pub fn get(&self, tag: &str) -> Option<&TagRule> {
        self.rules.get(tag)
    }

    /// `(variant type, variant field)` for `tag`.
    ///
    /// Table hit returns the table's mapping; a miss returns the declared type
    /// unchanged with the field derived by [`TagTable::variant_field_name`].
    pub fn resolve_variant(&self, tag: &str, declared_type: &str) -> TagRule {
        if let Some(rule) = self.rules.get(tag) {
            return rule.clone();
        }
        TagRule::new(declared_type, self.variant_field_name(declared_type))
    }

    /// Strip the prefix and suffix once, then lowercase. Affixes match
    /// case-sensitively, so uppercase affixes never match a second pass.
    pub fn variant_field_name(&self, type_name: &str) -> String {
        let name = type_name.trim();
        let name = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        let name = name.strip_suffix(self.suffix.as_str()).unwrap_or(name);
        name.to_lowercase()
    }

    /// Union member named after the tag itself (`PT_INSERT` → `insert`).
    pub fn tag_field_name(&self, tag: &str) -> String {
        let tag = tag.trim();
        tag.strip_prefix(self.prefix.as_str())
            .unwrap_or(tag)
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_hit_returns_mapping() {
        let table = TagTable::new([(
            "SELECT".to_string(),
            TagRule::new("QueryInfo", "query"),
        )]);
        assert_eq!(
            table.resolve_variant("SELECT", "QueryNode"),
            TagRule::new("QueryInfo", "query")
        );
    }

    #[test]
    fn default_table_covers_query_kinds() {
        let table = TagTable::default();
        for tag in ["PT_SELECT", "PT_UNION", "PT_DIFFERENCE", "PT_INTERSECTION"] {
            assert_eq!(
                table.resolve_variant(tag, "PT_STATEMENT_INFO"),
                TagRule::new("PT_QUERY_INFO", "query")
            );
        }
    }

    #[test]
    fn table_miss_falls_back_to_declared_type_name() {
        let table = TagTable::default();
        assert_eq!(
            table.resolve_variant("PT_INSERT", "PT_STATEMENT_INFO"),
            TagRule::new("PT_STATEMENT_INFO", "statement")
        );
    }

    #[test]
    fn naming_rule_is_idempotent() {
        let table = TagTable::default();
        for name in ["PT_QUERY_INFO", "PT_PT_X_INFO_INFO", "query", "PT_", "_INFO", ""] {
            let once = table.variant_field_name(name);
            assert_eq!(table.variant_field_name(&once), once, "name = {name:?}");
        }
    }

    #[test]
    fn custom_affixes() {
        let table = TagTable::default().with_affixes("Ast", "Data");
        assert_eq!(table.variant_field_name("AstJoinData"), "join");
        assert_eq!(table.tag_field_name("AstJoin"), "join");
    }

    #[test]
    fn extend_overrides_existing_rules() {
        let mut table = TagTable::default();
        table.extend([(
            "PT_NAME".to_string(),
            TagRule::new("PT_ATTR_INFO", "attr"),
        )]);
        assert_eq!(
            table.resolve_variant("PT_NAME", "PT_STATEMENT_INFO"),
            TagRule::new("PT_ATTR_INFO", "attr")
        );
        assert_eq!(table.tag_field_name("PT_INSERT"), "insert");
    }
}
