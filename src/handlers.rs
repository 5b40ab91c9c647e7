//! Specialized handlers for the node kinds in the dispatch table.
//!
//! All of them run beneath an owning parse-tree node: the owner carries the
//! discriminant (`node_type`) and, for literals, the data-type enum. Errors
//! returned from here drop only the subtree being built.

use crate::dispatch::{FieldFilter, NodeKind};
use crate::error::{PtvizError, PtvizResult};
use crate::host::InspectedValue;
use crate::traverse::{TreeBuilder, leaf_text};
use crate::tree::{TreeNode, info_key};
use crate::type_classifier::{is_array, is_container, is_named_type, is_pointer, is_string};

const QUERY_SHARED_FIELD: &str = "q";
const QUERY_SELECT_ARM: &str = "select";
const QUERY_UNION_ARM: &str = "union_";
const SELECT_TAG: &str = "PT_SELECT";
const SET_OPERATION_TAGS: &[&str] = &["PT_UNION", "PT_DIFFERENCE", "PT_INTERSECTION"];

const VALUE_TEXT_FIELD: &str = "text";
const VALUE_DATA_FIELD: &str = "data_value";
const VALUE_RAW_FIELDS: &[&str] = &["data_value", "db_value", "text"];

const SPEC_ENTITY_NAME: &str = "entity_name";
const SPEC_DERIVED_TABLE: &str = "derived_table";
const SPEC_DERIVED_TABLE_TYPE: &str = "derived_table_type";
const SPEC_AS_ATTR_LIST: &str = "as_attr_list";
const SPEC_CTE_POINTER: &str = "cte_pointer";
const SPEC_PARTITION_PRUNED: &str = "partition_pruned";
const DERIVED_JSON_TABLE: &str = "PT_DERIVED_JSON_TABLE";

/// Literal families, each decoded from its own arm of the value payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralFamily {
    /// Logical and numeric types, decoded by width.
    Numeric,
    Temporal,
    /// Character and bit strings.
    Character,
}

impl LiteralFamily {
    pub fn classify(value_type: &str) -> Option<Self> {
        match value_type {
            "logical" | "float" | "double" | "numeric" | "integer" | "bigint" | "smallint" => {
                Some(LiteralFamily::Numeric)
            }
            "date" | "time" | "timestamp" | "timestamptz" | "timestampltz" | "datetime"
            | "datetimetz" | "datetimeltz" => Some(LiteralFamily::Temporal),
            "char" | "nchar" | "bit" | "varchar" | "varnchar" | "varbit" => {
                Some(LiteralFamily::Character)
            }
            _ => None,
        }
    }

    /// Member of the data-value union that holds a `value_type` literal.
    pub fn payload_arm(&self, value_type: &str) -> &'static str {
        match (self, value_type) {
            (LiteralFamily::Numeric, "float") => "f",
            (LiteralFamily::Numeric, "double") => "d",
            (LiteralFamily::Numeric, "bigint") => "bigint",
            (LiteralFamily::Numeric, "numeric") => "str",
            (LiteralFamily::Numeric, _) => "i",
            (LiteralFamily::Temporal, _) | (LiteralFamily::Character, _) => "str",
        }
    }
}

impl<'a> TreeBuilder<'a> {
    /// Expand a tagged-union container into its single live arm.
    ///
    /// Returns the `info [<variant>]` key and the arm's node. Arms other than
    /// the resolved one alias the same storage and are never read.
    pub(crate) fn expand_tagged_union<V: InspectedValue>(
        &mut self,
        owner: &V,
        union: &V,
    ) -> PtvizResult<(String, TreeNode)> {
        self.require_node_owner(owner, union)?;
        let tag = self.read_tag(owner)?;
        let (variant_type, arm) = self.locate_arm(union, &tag)?;

        let arm_value = self.follow(union.field(&arm)?)?;
        let key = info_key(&variant_type);
        let node = self.with_path(&arm, |b| {
            match b.options.schema.classify(&variant_type) {
                Some(kind) if kind.is_variant() => b.visit_variant(kind, owner, &arm_value),
                _ => Ok(b.visit(&arm_value, &FieldFilter::new())),
            }
        })?;
        Ok((key, node))
    }

    /// Table rule, then the declared-type naming rule, then the tag's own name.
    fn locate_arm<V: InspectedValue>(&self, union: &V, tag: &str) -> PtvizResult<(String, String)> {
        let union_type = union.type_info().name;
        let fields = union.fields();
        let tags = &self.options.tags;

        let rule = tags.resolve_variant(tag, &union_type);
        if let Some(f) = fields.iter().find(|f| f.name == rule.field) {
            let variant = if tags.get(tag).is_some() {
                rule.variant_type
            } else {
                f.type_name.clone()
            };
            return Ok((variant, f.name.clone()));
        }

        let by_tag = tags.tag_field_name(tag);
        if let Some(f) = fields.iter().find(|f| f.name == by_tag) {
            return Ok((f.type_name.clone(), f.name.clone()));
        }

        Err(PtvizError::UnknownVariant {
            tag: tag.to_string(),
            union_type,
        })
    }

    pub(crate) fn visit_variant<V: InspectedValue>(
        &mut self,
        kind: NodeKind,
        owner: &V,
        value: &V,
    ) -> PtvizResult<TreeNode> {
        self.require_node_owner(owner, value)?;
        match kind {
            NodeKind::QueryInfo => self.visit_query(owner, value),
            NodeKind::ValueInfo => self.visit_value(owner, value),
            NodeKind::SpecInfo => self.visit_spec(owner, value),
            NodeKind::Node | NodeKind::StatementInfo => Ok(self.visit(value, &FieldFilter::new())),
        }
    }

    /// Query variant: the shared `q` union minus the arm of the other query
    /// kind, merged with the variant's own fields.
    fn visit_query<V: InspectedValue>(&mut self, owner: &V, value: &V) -> PtvizResult<TreeNode> {
        let tag = self.read_tag(owner)?;
        let mut filter = FieldFilter::new();
        if tag == SELECT_TAG {
            filter.exclude(QUERY_UNION_ARM);
        } else if SET_OPERATION_TAGS.contains(&tag.as_str()) {
            filter.exclude(QUERY_SELECT_ARM);
        }

        let mut node = self.visit(value, &FieldFilter::from([QUERY_SHARED_FIELD]));
        self.with_path(QUERY_SHARED_FIELD, |b| {
            match value.field(QUERY_SHARED_FIELD).and_then(|q| b.follow(q)) {
                Ok(shared) => {
                    let shared_node = b.visit(&shared, &filter);
                    node.absorb(shared_node);
                }
                Err(err) => b.record(&err),
            }
        });
        Ok(node)
    }

    /// Literal variant: regular fields plus the decoded `value` and its
    /// lowercased `value_type`. An unreadable type enum drops only those two.
    fn visit_value<V: InspectedValue>(&mut self, owner: &V, value: &V) -> PtvizResult<TreeNode> {
        let raw_fields: FieldFilter = VALUE_RAW_FIELDS.iter().copied().collect();
        let mut node = self.visit(value, &raw_fields);

        let options = self.options;
        let schema = &options.schema;
        let raw_type = match owner
            .field(&schema.type_enum_field)
            .and_then(|field| field.render())
        {
            Ok(raw) => raw,
            Err(err) => {
                self.with_path("value", |b| b.record(&err));
                return Ok(node);
            }
        };
        let value_type = raw_type
            .strip_prefix(schema.type_enum_prefix.as_str())
            .unwrap_or(&raw_type)
            .to_lowercase();

        self.with_path("value", |b| match b.decode_literal(value, &value_type) {
            Ok(Some(text)) => node.insert_leaf("value", text),
            Ok(None) => {}
            Err(err) => b.record(&err),
        });
        node.insert_leaf("value_type", value_type);
        Ok(node)
    }

    /// Pre-rendered text first, raw payload arm otherwise. `None` for types
    /// outside the known literal families.
    pub(crate) fn decode_literal<V: InspectedValue>(
        &self,
        value: &V,
        value_type: &str,
    ) -> PtvizResult<Option<String>> {
        let Some(family) = LiteralFamily::classify(value_type) else {
            return Ok(None);
        };

        if let Some(text) = self.pre_rendered_text(value) {
            return Ok(Some(text));
        }

        let arm = family.payload_arm(value_type);
        let payload = value.field(VALUE_DATA_FIELD)?.field(arm)?;
        let decoded = if arm == "str" {
            self.string_payload(&payload, 0)?
        } else {
            payload.render()?
        };
        Ok(Some(decoded))
    }

    fn pre_rendered_text<V: InspectedValue>(&self, value: &V) -> Option<String> {
        let text = value.field(VALUE_TEXT_FIELD).ok()?;
        if self.is_nullish(&text) {
            return None;
        }
        leaf_text(&text).ok()
    }

    /// Character contents of a string-ish payload: `char *`, char arrays, or
    /// a (pointer to a) struct holding a `bytes` buffer.
    fn string_payload<V: InspectedValue>(&self, payload: &V, depth: usize) -> PtvizResult<String> {
        if depth > 4 {
            return Err(PtvizError::not_accessible("string payload nests too deeply"));
        }
        if is_string(payload) || is_array(payload) {
            return payload.read_string().or_else(|_| payload.render());
        }
        if is_pointer(payload) {
            let target = self.follow(payload.clone())?;
            return self.string_payload(&target, depth + 1);
        }
        if is_container(payload) && payload.fields().iter().any(|f| f.name == "bytes") {
            return self.string_payload(&payload.field("bytes")?, depth + 1);
        }
        payload.render()
    }

    /// Table spec: drop fields made irrelevant by their siblings, then
    /// traverse the rest generically.
    fn visit_spec<V: InspectedValue>(&mut self, owner: &V, value: &V) -> PtvizResult<TreeNode> {
        let filter = self.spec_exclusions(owner, value)?;
        Ok(self.visit(value, &filter))
    }

    /// Mutually-exclusive-field rules; the first matching rule wins.
    pub(crate) fn spec_exclusions<V: InspectedValue>(
        &self,
        owner: &V,
        value: &V,
    ) -> PtvizResult<FieldFilter> {
        let mut filter = FieldFilter::new();
        let is_entity = self.is_present(value, SPEC_ENTITY_NAME);

        if is_entity && self.partition_pruned(owner, value) {
            filter.exclude("flat_entity_list");
        } else if is_entity && self.entity_chains(value) {
            filter.exclude(SPEC_ENTITY_NAME);
        } else if is_entity {
            for name in ["meta_class", "only_all", SPEC_ENTITY_NAME, "partition", "except_list"] {
                filter.exclude(name);
            }
        } else if self.is_present(value, SPEC_DERIVED_TABLE) {
            for name in [SPEC_DERIVED_TABLE_TYPE, SPEC_DERIVED_TABLE, "range_var"] {
                filter.exclude(name);
            }
        }

        if self.is_present(value, SPEC_AS_ATTR_LIST)
            && !self.is_present(value, SPEC_CTE_POINTER)
            && !self.is_json_table(value)
        {
            filter.exclude(SPEC_AS_ATTR_LIST);
        }

        filter.exclude("on_cond");
        filter.exclude("using_cond");
        Ok(filter)
    }

    /// `partition_pruned` lives on the owning node; the variant is checked
    /// when the owner does not carry it.
    fn partition_pruned<V: InspectedValue>(&self, owner: &V, value: &V) -> bool {
        let flag = owner
            .field(SPEC_PARTITION_PRUNED)
            .or_else(|_| value.field(SPEC_PARTITION_PRUNED))
            .and_then(|v| v.render());
        match flag {
            Ok(text) => {
                let text = text.trim();
                text == "true" || text.parse::<i64>().is_ok_and(|n| n == 1)
            }
            Err(_) => false,
        }
    }

    /// The entity name is the head of a chain of names.
    fn entity_chains<V: InspectedValue>(&self, value: &V) -> bool {
        value
            .field(SPEC_ENTITY_NAME)
            .and_then(|name| self.follow(name))
            .is_ok_and(|name| self.is_present(&name, "next"))
    }

    fn is_json_table<V: InspectedValue>(&self, value: &V) -> bool {
        value
            .field(SPEC_DERIVED_TABLE_TYPE)
            .and_then(|v| v.render())
            .is_ok_and(|t| t == DERIVED_JSON_TABLE)
    }

    fn read_tag<V: InspectedValue>(&self, owner: &V) -> PtvizResult<String> {
        owner.field(&self.options.schema.tag_field)?.render()
    }

    fn require_node_owner<V: InspectedValue>(&self, owner: &V, value: &V) -> PtvizResult<()> {
        let node_type = &self.options.schema.node_type;
        if is_named_type(owner, node_type) {
            Ok(())
        } else {
            Err(PtvizError::other(format!(
                "`{}` is held by `{}`, not by a `{node_type}`",
                value.type_info(),
                owner.type_info()
            )))
        }
    }
}
