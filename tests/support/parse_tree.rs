#![allow(dead_code)]

use ptviz::snapshot::SnapshotHost;
use serde_json::{Value, json};

/// Type declarations shaped like a SQL parser's parse-tree node and its
/// tagged `info` union.
pub fn parse_tree_types() -> Value {
    json!({
        "PT_NODE": {
            "kind": "struct",
            "fields": [
                {"name": "node_type", "type": "PT_NODE_TYPE"},
                {"name": "type_enum", "type": "PT_TYPE_ENUM"},
                {"name": "line_number", "type": "int"},
                {"name": "next", "type": "PT_NODE *"},
                {"name": "data_type", "type": "PT_NODE *"},
                {"name": "partition_pruned", "type": "int"},
                {"name": "info", "type": "PT_STATEMENT_INFO"}
            ]
        },
        "PT_NODE_TYPE": {"kind": "enum"},
        "PT_TYPE_ENUM": {"kind": "enum"},
        "PT_MISC_TYPE": {"kind": "enum"},
        "PT_STATEMENT_INFO": {
            "kind": "union",
            "fields": [
                {"name": "query", "type": "PT_QUERY_INFO"},
                {"name": "value", "type": "PT_VALUE_INFO"},
                {"name": "spec", "type": "PT_SPEC_INFO"},
                {"name": "name", "type": "PT_NAME_INFO"},
                {"name": "expr", "type": "PT_EXPR_INFO"}
            ]
        },
        "PT_QUERY_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "all_distinct", "type": "int"},
                {"name": "q", "type": "PT_SELECT_UNION"},
                {"name": "order_by", "type": "PT_NODE *"},
                {"name": "xasl", "type": "void *"}
            ]
        },
        "PT_SELECT_UNION": {
            "kind": "union",
            "fields": [
                {"name": "select", "type": "PT_SELECT_INFO"},
                {"name": "union_", "type": "PT_UNION_INFO"}
            ]
        },
        "PT_SELECT_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "list", "type": "PT_NODE *"},
                {"name": "from", "type": "PT_NODE *"},
                {"name": "where", "type": "PT_NODE *"}
            ]
        },
        "PT_UNION_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "arg1", "type": "PT_NODE *"},
                {"name": "arg2", "type": "PT_NODE *"}
            ]
        },
        "PT_VALUE_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "text", "type": "char *"},
                {"name": "data_value", "type": "PT_DATA_VALUE"},
                {"name": "db_value", "type": "DB_VALUE"},
                {"name": "print_charset", "type": "int"}
            ]
        },
        "PT_DATA_VALUE": {
            "kind": "union",
            "fields": [
                {"name": "i", "type": "long"},
                {"name": "f", "type": "float"},
                {"name": "d", "type": "double"},
                {"name": "bigint", "type": "int64_t"},
                {"name": "str", "type": "PARSER_VARCHAR *"}
            ]
        },
        "PARSER_VARCHAR": {
            "kind": "struct",
            "fields": [
                {"name": "length", "type": "int"},
                {"name": "bytes", "type": "char [1]"}
            ]
        },
        "DB_VALUE": {
            "kind": "struct",
            "fields": [{"name": "need_clear", "type": "bool"}]
        },
        "PT_SPEC_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "entity_name", "type": "PT_NODE *"},
                {"name": "flat_entity_list", "type": "PT_NODE *"},
                {"name": "range_var", "type": "PT_NODE *"},
                {"name": "derived_table", "type": "PT_NODE *"},
                {"name": "derived_table_type", "type": "PT_MISC_TYPE"},
                {"name": "meta_class", "type": "PT_MISC_TYPE"},
                {"name": "only_all", "type": "PT_MISC_TYPE"},
                {"name": "partition", "type": "PT_NODE *"},
                {"name": "except_list", "type": "PT_NODE *"},
                {"name": "as_attr_list", "type": "PT_NODE *"},
                {"name": "cte_pointer", "type": "PT_NODE *"},
                {"name": "on_cond", "type": "PT_NODE *"},
                {"name": "using_cond", "type": "PT_NODE *"},
                {"name": "id", "type": "int"}
            ]
        },
        "PT_NAME_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "original", "type": "char *"},
                {"name": "resolved", "type": "char *"}
            ]
        },
        "PT_EXPR_INFO": {
            "kind": "struct",
            "fields": [
                {"name": "op", "type": "int"},
                {"name": "arg1", "type": "PT_NODE *"}
            ]
        }
    })
}

/// Raw `PT_NODE` cell with every scalar member filled in. `info` holds only
/// the live arm.
pub fn node(tag: &str, type_enum: &str, info: Value) -> Value {
    json!({
        "node_type": tag,
        "type_enum": type_enum,
        "line_number": 1,
        "next": "0x0",
        "data_type": "0x0",
        "partition_pruned": 0,
        "info": info
    })
}

pub fn name_node(name_addr: &str) -> Value {
    node(
        "PT_NAME",
        "PT_TYPE_NONE",
        json!({"name": {"original": name_addr, "resolved": "0x0"}}),
    )
}

pub fn integer_value_node(n: i64) -> Value {
    node(
        "PT_VALUE",
        "PT_TYPE_INTEGER",
        json!({"value": {
            "text": "0x0",
            "data_value": {"i": n},
            "db_value": {"need_clear": false},
            "print_charset": 0
        }}),
    )
}

pub fn spec_info(entity_name: &str, flat_entity_list: &str) -> Value {
    json!({"spec": {
        "entity_name": entity_name,
        "flat_entity_list": flat_entity_list,
        "range_var": "0x0",
        "derived_table": "0x0",
        "derived_table_type": "PT_IS_SUBQUERY",
        "meta_class": "PT_CLASS",
        "only_all": "PT_ONLY",
        "partition": "0x0",
        "except_list": "0x0",
        "as_attr_list": "0x0",
        "cte_pointer": "0x0",
        "on_cond": "0x0",
        "using_cond": "0x0",
        "id": 7
    }})
}

/// Snapshot host over `memory`, with one `PT_NODE *` symbol per entry of
/// `roots`.
pub fn host_with(memory: Value, roots: &[(&str, &str)]) -> SnapshotHost {
    let symbols: serde_json::Map<String, Value> = roots
        .iter()
        .map(|(name, addr)| {
            (
                name.to_string(),
                json!({"type": "PT_NODE *", "value": addr}),
            )
        })
        .collect();

    SnapshotHost::from_json(json!({
        "types": parse_tree_types(),
        "memory": memory,
        "symbols": symbols,
        "backtrace": [
            {"function": "pt_bind_names", "file": "/src/parser/name_resolution.c", "line": 2214},
            {"function": "pt_compile", "file": "/src/parser/compile.c", "line": 377},
            {"function": "main", "file": "/src/bin/csql.c", "line": 40}
        ]
    }))
    .expect("fixture snapshot should load")
}

/// `SELECT a FROM tbl` rooted at `stmt`, plus a bare integer literal at `lit`.
pub fn select_host() -> SnapshotHost {
    host_with(
        json!({
            "0x1000": node(
                "PT_SELECT",
                "PT_TYPE_NONE",
                json!({"query": {
                    "all_distinct": 0,
                    "q": {"select": {"list": "0x2000", "from": "0x3000", "where": "0x0"}},
                    "order_by": "0x0",
                    "xasl": "0x0"
                }})
            ),
            "0x2000": name_node("0x5000"),
            "0x3000": node("PT_SPEC", "PT_TYPE_NONE", spec_info("0x4000", "0x4100")),
            "0x4000": name_node("0x5100"),
            "0x4100": name_node("0x5100"),
            "0x5000": "a",
            "0x5100": "tbl",
            "0x6000": integer_value_node(42)
        }),
        &[("stmt", "0x1000"), ("lit", "0x6000")],
    )
}
