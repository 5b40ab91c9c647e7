//! Type classification utilities for inspected values.
//!
//! These predicates decide how the traversal engine treats each field. They
//! are pure functions of the value's static type (plus, for the nullish and
//! readability checks, the host's rendering) and never return an error:
//! failures inside the host collapse to `false`.
//!
//! | Predicate      | True for |
//! |----------------|----------|
//! | `is_pointer`   | pointer types |
//! | `is_container` | struct and union types |
//! | `is_array`     | array types |
//! | `is_enum`      | enum types |
//! | `is_primitive` | int, float, char, bool, void, decfloat, enum |
//! | `is_string`    | `char *` |
//! | `is_nullish`   | pointers whose address is zero or a sentinel |
//! | `is_readable`  | values whose rendering succeeds |

use crate::host::{InspectedValue, TypeKind};

/// Pointer values treated as absent: the null address and the `0x1` marker.
pub const DEFAULT_SENTINEL_ADDRESSES: &[u64] = &[0x0, 0x1];

const CHAR_POINTER: &str = "char *";

// ============================================================================
// Structural Kind
// ============================================================================

pub fn is_pointer(v: &impl InspectedValue) -> bool {
    v.type_info().kind == TypeKind::Pointer
}

/// Struct or union.
pub fn is_container(v: &impl InspectedValue) -> bool {
    matches!(v.type_info().kind, TypeKind::Struct | TypeKind::Union)
}

pub fn is_array(v: &impl InspectedValue) -> bool {
    v.type_info().kind == TypeKind::Array
}

pub fn is_enum(v: &impl InspectedValue) -> bool {
    v.type_info().kind == TypeKind::Enum
}

pub fn is_primitive_kind(kind: TypeKind) -> bool {
    matches!(
        kind,
        TypeKind::Int
            | TypeKind::Float
            | TypeKind::Void
            | TypeKind::Char
            | TypeKind::Bool
            | TypeKind::Decfloat
            | TypeKind::Enum
    )
}

pub fn is_primitive(v: &impl InspectedValue) -> bool {
    is_primitive_kind(v.type_info().kind)
}

/// `char *`, compared textually like the debugger prints it.
pub fn is_string(v: &impl InspectedValue) -> bool {
    let info = v.type_info();
    info.kind == TypeKind::Pointer && normalize_type_name(&info.name) == CHAR_POINTER
}

/// Named-type equality, insensitive to pointer-star spacing.
pub fn is_named_type(v: &impl InspectedValue, name: &str) -> bool {
    normalize_type_name(&v.type_info().name) == normalize_type_name(name)
}

// ============================================================================
// Presence and Readability
// ============================================================================

/// A pointer whose address is zero or the `0x1` sentinel.
///
/// Non-pointers are never nullish.
pub fn is_nullish(v: &impl InspectedValue) -> bool {
    is_nullish_with(v, DEFAULT_SENTINEL_ADDRESSES)
}

pub fn is_nullish_with(v: &impl InspectedValue, sentinels: &[u64]) -> bool {
    if !is_pointer(v) {
        return false;
    }
    v.render()
        .ok()
        .and_then(|rendered| parse_address(&rendered))
        .is_some_and(|addr| sentinels.contains(&addr))
}

/// Rendering succeeds; swallows host failures such as optimized-out storage.
pub fn is_readable(v: &impl InspectedValue) -> bool {
    v.render().is_ok()
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Parse the leading `0x...` address of a rendered pointer such as
/// `0x55d0a1b2c3d0 <symbol>`.
pub fn parse_address(rendered: &str) -> Option<u64> {
    let token = rendered.split_whitespace().next()?;
    let hex = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))?;
    u64::from_str_radix(hex, 16).ok()
}

/// Collapse whitespace around `*` so `char*`, `char *` and `char  *` compare equal.
pub fn normalize_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for part in name.split_whitespace() {
        let mut base = part;
        let mut stars = 0usize;
        while let Some(rest) = base.strip_suffix('*') {
            base = rest;
            stars += 1;
        }
        if !base.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(base);
        }
        if stars > 0 {
            if !out.is_empty() && !out.ends_with('*') {
                out.push(' ');
            }
            out.push_str(&"*".repeat(stars));
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::IntrospectionHost;
    use crate::snapshot::SnapshotHost;
    use serde_json::json;

    fn host() -> SnapshotHost {
        SnapshotHost::from_json(json!({
            "types": {
                "PT_NODE": {
                    "kind": "struct",
                    "fields": [
                        {"name": "node_type", "type": "PT_NODE_TYPE"},
                        {"name": "line_number", "type": "int"}
                    ]
                },
                "PT_NODE_TYPE": {"kind": "enum"}
            },
            "memory": {
                "0x10": {"node_type": "PT_SELECT", "line_number": 1}
            },
            "symbols": {
                "node": {"type": "PT_NODE *", "value": "0x10"},
                "nil": {"type": "PT_NODE *", "value": "0x0"},
                "marker": {"type": "PT_NODE *", "value": "0x1"},
                "name": {"type": "char *", "value": "0x20"},
                "count": {"type": "int", "value": 0},
                "gone": {"type": "int", "value": null},
                "ids": {"type": "int [3]", "value": [1, 2, 3]}
            }
        }))
        .expect("snapshot should load")
    }

    #[test]
    fn test_structural_kinds() {
        let host = host();
        let node = host.evaluate("node").unwrap();
        assert!(is_pointer(&node));
        assert!(!is_container(&node));

        let deref = host.evaluate("*node").unwrap();
        assert!(is_container(&deref));
        assert!(!is_pointer(&deref));

        let tag = host.evaluate("node->node_type").unwrap();
        assert!(is_enum(&tag));
        assert!(is_primitive(&tag));

        let ids = host.evaluate("ids").unwrap();
        assert!(is_array(&ids));
        assert!(!is_primitive(&ids));
    }

    #[test]
    fn test_string_detection() {
        let host = host();
        assert!(is_string(&host.evaluate("name").unwrap()));
        assert!(!is_string(&host.evaluate("node").unwrap()));
    }

    #[test]
    fn test_nullish_pointers() {
        let host = host();
        assert!(is_nullish(&host.evaluate("nil").unwrap()));
        assert!(is_nullish(&host.evaluate("marker").unwrap()));
        assert!(!is_nullish(&host.evaluate("node").unwrap()));
    }

    #[test]
    fn test_non_pointers_are_never_nullish() {
        let host = host();
        // Integer zero is a value, not an absent pointer.
        assert!(!is_nullish(&host.evaluate("count").unwrap()));
        assert!(!is_nullish(&host.evaluate("*node").unwrap()));
        assert!(!is_nullish(&host.evaluate("gone").unwrap()));
    }

    #[test]
    fn test_readability_swallows_failures() {
        let host = host();
        assert!(is_readable(&host.evaluate("count").unwrap()));
        assert!(!is_readable(&host.evaluate("gone").unwrap()));
    }

    #[test]
    fn test_named_type_ignores_star_spacing() {
        let host = host();
        let node = host.evaluate("node").unwrap();
        assert!(is_named_type(&node, "PT_NODE*"));
        assert!(is_named_type(&node, "PT_NODE *"));
        assert!(!is_named_type(&node, "PT_NODE"));
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x0"), Some(0));
        assert_eq!(parse_address("0x55d0 <parser_main>"), Some(0x55d0));
        assert_eq!(parse_address("42"), None);
    }

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("char*"), "char *");
        assert_eq!(normalize_type_name("char  *"), "char *");
        assert_eq!(normalize_type_name("PT_NODE **"), "PT_NODE **");
        assert_eq!(normalize_type_name("unsigned   int"), "unsigned int");
    }
}
