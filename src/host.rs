//! Adapter interface to the debugger / introspection host.
//!
//! Every call site in the engine depends on these traits only. A concrete
//! binding (a live debugger, a core-dump reader, or the JSON memory snapshot in
//! [`crate::snapshot`]) implements them and hands out value handles.

use crate::error::PtvizResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Structural kind of a static type after typedefs have been stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Union,
    Pointer,
    Array,
    Enum,
    Int,
    Float,
    Char,
    Bool,
    Void,
    Decfloat,
    Other,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::Pointer => "pointer",
            TypeKind::Array => "array",
            TypeKind::Enum => "enum",
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Char => "char",
            TypeKind::Bool => "bool",
            TypeKind::Void => "void",
            TypeKind::Decfloat => "decfloat",
            TypeKind::Other => "other",
        }
    }
}

/// Static type of an inspected value as the host names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Textual type name, e.g. `PT_NODE`, `char *`, `PT_NODE *`.
    pub name: String,
    pub kind: TypeKind,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One declared member of a struct or union type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Read-only, possibly-failing view of a value in the target process.
pub trait InspectedValue: Clone {
    fn type_info(&self) -> TypeInfo;

    /// Declared members in declaration order; empty for non-aggregates.
    fn fields(&self) -> Vec<FieldDesc>;

    /// Fails with `NotAccessible` when the member cannot be read.
    fn field(&self, name: &str) -> PtvizResult<Self>;

    /// Fails with `Deref` when the pointee is unmapped or invalid.
    fn dereference(&self) -> PtvizResult<Self>;

    /// Debugger-style rendering; fails with `NotAccessible` on unreadable memory.
    fn render(&self) -> PtvizResult<String>;

    /// Contents of a NUL-terminated character buffer this value points at.
    fn read_string(&self) -> PtvizResult<String>;
}

/// Capabilities the host offers beyond individual values.
pub trait IntrospectionHost {
    type Value: InspectedValue;

    fn lookup_type(&self, name: &str) -> Option<TypeInfo>;

    /// Evaluate an expression in the context of the stopped process.
    fn evaluate(&self, expr: &str) -> PtvizResult<Self::Value>;

    /// Current call stack, innermost frame first.
    fn backtrace(&self) -> PtvizResult<Vec<StackFrame>>;
}

/// A single frame of the target's call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub function: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

impl StackFrame {
    pub fn new(function: impl Into<String>, file: Option<&str>, line: Option<u32>) -> Self {
        Self {
            function: function.into(),
            file: file.map(str::to_string),
            line,
        }
    }

    /// `<module>/<file>` grouping key: parent directory name plus file name.
    pub fn cluster_name(&self) -> String {
        let Some(file) = self.file.as_deref() else {
            return "<unknown>".to_string();
        };
        let path = Path::new(file);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        match path
            .parent()
            .and_then(|p| p.file_name())
            .map(|m| m.to_string_lossy().into_owned())
        {
            Some(module) => format!("{module}/{file_name}"),
            None => file_name,
        }
    }
}
