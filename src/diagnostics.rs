use crate::error::PtvizError;
use serde::Serialize;
use std::fmt;

/// Why a field or subtree was left out of a traversal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    NotAccessible,
    Deref,
    UnknownVariant,
    /// The value's structural kind has no rendering rule.
    UnsupportedKind,
    /// A specialized handler could not decode part of its node.
    HandlerFailed,
    /// Nesting went past the configured maximum depth.
    DepthLimit,
}

impl SkipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipKind::NotAccessible => "not-accessible",
            SkipKind::Deref => "deref",
            SkipKind::UnknownVariant => "unknown-variant",
            SkipKind::UnsupportedKind => "unsupported-kind",
            SkipKind::HandlerFailed => "handler-failed",
            SkipKind::DepthLimit => "depth-limit",
        }
    }

    pub fn from_error(err: &PtvizError) -> Self {
        match err {
            PtvizError::NotAccessible(_) => SkipKind::NotAccessible,
            PtvizError::Deref(_) => SkipKind::Deref,
            PtvizError::UnknownVariant { .. } => SkipKind::UnknownVariant,
            _ => SkipKind::HandlerFailed,
        }
    }
}

/// A single omission recorded during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Diagnostic {
    /// Dotted path from the root name to the omitted field.
    pub path: String,
    pub kind: SkipKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.kind.as_str(), self.message)
    }
}
