use thiserror::Error;

/// Result alias for errors emitted by ptviz internals.
pub type PtvizResult<T> = Result<T, PtvizError>;

/// Structured error type for the traversal engine, its host adapters and the
/// command front end.
#[derive(Debug, Error)]
pub enum PtvizError {
    /// Memory behind a value or field cannot be read.
    #[error("not accessible: {0}")]
    NotAccessible(String),

    /// A pointer target is unmapped or invalid.
    #[error("cannot dereference {0}")]
    Deref(String),

    /// Neither the tag table nor the naming fallbacks name a real union arm.
    #[error("unknown variant for tag `{tag}` in `{union_type}`")]
    UnknownVariant { tag: String, union_type: String },

    #[error("duplicated name: {0}")]
    DuplicateName(String),

    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("unknown graph: {0}")]
    UnknownGraph(String),

    #[error("cannot evaluate `{expr}`: {reason}")]
    Evaluation { expr: String, reason: String },

    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl PtvizError {
    pub fn not_accessible(msg: impl Into<String>) -> Self {
        Self::NotAccessible(msg.into())
    }

    pub fn deref(msg: impl Into<String>) -> Self {
        Self::Deref(msg.into())
    }

    pub fn evaluation(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Evaluation {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Errors that abort a whole operation instead of degrading to
    /// "omit and continue" inside a traversal.
    pub fn is_operation_level(&self) -> bool {
        matches!(
            self,
            PtvizError::DuplicateName(_)
                | PtvizError::UnsupportedCommand(_)
                | PtvizError::UnknownGraph(_)
        )
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning PtvizError.
#[macro_export]
macro_rules! ptviz_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::PtvizError::other(format!($($arg)*)))
    };
}
