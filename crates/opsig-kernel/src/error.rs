//! Error types for signature derivation.

use crate::schema::ResourceRole;
use crate::translate::Surface;

/// Errors raised while deriving signatures for one schema entry.
///
/// Every variant is fail-fast: the offending signature is never built in a
/// degraded form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpsigError {
    /// `is_method` is set but no argument can serve as the receiver.
    #[error("schema invariant violation in `{schema}`: {reason}")]
    SchemaInvariantViolation { schema: String, reason: String },

    /// Some, but not all four, resource-options roles are present.
    #[error(
        "partial resource-options group in `{schema}`: present {present:?}, missing {missing:?}"
    )]
    PartialResourceOptionsGroup {
        schema: String,
        present: Vec<ResourceRole>,
        missing: Vec<ResourceRole>,
    },

    /// Two arguments claim the same resource-options role.
    #[error("duplicate resource-options role `{role}` in `{schema}`")]
    DuplicateResourceRole { schema: String, role: ResourceRole },

    /// A type descriptor has no rendering on the target surface.
    #[error("unrenderable type `{ty}`: {reason}")]
    UnrenderableType { ty: String, reason: String },

    /// A forwarding expression could not be built for a target argument.
    #[error("no binding in scope for {surface} argument `{name}`")]
    UnboundArgument { name: String, surface: Surface },

    /// Derivation configuration could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl OpsigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemaInvariantViolation { .. } => ErrorKind::SchemaInvariantViolation,
            Self::PartialResourceOptionsGroup { .. } => ErrorKind::PartialResourceOptionsGroup,
            Self::DuplicateResourceRole { .. } => ErrorKind::DuplicateResourceRole,
            Self::UnrenderableType { .. } => ErrorKind::UnrenderableType,
            Self::UnboundArgument { .. } => ErrorKind::UnboundArgument,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }
}

/// Stable tag for an [`OpsigError`], used in machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SchemaInvariantViolation,
    PartialResourceOptionsGroup,
    DuplicateResourceRole,
    UnrenderableType,
    UnboundArgument,
    InvalidConfig,
}
