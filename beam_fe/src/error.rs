//! Error types for model building and analysis.

use thiserror::Error;

/// Result type alias for beam_fe operations
pub type FeResult<T> = Result<T, FeError>;

/// Errors raised while building, solving or querying an [`FeModel`](crate::FeModel).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeError {
    /// A node, material, member or combination with this name already exists
    #[error("Duplicate name: '{0}'")]
    DuplicateName(String),

    #[error("Node not found: '{0}'")]
    NodeNotFound(String),

    #[error("Material not found: '{0}'")]
    MaterialNotFound(String),

    #[error("Member not found: '{0}'")]
    MemberNotFound(String),

    #[error("Load combination not found: '{0}'")]
    ComboNotFound(String),

    /// Member geometry the solver cannot represent
    #[error("Invalid geometry for member '{member}': {reason}")]
    InvalidGeometry { member: String, reason: String },

    /// Load outside the member, wrong direction for the load kind, non-finite value
    #[error("Invalid load on member '{member}': {reason}")]
    InvalidLoad { member: String, reason: String },

    /// Bad argument to a result query (station count, position)
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// The free-DOF stiffness matrix is not positive definite
    #[error("Structure is unstable: {0}")]
    Unstable(String),

    /// Results were requested before `analyze` succeeded
    #[error("Model has not been analyzed")]
    NotAnalyzed,
}

impl FeError {
    pub(crate) fn invalid_geometry(member: &str, reason: impl Into<String>) -> Self {
        FeError::InvalidGeometry {
            member: member.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_load(member: &str, reason: impl Into<String>) -> Self {
        FeError::InvalidLoad {
            member: member.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        FeError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
