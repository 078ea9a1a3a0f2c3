//! Error types for Blueprint construction
//!
//! Every failure surfaced by [`crate::Blueprint`] is one of five kinds:
//! - Invalid arguments rejected before any work starts
//! - Construction cycles with no registered cycle handler
//! - Abstract or strategy-less types that cannot be synthesized
//! - Concrete types without a public constructor
//! - Failures raised while invoking a discovered member

use blueprint_reflect::{InvocationError, ReflectError};

/// Result alias for construction
pub type Result<T, E = BlueprintError> = std::result::Result<T, E>;

/// Main Blueprint error type
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    /// Required argument missing or malformed
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Argument name
        argument: String,
        /// What was wrong with it
        reason: String,
    },

    /// Type appeared twice on the active construction stack
    #[error("cycle detected: {} (while {last_action})", .chain.join(" -> "))]
    Cycle {
        /// Types from outermost to the repeated one
        chain: Vec<String>,
        /// Last recorded session action
        last_action: String,
    },

    /// Abstract type with no strategy and no concrete shape
    #[error("unsupported type `{type_name}`: register a creation strategy or use a concrete subtype")]
    UnsupportedType {
        /// Offending type
        type_name: String,
    },

    /// Concrete type with zero public constructors
    #[error("no accessible constructor for `{type_name}`")]
    NoAccessibleConstructor {
        /// Offending type
        type_name: String,
    },

    /// Invoking a constructor, method or field failed
    #[error("construction failed at {target}: {source}")]
    ConstructionFailed {
        /// Member being invoked
        target: String,
        /// Underlying failure
        #[source]
        source: InvocationError,
    },
}

impl BlueprintError {
    /// Create invalid argument error
    #[inline]
    #[must_use]
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create unsupported type error
    #[inline]
    #[must_use]
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Wrap an invocation failure
    #[inline]
    #[must_use]
    pub fn construction_failed(target: impl ToString, source: InvocationError) -> Self {
        Self::ConstructionFailed {
            target: target.to_string(),
            source,
        }
    }

    /// Check for a cycle error
    #[inline]
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    /// Check for an invalid argument error
    #[inline]
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Type chain of a cycle error
    #[must_use]
    pub fn cycle_chain(&self) -> Option<&[String]> {
        match self {
            Self::Cycle { chain, .. } => Some(chain),
            _ => None,
        }
    }
}

impl From<ReflectError> for BlueprintError {
    fn from(err: ReflectError) -> Self {
        match err {
            ReflectError::UnknownType(name) => {
                Self::invalid_argument("type", format!("unknown type `{name}`"))
            }
            other => Self::invalid_argument("value", other.to_string()),
        }
    }
}
