//! Error types for the reflection layer

use std::error::Error as StdError;

/// Registry and lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectError {
    /// Name does not resolve to a registered type
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// Same name registered twice
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A member or supertype references an unregistered type
    #[error("`{owner}` references unknown type `{missing}`")]
    DanglingReference {
        /// Type declaring the reference
        owner: String,
        /// Unresolved name
        missing: String,
    },

    /// Value does not have the requested shape
    #[error("expected {expected}, found {found}")]
    ValueMismatch {
        /// Requested shape
        expected: &'static str,
        /// Actual value kind
        found: &'static str,
    },
}

/// Failure while invoking a constructor, method or field accessor
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// Wrong number of arguments
    #[error("{member} expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Member signature
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Receiver is not an object or proxy
    #[error("{member} invoked on a {found} receiver")]
    InvalidReceiver {
        /// Member signature
        member: String,
        /// Receiver value kind
        found: &'static str,
    },

    /// Method has no body and the receiver cannot dispatch it
    #[error("{0} has no implementation")]
    MissingBody(String),

    /// Assignment to a final field
    #[error("field {0} is final")]
    FinalField(String),

    /// Proxy interface has no such method
    #[error("no method {method}/{arity} on {interface}")]
    NoSuchMethod {
        /// Interface name
        interface: String,
        /// Method name
        method: String,
        /// Argument count
        arity: usize,
    },

    /// Member body reported a failure
    #[error("{0}")]
    Failed(String),

    /// Failure raised by the code behind a proxy
    #[error(transparent)]
    Dispatch(Box<dyn StdError + Send + Sync>),
}

impl InvocationError {
    /// Create failure with message
    #[inline]
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap an error raised behind a proxy
    #[inline]
    #[must_use]
    pub fn dispatch(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Dispatch(Box::new(error))
    }
}
