//! Error taxonomy shared by every processor.
//!
//! Errors leaving an invocation are [`InvocationError`]s. Each one carries a
//! [`Fault`] describing what went wrong, and is classified for retry
//! purposes:
//!
//! - [`InvocationError::Unclassified`]: a generic failure, open to
//!   reclassification by downstream processors
//! - [`InvocationError::Unrecoverable`]: never retried, always surfaced as-is
//! - [`InvocationError::Recoverable`]: retry-eligible wrapper around another
//!   error, which stays reachable as the cause
//!
//! # Examples
//!
//! ```
//! use interpose_core::{Classification, Fault, InvocationError};
//!
//! let err = InvocationError::from(Fault::validation("amount must be positive"));
//! assert_eq!(err.classification(), Classification::Unclassified);
//!
//! let wrapped = err.into_recoverable();
//! assert_eq!(wrapped.classification(), Classification::Recoverable);
//! assert_eq!(wrapped.fault().message(), "amount must be positive");
//!
//! // Wrapping is idempotent.
//! let again = wrapped.into_recoverable();
//! assert!(matches!(again.cause(), Some(InvocationError::Unclassified(_))));
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// What kind of failure a [`Fault`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Input failed validation.
    Validation,
    /// Input could not be parsed.
    Malformed,
    /// The request would create a duplicate.
    Duplicate,
    /// A requested capability or representation is not supported.
    Unsupported,
    /// Authentication or authorization failure.
    Security,
    /// Anything else.
    General,
}

impl FaultKind {
    /// Returns a short, stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Validation => "validation",
            FaultKind::Malformed => "malformed",
            FaultKind::Duplicate => "duplicate",
            FaultKind::Unsupported => "unsupported",
            FaultKind::Security => "security",
            FaultKind::General => "general",
        }
    }
}

/// Where a [`Fault`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Raised by service code executing an invocation.
    Service,
    /// Raised by interception machinery rather than by the service.
    Chain,
}

/// Description of a single failure.
#[derive(Clone)]
pub struct Fault {
    kind: FaultKind,
    origin: Origin,
    message: String,
    source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl Fault {
    /// Creates a service-originated fault.
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin: Origin::Service,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fault raised by interception machinery. Such faults are
    /// never attributed to the service being invoked.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            origin: Origin::Chain,
            ..Self::new(FaultKind::General, message)
        }
    }

    /// Shorthand for a [`FaultKind::General`] service fault.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(FaultKind::General, message)
    }

    /// Shorthand for a [`FaultKind::Validation`] service fault.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Validation, message)
    }

    /// Shorthand for a [`FaultKind::Malformed`] service fault.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Malformed, message)
    }

    /// Shorthand for a [`FaultKind::Duplicate`] service fault.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Duplicate, message)
    }

    /// Shorthand for a [`FaultKind::Unsupported`] service fault.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Unsupported, message)
    }

    /// Shorthand for a [`FaultKind::Security`] service fault.
    pub fn security(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Security, message)
    }

    /// Attaches the underlying error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// The failure kind.
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Where the fault was raised.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn StdError + 'static))
    }
}

/// Retry classification of an [`InvocationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Generic failure.
    Unclassified,
    /// Never retried.
    Unrecoverable,
    /// Eligible for retry.
    Recoverable,
}

/// Error returned from an intercepted invocation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvocationError {
    /// A generic failure.
    #[error(transparent)]
    Unclassified(Fault),

    /// A failure that must never be retried.
    #[error("unrecoverable: {0}")]
    Unrecoverable(Fault),

    /// A retry-eligible failure wrapping its cause.
    #[error("recoverable: {0}")]
    Recoverable(Box<InvocationError>),
}

impl InvocationError {
    /// Creates an unrecoverable error.
    pub fn unrecoverable(fault: Fault) -> Self {
        InvocationError::Unrecoverable(fault)
    }

    /// Returns the retry classification.
    pub fn classification(&self) -> Classification {
        match self {
            InvocationError::Unclassified(_) => Classification::Unclassified,
            InvocationError::Unrecoverable(_) => Classification::Unrecoverable,
            InvocationError::Recoverable(_) => Classification::Recoverable,
        }
    }

    /// Returns true for [`InvocationError::Recoverable`].
    pub fn is_recoverable(&self) -> bool {
        matches!(self, InvocationError::Recoverable(_))
    }

    /// Returns true for [`InvocationError::Unrecoverable`].
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, InvocationError::Unrecoverable(_))
    }

    /// The innermost fault, looking through recoverable wrappers.
    pub fn fault(&self) -> &Fault {
        match self {
            InvocationError::Unclassified(fault) | InvocationError::Unrecoverable(fault) => fault,
            InvocationError::Recoverable(inner) => inner.fault(),
        }
    }

    /// The wrapped error of a recoverable wrapper.
    pub fn cause(&self) -> Option<&InvocationError> {
        match self {
            InvocationError::Recoverable(inner) => Some(inner),
            _ => None,
        }
    }

    /// Wraps the error as recoverable. Already-recoverable errors are
    /// returned unchanged.
    pub fn into_recoverable(self) -> Self {
        match self {
            recoverable @ InvocationError::Recoverable(_) => recoverable,
            other => InvocationError::Recoverable(Box::new(other)),
        }
    }
}

impl From<Fault> for InvocationError {
    fn from(fault: Fault) -> Self {
        InvocationError::Unclassified(fault)
    }
}

/// Result type for intercepted invocations.
pub type Result<T, E = InvocationError> = std::result::Result<T, E>;
