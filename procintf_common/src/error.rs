//! Error types for endpoint operations.
//!
//! Every failure an endpoint handler can report is an [`IntfError`]. The
//! boundary converts it into a negative errno with [`IntfError::errno`], the
//! way a kernel file operation would return it.

use thiserror::Error;

/// Errno values surfaced at the boundary.
pub mod errno {
    /// No such entry.
    pub const ENOENT: i32 = 2;
    /// I/O error; used for writes to endpoints without a write handler.
    pub const EIO: i32 = 5;
    /// Out of memory; used for registration failures.
    pub const ENOMEM: i32 = 12;
    /// Permission denied.
    pub const EACCES: i32 = 13;
    /// Bad address.
    pub const EFAULT: i32 = 14;
    /// Invalid argument.
    pub const EINVAL: i32 = 22;
    /// Interrupted while waiting; the call may be restarted.
    pub const ERESTARTSYS: i32 = 512;

    /// Symbolic name of a known errno value.
    pub fn name(errno: i32) -> &'static str {
        match errno {
            ENOENT => "ENOENT",
            EIO => "EIO",
            ENOMEM => "ENOMEM",
            EACCES => "EACCES",
            EFAULT => "EFAULT",
            EINVAL => "EINVAL",
            ERESTARTSYS => "ERESTARTSYS",
            _ => "E?",
        }
    }
}

/// Reasons an integer payload could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing left after stripping the terminator.
    #[error("empty input")]
    Empty,

    /// A character outside the detected base.
    #[error("invalid digit")]
    InvalidDigit,

    /// Value does not fit the target type.
    #[error("value out of representable range")]
    Overflow,

    /// Payload is not valid UTF-8 text.
    #[error("payload is not text")]
    NotText,
}

/// Errors reported by endpoint handlers and the lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntfError {
    /// Write payload is empty or exceeds the endpoint bound.
    #[error("input length {len} outside 1..={max}")]
    InputTooLarge {
        /// Bytes offered by the caller
        len: usize,
        /// Endpoint bound
        max: usize,
    },

    /// Copy across the user boundary failed.
    #[error("transport fault copying {len} bytes")]
    TransportFault {
        /// Bytes the copy was asked to move
        len: usize,
    },

    /// Payload is not a valid integer literal.
    #[error("parse failure: {0}")]
    ParseFailure(#[from] ParseError),

    /// Parsed value outside the accepted range.
    #[error("value {value} outside allowed range {min}-{max}")]
    RangeViolation {
        /// Rejected value
        value: i64,
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
    },

    /// Caller was interrupted while waiting for the store lock.
    #[error("interrupted while waiting for lock, retry")]
    LockInterrupted,

    /// Namespace entry or store could not be created.
    #[error("registration of '{entry}' failed")]
    RegistrationFailure {
        /// Entry that failed
        entry: String,
    },

    /// Caller lacks the mode bits for the requested access.
    #[error("permission denied")]
    PermissionDenied,

    /// Endpoint has no handler for the operation.
    #[error("operation not supported by endpoint")]
    NotSupported,

    /// No endpoint with that name.
    #[error("no such entry: {0}")]
    NotFound(String),

    /// Namespace facility is not available.
    #[error("pseudo-filesystem facility unavailable")]
    Unsupported,
}

impl IntfError {
    /// Positive errno for this error; handlers return its negation.
    pub fn errno(&self) -> i32 {
        match self {
            IntfError::InputTooLarge { .. } => errno::EINVAL,
            IntfError::TransportFault { .. } => errno::EFAULT,
            IntfError::ParseFailure(_) => errno::EINVAL,
            IntfError::RangeViolation { .. } => errno::EINVAL,
            IntfError::LockInterrupted => errno::ERESTARTSYS,
            IntfError::RegistrationFailure { .. } => errno::ENOMEM,
            IntfError::PermissionDenied => errno::EACCES,
            IntfError::NotSupported => errno::EIO,
            IntfError::NotFound(_) => errno::ENOENT,
            IntfError::Unsupported => errno::EINVAL,
        }
    }

    /// True when the caller may simply retry the same call.
    pub fn is_restartable(&self) -> bool {
        matches!(self, IntfError::LockInterrupted)
    }
}

/// Result type for endpoint operations.
pub type IntfResult<T> = Result<T, IntfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_errno_mapping() {
        assert_eq!(IntfError::LockInterrupted.errno(), errno::ERESTARTSYS);
        assert_eq!(
            IntfError::InputTooLarge { len: 13, max: 12 }.errno(),
            errno::EINVAL
        );
        assert_eq!(IntfError::TransportFault { len: 4 }.errno(), errno::EFAULT);
        assert_eq!(
            IntfError::RangeViolation { value: 5, min: 0, max: 2 }.errno(),
            errno::EINVAL
        );
        assert_eq!(
            IntfError::from(ParseError::InvalidDigit).errno(),
            errno::EINVAL
        );
        assert_eq!(
            IntfError::RegistrationFailure { entry: "x".into() }.errno(),
            errno::ENOMEM
        );
    }

    #[test]
    fn only_lock_interruption_is_restartable() {
        assert!(IntfError::LockInterrupted.is_restartable());
        assert!(!IntfError::TransportFault { len: 1 }.is_restartable());
        assert!(!IntfError::NotSupported.is_restartable());
    }

    #[test]
    fn errno_names() {
        assert_eq!(errno::name(errno::EFAULT), "EFAULT");
        assert_eq!(errno::name(errno::ERESTARTSYS), "ERESTARTSYS");
        assert_eq!(errno::name(9999), "E?");
    }
}
