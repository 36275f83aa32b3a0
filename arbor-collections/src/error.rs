//! Error types.
//!
//! Every fallible operation returns [`Error`]. Each variant belongs to one
//! [`ErrorKind`], so callers can branch on the category without matching
//! every variant.

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A position or key outside the container's valid range.
    OutOfBounds,
    /// An operation whose precondition does not hold, such as reading the
    /// front of an empty container.
    Logic,
    /// A requested size beyond what the container can represent.
    Length,
}

/// Errors returned by container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Position `index` is not valid for a container of length `len`.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds {
        /// Requested position.
        index: usize,
        /// Length at the time of the call.
        len: usize,
    },

    /// A map lookup found no entry for the key.
    #[error("key not found")]
    KeyNotFound,

    /// `op` requires at least one element.
    #[error("{op} called on an empty container")]
    Empty {
        /// Name of the rejected operation.
        op: &'static str,
    },

    /// Requested capacity exceeds `max_size()`.
    #[error("requested capacity {requested} exceeds maximum {max}")]
    CapacityOverflow {
        /// Capacity that was asked for.
        requested: usize,
        /// Largest supported capacity.
        max: usize,
    },
}

impl Error {
    /// Returns the category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::OutOfBounds { .. } | Error::KeyNotFound => ErrorKind::OutOfBounds,
            Error::Empty { .. } => ErrorKind::Logic,
            Error::CapacityOverflow { .. } => ErrorKind::Length,
        }
    }
}
