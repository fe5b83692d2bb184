//! Error types for the best-fit simulator.
//!
//! Only genuine faults are errors. The two expected outcomes of the
//! allocator, "no block fits" and "nothing to release", are ordinary
//! values of [`Placement`](crate::allocator::Placement) and
//! [`Release`](crate::allocator::Release).
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::{Error, Result};
//!
//! fn checked_size(size: u64) -> Result<u64> {
//!     if size == 0 {
//!         return Err(Error::invalid_request("process size must be positive"));
//!     }
//!     Ok(size)
//! }
//!
//! assert!(checked_size(0).is_err());
//! assert_eq!(checked_size(12).unwrap(), 12);
//! ```

/// Main error type for the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The capacity list is empty or holds a zero capacity.
    ///
    /// Fatal to construction; no allocator is produced.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A request size (or handle) that is not acceptable.
    ///
    /// Rejected before any state is touched; the caller should re-prompt.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Create an invalid configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bestfit_sim::Error;
    ///
    /// let err = Error::invalid_configuration("no blocks");
    /// assert!(matches!(err, Error::InvalidConfiguration(_)));
    /// ```
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Check if the caller can recover by asking for new input.
    pub const fn is_request_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Get error code for logging.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bestfit_sim::Error;
    ///
    /// assert_eq!(Error::invalid_request("x").code(), "INVALID_REQUEST");
    /// ```
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;
