//! Error handling for the bitrie library
//!
//! This module provides the error type shared by all fallible operations.
//! Not-found conditions are reported through `Option`/`bool` returns and are
//! never errors; nothing is retried internally.

use thiserror::Error;

/// Main error type for the bitrie library
#[derive(Error, Debug)]
pub enum BitrieError {
    /// Node allocation failed (heap exhaustion or arena overflow)
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Key buffer or bit length violates the call contract
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Error message describing the issue
        message: String,
    },

    /// A structural invariant of the tree does not hold
    #[error("Corrupted tree: {message}")]
    CorruptedTree {
        /// Description of the violated invariant
        message: String,
    },
}

impl BitrieError {
    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an invalid key error
    pub fn invalid_key<S: Into<String>>(message: S) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Create a corrupted tree error
    pub fn corrupted_tree<S: Into<String>>(message: S) -> Self {
        Self::CorruptedTree {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::OutOfMemory { .. } => true,
            Self::InvalidKey { .. } => false,
            Self::CorruptedTree { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::OutOfMemory { .. } => "memory",
            Self::InvalidKey { .. } => "key",
            Self::CorruptedTree { .. } => "structure",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BitrieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BitrieError::invalid_key("bit length exceeds buffer");
        assert_eq!(err.category(), "key");
        assert!(!err.is_recoverable());

        let err = BitrieError::out_of_memory(4096);
        assert_eq!(err.category(), "memory");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = BitrieError::out_of_memory(128);
        let display = format!("{}", err);
        assert!(display.contains("128"));

        let err = BitrieError::corrupted_tree("reference count mismatch");
        let display = format!("{}", err);
        assert!(display.contains("Corrupted tree"));
        assert!(display.contains("reference count mismatch"));
    }

    #[test]
    fn test_error_debug() {
        let err = BitrieError::invalid_key("debug test");
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("InvalidKey"));
        assert!(debug_str.contains("debug test"));
    }
}
