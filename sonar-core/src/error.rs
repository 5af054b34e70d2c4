//! Error types for the poller queue

use thiserror::Error;

/// Result type alias for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors that can occur when configuring or driving a poller queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// `start` was called while workers from a previous start are still alive
    #[error("Queue is already running")]
    AlreadyRunning,

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QueueError {
    /// Create a configuration error from a message
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = QueueError::invalid_config("workers must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: workers must be positive"
        );
    }
}
