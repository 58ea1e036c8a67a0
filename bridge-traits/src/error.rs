use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The host refused the operation under its user-gesture policy
    /// (e.g. a browser rejecting `play()` before any interaction).
    #[error("Bridge operation not allowed: {0}")]
    NotAllowed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` when the host rejected the call because of its
    /// interaction policy rather than a device or network failure.
    pub fn is_not_allowed(&self) -> bool {
        matches!(self, BridgeError::NotAllowed(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
