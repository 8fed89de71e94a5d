// Error types for the comm module

use thiserror::Error;

/// Comm transport errors
#[derive(Debug, Error)]
pub enum CommError {
    #[error("Failed to decode request: {0}")]
    Decode(String),

    #[error("Failed to encode response: {0}")]
    Encode(String),

    #[error("Request line too large: {0} bytes")]
    LineTooLarge(usize),

    #[error("Response channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CommError>;
