//! Error types for the grid environment

use thiserror::Error;

/// Result type for grid operations
pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Debug, Error)]
pub enum GridError {
    /// Action token outside the five-element action set
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Grid with a zero extent
    #[error("Invalid grid dimensions {height}x{width}: both must be positive")]
    InvalidDimensions { height: usize, width: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
