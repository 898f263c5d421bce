//! Media query parsing error types

use thiserror::Error;

/// Media query parsing result type
pub type MediaResult<T> = Result<T, MediaError>;

/// Media query parsing errors
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Unbalanced parenthesis in media query '{query}'")]
    UnbalancedParen { query: String },

    #[error("Invalid media feature value '{value}'")]
    InvalidValue { value: String },

    #[error("Invalid aspect ratio '{value}'")]
    InvalidRatio { value: String },

    #[error("Empty media feature")]
    EmptyFeature,
}
