//! Precondition checks that run before any write reaches storage.

use std::fmt;

use serde::Serialize;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Serialized document is over the size cap.
    TooLarge { max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// A field has the wrong shape for its schema type.
    InvalidField(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLarge { max, .. } => {
                write!(f, "Profile data exceeds {}KB limit.", max / 1024)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidField(msg) => write!(f, "Invalid profile data: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum serialized size of a profile document, in bytes.
pub const MAX_PROFILE_BYTES: usize = 100 * 1024;

/// Reject a value whose JSON encoding is larger than [`MAX_PROFILE_BYTES`].
///
/// Runs on both the create and the update path, against the full document
/// that is about to be written.
pub fn validate_document_size<T: Serialize + ?Sized>(value: &T) -> Result<(), ValidationError> {
    let actual = serde_json::to_vec(value)
        .map_err(|e| ValidationError::InvalidField(e.to_string()))?
        .len();
    check_size(actual)
}

/// Size check on an already encoded length.
pub fn check_size(actual: usize) -> Result<(), ValidationError> {
    if actual > MAX_PROFILE_BYTES {
        return Err(ValidationError::TooLarge {
            max: MAX_PROFILE_BYTES,
            actual,
        });
    }
    Ok(())
}

/// Require a non-blank text value.
pub fn validate_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    Ok(())
}
