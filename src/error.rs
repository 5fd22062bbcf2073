//! Error types for formatting operations

use std::fmt;

/// Errors that can occur while turning pasted markup into formatted output
///
/// The transformation passes themselves never fail; every variant belongs to
/// a collaborator (decoding, parsing, serializing) or to the C ABI surface.
#[derive(Debug)]
pub enum FormatError {
    /// Markup could not be parsed into a tree
    ///
    /// html5ever recovers from every input, so nothing in this crate produces
    /// it today. Code 1 stays reserved in the C ABI for hosts that match on it.
    ParseError(String),
    /// Input bytes could not be decoded to text
    EncodingError(String),
    /// Rewritten tree could not be serialized back to markup
    SerializeError(String),
    /// Invalid input data (NULL pointers, bad parameters)
    InvalidInput(String),
    /// Internal error (a panic caught at the C ABI boundary)
    InternalError(String),
}

impl FormatError {
    /// Get numeric error code for FFI
    pub fn code(&self) -> u32 {
        match self {
            FormatError::ParseError(_) => 1,
            FormatError::EncodingError(_) => 2,
            FormatError::SerializeError(_) => 3,
            FormatError::InvalidInput(_) => 5,
            FormatError::InternalError(_) => 99,
        }
    }

    /// Returns true when the input itself could not be interpreted as text or markup
    pub fn is_uninterpretable_input(&self) -> bool {
        matches!(
            self,
            FormatError::ParseError(_) | FormatError::EncodingError(_)
        )
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::ParseError(msg) => write!(f, "Could not interpret input: {}", msg),
            FormatError::EncodingError(msg) => {
                write!(f, "Could not interpret input: encoding error: {}", msg)
            }
            FormatError::SerializeError(msg) => write!(f, "Serialize error: {}", msg),
            FormatError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            FormatError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
