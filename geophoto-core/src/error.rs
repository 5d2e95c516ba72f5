use thiserror::Error;

use crate::upload::MAX_UPLOAD_BYTES;

/// Shown whenever the backend can't be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Cannot connect to the server. Please check that the backend is running.";

/// Problems detected on the client before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose an image file (JPG, PNG, etc.)")]
    UnsupportedType { mime: String },

    #[error("File is too large! Maximum is 10MB")]
    TooLarge { size: u64 },

    #[error("Please choose a photo")]
    NoFileSelected,

    #[error("Album name must not be empty")]
    EmptyAlbumName,
}

impl ValidationError {
    pub fn too_large(size: u64) -> Option<Self> {
        (size > MAX_UPLOAD_BYTES).then_some(ValidationError::TooLarge { size })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not authorized (HTTP {status}), please log in again")]
    Auth { status: u16 },

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Deserialization(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Text to put in front of the user.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(err) => err.to_string(),
            Error::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Error::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
