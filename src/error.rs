use thiserror::Error;

use crate::planner::MIN_PIXELS;

/// Problems with the form state that are caught before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "The selected resolution is too small ({pixels} pixels). \
         Seedream needs at least {min} pixels.",
        min = MIN_PIXELS
    )]
    SizeTooSmall { pixels: i64 },

    #[error("Please select an API key first.")]
    MissingApiKey,

    #[error("Please write a prompt.")]
    MissingPrompt,

    #[error("Please add at least one reference image.")]
    MissingImages,
}

#[derive(Debug, Error)]
pub enum SeedreamError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-2xx answer; the body is kept verbatim.
    #[error("HTTP {status} – {status_text}\n{body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response error: {0}")]
    Response(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Unsupported image file: {0}")]
    UnsupportedImage(String),

    #[error("Unknown aspect ratio: {0}")]
    UnknownRatio(String),

    #[error("Unknown API key profile: {0}")]
    UnknownProfile(String),
}

impl SeedreamError {
    pub fn is_validation(&self) -> bool {
        matches!(self, SeedreamError::Validation(_))
    }

    /// HTTP status of a rejected call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SeedreamError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeedreamError>;
