use serde::{Deserialize, Serialize};

/// Wire body of an edit call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub images: Vec<String>,
    pub size: String,
    pub enable_sync_mode: bool,
    pub enable_base64_output: bool,
}

impl GenerationRequest {
    /// Synchronous mode with URL outputs, the only mode the client uses.
    pub fn new(prompt: impl Into<String>, images: Vec<String>, size: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
            size: size.into(),
            enable_sync_mode: true,
            enable_base64_output: false,
        }
    }
}
