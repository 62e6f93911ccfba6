//! Data exchanged with a [`super::CompletionProvider`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 4096,
        }
    }
}

/// Text returned by a provider plus usage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    /// Model that produced the text.
    pub model: String,
    /// Total tokens billed for the call; 0 when the provider does not say.
    pub total_tokens: u32,
}

/// Errors from a completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to completion provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode completion response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("completion response contained no text: {reason}")]
    Empty { reason: String },
}
