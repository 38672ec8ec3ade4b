//! LLM collaborator: provider trait plus typed failure classes.
//!
//! The provider reports authorization problems as free text, so the string
//! matching that classifies them is kept here in two small functions where a
//! single test can pin the wording.

pub mod gemini;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error: the process has no LLM credential at all.
    #[error("GEMINI_API_KEY is not set in environment variables")]
    MissingApiKey,
    /// The provider rejected the credential. `leaked` marks the specific
    /// key-reported-as-leaked rejection, which needs rotation rather than a
    /// permission fix.
    #[error("permission denied: {message}")]
    PermissionDenied { message: String, leaked: bool },
    /// Any other invocation failure (transport, 5xx, malformed response).
    #[error("{0}")]
    Invocation(String),
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt with deterministic decoding and return the raw text
    /// completion. An empty completion is not an error; the parser's
    /// fallback handles it.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
    fn provider_name(&self) -> &'static str;
}

/// Upstream wording for the flagged-credential rejection ("API key ...
/// reported as leaked").
pub fn is_leaked_key_message(message: &str) -> bool {
    message.to_lowercase().contains("leaked")
}

/// Fold an HTTP status plus error text into a typed failure class. The
/// leaked check runs first: providers have surfaced it under generic error
/// codes as well as 403s.
pub fn classify_failure(status: Option<u16>, message: &str) -> LlmError {
    if is_leaked_key_message(message) {
        return LlmError::PermissionDenied {
            message: message.to_string(),
            leaked: true,
        };
    }

    let lower = message.to_lowercase();
    if matches!(status, Some(401) | Some(403))
        || lower.contains("permission denied")
        || lower.contains("permission_denied")
    {
        return LlmError::PermissionDenied {
            message: message.to_string(),
            leaked: false,
        };
    }

    LlmError::Invocation(message.to_string())
}
