use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("structuring service not configured: set PLACEMAP_LLM_API_KEY")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("structuring service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model reply is not a usable document: {reason}")]
    InvalidReply { reason: String },
}
