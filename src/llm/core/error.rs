//! Error types for the LLM layer

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when using LLM providers
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// SSE stream parsing failures
    #[error("Stream error: {0}")]
    StreamError(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Provider-specific errors
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: String, message: String },

    /// The model finished without producing any text
    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

impl LlmError {
    /// Build an error from a non-success HTTP response
    ///
    /// Google APIs answer failures with `{"error": {"code", "message", "status"}}`;
    /// when the body has that shape the provider's own status and message are kept.
    pub fn from_response(status: u16, body: String) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: GoogleError,
        }

        #[derive(Deserialize)]
        struct GoogleError {
            message: String,
            #[serde(default)]
            status: Option<String>,
        }

        match serde_json::from_str::<Envelope>(&body) {
            Ok(envelope) => {
                let code = envelope.error.status.unwrap_or_else(|| match status {
                    429 => "RESOURCE_EXHAUSTED".to_string(),
                    other => other.to_string(),
                });
                LlmError::ProviderError {
                    code,
                    message: envelope.error.message,
                }
            }
            Err(_) if status == 429 => LlmError::ProviderError {
                code: "RESOURCE_EXHAUSTED".to_string(),
                message: body,
            },
            Err(_) => LlmError::HttpError { status, body },
        }
    }
}

// Implement conversion from common error types
impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}
