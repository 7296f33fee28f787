//! Gemini client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tracing::debug;
use uuid::Uuid;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{GenerateRequest, StreamEvent},
};

use super::mapper::{from_gemini_response, to_gemini_request};
use super::sse::parse_sse_stream;

/// Default root of the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Client for Gemini models on the Generative Language API, authenticated by API key
pub struct GeminiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// API key sent as `x-goog-api-key`
    api_key: String,
    /// Endpoint root, without trailing slash
    base_url: String,
    /// Model to use
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Arguments
    ///
    /// * `api_key` - Generative Language API key
    /// * `model` - Model identifier (e.g., "gemini-2.5-flash")
    /// * `base_url` - API root (see [`DEFAULT_BASE_URL`])
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Model identifier this client sends requests to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the endpoint URL for streaming
    fn build_endpoint_url(&self) -> String {
        endpoint_url(&self.base_url, &self.model)
    }

    /// Make a streaming request to Gemini
    async fn make_streaming_request(
        &self,
        request: GenerateRequest,
    ) -> Result<EventStream, LlmError> {
        let gemini_request = to_gemini_request(request);

        let url = self.build_endpoint_url();
        debug!(
            model = %self.model,
            turns = gemini_request.contents.len(),
            "sending Gemini request"
        );

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_response(status.as_u16(), body));
        }

        let sse_stream = parse_sse_stream(Box::pin(response.bytes_stream()));

        let start = StreamEvent::MessageStart {
            id: Uuid::new_v4().to_string(),
        };

        // Flatten each response chunk into individual events
        let events = sse_stream.flat_map(|result| {
            futures::stream::iter(match result {
                Ok(chunk) => from_gemini_response(chunk)
                    .into_iter()
                    .map(Ok)
                    .collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            })
        });

        Ok(Box::pin(futures::stream::iter([Ok(start)]).chain(events)))
    }
}

/// Streaming endpoint for `model` under `base_url`
fn endpoint_url(base_url: &str, model: &str) -> String {
    format!("{}/models/{}:streamGenerateContent?alt=sse", base_url, model)
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_streaming_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_format() {
        let url = endpoint_url(DEFAULT_BASE_URL, DEFAULT_MODEL);
        assert_eq!(
            url,
            concat!(
                "https://generativelanguage.googleapis.com/v1beta",
                "/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
            )
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = GeminiClient::new("key", "gemini-2.5-pro", "http://localhost:8080/v1beta/")
            .expect("client should build");
        assert_eq!(
            client.build_endpoint_url(),
            "http://localhost:8080/v1beta/models/gemini-2.5-pro:streamGenerateContent?alt=sse"
        );
        assert_eq!(client.model(), "gemini-2.5-pro");
    }
}
