//! HTTP client for the remote code-generation service.
//!
//! The service accepts a diagram file as multipart form data on
//! `POST /generate-code` and answers with `{"code": "<source text>"}`.
//! [`GeneratorApi`] wraps that contract with [`reqwest`]; the
//! [`CodeGenerator`] trait is the seam the orchestrator depends on so
//! tests can substitute a fake.

use serde_json::Value;

/// Fixed filename for the uploaded diagram part.
pub const DIAGRAM_FILE_NAME: &str = "diagram.drawio";

/// Media type of the uploaded diagram content.
pub const DIAGRAM_MEDIA_TYPE: &str = "application/vnd.jgraph.mxfile";

/// Anything that can turn an exported diagram into source code.
#[async_trait::async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Submit `diagram_xml` and return the generated source text.
    async fn generate(&self, diagram_xml: &str) -> Result<String, GeneratorApiError>;
}

/// Errors from the code-generation HTTP contract.
///
/// The pipeline treats every variant identically (record and fail the
/// run); the split exists so the recorded message names what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("generation service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("generation service returned a malformed body: {0}")]
    MalformedBody(String),

    /// The response JSON lacked the `code` field.
    #[error("generation service response is missing the 'code' field")]
    MissingCode,
}

/// HTTP client for one code-generation service.
pub struct GeneratorApi {
    client: reqwest::Client,
    api_url: String,
}

impl GeneratorApi {
    /// Create a client for the service at `api_url`
    /// (e.g. `http://localhost:8000`).
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Wrap the diagram text as the service's expected `file` part.
    fn build_form(diagram_xml: &str) -> Result<reqwest::multipart::Form, reqwest::Error> {
        let part = reqwest::multipart::Part::text(diagram_xml.to_string())
            .file_name(DIAGRAM_FILE_NAME)
            .mime_str(DIAGRAM_MEDIA_TYPE)?;
        Ok(reqwest::multipart::Form::new().part("file", part))
    }
}

#[async_trait::async_trait]
impl CodeGenerator for GeneratorApi {
    async fn generate(&self, diagram_xml: &str) -> Result<String, GeneratorApiError> {
        let form = Self::build_form(diagram_xml)?;

        let response = self
            .client
            .post(format!("{}/generate-code", self.api_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GeneratorApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| GeneratorApiError::MalformedBody(e.to_string()))?;

        match value.get("code").and_then(Value::as_str) {
            Some(code) => Ok(code.to_string()),
            None => Err(GeneratorApiError::MissingCode),
        }
    }
}
