//! Generation Provider Port
//!
//! Abstract interface for the external text-generation collaborator.
//! It takes instruction text, a format hint and sampling parameters, and
//! returns raw text or fails. Transport and authentication live in the
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ExportParameters, GenerationError, OutputFormat, Provider, ProviderCredentials,
};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Sampling options sent with a generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// Temperature (0.0 - 2.0)
    pub temperature: f64,
    /// Top-p sampling
    pub top_p: f64,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
}

impl From<&ExportParameters> for SamplingOptions {
    fn from(params: &ExportParameters) -> Self {
        Self {
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            presence_penalty: params.presence_penalty,
            frequency_penalty: params.frequency_penalty,
        }
    }
}

/// One outbound generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System instruction followed by the user instruction
    pub messages: Vec<ChatMessage>,
    /// Notation the caller expects back
    pub format: OutputFormat,
    pub options: SamplingOptions,
}

impl GenerationRequest {
    /// The user instruction text
    pub fn instruction(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }
}

/// External text-generation collaborator
///
/// # Example
///
/// ```rust,ignore
/// use promptsmith::ports::GenerationProvider;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl GenerationProvider for EchoProvider {
///     async fn generate(&self, request: &GenerationRequest, _: &ProviderCredentials)
///         -> Result<String, GenerationError> {
///         Ok(request.instruction().to_string())
///     }
///     fn provider(&self) -> Provider { Provider::OpenAI }
/// }
/// ```
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Send the request and return the raw generated text
    async fn generate(
        &self,
        request: &GenerationRequest,
        credentials: &ProviderCredentials,
    ) -> Result<String, GenerationError>;

    /// Which provider's credentials this implementation needs
    fn provider(&self) -> Provider;

    /// Get the model ID being used
    fn model_id(&self) -> &str {
        self.provider().default_model()
    }
}
