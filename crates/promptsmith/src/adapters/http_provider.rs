//! HTTP Generation Provider
//!
//! Calls a hosted model over HTTP using reqwest. Supports OpenAI-compatible
//! chat completions, the Anthropic messages API and Gemini generateContent.
//! Non-success responses surface the provider's body verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::domain::{GenerationError, Provider, ProviderCredentials};
use crate::ports::{GenerationProvider, GenerationRequest, MessageRole};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// reqwest implementation of [`GenerationProvider`]
#[derive(Clone)]
pub struct HttpGenerationProvider {
    client: Client,
    provider: Provider,
    model: String,
}

impl HttpGenerationProvider {
    pub fn new(provider: Provider) -> Self {
        Self {
            client: Client::new(),
            provider,
            model: provider.default_model().to_string(),
        }
    }

    /// Overrides the model name if needed.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        let options = &request.options;
        match self.provider {
            Provider::OpenAI => {
                let mut body = json!({
                    "model": self.model,
                    "messages": request.messages,
                    "temperature": options.temperature,
                    "top_p": options.top_p,
                    "max_tokens": options.max_tokens,
                });
                if let Some(presence) = options.presence_penalty {
                    body["presence_penalty"] = json!(presence);
                }
                if let Some(frequency) = options.frequency_penalty {
                    body["frequency_penalty"] = json!(frequency);
                }
                body
            }
            Provider::Anthropic => {
                let messages: Vec<_> = request
                    .messages
                    .iter()
                    .filter(|m| m.role != MessageRole::System)
                    .collect();
                let mut body = json!({
                    "model": self.model,
                    "messages": messages,
                    "temperature": options.temperature,
                    "top_p": options.top_p,
                    "max_tokens": options.max_tokens,
                });
                if let Some(system) = request.system_prompt() {
                    body["system"] = json!(system);
                }
                body
            }
            Provider::Google => {
                let mut body = json!({
                    "contents": [{
                        "role": "user",
                        "parts": [{ "text": request.instruction() }]
                    }],
                    "generationConfig": {
                        "temperature": options.temperature,
                        "topP": options.top_p,
                        "maxOutputTokens": options.max_tokens,
                    }
                });
                if let Some(system) = request.system_prompt() {
                    body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
                }
                body
            }
        }
    }

    fn build_url(&self, base: &str) -> String {
        match self.provider {
            Provider::OpenAI => format!("{}/chat/completions", base),
            Provider::Anthropic => format!("{}/messages", base),
            Provider::Google => format!("{}/models/{}:generateContent", base, self.model),
        }
    }

    fn extract_text(&self, payload: &Value) -> Option<String> {
        let text = match self.provider {
            Provider::OpenAI => payload
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(str::to_string),
            Provider::Anthropic => payload.get("content").and_then(Value::as_array).map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            }),
            Provider::Google => payload
                .pointer("/candidates/0/content/parts")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|part| part.get("text").and_then(Value::as_str))
                        .collect::<Vec<_>>()
                        .join("")
                }),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
        credentials: &ProviderCredentials,
    ) -> Result<String, GenerationError> {
        let api_key = credentials
            .api_key()
            .ok_or(GenerationError::MissingCredential(self.provider))?;
        let url = self.build_url(&credentials.endpoint(self.provider));

        let mut http = self.client.post(&url).json(&self.build_body(request));
        http = match self.provider {
            Provider::OpenAI => http.bearer_auth(api_key),
            Provider::Anthropic => http
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            Provider::Google => http.query(&[("key", api_key)]),
        };

        tracing::debug!(provider = %self.provider, model = %self.model, "Sending generation request");

        let response = http
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(GenerationError::Provider { status, body });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;

        self.extract_text(&payload).ok_or_else(|| {
            GenerationError::InvalidResponse(format!("{} returned no text", self.provider))
        })
    }

    fn provider(&self) -> Provider {
        self.provider
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OutputFormat;
    use crate::ports::{ChatMessage, SamplingOptions};

    fn request() -> GenerationRequest {
        GenerationRequest {
            messages: vec![ChatMessage::system("Be terse"), ChatMessage::user("Refine")],
            format: OutputFormat::Json,
            options: SamplingOptions {
                temperature: 0.7,
                top_p: 1.0,
                max_tokens: 1024,
                presence_penalty: Some(0.0),
                frequency_penalty: None,
            },
        }
    }

    #[test]
    fn test_openai_body() {
        let provider = HttpGenerationProvider::new(Provider::OpenAI);
        let body = provider.build_body(&request());
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Refine");
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["presence_penalty"], 0.0);
        assert!(body.get("frequency_penalty").is_none());
    }

    #[test]
    fn test_anthropic_body_moves_system_prompt() {
        let provider = HttpGenerationProvider::new(Provider::Anthropic).with_model("claude-test");
        let body = provider.build_body(&request());
        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["system"], "Be terse");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_urls() {
        let google = HttpGenerationProvider::new(Provider::Google);
        assert_eq!(
            google.build_url("https://g.example/v1beta"),
            "https://g.example/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let openai = HttpGenerationProvider::new(Provider::OpenAI);
        assert_eq!(
            openai.build_url("http://localhost:8080/v1"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_extract_text() {
        let openai = HttpGenerationProvider::new(Provider::OpenAI);
        let payload = json!({ "choices": [{ "message": { "content": "done" } }] });
        assert_eq!(openai.extract_text(&payload).as_deref(), Some("done"));

        let anthropic = HttpGenerationProvider::new(Provider::Anthropic);
        let payload = json!({ "content": [{ "type": "text", "text": "a" }, { "type": "text", "text": "b" }] });
        assert_eq!(anthropic.extract_text(&payload).as_deref(), Some("ab"));

        assert_eq!(openai.extract_text(&json!({})), None);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_sending() {
        let provider = HttpGenerationProvider::new(Provider::OpenAI);
        let err = provider
            .generate(&request(), &ProviderCredentials::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingCredential(Provider::OpenAI)));
    }
}
