//! Generation Service
//!
//! Sends the current document to an external provider for refinement and
//! keeps the results in a per-format overlay that shadows the codec's own
//! rendering.
//!
//! A request moves Idle -> Requesting -> Succeeded | Failed. Only one request
//! may be in flight; a second one is rejected with [`GenerationError::Busy`].
//! [`GenerationService::prepare`] acquires the in-flight slot synchronously
//! and returns a [`PreparedGeneration`] that owns only shared handles, so the
//! caller can keep editing its document while the request runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::{ExportShape, GenerationError, OutputFormat, Provider, ProviderCredentials};
use crate::formatters;
use crate::ports::{ChatMessage, GenerationProvider, GenerationRequest, SamplingOptions};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are an expert prompt engineer. You rewrite structured prompt \
specifications so they are clear, specific and unambiguous.";

/// Externally produced text per output format.
///
/// Entries are replaced only by a successful generation for the same
/// format and never expire on document edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOverlay {
    entries: HashMap<OutputFormat, String>,
}

impl GenerationOverlay {
    pub fn get(&self, format: OutputFormat) -> Option<&str> {
        self.entries.get(&format).map(String::as_str)
    }

    pub fn set(&mut self, format: OutputFormat, text: String) {
        self.entries.insert(format, text);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
struct PreviewState {
    overlay: GenerationOverlay,
    active: OutputFormat,
}

/// Clears the in-flight flag on every exit path, cancellation included.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, GenerationError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GenerationError::Busy)?;
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Application service for refinement requests and the preview overlay
pub struct GenerationService<P: GenerationProvider> {
    provider: Arc<P>,
    state: Arc<Mutex<PreviewState>>,
    in_flight: Arc<AtomicBool>,
    timeout: Duration,
}

impl<P: GenerationProvider> Clone for GenerationService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            state: self.state.clone(),
            in_flight: self.in_flight.clone(),
            timeout: self.timeout,
        }
    }
}

impl<P: GenerationProvider> GenerationService<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(PreviewState::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider.provider()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Format currently shown in the preview
    pub fn active_format(&self) -> OutputFormat {
        lock(&self.state).active
    }

    pub fn select_format(&self, format: OutputFormat) {
        lock(&self.state).active = format;
    }

    /// Generated text for `format`, if any
    pub fn overlay(&self, format: OutputFormat) -> Option<String> {
        lock(&self.state).overlay.get(format).map(str::to_string)
    }

    /// Overlay text for `format`, falling back to the live rendering
    pub fn preview(&self, format: OutputFormat, shape: &ExportShape) -> String {
        self.overlay(format)
            .unwrap_or_else(|| formatters::render(format, shape))
    }

    /// Check credentials, claim the in-flight slot and build the request.
    pub fn prepare(
        &self,
        format: OutputFormat,
        shape: &ExportShape,
        credentials: ProviderCredentials,
    ) -> Result<PreparedGeneration<P>, GenerationError> {
        if credentials.api_key().is_none() {
            return Err(GenerationError::MissingCredential(self.provider()));
        }
        let guard = InFlightGuard::acquire(&self.in_flight)?;

        let request = build_request(format, shape);
        tracing::debug!(format = %format, provider = %self.provider(), "Generation requested");

        Ok(PreparedGeneration {
            provider: self.provider.clone(),
            state: self.state.clone(),
            request,
            credentials,
            timeout: self.timeout,
            _guard: guard,
        })
    }
}

/// A claimed generation request, ready to run
pub struct PreparedGeneration<P: GenerationProvider> {
    provider: Arc<P>,
    state: Arc<Mutex<PreviewState>>,
    request: GenerationRequest,
    credentials: ProviderCredentials,
    timeout: Duration,
    _guard: InFlightGuard,
}

impl<P: GenerationProvider> PreparedGeneration<P> {
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Await the provider and store the result as the overlay for the
    /// requested format. On failure nothing is stored.
    pub async fn run(self) -> Result<String, GenerationError> {
        let format = self.request.format;
        let call = self.provider.generate(&self.request, &self.credentials);

        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(format = %format, "Generation failed: {}", e);
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(format = %format, "Generation timed out");
                return Err(GenerationError::Timeout(self.timeout));
            }
        };

        let text = strip_code_fence(&raw);
        let mut state = lock(&self.state);
        state.overlay.set(format, text.clone());
        state.active = format;
        drop(state);

        tracing::debug!(format = %format, chars = text.len(), "Generation stored");
        Ok(text)
    }
}

fn lock(state: &Mutex<PreviewState>) -> MutexGuard<'_, PreviewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Instruction embedding the document rendered in the target format
pub fn build_request(format: OutputFormat, shape: &ExportShape) -> GenerationRequest {
    let rendered = formatters::render(format, shape);
    let instruction = format!(
        "Improve the following prompt specification. Keep its intent and structure, \
         tighten the wording and fill in obvious gaps. Respond with only the improved \
         {label} document, without explanations.\n\n{rendered}",
        label = format.label(),
        rendered = rendered
    );

    GenerationRequest {
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(instruction)],
        format,
        options: SamplingOptions::from(&shape.parameters),
    }
}

/// Remove a Markdown code fence wrapping the whole reply.
///
/// Text is only unwrapped when it both opens with a fence line and closes
/// with a fence; fenced blocks inside a longer reply are left alone.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();

    let unwrapped = trimmed
        .strip_prefix("```")
        // The opening fence line may carry a language tag.
        .and_then(|rest| rest.split_once('\n'))
        .and_then(|(_, body)| body.trim_end().strip_suffix("```"))
        .filter(|inner| !inner.contains("\n```"));

    unwrapped.unwrap_or(trimmed).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParameterSchema, PromptDocument};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Provider returning a fixed reply, optionally waiting for a signal first
    struct ScriptedProvider {
        reply: Result<String, (u16, String)>,
        gate: Option<Arc<Notify>>,
        delay: Option<Duration>,
    }

    impl ScriptedProvider {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                gate: None,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn generate(
            &self,
            _request: &GenerationRequest,
            _credentials: &ProviderCredentials,
        ) -> Result<String, GenerationError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply
                .clone()
                .map_err(|(status, body)| GenerationError::Provider { status, body })
        }

        fn provider(&self) -> Provider {
            Provider::OpenAI
        }
    }

    fn shape() -> ExportShape {
        PromptDocument {
            role: "Helpful AI assistant".to_string(),
            ..Default::default()
        }
        .to_export_shape(ParameterSchema::Extended)
    }

    fn key() -> ProviderCredentials {
        ProviderCredentials::new("sk-test")
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  plain text \n"), "plain text");
        assert_eq!(strip_code_fence("```\nbody\n```\n"), "body");
        assert_eq!(strip_code_fence("```\n```"), "");
    }

    #[test]
    fn test_strip_code_fence_leaves_unwrapped_blocks() {
        let trailing_block = "# Guide\n\nRun:\n```bash\nmake\n```";
        assert_eq!(strip_code_fence(trailing_block), trailing_block);

        let leading_block = "```bash\nmake\n```\nThen deploy.";
        assert_eq!(strip_code_fence(leading_block), leading_block);

        let two_blocks = "```\na\n```\ntext\n```\nb\n```";
        assert_eq!(strip_code_fence(two_blocks), two_blocks);
    }

    #[test]
    fn test_request_embeds_rendering() {
        let request = build_request(OutputFormat::Smile, &shape());
        assert_eq!(request.format, OutputFormat::Smile);
        assert!(request.instruction().contains("ROLE: Helpful AI assistant"));
        assert!(request.instruction().contains("SMILE"));
        assert_eq!(request.options.max_tokens, 1024);
        assert_eq!(request.options.presence_penalty, Some(0.0));
    }

    #[test]
    fn test_missing_credential_does_not_claim_slot() {
        let service = GenerationService::new(Arc::new(ScriptedProvider::ok("x")));
        let err = service
            .prepare(OutputFormat::Json, &shape(), ProviderCredentials::default())
            .err()
            .unwrap();
        assert!(matches!(err, GenerationError::MissingCredential(Provider::OpenAI)));
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn test_success_stores_overlay_for_format_only() {
        let service = GenerationService::new(Arc::new(ScriptedProvider::ok(
            "```json\n{\"role\": \"Refined\"}\n```",
        )));
        let shape = shape();
        let markdown_before = service.preview(OutputFormat::Markdown, &shape);

        let text = service
            .prepare(OutputFormat::Json, &shape, key())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(text, "{\"role\": \"Refined\"}");
        assert_eq!(service.preview(OutputFormat::Json, &shape), text);
        assert_eq!(service.preview(OutputFormat::Markdown, &shape), markdown_before);
        assert_eq!(service.overlay(OutputFormat::Yaml), None);
        assert_eq!(service.active_format(), OutputFormat::Json);
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_overlay() {
        let ok = GenerationService::new(Arc::new(ScriptedProvider::ok("first")));
        ok.prepare(OutputFormat::Yaml, &shape(), key())
            .unwrap()
            .run()
            .await
            .unwrap();

        // Same overlay state, failing provider.
        let failing = GenerationService {
            provider: Arc::new(ScriptedProvider {
                reply: Err((500, "{\"error\":\"boom\"}".to_string())),
                gate: None,
                delay: None,
            }),
            state: ok.state.clone(),
            in_flight: ok.in_flight.clone(),
            timeout: DEFAULT_TIMEOUT,
        };
        let err = failing
            .prepare(OutputFormat::Yaml, &shape(), key())
            .unwrap()
            .run()
            .await
            .unwrap_err();

        match err {
            GenerationError::Provider { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "{\"error\":\"boom\"}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(failing.overlay(OutputFormat::Yaml).as_deref(), Some("first"));
        assert!(!failing.is_busy());
    }

    #[tokio::test]
    async fn test_second_request_while_in_flight_is_busy() {
        let gate = Arc::new(Notify::new());
        let service = GenerationService::new(Arc::new(ScriptedProvider {
            reply: Ok("done".to_string()),
            gate: Some(gate.clone()),
            delay: None,
        }));

        let first = service.prepare(OutputFormat::Markdown, &shape(), key()).unwrap();
        let pending = tokio::spawn(first.run());

        let err = service
            .prepare(OutputFormat::Json, &shape(), key())
            .err()
            .unwrap();
        assert!(matches!(err, GenerationError::Busy));
        assert!(service.is_busy());

        gate.notify_one();
        assert_eq!(pending.await.unwrap().unwrap(), "done");
        assert!(!service.is_busy());
        assert!(service.prepare(OutputFormat::Json, &shape(), key()).is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_reported_and_releases_slot() {
        let service = GenerationService::new(Arc::new(ScriptedProvider {
            reply: Ok("late".to_string()),
            gate: None,
            delay: Some(Duration::from_secs(5)),
        }))
        .with_timeout(Duration::from_millis(20));

        let err = service
            .prepare(OutputFormat::Json, &shape(), key())
            .unwrap()
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Timeout(d) if d == Duration::from_millis(20)));
        assert_eq!(err.to_string(), "Generation timed out after 20 ms");
        assert!(err.is_retryable());
        assert!(!service.is_busy());
        assert_eq!(service.overlay(OutputFormat::Json), None);
    }
}
