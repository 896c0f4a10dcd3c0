//! Request lifecycle: submit, wait for the responder, record the outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{PlaygroundError, RequestError, Result};
use crate::generation::GenerationConfig;
use crate::prompt::PromptBuffer;
use crate::responder::{Responder, ResponseRequest};
use crate::transcript::{ChatMessage, Transcript};

pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    /// Last resolution failed. Accepts submissions like `Idle`.
    Error,
}

/// Owns the transcript and the prompt buffer, and at most one outstanding
/// response task. Dropping the controller aborts that task, so a late
/// resolution can never land anywhere.
pub struct ChatController {
    transcript: Transcript,
    prompt: PromptBuffer,
    state: RequestState,
    last_error: Option<String>,
    responder: Arc<dyn Responder>,
    delay: Duration,
    pending: Option<JoinHandle<std::result::Result<String, RequestError>>>,
}

impl ChatController {
    pub fn new(responder: Arc<dyn Responder>, delay: Duration) -> Self {
        Self {
            transcript: Transcript::new(),
            prompt: PromptBuffer::new(),
            state: RequestState::Idle,
            last_error: None,
            responder,
            delay,
            pending: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn prompt(&self) -> &PromptBuffer {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut PromptBuffer {
        &mut self.prompt
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.state == RequestState::Pending
    }

    /// Whether the send action should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.prompt.is_empty() && !self.is_pending()
    }

    /// Submits the prompt buffer. The configuration is copied into the
    /// response task, so later edits don't affect this request.
    ///
    /// A rejected submission changes nothing, not even the buffer.
    pub fn submit(&mut self, config: &GenerationConfig) -> Result<()> {
        if self.is_pending() {
            debug!("submit ignored: request already pending");
            return Err(PlaygroundError::Validation(
                "a request is already pending".into(),
            ));
        }
        if self.prompt.is_empty() {
            debug!("submit ignored: empty prompt");
            return Err(PlaygroundError::Validation("prompt is empty".into()));
        }

        let prompt = self.prompt.take();
        self.transcript.push(ChatMessage::user(prompt.clone()));
        self.state = RequestState::Pending;
        self.last_error = None;

        let request = ResponseRequest::new(prompt, config);
        info!(
            model = request.model.as_str(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            chars = request.prompt.chars().count(),
            "prompt submitted"
        );

        let responder = Arc::clone(&self.responder);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            responder.respond(&request)
        }));
        Ok(())
    }

    /// Waits for the outstanding response (if any) and records it.
    ///
    /// Cancel safe: if the future is dropped before the task finishes,
    /// nothing has changed and the task is still tracked.
    pub async fn wait_resolution(&mut self) {
        let Some(handle) = self.pending.as_mut() else {
            return;
        };
        let joined = handle.await;
        self.pending = None;
        self.resolve(joined);
    }

    fn resolve(
        &mut self,
        joined: std::result::Result<std::result::Result<String, RequestError>, JoinError>,
    ) {
        let outcome = joined.unwrap_or_else(|err| {
            Err(RequestError::new(format!(
                "response task ended unexpectedly: {err}"
            )))
        });

        match outcome {
            Ok(content) => {
                self.transcript.push(ChatMessage::assistant(content));
                self.state = RequestState::Idle;
                info!(messages = self.transcript.len(), "response received");
            }
            Err(err) => {
                warn!("response failed: {err}");
                self.last_error = Some(err.message);
                self.state = RequestState::Error;
            }
        }
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            debug!("dropping controller with a pending response; aborting it");
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::Model;
    use crate::responder::EchoResponder;
    use crate::transcript::ChatRole;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingResponder;

    impl Responder for FailingResponder {
        fn respond(&self, _request: &ResponseRequest) -> std::result::Result<String, RequestError> {
            Err(RequestError::new("responder unavailable"))
        }
    }

    #[derive(Default)]
    struct CountingResponder {
        calls: Arc<AtomicUsize>,
    }

    impl Responder for CountingResponder {
        fn respond(&self, request: &ResponseRequest) -> std::result::Result<String, RequestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            EchoResponder.respond(request)
        }
    }

    fn echo_controller() -> ChatController {
        ChatController::new(Arc::new(EchoResponder), DEFAULT_RESPONSE_DELAY)
    }

    fn type_prompt(controller: &mut ChatController, text: &str) {
        controller.prompt_mut().replace(text);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_scenario() {
        let mut controller = echo_controller();
        let config = GenerationConfig::new();

        type_prompt(&mut controller, "Hello");
        controller.submit(&config).unwrap();

        assert_eq!(controller.transcript().messages(), &[ChatMessage::user("Hello")]);
        assert_eq!(controller.prompt().text(), "");
        assert_eq!(controller.state(), RequestState::Pending);

        let start = tokio::time::Instant::now();
        controller.wait_resolution().await;
        assert!(start.elapsed() >= DEFAULT_RESPONSE_DELAY);

        assert_eq!(
            controller.transcript().messages(),
            &[
                ChatMessage::user("Hello"),
                ChatMessage::assistant("Echo: Hello\n(Model: gpt-3.5, Temp: 0.7, MaxTokens: 256)"),
            ]
        );
        assert_eq!(controller.state(), RequestState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_not_produced_before_delay() {
        let calls = Arc::new(AtomicUsize::new(0));
        let responder = CountingResponder {
            calls: Arc::clone(&calls),
        };
        let mut controller = ChatController::new(Arc::new(responder), DEFAULT_RESPONSE_DELAY);

        type_prompt(&mut controller, "Hello");
        controller.submit(&GenerationConfig::new()).unwrap();

        tokio::time::advance(Duration::from_millis(999)).await;
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.state(), RequestState::Pending);
        assert_eq!(controller.transcript().len(), 1);

        tokio::time::advance(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let start = tokio::time::Instant::now();
        controller.wait_resolution().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(controller.state(), RequestState::Idle);
        assert_eq!(controller.transcript().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_config_snapshot_taken_at_submit() {
        let mut controller = echo_controller();
        let mut config = GenerationConfig::new();
        config.set_model(Model::Gpt4);
        config.set_temperature(0.123);

        type_prompt(&mut controller, "snap");
        controller.submit(&config).unwrap();

        config.set_model(Model::Custom);
        config.set_temperature(0.1);
        config.set_max_tokens(1024);

        controller.wait_resolution().await;
        assert_eq!(
            controller.transcript().messages()[1].content,
            "Echo: snap\n(Model: gpt-4, Temp: 0.123, MaxTokens: 256)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_rejected_while_pending_or_empty() {
        let mut controller = echo_controller();
        let config = GenerationConfig::new();

        assert!(!controller.can_submit());
        assert!(matches!(
            controller.submit(&config),
            Err(PlaygroundError::Validation(_))
        ));
        assert!(controller.transcript().is_empty());
        assert_eq!(controller.state(), RequestState::Idle);

        type_prompt(&mut controller, "first");
        controller.submit(&config).unwrap();

        type_prompt(&mut controller, "second");
        assert!(!controller.can_submit());
        assert!(controller.submit(&config).is_err());
        assert_eq!(controller.transcript().len(), 1);
        assert_eq!(controller.prompt().text(), "second");

        controller.wait_resolution().await;
        assert!(controller.can_submit());
        controller.submit(&config).unwrap();
        controller.wait_resolution().await;

        let roles: Vec<ChatRole> = controller
            .transcript()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert!(controller.transcript().messages()[3]
            .content
            .starts_with("Echo: second\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_enters_error_and_allows_retry() {
        let mut controller = ChatController::new(Arc::new(FailingResponder), DEFAULT_RESPONSE_DELAY);
        let config = GenerationConfig::new();

        type_prompt(&mut controller, "will fail");
        controller.submit(&config).unwrap();
        controller.wait_resolution().await;

        assert_eq!(controller.state(), RequestState::Error);
        assert_eq!(controller.last_error(), Some("responder unavailable"));
        assert_eq!(controller.transcript().len(), 1);

        type_prompt(&mut controller, "retry");
        assert!(controller.can_submit());
        controller.submit(&config).unwrap();
        assert_eq!(controller.state(), RequestState::Pending);
        assert_eq!(controller.last_error(), None);
        assert_eq!(controller.transcript().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_while_pending_suppresses_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let responder = CountingResponder {
            calls: Arc::clone(&calls),
        };
        let mut controller = ChatController::new(Arc::new(responder), DEFAULT_RESPONSE_DELAY);

        type_prompt(&mut controller, "orphan");
        controller.submit(&GenerationConfig::new()).unwrap();
        drop(controller);

        tokio::time::sleep(DEFAULT_RESPONSE_DELAY * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_without_pending_is_noop() {
        let mut controller = echo_controller();
        controller.wait_resolution().await;
        assert_eq!(controller.state(), RequestState::Idle);
        assert!(controller.transcript().is_empty());
    }
}
