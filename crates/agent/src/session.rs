//! The agent session — one reasoning loop per logical conversation.
//!
//! An [`AgentSession`] owns all run state: the content stream, the
//! conversation memory, the error slot, the running flag, and the
//! cancellation token. Exactly one session exists per conversation; it is
//! never shared between loops, so multiple concurrent sessions are isolated
//! by construction.
//!
//! Each iteration has exactly two suspension points (the completion call and
//! the tool call); cancellation is observed before each and the result is
//! discarded after, on a best-effort basis. Nothing propagates out of
//! [`AgentSession::run`] — every failure path resolves to a terminal
//! [`RunOutcome`] plus a user-visible comment or the error slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use skein_core::backend::{CompletionBackend, CompletionRequest};
use skein_core::error::BackendError;
use skein_core::component::ComponentCatalog;
use skein_core::content::ContentItem;
use skein_core::message::Message;
use skein_core::tool::ToolRegistry;

use crate::dispatcher::ToolDispatcher;
use crate::memory::ConversationMemory;
use crate::parser::{self, Intent};
use crate::prompt::PromptBuilder;
use crate::stream::ContentStream;

pub const DEFAULT_MAX_ITERATIONS: u32 = 25;

/// Backend and sampling configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Per-run options.
#[derive(Default)]
pub struct RunOptions {
    /// Content of the page the user is looking at.
    pub page_context: Option<String>,
    /// Caller-supplied auxiliary context.
    pub extra_context: Option<String>,
    /// Replaces the rules preamble of the system prompt.
    pub system_prompt_override: Option<String>,
    /// Iteration bound; defaults to [`DEFAULT_MAX_ITERATIONS`].
    pub max_iterations: Option<u32>,
    /// Tool registry override for this run; resolved once at loop start.
    pub tools: Option<Arc<ToolRegistry>>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A final answer was emitted.
    Completed,
    /// The run was cancelled via `stop()`.
    Stopped,
    /// The iteration bound was exhausted without a final answer. A warning
    /// comment is emitted; this is not an error state.
    MaxIterations,
    /// A backend failure or degenerate response; details in the error slot.
    Errored,
    /// `run` was called while a run was already in flight; nothing happened.
    AlreadyRunning,
}

/// Cloneable control surface for stopping a run from another task.
#[derive(Clone)]
pub struct SessionHandle {
    running: Arc<AtomicBool>,
    cancel_slot: Arc<Mutex<CancellationToken>>,
}

impl SessionHandle {
    /// Signal cancellation and flip the running flag immediately. Does not
    /// wait for in-flight work to unwind; a no-op while idle.
    pub fn stop(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        // A poisoned slot still holds a usable token; recover the guard.
        self.cancel_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        self.running.store(false, Ordering::SeqCst);
        info!("Session stop requested");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Resets the running flag and clears the cancellation token on every exit
/// path out of `run`, including panics.
struct RunGuard {
    running: Arc<AtomicBool>,
    cancel_slot: Arc<Mutex<CancellationToken>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        *self
            .cancel_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = CancellationToken::new();
    }
}

pub struct AgentSession {
    backend: Arc<dyn CompletionBackend>,
    registry: Arc<ToolRegistry>,
    catalog: Arc<dyn ComponentCatalog>,
    config: SessionConfig,

    stream: ContentStream,
    memory: ConversationMemory,
    error: Option<String>,
    running: Arc<AtomicBool>,
    cancel_slot: Arc<Mutex<CancellationToken>>,
}

impl AgentSession {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        registry: Arc<ToolRegistry>,
        catalog: Arc<dyn ComponentCatalog>,
    ) -> Self {
        Self {
            backend,
            registry,
            catalog,
            config: SessionConfig::default(),
            stream: ContentStream::new(),
            memory: ConversationMemory::new(),
            error: None,
            running: Arc::new(AtomicBool::new(false)),
            cancel_slot: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    // ── Read-only surface ──

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The ordered content stream emitted so far.
    pub fn content(&self) -> &[ContentItem] {
        self.stream.items()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &[Message] {
        self.memory.history()
    }

    pub fn memory(&self) -> &std::collections::BTreeMap<String, String> {
        self.memory.scratchpad()
    }

    /// Control surface usable from other tasks while `run` is in flight.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            running: self.running.clone(),
            cancel_slot: self.cancel_slot.clone(),
        }
    }

    // ── Mutating surface ──

    /// Signal cancellation for the current run. No-op while idle.
    pub fn stop(&self) {
        self.handle().stop();
    }

    /// Empty the content stream and the error slot; history and scratchpad
    /// persist. Used between display refreshes.
    pub fn clear(&mut self) {
        self.stream.clear();
        self.error = None;
    }

    /// Also empty the conversation history and scratchpad: a new logical
    /// conversation in the same session object.
    pub fn clear_all(&mut self) {
        self.clear();
        self.memory.clear();
    }

    /// Drive the reasoning loop for one user message.
    ///
    /// Side effects only: emits to the content stream and mutates the
    /// conversation memory. Never panics out and never returns an `Err`;
    /// inspect the returned [`RunOutcome`] and the `error()` slot.
    pub async fn run(&mut self, user_message: &str, opts: RunOptions) -> RunOutcome {
        // Reentrancy guard: a concurrent call while running is a no-op.
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("run() called while a run is already in flight");
            return RunOutcome::AlreadyRunning;
        }

        self.error = None;
        let cancel = CancellationToken::new();
        *self
            .cancel_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = cancel.clone();
        let _guard = RunGuard {
            running: self.running.clone(),
            cancel_slot: self.cancel_slot.clone(),
        };

        let max_iterations = opts.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);
        let registry = opts.tools.clone().unwrap_or_else(|| self.registry.clone());
        let dispatcher = ToolDispatcher::new(registry.clone(), self.catalog.clone());

        self.stream.push(ContentItem::Text {
            content: user_message.to_string(),
        });
        self.memory.push(Message::user(user_message));

        let system_prompt = PromptBuilder::new(registry.definitions())
            .with_page_context(opts.page_context)
            .with_extra_context(opts.extra_context)
            .with_preamble_override(opts.system_prompt_override)
            .build();

        info!(
            model = %self.config.model,
            max_iterations,
            tools = registry.names().len(),
            "Agent run starting"
        );

        let outcome = self
            .drive(&system_prompt, max_iterations, &registry, &dispatcher, &cancel)
            .await;

        if outcome == RunOutcome::MaxIterations {
            self.stream.push(ContentItem::Comment {
                text: format!(
                    "Reached maximum iterations ({max_iterations}) without a final answer"
                ),
            });
        }

        info!(?outcome, items = self.stream.len(), "Agent run finished");
        outcome
    }

    async fn drive(
        &mut self,
        system_prompt: &str,
        max_iterations: u32,
        registry: &ToolRegistry,
        dispatcher: &ToolDispatcher,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        for iteration in 1..=max_iterations {
            if cancel.is_cancelled() {
                debug!(iteration, "Cancellation observed at loop top");
                return RunOutcome::Stopped;
            }

            debug!(iteration, "Agent iteration");

            let mut messages = vec![Message::system(system_prompt)];
            if let Some(scratch) = self.memory.render_scratchpad() {
                messages.push(Message::system(scratch));
            }
            messages.extend(self.memory.non_system_history());

            let request = CompletionRequest {
                model: self.config.model.clone(),
                messages,
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
            };

            let response = match self.backend.complete(request).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "Completion backend failed");
                    self.stream.push(ContentItem::Comment {
                        text: format!("Backend error: {e}"),
                    });
                    self.error = Some(e.to_string());
                    return RunOutcome::Errored;
                }
            };

            // Result arriving after stop() is discardable.
            if cancel.is_cancelled() {
                debug!(iteration, "Cancelled during completion; discarding response");
                return RunOutcome::Stopped;
            }

            if response.content.trim().is_empty() {
                warn!(iteration, "Backend returned an empty response");
                self.stream.push(ContentItem::Comment {
                    text: "The model returned an empty response".into(),
                });
                if iteration == 1 {
                    // One soft recovery on the first turn only.
                    let clarification =
                        "I couldn't generate a response for that. Could you rephrase \
                         or add a bit more detail?";
                    self.stream.push(ContentItem::Text {
                        content: clarification.into(),
                    });
                    self.memory.push(Message::assistant(clarification));
                }
                self.error = Some(BackendError::EmptyResponse.to_string());
                return RunOutcome::Errored;
            }

            self.memory.push(Message::assistant(&response.content));

            let parsed = parser::parse(&response.content, registry);
            if let Some(thinking) = parsed.thinking {
                self.stream.push(ContentItem::Thinking { content: thinking });
            }

            match parsed.intent {
                Intent::Action { name, params } => {
                    let dispatch = dispatcher.execute(&name, params, cancel.clone()).await;
                    if cancel.is_cancelled() {
                        debug!(iteration, tool = %name, "Cancelled during tool call; discarding result");
                        return RunOutcome::Stopped;
                    }
                    for item in dispatch.items {
                        self.stream.push(item);
                    }
                    self.memory.push(Message::observation(&dispatch.observation));
                    self.memory.note_tool_use(&name, dispatch.success);
                }
                Intent::DirectAnswer { observation } => {
                    debug!(iteration, "Trivial tool call suppressed");
                    self.memory.push(Message::observation(&observation));
                }
                Intent::FinalAnswer(answer) => {
                    self.stream.push(ContentItem::Text { content: answer });
                    return RunOutcome::Completed;
                }
                Intent::Narrative(text) => {
                    if let Some(text) = text {
                        self.stream.push(ContentItem::Text { content: text });
                    }
                }
            }
        }

        RunOutcome::MaxIterations
    }
}
