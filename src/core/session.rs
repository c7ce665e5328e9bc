//! Session controller
//!
//! Owns the transcript and the session state, and runs the turn-taking state
//! machine against the provider:
//!
//! 1. `submit` is accepted only when the text is non-blank, the provider is
//!    ready, and no request is in flight. Otherwise it is a silent no-op.
//! 2. The user message is appended right away and the draft is cleared.
//! 3. The request is the system prompt plus the whole transcript.
//! 4. The reply, or a fixed error message, is appended and `pending` resets.
//!
//! Model selection is allowed at any time and leaves a notice in the
//! transcript.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::catalog::{Model, ModelCatalog};
use crate::conversation::{ConversationStore, Message, MessageId, Role};
use crate::providers::{AiProviderClient, ProviderReadiness};

use super::request::{build_request, ChatRequest, DEFAULT_SYSTEM_PROMPT};

/// Assistant message appended when the provider call fails
pub const ERROR_REPLY: &str = "Error: Unable to get response from AI.";

/// Why a submit was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardViolation {
    EmptyInput,
    NotReady,
    RequestPending,
}

/// Result of one submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The provider replied and the reply was appended
    Replied,
    /// The provider failed and [`ERROR_REPLY`] was appended
    Failed,
    /// Nothing happened
    Ignored { reason: GuardViolation },
}

#[derive(Debug)]
struct SessionState {
    store: ConversationStore,
    selected: Model,
    pending: bool,
    draft: String,
    next_id: u64,
}

impl SessionState {
    fn push(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.store.append(Message::new(id, role, content));
        id
    }
}

/// Read model for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub ready: bool,
    pub pending: bool,
    pub draft: String,
    pub selected_model: Model,
    pub messages: Vec<Message>,
    pub status_label: String,
    pub input_placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing_indicator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_hint: Option<String>,
    pub can_send: bool,
    pub input_enabled: bool,
    pub model_selector_enabled: bool,
}

impl SessionSnapshot {
    fn new(session_id: Uuid, ready: bool, state: &SessionState) -> Self {
        let model = &state.selected;

        Self {
            session_id,
            ready,
            pending: state.pending,
            draft: state.draft.clone(),
            selected_model: model.clone(),
            messages: state.store.all().to_vec(),
            status_label: if ready { "AI is Ready!" } else { "Loading AI..." }.to_string(),
            input_placeholder: if ready {
                format!("Ask {} anything...", model.name)
            } else {
                "AI is loading, please wait...".to_string()
            },
            typing_indicator: state
                .pending
                .then(|| format!("{} is typing...", model.name)),
            empty_hint: state
                .store
                .is_empty()
                .then(|| "Start the conversation by typing a message below!".to_string()),
            can_send: ready && !state.pending && !state.draft.trim().is_empty(),
            input_enabled: ready && !state.pending,
            model_selector_enabled: ready,
        }
    }
}

/// The conversation session manager
pub struct SessionController {
    id: Uuid,
    catalog: Arc<ModelCatalog>,
    client: AiProviderClient,
    readiness: ProviderReadiness,
    system_prompt: String,
    state: Mutex<SessionState>,
}

impl SessionController {
    /// Start a session with `default_model` selected (resolved against the
    /// catalog, so an unknown id selects the first entry)
    pub fn new(
        catalog: Arc<ModelCatalog>,
        client: AiProviderClient,
        readiness: ProviderReadiness,
        default_model: &str,
    ) -> Self {
        let selected = catalog.resolve(default_model).clone();

        Self {
            id: Uuid::new_v4(),
            catalog,
            client,
            readiness,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            state: Mutex::new(SessionState {
                store: ConversationStore::new(),
                selected,
                pending: false,
                draft: String::new(),
                next_id: 0,
            }),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    pub async fn selected_model(&self) -> Model {
        self.state.lock().await.selected.clone()
    }

    pub async fn update_draft(&self, text: impl Into<String>) {
        self.state.lock().await.draft = text.into();
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot::new(self.id, self.is_ready(), &state)
    }

    /// Submit `text` as the next user turn and wait for the round trip.
    ///
    /// The provider call runs detached from the caller: dropping this future
    /// does not cancel it, and `pending` is reset when it resolves.
    pub async fn submit(self: &Arc<Self>, text: &str) -> SubmitOutcome {
        let request = match self.begin_exchange(Some(text)).await {
            Ok(request) => request,
            Err(reason) => return SubmitOutcome::Ignored { reason },
        };
        self.run_exchange(request).await
    }

    /// Submit the current draft
    pub async fn submit_draft(self: &Arc<Self>) -> SubmitOutcome {
        let request = match self.begin_exchange(None).await {
            Ok(request) => request,
            Err(reason) => return SubmitOutcome::Ignored { reason },
        };
        self.run_exchange(request).await
    }

    /// Switch models and announce it in the transcript. Allowed at any time.
    pub async fn select_model(&self, id: &str) -> Model {
        let model = self.catalog.resolve(id).clone();

        let mut state = self.state.lock().await;
        state.selected = model.clone();
        state.push(
            Role::Assistant,
            format!("Switched to model: {}", model.label()),
        );

        tracing::info!(session = %self.id, requested = id, model = %model.id, "Model switched");
        model
    }

    /// Guard, then enter Sending: append the user turn, clear the draft, and
    /// build the request from the updated transcript.
    async fn begin_exchange(&self, text: Option<&str>) -> Result<ChatRequest, GuardViolation> {
        let mut state = self.state.lock().await;

        let content = text.unwrap_or(state.draft.as_str()).trim().to_string();
        if content.is_empty() {
            return Err(GuardViolation::EmptyInput);
        }
        if !self.is_ready() {
            return Err(GuardViolation::NotReady);
        }
        if state.pending {
            return Err(GuardViolation::RequestPending);
        }

        state.pending = true;
        state.draft.clear();
        state.push(Role::User, content);

        let request = build_request(&self.system_prompt, state.store.all(), &state.selected);
        tracing::debug!(
            session = %self.id,
            model = %request.options.model,
            messages = request.messages.len(),
            "Sending conversation to provider"
        );
        Ok(request)
    }

    async fn run_exchange(self: &Arc<Self>, request: ChatRequest) -> SubmitOutcome {
        let this = Arc::clone(self);
        let exchange = tokio::spawn(async move { this.complete_exchange(request).await });

        match exchange.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Exchange task failed");
                SubmitOutcome::Failed
            }
        }
    }

    async fn complete_exchange(&self, request: ChatRequest) -> SubmitOutcome {
        let result = self.client.send(request.messages, request.options).await;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(reply) => {
                state.push(Role::Assistant, reply);
                SubmitOutcome::Replied
            }
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Error sending message");
                state.push(Role::Assistant, ERROR_REPLY);
                SubmitOutcome::Failed
            }
        };
        state.pending = false;

        tracing::debug!(session = %self.id, ?outcome, "Exchange finished");
        outcome
    }
}

#[cfg(test)]
impl SessionController {
    pub async fn is_pending(&self) -> bool {
        self.state.lock().await.pending
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.store.all().to_vec()
    }

    pub async fn draft(&self) -> String {
        self.state.lock().await.draft.clone()
    }
}
