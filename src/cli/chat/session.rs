use eyre::Result;
use tracing::{debug, error};

use super::service::ServiceSelector;
use super::transcript::{MessageId, Sender, Transcript};
use super::view::ChatView;
use crate::backend_client::{AskError, AskRequest, AskResponse, Backend};

pub const PLACEHOLDER_TEXT: &str = "Thinking...";
pub const FAILURE_GLYPH: &str = "❌";
pub const WARNING_GLYPH: &str = "⚠️";

/// What a finished request turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    Failed(String),
    Empty,
    Network(String),
}

impl Reply {
    /// `response` wins over `error`; empty strings count as absent.
    pub fn from_response(response: AskResponse) -> Self {
        let non_empty = |field: Option<String>| field.filter(|s| !s.is_empty());

        if let Some(text) = non_empty(response.response) {
            Reply::Answer(text)
        } else if let Some(error) = non_empty(response.error) {
            Reply::Failed(error)
        } else {
            Reply::Empty
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Reply::Answer(_))
    }

    pub fn text(&self) -> String {
        match self {
            Reply::Answer(text) => text.clone(),
            Reply::Failed(error) => format!("{} Error: {}", FAILURE_GLYPH, error),
            Reply::Empty => format!("{} No response received", FAILURE_GLYPH),
            Reply::Network(cause) => format!("{} Network error: {}", WARNING_GLYPH, cause),
        }
    }
}

/// A request that has been announced in the transcript but not resolved.
#[derive(Debug)]
pub struct PendingReply {
    placeholder: MessageId,
    request: AskRequest,
}

impl PendingReply {
    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }

    pub fn request(&self) -> &AskRequest {
        &self.request
    }
}

/// Client state for one chat window.
pub struct ChatSession<B> {
    backend: B,
    transcript: Transcript,
    view: ChatView,
    services: ServiceSelector,
}

impl<B: Backend> ChatSession<B> {
    pub fn new(backend: B, view: ChatView, services: ServiceSelector) -> Self {
        Self {
            backend,
            transcript: Transcript::new(),
            view,
            services,
        }
    }

    pub fn append_message(&mut self, text: impl Into<String>, sender: Sender) -> Result<MessageId> {
        let message = self.transcript.append(text, sender);
        self.view.render(message)?;
        Ok(message.id())
    }

    /// Runs one full request/response cycle. Returns `None` for blank input.
    pub async fn send_message(&mut self, input: &str) -> Result<Option<Reply>> {
        let Some(pending) = self.begin_send(input)? else {
            return Ok(None);
        };

        let outcome = self.backend.ask(pending.request()).await;
        self.finish_send(pending, outcome).map(Some)
    }

    /// Appends the user message and the placeholder. Nothing is sent yet.
    pub fn begin_send(&mut self, input: &str) -> Result<Option<PendingReply>> {
        let prompt = input.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        let request = AskRequest {
            prompt: prompt.to_string(),
            service: self.services.selected().to_string(),
        };

        self.append_message(prompt, Sender::User)?;
        let placeholder = self.append_message(PLACEHOLDER_TEXT, Sender::Bot)?;

        Ok(Some(PendingReply {
            placeholder,
            request,
        }))
    }

    /// Replaces the pending placeholder with the resolved reply.
    pub fn finish_send(
        &mut self,
        pending: PendingReply,
        outcome: Result<AskResponse, AskError>,
    ) -> Result<Reply> {
        self.remove_placeholder(pending.placeholder())?;

        let reply = match outcome {
            Ok(response) => {
                debug!("Backend replied for service {}", pending.request.service);
                Reply::from_response(response)
            }
            Err(e) => {
                error!("Request to backend failed: {}", e);
                Reply::Network(e.to_string())
            }
        };

        self.append_message(reply.text(), Sender::Bot)?;
        Ok(reply)
    }

    pub fn remove_placeholder(&mut self, id: MessageId) -> Result<()> {
        if self.transcript.remove(id).is_some() {
            self.view.retract(id)?;
        }
        Ok(())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }

    pub fn services(&self) -> &ServiceSelector {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut ServiceSelector {
        &mut self.services
    }

    pub fn view_mut(&mut self) -> &mut ChatView {
        &mut self.view
    }
}
