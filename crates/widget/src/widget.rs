//! The chat widget state machine
//!
//! A widget owns its transcript and session id. `send` takes `&mut self`,
//! so at most one exchange is in flight per widget.

use std::time::Duration;

use helpdesk_shared::{ChatReply, ChatRequest};

use crate::{
    client::ChatClient,
    config::WidgetConfig,
    error::WidgetResult,
    session::new_session_id,
    transcript::Transcript,
};

pub const GREETING: &str = "Hello! How can I help you today?";
pub const APOLOGY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";
pub const TICKET_NOTICE: &str =
    "I've created a support ticket for your question. Our team will get back to you soon!";

/// Pause before the ticket notice follows the reply
pub const DEFAULT_TICKET_NOTICE_DELAY: Duration = Duration::from_secs(1);

/// How a `send` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Blank input, nothing sent
    Ignored,
    Answered { ticket_created: bool },
    /// The apology was shown instead of an answer
    Failed,
}

pub struct ChatWidget {
    config: WidgetConfig,
    client: ChatClient,
    session_id: String,
    transcript: Transcript,
    ticket_notice_delay: Duration,
}

impl ChatWidget {
    pub fn new(config: WidgetConfig) -> WidgetResult<Self> {
        let client = ChatClient::new(&config.api_base()?)?;
        let session_id = match config.session_id.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => new_session_id(),
        };
        tracing::debug!(session = %session_id, endpoint = %client.endpoint(), "Chat widget ready");

        Ok(Self {
            config,
            client,
            session_id,
            transcript: Transcript::with_greeting(GREETING),
            ticket_notice_delay: DEFAULT_TICKET_NOTICE_DELAY,
        })
    }

    pub fn with_ticket_notice_delay(mut self, delay: Duration) -> Self {
        self.ticket_notice_delay = delay;
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Stable for the life of the widget; persist it to resume later
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Send one visitor message and record the outcome in the transcript
    pub async fn send(&mut self, message: &str) -> Exchange {
        if message.trim().is_empty() {
            return Exchange::Ignored;
        }

        self.transcript.push_user(message);
        self.transcript.push_loading();

        let request = ChatRequest {
            agent_id: self.config.effective_agent_id().to_string(),
            message: message.to_string(),
            user_session: self.session_id.clone(),
        };

        match self.client.send(&request).await {
            Ok(reply) => self.record_reply(reply).await,
            Err(e) => {
                tracing::warn!(agent_id = %request.agent_id, error = %e, "Chat exchange failed");
                self.transcript.resolve_loading(APOLOGY);
                Exchange::Failed
            }
        }
    }

    /// Replace the loading placeholder; the ticket notice follows after the delay
    async fn record_reply(&mut self, reply: ChatReply) -> Exchange {
        self.transcript.resolve_loading(&reply.response);
        if reply.ticket_created {
            tokio::time::sleep(self.ticket_notice_delay).await;
            self.transcript.push_bot(TICKET_NOTICE);
        }
        Exchange::Answered {
            ticket_created: reply.ticket_created,
        }
    }
}
