//! Ordered chat transcript shown in the widget bubble

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Placeholder shown while a reply is pending
    pub is_loading: bool,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: OffsetDateTime::now_utc(),
            is_loading: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Transcript opened by a bot greeting
    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            messages: vec![ChatMessage::new(greeting, Sender::Bot)],
        }
    }

    pub fn push_user(&mut self, text: &str) {
        self.messages.push(ChatMessage::new(text, Sender::User));
    }

    pub fn push_bot(&mut self, text: &str) {
        self.messages.push(ChatMessage::new(text, Sender::Bot));
    }

    pub fn push_loading(&mut self) {
        let mut placeholder = ChatMessage::new("", Sender::Bot);
        placeholder.is_loading = true;
        self.messages.push(placeholder);
    }

    /// Drop every loading placeholder, then append the bot's message
    pub fn resolve_loading(&mut self, text: &str) {
        self.messages.retain(|m| !m.is_loading);
        self.push_bot(text);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.messages.iter().any(|m| m.is_loading)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_placeholder_is_replaced() {
        let mut transcript = Transcript::with_greeting("Hi");
        transcript.push_user("hello");
        transcript.push_loading();
        assert!(transcript.is_waiting());

        transcript.resolve_loading("Hello back");
        assert!(!transcript.is_waiting());
        let texts: Vec<(&str, Sender)> = transcript
            .messages()
            .iter()
            .map(|m| (m.text.as_str(), m.sender))
            .collect();
        assert_eq!(
            texts,
            vec![("Hi", Sender::Bot), ("hello", Sender::User), ("Hello back", Sender::Bot)]
        );
    }

    #[test]
    fn test_resolve_drops_stray_placeholders() {
        let mut transcript = Transcript::default();
        transcript.push_loading();
        transcript.push_user("again");
        transcript.push_loading();
        transcript.resolve_loading("done");
        assert_eq!(transcript.len(), 2);
        assert!(transcript.messages().iter().all(|m| !m.is_loading));
        assert_eq!(transcript.last().map(|m| m.text.as_str()), Some("done"));
    }
}
