//! Input validation for agents and support requests
//!
//! Every rule reports its own message so callers can surface all problems
//! with a form at once instead of the first one only.

use serde::Deserialize;

use crate::types::{NewAgent, NewSupportRequest, Priority, Tone};

pub const AGENT_NAME_MIN: usize = 2;
pub const AGENT_DESCRIPTION_MIN: usize = 10;
pub const AGENT_PERSONALITY_MIN: usize = 10;

pub const REQUEST_NAME_MIN: usize = 2;
pub const REQUEST_SUBJECT_MIN: usize = 5;
pub const REQUEST_MESSAGE_MIN: usize = 10;

/// Rejected input, one message per failed rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .errors.join("; "))]
pub struct ValidationErrors {
    pub errors: Vec<String>,
}

impl ValidationErrors {
    fn check(errors: Vec<String>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }
}

fn char_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Raw agent form as submitted by the dashboard
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub personality: String,
    /// Manually entered knowledge items (links, snippets)
    #[serde(default)]
    pub knowledge_base: Vec<String>,
    /// Only honoured on update; a disabled agent refuses chats
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl AgentDraft {
    /// Validate the draft. `file_urls` are the public URLs of files uploaded
    /// with the form; they lead the resulting knowledge base.
    pub fn validate(self, file_urls: Vec<String>) -> Result<NewAgent, ValidationErrors> {
        let tone = self.check()?;

        Ok(NewAgent {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            tone,
            personality: self.personality.trim().to_string(),
            knowledge_base: merge_knowledge_base(file_urls, self.knowledge_base),
        })
    }

    /// Run the field rules without consuming the draft. Returns the parsed tone.
    pub fn check(&self) -> Result<Tone, ValidationErrors> {
        let mut errors = Vec::new();

        if char_len(&self.name) < AGENT_NAME_MIN {
            errors.push(format!(
                "Agent name must be at least {} characters",
                AGENT_NAME_MIN
            ));
        }
        if char_len(&self.description) < AGENT_DESCRIPTION_MIN {
            errors.push(format!(
                "Description must be at least {} characters",
                AGENT_DESCRIPTION_MIN
            ));
        }
        let tone = if self.tone.trim().is_empty() {
            errors.push("Please select a tone".to_string());
            None
        } else {
            match self.tone.parse::<Tone>() {
                Ok(tone) => Some(tone),
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        };
        if char_len(&self.personality) < AGENT_PERSONALITY_MIN {
            errors.push(format!(
                "Personality must be at least {} characters",
                AGENT_PERSONALITY_MIN
            ));
        }

        match (tone, errors.is_empty()) {
            (Some(tone), true) => Ok(tone),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

/// Uploaded-file URLs first, then manual items in entry order.
/// Blank manual items are dropped and the rest trimmed.
pub fn merge_knowledge_base(file_urls: Vec<String>, manual_items: Vec<String>) -> Vec<String> {
    let mut merged = file_urls;
    merged.extend(
        manual_items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty()),
    );
    merged
}

/// Loose `local@domain.tld` shape check with no whitespace anywhere
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Raw legacy support request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupportRequestDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    pub priority: Option<String>,
}

impl SupportRequestDraft {
    pub fn validate(self) -> Result<NewSupportRequest, ValidationErrors> {
        let mut errors = Vec::new();

        if char_len(&self.name) < REQUEST_NAME_MIN {
            errors.push(format!(
                "Name must be at least {} characters long",
                REQUEST_NAME_MIN
            ));
        }
        if !is_valid_email(&self.email) {
            errors.push("Please provide a valid email address".to_string());
        }
        if char_len(&self.subject) < REQUEST_SUBJECT_MIN {
            errors.push(format!(
                "Subject must be at least {} characters long",
                REQUEST_SUBJECT_MIN
            ));
        }
        if char_len(&self.message) < REQUEST_MESSAGE_MIN {
            errors.push(format!(
                "Message must be at least {} characters long",
                REQUEST_MESSAGE_MIN
            ));
        }
        let priority = match self.priority.as_deref() {
            None => Priority::default(),
            Some(raw) => raw.parse::<Priority>().unwrap_or_else(|_| {
                errors.push("Invalid priority level".to_string());
                Priority::default()
            }),
        };

        ValidationErrors::check(errors)?;

        Ok(NewSupportRequest {
            name: self.name.trim().to_string(),
            email: self.email,
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            priority,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_draft() -> AgentDraft {
        AgentDraft {
            name: "Billing Bot".into(),
            description: "Answers invoice questions".into(),
            tone: "friendly".into(),
            personality: "Patient, upbeat and precise".into(),
            knowledge_base: vec![],
            is_active: None,
        }
    }

    #[test]
    fn test_valid_agent_draft() {
        let agent = valid_draft().validate(vec![]).unwrap();
        assert_eq!(agent.name, "Billing Bot");
        assert_eq!(agent.tone, Tone::Friendly);
        assert!(agent.knowledge_base.is_empty());
    }

    #[test]
    fn test_agent_draft_reports_every_failed_rule() {
        let draft = AgentDraft {
            name: " a ".into(),
            description: "short".into(),
            tone: "".into(),
            personality: "tiny".into(),
            knowledge_base: vec![],
            is_active: None,
        };
        let err = draft.validate(vec![]).unwrap_err();
        assert_eq!(
            err.errors,
            vec![
                "Agent name must be at least 2 characters",
                "Description must be at least 10 characters",
                "Please select a tone",
                "Personality must be at least 10 characters",
            ]
        );
    }

    #[test]
    fn test_agent_draft_rejects_unknown_tone() {
        let mut draft = valid_draft();
        draft.tone = "sarcastic".into();
        let err = draft.validate(vec![]).unwrap_err();
        assert_eq!(err.errors, vec!["Invalid tone: sarcastic"]);
    }

    #[test]
    fn test_knowledge_base_files_precede_manual_items() {
        let mut draft = valid_draft();
        draft.knowledge_base = vec![
            "https://docs.example.com/faq".into(),
            "   ".into(),
            "  Refunds take 5 days ".into(),
        ];
        let files = vec![
            "https://cdn.example.com/a.pdf".to_string(),
            "https://cdn.example.com/b.txt".to_string(),
        ];
        let agent = draft.validate(files).unwrap();
        assert_eq!(
            agent.knowledge_base,
            vec![
                "https://cdn.example.com/a.pdf",
                "https://cdn.example.com/b.txt",
                "https://docs.example.com/faq",
                "Refunds take 5 days",
            ]
        );
    }

    #[test]
    fn test_merge_knowledge_base_order_holds_for_many_shapes() {
        for files in 0..4 {
            for items in 0..4 {
                let urls: Vec<String> = (0..files).map(|i| format!("file-{i}")).collect();
                let manual: Vec<String> = (0..items).map(|i| format!("item-{i}")).collect();
                let merged = merge_knowledge_base(urls.clone(), manual.clone());
                let expected: Vec<String> = urls.into_iter().chain(manual).collect();
                assert_eq!(merged, expected);
            }
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email("jane@.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_support_request_validation() {
        let ok = SupportRequestDraft {
            name: "Jo".into(),
            email: "jo@example.com".into(),
            subject: "Login fails".into(),
            message: "I cannot sign in since Monday".into(),
            priority: None,
        }
        .validate()
        .unwrap();
        assert_eq!(ok.priority, Priority::Medium);

        let err = SupportRequestDraft {
            name: "J".into(),
            email: "nope".into(),
            subject: "Hey".into(),
            message: "Help".into(),
            priority: Some("critical".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.errors.len(), 5);
        assert_eq!(err.errors[4], "Invalid priority level");
    }
}
